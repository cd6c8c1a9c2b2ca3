use libris_core::{
    open_db_in_memory, Author, Book, BookDetail, PageRequest, Predicate, RepoError, Repository,
    Sort, SqliteRepository, Transaction, TransactionDetail, TransactionDetailId,
    AuditStamp, DEFAULT_CREATOR,
};
use rusqlite::Connection;

fn seed_catalog(conn: &Connection) -> (i64, Vec<Book>) {
    let authors = SqliteRepository::<Author>::try_new(conn).unwrap();
    let books = SqliteRepository::<Book>::try_new(conn).unwrap();
    let author_id = authors.save(Author::new("Ada")).unwrap().id.unwrap();
    let seeded = [("Gamma", 30), ("Alpha", 10), ("Beta", 30), ("Delta", 5)]
        .into_iter()
        .map(|(title, price)| books.save(Book::new(author_id, title, price)).unwrap())
        .collect();
    (author_id, seeded)
}

fn titles(books: &[Book]) -> Vec<&str> {
    books.iter().map(|book| book.title.as_str()).collect()
}

#[test]
fn find_all_returns_rows_in_key_order() {
    let conn = open_db_in_memory().unwrap();
    seed_catalog(&conn);
    let repo = SqliteRepository::<Book>::try_new(&conn).unwrap();

    let books = repo.find_all().unwrap();
    assert_eq!(titles(&books), vec!["Gamma", "Alpha", "Beta", "Delta"]);
}

#[test]
fn find_all_sorted_breaks_ties_by_key() {
    let conn = open_db_in_memory().unwrap();
    let (_, seeded) = seed_catalog(&conn);
    let repo = SqliteRepository::<Book>::try_new(&conn).unwrap();
    repo.delete_entity(&seeded[3]).unwrap();

    let by_price = repo.find_all_sorted(&Sort::desc("price")).unwrap();
    assert_eq!(titles(&by_price), vec!["Gamma", "Beta", "Alpha"]);

    let by_title = repo
        .find_all_sorted(&Sort::asc("price").then_asc("title"))
        .unwrap();
    assert_eq!(titles(&by_title), vec!["Alpha", "Beta", "Gamma"]);
}

#[test]
fn find_all_sorted_rejects_undeclared_columns() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteRepository::<Book>::try_new(&conn).unwrap();

    let err = repo
        .find_all_sorted(&Sort::asc("price; DROP TABLE m_book"))
        .unwrap_err();
    assert!(matches!(err, RepoError::UnknownColumn { entity: "book", .. }));
}

#[test]
fn find_all_paged_counts_only_visible_rows() {
    let conn = open_db_in_memory().unwrap();
    let (_, seeded) = seed_catalog(&conn);
    let repo = SqliteRepository::<Book>::try_new(&conn).unwrap();
    repo.delete_entity(&seeded[0]).unwrap();

    let request = PageRequest::of(0, 2).unwrap().with_sort(Sort::asc("title"));
    let first = repo.find_all_paged(&request).unwrap();
    assert_eq!(titles(&first.content), vec!["Alpha", "Beta"]);
    assert_eq!(first.total_elements, 3);
    assert_eq!(first.total_pages(), 2);
    assert!(first.has_next());

    let second = repo
        .find_all_paged(&PageRequest::of(1, 2).unwrap().with_sort(Sort::asc("title")))
        .unwrap();
    assert_eq!(titles(&second.content), vec!["Delta"]);
    assert!(!second.has_next());

    let beyond = repo.find_all_paged(&PageRequest::of(5, 2).unwrap()).unwrap();
    assert!(beyond.is_empty());
    assert_eq!(beyond.total_elements, 3);
}

#[test]
fn zero_page_size_is_rejected() {
    assert!(matches!(
        PageRequest::of(0, 0),
        Err(RepoError::InvalidPageRequest(_))
    ));

    let conn = open_db_in_memory().unwrap();
    let repo = SqliteRepository::<Book>::try_new(&conn).unwrap();
    let request = PageRequest {
        page: 0,
        size: 0,
        sort: Sort::unsorted(),
    };
    assert!(matches!(
        repo.find_all_paged(&request),
        Err(RepoError::InvalidPageRequest(_))
    ));
}

#[test]
fn find_all_matching_rejects_unknown_filter_column() {
    assert!(matches!(
        Predicate::eq::<Book>("isbn", "123".to_string()),
        Err(RepoError::UnknownColumn { entity: "book", column }) if column == "isbn"
    ));
}

#[test]
fn save_stamps_audit_fields_and_keeps_creation_on_update() {
    let conn = open_db_in_memory().unwrap();
    let (_, seeded) = seed_catalog(&conn);
    let repo = SqliteRepository::<Book>::try_new(&conn).unwrap();

    let created = seeded[1].clone();
    assert!(created.audit.created_at.is_some());
    assert_eq!(created.audit.created_by.as_deref(), Some(DEFAULT_CREATOR));
    assert_eq!(created.audit.updated_at, None);

    let mut changed = created.clone();
    changed.price = 12;
    changed.audit.created_at = Some(1);
    changed.audit.created_by = Some("intruder".to_string());
    let updated = repo.save(changed).unwrap();
    assert!(updated.audit.updated_at.is_some());

    let stored = repo.find_one(&created.id.unwrap()).unwrap().unwrap();
    assert_eq!(stored.price, 12);
    assert_eq!(stored.audit.created_at, created.audit.created_at);
    assert_eq!(stored.audit.created_by.as_deref(), Some(DEFAULT_CREATOR));
    assert_eq!(stored.audit.updated_at, updated.audit.updated_at);
    assert_eq!(updated.audit, stored.audit);
}

#[test]
fn update_returns_the_stored_audit_not_the_callers() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteRepository::<Author>::try_new(&conn).unwrap();
    let id = repo.save(Author::new("Ada")).unwrap().id.unwrap();

    let detached = Author {
        id: Some(id),
        audit: AuditStamp::default(),
        ..Author::new("Ada Lovelace")
    };
    let updated = repo.save(detached).unwrap();

    let stored = repo.find_one(&id).unwrap().unwrap();
    assert_eq!(updated, stored);
    assert!(updated.audit.created_at.is_some());
    assert_eq!(updated.audit.created_by.as_deref(), Some(DEFAULT_CREATOR));
    assert_eq!(updated.full_name, "Ada Lovelace");
}

#[test]
fn assigned_key_needs_a_fresh_audit_to_return_after_hard_delete() {
    let conn = open_db_in_memory().unwrap();
    let (_, seeded) = seed_catalog(&conn);
    let book_id = seeded[0].id.unwrap();
    let repo = SqliteRepository::<BookDetail>::try_new(&conn).unwrap();

    let detail = repo.save(BookDetail::new(book_id, 100, 250)).unwrap();
    repo.hard_delete(&detail).unwrap();

    let err = repo.save(detail.clone()).unwrap_err();
    assert!(err.is_not_found(), "unexpected error: {err}");

    let revived = repo
        .save(BookDetail {
            audit: AuditStamp::default(),
            ..detail
        })
        .unwrap();
    assert_eq!(repo.find_one(&book_id).unwrap(), Some(revived));
}

#[test]
fn explicit_creator_is_kept_on_insert() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteRepository::<Author>::try_new(&conn).unwrap();

    let mut author = Author::new("Grace");
    author.audit.created_by = Some("importer".to_string());
    let saved = repo.save(author).unwrap();

    let stored = repo.find_one(&saved.id.unwrap()).unwrap().unwrap();
    assert_eq!(stored.audit.created_by.as_deref(), Some("importer"));
}

#[test]
fn validation_runs_before_any_sql() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteRepository::<Author>::try_new(&conn).unwrap();

    let err = repo.save(Author::new("   ")).unwrap_err();
    assert!(matches!(err, RepoError::Validation { entity: "author", .. }));
    assert_eq!(repo.count().unwrap(), 0);
}

#[test]
fn update_of_unknown_id_is_not_found() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteRepository::<Author>::try_new(&conn).unwrap();

    let mut ghost = Author::new("Ghost");
    ghost.id = Some(42);
    assert!(repo.save(ghost).unwrap_err().is_not_found());
    assert_eq!(repo.count().unwrap(), 0);
}

#[test]
fn book_with_missing_author_surfaces_constraint_violation() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteRepository::<Book>::try_new(&conn).unwrap();

    let err = repo.save(Book::new(404, "Orphan", 10)).unwrap_err();
    assert!(err.is_constraint_violation());
    assert!(!err.is_not_found());
}

#[test]
fn hard_delete_of_referenced_author_surfaces_constraint_violation() {
    let conn = open_db_in_memory().unwrap();
    seed_catalog(&conn);
    let authors = SqliteRepository::<Author>::try_new(&conn).unwrap();
    let author = authors.find_all().unwrap().remove(0);

    let err = authors.hard_delete(&author).unwrap_err();
    assert!(err.is_constraint_violation());
    assert!(authors.find_one(&author.id.unwrap()).unwrap().is_some());
}

#[test]
fn hard_types_remove_rows_physically() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteRepository::<Transaction>::try_new(&conn).unwrap();
    assert!(!repo.soft_delete_enabled());

    let saved = repo.save(Transaction::new("Linus", 1_700_000_000_000)).unwrap();
    let id = saved.id.unwrap();
    repo.delete(&id).unwrap();

    let rows: i64 = conn
        .query_row("SELECT COUNT(*) FROM t_transaction;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(rows, 0);
    assert!(repo.delete(&id).unwrap_err().is_not_found());
}

#[test]
fn composite_keys_address_exactly_one_detail_row() {
    let conn = open_db_in_memory().unwrap();
    let (_, seeded) = seed_catalog(&conn);
    let transactions = SqliteRepository::<Transaction>::try_new(&conn).unwrap();
    let details = SqliteRepository::<TransactionDetail>::try_new(&conn).unwrap();

    let transaction_id = transactions
        .save(Transaction::new("Linus", 1_700_000_000_000))
        .unwrap()
        .id
        .unwrap();
    let first_book = seeded[0].id.unwrap();
    let second_book = seeded[1].id.unwrap();
    details
        .save(TransactionDetail::new(transaction_id, first_book, 2, 60))
        .unwrap();
    details
        .save(TransactionDetail::new(transaction_id, second_book, 1, 10))
        .unwrap();

    let key = TransactionDetailId {
        transaction_id,
        book_id: second_book,
    };
    let found = details.find_one(&key).unwrap().unwrap();
    assert_eq!((found.qty, found.price), (1, 10));

    details.delete(&key).unwrap();
    assert!(details.find_one(&key).unwrap().is_none());
    assert_eq!(details.count().unwrap(), 1);
    assert!(details.delete(&key).unwrap_err().is_not_found());
}

#[test]
fn assigned_key_entities_insert_once_then_update() {
    let conn = open_db_in_memory().unwrap();
    let (_, seeded) = seed_catalog(&conn);
    let book_id = seeded[0].id.unwrap();
    let repo = SqliteRepository::<BookDetail>::try_new(&conn).unwrap();

    let mut detail = repo.save(BookDetail::new(book_id, 100, 250)).unwrap();
    detail.page = 120;
    let updated = repo.save(detail).unwrap();
    assert!(updated.audit.updated_at.is_some());

    let stored = repo.find_one(&book_id).unwrap().unwrap();
    assert_eq!(stored.page, 120);
    assert_eq!(repo.count().unwrap(), 1);
}

#[test]
fn delete_entity_without_identity_is_rejected() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteRepository::<Transaction>::try_new(&conn).unwrap();

    let unsaved = Transaction::new("Linus", 0);
    assert!(matches!(
        repo.hard_delete(&unsaved),
        Err(RepoError::MissingIdentity("transaction"))
    ));
}

#[test]
fn try_new_rejects_unmigrated_connection() {
    let conn = Connection::open_in_memory().unwrap();
    let result = SqliteRepository::<Book>::try_new(&conn);
    assert!(matches!(
        result,
        Err(RepoError::UninitializedConnection {
            actual_version: 0,
            ..
        })
    ));
}

#[test]
fn try_new_rejects_missing_table_and_column() {
    let conn = open_db_in_memory().unwrap();
    conn.execute_batch(
        "PRAGMA foreign_keys = OFF;
         DROP TABLE t_transaction_detail;
         ALTER TABLE m_author RENAME COLUMN full_name TO display_name;",
    )
    .unwrap();

    assert!(matches!(
        SqliteRepository::<TransactionDetail>::try_new(&conn),
        Err(RepoError::MissingRequiredTable("t_transaction_detail"))
    ));
    assert!(matches!(
        SqliteRepository::<Author>::try_new(&conn),
        Err(RepoError::MissingRequiredColumn {
            table: "m_author",
            column: "full_name",
        })
    ));
}
