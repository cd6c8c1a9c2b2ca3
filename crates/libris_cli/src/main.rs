//! CLI smoke entry point.
//!
//! # Responsibility
//! - Open a store from `LIBRIS_*` environment settings.
//! - Run a short catalog scenario and print what the repository reports.

use libris_core::{
    init_logging, open_store, Author, AuthorRequest, AuthorService, Book,
    BookRequest, BookService, LibrisConfig, Repository, SqliteRepository,
    TransactionDetailRequest, TransactionRequest, TransactionService,
};
use log::error;
use std::error::Error;
use std::process::ExitCode;

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("event=cli_run module=cli status=error error={err}");
            eprintln!("libris: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), Box<dyn Error>> {
    let config = LibrisConfig::from_env()?;
    if let Some(log_dir) = config.log_dir.as_deref() {
        init_logging(config.log_level, log_dir)?;
    }

    let mut conn = open_store(&config.store_location())?;

    println!("libris_core version={}", libris_core::core_version());

    let authors = AuthorService::new(SqliteRepository::<Author>::try_new(&conn)?);
    let author = authors.save(&AuthorRequest {
        full_name: "Ursula K. Le Guin".to_string(),
    })?;
    let author_id = author.id.ok_or("author id was not generated")?;

    let mut books = BookService::new(&mut conn);
    let earthsea = books.add_book(&BookRequest {
        author_id,
        title: "A Wizard of Earthsea".to_string(),
        price: 100,
        page: 183,
        weight: 250,
    })?;
    let dispossessed = books.add_book(&BookRequest {
        author_id,
        title: "The Dispossessed".to_string(),
        price: 50,
        page: 387,
        weight: 410,
    })?;
    let earthsea_id = earthsea.book.id.ok_or("book id was not generated")?;
    let dispossessed_id = dispossessed.book.id.ok_or("book id was not generated")?;

    let receipt = TransactionService::new(&mut conn).create_transaction(&TransactionRequest {
        customer_name: "Genly Ai".to_string(),
        details: vec![
            TransactionDetailRequest {
                book_id: earthsea_id,
                qty: 2,
            },
            TransactionDetailRequest {
                book_id: dispossessed_id,
                qty: 1,
            },
        ],
    })?;
    println!(
        "transaction total_price={} total_qty={}",
        receipt.transaction.total_price, receipt.transaction.total_qty
    );

    BookService::new(&mut conn).delete_book(earthsea_id)?;
    let visible = SqliteRepository::<Book>::try_new(&conn)?.find_all()?;
    println!(
        "visible books after delete={}",
        visible
            .iter()
            .map(|book| book.title.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    );

    Ok(())
}
