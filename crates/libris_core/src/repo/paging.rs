//! Sorting and paging request/response types.

use crate::repo::entity::Entity;
use crate::repo::entity_repo::{RepoError, RepoResult};

/// Sort direction for one ordered column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Asc,
    Desc,
}

impl Direction {
    fn as_sql(self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

/// One `ORDER BY` term.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    pub column: String,
    pub direction: Direction,
}

/// Caller-supplied ordering, applied in declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Sort {
    orders: Vec<Order>,
}

impl Sort {
    /// No caller ordering; the repository falls back to key order.
    pub fn unsorted() -> Self {
        Self::default()
    }

    pub fn asc(column: impl Into<String>) -> Self {
        Self::unsorted().then_asc(column)
    }

    pub fn desc(column: impl Into<String>) -> Self {
        Self::unsorted().then_desc(column)
    }

    pub fn then_asc(mut self, column: impl Into<String>) -> Self {
        self.orders.push(Order {
            column: column.into(),
            direction: Direction::Asc,
        });
        self
    }

    pub fn then_desc(mut self, column: impl Into<String>) -> Self {
        self.orders.push(Order {
            column: column.into(),
            direction: Direction::Desc,
        });
        self
    }

    pub fn orders(&self) -> &[Order] {
        &self.orders
    }

    pub fn is_unsorted(&self) -> bool {
        self.orders.is_empty()
    }

    /// ` ORDER BY ...` for `E`, always ending with the key columns so that
    /// identical queries return identical sequences.
    pub(crate) fn order_clause<E: Entity>(&self) -> RepoResult<String> {
        let mut terms = Vec::with_capacity(self.orders.len() + E::KEY_COLUMNS.len());
        for order in &self.orders {
            if !E::is_known_column(&order.column) {
                return Err(RepoError::UnknownColumn {
                    entity: E::NAME,
                    column: order.column.clone(),
                });
            }
            terms.push(format!("{} {}", order.column, order.direction.as_sql()));
        }
        for column in E::KEY_COLUMNS {
            if !self.orders.iter().any(|order| order.column == *column) {
                terms.push(format!("{column} ASC"));
            }
        }
        Ok(format!(" ORDER BY {}", terms.join(", ")))
    }
}

/// Zero-based page window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub size: u32,
    pub sort: Sort,
}

impl PageRequest {
    /// Creates a page request; `size` must be at least one.
    pub fn of(page: u32, size: u32) -> RepoResult<Self> {
        if size == 0 {
            return Err(RepoError::InvalidPageRequest(
                "page size must be at least 1".to_string(),
            ));
        }
        Ok(Self {
            page,
            size,
            sort: Sort::unsorted(),
        })
    }

    pub fn with_sort(mut self, sort: Sort) -> Self {
        self.sort = sort;
        self
    }

    pub fn offset(&self) -> u64 {
        u64::from(self.page) * u64::from(self.size)
    }
}

/// One page of results plus the total number of visible rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    pub content: Vec<T>,
    pub page: u32,
    pub size: u32,
    pub total_elements: u64,
}

impl<T> Page<T> {
    pub fn total_pages(&self) -> u64 {
        self.total_elements.div_ceil(u64::from(self.size.max(1)))
    }

    pub fn has_next(&self) -> bool {
        u64::from(self.page) + 1 < self.total_pages()
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }
}
