//! Read-only film catalog: dataset store, TF-IDF title index and
//! similarity ranking behind a single immutable [`Catalog`].

use time::Date;

pub mod catalog;
pub mod dataset;
pub mod error;
pub mod index;
pub mod loader;
pub mod month;
pub mod ranker;
pub mod tokenizer;

pub use catalog::{Catalog, DEFAULT_RECOMMENDATIONS};
pub use error::QueryError;

/// Position of a record in the loaded dataset. Stable for the process lifetime.
pub type RowIndex = usize;
/// Column of a term in the vocabulary.
pub type TermId = u32;

#[derive(Debug, Clone, PartialEq)]
pub struct FilmRecord {
    pub title: String,
    /// Missing or unparseable dates are kept as `None` and never counted by month.
    pub release_date: Option<Date>,
    pub vote_average: f64,
}

impl FilmRecord {
    pub fn new(title: impl Into<String>, release_date: Option<Date>, vote_average: f64) -> Self {
        Self { title: title.into(), release_date, vote_average }
    }
}
