use thiserror::Error;

/// Client-side failures of the catalog queries. None of them are transient.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum QueryError {
    #[error("unknown month name: {0:?}")]
    InvalidMonth(String),

    #[error("no film title contains {0:?}")]
    TitleNotFound(String),
}
