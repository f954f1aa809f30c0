use thiserror::Error;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("catalog file is corrupted")]
    Corrupted,

    #[error("catalog connection lock poisoned")]
    LockPoisoned,

    #[error("malformed column data: {0}")]
    Malformed(String),
}
