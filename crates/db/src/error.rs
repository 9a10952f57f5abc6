//! Typed error type for the db crate.
//!
//! Note that a missing row is *not* an error anywhere in this crate: reads
//! return `Option`, updates and deletes return `bool`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DbError {
    #[error("sqlx error: {0}")]
    Sqlx(#[from] sqlx::Error),

    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("missing required environment variable {0}")]
    MissingEnv(&'static str),

    #[error("invalid value for {var}: {message}")]
    InvalidConfig { var: &'static str, message: String },

    /// A dynamic update mapping carried a known field whose JSON value does
    /// not deserialize into the column's type.
    #[error("invalid value for field '{field}': {source}")]
    InvalidFieldValue {
        field: String,
        #[source]
        source: serde_json::Error,
    },
}
