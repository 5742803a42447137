//! Database error types.

use thiserror::Error;

/// Errors that can occur when using the record store.
#[derive(Error, Debug)]
pub enum DbError {
    /// A record that was expected to exist is missing.
    #[error("Record not found in {table}: {key}")]
    NotFound { table: &'static str, key: String },

    /// Insert collided with an existing key.
    #[error("Duplicate key in {table}: {key}")]
    Duplicate { table: &'static str, key: String },

    /// A compare-and-set lost against a concurrent writer.
    #[error("Concurrent modification: {0}")]
    Conflict(String),

    /// The backing store refused or failed the operation.
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    /// Failed to (de)serialize a snapshot.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
