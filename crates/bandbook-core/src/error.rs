use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: String },

    /// A write lost a race with another writer, or the key already exists.
    #[error("conflict: {entity} with id {id} was modified concurrently or already exists")]
    Conflict { entity: &'static str, id: String },

    #[error("invalid data: {0}")]
    InvalidData(String),

    #[error("forbidden: {0}")]
    Forbidden(String),
}

pub type Result<T> = std::result::Result<T, Error>;
