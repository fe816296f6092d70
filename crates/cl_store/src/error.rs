use chrono::{DateTime, Utc};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(String),

    #[error("Crypto error: {0}")]
    Crypto(#[from] cl_crypto::CryptoError),

    #[error("Protocol error: {0}")]
    Proto(#[from] cl_proto::ProtoError),

    #[error("Serialisation error: {0}")]
    Serialisation(#[from] serde_json::Error),

    #[error("Authentication failed: incorrect PIN")]
    IncorrectPin,

    #[error("Account already exists: {0}")]
    DuplicateOwner(String),

    #[error("Duplicate record: a {record_type} entry already exists at {recorded_at}")]
    Duplicate {
        record_type: String,
        recorded_at: DateTime<Utc>,
    },

    #[error("Record not found: {0}")]
    NotFound(String),
}
