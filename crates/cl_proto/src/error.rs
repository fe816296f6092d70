use chrono::{DateTime, Utc};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProtoError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Share bundle expired at {expires_at}")]
    Expired { expires_at: DateTime<Utc> },

    #[error("Crypto error: {0}")]
    Crypto(#[from] cl_crypto::CryptoError),

    #[error("Serialisation error: {0}")]
    Serialisation(#[from] serde_json::Error),
}
