//! Database row models — these map to/from SQL rows.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct UserRow {
    /// Case-normalized patient code. Globally unique.
    pub owner_id: String,
    pub display_name: String,
    /// URL-safe base64, 16 bytes decoded. Generated once, never rotated.
    pub pin_salt: String,
    /// PBKDF2 verification hash. Useless for decrypting records.
    pub pin_verification_hash: String,
    pub consent: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct RecordRow {
    pub id: i64,
    pub owner: String,
    pub record_type: String,
    pub recorded_at: DateTime<Utc>,
    /// Envelope token (version | nonce | ct+tag, base64).
    pub payload_ciphertext: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct SettingRow {
    /// Empty string for global (unowned) settings.
    pub owner: String,
    pub name: String,
    pub value: String,
}
