//! User account rows. The PIN itself is never stored — only its salt and
//! verification hash.

use chrono::Utc;

use cl_crypto::{Salt, VerificationHash};

use crate::db::Store;
use crate::error::StoreError;
use crate::models::UserRow;

pub async fn create_user(
    store: &Store,
    owner_id: &str,
    display_name: &str,
    salt: &Salt,
    hash: &VerificationHash,
    consent: bool,
) -> Result<(), StoreError> {
    if get_user(store, owner_id).await?.is_some() {
        return Err(StoreError::DuplicateOwner(owner_id.to_string()));
    }
    sqlx::query(
        "INSERT INTO users(owner_id, display_name, pin_salt, pin_verification_hash, consent, created_at)
         VALUES (?, ?, ?, ?, ?, ?)",
    )
    .bind(owner_id)
    .bind(display_name)
    .bind(salt.as_str())
    .bind(hash.as_str())
    .bind(consent)
    .bind(Utc::now())
    .execute(&store.pool)
    .await?;
    Ok(())
}

pub async fn get_user(store: &Store, owner_id: &str) -> Result<Option<UserRow>, StoreError> {
    let row = sqlx::query_as::<_, UserRow>(
        "SELECT owner_id, display_name, pin_salt, pin_verification_hash, consent, created_at
         FROM users WHERE owner_id = ?",
    )
    .bind(owner_id)
    .fetch_optional(&store.pool)
    .await?;
    Ok(row)
}
