//! Settings: (owner, name) → value, upsert semantics, no history.
//!
//! The key is structural (two columns), so unscoped names and per-owner
//! names live in disjoint key spaces — no string prefixing, no collisions.

use cl_proto::SettingKey;

use crate::db::Store;
use crate::error::StoreError;

// Global settings use the empty string in the owner column; SQLite treats
// NULLs as distinct in primary keys, which would break upserts.
fn owner_column(key: &SettingKey) -> &str {
    key.owner().unwrap_or("")
}

pub async fn get_setting(store: &Store, key: &SettingKey) -> Result<Option<String>, StoreError> {
    let value = sqlx::query_scalar("SELECT value FROM settings WHERE owner = ? AND name = ?")
        .bind(owner_column(key))
        .bind(key.name())
        .fetch_optional(&store.pool)
        .await?;
    Ok(value)
}

pub async fn set_setting(store: &Store, key: &SettingKey, value: &str) -> Result<(), StoreError> {
    sqlx::query(
        "INSERT INTO settings(owner, name, value) VALUES (?, ?, ?)
         ON CONFLICT(owner, name) DO UPDATE SET value = excluded.value",
    )
    .bind(owner_column(key))
    .bind(key.name())
    .bind(value)
    .execute(&store.pool)
    .await?;
    Ok(())
}
