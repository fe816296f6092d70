//! Owner-scoped CRUD over encrypted record payloads.
//!
//! Plaintext exists only inside these calls: `save` encrypts before
//! touching the database, `load` decrypts on the way out. The identity of
//! a record is the uniqueness tuple (owner, record_type, recorded_at) —
//! one measurement per timestamp per type per patient.

use chrono::{DateTime, Utc};

use cl_crypto::aead::{self, AAD_RECORD};
use cl_proto::record::{Payload, Record, RecordType};

use crate::db::Store;
use crate::error::StoreError;
use crate::models::RecordRow;
use crate::session::Session;

/// Insert a new record (`record_id` = None) or update one in place.
///
/// The duplicate pre-check runs first so callers get a precise
/// [`StoreError::Duplicate`] instead of a low-level constraint violation;
/// the unique index remains as the backstop. Updates are scoped to the
/// session owner — an id belonging to someone else is `NotFound`.
pub async fn save(
    store: &Store,
    session: &Session,
    record_type: &RecordType,
    recorded_at: DateTime<Utc>,
    payload: &Payload,
    record_id: Option<i64>,
) -> Result<i64, StoreError> {
    if has_duplicate(store, session.owner(), record_type, recorded_at, record_id).await? {
        return Err(StoreError::Duplicate {
            record_type: record_type.to_string(),
            recorded_at,
        });
    }

    let plaintext = serde_json::to_vec(payload)?;
    let token = aead::encrypt(session.key(), &plaintext, AAD_RECORD)?;
    let now = Utc::now();

    match record_id {
        None => {
            let result = sqlx::query(
                "INSERT INTO records(owner, record_type, recorded_at, payload_ciphertext, created_at, updated_at)
                 VALUES (?, ?, ?, ?, ?, ?)",
            )
            .bind(session.owner())
            .bind(record_type.as_str())
            .bind(recorded_at)
            .bind(&token)
            .bind(now)
            .bind(now)
            .execute(&store.pool)
            .await?;
            Ok(result.last_insert_rowid())
        }
        Some(id) => {
            let result = sqlx::query(
                "UPDATE records
                 SET record_type = ?, recorded_at = ?, payload_ciphertext = ?, updated_at = ?
                 WHERE id = ? AND owner = ?",
            )
            .bind(record_type.as_str())
            .bind(recorded_at)
            .bind(&token)
            .bind(now)
            .bind(id)
            .bind(session.owner())
            .execute(&store.pool)
            .await?;
            if result.rows_affected() == 0 {
                return Err(StoreError::NotFound(format!(
                    "record {id} for owner {}",
                    session.owner()
                )));
            }
            Ok(id)
        }
    }
}

/// True when another row already occupies (owner, record_type, recorded_at).
/// `exclude_id` skips the row being edited so an unchanged triple passes.
pub async fn has_duplicate(
    store: &Store,
    owner: &str,
    record_type: &RecordType,
    recorded_at: DateTime<Utc>,
    exclude_id: Option<i64>,
) -> Result<bool, StoreError> {
    let found: Option<i64> = match exclude_id {
        Some(id) => {
            sqlx::query_scalar(
                "SELECT id FROM records
                 WHERE owner = ? AND record_type = ? AND recorded_at = ? AND id != ?",
            )
            .bind(owner)
            .bind(record_type.as_str())
            .bind(recorded_at)
            .bind(id)
            .fetch_optional(&store.pool)
            .await?
        }
        None => {
            sqlx::query_scalar(
                "SELECT id FROM records WHERE owner = ? AND record_type = ? AND recorded_at = ?",
            )
            .bind(owner)
            .bind(record_type.as_str())
            .bind(recorded_at)
            .fetch_optional(&store.pool)
            .await?
        }
    };
    Ok(found.is_some())
}

/// Load all of one owner's records, optionally filtered by type, newest
/// recorded_at first, decrypted.
///
/// A decryption failure on ANY row aborts the whole call: it means either
/// a key mismatch or corrupted ciphertext, and silently dropping clinical
/// rows would mask data loss as "no records".
pub async fn load(
    store: &Store,
    session: &Session,
    record_type: Option<&RecordType>,
) -> Result<Vec<Record>, StoreError> {
    let rows: Vec<RecordRow> = match record_type {
        Some(t) => {
            sqlx::query_as(
                "SELECT id, owner, record_type, recorded_at, payload_ciphertext, created_at, updated_at
                 FROM records WHERE owner = ? AND record_type = ?
                 ORDER BY recorded_at DESC",
            )
            .bind(session.owner())
            .bind(t.as_str())
            .fetch_all(&store.pool)
            .await?
        }
        None => {
            sqlx::query_as(
                "SELECT id, owner, record_type, recorded_at, payload_ciphertext, created_at, updated_at
                 FROM records WHERE owner = ?
                 ORDER BY recorded_at DESC",
            )
            .bind(session.owner())
            .fetch_all(&store.pool)
            .await?
        }
    };

    rows.into_iter().map(|row| decrypt_row(session, row)).collect()
}

fn decrypt_row(session: &Session, row: RecordRow) -> Result<Record, StoreError> {
    let plaintext = aead::decrypt(session.key(), &row.payload_ciphertext, AAD_RECORD)?;
    let payload: Payload = serde_json::from_slice(&plaintext)?;
    Ok(Record {
        id: row.id,
        owner: row.owner,
        record_type: RecordType::from(row.record_type.as_str()),
        recorded_at: row.recorded_at,
        payload,
    })
}

/// Delete a record by id. With `owner` supplied, a row belonging to a
/// different owner is left untouched — defense against cross-owner deletion
/// even when the caller's own scoping has a bug. Returns whether a row was
/// removed.
pub async fn delete(
    store: &Store,
    record_id: i64,
    owner: Option<&str>,
) -> Result<bool, StoreError> {
    let result = match owner {
        Some(o) => {
            sqlx::query("DELETE FROM records WHERE id = ? AND owner = ?")
                .bind(record_id)
                .bind(o)
                .execute(&store.pool)
                .await?
        }
        None => {
            sqlx::query("DELETE FROM records WHERE id = ?")
                .bind(record_id)
                .execute(&store.pool)
                .await?
        }
    };
    Ok(result.rows_affected() > 0)
}
