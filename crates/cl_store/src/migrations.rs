//! Code-level schema upgrades that sqlx migrations cannot express.
//!
//! Early single-tenant deployments had a `records` table with no owner
//! column. The upgrade is a non-destructive backfill: add the column with a
//! sentinel default for pre-existing rows, never rewriting or dropping any
//! ciphertext. Guarded by a capability check (does the column exist?), so
//! it runs once and is a no-op forever after.

use sqlx::SqlitePool;

use crate::error::StoreError;

/// Sentinel owner assigned to rows that predate owner scoping.
pub const LEGACY_OWNER: &str = "legacy";

pub async fn backfill_owner_column(pool: &SqlitePool) -> Result<(), StoreError> {
    let columns: Vec<String> =
        sqlx::query_scalar("SELECT name FROM pragma_table_info('records')")
            .fetch_all(pool)
            .await?;

    if !columns.iter().any(|c| c == "owner") {
        tracing::info!(
            sentinel = LEGACY_OWNER,
            "records table predates owner scoping; backfilling owner column"
        );
        sqlx::query("ALTER TABLE records ADD COLUMN owner TEXT NOT NULL DEFAULT 'legacy'")
            .execute(pool)
            .await?;
    }

    // Created here, not in the SQL migrations: on a legacy database the
    // owner column does not exist until the ALTER above has run.
    sqlx::query(
        "CREATE UNIQUE INDEX IF NOT EXISTS idx_records_owner_type_time
         ON records(owner, record_type, recorded_at)",
    )
    .execute(pool)
    .await?;

    Ok(())
}
