//! cl_store — Owner-scoped encrypted storage for Carelog
//!
//! # Encryption strategy
//! SQLite does NOT natively encrypt.  We use application-level encryption:
//! - Record payloads are stored as XChaCha20-Poly1305 envelope tokens,
//!   keyed by the session key derived from (PIN, salt, server pepper).
//! - Cleartext metadata (owner, record type, recorded-at timestamp) stays
//!   queryable so filtering and sorting never require decryption.
//! - Isolation between owners is structural: every read, write and delete
//!   is scoped by the owner column, never by locking.
//!
//! # Migration
//! SQLx migrations in `migrations/` run on open, followed by an idempotent
//! code-level backfill that upgrades legacy single-tenant databases
//! (see `migrations::backfill_owner_column`).

pub mod db;
pub mod error;
pub mod migrations;
pub mod models;
pub mod records;
pub mod session;
pub mod settings;
pub mod users;

pub use db::Store;
pub use error::StoreError;
pub use session::Session;
