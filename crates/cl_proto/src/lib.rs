//! cl_proto — Carelog domain types and serialisation
//!
//! # Module layout
//! - `record`     — record types and the decrypted record shape
//! - `settings`   — structural two-part setting keys (owner + name)
//! - `share`      — one-shot, time-boxed, self-decrypting share bundles
//! - `validation` — user-input checks (PIN shape, glucose ranges)
//! - `analytics`  — glucose summaries and the merged report timeline
//! - `error`      — unified error type

pub mod analytics;
pub mod error;
pub mod record;
pub mod settings;
pub mod share;
pub mod validation;

pub use error::ProtoError;
pub use record::{Record, RecordType};
pub use settings::SettingKey;
