//! cl_crypto — Carelog cryptographic primitives
//!
//! # Design principles
//! - NO custom crypto; all primitives come from audited Rust crates.
//! - Zeroize all secret material on drop.
//! - Public APIs return opaque newtypes to prevent accidental misuse.
//!
//! # Module layout
//! - `kdf`    — PBKDF2-HMAC-SHA256 derivation: PIN verification hashes and
//!              record-encryption keys (pepper-mixed), plus salt generation
//! - `aead`   — XChaCha20-Poly1305 envelope tokens (encrypt/decrypt helpers)
//! - `pepper` — server-held pepper loaded from the environment
//! - `error`  — unified error type

pub mod aead;
pub mod error;
pub mod kdf;
pub mod pepper;

pub use error::CryptoError;
pub use kdf::{OneTimeKey, RecordKey, Salt, VerificationHash};
pub use pepper::Pepper;
