//! Authenticated session context.
//!
//! The record-encryption key exists only inside a [`Session`] value, which
//! is passed explicitly to every record operation — there is no ambient or
//! global key state. Dropping the session (logout) zeroizes the key; a lost
//! PIN therefore means permanent loss of that owner's data, by design.

use cl_crypto::kdf;
use cl_crypto::{CryptoError, Pepper, RecordKey, Salt, VerificationHash};
use cl_proto::validation::validate_pin;

use crate::db::Store;
use crate::error::StoreError;
use crate::users;

/// Owner identifiers are case-normalized patient codes.
pub fn normalize_owner_id(raw: &str) -> String {
    raw.trim().to_uppercase()
}

/// One authenticated owner and their in-memory record key.
pub struct Session {
    owner: String,
    key: RecordKey,
}

impl Session {
    /// Assemble a session from an externally derived key. Normal flows use
    /// [`login`] / [`register`]; this exists for callers that manage key
    /// derivation themselves (and for tests).
    pub fn new(owner: impl Into<String>, key: RecordKey) -> Self {
        Self { owner: owner.into(), key }
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub(crate) fn key(&self) -> &[u8; 32] {
        &self.key.0
    }
}

/// Create an account and return a live session for it.
///
/// Generates the one-and-only salt for the account, stores the PIN
/// verification hash, and derives the record key.
pub async fn register(
    store: &Store,
    owner_id: &str,
    display_name: &str,
    pin: &str,
    consent: bool,
    pepper: &Pepper,
) -> Result<Session, StoreError> {
    validate_pin(pin)?;
    let owner = normalize_owner_id(owner_id);
    let salt = Salt::generate();

    let (hash, key) = run_kdf({
        let pin = pin.to_string();
        let salt = salt.clone();
        let pepper = pepper.clone();
        move || {
            let hash = kdf::derive_verification_hash(&pin, &salt)?;
            let key = kdf::derive_encryption_key(&pin, &salt, &pepper)?;
            Ok((hash, key))
        }
    })
    .await?;

    let name = if display_name.trim().is_empty() { owner.clone() } else { display_name.trim().to_string() };
    users::create_user(store, &owner, &name, &salt, &hash, consent).await?;

    Ok(Session { owner, key })
}

/// Verify an owner's PIN and derive their record key.
///
/// An unknown owner is `NotFound`; a wrong PIN is `IncorrectPin`. Both are
/// expected, user-facing outcomes.
pub async fn login(
    store: &Store,
    owner_id: &str,
    pin: &str,
    pepper: &Pepper,
) -> Result<Session, StoreError> {
    let owner = normalize_owner_id(owner_id);
    let user = users::get_user(store, &owner)
        .await?
        .ok_or_else(|| StoreError::NotFound(format!("no account for {owner}")))?;

    let salt = Salt::from_encoded(&user.pin_salt)?;
    let expected = VerificationHash::from_encoded(&user.pin_verification_hash);

    let key = run_kdf({
        let pin = pin.to_string();
        let pepper = pepper.clone();
        move || {
            if !kdf::verify(&pin, &salt, &expected)? {
                return Ok(None);
            }
            kdf::derive_encryption_key(&pin, &salt, &pepper).map(Some)
        }
    })
    .await?
    .ok_or(StoreError::IncorrectPin)?;

    Ok(Session { owner, key })
}

/// PBKDF2 is deliberately slow (hundreds of milliseconds); run it on the
/// blocking pool so unrelated sessions are not starved.
async fn run_kdf<T, F>(f: F) -> Result<T, StoreError>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T, CryptoError> + Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| StoreError::Crypto(CryptoError::KeyDerivation(e.to_string())))?
        .map_err(StoreError::from)
}
