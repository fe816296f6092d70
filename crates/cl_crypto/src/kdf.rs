//! Key derivation for PIN-protected record stores.
//!
//! Two deliberately separate derivations, both PBKDF2-HMAC-SHA256:
//!
//! `derive_verification_hash` — stored at account creation and checked at
//!   login. Never used as an encryption key, so a leaked users table does
//!   not help decrypt anything.
//!
//! `derive_encryption_key` — mixes the server-held pepper into the secret
//!   and runs a higher iteration count, producing the 32-byte key the
//!   envelope cipher uses. Never stored anywhere; re-derived per session.
//!
//! Each account gets exactly one salt, generated once and never rotated —
//! rotation would make previously written ciphertext underivable.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use pbkdf2::pbkdf2_hmac;
use sha2::Sha256;
use subtle::ConstantTimeEq;
use zeroize::{Zeroizing, ZeroizeOnDrop};

use crate::error::CryptoError;

/// Iterations for the stored login-verification hash.
pub const VERIFY_ITERATIONS: u32 = 200_000;
/// Iterations for the record-encryption key. Intentionally different from
/// [`VERIFY_ITERATIONS`] so the two outputs are unrelated even before the
/// pepper is mixed in.
pub const KEY_ITERATIONS: u32 = 250_000;

const SALT_LEN: usize = 16;
const KEY_LEN: usize = 32;

/// Printable (URL-safe base64) random salt. Stored next to the account row;
/// not secret.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Salt(String);

impl Salt {
    /// Generate a fresh 16-byte salt. Call once at account creation.
    pub fn generate() -> Self {
        use rand::RngCore;
        let mut raw = [0u8; SALT_LEN];
        rand::rngs::OsRng.fill_bytes(&mut raw);
        Self(URL_SAFE_NO_PAD.encode(raw))
    }

    /// Rehydrate a salt that was read back from storage.
    /// Malformed input is a configuration error, not a user error.
    pub fn from_encoded(encoded: &str) -> Result<Self, CryptoError> {
        let salt = Self(encoded.to_string());
        salt.decode()?;
        Ok(salt)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn decode(&self) -> Result<[u8; SALT_LEN], CryptoError> {
        let raw = URL_SAFE_NO_PAD
            .decode(&self.0)
            .map_err(|e| CryptoError::InvalidSalt(e.to_string()))?;
        raw.try_into()
            .map_err(|_| CryptoError::InvalidSalt("wrong salt length".into()))
    }
}

/// Stored PIN-verification artifact (URL-safe base64 of the PBKDF2 output).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerificationHash(String);

impl VerificationHash {
    pub fn from_encoded(encoded: &str) -> Self {
        Self(encoded.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// 32-byte record-encryption key. Lives only in memory for the duration of
/// a session; zeroized on drop, no Debug, no encoding.
#[derive(ZeroizeOnDrop)]
pub struct RecordKey(pub [u8; KEY_LEN]);

/// Ephemeral 32-byte key for share bundles. Unrelated to any PIN-derived
/// key; the printable form travels out-of-band, separately from the token.
#[derive(ZeroizeOnDrop)]
pub struct OneTimeKey(pub [u8; KEY_LEN]);

impl OneTimeKey {
    pub fn generate() -> Self {
        use rand::RngCore;
        let mut raw = [0u8; KEY_LEN];
        rand::rngs::OsRng.fill_bytes(&mut raw);
        Self(raw)
    }

    /// Printable form for out-of-band transmission.
    pub fn encoded(&self) -> String {
        URL_SAFE_NO_PAD.encode(self.0)
    }

    pub fn from_encoded(encoded: &str) -> Result<Self, CryptoError> {
        let raw = URL_SAFE_NO_PAD
            .decode(encoded)
            .map_err(|e| CryptoError::InvalidKey(e.to_string()))?;
        let raw: [u8; KEY_LEN] = raw
            .try_into()
            .map_err(|_| CryptoError::InvalidKey("wrong key length".into()))?;
        Ok(Self(raw))
    }
}

/// Derive the stored login-verification hash from a PIN and salt.
/// Deterministic: same inputs always produce the same hash.
pub fn derive_verification_hash(secret: &str, salt: &Salt) -> Result<VerificationHash, CryptoError> {
    let salt_raw = salt.decode()?;
    let mut out = [0u8; KEY_LEN];
    pbkdf2_hmac::<Sha256>(secret.as_bytes(), &salt_raw, VERIFY_ITERATIONS, &mut out);
    Ok(VerificationHash(URL_SAFE_NO_PAD.encode(out)))
}

/// Check a PIN against the stored verification hash.
/// A wrong PIN is `Ok(false)` — expected, user-facing. A malformed salt is
/// an error.
pub fn verify(secret: &str, salt: &Salt, expected: &VerificationHash) -> Result<bool, CryptoError> {
    let derived = derive_verification_hash(secret, salt)?;
    Ok(derived
        .as_str()
        .as_bytes()
        .ct_eq(expected.as_str().as_bytes())
        .into())
}

/// Derive the record-encryption key from (PIN, salt, pepper).
///
/// The pepper is held outside the user database, so a leak of salts +
/// verification hashes + ciphertext alone is not enough to decrypt records.
pub fn derive_encryption_key(
    secret: &str,
    salt: &Salt,
    pepper: &crate::pepper::Pepper,
) -> Result<RecordKey, CryptoError> {
    let salt_raw = salt.decode()?;
    let mut material = Zeroizing::new(Vec::with_capacity(secret.len() + pepper.as_str().len()));
    material.extend_from_slice(secret.as_bytes());
    material.extend_from_slice(pepper.as_str().as_bytes());

    let mut key = [0u8; KEY_LEN];
    pbkdf2_hmac::<Sha256>(&material, &salt_raw, KEY_ITERATIONS, &mut key);
    Ok(RecordKey(key))
}
