//! Share bundles: one-shot, time-boxed, self-decrypting exports.
//!
//! A bundle is built from already-decrypted data, re-encrypted under a
//! fresh random key with no relation to any PIN-derived key. Key and token
//! are returned as two separate values intended for two separate channels;
//! intercepting one alone is useless.
//!
//! Expiry is enforced by the READER, not the cipher: a valid key/token pair
//! still decrypts after `expires_at`, and this layer refuses to honor it.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use cl_crypto::aead::{self, AAD_SHARE};
use cl_crypto::OneTimeKey;

use crate::error::ProtoError;

#[derive(Serialize, Deserialize)]
struct ShareEnvelope {
    expires_at: DateTime<Utc>,
    data: serde_json::Value,
}

/// Encrypt `data` under a fresh one-time key, valid for `valid_hours`.
/// Returns the key and the token as two independent artifacts.
pub fn build_share_bundle(
    data: &serde_json::Value,
    valid_hours: i64,
) -> Result<(OneTimeKey, String), ProtoError> {
    let envelope = ShareEnvelope {
        expires_at: Utc::now() + Duration::hours(valid_hours),
        data: data.clone(),
    };
    let plaintext = serde_json::to_vec(&envelope)?;

    let key = OneTimeKey::generate();
    let token = aead::encrypt(&key.0, &plaintext, AAD_SHARE)?;
    Ok((key, token))
}

/// Decrypt and validate a share bundle against the current clock.
pub fn open_share_bundle(token: &str, key: &OneTimeKey) -> Result<serde_json::Value, ProtoError> {
    open_share_bundle_at(token, key, Utc::now())
}

/// Clock-injected variant of [`open_share_bundle`].
///
/// Fails with `Crypto(Authentication)` on a wrong/corrupted key or token,
/// and with `Expired` when `now` is past the embedded expiry.
pub fn open_share_bundle_at(
    token: &str,
    key: &OneTimeKey,
    now: DateTime<Utc>,
) -> Result<serde_json::Value, ProtoError> {
    let plaintext = aead::decrypt(&key.0, token, AAD_SHARE)?;
    let envelope: ShareEnvelope = serde_json::from_slice(&plaintext)?;
    if now > envelope.expires_at {
        return Err(ProtoError::Expired { expires_at: envelope.expires_at });
    }
    Ok(envelope.data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use cl_crypto::CryptoError;
    use serde_json::json;

    #[test]
    fn bundle_roundtrip_before_expiry() {
        let data = json!({ "x": 1 });
        let (key, token) = build_share_bundle(&data, 1).unwrap();
        assert_eq!(open_share_bundle(&token, &key).unwrap(), data);
    }

    #[test]
    fn bundle_rejected_after_expiry_even_with_correct_key() {
        let (key, token) = build_share_bundle(&json!({ "x": 1 }), 1).unwrap();
        let later = Utc::now() + Duration::hours(2);
        assert!(matches!(
            open_share_bundle_at(&token, &key, later),
            Err(ProtoError::Expired { .. })
        ));
    }

    #[test]
    fn wrong_key_is_authentication_failure() {
        let (_key, token) = build_share_bundle(&json!({ "x": 1 }), 1).unwrap();
        let other = OneTimeKey::generate();
        assert!(matches!(
            open_share_bundle(&token, &other),
            Err(ProtoError::Crypto(CryptoError::Authentication))
        ));
    }

    #[test]
    fn keys_are_unique_per_export() {
        let (k1, _) = build_share_bundle(&json!({}), 1).unwrap();
        let (k2, _) = build_share_bundle(&json!({}), 1).unwrap();
        assert_ne!(k1.0, k2.0);
    }

    #[test]
    fn key_survives_out_of_band_encoding() {
        let data = json!({ "glucose": [{ "value_mg_dl": 90 }] });
        let (key, token) = build_share_bundle(&data, 24).unwrap();
        let transported = OneTimeKey::from_encoded(&key.encoded()).unwrap();
        assert_eq!(open_share_bundle(&token, &transported).unwrap(), data);
    }
}
