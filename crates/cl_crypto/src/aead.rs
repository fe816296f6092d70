//! Envelope tokens: authenticated encryption for record payloads.
//!
//! Uses XChaCha20-Poly1305 (192-bit nonce).
//! Key size: 32 bytes.  Nonce: 24 bytes (random).  Tag: 16 bytes.
//!
//! Token format, URL-safe base64 (no padding) of:
//!   [ version (1 byte) | nonce (24 bytes) | ciphertext + tag ]
//!
//! A fresh nonce is drawn on every call, so encrypting the same plaintext
//! twice yields different tokens — ciphertext equality leaks nothing about
//! repeated clinical values.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chacha20poly1305::{
    aead::{Aead, AeadCore, KeyInit, OsRng as AeadOsRng},
    XChaCha20Poly1305,
};
use zeroize::Zeroizing;

use crate::error::CryptoError;

const VERSION: u8 = 1;
const NONCE_LEN: usize = 24;

/// Domain separator for record payload tokens.
pub const AAD_RECORD: &[u8] = b"carelog-record-v1";
/// Domain separator for share bundle tokens. Record tokens and share
/// tokens are not interchangeable even under the same key.
pub const AAD_SHARE: &[u8] = b"carelog-share-v1";

/// Encrypt `plaintext` with a 32-byte key into a self-contained token.
/// `aad` — additional associated data (authenticated but not encrypted).
pub fn encrypt(key: &[u8; 32], plaintext: &[u8], aad: &[u8]) -> Result<String, CryptoError> {
    let cipher =
        XChaCha20Poly1305::new_from_slice(key).map_err(|_| CryptoError::AeadEncrypt)?;

    let nonce = XChaCha20Poly1305::generate_nonce(&mut AeadOsRng);

    let ciphertext = cipher
        .encrypt(&nonce, chacha20poly1305::aead::Payload { msg: plaintext, aad })
        .map_err(|_| CryptoError::AeadEncrypt)?;

    let mut out = Vec::with_capacity(1 + NONCE_LEN + ciphertext.len());
    out.push(VERSION);
    out.extend_from_slice(&nonce);
    out.extend_from_slice(&ciphertext);
    Ok(URL_SAFE_NO_PAD.encode(out))
}

/// Decrypt a token produced by [`encrypt`].
///
/// Any malformation — bad encoding, unknown version, truncation, tag
/// mismatch, wrong key — is the single opaque [`CryptoError::Authentication`]
/// so callers cannot distinguish tampering modes.
pub fn decrypt(key: &[u8; 32], token: &str, aad: &[u8]) -> Result<Zeroizing<Vec<u8>>, CryptoError> {
    let data = URL_SAFE_NO_PAD
        .decode(token)
        .map_err(|_| CryptoError::Authentication)?;
    if data.len() < 1 + NONCE_LEN || data[0] != VERSION {
        return Err(CryptoError::Authentication);
    }
    let (nonce_bytes, ct) = data[1..].split_at(NONCE_LEN);
    let nonce = chacha20poly1305::XNonce::from_slice(nonce_bytes);

    let cipher =
        XChaCha20Poly1305::new_from_slice(key).map_err(|_| CryptoError::Authentication)?;

    let plaintext = cipher
        .decrypt(nonce, chacha20poly1305::aead::Payload { msg: ct, aad })
        .map_err(|_| CryptoError::Authentication)?;

    Ok(Zeroizing::new(plaintext))
}
