//! Server-held pepper, read once at process start.
//!
//! The pepper must never live in the same database as the user rows it
//! protects. Deployments set `CARELOG_PEPPER` in the environment (or a
//! secret store that exports it); the insecure fallback exists only so
//! development setups run, and it announces itself on every start.

use zeroize::ZeroizeOnDrop;

pub const PEPPER_ENV: &str = "CARELOG_PEPPER";

const INSECURE_DEFAULT: &str = "insecure-dev-pepper-change-before-production";

/// Server-side secret mixed into record-key derivation.
#[derive(Clone, ZeroizeOnDrop)]
pub struct Pepper(String);

impl Pepper {
    /// Explicit pepper, for tests and non-env secret sources.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Read the pepper from `CARELOG_PEPPER`. Falls back to an insecure
    /// development default — loudly.
    pub fn from_env() -> Self {
        match std::env::var(PEPPER_ENV) {
            Ok(value) if !value.is_empty() => Self(value),
            _ => {
                tracing::warn!(
                    env = PEPPER_ENV,
                    "pepper not configured; using INSECURE development default"
                );
                Self(INSECURE_DEFAULT.to_string())
            }
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}
