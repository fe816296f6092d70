//! Setting keys: an explicit two-part (owner, name) identifier.
//!
//! Keys are compared structurally, never by string concatenation, so a
//! crafted unscoped name can never collide with another owner's scoped one.

use serde::{Deserialize, Serialize};

/// Per-owner target ranges, JSON-encoded (`target_low`, `target_high`,
/// `hypo`, `hyper`).
pub const SETTING_DOCTOR_TARGETS: &str = "doctor_targets";
/// Per-owner reminder configuration (`glucose_time`, `hba1c_day`).
pub const SETTING_REMINDERS: &str = "reminders";
/// Per-owner medication list, JSON array.
pub const SETTING_MEDICATIONS: &str = "medications";
pub const SETTING_AGE: &str = "age";

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SettingKey {
    owner: Option<String>,
    name: String,
}

impl SettingKey {
    /// A key not tied to any owner (application-wide configuration).
    pub fn global(name: impl Into<String>) -> Self {
        Self { owner: None, name: name.into() }
    }

    /// A key scoped to one owner's account.
    pub fn owned(owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self { owner: Some(owner.into()), name: name.into() }
    }

    pub fn owner(&self) -> Option<&str> {
        self.owner.as_deref()
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}
