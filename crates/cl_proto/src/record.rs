//! Record types and the decrypted, consumer-facing record shape.
//!
//! `record_type` and `recorded_at` stay in cleartext in storage so rows can
//! be filtered and sorted without decryption; the structured payload fields
//! (measurement values, notes, context) only ever exist in plaintext inside
//! an authenticated session.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Kind of clinical record. Open for extension: unknown strings round-trip
/// through `Other` instead of failing, so newer clients can add types
/// without breaking older readers' metadata handling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RecordType {
    Glucose,
    Hba1c,
    Event,
    Other(String),
}

impl RecordType {
    pub fn as_str(&self) -> &str {
        match self {
            RecordType::Glucose => "glucose",
            RecordType::Hba1c => "hba1c",
            RecordType::Event => "event",
            RecordType::Other(s) => s,
        }
    }
}

impl From<&str> for RecordType {
    fn from(s: &str) -> Self {
        match s {
            "glucose" => RecordType::Glucose,
            "hba1c" => RecordType::Hba1c,
            "event" => RecordType::Event,
            other => RecordType::Other(other.to_string()),
        }
    }
}

impl From<String> for RecordType {
    fn from(s: String) -> Self {
        RecordType::from(s.as_str())
    }
}

impl From<RecordType> for String {
    fn from(t: RecordType) -> Self {
        t.as_str().to_string()
    }
}

impl std::fmt::Display for RecordType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Arbitrary structured payload fields, keyed by field name. What the
/// fields mean depends on the record type (`value_mg_dl`/`context`/`notes`
/// for glucose, `value_pct` for hba1c, `title` for events).
pub type Payload = serde_json::Map<String, serde_json::Value>;

/// A decrypted record as handed to callers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Record {
    pub id: i64,
    pub owner: String,
    pub record_type: RecordType,
    pub recorded_at: DateTime<Utc>,
    pub payload: Payload,
}

impl Record {
    /// Numeric payload field, if present and numeric.
    pub fn number(&self, field: &str) -> Option<f64> {
        self.payload.get(field).and_then(serde_json::Value::as_f64)
    }

    /// String payload field, empty when absent.
    pub fn text(&self, field: &str) -> &str {
        self.payload
            .get(field)
            .and_then(serde_json::Value::as_str)
            .unwrap_or("")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_type_string_roundtrip() {
        for t in ["glucose", "hba1c", "event"] {
            assert_eq!(RecordType::from(t).as_str(), t);
        }
        let custom = RecordType::from("blood_pressure");
        assert_eq!(custom, RecordType::Other("blood_pressure".to_string()));
        assert_eq!(custom.as_str(), "blood_pressure");
    }

    #[test]
    fn record_type_serde_as_plain_string() {
        let json = serde_json::to_string(&RecordType::Glucose).unwrap();
        assert_eq!(json, "\"glucose\"");
        let back: RecordType = serde_json::from_str("\"hba1c\"").unwrap();
        assert_eq!(back, RecordType::Hba1c);
    }
}
