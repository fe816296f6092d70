//! User-input checks surfaced before anything touches crypto or storage.
//!
//! These are recoverable, user-facing failures: the caller reports the
//! message and aborts the operation with no partial state.

use crate::error::ProtoError;

/// PINs are digit-only, minimum four digits.
pub fn validate_pin(pin: &str) -> Result<(), ProtoError> {
    if pin.chars().count() < 4 {
        return Err(ProtoError::Validation(
            "PIN must be at least 4 digits".into(),
        ));
    }
    if !pin.chars().all(|c| c.is_ascii_digit()) {
        return Err(ProtoError::Validation("PIN must contain digits only".into()));
    }
    Ok(())
}

/// Physiological plausibility bounds for a glucose measurement.
pub fn validate_glucose_value(value: f64) -> Result<(), ProtoError> {
    if !(20.0..=600.0).contains(&value) {
        return Err(ProtoError::Validation(
            "glucose value outside physiological range (20-600 mg/dL)".into(),
        ));
    }
    Ok(())
}

/// Required free-text field must be non-blank.
pub fn ensure_required(text: &str, label: &str) -> Result<(), ProtoError> {
    if text.trim().is_empty() {
        return Err(ProtoError::Validation(format!("field {label} is required")));
    }
    Ok(())
}
