//! Field-level validators shared by entities and action inputs.

use crate::errors::ModelError;

/// Trimmed length in characters must be at least `min`.
pub fn min_len(field: &str, value: &str, min: usize) -> Result<(), ModelError> {
    if value.trim().chars().count() < min {
        return Err(ModelError::Validation(format!("{field} must be at least {min} characters")));
    }
    Ok(())
}

/// Positive, finite and at most two decimal places.
pub fn money(field: &str, value: f64) -> Result<(), ModelError> {
    if !value.is_finite() || value <= 0.0 {
        return Err(ModelError::Validation(format!("{field} must be a positive amount")));
    }
    let cents = value * 100.0;
    if (cents.round() - cents).abs() > 1e-6 {
        return Err(ModelError::Validation(format!("{field} must have at most 2 decimal places")));
    }
    Ok(())
}

pub fn positive(field: &str, value: i32) -> Result<(), ModelError> {
    if value <= 0 {
        return Err(ModelError::Validation(format!("{field} must be a positive integer")));
    }
    Ok(())
}

pub fn email(value: &str) -> Result<(), ModelError> {
    let v = value.trim();
    match v.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() => Ok(()),
        _ => Err(ModelError::Validation("invalid email".into())),
    }
}
