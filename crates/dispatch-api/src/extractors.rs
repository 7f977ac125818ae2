//! # Request Extraction & Validation
//!
//! The [`Validate`] trait lets request DTOs check rules that serde cannot
//! express (length ranges, character sets, cross-field requirements), and
//! the extraction helpers map the two failure classes to the right status:
//! a body that does not deserialize is a 400, a body that deserializes but
//! violates a rule is a 422.

use axum::extract::rejection::JsonRejection;
use axum::Json;

use crate::error::AppError;

/// Request DTOs that carry validation rules beyond deserialization.
pub trait Validate {
    /// Check the DTO's rules. Returns a caller-facing message on failure.
    fn validate(&self) -> Result<(), String>;
}

/// Unwrap a JSON body, mapping deserialization failures to
/// [`AppError::BadRequest`].
pub fn extract_json<T>(result: Result<Json<T>, JsonRejection>) -> Result<T, AppError> {
    result
        .map(|Json(v)| v)
        .map_err(|err| AppError::BadRequest(err.body_text()))
}

/// Unwrap a JSON body and run its [`Validate`] rules, mapping rule
/// violations to [`AppError::Validation`].
pub fn extract_validated_json<T: Validate>(
    result: Result<Json<T>, JsonRejection>,
) -> Result<T, AppError> {
    let value = extract_json(result)?;
    value.validate().map_err(AppError::Validation)?;
    Ok(value)
}

/// Whether a login satisfies the account naming rules: 3-50 characters,
/// letters, digits, and underscores only.
pub fn login_is_well_formed(login: &str) -> bool {
    let len = login.chars().count();
    (3..=50).contains(&len)
        && login
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Whether a password length is acceptable: 5-100 characters.
pub fn password_is_well_formed(password: &str) -> bool {
    (5..=100).contains(&password.chars().count())
}
