//! # API Error Types
//!
//! Structured error type implementing `axum::response::IntoResponse`.
//! Maps domain errors from dispatch-state and dispatch-core to HTTP status
//! codes and a uniform JSON error body. The two domain-specific conflicts
//! (specialty mismatch, transporter unavailable) carry their payloads in
//! the `details` field. Internal error messages are never exposed to
//! clients.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

use dispatch_core::{AccountId, ValidationError};
use dispatch_state::account::Availability;
use dispatch_state::assignment::AssignmentError;
use dispatch_state::lifecycle::OwnershipError;
use dispatch_state::package::PackageKind;
use dispatch_state::Specialty;

use crate::state::{AccountWriteError, AssignError};

/// Structured JSON error response body.
///
/// Every error response uses this format. `details` is present only for
/// the domain conflicts that carry a payload.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

/// Inner error detail.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorDetail {
    /// Machine-readable error code (e.g., "NOT_FOUND", "SPECIALTY_MISMATCH").
    pub code: String,
    /// Human-readable error message.
    pub message: String,
    /// Structured payload for domain conflicts, absent otherwise.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

/// Application-level error type that implements [`IntoResponse`] for Axum.
#[derive(Error, Debug)]
pub enum AppError {
    /// Resource not found (404).
    #[error("not found: {0}")]
    NotFound(String),

    /// Business-rule validation failed (422).
    #[error("validation error: {0}")]
    Validation(String),

    /// Request malformed or argument invalid (400).
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Authentication failure — bad credentials or deactivated account (401).
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Authorization failure — role lacks permission (403).
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// The entity's state disallows the requested transition (409).
    #[error("conflict: {0}")]
    Conflict(String),

    /// The transporter's specialty does not match the package kind (409).
    #[error("transporter with specialty {specialty} cannot handle a {kind} package")]
    SpecialtyMismatch {
        /// The kind of the package being assigned.
        kind: PackageKind,
        /// The transporter's specialty.
        specialty: Specialty,
    },

    /// The transporter cannot take a new package right now (409).
    #[error("transporter {transporter_id} is not available (currently {availability})")]
    TransporterUnavailable {
        /// The targeted transporter.
        transporter_id: AccountId,
        /// Its current availability.
        availability: Availability,
    },

    /// Internal server error (500). Message is logged, never returned.
    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Return the HTTP status code and machine-readable error code.
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            Self::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            Self::Validation(_) => (StatusCode::UNPROCESSABLE_ENTITY, "VALIDATION_ERROR"),
            Self::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            Self::Unauthorized(_) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED"),
            Self::Forbidden(_) => (StatusCode::FORBIDDEN, "FORBIDDEN"),
            Self::Conflict(_) => (StatusCode::CONFLICT, "CONFLICT"),
            Self::SpecialtyMismatch { .. } => (StatusCode::CONFLICT, "SPECIALTY_MISMATCH"),
            Self::TransporterUnavailable { .. } => {
                (StatusCode::CONFLICT, "TRANSPORTER_UNAVAILABLE")
            }
            Self::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        }
    }

    /// Structured payload for the domain conflicts.
    fn details(&self) -> Option<serde_json::Value> {
        match self {
            Self::SpecialtyMismatch { kind, specialty } => Some(serde_json::json!({
                "package_kind": kind,
                "specialty": specialty,
            })),
            Self::TransporterUnavailable {
                transporter_id,
                availability,
            } => Some(serde_json::json!({
                "transporter_id": transporter_id,
                "availability": availability,
            })),
            _ => None,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        // Never expose internal error messages to clients.
        let message = match &self {
            Self::Internal(_) => "An internal error occurred".to_string(),
            other => other.to_string(),
        };

        if matches!(&self, Self::Internal(_)) {
            tracing::error!(error = %self, "internal server error");
        }

        let body = ErrorBody {
            error: ErrorDetail {
                code: code.to_string(),
                message,
                details: self.details(),
            },
        };

        (status, Json(body)).into_response()
    }
}

/// Business-rule violations surface as 422s.
impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        Self::Validation(err.to_string())
    }
}

/// Assignment-engine rule failures, each to its own status.
impl From<AssignmentError> for AppError {
    fn from(err: AssignmentError) -> Self {
        match err {
            AssignmentError::NotATransporter(_) => Self::BadRequest(err.to_string()),
            AssignmentError::NotAssignable(_) => Self::Conflict(err.to_string()),
            AssignmentError::SpecialtyMismatch { kind, specialty } => {
                Self::SpecialtyMismatch { kind, specialty }
            }
            AssignmentError::TransporterUnavailable {
                transporter_id,
                availability,
            } => Self::TransporterUnavailable {
                transporter_id,
                availability,
            },
        }
    }
}

/// Registry-level assignment failures: existence checks first, then rules.
impl From<AssignError> for AppError {
    fn from(err: AssignError) -> Self {
        match err {
            AssignError::PackageNotFound(id) => Self::NotFound(format!("package {id} not found")),
            AssignError::TransporterNotFound(id) => {
                Self::NotFound(format!("user {id} not found"))
            }
            AssignError::Rule(rule) => rule.into(),
        }
    }
}

/// Account-write failures from the registry.
impl From<AccountWriteError> for AppError {
    fn from(err: AccountWriteError) -> Self {
        match &err {
            AccountWriteError::NotFound(id) => Self::NotFound(format!("user {id} not found")),
            AccountWriteError::NotATransporter(_) | AccountWriteError::LoginTaken(_) => {
                Self::BadRequest(err.to_string())
            }
        }
    }
}

/// Self-service ownership failures surface as 400s.
impl From<OwnershipError> for AppError {
    fn from(err: OwnershipError) -> Self {
        Self::BadRequest(err.to_string())
    }
}
