//! # Authentication API
//!
//! The public login endpoint. Credential failures are deliberately
//! indistinguishable: an unknown login and a wrong password produce the
//! same "Invalid credentials" message, so the endpoint cannot be used to
//! enumerate accounts. A deactivated account is reported as such only
//! after the login resolved to a real account.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use dispatch_core::AccountId;
use dispatch_state::Role;

use crate::error::AppError;
use crate::extractors::{extract_validated_json, Validate};
use crate::state::AppState;

// ── Request/Response DTOs ───────────────────────────────────────────

/// Login credentials.
#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginRequest {
    /// Account login.
    pub login: String,
    /// Account password.
    pub password: String,
}

impl Validate for LoginRequest {
    fn validate(&self) -> Result<(), String> {
        if self.login.trim().is_empty() {
            return Err("login must not be empty".to_string());
        }
        if self.password.is_empty() {
            return Err("password must not be empty".to_string());
        }
        Ok(())
    }
}

/// Successful authentication result.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct LoginResponse {
    /// Signed session token.
    pub token: String,
    /// The authenticated login.
    pub login: String,
    /// The authenticated role.
    #[schema(value_type = String)]
    pub role: Role,
    /// The authenticated account id.
    #[schema(value_type = String)]
    pub user_id: AccountId,
}

// ── Router ──────────────────────────────────────────────────────────

/// Build the authentication router.
pub fn router() -> Router<AppState> {
    Router::new().route("/api/auth/login", post(login))
}

// ── Handlers ────────────────────────────────────────────────────────

/// POST /api/auth/login — Authenticate and issue a session token.
#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Authenticated", body = LoginResponse),
        (status = 401, description = "Invalid credentials or deactivated account", body = crate::error::ErrorBody),
        (status = 422, description = "Validation error", body = crate::error::ErrorBody),
    ),
    tag = "auth"
)]
async fn login(
    State(state): State<AppState>,
    body: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<LoginResponse>, AppError> {
    let req = extract_validated_json(body)?;
    tracing::info!(login = %req.login, "authentication attempt");

    let account = state
        .registry
        .account_by_login(&req.login)
        .ok_or_else(|| AppError::Unauthorized("Invalid credentials".to_string()))?;

    if !account.active {
        tracing::warn!(login = %req.login, "deactivated account attempted to log in");
        return Err(AppError::Unauthorized(
            "User account is deactivated".to_string(),
        ));
    }

    if !state.passwords.verify(&req.password, &account.password_hash) {
        tracing::warn!(login = %req.login, "password mismatch");
        return Err(AppError::Unauthorized("Invalid credentials".to_string()));
    }

    let token = state.tokens.issue(&account, Utc::now()).map_err(|e| {
        AppError::Internal(format!("token issuance failed: {e}"))
    })?;

    tracing::info!(login = %account.login, role = %account.role, "user authenticated");

    Ok(Json(LoginResponse {
        token,
        login: account.login,
        role: account.role,
        user_id: account.id,
    }))
}
