//! # Admin Users & Transporters API
//!
//! User and transporter management for admins.
//!
//! ## Endpoints
//!
//! - `GET /api/admin/users` — all accounts
//! - `GET /api/admin/transporters` — transporters with filters
//! - `POST /api/admin/transporters` — create transporter
//! - `PUT /api/admin/transporters/:id` — update transporter
//! - `PATCH /api/admin/transporters/:id/activate` — reactivate account
//! - `DELETE /api/admin/transporters/:id` — deactivate (soft delete)

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, patch, post, put};
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use dispatch_core::{AccountId, Page, PageParams};
use dispatch_state::account::{Account, Availability, Role, Specialty};

use crate::auth::CallerIdentity;
use crate::error::AppError;
use crate::extractors::{
    extract_validated_json, login_is_well_formed, password_is_well_formed, Validate,
};
use crate::state::AppState;

// ── Request/Response DTOs ───────────────────────────────────────────

/// Request to create a transporter account.
#[derive(Debug, Deserialize, ToSchema)]
pub struct TransporterRequest {
    /// Unique login, 3-50 characters of letters, digits, underscores.
    pub login: String,
    /// Initial password, 5-100 characters.
    pub password: String,
    /// The package category this transporter carries.
    #[schema(value_type = String)]
    pub specialty: Specialty,
}

impl Validate for TransporterRequest {
    fn validate(&self) -> Result<(), String> {
        if !login_is_well_formed(&self.login) {
            return Err(
                "login must be 3-50 characters of letters, digits, and underscores".to_string(),
            );
        }
        if !password_is_well_formed(&self.password) {
            return Err("password must be between 5 and 100 characters".to_string());
        }
        Ok(())
    }
}

/// Request to update a transporter account. A missing password keeps the
/// current credentials.
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateTransporterRequest {
    /// New login.
    pub login: String,
    /// New password; omitted to keep the current one.
    pub password: Option<String>,
    /// New specialty.
    #[schema(value_type = String)]
    pub specialty: Specialty,
}

impl Validate for UpdateTransporterRequest {
    fn validate(&self) -> Result<(), String> {
        if !login_is_well_formed(&self.login) {
            return Err(
                "login must be 3-50 characters of letters, digits, and underscores".to_string(),
            );
        }
        if let Some(password) = &self.password {
            if !password_is_well_formed(password) {
                return Err("password must be between 5 and 100 characters".to_string());
            }
        }
        Ok(())
    }
}

/// Filters for the transporter listing.
#[derive(Debug, Deserialize, Default)]
pub struct ListTransportersParams {
    /// Filter by specialty.
    pub specialty: Option<Specialty>,
    /// Filter by availability.
    pub availability: Option<Availability>,
    /// Filter by active flag.
    pub active: Option<bool>,
    /// Zero-based page index.
    pub page: Option<usize>,
    /// Page size.
    pub size: Option<usize>,
}

/// An account as returned by the API. Never includes the password hash.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UserResponse {
    /// Account id.
    #[schema(value_type = String)]
    pub id: AccountId,
    /// Account login.
    pub login: String,
    /// Account role.
    #[schema(value_type = String)]
    pub role: Role,
    /// Whether the account may authenticate.
    pub active: bool,
    /// Transporter specialty; absent for admins.
    #[schema(value_type = Option<String>)]
    pub specialty: Option<Specialty>,
    /// Transporter capacity state; absent for admins.
    #[schema(value_type = Option<String>)]
    pub status: Option<Availability>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last modification time.
    pub updated_at: DateTime<Utc>,
}

impl From<Account> for UserResponse {
    fn from(account: Account) -> Self {
        Self {
            id: account.id,
            login: account.login,
            role: account.role,
            active: account.active,
            specialty: account.specialty,
            status: account.availability,
            created_at: account.created_at,
            updated_at: account.updated_at,
        }
    }
}

// ── Router ──────────────────────────────────────────────────────────

/// Build the admin users/transporters router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/admin/users", get(list_users))
        .route(
            "/api/admin/transporters",
            get(list_transporters).post(create_transporter),
        )
        .route(
            "/api/admin/transporters/:id",
            put(update_transporter).delete(deactivate_transporter),
        )
        .route(
            "/api/admin/transporters/:id/activate",
            patch(activate_account),
        )
}

// ── Handlers ────────────────────────────────────────────────────────

/// GET /api/admin/users — All accounts, admins and transporters alike.
#[utoipa::path(
    get,
    path = "/api/admin/users",
    responses(
        (status = 200, description = "All accounts", body = Vec<UserResponse>),
        (status = 403, description = "Access denied", body = crate::error::ErrorBody),
    ),
    tag = "admin-users"
)]
async fn list_users(
    State(state): State<AppState>,
    caller: CallerIdentity,
) -> Result<Json<Vec<UserResponse>>, AppError> {
    caller.require_role(Role::Admin)?;
    tracing::debug!("listing all users");
    Ok(Json(
        state
            .registry
            .list_accounts()
            .into_iter()
            .map(UserResponse::from)
            .collect(),
    ))
}

/// GET /api/admin/transporters — Transporters with optional filters.
#[utoipa::path(
    get,
    path = "/api/admin/transporters",
    params(
        ("specialty" = Option<String>, Query, description = "Filter by specialty"),
        ("availability" = Option<String>, Query, description = "Filter by availability"),
        ("active" = Option<bool>, Query, description = "Filter by active flag"),
        ("page" = Option<usize>, Query, description = "Zero-based page index"),
        ("size" = Option<usize>, Query, description = "Page size"),
    ),
    responses(
        (status = 200, description = "One page of transporters"),
        (status = 403, description = "Access denied", body = crate::error::ErrorBody),
    ),
    tag = "admin-users"
)]
async fn list_transporters(
    State(state): State<AppState>,
    caller: CallerIdentity,
    Query(params): Query<ListTransportersParams>,
) -> Result<Json<Page<UserResponse>>, AppError> {
    caller.require_role(Role::Admin)?;
    tracing::debug!(
        specialty = ?params.specialty,
        availability = ?params.availability,
        active = ?params.active,
        "listing transporters"
    );

    let filtered: Vec<Account> = state
        .registry
        .list_accounts()
        .into_iter()
        .filter(|a| a.is_transporter())
        .filter(|a| params.specialty.map_or(true, |s| a.specialty == Some(s)))
        .filter(|a| {
            params
                .availability
                .map_or(true, |av| a.availability == Some(av))
        })
        .filter(|a| params.active.map_or(true, |active| a.active == active))
        .collect();

    let page = PageParams {
        page: params.page,
        size: params.size,
    };
    Ok(Json(Page::from_vec(filtered, page).map(UserResponse::from)))
}

/// POST /api/admin/transporters — Create a transporter account.
#[utoipa::path(
    post,
    path = "/api/admin/transporters",
    request_body = TransporterRequest,
    responses(
        (status = 201, description = "Transporter created", body = UserResponse),
        (status = 400, description = "Login already exists", body = crate::error::ErrorBody),
        (status = 422, description = "Validation error", body = crate::error::ErrorBody),
    ),
    tag = "admin-users"
)]
async fn create_transporter(
    State(state): State<AppState>,
    caller: CallerIdentity,
    body: Result<Json<TransporterRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<UserResponse>), AppError> {
    caller.require_role(Role::Admin)?;
    let req = extract_validated_json(body)?;
    tracing::info!(login = %req.login, specialty = %req.specialty, "creating transporter");

    let account = Account::new_transporter(
        AccountId::new(),
        req.login,
        state.passwords.hash(&req.password),
        req.specialty,
        Utc::now(),
    );
    let created = state.registry.create_account(account)?;

    if let Some(pool) = &state.db_pool {
        if let Err(e) = crate::db::accounts::insert(pool, &created).await {
            tracing::error!(account_id = %created.id, error = %e, "failed to persist account");
        }
    }

    tracing::info!(account_id = %created.id, "transporter created");
    Ok((StatusCode::CREATED, Json(UserResponse::from(created))))
}

/// PUT /api/admin/transporters/:id — Update a transporter.
#[utoipa::path(
    put,
    path = "/api/admin/transporters/{id}",
    params(("id" = Uuid, Path, description = "Transporter account id")),
    request_body = UpdateTransporterRequest,
    responses(
        (status = 200, description = "Transporter updated", body = UserResponse),
        (status = 404, description = "User not found", body = crate::error::ErrorBody),
        (status = 400, description = "Not a transporter or login taken", body = crate::error::ErrorBody),
    ),
    tag = "admin-users"
)]
async fn update_transporter(
    State(state): State<AppState>,
    caller: CallerIdentity,
    Path(id): Path<Uuid>,
    body: Result<Json<UpdateTransporterRequest>, JsonRejection>,
) -> Result<Json<UserResponse>, AppError> {
    caller.require_role(Role::Admin)?;
    let req = extract_validated_json(body)?;
    let id = AccountId::from_uuid(id);
    tracing::info!(account_id = %id, "updating transporter");

    let password_hash = req.password.as_deref().map(|p| state.passwords.hash(p));
    let updated =
        state
            .registry
            .update_transporter(&id, req.login, password_hash, req.specialty, Utc::now())?;

    if let Some(pool) = &state.db_pool {
        if let Err(e) = crate::db::accounts::update(pool, &updated).await {
            tracing::error!(account_id = %id, error = %e, "failed to persist account update");
        }
    }

    Ok(Json(UserResponse::from(updated)))
}

/// DELETE /api/admin/transporters/:id — Deactivate a transporter.
///
/// Soft delete: the account stays on record, deliveries it carried keep
/// their history, and the login can be reactivated later.
#[utoipa::path(
    delete,
    path = "/api/admin/transporters/{id}",
    params(("id" = Uuid, Path, description = "Transporter account id")),
    responses(
        (status = 204, description = "Transporter deactivated"),
        (status = 404, description = "User not found", body = crate::error::ErrorBody),
        (status = 400, description = "Not a transporter", body = crate::error::ErrorBody),
    ),
    tag = "admin-users"
)]
async fn deactivate_transporter(
    State(state): State<AppState>,
    caller: CallerIdentity,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    caller.require_role(Role::Admin)?;
    let id = AccountId::from_uuid(id);
    tracing::info!(account_id = %id, "deactivating transporter");

    let updated = state.registry.deactivate_transporter(&id, Utc::now())?;

    if let Some(pool) = &state.db_pool {
        if let Err(e) = crate::db::accounts::update(pool, &updated).await {
            tracing::error!(account_id = %id, error = %e, "failed to persist deactivation");
        }
    }

    Ok(StatusCode::NO_CONTENT)
}

/// PATCH /api/admin/transporters/:id/activate — Reactivate an account.
#[utoipa::path(
    patch,
    path = "/api/admin/transporters/{id}/activate",
    params(("id" = Uuid, Path, description = "Account id")),
    responses(
        (status = 200, description = "Account activated", body = UserResponse),
        (status = 404, description = "User not found", body = crate::error::ErrorBody),
    ),
    tag = "admin-users"
)]
async fn activate_account(
    State(state): State<AppState>,
    caller: CallerIdentity,
    Path(id): Path<Uuid>,
) -> Result<Json<UserResponse>, AppError> {
    caller.require_role(Role::Admin)?;
    let id = AccountId::from_uuid(id);
    tracing::info!(account_id = %id, "activating account");

    let updated = state
        .registry
        .activate_account(&id, Utc::now())
        .ok_or_else(|| AppError::NotFound(format!("user {id} not found")))?;

    if let Some(pool) = &state.db_pool {
        if let Err(e) = crate::db::accounts::update(pool, &updated).await {
            tracing::error!(account_id = %id, error = %e, "failed to persist activation");
        }
    }

    Ok(Json(UserResponse::from(updated)))
}
