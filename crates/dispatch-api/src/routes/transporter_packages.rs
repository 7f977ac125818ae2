//! # Transporter Package API
//!
//! The transporter's own view of the system: packages assigned to the
//! authenticated caller, address search within them, and self-service
//! status updates. The status update is ownership-checked — a transporter
//! can only touch packages whose `transporter_id` is their own account.
//!
//! ## Endpoints
//!
//! - `GET /api/transporter/packages` — my packages, with status filter
//! - `GET /api/transporter/packages/search` — my packages by address
//! - `PATCH /api/transporter/packages/:id/status` — update my package

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::routing::{get, patch};
use axum::{Json, Router};
use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

use dispatch_core::{Page, PackageId, PageParams};
use dispatch_state::package::{Package, PackageStatus};
use dispatch_state::Role;

use crate::auth::CallerIdentity;
use crate::error::AppError;
use crate::extractors::extract_json;
use crate::routes::admin_packages::{PackageResponse, UpdateStatusRequest};
use crate::state::AppState;

// ── Request DTOs ────────────────────────────────────────────────────

/// Filters for the transporter's package listing.
#[derive(Debug, Deserialize, Default)]
pub struct MyPackagesParams {
    /// Filter by package status.
    pub status: Option<PackageStatus>,
    /// Zero-based page index.
    pub page: Option<usize>,
    /// Page size.
    pub size: Option<usize>,
}

/// Parameters for address search within the transporter's packages.
#[derive(Debug, Deserialize)]
pub struct MySearchParams {
    /// Substring to match against destination addresses,
    /// case-insensitively.
    pub address: String,
    /// Zero-based page index.
    pub page: Option<usize>,
    /// Page size.
    pub size: Option<usize>,
}

// ── Router ──────────────────────────────────────────────────────────

/// Build the transporter packages router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/transporter/packages", get(list_my_packages))
        .route("/api/transporter/packages/search", get(search_my_packages))
        .route(
            "/api/transporter/packages/:id/status",
            patch(update_my_package_status),
        )
}

// ── Handlers ────────────────────────────────────────────────────────

/// GET /api/transporter/packages — Packages assigned to the caller.
#[utoipa::path(
    get,
    path = "/api/transporter/packages",
    params(
        ("status" = Option<String>, Query, description = "Filter by package status"),
        ("page" = Option<usize>, Query, description = "Zero-based page index"),
        ("size" = Option<usize>, Query, description = "Page size"),
    ),
    responses(
        (status = 200, description = "One page of the caller's packages"),
        (status = 403, description = "Access denied", body = crate::error::ErrorBody),
    ),
    tag = "transporter-packages"
)]
async fn list_my_packages(
    State(state): State<AppState>,
    caller: CallerIdentity,
    Query(params): Query<MyPackagesParams>,
) -> Result<Json<Page<PackageResponse>>, AppError> {
    caller.require_role(Role::Transporter)?;
    tracing::debug!(transporter_id = %caller.account_id, "listing own packages");

    let filtered: Vec<Package> = state
        .registry
        .list_packages()
        .into_iter()
        .filter(|p| p.transporter_id == Some(caller.account_id))
        .filter(|p| params.status.map_or(true, |status| p.status == status))
        .collect();

    let page = PageParams {
        page: params.page,
        size: params.size,
    };
    Ok(Json(Page::from_vec(filtered, page).map(|package| {
        PackageResponse::from_package(package, &state.registry)
    })))
}

/// GET /api/transporter/packages/search — Search own packages by address.
#[utoipa::path(
    get,
    path = "/api/transporter/packages/search",
    params(
        ("address" = String, Query, description = "Address substring, matched case-insensitively"),
        ("page" = Option<usize>, Query, description = "Zero-based page index"),
        ("size" = Option<usize>, Query, description = "Page size"),
    ),
    responses(
        (status = 200, description = "One page of matching packages"),
        (status = 403, description = "Access denied", body = crate::error::ErrorBody),
    ),
    tag = "transporter-packages"
)]
async fn search_my_packages(
    State(state): State<AppState>,
    caller: CallerIdentity,
    Query(params): Query<MySearchParams>,
) -> Result<Json<Page<PackageResponse>>, AppError> {
    caller.require_role(Role::Transporter)?;
    tracing::debug!(
        transporter_id = %caller.account_id,
        address = %params.address,
        "searching own packages by address"
    );

    let needle = params.address.to_lowercase();
    let filtered: Vec<Package> = state
        .registry
        .list_packages()
        .into_iter()
        .filter(|p| p.transporter_id == Some(caller.account_id))
        .filter(|p| p.destination_address.to_lowercase().contains(&needle))
        .collect();

    let page = PageParams {
        page: params.page,
        size: params.size,
    };
    Ok(Json(Page::from_vec(filtered, page).map(|package| {
        PackageResponse::from_package(package, &state.registry)
    })))
}

/// PATCH /api/transporter/packages/:id/status — Update the status of one
/// of the caller's packages.
///
/// Fails with 400 when the package belongs to another transporter.
/// Finishing the delivery releases the caller back to AVAILABLE.
#[utoipa::path(
    patch,
    path = "/api/transporter/packages/{id}/status",
    params(("id" = Uuid, Path, description = "Package id")),
    request_body = UpdateStatusRequest,
    responses(
        (status = 200, description = "Status updated", body = PackageResponse),
        (status = 404, description = "Package not found", body = crate::error::ErrorBody),
        (status = 400, description = "Package not owned by caller", body = crate::error::ErrorBody),
        (status = 422, description = "Missing status", body = crate::error::ErrorBody),
    ),
    tag = "transporter-packages"
)]
async fn update_my_package_status(
    State(state): State<AppState>,
    caller: CallerIdentity,
    Path(id): Path<Uuid>,
    body: Result<Json<UpdateStatusRequest>, JsonRejection>,
) -> Result<Json<PackageResponse>, AppError> {
    caller.require_role(Role::Transporter)?;
    let new_status = extract_json(body)?.required_status()?;
    let id = PackageId::from_uuid(id);
    tracing::info!(
        transporter_id = %caller.account_id,
        package_id = %id,
        status = %new_status,
        "transporter changing package status"
    );

    let (package, released) = state
        .registry
        .change_package_status_as_owner(&id, caller.account_id, new_status, Utc::now())
        .ok_or_else(|| AppError::NotFound(format!("package {id} not found")))??;

    if let Some(pool) = &state.db_pool {
        if let Err(e) =
            crate::db::persist_status_change(pool, &package, released.as_ref()).await
        {
            tracing::error!(package_id = %id, error = %e, "failed to persist status change");
        }
    }

    Ok(Json(PackageResponse::from_package(
        package,
        &state.registry,
    )))
}
