//! # Admin Package API
//!
//! Package management for admins: creation, filtered listings, address
//! search, updates, assignment to transporters, status changes, status
//! counts, and deletion.
//!
//! ## Endpoints
//!
//! - `POST /api/admin/packages` — create package
//! - `GET /api/admin/packages` — list with kind/status filters
//! - `GET /api/admin/packages/search` — search by destination address
//! - `GET /api/admin/packages/unassigned` — unassigned packages
//! - `GET /api/admin/packages/stats` — counts per status
//! - `PUT /api/admin/packages/:id` — update package
//! - `PATCH /api/admin/packages/:id/assign/:transporter_id` — assign
//! - `PATCH /api/admin/packages/:id/status` — change status
//! - `DELETE /api/admin/packages/:id` — delete package

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{delete, get, patch, put};
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use dispatch_core::{AccountId, Page, PackageId, PageParams};
use dispatch_state::package::{Package, PackageKind, PackageStatus};
use dispatch_state::Role;

use crate::auth::CallerIdentity;
use crate::error::AppError;
use crate::extractors::extract_json;
use crate::state::{AppState, Registry};

// ── Request/Response DTOs ───────────────────────────────────────────

/// Request to create or update a package. The `type` field only matters
/// at creation; updates must carry the package's existing type.
#[derive(Debug, Deserialize, ToSchema)]
pub struct PackageRequest {
    /// Package category. Immutable after creation.
    #[serde(rename = "type")]
    #[schema(value_type = String)]
    pub kind: PackageKind,
    /// Weight in kilograms.
    pub weight: f64,
    /// Destination address.
    pub destination_address: String,
    /// Handling instructions; required for fragile packages.
    pub handling_instructions: Option<String>,
    /// Minimum transport temperature; required for refrigerated packages.
    pub min_temperature: Option<f64>,
    /// Maximum transport temperature; required for refrigerated packages.
    pub max_temperature: Option<f64>,
}

/// Request to change a package's status. The status field is required;
/// an absent or null status fails validation.
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateStatusRequest {
    /// The new status.
    #[schema(value_type = Option<String>)]
    pub status: Option<PackageStatus>,
}

impl UpdateStatusRequest {
    /// Unwrap the required status, rejecting absent/null.
    pub fn required_status(self) -> Result<PackageStatus, AppError> {
        self.status
            .ok_or_else(|| AppError::Validation("status is required".to_string()))
    }
}

/// Filters for the admin package listing.
#[derive(Debug, Deserialize, Default)]
pub struct ListPackagesParams {
    /// Filter by package type.
    #[serde(rename = "type")]
    pub kind: Option<PackageKind>,
    /// Filter by package status.
    pub status: Option<PackageStatus>,
    /// Zero-based page index.
    pub page: Option<usize>,
    /// Page size.
    pub size: Option<usize>,
}

/// Parameters for address search.
#[derive(Debug, Deserialize)]
pub struct SearchParams {
    /// Substring to match against destination addresses,
    /// case-insensitively.
    pub address: String,
    /// Zero-based page index.
    pub page: Option<usize>,
    /// Page size.
    pub size: Option<usize>,
}

/// Filters for the unassigned-package listing.
#[derive(Debug, Deserialize, Default)]
pub struct UnassignedParams {
    /// Filter by package status.
    pub status: Option<PackageStatus>,
    /// Zero-based page index.
    pub page: Option<usize>,
    /// Page size.
    pub size: Option<usize>,
}

/// A package as returned by the API. `transporter_login` is resolved by
/// lookup at response time; the entity itself only stores the id.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PackageResponse {
    /// Package id.
    #[schema(value_type = String)]
    pub id: PackageId,
    /// Package category.
    #[serde(rename = "type")]
    #[schema(value_type = String)]
    pub kind: PackageKind,
    /// Weight in kilograms.
    pub weight: f64,
    /// Destination address.
    pub destination_address: String,
    /// Delivery status.
    #[schema(value_type = String)]
    pub status: PackageStatus,
    /// Assigned transporter id, if any.
    #[schema(value_type = Option<String>)]
    pub transporter_id: Option<AccountId>,
    /// Assigned transporter login, if the account still exists.
    pub transporter_login: Option<String>,
    /// Handling instructions.
    pub handling_instructions: Option<String>,
    /// Minimum transport temperature.
    pub min_temperature: Option<f64>,
    /// Maximum transport temperature.
    pub max_temperature: Option<f64>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last modification time.
    pub updated_at: DateTime<Utc>,
}

impl PackageResponse {
    /// Build a response, resolving the transporter login via the registry.
    pub fn from_package(package: Package, registry: &Registry) -> Self {
        let transporter_login = package
            .transporter_id
            .and_then(|id| registry.account_login(&id));
        Self {
            id: package.id,
            kind: package.kind,
            weight: package.weight,
            destination_address: package.destination_address,
            status: package.status,
            transporter_id: package.transporter_id,
            transporter_login,
            handling_instructions: package.handling_instructions,
            min_temperature: package.min_temperature,
            max_temperature: package.max_temperature,
            created_at: package.created_at,
            updated_at: package.updated_at,
        }
    }
}

/// Package counts per status, for the admin dashboard.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PackageStatsResponse {
    /// Packages awaiting assignment.
    pub pending: usize,
    /// Packages under way.
    pub in_transit: usize,
    /// Delivered packages.
    pub delivered: usize,
    /// Cancelled packages.
    pub cancelled: usize,
}

// ── Router ──────────────────────────────────────────────────────────

/// Build the admin packages router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/api/admin/packages",
            get(list_packages).post(create_package),
        )
        .route("/api/admin/packages/search", get(search_packages))
        .route("/api/admin/packages/unassigned", get(list_unassigned))
        .route("/api/admin/packages/stats", get(package_stats))
        .route(
            "/api/admin/packages/:id",
            put(update_package).delete(delete_package),
        )
        .route(
            "/api/admin/packages/:id/assign/:transporter_id",
            patch(assign_package),
        )
        .route("/api/admin/packages/:id/status", patch(update_status))
}

/// Paginate a filtered package collection into responses.
fn page_of_responses(
    packages: Vec<Package>,
    params: PageParams,
    registry: &Registry,
) -> Page<PackageResponse> {
    Page::from_vec(packages, params)
        .map(|package| PackageResponse::from_package(package, registry))
}

// ── Handlers ────────────────────────────────────────────────────────

/// POST /api/admin/packages — Create a new package.
#[utoipa::path(
    post,
    path = "/api/admin/packages",
    request_body = PackageRequest,
    responses(
        (status = 201, description = "Package created", body = PackageResponse),
        (status = 422, description = "Validation error", body = crate::error::ErrorBody),
        (status = 403, description = "Access denied", body = crate::error::ErrorBody),
    ),
    tag = "admin-packages"
)]
async fn create_package(
    State(state): State<AppState>,
    caller: CallerIdentity,
    body: Result<Json<PackageRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<PackageResponse>), AppError> {
    caller.require_role(Role::Admin)?;
    let req = extract_json(body)?;
    tracing::info!(kind = %req.kind, "creating new package");

    let package = Package::new(
        PackageId::new(),
        req.kind,
        req.weight,
        req.destination_address,
        req.handling_instructions,
        req.min_temperature,
        req.max_temperature,
        Utc::now(),
    );
    package.validate()?;

    state.registry.insert_package(package.clone());
    if let Some(pool) = &state.db_pool {
        if let Err(e) = crate::db::packages::insert(pool, &package).await {
            tracing::error!(package_id = %package.id, error = %e, "failed to persist package");
        }
    }

    tracing::info!(package_id = %package.id, "package created");
    Ok((
        StatusCode::CREATED,
        Json(PackageResponse::from_package(package, &state.registry)),
    ))
}

/// GET /api/admin/packages — List packages with optional filters.
#[utoipa::path(
    get,
    path = "/api/admin/packages",
    params(
        ("type" = Option<String>, Query, description = "Filter by package type"),
        ("status" = Option<String>, Query, description = "Filter by package status"),
        ("page" = Option<usize>, Query, description = "Zero-based page index"),
        ("size" = Option<usize>, Query, description = "Page size"),
    ),
    responses(
        (status = 200, description = "One page of packages"),
        (status = 403, description = "Access denied", body = crate::error::ErrorBody),
    ),
    tag = "admin-packages"
)]
async fn list_packages(
    State(state): State<AppState>,
    caller: CallerIdentity,
    Query(params): Query<ListPackagesParams>,
) -> Result<Json<Page<PackageResponse>>, AppError> {
    caller.require_role(Role::Admin)?;
    tracing::debug!(kind = ?params.kind, status = ?params.status, "listing packages");

    let filtered: Vec<Package> = state
        .registry
        .list_packages()
        .into_iter()
        .filter(|p| params.kind.map_or(true, |kind| p.kind == kind))
        .filter(|p| params.status.map_or(true, |status| p.status == status))
        .collect();

    let page = PageParams {
        page: params.page,
        size: params.size,
    };
    Ok(Json(page_of_responses(filtered, page, &state.registry)))
}

/// GET /api/admin/packages/search — Search packages by destination address.
#[utoipa::path(
    get,
    path = "/api/admin/packages/search",
    params(
        ("address" = String, Query, description = "Address substring, matched case-insensitively"),
        ("page" = Option<usize>, Query, description = "Zero-based page index"),
        ("size" = Option<usize>, Query, description = "Page size"),
    ),
    responses(
        (status = 200, description = "One page of matching packages"),
        (status = 403, description = "Access denied", body = crate::error::ErrorBody),
    ),
    tag = "admin-packages"
)]
async fn search_packages(
    State(state): State<AppState>,
    caller: CallerIdentity,
    Query(params): Query<SearchParams>,
) -> Result<Json<Page<PackageResponse>>, AppError> {
    caller.require_role(Role::Admin)?;
    tracing::debug!(address = %params.address, "searching packages by address");

    let needle = params.address.to_lowercase();
    let filtered: Vec<Package> = state
        .registry
        .list_packages()
        .into_iter()
        .filter(|p| p.destination_address.to_lowercase().contains(&needle))
        .collect();

    let page = PageParams {
        page: params.page,
        size: params.size,
    };
    Ok(Json(page_of_responses(filtered, page, &state.registry)))
}

/// GET /api/admin/packages/unassigned — List packages with no transporter.
#[utoipa::path(
    get,
    path = "/api/admin/packages/unassigned",
    params(
        ("status" = Option<String>, Query, description = "Filter by package status"),
        ("page" = Option<usize>, Query, description = "Zero-based page index"),
        ("size" = Option<usize>, Query, description = "Page size"),
    ),
    responses(
        (status = 200, description = "One page of unassigned packages"),
        (status = 403, description = "Access denied", body = crate::error::ErrorBody),
    ),
    tag = "admin-packages"
)]
async fn list_unassigned(
    State(state): State<AppState>,
    caller: CallerIdentity,
    Query(params): Query<UnassignedParams>,
) -> Result<Json<Page<PackageResponse>>, AppError> {
    caller.require_role(Role::Admin)?;

    let filtered: Vec<Package> = state
        .registry
        .list_packages()
        .into_iter()
        .filter(|p| !p.is_assigned())
        .filter(|p| params.status.map_or(true, |status| p.status == status))
        .collect();

    let page = PageParams {
        page: params.page,
        size: params.size,
    };
    Ok(Json(page_of_responses(filtered, page, &state.registry)))
}

/// GET /api/admin/packages/stats — Package counts per status.
#[utoipa::path(
    get,
    path = "/api/admin/packages/stats",
    responses(
        (status = 200, description = "Counts per status", body = PackageStatsResponse),
        (status = 403, description = "Access denied", body = crate::error::ErrorBody),
    ),
    tag = "admin-packages"
)]
async fn package_stats(
    State(state): State<AppState>,
    caller: CallerIdentity,
) -> Result<Json<PackageStatsResponse>, AppError> {
    caller.require_role(Role::Admin)?;
    let registry = &state.registry;
    Ok(Json(PackageStatsResponse {
        pending: registry.count_packages_by_status(PackageStatus::Pending),
        in_transit: registry.count_packages_by_status(PackageStatus::InTransit),
        delivered: registry.count_packages_by_status(PackageStatus::Delivered),
        cancelled: registry.count_packages_by_status(PackageStatus::Cancelled),
    }))
}

/// PUT /api/admin/packages/:id — Update a package's descriptive fields.
///
/// The package type is immutable: a request carrying a different type is
/// rejected. Status, transporter reference, and creation time are
/// preserved; the update is validated against the business rules before
/// it is committed.
#[utoipa::path(
    put,
    path = "/api/admin/packages/{id}",
    params(("id" = Uuid, Path, description = "Package id")),
    request_body = PackageRequest,
    responses(
        (status = 200, description = "Package updated", body = PackageResponse),
        (status = 404, description = "Package not found", body = crate::error::ErrorBody),
        (status = 422, description = "Validation error", body = crate::error::ErrorBody),
    ),
    tag = "admin-packages"
)]
async fn update_package(
    State(state): State<AppState>,
    caller: CallerIdentity,
    Path(id): Path<Uuid>,
    body: Result<Json<PackageRequest>, JsonRejection>,
) -> Result<Json<PackageResponse>, AppError> {
    caller.require_role(Role::Admin)?;
    let req = extract_json(body)?;
    let id = PackageId::from_uuid(id);
    tracing::info!(package_id = %id, "updating package");

    let updated = state
        .registry
        .update_package_checked(&id, |package| {
            if package.kind != req.kind {
                return Err(dispatch_core::ValidationError::ImmutableType);
            }
            package.apply_update(
                req.weight,
                req.destination_address.clone(),
                req.handling_instructions.clone(),
                req.min_temperature,
                req.max_temperature,
                Utc::now(),
            );
            package.validate()
        })
        .ok_or_else(|| AppError::NotFound(format!("package {id} not found")))??;

    if let Some(pool) = &state.db_pool {
        if let Err(e) = crate::db::packages::update(pool, &updated).await {
            tracing::error!(package_id = %id, error = %e, "failed to persist package update");
        }
    }

    Ok(Json(PackageResponse::from_package(
        updated,
        &state.registry,
    )))
}

/// PATCH /api/admin/packages/:id/assign/:transporter_id — Assign a
/// package to a transporter.
#[utoipa::path(
    patch,
    path = "/api/admin/packages/{id}/assign/{transporter_id}",
    params(
        ("id" = Uuid, Path, description = "Package id"),
        ("transporter_id" = Uuid, Path, description = "Transporter account id"),
    ),
    responses(
        (status = 200, description = "Package assigned", body = PackageResponse),
        (status = 404, description = "Package or transporter not found", body = crate::error::ErrorBody),
        (status = 409, description = "Assignment refused", body = crate::error::ErrorBody),
    ),
    tag = "admin-packages"
)]
async fn assign_package(
    State(state): State<AppState>,
    caller: CallerIdentity,
    Path((id, transporter_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<PackageResponse>, AppError> {
    caller.require_role(Role::Admin)?;
    let id = PackageId::from_uuid(id);
    let transporter_id = AccountId::from_uuid(transporter_id);
    tracing::info!(package_id = %id, transporter_id = %transporter_id, "assigning package");

    let (package, transporter) = state
        .registry
        .assign_package(&id, &transporter_id, Utc::now())?;

    if let Some(pool) = &state.db_pool {
        if let Err(e) = crate::db::persist_assignment(pool, &package, &transporter).await {
            tracing::error!(package_id = %id, error = %e, "failed to persist assignment");
        }
    }

    tracing::info!(package_id = %id, transporter_id = %transporter_id, "package assigned");
    Ok(Json(PackageResponse::from_package(
        package,
        &state.registry,
    )))
}

/// PATCH /api/admin/packages/:id/status — Change a package's status.
///
/// Finishing the delivery (DELIVERED or CANCELLED) releases the assigned
/// transporter in the same operation.
#[utoipa::path(
    patch,
    path = "/api/admin/packages/{id}/status",
    params(("id" = Uuid, Path, description = "Package id")),
    request_body = UpdateStatusRequest,
    responses(
        (status = 200, description = "Status updated", body = PackageResponse),
        (status = 404, description = "Package not found", body = crate::error::ErrorBody),
        (status = 422, description = "Missing status", body = crate::error::ErrorBody),
    ),
    tag = "admin-packages"
)]
async fn update_status(
    State(state): State<AppState>,
    caller: CallerIdentity,
    Path(id): Path<Uuid>,
    body: Result<Json<UpdateStatusRequest>, JsonRejection>,
) -> Result<Json<PackageResponse>, AppError> {
    caller.require_role(Role::Admin)?;
    let new_status = extract_json(body)?.required_status()?;
    let id = PackageId::from_uuid(id);
    tracing::info!(package_id = %id, status = %new_status, "changing package status");

    let (package, released) = state
        .registry
        .change_package_status(&id, new_status, Utc::now())
        .ok_or_else(|| AppError::NotFound(format!("package {id} not found")))?;

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

/// DELETE /api/admin/packages/:id — Delete a package.
///
/// An assigned package releases its transporter before removal.
#[utoipa::path(
    delete,
    path = "/api/admin/packages/{id}",
    params(("id" = Uuid, Path, description = "Package id")),
    responses(
        (status = 204, description = "Package deleted"),
        (status = 404, description = "Package not found", body = crate::error::ErrorBody),
    ),
    tag = "admin-packages"
)]
async fn delete_package(
    State(state): State<AppState>,
    caller: CallerIdentity,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    caller.require_role(Role::Admin)?;
    let id = PackageId::from_uuid(id);
    tracing::info!(package_id = %id, "deleting package");

    let (_removed, released) = state
        .registry
        .remove_package(&id, Utc::now())
        .ok_or_else(|| AppError::NotFound(format!("package {id} not found")))?;

    if let Some(pool) = &state.db_pool {
        if let Err(e) = crate::db::persist_removal(pool, &id, released.as_ref()).await {
            tracing::error!(package_id = %id, error = %e, "failed to persist package removal");
        }
    }

    Ok(StatusCode::NO_CONTENT)
}
