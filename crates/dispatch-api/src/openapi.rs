//! # OpenAPI Specification Assembly
//!
//! Assembles all utoipa-documented routes into a single OpenAPI spec,
//! served at `/openapi.json`.

use axum::routing::get;
use axum::{Json, Router};
use utoipa::OpenApi;

use crate::state::AppState;

/// Assembled OpenAPI spec for the entire API surface.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Dispatch API",
        version = "0.2.7",
        description = "Logistics backend: package and transporter management, \
                       specialty-matched assignment, delivery lifecycle, and \
                       stateless token authentication.",
        license(name = "Apache-2.0")
    ),
    paths(
        // Auth
        crate::routes::auth::login,
        // Admin packages
        crate::routes::admin_packages::create_package,
        crate::routes::admin_packages::list_packages,
        crate::routes::admin_packages::search_packages,
        crate::routes::admin_packages::list_unassigned,
        crate::routes::admin_packages::package_stats,
        crate::routes::admin_packages::update_package,
        crate::routes::admin_packages::assign_package,
        crate::routes::admin_packages::update_status,
        crate::routes::admin_packages::delete_package,
        // Admin users & transporters
        crate::routes::admin_transporters::list_users,
        crate::routes::admin_transporters::list_transporters,
        crate::routes::admin_transporters::create_transporter,
        crate::routes::admin_transporters::update_transporter,
        crate::routes::admin_transporters::deactivate_transporter,
        crate::routes::admin_transporters::activate_account,
        // Transporter packages
        crate::routes::transporter_packages::list_my_packages,
        crate::routes::transporter_packages::search_my_packages,
        crate::routes::transporter_packages::update_my_package_status,
    ),
    components(schemas(
        // Error types
        crate::error::ErrorBody,
        crate::error::ErrorDetail,
        // Auth DTOs
        crate::routes::auth::LoginRequest,
        crate::routes::auth::LoginResponse,
        // Package DTOs
        crate::routes::admin_packages::PackageRequest,
        crate::routes::admin_packages::UpdateStatusRequest,
        crate::routes::admin_packages::PackageResponse,
        crate::routes::admin_packages::PackageStatsResponse,
        // User DTOs
        crate::routes::admin_transporters::TransporterRequest,
        crate::routes::admin_transporters::UpdateTransporterRequest,
        crate::routes::admin_transporters::UserResponse,
    )),
    tags(
        (name = "auth", description = "Authentication"),
        (name = "admin-packages", description = "Package management (admin)"),
        (name = "admin-users", description = "User and transporter management (admin)"),
        (name = "transporter-packages", description = "Own packages (transporter)"),
    )
)]
pub struct ApiDoc;

/// Build the OpenAPI router, serving the JSON spec at `/openapi.json`.
pub fn router() -> Router<AppState> {
    Router::new().route("/openapi.json", get(openapi_json))
}

/// GET /openapi.json — Return the generated OpenAPI specification.
async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
