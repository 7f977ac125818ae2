//! Package persistence operations.
//!
//! All functions operate on the `packages` table. Enums are stored as
//! their canonical `SCREAMING_SNAKE_CASE` names; business rules and state
//! machine constraints are enforced at the application layer, not in SQL.

use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use dispatch_core::{AccountId, PackageId};
use dispatch_state::package::{Package, PackageKind, PackageStatus};

/// Insert a new package record.
pub async fn insert(pool: &PgPool, package: &Package) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO packages (id, kind, weight, destination_address, status, transporter_id,
                               handling_instructions, min_temperature, max_temperature,
                               created_at, updated_at)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)",
    )
    .bind(package.id.as_uuid())
    .bind(package.kind.as_str())
    .bind(package.weight)
    .bind(&package.destination_address)
    .bind(package.status.as_str())
    .bind(package.transporter_id.map(|id| *id.as_uuid()))
    .bind(&package.handling_instructions)
    .bind(package.min_temperature)
    .bind(package.max_temperature)
    .bind(package.created_at)
    .bind(package.updated_at)
    .execute(pool)
    .await?;
    Ok(())
}

/// Update every mutable column of a package record.
pub async fn update(pool: &PgPool, package: &Package) -> Result<(), sqlx::Error> {
    sqlx::query(UPDATE_SQL)
        .bind(package.id.as_uuid())
        .bind(package.kind.as_str())
        .bind(package.weight)
        .bind(&package.destination_address)
        .bind(package.status.as_str())
        .bind(package.transporter_id.map(|id| *id.as_uuid()))
        .bind(&package.handling_instructions)
        .bind(package.min_temperature)
        .bind(package.max_temperature)
        .bind(package.updated_at)
        .execute(pool)
        .await?;
    Ok(())
}

/// Update a package row inside an open transaction.
pub async fn update_in(
    tx: &mut Transaction<'_, Postgres>,
    package: &Package,
) -> Result<(), sqlx::Error> {
    sqlx::query(UPDATE_SQL)
        .bind(package.id.as_uuid())
        .bind(package.kind.as_str())
        .bind(package.weight)
        .bind(&package.destination_address)
        .bind(package.status.as_str())
        .bind(package.transporter_id.map(|id| *id.as_uuid()))
        .bind(&package.handling_instructions)
        .bind(package.min_temperature)
        .bind(package.max_temperature)
        .bind(package.updated_at)
        .execute(&mut **tx)
        .await?;
    Ok(())
}

const UPDATE_SQL: &str = "UPDATE packages
     SET kind = $2, weight = $3, destination_address = $4, status = $5,
         transporter_id = $6, handling_instructions = $7,
         min_temperature = $8, max_temperature = $9, updated_at = $10
     WHERE id = $1";

/// Delete a package row inside an open transaction.
pub async fn delete_in(
    tx: &mut Transaction<'_, Postgres>,
    id: &PackageId,
) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM packages WHERE id = $1")
        .bind(id.as_uuid())
        .execute(&mut **tx)
        .await?;
    Ok(())
}

/// Load all packages for startup hydration.
pub async fn load_all(pool: &PgPool) -> Result<Vec<Package>, sqlx::Error> {
    let rows = sqlx::query_as::<_, PackageRow>(
        "SELECT id, kind, weight, destination_address, status, transporter_id,
                handling_instructions, min_temperature, max_temperature,
                created_at, updated_at
         FROM packages ORDER BY created_at",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(PackageRow::into_package).collect())
}

/// Internal row type for SQLx mapping.
#[derive(sqlx::FromRow)]
struct PackageRow {
    id: Uuid,
    kind: String,
    weight: f64,
    destination_address: String,
    status: String,
    transporter_id: Option<Uuid>,
    handling_instructions: Option<String>,
    min_temperature: Option<f64>,
    max_temperature: Option<f64>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl PackageRow {
    fn into_package(self) -> Package {
        let kind = PackageKind::from_name(&self.kind).unwrap_or_else(|| {
            tracing::error!(
                id = %self.id,
                kind = %self.kind,
                "unknown package kind in database — defaulting to STANDARD; \
                 investigate: this may indicate data corruption"
            );
            PackageKind::Standard
        });
        let status = PackageStatus::from_name(&self.status).unwrap_or_else(|| {
            tracing::error!(
                id = %self.id,
                status = %self.status,
                "unknown package status in database — defaulting to PENDING; \
                 investigate: this may indicate data corruption"
            );
            PackageStatus::Pending
        });

        Package {
            id: PackageId::from_uuid(self.id),
            kind,
            weight: self.weight,
            destination_address: self.destination_address,
            status,
            transporter_id: self.transporter_id.map(AccountId::from_uuid),
            handling_instructions: self.handling_instructions,
            min_temperature: self.min_temperature,
            max_temperature: self.max_temperature,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}
