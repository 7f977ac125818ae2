//! # Postgres Persistence
//!
//! Optional durable persistence beneath the in-memory registry. The
//! registry stays authoritative at runtime; committed registry writes are
//! mirrored here, and on startup the registry is hydrated from these
//! tables.
//!
//! The two-entity operations — assignment, transporter release on a
//! finished status, removal of an assigned package — write both rows
//! inside **one transaction**, so a crash between the writes cannot leave
//! an in-transit package next to an available transporter (or the
//! reverse) on disk.

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

use dispatch_core::PackageId;
use dispatch_state::{Account, Package};

pub mod accounts;
pub mod packages;

/// Initialize the connection pool from `DATABASE_URL` and apply the
/// schema. Returns `None` when the variable is unset — the server then
/// runs with in-memory state only.
pub async fn init_pool() -> Result<Option<PgPool>, sqlx::Error> {
    let url = match std::env::var("DATABASE_URL") {
        Ok(url) => url,
        Err(_) => {
            tracing::info!("DATABASE_URL not set — running with in-memory state only");
            return Ok(None);
        }
    };

    let pool = PgPoolOptions::new().max_connections(5).connect(&url).await?;
    migrate(&pool).await?;
    tracing::info!("database pool initialized");
    Ok(Some(pool))
}

/// Apply the schema. Idempotent.
async fn migrate(pool: &PgPool) -> Result<(), sqlx::Error> {
    sqlx::query(
        "CREATE TABLE IF NOT EXISTS accounts (
             id UUID PRIMARY KEY,
             login TEXT NOT NULL UNIQUE,
             password_hash TEXT NOT NULL,
             role TEXT NOT NULL,
             active BOOLEAN NOT NULL,
             specialty TEXT,
             availability TEXT,
             created_at TIMESTAMPTZ NOT NULL,
             updated_at TIMESTAMPTZ NOT NULL
         )",
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE TABLE IF NOT EXISTS packages (
             id UUID PRIMARY KEY,
             kind TEXT NOT NULL,
             weight DOUBLE PRECISION NOT NULL,
             destination_address TEXT NOT NULL,
             status TEXT NOT NULL,
             transporter_id UUID,
             handling_instructions TEXT,
             min_temperature DOUBLE PRECISION,
             max_temperature DOUBLE PRECISION,
             created_at TIMESTAMPTZ NOT NULL,
             updated_at TIMESTAMPTZ NOT NULL
         )",
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Persist an assignment: the package row and the transporter row in one
/// transaction.
pub async fn persist_assignment(
    pool: &PgPool,
    package: &Package,
    transporter: &Account,
) -> Result<(), sqlx::Error> {
    let mut tx = pool.begin().await?;
    packages::update_in(&mut tx, package).await?;
    accounts::update_in(&mut tx, transporter).await?;
    tx.commit().await
}

/// Persist a status change together with the optional transporter
/// release, in one transaction.
pub async fn persist_status_change(
    pool: &PgPool,
    package: &Package,
    released: Option<&Account>,
) -> Result<(), sqlx::Error> {
    let mut tx = pool.begin().await?;
    packages::update_in(&mut tx, package).await?;
    if let Some(transporter) = released {
        accounts::update_in(&mut tx, transporter).await?;
    }
    tx.commit().await
}

/// Persist a package removal together with the optional transporter
/// release, in one transaction.
pub async fn persist_removal(
    pool: &PgPool,
    package_id: &PackageId,
    released: Option<&Account>,
) -> Result<(), sqlx::Error> {
    let mut tx = pool.begin().await?;
    packages::delete_in(&mut tx, package_id).await?;
    if let Some(transporter) = released {
        accounts::update_in(&mut tx, transporter).await?;
    }
    tx.commit().await
}
