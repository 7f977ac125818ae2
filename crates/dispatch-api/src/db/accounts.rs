//! Account persistence operations.
//!
//! All functions operate on the `accounts` table. Role, specialty, and
//! availability are stored as their canonical names; the password column
//! holds the self-describing digest string from the credentials module.

use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use dispatch_core::AccountId;
use dispatch_state::account::{Account, Availability, Role, Specialty};

/// Insert a new account record.
pub async fn insert(pool: &PgPool, account: &Account) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO accounts (id, login, password_hash, role, active, specialty,
                               availability, created_at, updated_at)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
    )
    .bind(account.id.as_uuid())
    .bind(&account.login)
    .bind(&account.password_hash)
    .bind(account.role.as_str())
    .bind(account.active)
    .bind(account.specialty.map(|s| s.as_str()))
    .bind(account.availability.map(|a| a.as_str()))
    .bind(account.created_at)
    .bind(account.updated_at)
    .execute(pool)
    .await?;
    Ok(())
}

/// Insert or replace an account record. Used by seeding, where the
/// in-memory record is authoritative.
pub async fn upsert(pool: &PgPool, account: &Account) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO accounts (id, login, password_hash, role, active, specialty,
                               availability, created_at, updated_at)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
         ON CONFLICT (id) DO UPDATE
         SET login = EXCLUDED.login, password_hash = EXCLUDED.password_hash,
             role = EXCLUDED.role, active = EXCLUDED.active,
             specialty = EXCLUDED.specialty, availability = EXCLUDED.availability,
             updated_at = EXCLUDED.updated_at",
    )
    .bind(account.id.as_uuid())
    .bind(&account.login)
    .bind(&account.password_hash)
    .bind(account.role.as_str())
    .bind(account.active)
    .bind(account.specialty.map(|s| s.as_str()))
    .bind(account.availability.map(|a| a.as_str()))
    .bind(account.created_at)
    .bind(account.updated_at)
    .execute(pool)
    .await?;
    Ok(())
}

/// Update every mutable column of an account record.
pub async fn update(pool: &PgPool, account: &Account) -> Result<(), sqlx::Error> {
    sqlx::query(UPDATE_SQL)
        .bind(account.id.as_uuid())
        .bind(&account.login)
        .bind(&account.password_hash)
        .bind(account.active)
        .bind(account.specialty.map(|s| s.as_str()))
        .bind(account.availability.map(|a| a.as_str()))
        .bind(account.updated_at)
        .execute(pool)
        .await?;
    Ok(())
}

/// Update an account row inside an open transaction.
pub async fn update_in(
    tx: &mut Transaction<'_, Postgres>,
    account: &Account,
) -> Result<(), sqlx::Error> {
    sqlx::query(UPDATE_SQL)
        .bind(account.id.as_uuid())
        .bind(&account.login)
        .bind(&account.password_hash)
        .bind(account.active)
        .bind(account.specialty.map(|s| s.as_str()))
        .bind(account.availability.map(|a| a.as_str()))
        .bind(account.updated_at)
        .execute(&mut **tx)
        .await?;
    Ok(())
}

const UPDATE_SQL: &str = "UPDATE accounts
     SET login = $2, password_hash = $3, active = $4, specialty = $5,
         availability = $6, updated_at = $7
     WHERE id = $1";

/// Load all accounts for startup hydration.
pub async fn load_all(pool: &PgPool) -> Result<Vec<Account>, sqlx::Error> {
    let rows = sqlx::query_as::<_, AccountRow>(
        "SELECT id, login, password_hash, role, active, specialty, availability,
                created_at, updated_at
         FROM accounts ORDER BY created_at",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(AccountRow::into_account).collect())
}

/// Internal row type for SQLx mapping.
#[derive(sqlx::FromRow)]
struct AccountRow {
    id: Uuid,
    login: String,
    password_hash: String,
    role: String,
    active: bool,
    specialty: Option<String>,
    availability: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl AccountRow {
    fn into_account(self) -> Account {
        let role = Role::from_name(&self.role).unwrap_or_else(|| {
            tracing::error!(
                id = %self.id,
                role = %self.role,
                "unknown role in database — defaulting to TRANSPORTER; \
                 investigate: this may indicate data corruption"
            );
            Role::Transporter
        });

        Account {
            id: AccountId::from_uuid(self.id),
            login: self.login,
            password_hash: self.password_hash,
            role,
            active: self.active,
            specialty: self.specialty.as_deref().and_then(Specialty::from_name),
            availability: self
                .availability
                .as_deref()
                .and_then(Availability::from_name),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}
