//! # Startup Bootstrap
//!
//! Builds the application state, hydrates it from the database when a
//! pool is configured, and seeds the default admin account. Seeding is
//! idempotent and runs once per boot, outside the state machines the rest
//! of the system exercises: the admin's credentials are re-derived from
//! configuration on every start, so rotating `ADMIN_PASSWORD` takes
//! effect on the next boot.

use chrono::Utc;
use sqlx::PgPool;

use dispatch_core::AccountId;
use dispatch_state::Account;

use crate::state::{AppConfig, AppState};

/// Login of the seeded default admin.
pub const DEFAULT_ADMIN_LOGIN: &str = "admin";

/// Build state, hydrate from the database, and seed the default admin.
pub async fn bootstrap(
    config: AppConfig,
    db_pool: Option<PgPool>,
) -> Result<AppState, String> {
    let state = AppState::with_config(config, db_pool);
    state.hydrate_from_db().await?;

    let admin = seed_default_admin(&state);
    if let Some(pool) = &state.db_pool {
        crate::db::accounts::upsert(pool, &admin)
            .await
            .map_err(|e| format!("failed to persist default admin: {e}"))?;
    }

    Ok(state)
}

/// Ensure the default admin exists in the registry, resetting its
/// credentials from configuration. Returns the seeded record.
pub fn seed_default_admin(state: &AppState) -> Account {
    let now = Utc::now();
    let password_hash = state
        .passwords
        .hash(&state.config.default_admin_password);

    let admin = match state.registry.account_by_login(DEFAULT_ADMIN_LOGIN) {
        Some(mut existing) => {
            existing.password_hash = password_hash;
            existing.active = true;
            existing.updated_at = now;
            existing
        }
        None => Account::new_admin(
            AccountId::new(),
            DEFAULT_ADMIN_LOGIN.to_string(),
            password_hash,
            now,
        ),
    };

    state.registry.upsert_account(admin.clone());
    tracing::info!(login = DEFAULT_ADMIN_LOGIN, "default admin account ready");
    admin
}

#[cfg(test)]
mod tests {
    use super::*;
    use dispatch_state::Role;

    #[test]
    fn seeding_creates_an_active_admin() {
        let state = AppState::new();
        let admin = seed_default_admin(&state);

        assert_eq!(admin.login, DEFAULT_ADMIN_LOGIN);
        assert_eq!(admin.role, Role::Admin);
        assert!(admin.active);

        let stored = state.registry.account_by_login(DEFAULT_ADMIN_LOGIN).unwrap();
        assert_eq!(stored.id, admin.id);
        assert!(state
            .passwords
            .verify("admin123", &stored.password_hash));
    }

    #[test]
    fn seeding_is_idempotent_and_resets_credentials() {
        let state = AppState::new();
        let first = seed_default_admin(&state);

        // Simulate a password change and a deactivation between boots.
        let mut tampered = state.registry.account_by_login(DEFAULT_ADMIN_LOGIN).unwrap();
        tampered.password_hash = "sha256$1$00$00".to_string();
        tampered.active = false;
        state.registry.upsert_account(tampered);

        let second = seed_default_admin(&state);

        // Same account, restored credentials and active flag.
        assert_eq!(first.id, second.id);
        let stored = state.registry.account_by_login(DEFAULT_ADMIN_LOGIN).unwrap();
        assert!(stored.active);
        assert!(state.passwords.verify("admin123", &stored.password_hash));
        assert_eq!(state.registry.list_accounts().len(), 1);
    }
}
