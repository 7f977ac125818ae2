//! # Application State
//!
//! Shared state for the Axum application: configuration, the in-memory
//! [`Registry`] of packages and accounts, the token service, the password
//! hasher, and the optional Postgres pool.
//!
//! ## The registry and atomicity
//!
//! Both entity maps live behind **one** `parking_lot::RwLock`. Every
//! operation that touches a package and an account together — assignment,
//! the transporter release on a finished status, deletion of an assigned
//! package — runs inside a single write-lock critical section, so there is
//! no window in which another request can observe or interleave a half
//! applied pair. Two concurrent assignments against the same transporter
//! serialize on the lock and the second one fails the availability check.
//!
//! All registry operations are synchronous (the lock is `parking_lot`, not
//! `tokio::sync`) because the lock is never held across an `.await` point.
//! When a database pool is configured, handlers mirror committed registry
//! writes through the `db` module, which wraps the paired rows in one
//! transaction.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use sqlx::PgPool;
use thiserror::Error;

use dispatch_core::{AccountId, PackageId};
use dispatch_state::account::{Account, Specialty};
use dispatch_state::assignment::{self, AssignmentError};
use dispatch_state::lifecycle::{self, OwnershipError};
use dispatch_state::package::{Package, PackageStatus};

use crate::auth::TokenService;
use crate::credentials::PasswordHasher;

// ── Registry errors ─────────────────────────────────────────────────────

/// Failures of the registry-level assignment operation: the existence
/// checks come first, then the engine's rules.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AssignError {
    /// No package with this id.
    #[error("package {0} not found")]
    PackageNotFound(PackageId),
    /// No account with this id.
    #[error("user {0} not found")]
    TransporterNotFound(AccountId),
    /// The assignment engine refused.
    #[error(transparent)]
    Rule(#[from] AssignmentError),
}

/// Failures of account-mutating registry operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AccountWriteError {
    /// No account with this id.
    #[error("user {0} not found")]
    NotFound(AccountId),
    /// The account exists but is not a transporter.
    #[error("user {0} is not a transporter")]
    NotATransporter(AccountId),
    /// Another account already uses this login.
    #[error("login already exists: {0}")]
    LoginTaken(String),
}

// ── Registry ────────────────────────────────────────────────────────────

#[derive(Debug, Default)]
struct RegistryInner {
    packages: HashMap<PackageId, Package>,
    accounts: HashMap<AccountId, Account>,
}

/// Thread-safe in-memory store of packages and accounts.
///
/// Cloning shares the underlying maps. Listing methods return entities
/// ordered by creation time (id as tiebreaker) so pagination is stable.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    inner: Arc<RwLock<RegistryInner>>,
}

impl Registry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    // ── Package reads ───────────────────────────────────────────────────

    /// Retrieve a package by id.
    pub fn package(&self, id: &PackageId) -> Option<Package> {
        self.inner.read().packages.get(id).cloned()
    }

    /// All packages, ordered by creation time.
    pub fn list_packages(&self) -> Vec<Package> {
        let guard = self.inner.read();
        let mut all: Vec<Package> = guard.packages.values().cloned().collect();
        all.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.id.as_uuid().cmp(b.id.as_uuid()))
        });
        all
    }

    /// Count packages in the given status.
    pub fn count_packages_by_status(&self, status: PackageStatus) -> usize {
        self.inner
            .read()
            .packages
            .values()
            .filter(|p| p.status == status)
            .count()
    }

    /// Count a transporter's packages in the given status.
    pub fn count_packages_by_transporter_and_status(
        &self,
        transporter_id: AccountId,
        status: PackageStatus,
    ) -> usize {
        self.inner
            .read()
            .packages
            .values()
            .filter(|p| p.transporter_id == Some(transporter_id) && p.status == status)
            .count()
    }

    // ── Package writes ──────────────────────────────────────────────────

    /// Insert a package, replacing any previous record with the same id.
    pub fn insert_package(&self, package: Package) {
        self.inner.write().packages.insert(package.id, package);
    }

    /// Mutate a package through `f` and commit only if `f` succeeds.
    ///
    /// `f` runs against a scratch copy; a failed validation leaves the
    /// stored record untouched. Returns `None` if the package does not
    /// exist, otherwise `f`'s verdict with the committed record.
    pub fn update_package_checked<E>(
        &self,
        id: &PackageId,
        f: impl FnOnce(&mut Package) -> Result<(), E>,
    ) -> Option<Result<Package, E>> {
        let mut guard = self.inner.write();
        let entry = guard.packages.get_mut(id)?;
        let mut scratch = entry.clone();
        Some(match f(&mut scratch) {
            Ok(()) => {
                *entry = scratch.clone();
                Ok(scratch)
            }
            Err(e) => Err(e),
        })
    }

    /// Assign a package to a transporter as one atomic unit.
    ///
    /// Resolves both entities, runs the assignment engine, and commits
    /// both mutations under the same write lock. On any failure neither
    /// entity is changed.
    pub fn assign_package(
        &self,
        package_id: &PackageId,
        transporter_id: &AccountId,
        at: DateTime<Utc>,
    ) -> Result<(Package, Account), AssignError> {
        let mut guard = self.inner.write();
        let RegistryInner { packages, accounts } = &mut *guard;

        let package = packages
            .get_mut(package_id)
            .ok_or(AssignError::PackageNotFound(*package_id))?;
        let transporter = accounts
            .get_mut(transporter_id)
            .ok_or(AssignError::TransporterNotFound(*transporter_id))?;

        assignment::assign(package, transporter, at)?;
        Ok((package.clone(), transporter.clone()))
    }

    /// Apply a privileged status change, releasing the assigned
    /// transporter in the same critical section when the new status
    /// finishes the delivery. A dangling transporter reference skips the
    /// release. Returns `None` if the package does not exist.
    pub fn change_package_status(
        &self,
        id: &PackageId,
        new_status: PackageStatus,
        at: DateTime<Utc>,
    ) -> Option<(Package, Option<Account>)> {
        let mut guard = self.inner.write();
        let RegistryInner { packages, accounts } = &mut *guard;

        let package = packages.get_mut(id)?;
        let change = lifecycle::change_status(package, new_status, at);
        let released = apply_release(accounts, change.release, at);
        Some((package.clone(), released))
    }

    /// Apply a self-service status change: the caller must be the
    /// assigned transporter. Same release semantics as
    /// [`Registry::change_package_status`].
    pub fn change_package_status_as_owner(
        &self,
        id: &PackageId,
        caller: AccountId,
        new_status: PackageStatus,
        at: DateTime<Utc>,
    ) -> Option<Result<(Package, Option<Account>), OwnershipError>> {
        let mut guard = self.inner.write();
        let RegistryInner { packages, accounts } = &mut *guard;

        let package = packages.get_mut(id)?;
        Some(
            lifecycle::change_status_as_owner(package, caller, new_status, at).map(|change| {
                let released = apply_release(accounts, change.release, at);
                (package.clone(), released)
            }),
        )
    }

    /// Remove a package, releasing its transporter first if one is
    /// assigned. Returns the removed package and the released account.
    pub fn remove_package(
        &self,
        id: &PackageId,
        at: DateTime<Utc>,
    ) -> Option<(Package, Option<Account>)> {
        let mut guard = self.inner.write();
        let RegistryInner { packages, accounts } = &mut *guard;

        let package = packages.remove(id)?;
        let released = apply_release(accounts, package.transporter_id, at);
        Some((package, released))
    }

    // ── Account reads ───────────────────────────────────────────────────

    /// Retrieve an account by id.
    pub fn account(&self, id: &AccountId) -> Option<Account> {
        self.inner.read().accounts.get(id).cloned()
    }

    /// Retrieve an account by its unique login.
    pub fn account_by_login(&self, login: &str) -> Option<Account> {
        self.inner
            .read()
            .accounts
            .values()
            .find(|a| a.login == login)
            .cloned()
    }

    /// Resolve an account id to its login, if the account exists.
    pub fn account_login(&self, id: &AccountId) -> Option<String> {
        self.inner.read().accounts.get(id).map(|a| a.login.clone())
    }

    /// All accounts, ordered by creation time.
    pub fn list_accounts(&self) -> Vec<Account> {
        let guard = self.inner.read();
        let mut all: Vec<Account> = guard.accounts.values().cloned().collect();
        all.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.id.as_uuid().cmp(b.id.as_uuid()))
        });
        all
    }

    // ── Account writes ──────────────────────────────────────────────────

    /// Insert an account after checking login uniqueness, atomically.
    pub fn create_account(&self, account: Account) -> Result<Account, AccountWriteError> {
        let mut guard = self.inner.write();
        if guard.accounts.values().any(|a| a.login == account.login) {
            return Err(AccountWriteError::LoginTaken(account.login));
        }
        guard.accounts.insert(account.id, account.clone());
        Ok(account)
    }

    /// Insert or replace an account without uniqueness checks. Used by
    /// startup hydration and seeding, where the record is authoritative.
    pub fn upsert_account(&self, account: Account) {
        self.inner.write().accounts.insert(account.id, account);
    }

    /// Update a transporter's login, credentials, and specialty as one
    /// atomic unit, enforcing login uniqueness when the login changes.
    pub fn update_transporter(
        &self,
        id: &AccountId,
        login: String,
        password_hash: Option<String>,
        specialty: Specialty,
        at: DateTime<Utc>,
    ) -> Result<Account, AccountWriteError> {
        let mut guard = self.inner.write();

        let current = guard
            .accounts
            .get(id)
            .ok_or(AccountWriteError::NotFound(*id))?;
        if !current.is_transporter() {
            return Err(AccountWriteError::NotATransporter(*id));
        }
        if current.login != login
            && guard
                .accounts
                .values()
                .any(|a| a.id != *id && a.login == login)
        {
            return Err(AccountWriteError::LoginTaken(login));
        }

        let entry = guard
            .accounts
            .get_mut(id)
            .expect("account present under the same write lock");
        entry.login = login;
        if let Some(hash) = password_hash {
            entry.password_hash = hash;
        }
        entry.specialty = Some(specialty);
        entry.updated_at = at;
        Ok(entry.clone())
    }

    /// Soft-delete a transporter by deactivating the account.
    pub fn deactivate_transporter(
        &self,
        id: &AccountId,
        at: DateTime<Utc>,
    ) -> Result<Account, AccountWriteError> {
        let mut guard = self.inner.write();
        let entry = guard
            .accounts
            .get_mut(id)
            .ok_or(AccountWriteError::NotFound(*id))?;
        if !entry.is_transporter() {
            return Err(AccountWriteError::NotATransporter(*id));
        }
        entry.deactivate(at);
        Ok(entry.clone())
    }

    /// Reactivate any account.
    pub fn activate_account(&self, id: &AccountId, at: DateTime<Utc>) -> Option<Account> {
        let mut guard = self.inner.write();
        let entry = guard.accounts.get_mut(id)?;
        entry.activate(at);
        Some(entry.clone())
    }
}

/// Release a transporter inside an already-held write lock. Best-effort:
/// a missing account record means nothing to release.
fn apply_release(
    accounts: &mut HashMap<AccountId, Account>,
    release: Option<AccountId>,
    at: DateTime<Utc>,
) -> Option<Account> {
    let id = release?;
    match accounts.get_mut(&id) {
        Some(transporter) => {
            lifecycle::release_transporter(transporter, at);
            tracing::info!(transporter_id = %id, "transporter released and set to AVAILABLE");
            Some(transporter.clone())
        }
        None => {
            tracing::warn!(
                transporter_id = %id,
                "assigned transporter record missing; skipping release"
            );
            None
        }
    }
}

// ── Application configuration ───────────────────────────────────────────

/// Default signing secret for development runs without `JWT_SECRET`.
pub const DEV_JWT_SECRET: &str = "dispatch-dev-secret";

/// Default session token lifetime: 24 hours.
pub const DEFAULT_TOKEN_TTL_SECS: u64 = 86_400;

/// Application configuration.
///
/// Custom `Debug` redacts the secrets to prevent credential leakage in
/// logs.
#[derive(Clone)]
pub struct AppConfig {
    /// Port to bind the HTTP server to.
    pub port: u16,
    /// HS256 signing secret for session tokens.
    pub jwt_secret: String,
    /// Session token lifetime in seconds.
    pub token_ttl_secs: u64,
    /// Password the seeded default admin account is (re)created with.
    pub default_admin_password: String,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("port", &self.port)
            .field("jwt_secret", &"[REDACTED]")
            .field("token_ttl_secs", &self.token_ttl_secs)
            .field("default_admin_password", &"[REDACTED]")
            .finish()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            jwt_secret: DEV_JWT_SECRET.to_string(),
            token_ttl_secs: DEFAULT_TOKEN_TTL_SECS,
            default_admin_password: "admin123".to_string(),
        }
    }
}

// ── Application state ───────────────────────────────────────────────────

/// Shared application state accessible to all route handlers.
///
/// Clone-friendly: the registry shares its maps via `Arc`, and the token
/// service and hasher are cheap to clone.
#[derive(Debug, Clone)]
pub struct AppState {
    /// The in-memory entity store.
    pub registry: Registry,
    /// Postgres pool for durable persistence. `None` means in-memory-only
    /// mode.
    pub db_pool: Option<PgPool>,
    /// Session token issue/verify capability.
    pub tokens: TokenService,
    /// Credential hash/verify capability.
    pub passwords: PasswordHasher,
    /// Application configuration.
    pub config: AppConfig,
}

impl AppState {
    /// Create application state with default configuration and no
    /// database pool.
    pub fn new() -> Self {
        Self::with_config(AppConfig::default(), None)
    }

    /// Create application state from configuration and an optional pool.
    pub fn with_config(config: AppConfig, db_pool: Option<PgPool>) -> Self {
        let tokens = TokenService::new(&config.jwt_secret, config.token_ttl_secs);
        Self {
            registry: Registry::new(),
            db_pool,
            tokens,
            passwords: PasswordHasher::new(),
            config,
        }
    }

    /// Hydrate the registry from the database, once, on startup.
    ///
    /// No-op without a pool. Loads all persisted accounts and packages so
    /// reads stay fast and synchronous afterwards.
    pub async fn hydrate_from_db(&self) -> Result<(), String> {
        let pool = match &self.db_pool {
            Some(pool) => pool,
            None => return Ok(()),
        };

        let accounts = crate::db::accounts::load_all(pool)
            .await
            .map_err(|e| format!("failed to load accounts: {e}"))?;
        let account_count = accounts.len();
        for account in accounts {
            self.registry.upsert_account(account);
        }

        let packages = crate::db::packages::load_all(pool)
            .await
            .map_err(|e| format!("failed to load packages: {e}"))?;
        let package_count = packages.len();
        for package in packages {
            self.registry.insert_package(package);
        }

        tracing::info!(
            accounts = account_count,
            packages = package_count,
            "hydrated registry from database"
        );
        Ok(())
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dispatch_state::{Availability, PackageKind};

    fn sample_package() -> Package {
        Package::new(
            PackageId::new(),
            PackageKind::Standard,
            5.0,
            "44 Canal Walk, Dublin 8".to_string(),
            None,
            None,
            None,
            Utc::now(),
        )
    }

    fn sample_transporter(login: &str) -> Account {
        Account::new_transporter(
            AccountId::new(),
            login.to_string(),
            "digest".to_string(),
            Specialty::Standard,
            Utc::now(),
        )
    }

    #[test]
    fn insert_and_get_package() {
        let registry = Registry::new();
        let pkg = sample_package();
        let id = pkg.id;
        registry.insert_package(pkg);
        assert_eq!(registry.package(&id).unwrap().id, id);
        assert!(registry.package(&PackageId::new()).is_none());
    }

    #[test]
    fn list_packages_is_ordered_by_creation() {
        let registry = Registry::new();
        let mut first = sample_package();
        first.created_at = Utc::now() - chrono::Duration::minutes(5);
        let second = sample_package();
        let (first_id, second_id) = (first.id, second.id);
        registry.insert_package(second);
        registry.insert_package(first);

        let ids: Vec<PackageId> = registry.list_packages().iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![first_id, second_id]);
    }

    #[test]
    fn assign_package_happy_path_updates_both() {
        let registry = Registry::new();
        let pkg = sample_package();
        let t = sample_transporter("carrier_a");
        let (pid, tid) = (pkg.id, t.id);
        registry.insert_package(pkg);
        registry.create_account(t).unwrap();

        let (updated_pkg, updated_t) = registry.assign_package(&pid, &tid, Utc::now()).unwrap();

        assert_eq!(updated_pkg.status, PackageStatus::InTransit);
        assert_eq!(updated_pkg.transporter_id, Some(tid));
        assert_eq!(updated_t.availability, Some(Availability::OnDelivery));
        // Committed, not just returned.
        assert_eq!(
            registry.account(&tid).unwrap().availability,
            Some(Availability::OnDelivery)
        );
    }

    #[test]
    fn assign_package_missing_entities() {
        let registry = Registry::new();
        let pkg = sample_package();
        let pid = pkg.id;
        registry.insert_package(pkg);

        let ghost_pkg = PackageId::new();
        let ghost_account = AccountId::new();
        assert_eq!(
            registry
                .assign_package(&ghost_pkg, &ghost_account, Utc::now())
                .unwrap_err(),
            AssignError::PackageNotFound(ghost_pkg)
        );
        assert_eq!(
            registry
                .assign_package(&pid, &ghost_account, Utc::now())
                .unwrap_err(),
            AssignError::TransporterNotFound(ghost_account)
        );
    }

    #[test]
    fn failed_assignment_leaves_both_entities_untouched() {
        let registry = Registry::new();
        let mut pkg = sample_package();
        pkg.kind = PackageKind::Fragile;
        pkg.handling_instructions = Some("bubble wrap".to_string());
        let t = sample_transporter("carrier_b");
        let (pid, tid) = (pkg.id, t.id);
        registry.insert_package(pkg);
        registry.create_account(t).unwrap();

        let err = registry.assign_package(&pid, &tid, Utc::now()).unwrap_err();
        assert!(matches!(
            err,
            AssignError::Rule(AssignmentError::SpecialtyMismatch { .. })
        ));

        assert!(registry.package(&pid).unwrap().is_pending());
        assert!(registry.account(&tid).unwrap().is_available());
    }

    #[test]
    fn finished_status_releases_transporter() {
        let registry = Registry::new();
        let pkg = sample_package();
        let t = sample_transporter("carrier_c");
        let (pid, tid) = (pkg.id, t.id);
        registry.insert_package(pkg);
        registry.create_account(t).unwrap();
        registry.assign_package(&pid, &tid, Utc::now()).unwrap();

        let (updated, released) = registry
            .change_package_status(&pid, PackageStatus::Delivered, Utc::now())
            .unwrap();

        assert!(updated.is_delivered());
        assert_eq!(released.unwrap().id, tid);
        assert!(registry.account(&tid).unwrap().is_available());
    }

    #[test]
    fn release_with_dangling_transporter_is_skipped() {
        let registry = Registry::new();
        let mut pkg = sample_package();
        pkg.status = PackageStatus::InTransit;
        pkg.transporter_id = Some(AccountId::new());
        let pid = pkg.id;
        registry.insert_package(pkg);

        let (updated, released) = registry
            .change_package_status(&pid, PackageStatus::Cancelled, Utc::now())
            .unwrap();
        assert!(updated.is_cancelled());
        assert!(released.is_none());
    }

    #[test]
    fn owner_status_change_enforces_ownership() {
        let registry = Registry::new();
        let pkg = sample_package();
        let t = sample_transporter("carrier_d");
        let stranger = sample_transporter("carrier_e");
        let (pid, tid, sid) = (pkg.id, t.id, stranger.id);
        registry.insert_package(pkg);
        registry.create_account(t).unwrap();
        registry.create_account(stranger).unwrap();
        registry.assign_package(&pid, &tid, Utc::now()).unwrap();

        let result = registry
            .change_package_status_as_owner(&pid, sid, PackageStatus::Delivered, Utc::now())
            .unwrap();
        assert!(result.is_err());
        assert!(registry.package(&pid).unwrap().is_in_transit());

        let (updated, released) = registry
            .change_package_status_as_owner(&pid, tid, PackageStatus::Delivered, Utc::now())
            .unwrap()
            .unwrap();
        assert!(updated.is_delivered());
        assert_eq!(released.unwrap().id, tid);
    }

    #[test]
    fn remove_assigned_package_releases_transporter() {
        let registry = Registry::new();
        let pkg = sample_package();
        let t = sample_transporter("carrier_f");
        let (pid, tid) = (pkg.id, t.id);
        registry.insert_package(pkg);
        registry.create_account(t).unwrap();
        registry.assign_package(&pid, &tid, Utc::now()).unwrap();

        let (removed, released) = registry.remove_package(&pid, Utc::now()).unwrap();
        assert_eq!(removed.id, pid);
        assert_eq!(released.unwrap().id, tid);
        assert!(registry.package(&pid).is_none());
        assert!(registry.account(&tid).unwrap().is_available());
    }

    #[test]
    fn update_package_checked_rolls_back_on_failure() {
        let registry = Registry::new();
        let pkg = sample_package();
        let pid = pkg.id;
        registry.insert_package(pkg);

        let result: Result<Package, &str> = registry
            .update_package_checked(&pid, |p| {
                p.weight = -1.0;
                Err("rejected")
            })
            .unwrap();
        assert!(result.is_err());
        // The stored record kept its original weight.
        assert_eq!(registry.package(&pid).unwrap().weight, 5.0);
    }

    #[test]
    fn create_account_enforces_unique_login() {
        let registry = Registry::new();
        registry
            .create_account(sample_transporter("carrier_g"))
            .unwrap();
        let err = registry
            .create_account(sample_transporter("carrier_g"))
            .unwrap_err();
        assert_eq!(err, AccountWriteError::LoginTaken("carrier_g".to_string()));
    }

    #[test]
    fn update_transporter_checks_login_uniqueness() {
        let registry = Registry::new();
        let t1 = sample_transporter("carrier_h");
        let t2 = sample_transporter("carrier_i");
        let id2 = t2.id;
        registry.create_account(t1).unwrap();
        registry.create_account(t2).unwrap();

        // Renaming t2 onto t1's login is refused.
        let err = registry
            .update_transporter(
                &id2,
                "carrier_h".to_string(),
                None,
                Specialty::Fragile,
                Utc::now(),
            )
            .unwrap_err();
        assert_eq!(err, AccountWriteError::LoginTaken("carrier_h".to_string()));

        // Keeping its own login while changing specialty is fine.
        let updated = registry
            .update_transporter(
                &id2,
                "carrier_i".to_string(),
                None,
                Specialty::Fragile,
                Utc::now(),
            )
            .unwrap();
        assert_eq!(updated.specialty, Some(Specialty::Fragile));
    }

    #[test]
    fn update_transporter_rejects_admins() {
        let registry = Registry::new();
        let admin = Account::new_admin(
            AccountId::new(),
            "admin".to_string(),
            "digest".to_string(),
            Utc::now(),
        );
        let id = admin.id;
        registry.create_account(admin).unwrap();

        let err = registry
            .update_transporter(
                &id,
                "admin".to_string(),
                None,
                Specialty::Standard,
                Utc::now(),
            )
            .unwrap_err();
        assert_eq!(err, AccountWriteError::NotATransporter(id));
    }

    #[test]
    fn deactivate_then_activate_roundtrip() {
        let registry = Registry::new();
        let t = sample_transporter("carrier_j");
        let id = t.id;
        registry.create_account(t).unwrap();

        let deactivated = registry.deactivate_transporter(&id, Utc::now()).unwrap();
        assert!(!deactivated.active);

        let activated = registry.activate_account(&id, Utc::now()).unwrap();
        assert!(activated.active);
    }

    #[test]
    fn counts_by_status() {
        let registry = Registry::new();
        let mut delivered = sample_package();
        delivered.status = PackageStatus::Delivered;
        registry.insert_package(delivered);
        registry.insert_package(sample_package());
        registry.insert_package(sample_package());

        assert_eq!(
            registry.count_packages_by_status(PackageStatus::Pending),
            2
        );
        assert_eq!(
            registry.count_packages_by_status(PackageStatus::Delivered),
            1
        );
        assert_eq!(
            registry.count_packages_by_status(PackageStatus::InTransit),
            0
        );
    }

    #[test]
    fn app_config_debug_redacts_secrets() {
        let config = AppConfig::default();
        let rendered = format!("{config:?}");
        assert!(rendered.contains("[REDACTED]"));
        assert!(!rendered.contains(DEV_JWT_SECRET));
        assert!(!rendered.contains("admin123"));
    }

    #[test]
    fn app_state_new_is_empty() {
        let state = AppState::new();
        assert!(state.registry.list_packages().is_empty());
        assert!(state.registry.list_accounts().is_empty());
        assert!(state.db_pool.is_none());
        assert_eq!(state.config.port, 8080);
    }
}
