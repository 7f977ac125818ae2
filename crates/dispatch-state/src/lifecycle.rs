//! # Status Lifecycle
//!
//! Applies status changes to packages and computes the transporter-release
//! side effect. The documented delivery graph is
//!
//! ```text
//! PENDING ──(assign)──▶ IN_TRANSIT ──(deliver)──▶ DELIVERED
//!    │                      │
//!    └──────(cancel)────────┴──────(cancel)─────▶ CANCELLED
//! ```
//!
//! but the setter itself accepts any concrete status, including re-setting
//! the same value or moving backwards. That permissiveness is the observed
//! behavior of the system and is kept as-is; the tests pin it down rather
//! than tightening it.
//!
//! Whenever the resulting status is finished (DELIVERED or CANCELLED) and a
//! transporter is assigned, that transporter must be released to AVAILABLE
//! in the same atomic unit. The release is best-effort: a dangling
//! transporter reference skips the release instead of failing the change.

use chrono::{DateTime, Utc};
use thiserror::Error;

use dispatch_core::AccountId;

use crate::account::Account;
use crate::package::{Package, PackageStatus};

/// The outcome of a status change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusChange {
    /// The transporter to release back to AVAILABLE, when the change
    /// finished the delivery while a transporter was assigned. The caller
    /// applies the release via [`release_transporter`] inside the same
    /// atomic write; a missing account record is silently skipped.
    pub release: Option<AccountId>,
}

/// Self-service status changes are restricted to the assigned transporter.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OwnershipError {
    /// The caller is not the transporter assigned to the package.
    #[error("package {0} does not belong to this transporter")]
    NotOwner(dispatch_core::PackageId),
}

/// Apply a privileged status change to any package.
///
/// Returns the release directive the caller must honor atomically.
pub fn change_status(
    package: &mut Package,
    new_status: PackageStatus,
    at: DateTime<Utc>,
) -> StatusChange {
    package.set_status(new_status, at);

    let release = if package.is_finished() {
        package.transporter_id
    } else {
        None
    };
    StatusChange { release }
}

/// Apply a self-service status change: the caller must be the transporter
/// currently assigned to the package.
pub fn change_status_as_owner(
    package: &mut Package,
    caller: AccountId,
    new_status: PackageStatus,
    at: DateTime<Utc>,
) -> Result<StatusChange, OwnershipError> {
    if package.transporter_id != Some(caller) {
        return Err(OwnershipError::NotOwner(package.id));
    }
    Ok(change_status(package, new_status, at))
}

/// Release a transporter back to AVAILABLE after a finished delivery.
pub fn release_transporter(transporter: &mut Account, at: DateTime<Utc>) {
    transporter.set_available(at);
}
