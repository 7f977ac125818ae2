//! # Assignment Engine
//!
//! Decides whether a package may be handed to a transporter and applies
//! the two-entity effect. Preconditions are checked in a fixed order, each
//! producing a distinct failure; no entity is mutated until every check has
//! passed, so a failed assignment leaves both values untouched.
//!
//! Existence and role resolution of the two entities is the caller's job
//! (it owns the store); this module owns the rules and the effect. The
//! caller must apply the result as one atomic write — see the registry in
//! the API crate.

use chrono::{DateTime, Utc};
use thiserror::Error;

use dispatch_core::AccountId;

use crate::account::{Account, Availability, Specialty};
use crate::package::{Package, PackageKind, PackageStatus};

/// Why an assignment was refused.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AssignmentError {
    /// The target account is not a transporter.
    #[error("account {0} is not a transporter")]
    NotATransporter(AccountId),

    /// The package is not in an assignable state. Only pending packages
    /// can be assigned.
    #[error("package cannot be assigned in status {0}")]
    NotAssignable(PackageStatus),

    /// The transporter's specialty does not match the package kind.
    #[error("transporter with specialty {specialty} cannot handle a {kind} package")]
    SpecialtyMismatch {
        /// The kind of the package being assigned.
        kind: PackageKind,
        /// The transporter's specialty.
        specialty: Specialty,
    },

    /// The transporter cannot take a new package right now.
    #[error("transporter {transporter_id} is not available (currently {availability})")]
    TransporterUnavailable {
        /// The transporter that was targeted.
        transporter_id: AccountId,
        /// The transporter's current availability.
        availability: Availability,
    },
}

/// Assign `package` to `transporter`.
///
/// Checks, in order: the account is a transporter, the package is
/// assignable, the specialty matches the package kind, and the transporter
/// can take a new package. On success both entities are mutated in one
/// step: the package references the transporter and moves to in-transit,
/// and the transporter goes on delivery.
pub fn assign(
    package: &mut Package,
    transporter: &mut Account,
    at: DateTime<Utc>,
) -> Result<(), AssignmentError> {
    if !transporter.is_transporter() {
        return Err(AssignmentError::NotATransporter(transporter.id));
    }

    if !package.can_be_assigned() {
        return Err(AssignmentError::NotAssignable(package.status));
    }

    if !transporter.can_handle(package.kind) {
        return Err(AssignmentError::SpecialtyMismatch {
            kind: package.kind,
            // Invariant: a transporter without a specialty fails can_handle,
            // and admins were rejected above, so the specialty is present.
            specialty: transporter
                .specialty
                .unwrap_or(Specialty::Standard),
        });
    }

    if !transporter.can_take_new_package() {
        return Err(AssignmentError::TransporterUnavailable {
            transporter_id: transporter.id,
            availability: transporter
                .availability
                .unwrap_or(Availability::OnDelivery),
        });
    }

    package.record_assignment(transporter.id, at);
    transporter.set_on_delivery(at);
    Ok(())
}
