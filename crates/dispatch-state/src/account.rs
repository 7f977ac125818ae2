//! # Account Entity
//!
//! Admin and transporter accounts. Transporters carry a [`Specialty`] that
//! must match the package kind 1:1, and an [`Availability`] that is toggled
//! only by the assignment engine and the status lifecycle — callers never
//! set it directly.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use dispatch_core::AccountId;

use crate::package::PackageKind;

/// The role of an account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    /// Manages packages and transporter accounts.
    Admin,
    /// Delivers packages assigned to them.
    Transporter,
}

impl Role {
    /// Return the canonical string representation of this role.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "ADMIN",
            Self::Transporter => "TRANSPORTER",
        }
    }

    /// Parse a role from its canonical name.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "ADMIN" => Some(Self::Admin),
            "TRANSPORTER" => Some(Self::Transporter),
            _ => None,
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The package category a transporter is permitted to carry.
///
/// Specialties map 1:1 to package kinds — a refrigerated transporter
/// carries refrigerated packages only, with no cross-matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Specialty {
    /// Carries standard packages.
    Standard,
    /// Carries fragile packages.
    Fragile,
    /// Carries refrigerated packages.
    Refrigerated,
}

impl Specialty {
    /// Return the canonical string representation of this specialty.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Standard => "STANDARD",
            Self::Fragile => "FRAGILE",
            Self::Refrigerated => "REFRIGERATED",
        }
    }

    /// Parse a specialty from its canonical name.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "STANDARD" => Some(Self::Standard),
            "FRAGILE" => Some(Self::Fragile),
            "REFRIGERATED" => Some(Self::Refrigerated),
            _ => None,
        }
    }

    /// The specialty ↔ kind matching table. Exact 1:1 correspondence.
    pub fn matches_kind(&self, kind: PackageKind) -> bool {
        matches!(
            (self, kind),
            (Self::Standard, PackageKind::Standard)
                | (Self::Fragile, PackageKind::Fragile)
                | (Self::Refrigerated, PackageKind::Refrigerated)
        )
    }
}

impl std::fmt::Display for Specialty {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A transporter's capacity state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Availability {
    /// Free to take a new package.
    Available,
    /// Currently carrying a package.
    OnDelivery,
}

impl Availability {
    /// Return the canonical string representation of this availability.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Available => "AVAILABLE",
            Self::OnDelivery => "ON_DELIVERY",
        }
    }

    /// Parse an availability from its canonical name.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "AVAILABLE" => Some(Self::Available),
            "ON_DELIVERY" => Some(Self::OnDelivery),
            _ => None,
        }
    }

    /// Whether a transporter in this state can take a new package.
    pub fn can_transport(&self) -> bool {
        matches!(self, Self::Available)
    }
}

impl std::fmt::Display for Availability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An account: an admin or a transporter.
///
/// `specialty` and `availability` are populated for transporters only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    /// Unique identifier.
    pub id: AccountId,
    /// Unique login name.
    pub login: String,
    /// Opaque password digest. Never serialized into API responses.
    pub password_hash: String,
    /// The account role.
    pub role: Role,
    /// Whether the account may authenticate. Toggled by admins.
    pub active: bool,
    /// The package category this transporter carries. `None` for admins.
    pub specialty: Option<Specialty>,
    /// Capacity state. `None` for admins.
    pub availability: Option<Availability>,
    /// When the account was created.
    pub created_at: DateTime<Utc>,
    /// When the account was last modified.
    pub updated_at: DateTime<Utc>,
}

impl Account {
    /// Create a new active admin account.
    pub fn new_admin(id: AccountId, login: String, password_hash: String, at: DateTime<Utc>) -> Self {
        Self {
            id,
            login,
            password_hash,
            role: Role::Admin,
            active: true,
            specialty: None,
            availability: None,
            created_at: at,
            updated_at: at,
        }
    }

    /// Create a new active transporter account, initially available.
    pub fn new_transporter(
        id: AccountId,
        login: String,
        password_hash: String,
        specialty: Specialty,
        at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            login,
            password_hash,
            role: Role::Transporter,
            active: true,
            specialty: Some(specialty),
            availability: Some(Availability::Available),
            created_at: at,
            updated_at: at,
        }
    }

    // ── Derived predicates ──────────────────────────────────────────────

    /// Whether this account is an admin.
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Whether this account is a transporter.
    pub fn is_transporter(&self) -> bool {
        self.role == Role::Transporter
    }

    /// Whether this transporter is free to take a new package.
    pub fn is_available(&self) -> bool {
        self.is_transporter() && self.availability == Some(Availability::Available)
    }

    /// Whether this transporter is currently carrying a package.
    pub fn is_on_delivery(&self) -> bool {
        self.is_transporter() && self.availability == Some(Availability::OnDelivery)
    }

    /// Whether this transporter may carry a package of the given kind.
    /// Always false for admins and transporters without a specialty.
    pub fn can_handle(&self, kind: PackageKind) -> bool {
        self.is_transporter()
            && self
                .specialty
                .is_some_and(|specialty| specialty.matches_kind(kind))
    }

    /// Whether this transporter can take a new package right now: an
    /// active transporter whose availability permits transport.
    pub fn can_take_new_package(&self) -> bool {
        self.is_transporter()
            && self.active
            && self.availability.is_some_and(|a| a.can_transport())
    }

    // ── Transitions ─────────────────────────────────────────────────────

    /// Allow the account to authenticate again.
    pub fn activate(&mut self, at: DateTime<Utc>) {
        self.active = true;
        self.updated_at = at;
    }

    /// Bar the account from authenticating (soft delete).
    pub fn deactivate(&mut self, at: DateTime<Utc>) {
        self.active = false;
        self.updated_at = at;
    }

    /// Mark the transporter as carrying a package. No-op for admins.
    pub(crate) fn set_on_delivery(&mut self, at: DateTime<Utc>) {
        if self.is_transporter() {
            self.availability = Some(Availability::OnDelivery);
            self.updated_at = at;
        }
    }

    /// Release the transporter back to available. No-op for admins.
    pub(crate) fn set_available(&mut self, at: DateTime<Utc>) {
        if self.is_transporter() {
            self.availability = Some(Availability::Available);
            self.updated_at = at;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn transporter(specialty: Specialty) -> Account {
        Account::new_transporter(
            AccountId::new(),
            "carrier_7".to_string(),
            "digest".to_string(),
            specialty,
            Utc::now(),
        )
    }

    fn admin() -> Account {
        Account::new_admin(
            AccountId::new(),
            "admin".to_string(),
            "digest".to_string(),
            Utc::now(),
        )
    }

    #[test]
    fn new_transporter_is_active_and_available() {
        let t = transporter(Specialty::Standard);
        assert!(t.is_transporter());
        assert!(t.active);
        assert!(t.is_available());
        assert!(t.can_take_new_package());
    }

    #[test]
    fn admin_has_no_transporter_fields() {
        let a = admin();
        assert!(a.is_admin());
        assert!(a.specialty.is_none());
        assert!(a.availability.is_none());
        assert!(!a.is_available());
        assert!(!a.can_take_new_package());
    }

    #[test]
    fn specialty_matching_is_exact() {
        assert!(Specialty::Standard.matches_kind(PackageKind::Standard));
        assert!(Specialty::Fragile.matches_kind(PackageKind::Fragile));
        assert!(Specialty::Refrigerated.matches_kind(PackageKind::Refrigerated));

        // No cross-matching in any direction.
        assert!(!Specialty::Standard.matches_kind(PackageKind::Fragile));
        assert!(!Specialty::Fragile.matches_kind(PackageKind::Refrigerated));
        assert!(!Specialty::Refrigerated.matches_kind(PackageKind::Standard));
    }

    #[test]
    fn can_handle_respects_specialty() {
        let t = transporter(Specialty::Fragile);
        assert!(t.can_handle(PackageKind::Fragile));
        assert!(!t.can_handle(PackageKind::Standard));
    }

    #[test]
    fn admin_cannot_handle_any_kind() {
        let a = admin();
        assert!(!a.can_handle(PackageKind::Standard));
        assert!(!a.can_handle(PackageKind::Fragile));
        assert!(!a.can_handle(PackageKind::Refrigerated));
    }

    #[test]
    fn inactive_transporter_cannot_take_packages() {
        let mut t = transporter(Specialty::Standard);
        t.deactivate(Utc::now());
        assert!(!t.can_take_new_package());
    }

    #[test]
    fn on_delivery_transporter_cannot_take_packages() {
        let mut t = transporter(Specialty::Standard);
        t.set_on_delivery(Utc::now());
        assert!(t.is_on_delivery());
        assert!(!t.can_take_new_package());
    }

    #[test]
    fn release_restores_availability() {
        let mut t = transporter(Specialty::Standard);
        t.set_on_delivery(Utc::now());
        t.set_available(Utc::now());
        assert!(t.is_available());
        assert!(t.can_take_new_package());
    }

    #[test]
    fn availability_setters_are_noops_for_admins() {
        let mut a = admin();
        let before = a.updated_at;
        a.set_on_delivery(Utc::now());
        assert!(a.availability.is_none());
        assert_eq!(a.updated_at, before);
    }

    #[test]
    fn activate_after_deactivate_roundtrip() {
        let mut t = transporter(Specialty::Refrigerated);
        t.deactivate(Utc::now());
        assert!(!t.active);
        t.activate(Utc::now());
        assert!(t.active);
        assert!(t.can_take_new_package());
    }

    #[test]
    fn role_and_availability_names_roundtrip() {
        assert_eq!(Role::from_name("ADMIN"), Some(Role::Admin));
        assert_eq!(Role::from_name("TRANSPORTER"), Some(Role::Transporter));
        assert_eq!(Role::from_name("ROOT"), None);
        assert_eq!(
            Availability::from_name("ON_DELIVERY"),
            Some(Availability::OnDelivery)
        );
        assert_eq!(Availability::from_name("BUSY"), None);
    }

    #[test]
    fn serde_uses_screaming_snake_case() {
        assert_eq!(
            serde_json::to_string(&Availability::OnDelivery).unwrap(),
            "\"ON_DELIVERY\""
        );
        assert_eq!(
            serde_json::to_string(&Specialty::Refrigerated).unwrap(),
            "\"REFRIGERATED\""
        );
    }
}
