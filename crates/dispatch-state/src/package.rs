//! # Package Entity
//!
//! The shipment aggregate: kind, weight, destination, delivery status, and
//! the weak reference to the transporter currently carrying it. Statuses
//! and kinds serialize as `SCREAMING_SNAKE_CASE` strings to match the wire
//! contract.
//!
//! Business-rule validation (fragile packages require handling
//! instructions; refrigerated packages require a valid temperature range)
//! is enforced through [`Package::validate`] at creation and update time.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use dispatch_core::error::{
    MAX_ADDRESS_LEN, MAX_INSTRUCTIONS_LEN, MAX_PACKAGE_WEIGHT, MIN_ADDRESS_LEN, TEMPERATURE_BOUND,
};
use dispatch_core::{AccountId, PackageId, ValidationError};

/// The category of a package. Immutable after creation; determines which
/// transporter specialty may carry it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PackageKind {
    /// No special handling constraints.
    Standard,
    /// Requires handling instructions.
    Fragile,
    /// Requires a declared temperature range.
    Refrigerated,
}

impl PackageKind {
    /// Return the canonical string representation of this kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Standard => "STANDARD",
            Self::Fragile => "FRAGILE",
            Self::Refrigerated => "REFRIGERATED",
        }
    }

    /// Parse a kind from its canonical name.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "STANDARD" => Some(Self::Standard),
            "FRAGILE" => Some(Self::Fragile),
            "REFRIGERATED" => Some(Self::Refrigerated),
            _ => None,
        }
    }

    /// Whether packages of this kind need more than standard handling.
    pub fn requires_special_handling(&self) -> bool {
        matches!(self, Self::Fragile | Self::Refrigerated)
    }
}

impl std::fmt::Display for PackageKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The delivery status of a package.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PackageStatus {
    /// Created, not yet handed to a transporter.
    Pending,
    /// Assigned to a transporter and under way.
    InTransit,
    /// Delivered to the destination. Finished.
    Delivered,
    /// Delivery cancelled. Finished.
    Cancelled,
}

impl PackageStatus {
    /// Return the canonical string representation of this status.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::InTransit => "IN_TRANSIT",
            Self::Delivered => "DELIVERED",
            Self::Cancelled => "CANCELLED",
        }
    }

    /// Parse a status from its canonical name.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "PENDING" => Some(Self::Pending),
            "IN_TRANSIT" => Some(Self::InTransit),
            "DELIVERED" => Some(Self::Delivered),
            "CANCELLED" => Some(Self::Cancelled),
            _ => None,
        }
    }

    /// Whether the delivery is finished: delivered or cancelled. No further
    /// transporter engagement applies past a finished status.
    pub fn is_finished(&self) -> bool {
        matches!(self, Self::Delivered | Self::Cancelled)
    }

    /// Whether a package in this status may be handed to a transporter.
    /// Only pending packages are assignable.
    pub fn can_assign(&self) -> bool {
        matches!(self, Self::Pending)
    }
}

impl std::fmt::Display for PackageStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A shipment package.
///
/// `transporter_id` is a weak reference: resolving it to a live [`Account`]
/// is always an explicit lookup by the caller, never an embedded object.
///
/// [`Account`]: crate::Account
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Package {
    /// Unique identifier, assigned at creation.
    pub id: PackageId,
    /// The package category. Immutable after creation.
    pub kind: PackageKind,
    /// Weight in kilograms. Positive, at most 1000.
    pub weight: f64,
    /// Destination address, 10-500 characters.
    pub destination_address: String,
    /// Current delivery status.
    pub status: PackageStatus,
    /// The transporter currently carrying this package, if any.
    pub transporter_id: Option<AccountId>,
    /// Handling instructions. Required non-blank for fragile packages.
    pub handling_instructions: Option<String>,
    /// Minimum transport temperature in °C. Meaningful for refrigerated
    /// packages only.
    pub min_temperature: Option<f64>,
    /// Maximum transport temperature in °C. Meaningful for refrigerated
    /// packages only.
    pub max_temperature: Option<f64>,
    /// When the package was created.
    pub created_at: DateTime<Utc>,
    /// When the package was last modified.
    pub updated_at: DateTime<Utc>,
}

impl Package {
    /// Create a new pending, unassigned package. The caller validates with
    /// [`Package::validate`] before persisting.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: PackageId,
        kind: PackageKind,
        weight: f64,
        destination_address: String,
        handling_instructions: Option<String>,
        min_temperature: Option<f64>,
        max_temperature: Option<f64>,
        at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            kind,
            weight,
            destination_address,
            status: PackageStatus::Pending,
            transporter_id: None,
            handling_instructions,
            min_temperature,
            max_temperature,
            created_at: at,
            updated_at: at,
        }
    }

    // ── Derived predicates ──────────────────────────────────────────────

    /// Whether the package currently references a transporter.
    pub fn is_assigned(&self) -> bool {
        self.transporter_id.is_some()
    }

    /// Whether the package is pending.
    pub fn is_pending(&self) -> bool {
        self.status == PackageStatus::Pending
    }

    /// Whether the package is in transit.
    pub fn is_in_transit(&self) -> bool {
        self.status == PackageStatus::InTransit
    }

    /// Whether the package has been delivered.
    pub fn is_delivered(&self) -> bool {
        self.status == PackageStatus::Delivered
    }

    /// Whether the delivery was cancelled.
    pub fn is_cancelled(&self) -> bool {
        self.status == PackageStatus::Cancelled
    }

    /// Whether the delivery is finished (delivered or cancelled).
    pub fn is_finished(&self) -> bool {
        self.status.is_finished()
    }

    /// Whether the package may be handed to a transporter.
    pub fn can_be_assigned(&self) -> bool {
        self.status.can_assign()
    }

    /// Whether the package is fragile.
    pub fn is_fragile(&self) -> bool {
        self.kind == PackageKind::Fragile
    }

    /// Whether the package is refrigerated.
    pub fn is_refrigerated(&self) -> bool {
        self.kind == PackageKind::Refrigerated
    }

    /// Whether the package is standard.
    pub fn is_standard(&self) -> bool {
        self.kind == PackageKind::Standard
    }

    /// Whether the package kind needs more than standard handling.
    pub fn requires_special_handling(&self) -> bool {
        self.kind.requires_special_handling()
    }

    /// Whether the declared temperature range is valid.
    ///
    /// Vacuously true for non-refrigerated packages: the range is only
    /// meaningful for refrigerated transport. This is a policy choice, not
    /// an oversight.
    pub fn temperature_range_valid(&self) -> bool {
        if !self.is_refrigerated() {
            return true;
        }
        match (self.min_temperature, self.max_temperature) {
            (Some(min), Some(max)) => {
                min < max && min >= -TEMPERATURE_BOUND && max <= TEMPERATURE_BOUND
            }
            _ => false,
        }
    }

    /// Whether the handling instructions satisfy the fragile-package rule.
    /// Vacuously true for non-fragile packages.
    pub fn has_valid_handling_instructions(&self) -> bool {
        if !self.is_fragile() {
            return true;
        }
        self.handling_instructions
            .as_deref()
            .is_some_and(|s| !s.trim().is_empty())
    }

    // ── Validation ──────────────────────────────────────────────────────

    /// Check every business rule on the current field values.
    ///
    /// Enforced at creation and update time. Returns the first violated
    /// rule; the check order is stable (weight, address, instructions,
    /// temperature).
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !(self.weight > 0.0 && self.weight <= MAX_PACKAGE_WEIGHT) {
            return Err(ValidationError::InvalidWeight(self.weight));
        }

        let addr_len = self.destination_address.chars().count();
        if !(MIN_ADDRESS_LEN..=MAX_ADDRESS_LEN).contains(&addr_len) {
            return Err(ValidationError::InvalidAddressLength(addr_len));
        }

        if let Some(instructions) = &self.handling_instructions {
            let len = instructions.chars().count();
            if len > MAX_INSTRUCTIONS_LEN {
                return Err(ValidationError::InstructionsTooLong(len));
            }
        }
        if !self.has_valid_handling_instructions() {
            return Err(ValidationError::MissingHandlingInstructions);
        }

        if self.is_refrigerated() {
            let (min, max) = match (self.min_temperature, self.max_temperature) {
                (Some(min), Some(max)) => (min, max),
                _ => return Err(ValidationError::MissingTemperatureRange),
            };
            for bound in [min, max] {
                if !(-TEMPERATURE_BOUND..=TEMPERATURE_BOUND).contains(&bound) {
                    return Err(ValidationError::TemperatureOutOfBounds(bound));
                }
            }
            if min >= max {
                return Err(ValidationError::InvalidTemperatureRange { min, max });
            }
        }

        Ok(())
    }

    // ── Transitions ─────────────────────────────────────────────────────

    /// Record the assignment effect on the package side: reference the
    /// transporter and move to in-transit.
    ///
    /// Precondition checks live in the assignment engine
    /// ([`crate::assignment::assign`]); this method applies the effect.
    pub(crate) fn record_assignment(&mut self, transporter: AccountId, at: DateTime<Utc>) {
        self.transporter_id = Some(transporter);
        self.status = PackageStatus::InTransit;
        self.updated_at = at;
    }

    /// Set the status to any concrete value.
    ///
    /// Deliberately permissive: re-setting the same status or moving
    /// backwards through the graph is accepted. Only an absent status is
    /// rejected, at the boundary, before this is reached.
    pub fn set_status(&mut self, status: PackageStatus, at: DateTime<Utc>) {
        self.status = status;
        self.updated_at = at;
    }

    /// Cancel the delivery.
    pub fn cancel(&mut self, at: DateTime<Utc>) {
        self.set_status(PackageStatus::Cancelled, at);
    }

    /// Mark the package delivered.
    pub fn mark_delivered(&mut self, at: DateTime<Utc>) {
        self.set_status(PackageStatus::Delivered, at);
    }

    /// Apply an update of the mutable descriptive fields, preserving id,
    /// kind, status, transporter reference, and creation time. The caller
    /// re-validates afterwards.
    pub fn apply_update(
        &mut self,
        weight: f64,
        destination_address: String,
        handling_instructions: Option<String>,
        min_temperature: Option<f64>,
        max_temperature: Option<f64>,
        at: DateTime<Utc>,
    ) {
        self.weight = weight;
        self.destination_address = destination_address;
        self.handling_instructions = handling_instructions;
        self.min_temperature = min_temperature;
        self.max_temperature = max_temperature;
        self.updated_at = at;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn standard_package() -> Package {
        Package::new(
            PackageId::new(),
            PackageKind::Standard,
            12.5,
            "14 Harbour Lane, Rotterdam".to_string(),
            None,
            None,
            None,
            Utc::now(),
        )
    }

    fn refrigerated_package(min: f64, max: f64) -> Package {
        Package::new(
            PackageId::new(),
            PackageKind::Refrigerated,
            40.0,
            "7 Coldchain Depot, Hamburg".to_string(),
            None,
            Some(min),
            Some(max),
            Utc::now(),
        )
    }

    #[test]
    fn new_package_is_pending_and_unassigned() {
        let pkg = standard_package();
        assert!(pkg.is_pending());
        assert!(!pkg.is_assigned());
        assert!(pkg.can_be_assigned());
        assert!(!pkg.is_finished());
    }

    #[test]
    fn status_names_roundtrip() {
        for status in [
            PackageStatus::Pending,
            PackageStatus::InTransit,
            PackageStatus::Delivered,
            PackageStatus::Cancelled,
        ] {
            assert_eq!(PackageStatus::from_name(status.as_str()), Some(status));
        }
        assert_eq!(PackageStatus::from_name("SHIPPED"), None);
    }

    #[test]
    fn kind_names_roundtrip() {
        for kind in [
            PackageKind::Standard,
            PackageKind::Fragile,
            PackageKind::Refrigerated,
        ] {
            assert_eq!(PackageKind::from_name(kind.as_str()), Some(kind));
        }
        assert_eq!(PackageKind::from_name("BULK"), None);
    }

    #[test]
    fn serde_uses_screaming_snake_case() {
        let json = serde_json::to_string(&PackageStatus::InTransit).unwrap();
        assert_eq!(json, "\"IN_TRANSIT\"");
        let back: PackageStatus = serde_json::from_str("\"CANCELLED\"").unwrap();
        assert_eq!(back, PackageStatus::Cancelled);
    }

    #[test]
    fn finished_iff_delivered_or_cancelled() {
        assert!(!PackageStatus::Pending.is_finished());
        assert!(!PackageStatus::InTransit.is_finished());
        assert!(PackageStatus::Delivered.is_finished());
        assert!(PackageStatus::Cancelled.is_finished());
    }

    #[test]
    fn only_fragile_and_refrigerated_need_special_handling() {
        assert!(!PackageKind::Standard.requires_special_handling());
        assert!(PackageKind::Fragile.requires_special_handling());
        assert!(PackageKind::Refrigerated.requires_special_handling());
    }

    #[test]
    fn validate_accepts_standard_package() {
        assert!(standard_package().validate().is_ok());
    }

    #[test]
    fn validate_rejects_non_positive_weight() {
        let mut pkg = standard_package();
        pkg.weight = 0.0;
        assert_eq!(pkg.validate(), Err(ValidationError::InvalidWeight(0.0)));
    }

    #[test]
    fn validate_rejects_excess_weight() {
        let mut pkg = standard_package();
        pkg.weight = 1000.5;
        assert!(matches!(
            pkg.validate(),
            Err(ValidationError::InvalidWeight(_))
        ));
    }

    #[test]
    fn validate_rejects_short_address() {
        let mut pkg = standard_package();
        pkg.destination_address = "short".to_string();
        assert_eq!(pkg.validate(), Err(ValidationError::InvalidAddressLength(5)));
    }

    #[test]
    fn validate_rejects_fragile_with_blank_instructions() {
        let mut pkg = standard_package();
        pkg.kind = PackageKind::Fragile;
        pkg.handling_instructions = Some("   ".to_string());
        assert_eq!(
            pkg.validate(),
            Err(ValidationError::MissingHandlingInstructions)
        );
    }

    #[test]
    fn validate_rejects_fragile_without_instructions() {
        let mut pkg = standard_package();
        pkg.kind = PackageKind::Fragile;
        assert_eq!(
            pkg.validate(),
            Err(ValidationError::MissingHandlingInstructions)
        );
    }

    #[test]
    fn validate_accepts_fragile_with_instructions() {
        let mut pkg = standard_package();
        pkg.kind = PackageKind::Fragile;
        pkg.handling_instructions = Some("this side up".to_string());
        assert!(pkg.validate().is_ok());
    }

    #[test]
    fn validate_rejects_inverted_temperature_range() {
        // min >= max is rejected even with both bounds in range.
        let pkg = refrigerated_package(10.0, 5.0);
        assert_eq!(
            pkg.validate(),
            Err(ValidationError::InvalidTemperatureRange {
                min: 10.0,
                max: 5.0
            })
        );
    }

    #[test]
    fn validate_rejects_out_of_bounds_temperature() {
        let pkg = refrigerated_package(-40.0, 5.0);
        assert_eq!(
            pkg.validate(),
            Err(ValidationError::TemperatureOutOfBounds(-40.0))
        );
    }

    #[test]
    fn validate_rejects_missing_temperature_range() {
        let mut pkg = refrigerated_package(0.0, 5.0);
        pkg.max_temperature = None;
        assert_eq!(pkg.validate(), Err(ValidationError::MissingTemperatureRange));
    }

    #[test]
    fn validate_accepts_refrigerated_in_range() {
        assert!(refrigerated_package(-18.0, -2.0).validate().is_ok());
    }

    #[test]
    fn temperature_validity_is_vacuous_for_standard() {
        // Standard and fragile packages are always "valid" on temperature.
        let mut pkg = standard_package();
        pkg.min_temperature = Some(99.0);
        pkg.max_temperature = Some(-99.0);
        assert!(pkg.temperature_range_valid());
    }

    #[test]
    fn set_status_is_permissive() {
        // Documented behavior: the setter enforces no transition graph, so
        // a finished package can be moved back to PENDING. Kept as-is; see
        // the lifecycle module for the release side effect.
        let mut pkg = standard_package();
        pkg.mark_delivered(Utc::now());
        assert!(pkg.is_delivered());
        pkg.set_status(PackageStatus::Pending, Utc::now());
        assert!(pkg.is_pending());
    }

    #[test]
    fn apply_update_preserves_identity_kind_and_status() {
        let mut pkg = standard_package();
        let id = pkg.id;
        let created = pkg.created_at;
        pkg.apply_update(
            3.0,
            "22 Glassworks Row, Vienna, 1020".to_string(),
            Some("cushion both ends".to_string()),
            None,
            None,
            Utc::now(),
        );
        assert_eq!(pkg.id, id);
        assert_eq!(pkg.created_at, created);
        assert!(pkg.is_pending());
        assert_eq!(pkg.kind, PackageKind::Standard);
        assert_eq!(pkg.weight, 3.0);
        assert!(pkg.validate().is_ok());
    }
}
