//! # Identifier Newtypes
//!
//! Domain-primitive newtypes for the two aggregate identifiers in the
//! system. Each identifier is a distinct type — you cannot pass a
//! [`PackageId`] where an [`AccountId`] is expected.
//!
//! Both wrap a random v4 UUID and are always valid by construction.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A unique identifier for a shipment package.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PackageId(Uuid);

impl PackageId {
    /// Create a new random package identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create a package identifier from an existing UUID.
    pub fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    /// Access the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for PackageId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for PackageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A unique identifier for an account (admin or transporter).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountId(Uuid);

impl AccountId {
    /// Create a new random account identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create an account identifier from an existing UUID.
    pub fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    /// Access the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for AccountId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for AccountId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn package_ids_are_unique() {
        assert_ne!(PackageId::new(), PackageId::new());
    }

    #[test]
    fn account_ids_are_unique() {
        assert_ne!(AccountId::new(), AccountId::new());
    }

    #[test]
    fn package_id_uuid_roundtrip() {
        let raw = Uuid::new_v4();
        let id = PackageId::from_uuid(raw);
        assert_eq!(*id.as_uuid(), raw);
    }

    #[test]
    fn display_matches_inner_uuid() {
        let raw = Uuid::new_v4();
        assert_eq!(AccountId::from_uuid(raw).to_string(), raw.to_string());
    }

    #[test]
    fn serde_is_transparent() {
        let raw = Uuid::new_v4();
        let id = PackageId::from_uuid(raw);
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{raw}\""));

        let back: PackageId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }
}
