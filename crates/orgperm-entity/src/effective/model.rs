//! Effective permission value objects.
//!
//! These are computed by the resolver and never stored; identical inputs
//! always produce identical output.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::assignment::AssignmentSource;

/// The `(resource, action)` pair grants are decided over.
///
/// Serializes as `"resource:action"` so it can be used directly as a JSON
/// map key.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PermissionKey {
    /// Resource component.
    pub resource: String,
    /// Action component.
    pub action: String,
}

impl PermissionKey {
    /// Create a new key.
    pub fn new(resource: impl Into<String>, action: impl Into<String>) -> Self {
        Self {
            resource: resource.into(),
            action: action.into(),
        }
    }
}

impl fmt::Display for PermissionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.resource, self.action)
    }
}

impl FromStr for PermissionKey {
    type Err = orgperm_core::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once(':') {
            Some((resource, action)) if !resource.is_empty() && !action.is_empty() => {
                Ok(Self::new(resource, action))
            }
            _ => Err(orgperm_core::AppError::validation(format!(
                "Invalid permission key: '{s}'. Expected 'resource:action'"
            ))),
        }
    }
}

impl Serialize for PermissionKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for PermissionKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(D::Error::custom)
    }
}

/// The resolved value for one `(resource, action)` pair at a department.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EffectiveEntry {
    /// Catalog permission the winning assignment refers to.
    pub permission_id: Uuid,
    /// Whether the pair is granted or denied. Pairs with no winning
    /// candidate are absent from the map entirely.
    pub granted: bool,
    /// Whether the winner was direct or inherited.
    pub source: AssignmentSource,
    /// The ancestor the value was inherited from (None for direct).
    pub inherited_from: Option<Uuid>,
    /// Priority of the winning assignment.
    pub priority: i32,
}

/// Complete effective permission set for one department.
///
/// `BTreeMap` keeps the output deterministically ordered.
pub type EffectivePermissions = BTreeMap<PermissionKey, EffectiveEntry>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_parses_qualified_name() {
        let key: PermissionKey = "reports:export".parse().unwrap();
        assert_eq!(key.resource, "reports");
        assert_eq!(key.action, "export");
        assert_eq!(key.to_string(), "reports:export");
    }

    #[test]
    fn test_key_rejects_missing_action() {
        assert!("reports".parse::<PermissionKey>().is_err());
        assert!("reports:".parse::<PermissionKey>().is_err());
    }

    #[test]
    fn test_key_serializes_as_string() {
        let key = PermissionKey::new("reports", "view");
        assert_eq!(
            serde_json::to_string(&key).unwrap(),
            "\"reports:view\"".to_string()
        );
    }
}
