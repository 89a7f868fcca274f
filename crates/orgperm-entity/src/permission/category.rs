//! Permission category enumeration.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Functional category of a catalog permission.
///
/// `Critical` category permissions escalate the severity of any conflict
/// they participate in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "permission_category", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum PermissionCategory {
    /// Day-to-day functionality.
    General,
    /// Business data operations (reports, exports).
    Business,
    /// Administrative screens and settings.
    Admin,
    /// Security-sensitive operations; conflicts involving these are
    /// always surfaced at critical severity.
    Critical,
}

impl PermissionCategory {
    /// Return the category as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::General => "general",
            Self::Business => "business",
            Self::Admin => "admin",
            Self::Critical => "critical",
        }
    }
}

impl fmt::Display for PermissionCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for PermissionCategory {
    type Err = orgperm_core::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "general" => Ok(Self::General),
            "business" => Ok(Self::Business),
            "admin" => Ok(Self::Admin),
            "critical" => Ok(Self::Critical),
            _ => Err(orgperm_core::AppError::validation(format!(
                "Invalid permission category: '{s}'. Expected one of: general, business, admin, critical"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_str() {
        for cat in [
            PermissionCategory::General,
            PermissionCategory::Business,
            PermissionCategory::Admin,
            PermissionCategory::Critical,
        ] {
            assert_eq!(cat.as_str().parse::<PermissionCategory>().unwrap(), cat);
        }
    }

    #[test]
    fn test_unknown_category_rejected() {
        assert!("superuser".parse::<PermissionCategory>().is_err());
    }
}
