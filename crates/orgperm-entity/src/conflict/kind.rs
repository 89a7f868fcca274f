//! Conflict classification enums.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How two or more assignments visible to a department disagree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConflictType {
    /// Two or more direct rows for the same pair at the same department.
    /// A write-path invariant violation; always critical, never
    /// auto-resolved.
    Duplicate,
    /// The direct row at the department disagrees on `granted` with what
    /// inheritance would otherwise produce.
    Contradictory,
    /// The direct row exactly restates what inheritance already produces.
    Redundant,
}

impl ConflictType {
    /// Return the type as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Duplicate => "duplicate",
            Self::Contradictory => "contradictory",
            Self::Redundant => "redundant",
        }
    }
}

impl fmt::Display for ConflictType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ConflictType {
    type Err = orgperm_core::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "duplicate" => Ok(Self::Duplicate),
            "contradictory" => Ok(Self::Contradictory),
            "redundant" => Ok(Self::Redundant),
            _ => Err(orgperm_core::AppError::validation(format!(
                "Invalid conflict type: '{s}'. Expected one of: duplicate, contradictory, redundant"
            ))),
        }
    }
}

/// How urgently a conflict needs administrator attention.
///
/// Ordered so that `Low < Medium < High < Critical`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum ConflictSeverity {
    /// Harmless; safe to auto-resolve.
    Low,
    /// Disagreement limited to a single ancestor level.
    Medium,
    /// Disagreement spanning multiple ancestor levels.
    High,
    /// Involves a critical-category permission or a same-level duplicate.
    Critical,
}

impl ConflictSeverity {
    /// Return the severity as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }
}

impl fmt::Display for ConflictSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ConflictSeverity {
    type Err = orgperm_core::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            "critical" => Ok(Self::Critical),
            _ => Err(orgperm_core::AppError::validation(format!(
                "Invalid conflict severity: '{s}'. Expected one of: low, medium, high, critical"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_ordering() {
        assert!(ConflictSeverity::Low < ConflictSeverity::Medium);
        assert!(ConflictSeverity::High < ConflictSeverity::Critical);
    }
}
