//! Resolution strategy enumeration.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Administrator-declared strategies for resolving a conflict.
///
/// A closed enum, exhaustively matched wherever strategies are handled,
/// so adding a strategy is a compile-time-visible change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionStrategy {
    /// The inherited (ancestor) value wins; the department's direct row
    /// is removed.
    KeepParent,
    /// The department's direct row wins; inheritance for the pair is cut.
    KeepChild,
    /// Union the opaque condition bags. Only valid when the disagreement
    /// is on conditions, not on `granted`.
    Merge,
    /// Persist whichever candidate the priority rules already favor.
    PriorityBased,
    /// The caller supplies the exact target assignment state.
    Manual,
}

impl ResolutionStrategy {
    /// Return the strategy as a snake_case string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::KeepParent => "keep_parent",
            Self::KeepChild => "keep_child",
            Self::Merge => "merge",
            Self::PriorityBased => "priority_based",
            Self::Manual => "manual",
        }
    }
}

impl fmt::Display for ResolutionStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ResolutionStrategy {
    type Err = orgperm_core::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "keep_parent" => Ok(Self::KeepParent),
            "keep_child" => Ok(Self::KeepChild),
            "merge" => Ok(Self::Merge),
            "priority_based" => Ok(Self::PriorityBased),
            "manual" => Ok(Self::Manual),
            _ => Err(orgperm_core::AppError::validation(format!(
                "Invalid resolution strategy: '{s}'. Expected one of: \
                 keep_parent, keep_child, merge, priority_based, manual"
            ))),
        }
    }
}
