//! Department entity model.
//!
//! Departments form a tree managed by an external org-chart collaborator;
//! this engine treats them as read-only input.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A node in the department tree.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Department {
    /// Unique department identifier.
    pub id: Uuid,
    /// Parent department (None only for roots).
    pub parent_id: Option<Uuid>,
    /// Display name.
    pub name: String,
    /// Materialized ancestor chain, root-first, inclusive of self.
    pub path: Vec<Uuid>,
    /// Depth in the tree (0 = root). Always `path.len() - 1`.
    pub level: i32,
    /// When this department was created.
    pub created_at: DateTime<Utc>,
    /// When this department was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Department {
    /// Whether this department is a root of the tree.
    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }

    /// Whether the materialized path agrees with `parent_id` and `level`.
    pub fn path_is_consistent(&self) -> bool {
        if self.path.last() != Some(&self.id) {
            return false;
        }
        if self.path.len() != (self.level as usize) + 1 {
            return false;
        }
        match self.parent_id {
            Some(parent) => self.path.len() >= 2 && self.path[self.path.len() - 2] == parent,
            None => self.path.len() == 1,
        }
    }
}
