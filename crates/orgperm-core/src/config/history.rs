//! History retention configuration.

use serde::{Deserialize, Serialize};

/// Settings for the append-only permission history log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryConfig {
    /// Default retention window in days, used when a purge request does
    /// not specify its own cutoff.
    #[serde(default = "default_retention_days")]
    pub retention_days: u32,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            retention_days: default_retention_days(),
        }
    }
}

fn default_retention_days() -> u32 {
    90
}
