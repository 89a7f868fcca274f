//! PostgreSQL pool settings.
//!
//! OrgPerm is an admin-facing control plane; write traffic is bursty
//! (template rollouts, conflict sweeps) but low-volume, so the pool
//! defaults stay small.

use serde::{Deserialize, Serialize};

/// Connection pool settings for the assignment store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL. The only required setting.
    pub url: String,
    /// Upper bound on pooled connections.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Connections kept warm while idle.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
    /// Seconds to wait for a connection before giving up with a
    /// storage error.
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_seconds: u64,
    /// Seconds an idle connection may sit before being closed.
    #[serde(default = "default_idle_timeout")]
    pub idle_timeout_seconds: u64,
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    2
}

fn default_connect_timeout() -> u64 {
    5
}

fn default_idle_timeout() -> u64 {
    600
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_is_the_only_required_field() {
        let config: DatabaseConfig =
            serde_json::from_str(r#"{"url": "postgres://localhost/orgperm"}"#).unwrap();
        assert_eq!(config.max_connections, 10);
        assert_eq!(config.min_connections, 2);
        assert_eq!(config.connect_timeout_seconds, 5);
        assert_eq!(config.idle_timeout_seconds, 600);
    }
}
