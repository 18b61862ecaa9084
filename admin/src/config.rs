//! Configuration for the admin binary.
//!
//! Loaded from environment variables:
//!
//! | Variable                      | Default | Meaning                              |
//! |-------------------------------|---------|--------------------------------------|
//! | `SHOPFRONT_LOG_LEVEL`         | `info`  | `tracing` filter directive           |
//! | `SHOPFRONT_ORDER_PREFIX`      | `OR-`   | Prefix of generated order numbers    |
//! | `SHOPFRONT_METRICS_ADDR`      | unset   | Prometheus exporter address          |
//! | `SHOPFRONT_SAVE_TIMEOUT_SECS` | `10`    | How long to wait for a save to land  |

use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::time::Duration;

/// Admin configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminConfig {
    /// Log filter (e.g. `info`, `shopfront_admin=debug`)
    pub log_level: String,
    /// Prefix of generated order numbers
    pub order_prefix: String,
    /// Address of the Prometheus exporter; metrics are off when unset
    pub metrics_addr: Option<SocketAddr>,
    /// Seconds to wait for a submitted form to be saved
    pub save_timeout_secs: u64,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            order_prefix: "OR-".to_string(),
            metrics_addr: None,
            save_timeout_secs: 10,
        }
    }
}

impl AdminConfig {
    /// Load configuration from the process environment
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through `lookup`, falling back to defaults for
    /// missing or unparsable values
    #[must_use]
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let metrics_addr = lookup("SHOPFRONT_METRICS_ADDR").and_then(|addr| {
            addr.parse::<SocketAddr>()
                .inspect_err(|e| tracing::warn!(%addr, error = %e, "Ignoring invalid metrics address"))
                .ok()
        });

        Self {
            log_level: lookup("SHOPFRONT_LOG_LEVEL").unwrap_or(defaults.log_level),
            order_prefix: lookup("SHOPFRONT_ORDER_PREFIX").unwrap_or(defaults.order_prefix),
            metrics_addr,
            save_timeout_secs: lookup("SHOPFRONT_SAVE_TIMEOUT_SECS")
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.save_timeout_secs),
        }
    }

    /// Save timeout as a `Duration`
    #[must_use]
    pub const fn save_timeout(&self) -> Duration {
        Duration::from_secs(self.save_timeout_secs)
    }
}
