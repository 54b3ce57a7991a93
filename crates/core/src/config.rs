//! Client connection bundle
//!
//! [`ClientConfig`] is what a [`ClientFactory`](crate::traits::ClientFactory)
//! receives to construct a table client. [`ClientOptions`] are tuning knobs
//! forwarded to the client untouched; the adapter itself never reads them.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Tuning options for the remote table client.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ClientOptions {
    /// Per-operation timeout in milliseconds (default: 10000)
    #[serde(default = "default_operation_timeout_ms")]
    pub operation_timeout_ms: u64,
    /// Connections kept per server (default: 1)
    #[serde(default = "default_connection_pool_size")]
    pub connection_pool_size: usize,
    /// Interval between routing table refreshes in milliseconds (default: 60000)
    #[serde(default = "default_route_refresh_interval_ms")]
    pub route_refresh_interval_ms: u64,
    /// Client-side log level (default: "info")
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_operation_timeout_ms() -> u64 {
    10_000
}

fn default_connection_pool_size() -> usize {
    1
}

fn default_route_refresh_interval_ms() -> u64 {
    60_000
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            operation_timeout_ms: default_operation_timeout_ms(),
            connection_pool_size: default_connection_pool_size(),
            route_refresh_interval_ms: default_route_refresh_interval_ms(),
            log_level: default_log_level(),
        }
    }
}

/// Everything needed to construct a table client.
#[derive(Clone, PartialEq, Eq, Default)]
pub struct ClientConfig {
    /// Config server URL listing the cluster's root servers
    pub config_url: String,
    /// Full user name, `user@tenant#cluster` or `cluster:tenant:user`
    pub full_user_name: String,
    /// Password of the full user
    pub password: String,
    /// Administrative (sys tenant) user name
    pub sys_user_name: String,
    /// Administrative password
    pub sys_password: String,
    /// Client tuning options
    pub options: ClientOptions,
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("config_url", &self.config_url)
            .field("full_user_name", &self.full_user_name)
            .field("password", &"***")
            .field("sys_user_name", &self.sys_user_name)
            .field("sys_password", &"***")
            .field("options", &self.options)
            .finish()
    }
}
