//! Storage configuration via a TOML file
//!
//! The OBKV storage backend is configured with a small TOML document naming
//! the config server, the tenant login and the administrative login, plus a
//! `[client]` table of tuning options passed to the table client as-is.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

use modis_core::{tenant_name, ClientConfig, ClientOptions, Error, Result};

/// Conventional config file name.
pub const CONFIG_FILE_NAME: &str = "modis.toml";

/// OBKV storage configuration loaded from TOML.
///
/// # Example
///
/// ```toml
/// config_url = "http://127.0.0.1:8080/services?Action=ObRootServiceInfo&ObCluster=obcluster"
/// full_user_name = "root@redis_tenant#obcluster"
/// password = ""
/// sys_user_name = "root"
/// sys_password = ""
///
/// [client]
/// operation_timeout_ms = 10000
/// ```
#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StorageConfig {
    /// Config server URL.
    pub config_url: String,
    /// Full user name; must carry a tenant.
    pub full_user_name: String,
    /// Password of the full user.
    #[serde(default)]
    pub password: String,
    /// Administrative user name.
    #[serde(default = "default_sys_user_name")]
    pub sys_user_name: String,
    /// Administrative password.
    #[serde(default)]
    pub sys_password: String,
    /// Client tuning options.
    #[serde(default)]
    pub client: ClientOptions,
}

fn default_sys_user_name() -> String {
    "root".to_string()
}

impl fmt::Debug for StorageConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StorageConfig")
            .field("config_url", &self.config_url)
            .field("full_user_name", &self.full_user_name)
            .field("password", &"***")
            .field("sys_user_name", &self.sys_user_name)
            .field("sys_password", &"***")
            .field("client", &self.client)
            .finish()
    }
}

impl StorageConfig {
    /// Create a config with default client options.
    pub fn new(
        config_url: impl Into<String>,
        full_user_name: impl Into<String>,
        password: impl Into<String>,
        sys_user_name: impl Into<String>,
        sys_password: impl Into<String>,
    ) -> Self {
        Self {
            config_url: config_url.into(),
            full_user_name: full_user_name.into(),
            password: password.into(),
            sys_user_name: sys_user_name.into(),
            sys_password: sys_password.into(),
            client: ClientOptions::default(),
        }
    }

    /// The bundle handed to the client factory.
    pub fn client_config(&self) -> ClientConfig {
        ClientConfig {
            config_url: self.config_url.clone(),
            full_user_name: self.full_user_name.clone(),
            password: self.password.clone(),
            sys_user_name: self.sys_user_name.clone(),
            sys_password: self.sys_password.clone(),
            options: self.client.clone(),
        }
    }

    /// Check the fields the adapter depends on.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] for an empty config URL and
    /// [`Error::InvalidFullUserName`] when the full user name has no tenant.
    pub fn validate(&self) -> Result<()> {
        if self.config_url.trim().is_empty() {
            return Err(Error::Config {
                reason: "config_url must not be empty".to_string(),
            });
        }
        tenant_name(&self.full_user_name)?;
        Ok(())
    }

    /// Returns a commented template config.
    pub fn default_toml() -> &'static str {
        r#"# Modis OBKV storage configuration
#
# Config server URL listing the cluster's root servers.
config_url = "http://127.0.0.1:8080/services?Action=ObRootServiceInfo&ObCluster=obcluster"

# Login as user@tenant#cluster (or cluster:tenant:user).
# The tenant is required: the command catalog is read from its endpoint.
full_user_name = "root@redis_tenant#obcluster"
password = ""

# Administrative (sys tenant) login used for route discovery.
sys_user_name = "root"
sys_password = ""

# Table client tuning, forwarded to the client unchanged.
[client]
operation_timeout_ms = 10000
connection_pool_size = 1
route_refresh_interval_ms = 60000
log_level = "info"
"#
    }

    /// Parse and validate a TOML document.
    ///
    /// # Errors
    ///
    /// Returns an error if the document cannot be parsed or fails validation.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: StorageConfig = toml::from_str(content).map_err(|e| Error::Config {
            reason: format!("Failed to parse config: {}", e),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a config file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed or validated.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| Error::Config {
            reason: format!("Failed to read config file '{}': {}", path.display(), e),
        })?;
        Self::from_toml_str(&content).map_err(|e| match e {
            Error::Config { reason } => Error::Config {
                reason: format!("{} ({})", reason, path.display()),
            },
            other => other,
        })
    }

    /// Serialize this config to TOML and write it to the given path.
    pub fn write_to_file(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self).map_err(|e| Error::Config {
            reason: format!("Failed to serialize config: {}", e),
        })?;
        std::fs::write(path, content).map_err(|e| Error::Config {
            reason: format!("Failed to write config file '{}': {}", path.display(), e),
        })
    }
}
