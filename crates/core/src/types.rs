//! Core type definitions
//!
//! This module defines the routing and connection types shared by the
//! client boundary and the storage adapter:
//! - EntityType: Protocol mode requested from the KV client
//! - ServerAddr: One server from the client's routing table
//! - DataSource: Relational endpoint used to read the command catalog
//! - CallOptions: Per-call options for a table operation

use serde::{Deserialize, Serialize};
use std::fmt;

/// Database exposed by every tenant's relational endpoint.
pub const CATALOG_DATABASE: &str = "oceanbase";

/// User the catalog connection authenticates as, qualified by tenant.
pub const CATALOG_USER: &str = "root";

/// Protocol mode of a table client.
///
/// The entity type decides how the server interprets table operations;
/// the Redis adapter always asks for [`EntityType::Redis`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum EntityType {
    /// Server chooses based on the table
    #[default]
    Dynamic,
    /// Plain key-value semantics
    KV,
    /// Redis-compatible semantics
    Redis,
}

/// A server address from the routing table.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ServerAddr {
    /// Server IP
    pub ip: String,
    /// RPC port
    pub svr_port: u16,
    /// Relational (SQL) port
    pub sql_port: u16,
}

impl ServerAddr {
    /// Create a new server address
    pub fn new(ip: impl Into<String>, svr_port: u16, sql_port: u16) -> Self {
        Self {
            ip: ip.into(),
            svr_port,
            sql_port,
        }
    }
}

impl fmt::Display for ServerAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.ip, self.svr_port)
    }
}

/// Connection target for the command catalog.
#[derive(Clone, PartialEq, Eq)]
pub struct DataSource {
    /// Login user, `root@<tenant>`
    pub user: String,
    /// Login password
    pub password: String,
    /// Server IP
    pub host: String,
    /// Relational port
    pub port: u16,
    /// Database name
    pub database: String,
}

impl DataSource {
    /// Build the catalog data source for a tenant on a resolved server.
    pub fn for_tenant(tenant: &str, password: &str, addr: &ServerAddr) -> Self {
        Self {
            user: format!("{}@{}", CATALOG_USER, tenant),
            password: password.to_string(),
            host: addr.ip.clone(),
            port: addr.sql_port,
            database: CATALOG_DATABASE.to_string(),
        }
    }

    /// MySQL driver DSN: `user:password@tcp(host:port)/database`.
    pub fn dsn(&self) -> String {
        format!(
            "{}:{}@tcp({}:{})/{}",
            self.user, self.password, self.host, self.port, self.database
        )
    }
}

// Password is never printed.
impl fmt::Display for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:***@tcp({}:{})/{}",
            self.user, self.host, self.port, self.database
        )
    }
}

impl fmt::Debug for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DataSource")
            .field("user", &self.user)
            .field("password", &"***")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("database", &self.database)
            .finish()
    }
}

/// Options for a single table operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CallOptions {
    /// Ask the server to return the affected entity
    pub return_affected_entity: bool,
}

impl CallOptions {
    /// Options with `return_affected_entity` set
    pub fn returning_entity() -> Self {
        Self {
            return_affected_entity: true,
        }
    }
}
