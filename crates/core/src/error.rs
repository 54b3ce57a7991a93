//! Error types for the Redis storage adapter.
//!
//! All errors raised while bootstrapping the command directory or routing a
//! command are represented by the [`Error`] enum. These errors are:
//! - **Structured**: Each variant has typed fields for error details
//! - **Serializable**: Can be converted to/from JSON
//! - **Contextual**: Command and table names travel with per-call errors

use serde::{Deserialize, Serialize};

/// Result type alias for adapter operations
pub type Result<T> = std::result::Result<T, Error>;

/// Adapter errors.
///
/// # Categories
///
/// | Category | Variants | Description |
/// |----------|----------|-------------|
/// | Initialization | `ClientInit`, `RouteDiscovery`, `InvalidFullUserName`, `CatalogConnect`, `CatalogQuery`, `Config` | Abort bootstrap |
/// | Lifecycle | `NotInitialized`, `AlreadyInitialized`, `Closed` | Storage used in the wrong state |
/// | Per-call | `UnsupportedCommand`, `Remote`, `UnexpectedResultType`, `Cancelled`, `DeadlineExceeded` | Reject one command only |
///
/// # Example
///
/// ```ignore
/// match storage.dispatch(&ctx, "SET", row_key, payload).await {
///     Ok(encoded) => { /* write encoded reply */ }
///     Err(Error::UnsupportedCommand { command }) => {
///         println!("{} not support", command);
///     }
///     Err(e) => println!("Error: {}", e),
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, thiserror::Error)]
pub enum Error {
    // ==================== Initialization ====================
    /// The remote KV client could not be constructed
    #[error("client init failed: {reason}")]
    ClientInit { reason: String },

    /// No usable server address in the client's routing table
    #[error("route discovery failed: {reason}")]
    RouteDiscovery { reason: String },

    /// The full user name carries no tenant
    #[error("fullUserName not invalid {full_user_name}")]
    InvalidFullUserName { full_user_name: String },

    /// The catalog connection could not be opened
    #[error("catalog connect failed: {reason}")]
    CatalogConnect { reason: String },

    /// The catalog query, a row scan or the result cursor failed
    #[error("catalog query failed: {reason}")]
    CatalogQuery { reason: String },

    /// Configuration could not be read, parsed or validated
    #[error("invalid config: {reason}")]
    Config { reason: String },

    // ==================== Lifecycle ====================
    /// Storage used before `initialize` completed
    #[error("storage not initialized")]
    NotInitialized,

    /// `initialize` called on an already initialized storage
    #[error("storage already initialized")]
    AlreadyInitialized,

    /// Storage used after `close`
    #[error("storage closed")]
    Closed,

    // ==================== Per-call ====================
    /// The command has no backing table in the directory
    #[error("{command} not support")]
    UnsupportedCommand { command: String },

    /// The remote table operation failed
    #[error("remote call failed: {reason}")]
    Remote { reason: String },

    /// The affected entity lacks the result column or holds a non-string value
    #[error(
        "result returned by obkv client is not string type: command {command}, table {table}, column {column}, found {found}"
    )]
    UnexpectedResultType {
        command: String,
        table: String,
        column: String,
        found: String,
    },

    /// The call context was cancelled
    #[error("command {command} cancelled")]
    Cancelled { command: String },

    /// The call context deadline elapsed before the remote call finished
    #[error("command {command} deadline exceeded")]
    DeadlineExceeded { command: String },
}

impl Error {
    /// Whether this error aborts initialization.
    pub fn is_init_fatal(&self) -> bool {
        matches!(
            self,
            Error::ClientInit { .. }
                | Error::RouteDiscovery { .. }
                | Error::InvalidFullUserName { .. }
                | Error::CatalogConnect { .. }
                | Error::CatalogQuery { .. }
                | Error::Config { .. }
        )
    }

    /// Whether this error is a result decoding failure, as opposed to a
    /// transport failure.
    pub fn is_decode(&self) -> bool {
        matches!(self, Error::UnexpectedResultType { .. })
    }

    /// Shorthand for a remote call failure.
    pub fn remote(reason: impl Into<String>) -> Self {
        Error::Remote {
            reason: reason.into(),
        }
    }

    /// Shorthand for a catalog query failure.
    pub fn catalog_query(reason: impl Into<String>) -> Self {
        Error::CatalogQuery {
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsupported_command_display() {
        let err = Error::UnsupportedCommand {
            command: "HSET".into(),
        };
        assert_eq!(err.to_string(), "HSET not support");
    }

    #[test]
    fn test_invalid_full_user_name_display() {
        let err = Error::InvalidFullUserName {
            full_user_name: "root".into(),
        };
        assert!(err.to_string().contains("root"));
        assert!(err.is_init_fatal());
    }

    #[test]
    fn test_unexpected_result_type_display() {
        let err = Error::UnexpectedResultType {
            command: "GET".into(),
            table: "modis_string_table".into(),
            column: "REDIS_CODE_STR".into(),
            found: "missing".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("not string type"));
        assert!(msg.contains("modis_string_table"));
        assert!(err.is_decode());
        assert!(!err.is_init_fatal());
    }

    #[test]
    fn test_classification() {
        assert!(Error::ClientInit { reason: "x".into() }.is_init_fatal());
        assert!(Error::catalog_query("x").is_init_fatal());
        assert!(!Error::remote("timeout").is_init_fatal());
        assert!(!Error::remote("timeout").is_decode());
        assert!(!Error::NotInitialized.is_init_fatal());
    }
}
