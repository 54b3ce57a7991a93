//! # Modis Storage
//!
//! OBKV-backed storage for Redis commands.
//!
//! Each Redis command is served by a physical OBKV table. This crate
//! provides:
//! - [`Storage`] - Lifecycle: client construction, bootstrap, shutdown
//! - [`Directory`] - Command name to table name mapping, read from the
//!   tenant's `DBA_OB_KV_REDIS_TABLE` view
//! - [`Router`] - Sends one command to its table and decodes the reply
//! - [`StorageConfig`] - TOML configuration
//!
//! ## Quick Start
//!
//! ```text
//! use modis_storage::{CallContext, Storage, StorageConfig};
//!
//! let config = StorageConfig::from_file("modis.toml".as_ref())?;
//! let storage = Storage::new(config, client_factory, catalog_connector);
//! storage.initialize().await?;
//!
//! let reply = storage
//!     .dispatch(&CallContext::background(), "GET", &row_key, &encoded)
//!     .await?;
//! ```

#![warn(missing_docs)]

pub mod config;
pub mod directory;
pub mod router;
mod storage;
pub mod testing;

pub use config::{StorageConfig, CONFIG_FILE_NAME};
pub use directory::{resolve, Directory, CATALOG_QUERY};
pub use router::{decode_result, CallContext, ResultField, Router, PAYLOAD_COLUMN};
pub use storage::Storage;

// Re-export core types so users don't need modis-core directly
pub use modis_core::*;
