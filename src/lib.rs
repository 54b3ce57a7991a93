//! Modis - Redis-compatible commands over OBKV tables
//!
//! Modis serves Redis commands from OceanBase KV tables. Every command is
//! backed by one physical table, discovered at startup from the owning
//! tenant's system catalog.
//!
//! # Quick Start
//!
//! ```ignore
//! use modis::{CallContext, Storage, StorageConfig};
//!
//! let storage = Storage::new(config, client_factory, catalog_connector);
//! storage.initialize().await?;
//!
//! let reply = storage
//!     .dispatch(&CallContext::background(), "SET", &row_key, &encoded)
//!     .await?;
//! ```
//!
//! # Architecture
//!
//! The [`Storage`] bootstraps a [`Directory`] and publishes a [`Router`].
//! Table client and catalog driver are external collaborators behind the
//! [`KvClient`], [`ClientFactory`] and [`CatalogConnector`] traits.

// Re-export the public API from modis-storage
pub use modis_storage::*;
