//! Core types and traits for Modis
//!
//! This crate defines the foundational types used by the Redis storage adapter:
//! - Value / Column / Entity: Column data carried to and from OBKV tables
//! - EntityType / ServerAddr / DataSource / CallOptions: Routing and call types
//! - FullUserName: `user@tenant#cluster` parsing
//! - ClientConfig / ClientOptions: The client connection bundle
//! - Error: Error type hierarchy
//! - Traits: Collaborator boundaries (KvClient, ClientFactory, CatalogConnector)

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod error;
pub mod tenant;
pub mod traits;
pub mod types;
pub mod value;

pub use config::{ClientConfig, ClientOptions};
pub use error::{Error, Result};
pub use tenant::{tenant_name, FullUserName};
pub use traits::{CatalogConnection, CatalogConnector, CatalogRows, ClientFactory, KvClient};
pub use types::{CallOptions, DataSource, EntityType, ServerAddr, CATALOG_DATABASE, CATALOG_USER};
pub use value::{Column, Entity, Value};
