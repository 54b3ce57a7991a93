//! In-memory collaborators for exercising the storage without a cluster
//!
//! - **FakeKvClient**: Table client recording every call, with scripted replies
//! - **FakeClientFactory**: Hands out a shared `FakeKvClient` or a scripted failure
//! - **FakeCatalog**: Catalog connector serving a fixed row set, with
//!   injectable connect/query/scan/cursor failures
//!
//! # Example
//!
//! ```ignore
//! use modis_storage::testing::{FakeCatalog, FakeClientFactory, FakeKvClient};
//!
//! let client = FakeKvClient::shared();
//! let factory = FakeClientFactory::new(client.clone());
//! let catalog = FakeCatalog::with_rows([("SET", "tab_set"), ("GET", "tab_get")]);
//!
//! let storage = Storage::new(config, Arc::new(factory), Arc::new(catalog));
//! storage.initialize().await?;
//! assert_eq!(client.calls().len(), 0);
//! ```

mod catalog;
mod client;

pub use catalog::FakeCatalog;
pub use client::{FakeClientFactory, FakeKvClient, RecordedCall};
