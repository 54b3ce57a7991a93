//! Collaborator traits for the table client and the command catalog
//!
//! The adapter never talks to the network itself. Table operations go
//! through a [`KvClient`], and the command catalog is read through a
//! [`CatalogConnector`]. Both are swappable so the routing logic can run
//! against real drivers in production and in-memory fakes in tests.
//!
//! Thread safety: all methods must be safe to call concurrently from
//! multiple tasks (requires Send + Sync).

use std::sync::Arc;

use async_trait::async_trait;

use crate::config::ClientConfig;
use crate::error::Result;
use crate::types::{CallOptions, DataSource, EntityType, ServerAddr};
use crate::value::{Column, Entity};

/// Builds table clients.
#[async_trait]
pub trait ClientFactory: Send + Sync {
    /// Construct a client speaking the given entity type.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ClientInit`](crate::Error::ClientInit) when the
    /// client cannot be constructed.
    async fn connect(&self, config: &ClientConfig, entity_type: EntityType)
        -> Result<Arc<dyn KvClient>>;
}

/// A connected table client.
#[async_trait]
pub trait KvClient: Send + Sync {
    /// A server that can serve the owning tenant's relational endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`Error::RouteDiscovery`](crate::Error::RouteDiscovery) when
    /// the client has no reachable route yet.
    fn tenant_server(&self) -> Result<ServerAddr>;

    /// Issue a Redis-mode operation against `table`.
    ///
    /// The row key and mutate columns are sent as given. With
    /// `options.return_affected_entity` set the returned entity carries the
    /// row the server produced; otherwise it may be empty.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Remote`](crate::Error::Remote) on transport or
    /// server failure.
    async fn redis(
        &self,
        table: &str,
        row_key: &[Column],
        mutate_columns: &[Column],
        options: CallOptions,
    ) -> Result<Entity>;

    /// Release connections held by the client.
    async fn close(&self);
}

/// Opens relational connections to a tenant's endpoint.
#[async_trait]
pub trait CatalogConnector: Send + Sync {
    /// Open a connection.
    ///
    /// # Errors
    ///
    /// Returns [`Error::CatalogConnect`](crate::Error::CatalogConnect) when
    /// the endpoint rejects or cannot be reached.
    async fn open(&self, source: &DataSource) -> Result<Box<dyn CatalogConnection>>;
}

/// An open relational connection.
#[async_trait]
pub trait CatalogConnection: Send {
    /// Run a read-only query returning `(command_name, table_name)` rows.
    ///
    /// # Errors
    ///
    /// Returns [`Error::CatalogQuery`](crate::Error::CatalogQuery) when the
    /// query cannot be executed.
    async fn query(&mut self, sql: &str) -> Result<Box<dyn CatalogRows>>;

    /// Close the connection.
    async fn close(self: Box<Self>);
}

/// Cursor over a two-column textual result set.
#[async_trait]
pub trait CatalogRows: Send {
    /// Next row, `None` once the cursor is exhausted.
    ///
    /// An `Err` item is a scan failure for that row.
    async fn next_row(&mut self) -> Option<Result<(String, String)>>;

    /// Error the cursor hit after iteration, if any.
    async fn finish(self: Box<Self>) -> Result<()>;
}
