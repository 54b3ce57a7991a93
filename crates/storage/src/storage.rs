//! OBKV-backed storage for Redis commands.
//!
//! [`Storage`] owns the lifecycle: it constructs the table client, builds
//! the command directory, publishes a [`Router`] exactly once, and closes
//! the client exactly once on shutdown.
//!
//! # Usage
//!
//! ```ignore
//! use modis_storage::{CallContext, Storage, StorageConfig};
//!
//! let storage = Storage::new(config, client_factory, catalog_connector);
//! storage.initialize().await?;
//!
//! let reply = storage
//!     .dispatch(&CallContext::background(), "SET", &row_key, &encoded)
//!     .await?;
//!
//! storage.close().await?;
//! ```

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use once_cell::sync::OnceCell;
use parking_lot::Mutex;
use tracing::{info, warn};

use modis_core::{CatalogConnector, ClientFactory, Column, EntityType, Error, Result};

use crate::config::StorageConfig;
use crate::directory::{self, Directory};
use crate::router::{CallContext, Router};

/// Storage backed by OBKV tables.
///
/// # Thread Safety
///
/// `Storage` is `Send + Sync`. Once [`initialize`](Storage::initialize)
/// returns, the router is visible to every thread and dispatches read it
/// without locking.
pub struct Storage {
    config: StorageConfig,
    client_factory: Arc<dyn ClientFactory>,
    catalog: Arc<dyn CatalogConnector>,
    router: OnceCell<Router>,
    closed: AtomicBool,
    /// Serializes publishing the router against `close`.
    lifecycle: Mutex<()>,
}

impl Storage {
    /// Create an uninitialized storage.
    pub fn new(
        config: StorageConfig,
        client_factory: Arc<dyn ClientFactory>,
        catalog: Arc<dyn CatalogConnector>,
    ) -> Self {
        Self {
            config,
            client_factory,
            catalog,
            router: OnceCell::new(),
            closed: AtomicBool::new(false),
            lifecycle: Mutex::new(()),
        }
    }

    /// The configuration this storage was created with.
    pub fn config(&self) -> &StorageConfig {
        &self.config
    }

    /// Construct the client and load the command directory.
    ///
    /// Every step is idempotent, so a failed initialization can be retried
    /// by calling this again.
    ///
    /// # Errors
    ///
    /// - client construction, route discovery, tenant extraction and
    ///   catalog errors abort initialization and are returned unchanged
    /// - [`Error::AlreadyInitialized`] if a previous call succeeded
    /// - [`Error::Closed`] after [`close`](Storage::close), including a
    ///   close that lands while this call is still bootstrapping
    pub async fn initialize(&self) -> Result<()> {
        if self.closed.load(Ordering::Acquire) {
            return Err(Error::Closed);
        }
        if self.router.get().is_some() {
            return Err(Error::AlreadyInitialized);
        }

        let client = self
            .client_factory
            .connect(&self.config.client_config(), EntityType::Redis)
            .await?;

        let resolved = directory::resolve(
            client.as_ref(),
            &self.config.full_user_name,
            &self.config.password,
            self.catalog.as_ref(),
        )
        .await;
        let directory = match resolved {
            Ok(directory) => directory,
            Err(e) => {
                client.close().await;
                return Err(e);
            }
        };

        let router = Router::new(client.clone(), Arc::new(directory));
        let published = {
            let _guard = self.lifecycle.lock();
            if self.closed.load(Ordering::Acquire) {
                Err(Error::Closed)
            } else {
                // Fails only when a concurrent initialize won the race.
                self.router.set(router).map_err(|_| Error::AlreadyInitialized)
            }
        };
        if let Err(e) = published {
            client.close().await;
            return Err(e);
        }
        info!(
            target: "modis::storage",
            commands = self.directory().map_or(0, Directory::len),
            "Storage initialized"
        );
        Ok(())
    }

    /// Whether [`initialize`](Storage::initialize) has completed.
    pub fn is_initialized(&self) -> bool {
        self.router.get().is_some()
    }

    /// The command directory, once initialized.
    pub fn directory(&self) -> Option<&Directory> {
        self.router.get().map(Router::directory)
    }

    /// Execute `command` on its backing table and return the encoded reply.
    ///
    /// # Errors
    ///
    /// [`Error::NotInitialized`] before bootstrap, [`Error::Closed`] after
    /// shutdown, otherwise whatever [`Router::dispatch`] returns.
    pub async fn dispatch(
        &self,
        ctx: &CallContext,
        command: &str,
        row_key: &[Column],
        payload: &[u8],
    ) -> Result<String> {
        if self.closed.load(Ordering::Acquire) {
            return Err(Error::Closed);
        }
        let router = self.router.get().ok_or(Error::NotInitialized)?;
        router.dispatch(ctx, command, row_key, payload).await
    }

    /// Release the table client.
    ///
    /// The client is closed exactly once; later calls return `Ok(())`
    /// without doing anything. In-flight dispatches should be drained by
    /// the caller first.
    pub async fn close(&self) -> Result<()> {
        let router = {
            let _guard = self.lifecycle.lock();
            if self.closed.swap(true, Ordering::AcqRel) {
                return Ok(());
            }
            self.router.get().cloned()
        };
        match router {
            Some(router) => {
                router.client().close().await;
                info!(target: "modis::storage", "Storage closed");
            }
            None => warn!(target: "modis::storage", "Storage closed before initialization"),
        }
        Ok(())
    }
}
