//! Fake table client and factory

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use modis_core::{
    CallOptions, ClientConfig, ClientFactory, Column, Entity, EntityType, Error, KvClient, Result,
    ServerAddr,
};

use crate::router::PAYLOAD_COLUMN;

/// One recorded `redis` call
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    /// Target table
    pub table: String,
    /// Row key as received
    pub row_key: Vec<Column>,
    /// Mutate columns as received
    pub mutate_columns: Vec<Column>,
    /// Call options as received
    pub options: CallOptions,
}

/// Table client that records calls and serves scripted replies.
///
/// Unless overridden with [`respond`](FakeKvClient::respond), a call to
/// table `t` returns an entity whose reply column holds the string `t`,
/// so tests can see which table served a command.
pub struct FakeKvClient {
    route: Mutex<Option<ServerAddr>>,
    replies: Mutex<HashMap<String, Result<Entity>>>,
    delay: Mutex<Option<Duration>>,
    calls: Mutex<Vec<RecordedCall>>,
    closes: AtomicUsize,
}

impl FakeKvClient {
    /// A client routed to `127.0.0.1` (rpc 2882, sql 2881).
    pub fn shared() -> Arc<Self> {
        Self::with_route(Some(ServerAddr::new("127.0.0.1", 2882, 2881)))
    }

    /// A client with the given route; `None` fails route discovery.
    pub fn with_route(route: Option<ServerAddr>) -> Arc<Self> {
        Arc::new(Self {
            route: Mutex::new(route),
            replies: Mutex::new(HashMap::new()),
            delay: Mutex::new(None),
            calls: Mutex::new(Vec::new()),
            closes: AtomicUsize::new(0),
        })
    }

    /// Script the reply for calls against `table`.
    pub fn respond(&self, table: &str, reply: Result<Entity>) {
        self.replies.lock().insert(table.to_string(), reply);
    }

    /// Delay every call by `delay` before replying.
    pub fn set_delay(&self, delay: Duration) {
        *self.delay.lock() = Some(delay);
    }

    /// Calls received so far, in order.
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().clone()
    }

    /// Number of times `close` was called.
    pub fn close_count(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl KvClient for FakeKvClient {
    fn tenant_server(&self) -> Result<ServerAddr> {
        self.route.lock().clone().ok_or_else(|| Error::RouteDiscovery {
            reason: "no reachable route".to_string(),
        })
    }

    async fn redis(
        &self,
        table: &str,
        row_key: &[Column],
        mutate_columns: &[Column],
        options: CallOptions,
    ) -> Result<Entity> {
        self.calls.lock().push(RecordedCall {
            table: table.to_string(),
            row_key: row_key.to_vec(),
            mutate_columns: mutate_columns.to_vec(),
            options,
        });

        let delay = *self.delay.lock();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let scripted = self.replies.lock().get(table).cloned();
        scripted.unwrap_or_else(|| Ok(Entity::new().with(PAYLOAD_COLUMN, table)))
    }

    async fn close(&self) {
        self.closes.fetch_add(1, Ordering::SeqCst);
    }
}

/// Factory handing out one shared [`FakeKvClient`].
pub struct FakeClientFactory {
    client: Arc<FakeKvClient>,
    failure: Mutex<Option<Error>>,
    connects: Mutex<Vec<(ClientConfig, EntityType)>>,
}

impl FakeClientFactory {
    /// A factory returning `client` on every connect.
    pub fn new(client: Arc<FakeKvClient>) -> Self {
        Self {
            client,
            failure: Mutex::new(None),
            connects: Mutex::new(Vec::new()),
        }
    }

    /// Fail every connect with `err` until cleared with `None`.
    pub fn fail_with(&self, err: Option<Error>) {
        *self.failure.lock() = err;
    }

    /// Configs and entity types passed to `connect`, in order.
    pub fn connects(&self) -> Vec<(ClientConfig, EntityType)> {
        self.connects.lock().clone()
    }
}

#[async_trait]
impl ClientFactory for FakeClientFactory {
    async fn connect(
        &self,
        config: &ClientConfig,
        entity_type: EntityType,
    ) -> Result<Arc<dyn KvClient>> {
        self.connects.lock().push((config.clone(), entity_type));
        let failure = self.failure.lock().clone();
        if let Some(err) = failure {
            return Err(err);
        }
        let client: Arc<dyn KvClient> = self.client.clone();
        Ok(client)
    }
}
