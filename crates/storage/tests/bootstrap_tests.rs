//! Bootstrap tests for modis-storage
//!
//! These tests drive `Storage::initialize` against the in-memory fakes and
//! verify:
//!
//! 1. **Client construction** - Redis entity type, config forwarded, failures fatal
//! 2. **Route discovery** - Missing routes surface unchanged
//! 3. **Tenant extraction** - Happens before any catalog connection
//! 4. **Catalog read** - Exact query, data source, row and cursor errors
//! 5. **Lifecycle** - Double init, retry after failure, close semantics,
//!    close racing a bootstrap in progress

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Notify;

use modis_storage::testing::{FakeCatalog, FakeClientFactory, FakeKvClient};
use modis_storage::{
    CallContext, ClientConfig, ClientFactory, EntityType, Error, KvClient, Result, ServerAddr,
    Storage, StorageConfig, CATALOG_QUERY,
};

// ============================================================================
// Test Helpers
// ============================================================================

fn test_config(full_user_name: &str) -> StorageConfig {
    StorageConfig::new(
        "http://127.0.0.1:8080/services?Action=ObRootServiceInfo&ObCluster=obcluster",
        full_user_name,
        "tenant-pw",
        "root",
        "sys-pw",
    )
}

struct Env {
    client: Arc<FakeKvClient>,
    factory: Arc<FakeClientFactory>,
    catalog: Arc<FakeCatalog>,
    storage: Storage,
}

fn env_with(full_user_name: &str, client: Arc<FakeKvClient>, catalog: FakeCatalog) -> Env {
    let factory = Arc::new(FakeClientFactory::new(client.clone()));
    let catalog = Arc::new(catalog);
    let storage = Storage::new(test_config(full_user_name), factory.clone(), catalog.clone());
    Env {
        client,
        factory,
        catalog,
        storage,
    }
}

fn default_env(catalog: FakeCatalog) -> Env {
    env_with("app@redis_tenant#obcluster", FakeKvClient::shared(), catalog)
}

// ============================================================================
// Client construction
// ============================================================================

mod client_construction {
    use super::*;

    #[tokio::test]
    async fn test_requests_redis_entity_type() {
        let env = default_env(FakeCatalog::with_rows([("SET", "tab_set")]));
        env.storage.initialize().await.unwrap();

        let connects = env.factory.connects();
        assert_eq!(connects.len(), 1);
        assert_eq!(connects[0].1, EntityType::Redis);
    }

    #[tokio::test]
    async fn test_forwards_connection_bundle() {
        let env = default_env(FakeCatalog::new());
        env.storage.initialize().await.unwrap();

        let (config, _) = env.factory.connects().remove(0);
        assert_eq!(config.full_user_name, "app@redis_tenant#obcluster");
        assert_eq!(config.password, "tenant-pw");
        assert_eq!(config.sys_user_name, "root");
        assert_eq!(config.sys_password, "sys-pw");
        assert_eq!(config.options, env.storage.config().client);
    }

    #[tokio::test]
    async fn test_client_failure_is_fatal_and_unchanged() {
        let env = default_env(FakeCatalog::with_rows([("SET", "tab_set")]));
        let cause = Error::ClientInit {
            reason: "config server unreachable".into(),
        };
        env.factory.fail_with(Some(cause.clone()));

        assert_eq!(env.storage.initialize().await, Err(cause));
        assert!(!env.storage.is_initialized());
        assert_eq!(env.catalog.opened(), 0);
    }
}

// ============================================================================
// Route discovery and tenant extraction
// ============================================================================

mod routing {
    use super::*;

    #[tokio::test]
    async fn test_missing_route_surfaces_unchanged() {
        let env = env_with(
            "app@redis_tenant",
            FakeKvClient::with_route(None),
            FakeCatalog::with_rows([("SET", "tab_set")]),
        );

        let err = env.storage.initialize().await.unwrap_err();
        assert!(matches!(err, Error::RouteDiscovery { .. }));
        assert!(env.catalog.sources().is_empty());
        // The client built for this attempt is released
        assert_eq!(env.client.close_count(), 1);
    }

    #[tokio::test]
    async fn test_invalid_full_user_name_fails_before_connecting() {
        for bad in ["", "root", "root@", "a:b"] {
            let catalog = FakeCatalog::with_rows([("SET", "t")]);
            let env = env_with(bad, FakeKvClient::shared(), catalog);

            assert_eq!(
                env.storage.initialize().await,
                Err(Error::InvalidFullUserName {
                    full_user_name: bad.to_string()
                })
            );
            assert!(env.catalog.sources().is_empty(), "connected for {:?}", bad);
            assert!(env.catalog.queries().is_empty());
        }
    }

    #[tokio::test]
    async fn test_data_source_built_from_route_and_tenant() {
        let env = env_with(
            "obcluster:redis_tenant:app",
            FakeKvClient::with_route(Some(ServerAddr::new("10.1.2.3", 2882, 3306))),
            FakeCatalog::new(),
        );
        env.storage.initialize().await.unwrap();

        let sources = env.catalog.sources();
        assert_eq!(sources.len(), 1);
        assert_eq!(
            sources[0].dsn(),
            "root@redis_tenant:tenant-pw@tcp(10.1.2.3:3306)/oceanbase"
        );
    }
}

// ============================================================================
// Catalog read
// ============================================================================

mod catalog {
    use super::*;

    #[tokio::test]
    async fn test_runs_exact_catalog_query_once() {
        let env = default_env(FakeCatalog::with_rows([("SET", "tab_set")]));
        env.storage.initialize().await.unwrap();

        assert_eq!(
            env.catalog.queries(),
            vec!["select command_name, table_name from DBA_OB_KV_REDIS_TABLE".to_string()]
        );
        assert_eq!(env.catalog.queries()[0], CATALOG_QUERY);
    }

    #[tokio::test]
    async fn test_directory_matches_catalog() {
        let env = default_env(FakeCatalog::with_rows([("SET", "tab_set"), ("GET", "tab_get")]));
        env.storage.initialize().await.unwrap();

        let directory = env.storage.directory().unwrap();
        assert_eq!(directory.len(), 2);
        assert_eq!(directory.table_for("SET").unwrap(), "tab_set");
        assert_eq!(directory.table_for("GET").unwrap(), "tab_get");
    }

    #[tokio::test]
    async fn test_duplicate_rows_keep_last() {
        let env = default_env(FakeCatalog::with_rows([("SET", "old"), ("SET", "new")]));
        env.storage.initialize().await.unwrap();
        assert_eq!(env.storage.directory().unwrap().table_for("SET").unwrap(), "new");
    }

    #[tokio::test]
    async fn test_connection_closed_after_success() {
        let env = default_env(FakeCatalog::with_rows([("SET", "tab_set")]));
        env.storage.initialize().await.unwrap();
        assert_eq!(env.catalog.opened(), 1);
        assert_eq!(env.catalog.closed(), 1);
    }

    #[tokio::test]
    async fn test_open_failure_is_fatal() {
        let catalog = FakeCatalog::with_rows([("SET", "tab_set")]);
        let cause = Error::CatalogConnect {
            reason: "access denied".into(),
        };
        catalog.fail_open(cause.clone());
        let env = default_env(catalog);

        assert_eq!(env.storage.initialize().await, Err(cause));
        assert!(!env.storage.is_initialized());
        assert_eq!(env.client.close_count(), 1);
    }

    #[tokio::test]
    async fn test_query_failure_closes_connection() {
        let catalog = FakeCatalog::with_rows([("SET", "tab_set")]);
        catalog.fail_query(Error::catalog_query("table or view does not exist"));
        let env = default_env(catalog);

        let err = env.storage.initialize().await.unwrap_err();
        assert_eq!(err, Error::catalog_query("table or view does not exist"));
        assert_eq!(env.catalog.opened(), 1);
        assert_eq!(env.catalog.closed(), 1);
    }

    #[tokio::test]
    async fn test_scan_failure_is_fatal() {
        let catalog = FakeCatalog::with_rows([("SET", "tab_set")]);
        catalog.push_scan_error(Error::catalog_query("converting NULL to string"));
        let env = default_env(catalog);

        let err = env.storage.initialize().await.unwrap_err();
        assert_eq!(err, Error::catalog_query("converting NULL to string"));
        assert!(env.storage.directory().is_none());
        assert_eq!(env.catalog.closed(), 1);
    }

    #[tokio::test]
    async fn test_cursor_failure_is_fatal() {
        let catalog = FakeCatalog::with_rows([("SET", "tab_set"), ("GET", "tab_get")]);
        catalog.fail_cursor(Error::catalog_query("connection reset"));
        let env = default_env(catalog);

        let err = env.storage.initialize().await.unwrap_err();
        assert_eq!(err, Error::catalog_query("connection reset"));
        assert!(!env.storage.is_initialized());
        assert_eq!(env.catalog.closed(), 1);
    }

    #[tokio::test]
    async fn test_empty_catalog_is_not_an_error() {
        let env = default_env(FakeCatalog::new());
        env.storage.initialize().await.unwrap();

        assert!(env.storage.directory().unwrap().is_empty());
        let err = env
            .storage
            .dispatch(&CallContext::background(), "SET", &[], b"*1\r\n")
            .await
            .unwrap_err();
        assert_eq!(
            err,
            Error::UnsupportedCommand {
                command: "SET".into()
            }
        );
        assert!(env.client.calls().is_empty());
    }
}

// ============================================================================
// Lifecycle
// ============================================================================

mod lifecycle {
    use super::*;

    #[tokio::test]
    async fn test_dispatch_before_initialize() {
        let env = default_env(FakeCatalog::with_rows([("SET", "tab_set")]));
        let err = env
            .storage
            .dispatch(&CallContext::background(), "SET", &[], b"x")
            .await
            .unwrap_err();
        assert_eq!(err, Error::NotInitialized);
        assert!(env.client.calls().is_empty());
    }

    #[tokio::test]
    async fn test_second_initialize_rejected() {
        let env = default_env(FakeCatalog::with_rows([("SET", "tab_set")]));
        env.storage.initialize().await.unwrap();
        assert_eq!(env.storage.initialize().await, Err(Error::AlreadyInitialized));
        assert_eq!(env.factory.connects().len(), 1);
    }

    #[tokio::test]
    async fn test_retry_after_failure() {
        let env = default_env(FakeCatalog::with_rows([("SET", "tab_set")]));
        env.factory.fail_with(Some(Error::ClientInit {
            reason: "timeout".into(),
        }));
        assert!(env.storage.initialize().await.is_err());

        env.factory.fail_with(None);
        env.storage.initialize().await.unwrap();
        assert_eq!(env.storage.directory().unwrap().table_for("SET").unwrap(), "tab_set");
    }

    #[tokio::test]
    async fn test_close_releases_client_once() {
        let env = default_env(FakeCatalog::with_rows([("SET", "tab_set")]));
        env.storage.initialize().await.unwrap();

        env.storage.close().await.unwrap();
        env.storage.close().await.unwrap();
        assert_eq!(env.client.close_count(), 1);
    }

    #[tokio::test]
    async fn test_dispatch_after_close() {
        let env = default_env(FakeCatalog::with_rows([("SET", "tab_set")]));
        env.storage.initialize().await.unwrap();
        env.storage.close().await.unwrap();

        let err = env
            .storage
            .dispatch(&CallContext::background(), "SET", &[], b"x")
            .await
            .unwrap_err();
        assert_eq!(err, Error::Closed);
        assert!(env.client.calls().is_empty());
    }

    #[tokio::test]
    async fn test_close_before_initialize() {
        let env = default_env(FakeCatalog::with_rows([("SET", "tab_set")]));
        env.storage.close().await.unwrap();
        assert_eq!(env.client.close_count(), 0);
        assert_eq!(env.storage.initialize().await, Err(Error::Closed));
    }

    /// Factory that parks `connect` until the test opens the gate.
    struct GatedFactory {
        inner: FakeClientFactory,
        entered: Notify,
        gate: Notify,
    }

    #[async_trait]
    impl ClientFactory for GatedFactory {
        async fn connect(
            &self,
            config: &ClientConfig,
            entity_type: EntityType,
        ) -> Result<Arc<dyn KvClient>> {
            self.entered.notify_one();
            self.gate.notified().await;
            self.inner.connect(config, entity_type).await
        }
    }

    #[tokio::test]
    async fn test_close_during_initialize_releases_client() {
        let client = FakeKvClient::shared();
        let factory = Arc::new(GatedFactory {
            inner: FakeClientFactory::new(client.clone()),
            entered: Notify::new(),
            gate: Notify::new(),
        });
        let catalog = Arc::new(FakeCatalog::with_rows([("SET", "tab_set")]));
        let storage = Arc::new(Storage::new(
            test_config("app@redis_tenant#obcluster"),
            factory.clone(),
            catalog,
        ));

        let init = tokio::spawn({
            let storage = storage.clone();
            async move { storage.initialize().await }
        });
        factory.entered.notified().await;

        storage.close().await.unwrap();
        factory.gate.notify_one();

        assert_eq!(init.await.unwrap(), Err(Error::Closed));
        assert!(!storage.is_initialized());
        assert_eq!(client.close_count(), 1);

        storage.close().await.unwrap();
        assert_eq!(client.close_count(), 1);
    }
}
