//! Command directory and its bootstrap from the system catalog.
//!
//! Every Redis command is served by one physical OBKV table. The mapping
//! lives in the `DBA_OB_KV_REDIS_TABLE` view of the owning tenant, which is
//! only reachable over SQL. Bootstrap therefore:
//!
//! 1. asks the table client for a server able to serve the tenant,
//! 2. extracts the tenant from the full user name,
//! 3. opens a relational connection as `root@<tenant>` on that server,
//! 4. reads every `(command_name, table_name)` row into a [`Directory`].
//!
//! The directory is built once and never mutated afterwards.

use std::collections::HashMap;

use tracing::{info, warn};

use modis_core::{
    tenant_name, CatalogConnection, CatalogConnector, DataSource, Error, KvClient, Result,
};

/// Query reading the command directory from the `DBA_OB_KV_REDIS_TABLE`
/// system view.
pub const CATALOG_QUERY: &str = "select command_name, table_name from DBA_OB_KV_REDIS_TABLE";

/// Immutable mapping from command name to physical table name.
///
/// Command names are matched exactly, as stored in the catalog.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Directory {
    tables: HashMap<String, String>,
}

impl Directory {
    /// Table backing `command`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedCommand`] when the command is not mapped.
    pub fn table_for(&self, command: &str) -> Result<&str> {
        self.tables
            .get(command)
            .map(String::as_str)
            .ok_or_else(|| Error::UnsupportedCommand {
                command: command.to_string(),
            })
    }

    /// Whether `command` is mapped.
    pub fn contains(&self, command: &str) -> bool {
        self.tables.contains_key(command)
    }

    /// Number of mapped commands.
    pub fn len(&self) -> usize {
        self.tables.len()
    }

    /// Whether no command is mapped.
    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    /// Mapped command names, sorted.
    pub fn commands(&self) -> Vec<&str> {
        let mut commands: Vec<&str> = self.tables.keys().map(String::as_str).collect();
        commands.sort_unstable();
        commands
    }
}

/// Later entries overwrite earlier ones for the same command.
impl FromIterator<(String, String)> for Directory {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self {
            tables: iter.into_iter().collect(),
        }
    }
}

/// Build the directory from the tenant's catalog.
///
/// The tenant is extracted before any connection is attempted. The catalog
/// connection is closed before this function returns, on success and on
/// every failure path.
///
/// # Errors
///
/// Route discovery, connection and query errors are returned unchanged.
/// A full user name without a tenant yields [`Error::InvalidFullUserName`].
pub async fn resolve(
    client: &dyn KvClient,
    full_user_name: &str,
    password: &str,
    connector: &dyn CatalogConnector,
) -> Result<Directory> {
    let server = client.tenant_server()?;
    let tenant = tenant_name(full_user_name)?;

    let source = DataSource::for_tenant(&tenant, password, &server);
    info!(
        target: "modis::storage",
        tenant = %tenant,
        source = %source,
        "Reading command directory"
    );

    let mut conn = connector.open(&source).await?;
    let loaded = load(conn.as_mut()).await;
    conn.close().await;
    let directory = loaded?;

    if directory.is_empty() {
        warn!(
            target: "modis::storage",
            tenant = %tenant,
            "Command catalog is empty; every command will be rejected"
        );
    } else {
        info!(
            target: "modis::storage",
            tenant = %tenant,
            count = directory.len(),
            "Command directory loaded"
        );
    }
    Ok(directory)
}

async fn load(conn: &mut dyn CatalogConnection) -> Result<Directory> {
    let mut rows = conn.query(CATALOG_QUERY).await?;
    let mut tables = HashMap::new();
    while let Some(row) = rows.next_row().await {
        let (command_name, table_name) = row?;
        tables.insert(command_name, table_name);
    }
    rows.finish().await?;
    Ok(Directory { tables })
}
