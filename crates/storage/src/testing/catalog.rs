//! Fake command catalog

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;

use modis_core::{CatalogConnection, CatalogConnector, CatalogRows, DataSource, Error, Result};

#[derive(Default)]
struct Script {
    rows: Vec<Result<(String, String)>>,
    open_error: Option<Error>,
    query_error: Option<Error>,
    cursor_error: Option<Error>,
}

#[derive(Default)]
struct Counters {
    opened: AtomicUsize,
    closed: AtomicUsize,
}

/// Catalog connector serving a fixed row set.
///
/// Tracks every data source opened and every query run, and how many
/// connections were opened and closed.
#[derive(Default)]
pub struct FakeCatalog {
    script: Mutex<Script>,
    sources: Mutex<Vec<DataSource>>,
    queries: Arc<Mutex<Vec<String>>>,
    counters: Arc<Counters>,
}

impl FakeCatalog {
    /// A catalog with no rows.
    pub fn new() -> Self {
        Self::default()
    }

    /// A catalog returning `(command_name, table_name)` rows in order.
    pub fn with_rows<I, C, T>(rows: I) -> Self
    where
        I: IntoIterator<Item = (C, T)>,
        C: Into<String>,
        T: Into<String>,
    {
        let catalog = Self::new();
        catalog.script.lock().rows = rows
            .into_iter()
            .map(|(c, t)| Ok((c.into(), t.into())))
            .collect();
        catalog
    }

    /// Append a row that fails to scan.
    pub fn push_scan_error(&self, err: Error) {
        self.script.lock().rows.push(Err(err));
    }

    /// Fail `open` with `err`.
    pub fn fail_open(&self, err: Error) {
        self.script.lock().open_error = Some(err);
    }

    /// Fail `query` with `err`.
    pub fn fail_query(&self, err: Error) {
        self.script.lock().query_error = Some(err);
    }

    /// Report `err` from the cursor after the last row.
    pub fn fail_cursor(&self, err: Error) {
        self.script.lock().cursor_error = Some(err);
    }

    /// Data sources passed to `open`, in order.
    pub fn sources(&self) -> Vec<DataSource> {
        self.sources.lock().clone()
    }

    /// Queries run, in order.
    pub fn queries(&self) -> Vec<String> {
        self.queries.lock().clone()
    }

    /// Connections successfully opened.
    pub fn opened(&self) -> usize {
        self.counters.opened.load(Ordering::SeqCst)
    }

    /// Connections closed.
    pub fn closed(&self) -> usize {
        self.counters.closed.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CatalogConnector for FakeCatalog {
    async fn open(&self, source: &DataSource) -> Result<Box<dyn CatalogConnection>> {
        self.sources.lock().push(source.clone());

        let script = self.script.lock();
        if let Some(err) = &script.open_error {
            return Err(err.clone());
        }
        self.counters.opened.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(FakeConnection {
            rows: script.rows.clone(),
            query_error: script.query_error.clone(),
            cursor_error: script.cursor_error.clone(),
            queries: self.queries.clone(),
            counters: self.counters.clone(),
        }))
    }
}

struct FakeConnection {
    rows: Vec<Result<(String, String)>>,
    query_error: Option<Error>,
    cursor_error: Option<Error>,
    queries: Arc<Mutex<Vec<String>>>,
    counters: Arc<Counters>,
}

#[async_trait]
impl CatalogConnection for FakeConnection {
    async fn query(&mut self, sql: &str) -> Result<Box<dyn CatalogRows>> {
        self.queries.lock().push(sql.to_string());
        if let Some(err) = self.query_error.take() {
            return Err(err);
        }
        Ok(Box::new(FakeRows {
            rows: self.rows.drain(..).collect(),
            cursor_error: self.cursor_error.take(),
        }))
    }

    async fn close(self: Box<Self>) {
        self.counters.closed.fetch_add(1, Ordering::SeqCst);
    }
}

struct FakeRows {
    rows: VecDeque<Result<(String, String)>>,
    cursor_error: Option<Error>,
}

#[async_trait]
impl CatalogRows for FakeRows {
    async fn next_row(&mut self) -> Option<Result<(String, String)>> {
        self.rows.pop_front()
    }

    async fn finish(self: Box<Self>) -> Result<()> {
        match self.cursor_error {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}
