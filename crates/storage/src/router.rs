//! The command router - one command, one table operation.
//!
//! The router looks up the table backing a command in the [`Directory`],
//! sends the caller's row key and encoded payload to it as a Redis-mode
//! operation, and decodes the encoded reply from the affected entity.
//!
//! The payload and the reply both travel in the [`PAYLOAD_COLUMN`] column.
//! The router never looks inside them.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use modis_core::{CallOptions, Column, Entity, Error, KvClient, Result};

use crate::directory::Directory;

/// Column carrying the encoded command on the way in and the encoded
/// reply on the way out.
pub const PAYLOAD_COLUMN: &str = "REDIS_CODE_STR";

// =============================================================================
// Call context
// =============================================================================

/// Cancellation and deadline for a single dispatch.
#[derive(Debug, Clone, Default)]
pub struct CallContext {
    cancel: CancellationToken,
    deadline: Option<Instant>,
}

impl CallContext {
    /// A context that is never cancelled and has no deadline.
    pub fn background() -> Self {
        Self::default()
    }

    /// A context cancelled through `token`.
    pub fn with_cancel(token: CancellationToken) -> Self {
        Self {
            cancel: token,
            deadline: None,
        }
    }

    /// Add a deadline `timeout` from now.
    pub fn with_timeout(self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    /// Add an absolute deadline. An earlier existing deadline wins.
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(match self.deadline {
            Some(current) if current < deadline => current,
            _ => deadline,
        });
        self
    }

    /// The cancellation token.
    pub fn token(&self) -> &CancellationToken {
        &self.cancel
    }

    /// The deadline, if any.
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Whether the context was cancelled.
    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Whether the deadline has passed.
    pub fn is_expired(&self) -> bool {
        self.deadline.is_some_and(|d| Instant::now() >= d)
    }
}

// =============================================================================
// Result decoding
// =============================================================================

/// Outcome of reading the reply column from an affected entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultField<'a> {
    /// The column holds a string
    Value(&'a str),
    /// The column is absent
    Missing,
    /// The column holds a value of another type
    WrongType(&'static str),
}

/// Read `column` from `entity` as a string.
pub fn decode_result<'a>(entity: &'a Entity, column: &str) -> ResultField<'a> {
    match entity.value(column) {
        Some(value) => value
            .as_str()
            .map_or(ResultField::WrongType(value.type_name()), ResultField::Value),
        None => ResultField::Missing,
    }
}

// =============================================================================
// Router
// =============================================================================

/// Routes commands to their backing tables.
///
/// The router is stateless apart from the shared client and the immutable
/// directory, so it is `Send + Sync` and can serve any number of
/// concurrent dispatches without locking.
#[derive(Clone)]
pub struct Router {
    client: Arc<dyn KvClient>,
    directory: Arc<Directory>,
}

impl Router {
    /// Create a router over a bootstrapped directory.
    pub fn new(client: Arc<dyn KvClient>, directory: Arc<Directory>) -> Self {
        Self { client, directory }
    }

    /// The directory this router resolves commands against.
    pub fn directory(&self) -> &Directory {
        &self.directory
    }

    pub(crate) fn client(&self) -> &Arc<dyn KvClient> {
        &self.client
    }

    /// Execute `command` on its table and return the encoded reply.
    ///
    /// Issues at most one remote call and never retries it.
    ///
    /// # Errors
    ///
    /// - [`Error::UnsupportedCommand`] when the command has no table; no
    ///   remote call is made
    /// - [`Error::Cancelled`] / [`Error::DeadlineExceeded`] when `ctx` ends
    ///   before the call completes; no call is made if it already ended
    /// - the client's error, unchanged, when the remote call fails
    /// - [`Error::UnexpectedResultType`] when the reply column is missing
    ///   or not a string
    pub async fn dispatch(
        &self,
        ctx: &CallContext,
        command: &str,
        row_key: &[Column],
        payload: &[u8],
    ) -> Result<String> {
        let table = self.directory.table_for(command)?;

        if ctx.is_cancelled() {
            return Err(Error::Cancelled {
                command: command.to_string(),
            });
        }
        if ctx.is_expired() {
            return Err(Error::DeadlineExceeded {
                command: command.to_string(),
            });
        }

        let mutate_columns = [Column::new(PAYLOAD_COLUMN, payload)];
        debug!(
            target: "modis::storage",
            command,
            table,
            payload_len = payload.len(),
            "Redis command"
        );

        let call = self.client.redis(
            table,
            row_key,
            &mutate_columns,
            CallOptions::returning_entity(),
        );
        let entity = tokio::select! {
            biased;
            _ = ctx.cancel.cancelled() => {
                return Err(Error::Cancelled { command: command.to_string() });
            }
            result = with_deadline(ctx.deadline, call) => match result {
                Some(result) => result?,
                None => return Err(Error::DeadlineExceeded { command: command.to_string() }),
            },
        };

        match decode_result(&entity, PAYLOAD_COLUMN) {
            ResultField::Value(encoded) => Ok(encoded.to_string()),
            ResultField::Missing => Err(unexpected(command, table, "missing")),
            ResultField::WrongType(found) => Err(unexpected(command, table, found)),
        }
    }
}

async fn with_deadline<F: std::future::Future>(
    deadline: Option<Instant>,
    fut: F,
) -> Option<F::Output> {
    match deadline {
        Some(deadline) => tokio::time::timeout_at(deadline, fut).await.ok(),
        None => Some(fut.await),
    }
}

fn unexpected(command: &str, table: &str, found: &str) -> Error {
    Error::UnexpectedResultType {
        command: command.to_string(),
        table: table.to_string(),
        column: PAYLOAD_COLUMN.to_string(),
        found: found.to_string(),
    }
}
