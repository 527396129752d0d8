//! Managed SQL session with bounded retry

use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::config::WarehouseConfig;
use crate::connector::{SqlConnection, SqlConnector, SqlCursor};
use crate::error::{WarehouseError, WarehouseResult};
use crate::resolver;
use crate::table::ResultTable;

/// A single stable query-execution surface over an unstable connection
///
/// The session owns at most one live connection/cursor pair at a time.
/// Connections are created lazily on the first `execute`, torn down on any
/// failure, and recreated rather than repaired.
///
/// # Concurrency
///
/// All access is serialized behind an internal mutex: concurrent `execute`
/// calls queue, and the lock is held across the whole retry loop including
/// backoff sleeps. One session means one statement in flight. Callers that
/// need parallel queries should create separate sessions.
///
/// # Timeouts
///
/// No query timeout is enforced beyond the retry loop; a hung remote call
/// blocks the caller for its natural duration on each attempt.
pub struct WarehouseSession<C> {
    connector: C,
    config: WarehouseConfig,
    state: Mutex<SessionState>,
}

#[derive(Default)]
struct SessionState {
    live: Option<Live>,
    closed: bool,
}

struct Live {
    connection: Box<dyn SqlConnection>,
    cursor: Box<dyn SqlCursor>,
}

impl SessionState {
    /// Best-effort teardown; close-time failures are swallowed
    async fn teardown(&mut self) {
        if let Some(mut live) = self.live.take() {
            if let Err(e) = live.cursor.close().await {
                debug!("Ignoring cursor close failure: {}", e);
            }
            if let Err(e) = live.connection.close().await {
                debug!("Ignoring connection close failure: {}", e);
            }
        }
    }
}

impl<C: SqlConnector> WarehouseSession<C> {
    /// Create a session; no connection is opened until the first `execute`
    pub fn new(connector: C, config: WarehouseConfig) -> WarehouseResult<Self> {
        config.validate()?;
        info!("Creating warehouse session {} for {}", config.name, config.server_hostname());

        Ok(Self {
            connector,
            config,
            state: Mutex::new(SessionState::default()),
        })
    }

    pub fn config(&self) -> &WarehouseConfig {
        &self.config
    }

    /// Execute one SQL statement and collect its full result set
    ///
    /// Each attempt ensures a live connection, submits `sql` verbatim, and
    /// reads back column names and all rows. On failure the connection is
    /// torn down and, if attempts remain, the call sleeps an exponentially
    /// growing backoff before reconnecting. Exhausting the retry budget
    /// yields `RetriesExhausted` so callers can tell failure apart from a
    /// genuinely empty result.
    pub async fn execute(&self, sql: &str) -> WarehouseResult<ResultTable> {
        let mut state = self.state.lock().await;
        if state.closed {
            return Err(WarehouseError::SessionClosed);
        }

        let max_attempts = self.config.retry.max_retries.max(1);
        let mut backoff = self.config.retry.backoff();
        let mut last = String::new();

        for attempt in 1..=max_attempts {
            debug!(
                "Executing statement (attempt {}/{}): {}",
                attempt, max_attempts, sql
            );

            match self.try_execute(&mut state, sql).await {
                Ok(table) => {
                    debug!("Statement returned {} rows", table.num_rows());
                    return Ok(table);
                }
                Err(e) => {
                    warn!(
                        "Statement failed (attempt {}/{}): {}",
                        attempt, max_attempts, e
                    );
                    last = e.to_string();
                    state.teardown().await;

                    if attempt < max_attempts {
                        debug!("Retrying after {:?}", backoff);
                        tokio::time::sleep(backoff).await;
                        backoff *= 2;
                    }
                }
            }
        }

        Err(WarehouseError::RetriesExhausted {
            attempts: max_attempts,
            last,
        })
    }

    async fn try_execute(
        &self,
        state: &mut SessionState,
        sql: &str,
    ) -> WarehouseResult<ResultTable> {
        if state.live.is_none() {
            let mut connection = resolver::resolve(&self.connector, &self.config).await?;
            let cursor = connection.cursor().await?;
            state.live = Some(Live { connection, cursor });
        }

        let Some(live) = state.live.as_mut() else {
            return Err(WarehouseError::Execution(
                "connection state lost".to_string(),
            ));
        };

        live.cursor.execute(sql).await?;
        let columns = live.cursor.description();
        let rows = live.cursor.fetch_all().await?;

        Ok(ResultTable::new(columns, rows))
    }

    /// Whether a live connection is currently held
    pub async fn is_connected(&self) -> bool {
        self.state.lock().await.live.is_some()
    }

    /// Release the cursor and connection unconditionally
    ///
    /// Idempotent and safe to call when never connected. After `close`,
    /// `execute` fails with `SessionClosed`; run this once at shutdown.
    pub async fn close(&self) {
        let mut state = self.state.lock().await;
        if !state.closed {
            info!("Closing warehouse session {}", self.config.name);
        }
        state.teardown().await;
        state.closed = true;
    }
}
