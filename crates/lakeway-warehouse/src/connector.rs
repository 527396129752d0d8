//! Connector boundary for the remote SQL engine
//!
//! Mirrors the DB-API shape of the upstream driver: a connector opens
//! connections, a connection hands out cursors, and a cursor executes one
//! statement and yields its result set. The session layer only ever talks
//! to these traits, which is also the seam the tests script against.

use async_trait::async_trait;

use crate::error::WarehouseResult;
use crate::table::Value;

/// Capability to open connections to the SQL engine
#[async_trait]
pub trait SqlConnector: Send + Sync {
    /// Open a connection to the engine at the given host and HTTP path
    ///
    /// The access token is forwarded verbatim; it is never validated here.
    async fn connect(
        &self,
        server_hostname: &str,
        http_path: &str,
        access_token: &str,
    ) -> WarehouseResult<Box<dyn SqlConnection>>;
}

/// A live network session with the SQL engine
#[async_trait]
pub trait SqlConnection: Send + std::fmt::Debug {
    /// Create a cursor bound to this connection
    async fn cursor(&mut self) -> WarehouseResult<Box<dyn SqlCursor>>;

    /// Close the underlying network session
    async fn close(&mut self) -> WarehouseResult<()>;
}

/// A handle for submitting one statement and reading back its result set
#[async_trait]
pub trait SqlCursor: Send {
    /// Submit one SQL statement verbatim
    async fn execute(&mut self, sql: &str) -> WarehouseResult<()>;

    /// Column names of the last executed statement, in result order
    fn description(&self) -> Vec<String>;

    /// Fetch all rows of the last executed statement
    async fn fetch_all(&mut self) -> WarehouseResult<Vec<Vec<Value>>>;

    /// Close the cursor
    async fn close(&mut self) -> WarehouseResult<()>;
}
