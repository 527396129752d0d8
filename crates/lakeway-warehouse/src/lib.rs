//! Connection management and query execution for a cloud SQL warehouse
//!
//! This crate is the core behind a REST façade over a warehouse SQL
//! endpoint. It keeps a lazily-established, retryable connection to the
//! remote engine behind a single session type, executes opaque SQL text,
//! converts result sets into structured tables, and enumerates catalogs,
//! schemas, and tables.
//!
//! # Features
//!
//! - **Multi-strategy endpoint discovery**: warehouse, protocol, and
//!   endpoint URL paths tried in fixed order until one connects
//! - **Bounded retry**: exponential backoff with connection teardown and
//!   recreation between attempts
//! - **Catalog enumeration**: one bulk metadata query with a recursive
//!   catalog-by-catalog fallback, probing result column names across
//!   engine versions
//! - **Injection-safe statement construction** for the REST-facing table
//!   operations
//!
//! # Example
//!
//! ```ignore
//! use lakeway_warehouse::{CatalogExplorer, WarehouseConfig, WarehouseSession};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = WarehouseConfig::from_env()?;
//!     let session = Arc::new(WarehouseSession::new(connector, config)?);
//!
//!     let table = session.execute("SELECT 1").await?;
//!     println!("{} rows", table.num_rows());
//!
//!     let explorer = CatalogExplorer::new(session.clone());
//!     for table in explorer.list_all_tables().await {
//!         println!("{}", table.full_name);
//!     }
//!
//!     session.close().await;
//!     Ok(())
//! }
//! ```

// Re-export commonly used types
pub use catalog::CatalogExplorer;
pub use config::{RetryConfig, WarehouseConfig};
pub use error::{WarehouseError, WarehouseResult};
pub use resolver::EndpointStrategy;
pub use session::WarehouseSession;
pub use table::{ResultTable, TableDescriptor, Value};

// Public modules
pub mod catalog;
pub mod config;
pub mod connector;
pub mod error;
pub mod resolver;
pub mod session;
pub mod statements;
pub mod table;

// Scripted connector doubles shared by the module tests
#[cfg(test)]
pub(crate) mod testing;
