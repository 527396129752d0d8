//! Error types for warehouse operations

use thiserror::Error;

/// Result type for warehouse operations
pub type WarehouseResult<T> = Result<T, WarehouseError>;

/// Errors that can occur when talking to the warehouse SQL engine
#[derive(Debug, Error)]
pub enum WarehouseError {
    /// Invalid configuration
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// URL parsing error
    #[error("URL parsing error: {0}")]
    UrlParse(#[from] url::ParseError),

    /// A single connect attempt failed
    #[error("connect failed: {0}")]
    Connect(String),

    /// Every endpoint strategy failed to produce a connection
    #[error("no endpoint strategy produced a connection, last error: {last}")]
    AllEndpointsFailed { last: String },

    /// Statement execution failed at the remote engine
    #[error("statement execution failed: {0}")]
    Execution(String),

    /// Statement kept failing until the retry budget ran out
    #[error("statement failed after {attempts} attempts, last error: {last}")]
    RetriesExhausted { attempts: u32, last: String },

    /// The session was closed and can no longer execute statements
    #[error("session is closed")]
    SessionClosed,

    /// A statement could not be built from the request
    #[error("invalid statement: {0}")]
    InvalidStatement(String),

    /// None of the expected result columns were present
    #[error("none of the columns {candidates:?} present, result has {actual:?}")]
    MissingColumn {
        candidates: Vec<String>,
        actual: Vec<String>,
    },
}
