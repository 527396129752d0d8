//! Endpoint discovery for the remote SQL engine
//!
//! The warehouse addressing scheme is not known in advance, so connecting
//! tries a fixed sequence of URL path conventions and keeps the first one
//! that opens. Retry on top of a working path is the session's job, not
//! the resolver's.

use std::fmt;

use tracing::{debug, info, warn};

use crate::config::WarehouseConfig;
use crate::connector::{SqlConnection, SqlConnector};
use crate::error::{WarehouseError, WarehouseResult};

/// Alternative URL conventions for reaching the SQL execution service
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndpointStrategy {
    /// SQL warehouse path: `/sql/1.0/warehouses/{warehouse_id}`
    Warehouse,
    /// Cluster protocol path: `/sql/protocolv1/o/{workspace_id}/{cluster_id}`
    Protocol,
    /// Legacy endpoint path: `/sql/1.0/endpoints/{endpoint_id}`
    Endpoint,
}

impl EndpointStrategy {
    /// All strategies in resolution order
    pub const ALL: [EndpointStrategy; 3] = [
        EndpointStrategy::Warehouse,
        EndpointStrategy::Protocol,
        EndpointStrategy::Endpoint,
    ];

    /// Render the HTTP path for this strategy
    ///
    /// Missing ids default to `"0"`, matching the upstream driver's
    /// placeholder convention.
    pub fn http_path(&self, config: &WarehouseConfig) -> String {
        match self {
            EndpointStrategy::Warehouse => format!(
                "/sql/1.0/warehouses/{}",
                config.warehouse_id.as_deref().unwrap_or("0")
            ),
            EndpointStrategy::Protocol => format!(
                "/sql/protocolv1/o/{}/{}",
                config.workspace_id(),
                config.cluster_id.as_deref().unwrap_or("0")
            ),
            EndpointStrategy::Endpoint => format!(
                "/sql/1.0/endpoints/{}",
                config.endpoint_id.as_deref().unwrap_or("0")
            ),
        }
    }
}

impl fmt::Display for EndpointStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EndpointStrategy::Warehouse => "warehouse",
            EndpointStrategy::Protocol => "protocol",
            EndpointStrategy::Endpoint => "endpoint",
        };
        f.write_str(name)
    }
}

/// Open a connection by trying each endpoint strategy in order
///
/// The first strategy that connects wins and no further strategies run.
/// All three failing is recoverable for the caller; the session's retry
/// loop will come back through here.
pub async fn resolve<C>(
    connector: &C,
    config: &WarehouseConfig,
) -> WarehouseResult<Box<dyn SqlConnection>>
where
    C: SqlConnector + ?Sized,
{
    let hostname = config.server_hostname();
    let mut last = String::new();

    for strategy in EndpointStrategy::ALL {
        let path = strategy.http_path(config);
        debug!("Connecting to {} via {} path {}", hostname, strategy, path);

        match connector.connect(hostname, &path, &config.access_token).await {
            Ok(connection) => {
                info!("Connected to {} via {} path", hostname, strategy);
                return Ok(connection);
            }
            Err(e) => {
                warn!("Connect via {} path failed: {}", strategy, e);
                last = e.to_string();
            }
        }
    }

    Err(WarehouseError::AllEndpointsFailed { last })
}
