//! Catalog, schema, and table enumeration
//!
//! Enumeration is non-fatal by contract: any failure is logged and yields
//! an empty listing for that scope, and traversal continues with whatever
//! remains.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::connector::SqlConnector;
use crate::error::WarehouseResult;
use crate::session::WarehouseSession;
use crate::statements;
use crate::table::TableDescriptor;

/// Result columns that may carry the catalog name
const CATALOG_NAME_COLUMNS: &[&str] = &["catalog"];

/// Result columns that may carry the schema name, varying by engine version
const SCHEMA_NAME_COLUMNS: &[&str] = &["namespace", "schema", "databaseName"];

/// Result columns that may carry the table name
const TABLE_NAME_COLUMNS: &[&str] = &["tableName", "name"];

/// Bulk listing against the metadata catalog; system namespaces are
/// excluded in SQL with the same rule as `is_system_namespace`
const ALL_TABLES_QUERY: &str = "\
SELECT
    table_catalog AS catalog,
    table_schema AS schema,
    table_name AS name
FROM information_schema.tables
WHERE table_type = 'BASE TABLE'
    AND table_catalog NOT LIKE 'sys%'
    AND table_catalog NOT IN ('information_schema', 'system')";

/// True for namespaces that hold engine internals rather than user tables
pub fn is_system_namespace(name: &str) -> bool {
    name.starts_with("sys") || name == "information_schema" || name == "system"
}

/// Catalog enumeration built on a shared warehouse session
pub struct CatalogExplorer<C: SqlConnector> {
    session: Arc<WarehouseSession<C>>,
}

impl<C: SqlConnector> CatalogExplorer<C> {
    pub fn new(session: Arc<WarehouseSession<C>>) -> Self {
        Self { session }
    }

    /// All catalog names, in query order
    pub async fn list_catalogs(&self) -> Vec<String> {
        match self.names("SHOW CATALOGS", CATALOG_NAME_COLUMNS).await {
            Ok(catalogs) => {
                debug!("Found {} catalogs", catalogs.len());
                catalogs
            }
            Err(e) => {
                warn!("Listing catalogs failed: {}", e);
                Vec::new()
            }
        }
    }

    /// All schema names in `catalog`, in query order
    pub async fn list_schemas(&self, catalog: &str) -> Vec<String> {
        let sql = format!("SHOW SCHEMAS IN {}", statements::quote_ident(catalog));
        match self.names(&sql, SCHEMA_NAME_COLUMNS).await {
            Ok(schemas) => {
                debug!("Found {} schemas in {}", schemas.len(), catalog);
                schemas
            }
            Err(e) => {
                warn!("Listing schemas in {} failed: {}", catalog, e);
                Vec::new()
            }
        }
    }

    /// All tables in `catalog.schema`
    pub async fn list_tables_in_schema(
        &self,
        catalog: &str,
        schema: &str,
    ) -> Vec<TableDescriptor> {
        let sql = format!(
            "SHOW TABLES IN {}",
            statements::qualify(&[catalog, schema])
        );
        match self.names(&sql, TABLE_NAME_COLUMNS).await {
            Ok(names) => {
                debug!("Found {} tables in {}.{}", names.len(), catalog, schema);
                names
                    .into_iter()
                    .map(|name| TableDescriptor::new(catalog, schema, &name))
                    .collect()
            }
            Err(e) => {
                warn!("Listing tables in {}.{} failed: {}", catalog, schema, e);
                Vec::new()
            }
        }
    }

    /// Every user table across all catalogs and schemas
    ///
    /// Prefers one bulk query against the metadata catalog and falls back
    /// to a catalog-by-catalog traversal when the bulk query fails or
    /// returns nothing. Bulk results follow whatever order the metadata
    /// query returns; traversal results follow catalog, schema, table
    /// order.
    pub async fn list_all_tables(&self) -> Vec<TableDescriptor> {
        match self.list_all_tables_bulk().await {
            Ok(tables) if !tables.is_empty() => {
                info!("Found {} tables via the metadata catalog", tables.len());
                tables
            }
            Ok(_) => {
                warn!("Metadata catalog query returned no tables, falling back to traversal");
                self.list_all_tables_recursive().await
            }
            Err(e) => {
                warn!("Metadata catalog query failed ({}), falling back to traversal", e);
                self.list_all_tables_recursive().await
            }
        }
    }

    async fn list_all_tables_bulk(&self) -> WarehouseResult<Vec<TableDescriptor>> {
        let table = self.session.execute(ALL_TABLES_QUERY).await?;

        let catalog = table.probe_column(&["catalog"])?;
        let schema = table.probe_column(&["schema"])?;
        let name = table.probe_column(&["name"])?;

        let mut tables = Vec::with_capacity(table.num_rows());
        for row in table.rows() {
            let (Some(catalog), Some(schema), Some(name)) =
                (row.get(catalog), row.get(schema), row.get(name))
            else {
                continue;
            };
            tables.push(TableDescriptor::new(
                &catalog.to_string(),
                &schema.to_string(),
                &name.to_string(),
            ));
        }
        Ok(tables)
    }

    async fn list_all_tables_recursive(&self) -> Vec<TableDescriptor> {
        info!("Enumerating tables catalog by catalog");
        let mut all = Vec::new();

        for catalog in self.list_catalogs().await {
            if is_system_namespace(&catalog) {
                debug!("Skipping system catalog: {}", catalog);
                continue;
            }
            for schema in self.list_schemas(&catalog).await {
                if is_system_namespace(&schema) {
                    debug!("Skipping system schema: {}.{}", catalog, schema);
                    continue;
                }
                all.extend(self.list_tables_in_schema(&catalog, &schema).await);
            }
        }

        info!("Found {} tables via traversal", all.len());
        all
    }

    async fn names(&self, sql: &str, candidates: &[&str]) -> WarehouseResult<Vec<String>> {
        let table = self.session.execute(sql).await?;
        let index = table.probe_column(candidates)?;
        Ok(table.column_values(index).map(|v| v.to_string()).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::Value;
    use crate::testing::{test_config, MockConnector, Step};
    use crate::WarehouseConfig;

    fn explorer_with_steps(
        steps: Vec<Step>,
        config: WarehouseConfig,
    ) -> CatalogExplorer<MockConnector> {
        let connector = MockConnector::new();
        connector.push_steps(steps);
        let session = Arc::new(WarehouseSession::new(connector, config).unwrap());
        CatalogExplorer::new(session)
    }

    fn single_retry_config() -> WarehouseConfig {
        let mut config = test_config();
        config.retry.max_retries = 1;
        config
    }

    fn names_step(column: &'static str, names: &[&str]) -> Step {
        Step::rows(
            &[column],
            names.iter().map(|n| vec![Value::from(*n)]).collect(),
        )
    }

    #[test]
    fn test_system_namespace_rule() {
        assert!(is_system_namespace("system"));
        assert!(is_system_namespace("information_schema"));
        assert!(is_system_namespace("sys"));
        assert!(is_system_namespace("sys_metrics"));
        assert!(!is_system_namespace("main"));
        assert!(!is_system_namespace("analysis"));
    }

    #[tokio::test]
    async fn test_list_catalogs() {
        let explorer = explorer_with_steps(
            vec![names_step("catalog", &["main", "system"])],
            test_config(),
        );
        assert_eq!(explorer.list_catalogs().await, vec!["main", "system"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_list_catalogs_failure_yields_empty() {
        let explorer = explorer_with_steps(vec![Step::fail("boom")], single_retry_config());
        assert!(explorer.list_catalogs().await.is_empty());
    }

    #[tokio::test]
    async fn test_list_schemas_probes_column_variants() {
        for column in ["namespace", "schema", "databaseName"] {
            let explorer = explorer_with_steps(
                vec![names_step(column, &["default", "staging"])],
                test_config(),
            );
            assert_eq!(
                explorer.list_schemas("main").await,
                vec!["default", "staging"],
                "column variant {}",
                column
            );
        }
    }

    #[tokio::test]
    async fn test_list_schemas_unknown_column_yields_empty() {
        let explorer = explorer_with_steps(
            vec![names_step("something_else", &["default"])],
            test_config(),
        );
        assert!(explorer.list_schemas("main").await.is_empty());
    }

    #[tokio::test]
    async fn test_list_tables_in_schema_builds_descriptors() {
        let explorer = explorer_with_steps(
            vec![names_step("tableName", &["users", "orders"])],
            test_config(),
        );

        let tables = explorer.list_tables_in_schema("main", "default").await;
        assert_eq!(tables.len(), 2);
        assert_eq!(tables[0].full_name, "main.default.users");
        assert_eq!(tables[1].catalog, "main");
        assert_eq!(tables[1].schema, "default");
    }

    #[tokio::test]
    async fn test_list_all_tables_bulk() {
        let explorer = explorer_with_steps(
            vec![Step::rows(
                &["catalog", "schema", "name"],
                vec![
                    vec![Value::from("main"), Value::from("default"), Value::from("users")],
                    vec![Value::from("main"), Value::from("default"), Value::from("orders")],
                ],
            )],
            test_config(),
        );

        let tables = explorer.list_all_tables().await;
        assert_eq!(tables.len(), 2);
        assert_eq!(tables[1].full_name, "main.default.orders");
    }

    #[tokio::test]
    async fn test_empty_bulk_result_triggers_traversal() {
        let explorer = explorer_with_steps(
            vec![
                // Bulk query comes back with columns but no rows
                Step::rows(&["catalog", "schema", "name"], vec![]),
                names_step("catalog", &["main", "system", "sys_ops"]),
                names_step("namespace", &["default", "information_schema"]),
                names_step("tableName", &["users"]),
            ],
            test_config(),
        );

        let tables = explorer.list_all_tables().await;
        assert_eq!(tables.len(), 1);
        assert_eq!(tables[0].full_name, "main.default.users");
    }

    #[tokio::test(start_paused = true)]
    async fn test_bulk_failure_triggers_traversal() {
        let explorer = explorer_with_steps(
            vec![
                Step::fail("no information_schema here"),
                names_step("catalog", &["main"]),
                names_step("schema", &["default"]),
                names_step("name", &["users"]),
            ],
            single_retry_config(),
        );

        let tables = explorer.list_all_tables().await;
        assert_eq!(tables.len(), 1);
        assert_eq!(tables[0].full_name, "main.default.users");
    }

    #[tokio::test(start_paused = true)]
    async fn test_traversal_survives_schema_failures() {
        let explorer = explorer_with_steps(
            vec![
                Step::rows(&["catalog", "schema", "name"], vec![]),
                names_step("catalog", &["broken", "main"]),
                // Schemas of the first catalog fail; traversal moves on
                Step::fail("catalog gone"),
                names_step("namespace", &["default"]),
                names_step("tableName", &["users"]),
            ],
            single_retry_config(),
        );

        let tables = explorer.list_all_tables().await;
        assert_eq!(tables.len(), 1);
        assert_eq!(tables[0].full_name, "main.default.users");
    }
}
