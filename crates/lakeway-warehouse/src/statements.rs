//! SQL text construction for the REST-facing table operations
//!
//! Everything user-supplied passes through quoting helpers; no value or
//! identifier is interpolated raw. The output is opaque SQL text for the
//! session, never parsed or planned here.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as Json};

use crate::error::{WarehouseError, WarehouseResult};

/// Quote an identifier with backticks, doubling embedded backticks
pub fn quote_ident(name: &str) -> String {
    format!("`{}`", name.replace('`', "``"))
}

/// Render a dotted multi-part name with each part quoted
pub fn qualify(parts: &[&str]) -> String {
    parts
        .iter()
        .map(|part| quote_ident(part))
        .collect::<Vec<_>>()
        .join(".")
}

/// Quote a `catalog.schema.table` string part by part
pub fn quote_full_name(full_name: &str) -> String {
    full_name
        .split('.')
        .map(quote_ident)
        .collect::<Vec<_>>()
        .join(".")
}

/// Render a JSON scalar as a SQL literal
///
/// Strings are single-quoted with embedded quotes doubled, null becomes
/// NULL, numbers and booleans render bare. Arrays and objects render as
/// quoted JSON text.
pub fn literal(value: &Json) -> String {
    match value {
        Json::Null => "NULL".to_string(),
        Json::Bool(b) => if *b { "TRUE" } else { "FALSE" }.to_string(),
        Json::Number(n) => n.to_string(),
        Json::String(s) => quote_str(s),
        other => quote_str(&other.to_string()),
    }
}

fn quote_str(s: &str) -> String {
    format!("'{}'", s.replace('\'', "''"))
}

/// Conjunction of `column = literal` terms, in map order
pub fn filter_clause(filter: &Map<String, Json>) -> String {
    filter
        .iter()
        .map(|(column, value)| format!("{} = {}", quote_ident(column), literal(value)))
        .collect::<Vec<_>>()
        .join(" AND ")
}

/// `SELECT *` over a table with an optional filter and row limit
pub fn select_rows(
    full_name: &str,
    filter: Option<&Map<String, Json>>,
    limit: Option<u64>,
) -> String {
    let mut sql = format!("SELECT * FROM {}", quote_full_name(full_name));
    if let Some(filter) = filter.filter(|f| !f.is_empty()) {
        sql.push_str(" WHERE ");
        sql.push_str(&filter_clause(filter));
    }
    if let Some(limit) = limit {
        sql.push_str(&format!(" LIMIT {}", limit));
    }
    sql
}

/// Multi-row INSERT; columns come from the first row, missing keys in
/// later rows render as NULL
pub fn insert_rows(full_name: &str, rows: &[Map<String, Json>]) -> WarehouseResult<String> {
    let Some(first) = rows.first() else {
        return Err(WarehouseError::InvalidStatement(
            "insert requires at least one row".to_string(),
        ));
    };

    let columns: Vec<&str> = first.keys().map(String::as_str).collect();
    let column_list = columns
        .iter()
        .map(|c| quote_ident(c))
        .collect::<Vec<_>>()
        .join(", ");

    let mut tuples = Vec::with_capacity(rows.len());
    for row in rows {
        let values = columns
            .iter()
            .map(|c| row.get(*c).map(literal).unwrap_or_else(|| "NULL".to_string()))
            .collect::<Vec<_>>()
            .join(", ");
        tuples.push(format!("({})", values));
    }

    Ok(format!(
        "INSERT INTO {} ({}) VALUES {}",
        quote_full_name(full_name),
        column_list,
        tuples.join(", ")
    ))
}

/// Filtered UPDATE; refuses empty filters so one request cannot rewrite a
/// whole table
pub fn update_rows(
    full_name: &str,
    filter: &Map<String, Json>,
    updates: &Map<String, Json>,
) -> WarehouseResult<String> {
    if updates.is_empty() {
        return Err(WarehouseError::InvalidStatement(
            "update requires at least one assignment".to_string(),
        ));
    }
    if filter.is_empty() {
        return Err(WarehouseError::InvalidStatement(
            "update requires a filter".to_string(),
        ));
    }

    let assignments = updates
        .iter()
        .map(|(column, value)| format!("{} = {}", quote_ident(column), literal(value)))
        .collect::<Vec<_>>()
        .join(", ");

    Ok(format!(
        "UPDATE {} SET {} WHERE {}",
        quote_full_name(full_name),
        assignments,
        filter_clause(filter)
    ))
}

/// Filtered DELETE; refuses empty filters
pub fn delete_rows(full_name: &str, filter: &Map<String, Json>) -> WarehouseResult<String> {
    if filter.is_empty() {
        return Err(WarehouseError::InvalidStatement(
            "delete requires a filter".to_string(),
        ));
    }

    Ok(format!(
        "DELETE FROM {} WHERE {}",
        quote_full_name(full_name),
        filter_clause(filter)
    ))
}

/// One column of a CREATE TABLE request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnSpec {
    pub name: String,

    /// SQL data type text, e.g. `STRING` or `DECIMAL(10, 2)`
    #[serde(rename = "type")]
    pub data_type: String,

    #[serde(default)]
    pub comment: Option<String>,

    #[serde(default = "default_nullable")]
    pub nullable: bool,
}

/// A CREATE TABLE request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTableSpec {
    /// Full name in `catalog.schema.table` form
    pub table_name: String,

    pub columns: Vec<ColumnSpec>,

    #[serde(default)]
    pub comment: Option<String>,

    #[serde(default)]
    pub location: Option<String>,

    #[serde(default)]
    pub partitioned_by: Vec<String>,
}

/// Render a CREATE TABLE statement
pub fn create_table(spec: &CreateTableSpec) -> WarehouseResult<String> {
    if spec.columns.is_empty() {
        return Err(WarehouseError::InvalidStatement(
            "create table requires at least one column".to_string(),
        ));
    }

    let mut columns = Vec::with_capacity(spec.columns.len());
    for column in &spec.columns {
        if !valid_type(&column.data_type) {
            return Err(WarehouseError::InvalidStatement(format!(
                "invalid column type: {}",
                column.data_type
            )));
        }

        let mut definition = format!("{} {}", quote_ident(&column.name), column.data_type);
        if !column.nullable {
            definition.push_str(" NOT NULL");
        }
        if let Some(comment) = &column.comment {
            definition.push_str(&format!(" COMMENT {}", quote_str(comment)));
        }
        columns.push(definition);
    }

    let mut sql = format!(
        "CREATE TABLE {} ({})",
        quote_full_name(&spec.table_name),
        columns.join(", ")
    );

    if let Some(comment) = &spec.comment {
        sql.push_str(&format!(" COMMENT {}", quote_str(comment)));
    }
    if let Some(location) = &spec.location {
        sql.push_str(&format!(" LOCATION {}", quote_str(location)));
    }
    if !spec.partitioned_by.is_empty() {
        let columns = spec
            .partitioned_by
            .iter()
            .map(|c| quote_ident(c))
            .collect::<Vec<_>>()
            .join(", ");
        sql.push_str(&format!(" PARTITIONED BY ({})", columns));
    }

    Ok(sql)
}

/// Render a DROP TABLE statement
pub fn drop_table(full_name: &str) -> String {
    format!("DROP TABLE {}", quote_full_name(full_name))
}

// Type text is the one piece that cannot be quoted, so it is whitelisted
// to the characters SQL type expressions use
fn valid_type(data_type: &str) -> bool {
    !data_type.is_empty()
        && data_type
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '(' | ')' | ',' | ' ' | '<' | '>'))
}

fn default_nullable() -> bool {
    true
}
