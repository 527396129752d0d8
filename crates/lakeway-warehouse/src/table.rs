//! Tabular results and table descriptors

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{WarehouseError, WarehouseResult};

/// A single result cell
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl Value {
    /// Borrow the cell as text, if it is text
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(i) => write!(f, "{}", i),
            Value::Float(x) => write!(f, "{}", x),
            Value::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<&Value> for serde_json::Value {
    fn from(value: &Value) -> Self {
        match value {
            Value::Null => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(*b),
            Value::Int(i) => serde_json::Value::from(*i),
            Value::Float(x) => serde_json::Value::from(*x),
            Value::Text(s) => serde_json::Value::String(s.clone()),
        }
    }
}

/// An ordered result set produced by one statement execution
///
/// Column order follows the engine's result metadata; rows follow fetch
/// order. The table has no identity beyond the call that created it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultTable {
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
}

impl ResultTable {
    /// Create a table from column names and rows
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Value>>) -> Self {
        Self { columns, rows }
    }

    /// A table with zero columns and zero rows
    pub fn empty() -> Self {
        Self::default()
    }

    /// Column names in result order
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// All rows in fetch order
    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }

    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Index of a column by exact name
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Index of the first of `candidates` present in this table
    ///
    /// Result column naming varies across engine versions, so callers probe
    /// an ordered list of known variants instead of hardcoding one name.
    pub fn probe_column(&self, candidates: &[&str]) -> WarehouseResult<usize> {
        for candidate in candidates {
            if let Some(index) = self.column_index(candidate) {
                return Ok(index);
            }
        }
        Err(WarehouseError::MissingColumn {
            candidates: candidates.iter().map(|s| s.to_string()).collect(),
            actual: self.columns.clone(),
        })
    }

    /// Values of one column, in row order
    pub fn column_values(&self, index: usize) -> impl Iterator<Item = &Value> {
        self.rows.iter().filter_map(move |row| row.get(index))
    }

    /// Convert rows to JSON records, preserving column order
    pub fn to_records(&self) -> Vec<serde_json::Map<String, serde_json::Value>> {
        self.rows
            .iter()
            .map(|row| {
                self.columns
                    .iter()
                    .zip(row.iter())
                    .map(|(name, value)| (name.clone(), serde_json::Value::from(value)))
                    .collect()
            })
            .collect()
    }
}

/// A denormalized reference to a remote table
///
/// Valid only as of enumeration time; there is no freshness guarantee.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableDescriptor {
    pub name: String,
    pub full_name: String,
    pub catalog: String,
    pub schema: String,
}

impl TableDescriptor {
    /// Build a descriptor; `full_name` is always `catalog.schema.name`
    pub fn new(catalog: &str, schema: &str, name: &str) -> Self {
        Self {
            name: name.to_string(),
            full_name: format!("{}.{}.{}", catalog, schema, name),
            catalog: catalog.to_string(),
            schema: schema.to_string(),
        }
    }
}

impl fmt::Display for TableDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.full_name)
    }
}
