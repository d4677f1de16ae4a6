//! Result sets of the analytics SQL endpoint, turned into one record per row.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::ResultSetError;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ColumnDescriptor {
    pub name: String,
    #[serde(rename = "type")]
    pub column_type: String,
}

/// A single cell.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum Value {
    Text(String),
    List(Vec<String>),
    Map(BTreeMap<String, String>),
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ResultSet {
    pub column_descriptors: Vec<ColumnDescriptor>,
    #[serde(default)]
    pub rows: Option<Vec<Vec<Value>>>,
}

/// A row keyed by column name.
pub type Record = BTreeMap<String, Value>;

impl ResultSet {
    pub fn from_json(json: &str) -> Result<Self, ResultSetError> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Files every cell of every row under its column's name.
///
/// A result set without rows yields no records. Rows shorter than the column
/// list leave the trailing columns out; when two columns share a name the
/// later cell wins.
pub fn rows_to_records(set: ResultSet) -> Result<Vec<Record>, ResultSetError> {
    let columns = set.column_descriptors;
    set.rows
        .unwrap_or_default()
        .into_iter()
        .enumerate()
        .map(|(row, cells)| {
            if cells.len() > columns.len() {
                return Err(ResultSetError::RowTooWide {
                    row,
                    cells: cells.len(),
                    columns: columns.len(),
                });
            }
            Ok(columns.iter().map(|c| c.name.clone()).zip(cells).collect())
        })
        .collect()
}
