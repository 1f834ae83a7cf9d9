//! Query results as returned by the executor.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};
use std::collections::HashSet;

/// Column names paired with rows of values.
///
/// Lives for a single request. Values are JSON so any column type the
/// generated SQL produces can be carried through to presentation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResultSet {
    /// Column names in result order
    pub columns: Vec<String>,

    /// Rows in result order, one value per column
    pub rows: Vec<Vec<JsonValue>>,
}

impl ResultSet {
    /// Create a result set.
    pub fn new(columns: Vec<String>, rows: Vec<Vec<JsonValue>>) -> Self {
        Self { columns, rows }
    }

    /// `true` if the query matched no rows.
    ///
    /// Zero rows is a valid outcome, not an error. Columns are still known.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Column names made unique for use as object keys.
    ///
    /// A repeated name gets a numeric suffix (`avg`, `avg_2`), skipping any
    /// suffix that is itself a column name.
    pub fn labels(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut labels = Vec::with_capacity(self.columns.len());

        for name in &self.columns {
            let mut label = name.clone();
            let mut n = 2;
            while seen.contains(&label) || (label != *name && self.columns.contains(&label)) {
                label = format!("{}_{}", name, n);
                n += 1;
            }
            seen.insert(label.clone());
            labels.push(label);
        }

        labels
    }

    /// Rows as column-labeled JSON objects, keys in column order.
    ///
    /// Keys come from [`labels`](Self::labels). If a row is shorter than the
    /// column list the missing cells are omitted; extra cells are ignored.
    pub fn records(&self) -> Vec<Map<String, JsonValue>> {
        let labels = self.labels();
        self.rows
            .iter()
            .map(|row| labels.iter().cloned().zip(row.iter().cloned()).collect())
            .collect()
    }
}
