//! Export of the visible grid data.
//!
//! [`to_export_rows`] flattens rows into display strings under the visible
//! columns; [`ExportTable`] then writes CSV or JSON.

mod csv;

pub use csv::CsvOptions;
pub use csv::Delimiter;
pub use csv::LineTerminator;

use serde::Serialize;

use crate::model::Column;
use crate::model::GridRow;

/// Which rows a grid export covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportScope {
    /// Every row left after search, filters and sort.
    #[default]
    All,
    /// Only the rows on the current page.
    CurrentPage,
}

/// One exported column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportHeader {
    pub label: String,
    pub key: String,
}

/// Headers plus one string record per row, aligned with the headers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExportTable {
    pub headers: Vec<ExportHeader>,
    pub data: Vec<Vec<String>>,
}

impl ExportTable {
    /// Number of exported rows.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Cell of record `row` under column `key`.
    pub fn value(&self, row: usize, key: &str) -> Option<&str> {
        let col = self.headers.iter().position(|h| h.key == key)?;
        self.data.get(row)?.get(col).map(String::as_str)
    }

    /// Records as JSON objects keyed by column key.
    pub fn to_json(&self) -> serde_json::Value {
        let records = self
            .data
            .iter()
            .map(|record| {
                let map: serde_json::Map<String, serde_json::Value> = self
                    .headers
                    .iter()
                    .zip(record)
                    .map(|(h, v)| (h.key.clone(), serde_json::Value::String(v.clone())))
                    .collect();
                serde_json::Value::Object(map)
            })
            .collect();
        serde_json::Value::Array(records)
    }
}

/// Flattens `rows` under `columns`.
///
/// Each value goes through the column's export formatter, or is
/// stringified; null and missing values become empty strings. Columns not
/// listed are never read.
pub fn to_export_rows<R: GridRow>(rows: &[&R], columns: &[&Column]) -> ExportTable {
    let headers = columns
        .iter()
        .map(|c| ExportHeader {
            label: c.label.clone(),
            key: c.key.clone(),
        })
        .collect();

    let data = rows
        .iter()
        .map(|row| {
            columns
                .iter()
                .map(|c| c.export(row.value(&c.key).as_deref()))
                .collect()
        })
        .collect();

    ExportTable { headers, data }
}
