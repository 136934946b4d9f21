// SPDX-FileCopyrightText: 2025 Joost van der Laan <joost@fashionunited.com>
//
// SPDX-License-Identifier: AGPL-3.0-only

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// One entry of the reference symbol listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SymbolRecord {
    pub symbol: String,
    pub name: Option<String>,
    pub date: Option<String>,
    #[serde(rename = "isEnabled")]
    pub is_enabled: Option<bool>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    #[serde(rename = "iexId")]
    pub iex_id: Option<Value>,
    // Add catch-all for other fields we don't care about
    #[serde(flatten)]
    pub extra: std::collections::HashMap<String, Value>,
}

/// A single table value. `Unavailable` is never confused with a real zero.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Cell {
    #[default]
    Unavailable,
    Number(f64),
    Text(String),
    Flag(bool),
}

impl Cell {
    pub fn is_available(&self) -> bool {
        !matches!(self, Cell::Unavailable)
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Cell::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Cell::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl From<&Value> for Cell {
    fn from(value: &Value) -> Self {
        match value {
            Value::Null => Cell::Unavailable,
            Value::Bool(b) => Cell::Flag(*b),
            Value::Number(n) => n.as_f64().map(Cell::Number).unwrap_or(Cell::Unavailable),
            Value::String(s) => Cell::Text(s.clone()),
            other => Cell::Text(other.to_string()),
        }
    }
}

impl From<Option<f64>> for Cell {
    fn from(value: Option<f64>) -> Self {
        value.map(Cell::Number).unwrap_or(Cell::Unavailable)
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Unavailable => Ok(()),
            Cell::Number(n) => write!(f, "{}", n),
            Cell::Text(s) => f.write_str(s),
            Cell::Flag(b) => write!(f, "{}", b),
        }
    }
}

/// The extracted values for one symbol, or the single missing marker
/// recorded when extraction failed.
#[derive(Debug, Clone, PartialEq)]
pub enum Row {
    Values(Vec<Cell>),
    Missing,
}

impl Row {
    pub fn is_missing(&self) -> bool {
        matches!(self, Row::Missing)
    }

    /// Expand to exactly `width` cells, padding with `Unavailable`.
    pub fn into_cells(self, width: usize) -> Vec<Cell> {
        match self {
            Row::Values(mut cells) => {
                cells.resize(width, Cell::Unavailable);
                cells
            }
            Row::Missing => vec![Cell::Unavailable; width],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_cell_from_json() {
        assert_eq!(Cell::from(&json!(null)), Cell::Unavailable);
        assert_eq!(Cell::from(&json!(0)), Cell::Number(0.0));
        assert_eq!(Cell::from(&json!(12.5)), Cell::Number(12.5));
        assert_eq!(Cell::from(&json!("Tech")), Cell::Text("Tech".to_string()));
        assert_eq!(Cell::from(&json!(true)), Cell::Flag(true));
        assert_eq!(Cell::from(&json!(["a", "b"])), Cell::Text("[\"a\",\"b\"]".to_string()));
    }

    #[test]
    fn test_zero_is_not_unavailable() {
        assert!(Cell::Number(0.0).is_available());
        assert!(!Cell::Unavailable.is_available());
    }

    #[test]
    fn test_row_expansion() {
        let row = Row::Values(vec![Cell::Number(1.0)]);
        assert_eq!(
            row.into_cells(3),
            vec![Cell::Number(1.0), Cell::Unavailable, Cell::Unavailable]
        );
        assert_eq!(Row::Missing.into_cells(2), vec![Cell::Unavailable; 2]);
    }

    #[test]
    fn test_symbol_record_deserialize() {
        let record: SymbolRecord = serde_json::from_value(json!({
            "symbol": "A",
            "name": "Agilent Technologies Inc.",
            "date": "2018-06-01",
            "isEnabled": true,
            "type": "cs",
            "iexId": "2"
        }))
        .unwrap();
        assert_eq!(record.symbol, "A");
        assert_eq!(record.kind.as_deref(), Some("cs"));
        assert_eq!(record.is_enabled, Some(true));
    }
}
