//! Untyped tabular input.
//!
//! Tables have two or three columns: source, target and an optional weight. The width is fixed
//! by the first row and every later row must match it. Rows are numbered from 0, not counting a
//! CSV header.

use std::fmt;
use std::io::Read;

use serde::Serialize;
use serde_json::Value;

use crate::error::{Error, Result};
use crate::links::Link;

/// A scalar node identifier read from a table. Integers sort before text.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(untagged)]
pub enum NodeId {
    Int(i64),
    Text(String),
}

impl NodeId {
    /// Integer when the trimmed cell is exactly the canonical form of one, text otherwise.
    /// `"007"` and `"+7"` stay text so they do not merge with `"7"`.
    pub fn parse(cell: &str) -> Self {
        let trimmed = cell.trim();
        match trimmed.parse::<i64>() {
            Ok(v) if v.to_string() == trimmed => Self::Int(v),
            _ => Self::Text(trimmed.to_string()),
        }
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(v) => write!(f, "{v}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for NodeId {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<&str> for NodeId {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for NodeId {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

/// Reads rows from a JSON array. Each row is either an array of cells or an object whose
/// values, in document order, are the columns.
pub fn links_from_json(table: &Value) -> Result<Vec<Link<NodeId>>> {
    let Value::Array(rows) = table else {
        return Err(Error::invalid_input(0, "expected a JSON array of rows"));
    };

    let mut width = None;
    let mut links = Vec::with_capacity(rows.len());
    for (row, value) in rows.iter().enumerate() {
        let cells: Vec<&Value> = match value {
            Value::Array(cells) => cells.iter().collect(),
            Value::Object(map) => map.values().collect(),
            other => {
                return Err(Error::invalid_input(
                    row,
                    format!("expected an array or object row, got {}", kind(other)),
                ));
            }
        };
        check_width(row, cells.len(), &mut width)?;

        let source = json_node(row, "source", cells[0])?;
        let target = json_node(row, "target", cells[1])?;
        let weight = match cells.get(2) {
            Some(cell) => json_weight(row, cell)?,
            None => 1.0,
        };
        links.push(Link::new(source, target, weight));
    }
    Ok(links)
}

pub fn links_from_json_str(input: &str) -> Result<Vec<Link<NodeId>>> {
    let table: Value = serde_json::from_str(input)?;
    links_from_json(&table)
}

/// Reads comma-separated rows. Identifier cells in canonical integer form become [`NodeId::Int`].
pub fn links_from_csv<R: Read>(reader: R, has_headers: bool) -> Result<Vec<Link<NodeId>>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(has_headers)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut width = None;
    let mut links = Vec::new();
    for (row, record) in reader.records().enumerate() {
        let record = record?;
        check_width(row, record.len(), &mut width)?;

        let source = csv_node(row, "source", &record[0])?;
        let target = csv_node(row, "target", &record[1])?;
        let weight = match record.get(2) {
            Some(cell) => cell.parse::<f64>().ok().filter(|w| w.is_finite()).ok_or_else(|| {
                Error::invalid_input(row, format!("weight {cell:?} is not a finite number"))
            })?,
            None => 1.0,
        };
        links.push(Link::new(source, target, weight));
    }
    Ok(links)
}

fn check_width(row: usize, len: usize, width: &mut Option<usize>) -> Result<()> {
    match *width {
        None => {
            if !(2..=3).contains(&len) {
                return Err(Error::invalid_input(
                    row,
                    format!("expected 2 or 3 columns (source, target[, weight]), got {len}"),
                ));
            }
            *width = Some(len);
        }
        Some(w) if w != len => {
            return Err(Error::invalid_input(
                row,
                format!("expected {w} columns like the first row, got {len}"),
            ));
        }
        Some(_) => {}
    }
    Ok(())
}

fn csv_node(row: usize, column: &str, cell: &str) -> Result<NodeId> {
    if cell.trim().is_empty() {
        return Err(Error::invalid_input(row, format!("{column} is empty")));
    }
    Ok(NodeId::parse(cell))
}

fn json_node(row: usize, column: &str, cell: &Value) -> Result<NodeId> {
    match cell {
        Value::String(s) => Ok(NodeId::Text(s.clone())),
        Value::Number(n) => n.as_i64().map(NodeId::Int).ok_or_else(|| {
            Error::invalid_input(row, format!("{column} {n} is not an integer identifier"))
        }),
        other => Err(Error::invalid_input(
            row,
            format!("{column} must be a string or integer, got {}", kind(other)),
        )),
    }
}

fn json_weight(row: usize, cell: &Value) -> Result<f64> {
    cell.as_f64().filter(|w| w.is_finite()).ok_or_else(|| {
        Error::invalid_input(row, format!("weight must be a number, got {}", kind(cell)))
    })
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
