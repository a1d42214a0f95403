use std::collections::HashMap;
use std::str::FromStr;

use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};
use serde_json::Value;
use tracing::debug;

use crate::error::{Error, Result};

/// A normalized API response: named columns of string cells.
///
/// Stored column-major. Every column holds the same number of cells and cell
/// `k` of every column comes from the same source row.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ResultTable {
    columns: Vec<String>,
    data: Vec<Vec<String>>,
}

/// One row of a [`ResultTable`].
#[derive(Debug, Clone, Copy)]
pub struct Row<'a> {
    table: &'a ResultTable,
    index: usize,
}

impl<'a> Row<'a> {
    /// Cell in the first column called `name`.
    pub fn get(&self, name: &str) -> Option<&'a str> {
        self.table.value(self.index, name)
    }

    /// `(column, value)` pairs in column order.
    pub fn iter(self) -> impl Iterator<Item = (&'a str, &'a str)> {
        let index = self.index;
        self.table
            .columns
            .iter()
            .zip(self.table.data.iter())
            .map(move |(c, col)| (c.as_str(), col[index].as_str()))
    }

    pub fn values(self) -> Vec<&'a str> {
        self.iter().map(|(_, v)| v).collect()
    }
}

impl ResultTable {
    /// Parses a response body. See [`ResultTable::from_value`].
    pub fn from_json(body: &str, declared_width: Option<usize>) -> Result<Self> {
        let payload: Value = serde_json::from_str(body).map_err(|e| {
            let snippet: String = body.trim().chars().take(120).collect();
            Error::MalformedResponse(format!("body is not JSON ({}): {}", e, snippet))
        })?;
        Self::from_value(&payload, declared_width)
    }

    /// Builds a table from `[[header...], [row...], ...]`.
    ///
    /// With `declared_width`, only the first that many header entries are
    /// kept. Row elements past the kept width are dropped; rows shorter than
    /// it are rejected.
    pub fn from_value(payload: &Value, declared_width: Option<usize>) -> Result<Self> {
        let rows = payload
            .as_array()
            .ok_or_else(|| malformed("expected a JSON array of rows"))?;
        let (header, body) = rows
            .split_first()
            .ok_or_else(|| malformed("response has no header row"))?;

        let header = header
            .as_array()
            .ok_or_else(|| malformed("header row is not an array"))?
            .iter()
            .enumerate()
            .map(|(i, v)| match v {
                Value::String(s) => Ok(s.clone()),
                other => Err(malformed(format!(
                    "header entry {} is not a string: {}",
                    i, other
                ))),
            })
            .collect::<Result<Vec<_>>>()?;
        if header.is_empty() {
            return Err(malformed("header row is empty"));
        }

        let width = match declared_width {
            Some(w) if w == 0 || w > header.len() => {
                return Err(malformed(format!(
                    "declared width {} does not fit header of {} column(s)",
                    w,
                    header.len()
                )));
            }
            Some(w) => w,
            None => header.len(),
        };
        if width < header.len() {
            debug!(dropped = ?&header[width..], "dropping trailing header columns");
        }

        let columns: Vec<String> = header.into_iter().take(width).collect();
        let mut data: Vec<Vec<String>> = (0..width)
            .map(|_| Vec::with_capacity(body.len()))
            .collect();

        let mut truncated = 0usize;
        for (i, row) in body.iter().enumerate() {
            let row = row
                .as_array()
                .ok_or_else(|| malformed(format!("row {} is not an array", i + 1)))?;
            if row.len() < width {
                return Err(malformed(format!(
                    "row {} has {} value(s), header has {}",
                    i + 1,
                    row.len(),
                    width
                )));
            }
            if row.len() > width {
                truncated += 1;
            }
            for (col, cell) in data.iter_mut().zip(row.iter()) {
                col.push(cell_to_string(cell, i + 1)?);
            }
        }
        if truncated > 0 {
            debug!(rows = truncated, width, "truncated trailing sentinel values");
        }

        Ok(Self { columns, data })
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.data.first().map_or(0, Vec::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn row(&self, index: usize) -> Option<Row<'_>> {
        (index < self.len()).then_some(Row { table: self, index })
    }

    pub fn rows(&self) -> impl Iterator<Item = Row<'_>> {
        (0..self.len()).map(move |index| Row { table: self, index })
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Cells of the first column called `name`.
    pub fn column(&self, name: &str) -> Option<&[String]> {
        self.position(name).map(|i| self.data[i].as_slice())
    }

    pub fn value(&self, row: usize, name: &str) -> Option<&str> {
        self.column(name)?.get(row).map(String::as_str)
    }

    /// Rows as name→value maps. For repeated column names the first wins.
    pub fn records(&self) -> Vec<HashMap<&str, &str>> {
        self.rows()
            .map(|row| {
                let mut map = HashMap::with_capacity(self.columns.len());
                for (k, v) in row.iter() {
                    map.entry(k).or_insert(v);
                }
                map
            })
            .collect()
    }

    /// Parses every cell of `name`; cells that fail to parse become `None`.
    ///
    /// The API reports suppressed estimates as negative sentinels such as
    /// `-666666666`, which parse successfully and are left to the caller.
    pub fn parse_column<T: FromStr>(&self, name: &str) -> Option<Vec<Option<T>>> {
        self.column(name)
            .map(|cells| cells.iter().map(|c| c.trim().parse().ok()).collect())
    }

    /// Concatenates the named columns row by row, e.g. `state`, `county`,
    /// `tract` into an 11-digit tract GEOID.
    pub fn composite_key(&self, names: &[&str]) -> Option<Vec<String>> {
        let cols = names
            .iter()
            .map(|n| self.column(n))
            .collect::<Option<Vec<_>>>()?;
        Some(
            (0..self.len())
                .map(|i| cols.iter().map(|c| c[i].as_str()).collect::<String>())
                .collect(),
        )
    }
}

/// Serializes as an array of records, columns in header order.
impl Serialize for ResultTable {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.len()))?;
        for row in self.rows() {
            seq.serialize_element(&RowRecord(row))?;
        }
        seq.end()
    }
}

struct RowRecord<'a>(Row<'a>);

impl Serialize for RowRecord<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.table.columns.len()))?;
        for (k, v) in self.0.iter() {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

fn cell_to_string(cell: &Value, row: usize) -> Result<String> {
    match cell {
        Value::String(s) => Ok(s.clone()),
        Value::Null => Ok(String::new()),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        other => Err(malformed(format!(
            "row {} holds a nested value: {}",
            row, other
        ))),
    }
}

fn malformed(msg: impl Into<String>) -> Error {
    Error::MalformedResponse(msg.into())
}
