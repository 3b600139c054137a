//! In-memory tabular dataset produced by `tabular` output.

use std::fmt;

use serde_json::{Map, Value};

use crate::Result;
use crate::error::Error;

/// One value of a [`Table`].
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl Cell {
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Cell::Null)
    }

    #[must_use]
    #[expect(clippy::cast_precision_loss, reason = "table values are display oriented")]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Cell::Int(v) => Some(*v as f64),
            Cell::Float(v) => Some(*v),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Cell::Text(v) => Some(v),
            _ => None,
        }
    }

    /// JSON value of the cell. Non-finite floats become `null`.
    #[must_use]
    pub fn to_json(&self) -> Value {
        match self {
            Cell::Null => Value::Null,
            Cell::Bool(v) => Value::Bool(*v),
            Cell::Int(v) => Value::from(*v),
            Cell::Float(v) => serde_json::Number::from_f64(*v).map_or(Value::Null, Value::Number),
            Cell::Text(v) => Value::String(v.clone()),
        }
    }

    fn from_json(value: &Value) -> Self {
        match value {
            Value::Null => Cell::Null,
            Value::Bool(v) => Cell::Bool(*v),
            Value::Number(n) => match n.as_i64() {
                Some(v) => Cell::Int(v),
                None => n.as_f64().map_or(Cell::Null, Cell::Float),
            },
            Value::String(v) => Cell::Text(v.clone()),
            nested @ (Value::Array(_) | Value::Object(_)) => Cell::Text(nested.to_string()),
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Null => Ok(()),
            Cell::Bool(true) => f.write_str("True"),
            Cell::Bool(false) => f.write_str("False"),
            Cell::Int(v) => write!(f, "{v}"),
            Cell::Float(v) if v.is_finite() && v.fract() == 0.0 => write!(f, "{v:.1}"),
            Cell::Float(v) => write!(f, "{v}"),
            Cell::Text(v) => f.write_str(v),
        }
    }
}

/// A named column of cells.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    name: String,
    cells: Vec<Cell>,
}

impl Column {
    #[must_use]
    pub fn new<S: Into<String>>(name: S, cells: Vec<Cell>) -> Self {
        Self {
            name: name.into(),
            cells,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    #[must_use]
    pub fn get(&self, row: usize) -> Option<&Cell> {
        self.cells.get(row)
    }

    /// `true` when every non-null cell is a number.
    #[must_use]
    pub fn is_numeric(&self) -> bool {
        self.cells
            .iter()
            .filter(|cell| !cell.is_null())
            .all(|cell| matches!(cell, Cell::Int(_) | Cell::Float(_)))
    }

    /// Column with the narrowest type every field parses as.
    fn infer<S: Into<String>>(name: S, fields: Vec<String>) -> Self {
        let present = || fields.iter().filter(|f| !f.is_empty());

        let cells = if present().all(|f| f.parse::<i64>().is_ok()) {
            fields
                .iter()
                .map(|f| f.parse().map_or(Cell::Null, Cell::Int))
                .collect()
        } else if present().all(|f| f.parse::<f64>().is_ok()) {
            fields
                .iter()
                .map(|f| f.parse().map_or(Cell::Null, Cell::Float))
                .collect()
        } else if present().all(|f| parse_bool(f).is_some()) {
            fields
                .iter()
                .map(|f| parse_bool(f).map_or(Cell::Null, Cell::Bool))
                .collect()
        } else {
            fields
                .into_iter()
                .map(|f| if f.is_empty() { Cell::Null } else { Cell::Text(f) })
                .collect()
        };

        Self::new(name, cells)
    }
}

fn parse_bool(field: &str) -> Option<bool> {
    match field {
        "True" | "true" | "TRUE" => Some(true),
        "False" | "false" | "FALSE" => Some(false),
        _ => None,
    }
}

/// Column-major table with an optional key made of one or more index columns.
///
/// A table without index columns is keyed by row position.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    index: Vec<Column>,
    columns: Vec<Column>,
}

impl Table {
    /// Build a table from equally long data columns.
    pub fn new(columns: Vec<Column>) -> Result<Self> {
        if let Some(first) = columns.first() {
            let rows = first.cells.len();
            if let Some(other) = columns.iter().find(|c| c.cells.len() != rows) {
                return Err(Error::processing(format!(
                    "column '{}' has {} rows, expected {rows}",
                    other.name,
                    other.cells.len()
                )));
            }
        }

        Ok(Self {
            index: Vec::new(),
            columns,
        })
    }

    /// Load a delimited table with a header row.
    pub fn from_csv(body: &[u8]) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_reader(body);

        let headers: Vec<String> = reader
            .headers()
            .map_err(|e| Error::processing(format!("unable to read header row: {e}")))?
            .iter()
            .map(ToOwned::to_owned)
            .collect();

        let mut fields: Vec<Vec<String>> = vec![Vec::new(); headers.len()];
        for record in reader.records() {
            let record = record.map_err(|e| Error::processing(format!("malformed row: {e}")))?;
            for (column, field) in fields.iter_mut().zip(record.iter()) {
                column.push(field.to_owned());
            }
        }

        let columns = headers
            .into_iter()
            .zip(fields)
            .map(|(name, fields)| Column::infer(name, fields))
            .collect();

        Self::new(columns)
    }

    /// Load a record oriented JSON document.
    ///
    /// Accepts an array of objects or a single object, which becomes one record. Columns appear in
    /// first-seen order and records missing a field get a null cell.
    pub fn from_json(value: &Value) -> Result<Self> {
        let records: Vec<&Map<String, Value>> = match value {
            Value::Array(items) => items
                .iter()
                .map(|item| {
                    item.as_object().ok_or_else(|| {
                        Error::processing(format!("expected a record object, found {item}"))
                    })
                })
                .collect::<Result<_>>()?,
            Value::Object(record) => vec![record],
            other => {
                return Err(Error::processing(format!(
                    "cannot build a table from {other}"
                )));
            }
        };

        let mut names: Vec<&str> = Vec::new();
        for record in &records {
            for key in record.keys() {
                if !names.contains(&key.as_str()) {
                    names.push(key);
                }
            }
        }

        let columns = names
            .into_iter()
            .map(|name| {
                let cells = records
                    .iter()
                    .map(|record| record.get(name).map_or(Cell::Null, Cell::from_json))
                    .collect();
                Column::new(name, cells)
            })
            .collect();

        Self::new(columns)
    }

    /// Number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.columns
            .first()
            .or_else(|| self.index.first())
            .map_or(0, |c| c.cells.len())
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Data columns, key columns excluded.
    #[must_use]
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    #[must_use]
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    #[must_use]
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Key columns, outermost first.
    #[must_use]
    pub fn index(&self) -> &[Column] {
        &self.index
    }

    #[must_use]
    pub fn index_names(&self) -> Vec<&str> {
        self.index.iter().map(|c| c.name.as_str()).collect()
    }

    /// Relabel data and key columns. Labels missing from `mapping` are kept.
    pub fn rename(&mut self, mapping: &[(String, String)]) {
        for column in self.index.iter_mut().chain(self.columns.iter_mut()) {
            if let Some((_, to)) = mapping.iter().find(|(from, _)| *from == column.name) {
                column.name.clone_from(to);
            }
        }
    }

    /// Keep exactly `names`, in that order.
    pub fn select(&mut self, names: &[String]) -> Result<()> {
        let mut selected = Vec::with_capacity(names.len());
        for name in names {
            let column = self
                .column(name)
                .ok_or_else(|| Error::processing(format!("column '{name}' not found")))?;
            selected.push(column.clone());
        }
        self.columns = selected;
        Ok(())
    }

    /// Move `names` out of the data columns and make them the key, replacing any previous key.
    pub fn set_index(&mut self, names: &[String]) -> Result<()> {
        if let Some(missing) = names.iter().find(|name| self.column(name).is_none()) {
            return Err(Error::processing(format!(
                "column '{missing}' not found, cannot set index"
            )));
        }

        let mut index = Vec::with_capacity(names.len());
        for name in names {
            if let Some(position) = self.columns.iter().position(|c| c.name == *name) {
                index.push(self.columns.remove(position));
            }
        }
        self.index = index;
        Ok(())
    }

    /// Key cells of `row`, empty when the table has no key.
    #[must_use]
    pub fn row_key(&self, row: usize) -> Vec<&Cell> {
        self.index.iter().filter_map(|c| c.get(row)).collect()
    }

    /// Cell of `column` in the row whose key renders as `key`.
    #[must_use]
    pub fn lookup<K: AsRef<str>>(&self, key: &[K], column: &str) -> Option<&Cell> {
        let column = self.column(column)?;
        (0..self.len())
            .find(|&row| {
                let cells = self.row_key(row);
                cells.len() == key.len()
                    && cells
                        .iter()
                        .zip(key)
                        .all(|(cell, k)| cell.to_string() == k.as_ref())
            })
            .and_then(|row| column.get(row))
    }

    /// Key columns followed by data columns, ready for serialization.
    ///
    /// With `index` set and no key, a positional key labelled `""` is synthesized.
    pub(crate) fn frame(&self, index: bool) -> (usize, Vec<Column>) {
        if !index {
            return (0, self.columns.clone());
        }

        let mut columns = if self.index.is_empty() {
            let positions = (0..self.len())
                .map(|row| Cell::Int(i64::try_from(row).unwrap_or(i64::MAX)))
                .collect();
            vec![Column::new("", positions)]
        } else {
            self.index.clone()
        };
        let keys = columns.len();
        columns.extend(self.columns.iter().cloned());
        (keys, columns)
    }
}
