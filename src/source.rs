use crate::normalize::RawRow;
use serde_json::Value;
use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("failed to read {origin}: {source}")]
    Io { origin: String, #[source] source: io::Error },
    #[error("invalid JSON in {origin}: {source}")]
    Json { origin: String, #[source] source: serde_json::Error },
    #[error("unsupported export shape in {origin}: {detail}")]
    Shape { origin: String, detail: String },
}

/// Supplies the raw survey rows for one processing run.
pub trait RowSource {
    fn describe(&self) -> String;
    fn fetch(&self) -> Result<Vec<RawRow>, SourceError>;
}

/// Rows already in memory.
#[derive(Debug, Clone, Default)]
pub struct StaticRows(pub Vec<RawRow>);

impl RowSource for StaticRows {
    fn describe(&self) -> String {
        format!("{} in-memory rows", self.0.len())
    }

    fn fetch(&self) -> Result<Vec<RawRow>, SourceError> {
        Ok(self.0.clone())
    }
}

/// A spreadsheet export on disk (or stdin when the path is `-`).
///
/// Accepts the Sheets API `values` response (`{"values": [[header..], [cell..]]}`,
/// first row is the header) or a JSON array of label → value objects.
#[derive(Debug, Clone)]
pub struct SheetExport {
    path: PathBuf,
}

impl SheetExport {
    pub fn from_path(path: impl AsRef<Path>) -> Self {
        Self { path: path.as_ref().to_path_buf() }
    }

    pub fn from_reader<R: Read>(reader: R, origin: &str) -> Result<Vec<RawRow>, SourceError> {
        let v: Value = serde_json::from_reader(reader)
            .map_err(|source| SourceError::Json { origin: origin.to_string(), source })?;
        rows_from_value(&v).map_err(|detail| SourceError::Shape { origin: origin.to_string(), detail })
    }
}

impl RowSource for SheetExport {
    fn describe(&self) -> String {
        if self.path.as_os_str() == "-" { "stdin".to_string() } else { self.path.display().to_string() }
    }

    fn fetch(&self) -> Result<Vec<RawRow>, SourceError> {
        let origin = self.describe();
        let rows = if self.path.as_os_str() == "-" {
            Self::from_reader(io::stdin().lock(), &origin)?
        } else {
            let f = File::open(&self.path)
                .map_err(|source| SourceError::Io { origin: origin.clone(), source })?;
            Self::from_reader(BufReader::new(f), &origin)?
        };
        tracing::info!(source = %origin, rows = rows.len(), "fetched survey rows");
        Ok(rows)
    }
}

pub fn rows_from_value(v: &Value) -> Result<Vec<RawRow>, String> {
    match v {
        Value::Object(map) => match map.get("values") {
            Some(Value::Array(grid)) => rows_from_grid(grid),
            // Sheets omits `values` entirely for an empty range
            None => Ok(Vec::new()),
            Some(other) => Err(format!("`values` must be an array, got {}", type_name(other))),
        },
        Value::Array(items) => items
            .iter()
            .enumerate()
            .map(|(i, item)| match item {
                Value::Object(obj) => Ok(obj
                    .iter()
                    .filter_map(|(k, v)| cell_text(v).map(|s| (k.clone(), s)))
                    .collect::<RawRow>()),
                other => Err(format!("row {i} must be an object, got {}", type_name(other))),
            })
            .collect(),
        other => Err(format!("expected object or array, got {}", type_name(other))),
    }
}

fn rows_from_grid(grid: &[Value]) -> Result<Vec<RawRow>, String> {
    let Some((header, body)) = grid.split_first() else { return Ok(Vec::new()) };
    let header: Vec<String> = match header {
        Value::Array(cells) => cells.iter().map(|c| cell_text(c).unwrap_or_default()).collect(),
        other => return Err(format!("header row must be an array, got {}", type_name(other))),
    };

    body.iter()
        .enumerate()
        .map(|(i, row)| match row {
            Value::Array(cells) => Ok(header
                .iter()
                .zip(cells.iter())
                .filter_map(|(label, cell)| cell_text(cell).map(|s| (label.clone(), s)))
                .collect::<RawRow>()),
            other => Err(format!("row {} must be an array, got {}", i + 1, type_name(other))),
        })
        .collect()
}

/// Text form of a spreadsheet cell; integral numbers drop their fraction.
pub fn cell_text(v: &Value) -> Option<String> {
    match v {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() { return Some(i.to_string()); }
            if let Some(u) = n.as_u64() { return Some(u.to_string()); }
            let f = n.as_f64()?;
            if f.fract() == 0.0 && f.abs() < 1e15 {
                Some(format!("{}", f as i64))
            } else {
                Some(f.to_string())
            }
        }
        other => Some(other.to_string()),
    }
}

fn type_name(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
