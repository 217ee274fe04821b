//! Notebook document model.
//!
//! Only the fields the normalizer reads are typed: the top-level `cells`
//! array, and `cell_type` and `source` on each cell. Every other key is kept
//! as raw JSON in its original position, so writing a notebook back out
//! reproduces everything that was not rewritten.

use serde::de::{self, Deserialize};
use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::ser::PrettyFormatter;
use serde_json::{Map, Value};
use std::path::PathBuf;

pub mod io;

const CELLS: &str = "cells";
const CELL_TYPE: &str = "cell_type";
const SOURCE: &str = "source";

/// Indentation used when writing notebooks back to disk.
pub const INDENT: &[u8] = b"  ";

#[derive(Debug, thiserror::Error)]
pub enum NotebookError {
    #[error("IO error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Parse error: {0}")]
    Parse(#[source] serde_json::Error),
    #[error("Notebook has no top-level `cells` array")]
    MissingCells,
    #[error("Schema error in cell {index}: {source}")]
    Schema {
        index: usize,
        source: serde_json::Error,
    },
    #[error("Serialization error: {0}")]
    Serialize(#[source] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CellType {
    Markdown,
    Code,
    Raw,
    Other(String),
}

impl CellType {
    pub fn as_str(&self) -> &str {
        match self {
            CellType::Markdown => "markdown",
            CellType::Code => "code",
            CellType::Raw => "raw",
            CellType::Other(kind) => kind,
        }
    }
}

impl From<String> for CellType {
    fn from(kind: String) -> Self {
        match kind.as_str() {
            "markdown" => CellType::Markdown,
            "code" => CellType::Code,
            "raw" => CellType::Raw,
            _ => CellType::Other(kind),
        }
    }
}

impl From<&str> for CellType {
    fn from(kind: &str) -> Self {
        CellType::from(kind.to_string())
    }
}

impl<'de> Deserialize<'de> for CellType {
    fn deserialize<D: de::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        String::deserialize(deserializer).map(CellType::from)
    }
}

impl Serialize for CellType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Cell text as stored on disk.
///
/// Jupyter writes a list of lines, each keeping its trailing `\n`, but a
/// single string is also valid. Whichever form was read is the form written.
/// Sources of non-markdown cells are never inspected and load as `Raw`.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(untagged)]
pub enum Source {
    Lines(Vec<String>),
    Text(String),
    #[serde(skip_deserializing)]
    Raw(Value),
}

impl Source {
    /// Returns the full text, joining lines without a separator. A `Raw`
    /// source yields its text only when it has one of the two text shapes.
    pub fn text(&self) -> String {
        match self {
            Source::Lines(lines) => lines.concat(),
            Source::Text(text) => text.clone(),
            Source::Raw(Value::String(text)) => text.clone(),
            Source::Raw(Value::Array(items)) => items.iter().filter_map(Value::as_str).collect(),
            Source::Raw(_) => String::new(),
        }
    }
}

impl From<Vec<String>> for Source {
    fn from(lines: Vec<String>) -> Self {
        Source::Lines(lines)
    }
}

impl From<Vec<&str>> for Source {
    fn from(lines: Vec<&str>) -> Self {
        Source::Lines(lines.into_iter().map(str::to_string).collect())
    }
}

impl From<&str> for Source {
    fn from(text: &str) -> Self {
        Source::Text(text.to_string())
    }
}

/// A single notebook cell.
///
/// `fields` holds every key of the cell in file order. The `cell_type` and
/// `source` entries are kept as null slots and filled from the typed fields
/// on serialization. A cell read without a `source` key has no slot and is
/// written without one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cell {
    pub cell_type: CellType,
    pub source: Source,
    fields: Map<String, Value>,
}

impl Cell {
    pub fn new(cell_type: impl Into<CellType>, source: impl Into<Source>) -> Self {
        let mut fields = Map::new();
        fields.insert(CELL_TYPE.to_string(), Value::Null);
        fields.insert("metadata".to_string(), Value::Object(Map::new()));
        fields.insert(SOURCE.to_string(), Value::Null);
        Self {
            cell_type: cell_type.into(),
            source: source.into(),
            fields,
        }
    }

    pub fn markdown(source: impl Into<Source>) -> Self {
        Self::new(CellType::Markdown, source)
    }

    pub fn code(source: impl Into<Source>) -> Self {
        let mut cell = Self::new(CellType::Code, source);
        cell.fields.insert("execution_count".to_string(), Value::Null);
        cell.fields.insert("outputs".to_string(), Value::Array(Vec::new()));
        cell
    }

    pub fn from_value(value: Value) -> Result<Self, serde_json::Error> {
        let mut fields = match value {
            Value::Object(fields) => fields,
            other => {
                return Err(de::Error::custom(format!(
                    "expected a cell object, found {}",
                    json_kind(&other)
                )));
            }
        };
        let cell_type = CellType::deserialize(take_field(&mut fields, CELL_TYPE)?)?;
        let source = if cell_type == CellType::Markdown {
            Source::deserialize(take_field(&mut fields, SOURCE)?)?
        } else {
            Source::Raw(fields.get_mut(SOURCE).map(Value::take).unwrap_or(Value::Null))
        };
        Ok(Self {
            cell_type,
            source,
            fields,
        })
    }

    pub fn is_markdown(&self) -> bool {
        self.cell_type == CellType::Markdown
    }

    /// Looks up a key other than `cell_type` or `source`.
    pub fn field(&self, key: &str) -> Option<&Value> {
        match key {
            CELL_TYPE | SOURCE => None,
            _ => self.fields.get(key),
        }
    }
}

impl Serialize for Cell {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (key, value) in &self.fields {
            match key.as_str() {
                CELL_TYPE => map.serialize_entry(key, &self.cell_type)?,
                SOURCE => map.serialize_entry(key, &self.source)?,
                _ => map.serialize_entry(key, value)?,
            }
        }
        map.end()
    }
}

/// A notebook document: an ordered list of cells plus untouched top-level
/// fields (`metadata`, `nbformat`, ...).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notebook {
    pub cells: Vec<Cell>,
    fields: Map<String, Value>,
}

impl Notebook {
    pub fn new(cells: Vec<Cell>) -> Self {
        let mut fields = Map::new();
        fields.insert(CELLS.to_string(), Value::Null);
        fields.insert("metadata".to_string(), Value::Object(Map::new()));
        fields.insert("nbformat".to_string(), Value::from(4));
        fields.insert("nbformat_minor".to_string(), Value::from(5));
        Self { cells, fields }
    }

    pub fn from_json(text: &str) -> Result<Self, NotebookError> {
        let value: Value = serde_json::from_str(text).map_err(NotebookError::Parse)?;
        Self::from_value(value)
    }

    pub fn from_value(value: Value) -> Result<Self, NotebookError> {
        let Value::Object(mut fields) = value else {
            return Err(NotebookError::MissingCells);
        };
        let raw_cells = match fields.get_mut(CELLS).map(Value::take) {
            Some(Value::Array(cells)) => cells,
            _ => return Err(NotebookError::MissingCells),
        };
        let cells = raw_cells
            .into_iter()
            .enumerate()
            .map(|(index, raw)| {
                Cell::from_value(raw).map_err(|source| NotebookError::Schema { index, source })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { cells, fields })
    }

    /// Returns a notebook with the same top-level fields and new cells.
    pub fn with_cells(&self, cells: Vec<Cell>) -> Self {
        Self {
            cells,
            fields: self.fields.clone(),
        }
    }

    /// Looks up a top-level key other than `cells`.
    pub fn field(&self, key: &str) -> Option<&Value> {
        match key {
            CELLS => None,
            _ => self.fields.get(key),
        }
    }

    /// Renders the notebook as pretty JSON with [`INDENT`] and a trailing
    /// newline.
    pub fn to_json(&self) -> Result<String, NotebookError> {
        let mut out = Vec::new();
        let formatter = PrettyFormatter::with_indent(INDENT);
        let mut serializer = serde_json::Serializer::with_formatter(&mut out, formatter);
        self.serialize(&mut serializer).map_err(NotebookError::Serialize)?;
        out.push(b'\n');
        String::from_utf8(out).map_err(|err| {
            NotebookError::Serialize(de::Error::custom(format!("non UTF-8 output: {err}")))
        })
    }
}

impl Serialize for Notebook {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (key, value) in &self.fields {
            if key == CELLS {
                map.serialize_entry(key, &self.cells)?;
            } else {
                map.serialize_entry(key, value)?;
            }
        }
        map.end()
    }
}

fn take_field(
    fields: &mut Map<String, Value>,
    key: &'static str,
) -> Result<Value, serde_json::Error> {
    fields
        .get_mut(key)
        .map(Value::take)
        .ok_or_else(|| de::Error::missing_field(key))
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
