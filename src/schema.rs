//! Node definition schema delivered by the server's `object_info` endpoint
//!
//! The payload is a mapping from node-type identifier to a definition with a
//! `required` field map (declaration order is significant) and an ordered
//! output type list. Field specs arrive in tuple form: `["TYPE", {options}]`
//! for a plain type, or `[["a", "b"], {options}]` for an enumeration of
//! allowed values.

use indexmap::IndexMap;
use serde::de::{self, Deserializer};
use serde::Deserialize;
use serde_json::Value;
use std::path::PathBuf;
use thiserror::Error;

/// Full set of node definitions, keyed by type identifier, in delivery order
pub type NodeDefs = IndexMap<String, NodeDef>;

/// Errors raised while obtaining or decoding node definitions
#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("failed to read node definitions: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid node definitions: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Declarative description of one node type
#[derive(Debug, Clone, Deserialize)]
pub struct NodeDef {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub category: String,
    pub input: InputSpec,
    pub output: Vec<String>,
}

/// Input section of a node definition
#[derive(Debug, Clone, Deserialize)]
pub struct InputSpec {
    /// Required fields in declaration order
    pub required: IndexMap<String, FieldSpec>,
}

/// The type part of a field spec: a literal type name, or an ordered
/// enumeration of allowed values
#[derive(Debug, Clone, PartialEq)]
pub enum FieldType {
    Name(String),
    Values(Vec<Value>),
}

/// One required field: its type plus free-form options (`default`, `min`,
/// `max`, `step`, ...)
#[derive(Debug, Clone)]
pub struct FieldSpec {
    pub kind: FieldType,
    pub options: serde_json::Map<String, Value>,
}

impl FieldSpec {
    pub fn plain(type_name: impl Into<String>) -> Self {
        Self {
            kind: FieldType::Name(type_name.into()),
            options: serde_json::Map::new(),
        }
    }

    pub fn values(values: Vec<Value>) -> Self {
        Self {
            kind: FieldType::Values(values),
            options: serde_json::Map::new(),
        }
    }

    pub fn with_option(mut self, key: &str, value: Value) -> Self {
        self.options.insert(key.to_string(), value);
        self
    }

    /// Explicit default from the options map, if any
    pub fn default_value(&self) -> Option<&Value> {
        self.options.get("default")
    }
}

impl<'de> Deserialize<'de> for FieldSpec {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let parts = Vec::<Value>::deserialize(deserializer)?;
        let mut parts = parts.into_iter();

        let kind = match parts.next() {
            Some(Value::String(name)) => FieldType::Name(name),
            Some(Value::Array(values)) => FieldType::Values(values),
            Some(other) => {
                return Err(de::Error::custom(format!(
                    "field type must be a string or an array of values, got {other}"
                )))
            }
            None => return Err(de::Error::custom("field spec tuple is empty")),
        };

        let options = match parts.next() {
            Some(Value::Object(map)) => map,
            Some(other) => {
                return Err(de::Error::custom(format!(
                    "field options must be an object, got {other}"
                )))
            }
            None => serde_json::Map::new(),
        };

        Ok(FieldSpec { kind, options })
    }
}

/// Parse a raw `object_info` payload
pub fn parse_defs(json: &str) -> Result<NodeDefs, SchemaError> {
    Ok(serde_json::from_str(json)?)
}

/// Boundary to whatever delivers node definitions. Implementations must not
/// cache: the caller always revalidates.
pub trait SchemaSource {
    fn fetch_defs(&self) -> Result<NodeDefs, SchemaError>;
}

/// Reads node definitions from a JSON file on disk
pub struct FileSchemaSource {
    path: PathBuf,
}

impl FileSchemaSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl SchemaSource for FileSchemaSource {
    fn fetch_defs(&self) -> Result<NodeDefs, SchemaError> {
        let raw = std::fs::read_to_string(&self.path)?;
        parse_defs(&raw)
    }
}
