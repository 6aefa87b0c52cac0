//! The API catalog and its loader.
//!
//! The catalog is the saved output of the platform's `listApis` call:
//!
//! ```text
//! { "count": int,
//!   "api": [ { "name", "description", "isasync",
//!              "params":   [ { "name", "description", "type", "required" } ],
//!              "response": [ { "name", "description", "type", "response": [..] } ] } ] }
//! ```
//!
//! Loading only checks that the document is well-formed; it does not check
//! that every type tag is one the generator knows about.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::DefineError;
use crate::types::PrimitiveType;

/// Operations keyed by name.
pub type OperationIndex = BTreeMap<String, Operation>;

/// Key of the envelope the platform wraps a live `listApis` response in.
const LIST_APIS_ENVELOPE: &str = "listapisresponse";

/// The raw catalog document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    /// Number of operations the platform reported.
    #[serde(default)]
    pub count: usize,
    /// Every operation in catalog order.
    #[serde(default, rename = "api")]
    pub operations: Vec<Operation>,
}

/// One remote-callable operation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Operation {
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Whether the platform completes this operation as an async job.
    #[serde(default, rename = "isasync")]
    pub is_async: bool,
    #[serde(default)]
    pub params: Vec<Param>,
    #[serde(default)]
    pub response: Vec<ResponseField>,
}

/// A single operation parameter.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Param {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, rename = "type")]
    pub kind: PrimitiveType,
    #[serde(default)]
    pub required: bool,
}

/// A node in an operation's response tree.
///
/// `response` is non-empty only for nested object/array fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResponseField {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, rename = "type")]
    pub kind: PrimitiveType,
    #[serde(default)]
    pub response: Vec<ResponseField>,
}

impl Catalog {
    /// Parses a catalog document.
    ///
    /// Accepts both the bare `{count, api}` document and the same document
    /// still wrapped in the live `listapisresponse` envelope.
    ///
    /// ## Errors
    ///
    /// Returns [`DefineError::Parse`] if the document is not well-formed.
    pub fn parse(json: &str) -> Result<Self, DefineError> {
        let value: serde_json::Value = serde_json::from_str(json).map_err(DefineError::Parse)?;
        let value = match value {
            serde_json::Value::Object(mut map) if map.len() == 1 && map.contains_key(LIST_APIS_ENVELOPE) => {
                map.remove(LIST_APIS_ENVELOPE).unwrap_or_default()
            }
            other => other,
        };
        serde_json::from_value(value).map_err(DefineError::Parse)
    }

    /// Consumes the catalog into a name-keyed index.
    ///
    /// When two entries share a name the later one wins.
    pub fn into_index(self) -> OperationIndex {
        self.operations
            .into_iter()
            .map(|op| (op.name.clone(), op))
            .collect()
    }
}

impl Operation {
    /// Returns the first param with the given name.
    pub fn param(&self, name: &str) -> Option<&Param> {
        self.params.iter().find(|p| p.name == name)
    }

    /// Returns the top-level response field with the given name.
    pub fn response_field(&self, name: &str) -> Option<&ResponseField> {
        self.response.iter().find(|r| r.name == name)
    }
}

impl ResponseField {
    /// Returns `true` if this field has nested children.
    pub fn is_nested(&self) -> bool {
        !self.response.is_empty()
    }
}

/// Parses a catalog document into a name-keyed operation index.
///
/// ## Errors
///
/// Returns [`DefineError::Parse`] if the document is not well-formed.
pub fn load_catalog(json: &str) -> Result<OperationIndex, DefineError> {
    Ok(Catalog::parse(json)?.into_index())
}

/// Reads and parses a catalog file.
///
/// ## Errors
///
/// Returns [`DefineError::Read`] if the file cannot be read and
/// [`DefineError::Parse`] if it is not a well-formed catalog.
pub fn read_catalog(path: &Path) -> Result<OperationIndex, DefineError> {
    let json = fs::read_to_string(path).map_err(|e| DefineError::Read {
        path: path.display().to_string(),
        source: e,
    })?;
    load_catalog(&json)
}
