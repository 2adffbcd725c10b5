use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::model::document::{CharOffset, RangeAnnotation};
use crate::model::record::Record;

/// Error type for reading input files
#[derive(Debug, thiserror::Error)]
pub enum InputError {
    #[error("could not read {path}: {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not parse {path}: {source}")]
    JsonError {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("could not parse {path}: {source}")]
    ConfigParseError {
        path: PathBuf,
        source: toml::de::Error,
    },
}

/// A tokenized document with the annotations visible for the current user.
///
/// `offsets` is `null` until the tokenizer has produced character offsets.
#[derive(Debug, Clone, Deserialize)]
pub struct DocumentFile {
    pub tokens: Vec<String>,
    #[serde(default)]
    pub offsets: Option<Vec<CharOffset>>,
    #[serde(default)]
    pub annotations: Vec<RangeAnnotation>,
}

pub(crate) fn read_text(path: &Path) -> Result<String, InputError> {
    fs::read_to_string(path).map_err(|e| InputError::ReadError {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Load a JSON array of records (codes, tags, or folders).
pub fn load_records(path: &Path) -> Result<Vec<Record>, InputError> {
    parse_records(&read_text(path)?, path)
}

/// Parse records from JSON text; `path` is only used for error messages.
pub fn parse_records(text: &str, path: &Path) -> Result<Vec<Record>, InputError> {
    serde_json::from_str(text).map_err(|e| InputError::JsonError {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Load a document file (tokens, optional offsets, annotations).
pub fn load_document(path: &Path) -> Result<DocumentFile, InputError> {
    let text = read_text(path)?;
    serde_json::from_str(&text).map_err(|e| InputError::JsonError {
        path: path.to_path_buf(),
        source: e,
    })
}
