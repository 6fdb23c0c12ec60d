//! Helpers shared by the JSON readers.

use serde::Deserialize;
use serde::de::DeserializeOwned;

use super::text;
use crate::crossword::types::error::{CrosswordError, Result};

/// A JSON value that may be either a number or a string.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Int(i64),
    Text(String),
}

impl Scalar {
    pub fn as_text(&self) -> String {
        match self {
            Scalar::Int(n) => n.to_string(),
            Scalar::Text(s) => s.clone(),
        }
    }

    pub fn as_int(&self, context: &str) -> Result<i64> {
        match self {
            Scalar::Int(n) => Ok(*n),
            Scalar::Text(s) => text::parse_int(s, context),
        }
    }
}

/// Deserializes a whole document, wrapping syntax and shape errors as format errors.
pub fn parse_document<T: DeserializeOwned>(document: &str) -> Result<T> {
    serde_json::from_str(document).map_err(|e| CrosswordError::caused_by("Error parsing JSON object", e))
}
