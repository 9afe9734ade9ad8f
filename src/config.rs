//! Parse options.
//!
//! Options are plain serde data so hosts can keep them in a JSON file next to
//! the rest of their configuration. Missing fields take their defaults.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::errors::ConfigError;

/// Tunables for a single parse call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParseOptions {
    /// Maximum nesting of rule invocations before the innermost one fails
    /// with a recursion-limit error.
    pub max_depth: usize,
    /// Maximum number of errors retained at the furthest failure point.
    pub max_errors: usize,
    /// Skip the whitespace rule after the root rule before checking for the
    /// end of input.
    pub skip_trailing_whitespace: bool,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            max_depth: 512,
            max_errors: 64,
            skip_trailing_whitespace: true,
        }
    }
}

impl ParseOptions {
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_max_errors(mut self, max_errors: usize) -> Self {
        self.max_errors = max_errors;
        self
    }

    pub fn with_trailing_whitespace(mut self, skip: bool) -> Self {
        self.skip_trailing_whitespace = skip;
        self
    }

    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_uses_defaults() {
        let options = ParseOptions::from_json(r#"{ "max_depth": 32 }"#).unwrap();
        assert_eq!(options.max_depth, 32);
        assert_eq!(options.max_errors, ParseOptions::default().max_errors);
        assert!(options.skip_trailing_whitespace);
    }

    #[test]
    fn test_invalid_json_is_reported() {
        let err = ParseOptions::from_json("{ max_depth: }").unwrap_err();
        assert!(matches!(err, ConfigError::Json(_)));
    }

    #[test]
    fn test_missing_file_is_reported() {
        let err = ParseOptions::load("/nonexistent/pegloom.json").unwrap_err();
        assert!(err.to_string().contains("/nonexistent/pegloom.json"));
    }
}
