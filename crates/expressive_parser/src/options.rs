//! Parser options.
//!
//! Options use the camelCase keys of the JSON configuration accepted by
//! embedders, so a configuration object can be deserialized directly.

use expressive_ast::SourceType;
use serde::Deserialize;

/// Options controlling a single parse.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Options {
    // -- Input --
    pub source_type: SourceType,
    pub source_filename: Option<String>,
    /// Line number of the first source line.
    pub start_line: u32,

    // -- Relaxations --
    pub allow_await_outside_function: bool,
    pub allow_return_outside_function: bool,
    pub allow_import_export_everywhere: bool,
    pub allow_super_outside_method: bool,
    /// Defaults to strict for modules.
    pub strict_mode: Option<bool>,

    // -- Output --
    /// Record `[start, end]` ranges on nodes.
    pub ranges: bool,
    /// Keep the token stream in the result.
    pub tokens: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            source_type: SourceType::Script,
            source_filename: None,
            start_line: 1,
            allow_await_outside_function: false,
            allow_return_outside_function: false,
            allow_import_export_everywhere: false,
            allow_super_outside_method: false,
            strict_mode: None,
            ranges: false,
            tokens: false,
        }
    }
}

impl Options {
    /// Options for parsing an ES module.
    pub fn module() -> Self {
        Self { source_type: SourceType::Module, ..Self::default() }
    }

    #[inline]
    pub fn is_module(&self) -> bool {
        self.source_type == SourceType::Module
    }

    /// Whether parsing starts in strict mode.
    #[inline]
    pub fn is_strict(&self) -> bool {
        self.strict_mode.unwrap_or_else(|| self.is_module())
    }

    /// Read options from a JSON object. Missing keys take their defaults.
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = Options::default();
        assert_eq!(options.start_line, 1);
        assert!(!options.is_module());
        assert!(!options.is_strict());
        assert!(Options::module().is_strict());
    }

    #[test]
    fn test_from_json() {
        let options =
            Options::from_json(r#"{"sourceType": "module", "startLine": 5, "strictMode": false}"#).unwrap();
        assert!(options.is_module());
        assert_eq!(options.start_line, 5);
        assert!(!options.is_strict());
        assert!(!options.tokens);
    }

    #[test]
    fn test_from_json_rejects_unknown_source_type() {
        assert!(Options::from_json(r#"{"sourceType": "commonjs"}"#).is_err());
    }
}
