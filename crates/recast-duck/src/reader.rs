//! JSON reader options

use serde_json::{Map, Value};

use crate::sql::quote_literal;
use crate::EngineError;

/// Options forwarded to `read_json` as named parameters.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReaderOptions {
    options: Map<String, Value>,
}

impl ReaderOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse the `--input_options` object, e.g. `{"multiline": "true"}`.
    pub fn from_json(json: &str) -> Result<Self, EngineError> {
        match serde_json::from_str::<Value>(json)? {
            Value::Object(options) => {
                let parsed = Self { options };
                // Render once so bad keys and values fail before any I/O.
                parsed.named_parameters()?;
                Ok(parsed)
            }
            _ => Err(EngineError::InvalidReaderOption {
                key: String::new(),
                reason: "reader options must be a JSON object".to_string(),
            }),
        }
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.options.insert(key.into(), value.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }

    /// Render as `, key := value` pairs appended to the `read_json` call.
    pub(crate) fn named_parameters(&self) -> Result<String, EngineError> {
        let mut out = String::new();
        for (key, value) in &self.options {
            let (name, literal) = translate(key, value)?;
            out.push_str(&format!(", {} := {}", name, literal));
        }
        Ok(out)
    }
}

fn translate(key: &str, value: &Value) -> Result<(String, String), EngineError> {
    let invalid = |reason: &str| EngineError::InvalidReaderOption {
        key: key.to_string(),
        reason: reason.to_string(),
    };

    let valid_key = key
        .chars()
        .next()
        .map_or(false, |c| c.is_ascii_alphabetic() || c == '_')
        && key.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
    if !valid_key {
        return Err(invalid("option names must be plain identifiers"));
    }

    // Records spanning several lines are handled by format detection.
    if key.eq_ignore_ascii_case("multiline") {
        let multiline = match value {
            Value::Bool(b) => *b,
            Value::String(s) if s.eq_ignore_ascii_case("true") => true,
            Value::String(s) if s.eq_ignore_ascii_case("false") => false,
            _ => return Err(invalid("expected true or false")),
        };
        let format = if multiline { "auto" } else { "newline_delimited" };
        return Ok(("format".to_string(), quote_literal(format)));
    }

    let literal = match value {
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => quote_literal(s),
        Value::Null => "NULL".to_string(),
        Value::Array(_) | Value::Object(_) => {
            return Err(invalid("nested values are not supported"))
        }
    };
    Ok((key.to_string(), literal))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_options() {
        let options = ReaderOptions::from_json("{}").unwrap();
        assert!(options.is_empty());
        assert_eq!(options.named_parameters().unwrap(), "");
    }

    #[test]
    fn test_multiline_translation() {
        let options = ReaderOptions::from_json(r#"{"multiline": "true"}"#).unwrap();
        assert_eq!(options.named_parameters().unwrap(), ", format := 'auto'");

        let options = ReaderOptions::new().with("multiLine", false);
        assert_eq!(
            options.named_parameters().unwrap(),
            ", format := 'newline_delimited'"
        );
    }

    #[test]
    fn test_passthrough_literals() {
        let options = ReaderOptions::new()
            .with("sample_size", 100)
            .with("dateformat", "%d/%m/%Y");
        let rendered = options.named_parameters().unwrap();
        assert!(rendered.contains(", sample_size := 100"));
        assert!(rendered.contains(", dateformat := '%d/%m/%Y'"));
    }

    #[test]
    fn test_rejected_options() {
        assert!(matches!(
            ReaderOptions::from_json("[1]"),
            Err(EngineError::InvalidReaderOption { .. })
        ));
        assert!(matches!(
            ReaderOptions::from_json(r#"{"a; DROP": 1}"#),
            Err(EngineError::InvalidReaderOption { ref key, .. }) if key == "a; DROP"
        ));
        assert!(matches!(
            ReaderOptions::from_json(r#"{"columns": {"a": "INTEGER"}}"#),
            Err(EngineError::InvalidReaderOption { ref key, .. }) if key == "columns"
        ));
        assert!(matches!(
            ReaderOptions::from_json("{"),
            Err(EngineError::ReaderOptionsJson(_))
        ));
    }
}
