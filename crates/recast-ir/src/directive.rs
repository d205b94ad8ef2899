//! Rewrite directives: the user-supplied rename/retype instructions.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{DataType, RewriteError};

/// One instruction to rename and/or retype a single column.
///
/// `None` keeps the column's current attribute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Directive {
    pub field_name: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_type: Option<DataType>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_name: Option<String>,
}

impl Directive {
    pub fn new(field_name: impl Into<String>) -> Self {
        Self {
            field_name: field_name.into(),
            new_type: None,
            new_name: None,
        }
    }

    pub fn rename_to(mut self, new_name: impl Into<String>) -> Self {
        self.new_name = Some(new_name.into());
        self
    }

    pub fn cast_to(mut self, new_type: DataType) -> Self {
        self.new_type = Some(new_type);
        self
    }
}

/// Parse the `--fields_metadata` document.
///
/// Accepts a JSON array of objects with `field_name` (required),
/// `data_type` and `new_field_name`. The empty object `{}` is accepted as
/// an empty list since it is the command-line default.
pub fn parse_directives(json: &str) -> Result<Vec<Directive>, RewriteError> {
    let document: Value = serde_json::from_str(json)?;

    let entries = match document {
        Value::Array(entries) => entries,
        Value::Object(map) if map.is_empty() => return Ok(Vec::new()),
        other => {
            return Err(RewriteError::MalformedDirective {
                index: 0,
                reason: format!("expected a list of directives, got {}", json_kind(&other)),
            })
        }
    };

    entries
        .iter()
        .enumerate()
        .map(|(index, entry)| parse_entry(index, entry))
        .collect()
}

fn parse_entry(index: usize, entry: &Value) -> Result<Directive, RewriteError> {
    let malformed = |reason: String| RewriteError::MalformedDirective { index, reason };

    let object = entry
        .as_object()
        .ok_or_else(|| malformed(format!("expected an object, got {}", json_kind(entry))))?;

    let field_name = match object.get("field_name") {
        Some(Value::String(name)) => name.clone(),
        Some(other) => {
            return Err(malformed(format!(
                "`field_name` must be a string, got {}",
                json_kind(other)
            )))
        }
        None => return Err(malformed("missing `field_name`".to_string())),
    };

    let new_type = optional_string(object.get("data_type"))
        .map_err(|kind| malformed(format!("`data_type` must be a string, got {}", kind)))?
        .map(|name| name.parse::<DataType>())
        .transpose()?;

    let new_name = optional_string(object.get("new_field_name"))
        .map_err(|kind| malformed(format!("`new_field_name` must be a string, got {}", kind)))?
        .map(str::to_string);

    Ok(Directive {
        field_name,
        new_type,
        new_name,
    })
}

/// Absent, `null` and `""` all mean "keep as-is".
fn optional_string(value: Option<&Value>) -> Result<Option<&str>, &'static str> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) if s.is_empty() => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.as_str())),
        Some(other) => Err(json_kind(other)),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "an object",
    }
}
