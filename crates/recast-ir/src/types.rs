//! Type system for column rewrites

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::RewriteError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DataType {
    // Primitives
    Bool,
    Int8,
    Int16,
    Int32,
    Int64,
    UInt8,
    UInt16,
    UInt32,
    UInt64,
    Float32,
    Float64,
    Decimal { precision: u8, scale: u8 },

    // Text
    String,

    // Binary
    Blob,

    // Temporal
    Date,
    Time,
    Timestamp,
    TimestampTz,
    Interval,

    /// Engine type without a first-class variant (STRUCT, LIST, JSON, UUID, ...).
    /// Holds the engine's own spelling so it can be rendered back verbatim.
    Other(String),
}

impl DataType {
    /// Map a type name reported by the engine. Never fails: anything
    /// unrecognised is kept as [`DataType::Other`].
    pub fn from_engine(name: &str) -> Self {
        let trimmed = name.trim();
        match parse_known(trimmed) {
            Some(data_type) => data_type,
            None => DataType::Other(trimmed.to_string()),
        }
    }

    /// SQL spelling used in CAST expressions.
    pub fn sql_name(&self) -> String {
        match self {
            DataType::Bool => "BOOLEAN".to_string(),
            DataType::Int8 => "TINYINT".to_string(),
            DataType::Int16 => "SMALLINT".to_string(),
            DataType::Int32 => "INTEGER".to_string(),
            DataType::Int64 => "BIGINT".to_string(),
            DataType::UInt8 => "UTINYINT".to_string(),
            DataType::UInt16 => "USMALLINT".to_string(),
            DataType::UInt32 => "UINTEGER".to_string(),
            DataType::UInt64 => "UBIGINT".to_string(),
            DataType::Float32 => "FLOAT".to_string(),
            DataType::Float64 => "DOUBLE".to_string(),
            DataType::Decimal { precision, scale } => format!("DECIMAL({},{})", precision, scale),
            DataType::String => "VARCHAR".to_string(),
            DataType::Blob => "BLOB".to_string(),
            DataType::Date => "DATE".to_string(),
            DataType::Time => "TIME".to_string(),
            DataType::Timestamp => "TIMESTAMP".to_string(),
            DataType::TimestampTz => "TIMESTAMP WITH TIME ZONE".to_string(),
            DataType::Interval => "INTERVAL".to_string(),
            DataType::Other(raw) => raw.clone(),
        }
    }

    /// Whether cells of this type can hold the null token.
    pub fn is_textual(&self) -> bool {
        matches!(self, DataType::String)
    }
}

impl FromStr for DataType {
    type Err = RewriteError;

    /// Parse a directive `data_type`. Only scalar targets are accepted.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_known(s.trim()).ok_or_else(|| RewriteError::UnknownType(s.to_string()))
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataType::Bool => write!(f, "boolean"),
            DataType::Int8 => write!(f, "byte"),
            DataType::Int16 => write!(f, "short"),
            DataType::Int32 => write!(f, "integer"),
            DataType::Int64 => write!(f, "long"),
            DataType::UInt8 => write!(f, "utinyint"),
            DataType::UInt16 => write!(f, "usmallint"),
            DataType::UInt32 => write!(f, "uinteger"),
            DataType::UInt64 => write!(f, "ubigint"),
            DataType::Float32 => write!(f, "float"),
            DataType::Float64 => write!(f, "double"),
            DataType::Decimal { precision, scale } => write!(f, "decimal({},{})", precision, scale),
            DataType::String => write!(f, "string"),
            DataType::Blob => write!(f, "binary"),
            DataType::Date => write!(f, "date"),
            DataType::Time => write!(f, "time"),
            DataType::Timestamp => write!(f, "timestamp"),
            DataType::TimestampTz => write!(f, "timestamp_tz"),
            DataType::Interval => write!(f, "interval"),
            DataType::Other(raw) => write!(f, "{}", raw),
        }
    }
}

fn parse_known(name: &str) -> Option<DataType> {
    let lower = name.to_ascii_lowercase();

    if let Some(decimal) = parse_decimal(&lower) {
        return Some(decimal);
    }

    let data_type = match lower.as_str() {
        "string" | "varchar" | "text" | "char" | "bpchar" => DataType::String,
        "boolean" | "bool" | "logical" => DataType::Bool,
        "byte" | "tinyint" | "int1" => DataType::Int8,
        "short" | "smallint" | "int2" => DataType::Int16,
        "int" | "integer" | "int4" | "signed" => DataType::Int32,
        "long" | "bigint" | "int8" => DataType::Int64,
        "utinyint" => DataType::UInt8,
        "usmallint" => DataType::UInt16,
        "uinteger" => DataType::UInt32,
        "ubigint" => DataType::UInt64,
        "float" | "real" | "float4" => DataType::Float32,
        "double" | "float8" | "double precision" => DataType::Float64,
        "binary" | "blob" | "bytea" | "varbinary" => DataType::Blob,
        "date" => DataType::Date,
        "time" => DataType::Time,
        "timestamp" | "timestamp_ntz" | "datetime" => DataType::Timestamp,
        "timestamptz" | "timestamp_ltz" | "timestamp_tz" | "timestamp with time zone" => {
            DataType::TimestampTz
        }
        "interval" => DataType::Interval,
        _ => return None,
    };
    Some(data_type)
}

fn parse_decimal(lower: &str) -> Option<DataType> {
    let rest = lower
        .strip_prefix("decimal")
        .or_else(|| lower.strip_prefix("numeric"))?
        .trim();

    if rest.is_empty() {
        return Some(DataType::Decimal { precision: 10, scale: 0 });
    }

    let inner = rest.strip_prefix('(')?.strip_suffix(')')?;
    let mut parts = inner.split(',').map(str::trim);
    let precision: u8 = parts.next()?.parse().ok()?;
    let scale: u8 = match parts.next() {
        Some(scale) => scale.parse().ok()?,
        None => 0,
    };
    if parts.next().is_some() || precision == 0 || precision > 38 || scale > precision {
        return None;
    }
    Some(DataType::Decimal { precision, scale })
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldType {
    pub name: String,
    pub data_type: DataType,
    pub nullable: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schema {
    pub fields: Vec<FieldType>,
}

impl Schema {
    pub fn new(fields: Vec<FieldType>) -> Self {
        Self { fields }
    }

    pub fn find_field(&self, name: &str) -> Option<&FieldType> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Tree dump printed for operators before and after the rewrite.
    pub fn render_tree(&self) -> String {
        let mut out = String::from("root\n");
        for field in &self.fields {
            out.push_str(&format!(
                " |-- {}: {} (nullable = {})\n",
                field.name, field.data_type, field.nullable
            ));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_spark_names() {
        assert_eq!("float".parse::<DataType>().unwrap(), DataType::Float32);
        assert_eq!("double".parse::<DataType>().unwrap(), DataType::Float64);
        assert_eq!("long".parse::<DataType>().unwrap(), DataType::Int64);
        assert_eq!("string".parse::<DataType>().unwrap(), DataType::String);
        assert_eq!("timestamp".parse::<DataType>().unwrap(), DataType::Timestamp);
        assert_eq!(" Boolean ".parse::<DataType>().unwrap(), DataType::Bool);
    }

    #[test]
    fn test_parse_decimal() {
        assert_eq!(
            "decimal".parse::<DataType>().unwrap(),
            DataType::Decimal { precision: 10, scale: 0 }
        );
        assert_eq!(
            "DECIMAL(18, 3)".parse::<DataType>().unwrap(),
            DataType::Decimal { precision: 18, scale: 3 }
        );
        assert!("decimal(2,5)".parse::<DataType>().is_err());
        assert!("decimal(40,2)".parse::<DataType>().is_err());
    }

    #[test]
    fn test_unknown_directive_type() {
        let err = "struct<a:int>".parse::<DataType>().unwrap_err();
        assert!(matches!(err, RewriteError::UnknownType(ref t) if t == "struct<a:int>"));
    }

    #[test]
    fn test_from_engine_keeps_unknown() {
        assert_eq!(DataType::from_engine("VARCHAR"), DataType::String);
        assert_eq!(DataType::from_engine("TIMESTAMP WITH TIME ZONE"), DataType::TimestampTz);
        assert_eq!(
            DataType::from_engine("STRUCT(a VARCHAR)"),
            DataType::Other("STRUCT(a VARCHAR)".to_string())
        );
        assert_eq!(DataType::from_engine("VARCHAR[]").sql_name(), "VARCHAR[]");
    }

    #[test]
    fn test_display_keeps_nested_field_names() {
        let nested = DataType::from_engine("STRUCT(\"ProductName\" VARCHAR)");
        assert_eq!(nested.to_string(), "STRUCT(\"ProductName\" VARCHAR)");
    }

    #[test]
    fn test_render_tree() {
        let schema = Schema::new(vec![
            FieldType { name: "ProductID".into(), data_type: DataType::String, nullable: true },
            FieldType { name: "Weight_Kg".into(), data_type: DataType::Float32, nullable: true },
        ]);
        assert_eq!(
            schema.render_tree(),
            concat!(
                "root\n",
                " |-- ProductID: string (nullable = true)\n",
                " |-- Weight_Kg: float (nullable = true)\n",
            )
        );
    }
}
