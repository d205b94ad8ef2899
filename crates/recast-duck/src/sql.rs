//! SQL rendering for the rewrite projection

use recast_ir::{PlannedColumn, RewritePlan};
use std::fmt;
use std::str::FromStr;

use crate::EngineError;

/// How a failed cast is reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CastMode {
    /// `TRY_CAST`: a value that cannot be converted becomes NULL
    #[default]
    Lenient,
    /// `CAST`: the first unconvertible value aborts the run
    Strict,
}

impl CastMode {
    fn function(self) -> &'static str {
        match self {
            CastMode::Lenient => "TRY_CAST",
            CastMode::Strict => "CAST",
        }
    }
}

impl FromStr for CastMode {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "lenient" => Ok(CastMode::Lenient),
            "strict" => Ok(CastMode::Strict),
            other => Err(EngineError::UnknownCastMode(other.to_string())),
        }
    }
}

impl fmt::Display for CastMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CastMode::Lenient => write!(f, "lenient"),
            CastMode::Strict => write!(f, "strict"),
        }
    }
}

pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

pub fn quote_literal(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

/// Render the select list for `plan`.
///
/// The null token is replaced before casting on textual source columns, so a
/// numeric cast never sees it, and again after casting when a non-textual
/// column is cast to text.
pub fn projection_list(plan: &RewritePlan, null_value: &str, cast_mode: CastMode) -> String {
    plan.columns
        .iter()
        .map(|column| column_expr(column, null_value, cast_mode))
        .collect::<Vec<_>>()
        .join(", ")
}

fn column_expr(column: &PlannedColumn, null_value: &str, cast_mode: CastMode) -> String {
    let token = quote_literal(null_value);
    let mut expr = quote_ident(&column.source_name);

    if column.source_type.is_textual() {
        expr = format!("NULLIF({}, {})", expr, token);
    }

    if column.is_retyped() {
        expr = format!(
            "{}({} AS {})",
            cast_mode.function(),
            expr,
            column.output_type.sql_name()
        );

        if column.output_type.is_textual() && !column.source_type.is_textual() {
            expr = format!("NULLIF({}, {})", expr, token);
        }
    }

    format!("{} AS {}", expr, quote_ident(&column.output_name))
}
