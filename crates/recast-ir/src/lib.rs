//! Recast rewrite model
//!
//! Engine-independent description of a column rewrite: the data types a
//! column can be cast to, the directives read from configuration, and the
//! resolved plan mapping every input column to its output name and type.

use thiserror::Error;

mod directive;
mod plan;
mod types;

pub use directive::{parse_directives, Directive};
pub use plan::{ColumnDescriptor, PlannedColumn, RewritePlan};
pub use types::*;

#[derive(Debug, Error)]
pub enum RewriteError {
    #[error("Invalid directive JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("Malformed directive at index {index}: {reason}")]
    MalformedDirective { index: usize, reason: String },

    #[error("Unknown data type: {0}")]
    UnknownType(String),

    #[error("Field not found: {0}")]
    FieldNotFound(String),

    #[error("Duplicate column name: {0}")]
    DuplicateColumn(String),
}
