//! Rewrite plan: resolved output name and type for every input column.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::HashSet;

use crate::{DataType, Directive, FieldType, RewriteError, Schema};

/// A column of the input table as reported by the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDescriptor {
    pub position: usize,
    pub name: String,
    pub data_type: DataType,
}

impl ColumnDescriptor {
    pub fn new(position: usize, name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            position,
            name: name.into(),
            data_type,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlannedColumn {
    pub position: usize,
    pub source_name: String,
    pub source_type: DataType,
    pub output_name: String,
    pub output_type: DataType,
}

impl PlannedColumn {
    pub fn is_renamed(&self) -> bool {
        self.source_name != self.output_name
    }

    pub fn is_retyped(&self) -> bool {
        self.source_type != self.output_type
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewritePlan {
    pub columns: Vec<PlannedColumn>,
}

impl RewritePlan {
    /// Resolve `directives` against `columns`.
    ///
    /// Directives apply in list order and look columns up by their current
    /// name, so a directive sees renames made by the ones before it. Output
    /// order and count always equal the input's.
    ///
    /// Column names are compared case-insensitively when checking for
    /// duplicates, matching how the engine resolves identifiers.
    pub fn build(
        columns: &[ColumnDescriptor],
        directives: &[Directive],
    ) -> Result<Self, RewriteError> {
        let mut seen = HashSet::with_capacity(columns.len());
        for column in columns {
            if !seen.insert(column.name.to_lowercase()) {
                return Err(RewriteError::DuplicateColumn(column.name.clone()));
            }
        }

        let mut planned: Vec<PlannedColumn> = columns
            .iter()
            .map(|c| PlannedColumn {
                position: c.position,
                source_name: c.name.clone(),
                source_type: c.data_type.clone(),
                output_name: c.name.clone(),
                output_type: c.data_type.clone(),
            })
            .collect();

        for directive in directives {
            let index = planned
                .iter()
                .position(|c| c.output_name == directive.field_name)
                .ok_or_else(|| RewriteError::FieldNotFound(directive.field_name.clone()))?;

            if let Some(new_name) = &directive.new_name {
                let collides = planned
                    .iter()
                    .enumerate()
                    .any(|(i, c)| i != index && same_identifier(&c.output_name, new_name));
                if collides {
                    return Err(RewriteError::DuplicateColumn(new_name.clone()));
                }
                planned[index].output_name = new_name.clone();
            }

            if let Some(new_type) = &directive.new_type {
                planned[index].output_type = new_type.clone();
            }
        }

        Ok(Self { columns: planned })
    }

    pub fn source_schema(&self) -> Schema {
        Schema::new(
            self.columns
                .iter()
                .map(|c| FieldType {
                    name: c.source_name.clone(),
                    data_type: c.source_type.clone(),
                    nullable: true,
                })
                .collect(),
        )
    }

    pub fn output_schema(&self) -> Schema {
        Schema::new(
            self.columns
                .iter()
                .map(|c| FieldType {
                    name: c.output_name.clone(),
                    data_type: c.output_type.clone(),
                    nullable: true,
                })
                .collect(),
        )
    }

    /// True when no column changes name or type.
    pub fn is_identity(&self) -> bool {
        self.columns.iter().all(|c| !c.is_renamed() && !c.is_retyped())
    }

    /// Calculate fingerprint (SHA-256) of the plan for run provenance
    pub fn fingerprint(&self) -> String {
        let json = serde_json::to_string(self).expect("plan should always serialize");
        let mut hasher = Sha256::new();
        hasher.update(json.as_bytes());
        format!("{:x}", hasher.finalize())
    }
}

fn same_identifier(a: &str, b: &str) -> bool {
    a.to_lowercase() == b.to_lowercase()
}
