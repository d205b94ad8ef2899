//! DuckDB session for JSON column rewrites
//!
//! The session is the explicit engine context: it reads JSON into a
//! temporary table, applies a [`RewritePlan`] as one projection, renders
//! previews and writes the result out.

use duckdb::arrow::record_batch::RecordBatch;
use duckdb::arrow::util::pretty::pretty_format_batches;
use duckdb::{Connection, Result as DuckResult};
use recast_ir::{
    ColumnDescriptor, DataType, Directive, FieldType, RewriteError, RewritePlan, Schema,
};
use std::cell::Cell;
use std::path::Path;
use thiserror::Error;

mod reader;
mod sink;
mod sql;

pub use reader::ReaderOptions;
pub use sink::{OutputFormat, PART_FILE_STEM};
pub use sql::{projection_list, quote_ident, quote_literal, CastMode};

/// Token treated as missing when no other is configured.
pub const DEFAULT_NULL_VALUE: &str = "\\N";

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Database error: {0}")]
    Database(#[from] duckdb::Error),

    #[error(transparent)]
    Rewrite(#[from] RewriteError),

    #[error("Arrow error: {0}")]
    Arrow(#[from] duckdb::arrow::error::ArrowError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Table not found: {0}")]
    TableNotFound(String),

    #[error("Invalid reader options JSON: {0}")]
    ReaderOptionsJson(#[from] serde_json::Error),

    #[error("Invalid reader option `{key}`: {reason}")]
    InvalidReaderOption { key: String, reason: String },

    #[error("Unsupported output format: {0}")]
    UnsupportedFormat(String),

    #[error("Unknown cast mode: {0}")]
    UnknownCastMode(String),

    #[error("Invalid engine setting: {0}")]
    InvalidSetting(String),
}

/// Resource settings applied when the session opens.
#[derive(Debug, Clone, Default)]
pub struct EngineSettings {
    /// e.g. "2GB"
    pub memory_limit: Option<String>,
    pub threads: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransformOptions {
    pub null_value: String,
    pub cast_mode: CastMode,
}

impl Default for TransformOptions {
    fn default() -> Self {
        Self {
            null_value: DEFAULT_NULL_VALUE.to_string(),
            cast_mode: CastMode::default(),
        }
    }
}

/// Handle to a relation living in a [`Session`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    pub name: String,
    pub columns: Vec<ColumnDescriptor>,
}

impl Table {
    pub fn schema(&self) -> Schema {
        Schema::new(
            self.columns
                .iter()
                .map(|c| FieldType {
                    name: c.name.clone(),
                    data_type: c.data_type.clone(),
                    nullable: true,
                })
                .collect(),
        )
    }
}

pub struct Session {
    conn: Connection,
    next_table: Cell<usize>,
}

impl Session {
    pub fn open_in_memory(settings: &EngineSettings) -> Result<Self, EngineError> {
        let session = Self::from_connection(Connection::open_in_memory()?);
        session.apply_settings(settings)?;
        Ok(session)
    }

    pub fn from_connection(conn: Connection) -> Self {
        Self {
            conn,
            next_table: Cell::new(0),
        }
    }

    fn apply_settings(&self, settings: &EngineSettings) -> Result<(), EngineError> {
        if let Some(memory_limit) = &settings.memory_limit {
            self.conn
                .execute_batch(&format!("PRAGMA memory_limit={}", quote_literal(memory_limit)))?;
        }

        if let Some(threads) = settings.threads {
            if threads == 0 {
                return Err(EngineError::InvalidSetting("threads must be at least 1".to_string()));
            }
            self.conn.execute_batch(&format!("PRAGMA threads={}", threads))?;
        }

        tracing::debug!(
            memory_limit = ?settings.memory_limit,
            threads = ?settings.threads,
            "Engine settings applied"
        );
        Ok(())
    }

    fn fresh_table_name(&self, prefix: &str) -> String {
        let n = self.next_table.get();
        self.next_table.set(n + 1);
        format!("{}_{}", prefix, n)
    }

    /// Resolve an existing table or view and read its columns.
    pub fn table(&self, name: &str) -> Result<Table, EngineError> {
        let mut stmt = self.conn.prepare(
            "SELECT column_name, data_type \
             FROM duckdb_columns() \
             WHERE table_name = ? \
             ORDER BY column_index",
        )?;

        let columns: Vec<(String, String)> = stmt
            .query_map([name], |row| Ok((row.get(0)?, row.get(1)?)))?
            .collect::<DuckResult<Vec<_>>>()?;

        if columns.is_empty() {
            return Err(EngineError::TableNotFound(name.to_string()));
        }

        let columns = columns
            .into_iter()
            .enumerate()
            .map(|(position, (column_name, data_type))| {
                ColumnDescriptor::new(position, column_name, DataType::from_engine(&data_type))
            })
            .collect();

        Ok(Table {
            name: name.to_string(),
            columns,
        })
    }

    /// Load newline-delimited or multi-line JSON into a temporary table.
    pub fn read_json<P: AsRef<Path>>(
        &self,
        path: P,
        options: &ReaderOptions,
    ) -> Result<Table, EngineError> {
        let path = path.as_ref().to_string_lossy().to_string();
        let name = self.fresh_table_name("recast_input");

        let query = format!(
            "CREATE TEMP TABLE {} AS SELECT * FROM read_json({}{})",
            quote_ident(&name),
            quote_literal(&path),
            options.named_parameters()?
        );
        tracing::debug!(sql = %query, "Reading JSON input");
        self.conn.execute_batch(&query)?;

        let table = self.table(&name)?;
        tracing::info!(path = %path, columns = table.columns.len(), "Input loaded");
        Ok(table)
    }

    /// Materialise `plan` over `table` as a new temporary table.
    pub fn apply_plan(
        &self,
        table: &Table,
        plan: &RewritePlan,
        options: &TransformOptions,
    ) -> Result<Table, EngineError> {
        let name = self.fresh_table_name("recast_output");
        let query = format!(
            "CREATE TEMP TABLE {} AS SELECT {} FROM {}",
            quote_ident(&name),
            projection_list(plan, &options.null_value, options.cast_mode),
            quote_ident(&table.name)
        );
        tracing::debug!(sql = %query, "Applying rewrite projection");
        self.conn.execute_batch(&query)?;

        self.table(&name)
    }

    pub fn row_count(&self, table: &Table) -> Result<usize, EngineError> {
        let count: i64 = self.conn.query_row(
            &format!("SELECT COUNT(*) FROM {}", quote_ident(&table.name)),
            [],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }

    /// First `limit` rows as an ASCII table. Values are never truncated.
    pub fn preview(&self, table: &Table, limit: usize) -> Result<String, EngineError> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT * FROM {} LIMIT {}",
            quote_ident(&table.name),
            limit
        ))?;
        let batches: Vec<RecordBatch> = stmt.query_arrow([])?.collect();
        let rows: usize = batches.iter().map(|b| b.num_rows()).sum();

        if rows == 0 {
            let header: Vec<&str> = table.columns.iter().map(|c| c.name.as_str()).collect();
            return Ok(format!("{}\n(0 rows)", header.join(" | ")));
        }

        let rendered = pretty_format_batches(&batches)?.to_string();
        if self.row_count(table)? > rows {
            let noun = if rows == 1 { "row" } else { "rows" };
            return Ok(format!("{}\nonly showing top {} {}", rendered, rows, noun));
        }
        Ok(rendered)
    }

    /// Write `table` under `path`, replacing whatever is there.
    ///
    /// `path` becomes a directory holding a single part file.
    pub fn write<P: AsRef<Path>>(
        &self,
        table: &Table,
        path: P,
        format: OutputFormat,
    ) -> Result<(), EngineError> {
        let dir = path.as_ref();
        if dir.is_dir() {
            std::fs::remove_dir_all(dir)?;
        } else if dir.exists() {
            std::fs::remove_file(dir)?;
        }
        std::fs::create_dir_all(dir)?;

        let target = dir.join(format.part_file_name());
        let query = format!(
            "COPY (SELECT * FROM {}) TO {} ({})",
            quote_ident(&table.name),
            quote_literal(&target.to_string_lossy()),
            format.copy_options()
        );
        tracing::debug!(sql = %query, "Writing output");
        self.conn.execute_batch(&query)?;

        tracing::info!(path = %dir.display(), format = %format, "Output written");
        Ok(())
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}

/// Rename, retype and null-substitute `table` according to `directives`.
///
/// Fails without touching the session if a directive names a column that
/// does not exist.
pub fn transform(
    session: &Session,
    table: &Table,
    directives: &[Directive],
    options: &TransformOptions,
) -> Result<Table, EngineError> {
    let plan = RewritePlan::build(&table.columns, directives)?;

    tracing::info!(
        fingerprint = %plan.fingerprint(),
        directives = directives.len(),
        renamed = plan.columns.iter().filter(|c| c.is_renamed()).count(),
        retyped = plan.columns.iter().filter(|c| c.is_retyped()).count(),
        cast_mode = %options.cast_mode,
        "Rewrite plan built"
    );

    session.apply_plan(table, &plan, options)
}
