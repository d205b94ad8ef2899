//! One rewrite run: read, transform, report, write.

use anyhow::Context;
use recast_duck::{
    transform, EngineSettings, OutputFormat, ReaderOptions, Session, TransformOptions,
};
use recast_ir::{parse_directives, Directive};
use std::io::Write;
use std::path::PathBuf;

use crate::cli::Cli;
use crate::config::Config;

/// Everything a run needs, validated before any I/O happens.
#[derive(Debug)]
pub struct Job {
    pub input_path: PathBuf,
    pub reader_options: ReaderOptions,
    pub directives: Vec<Directive>,
    pub transform: TransformOptions,
    pub output_format: OutputFormat,
    pub output_path: PathBuf,
    pub preview_rows: usize,
    pub engine: EngineSettings,
}

impl Job {
    pub fn from_cli(cli: &Cli, config: &Config) -> anyhow::Result<Self> {
        let directives =
            parse_directives(&cli.fields_metadata).context("Invalid --fields_metadata")?;
        let reader_options =
            ReaderOptions::from_json(&cli.input_options).context("Invalid --input_options")?;
        let output_format: OutputFormat = cli
            .output_format
            .parse()
            .context("Invalid --output_format")?;

        Ok(Self {
            input_path: cli.input_path.clone(),
            reader_options,
            directives,
            transform: TransformOptions {
                null_value: cli.null_value.clone(),
                cast_mode: cli.cast_mode.into(),
            },
            output_format,
            output_path: cli.output_path.clone(),
            preview_rows: cli.preview_rows.unwrap_or(config.preview.rows),
            engine: config.engine.settings(),
        })
    }

    /// Run the job, printing schemas and previews to `out`.
    pub fn execute<W: Write>(&self, out: &mut W) -> anyhow::Result<()> {
        let session =
            Session::open_in_memory(&self.engine).context("Failed to open DuckDB session")?;

        let input = session
            .read_json(&self.input_path, &self.reader_options)
            .with_context(|| format!("Failed to read {}", self.input_path.display()))?;

        let output = transform(&session, &input, &self.directives, &self.transform)
            .context("Failed to rewrite columns")?;

        write!(out, "{}", input.schema().render_tree())?;
        write!(out, "{}", output.schema().render_tree())?;
        writeln!(out, "{}", session.preview(&input, self.preview_rows)?)?;
        writeln!(out, "{}", session.preview(&output, self.preview_rows)?)?;
        out.flush()?;

        session
            .write(&output, &self.output_path, self.output_format)
            .with_context(|| format!("Failed to write {}", self.output_path.display()))?;

        tracing::info!(
            rows = session.row_count(&output)?,
            output = %self.output_path.display(),
            "Run complete"
        );
        Ok(())
    }
}
