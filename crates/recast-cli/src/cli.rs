//! Command-line arguments
//!
//! Flag names keep the snake_case spelling existing job definitions use.

use clap::{Parser, ValueEnum};
use recast_duck::{CastMode, DEFAULT_NULL_VALUE};
use std::path::PathBuf;

/// Rename and re-type the columns of a JSON dataset and write it in a columnar format
#[derive(Parser, Debug)]
#[command(name = "recast", version, about, long_about = None)]
pub struct Cli {
    /// Newline-delimited or multi-line JSON input
    #[arg(long = "input_path", value_name = "PATH")]
    pub input_path: PathBuf,

    /// JSON object of reader options, e.g. '{"multiline": "true"}'
    #[arg(long = "input_options", value_name = "JSON", default_value = "{}")]
    pub input_options: String,

    /// JSON list of {field_name, data_type, new_field_name} directives
    #[arg(long = "fields_metadata", value_name = "JSON", default_value = "{}")]
    pub fields_metadata: String,

    /// Output format: parquet, csv or json
    #[arg(long = "output_format", value_name = "FORMAT", default_value = "parquet")]
    pub output_format: String,

    /// Literal value replaced with NULL after the rewrite
    #[arg(
        long = "null_value",
        value_name = "TOKEN",
        default_value = DEFAULT_NULL_VALUE,
        allow_hyphen_values = true
    )]
    pub null_value: String,

    /// Destination directory; existing contents are replaced
    #[arg(long = "output_path", value_name = "PATH")]
    pub output_path: PathBuf,

    /// What a failed cast does
    #[arg(long = "cast_mode", value_enum, default_value_t = CastModeArg::Lenient)]
    pub cast_mode: CastModeArg,

    /// Rows shown in each preview [default: from config, 50]
    #[arg(long = "preview_rows", value_name = "N")]
    pub preview_rows: Option<usize>,

    /// Path to configuration file
    #[arg(long, env = "RECAST_CONFIG")]
    pub config: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CastModeArg {
    /// Unconvertible values become NULL
    Lenient,
    /// Unconvertible values abort the run
    Strict,
}

impl From<CastModeArg> for CastMode {
    fn from(arg: CastModeArg) -> Self {
        match arg {
            CastModeArg::Lenient => CastMode::Lenient,
            CastModeArg::Strict => CastMode::Strict,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from([
            "recast",
            "--input_path",
            "Data/2019ProductList.json",
            "--output_path",
            "Result/2019ProductList",
        ])
        .unwrap();

        assert_eq!(cli.input_options, "{}");
        assert_eq!(cli.fields_metadata, "{}");
        assert_eq!(cli.output_format, "parquet");
        assert_eq!(cli.null_value, "\\N");
        assert_eq!(cli.cast_mode, CastModeArg::Lenient);
        assert_eq!(cli.preview_rows, None);
    }

    #[test]
    fn test_required_arguments() {
        let err = Cli::try_parse_from(["recast", "--input_path", "in.json"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::MissingRequiredArgument);
    }

    #[test]
    fn test_all_arguments() {
        let cli = Cli::try_parse_from([
            "recast",
            "--fields_metadata",
            r#"[{"field_name": "Weight", "data_type": "float"}]"#,
            "--input_options",
            r#"{"multiline": "true"}"#,
            "--input_path",
            "Data/2020ProductList.json",
            "--output_path",
            "Results/2020ProductList",
            "--null_value",
            "-",
            "--output_format",
            "csv",
            "--cast_mode",
            "strict",
            "--preview_rows",
            "5",
        ])
        .unwrap();

        assert_eq!(cli.null_value, "-");
        assert_eq!(cli.output_format, "csv");
        assert_eq!(CastMode::from(cli.cast_mode), CastMode::Strict);
        assert_eq!(cli.preview_rows, Some(5));
    }
}
