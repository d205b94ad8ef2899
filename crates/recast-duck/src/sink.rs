//! Output formats for the transformed table

use std::fmt;
use std::str::FromStr;

use crate::EngineError;

/// Name of the single data file written inside the output directory.
pub const PART_FILE_STEM: &str = "part-00000";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Parquet,
    Csv,
    Json,
}

impl OutputFormat {
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Parquet => "parquet",
            OutputFormat::Csv => "csv",
            OutputFormat::Json => "json",
        }
    }

    /// Options clause for `COPY ... TO`.
    pub(crate) fn copy_options(self) -> &'static str {
        match self {
            OutputFormat::Parquet => "FORMAT parquet",
            OutputFormat::Csv => "FORMAT csv, HEADER true",
            OutputFormat::Json => "FORMAT json",
        }
    }

    pub fn part_file_name(self) -> String {
        format!("{}.{}", PART_FILE_STEM, self.extension())
    }
}

impl FromStr for OutputFormat {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "parquet" => Ok(OutputFormat::Parquet),
            "csv" => Ok(OutputFormat::Csv),
            "json" | "ndjson" => Ok(OutputFormat::Json),
            _ => Err(EngineError::UnsupportedFormat(s.to_string())),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.extension())
    }
}
