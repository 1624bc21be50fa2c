//! Command-line interface definitions for cisbench

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Output format for the convert command
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Excel workbook with a status dropdown and a filterable table
    Excel,
    /// Pipe-delimited CSV
    Csv,
    /// JSON document
    Json,
}

impl OutputFormat {
    /// File extension without the leading dot
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Excel => "xlsx",
            OutputFormat::Csv => "csv",
            OutputFormat::Json => "json",
        }
    }

    /// Format matching a file extension, case-insensitive
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "xlsx" => Some(OutputFormat::Excel),
            "csv" => Some(OutputFormat::Csv),
            "json" => Some(OutputFormat::Json),
            _ => None,
        }
    }

    /// Human-readable name for progress output
    pub fn display_name(self) -> &'static str {
        match self {
            OutputFormat::Excel => "Excel",
            OutputFormat::Csv => "CSV",
            OutputFormat::Json => "JSON",
        }
    }
}

/// CLI structure for the cisbench application
#[derive(Parser)]
#[command(name = "cisbench")]
#[command(version)]
#[command(about = "Convert CIS Benchmark PDFs into recommendation spreadsheets", long_about = None)]
pub struct Cli {
    /// The subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands for cisbench
#[derive(Subcommand)]
pub enum Commands {
    /// Convert a benchmark into an Excel, CSV or JSON file
    Convert {
        /// Benchmark PDF (or .txt with form-feed page breaks)
        #[arg(short, long, value_name = "FILE")]
        input: PathBuf,

        /// Output file (defaults to <input stem>.<ext> in the current directory)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Output format; inferred from the output extension when omitted
        #[arg(short, long, value_enum)]
        format: Option<OutputFormat>,

        /// First page (1-based) of the recommendations search
        #[arg(long, value_name = "N")]
        start_page: Option<usize>,

        /// Configuration file (defaults to ./cisbench.toml when present)
        #[arg(short, long, value_name = "FILE")]
        config: Option<PathBuf>,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Print the recommendations found in a benchmark without writing anything
    Inspect {
        /// Benchmark PDF (or .txt with form-feed page breaks)
        #[arg(short, long, value_name = "FILE")]
        input: PathBuf,

        /// First page (1-based) of the recommendations search
        #[arg(long, value_name = "N")]
        start_page: Option<usize>,

        /// Configuration file (defaults to ./cisbench.toml when present)
        #[arg(short, long, value_name = "FILE")]
        config: Option<PathBuf>,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Write a default cisbench.toml
    InitConfig {
        /// Where to write the file (defaults to ./cisbench.toml)
        path: Option<PathBuf>,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}
