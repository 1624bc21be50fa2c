//! cisbench - CIS Benchmark converter
//!
//! A CLI tool that turns CIS Benchmark PDFs into Excel, CSV or JSON
//! recommendation lists.

#![deny(unsafe_code)]
#![allow(clippy::module_name_repetitions)]

mod cli;

use anyhow::{Context, Result};
use cisbench::converter_config::{ConverterConfig, CONFIG_FILE_NAME};
use cisbench::export::{csv_exporter, json_exporter, xlsx_exporter};
use cisbench::output_path::unique_output_path;
use cisbench::{pipeline, Benchmark};
use clap::Parser;
use cli::{Cli, Commands, OutputFormat};
use std::path::{Path, PathBuf};

/// Main entry point for the cisbench CLI application
fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {:?}", e);
        std::process::exit(1);
    }
}

/// Run the CLI application
fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Convert {
            input,
            output,
            format,
            start_page,
            config,
            verbose,
        } => {
            init_logging(verbose);
            handle_convert_command(input, output, format, start_page, config, verbose)?;
        }

        Commands::Inspect {
            input,
            start_page,
            config,
            verbose,
        } => {
            init_logging(verbose);
            handle_inspect_command(input, start_page, config)?;
        }

        Commands::InitConfig { path, force } => {
            init_logging(false);
            handle_init_config_command(path, force)?;
        }
    }

    Ok(())
}

/// Warnings by default, info with `--verbose`; `RUST_LOG` wins over both
fn init_logging(verbose: bool) {
    let default_filter = if verbose { "info" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();
}

/// Load the configuration and apply command-line overrides
fn load_config(config_path: Option<&Path>, start_page: Option<usize>) -> Result<ConverterConfig> {
    let mut config = ConverterConfig::discover(config_path).with_context(|| match config_path {
        Some(path) => format!("Failed to load configuration from {}", path.display()),
        None => format!("Failed to load {}", CONFIG_FILE_NAME),
    })?;
    if let Some(page) = start_page {
        config.start_page = page;
    }
    Ok(config)
}

/// Pick the output format and path
///
/// An explicit `--format` wins; otherwise the output extension decides,
/// and with neither the format is Excel. Without `--output` the file is
/// named after the input and placed in the current directory.
fn resolve_output(
    input: &Path,
    output: Option<PathBuf>,
    format_arg: Option<OutputFormat>,
) -> Result<(PathBuf, OutputFormat)> {
    let Some(mut output) = output else {
        let format = format_arg.unwrap_or(OutputFormat::Excel);
        let stem = input
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("benchmark");
        return Ok((unique_output_path(Path::new("."), stem, format.extension()), format));
    };

    let format = match format_arg {
        Some(fmt) => {
            if output.extension().is_none() {
                output.set_extension(fmt.extension());
            }
            fmt
        }
        None => match output.extension().and_then(|s| s.to_str()) {
            Some(ext) => OutputFormat::from_extension(ext).with_context(|| {
                format!(
                    "Unknown output format for extension '.{}'. Supported: .xlsx, .csv, .json\nUse --format to specify explicitly.",
                    ext
                )
            })?,
            None => {
                output.set_extension(OutputFormat::Excel.extension());
                OutputFormat::Excel
            }
        },
    };

    Ok((output, format))
}

/// Handle the convert command
fn handle_convert_command(
    input: PathBuf,
    output: Option<PathBuf>,
    format_arg: Option<OutputFormat>,
    start_page: Option<usize>,
    config_path: Option<PathBuf>,
    verbose: bool,
) -> Result<()> {
    let config = load_config(config_path.as_deref(), start_page)?;
    let (output, format) = resolve_output(&input, output, format_arg)?;

    println!("Converting benchmark...");
    println!("Input: {}", input.display());
    println!("Output: {}", output.display());

    // Stage 1: Read page text
    println!("\n[Stage 1/3] Extracting text...");
    let pages = cisbench::acquisition::extract_pages(&input)
        .with_context(|| format!("Failed to read {}", input.display()))?;
    if pages.is_empty() {
        anyhow::bail!("{} has no pages", input.display());
    }
    println!("✓ Extracted {} pages", pages.len());

    // Stage 2: Segment into recommendations
    println!("\n[Stage 2/3] Segmenting recommendations...");
    let benchmark = pipeline::convert_pages(&pages, &config);
    println!("✓ Found {} recommendations", benchmark.len());
    if verbose {
        println!("  - Title: {}", benchmark.metadata.display_title());
        println!("  - Version: {}", benchmark.metadata.display_version());
        println!("  - {} warnings", benchmark.warnings.len());
    }

    // Stage 3: Export
    println!("\n[Stage 3/3] Exporting to {}...", format.display_name());
    match format {
        OutputFormat::Excel => xlsx_exporter::to_xlsx(&benchmark, &output),
        OutputFormat::Csv => csv_exporter::to_csv(&benchmark, &output),
        OutputFormat::Json => json_exporter::to_json(&benchmark, &output),
    }
    .with_context(|| {
        format!(
            "Failed to export {} to {}",
            format.display_name(),
            output.display()
        )
    })?;
    println!("✓ Successfully wrote: {}", output.display());

    println!("\n✓ Conversion completed successfully!");

    Ok(())
}

/// Handle the inspect command
fn handle_inspect_command(
    input: PathBuf,
    start_page: Option<usize>,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let config = load_config(config_path.as_deref(), start_page)?;
    let benchmark = pipeline::convert_file(&input, &config)
        .with_context(|| format!("Failed to convert {}", input.display()))?;

    print_benchmark_summary(&benchmark);

    Ok(())
}

fn print_benchmark_summary(benchmark: &Benchmark) {
    println!("Title: {}", benchmark.metadata.display_title());
    println!("Version: {}", benchmark.metadata.display_version());
    println!("Recommendations: {}\n", benchmark.len());

    for rec in &benchmark.recommendations {
        println!(
            "  {:<10} {:<3} {} [{} sections]",
            rec.number.to_string(),
            rec.level.to_string(),
            rec.title,
            rec.sections.len()
        );
        for warning in benchmark.warnings_for(&rec.number) {
            println!("      ! {}", warning);
        }
    }

    // Skipped numbers have no record of their own to sit under
    let skipped = benchmark.warnings.iter().filter(|w| {
        w.number()
            .is_some_and(|n| !benchmark.recommendations.iter().any(|r| &r.number == n))
    });
    let unattached: Vec<_> = benchmark.document_warnings().chain(skipped).collect();
    if !unattached.is_empty() {
        println!("\nWarnings ({}):", unattached.len());
        for warning in unattached {
            println!("  - {}", warning);
        }
    }
}

/// Handle the init-config command
fn handle_init_config_command(path: Option<PathBuf>, force: bool) -> Result<()> {
    let target = path.unwrap_or_else(|| PathBuf::from(CONFIG_FILE_NAME));

    if target.exists() && !force {
        anyhow::bail!(
            "{} already exists. Use --force to overwrite it",
            target.display()
        );
    }
    if let Some(parent) = target.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }

    ConverterConfig::default()
        .save(&target)
        .with_context(|| format!("Failed to write {}", target.display()))?;

    println!("✓ Wrote default configuration to {}", target.display());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_output_infers_format_from_extension() {
        let (path, format) =
            resolve_output(Path::new("in.pdf"), Some(PathBuf::from("out.csv")), None).unwrap();
        assert_eq!(path, PathBuf::from("out.csv"));
        assert_eq!(format, OutputFormat::Csv);
    }

    #[test]
    fn test_resolve_output_adds_missing_extension() {
        let (path, format) = resolve_output(
            Path::new("in.pdf"),
            Some(PathBuf::from("report")),
            Some(OutputFormat::Json),
        )
        .unwrap();
        assert_eq!(path, PathBuf::from("report.json"));
        assert_eq!(format, OutputFormat::Json);

        let (path, format) =
            resolve_output(Path::new("in.pdf"), Some(PathBuf::from("report")), None).unwrap();
        assert_eq!(path, PathBuf::from("report.xlsx"));
        assert_eq!(format, OutputFormat::Excel);
    }

    #[test]
    fn test_resolve_output_rejects_unknown_extension() {
        let result = resolve_output(Path::new("in.pdf"), Some(PathBuf::from("out.docx")), None);
        assert!(result.is_err());
    }

    #[test]
    fn test_explicit_format_keeps_given_extension() {
        let (path, format) = resolve_output(
            Path::new("in.pdf"),
            Some(PathBuf::from("out.txt")),
            Some(OutputFormat::Csv),
        )
        .unwrap();
        assert_eq!(path, PathBuf::from("out.txt"));
        assert_eq!(format, OutputFormat::Csv);
    }
}
