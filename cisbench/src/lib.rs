//! cisbench - CIS Benchmark converter
//!
//! Turns the text of a CIS Benchmark document into structured
//! recommendation records and exports them as Excel, CSV or JSON.
//!
//! The work happens in three stages:
//! 1. [`acquisition`] reads the page text of a PDF or text file
//! 2. [`segmentation`] rebuilds title, version and recommendation blocks
//! 3. [`export`] writes the records in the chosen format

#![deny(unsafe_code)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]

pub mod acquisition;
pub mod converter_config;
pub mod export;
pub mod output_path;
pub mod pipeline;
pub mod segmentation;

pub use converter_config::{ConfigError, ConverterConfig};
pub use pipeline::{convert_file, convert_pages, PipelineError};
pub use segmentation::{Benchmark, Recommendation};
