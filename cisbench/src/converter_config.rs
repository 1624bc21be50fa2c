//! Converter configuration from cisbench.toml

use crate::segmentation::{default_end_markers, SegmentationOptions, DEFAULT_APPLICABILITY_LOOKAHEAD};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Default configuration file name, looked up in the working directory
pub const CONFIG_FILE_NAME: &str = "cisbench.toml";

/// Converter configuration from cisbench.toml
///
/// Every field is optional in the file; missing fields take the defaults
/// that suit published CIS Benchmark PDFs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConverterConfig {
    /// First page (1-based) considered when looking for the recommendations
    /// region; earlier pages hold the cover and table of contents
    pub start_page: usize,

    /// Number of pages searched for the document title and version
    pub title_scan_pages: usize,

    /// Text that marks the page where recommendations begin
    pub start_marker: String,

    /// A page containing any of these is never the start page
    /// (table-of-contents dot leaders, the definitions chapter)
    pub start_rejection_markers: Vec<String>,

    /// Line prefixes that end the recommendations region
    pub end_markers: Vec<String>,

    /// Lines searched below a numbering line for `Profile Applicability:`
    pub applicability_lookahead: usize,
}

impl Default for ConverterConfig {
    fn default() -> Self {
        Self {
            start_page: 10,
            title_scan_pages: 1,
            start_marker: "Recommendations".to_string(),
            start_rejection_markers: vec![
                ".....".to_string(),
                "Recommendation Definitions".to_string(),
            ],
            end_markers: default_end_markers(),
            applicability_lookahead: DEFAULT_APPLICABILITY_LOOKAHEAD,
        }
    }
}

impl ConverterConfig {
    /// Load configuration from a cisbench.toml file
    ///
    /// # Parameters
    /// * `path` - Path to the configuration file
    ///
    /// # Returns
    /// * `Ok(ConverterConfig)` - Successfully loaded configuration
    /// * `Err(ConfigError)` - Error reading or parsing the configuration file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content =
            fs::read_to_string(path).map_err(|e| ConfigError::IoError(path.to_path_buf(), e))?;

        let config: ConverterConfig =
            toml::from_str(&content).map_err(|e| ConfigError::ParseError(path.to_path_buf(), e))?;

        Ok(config)
    }

    /// Load `path` if given, else `./cisbench.toml` if present, else defaults
    pub fn discover(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::load(path),
            None => {
                let local = Path::new(CONFIG_FILE_NAME);
                if local.is_file() {
                    log::info!("Using configuration from {}", local.display());
                    Self::load(local)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    /// Save configuration to a cisbench.toml file
    ///
    /// # Parameters
    /// * `path` - Path where the file will be written
    ///
    /// # Returns
    /// * `Ok(())` - Successfully saved configuration
    /// * `Err(ConfigError)` - Error serializing or writing the configuration file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let content = toml::to_string_pretty(self).map_err(ConfigError::SerializeError)?;

        let path = path.as_ref();
        fs::write(path, content).map_err(|e| ConfigError::IoError(path.to_path_buf(), e))?;

        Ok(())
    }

    /// Scanner tunables for the segmentation core
    pub fn segmentation_options(&self) -> SegmentationOptions {
        SegmentationOptions {
            applicability_lookahead: self.applicability_lookahead,
            end_markers: self.end_markers.clone(),
        }
    }
}

/// Errors that can occur when loading or saving the configuration
#[derive(Debug)]
#[allow(clippy::enum_variant_names)]
pub enum ConfigError {
    /// The config file could not be read or written
    IoError(PathBuf, std::io::Error),

    /// The config file is not valid TOML for `ConverterConfig`
    ParseError(PathBuf, toml::de::Error),

    /// The configuration could not be rendered as TOML
    SerializeError(toml::ser::Error),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::IoError(path, e) => {
                write!(f, "Cannot access config file {}: {}", path.display(), e)
            }
            ConfigError::ParseError(path, e) => {
                write!(f, "Invalid config file {}: {}", path.display(), e)
            }
            ConfigError::SerializeError(e) => write!(f, "Cannot render configuration: {}", e),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::IoError(_, e) => Some(e),
            ConfigError::ParseError(_, e) => Some(e),
            ConfigError::SerializeError(e) => Some(e),
        }
    }
}
