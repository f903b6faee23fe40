use crate::error::{Result, YarnCsvError};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub discovery: DiscoveryConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DiscoveryConfig {
    pub extension: String,
    pub search_directory: PathBuf,
    pub exclude_patterns: Vec<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct OutputConfig {
    pub extension: String,
    pub tag_separator: String,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            extension: "yarn".to_string(),
            search_directory: PathBuf::from("."),
            exclude_patterns: Vec::new(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            extension: "csv".to_string(),
            tag_separator: "; ".to_string(),
        }
    }
}

impl Config {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(YarnCsvError::Config {
                message: format!("Configuration file not found: {}", path.display()),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| YarnCsvError::Config {
            message: format!("Failed to read config file {}: {}", path.display(), e),
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| YarnCsvError::Config {
            message: format!("Failed to parse config file {}: {}", path.display(), e),
        })?;

        Ok(config)
    }

    pub fn load_with_defaults<P: AsRef<Path>>(config_path: Option<P>) -> Result<Self> {
        match config_path {
            Some(path) => Self::load_from_file(path),
            None => {
                let default_paths = ["yarncsv.toml", ".yarncsv.toml"];

                for default_path in &default_paths {
                    if Path::new(default_path).exists() {
                        return Self::load_from_file(default_path);
                    }
                }

                Ok(Self::default())
            }
        }
    }

    pub fn merge_with_cli_args(&mut self, cli_args: &CliOverrides) {
        if let Some(ref extension) = cli_args.extension {
            self.discovery.extension = extension.trim().to_lowercase();
        }

        if let Some(ref directory) = cli_args.search_directory {
            self.discovery.search_directory = directory.clone();
        }

        if let Some(ref separator) = cli_args.tag_separator {
            self.output.tag_separator = separator.clone();
        }
    }

    pub fn validate(&self) -> Result<()> {
        let extension = self.discovery.extension.trim();
        if extension.is_empty() {
            return Err(YarnCsvError::Config {
                message: "A script file extension must be specified".to_string(),
            });
        }

        if extension.starts_with('.') {
            return Err(YarnCsvError::Config {
                message: format!(
                    "Script extension should not start with a dot: {}",
                    extension
                ),
            });
        }

        if self.output.extension.trim().is_empty() {
            return Err(YarnCsvError::Config {
                message: "An output file extension must be specified".to_string(),
            });
        }

        for pattern in &self.discovery.exclude_patterns {
            Regex::new(pattern).map_err(|e| YarnCsvError::Config {
                message: format!("Invalid exclude pattern '{}': {}", pattern, e),
            })?;
        }

        Ok(())
    }

    pub fn create_sample_config() -> String {
        let sample_config = Self::default();
        toml::to_string_pretty(&sample_config).unwrap_or_else(|_| String::new())
    }
}

#[derive(Debug, Default)]
pub struct CliOverrides {
    pub extension: Option<String>,
    pub search_directory: Option<PathBuf>,
    pub tag_separator: Option<String>,
}

impl CliOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_extension(mut self, extension: Option<String>) -> Self {
        self.extension = extension;
        self
    }

    pub fn with_search_directory(mut self, directory: Option<PathBuf>) -> Self {
        self.search_directory = directory;
        self
    }

    pub fn with_tag_separator(mut self, separator: Option<String>) -> Self {
        self.tag_separator = separator;
        self
    }
}
