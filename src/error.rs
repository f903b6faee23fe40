use thiserror::Error;

#[derive(Error, Debug)]
pub enum YarnCsvError {
    #[error("Input file not found: {path}")]
    InputNotFound { path: String },

    #[error("No .{extension} file found in {directory}")]
    NoCandidateFile { extension: String, directory: String },

    #[error("Error while searching for file in {directory}: {source}")]
    DiscoveryIo {
        directory: String,
        #[source]
        source: std::io::Error,
    },

    #[error("IO operation failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to write CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Path validation failed: {path}")]
    InvalidPath { path: String },
}

pub trait UserFriendlyError {
    fn user_message(&self) -> String;
    fn suggestion(&self) -> Option<String>;
}

impl UserFriendlyError for YarnCsvError {
    fn user_message(&self) -> String {
        match self {
            YarnCsvError::InputNotFound { path } => {
                format!("Input file not found at '{}'", path)
            }
            YarnCsvError::NoCandidateFile {
                extension,
                directory,
            } => {
                format!("No .{} file found in '{}'", extension, directory)
            }
            YarnCsvError::DiscoveryIo { directory, source } => {
                format!("Error while searching for file in '{}': {}", directory, source)
            }
            YarnCsvError::Config { message } => {
                format!("Configuration error: {}", message)
            }
            YarnCsvError::InvalidPath { path } => {
                format!("Invalid file path: {}", path)
            }
            _ => self.to_string(),
        }
    }

    fn suggestion(&self) -> Option<String> {
        match self {
            YarnCsvError::InputNotFound { .. } => Some(
                "Check the path, or omit it to search the current directory for a script.".to_string()
            ),
            YarnCsvError::NoCandidateFile { .. } => Some(
                "Pass the script path explicitly, or use --directory / --extension to search elsewhere.".to_string()
            ),
            YarnCsvError::DiscoveryIo { .. } => Some(
                "Ensure the search directory exists and is readable.".to_string()
            ),
            YarnCsvError::Config { .. } => Some(
                "Check your configuration file syntax, or regenerate one with --generate-config.".to_string()
            ),
            YarnCsvError::Csv(_) => Some(
                "Ensure the output location is writable and the file is not open in another program.".to_string()
            ),
            _ => None,
        }
    }
}

impl From<toml::de::Error> for YarnCsvError {
    fn from(error: toml::de::Error) -> Self {
        YarnCsvError::Config {
            message: error.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, YarnCsvError>;
