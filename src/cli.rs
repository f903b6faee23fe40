use crate::config::{CliOverrides, Config};
use crate::error::Result;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "yarncsv")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Parse Yarn Spinner dialogue scripts into CSV")]
#[command(
    long_about = "yarncsv reads a .yarn dialogue script and exports every dialogue line and \
                  choice as a CSV row (line_id, node_title, character_name, text, tags). \
                  Lines without a #line: tag receive a generated auto_id_N identifier."
)]
#[command(after_help = "EXAMPLES:\n  \
    yarncsv my_dialogue.yarn my_dialogue.csv\n  \
    yarncsv                      (searches the current directory for a .yarn file)\n  \
    yarncsv --directory scripts --tag-separator ','\n  \
    yarncsv intro.yarn --output-format json")]
pub struct Cli {
    /// Path to the input .yarn file (searched for when omitted)
    pub input_file: Option<PathBuf>,

    /// Path for the output .csv file (named after the input when omitted)
    pub output_file: Option<PathBuf>,

    /// Configuration file path
    #[arg(short, long, help = "Path to TOML configuration file")]
    pub config: Option<PathBuf>,

    /// Script extension used when searching for an input file
    #[arg(long, help = "File extension to search for (default: yarn)")]
    pub extension: Option<String>,

    /// Directory searched when no input file is given
    #[arg(short, long, help = "Directory to search for a script (default: .)")]
    pub directory: Option<PathBuf>,

    /// Separator placed between tags in the tags column
    #[arg(long, help = "Separator used to join tags (default: \"; \")")]
    pub tag_separator: Option<String>,

    /// Output format for console messages
    #[arg(long, value_enum, default_value_t = OutputFormat::Human)]
    pub output_format: OutputFormat,

    /// Verbose output level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (suppress non-essential output)
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Dry run (parse and report without writing the CSV)
    #[arg(long, help = "Parse the script and report what would be written")]
    pub dry_run: bool,

    /// Generate sample configuration file
    #[arg(long, help = "Generate a sample configuration file")]
    pub generate_config: bool,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable colored output
    Human,
    /// JSON formatted output
    Json,
    /// Plain text output
    Plain,
}

impl Cli {
    pub fn load_config(&self) -> Result<Config> {
        let mut config = Config::load_with_defaults(self.config.as_ref())?;

        let overrides = self.create_cli_overrides();
        config.merge_with_cli_args(&overrides);
        config.validate()?;

        Ok(config)
    }

    pub fn create_cli_overrides(&self) -> CliOverrides {
        CliOverrides::new()
            .with_extension(self.extension.clone())
            .with_search_directory(self.directory.clone())
            .with_tag_separator(self.tag_separator.clone())
    }

    pub fn verbosity_level(&self) -> u8 {
        if self.quiet {
            0
        } else {
            self.verbose
        }
    }

    /// Filter directive for diagnostic tracing, derived from `-v` count.
    pub fn tracing_directive(&self) -> &'static str {
        match self.verbosity_level() {
            0 | 1 => "yarncsv=warn",
            2 => "yarncsv=debug",
            _ => "yarncsv=trace",
        }
    }
}
