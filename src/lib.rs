pub mod cli;
pub mod config;
pub mod error;
pub mod extractor;
pub mod scanner;
pub mod ui;

// Public API re-exports
pub use cli::{Cli, OutputFormat};
pub use config::{CliOverrides, Config, DiscoveryConfig, OutputConfig};
pub use error::{Result, UserFriendlyError, YarnCsvError};

// Core functionality re-exports
pub use extractor::{
    derive_output_path, script_lines, ConversionReport, DialogueRecord, ExtractionStats,
    FileExtractor, LineExtractor, OutputManager, ScriptExtraction, CSV_HEADER,
};
pub use scanner::{Discovery, ScriptFilter, ScriptScanner};
pub use ui::{OperationProgress, OutputFormatter, OutputMode, ProgressManager};

use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info};

/// Input path after resolution, remembering whether it came from discovery.
#[derive(Debug, Clone)]
pub struct ResolvedInput {
    pub path: PathBuf,
    pub discovered: bool,
}

/// Main library interface for converting Yarn scripts to CSV
pub struct YarnCsv {
    config: Config,
    output_formatter: OutputFormatter,
    progress_manager: ProgressManager,
}

impl YarnCsv {
    pub fn new(config: Config, output_mode: OutputMode, verbose: u8, quiet: bool) -> Self {
        let output_formatter = OutputFormatter::new(output_mode, verbose, quiet);
        let progress_manager = ProgressManager::new(!quiet && output_mode == OutputMode::Human);

        Self {
            config,
            output_formatter,
            progress_manager,
        }
    }

    /// Create a YarnCsv instance from CLI arguments
    pub fn from_cli(cli_args: &Cli) -> Result<Self> {
        let config = cli_args.load_config()?;
        let output_mode = match cli_args.output_format {
            OutputFormat::Human => OutputMode::Human,
            OutputFormat::Json => OutputMode::Json,
            OutputFormat::Plain => OutputMode::Plain,
        };

        Ok(Self::new(
            config,
            output_mode,
            cli_args.verbose,
            cli_args.quiet,
        ))
    }

    /// Uses the explicit path when given, otherwise searches the configured
    /// directory for a script.
    pub fn resolve_input(&self, input: Option<&Path>) -> Result<ResolvedInput> {
        if let Some(path) = input {
            if !path.exists() {
                return Err(YarnCsvError::InputNotFound {
                    path: path.display().to_string(),
                });
            }
            return Ok(ResolvedInput {
                path: path.to_path_buf(),
                discovered: false,
            });
        }

        let directory = &self.config.discovery.search_directory;
        self.output_formatter.start_operation(&format!(
            "No input file provided. Searching {} for a .{} file...",
            directory.display(),
            self.config.discovery.extension
        ));

        let scanner = ScriptScanner::new(&self.config.discovery);
        let discovery = scanner.discover(directory)?;

        if discovery.is_ambiguous() {
            let names: Vec<String> = discovery
                .candidates
                .iter()
                .map(|p| p.display().to_string())
                .collect();
            debug!(candidates = ?names, "multiple scripts found");
            self.output_formatter.warning(&format!(
                "Found {} candidate files ({}); using the first listed. Pass a path to choose explicitly.",
                names.len(),
                names.join(", ")
            ));
        }

        self.output_formatter.info(&format!(
            "Found '{}'. Using it as input.",
            discovery.selected.display()
        ));

        Ok(ResolvedInput {
            path: discovery.selected,
            discovered: true,
        })
    }

    pub fn resolve_output(&self, input: &Path, output: Option<&Path>) -> PathBuf {
        match output {
            Some(path) => path.to_path_buf(),
            None => derive_output_path(input, &self.config.output.extension),
        }
    }

    /// Resolve paths, extract every record, then write the CSV. The output
    /// file is only touched after the whole script has been read.
    pub fn convert(
        &self,
        input: Option<&Path>,
        output: Option<&Path>,
        dry_run: bool,
    ) -> Result<ConversionReport> {
        let start_time = Instant::now();

        let resolved = self.resolve_input(input)?;
        let output_path = self.resolve_output(&resolved.path, output);

        let output_manager = OutputManager::new(&output_path)
            .with_tag_separator(self.config.output.tag_separator.clone());
        output_manager.validate_against_input(&resolved.path)?;

        let extraction = self.extract_script(&resolved.path)?;
        self.output_formatter
            .debug(&extraction.stats.display_summary());

        if dry_run {
            self.output_formatter
                .info("DRY RUN MODE - no CSV file will be written");
        } else {
            self.write_output(&output_manager, &extraction)?;
        }

        let report = output_manager.create_conversion_report(
            &resolved.path,
            resolved.discovered,
            &extraction,
            dry_run,
            start_time.elapsed(),
        );

        info!(
            input = %report.input_path.display(),
            output = %report.output_path.display(),
            rows = report.records_written,
            dry_run,
            "conversion finished"
        );

        Ok(report)
    }

    fn extract_script(&self, path: &Path) -> Result<ScriptExtraction> {
        let progress = OperationProgress::new(&self.progress_manager, "Extracting dialogue lines");

        match FileExtractor::new().extract_file(path) {
            Ok(extraction) => {
                progress.finish_with_message(&format!(
                    "{} lines found",
                    extraction.records.len()
                ));
                Ok(extraction)
            }
            Err(e) => {
                progress.finish_error(&e.to_string());
                Err(e)
            }
        }
    }

    fn write_output(&self, output_manager: &OutputManager, extraction: &ScriptExtraction) -> Result<()> {
        let progress = OperationProgress::new(&self.progress_manager, "Writing CSV");

        match output_manager.write_records(&extraction.records) {
            Ok(rows) => {
                progress.finish_with_message(&format!("{} rows written", rows));
                Ok(())
            }
            Err(e) => {
                progress.finish_error(&e.to_string());
                Err(e)
            }
        }
    }

    /// Generate sample configuration file
    pub fn generate_sample_config<P: AsRef<Path>>(output_path: P) -> Result<()> {
        let sample_config = Config::create_sample_config();
        std::fs::write(output_path.as_ref(), sample_config)?;
        Ok(())
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn output_formatter(&self) -> &OutputFormatter {
        &self.output_formatter
    }

    /// Handle error with user-friendly output
    pub fn handle_error(&self, error: &YarnCsvError) {
        self.progress_manager.clear();
        self.output_formatter.print_user_friendly_error(error);
    }
}

/// Convert one script with default settings and no console output.
pub fn convert_file(input: &Path, output: Option<&Path>) -> Result<ConversionReport> {
    YarnCsv::new(Config::default(), OutputMode::Plain, 0, true).convert(Some(input), output, false)
}
