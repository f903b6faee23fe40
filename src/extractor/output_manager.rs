use crate::error::{Result, YarnCsvError};
use crate::extractor::file_extractor::ScriptExtraction;
use crate::extractor::line_extractor::{DialogueRecord, ExtractionStats};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Column names of the exported sheet, in order.
pub const CSV_HEADER: [&str; 5] = ["line_id", "node_title", "character_name", "text", "tags"];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversionReport {
    pub input_path: PathBuf,
    pub output_path: PathBuf,
    pub input_discovered: bool,
    pub records_written: usize,
    pub bytes_read: u64,
    pub stats: ExtractionStats,
    pub dry_run: bool,
    pub duration: Duration,
    pub completed_at: DateTime<Utc>,
}

impl ConversionReport {
    pub fn success_message(&self) -> String {
        if self.dry_run {
            format!(
                "Would parse '{}' and write {} rows to '{}'",
                self.input_path.display(),
                self.records_written,
                self.output_path.display()
            )
        } else {
            format!(
                "Successfully parsed '{}' and created/updated '{}'",
                self.input_path.display(),
                self.output_path.display()
            )
        }
    }
}

/// Writes extracted records as CSV.
pub struct OutputManager {
    output_path: PathBuf,
    tag_separator: String,
}

impl OutputManager {
    pub fn new<P: Into<PathBuf>>(output_path: P) -> Self {
        Self {
            output_path: output_path.into(),
            tag_separator: "; ".to_string(),
        }
    }

    pub fn with_tag_separator<S: Into<String>>(mut self, separator: S) -> Self {
        self.tag_separator = separator.into();
        self
    }

    pub fn output_path(&self) -> &Path {
        &self.output_path
    }

    /// Refuses to overwrite the script it was generated from.
    pub fn validate_against_input(&self, input_path: &Path) -> Result<()> {
        let same_file = match (input_path.canonicalize(), self.output_path.canonicalize()) {
            (Ok(input), Ok(output)) => input == output,
            _ => input_path == self.output_path,
        };

        if same_file {
            return Err(YarnCsvError::InvalidPath {
                path: format!(
                    "output would overwrite the input script {}",
                    input_path.display()
                ),
            });
        }

        Ok(())
    }

    /// Creates (or truncates) the output file and writes the header plus one
    /// row per record. Returns the number of rows written.
    pub fn write_records(&self, records: &[DialogueRecord]) -> Result<usize> {
        let file = File::create(&self.output_path)?;
        let rows = self.write_records_to(file, records)?;
        Ok(rows)
    }

    pub fn write_records_to<W: Write>(&self, writer: W, records: &[DialogueRecord]) -> Result<usize> {
        let mut csv_writer = csv::WriterBuilder::new()
            .terminator(csv::Terminator::CRLF)
            .from_writer(writer);

        csv_writer.write_record(CSV_HEADER)?;

        for record in records {
            let tags = record.joined_tags(&self.tag_separator);
            csv_writer.write_record([
                record.line_id.as_str(),
                record.node_title.as_str(),
                record.character_name.as_str(),
                record.text.as_str(),
                tags.as_str(),
            ])?;
        }

        csv_writer.flush()?;
        Ok(records.len())
    }

    pub fn create_conversion_report(
        &self,
        input_path: &Path,
        input_discovered: bool,
        extraction: &ScriptExtraction,
        dry_run: bool,
        duration: Duration,
    ) -> ConversionReport {
        ConversionReport {
            input_path: input_path.to_path_buf(),
            output_path: self.output_path.clone(),
            input_discovered,
            records_written: extraction.records.len(),
            bytes_read: extraction.bytes_read,
            stats: extraction.stats.clone(),
            dry_run,
            duration,
            completed_at: Utc::now(),
        }
    }
}

/// Replaces the input's extension, keeping its directory and stem.
pub fn derive_output_path(input_path: &Path, extension: &str) -> PathBuf {
    input_path.with_extension(extension.trim_start_matches('.'))
}
