use crate::error::{Result, YarnCsvError};
use crate::extractor::line_extractor::{
    script_lines, DialogueRecord, ExtractionStats, LineExtractor,
};
use std::fs;
use std::path::Path;
use std::time::{Duration, Instant};
use tracing::debug;

/// Records pulled from one script, with the counters gathered along the way.
#[derive(Debug, Clone)]
pub struct ScriptExtraction {
    pub records: Vec<DialogueRecord>,
    pub stats: ExtractionStats,
    pub bytes_read: u64,
    pub elapsed: Duration,
}

/// Reads script files from disk and runs them through a [`LineExtractor`].
#[derive(Debug, Default)]
pub struct FileExtractor {
    extractor: LineExtractor,
}

impl FileExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads the whole file before extracting. Each call starts from a fresh
    /// parse state, so synthesized IDs restart at `auto_id_0` per file.
    pub fn extract_file<P: AsRef<Path>>(&mut self, path: P) -> Result<ScriptExtraction> {
        let path = path.as_ref();
        let start = Instant::now();

        if !path.exists() {
            return Err(YarnCsvError::InputNotFound {
                path: path.display().to_string(),
            });
        }

        if !path.is_file() {
            return Err(YarnCsvError::InvalidPath {
                path: format!("{} is not a file", path.display()),
            });
        }

        let content = fs::read_to_string(path)?;
        let bytes_read = content.len() as u64;

        let extraction = self.extract_str(&content, start);
        debug!(
            path = %path.display(),
            bytes = bytes_read,
            records = extraction.records.len(),
            "extracted script"
        );

        Ok(ScriptExtraction {
            bytes_read,
            ..extraction
        })
    }

    pub fn extract_source(&mut self, source: &str) -> ScriptExtraction {
        let extraction = self.extract_str(source, Instant::now());
        ScriptExtraction {
            bytes_read: source.len() as u64,
            ..extraction
        }
    }

    fn extract_str(&mut self, source: &str, start: Instant) -> ScriptExtraction {
        self.extractor.reset();

        let records = self.extractor.extract(script_lines(source));

        ScriptExtraction {
            records,
            stats: self.extractor.stats().clone(),
            bytes_read: 0,
            elapsed: start.elapsed(),
        }
    }
}
