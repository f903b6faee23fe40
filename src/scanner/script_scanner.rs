use crate::config::DiscoveryConfig;
use crate::error::{Result, YarnCsvError};
use crate::scanner::script_filter::ScriptFilter;
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

/// Looks for script files directly inside a directory (no recursion).
pub struct ScriptScanner {
    filter: ScriptFilter,
}

/// Outcome of auto-discovery: the chosen file plus every candidate seen.
#[derive(Debug, Clone)]
pub struct Discovery {
    pub selected: PathBuf,
    pub candidates: Vec<PathBuf>,
}

impl Discovery {
    pub fn is_ambiguous(&self) -> bool {
        self.candidates.len() > 1
    }
}

impl ScriptScanner {
    pub fn new(config: &DiscoveryConfig) -> Self {
        Self {
            filter: ScriptFilter::new(config),
        }
    }

    /// Lists matching files in directory listing order. The order is whatever
    /// the filesystem returns and is not sorted.
    pub fn find_candidates<P: AsRef<Path>>(&self, directory: P) -> Result<Vec<PathBuf>> {
        let directory = directory.as_ref();

        let walker = WalkDir::new(directory)
            .min_depth(1)
            .max_depth(1)
            .follow_links(false);

        let mut candidates = Vec::new();
        for entry in walker {
            let entry = entry.map_err(|err| YarnCsvError::DiscoveryIo {
                directory: directory.display().to_string(),
                source: err.into(),
            })?;

            if entry.file_type().is_file() && self.filter.is_script_file(entry.path()) {
                candidates.push(entry.into_path());
            }
        }

        debug!(
            directory = %directory.display(),
            found = candidates.len(),
            "scanned for scripts"
        );

        Ok(candidates)
    }

    /// Picks the first candidate. When several exist the choice is arbitrary;
    /// callers can inspect `Discovery::candidates` to report the ambiguity.
    pub fn discover<P: AsRef<Path>>(&self, directory: P) -> Result<Discovery> {
        let directory = directory.as_ref();
        let candidates = self.find_candidates(directory)?;

        let selected = candidates
            .first()
            .cloned()
            .ok_or_else(|| YarnCsvError::NoCandidateFile {
                extension: self.filter.extension().to_string(),
                directory: directory.display().to_string(),
            })?;

        Ok(Discovery {
            selected,
            candidates,
        })
    }
}
