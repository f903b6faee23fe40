use crate::config::DiscoveryConfig;
use regex::Regex;
use std::path::Path;

pub struct ScriptFilter {
    extension: String,
    exclude_patterns: Vec<Regex>,
}

impl ScriptFilter {
    pub fn new(config: &DiscoveryConfig) -> Self {
        // Patterns are checked by Config::validate; anything invalid here is skipped.
        let exclude_patterns = config
            .exclude_patterns
            .iter()
            .filter_map(|pattern| Regex::new(pattern).ok())
            .collect();

        Self {
            extension: normalize_extension(&config.extension),
            exclude_patterns,
        }
    }

    pub fn is_script_file(&self, path: &Path) -> bool {
        let matches_extension = path
            .extension()
            .and_then(|s| s.to_str())
            .is_some_and(|ext| ext.to_lowercase() == self.extension);

        if !matches_extension {
            return false;
        }

        match path.file_name().and_then(|s| s.to_str()) {
            Some(filename) => !self.matches_any_pattern(filename),
            None => false,
        }
    }

    pub fn matches_any_pattern(&self, text: &str) -> bool {
        self.exclude_patterns
            .iter()
            .any(|pattern| pattern.is_match(text))
    }

    pub fn extension(&self) -> &str {
        &self.extension
    }
}

impl Default for ScriptFilter {
    fn default() -> Self {
        Self::new(&DiscoveryConfig::default())
    }
}

fn normalize_extension(extension: &str) -> String {
    extension.trim().trim_start_matches('.').to_lowercase()
}
