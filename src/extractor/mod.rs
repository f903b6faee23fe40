pub mod file_extractor;
pub mod line_extractor;
pub mod output_manager;

pub use file_extractor::{FileExtractor, ScriptExtraction};
pub use line_extractor::{
    script_lines, DialogueRecord, ExtractionStats, LineExtractor, ParseState, ScriptLine,
    AUTO_ID_PREFIX, NO_TITLE,
};
pub use output_manager::{derive_output_path, ConversionReport, OutputManager, CSV_HEADER};
