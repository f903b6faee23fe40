pub mod script_filter;
pub mod script_scanner;

pub use script_filter::ScriptFilter;
pub use script_scanner::{Discovery, ScriptScanner};
