//! Output formatting module
//!
//! Provides two output formats:
//! - Rich terminal summary with colors
//! - JSON envelope

pub mod grade;
pub mod json;
pub mod terminal;

pub use grade::format_grade;
pub use json::{print_json, print_json_error, to_json_output, JsonEnvelope, ScanOutput};
pub use terminal::{format_report, print_error, print_report, print_warning};
