//! ICS document parsing.
//!
//! Only the VEVENT properties yearcal displays are read; everything else in
//! the document is skipped without error.

mod line;
mod parse;

pub use line::{RawField, unescape_text};
pub use parse::{ParseOutcome, ParseReport, parse, parse_with_report};
