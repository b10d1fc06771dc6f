//! RRULE parsing and expansion.
//!
//! BYDAY is parsed and kept on the rule but does not influence placement:
//! every occurrence lands on the anchor's weekday (or day of month).

pub mod advance;
mod expand;
mod rule;

pub use expand::{expand, occurrence_ceiling};
pub use rule::{Exception, Frequency, RecurrenceRule, WeekdayNum, parse_rrule};
