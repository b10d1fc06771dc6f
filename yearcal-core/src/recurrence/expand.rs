//! Bounded expansion of a base event into concrete occurrences.

use crate::event::{CalendarEvent, Instant};
use crate::year_range::YearRange;

use super::advance::advance;
use super::rule::{Frequency, RecurrenceRule};

/// Extra steps allowed on top of the computed ceiling.
const CEILING_SLACK: usize = 2;

/// Upper bound on generated occurrences for a rule without COUNT.
///
/// Counts every period between the anchor and the end of the range at the
/// frequency's shortest possible gap, so any occurrence that can land in the
/// range is reachable before the ceiling is hit.
pub fn occurrence_ceiling(
    anchor: Instant,
    range: YearRange,
    freq: Frequency,
    interval: u32,
) -> usize {
    let span_days = (range.end_boundary().date() - anchor.date()).num_days().max(0);
    let period_days = freq.min_period_days() * i64::from(interval.max(1));
    usize::try_from(span_days / period_days)
        .unwrap_or(usize::MAX)
        .saturating_add(CEILING_SLACK)
}

/// Expand `base` according to `rule`, keeping occurrences that start inside `range`.
///
/// - Occurrences are generated in ascending order starting at `base.start`.
/// - Each one keeps the base duration, has no residual rule and is marked recurring.
/// - COUNT limits generated occurrences, including those before the range and
///   those removed by EXDATE.
/// - UNTIL is checked after each step; the last occurrence at or before it is kept.
/// - A rule without a known FREQ yields only the base occurrence.
pub fn expand(base: &CalendarEvent, rule: &RecurrenceRule, range: YearRange) -> Vec<CalendarEvent> {
    let duration = base.duration();
    let range_start = range.start_boundary();
    let range_end = range.end_boundary();

    let max = match (rule.count, rule.freq) {
        (Some(count), _) => usize::try_from(count).unwrap_or(usize::MAX),
        (None, Some(freq)) => occurrence_ceiling(base.start, range, freq, rule.interval),
        (None, None) => 1,
    };

    let mut occurrences = Vec::new();
    let mut current = base.start;
    let mut generated = 0usize;

    while current <= range_end && generated < max {
        if current >= range_start && !rule.is_excluded(&current) {
            // Later starts only push the end further out.
            let Some(occurrence) = base.occurrence_at(current, duration) else {
                break;
            };
            occurrences.push(occurrence);
        }
        generated += 1;

        let Some(freq) = rule.freq else {
            break;
        };
        let Some(next) = advance(current, freq, rule.interval) else {
            break;
        };
        current = next;

        if let Some(until) = rule.until
            && current > until
        {
            break;
        }
    }

    tracing::trace!(
        title = %base.title,
        generated,
        kept = occurrences.len(),
        "expanded recurrence"
    );

    occurrences
}
