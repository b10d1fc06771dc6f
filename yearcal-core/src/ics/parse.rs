//! Line-oriented ICS document parsing.
//!
//! The scanner is a two-state machine (outside / inside a VEVENT). Errors are
//! isolated per block: a malformed date drops its block, a malformed RRULE
//! degrades its event to a single occurrence, and the rest of the document
//! keeps parsing.

use chrono::{Duration, NaiveTime};
use chrono_tz::Tz;
use icalendar::parser::unfold;

use crate::error::FieldParseError;
use crate::event::{CalendarEvent, Instant};
use crate::recurrence::{Exception, expand, parse_rrule};
use crate::timestamp::{TimestampKind, parse_ics_timestamp};
use crate::year_range::YearRange;

use super::line::{RawField, unescape_text};

/// Counters describing what the parser skipped or degraded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParseReport {
    /// `BEGIN:VEVENT` lines seen.
    pub blocks_seen: usize,
    /// Blocks dropped for a malformed field, missing SUMMARY/DTSTART, or
    /// being interrupted by another `BEGIN:VEVENT`.
    pub dropped_blocks: usize,
    /// Events whose RRULE could not be parsed and were kept as single events.
    pub degraded_rules: usize,
    /// `END:VEVENT` lines without a matching `BEGIN:VEVENT`.
    pub unbalanced_ends: usize,
    /// The document ended inside a VEVENT.
    pub unterminated_block: bool,
}

/// Events plus the diagnostics gathered while producing them.
#[derive(Debug, Clone, Default)]
pub struct ParseOutcome {
    pub events: Vec<CalendarEvent>,
    pub report: ParseReport,
}

/// Parse an ICS document into the flat list of occurrences inside `range`.
pub fn parse(document: &str, range: YearRange, zone: Tz) -> Vec<CalendarEvent> {
    parse_with_report(document, range, zone).events
}

/// Like [`parse`], also returning a [`ParseReport`].
pub fn parse_with_report(document: &str, range: YearRange, zone: Tz) -> ParseOutcome {
    let unfolded = unfold(document);

    let mut report = ParseReport::default();
    let mut events = Vec::new();
    let mut block: Option<VeventBlock> = None;

    for line in unfolded.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        if line.eq_ignore_ascii_case("BEGIN:VEVENT") {
            report.blocks_seen += 1;
            if block.is_some() {
                tracing::debug!("VEVENT interrupted by another BEGIN:VEVENT, dropping it");
                report.dropped_blocks += 1;
            }
            block = Some(VeventBlock::default());
            continue;
        }

        if line.eq_ignore_ascii_case("END:VEVENT") {
            match block.take() {
                Some(finished) => finished.finish(range, zone, &mut events, &mut report),
                None => report.unbalanced_ends += 1,
            }
            continue;
        }

        if let Some(current) = block.as_mut()
            && let Some(field) = RawField::parse(line)
        {
            current.apply(&field, zone);
        }
    }

    if block.is_some() {
        tracing::debug!("document ended inside a VEVENT, ignoring the open block");
        report.unterminated_block = true;
    }

    events.retain(|event| range.contains(&event.start));

    ParseOutcome { events, report }
}

/// Fields collected for the VEVENT currently being scanned.
#[derive(Debug, Default)]
struct VeventBlock {
    title: Option<String>,
    description: Option<String>,
    location: Option<String>,
    url: Option<String>,
    uid: Option<String>,
    organizer: Option<String>,
    attendees: Vec<String>,
    start: Option<Instant>,
    start_is_date: bool,
    end: Option<Instant>,
    duration: Option<Duration>,
    rrule: Option<String>,
    exceptions: Vec<Exception>,
    /// Nesting depth of sub-components such as VALARM; their lines are skipped.
    nested: usize,
    error: Option<FieldParseError>,
}

impl VeventBlock {
    fn apply(&mut self, field: &RawField<'_>, zone: Tz) {
        match field.name.as_str() {
            "BEGIN" => {
                self.nested += 1;
                return;
            }
            "END" => {
                self.nested = self.nested.saturating_sub(1);
                return;
            }
            _ if self.nested > 0 => return,
            _ => {}
        }

        match field.name.as_str() {
            "SUMMARY" => self.title = Some(unescape_text(field.value)),
            "DESCRIPTION" => self.description = Some(unescape_text(field.value)),
            "LOCATION" => self.location = Some(unescape_text(field.value)),
            "URL" => self.url = Some(field.value.to_string()),
            "UID" => self.uid = Some(field.value.to_string()),
            "DTSTART" => {
                self.start_is_date =
                    field.is_date_value() || TimestampKind::of(field.value) == TimestampKind::Date;
                self.start = self.timestamp(field.value, zone);
            }
            "DTEND" => self.end = self.timestamp(field.value, zone),
            "DURATION" => match parse_duration(field.value) {
                Ok(duration) => self.duration = Some(duration),
                Err(e) => self.fail(e),
            },
            "RRULE" => self.rrule = Some(field.value.to_string()),
            "EXDATE" => self.exceptions.extend(
                field
                    .value
                    .split(',')
                    .filter_map(|token| Exception::parse(token, zone)),
            ),
            "ORGANIZER" => self.organizer = Some(person(field)),
            "ATTENDEE" => self.attendees.push(person(field)),
            _ => {}
        }
    }

    fn timestamp(&mut self, token: &str, zone: Tz) -> Option<Instant> {
        match parse_ics_timestamp(token, zone) {
            Ok(instant) => Some(instant),
            Err(e) => {
                self.fail(e);
                None
            }
        }
    }

    fn fail(&mut self, error: FieldParseError) {
        if self.error.is_none() {
            self.error = Some(error);
        }
    }

    /// Turn the block into events, or drop it.
    fn finish(
        self,
        range: YearRange,
        zone: Tz,
        events: &mut Vec<CalendarEvent>,
        report: &mut ParseReport,
    ) {
        if let Some(error) = &self.error {
            tracing::debug!(uid = ?self.uid, %error, "dropping VEVENT with malformed field");
            report.dropped_blocks += 1;
            return;
        }
        let (Some(title), Some(start)) = (self.title, self.start) else {
            tracing::debug!(uid = ?self.uid, "dropping VEVENT without SUMMARY or DTSTART");
            report.dropped_blocks += 1;
            return;
        };

        let end = match (self.end, self.duration) {
            (Some(end), _) => Some(end),
            (None, Some(duration)) => match start.checked_add_signed(duration) {
                Some(end) => Some(end),
                None => {
                    let error = FieldParseError::Duration(duration.to_string());
                    tracing::debug!(uid = ?self.uid, %error, "dropping VEVENT whose end overflows");
                    report.dropped_blocks += 1;
                    return;
                }
            },
            (None, None) => None,
        };
        let all_day = self.start_is_date
            || (is_midnight(&start) && end.as_ref().is_some_and(is_midnight));

        let mut event = CalendarEvent::new(title, start);
        event.end = end;
        event.all_day = all_day;
        event.description = self.description;
        event.location = self.location;
        event.url = self.url;
        event.uid = self.uid;
        event.organizer = self.organizer;
        event.attendees = self.attendees;
        event.refresh_id();

        let Some(token) = self.rrule else {
            events.push(event);
            return;
        };

        match parse_rrule(&token, zone) {
            Ok(rule) => {
                let rule = rule.with_exceptions(self.exceptions);
                events.extend(expand(&event, &rule, range));
            }
            Err(error) => {
                tracing::debug!(
                    title = %event.title,
                    %error,
                    "RRULE unreadable, keeping single event"
                );
                report.degraded_rules += 1;
                events.push(event);
            }
        }
    }
}

fn is_midnight(instant: &Instant) -> bool {
    instant.time() == NaiveTime::MIN
}

/// Display name from `CN=`, else the value without a `mailto:` prefix.
fn person(field: &RawField<'_>) -> String {
    if let Some(name) = field.param("CN").filter(|n| !n.is_empty()) {
        return name.to_string();
    }
    let value = field.value;
    match value.get(..7) {
        Some(prefix) if prefix.eq_ignore_ascii_case("mailto:") => value[7..].to_string(),
        _ => value.to_string(),
    }
}

fn parse_duration(value: &str) -> Result<Duration, FieldParseError> {
    let invalid = || FieldParseError::Duration(value.to_string());
    let value = value.trim();
    let iso = value.strip_prefix('+').unwrap_or(value);

    let parsed = iso8601::duration(iso).map_err(|_| invalid())?;
    let std_duration: std::time::Duration = parsed.into();
    Duration::from_std(std_duration).map_err(|_| invalid())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use chrono_tz::UTC;
    use indoc::indoc;

    fn at(y: i32, m: u32, d: u32, h: u32, mi: u32) -> Instant {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, mi, 0)
            .unwrap()
    }

    fn year(y: i32) -> YearRange {
        YearRange::single(y).unwrap()
    }

    #[test]
    fn test_parse_timed_event_with_all_fields() {
        let ics = indoc! {"
            BEGIN:VCALENDAR
            VERSION:2.0
            BEGIN:VEVENT
            UID:kickoff-1@example.com
            SUMMARY:Project kickoff
            DESCRIPTION:Agenda:\\n1. intro\\, goals
            LOCATION:Room 4
            URL:https://example.com/kickoff
            DTSTART:20250310T090000
            DTEND:20250310T103000
            ORGANIZER;CN=Alice Smith:mailto:alice@example.com
            ATTENDEE;CN=Bob;PARTSTAT=ACCEPTED:mailto:bob@example.com
            ATTENDEE:MAILTO:carol@example.com
            STATUS:CONFIRMED
            END:VEVENT
            END:VCALENDAR
        "};

        let events = parse(ics, year(2025), UTC);

        assert_eq!(events.len(), 1);
        let event = &events[0];
        assert_eq!(event.title, "Project kickoff");
        assert_eq!(event.description.as_deref(), Some("Agenda:\n1. intro, goals"));
        assert_eq!(event.location.as_deref(), Some("Room 4"));
        assert_eq!(event.url.as_deref(), Some("https://example.com/kickoff"));
        assert_eq!(event.uid.as_deref(), Some("kickoff-1@example.com"));
        assert_eq!(event.start, at(2025, 3, 10, 9, 0));
        assert_eq!(event.end, Some(at(2025, 3, 10, 10, 30)));
        assert_eq!(event.organizer.as_deref(), Some("Alice Smith"));
        assert_eq!(event.attendees, vec!["Bob", "carol@example.com"]);
        assert!(!event.all_day);
        assert!(!event.is_recurring);
    }

    #[test]
    fn test_all_day_classification() {
        let ics = indoc! {"
            BEGIN:VEVENT
            SUMMARY:Date value
            DTSTART;VALUE=DATE:20250615
            DTEND;VALUE=DATE:20250618
            END:VEVENT
            BEGIN:VEVENT
            SUMMARY:Midnight to midnight
            DTSTART:20250701T000000
            DTEND:20250702T000000
            END:VEVENT
            BEGIN:VEVENT
            SUMMARY:Midnight without end
            DTSTART:20250801T000000
            END:VEVENT
        "};

        let events = parse(ics, year(2025), UTC);

        assert_eq!(events.len(), 3);
        assert!(events[0].all_day);
        assert_eq!(events[0].end, Some(at(2025, 6, 18, 0, 0)));
        assert!(events[1].all_day);
        assert!(!events[2].all_day);
    }

    #[test]
    fn test_malformed_date_drops_only_its_block() {
        let ics = indoc! {"
            BEGIN:VEVENT
            SUMMARY:Broken
            DTSTART:2025-06-15
            END:VEVENT
            BEGIN:VEVENT
            SUMMARY:Fine
            DTSTART:20250616T120000Z
            END:VEVENT
        "};

        let outcome = parse_with_report(ics, year(2025), UTC);

        assert_eq!(outcome.events.len(), 1);
        assert_eq!(outcome.events[0].title, "Fine");
        assert_eq!(outcome.report.blocks_seen, 2);
        assert_eq!(outcome.report.dropped_blocks, 1);
    }

    #[test]
    fn test_blocks_without_title_or_start_are_dropped() {
        let ics = indoc! {"
            BEGIN:VEVENT
            DTSTART:20250616T120000Z
            END:VEVENT
            BEGIN:VEVENT
            SUMMARY:No start
            END:VEVENT
        "};

        let outcome = parse_with_report(ics, year(2025), UTC);

        assert!(outcome.events.is_empty());
        assert_eq!(outcome.report.dropped_blocks, 2);
    }

    #[test]
    fn test_unbalanced_structure_fails_open() {
        let ics = indoc! {"
            END:VEVENT
            BEGIN:VEVENT
            SUMMARY:Complete
            DTSTART:20250101
            END:VEVENT
            BEGIN:VEVENT
            SUMMARY:Dangling
            DTSTART:20250102
        "};

        let outcome = parse_with_report(ics, year(2025), UTC);

        assert_eq!(outcome.events.len(), 1);
        assert_eq!(outcome.events[0].title, "Complete");
        assert_eq!(outcome.report.unbalanced_ends, 1);
        assert!(outcome.report.unterminated_block);
    }

    #[test]
    fn test_recurring_block_is_expanded() {
        let ics = indoc! {"
            BEGIN:VEVENT
            UID:standup@example.com
            SUMMARY:Standup
            DTSTART:20250101T090000
            DTEND:20250101T091500
            RRULE:FREQ=DAILY;COUNT=5
            END:VEVENT
        "};

        let events = parse(ics, year(2025), UTC);

        assert_eq!(events.len(), 5);
        assert!(events.iter().all(|e| e.is_recurring && e.rrule.is_none()));
        assert_eq!(events[4].start, at(2025, 1, 5, 9, 0));
        assert_eq!(events[4].end, Some(at(2025, 1, 5, 9, 15)));
    }

    #[test]
    fn test_bad_rrule_degrades_to_single_event() {
        let ics = indoc! {"
            BEGIN:VEVENT
            SUMMARY:Weird
            DTSTART:20250101T090000
            RRULE:FREQ=DAILY;COUNT=many
            END:VEVENT
        "};

        let outcome = parse_with_report(ics, year(2025), UTC);

        assert_eq!(outcome.events.len(), 1);
        assert!(!outcome.events[0].is_recurring);
        assert_eq!(outcome.report.degraded_rules, 1);
        assert_eq!(outcome.report.dropped_blocks, 0);
    }

    #[test]
    fn test_year_filter_keeps_only_range() {
        let ics = indoc! {"
            BEGIN:VEVENT
            SUMMARY:Last year
            DTSTART:20240505
            END:VEVENT
            BEGIN:VEVENT
            SUMMARY:This year
            DTSTART:20250505
            END:VEVENT
            BEGIN:VEVENT
            SUMMARY:Next year
            DTSTART:20260505
            END:VEVENT
        "};

        let events = parse(ics, year(2025), UTC);

        let titles: Vec<&str> = events.iter().map(|e| e.title.as_str()).collect();
        assert_eq!(titles, vec!["This year"]);
    }

    #[test]
    fn test_yearly_event_anchored_two_years_back() {
        let ics = indoc! {"
            BEGIN:VEVENT
            SUMMARY:Anniversary
            DTSTART;VALUE=DATE:20230412
            DTEND;VALUE=DATE:20230413
            RRULE:FREQ=YEARLY
            END:VEVENT
        "};

        let events = parse(ics, year(2025), UTC);

        assert_eq!(events.len(), 1);
        assert_eq!(events[0].start, at(2025, 4, 12, 0, 0));
        assert!(events[0].all_day);
    }

    #[test]
    fn test_folded_lines_and_valarm_are_handled() {
        let ics = "BEGIN:VEVENT\r\n\
SUMMARY:Long \r\n title\r\n\
DTSTART:20250301T100000\r\n\
DESCRIPTION:Event body\r\n\
BEGIN:VALARM\r\n\
TRIGGER:-PT15M\r\n\
DESCRIPTION:Reminder\r\n\
END:VALARM\r\n\
END:VEVENT\r\n";

        let events = parse(ics, year(2025), UTC);

        assert_eq!(events.len(), 1);
        assert_eq!(events[0].title, "Long title");
        assert_eq!(events[0].description.as_deref(), Some("Event body"));
    }

    #[test]
    fn test_duration_sets_end_when_dtend_missing() {
        let ics = indoc! {"
            BEGIN:VEVENT
            SUMMARY:Workshop
            DTSTART:20250402T130000
            DURATION:PT2H30M
            END:VEVENT
        "};

        let events = parse(ics, year(2025), UTC);

        assert_eq!(events[0].end, Some(at(2025, 4, 2, 15, 30)));
    }

    #[test]
    fn test_exdate_removes_occurrence() {
        let ics = indoc! {"
            BEGIN:VEVENT
            SUMMARY:Yoga
            DTSTART:20250106T180000
            RRULE:FREQ=WEEKLY;COUNT=4
            EXDATE:20250113T180000,20250120T180000
            END:VEVENT
        "};

        let events = parse(ics, year(2025), UTC);

        let days: Vec<u32> = events.iter().map(|e| chrono::Datelike::day(&e.start)).collect();
        assert_eq!(days, vec![6, 27]);
    }

    #[test]
    fn test_utc_start_is_converted_to_display_zone() {
        let ics = indoc! {"
            BEGIN:VEVENT
            SUMMARY:Call
            DTSTART:20250615T160000Z
            END:VEVENT
        "};

        let events = parse(ics, year(2025), chrono_tz::America::Los_Angeles);

        assert_eq!(events[0].start, at(2025, 6, 15, 9, 0));
    }

    #[test]
    fn test_duration_overflow_drops_only_its_block() {
        let ics = indoc! {"
            BEGIN:VEVENT
            SUMMARY:Forever
            DTSTART:20250101T090000
            DURATION:P99999999W
            END:VEVENT
            BEGIN:VEVENT
            SUMMARY:Lunch
            DTSTART:20250102T120000
            END:VEVENT
        "};

        let outcome = parse_with_report(ics, year(2025), UTC);

        assert_eq!(outcome.events.len(), 1);
        assert_eq!(outcome.events[0].title, "Lunch");
        assert_eq!(outcome.report.dropped_blocks, 1);
    }

    #[test]
    fn test_tzid_start_is_floating() {
        let ics = indoc! {"
            BEGIN:VEVENT
            SUMMARY:Paris meeting
            DTSTART;TZID=Europe/Paris:20250610T090000
            DTEND;TZID=Europe/Paris:20250610T100000
            END:VEVENT
        "};

        let events = parse(ics, year(2025), chrono_tz::America::New_York);

        assert_eq!(events.len(), 1);
        assert_eq!(events[0].start, at(2025, 6, 10, 9, 0));
        assert_eq!(events[0].end, Some(at(2025, 6, 10, 10, 0)));
        assert!(!events[0].all_day);
    }
}
