//! Turns one calendar day's parsed entries into a gap-free interval list.
//!
//! Entries only describe the spans someone bothered to write down; the minutes
//! between two entries take the opposite status of the entry that follows
//! them, and the edges of the day take the opposite status of the nearest
//! entry. A facility-wide rainout notice overrides the whole day.

use std::collections::HashMap;

use chrono::NaiveDate;

use crate::dates::{format_date_minute, parse_date, to_minute};
use crate::parser::{Parser, Stream};
use crate::rules::calendar::grammar::{cycle_track_heading, cycle_track_only_open, subheader_range};
use crate::{KnownRules, RuleInterval, ScheduleRule, ScrapeResult, UnknownRules, Year};

/// Dates (ISO `yyyy-mm-dd`) on which the surrounding field was rained out,
/// which opens the track all day regardless of the posted entries.
pub type FieldRainoutInfo = HashMap<String, bool>;

pub const RAINOUT_COMMENT: &str = "Field Rained Out, Cycle Track Open All Day";

/// One raw listing entry as extracted upstream: the heading, the ISO date it
/// starts on, its body text and its human-formatted subheader line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarEntry {
    pub name: String,
    pub start_date: String,
    pub description: String,
    pub sub_header_date: String,
}

/// All entries published for a single day.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarDate {
    pub date: String,
    pub entries: Vec<CalendarEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarYear {
    pub year: i32,
    pub dates: Vec<CalendarDate>,
}

/// An entry reduced to its schedule meaning. Either bound may be absent:
/// `"until 2 p.m."` has no start, `"after 6:45 p.m."` has no end.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedEntry {
    pub open: bool,
    pub start_minute: Option<i32>,
    pub end_minute: Option<i32>,
    pub comment: Option<String>,
}

fn run<'a, P: Parser<'a>>(p: &P, line: &'a str) -> Option<P::Out> {
    p.parse(Stream::new(line)).map(|parsed| parsed.value)
}

/// Parse one entry, consulting the subheader when the heading underspecifies.
///
/// Closed headings missing a bound inherit it from the subheader's range. A
/// heading with no time span at all falls back to the subheader range
/// entirely, and a heading the grammar does not know (`"Cycle Track in Use
/// for Private Event"`) becomes a closure over the subheader range with the
/// heading itself as the comment.
fn parse_entry(entry: &CalendarEntry) -> Option<ParsedEntry> {
    let sub = run(&subheader_range(), &entry.sub_header_date);
    if let Some((open, span, comment)) = run(&cycle_track_heading(), &entry.name) {
        let (mut start_minute, mut end_minute) = (span.start_minute, span.end_minute);
        if !open {
            if let Some((sub_start, sub_end)) = sub {
                start_minute = start_minute.or(Some(sub_start));
                end_minute = end_minute.or(Some(sub_end));
            }
        }
        return Some(ParsedEntry { open, start_minute, end_minute, comment });
    }
    if let (Some(open), Some((sub_start, sub_end))) = (run(&cycle_track_only_open(), &entry.name), sub) {
        return Some(ParsedEntry {
            open,
            start_minute: Some(sub_start),
            end_minute: Some(sub_end),
            comment: None,
        });
    }
    let (sub_start, sub_end) = sub?;
    Some(ParsedEntry {
        open: false,
        start_minute: Some(sub_start),
        end_minute: Some(sub_end),
        comment: Some(entry.name.clone()),
    })
}

/// Parse every entry of a day and sort them into chronological order.
/// Entries with no start sort to the front. `None` if any entry resists
/// parsing, which leaves the whole day unknown.
pub fn parse_and_reorder_entries(date: &CalendarDate) -> Option<Vec<ParsedEntry>> {
    let mut entries = date.entries.iter().map(parse_entry).collect::<Option<Vec<_>>>()?;
    entries.sort_by_key(|e| e.start_minute.unwrap_or(0));
    Some(entries)
}

fn span(date: NaiveDate, start_minute: i32, last_minute: i32, open: bool, comment: Option<String>) -> RuleInterval {
    RuleInterval {
        open,
        start_timestamp: format_date_minute(date, start_minute),
        end_timestamp: format_date_minute(date, last_minute),
        comment,
    }
}

/// Compile one day's entries into full-day coverage.
///
/// An entry missing its start begins where the previous one ended (or at
/// 00:00); an entry missing its end runs to 23:59. Uncovered minutes take the
/// inverse status of the entry that follows them, and minutes after the last
/// entry take the inverse status of that entry.
pub fn get_intervals(date: &CalendarDate, field_rained_out: bool) -> Option<Vec<RuleInterval>> {
    let day = parse_date(&date.date);
    if field_rained_out {
        return Some(vec![span(day, 0, to_minute(24, -1), true, Some(RAINOUT_COMMENT.to_string()))]);
    }
    let entries = parse_and_reorder_entries(date)?;
    if entries.is_empty() {
        return None;
    }
    let mut result = Vec::new();
    let mut cursor = 0;
    for entry in &entries {
        let start = entry.start_minute.unwrap_or(cursor);
        if start > cursor {
            result.push(span(day, cursor, start - 1, !entry.open, None));
        }
        let end = entry.end_minute.unwrap_or(to_minute(24, 0));
        result.push(span(day, start, end - 1, entry.open, entry.comment.clone()));
        cursor = end;
    }
    if cursor < to_minute(24, 0) {
        let last = entries.last().unwrap();
        result.push(span(day, cursor, to_minute(24, -1), !last.open, None));
    }
    Some(result)
}

/// The audit-trail lines stored alongside a compiled day: one tab-joined line
/// per entry, plus a synthetic line when the rainout override applied.
pub fn format_rules(date: &CalendarDate, field_rained_out: bool) -> Vec<String> {
    let mut lines: Vec<String> = date
        .entries
        .iter()
        .map(|e| format!("{}\t{}\t{}\t{}", e.name, e.start_date, e.description, e.sub_header_date))
        .collect();
    if field_rained_out {
        lines.push(format!("Field Rained Out\t{}\t\t", date.date));
    }
    lines
}

/// Compile one calendar day into a single-day rule, or pass it through
/// unknown when its entries cannot be parsed.
pub fn recognize_calendar_date(date: &CalendarDate, rainout: &FieldRainoutInfo) -> ScheduleRule {
    let field_rained_out = rainout.get(&date.date).copied().unwrap_or(false);
    let rules = format_rules(date, field_rained_out);
    match get_intervals(date, field_rained_out) {
        Some(intervals) => ScheduleRule::Known(KnownRules {
            text: date.date.clone(),
            start_date: date.date.clone(),
            end_date: date.date.clone(),
            rules,
            intervals: crate::intervals::compress_intervals(intervals),
        }),
        None => {
            tracing::debug!(date = %date.date, "calendar day left unknown");
            ScheduleRule::Unknown(UnknownRules {
                text: date.date.clone(),
                start_date: date.date.clone(),
                end_date: date.date.clone(),
                rules,
            })
        }
    }
}

pub fn recognize_calendar_years(years: &[CalendarYear], rainout: &FieldRainoutInfo) -> ScrapeResult {
    years
        .iter()
        .map(|y| Year {
            year: y.year,
            rules: y.dates.iter().map(|d| recognize_calendar_date(d, rainout)).collect(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(name: &str, sub_header_date: &str) -> CalendarEntry {
        CalendarEntry {
            name: name.to_string(),
            start_date: String::new(),
            description: String::new(),
            sub_header_date: sub_header_date.to_string(),
        }
    }

    fn day(date: &str, entries: Vec<CalendarEntry>) -> CalendarDate {
        CalendarDate { date: date.to_string(), entries }
    }

    fn iv(open: bool, start: &str, end: &str, comment: Option<&str>) -> RuleInterval {
        RuleInterval {
            open,
            start_timestamp: start.to_string(),
            end_timestamp: end.to_string(),
            comment: comment.map(str::to_string),
        }
    }

    #[test]
    fn reorders_and_backfills_private_event() {
        let date = day(
            "2025-09-07",
            vec![
                entry("Cycle Track in Use for Private Event", "September 7, 2025, 8:30 AM - 11:30 AM"),
                entry("Cycle Track Open for Public Use Until 8:30 a.m.", "September 7, 2025, 5:00 AM - 8:30 AM"),
                entry("Cycle Track Open After 6:45 p.m.", "September 7, 2025, 6:45 PM"),
            ],
        );
        assert_eq!(
            parse_and_reorder_entries(&date),
            Some(vec![
                ParsedEntry {
                    open: true,
                    start_minute: None,
                    end_minute: Some(to_minute(8, 30)),
                    comment: None,
                },
                ParsedEntry {
                    open: false,
                    start_minute: Some(to_minute(8, 30)),
                    end_minute: Some(to_minute(11, 30)),
                    comment: Some("Cycle Track in Use for Private Event".to_string()),
                },
                ParsedEntry {
                    open: true,
                    start_minute: Some(to_minute(18, 45)),
                    end_minute: None,
                    comment: None,
                },
            ])
        );
    }

    #[test]
    fn fills_gap_between_open_sessions() {
        let date = day(
            "2025-09-10",
            vec![
                entry("Cycle Track Open Until 2 p.m.", "September 10, 2025, 5:00 AM - 2:00 PM"),
                entry("Cycle Track Open After 6:45 p.m.", "September 10, 2025, 6:45 PM"),
            ],
        );
        assert_eq!(
            get_intervals(&date, false),
            Some(vec![
                iv(true, "2025-09-10 00:00", "2025-09-10 13:59", None),
                iv(false, "2025-09-10 14:00", "2025-09-10 18:44", None),
                iv(true, "2025-09-10 18:45", "2025-09-10 23:59", None),
            ])
        );
    }

    #[test]
    fn closed_heading_inherits_subheader_start() {
        let date = day(
            "2025-11-27",
            vec![
                entry("Cycle Track Closed Until 7:00 AM (Turkey Trot event)", "November 27, 2025, 5:00 AM - 7:00 AM"),
                entry("Cycle Track Open After 11:00 AM", "November 27, 2025, 11:00 AM"),
            ],
        );
        assert_eq!(
            get_intervals(&date, false),
            Some(vec![
                iv(true, "2025-11-27 00:00", "2025-11-27 04:59", None),
                iv(false, "2025-11-27 05:00", "2025-11-27 06:59", Some("Turkey Trot event")),
                iv(false, "2025-11-27 07:00", "2025-11-27 10:59", None),
                iv(true, "2025-11-27 11:00", "2025-11-27 23:59", None),
            ])
        );
    }

    #[test]
    fn private_event_day_compiles_end_to_end() {
        let date = day(
            "2025-09-07",
            vec![
                entry("Cycle Track Open for Public Use Until 8:30 a.m.", "September 7, 2025, 5:00 AM - 8:30 AM"),
                entry("Cycle Track in Use for Private Event", "September 7, 2025, 8:30 AM - 11:30 AM"),
                entry("Cycle Track Open After 6:45 p.m.", "September 7, 2025, 6:45 PM"),
            ],
        );
        assert_eq!(
            get_intervals(&date, false),
            Some(vec![
                iv(true, "2025-09-07 00:00", "2025-09-07 08:29", None),
                iv(false, "2025-09-07 08:30", "2025-09-07 11:29", Some("Cycle Track in Use for Private Event")),
                iv(false, "2025-09-07 11:30", "2025-09-07 18:44", None),
                iv(true, "2025-09-07 18:45", "2025-09-07 23:59", None),
            ])
        );
    }

    #[test]
    fn spanless_heading_takes_subheader_range() {
        let date = day(
            "2025-10-18",
            vec![entry("Cycle Track Closed", "October 18, 2025, 9:00 AM - 1:00 PM")],
        );
        assert_eq!(
            parse_and_reorder_entries(&date),
            Some(vec![ParsedEntry {
                open: false,
                start_minute: Some(to_minute(9, 0)),
                end_minute: Some(to_minute(13, 0)),
                comment: None,
            }])
        );
    }

    #[test]
    fn rainout_overrides_everything() {
        let date = day(
            "2025-11-27",
            vec![entry("Cycle Track Closed All Day", "November 27, 2025, 5:00 AM - 11:30 PM")],
        );
        assert_eq!(
            get_intervals(&date, true),
            Some(vec![iv(true, "2025-11-27 00:00", "2025-11-27 23:59", Some(RAINOUT_COMMENT))])
        );
        let lines = format_rules(&date, true);
        assert_eq!(lines.last().map(String::as_str), Some("Field Rained Out\t2025-11-27\t\t"));
    }

    #[test]
    fn recognized_day_spans_exactly_one_date() {
        let mut entries = vec![entry("Cycle Track Open All Day", "September 12, 2025, 5:00 AM")];
        entries[0].start_date = "2025-09-12".to_string();
        entries[0].description = "Recurring weekly".to_string();
        let date = day("2025-09-12", entries);
        let rule = recognize_calendar_date(&date, &FieldRainoutInfo::new());
        match rule {
            ScheduleRule::Known(known) => {
                assert_eq!(known.text, "2025-09-12");
                assert_eq!(known.start_date, "2025-09-12");
                assert_eq!(known.end_date, "2025-09-12");
                assert_eq!(
                    known.rules,
                    vec!["Cycle Track Open All Day\t2025-09-12\tRecurring weekly\tSeptember 12, 2025, 5:00 AM"]
                );
                assert_eq!(known.intervals, vec![iv(true, "2025-09-12 00:00", "2025-09-12 23:59", None)]);
            }
            ScheduleRule::Unknown(_) => panic!("expected a recognized day"),
        }
    }

    #[test]
    fn unparseable_day_stays_unknown() {
        // Neither the heading nor the single-time subheader yields a span.
        let date = day("2025-10-01", vec![entry("Track maintenance notice", "October 1, 2025, 9:00 AM")]);
        let rule = recognize_calendar_date(&date, &FieldRainoutInfo::new());
        assert!(rule.is_unknown());
        let years = recognize_calendar_years(
            &[CalendarYear { year: 2025, dates: vec![date] }],
            &FieldRainoutInfo::new(),
        );
        assert_eq!(years.len(), 1);
        assert!(years[0].rules[0].is_unknown());
    }
}
