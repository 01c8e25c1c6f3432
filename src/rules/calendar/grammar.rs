//! Lexical grammar for day-by-day calendar listings: entry headings like
//! `"Cycle Track Open Until 2 p.m."` and subheader lines like
//! `"September 10, 2025, 5:00 AM - 2:00 PM"`.
//!
//! Unlike the narrative grammar, clock times here may omit their meridiem
//! (`"2-10 p.m."`); a bare number inherits plausibility from the paired time
//! in the same range.

use crate::dates::to_minute;
use crate::parser::{Parser, ap_second, end_parsed, map_parser, opt, re_parser, triple};

/// A clock time plus whether its meridiem was written out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CtxTime {
    pub value: i32,
    pub ampm: bool,
}

const NOON: i32 = 12 * 60;

/// `"2"`, `"2 a.m."`, `"8:30 AM"`, `"noon"`. A bare number is taken at face
/// value here; [`ctx_minute_range`] resolves it against its partner.
pub fn ctx_time_to_minute<'a>() -> impl Parser<'a, Out = CtxTime> {
    alt!(
        map_parser(re_parser(regex!(r"(?i)(\d{1,2})(?::(\d{2}))?\s*([ap](?:\.m\.|m))?")), |caps| {
            let hour: i32 = caps[1].parse().unwrap();
            let minute: i32 = caps.get(2).map_or(0, |m| m.as_str().parse().unwrap());
            let ampm = caps.get(3);
            let pm = ampm.is_some_and(|m| m.as_str().starts_with(['p', 'P']));
            CtxTime {
                value: to_minute(hour % 12 + if pm { 12 } else { 0 }, minute),
                ampm: ampm.is_some(),
            }
        }),
        map_parser(re_parser(regex!(r"(?i)noon")), |_| CtxTime { value: NOON, ampm: true }),
    )
}

/// Add 12 hours to a bare morning-looking time whose partner is explicitly
/// afternoon, so `"2-10 p.m."` reads as 14:00-22:00.
fn apply_time(cur: CtxTime, ctx: CtxTime) -> i32 {
    cur.value + if !cur.ampm && ctx.ampm && ctx.value >= NOON && cur.value < NOON { NOON } else { 0 }
}

/// `"2:00 PM - 8:45 PM"`, `"2-10 p.m."`, `"5 a.m. to 2 p.m."`.
pub fn ctx_minute_range<'a>() -> impl Parser<'a, Out = (i32, i32)> {
    map_parser(
        triple(ctx_time_to_minute(), re_parser(regex!(r"(?i)\s*(?:to|-|–)\s*")), ctx_time_to_minute()),
        |(start, _, end)| (apply_time(start, end), apply_time(end, start)),
    )
}

/// One calendar entry's span of minutes; either bound may be left for the
/// evaluator to infer from neighboring entries or the subheader.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalendarSpan {
    pub start_minute: Option<i32>,
    pub end_minute: Option<i32>,
}

pub fn calendar_time_span<'a>() -> impl Parser<'a, Out = CalendarSpan> {
    alt!(
        map_parser(re_parser(regex!(r"(?i)\s*all day\s*")), |_| CalendarSpan {
            start_minute: Some(0),
            end_minute: Some(to_minute(24, 0)),
        }),
        map_parser(
            ap_second(re_parser(regex!(r"(?i)\s*until\s+")), map_parser(ctx_time_to_minute(), |t| t.value)),
            |end| CalendarSpan { start_minute: None, end_minute: Some(end) },
        ),
        map_parser(
            ap_second(re_parser(regex!(r"(?i)\s*after\s+")), map_parser(ctx_time_to_minute(), |t| t.value)),
            |start| CalendarSpan { start_minute: Some(start), end_minute: None },
        ),
        map_parser(ctx_minute_range(), |(start, end)| CalendarSpan {
            start_minute: Some(start),
            end_minute: Some(end),
        }),
    )
}

/// `"Cycle Track Open for Public Use"` -> `true`, `"Cycle Track Closed"` and
/// `"Cycling Track in Use"` -> `false`.
pub fn cycle_track_open<'a>() -> impl Parser<'a, Out = bool> {
    map_parser(
        re_parser(regex!(r"(?i)(?:cycle|cycling) track (?:(open)|closed|in use)(?: for public use)?\s*")),
        |caps| caps.get(1).is_some(),
    )
}

/// A fully-parsed entry heading: open flag, span, optional parenthesized
/// event note (`"Cycle Track Closed Until 7:00 AM (Turkey Trot event)"`).
pub fn cycle_track_heading<'a>() -> impl Parser<'a, Out = (bool, CalendarSpan, Option<String>)> {
    end_parsed(triple(
        cycle_track_open(),
        calendar_time_span(),
        opt(map_parser(re_parser(regex!(r"\s*\((.*)\)\s*")), |caps| caps[1].to_string())),
    ))
}

/// Just the open flag, for headings with no time span of their own.
pub fn cycle_track_only_open<'a>() -> impl Parser<'a, Out = bool> {
    end_parsed(cycle_track_open())
}

/// `"September 7, 2025, 8:30 AM - 11:30 AM"` -> the minute range. Fails on
/// single-time subheaders, which carry no usable span.
pub fn subheader_range<'a>() -> impl Parser<'a, Out = (i32, i32)> {
    end_parsed(ap_second(re_parser(regex!(r"(?i)\w+\s+\d+,\s+\d+,\s+")), ctx_minute_range()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::Stream;

    fn parse_to_end<'a, P: Parser<'a>>(p: &P, input: &'a str) -> Option<P::Out> {
        let parsed = p.parse(Stream::new(input))?;
        assert!(parsed.rest.at_end(), "unconsumed input in {input:?}");
        Some(parsed.value)
    }

    #[test]
    fn ctx_time_examples() {
        let cases = vec![
            ("2", CtxTime { value: to_minute(2, 0), ampm: false }),
            ("2 a.m.", CtxTime { value: to_minute(2, 0), ampm: true }),
            ("2 p.m.", CtxTime { value: to_minute(14, 0), ampm: true }),
            ("noon", CtxTime { value: to_minute(12, 0), ampm: true }),
        ];
        for (input, expected) in cases {
            assert_eq!(parse_to_end(&ctx_time_to_minute(), input), Some(expected), "{input}");
        }
    }

    #[test]
    fn ctx_minute_range_examples() {
        assert_eq!(
            parse_to_end(&ctx_minute_range(), "2:00 PM - 8:45 PM"),
            Some((to_minute(14, 0), to_minute(20, 45)))
        );
    }

    #[test]
    fn calendar_time_span_examples() {
        let cases = vec![
            ("all day", CalendarSpan { start_minute: Some(0), end_minute: Some(to_minute(24, 0)) }),
            ("until 2 p.m.", CalendarSpan { start_minute: None, end_minute: Some(to_minute(14, 0)) }),
            ("after 10 a.m.", CalendarSpan { start_minute: Some(to_minute(10, 0)), end_minute: None }),
            (
                "2-10 p.m.",
                CalendarSpan { start_minute: Some(to_minute(14, 0)), end_minute: Some(to_minute(22, 0)) },
            ),
            (
                "5 a.m. to 2 p.m.",
                CalendarSpan { start_minute: Some(to_minute(5, 0)), end_minute: Some(to_minute(14, 0)) },
            ),
            (
                "2-6:45 p.m.",
                CalendarSpan { start_minute: Some(to_minute(14, 0)), end_minute: Some(to_minute(18, 45)) },
            ),
        ];
        for (input, expected) in cases {
            assert_eq!(parse_to_end(&calendar_time_span(), input), Some(expected), "{input}");
        }
    }

    #[test]
    fn heading_with_event_note() {
        let (open, span, comment) =
            parse_to_end(&cycle_track_heading(), "Cycle Track Closed Until 7:00 AM (Turkey Trot event)").unwrap();
        assert!(!open);
        assert_eq!(span, CalendarSpan { start_minute: None, end_minute: Some(to_minute(7, 0)) });
        assert_eq!(comment.as_deref(), Some("Turkey Trot event"));
    }

    #[test]
    fn heading_for_public_use() {
        let (open, span, comment) =
            parse_to_end(&cycle_track_heading(), "Cycle Track Open for Public Use Until 8:30 a.m.").unwrap();
        assert!(open);
        assert_eq!(span.end_minute, Some(to_minute(8, 30)));
        assert_eq!(comment, None);
    }

    #[test]
    fn in_use_heading_is_not_a_span() {
        assert!(parse_to_end(&cycle_track_heading(), "Cycle Track in Use for Private Event").is_none());
        assert!(parse_to_end(&cycle_track_only_open(), "Cycle Track in Use for Private Event").is_none());
    }

    #[test]
    fn subheader_range_examples() {
        assert_eq!(
            parse_to_end(&subheader_range(), "September 7, 2025, 8:30 AM - 11:30 AM"),
            Some((to_minute(8, 30), to_minute(11, 30)))
        );
        // Single-time subheaders have no range to offer.
        assert!(parse_to_end(&subheader_range(), "September 10, 2025, 6:45 PM").is_none());
    }
}
