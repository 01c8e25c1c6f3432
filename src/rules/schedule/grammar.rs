//! Lexical grammar for the narrative schedule postings: months, weekdays,
//! clock times, time spans, date ranges and weekday lists.
//!
//! Everything here is a thin regex-anchored parser mapped into plain data;
//! clause semantics (which dates an expression applies to) live in
//! [`super::steps`].

use once_cell::sync::Lazy;
use regex::Regex;

use crate::dates::to_minute;
use crate::parser::{Parser, ap_first, ap_second, map_parser, opt, pair, re_parser, sep_by1, triple};

const MONTHS_PATTERN: &str =
    r"(?i)(Jan(?:uary)?|Feb(?:ruary)?|Mar(?:ch)?|Apr(?:il)?|May|Jun(?:e)?|Jul(?:y)?|Aug(?:ust)?|Sep(?:tember)?|Oct(?:ober)?|Nov(?:ember)?|Dec(?:ember)?)";

const DAY_NUMBER_PATTERN: &str = r"([1-3][0-9]|[1-9])";

static MONTH_RE: Lazy<Regex> = Lazy::new(|| Regex::new(MONTHS_PATTERN).unwrap());
static DAY_NUMBER_RE: Lazy<Regex> = Lazy::new(|| Regex::new(DAY_NUMBER_PATTERN).unwrap());

/// `Month D`, `Month D-D`, `Month D - Month D`, `Month D thru/through Month D`.
static DATE_RANGE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"{m}\s+{d}(?:\s*(?:-|thru|through)\s*(?:{m}\s+)?{d})?",
        m = MONTHS_PATTERN,
        d = DAY_NUMBER_PATTERN
    ))
    .unwrap()
});

static WEEKDAY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(Sun(?:day)?|Mon(?:day)?|Tue(?:sday)?|Wed(?:nesday)?|Thu(?:rs(?:day)?)?|Fri(?:day)?|Sat(?:urday)?)s?\b")
        .unwrap()
});

static TIME_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)(\d{1,2})(?::(\d{2}))?\s*([ap](?:\.m\.|m))").unwrap());

const MONTHS_TABLE: [&str; 12] =
    ["jan", "feb", "mar", "apr", "may", "jun", "jul", "aug", "sep", "oct", "nov", "dec"];

/// `"January"`/`"Jan"` to two-digit ISO month. The month regexes guarantee the
/// prefix is known; anything else is a grammar bug.
fn parse_month_to_iso(month: &str) -> String {
    let prefix = month.get(..3).map(str::to_ascii_lowercase);
    let index = prefix
        .as_deref()
        .and_then(|p| MONTHS_TABLE.iter().position(|m| *m == p))
        .unwrap_or_else(|| panic!("failed to parse month: {month}"));
    format!("{:02}", index + 1)
}

const WEEKDAYS_TABLE: [&str; 7] = ["sun", "mon", "tue", "wed", "thu", "fri", "sat"];

fn parse_weekday_num(weekday: &str) -> u32 {
    let prefix = weekday.get(..3).map(str::to_ascii_lowercase);
    let index = prefix
        .as_deref()
        .and_then(|p| WEEKDAYS_TABLE.iter().position(|w| *w == p))
        .unwrap_or_else(|| panic!("failed to parse weekday: {weekday}"));
    index as u32
}

bitflags::bitflags! {
    /// The weekdays a schedule clause applies to, Sunday through Saturday.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct WeekdaySet: u8 {
        const SUNDAY = 1 << 0;
        const MONDAY = 1 << 1;
        const TUESDAY = 1 << 2;
        const WEDNESDAY = 1 << 3;
        const THURSDAY = 1 << 4;
        const FRIDAY = 1 << 5;
        const SATURDAY = 1 << 6;
    }
}

impl WeekdaySet {
    /// The set containing only weekday number `day` (0 = Sunday).
    pub fn single(day: u32) -> WeekdaySet {
        WeekdaySet::from_bits_truncate(1u8 << day)
    }

    pub fn contains_day(self, day: u32) -> bool {
        self.intersects(Self::single(day))
    }
}

/// Month name to two-digit ISO month: `January` -> `"01"`.
pub fn month<'a>() -> impl Parser<'a, Out = String> {
    map_parser(re_parser(&MONTH_RE), |caps| parse_month_to_iso(&caps[1]))
}

/// Day of month to a zero-padded string: `1` -> `"01"`.
pub fn day_number<'a>() -> impl Parser<'a, Out = String> {
    map_parser(re_parser(&DAY_NUMBER_RE), |caps| format!("{:0>2}", &caps[1]))
}

/// Weekday name (optionally plural) to 0(Sun)-6(Sat).
pub fn weekday<'a>() -> impl Parser<'a, Out = u32> {
    map_parser(re_parser(&WEEKDAY_RE), |caps| parse_weekday_num(&caps[1]))
}

pub fn whitespace<'a>() -> impl Parser<'a, Out = ()> {
    map_parser(re_parser(regex!(r"\s+")), |_| ())
}

/// List separator: `", "`, `", and "`, `" and "`.
pub fn separator<'a>() -> impl Parser<'a, Out = ()> {
    map_parser(re_parser(regex!(r"(?i)\s*(?:,\s*(?:and)?|and)\s*")), |_| ())
}

fn optional_colon<'a>() -> impl Parser<'a, Out = ()> {
    map_parser(re_parser(regex!(r"\s*[,:]?\s*")), |_| ())
}

/// 12-hour clock time to minute of day. `"12am"` is 0 and `"12pm"` is 720 via
/// `(hour % 12) + (pm ? 12 : 0)`; the literal `noon` is 720.
pub fn time_to_minute<'a>() -> impl Parser<'a, Out = i32> {
    alt!(
        map_parser(re_parser(&TIME_RE), |caps| {
            let hour: i32 = caps[1].parse().unwrap();
            let minute: i32 = caps.get(2).map_or(0, |m| m.as_str().parse().unwrap());
            let pm = caps[3].starts_with(['p', 'P']);
            to_minute(hour % 12 + if pm { 12 } else { 0 }, minute)
        }),
        map_parser(re_parser(regex!(r"(?i)noon")), |_| to_minute(12, 0)),
    )
}

/// A parsed span of minutes within one day.
///
/// For the two-sided phrasings (`"X to Y"`, `"before X and after Y"`) the
/// span is the *excluded middle* (the track is closed between the bounds),
/// so `open` is false. `"all day"` is the single open 00:00-24:00 span.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeSpan {
    pub start_minute: i32,
    pub end_minute: i32,
    pub open: bool,
}

pub fn time_span<'a>() -> impl Parser<'a, Out = TimeSpan> {
    alt!(
        // "8:00 AM to 8:45 PM" / "from 8:00 AM to 8:45 PM"
        map_parser(
            pair(
                ap_second(re_parser(regex!(r"(?i)\s*(?:from\s+)?")), time_to_minute()),
                ap_second(re_parser(regex!(r"(?i)\s+to\s+")), ap_first(time_to_minute(), opt(whitespace()))),
            ),
            |(start_minute, end_minute)| TimeSpan { start_minute, end_minute, open: false },
        ),
        // "before 2 p.m. and after 6:45 p.m.": the track is available
        // outside the bracketed middle.
        map_parser(
            pair(
                ap_second(re_parser(regex!(r"(?i)\s*before\s+")), time_to_minute()),
                ap_second(re_parser(regex!(r"(?i)\s+and after\s+")), ap_first(time_to_minute(), opt(whitespace()))),
            ),
            |(start_minute, end_minute)| TimeSpan { start_minute, end_minute, open: false },
        ),
        // "all day"
        map_parser(re_parser(regex!(r"(?i)\s*all day\s*")), |_| TimeSpan {
            start_minute: 0,
            end_minute: to_minute(24, 0),
            open: true,
        }),
    )
}

/// A month-day range, months as ISO two-digit strings, days zero-padded.
/// Single dates collapse to `start == end`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateRange {
    pub start_month: String,
    pub end_month: String,
    pub start_day: String,
    pub end_day: String,
}

pub fn date_range<'a>() -> impl Parser<'a, Out = DateRange> {
    map_parser(re_parser(&DATE_RANGE_RE), |caps| {
        let start_month = parse_month_to_iso(&caps[1]);
        let end_month = caps.get(3).map_or_else(|| start_month.clone(), |m| parse_month_to_iso(m.as_str()));
        let start_day = format!("{:0>2}", &caps[2]);
        let end_day = caps.get(4).map_or_else(|| start_day.clone(), |d| format!("{:0>2}", d.as_str()));
        DateRange { start_month, end_month, start_day, end_day }
    })
}

/// `Friday, September 15` -> `"09-15"`.
pub fn long_date<'a>() -> impl Parser<'a, Out = String> {
    map_parser(
        triple(ap_first(weekday(), separator()), ap_first(month(), opt(whitespace())), day_number()),
        |(_weekday, month, day)| format!("{month}-{day}"),
    )
}

/// `"Tuesdays*, Wednesdays, Thursdays* and Fridays:"`. The asterisk marks a
/// day an exception clause will override; the list itself ignores it.
pub fn weekday_list<'a>() -> impl Parser<'a, Out = WeekdaySet> {
    map_parser(
        ap_first(sep_by1(ap_first(weekday(), opt(re_parser(regex!(r"\*")))), separator()), optional_colon()),
        |days| days.into_iter().fold(WeekdaySet::empty(), |set, d| set | WeekdaySet::single(d)),
    )
}

/// One `(weekday, effective month-day, new evening cutoff)` triple from a
/// parenthesized exception clause.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeekdayCutoff {
    pub weekday: u32,
    pub start_month: String,
    pub start_day: String,
    pub start_minute: i32,
}

fn on_weekday_cutoff<'a>() -> impl Parser<'a, Out = WeekdayCutoff> {
    map_parser(
        triple(
            ap_second(re_parser(regex!(r"(?i)\s*\*?On\s+")), weekday()),
            ap_second(re_parser(regex!(r"(?i)\s*beginning\s*")), date_range()),
            ap_second(re_parser(regex!(r"(?i)\s*,\s+the (?:cycling )?track will be open after\s*")), time_to_minute()),
        ),
        |(weekday, range, start_minute)| WeekdayCutoff {
            weekday,
            start_month: range.start_month,
            start_day: range.start_day,
            start_minute,
        },
    )
}

/// `(*On Tuesdays beginning March 12, the cycling track will be open after
/// 8:45 p.m. On Thursdays beginning March 14, the track will be open after
/// 8:45 p.m.)`
pub fn weekday_cutoffs<'a>() -> impl Parser<'a, Out = Vec<WeekdayCutoff>> {
    ap_second(
        re_parser(regex!(r"\s*\(\s*")),
        ap_first(sep_by1(on_weekday_cutoff(), re_parser(regex!(r"\s*\.?\s*"))), re_parser(regex!(r"\s*\)\s*"))),
    )
}
