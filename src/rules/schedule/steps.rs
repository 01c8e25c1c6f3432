//! Clause semantics for the narrative grammar: parsers that yield
//! date-conditioned predicates instead of plain data.
//!
//! A [`DateRuleStep`] answers "does this clause apply to this date, and if so
//! what does the day look like"; an [`ExceptionRuleStep`] gets a chance to
//! rewrite a base clause's intervals before they are accepted. Predicates are
//! reduced first-applicable-wins, with exceptions checked before base rules
//! and an open-all-day fallback when nothing applies.

use chrono::{Datelike, NaiveDate};

use crate::RuleInterval;
use crate::dates::{month_day, short_date, timestamp_minutes, weekday_num};
use crate::intervals::{closed_minute_intervals, date_interval, day_interval, minute_intervals};
use crate::parser::{Parser, ap_first, ap_second, end_parsed, many1, map_parser, opt, pair, re_parser, sep_by1, seq4, triple};
use crate::rules::schedule::grammar::{
    DateRange, WeekdayCutoff, date_range, long_date, separator, time_span, weekday, weekday_cutoffs, weekday_list,
};

/// One schedule clause: yields the day's intervals when it applies.
pub type DateRuleStep = Box<dyn Fn(NaiveDate) -> Option<Vec<RuleInterval>>>;

/// An `EXCEPT`-style override: may replace the intervals a base clause
/// produced for a date.
pub type ExceptionRuleStep = Box<dyn Fn(NaiveDate, &[RuleInterval]) -> Option<Vec<RuleInterval>>>;

/// First applicable predicate wins; a date no predicate claims is open all
/// day.
pub fn reduce_predicates(predicates: Vec<DateRuleStep>) -> impl Fn(NaiveDate) -> Vec<RuleInterval> {
    move |date| {
        predicates
            .iter()
            .find_map(|p| p(date))
            .unwrap_or_else(|| vec![date_interval(date, true, None)])
    }
}

fn reduce_exceptions(exceptions: Vec<ExceptionRuleStep>) -> impl Fn(NaiveDate, Vec<RuleInterval>) -> Vec<RuleInterval> {
    move |date, intervals| {
        exceptions
            .iter()
            .find_map(|f| f(date, &intervals))
            .unwrap_or(intervals)
    }
}

fn year_month_day(date: NaiveDate, month: &str, day: &str) -> String {
    format!("{}-{month}-{day}", date.year())
}

fn after_date_range_start(date: NaiveDate, start_month: &str, start_day: &str) -> bool {
    short_date(date) >= year_month_day(date, start_month, start_day)
}

fn is_date_in_range(date: NaiveDate, range: &DateRange) -> bool {
    let fmt = short_date(date);
    fmt >= year_month_day(date, &range.start_month, &range.start_day)
        && fmt <= year_month_day(date, &range.end_month, &range.end_day)
}

/// The bare `EXCEPT:` marker line that switches a recognizer into its
/// exception block.
pub fn exception_prelude<'a>() -> impl Parser<'a, Out = ()> {
    map_parser(end_parsed(re_parser(regex!(r"\s*EXCEPT:\s*"))), |_| ())
}

/// `"Friday, September 15 when track is closed from 7:30 a.m. to 12:30 p.m.
/// for Sacred Heart Walkathon"`: one or more long dates, a closure span and
/// a trailing event name.
pub fn fall_exception<'a>() -> impl Parser<'a, Out = DateRuleStep> {
    map_parser(
        end_parsed(triple(
            sep_by1(long_date(), separator()),
            ap_second(re_parser(regex!(r"(?i)\s*when track is closed\s*")), time_span()),
            map_parser(re_parser(regex!(r"(?i)\s*for\s+(.*)")), |m| m[1].to_string()),
        )),
        |(month_days, span, comment)| -> DateRuleStep {
            Box::new(move |date| {
                month_days
                    .contains(&month_day(date))
                    .then(|| closed_minute_intervals(date, span.start_minute, span.end_minute, Some(comment.clone())))
            })
        },
    )
}

/// `"Sundays, from March 3 thru May 12, when track will be open before
/// 10 a.m. and after 6:45 p.m."`, optionally tagged as the Bay to Breakers
/// field closure.
pub fn spring_exception<'a>() -> impl Parser<'a, Out = DateRuleStep> {
    map_parser(
        end_parsed(seq4(
            weekday(),
            ap_second(re_parser(regex!(r"(?i)\s*(?:,\s*)?(?:from\s+)?")), date_range()),
            ap_second(re_parser(regex!(r"(?i)\s*(?:,\s*)?when track will be open\s*")), time_span()),
            opt(map_parser(
                re_parser(regex!(r"(?i)\s*with the field closed due to the Bay to Breakers event\.?\s*")),
                |_| "Bay to Breakers",
            )),
        )),
        |(day, range, span, comment)| -> DateRuleStep {
            let comment = comment.unwrap_or("Youth and Adult Sports Programs");
            Box::new(move |date| {
                (weekday_num(date) == day && is_date_in_range(date, &range)).then(|| {
                    minute_intervals(date, span.start_minute, span.end_minute, span.open, Some(comment.to_string()))
                })
            })
        },
    )
}

fn compile_weekday_cutoff(cutoff: WeekdayCutoff) -> ExceptionRuleStep {
    Box::new(move |date, intervals| {
        if weekday_num(date) != cutoff.weekday || !after_date_range_start(date, &cutoff.start_month, &cutoff.start_day) {
            return None;
        }
        if intervals.len() != 3 {
            panic!("Expecting 3 intervals");
        }
        let Some(comment) = intervals[1].comment.clone() else {
            panic!("Missing comment");
        };
        Some(closed_minute_intervals(
            date,
            timestamp_minutes(&intervals[1].start_timestamp),
            cutoff.start_minute,
            Some(comment),
        ))
    })
}

/// `"Tuesdays*, Wednesdays, Thursdays* and Fridays before 2 p.m. and after
/// 6:45 p.m. (*On Tuesdays beginning March 12 ...)"`: a weekday list, a
/// time span and optional per-weekday cutoff overrides, bounded by the
/// owning rule's date range.
pub fn weekday_times<'a>(start_date: NaiveDate, end_date: NaiveDate, comment: Option<&str>) -> impl Parser<'a, Out = DateRuleStep> {
    let comment = comment.map(str::to_string);
    map_parser(
        end_parsed(triple(weekday_list(), time_span(), opt(weekday_cutoffs()))),
        move |(days, span, cutoffs)| -> DateRuleStep {
            let comment = comment.clone();
            let exceptions = reduce_exceptions(cutoffs.unwrap_or_default().into_iter().map(compile_weekday_cutoff).collect());
            Box::new(move |date| {
                if date < start_date || date > end_date || !days.contains_day(weekday_num(date)) {
                    return None;
                }
                let intervals = minute_intervals(
                    date,
                    span.start_minute,
                    span.end_minute,
                    span.open,
                    if span.open { None } else { comment.clone() },
                );
                Some(exceptions(date, intervals))
            })
        },
    )
}

/// `"- Saturdays and Sundays all day EXCEPT on July 8 (closed 7:30 AM to
/// 5:30 PM) and July 9 (closed 7:30 AM to 4:30 PM)"`. Applies only on
/// weekends; weekend days outside every exception range are open all day.
pub fn weekend_times<'a>(comment: Option<&str>) -> impl Parser<'a, Out = DateRuleStep> {
    let comment = comment.map(str::to_string);
    let closure = pair(
        ap_first(date_range(), re_parser(regex!(r"(?i)\s*\(closed\s*"))),
        ap_first(time_span(), re_parser(regex!(r"(?i)\s*\)\s*(?:and\s)?"))),
    );
    map_parser(
        ap_second(
            re_parser(regex!(r"(?i)- Saturdays and Sundays all day EXCEPT on ")),
            end_parsed(many1(closure)),
        ),
        move |exceptions| -> DateRuleStep {
            let comment = comment.clone();
            Box::new(move |date| {
                let day = weekday_num(date);
                if day != 0 && day != 6 {
                    return None;
                }
                for (range, span) in &exceptions {
                    if is_date_in_range(date, range) {
                        return Some(closed_minute_intervals(date, span.start_minute, span.end_minute, comment.clone()));
                    }
                }
                Some(vec![date_interval(date, true, None)])
            })
        },
    )
}

/// `"Saturdays and Sundays before 7 a.m. and after 6:15 p.m. EXCEPT:"`, a
/// weekend base clause whose own exception lines follow on later lines.
pub fn weekend_except<'a>(comment: Option<&str>) -> impl Parser<'a, Out = DateRuleStep> {
    let comment = comment.map(str::to_string);
    map_parser(
        ap_second(
            re_parser(regex!(r"(?i)(?:- )?Saturdays and Sundays\s+")),
            ap_first(time_span(), exception_prelude()),
        ),
        move |span| -> DateRuleStep {
            let comment = comment.clone();
            Box::new(move |date| {
                let day = weekday_num(date);
                if day != 0 && day != 6 {
                    return None;
                }
                Some(closed_minute_intervals(date, span.start_minute, span.end_minute, comment.clone()))
            })
        },
    )
}

/// `"Monday, January 22 and Tuesday, January 23 - Partial closures of the
/// track in the morning for asphalt repairs."`: the named days stay open
/// all day, annotated with the closure note.
pub fn partial_closures<'a>() -> impl Parser<'a, Out = DateRuleStep> {
    map_parser(
        pair(
            pair(long_date(), ap_second(re_parser(regex!(r"(?i)\s*and\s*")), long_date())),
            map_parser(re_parser(regex!(r"(?i)\s*-\s* (Partial closures.*)\.")), |m| m[1].to_string()),
        ),
        |((first, second), comment)| -> DateRuleStep {
            Box::new(move |date| {
                let fmt = short_date(date);
                (fmt.ends_with(&first) || fmt.ends_with(&second))
                    .then(|| vec![day_interval(&fmt, &fmt, true, Some(comment.clone()))])
            })
        },
    )
}

/// `"Saturday, February 24 from 7:45 a.m. to 4:45 p.m. and Sunday, February
/// from 7:45 a.m. to 3:45 p.m. when track will be closed for a sports
/// tournament."`. The source once dropped the day number from the second
/// date, so a literal `Sunday, February` fallback pins it to 02-25.
pub fn weekend_tournament<'a>() -> impl Parser<'a, Out = DateRuleStep> {
    let tournament_date = alt!(
        long_date(),
        map_parser(re_parser(regex!(r"(?i)Sunday, February( 25)?")), |_| "02-25".to_string()),
    );
    map_parser(
        pair(
            sep_by1(pair(tournament_date, time_span()), re_parser(regex!(r"(?i)\s*and\s*"))),
            map_parser(
                re_parser(regex!(r"(?i)\s*when track will be closed for a sports tournament\.")),
                |_| "Sports Tournament",
            ),
        ),
        |(date_times, comment)| -> DateRuleStep {
            Box::new(move |date| {
                let fmt = short_date(date);
                date_times.iter().find(|(d, _)| fmt.ends_with(d)).map(|(_, span)| {
                    closed_minute_intervals(date, span.start_minute, span.end_minute, Some(comment.to_string()))
                })
            })
        },
    )
}
