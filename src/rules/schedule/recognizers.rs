//! The ordered recognizer registry for narrative schedule postings.
//!
//! First match wins, so the registry runs specific whole-text patterns before
//! the three stateful seasonal scanners. A block no recognizer claims stays
//! unknown.

use regex::{Captures, Regex};

use crate::dates::{daily, parse_date};
use crate::intervals::{closed_hour_intervals, day_interval};
use crate::parser::{Parser, Stream, end_parsed, map_parser, re_parser};
use crate::rules::schedule::steps::{
    DateRuleStep, exception_prelude, fall_exception, partial_closures, reduce_predicates, spring_exception,
    weekday_times, weekend_except, weekend_times, weekend_tournament,
};
use crate::{KnownRules, Recognizer, RuleInterval, UnknownRules};

/// The registry, in priority order.
pub fn get() -> Vec<Recognizer> {
    vec![
        open_all_day_every_day(),
        closed_for_outside_lands(),
        closed_for_one_event(),
        open_after(),
        Recognizer::new("march_may", Box::new(march_may)),
        Recognizer::new("jan_feb", Box::new(jan_feb)),
        Recognizer::new("fall", Box::new(fall)),
    ]
}

/// A whole-text pattern over the joined body lines plus a template producing
/// the rule's intervals.
fn regex_recognizer(
    name: &'static str,
    re: &'static Regex,
    template: impl Fn(&UnknownRules, &Captures) -> Option<Vec<RuleInterval>> + Send + Sync + 'static,
) -> Recognizer {
    Recognizer::new(
        name,
        Box::new(move |rule| {
            let joined = rule.rules.join(" ");
            let caps = re.captures(&joined)?;
            Some(KnownRules::from_unknown(rule, template(rule, &caps)?))
        }),
    )
}

fn open_all_day_every_day() -> Recognizer {
    regex_recognizer(
        "open_all_day_every_day",
        regex!(
            r"(?i)^(?:The Cycle Track will remain open - Polo Fields? Closed|The Cycle Track Will be Open Mondays through Sundays all day)$"
        ),
        |rule, _| Some(vec![day_interval(&rule.start_date, &rule.end_date, true, None)]),
    )
}

fn closed_for_outside_lands() -> Recognizer {
    regex_recognizer(
        "closed_for_outside_lands",
        regex!(
            r"(?i)^The Cycle Track will be closed for Outside Lands Load in, Event and Load Out(?: and Polo Fields Concert Event and Load Out)?$"
        ),
        |rule, _| {
            Some(vec![day_interval(
                &rule.start_date,
                &rule.end_date,
                false,
                Some("Outside Lands".to_string()),
            )])
        },
    )
}

fn is_pm(ampm: Option<regex::Match<'_>>) -> i32 {
    if ampm.is_some_and(|m| m.as_str().eq_ignore_ascii_case("p")) { 12 } else { 0 }
}

fn closed_for_one_event() -> Recognizer {
    regex_recognizer(
        "closed_for_one_event",
        regex!(
            r"(?i)^The Cycle Track (?:will be )?Closed for (?<comment>(?:\w+ )+)from (?<start>\d+) (?:(?<startampm>[ap])\.m\. )?to (?<end>\d+) (?<ampm>[ap])\.m\.$"
        ),
        |rule, caps| {
            let ampm_start = is_pm(caps.name("startampm").or_else(|| caps.name("ampm")));
            let ampm_end = is_pm(caps.name("ampm"));
            let start_hour = caps["start"].parse::<i32>().ok()? % 12 + ampm_start;
            let end_hour = caps["end"].parse::<i32>().ok()? + ampm_end;
            let comment = caps["comment"].trim().to_string();
            Some(daily(&rule.start_date, &rule.end_date, |date| {
                closed_hour_intervals(date, start_hour, end_hour, Some(comment.clone()))
            }))
        },
    )
}

fn open_after() -> Recognizer {
    regex_recognizer(
        "open_after",
        regex!(r"(?i)^The Cycle Track will be open after (?<start>\d+) (?<startampm>[ap])\.m\.$"),
        |rule, caps| {
            let start_hour = caps["start"].parse::<i32>().ok()? % 12 + is_pm(caps.name("startampm"));
            Some(daily(&rule.start_date, &rule.end_date, |date| {
                closed_hour_intervals(date, 0, start_hour, None)
            }))
        },
    )
}

// --- Stateful seasonal scanners ---------------------------------------------

/// Line-scanner state for the three seasonal recognizers. Any line matching
/// none of a state's grammars aborts the whole recognizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScanState {
    Prelude,
    Rules,
    Exception,
}

fn run<'a, P: Parser<'a>>(p: &P, line: &'a str) -> Option<P::Out> {
    p.parse(Stream::new(line)).map(|parsed| parsed.value)
}

fn to_known(rule: &UnknownRules, predicates: Vec<DateRuleStep>) -> Option<KnownRules> {
    let evaluate = reduce_predicates(predicates);
    Some(KnownRules::from_unknown(
        rule,
        daily(&rule.start_date, &rule.end_date, |date| evaluate(date)),
    ))
}

/// `"The Cycle Track will remain open - Polo Field Closed"` followed by
/// `EXCEPT:` and a short list of one-off winter closures (asphalt repairs,
/// sports tournaments).
fn jan_feb(rule: &UnknownRules) -> Option<KnownRules> {
    if rule.rules.is_empty() {
        return None;
    }
    let prelude = end_parsed(re_parser(regex!(r"(?i)The Cycle Track will remain open - Polo Fields? Closed\s*")));
    let exception = alt!(partial_closures(), weekend_tournament());
    let mut state = ScanState::Prelude;
    let mut predicates: Vec<DateRuleStep> = Vec::new();
    for line in &rule.rules {
        match state {
            ScanState::Prelude => {
                run(&prelude, line)?;
                state = ScanState::Rules;
            }
            ScanState::Rules => {
                run(&exception_prelude(), line)?;
                state = ScanState::Exception;
            }
            ScanState::Exception => match run(&exception, line) {
                Some(step) => predicates.push(step),
                None => {
                    tracing::debug!(state = ?state, line, "unmatched jan/feb line");
                    return None;
                }
            },
        }
    }
    to_known(rule, predicates)
}

/// `"<Programs> Begin. The Cycle Track Will be Open:"` followed by weekday
/// clauses and spring exception lines (Sunday overrides, Bay to Breakers).
fn march_may(rule: &UnknownRules) -> Option<KnownRules> {
    if rule.rules.is_empty() {
        return None;
    }
    let prelude = map_parser(re_parser(regex!(r"(?i)(.*?)Begin\. The Cycle Track Will be Open:\s*")), |m| {
        m[1].trim().to_string()
    });
    let start_date = parse_date(&rule.start_date);
    let end_date = parse_date(&rule.end_date);
    let mut comment: Option<String> = None;
    let mut state = ScanState::Prelude;
    let mut predicates: Vec<DateRuleStep> = Vec::new();
    for line in &rule.rules {
        match state {
            ScanState::Prelude => {
                comment = Some(run(&prelude, line)?);
                state = ScanState::Rules;
            }
            ScanState::Rules => {
                if let Some(step) = run(&weekday_times(start_date, end_date, comment.as_deref()), line) {
                    predicates.push(step);
                } else if run(&exception_prelude(), line).is_some() {
                    state = ScanState::Exception;
                } else {
                    tracing::debug!(state = ?state, line, "unmatched march/may line");
                    return None;
                }
            }
            ScanState::Exception => match run(&spring_exception(), line) {
                // Exceptions outrank the base weekday clauses.
                Some(step) => predicates.insert(0, step),
                None => {
                    tracing::debug!(state = ?state, line, "unmatched march/may line");
                    return None;
                }
            },
        }
    }
    to_known(rule, predicates)
}

/// `"Fall <Programs> begin. The Cycle Track Will be Open:"` followed by
/// weekday and weekend clauses and fall exception lines (walkathons,
/// Hardly Strictly Bluegrass, weekend override blocks).
fn fall(rule: &UnknownRules) -> Option<KnownRules> {
    if rule.rules.is_empty() {
        return None;
    }
    let prelude = map_parser(re_parser(regex!(r"(?i)Fall (.+?)\s*begin\. The Cycle Track Will be Open:")), |m| {
        m[1].trim().to_string()
    });
    let start_date = parse_date(&rule.start_date);
    let end_date = parse_date(&rule.end_date);
    let mut comment: Option<String> = None;
    let mut state = ScanState::Prelude;
    let mut predicates: Vec<DateRuleStep> = Vec::new();
    for line in &rule.rules {
        match state {
            ScanState::Prelude => {
                comment = Some(run(&prelude, line)?);
                state = ScanState::Rules;
            }
            ScanState::Rules => {
                let clause = alt!(
                    weekday_times(start_date, end_date, comment.as_deref()),
                    weekend_times(comment.as_deref()),
                );
                if let Some(step) = run(&clause, line) {
                    predicates.push(step);
                } else if run(&exception_prelude(), line).is_some() {
                    state = ScanState::Exception;
                } else {
                    tracing::debug!(state = ?state, line, "unmatched fall line");
                    return None;
                }
            }
            ScanState::Exception => {
                if let Some(step) = run(&fall_exception(), line) {
                    predicates.insert(0, step);
                } else if let Some(step) = run(&weekend_except(comment.as_deref()), line) {
                    predicates.push(step);
                } else {
                    tracing::debug!(state = ?state, line, "unmatched fall line");
                    return None;
                }
            }
        }
    }
    to_known(rule, predicates)
}
