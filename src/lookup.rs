//! Date-keyed queries over a multi-year [`ScrapeResult`](crate::ScrapeResult).

use crate::{KnownRules, RuleInterval, ScheduleRule, UnknownRules, Year};

/// What a single date's lookup found: compiled intervals clipped to the date,
/// or the unrecognized block covering it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DayRules {
    Known { intervals: Vec<RuleInterval>, rule: KnownRules },
    Unknown { rule: UnknownRules },
}

const JANUARY_ASSUMPTION: &str = "[polofield.bike assumption] PF is historically open all January";

/// Find the rule covering `date` (ISO `yyyy-mm-dd`) and, for known rules, the
/// intervals that touch it.
///
/// January of the year after the newest scraped year is answered with a
/// synthetic all-open rule: next year's schedule is typically not posted yet,
/// and the track has been open every January on record.
pub fn intervals_for_date(result: &[Year], date: &str) -> Option<DayRules> {
    let mut max_year = i32::MIN;
    for year in result {
        max_year = max_year.max(year.year);
        for rule in &year.rules {
            if !(rule.start_date() <= date && date <= rule.end_date()) {
                continue;
            }
            return Some(match rule {
                ScheduleRule::Known(known) => DayRules::Known {
                    intervals: known
                        .intervals
                        .iter()
                        .filter(|i| &i.start_timestamp[..10] <= date && date <= &i.end_timestamp[..10])
                        .cloned()
                        .collect(),
                    rule: known.clone(),
                },
                ScheduleRule::Unknown(unknown) => DayRules::Unknown { rule: unknown.clone() },
            });
        }
    }
    january_fallback(max_year, date)
}

/// The synthetic open-all-January rule for the first unscraped year.
fn january_fallback(max_year: i32, date: &str) -> Option<DayRules> {
    let year: i32 = date[..4].parse().ok()?;
    if max_year == i32::MIN || year != max_year + 1 || &date[5..7] != "01" {
        return None;
    }
    tracing::debug!(date, "answering from the January assumption");
    let interval = RuleInterval {
        open: true,
        start_timestamp: format!("{year}-01-01 00:00"),
        end_timestamp: format!("{year}-01-31 23:59"),
        comment: None,
    };
    Some(DayRules::Known {
        intervals: vec![interval.clone()],
        rule: KnownRules {
            text: format!("January {year}"),
            start_date: format!("{year}-01-01"),
            end_date: format!("{year}-01-31"),
            rules: vec![JANUARY_ASSUMPTION.to_string()],
            intervals: vec![interval],
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dates::{clamp_end, clamp_start};
    use crate::{RuleBlock, ScrapeResult, recognize};

    fn scraped() -> ScrapeResult {
        let open = recognize(&RuleBlock {
            text: "June".to_string(),
            start_date: "2023-06-01".to_string(),
            end_date: "2023-06-30".to_string(),
            rules: vec!["The Cycle Track Will be Open Mondays through Sundays all day".to_string()],
        });
        let unknown = ScheduleRule::Unknown(UnknownRules {
            text: "July".to_string(),
            start_date: "2023-07-01".to_string(),
            end_date: "2023-07-31".to_string(),
            rules: vec!["Schedule pending".to_string()],
        });
        vec![Year { year: 2023, rules: vec![open, unknown] }]
    }

    #[test]
    fn finds_known_rule_and_clips_to_date() {
        let result = scraped();
        match intervals_for_date(&result, "2023-06-15") {
            Some(DayRules::Known { intervals, rule }) => {
                assert_eq!(rule.start_date, "2023-06-01");
                assert_eq!(intervals.len(), 1);
                // The month-long interval renders clipped to the queried day.
                assert_eq!(clamp_start("2023-06-15", &intervals[0].start_timestamp), "00:00");
                assert_eq!(clamp_end("2023-06-15", &intervals[0].end_timestamp), "23:59");
            }
            other => panic!("expected known rules, got {other:?}"),
        }
    }

    #[test]
    fn passes_unknown_rule_through() {
        match intervals_for_date(&scraped(), "2023-07-04") {
            Some(DayRules::Unknown { rule }) => assert_eq!(rule.rules, vec!["Schedule pending"]),
            other => panic!("expected unknown rules, got {other:?}"),
        }
    }

    #[test]
    fn uncovered_date_yields_nothing() {
        assert_eq!(intervals_for_date(&scraped(), "2023-08-01"), None);
        assert_eq!(intervals_for_date(&[], "2023-08-01"), None);
    }

    #[test]
    fn january_after_newest_year_is_assumed_open() {
        for date in ["2024-01-01", "2024-01-02", "2024-01-31"] {
            match intervals_for_date(&scraped(), date) {
                Some(DayRules::Known { intervals, rule }) => {
                    assert_eq!(rule.text, "January 2024");
                    assert_eq!(rule.rules, vec![JANUARY_ASSUMPTION]);
                    assert_eq!(intervals.len(), 1);
                    assert!(intervals[0].open);
                    assert_eq!(intervals[0].start_timestamp, "2024-01-01 00:00");
                    assert_eq!(intervals[0].end_timestamp, "2024-01-31 23:59");
                }
                other => panic!("expected the January assumption for {date}, got {other:?}"),
            }
        }
    }

    #[test]
    fn january_assumption_is_bounded() {
        // Not January, and not the year right after the newest scraped year.
        assert_eq!(intervals_for_date(&scraped(), "2024-02-01"), None);
        assert_eq!(intervals_for_date(&scraped(), "2025-01-01"), None);
    }
}
