//! Construction and normalization of [`RuleInterval`] lists.
//!
//! The shape every day-level producer emits: a closed (or open) span in the
//! middle of the day is always bracketed by inverse-status spans so the day
//! is covered from 00:00 through 23:59 with no gaps. Run-length compression
//! of adjacent same-status spans is the final normalization invariant, not
//! an optimization: consumers rely on one interval per contiguous state.

use chrono::NaiveDate;

use crate::RuleInterval;
use crate::dates::{adjacent_timestamps, end_of_day, format_date_minute, start_of_day, to_minute};

/// A single interval covering all of `date`.
pub fn date_interval(date: NaiveDate, open: bool, comment: Option<String>) -> RuleInterval {
    RuleInterval {
        open,
        start_timestamp: format_date_minute(date, 0),
        end_timestamp: format_date_minute(date, to_minute(24, -1)),
        comment,
    }
}

/// A single interval covering every day from `start_date` through `end_date`.
pub fn day_interval(start_date: &str, end_date: &str, open: bool, comment: Option<String>) -> RuleInterval {
    RuleInterval {
        open,
        start_timestamp: start_of_day(start_date),
        end_timestamp: end_of_day(end_date),
        comment,
    }
}

/// Cover `date` with a `[start_minute, end_minute)` span of status `open`
/// (carrying `comment`), bracketed by inverse-status spans so the whole day
/// is covered. `end_minute` is exclusive, so a span ending at
/// `to_minute(24, 0)` produces no trailing bracket.
pub fn minute_intervals(
    date: NaiveDate,
    start_minute: i32,
    end_minute: i32,
    open: bool,
    comment: Option<String>,
) -> Vec<RuleInterval> {
    let mut result = Vec::with_capacity(3);
    if start_minute > 0 {
        result.push(RuleInterval {
            open: !open,
            start_timestamp: format_date_minute(date, 0),
            end_timestamp: format_date_minute(date, start_minute - 1),
            comment: None,
        });
    }
    result.push(RuleInterval {
        open,
        start_timestamp: format_date_minute(date, start_minute),
        end_timestamp: format_date_minute(date, end_minute - 1),
        comment,
    });
    if end_minute < to_minute(24, 0) {
        result.push(RuleInterval {
            open: !open,
            start_timestamp: format_date_minute(date, end_minute),
            end_timestamp: format_date_minute(date, to_minute(24, -1)),
            comment: None,
        });
    }
    result
}

pub fn closed_minute_intervals(
    date: NaiveDate,
    start_minute: i32,
    end_minute: i32,
    comment: Option<String>,
) -> Vec<RuleInterval> {
    minute_intervals(date, start_minute, end_minute, false, comment)
}

pub fn closed_hour_intervals(date: NaiveDate, start_hour: i32, end_hour: i32, comment: Option<String>) -> Vec<RuleInterval> {
    closed_minute_intervals(date, to_minute(start_hour, 0), to_minute(end_hour, 0), comment)
}

/// Merge adjacent intervals with identical status and comment whose bounds
/// are exactly one minute apart. Adjacency is decided by timestamp
/// arithmetic, so merges span formatted day boundaries. Idempotent.
pub fn compress_intervals(intervals: Vec<RuleInterval>) -> Vec<RuleInterval> {
    let mut result: Vec<RuleInterval> = Vec::with_capacity(intervals.len());
    for v in intervals {
        match result.last_mut() {
            Some(prev)
                if prev.open == v.open
                    && prev.comment == v.comment
                    && adjacent_timestamps(&prev.end_timestamp, &v.start_timestamp) =>
            {
                prev.end_timestamp = v.end_timestamp;
            }
            _ => result.push(v),
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dates::{daily, parse_date};

    #[test]
    fn minute_intervals_bracket_the_day() {
        let date = parse_date("2023-09-15");
        let r = closed_minute_intervals(date, to_minute(7, 30), to_minute(12, 30), Some("Walkathon".into()));
        assert_eq!(
            r,
            vec![
                RuleInterval {
                    open: true,
                    start_timestamp: "2023-09-15 00:00".into(),
                    end_timestamp: "2023-09-15 07:29".into(),
                    comment: None,
                },
                RuleInterval {
                    open: false,
                    start_timestamp: "2023-09-15 07:30".into(),
                    end_timestamp: "2023-09-15 12:29".into(),
                    comment: Some("Walkathon".into()),
                },
                RuleInterval {
                    open: true,
                    start_timestamp: "2023-09-15 12:30".into(),
                    end_timestamp: "2023-09-15 23:59".into(),
                    comment: None,
                },
            ]
        );
    }

    #[test]
    fn minute_intervals_omit_empty_brackets() {
        let date = parse_date("2023-09-29");
        let r = closed_minute_intervals(date, 0, to_minute(24, 0), Some("Hardly Strictly Bluegrass".into()));
        assert_eq!(r.len(), 1);
        assert_eq!(r[0].start_timestamp, "2023-09-29 00:00");
        assert_eq!(r[0].end_timestamp, "2023-09-29 23:59");
        assert!(!r[0].open);
    }

    #[test]
    fn compression_merges_across_day_boundaries() {
        let intervals = daily("2024-06-01", "2024-06-03", |d| vec![date_interval(d, true, None)]);
        assert_eq!(intervals.len(), 3);
        let compressed = compress_intervals(intervals);
        assert_eq!(
            compressed,
            vec![RuleInterval {
                open: true,
                start_timestamp: "2024-06-01 00:00".into(),
                end_timestamp: "2024-06-03 23:59".into(),
                comment: None,
            }]
        );
    }

    #[test]
    fn compression_respects_status_and_comment() {
        let date = parse_date("2025-11-27");
        let mut intervals = closed_minute_intervals(date, to_minute(5, 0), to_minute(7, 0), Some("Turkey Trot".into()));
        intervals.extend(closed_minute_intervals(date.succ_opt().unwrap(), 0, to_minute(7, 0), None));
        let compressed = compress_intervals(intervals);
        // The comment-bearing closure and the next day's plain closure stay
        // separate even though the trailing open spans merge candidates exist.
        assert!(compressed.windows(2).all(|w| w[0] != w[1]));
        assert!(compressed.iter().any(|i| i.comment.as_deref() == Some("Turkey Trot")));
    }

    #[test]
    fn compression_is_idempotent() {
        let intervals = daily("2024-01-01", "2024-01-05", |d| {
            closed_minute_intervals(d, to_minute(14, 0), to_minute(18, 45), None)
        });
        let once = compress_intervals(intervals);
        let twice = compress_intervals(once.clone());
        assert_eq!(once, twice);
    }
}
