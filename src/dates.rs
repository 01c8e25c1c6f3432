//! Temporal primitives: minute-of-day arithmetic, canonical date and
//! timestamp strings, and the day-iteration helper every interval-producing
//! rule is expanded through.
//!
//! Canonical forms are locale-stable chrono format strings: `short date` is
//! `yyyy-mm-dd` and `timestamp` is `yyyy-mm-dd HH:MM`. Malformed canonical
//! strings only ever come from a programming error, so the parse helpers
//! panic rather than propagate.

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime, Timelike};

/// Minute of day as `hour * 60 + minute`.
///
/// Hours outside 0-23 are a deliberate overflow convention: `to_minute(24, 0)`
/// is the end-of-day sentinel (1440) and `to_minute(24, -1)` addresses the
/// final minute of the day (1439, i.e. 23:59).
pub fn to_minute(hour: i32, minute: i32) -> i32 {
    hour * 60 + minute
}

pub fn parse_date(date: &str) -> NaiveDate {
    NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .unwrap_or_else(|e| panic!("invalid short date {date:?}: {e}"))
}

pub fn short_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// `"MM-DD"`, the year-free key used by dated exception clauses.
pub fn month_day(date: NaiveDate) -> String {
    date.format("%m-%d").to_string()
}

/// Weekday as 0 (Sunday) through 6 (Saturday).
pub fn weekday_num(date: NaiveDate) -> u32 {
    date.weekday().num_days_from_sunday()
}

pub fn format_time(date: &str, hour: i32, minute: i32) -> String {
    format!("{date} {hour:02}:{minute:02}")
}

pub fn start_of_day(date: &str) -> String {
    format_time(date, 0, 0)
}

pub fn end_of_day(date: &str) -> String {
    format_time(date, 23, 59)
}

/// Timestamp for `date` plus `minute` minutes past midnight. Minutes at or
/// beyond 1440 roll over into the following day.
pub fn format_date_minute(date: NaiveDate, minute: i32) -> String {
    let ts = date.and_time(NaiveTime::MIN) + Duration::minutes(i64::from(minute));
    ts.format("%Y-%m-%d %H:%M").to_string()
}

pub fn parse_timestamp(timestamp: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(timestamp, "%Y-%m-%d %H:%M")
        .unwrap_or_else(|e| panic!("invalid timestamp {timestamp:?}: {e}"))
}

/// Minute of day of a timestamp's time component.
pub fn timestamp_minutes(timestamp: &str) -> i32 {
    let ts = parse_timestamp(timestamp);
    to_minute(ts.hour() as i32, ts.minute() as i32)
}

/// True when `b` is exactly one minute after `a`, computed by timestamp
/// arithmetic so adjacency holds across day and month boundaries.
pub fn adjacent_timestamps(a: &str, b: &str) -> bool {
    parse_timestamp(a) + Duration::minutes(1) == parse_timestamp(b)
}

/// Clip a (possibly multi-day) interval start to one day: the time component
/// when the timestamp falls on `date`, otherwise `"00:00"`.
///
/// [`crate::intervals_for_date`] returns a known rule's intervals filtered,
/// not re-sliced; callers rendering a single day clamp each bound with this
/// pair of helpers.
pub fn clamp_start(date: &str, timestamp: &str) -> String {
    match timestamp.split_once(' ') {
        Some((ts_date, ts_time)) if ts_date == date => ts_time.to_string(),
        _ => "00:00".to_string(),
    }
}

/// Counterpart of [`clamp_start`] for interval ends; out-of-day ends clamp
/// to `"23:59"`.
pub fn clamp_end(date: &str, timestamp: &str) -> String {
    match timestamp.split_once(' ') {
        Some((ts_date, ts_time)) if ts_date == date => ts_time.to_string(),
        _ => "23:59".to_string(),
    }
}

/// Call `f` once per calendar day from `start_date` through `end_date`
/// inclusive, concatenating the per-day lists. This is how a single textual
/// rule spanning months becomes per-day intervals.
pub fn daily<T>(start_date: &str, end_date: &str, mut f: impl FnMut(NaiveDate) -> Vec<T>) -> Vec<T> {
    let end = parse_date(end_date);
    let mut date = parse_date(start_date);
    let mut result = Vec::new();
    while date <= end {
        result.extend(f(date));
        let Some(next) = date.succ_opt() else { break };
        date = next;
    }
    result
}
