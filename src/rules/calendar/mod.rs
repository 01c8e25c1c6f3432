//! Day-by-day calendar listing recognition.
//!
//! Each published day carries a handful of entries, every one a heading plus a
//! subheader line. `grammar` parses the headings and subheaders; `evaluate`
//! orders the parsed entries, fills the gaps between them, and compiles the
//! result into the same interval model the narrative recognizers produce.

pub mod evaluate;
pub mod grammar;

pub use evaluate::{
    CalendarDate, CalendarEntry, CalendarYear, FieldRainoutInfo, ParsedEntry, format_rules, get_intervals,
    parse_and_reorder_entries, recognize_calendar_date, recognize_calendar_years,
};
