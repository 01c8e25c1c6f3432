extern crate self as polofield;

#[macro_use]
mod macros;

mod api;

pub mod dates;
pub mod intervals;
pub mod lookup;
pub mod parser;
pub mod rules;

pub use api::{RuleBlock, YearInput, recognize, recognize_with, recognize_years};
pub use lookup::{DayRules, intervals_for_date};

// --- Shared data model ------------------------------------------------------

/// One minute-exact open/closed span.
///
/// Timestamps are canonical `"yyyy-mm-dd HH:MM"` strings and are inclusive on
/// both ends: an interval ending at `23:59` abuts one starting at `00:00` the
/// next day. Within a single day's interval set the spans are contiguous and
/// non-overlapping, and adjacent spans with the same `open`/`comment` are
/// merged (see [`intervals::compress_intervals`]).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleInterval {
    pub open: bool,
    pub start_timestamp: String,
    pub end_timestamp: String,
    pub comment: Option<String>,
}

/// A schedule block no recognizer has matched (yet).
///
/// `start_date`/`end_date` are ISO `yyyy-mm-dd` dates derived from the block's
/// heading by the external extractor; `rules` holds the cleaned body lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownRules {
    /// Raw heading text the date range was derived from.
    pub text: String,
    pub start_date: String,
    pub end_date: String,
    pub rules: Vec<String>,
}

/// An [`UnknownRules`] block a recognizer compiled into intervals.
///
/// Only ever produced by a successful [`Recognizer`]; the intervals cover
/// every day in `[start_date, end_date]` with no gaps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KnownRules {
    pub text: String,
    pub start_date: String,
    pub end_date: String,
    pub rules: Vec<String>,
    pub intervals: Vec<RuleInterval>,
}

impl KnownRules {
    pub fn from_unknown(rule: &UnknownRules, intervals: Vec<RuleInterval>) -> Self {
        KnownRules {
            text: rule.text.clone(),
            start_date: rule.start_date.clone(),
            end_date: rule.end_date.clone(),
            rules: rule.rules.clone(),
            intervals: intervals::compress_intervals(intervals),
        }
    }
}

/// Outcome of recognition for one schedule block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScheduleRule {
    Unknown(UnknownRules),
    Known(KnownRules),
}

impl ScheduleRule {
    pub fn start_date(&self) -> &str {
        match self {
            ScheduleRule::Unknown(r) => &r.start_date,
            ScheduleRule::Known(r) => &r.start_date,
        }
    }

    pub fn end_date(&self) -> &str {
        match self {
            ScheduleRule::Unknown(r) => &r.end_date,
            ScheduleRule::Known(r) => &r.end_date,
        }
    }

    /// True when no recognizer matched this block.
    pub fn is_unknown(&self) -> bool {
        matches!(self, ScheduleRule::Unknown(_))
    }
}

/// One calendar year of recognized (or passed-through) schedule blocks,
/// ordered by ascending `start_date` and expected non-overlapping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Year {
    pub year: i32,
    pub rules: Vec<ScheduleRule>,
}

/// The full multi-year output consumed by renderers, feeds and caches.
pub type ScrapeResult = Vec<Year>;

// --- Recognizer -------------------------------------------------------------

pub type RecognizeFn = Box<dyn Fn(&UnknownRules) -> Option<KnownRules> + Send + Sync>;

/// A named pattern matcher turning raw schedule text into compiled intervals,
/// or declining.
///
/// Recognizers carry no error detail: registry order is the only recovery
/// mechanism, and the first recognizer to return `Some` wins.
pub struct Recognizer {
    pub name: &'static str,
    recognize: RecognizeFn,
}

impl Recognizer {
    pub fn new(name: &'static str, recognize: RecognizeFn) -> Self {
        Recognizer { name, recognize }
    }

    pub fn recognize(&self, rule: &UnknownRules) -> Option<KnownRules> {
        (self.recognize)(rule)
    }
}

impl std::fmt::Debug for Recognizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Recognizer").field("name", &self.name).field("recognize", &"<function>").finish()
    }
}
