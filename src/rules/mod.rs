//! The two rule families.
//!
//! `schedule` handles the narrative seasonal-prose postings; `calendar`
//! handles the day-by-day public calendar listing. The two grammars are
//! independent, sharing only the combinator core and the temporal primitives.

pub mod calendar;
pub mod schedule;
