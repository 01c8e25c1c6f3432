//! The narrative-posting grammar: seasonal prose notices like "Fall Youth and
//! Adult Sports Programs Begin. The Cycle Track Will be Open: ...".

pub mod grammar;
pub mod recognizers;
pub mod steps;
