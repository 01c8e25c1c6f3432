use once_cell::sync::Lazy;

use crate::{Recognizer, ScheduleRule, ScrapeResult, UnknownRules, Year};

static DEFAULT_RECOGNIZERS: Lazy<Vec<Recognizer>> = Lazy::new(crate::rules::schedule::recognizers::get);

/// An extracted schedule block awaiting recognition. A block and an
/// unrecognized rule are the same shape, so this is an alias rather than a
/// parallel struct.
pub type RuleBlock = UnknownRules;

/// One year's worth of extracted blocks, as handed over by the upstream
/// extractor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct YearInput {
    pub year: i32,
    pub blocks: Vec<RuleBlock>,
}

/// Recognize `block` using the default registry.
///
/// # Example
/// ```
/// use polofield::{RuleBlock, recognize};
///
/// let block = RuleBlock {
///     text: "April 1 - April 30".to_string(),
///     start_date: "2024-04-01".to_string(),
///     end_date: "2024-04-30".to_string(),
///     rules: vec!["The Cycle Track Will be Open Mondays through Sundays all day".to_string()],
/// };
/// assert!(!recognize(&block).is_unknown());
/// ```
pub fn recognize(block: &RuleBlock) -> ScheduleRule {
    recognize_with(block, &DEFAULT_RECOGNIZERS)
}

/// Recognize `block` against `recognizers` in order; the first match wins.
/// A block no recognizer claims passes through unchanged as
/// [`ScheduleRule::Unknown`], never an error.
pub fn recognize_with(block: &RuleBlock, recognizers: &[Recognizer]) -> ScheduleRule {
    for recognizer in recognizers {
        if let Some(known) = recognizer.recognize(block) {
            tracing::debug!(recognizer = recognizer.name, text = %block.text, "recognized block");
            return ScheduleRule::Known(known);
        }
    }
    tracing::debug!(text = %block.text, "no recognizer matched");
    ScheduleRule::Unknown(block.clone())
}

/// Recognize every block of every year with the default registry.
pub fn recognize_years(inputs: &[YearInput]) -> ScrapeResult {
    inputs
        .iter()
        .map(|input| Year {
            year: input.year,
            rules: input.blocks.iter().map(recognize).collect(),
        })
        .collect()
}
