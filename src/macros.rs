#[macro_export]
macro_rules! regex {
    ($pat:literal) => {{
        static RE: once_cell::sync::Lazy<regex::Regex> =
            once_cell::sync::Lazy::new(|| regex::Regex::new($pat).unwrap());
        &*RE
    }};
}

/// Ordered alternation over parsers sharing one output type.
///
/// Tries each parser at the same stream position and returns the first
/// success, so specific cases must be listed before the general ones they
/// shadow. Expands to nested [`crate::parser::first_of`] calls, which lets
/// the alternatives be distinct closure types.
#[macro_export]
macro_rules! alt {
    ($p:expr $(,)?) => { $p };
    ($p:expr, $($rest:expr),+ $(,)?) => {
        $crate::parser::first_of($p, $crate::alt!($($rest),+))
    };
}
