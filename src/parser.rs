//! Backtracking-free parser combinators over a cursor-tracked string view.
//!
//! Every parser is a pure function `Stream -> Option<Parsed<T>>`: failure is
//! the absence of a result, with no diagnostic payload and no partial state.
//! Recovery is ordered alternation only (see the [`alt!`](crate::alt) macro),
//! which makes parser order a semantic contract: an earlier alternative may
//! shadow a later, more general one.
//!
//! Leaf parsers are regex-based and must match starting exactly at the
//! current cursor, never merely somewhere later in the input; [`re_parser`]
//! enforces this. The cursor is monotonically non-decreasing across any
//! successful chain and a failed sequence exposes no partial consumption.

use regex::{Captures, Regex};

/// An immutable view of `(input, cursor)`. Advancing produces a new value.
#[derive(Debug, Clone, Copy)]
pub struct Stream<'a> {
    pub input: &'a str,
    pub cursor: usize,
}

impl<'a> Stream<'a> {
    pub fn new(input: &'a str) -> Self {
        Stream { input, cursor: 0 }
    }

    pub fn at_end(&self) -> bool {
        self.cursor >= self.input.len()
    }

    pub fn at_cursor(self, cursor: usize) -> Self {
        Stream { cursor, ..self }
    }

    /// The unconsumed tail of the input.
    pub fn rest(&self) -> &'a str {
        &self.input[self.cursor..]
    }
}

/// A successful parse: the advanced stream and the produced value.
#[derive(Debug)]
pub struct Parsed<'a, T> {
    pub rest: Stream<'a>,
    pub value: T,
}

/// The parser contract. Blanket-implemented for plain closures, so every
/// combinator below both accepts and returns ordinary `Fn` values.
pub trait Parser<'a> {
    type Out;

    fn parse(&self, s: Stream<'a>) -> Option<Parsed<'a, Self::Out>>;
}

impl<'a, T, F> Parser<'a> for F
where
    F: Fn(Stream<'a>) -> Option<Parsed<'a, T>>,
{
    type Out = T;

    fn parse(&self, s: Stream<'a>) -> Option<Parsed<'a, T>> {
        self(s)
    }
}

/// Transform the value of a successful parse; the cursor is untouched.
pub fn map_parser<'a, P, U, F>(p: P, f: F) -> impl Parser<'a, Out = U>
where
    P: Parser<'a>,
    F: Fn(P::Out) -> U,
{
    move |s: Stream<'a>| p.parse(s).map(|r| Parsed { rest: r.rest, value: f(r.value) })
}

/// Try `a`, then `b` from the same position. Building block of [`alt!`](crate::alt).
pub fn first_of<'a, T>(a: impl Parser<'a, Out = T>, b: impl Parser<'a, Out = T>) -> impl Parser<'a, Out = T> {
    move |s: Stream<'a>| a.parse(s).or_else(|| b.parse(s))
}

/// `a` then `b`, threading the cursor; fails as a whole if either fails.
pub fn pair<'a, A, B>(a: A, b: B) -> impl Parser<'a, Out = (A::Out, B::Out)>
where
    A: Parser<'a>,
    B: Parser<'a>,
{
    move |s: Stream<'a>| {
        let ra = a.parse(s)?;
        let rb = b.parse(ra.rest)?;
        Some(Parsed { rest: rb.rest, value: (ra.value, rb.value) })
    }
}

pub fn triple<'a, A, B, C>(a: A, b: B, c: C) -> impl Parser<'a, Out = (A::Out, B::Out, C::Out)>
where
    A: Parser<'a>,
    B: Parser<'a>,
    C: Parser<'a>,
{
    move |s: Stream<'a>| {
        let ra = a.parse(s)?;
        let rb = b.parse(ra.rest)?;
        let rc = c.parse(rb.rest)?;
        Some(Parsed { rest: rc.rest, value: (ra.value, rb.value, rc.value) })
    }
}

pub fn seq4<'a, A, B, C, D>(a: A, b: B, c: C, d: D) -> impl Parser<'a, Out = (A::Out, B::Out, C::Out, D::Out)>
where
    A: Parser<'a>,
    B: Parser<'a>,
    C: Parser<'a>,
    D: Parser<'a>,
{
    move |s: Stream<'a>| {
        let ra = a.parse(s)?;
        let rb = b.parse(ra.rest)?;
        let rc = c.parse(rb.rest)?;
        let rd = d.parse(rc.rest)?;
        Some(Parsed { rest: rd.rest, value: (ra.value, rb.value, rc.value, rd.value) })
    }
}

/// `a` then `b`, keeping `a`'s value.
pub fn ap_first<'a, A, B>(a: A, b: B) -> impl Parser<'a, Out = A::Out>
where
    A: Parser<'a>,
    B: Parser<'a>,
{
    map_parser(pair(a, b), |(va, _)| va)
}

/// `a` then `b`, keeping `b`'s value.
pub fn ap_second<'a, A, B>(a: A, b: B) -> impl Parser<'a, Out = B::Out>
where
    A: Parser<'a>,
    B: Parser<'a>,
{
    map_parser(pair(a, b), |(_, vb)| vb)
}

/// Always succeeds; the cursor is unchanged when `p` fails.
pub fn opt<'a, P>(p: P) -> impl Parser<'a, Out = Option<P::Out>>
where
    P: Parser<'a>,
{
    move |s: Stream<'a>| match p.parse(s) {
        Some(r) => Some(Parsed { rest: r.rest, value: Some(r.value) }),
        None => Some(Parsed { rest: s, value: None }),
    }
}

/// One or more `p`, greedily. `p` must consume input on success.
pub fn many1<'a, P>(p: P) -> impl Parser<'a, Out = Vec<P::Out>>
where
    P: Parser<'a>,
{
    move |s: Stream<'a>| {
        let first = p.parse(s)?;
        let mut values = vec![first.value];
        let mut rest = first.rest;
        while let Some(r) = p.parse(rest) {
            values.push(r.value);
            rest = r.rest;
        }
        Some(Parsed { rest, value: values })
    }
}

/// One `p`, then zero or more `(sep p)` pairs. A trailing `sep` with no
/// following `p` is left unconsumed.
pub fn sep_by1<'a, P, S>(p: P, sep: S) -> impl Parser<'a, Out = Vec<P::Out>>
where
    P: Parser<'a>,
    S: Parser<'a>,
{
    move |s: Stream<'a>| {
        let first = p.parse(s)?;
        let mut values = vec![first.value];
        let mut rest = first.rest;
        loop {
            let Some(rs) = sep.parse(rest) else { break };
            let Some(r) = p.parse(rs.rest) else { break };
            values.push(r.value);
            rest = r.rest;
        }
        Some(Parsed { rest, value: values })
    }
}

/// Succeeds only if `p` succeeds and leaves the cursor at end of input.
/// Guarantees a recognizer consumed its whole line, not just a prefix.
pub fn end_parsed<'a, P>(p: P) -> impl Parser<'a, Out = P::Out>
where
    P: Parser<'a>,
{
    move |s: Stream<'a>| {
        let r = p.parse(s)?;
        if r.rest.at_end() { Some(r) } else { None }
    }
}

/// Regex leaf parser. The match must start exactly at the cursor; a hit
/// later in the input is a failure, not a skip-ahead.
pub fn re_parser<'a>(re: &'static Regex) -> impl Parser<'a, Out = Captures<'a>> {
    move |s: Stream<'a>| {
        let caps = re.captures_at(s.input, s.cursor)?;
        let m = caps.get(0).unwrap();
        if m.start() != s.cursor {
            return None;
        }
        Some(Parsed { rest: s.at_cursor(m.end()), value: caps })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn digits<'a>() -> impl Parser<'a, Out = u32> {
        map_parser(re_parser(regex!(r"\d+")), |caps| caps.get(0).unwrap().as_str().parse().unwrap())
    }

    fn word<'a>(re: &'static Regex) -> impl Parser<'a, Out = String> {
        map_parser(re_parser(re), |caps| caps.get(0).unwrap().as_str().to_string())
    }

    #[test]
    fn regex_leaf_is_anchored_at_cursor() {
        let p = digits();
        assert!(p.parse(Stream::new("abc 42")).is_none(), "match later in input must not count");

        let r = p.parse(Stream::new("42 abc")).unwrap();
        assert_eq!(r.value, 42);
        assert_eq!(r.rest.cursor, 2);

        let r = p.parse(Stream::new("abc 42").at_cursor(4)).unwrap();
        assert_eq!(r.value, 42);
        assert!(r.rest.at_end());
    }

    #[test]
    fn pair_threads_cursor_and_fails_whole() {
        let p = pair(digits(), ap_second(re_parser(regex!(r"-")), digits()));
        let r = p.parse(Stream::new("10-20")).unwrap();
        assert_eq!(r.value, (10, 20));
        assert!(r.rest.at_end());

        // Second half missing: the failure exposes no partial consumption.
        assert!(p.parse(Stream::new("10-")).is_none());
        let s = Stream::new("10-");
        assert_eq!(s.cursor, 0);
    }

    #[test]
    fn alt_returns_first_success_in_order() {
        // "no" is a prefix of "noon": listing the specific form first wins.
        let p = alt!(word(regex!(r"noon")), word(regex!(r"no")));
        assert_eq!(p.parse(Stream::new("noon")).unwrap().value, "noon");

        let shadowed = alt!(word(regex!(r"no")), word(regex!(r"noon")));
        let r = shadowed.parse(Stream::new("noon")).unwrap();
        assert_eq!(r.value, "no");
        assert_eq!(r.rest.cursor, 2);
    }

    #[test]
    fn opt_succeeds_without_consuming_on_failure() {
        let p = opt(digits());
        let r = p.parse(Stream::new("abc")).unwrap();
        assert_eq!(r.value, None);
        assert_eq!(r.rest.cursor, 0);

        let r = p.parse(Stream::new("7abc")).unwrap();
        assert_eq!(r.value, Some(7));
        assert_eq!(r.rest.cursor, 1);
    }

    #[test]
    fn sep_by1_requires_one_and_leaves_trailing_separator() {
        let p = sep_by1(digits(), re_parser(regex!(r",\s*")));
        let r = p.parse(Stream::new("1, 2, 3")).unwrap();
        assert_eq!(r.value, vec![1, 2, 3]);
        assert!(r.rest.at_end());

        let r = p.parse(Stream::new("1, 2, x")).unwrap();
        assert_eq!(r.value, vec![1, 2]);
        assert_eq!(r.rest.rest(), ", x");

        assert!(p.parse(Stream::new("x")).is_none());
    }

    #[test]
    fn end_parsed_rejects_prefix_matches() {
        let p = end_parsed(digits());
        assert_eq!(p.parse(Stream::new("99")).unwrap().value, 99);
        assert!(p.parse(Stream::new("99 trailing")).is_none());
    }

    #[test]
    fn many1_collects_greedily() {
        let p = many1(ap_first(digits(), opt(re_parser(regex!(r"\s+")))));
        let r = p.parse(Stream::new("1 2 3")).unwrap();
        assert_eq!(r.value, vec![1, 2, 3]);
        assert!(r.rest.at_end());
        assert!(p.parse(Stream::new("")).is_none());
    }
}
