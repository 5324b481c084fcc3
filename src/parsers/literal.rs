//! Provides parsers for literals.

use crate::parsed_types::Literal;
use crate::parsers::prefix_expr;
use crate::parsers::{atom, ParseResult, Span};
use nom::branch::alt;
use nom::combinator::map;

/// Parser combinator that parses a literal, i.e.
/// `<atom(t)> | (not <atom(t)>)`.
pub fn literal<'a, F, O>(inner: F) -> impl FnMut(Span<'a>) -> ParseResult<'a, Literal<O>>
where
    F: Clone + FnMut(Span<'a>) -> ParseResult<'a, O>,
{
    let is = map(atom(inner.clone()), Literal::new);
    let is_not = map(prefix_expr("not", atom(inner)), Literal::new_not);

    alt((is_not, is))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsers::parse_term;

    #[test]
    fn positive_and_negative() {
        let (_, lit) = literal(parse_term)(Span::new("(on b1 b2)")).unwrap();
        assert!(!lit.is_negated());
        let (_, lit) = literal(parse_term)(Span::new("(not (on b1 b2))")).unwrap();
        assert!(lit.is_negated());
    }
}
