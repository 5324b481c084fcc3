//! Provides parsers for atoms.

use crate::parsed_types::{Atom, Name};
use crate::parsers::{
    leading_whitespace, parens, parse_name, space_separated_list0, ParseResult, Span,
};
use nom::branch::alt;
use nom::bytes::complete::tag;
use nom::combinator::map;
use nom::sequence::tuple;

/// Parses an atom, i.e. `(<predicate> t*)`. The equality predicate `=` is
/// accepted as a predicate name so that `(= ?x ?y)` parses as an atom; the
/// task construction compiles it away.
pub fn atom<'a, F, O>(inner: F) -> impl FnMut(Span<'a>) -> ParseResult<'a, Atom<O>>
where
    F: Clone + FnMut(Span<'a>) -> ParseResult<'a, O>,
{
    map(
        parens(tuple((
            alt((parse_name, map(tag("="), |_| Name::new("=")))),
            leading_whitespace(space_separated_list0(inner)),
        ))),
        |(name, values)| Atom::new(name, values),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsers::parse_term;

    #[test]
    fn it_works() {
        let (_, atom) = atom(parse_term)(Span::new("(at-robby ?from)")).unwrap();
        assert_eq!(atom.predicate_name(), &Name::from("at-robby"));
        assert_eq!(atom.values().len(), 1);
    }

    #[test]
    fn equality() {
        let (_, atom) = atom(parse_term)(Span::new("(= ?from ?to)")).unwrap();
        assert_eq!(atom.predicate_name(), &Name::from("="));
        assert_eq!(atom.values().len(), 2);
    }
}
