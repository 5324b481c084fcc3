//! Provides parsers for terms.

use crate::parsed_types::Term;
use crate::parsers::{parse_name, parse_variable, ParseResult, Span};
use nom::branch::alt;
use nom::combinator::map;

/// Parses a term, i.e. `<name> | <variable>`.
pub fn parse_term(input: Span) -> ParseResult<Term> {
    alt((
        map(parse_variable, Term::Variable),
        map(parse_name, Term::Name),
    ))(input)
}
