//! Provides parsers for names and variables.

use crate::parsed_types::{Name, Variable};
use crate::parsers::{ParseResult, Span};
use nom::bytes::complete::take_while;
use nom::character::complete::{alpha1, char};
use nom::combinator::{map, recognize};
use nom::sequence::{pair, preceded};

/// Parses a PDDL name, i.e. a letter followed by letters, digits, `-` and `_`.
pub fn parse_name(input: Span) -> ParseResult<Name> {
    map(
        recognize(pair(
            alpha1,
            take_while(|c: char| c.is_alphanumeric() || c == '-' || c == '_'),
        )),
        |span: Span| Name::new(*span.fragment()),
    )(input)
}

/// Parses a variable, i.e. `?<name>`.
pub fn parse_variable(input: Span) -> ParseResult<Variable> {
    map(preceded(char('?'), parse_name), Variable::new)(input)
}
