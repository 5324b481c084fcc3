//! Provides parsers for primitive and `either` types.

use crate::parsed_types::{PrimitiveType, Type};
use crate::parsers::{parse_name, prefix_expr, space_separated_list1, ParseResult, Span};
use nom::branch::alt;
use nom::combinator::map;

/// Parses a primitive type name.
pub fn parse_primitive_type(input: Span) -> ParseResult<PrimitiveType> {
    map(parse_name, PrimitiveType::new)(input)
}

/// Parses a type, i.e. `<primitive-type> | (either <primitive-type>+)`.
pub fn parse_type(input: Span) -> ParseResult<Type> {
    alt((
        map(parse_primitive_type, Type::Exactly),
        map(
            prefix_expr("either", space_separated_list1(parse_primitive_type)),
            Type::EitherOf,
        ),
    ))(input)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exactly() {
        let (_, t) = parse_type(Span::new("room")).unwrap();
        assert_eq!(t, Type::from("room"));
    }

    #[test]
    fn either_of() {
        let (_, t) = parse_type(Span::new("(either state country)")).unwrap();
        assert_eq!(t.primitives().len(), 2);
    }
}
