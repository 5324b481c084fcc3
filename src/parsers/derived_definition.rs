//! Provides parsers for derived-predicate definitions.

use crate::parsed_types::DerivedDefinition;
use crate::parsers::{
    leading_whitespace, parens, parse_condition, parse_name, parse_variable, prefix_expr,
    typed_list, ParseResult, Span,
};
use nom::combinator::map;
use nom::sequence::tuple;

/// Parses a derived-predicate definition, i.e.
/// `(:derived (<predicate> <typed vars>) GD)`.
pub fn parse_derived_definition(input: Span) -> ParseResult<DerivedDefinition> {
    map(
        prefix_expr(
            ":derived",
            tuple((
                parens(tuple((
                    parse_name,
                    leading_whitespace(typed_list(parse_variable)),
                ))),
                leading_whitespace(parse_condition),
            )),
        ),
        |((name, parameters), condition)| DerivedDefinition::new(name, parameters, condition),
    )(input)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsed_types::Name;

    #[test]
    fn it_works() {
        let input = "(:derived (above ?x - block ?y - block)
            (and (on ?x ?y)))";
        let (_, derived) = parse_derived_definition(Span::new(input)).unwrap();
        assert_eq!(derived.predicate_name(), &Name::from("above"));
        assert_eq!(derived.parameters().len(), 2);
    }
}
