//! Provides parsers for predicate definitions.

use crate::parsed_types::PredicateDefinition;
use crate::parsers::{
    leading_whitespace, parens, parse_name, parse_variable, typed_list, ParseResult, Span,
};
use nom::combinator::map;
use nom::sequence::tuple;

/// Parses a predicate definition, i.e. `(<predicate> <typed list (variable)>)`.
pub fn parse_predicate_definition(input: Span) -> ParseResult<PredicateDefinition> {
    map(
        parens(tuple((
            parse_name,
            leading_whitespace(typed_list(parse_variable)),
        ))),
        |(name, variables)| PredicateDefinition::new(name, variables),
    )(input)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsed_types::Name;

    #[test]
    fn it_works() {
        let (_, definition) =
            parse_predicate_definition(Span::new("(at ?b - ball ?r - room)")).unwrap();
        assert_eq!(definition.name(), &Name::from("at"));
        assert_eq!(definition.variables().len(), 2);
    }
}
