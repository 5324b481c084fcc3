//! Provides parsers for requirement definitions.

use crate::parsed_types::Requirement;
use crate::parsers::{prefix_expr, space_separated_list1, ParseResult, Span};
use nom::branch::alt;
use nom::bytes::complete::tag;
use nom::combinator::map;

fn parse_requirement_key(input: Span) -> ParseResult<Requirement> {
    alt((
        map(tag(":strips"), |_| Requirement::Strips),
        map(tag(":typing"), |_| Requirement::Typing),
        map(tag(":negative-preconditions"), |_| {
            Requirement::NegativePreconditions
        }),
        map(tag(":equality"), |_| Requirement::Equality),
        map(tag(":conditional-effects"), |_| {
            Requirement::ConditionalEffects
        }),
        map(tag(":derived-predicates"), |_| {
            Requirement::DerivedPredicates
        }),
        map(tag(":numeric-fluents"), |_| Requirement::NumericFluents),
        map(tag(":action-costs"), |_| Requirement::ActionCosts),
        map(tag(":adl"), |_| Requirement::Adl),
    ))(input)
}

/// Parses a `(:requirements ...)` section.
pub fn parse_requirements(input: Span) -> ParseResult<Vec<Requirement>> {
    prefix_expr(
        ":requirements",
        space_separated_list1(parse_requirement_key),
    )(input)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn it_works() {
        let input = "(:requirements :typing :negative-preconditions)";
        let (_, requirements) = parse_requirements(Span::new(input)).unwrap();
        assert_eq!(
            requirements,
            vec![Requirement::Typing, Requirement::NegativePreconditions]
        );
    }
}
