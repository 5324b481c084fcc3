//! Provides parsers for domain definitions.

use crate::parsed_types::{
    ActionDefinition, DerivedDefinition, Domain, FunctionDeclaration, Types,
};
use crate::parsers::{
    leading_whitespace, parens, parse_action_definition, parse_derived_definition, parse_name,
    parse_predicate_definition, parse_requirements, parse_variable, prefix_expr,
    space_separated_list1, surrounding_whitespace, typed_list, ParseResult, Span,
};
use nom::branch::alt;
use nom::bytes::complete::tag;
use nom::character::complete::char;
use nom::combinator::{map, opt};
use nom::multi::many0;
use nom::sequence::{preceded, tuple};

/// An action or derived-predicate definition; the two may interleave in the
/// domain body.
enum StructureDefinition {
    Action(ActionDefinition),
    Derived(DerivedDefinition),
}

fn parse_function_declaration(input: Span) -> ParseResult<FunctionDeclaration> {
    // An optional `- number` result type may trail each declaration (or a
    // group of declarations; attaching it to the preceding one is enough
    // since `number` is the only legal result type).
    map(
        tuple((
            parens(tuple((
                parse_name,
                leading_whitespace(typed_list(parse_variable)),
            ))),
            opt(preceded(
                leading_whitespace(char('-')),
                leading_whitespace(tag("number")),
            )),
        )),
        |((name, variables), _)| FunctionDeclaration::new(name, variables),
    )(input)
}

/// Parses a domain definition.
pub fn parse_domain<'a, T: Into<Span<'a>>>(input: T) -> ParseResult<'a, Domain> {
    map(
        surrounding_whitespace(prefix_expr(
            "define",
            tuple((
                prefix_expr("domain", parse_name),
                opt(leading_whitespace(parse_requirements)),
                opt(leading_whitespace(prefix_expr(
                    ":types",
                    typed_list(parse_name),
                ))),
                opt(leading_whitespace(prefix_expr(
                    ":constants",
                    typed_list(parse_name),
                ))),
                opt(leading_whitespace(prefix_expr(
                    ":predicates",
                    space_separated_list1(parse_predicate_definition),
                ))),
                opt(leading_whitespace(prefix_expr(
                    ":functions",
                    space_separated_list1(parse_function_declaration),
                ))),
                many0(leading_whitespace(alt((
                    map(parse_action_definition, StructureDefinition::Action),
                    map(parse_derived_definition, StructureDefinition::Derived),
                )))),
            )),
        )),
        |(name, requirements, types, constants, predicates, functions, structures)| {
            let mut actions = vec![];
            let mut deriveds = vec![];
            for structure in structures {
                match structure {
                    StructureDefinition::Action(action) => actions.push(action),
                    StructureDefinition::Derived(derived) => deriveds.push(derived),
                }
            }
            Domain::new(
                name,
                requirements.unwrap_or_default(),
                Types::new(types.unwrap_or_default()),
                constants.unwrap_or_default(),
                predicates.unwrap_or_default(),
                functions.unwrap_or_default(),
                actions,
                deriveds,
            )
        },
    )(input.into())
}

impl crate::parsers::Parser for Domain {
    type Item = Domain;

    fn parse<'a, S: Into<Span<'a>>>(input: S) -> ParseResult<'a, Self::Item> {
        parse_domain(input)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsed_types::Name;
    use crate::parsers::Parser;

    #[test]
    fn full_domain() {
        let input = r#"
        (define (domain gripper)
            (:requirements :strips :typing)
            (:types room ball gripper)
            (:predicates
                (at-robby ?r - room)
                (at ?b - ball ?r - room)
                (free ?g - gripper)
                (carry ?o - ball ?g - gripper))

            (:action move
                :parameters (?from ?to - room)
                :precondition (and (at-robby ?from))
                :effect (and (at-robby ?to) (not (at-robby ?from))))
        )"#;

        let (remainder, domain) = parse_domain(input).unwrap();
        assert!(remainder.is_empty());
        assert_eq!(domain.name(), &Name::from("gripper"));
        assert_eq!(domain.requirements().len(), 2);
        assert_eq!(domain.types().len(), 3);
        assert_eq!(domain.predicates().len(), 4);
        assert_eq!(domain.actions().len(), 1);
        assert!(domain.deriveds().is_empty());
    }

    #[test]
    fn functions_and_derived_predicates() {
        let input = r#"
        (define (domain logistics-fuel)
            (:requirements :typing :numeric-fluents :derived-predicates)
            (:types truck location)
            (:predicates (at ?t - truck ?l - location) (stranded ?t - truck))
            (:functions (fuel ?t - truck) (total-cost) - number)

            (:action drive
                :parameters (?t - truck ?from ?to - location)
                :precondition (and (at ?t ?from) (>= (fuel ?t) 1))
                :effect (and (at ?t ?to) (not (at ?t ?from))
                             (decrease (fuel ?t) 1)
                             (increase (total-cost) 1)))

            (:derived (stranded ?t - truck) (and (<= (fuel ?t) 0)))
        )"#;

        let domain = Domain::from_str(input).unwrap();
        assert_eq!(domain.functions().len(), 2);
        assert_eq!(domain.actions().len(), 1);
        assert_eq!(domain.deriveds().len(), 1);
    }
}
