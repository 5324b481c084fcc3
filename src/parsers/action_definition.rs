//! Provides parsers for action definitions.

use crate::parsed_types::ActionDefinition;
use crate::parsers::{
    leading_whitespace, parens, parse_condition, parse_effect, parse_name, parse_variable,
    prefix_expr, typed_list, ParseResult, Span,
};
use nom::bytes::complete::tag;
use nom::combinator::{map, opt};
use nom::sequence::{preceded, tuple};

/// Parses an action definition, i.e.
/// `(:action <name> :parameters (<typed vars>) [:precondition GD] [:effect E])`.
pub fn parse_action_definition(input: Span) -> ParseResult<ActionDefinition> {
    map(
        prefix_expr(
            ":action",
            tuple((
                parse_name,
                preceded(
                    leading_whitespace(tag(":parameters")),
                    leading_whitespace(parens(typed_list(parse_variable))),
                ),
                opt(preceded(
                    leading_whitespace(tag(":precondition")),
                    leading_whitespace(parse_condition),
                )),
                opt(preceded(
                    leading_whitespace(tag(":effect")),
                    leading_whitespace(parse_effect),
                )),
            )),
        ),
        |(name, parameters, precondition, effect)| {
            ActionDefinition::new(name, parameters, precondition, effect)
        },
    )(input)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsed_types::Name;

    #[test]
    fn it_works() {
        let input = "(:action pick
            :parameters (?obj - ball ?room - room ?gripper - gripper)
            :precondition (and (at ?obj ?room) (at-robby ?room) (free ?gripper))
            :effect (and (carry ?obj ?gripper) (not (at ?obj ?room)) (not (free ?gripper))))";
        let (rest, action) = parse_action_definition(Span::new(input)).unwrap();
        assert!(rest.is_empty());
        assert_eq!(action.name(), &Name::from("pick"));
        assert_eq!(action.parameters().len(), 3);
        assert!(action.precondition().is_some());
        assert!(action.effect().is_some());
    }
}
