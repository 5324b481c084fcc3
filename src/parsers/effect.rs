//! Provides parsers for effect formulas.

use crate::parsed_types::{AssignOp, Effect};
use crate::parsers::{
    empty_parens, function_term, leading_whitespace, literal, parens, parse_condition, parse_f_exp,
    parse_term, parse_variable, prefix_expr, space_separated_list0, typed_list, ParseResult, Span,
};
use nom::branch::alt;
use nom::bytes::complete::tag;
use nom::combinator::map;
use nom::sequence::tuple;

fn parse_numeric_effect(input: Span) -> ParseResult<Effect> {
    map(
        parens(tuple((
            alt((
                map(tag("increase"), |_| AssignOp::Increase),
                map(tag("decrease"), |_| AssignOp::Decrease),
                map(tag("assign"), |_| AssignOp::Assign),
            )),
            leading_whitespace(function_term(parse_term)),
            leading_whitespace(parse_f_exp(parse_term)),
        ))),
        |(op, function, expression)| Effect::Numeric(op, function, expression),
    )(input)
}

/// Parses an effect formula, i.e.
/// `(and e*) | (forall (vars) e) | (when GD e) | <numeric effect> | <literal(term)> | ()`.
pub fn parse_effect(input: Span) -> ParseResult<Effect> {
    alt((
        map(
            prefix_expr("and", space_separated_list0(parse_effect)),
            Effect::And,
        ),
        map(
            prefix_expr(
                "forall",
                tuple((
                    parens(typed_list(parse_variable)),
                    leading_whitespace(parse_effect),
                )),
            ),
            |(variables, body)| Effect::new_forall(variables, body),
        ),
        map(
            prefix_expr(
                "when",
                tuple((parse_condition, leading_whitespace(parse_effect))),
            ),
            |(condition, body)| Effect::new_when(condition, body),
        ),
        parse_numeric_effect,
        map(literal(parse_term), Effect::Literal),
        map(empty_parens, |_| Effect::And(vec![])),
    ))(input)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_and_delete() {
        let input = "(and (at-robby ?to) (not (at-robby ?from)))";
        let (_, effect) = parse_effect(Span::new(input)).unwrap();
        match effect {
            Effect::And(effects) => assert_eq!(effects.len(), 2),
            other => panic!("expected conjunction, got {other:?}"),
        }
    }

    #[test]
    fn conditional_effect() {
        let input = "(when (holding ?x) (and (broken ?x)))";
        let (_, effect) = parse_effect(Span::new(input)).unwrap();
        assert!(matches!(effect, Effect::When(_, _)));
    }

    #[test]
    fn universal_conditional_effect() {
        let input = "(forall (?b - ball) (when (carry ?b ?g) (at ?b ?to)))";
        let (_, effect) = parse_effect(Span::new(input)).unwrap();
        match effect {
            Effect::Forall(variables, body) => {
                assert_eq!(variables.len(), 1);
                assert!(matches!(*body, Effect::When(_, _)));
            }
            other => panic!("expected forall, got {other:?}"),
        }
    }

    #[test]
    fn action_cost_effect() {
        let input = "(increase (total-cost) 1)";
        let (_, effect) = parse_effect(Span::new(input)).unwrap();
        assert!(matches!(effect, Effect::Numeric(AssignOp::Increase, _, _)));
    }
}
