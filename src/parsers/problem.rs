//! Provides parsers for problem definitions.

use crate::parsed_types::{InitElement, Metric, Optimization, Problem};
use crate::parsers::{
    function_term, leading_whitespace, literal, parens, parse_condition, parse_f_exp, parse_name,
    parse_number, prefix_expr, space_separated_list0, surrounding_whitespace, typed_list,
    ParseResult, Span,
};
use nom::branch::alt;
use nom::bytes::complete::tag;
use nom::character::complete::char;
use nom::combinator::{map, opt};
use nom::sequence::tuple;

fn parse_init_element(input: Span) -> ParseResult<InitElement> {
    alt((
        // `(= (f o*) v)` must be tried first, otherwise `=` would parse as a
        // (zero-information) equality atom.
        map(
            parens(tuple((
                char('='),
                leading_whitespace(function_term(parse_name)),
                leading_whitespace(parse_number),
            ))),
            |(_, function, value)| InitElement::FunctionValue(function, value),
        ),
        map(literal(parse_name), InitElement::Literal),
    ))(input)
}

fn parse_metric(input: Span) -> ParseResult<Metric> {
    map(
        prefix_expr(
            ":metric",
            tuple((
                alt((
                    map(tag("minimize"), |_| Optimization::Minimize),
                    map(tag("maximize"), |_| Optimization::Maximize),
                )),
                leading_whitespace(parse_f_exp(parse_name)),
            )),
        ),
        |(optimization, expression)| Metric::new(optimization, expression),
    )(input)
}

/// Parses a problem definition.
pub fn parse_problem<'a, T: Into<Span<'a>>>(input: T) -> ParseResult<'a, Problem> {
    map(
        surrounding_whitespace(prefix_expr(
            "define",
            tuple((
                prefix_expr("problem", parse_name),
                leading_whitespace(prefix_expr(":domain", parse_name)),
                opt(leading_whitespace(prefix_expr(
                    ":objects",
                    typed_list(parse_name),
                ))),
                leading_whitespace(prefix_expr(
                    ":init",
                    space_separated_list0(parse_init_element),
                )),
                leading_whitespace(prefix_expr(":goal", parse_condition)),
                opt(leading_whitespace(parse_metric)),
            )),
        )),
        |(name, domain, objects, init, goal, metric)| {
            Problem::new(
                name,
                domain,
                objects.unwrap_or_default(),
                init,
                goal,
                metric,
            )
        },
    )(input.into())
}

impl crate::parsers::Parser for Problem {
    type Item = Problem;

    fn parse<'a, S: Into<Span<'a>>>(input: S) -> ParseResult<'a, Self::Item> {
        parse_problem(input)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsed_types::Name;
    use crate::parsers::Parser;

    #[test]
    fn full_problem() {
        let input = r#"
        (define (problem p-1-0)
            (:domain gripper)
            (:objects rooma roomb - room ball1 ball2 - ball left right - gripper)
            (:init
                (at-robby rooma)
                (at ball1 rooma)
                (at ball2 rooma)
                (free left)
                (free right)
                (= (total-cost) 0))
            (:goal (and (at ball1 roomb) (at ball2 roomb)))
            (:metric minimize (total-cost))
        )"#;

        let (remainder, problem) = parse_problem(input).unwrap();
        assert!(remainder.is_empty());
        assert_eq!(problem.name(), &Name::from("p-1-0"));
        assert_eq!(problem.domain(), &Name::from("gripper"));
        assert_eq!(problem.objects().len(), 6);
        assert_eq!(problem.init().len(), 6);
        assert!(problem.metric().is_some());
    }

    #[test]
    fn function_values_in_init() {
        let input = r#"
        (define (problem refuel)
            (:domain logistics-fuel)
            (:objects t1 - truck depot - location)
            (:init (at t1 depot) (= (fuel t1) 3))
            (:goal (and (at t1 depot)))
        )"#;

        let problem = Problem::from_str(input).unwrap();
        assert_eq!(problem.init().len(), 2);
        assert!(matches!(
            problem.init()[1],
            InitElement::FunctionValue(_, _)
        ));
    }
}
