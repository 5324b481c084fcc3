//! Provides parsers for goal descriptions.

use crate::parsed_types::Condition;
use crate::parsers::{
    empty_parens, leading_whitespace, literal, parens, parse_binary_comp, parse_f_exp, parse_term,
    prefix_expr, space_separated_list0, ParseResult, Span,
};
use nom::branch::alt;
use nom::combinator::map;
use nom::sequence::tuple;

/// Parses a goal description restricted to the conjunctive fragment:
/// `(and GD*) | <literal(term)> | (<comp> <fexp> <fexp>) | ()`.
pub fn parse_condition(input: Span) -> ParseResult<Condition> {
    alt((
        map(
            prefix_expr("and", space_separated_list0(parse_condition)),
            Condition::And,
        ),
        map(
            parens(tuple((
                parse_binary_comp,
                leading_whitespace(parse_f_exp(parse_term)),
                leading_whitespace(parse_f_exp(parse_term)),
            ))),
            |(comp, lhs, rhs)| Condition::Comparison(comp, lhs, rhs),
        ),
        map(literal(parse_term), Condition::Literal),
        map(empty_parens, |_| Condition::top()),
    ))(input)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsed_types::{BinaryComp, Literal};

    #[test]
    fn conjunction() {
        let input = "(and (clear ?to) (at-robot ?from) (not (= ?from ?to)))";
        let (_, condition) = parse_condition(Span::new(input)).unwrap();
        let (literals, comparisons) = condition.flatten();
        assert_eq!(literals.len(), 3);
        assert!(comparisons.is_empty());
        assert!(matches!(literals[2], Literal::Negative(_)));
    }

    #[test]
    fn numeric_comparison() {
        let input = "(>= (fuel ?t) 4)";
        let (_, condition) = parse_condition(Span::new(input)).unwrap();
        let (literals, comparisons) = condition.flatten();
        assert!(literals.is_empty());
        assert_eq!(comparisons.len(), 1);
        assert_eq!(comparisons[0].0, BinaryComp::GreaterEq);
    }

    #[test]
    fn equality_is_a_literal() {
        let (_, condition) = parse_condition(Span::new("(= ?from ?to)")).unwrap();
        let (literals, comparisons) = condition.flatten();
        // both sides are bare terms, so this is an equality atom rather than
        // a numeric comparison
        assert_eq!(literals.len(), 1);
        assert!(comparisons.is_empty());
    }

    #[test]
    fn empty_condition() {
        let (_, condition) = parse_condition(Span::new("()")).unwrap();
        assert_eq!(condition, Condition::top());
    }
}
