//! Provides parsers for function terms, function expressions and numeric
//! comparators.

use crate::parsed_types::{BinaryComp, BinaryOp, FExp, FunctionTerm};
use crate::parsers::{
    leading_whitespace, parens, parse_name, space_separated_list0, ParseResult, Span,
};
use nom::branch::alt;
use nom::bytes::complete::tag;
use nom::character::complete::one_of;
use nom::combinator::map;
use nom::number::complete::double;
use nom::sequence::tuple;

/// Parses a number literal.
pub fn parse_number(input: Span) -> ParseResult<f64> {
    double(input)
}

/// Parses a function application `(<function> t*)`.
pub fn function_term<'a, F, O>(
    inner: F,
) -> impl FnMut(Span<'a>) -> ParseResult<'a, FunctionTerm<O>>
where
    F: Clone + FnMut(Span<'a>) -> ParseResult<'a, O>,
{
    map(
        parens(tuple((
            parse_name,
            leading_whitespace(space_separated_list0(inner)),
        ))),
        |(name, values)| FunctionTerm::new(name, values),
    )
}

/// Parses a binary comparator, i.e. `< | <= | = | >= | >`.
pub fn parse_binary_comp(input: Span) -> ParseResult<BinaryComp> {
    alt((
        map(tag("<="), |_| BinaryComp::LessEq),
        map(tag(">="), |_| BinaryComp::GreaterEq),
        map(tag("<"), |_| BinaryComp::Less),
        map(tag(">"), |_| BinaryComp::Greater),
        map(tag("="), |_| BinaryComp::Equal),
    ))(input)
}

fn parse_binary_op(input: Span) -> ParseResult<BinaryOp> {
    map(one_of("+-*/"), |c| match c {
        '+' => BinaryOp::Add,
        '-' => BinaryOp::Sub,
        '*' => BinaryOp::Mul,
        _ => BinaryOp::Div,
    })(input)
}

/// Parses a function expression, i.e.
/// `<number> | (<f> t*) | (<op> <fexp> <fexp>)`.
pub fn parse_f_exp<'a, F, O>(inner: F) -> impl FnMut(Span<'a>) -> ParseResult<'a, FExp<O>>
where
    F: Clone + FnMut(Span<'a>) -> ParseResult<'a, O>,
{
    move |input: Span<'a>| {
        let number = map(double, FExp::Number);
        let inner_fn = inner.clone();
        let inner_term = inner.clone();
        let binary = map(
            parens(tuple((
                parse_binary_op,
                leading_whitespace(parse_f_exp(inner_fn.clone())),
                leading_whitespace(parse_f_exp(inner_fn)),
            ))),
            |(op, lhs, rhs)| FExp::new_binary(op, lhs, rhs),
        );
        let function = map(function_term(inner_term), FExp::Function);

        alt((number, binary, function))(input)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsed_types::Name;
    use crate::parsers::parse_term;

    #[test]
    fn numbers() {
        let (_, e) = parse_f_exp(parse_term)(Span::new("3")).unwrap();
        assert_eq!(e, FExp::Number(3.0));
    }

    #[test]
    fn functions_and_arithmetic() {
        let (_, e) = parse_f_exp(parse_term)(Span::new("(fuel ?truck)")).unwrap();
        match e {
            FExp::Function(f) => assert_eq!(f.symbol(), &Name::from("fuel")),
            other => panic!("expected function, got {other:?}"),
        }

        let (_, e) = parse_f_exp(parse_term)(Span::new("(+ (fuel ?truck) 1)")).unwrap();
        assert!(matches!(e, FExp::Binary(BinaryOp::Add, _, _)));
    }
}
