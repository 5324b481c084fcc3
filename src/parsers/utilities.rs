//! Utility parser combinators.

use nom::{
    bytes::complete::tag,
    character::complete::{char, multispace0, multispace1},
    combinator::map,
    multi::{separated_list0, separated_list1},
    sequence::{delimited, preceded},
};

use crate::parsers::{ignore_single_line_comment, ParseResult, Span};

/// Wraps `inner` so that a leading `(name` and a trailing `)` are consumed
/// around it.
pub fn prefix_expr<'a, F, O>(name: &'a str, inner: F) -> impl FnMut(Span<'a>) -> ParseResult<'a, O>
where
    F: FnMut(Span<'a>) -> ParseResult<'a, O>,
{
    delimited(
        preceded(leading_whitespace(tag("(")), tag(name)),
        leading_whitespace(inner),
        leading_whitespace(tag(")")),
    )
}

/// Wraps `inner` so that leading whitespace and line comments are consumed
/// before it.
pub fn leading_whitespace<'a, F, O>(inner: F) -> impl FnMut(Span<'a>) -> ParseResult<'a, O>
where
    F: FnMut(Span<'a>) -> ParseResult<'a, O>,
{
    preceded(preceded(multispace0, ignore_single_line_comment), inner)
}

/// Wraps `inner` so that leading and trailing whitespace and line comments
/// are consumed around it.
pub fn surrounding_whitespace<'a, F, O>(inner: F) -> impl FnMut(Span<'a>) -> ParseResult<'a, O>
where
    F: FnMut(Span<'a>) -> ParseResult<'a, O>,
{
    delimited(
        preceded(multispace0, ignore_single_line_comment),
        inner,
        preceded(multispace0, ignore_single_line_comment),
    )
}

/// Parses a whitespace-separated list of `inner`, possibly empty.
pub fn space_separated_list0<'a, F, O>(inner: F) -> impl FnMut(Span<'a>) -> ParseResult<'a, Vec<O>>
where
    F: FnMut(Span<'a>) -> ParseResult<'a, O>,
{
    leading_whitespace(separated_list0(
        multispace1,
        preceded(ignore_single_line_comment, inner),
    ))
}

/// Parses a whitespace-separated list of `inner` with at least one element.
pub fn space_separated_list1<'a, F, O>(inner: F) -> impl FnMut(Span<'a>) -> ParseResult<'a, Vec<O>>
where
    F: FnMut(Span<'a>) -> ParseResult<'a, O>,
{
    leading_whitespace(separated_list1(
        multispace1,
        preceded(ignore_single_line_comment, inner),
    ))
}

/// Wraps `inner` in parentheses, tolerating whitespace and comments on
/// either side of it.
pub fn parens<'a, F, O>(inner: F) -> impl FnMut(Span<'a>) -> ParseResult<'a, O>
where
    F: FnMut(Span<'a>) -> ParseResult<'a, O>,
{
    preceded(
        ignore_single_line_comment,
        delimited(
            char('('),
            leading_whitespace(inner),
            leading_whitespace(char(')')),
        ),
    )
}

/// Parses an empty pair of parentheses `()`.
pub fn empty_parens(input: Span) -> ParseResult<()> {
    map(delimited(char('('), multispace0, char(')')), |_| ())(input)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsed_types::Name;
    use crate::parsers::parse_name;

    #[test]
    fn parens_works() {
        let (_, name) = parens(parse_name)(Span::new("( content )")).unwrap();
        assert_eq!(name, Name::from("content"));
    }

    #[test]
    fn prefix_expr_works() {
        let mut parser = prefix_expr("either", space_separated_list1(parse_name));
        let (_, names) = parser(Span::new("(either x y)")).unwrap();
        assert_eq!(names, vec![Name::from("x"), Name::from("y")]);
    }

    #[test]
    fn space_separated_lists_work() {
        let (_, names) = space_separated_list0(parse_name)(Span::new("x y")).unwrap();
        assert_eq!(names.len(), 2);
        let (_, names) = space_separated_list0(parse_name)(Span::new("")).unwrap();
        assert!(names.is_empty());
        assert!(space_separated_list1(parse_name)(Span::new("")).is_err());
    }
}
