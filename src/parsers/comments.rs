use crate::parsers::{ParseResult, Span};
use nom::bytes::complete::is_not;
use nom::character::complete::{char, multispace0};
use nom::combinator::{opt, value};
use nom::sequence::{pair, terminated, tuple};

/// Consumes any number of `; ...` line comments, including the whitespace
/// between them. Never fails.
pub fn ignore_single_line_comment<'a, S: Into<Span<'a>>>(input: S) -> ParseResult<'a, ()> {
    value(
        (),
        opt(terminated(
            pair(char(';'), opt(is_not("\r\n"))),
            tuple((multispace0, opt(ignore_single_line_comment))),
        )),
    )(input.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn comment_only() {
        let (remainder, _) = ignore_single_line_comment("; comment").unwrap();
        assert!(remainder.is_empty());
    }

    #[test]
    fn keeps_text() {
        let (remainder, _) = ignore_single_line_comment("; comment\nnext line").unwrap();
        assert_eq!(remainder.fragment(), &"next line");
    }

    #[test]
    fn stacked_comments() {
        let (remainder, _) = ignore_single_line_comment(";; a\n;; b\n(x)").unwrap();
        assert_eq!(remainder.fragment(), &"(x)");
    }
}
