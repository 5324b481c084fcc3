//! nom-based parsers for the PDDL 2.1 fragment the planner consumes. One
//! parser per construct, mirroring the layout of [`crate::parsed_types`].

mod action_definition;
mod atom;
mod comments;
mod condition;
mod derived_definition;
mod domain;
mod effect;
mod literal;
mod name;
mod numeric;
mod predicate_definition;
mod problem;
mod requirements;
mod term;
mod r#type;
mod typed_list;
mod utilities;

pub trait Parser {
    type Item;

    fn parse<'a, S: Into<Span<'a>>>(input: S) -> ParseResult<'a, Self::Item>;

    /// Parse a string slice into the desired type. Discards any remaining
    /// input.
    fn from_str(input: &str) -> Result<Self::Item, nom::Err<ParseError>> {
        let (_, value) = Self::parse(input)?;
        Ok(value)
    }
}

pub type Span<'a> = nom_locate::LocatedSpan<&'a str>;

pub type ParseError<'a> = nom_greedyerror::GreedyError<Span<'a>, nom::error::ErrorKind>;

pub type ParseResult<'a, T, E = ParseError<'a>> = nom::IResult<Span<'a>, T, E>;

// Parsers
pub use action_definition::parse_action_definition;
pub use comments::ignore_single_line_comment;
pub use condition::parse_condition;
pub use derived_definition::parse_derived_definition;
pub use domain::parse_domain;
pub use effect::parse_effect;
pub use name::{parse_name, parse_variable};
pub use numeric::{parse_binary_comp, parse_f_exp, parse_number};
pub use predicate_definition::parse_predicate_definition;
pub use problem::parse_problem;
pub use r#type::{parse_primitive_type, parse_type};
pub use requirements::parse_requirements;
pub use term::parse_term;

// Parser combinators
pub use atom::atom;
pub use literal::literal;
pub use numeric::function_term;
pub use typed_list::typed_list;

pub(crate) use utilities::{
    empty_parens, leading_whitespace, parens, prefix_expr, space_separated_list0,
    space_separated_list1, surrounding_whitespace,
};
