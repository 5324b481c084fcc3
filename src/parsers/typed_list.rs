//! Provides the [`typed_list`] parser combinator.

use crate::parsed_types::{Typed, TypedList};
use crate::parsers::{
    leading_whitespace, parse_type, space_separated_list0, space_separated_list1, ParseResult, Span,
};
use nom::character::complete::char;
use nom::combinator::map;
use nom::multi::many0;
use nom::sequence::{preceded, tuple};

/// Parser combinator for a typed list, i.e. `x* | x⁺ - <type> <typed-list(x)>`.
/// Explicitly typed groups come first; a trailing group without a `- <type>`
/// annotation defaults to `object`.
pub fn typed_list<'a, F, O>(inner: F) -> impl FnMut(Span<'a>) -> ParseResult<'a, TypedList<O>>
where
    F: Clone + FnMut(Span<'a>) -> ParseResult<'a, O>,
{
    // `x⁺ - <type>`
    let explicitly_typed = map(
        tuple((
            space_separated_list1(inner.clone()),
            preceded(leading_whitespace(char('-')), leading_whitespace(parse_type)),
        )),
        |(values, t)| {
            values
                .into_iter()
                .map(move |value| Typed::new(value, t.clone()))
                .collect::<Vec<_>>()
        },
    );

    // `x*`
    let implicitly_typed_list = space_separated_list0(map(inner, Typed::new_object));

    map(
        tuple((many0(explicitly_typed), implicitly_typed_list)),
        |(explicit, mut implicit)| {
            let mut all: Vec<Typed<O>> = explicit.into_iter().flatten().collect();
            all.append(&mut implicit);
            TypedList::new(all)
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsed_types::{Name, Type};
    use crate::parsers::parse_name;

    #[test]
    fn implicitly_typed() {
        let (_, list) = typed_list(parse_name)(Span::new("abc def")).unwrap();
        assert_eq!(list.len(), 2);
        assert_eq!(list[0].type_(), &Type::object());
    }

    #[test]
    fn explicitly_typed_groups() {
        let (_, list) =
            typed_list(parse_name)(Span::new("abc def - word kitchen - room")).unwrap();
        assert_eq!(list.len(), 3);
        assert_eq!(list[0].value(), &Name::from("abc"));
        assert_eq!(list[0].type_(), &Type::from("word"));
        assert_eq!(list[2].type_(), &Type::from("room"));
    }

    #[test]
    fn mixed() {
        let (_, list) = typed_list(parse_name)(Span::new("a b - t1 c d")).unwrap();
        assert_eq!(list.len(), 4);
        assert_eq!(list[3].type_(), &Type::object());
    }
}
