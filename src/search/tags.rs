//! Predicate and function tags. The original design dispatches on these at
//! compile time; here the tag is a plain enum and per-tag containers are
//! fixed-size field groups.

use std::fmt::{self, Display, Formatter};

/// The mutability class of a predicate: `Static` predicates never change,
/// `Fluent` predicates are written by action effects, `Derived` predicates
/// are defined by axioms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PredicateTag {
    Static,
    Fluent,
    Derived,
}

/// All predicate tags, in a fixed iteration order.
pub const PREDICATE_TAGS: [PredicateTag; 3] = [
    PredicateTag::Static,
    PredicateTag::Fluent,
    PredicateTag::Derived,
];

impl Display for PredicateTag {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let s = match self {
            PredicateTag::Static => "static",
            PredicateTag::Fluent => "fluent",
            PredicateTag::Derived => "derived",
        };
        write!(f, "{s}")
    }
}

/// One value per [`PredicateTag`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct PerTag<T> {
    pub static_: T,
    pub fluent: T,
    pub derived: T,
}

impl<T> PerTag<T> {
    pub fn get(&self, tag: PredicateTag) -> &T {
        match tag {
            PredicateTag::Static => &self.static_,
            PredicateTag::Fluent => &self.fluent,
            PredicateTag::Derived => &self.derived,
        }
    }

    pub fn get_mut(&mut self, tag: PredicateTag) -> &mut T {
        match tag {
            PredicateTag::Static => &mut self.static_,
            PredicateTag::Fluent => &mut self.fluent,
            PredicateTag::Derived => &mut self.derived,
        }
    }

    pub fn from_fn(mut f: impl FnMut(PredicateTag) -> T) -> Self {
        Self {
            static_: f(PredicateTag::Static),
            fluent: f(PredicateTag::Fluent),
            derived: f(PredicateTag::Derived),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (PredicateTag, &T)> {
        PREDICATE_TAGS.iter().map(move |&tag| (tag, self.get(tag)))
    }
}

/// The mutability class of a function: `Fluent` functions are targets of
/// numeric effects, `Static` functions keep their initial value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FunctionTag {
    Static,
    Fluent,
}

/// One value per [`FunctionTag`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PerFunctionTag<T> {
    pub static_: T,
    pub fluent: T,
}

impl<T> PerFunctionTag<T> {
    pub fn get(&self, tag: FunctionTag) -> &T {
        match tag {
            FunctionTag::Static => &self.static_,
            FunctionTag::Fluent => &self.fluent,
        }
    }

    pub fn get_mut(&mut self, tag: FunctionTag) -> &mut T {
        match tag {
            FunctionTag::Static => &mut self.static_,
            FunctionTag::Fluent => &mut self.fluent,
        }
    }
}
