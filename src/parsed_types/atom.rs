use crate::parsed_types::Name;
use std::fmt::{self, Display, Formatter};

/// An atomic formula `(<predicate> t*)` over terms of type `T`.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub struct Atom<T> {
    predicate_name: Name,
    values: Vec<T>,
}

impl<T> Atom<T> {
    pub const fn new(predicate_name: Name, values: Vec<T>) -> Self {
        Self {
            predicate_name,
            values,
        }
    }

    #[inline(always)]
    pub fn predicate_name(&self) -> &Name {
        &self.predicate_name
    }

    #[inline(always)]
    pub fn values(&self) -> &[T] {
        &self.values
    }
}

impl<T: Display> Display for Atom<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "({}", self.predicate_name)?;
        for value in &self.values {
            write!(f, " {value}")?;
        }
        write!(f, ")")
    }
}
