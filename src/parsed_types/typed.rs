//! Contains typed elements and lists thereof.

use crate::parsed_types::{Name, Type};
use std::ops::Deref;

/// A typed element.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Typed<O>(O, Type);

impl<O> Typed<O> {
    pub const fn new(value: O, r#type: Type) -> Self {
        Self(value, r#type)
    }

    pub fn new_object(value: O) -> Self {
        Self::new(value, Type::object())
    }

    /// Gets the value.
    pub const fn value(&self) -> &O {
        &self.0
    }

    /// Gets the assigned type.
    pub const fn type_(&self) -> &Type {
        &self.1
    }
}

impl<O> From<O> for Typed<O> {
    fn from(value: O) -> Self {
        Typed::new_object(value)
    }
}

impl<O> Deref for Typed<O> {
    type Target = O;

    fn deref(&self) -> &Self::Target {
        self.value()
    }
}

/// A list of typed elements, e.g. `a b - t1 c - t2`.
#[derive(Debug, Default, Clone, Eq, PartialEq)]
pub struct TypedList<T>(Vec<Typed<T>>);

impl<T> TypedList<T> {
    pub const fn new(list: Vec<Typed<T>>) -> Self {
        Self(list)
    }

    /// Gets the values.
    pub fn value(&self) -> &[Typed<T>] {
        self.0.as_slice()
    }
}

impl<T> From<Vec<Typed<T>>> for TypedList<T> {
    fn from(list: Vec<Typed<T>>) -> Self {
        TypedList::new(list)
    }
}

impl<T> FromIterator<Typed<T>> for TypedList<T> {
    fn from_iter<I: IntoIterator<Item = Typed<T>>>(iter: I) -> Self {
        TypedList::new(iter.into_iter().collect())
    }
}

impl<T> Deref for TypedList<T> {
    type Target = [Typed<T>];

    fn deref(&self) -> &Self::Target {
        self.0.as_slice()
    }
}

impl<T> IntoIterator for TypedList<T> {
    type Item = Typed<T>;
    type IntoIter = std::vec::IntoIter<Typed<T>>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

/// The type declarations of a domain, i.e. the body of `(:types ...)`. Each
/// entry assigns a declared type name to its parent type.
#[derive(Debug, Default, Clone, Eq, PartialEq)]
pub struct Types(TypedList<Name>);

impl Types {
    pub const fn new(list: TypedList<Name>) -> Self {
        Self(list)
    }

    pub fn values(&self) -> &[Typed<Name>] {
        self.0.value()
    }

    pub fn get(&self, index: usize) -> Option<&Typed<Name>> {
        self.0.value().get(index)
    }

    pub fn len(&self) -> usize {
        self.0.value().len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.value().is_empty()
    }
}

impl From<TypedList<Name>> for Types {
    fn from(list: TypedList<Name>) -> Self {
        Self::new(list)
    }
}

impl Deref for Types {
    type Target = TypedList<Name>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}
