//! Contains variables.

use crate::parsed_types::Name;
use std::fmt::{self, Display, Formatter};
use std::ops::Deref;

/// A variable name. The leading `?` is not part of the name.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub struct Variable(Name);

impl Variable {
    #[inline(always)]
    pub const fn new(name: Name) -> Self {
        Self(name)
    }

    #[inline(always)]
    pub fn name(&self) -> &Name {
        &self.0
    }
}

impl From<&str> for Variable {
    #[inline(always)]
    fn from(value: &str) -> Self {
        Variable::new(value.into())
    }
}

impl From<Name> for Variable {
    #[inline(always)]
    fn from(value: Name) -> Self {
        Variable::new(value)
    }
}

impl AsRef<Name> for Variable {
    #[inline(always)]
    fn as_ref(&self) -> &Name {
        &self.0
    }
}

impl Deref for Variable {
    type Target = Name;

    #[inline(always)]
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl Display for Variable {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "?{}", self.0)
    }
}
