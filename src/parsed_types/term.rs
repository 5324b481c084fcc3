use crate::parsed_types::{Name, Variable};
use std::fmt::{self, Display, Formatter};

/// A term, i.e. a [`Name`] (constant) or a [`Variable`].
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub enum Term {
    Name(Name),
    Variable(Variable),
}

impl From<Name> for Term {
    fn from(value: Name) -> Self {
        Self::Name(value)
    }
}

impl From<Variable> for Term {
    fn from(value: Variable) -> Self {
        Self::Variable(value)
    }
}

impl Display for Term {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Term::Name(name) => write!(f, "{name}"),
            Term::Variable(variable) => write!(f, "{variable}"),
        }
    }
}
