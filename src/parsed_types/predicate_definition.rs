use crate::parsed_types::{Name, TypedList, Variable};

/// A predicate declaration in the `(:predicates ...)` section.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct PredicateDefinition {
    name: Name,
    variables: TypedList<Variable>,
}

impl PredicateDefinition {
    pub const fn new(name: Name, variables: TypedList<Variable>) -> Self {
        Self { name, variables }
    }

    pub fn name(&self) -> &Name {
        &self.name
    }

    pub fn variables(&self) -> &TypedList<Variable> {
        &self.variables
    }
}
