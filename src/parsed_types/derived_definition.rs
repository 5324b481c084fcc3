use crate::parsed_types::{Condition, Name, TypedList, Variable};

/// A derived-predicate rule `(:derived (<predicate> <typed vars>) <condition>)`.
#[derive(Debug, Clone, PartialEq)]
pub struct DerivedDefinition {
    predicate_name: Name,
    parameters: TypedList<Variable>,
    condition: Condition,
}

impl DerivedDefinition {
    pub const fn new(
        predicate_name: Name,
        parameters: TypedList<Variable>,
        condition: Condition,
    ) -> Self {
        Self {
            predicate_name,
            parameters,
            condition,
        }
    }

    pub fn predicate_name(&self) -> &Name {
        &self.predicate_name
    }

    pub fn parameters(&self) -> &TypedList<Variable> {
        &self.parameters
    }

    pub fn condition(&self) -> &Condition {
        &self.condition
    }
}
