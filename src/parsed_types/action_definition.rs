use crate::parsed_types::{Condition, Effect, Name, TypedList, Variable};

/// An action schema definition.
#[derive(Debug, Clone, PartialEq)]
pub struct ActionDefinition {
    name: Name,
    parameters: TypedList<Variable>,
    precondition: Option<Condition>,
    effect: Option<Effect>,
}

impl ActionDefinition {
    pub const fn new(
        name: Name,
        parameters: TypedList<Variable>,
        precondition: Option<Condition>,
        effect: Option<Effect>,
    ) -> Self {
        Self {
            name,
            parameters,
            precondition,
            effect,
        }
    }

    pub fn name(&self) -> &Name {
        &self.name
    }

    pub fn parameters(&self) -> &TypedList<Variable> {
        &self.parameters
    }

    pub fn precondition(&self) -> Option<&Condition> {
        self.precondition.as_ref()
    }

    pub fn effect(&self) -> Option<&Effect> {
        self.effect.as_ref()
    }
}
