use crate::parsed_types::{
    ActionDefinition, DerivedDefinition, FunctionDeclaration, Name, PredicateDefinition,
    Requirement, TypedList, Types,
};

/// A parsed PDDL domain.
#[derive(Debug, Clone, PartialEq)]
pub struct Domain {
    name: Name,
    requirements: Vec<Requirement>,
    types: Types,
    constants: TypedList<Name>,
    predicates: Vec<PredicateDefinition>,
    functions: Vec<FunctionDeclaration>,
    actions: Vec<ActionDefinition>,
    deriveds: Vec<DerivedDefinition>,
}

impl Domain {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        name: Name,
        requirements: Vec<Requirement>,
        types: Types,
        constants: TypedList<Name>,
        predicates: Vec<PredicateDefinition>,
        functions: Vec<FunctionDeclaration>,
        actions: Vec<ActionDefinition>,
        deriveds: Vec<DerivedDefinition>,
    ) -> Self {
        Self {
            name,
            requirements,
            types,
            constants,
            predicates,
            functions,
            actions,
            deriveds,
        }
    }

    pub fn name(&self) -> &Name {
        &self.name
    }

    pub fn requirements(&self) -> &[Requirement] {
        &self.requirements
    }

    pub fn types(&self) -> &Types {
        &self.types
    }

    pub fn constants(&self) -> &TypedList<Name> {
        &self.constants
    }

    pub fn predicates(&self) -> &[PredicateDefinition] {
        &self.predicates
    }

    pub fn functions(&self) -> &[FunctionDeclaration] {
        &self.functions
    }

    pub fn actions(&self) -> &[ActionDefinition] {
        &self.actions
    }

    pub fn deriveds(&self) -> &[DerivedDefinition] {
        &self.deriveds
    }
}
