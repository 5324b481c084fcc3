use crate::parsed_types::{Name, PredicateDefinition};
use crate::search::{PredicateTag, TypeHierarchy};

/// An indexed predicate. Indices are dense and contiguous per tag.
#[derive(Debug, Clone)]
pub struct Predicate {
    pub name: Name,
    /// Index within the predicates of the same tag.
    pub index: usize,
    pub tag: PredicateTag,
    pub arity: usize,
    /// Per argument position, the primitive type alternatives accepted there.
    pub parameter_types: Vec<Vec<usize>>,
}

impl Predicate {
    pub fn new(
        index: usize,
        tag: PredicateTag,
        definition: &PredicateDefinition,
        types: &TypeHierarchy,
    ) -> Self {
        let parameter_types = definition
            .variables()
            .iter()
            .map(|variable| {
                variable
                    .type_()
                    .primitives()
                    .iter()
                    .map(|primitive| {
                        types
                            .index_of(primitive.name())
                            .expect("predicate argument type not declared in the domain")
                    })
                    .collect()
            })
            .collect();

        Self {
            name: definition.name().clone(),
            index,
            tag,
            arity: definition.variables().len(),
            parameter_types,
        }
    }
}
