use crate::parsed_types::{Name, Typed};
use crate::search::TypeHierarchy;

/// An indexed object (problem object or domain constant).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Object {
    pub name: Name,
    pub index: usize,
    /// The declared types of the object.
    pub types: Vec<usize>,
    /// The declared types and all their supertypes, sorted.
    pub type_closure: Vec<usize>,
}

impl Object {
    pub fn new(index: usize, object: &Typed<Name>, types: &TypeHierarchy) -> Self {
        let declared: Vec<usize> = object
            .type_()
            .primitives()
            .iter()
            .map(|primitive| {
                types
                    .index_of(primitive.name())
                    .expect("object type not declared in the domain")
            })
            .collect();

        let mut type_closure: Vec<usize> = declared
            .iter()
            .flat_map(|&t| types.ancestors(t).iter().copied())
            .collect();
        type_closure.sort_unstable();
        type_closure.dedup();

        Self {
            name: object.value().clone(),
            index,
            types: declared,
            type_closure,
        }
    }

    /// True iff this object may instantiate a parameter accepting any of
    /// `parameter_types` (PDDL either-type semantics).
    pub fn is_subtypeeq(&self, parameter_types: &[usize]) -> bool {
        parameter_types
            .iter()
            .any(|t| self.type_closure.binary_search(t).is_ok())
    }
}
