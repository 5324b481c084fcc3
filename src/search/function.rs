use crate::parsed_types::{FunctionDeclaration, Name};
use crate::search::{FunctionTag, TypeHierarchy};

/// An indexed function skeleton. Indices are dense and contiguous per tag.
#[derive(Debug, Clone)]
pub struct FunctionSkeleton {
    pub name: Name,
    /// Index within the function skeletons of the same tag.
    pub index: usize,
    pub tag: FunctionTag,
    pub arity: usize,
    /// Per argument position, the primitive type alternatives accepted there.
    pub parameter_types: Vec<Vec<usize>>,
}

impl FunctionSkeleton {
    pub fn new(
        index: usize,
        tag: FunctionTag,
        declaration: &FunctionDeclaration,
        types: &TypeHierarchy,
    ) -> Self {
        let parameter_types = declaration
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
                            .expect("function argument type not declared in the domain")
                    })
                    .collect()
            })
            .collect();

        Self {
            name: declaration.name().clone(),
            index,
            tag,
            arity: declaration.variables().len(),
            parameter_types,
        }
    }
}
