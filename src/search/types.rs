use crate::parsed_types::{Name, Types, TYPE_OBJECT};
use std::collections::HashMap;

/// The domain's type hierarchy. Declared types form a forest rooted at
/// `object`; `ancestors` is the reflexive-transitive closure of the parent
/// relation. Subsumption `is_subtypeeq` is antisymmetric and transitive by
/// construction.
#[derive(Debug, Clone)]
pub struct TypeHierarchy {
    names: Vec<Name>,
    table: HashMap<Name, usize>,
    /// `ancestors[t]` contains `t` and every supertype of `t`, sorted.
    ancestors: Vec<Vec<usize>>,
}

impl TypeHierarchy {
    pub fn new(types: &Types) -> Self {
        let mut names: Vec<Name> = vec![];
        let mut table: HashMap<Name, usize> = HashMap::new();
        let mut intern = |name: &Name, names: &mut Vec<Name>, table: &mut HashMap<Name, usize>| {
            *table.entry(name.clone()).or_insert_with(|| {
                names.push(name.clone());
                names.len() - 1
            })
        };

        // `object` always exists, even in untyped domains.
        let object_name = Name::from(TYPE_OBJECT);
        intern(&object_name, &mut names, &mut table);

        let mut parents: Vec<Option<usize>> = vec![None];
        for typed in types.values() {
            let index = intern(typed.value(), &mut names, &mut table);
            if index >= parents.len() {
                parents.resize(index + 1, None);
            }
            for primitive in typed.type_().primitives() {
                let parent = intern(primitive.name(), &mut names, &mut table);
                if parent >= parents.len() {
                    parents.resize(parent + 1, None);
                }
                if parent != index {
                    parents[index] = Some(parent);
                }
            }
        }
        parents.resize(names.len(), None);

        let mut ancestors = Vec::with_capacity(names.len());
        for index in 0..names.len() {
            let mut chain = vec![index];
            let mut current = index;
            while let Some(parent) = parents[current] {
                if chain.contains(&parent) {
                    break;
                }
                chain.push(parent);
                current = parent;
            }
            // every type is an `object`
            if !chain.contains(&0) {
                chain.push(0);
            }
            chain.sort_unstable();
            ancestors.push(chain);
        }

        Self {
            names,
            table,
            ancestors,
        }
    }

    pub fn index_of(&self, name: &Name) -> Option<usize> {
        self.table.get(name).copied()
    }

    pub fn name(&self, index: usize) -> &Name {
        &self.names[index]
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// `sub` and all its supertypes, sorted ascending.
    pub fn ancestors(&self, sub: usize) -> &[usize] {
        &self.ancestors[sub]
    }

    /// True iff `sub` is `sup` or a descendant of `sup`.
    pub fn is_subtypeeq(&self, sub: usize, sup: usize) -> bool {
        self.ancestors[sub].binary_search(&sup).is_ok()
    }
}
