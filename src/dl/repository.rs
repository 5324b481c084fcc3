//! Interning repositories for the constructor algebra: equal constructors
//! are stored once and identified by a dense index, so comparison is index
//! equality.

use crate::dl::{Boolean, BooleanId, Concept, ConceptId, Numerical, NumericalId, Role, RoleId};
use std::collections::HashMap;
use std::hash::Hash;

#[derive(Debug)]
struct Interner<T> {
    values: Vec<T>,
    table: HashMap<T, u32>,
}

impl<T> Default for Interner<T> {
    fn default() -> Self {
        Self {
            values: vec![],
            table: HashMap::new(),
        }
    }
}

impl<T: Clone + Eq + Hash> Interner<T> {
    fn get_or_create(&mut self, value: T) -> u32 {
        if let Some(&index) = self.table.get(&value) {
            return index;
        }
        let index = self.values.len() as u32;
        self.values.push(value.clone());
        self.table.insert(value, index);
        index
    }

    fn get(&self, index: u32) -> &T {
        &self.values[index as usize]
    }

    fn len(&self) -> usize {
        self.values.len()
    }
}

/// The per-tag constructor arenas.
#[derive(Debug, Default)]
pub struct Repositories {
    concepts: Interner<Concept>,
    roles: Interner<Role>,
    booleans: Interner<Boolean>,
    numericals: Interner<Numerical>,
}

impl Repositories {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_or_create_concept(&mut self, concept: Concept) -> ConceptId {
        self.concepts.get_or_create(concept)
    }

    pub fn get_or_create_role(&mut self, role: Role) -> RoleId {
        self.roles.get_or_create(role)
    }

    pub fn get_or_create_boolean(&mut self, boolean: Boolean) -> BooleanId {
        self.booleans.get_or_create(boolean)
    }

    pub fn get_or_create_numerical(&mut self, numerical: Numerical) -> NumericalId {
        self.numericals.get_or_create(numerical)
    }

    pub fn concept(&self, id: ConceptId) -> &Concept {
        self.concepts.get(id)
    }

    pub fn role(&self, id: RoleId) -> &Role {
        self.roles.get(id)
    }

    pub fn boolean(&self, id: BooleanId) -> &Boolean {
        self.booleans.get(id)
    }

    pub fn numerical(&self, id: NumericalId) -> &Numerical {
        self.numericals.get(id)
    }

    pub fn num_concepts(&self) -> usize {
        self.concepts.len()
    }

    pub fn num_roles(&self) -> usize {
        self.roles.len()
    }

    pub fn num_booleans(&self) -> usize {
        self.booleans.len()
    }

    pub fn num_numericals(&self) -> usize {
        self.numericals.len()
    }
}
