//! Interning repositories for ground atoms and ground functions. A ground
//! atom is canonical per (predicate, objects); repositories hand out dense
//! `u32` indices and never drop entries. Interior mutability lets the
//! repositories grow while the owning task is shared.

use crate::search::{ObjectTuple, Task};
use std::cell::RefCell;
use std::collections::HashMap;

/// A ground atom, identified by its dense index within one predicate tag.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GroundAtom {
    pub index: u32,
    pub predicate_index: usize,
    pub objects: ObjectTuple,
}

#[derive(Debug, Default)]
struct AtomRepositoryInner {
    atoms: Vec<GroundAtom>,
    table: HashMap<(usize, ObjectTuple), u32>,
}

/// An interning repository for the ground atoms of one predicate tag.
#[derive(Debug, Default)]
pub struct AtomRepository {
    inner: RefCell<AtomRepositoryInner>,
}

impl AtomRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Interns `(predicate, objects)` and returns its stable index.
    pub fn get_or_create(&self, predicate_index: usize, objects: &ObjectTuple) -> u32 {
        let mut inner = self.inner.borrow_mut();
        if let Some(&index) = inner.table.get(&(predicate_index, objects.clone())) {
            return index;
        }
        let index = inner.atoms.len() as u32;
        inner.atoms.push(GroundAtom {
            index,
            predicate_index,
            objects: objects.clone(),
        });
        inner.table.insert((predicate_index, objects.clone()), index);
        index
    }

    /// Looks up `(predicate, objects)` without interning.
    pub fn find(&self, predicate_index: usize, objects: &ObjectTuple) -> Option<u32> {
        self.inner
            .borrow()
            .table
            .get(&(predicate_index, objects.clone()))
            .copied()
    }

    pub fn get(&self, index: u32) -> GroundAtom {
        self.inner.borrow().atoms[index as usize].clone()
    }

    pub fn predicate_index(&self, index: u32) -> usize {
        self.inner.borrow().atoms[index as usize].predicate_index
    }

    pub fn objects(&self, index: u32) -> ObjectTuple {
        self.inner.borrow().atoms[index as usize].objects.clone()
    }

    pub fn len(&self) -> usize {
        self.inner.borrow().atoms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// All atom indices, in insertion order.
    pub fn indices(&self) -> Vec<u32> {
        (0..self.len() as u32).collect()
    }
}

/// A ground function, identified by its dense index within one function tag.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GroundFunction {
    pub index: u32,
    pub function_index: usize,
    pub objects: ObjectTuple,
}

#[derive(Debug, Default)]
struct FunctionRepositoryInner {
    functions: Vec<GroundFunction>,
    table: HashMap<(usize, ObjectTuple), u32>,
}

/// An interning repository for the ground functions of one function tag.
#[derive(Debug, Default)]
pub struct GroundFunctionRepository {
    inner: RefCell<FunctionRepositoryInner>,
}

impl GroundFunctionRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_or_create(&self, function_index: usize, objects: &ObjectTuple) -> u32 {
        let mut inner = self.inner.borrow_mut();
        if let Some(&index) = inner.table.get(&(function_index, objects.clone())) {
            return index;
        }
        let index = inner.functions.len() as u32;
        inner.functions.push(GroundFunction {
            index,
            function_index,
            objects: objects.clone(),
        });
        inner.table.insert((function_index, objects.clone()), index);
        index
    }

    pub fn find(&self, function_index: usize, objects: &ObjectTuple) -> Option<u32> {
        self.inner
            .borrow()
            .table
            .get(&(function_index, objects.clone()))
            .copied()
    }

    pub fn get(&self, index: u32) -> GroundFunction {
        self.inner.borrow().functions[index as usize].clone()
    }

    pub fn len(&self) -> usize {
        self.inner.borrow().functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl GroundAtom {
    /// Renders the atom as `(predicate obj ...)`.
    pub fn human_readable(&self, task: &Task, tag: crate::search::PredicateTag) -> String {
        let predicate = &task.predicates.get(tag)[self.predicate_index];
        let mut out = format!("({}", predicate.name);
        for &object in &self.objects {
            out.push(' ');
            out.push_str(&task.objects[object].name);
        }
        out.push(')');
        out
    }
}
