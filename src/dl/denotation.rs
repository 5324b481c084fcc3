//! Denotations and the per-(constructor, state) evaluation cache.

use crate::dl::{BooleanId, ConceptId, NumericalId, RoleId};
use crate::search::StateId;
use bit_set::BitSet;
use std::collections::HashMap;
use std::rc::Rc;

/// The denotation of a concept: a canonical sorted set of object indices.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct ConceptDenotation {
    objects: Vec<u32>,
}

impl ConceptDenotation {
    pub fn from_bitset(set: &BitSet) -> Self {
        Self {
            objects: set.iter().map(|o| o as u32).collect(),
        }
    }

    pub fn from_sorted(objects: Vec<u32>) -> Self {
        debug_assert!(objects.windows(2).all(|w| w[0] < w[1]));
        Self { objects }
    }

    pub fn to_bitset(&self) -> BitSet {
        let mut set = BitSet::new();
        for &object in &self.objects {
            set.insert(object as usize);
        }
        set
    }

    pub fn objects(&self) -> &[u32] {
        &self.objects
    }

    pub fn contains(&self, object: u32) -> bool {
        self.objects.binary_search(&object).is_ok()
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

/// The denotation of a role: a canonical sorted set of object pairs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct RoleDenotation {
    pairs: Vec<(u32, u32)>,
}

impl RoleDenotation {
    pub fn new(mut pairs: Vec<(u32, u32)>) -> Self {
        pairs.sort_unstable();
        pairs.dedup();
        Self { pairs }
    }

    pub fn pairs(&self) -> &[(u32, u32)] {
        &self.pairs
    }

    pub fn contains(&self, pair: (u32, u32)) -> bool {
        self.pairs.binary_search(&pair).is_ok()
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Successors of `source`, i.e. all `b` with `(source, b)` in the role.
    pub fn successors(&self, source: u32) -> impl Iterator<Item = u32> + '_ {
        let begin = self.pairs.partition_point(|&(a, _)| a < source);
        self.pairs[begin..]
            .iter()
            .take_while(move |&&(a, _)| a == source)
            .map(|&(_, b)| b)
    }
}

/// Append-only denotation caches keyed by (constructor index, state).
/// Entries are never invalidated.
#[derive(Debug, Default)]
pub struct DenotationCaches {
    pub(crate) concepts: HashMap<(ConceptId, StateId), Rc<ConceptDenotation>>,
    pub(crate) roles: HashMap<(RoleId, StateId), Rc<RoleDenotation>>,
    pub(crate) booleans: HashMap<(BooleanId, StateId), bool>,
    pub(crate) numericals: HashMap<(NumericalId, StateId), u32>,
}

impl DenotationCaches {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.concepts.len() + self.roles.len() + self.booleans.len() + self.numericals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
