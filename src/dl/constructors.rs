//! The typed constructor algebra of the feature language. Constructors are
//! tagged unions referencing each other through dense interned indices.

use crate::search::PredicateTag;

pub type ConceptId = u32;
pub type RoleId = u32;
pub type BooleanId = u32;
pub type NumericalId = u32;

/// A concept constructor; denotes a set of objects.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Concept {
    Top,
    Bot,
    /// All objects `o` with `(p o)` true in the state (arity-1 predicate).
    AtomicState(PredicateTag, usize),
    /// All objects `o` with `(p o)` in the goal, with the given polarity.
    AtomicGoal(PredicateTag, usize, bool),
    Intersection(ConceptId, ConceptId),
    Union(ConceptId, ConceptId),
    Negation(ConceptId),
    /// `{ a | forall b: (a,b) in r implies b in c }`
    ValueRestriction(RoleId, ConceptId),
    /// `{ a | exists b: (a,b) in r and b in c }`
    ExistentialQuantification(RoleId, ConceptId),
    /// `{ a | forall b: (a,b) in r implies (a,b) in s }`
    RoleValueMapContainment(RoleId, RoleId),
    /// `{ a | forall b: (a,b) in r iff (a,b) in s }`
    RoleValueMapEquality(RoleId, RoleId),
    Nominal(usize),
}

/// A role constructor; denotes a set of object pairs.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Role {
    Universal,
    /// All pairs `(a,b)` with `(p a b)` true in the state (arity-2
    /// predicate).
    AtomicState(PredicateTag, usize),
    AtomicGoal(PredicateTag, usize, bool),
    Intersection(RoleId, RoleId),
    Union(RoleId, RoleId),
    Complement(RoleId),
    Inverse(RoleId),
    Composition(RoleId, RoleId),
    TransitiveClosure(RoleId),
    ReflexiveTransitiveClosure(RoleId),
    /// `{ (a,b) in r | b in c }`
    Restriction(RoleId, ConceptId),
    /// `{ (a,a) | a in c }`
    Identity(ConceptId),
}

/// A boolean constructor; denotes a truth value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Boolean {
    /// The truth of a nullary predicate.
    AtomicState(PredicateTag, usize),
    NonemptyConcept(ConceptId),
    NonemptyRole(RoleId),
}

/// A numerical constructor; denotes an unsigned value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Numerical {
    CountConcept(ConceptId),
    CountRole(RoleId),
    /// Shortest role-path length between two concepts;
    /// [`INFINITY_NUMERICAL`] if unreachable.
    Distance(ConceptId, RoleId, ConceptId),
}

/// The unreachable-distance sentinel.
pub const INFINITY_NUMERICAL: u32 = u32::MAX;
