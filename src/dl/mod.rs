//! The description-logic feature language: a typed constructor algebra over
//! Concept/Role/Boolean/Numerical tags, denotation-based evaluation with a
//! per-state cache, and a CNF-normalised grammar driving systematic feature
//! enumeration with refinement pruning.

pub mod grammar;

mod constructors;
mod denotation;
mod evaluation;
mod repository;

pub use constructors::{
    Boolean, BooleanId, Concept, ConceptId, Numerical, NumericalId, Role, RoleId,
    INFINITY_NUMERICAL,
};
pub use denotation::{ConceptDenotation, DenotationCaches, RoleDenotation};
pub use evaluation::{
    evaluate_boolean, evaluate_concept, evaluate_numerical, evaluate_role, EvaluationContext,
};
pub use repository::Repositories;
