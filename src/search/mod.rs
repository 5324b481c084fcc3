//! The planning core: formalism values indexed from a parsed task, the
//! lifted-to-ground pipeline, compiled applicable-action dispatch, axiom
//! evaluation, delete-relaxed heuristics, and thin search drivers.

pub mod axioms;
pub mod grounding;
pub mod heuristics;
pub mod match_tree;
pub mod search_engines;
pub mod states;

mod action_schema;
mod applicable_actions;
mod atoms;
mod axiom_schema;
mod condition;
mod function;
mod goal;
mod negatable;
mod numeric;
mod object;
mod object_tuple;
mod plan;
mod predicate;
mod tags;
mod task;
mod types;

pub use action_schema::{
    ActionSchema, ConditionalEffectSchema, ConjunctiveEffect, SchemaNumericEffect,
};
pub use applicable_actions::{
    ApplicableActionGenerator, GroundedApplicableActionGenerator,
    LiftedApplicableActionGenerator, SearchMode,
};
pub use atoms::{AtomRepository, GroundAtom, GroundFunction, GroundFunctionRepository};
pub use axiom_schema::AxiomSchema;
pub use condition::{
    ConjunctiveCondition, GroundConjunctiveCondition, NumericConstraint, Parameter, SchemaArgument,
    SchemaAtom, SchemaFunctionExpression,
};
pub use function::FunctionSkeleton;
pub use goal::Goal;
pub use heuristics::{Heuristic, HeuristicValue};
pub use negatable::Negatable;
pub use numeric::{Bounds, GroundFunctionExpression, GroundNumericConstraint};
pub use object::Object;
pub(crate) use object_tuple::object_tuple;
pub use object_tuple::ObjectTuple;
pub use plan::{Plan, PlanStep};
pub use predicate::Predicate;
pub use states::{State, StateId, StateRepository};
pub use tags::{
    FunctionTag, PerFunctionTag, PerTag, PredicateTag, PREDICATE_TAGS,
};
pub use task::{Task, EQUALITY_PREDICATE_NAME};
pub use types::TypeHierarchy;
