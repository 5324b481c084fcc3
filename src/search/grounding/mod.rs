//! The lifted-to-ground pipeline: assignment sets, the static consistency
//! graph, the satisficing binding generator, the grounder, and delete-
//! relaxed reachability.

mod assignment_set;
mod binding_generator;
mod consistency_graph;
mod delete_relaxation;
mod grounder;

pub use assignment_set::{
    constraint_possibly_satisfiable, EdgeAssignment, FunctionAssignmentSets,
    FunctionSkeletonAssignmentSet, PerfectAssignmentHash, PredicateAssignmentSet,
    PredicateAssignmentSets, StateAssignmentSets, StaticAssignmentSets, VertexAssignment,
};
pub use binding_generator::{BindingGenerator, BindingIter};
pub use consistency_graph::{StaticConsistencyGraph, Vertex};
pub use delete_relaxation::DeleteRelaxedProblemExplorator;
pub use grounder::{
    ground_condition, GroundAction, GroundAxiom, GroundConditionalEffect, GroundEffect,
    GroundNumericEffect, Grounder,
};
