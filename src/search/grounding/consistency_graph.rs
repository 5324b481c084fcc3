//! The static consistency graph: an overapproximation of the partial
//! parameter bindings satisfiable under the *static* constraints of a
//! conjunctive condition. Fluent and derived literals are filtered per state
//! by the binding generator.

use crate::search::grounding::{
    constraint_possibly_satisfiable, StaticAssignmentSets,
};
use crate::search::{ConjunctiveCondition, Parameter, PredicateTag, Task};

/// A vertex `[parameter_index/object_index]` in the consistency graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Vertex {
    pub index: usize,
    pub parameter_index: usize,
    pub object_index: usize,
}

/// The consistency graph of one conjunctive condition over the parameter
/// range `[begin_parameter, end_parameter)`. Edges connect vertices of
/// different parameters whose pair assignment survives all static binary
/// constraints; the adjacency is CSR with per-vertex spans pointing at
/// higher-parameter vertices only.
#[derive(Debug)]
pub struct StaticConsistencyGraph {
    begin_parameter: usize,
    num_condition_parameters: usize,
    vertices: Vec<Vertex>,
    /// Vertex indices grouped by `parameter_index - begin_parameter`.
    vertices_by_parameter: Vec<Vec<usize>>,
    /// Object indices grouped by `parameter_index - begin_parameter`.
    objects_by_parameter: Vec<Vec<usize>>,
    /// CSR target spans per vertex; targets sorted ascending.
    target_offsets: Vec<usize>,
    targets: Vec<u32>,
}

impl StaticConsistencyGraph {
    /// Builds the graph for `condition` restricted to parameters in
    /// `[begin_parameter, end_parameter)`. For an action condition the range
    /// covers all parameters; for a universal effect it covers only the
    /// effect's extra parameters.
    pub fn new(
        task: &Task,
        static_sets: &StaticAssignmentSets,
        condition: &ConjunctiveCondition,
        begin_parameter: usize,
        end_parameter: usize,
    ) -> Self {
        let num_condition_parameters = condition.parameters.len();
        let static_literals = condition.literals.get(PredicateTag::Static);

        /* Vertices. */
        let mut vertices: Vec<Vertex> = vec![];
        let mut vertices_by_parameter = vec![vec![]; end_parameter - begin_parameter];
        let mut objects_by_parameter = vec![vec![]; end_parameter - begin_parameter];
        let mut binding: Vec<Option<usize>> = vec![None; num_condition_parameters];
        for parameter_index in begin_parameter..end_parameter {
            let parameter: &Parameter = &condition.parameters[parameter_index];
            for object_index in task.legal_objects(&parameter.type_indices) {
                binding[parameter_index] = Some(object_index);
                let consistent = static_literals
                    .iter()
                    .all(|literal| !static_sets.predicates.refutes_literal(literal, &binding))
                    && condition.numeric_constraints.iter().all(|constraint| {
                        constraint_possibly_satisfiable(
                            constraint,
                            &static_sets.functions,
                            None,
                            &binding,
                        )
                    });
                binding[parameter_index] = None;
                if !consistent {
                    continue;
                }
                let index = vertices.len();
                vertices.push(Vertex {
                    index,
                    parameter_index,
                    object_index,
                });
                vertices_by_parameter[parameter_index - begin_parameter].push(index);
                objects_by_parameter[parameter_index - begin_parameter].push(object_index);
            }
        }

        /* Edges, CSR over source vertices. */
        let mut target_offsets = Vec::with_capacity(vertices.len() + 1);
        let mut targets: Vec<u32> = vec![];
        target_offsets.push(0);
        for v1 in &vertices {
            binding[v1.parameter_index] = Some(v1.object_index);
            for v2 in &vertices {
                if v2.parameter_index <= v1.parameter_index {
                    continue;
                }
                binding[v2.parameter_index] = Some(v2.object_index);
                let consistent = static_literals
                    .iter()
                    .all(|literal| !static_sets.predicates.refutes_literal(literal, &binding))
                    && condition.numeric_constraints.iter().all(|constraint| {
                        constraint_possibly_satisfiable(
                            constraint,
                            &static_sets.functions,
                            None,
                            &binding,
                        )
                    });
                binding[v2.parameter_index] = None;
                if consistent {
                    targets.push(v2.index as u32);
                }
            }
            binding[v1.parameter_index] = None;
            target_offsets.push(targets.len());
        }

        Self {
            begin_parameter,
            num_condition_parameters,
            vertices,
            vertices_by_parameter,
            objects_by_parameter,
            target_offsets,
            targets,
        }
    }

    pub fn begin_parameter(&self) -> usize {
        self.begin_parameter
    }

    pub fn num_condition_parameters(&self) -> usize {
        self.num_condition_parameters
    }

    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    pub fn num_vertices(&self) -> usize {
        self.vertices.len()
    }

    pub fn num_edges(&self) -> usize {
        self.targets.len()
    }

    /// Vertex indices partitioned by parameter, relative to
    /// `begin_parameter`.
    pub fn vertices_by_parameter(&self) -> &[Vec<usize>] {
        &self.vertices_by_parameter
    }

    /// Object indices partitioned by parameter, relative to
    /// `begin_parameter`.
    pub fn objects_by_parameter(&self) -> &[Vec<usize>] {
        &self.objects_by_parameter
    }

    /// Whether the edge `{source, target}` survives, with `source` the
    /// lower-parameter vertex.
    pub fn has_edge(&self, source: usize, target: usize) -> bool {
        debug_assert!(
            self.vertices[source].parameter_index < self.vertices[target].parameter_index
        );
        let span = &self.targets[self.target_offsets[source]..self.target_offsets[source + 1]];
        span.binary_search(&(target as u32)).is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::grounding::StaticAssignmentSets;
    use crate::search::Task;
    use crate::test_utils::*;
    use std::rc::Rc;

    fn move_graph(task: &Rc<Task>) -> StaticConsistencyGraph {
        let static_sets = StaticAssignmentSets::new(task);
        let schema = &task.action_schemas[0]; // move
        StaticConsistencyGraph::new(
            task,
            &static_sets,
            &schema.condition,
            0,
            schema.condition.parameters.len(),
        )
    }

    #[test]
    fn static_inequality_removes_self_loop_edges() {
        let task = Rc::new(Task::from_text(GRIPPER_DOMAIN_TEXT, GRIPPER_PROBLEM_TEXT));
        let graph = move_graph(&task);

        // two candidate rooms per parameter survive as vertices
        assert_eq!(graph.num_vertices(), 4);
        assert_eq!(graph.vertices_by_parameter()[0].len(), 2);
        assert_eq!(graph.vertices_by_parameter()[1].len(), 2);
        // only the two off-diagonal bindings survive as edges
        assert_eq!(graph.num_edges(), 2);

        for &source in &graph.vertices_by_parameter()[0] {
            for &target in &graph.vertices_by_parameter()[1] {
                let consistent = graph.has_edge(source, target);
                let same_object = graph.vertices()[source].object_index
                    == graph.vertices()[target].object_index;
                assert_eq!(consistent, !same_object);
            }
        }
    }

    #[test]
    fn adding_a_static_literal_never_adds_vertices_or_edges() {
        // the same schema with the static inequality dropped is a superset
        let strict_task = Rc::new(Task::from_text(GRIPPER_DOMAIN_TEXT, GRIPPER_PROBLEM_TEXT));
        let relaxed_domain = GRIPPER_DOMAIN_TEXT.replace("(not (= ?from ?to))", "");
        let relaxed_task = Rc::new(Task::from_text(&relaxed_domain, GRIPPER_PROBLEM_TEXT));

        let strict = move_graph(&strict_task);
        let relaxed = move_graph(&relaxed_task);

        assert!(strict.num_vertices() <= relaxed.num_vertices());
        assert!(strict.num_edges() <= relaxed.num_edges());
        assert_eq!(relaxed.num_edges(), 4);
    }
}
