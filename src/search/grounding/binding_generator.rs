//! The satisficing binding generator: lazily enumerates the parameter
//! bindings of a conjunctive condition that hold in a given state, pruning
//! with the static consistency graph and the per-state assignment sets
//! before an exact check confirms each full binding.

use crate::search::grounding::{
    constraint_possibly_satisfiable, StateAssignmentSets, StaticAssignmentSets,
    StaticConsistencyGraph,
};
use crate::search::{ConjunctiveCondition, ObjectTuple, PredicateTag, State, Task};
use std::rc::Rc;

/// A reusable binding generator for one conjunctive condition.
#[derive(Debug)]
pub struct BindingGenerator {
    condition: ConjunctiveCondition,
    graph: StaticConsistencyGraph,
    static_sets: Rc<StaticAssignmentSets>,
}

impl BindingGenerator {
    pub fn new(
        task: &Task,
        static_sets: Rc<StaticAssignmentSets>,
        condition: ConjunctiveCondition,
    ) -> Self {
        let graph = StaticConsistencyGraph::new(
            task,
            &static_sets,
            &condition,
            0,
            condition.parameters.len(),
        );
        Self {
            condition,
            graph,
            static_sets,
        }
    }

    pub fn condition(&self) -> &ConjunctiveCondition {
        &self.condition
    }

    pub fn graph(&self) -> &StaticConsistencyGraph {
        &self.graph
    }

    /// Lazily yields every binding whose full ground condition holds in
    /// `state`. In relaxed mode, negative literals and numeric constraints
    /// are ignored (delete relaxation).
    pub fn bindings<'a>(
        &'a self,
        task: &'a Task,
        state: &'a State,
        state_sets: &'a StateAssignmentSets,
        relaxed: bool,
    ) -> BindingIter<'a> {
        let num_parameters = self.condition.parameters.len();
        BindingIter {
            generator: self,
            task,
            state,
            state_sets,
            relaxed,
            level: 0,
            cursor: vec![0; num_parameters],
            chosen: Vec::with_capacity(num_parameters),
            binding: vec![None; num_parameters],
            emitted_nullary: false,
            exhausted: false,
        }
    }
}

/// The explicit DFS state machine behind [`BindingGenerator::bindings`].
#[derive(Debug)]
pub struct BindingIter<'a> {
    generator: &'a BindingGenerator,
    task: &'a Task,
    state: &'a State,
    state_sets: &'a StateAssignmentSets,
    relaxed: bool,
    level: usize,
    cursor: Vec<usize>,
    chosen: Vec<usize>,
    binding: Vec<Option<usize>>,
    emitted_nullary: bool,
    exhausted: bool,
}

impl<'a> BindingIter<'a> {
    /// Assignment-set pruning of the partial binding after binding one more
    /// parameter.
    fn partial_binding_consistent(&self) -> bool {
        let condition = &self.generator.condition;
        for tag in [PredicateTag::Fluent, PredicateTag::Derived] {
            let sets = self.state_sets.for_tag(tag);
            for literal in condition.literals.get(tag) {
                if self.relaxed && literal.is_negated() {
                    continue;
                }
                if sets.refutes_literal(literal, &self.binding) {
                    return false;
                }
            }
        }
        if !self.relaxed {
            for constraint in &condition.numeric_constraints {
                if !constraint_possibly_satisfiable(
                    constraint,
                    &self.generator.static_sets.functions,
                    Some(&self.state_sets.fluent_functions),
                    &self.binding,
                ) {
                    return false;
                }
            }
        }
        true
    }
}

impl<'a> Iterator for BindingIter<'a> {
    type Item = ObjectTuple;

    fn next(&mut self) -> Option<ObjectTuple> {
        let condition = &self.generator.condition;
        let graph = &self.generator.graph;
        let num_parameters = condition.parameters.len();

        if num_parameters == 0 {
            if self.emitted_nullary || self.exhausted {
                return None;
            }
            self.emitted_nullary = true;
            return condition
                .is_satisfied_by(self.task, self.state, &[], self.relaxed)
                .then(ObjectTuple::new);
        }

        while !self.exhausted {
            let candidates = &graph.vertices_by_parameter()[self.level];
            if self.cursor[self.level] >= candidates.len() {
                // backtrack
                self.cursor[self.level] = 0;
                if self.level == 0 {
                    self.exhausted = true;
                    return None;
                }
                self.level -= 1;
                let vertex = self.chosen.pop().expect("levels and choices in sync");
                self.binding[graph.vertices()[vertex].parameter_index] = None;
                continue;
            }

            let vertex_index = candidates[self.cursor[self.level]];
            self.cursor[self.level] += 1;
            let vertex = graph.vertices()[vertex_index];

            // static pairwise consistency with every vertex chosen so far
            if !self
                .chosen
                .iter()
                .all(|&earlier| graph.has_edge(earlier, vertex_index))
            {
                continue;
            }

            self.binding[vertex.parameter_index] = Some(vertex.object_index);
            if !self.partial_binding_consistent() {
                self.binding[vertex.parameter_index] = None;
                continue;
            }

            if self.level + 1 == num_parameters {
                // full binding; the exact test confirms what pruning only
                // refuted
                let full: Vec<usize> = self
                    .binding
                    .iter()
                    .map(|object| object.expect("full binding"))
                    .collect();
                let satisfied =
                    condition.is_satisfied_by(self.task, self.state, &full, self.relaxed);
                self.binding[vertex.parameter_index] = None;
                if satisfied {
                    return Some(full.into_iter().collect());
                }
                continue;
            }

            self.chosen.push(vertex_index);
            self.level += 1;
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::grounding::StateAssignmentSets;
    use crate::search::Task;
    use crate::test_utils::*;
    use itertools::Itertools;

    /// Brute-force reference: every type-legal binding whose full ground
    /// condition holds in the state.
    fn brute_force_bindings(
        task: &Task,
        condition: &crate::search::ConjunctiveCondition,
        state: &State,
    ) -> Vec<ObjectTuple> {
        let domains: Vec<Vec<usize>> = condition
            .parameters
            .iter()
            .map(|parameter| task.legal_objects(&parameter.type_indices))
            .collect();
        domains
            .into_iter()
            .multi_cartesian_product()
            .filter(|binding| condition.is_satisfied_by(task, state, binding, false))
            .map(|binding| binding.into_iter().collect())
            .collect()
    }

    #[test]
    fn generator_is_sound_and_complete_on_gripper() {
        let task = std::rc::Rc::new(Task::from_text(GRIPPER_DOMAIN_TEXT, GRIPPER_PROBLEM_TEXT));
        let static_sets = Rc::new(crate::search::grounding::StaticAssignmentSets::new(&task));
        let mut state_sets = StateAssignmentSets::new(&task);
        let state = task.initial_state.clone();
        state_sets.rebuild(&task, &state);

        for schema in &task.action_schemas {
            let generator =
                BindingGenerator::new(&task, static_sets.clone(), schema.condition.clone());
            let mut produced: Vec<ObjectTuple> = generator
                .bindings(&task, &state, &state_sets, false)
                .collect();
            let mut expected = brute_force_bindings(&task, &schema.condition, &state);
            produced.sort();
            expected.sort();
            assert_eq!(produced, expected, "schema {}", schema.name);
        }
    }

    #[test]
    fn generator_is_sound_and_complete_with_numeric_constraints() {
        let task = std::rc::Rc::new(Task::from_text(FUEL_DOMAIN_TEXT, FUEL_PROBLEM_TEXT));
        let static_sets = Rc::new(crate::search::grounding::StaticAssignmentSets::new(&task));
        let mut state_sets = StateAssignmentSets::new(&task);
        let state = task.initial_state.clone();
        state_sets.rebuild(&task, &state);

        for schema in &task.action_schemas {
            let generator =
                BindingGenerator::new(&task, static_sets.clone(), schema.condition.clone());
            let mut produced: Vec<ObjectTuple> = generator
                .bindings(&task, &state, &state_sets, false)
                .collect();
            let mut expected = brute_force_bindings(&task, &schema.condition, &state);
            produced.sort();
            expected.sort();
            assert_eq!(produced, expected, "schema {}", schema.name);
        }
    }

    #[test]
    fn unsatisfiable_condition_yields_no_binding() {
        let task = std::rc::Rc::new(Task::from_text(
            GRIPPER_DOMAIN_TEXT,
            GRIPPER_UNSOLVABLE_PROBLEM_TEXT,
        ));
        let static_sets = Rc::new(crate::search::grounding::StaticAssignmentSets::new(&task));
        let mut state_sets = StateAssignmentSets::new(&task);
        let state = task.initial_state.clone();
        state_sets.rebuild(&task, &state);

        // pick requires at-robby, which never holds in this problem
        let pick = &task.action_schemas[1];
        let generator = BindingGenerator::new(&task, static_sets, pick.condition.clone());
        assert_eq!(
            generator
                .bindings(&task, &state, &state_sets, false)
                .count(),
            0
        );
    }
}
