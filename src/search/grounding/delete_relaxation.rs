//! The delete-relaxed problem explorator: computes the ground action and
//! axiom pools (and the reachable fluent/derived atoms) by forward chaining
//! under the delete relaxation, ignoring negative literals and numeric
//! constraints.

use crate::search::grounding::{
    BindingGenerator, Grounder, StateAssignmentSets, StaticAssignmentSets,
};
use crate::search::{State, Task};
use std::collections::HashSet;
use std::rc::Rc;
use tracing::debug;

/// The result of delete-relaxed exploration. The grounder inside holds one
/// canonical ground action per (schema, binding) reachable under the
/// relaxation, and likewise for axioms; the task's atom repositories have
/// been enriched with every reachable atom.
#[derive(Debug)]
pub struct DeleteRelaxedProblemExplorator {
    task: Rc<Task>,
    static_sets: Rc<StaticAssignmentSets>,
    grounder: Grounder,
    action_generators: Vec<BindingGenerator>,
    axiom_generators: Vec<BindingGenerator>,
}

impl DeleteRelaxedProblemExplorator {
    pub fn new(task: Rc<Task>) -> Self {
        let static_sets = Rc::new(StaticAssignmentSets::new(&task));
        let mut grounder = Grounder::new(&task, static_sets.clone());

        let action_generators: Vec<BindingGenerator> = task
            .action_schemas
            .iter()
            .map(|schema| {
                BindingGenerator::new(&task, static_sets.clone(), schema.condition.clone())
            })
            .collect();
        let axiom_generators: Vec<BindingGenerator> = task
            .axiom_schemas
            .iter()
            .map(|schema| {
                BindingGenerator::new(&task, static_sets.clone(), schema.condition.clone())
            })
            .collect();

        /* Forward chaining to the fixpoint. */
        let mut relaxed_fluent: Vec<u32> = task.initial_state.fluent_atoms().to_vec();
        let mut relaxed_derived: Vec<u32> = vec![];
        let mut known_fluent: HashSet<u32> = relaxed_fluent.iter().copied().collect();
        let mut known_derived: HashSet<u32> = HashSet::new();
        let mut state_sets = StateAssignmentSets::new(&task);

        loop {
            let relaxed_state = State::new(
                relaxed_fluent.clone(),
                relaxed_derived.clone(),
                task.initial_state.numeric_values().to_vec(),
            );
            state_sets.rebuild(&task, &relaxed_state);

            let mut changed = false;
            for (schema_index, generator) in action_generators.iter().enumerate() {
                let bindings: Vec<_> = generator
                    .bindings(&task, &relaxed_state, &state_sets, true)
                    .collect();
                for binding in bindings {
                    let before = grounder.actions().len();
                    let index = grounder.ground_action(&task, schema_index, &binding);
                    if grounder.actions().len() == before {
                        continue;
                    }
                    changed = true;
                    let action = grounder.action(index);
                    let mut added: Vec<u32> = action.effect.add.clone();
                    for conditional in &action.conditional_effects {
                        added.extend(conditional.effect.add.iter().copied());
                    }
                    for atom in added {
                        if known_fluent.insert(atom) {
                            relaxed_fluent.push(atom);
                        }
                    }
                }
            }
            for (schema_index, generator) in axiom_generators.iter().enumerate() {
                let bindings: Vec<_> = generator
                    .bindings(&task, &relaxed_state, &state_sets, true)
                    .collect();
                for binding in bindings {
                    let before = grounder.axioms().len();
                    let index = grounder.ground_axiom(&task, schema_index, &binding);
                    if grounder.axioms().len() == before {
                        continue;
                    }
                    changed = true;
                    let head = grounder.axiom(index).head;
                    if known_derived.insert(head) {
                        relaxed_derived.push(head);
                    }
                }
            }

            if !changed {
                break;
            }
        }

        debug!(
            num_ground_actions = grounder.actions().len(),
            num_ground_axioms = grounder.axioms().len(),
            "delete-relaxed exploration finished"
        );

        Self {
            task,
            static_sets,
            grounder,
            action_generators,
            axiom_generators,
        }
    }

    pub fn task(&self) -> &Rc<Task> {
        &self.task
    }

    pub fn static_sets(&self) -> &Rc<StaticAssignmentSets> {
        &self.static_sets
    }

    pub fn grounder(&self) -> &Grounder {
        &self.grounder
    }

    pub fn action_generators(&self) -> &[BindingGenerator] {
        &self.action_generators
    }

    pub fn axiom_generators(&self) -> &[BindingGenerator] {
        &self.axiom_generators
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::PredicateTag;
    use crate::test_utils::*;

    #[test]
    fn gripper_pool_covers_every_reachable_ground_action() {
        let task = Rc::new(Task::from_text(GRIPPER_DOMAIN_TEXT, GRIPPER_PROBLEM_TEXT));
        let explorator = DeleteRelaxedProblemExplorator::new(task.clone());
        let grounder = explorator.grounder();

        // 2 moves (self-loops are statically inconsistent), 2*2*2 picks and
        // as many drops
        let mut counts = [0usize; 3];
        for action in grounder.actions() {
            counts[action.schema_index] += 1;
        }
        assert_eq!(counts, [2, 8, 8]);

        // every fluent atom is reachable under the relaxation: at/at-robby
        // over rooms, free/carry over grippers
        assert_eq!(task.atoms.get(PredicateTag::Fluent).len(), 2 + 4 + 2 + 4);
    }

    #[test]
    fn unreachable_actions_stay_out_of_the_pool() {
        let task = Rc::new(Task::from_text(
            GRIPPER_DOMAIN_TEXT,
            GRIPPER_UNSOLVABLE_PROBLEM_TEXT,
        ));
        let explorator = DeleteRelaxedProblemExplorator::new(task.clone());

        // without a robot position no action ever becomes applicable
        assert!(explorator.grounder().actions().is_empty());
    }

    #[test]
    fn axiom_heads_become_reachable_derived_atoms() {
        let task = Rc::new(Task::from_text(
            BLOCKS_DERIVED_DOMAIN_TEXT,
            BLOCKS_DERIVED_PROBLEM_TEXT,
        ));
        let explorator = DeleteRelaxedProblemExplorator::new(task.clone());

        assert!(!explorator.grounder().axioms().is_empty());
        // all ordered block pairs are relaxed-reachable above-facts
        assert_eq!(task.atoms.get(PredicateTag::Derived).len(), 9);
    }
}
