//! The state repository: canonical interned states and successor
//! generation.

use crate::parsed_types::AssignOp;
use crate::search::axioms::AxiomEvaluator;
use crate::search::grounding::{GroundAction, GroundEffect, GroundNumericEffect};
use crate::search::states::{State, StateId};
use crate::search::{FunctionTag, Task};
use ordered_float::OrderedFloat;
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

/// Maintains canonical interned states. Applying an action that is not
/// applicable in the given state is undefined behaviour; callers must
/// consult an applicable-action generator first.
#[derive(Debug)]
pub struct StateRepository {
    task: Rc<Task>,
    axiom_evaluator: Rc<AxiomEvaluator>,
    states: Vec<State>,
    table: HashMap<State, StateId>,
    initial: StateId,
}

impl StateRepository {
    pub fn new(task: Rc<Task>, axiom_evaluator: Rc<AxiomEvaluator>) -> Self {
        let mut repository = Self {
            task: task.clone(),
            axiom_evaluator,
            states: vec![],
            table: HashMap::new(),
            initial: 0,
        };
        // close the initial state under the axioms
        let derived = repository.axiom_evaluator.evaluate(
            task.initial_state.fluent_atoms(),
            task.initial_state.numeric_values(),
        );
        let initial = State::new(
            task.initial_state.fluent_atoms().to_vec(),
            derived,
            task.initial_state.numeric_values().to_vec(),
        );
        repository.initial = repository.get_or_insert(initial);
        repository
    }

    pub fn initial(&self) -> StateId {
        self.initial
    }

    pub fn get(&self, id: StateId) -> &State {
        &self.states[id]
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    pub fn get_or_insert(&mut self, state: State) -> StateId {
        if let Some(&id) = self.table.get(&state) {
            return id;
        }
        let id = self.states.len();
        self.states.push(state.clone());
        self.table.insert(state, id);
        id
    }

    /// Applies `action` to the state: conditional-effect guards are
    /// evaluated over the pre-state, deletes are cleared before adds are
    /// set, numeric effects run in order with auxiliary (plan-cost) effects
    /// last, and the derived atoms are re-closed under the axioms.
    pub fn apply(&mut self, action: &GroundAction, state_id: StateId) -> StateId {
        let pre_state = self.states[state_id].clone();

        let mut triggered: Vec<&GroundEffect> = vec![&action.effect];
        for conditional in &action.conditional_effects {
            if conditional.condition.is_satisfied(&pre_state) {
                triggered.push(&conditional.effect);
            }
        }

        let mut fluent: HashSet<u32> = pre_state.fluent_atoms().iter().copied().collect();
        for effect in &triggered {
            for &atom in &effect.delete {
                fluent.remove(&atom);
            }
        }
        for effect in &triggered {
            for &atom in &effect.add {
                fluent.insert(atom);
            }
        }

        // numeric update over the pre-state values, widened to the current
        // number of fluent ground functions
        let num_functions = self.task.ground_functions.get(FunctionTag::Fluent).len();
        let mut numeric: Vec<OrderedFloat<f64>> = pre_state.numeric_values().to_vec();
        numeric.resize(num_functions, OrderedFloat(f64::NAN));
        let mut ordinary: Vec<&GroundNumericEffect> = vec![];
        let mut auxiliary: Vec<&GroundNumericEffect> = vec![];
        for effect in &triggered {
            for numeric_effect in &effect.numeric_effects {
                if numeric_effect.is_auxiliary {
                    auxiliary.push(numeric_effect);
                } else {
                    ordinary.push(numeric_effect);
                }
            }
        }
        for numeric_effect in ordinary.into_iter().chain(auxiliary) {
            apply_numeric_effect(numeric_effect, &pre_state, &mut numeric);
        }

        let mut fluent: Vec<u32> = fluent.into_iter().collect();
        fluent.sort_unstable();
        let derived = self.axiom_evaluator.evaluate(&fluent, &numeric);
        let successor = State::new(fluent, derived, numeric);
        self.get_or_insert(successor)
    }
}

fn apply_numeric_effect(
    effect: &GroundNumericEffect,
    pre_state: &State,
    numeric: &mut [OrderedFloat<f64>],
) {
    let value = effect.expression.evaluate(pre_state);
    let target = effect.target as usize;
    let current = numeric[target].into_inner();
    let updated = match (effect.op, value) {
        (AssignOp::Assign, Some(value)) => value,
        (AssignOp::Increase, Some(value)) => current + value,
        (AssignOp::Decrease, Some(value)) => current - value,
        (_, None) => f64::NAN,
    };
    numeric[target] = OrderedFloat(updated);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::grounding::DeleteRelaxedProblemExplorator;
    use crate::search::{ApplicableActionGenerator, GroundedApplicableActionGenerator, PredicateTag};
    use crate::search::match_tree::MatchTreeOptions;
    use crate::test_utils::*;

    fn find_action(
        generator: &mut GroundedApplicableActionGenerator,
        task: &Task,
        state: &crate::search::State,
        readable: &str,
    ) -> crate::search::grounding::GroundAction {
        let candidates = generator.applicable_actions(state);
        for id in candidates {
            let action = generator.ground_action(id);
            if action.human_readable(task) == readable {
                return action.clone();
            }
        }
        panic!("action {readable} not applicable");
    }

    #[test]
    fn states_are_interned_canonically() {
        let task = Rc::new(Task::from_text(GRIPPER_DOMAIN_TEXT, GRIPPER_PROBLEM_TEXT));
        let explorator = Rc::new(DeleteRelaxedProblemExplorator::new(task.clone()));
        let mut repository = state_repository(&explorator);
        let mut generator =
            GroundedApplicableActionGenerator::new(explorator.clone(), MatchTreeOptions::default());

        let initial = repository.initial();
        let state = repository.get(initial).clone();
        let there = find_action(&mut generator, &task, &state, "(move rooma roomb)");
        let mid = repository.apply(&there, initial);
        assert_ne!(mid, initial);

        let mid_state = repository.get(mid).clone();
        let back = find_action(&mut generator, &task, &mid_state, "(move roomb rooma)");
        let round_trip = repository.apply(&back, mid);
        // moving there and back reaches the same interned state
        assert_eq!(round_trip, initial);
    }

    #[test]
    fn universal_conditional_effect_moves_loaded_items() {
        let task = Rc::new(Task::from_text(CONVEYOR_DOMAIN_TEXT, CONVEYOR_PROBLEM_TEXT));
        let explorator = Rc::new(DeleteRelaxedProblemExplorator::new(task.clone()));
        let mut repository = state_repository(&explorator);
        let mut generator =
            GroundedApplicableActionGenerator::new(explorator.clone(), MatchTreeOptions::default());

        let (_, item_at) = task.find_predicate("item-at").unwrap();
        let box_index = task.object_index("box").unwrap();
        let dock = task.object_index("dock").unwrap();
        let yard = task.object_index("yard").unwrap();
        let atoms = task.atoms.get(PredicateTag::Fluent);

        // driving with the box not loaded leaves it at the dock
        let initial = repository.initial();
        let state = repository.get(initial).clone();
        let drive = find_action(&mut generator, &task, &state, "(drive dock yard)");
        let unloaded = repository.apply(&drive, initial);
        let at_dock = atoms
            .find(item_at, &crate::search::object_tuple![box_index, dock])
            .unwrap();
        assert!(repository.get(unloaded).has_fluent_atom(at_dock));

        // loading first makes the conditional effect fire
        let load = find_action(&mut generator, &task, &state, "(load box dock)");
        let loaded = repository.apply(&load, initial);
        let loaded_state = repository.get(loaded).clone();
        let drive = find_action(&mut generator, &task, &loaded_state, "(drive dock yard)");
        let moved = repository.apply(&drive, loaded);
        let at_yard = atoms
            .find(item_at, &crate::search::object_tuple![box_index, yard])
            .unwrap();
        assert!(repository.get(moved).has_fluent_atom(at_yard));
        assert!(!repository.get(moved).has_fluent_atom(at_dock));
    }

    #[test]
    fn numeric_effects_update_the_numeric_state() {
        let task = Rc::new(Task::from_text(FUEL_DOMAIN_TEXT, FUEL_PROBLEM_TEXT));
        let explorator = Rc::new(DeleteRelaxedProblemExplorator::new(task.clone()));
        let mut repository = state_repository(&explorator);
        let mut generator =
            GroundedApplicableActionGenerator::new(explorator.clone(), MatchTreeOptions::default());

        let initial = repository.initial();
        let state = repository.get(initial).clone();
        assert_eq!(state.numeric_value(0), Some(1.0));

        // driving burns one unit of fuel
        let drive = find_action(&mut generator, &task, &state, "(drive t1 depot station)");
        let arrived = repository.apply(&drive, initial);
        let arrived_state = repository.get(arrived).clone();
        assert_eq!(arrived_state.numeric_value(0), Some(0.0));

        // with the tank empty, driving is no longer applicable
        assert!(!generator
            .applicable_actions(&arrived_state)
            .into_iter()
            .any(|id| generator.ground_action(id).human_readable(&task).starts_with("(drive")));

        // refuelling assigns the static capacity
        let refuel = find_action(&mut generator, &task, &arrived_state, "(refuel t1 station)");
        let refuelled = repository.apply(&refuel, arrived);
        assert_eq!(repository.get(refuelled).numeric_value(0), Some(2.0));
    }

    #[test]
    fn derived_atoms_are_reclosed_after_each_application() {
        let task = Rc::new(Task::from_text(
            BLOCKS_DERIVED_DOMAIN_TEXT,
            BLOCKS_DERIVED_PROBLEM_TEXT,
        ));
        let explorator = Rc::new(DeleteRelaxedProblemExplorator::new(task.clone()));
        let mut repository = state_repository(&explorator);
        let mut generator =
            GroundedApplicableActionGenerator::new(explorator.clone(), MatchTreeOptions::default());

        // initially b1 is above b2 and (transitively) above b3
        let (_, above) = task.find_predicate("above").unwrap();
        let b1 = task.object_index("b1").unwrap();
        let b2 = task.object_index("b2").unwrap();
        let b3 = task.object_index("b3").unwrap();
        let derived_atoms = task.atoms.get(PredicateTag::Derived);

        let initial = repository.initial();
        let initial_state = repository.get(initial).clone();
        assert_eq!(initial_state.derived_atoms().len(), 3);
        let b1_above_b3 = derived_atoms
            .find(above, &crate::search::object_tuple![b1, b3])
            .unwrap();
        assert!(initial_state.has_derived_atom(b1_above_b3));

        // unstacking b1 removes both above facts rooted at b1
        let unstack = find_action(&mut generator, &task, &initial_state, "(unstack b1 b2)");
        let holding = repository.apply(&unstack, initial);
        let holding_state = repository.get(holding).clone();
        assert_eq!(holding_state.derived_atoms().len(), 1);
        assert!(!holding_state.has_derived_atom(b1_above_b3));
    }
}
