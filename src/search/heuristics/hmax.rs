use crate::search::grounding::DeleteRelaxedProblemExplorator;
use crate::search::heuristics::rpg::{propagate, RpgSemantics};
use crate::search::heuristics::{
    DiscreteCost, Heuristic, HeuristicValue, Propagation, RelaxedPlanningGraph,
};
use crate::search::{State, Task};
use std::rc::Rc;

/// The admissible h_max heuristic: and-nodes take the maximum of their
/// inputs, or-nodes the minimum over achievers plus one; the value is the
/// maximum over the goal propositions.
#[derive(Debug)]
pub struct HmaxHeuristic {
    task: Rc<Task>,
    rpg: RelaxedPlanningGraph,
    propagation: Propagation,
}

#[derive(Debug, Default)]
struct HmaxSemantics;

impl RpgSemantics for HmaxSemantics {
    fn initialize(&mut self, _rpg: &RelaxedPlanningGraph) {}

    fn update_action(&mut self, p: &mut Propagation, proposition: usize, action: usize) {
        p.action_cost[action] = p.action_cost[action].max(p.proposition_cost[proposition]);
    }

    fn update_axiom(&mut self, p: &mut Propagation, proposition: usize, axiom: usize) {
        p.axiom_cost[axiom] = p.axiom_cost[axiom].max(p.proposition_cost[proposition]);
    }

    fn fire_action(&mut self, p: &mut Propagation, action: usize, effect_proposition: usize) {
        let firing_cost = p.action_cost[action].saturating_add(DiscreteCost::new(1));
        p.relax(effect_proposition, firing_cost);
    }

    fn fire_axiom(&mut self, p: &mut Propagation, axiom: usize, effect_proposition: usize) {
        p.relax(effect_proposition, p.axiom_cost[axiom]);
    }
}

impl HmaxHeuristic {
    pub fn new(explorator: &Rc<DeleteRelaxedProblemExplorator>) -> Self {
        Self {
            task: explorator.task().clone(),
            rpg: RelaxedPlanningGraph::new(explorator),
            propagation: Propagation::new(),
        }
    }
}

impl Heuristic for HmaxHeuristic {
    fn evaluate(&mut self, state: &State) -> HeuristicValue {
        if self.task.goal.is_satisfied(state) {
            return 0.0.into();
        }

        let mut semantics = HmaxSemantics;
        if !propagate(&self.rpg, state, &mut self.propagation, &mut semantics) {
            return f64::INFINITY.into();
        }

        let value = self
            .rpg
            .goal_propositions
            .iter()
            .map(|&proposition| self.propagation.proposition_cost[proposition])
            .max()
            .unwrap_or(DiscreteCost::ZERO);
        value.to_f64().into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::*;

    // h_max on the initial state: the deepest chain is one pick/move (cost
    // 1) feeding a drop (cost 2), so each goal atom costs 2.
    #[test]
    fn hmax_gripper() {
        let task = Rc::new(Task::from_text(GRIPPER_DOMAIN_TEXT, GRIPPER_PROBLEM_TEXT));
        let explorator = Rc::new(DeleteRelaxedProblemExplorator::new(task.clone()));
        let initial = closed_initial_state(&explorator);

        let mut hmax = HmaxHeuristic::new(&explorator);
        let h = hmax.evaluate(&initial);
        assert_eq!(h, HeuristicValue::from(2.0));
        // admissibility: the optimal plan (two picks, one move, two drops)
        // has cost 5
        assert!(h <= HeuristicValue::from(5.0));
    }

    #[test]
    fn hmax_is_zero_on_goal_states() {
        let task = Rc::new(Task::from_text(
            GRIPPER_DOMAIN_TEXT,
            GRIPPER_TRIVIAL_PROBLEM_TEXT,
        ));
        let explorator = Rc::new(DeleteRelaxedProblemExplorator::new(task.clone()));
        let initial = closed_initial_state(&explorator);

        let mut hmax = HmaxHeuristic::new(&explorator);
        assert_eq!(hmax.evaluate(&initial), HeuristicValue::from(0.0));
    }

    #[test]
    fn hmax_is_infinite_when_the_goal_is_unreachable() {
        let task = Rc::new(Task::from_text(
            GRIPPER_DOMAIN_TEXT,
            GRIPPER_UNSOLVABLE_PROBLEM_TEXT,
        ));
        let explorator = Rc::new(DeleteRelaxedProblemExplorator::new(task.clone()));
        let initial = closed_initial_state(&explorator);

        let mut hmax = HmaxHeuristic::new(&explorator);
        assert_eq!(hmax.evaluate(&initial), HeuristicValue::from(f64::INFINITY));
    }
}
