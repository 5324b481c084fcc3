use crate::search::grounding::DeleteRelaxedProblemExplorator;
use crate::search::heuristics::rpg::{propagate, RpgSemantics};
use crate::search::heuristics::{
    DiscreteCost, Heuristic, HeuristicValue, Propagation, RelaxedPlanningGraph,
};
use crate::search::{State, Task};
use std::rc::Rc;

/// The additive heuristic: action and-nodes sum their inputs (saturating),
/// axioms take the maximum; the value is the sum over the goal
/// propositions.
#[derive(Debug)]
pub struct HaddHeuristic {
    task: Rc<Task>,
    rpg: RelaxedPlanningGraph,
    propagation: Propagation,
}

#[derive(Debug, Default)]
struct HaddSemantics;

impl RpgSemantics for HaddSemantics {
    fn initialize(&mut self, _rpg: &RelaxedPlanningGraph) {}

    fn update_action(&mut self, p: &mut Propagation, proposition: usize, action: usize) {
        p.action_cost[action] =
            p.action_cost[action].saturating_add(p.proposition_cost[proposition]);
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

impl HaddHeuristic {
    pub fn new(explorator: &Rc<DeleteRelaxedProblemExplorator>) -> Self {
        Self {
            task: explorator.task().clone(),
            rpg: RelaxedPlanningGraph::new(explorator),
            propagation: Propagation::new(),
        }
    }
}

impl Heuristic for HaddHeuristic {
    fn evaluate(&mut self, state: &State) -> HeuristicValue {
        if self.task.goal.is_satisfied(state) {
            return 0.0.into();
        }

        let mut semantics = HaddSemantics;
        if !propagate(&self.rpg, state, &mut self.propagation, &mut semantics) {
            return f64::INFINITY.into();
        }

        let value = self
            .rpg
            .goal_propositions
            .iter()
            .map(|&proposition| self.propagation.proposition_cost[proposition])
            .fold(DiscreteCost::ZERO, DiscreteCost::saturating_add);
        value.to_f64().into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::*;

    // h_add on the initial state: each goal atom (at ball roomb) costs
    // 1 (carry) + 1 (at-robby roomb) + 1 = 3, and the two goals sum to 6.
    #[test]
    fn hadd_gripper() {
        let task = Rc::new(Task::from_text(GRIPPER_DOMAIN_TEXT, GRIPPER_PROBLEM_TEXT));
        let explorator = Rc::new(DeleteRelaxedProblemExplorator::new(task.clone()));
        let initial = closed_initial_state(&explorator);

        let mut hadd = HaddHeuristic::new(&explorator);
        assert_eq!(hadd.evaluate(&initial), HeuristicValue::from(6.0));
    }

    #[test]
    fn hadd_dominates_hmax() {
        let task = Rc::new(Task::from_text(GRIPPER_DOMAIN_TEXT, GRIPPER_PROBLEM_TEXT));
        let explorator = Rc::new(DeleteRelaxedProblemExplorator::new(task.clone()));
        let initial = closed_initial_state(&explorator);

        let mut hadd = HaddHeuristic::new(&explorator);
        let mut hmax = crate::search::heuristics::HmaxHeuristic::new(&explorator);
        assert!(hmax.evaluate(&initial) <= hadd.evaluate(&initial));
    }
}
