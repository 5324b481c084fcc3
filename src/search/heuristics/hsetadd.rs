use crate::search::grounding::DeleteRelaxedProblemExplorator;
use crate::search::heuristics::rpg::{propagate, RpgSemantics};
use crate::search::heuristics::{
    DiscreteCost, Heuristic, HeuristicValue, Propagation, RelaxedPlanningGraph,
};
use crate::search::{State, Task};
use std::collections::HashSet;
use std::rc::Rc;

/// The set-additive heuristic: instead of numeric costs, every node carries
/// the set of unary actions used to achieve it; and-nodes union their
/// inputs, or-nodes add the firing action. The value is the size of the
/// union over the goal propositions.
#[derive(Debug)]
pub struct SetAddHeuristic {
    task: Rc<Task>,
    rpg: RelaxedPlanningGraph,
    propagation: Propagation,
    semantics: SetAddSemantics,
}

#[derive(Debug, Default)]
struct SetAddSemantics {
    action_achievers: Vec<HashSet<usize>>,
    axiom_achievers: Vec<HashSet<usize>>,
    proposition_achievers: Vec<HashSet<usize>>,
}

impl RpgSemantics for SetAddSemantics {
    fn initialize(&mut self, rpg: &RelaxedPlanningGraph) {
        self.action_achievers.clear();
        self.action_achievers
            .resize(rpg.unary_actions.len(), HashSet::new());
        self.axiom_achievers.clear();
        self.axiom_achievers
            .resize(rpg.unary_axioms.len(), HashSet::new());
        self.proposition_achievers.clear();
        self.proposition_achievers
            .resize(rpg.propositions.len(), HashSet::new());
    }

    fn update_action(&mut self, p: &mut Propagation, proposition: usize, action: usize) {
        p.action_cost[action] = p.action_cost[action].max(p.proposition_cost[proposition]);
        let input: Vec<usize> = self.proposition_achievers[proposition]
            .iter()
            .copied()
            .collect();
        self.action_achievers[action].extend(input);
    }

    fn update_axiom(&mut self, p: &mut Propagation, proposition: usize, axiom: usize) {
        p.axiom_cost[axiom] = p.proposition_cost[proposition].max(p.axiom_cost[axiom]);
        let input: Vec<usize> = self.proposition_achievers[proposition]
            .iter()
            .copied()
            .collect();
        self.axiom_achievers[axiom].extend(input);
    }

    fn fire_action(&mut self, p: &mut Propagation, action: usize, effect_proposition: usize) {
        let firing_cost = p.action_cost[action].saturating_add(DiscreteCost::new(1));
        if p.relax(effect_proposition, firing_cost) {
            let mut achievers = self.action_achievers[action].clone();
            achievers.insert(action);
            self.proposition_achievers[effect_proposition] = achievers;
        }
    }

    fn fire_axiom(&mut self, p: &mut Propagation, axiom: usize, effect_proposition: usize) {
        if p.relax(effect_proposition, p.axiom_cost[axiom]) {
            self.proposition_achievers[effect_proposition] =
                self.axiom_achievers[axiom].clone();
        }
    }
}

impl SetAddHeuristic {
    pub fn new(explorator: &Rc<DeleteRelaxedProblemExplorator>) -> Self {
        Self {
            task: explorator.task().clone(),
            rpg: RelaxedPlanningGraph::new(explorator),
            propagation: Propagation::new(),
            semantics: SetAddSemantics::default(),
        }
    }
}

impl Heuristic for SetAddHeuristic {
    fn evaluate(&mut self, state: &State) -> HeuristicValue {
        if self.task.goal.is_satisfied(state) {
            return 0.0.into();
        }

        let mut semantics = std::mem::take(&mut self.semantics);
        let reached = propagate(&self.rpg, state, &mut self.propagation, &mut semantics);
        self.semantics = semantics;
        if !reached {
            return f64::INFINITY.into();
        }

        let mut union: HashSet<usize> = HashSet::new();
        for &proposition in &self.rpg.goal_propositions {
            union.extend(self.semantics.proposition_achievers[proposition].iter().copied());
        }
        (union.len() as f64).into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::*;

    // The goal achiever sets union to {move, pick b1, drop b1, pick b2,
    // drop b2}: five unary actions.
    #[test]
    fn hsetadd_gripper() {
        let task = Rc::new(Task::from_text(GRIPPER_DOMAIN_TEXT, GRIPPER_PROBLEM_TEXT));
        let explorator = Rc::new(DeleteRelaxedProblemExplorator::new(task.clone()));
        let initial = closed_initial_state(&explorator);

        let mut hsetadd = SetAddHeuristic::new(&explorator);
        assert_eq!(hsetadd.evaluate(&initial), HeuristicValue::from(5.0));
    }

    #[test]
    fn hsetadd_infinite_iff_relaxed_goal_unreachable() {
        let task = Rc::new(Task::from_text(
            GRIPPER_DOMAIN_TEXT,
            GRIPPER_UNSOLVABLE_PROBLEM_TEXT,
        ));
        let explorator = Rc::new(DeleteRelaxedProblemExplorator::new(task.clone()));
        let initial = closed_initial_state(&explorator);

        let mut hsetadd = SetAddHeuristic::new(&explorator);
        assert_eq!(
            hsetadd.evaluate(&initial),
            HeuristicValue::from(f64::INFINITY)
        );
    }
}
