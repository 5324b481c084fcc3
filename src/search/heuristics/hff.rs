use crate::search::grounding::DeleteRelaxedProblemExplorator;
use crate::search::heuristics::rpg::{propagate, RpgSemantics};
use crate::search::heuristics::{
    DiscreteCost, Heuristic, HeuristicValue, Propagation, RelaxedPlanningGraph,
};
use crate::search::{State, Task};
use std::collections::HashSet;
use std::rc::Rc;

const NO_ACHIEVER: usize = usize::MAX;

/// The FF heuristic: tracks, per proposition, the unary action that first
/// lowered its cost, then extracts a relaxed plan by a backward sweep from
/// the goals. The heuristic value is the number of distinct ground actions
/// in the relaxed plan; the sweep additionally yields the preferred
/// operators (the relaxed-plan actions applicable in the evaluated state).
#[derive(Debug)]
pub struct FfHeuristic {
    task: Rc<Task>,
    explorator: Rc<DeleteRelaxedProblemExplorator>,
    rpg: RelaxedPlanningGraph,
    propagation: Propagation,
    semantics: FfSemantics,
    relaxed_plan: HashSet<u32>,
    preferred_operators: HashSet<u32>,
}

/// Achiever annotations: per proposition, the unary action that first
/// improved it; per axiom, the achiever forwarded from its inputs.
#[derive(Debug, Default)]
struct FfSemantics {
    proposition_achiever: Vec<usize>,
    axiom_achiever: Vec<usize>,
    marked: Vec<bool>,
}

impl RpgSemantics for FfSemantics {
    fn initialize(&mut self, rpg: &RelaxedPlanningGraph) {
        self.proposition_achiever.clear();
        self.proposition_achiever
            .resize(rpg.propositions.len(), NO_ACHIEVER);
        self.axiom_achiever.clear();
        self.axiom_achiever
            .resize(rpg.unary_axioms.len(), NO_ACHIEVER);
        self.marked.clear();
        self.marked.resize(rpg.propositions.len(), false);
    }

    fn update_action(&mut self, p: &mut Propagation, proposition: usize, action: usize) {
        p.action_cost[action] = p.action_cost[action].max(p.proposition_cost[proposition]);
    }

    fn update_axiom(&mut self, p: &mut Propagation, proposition: usize, axiom: usize) {
        p.axiom_cost[axiom] = p.axiom_cost[axiom].max(p.proposition_cost[proposition]);
        // forward the achiever action through the axiom
        self.axiom_achiever[axiom] = self.proposition_achiever[proposition];
    }

    fn fire_action(&mut self, p: &mut Propagation, action: usize, effect_proposition: usize) {
        let firing_cost = p.action_cost[action].saturating_add(DiscreteCost::new(1));
        if p.relax(effect_proposition, firing_cost) {
            self.proposition_achiever[effect_proposition] = action;
        }
    }

    fn fire_axiom(&mut self, p: &mut Propagation, axiom: usize, effect_proposition: usize) {
        if p.relax(effect_proposition, p.axiom_cost[axiom]) {
            self.proposition_achiever[effect_proposition] = self.axiom_achiever[axiom];
        }
    }
}

impl FfHeuristic {
    pub fn new(explorator: &Rc<DeleteRelaxedProblemExplorator>) -> Self {
        Self {
            task: explorator.task().clone(),
            explorator: explorator.clone(),
            rpg: RelaxedPlanningGraph::new(explorator),
            propagation: Propagation::new(),
            semantics: FfSemantics::default(),
            relaxed_plan: HashSet::new(),
            preferred_operators: HashSet::new(),
        }
    }

    /// The relaxed plan of the last evaluation, as ground action indices in
    /// the explorator's grounder.
    pub fn relaxed_plan(&self) -> &HashSet<u32> {
        &self.relaxed_plan
    }

    /// The preferred operators of the last evaluation: the subset of the
    /// relaxed plan applicable in the evaluated state.
    pub fn preferred_operators(&self) -> &HashSet<u32> {
        &self.preferred_operators
    }

    fn extract_recursively(&mut self, state: &State, proposition: usize) {
        if self.semantics.marked[proposition] {
            return;
        }
        self.semantics.marked[proposition] = true;

        let achiever = self.semantics.proposition_achiever[proposition];
        if achiever == NO_ACHIEVER {
            return;
        }

        let (fluent_pres, derived_pres) = {
            let action = &self.rpg.unary_actions[achiever];
            (
                action.fluent_preconditions.clone(),
                action.derived_preconditions.clone(),
            )
        };
        for atom in fluent_pres {
            self.extract_recursively(state, self.rpg.fluent_proposition(atom));
        }
        for atom in derived_pres {
            self.extract_recursively(state, self.rpg.derived_proposition(atom));
        }

        let unrelaxed = self.rpg.unary_actions[achiever].unrelaxed_action;
        self.relaxed_plan.insert(unrelaxed);
        if self
            .explorator
            .grounder()
            .action(unrelaxed)
            .is_applicable(state)
        {
            self.preferred_operators.insert(unrelaxed);
        }
    }
}

impl Heuristic for FfHeuristic {
    fn evaluate(&mut self, state: &State) -> HeuristicValue {
        if self.task.goal.is_satisfied(state) {
            return 0.0.into();
        }
        self.relaxed_plan.clear();
        self.preferred_operators.clear();

        let mut semantics = std::mem::take(&mut self.semantics);
        let reached = propagate(&self.rpg, state, &mut self.propagation, &mut semantics);
        self.semantics = semantics;
        if !reached {
            return f64::INFINITY.into();
        }

        let goals = self.rpg.goal_propositions.clone();
        for proposition in goals {
            self.extract_recursively(state, proposition);
        }

        (self.relaxed_plan.len() as f64).into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::*;

    // The relaxed plan moves once, picks each ball, and drops each ball:
    // five distinct ground actions.
    #[test]
    fn hff_gripper() {
        let task = Rc::new(Task::from_text(GRIPPER_DOMAIN_TEXT, GRIPPER_PROBLEM_TEXT));
        let explorator = Rc::new(DeleteRelaxedProblemExplorator::new(task.clone()));
        let initial = closed_initial_state(&explorator);

        let mut hff = FfHeuristic::new(&explorator);
        assert_eq!(hff.evaluate(&initial), HeuristicValue::from(5.0));

        // preferred operators: the two picks and the move, but never the
        // drops (not applicable yet)
        let preferred = hff.preferred_operators();
        assert_eq!(preferred.len(), 3);
        for &action in preferred {
            assert!(explorator.grounder().action(action).is_applicable(&initial));
            assert!(hff.relaxed_plan().contains(&action));
        }
    }

    #[test]
    fn hff_bounded_by_the_action_pool() {
        let task = Rc::new(Task::from_text(GRIPPER_DOMAIN_TEXT, GRIPPER_PROBLEM_TEXT));
        let explorator = Rc::new(DeleteRelaxedProblemExplorator::new(task.clone()));
        let initial = closed_initial_state(&explorator);

        let mut hff = FfHeuristic::new(&explorator);
        let value = hff.evaluate(&initial).into_inner();
        assert!(value <= explorator.grounder().actions().len() as f64);
    }
}
