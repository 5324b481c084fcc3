//! The unary relaxed planning graph: an and/or graph over unary ground
//! actions, unary ground axioms, and propositions, propagated by a single
//! Dijkstra-like loop with per-heuristic annotation hooks.

use crate::search::grounding::DeleteRelaxedProblemExplorator;
use crate::search::{PredicateTag, State, Task};
use std::cmp::Reverse;
use std::collections::BinaryHeap;
use std::fmt::{self, Display, Formatter};

/// A saturating discrete cost with an infinity sentinel, totally ordered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DiscreteCost(u32);

impl DiscreteCost {
    pub const ZERO: DiscreteCost = DiscreteCost(0);
    pub const INFINITY: DiscreteCost = DiscreteCost(u32::MAX);

    pub fn new(value: u32) -> Self {
        Self(value)
    }

    pub fn is_infinite(self) -> bool {
        self == Self::INFINITY
    }

    /// Addition clamped at infinity.
    pub fn saturating_add(self, rhs: DiscreteCost) -> DiscreteCost {
        DiscreteCost(self.0.saturating_add(rhs.0))
    }

    pub fn to_f64(self) -> f64 {
        if self.is_infinite() {
            f64::INFINITY
        } else {
            f64::from(self.0)
        }
    }
}

impl Display for DiscreteCost {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if self.is_infinite() {
            write!(f, "inf")
        } else {
            write!(f, "{}", self.0)
        }
    }
}

/// One ground action split down to a single positive fluent effect. The
/// preconditions are the positive fluent/derived atoms of the action's
/// condition joined with those of the conditional effect that contributed
/// the effect atom (kept with multiplicity).
#[derive(Debug, Clone)]
pub struct UnaryGroundAction {
    pub index: usize,
    pub fluent_preconditions: Vec<u32>,
    pub derived_preconditions: Vec<u32>,
    pub fluent_effect: u32,
    /// The ground action this unary action was split from.
    pub unrelaxed_action: u32,
}

impl UnaryGroundAction {
    pub fn num_preconditions(&self) -> usize {
        self.fluent_preconditions.len() + self.derived_preconditions.len()
    }
}

/// One ground axiom as a unary structure; the effect is the head atom.
#[derive(Debug, Clone)]
pub struct UnaryGroundAxiom {
    pub index: usize,
    pub fluent_preconditions: Vec<u32>,
    pub derived_preconditions: Vec<u32>,
    pub derived_effect: u32,
}

impl UnaryGroundAxiom {
    pub fn num_preconditions(&self) -> usize {
        self.fluent_preconditions.len() + self.derived_preconditions.len()
    }
}

/// An or-node of the graph: one reachable fluent or derived ground atom.
/// Proposition 0 is the dummy owning every trivially-precondition-free
/// unary action and axiom.
#[derive(Debug, Clone)]
pub struct Proposition {
    pub index: usize,
    pub is_precondition_of_actions: Vec<usize>,
    pub is_precondition_of_axioms: Vec<usize>,
    pub is_goal: bool,
}

pub const DUMMY_PROPOSITION: usize = 0;

/// The compiled relaxed planning graph, built once per problem from the
/// delete-relaxed ground action and axiom pools.
#[derive(Debug)]
pub struct RelaxedPlanningGraph {
    pub unary_actions: Vec<UnaryGroundAction>,
    pub unary_axioms: Vec<UnaryGroundAxiom>,
    pub propositions: Vec<Proposition>,
    /// Fluent atom index -> proposition index.
    fluent_offsets: Vec<usize>,
    /// Derived atom index -> proposition index.
    derived_offsets: Vec<usize>,
    pub goal_propositions: Vec<usize>,
}

impl RelaxedPlanningGraph {
    pub fn new(explorator: &DeleteRelaxedProblemExplorator) -> Self {
        let task = explorator.task();
        let grounder = explorator.grounder();

        let mut unary_actions: Vec<UnaryGroundAction> = vec![];
        for action in grounder.actions() {
            let base_fluent = action.condition.positive_fluent.clone();
            let base_derived = action.condition.positive_derived.clone();
            for &effect_atom in &action.effect.add {
                unary_actions.push(UnaryGroundAction {
                    index: unary_actions.len(),
                    fluent_preconditions: base_fluent.clone(),
                    derived_preconditions: base_derived.clone(),
                    fluent_effect: effect_atom,
                    unrelaxed_action: action.index,
                });
            }
            for conditional in &action.conditional_effects {
                let mut fluent = base_fluent.clone();
                fluent.extend(conditional.condition.positive_fluent.iter().copied());
                let mut derived = base_derived.clone();
                derived.extend(conditional.condition.positive_derived.iter().copied());
                for &effect_atom in &conditional.effect.add {
                    unary_actions.push(UnaryGroundAction {
                        index: unary_actions.len(),
                        fluent_preconditions: fluent.clone(),
                        derived_preconditions: derived.clone(),
                        fluent_effect: effect_atom,
                        unrelaxed_action: action.index,
                    });
                }
            }
        }

        let unary_axioms: Vec<UnaryGroundAxiom> = grounder
            .axioms()
            .iter()
            .enumerate()
            .map(|(index, axiom)| UnaryGroundAxiom {
                index,
                fluent_preconditions: axiom.condition.positive_fluent.clone(),
                derived_preconditions: axiom.condition.positive_derived.clone(),
                derived_effect: axiom.head,
            })
            .collect();

        Self::assemble(task, unary_actions, unary_axioms)
    }

    fn assemble(
        task: &Task,
        unary_actions: Vec<UnaryGroundAction>,
        unary_axioms: Vec<UnaryGroundAxiom>,
    ) -> Self {
        let num_fluent = task.atoms.get(PredicateTag::Fluent).len();
        let num_derived = task.atoms.get(PredicateTag::Derived).len();

        let mut is_fluent_precondition_of_action: Vec<Vec<usize>> = vec![vec![]; num_fluent];
        let mut is_derived_precondition_of_action: Vec<Vec<usize>> = vec![vec![]; num_derived];
        let mut trivial_actions = vec![];
        for action in &unary_actions {
            for &atom in &action.fluent_preconditions {
                is_fluent_precondition_of_action[atom as usize].push(action.index);
            }
            for &atom in &action.derived_preconditions {
                is_derived_precondition_of_action[atom as usize].push(action.index);
            }
            if action.num_preconditions() == 0 {
                trivial_actions.push(action.index);
            }
        }

        let mut is_fluent_precondition_of_axiom: Vec<Vec<usize>> = vec![vec![]; num_fluent];
        let mut is_derived_precondition_of_axiom: Vec<Vec<usize>> = vec![vec![]; num_derived];
        let mut trivial_axioms = vec![];
        for axiom in &unary_axioms {
            for &atom in &axiom.fluent_preconditions {
                is_fluent_precondition_of_axiom[atom as usize].push(axiom.index);
            }
            for &atom in &axiom.derived_preconditions {
                is_derived_precondition_of_axiom[atom as usize].push(axiom.index);
            }
            if axiom.num_preconditions() == 0 {
                trivial_axioms.push(axiom.index);
            }
        }

        let mut propositions = vec![Proposition {
            index: DUMMY_PROPOSITION,
            is_precondition_of_actions: trivial_actions,
            is_precondition_of_axioms: trivial_axioms,
            is_goal: false,
        }];
        let mut goal_propositions = vec![];

        let mut fluent_offsets = vec![usize::MAX; num_fluent];
        for atom in 0..num_fluent {
            let index = propositions.len();
            fluent_offsets[atom] = index;
            let is_goal = task
                .goal
                .positive_atoms(PredicateTag::Fluent)
                .binary_search(&(atom as u32))
                .is_ok();
            propositions.push(Proposition {
                index,
                is_precondition_of_actions: std::mem::take(
                    &mut is_fluent_precondition_of_action[atom],
                ),
                is_precondition_of_axioms: std::mem::take(
                    &mut is_fluent_precondition_of_axiom[atom],
                ),
                is_goal,
            });
            if is_goal {
                goal_propositions.push(index);
            }
        }

        let mut derived_offsets = vec![usize::MAX; num_derived];
        for atom in 0..num_derived {
            let index = propositions.len();
            derived_offsets[atom] = index;
            let is_goal = task
                .goal
                .positive_atoms(PredicateTag::Derived)
                .binary_search(&(atom as u32))
                .is_ok();
            propositions.push(Proposition {
                index,
                is_precondition_of_actions: std::mem::take(
                    &mut is_derived_precondition_of_action[atom],
                ),
                is_precondition_of_axioms: std::mem::take(
                    &mut is_derived_precondition_of_axiom[atom],
                ),
                is_goal,
            });
            if is_goal {
                goal_propositions.push(index);
            }
        }

        Self {
            unary_actions,
            unary_axioms,
            propositions,
            fluent_offsets,
            derived_offsets,
            goal_propositions,
        }
    }

    pub fn fluent_proposition(&self, atom: u32) -> usize {
        self.fluent_offsets[atom as usize]
    }

    pub fn derived_proposition(&self, atom: u32) -> usize {
        self.derived_offsets[atom as usize]
    }
}

/// The common annotations of the Dijkstra loop: and-node costs with
/// unsatisfied-precondition counters, or-node costs, and the priority queue
/// keyed by `(cost, insertion sequence)` so ties break by insertion order.
#[derive(Debug, Default)]
pub struct Propagation {
    pub action_cost: Vec<DiscreteCost>,
    pub action_unsat: Vec<usize>,
    pub axiom_cost: Vec<DiscreteCost>,
    pub axiom_unsat: Vec<usize>,
    pub proposition_cost: Vec<DiscreteCost>,
    queue: BinaryHeap<Reverse<(DiscreteCost, u64, usize)>>,
    sequence: u64,
    num_unsat_goals: usize,
}

impl Propagation {
    pub fn new() -> Self {
        Self::default()
    }

    fn initialize(&mut self, rpg: &RelaxedPlanningGraph, state: &State) {
        self.action_cost.clear();
        self.action_cost
            .resize(rpg.unary_actions.len(), DiscreteCost::ZERO);
        self.action_unsat.clear();
        self.action_unsat.extend(
            rpg.unary_actions
                .iter()
                .map(UnaryGroundAction::num_preconditions),
        );
        self.axiom_cost.clear();
        self.axiom_cost
            .resize(rpg.unary_axioms.len(), DiscreteCost::ZERO);
        self.axiom_unsat.clear();
        self.axiom_unsat.extend(
            rpg.unary_axioms
                .iter()
                .map(UnaryGroundAxiom::num_preconditions),
        );
        self.proposition_cost.clear();
        self.proposition_cost
            .resize(rpg.propositions.len(), DiscreteCost::INFINITY);
        self.queue.clear();
        self.sequence = 0;
        self.num_unsat_goals = rpg.goal_propositions.len();

        // seed: the dummy proposition plus every state-true proposition
        self.relax(DUMMY_PROPOSITION, DiscreteCost::ZERO);
        for &atom in state.fluent_atoms() {
            if (atom as usize) < rpg.fluent_offsets.len() {
                self.relax(rpg.fluent_offsets[atom as usize], DiscreteCost::ZERO);
            }
        }
        for &atom in state.derived_atoms() {
            if (atom as usize) < rpg.derived_offsets.len() {
                self.relax(rpg.derived_offsets[atom as usize], DiscreteCost::ZERO);
            }
        }
    }

    /// Lowers a proposition's cost, queueing it when improved.
    pub fn relax(&mut self, proposition: usize, cost: DiscreteCost) -> bool {
        if cost < self.proposition_cost[proposition] {
            self.proposition_cost[proposition] = cost;
            self.sequence += 1;
            self.queue.push(Reverse((cost, self.sequence, proposition)));
            true
        } else {
            false
        }
    }
}

/// Per-heuristic annotation hooks of the common propagation loop.
pub trait RpgSemantics {
    /// Reinitialise per-heuristic annotations before a propagation run.
    fn initialize(&mut self, rpg: &RelaxedPlanningGraph);

    /// And-update: `proposition` (just popped) feeds `action`.
    fn update_action(&mut self, p: &mut Propagation, proposition: usize, action: usize);

    /// And-update: `proposition` feeds `axiom`.
    fn update_axiom(&mut self, p: &mut Propagation, proposition: usize, axiom: usize);

    /// Or-update: `action` has all preconditions satisfied and fires into
    /// `effect_proposition`.
    fn fire_action(&mut self, p: &mut Propagation, action: usize, effect_proposition: usize);

    /// Or-update: `axiom` fires into `effect_proposition`.
    fn fire_axiom(&mut self, p: &mut Propagation, axiom: usize, effect_proposition: usize);
}

/// Runs the Dijkstra-like propagation; returns true iff every goal
/// proposition was popped (the relaxation reaches the goal).
pub fn propagate<S: RpgSemantics>(
    rpg: &RelaxedPlanningGraph,
    state: &State,
    p: &mut Propagation,
    semantics: &mut S,
) -> bool {
    semantics.initialize(rpg);
    p.initialize(rpg, state);

    while let Some(Reverse((cost, _, proposition_index))) = p.queue.pop() {
        if p.proposition_cost[proposition_index] < cost {
            continue;
        }
        let proposition = &rpg.propositions[proposition_index];
        if proposition.is_goal {
            p.num_unsat_goals -= 1;
            if p.num_unsat_goals == 0 {
                return true;
            }
        }

        for &action_index in &proposition.is_precondition_of_actions {
            semantics.update_action(p, proposition_index, action_index);
            if proposition_index != DUMMY_PROPOSITION {
                p.action_unsat[action_index] -= 1;
            }
            if p.action_unsat[action_index] == 0 {
                let effect =
                    rpg.fluent_proposition(rpg.unary_actions[action_index].fluent_effect);
                semantics.fire_action(p, action_index, effect);
            }
        }
        for &axiom_index in &proposition.is_precondition_of_axioms {
            semantics.update_axiom(p, proposition_index, axiom_index);
            if proposition_index != DUMMY_PROPOSITION {
                p.axiom_unsat[axiom_index] -= 1;
            }
            if p.axiom_unsat[axiom_index] == 0 {
                let effect =
                    rpg.derived_proposition(rpg.unary_axioms[axiom_index].derived_effect);
                semantics.fire_axiom(p, axiom_index, effect);
            }
        }
    }

    p.num_unsat_goals == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn discrete_cost_saturates_and_orders() {
        let two = DiscreteCost::new(2);
        let three = DiscreteCost::new(3);
        assert!(two < three);
        assert!(three < DiscreteCost::INFINITY);
        assert_eq!(
            DiscreteCost::INFINITY.saturating_add(DiscreteCost::new(1)),
            DiscreteCost::INFINITY
        );
        assert_eq!(two.saturating_add(three), DiscreteCost::new(5));
        assert_eq!(DiscreteCost::INFINITY.to_f64(), f64::INFINITY);
    }
}
