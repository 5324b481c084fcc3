//! Applicable-action generation. The grounded implementation walks the
//! compiled match tree; the lifted implementation runs the satisficing
//! binding generator per action schema and grounds bindings on the fly.
//! Both observe the same contract: an action is yielded iff its full ground
//! precondition holds in the state.

use crate::search::grounding::{
    BindingGenerator, DeleteRelaxedProblemExplorator, GroundAction, Grounder, StateAssignmentSets,
};
use crate::search::match_tree::{MatchTree, MatchTreeOptions};
use crate::search::{PredicateTag, State, Task};
use std::rc::Rc;
use tracing::info;

/// Common contract of the grounded and lifted generators. The collecting
/// method drives the underlying lazy sequence to exhaustion; the grounded
/// generator additionally exposes the lazy walk itself.
pub trait ApplicableActionGenerator {
    /// Ground action ids applicable in `state`.
    fn applicable_actions(&mut self, state: &State) -> Vec<u32>;

    /// Resolves a previously yielded id.
    fn ground_action(&self, id: u32) -> &GroundAction;
}

/// Dispatches applicable actions through the match tree compiled over the
/// delete-relaxed ground action pool.
#[derive(Debug)]
pub struct GroundedApplicableActionGenerator {
    explorator: Rc<DeleteRelaxedProblemExplorator>,
    tree: MatchTree,
}

impl GroundedApplicableActionGenerator {
    pub fn new(explorator: Rc<DeleteRelaxedProblemExplorator>, options: MatchTreeOptions) -> Self {
        let grounder = explorator.grounder();
        let element_ids: Vec<u32> = (0..grounder.actions().len() as u32).collect();
        let tree = MatchTree::build(
            element_ids,
            |id| &grounder.action(id).condition,
            &options,
        );
        info!(
            num_ground_actions = grounder.actions().len(),
            num_match_tree_nodes = tree.num_nodes(),
            "compiled grounded applicable-action generator"
        );

        if options.enable_dump_dot_file {
            let task = explorator.task().clone();
            if let Ok(mut file) = std::fs::File::create(&options.output_dot_file) {
                let label = |tag: PredicateTag, atom: u32| {
                    task.atoms.get(tag).get(atom).human_readable(&task, tag)
                };
                let _ = tree.write_dot(&mut file, &label);
            }
        }

        Self { explorator, tree }
    }

    /// The lazy match-tree walk over `state`, yielding ids in the tree's
    /// depth-first order.
    pub fn walk<'a>(&'a self, state: &'a State) -> impl Iterator<Item = u32> + 'a {
        let grounder = self.explorator.grounder();
        self.tree
            .dispatch(state, move |id| grounder.action(id).is_applicable(state))
    }

    pub fn match_tree(&self) -> &MatchTree {
        &self.tree
    }
}

impl ApplicableActionGenerator for GroundedApplicableActionGenerator {
    fn applicable_actions(&mut self, state: &State) -> Vec<u32> {
        self.walk(state).collect()
    }

    fn ground_action(&self, id: u32) -> &GroundAction {
        self.explorator.grounder().action(id)
    }
}

/// Runs the satisficing binding generator per action schema against the
/// state's assignment sets, grounding each satisficing binding.
#[derive(Debug)]
pub struct LiftedApplicableActionGenerator {
    task: Rc<Task>,
    generators: Vec<BindingGenerator>,
    grounder: Grounder,
    state_sets: StateAssignmentSets,
}

impl LiftedApplicableActionGenerator {
    pub fn new(task: Rc<Task>) -> Self {
        let static_sets = Rc::new(crate::search::grounding::StaticAssignmentSets::new(&task));
        let generators = task
            .action_schemas
            .iter()
            .map(|schema| {
                BindingGenerator::new(&task, static_sets.clone(), schema.condition.clone())
            })
            .collect();
        let grounder = Grounder::new(&task, static_sets);
        let state_sets = StateAssignmentSets::new(&task);
        Self {
            task,
            generators,
            grounder,
            state_sets,
        }
    }

    pub fn grounder(&self) -> &Grounder {
        &self.grounder
    }
}

impl ApplicableActionGenerator for LiftedApplicableActionGenerator {
    fn applicable_actions(&mut self, state: &State) -> Vec<u32> {
        self.state_sets.rebuild(&self.task, state);
        let mut result = vec![];
        for (schema_index, generator) in self.generators.iter().enumerate() {
            let bindings: Vec<_> = generator
                .bindings(&self.task, state, &self.state_sets, false)
                .collect();
            for binding in bindings {
                result.push(self.grounder.ground_action(&self.task, schema_index, &binding));
            }
        }
        result
    }

    fn ground_action(&self, id: u32) -> &GroundAction {
        self.grounder.action(id)
    }
}

/// Search mode for grounding, selecting the generator implementation.
#[derive(clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
#[clap(rename_all = "kebab-case")]
pub enum SearchMode {
    Grounded,
    Lifted,
}

impl SearchMode {
    pub fn create(
        &self,
        task: Rc<Task>,
        explorator: &Rc<DeleteRelaxedProblemExplorator>,
        options: MatchTreeOptions,
    ) -> Box<dyn ApplicableActionGenerator> {
        match self {
            SearchMode::Grounded => Box::new(GroundedApplicableActionGenerator::new(
                explorator.clone(),
                options,
            )),
            SearchMode::Lifted => Box::new(LiftedApplicableActionGenerator::new(task)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::match_tree::{SplitMetric, SplitStrategy};
    use crate::test_utils::*;
    use itertools::Itertools;

    fn readable_actions(
        generator: &mut dyn ApplicableActionGenerator,
        task: &Task,
        state: &State,
    ) -> Vec<String> {
        generator
            .applicable_actions(state)
            .into_iter()
            .map(|id| generator.ground_action(id).human_readable(task))
            .sorted()
            .collect()
    }

    #[test]
    fn gripper_initial_state_applicable_actions() {
        let task = Rc::new(Task::from_text(GRIPPER_DOMAIN_TEXT, GRIPPER_PROBLEM_TEXT));
        let explorator = Rc::new(DeleteRelaxedProblemExplorator::new(task.clone()));
        let initial = closed_initial_state(&explorator);

        let mut grounded =
            GroundedApplicableActionGenerator::new(explorator.clone(), MatchTreeOptions::default());
        let actions = readable_actions(&mut grounded, &task, &initial);

        // move(rooma, rooma) is forbidden by the static inequality
        assert_eq!(
            actions,
            vec![
                "(move rooma roomb)",
                "(pick ball1 rooma left)",
                "(pick ball1 rooma right)",
                "(pick ball2 rooma left)",
                "(pick ball2 rooma right)",
            ]
        );
    }

    /// Property: the grounded and lifted generators agree, as multisets of
    /// (schema, objects), on every reachable state.
    fn assert_equivalence_on_all_states(domain: &str, problem: &str) {
        let task = Rc::new(Task::from_text(domain, problem));
        let explorator = Rc::new(DeleteRelaxedProblemExplorator::new(task.clone()));
        let (repository, order) = enumerate_reachable_states(&explorator);

        let mut grounded =
            GroundedApplicableActionGenerator::new(explorator.clone(), MatchTreeOptions::default());
        let mut lifted = LiftedApplicableActionGenerator::new(task.clone());

        for &state_id in &order {
            let state = repository.get(state_id).clone();
            let from_tree: Vec<(usize, crate::search::ObjectTuple)> = grounded
                .applicable_actions(&state)
                .into_iter()
                .map(|id| {
                    let action = grounded.ground_action(id);
                    (action.schema_index, action.objects.clone())
                })
                .sorted()
                .collect();
            let from_bindings: Vec<(usize, crate::search::ObjectTuple)> = lifted
                .applicable_actions(&state)
                .into_iter()
                .map(|id| {
                    let action = lifted.ground_action(id);
                    (action.schema_index, action.objects.clone())
                })
                .sorted()
                .collect();
            assert_eq!(from_tree, from_bindings);
        }
    }

    #[test]
    fn match_tree_equivalence_gripper() {
        assert_equivalence_on_all_states(GRIPPER_DOMAIN_TEXT, GRIPPER_PROBLEM_TEXT);
    }

    #[test]
    fn match_tree_equivalence_with_axioms() {
        assert_equivalence_on_all_states(BLOCKS_DERIVED_DOMAIN_TEXT, BLOCKS_DERIVED_PROBLEM_TEXT);
    }

    #[test]
    fn match_tree_equivalence_with_numeric_constraints() {
        assert_equivalence_on_all_states(FUEL_DOMAIN_TEXT, FUEL_PROBLEM_TEXT);
    }

    #[test]
    fn degenerate_match_tree_still_dispatches_correctly() {
        let task = Rc::new(Task::from_text(GRIPPER_DOMAIN_TEXT, GRIPPER_PROBLEM_TEXT));
        let explorator = Rc::new(DeleteRelaxedProblemExplorator::new(task.clone()));
        let (repository, order) = enumerate_reachable_states(&explorator);

        // a node cap of zero degenerates to a single imperfect generator
        // leaf enumerating all actions
        let options = MatchTreeOptions {
            max_num_nodes: 0,
            split_metric: SplitMetric::MaxCover,
            ..MatchTreeOptions::default()
        };
        let mut degenerate =
            GroundedApplicableActionGenerator::new(explorator.clone(), options);
        assert_eq!(degenerate.match_tree().num_selector_nodes(), 0);
        assert_eq!(degenerate.match_tree().num_nodes(), 1);

        let mut lifted = LiftedApplicableActionGenerator::new(task.clone());
        for &state_id in &order {
            let state = repository.get(state_id).clone();
            let from_tree: Vec<(usize, crate::search::ObjectTuple)> = degenerate
                .applicable_actions(&state)
                .into_iter()
                .map(|id| {
                    let action = degenerate.ground_action(id);
                    (action.schema_index, action.objects.clone())
                })
                .sorted()
                .collect();
            let from_bindings: Vec<(usize, crate::search::ObjectTuple)> = lifted
                .applicable_actions(&state)
                .into_iter()
                .map(|id| {
                    let action = lifted.ground_action(id);
                    (action.schema_index, action.objects.clone())
                })
                .sorted()
                .collect();
            assert_eq!(from_tree, from_bindings);
        }
    }

    #[test]
    fn static_split_strategy_matches_dynamic_dispatch() {
        let task = Rc::new(Task::from_text(GRIPPER_DOMAIN_TEXT, GRIPPER_PROBLEM_TEXT));
        let explorator = Rc::new(DeleteRelaxedProblemExplorator::new(task.clone()));
        let initial = closed_initial_state(&explorator);

        let static_options = MatchTreeOptions {
            split_strategy: SplitStrategy::Static,
            ..MatchTreeOptions::default()
        };
        let mut with_static =
            GroundedApplicableActionGenerator::new(explorator.clone(), static_options);
        let mut with_dynamic =
            GroundedApplicableActionGenerator::new(explorator.clone(), MatchTreeOptions::default());

        assert_eq!(
            readable_actions(&mut with_static, &task, &initial),
            readable_actions(&mut with_dynamic, &task, &initial)
        );
    }

    #[test]
    fn identical_options_build_identical_trees() {
        let task = Rc::new(Task::from_text(GRIPPER_DOMAIN_TEXT, GRIPPER_PROBLEM_TEXT));
        let explorator = Rc::new(DeleteRelaxedProblemExplorator::new(task.clone()));
        let initial = closed_initial_state(&explorator);

        let first =
            GroundedApplicableActionGenerator::new(explorator.clone(), MatchTreeOptions::default());
        let second =
            GroundedApplicableActionGenerator::new(explorator.clone(), MatchTreeOptions::default());

        assert_eq!(first.match_tree().num_nodes(), second.match_tree().num_nodes());
        // identical trees yield identical iteration order
        let walk_first: Vec<u32> = first.walk(&initial).collect();
        let walk_second: Vec<u32> = second.walk(&initial).collect();
        assert_eq!(walk_first, walk_second);
    }
}
