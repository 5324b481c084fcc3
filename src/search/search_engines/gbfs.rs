use crate::search::heuristics::Heuristic;
use crate::search::search_engines::brfs::extract_plan;
use crate::search::search_engines::{SearchResult, TerminationCondition};
use crate::search::states::{StateId, StateRepository};
use crate::search::{ApplicableActionGenerator, HeuristicValue, Plan, Task};
use priority_queue::PriorityQueue;
use std::cmp::Reverse;
use std::collections::{HashMap, HashSet};
use std::rc::Rc;
use tracing::info;

/// Greedy best-first search guided by a heuristic.
pub struct Gbfs {
    heuristic: Box<dyn Heuristic>,
}

impl std::fmt::Debug for Gbfs {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Gbfs").finish_non_exhaustive()
    }
}

impl Gbfs {
    pub fn new(heuristic: Box<dyn Heuristic>) -> Self {
        Self { heuristic }
    }

    pub fn search(
        &mut self,
        task: Rc<Task>,
        generator: &mut dyn ApplicableActionGenerator,
        repository: &mut StateRepository,
        termination: &TerminationCondition,
    ) -> SearchResult {
        let initial = repository.initial();
        let mut open: PriorityQueue<StateId, Reverse<HeuristicValue>> = PriorityQueue::new();
        let mut closed: HashSet<StateId> = HashSet::new();
        let mut parents: HashMap<StateId, (StateId, u32)> = HashMap::new();
        let mut expanded = 0usize;

        let h = self.heuristic.evaluate(repository.get(initial));
        if h.into_inner().is_infinite() {
            return SearchResult::ProvablyUnsolvable;
        }
        open.push(initial, Reverse(h));

        while let Some((state_id, _)) = open.pop() {
            if termination.exceeded() {
                return SearchResult::TimeLimitExceeded;
            }
            if !closed.insert(state_id) {
                continue;
            }
            if task.goal.is_satisfied(repository.get(state_id)) {
                info!(expanded, "greedy best-first search reached the goal");
                return SearchResult::Success(if state_id == initial {
                    Plan::new(vec![], 0.0)
                } else {
                    extract_plan(&task, generator, &parents, initial, state_id)
                });
            }
            expanded += 1;

            let applicable = {
                let state = repository.get(state_id).clone();
                generator.applicable_actions(&state)
            };
            for action_id in applicable {
                let successor = {
                    let action = generator.ground_action(action_id).clone();
                    repository.apply(&action, state_id)
                };
                if closed.contains(&successor) {
                    continue;
                }
                parents.entry(successor).or_insert((state_id, action_id));
                let h = self.heuristic.evaluate(repository.get(successor));
                if h.into_inner().is_infinite() {
                    continue;
                }
                open.push_increase(successor, Reverse(h));
            }
        }

        info!(expanded, "greedy best-first search exhausted the state space");
        SearchResult::ProvablyUnsolvable
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::grounding::DeleteRelaxedProblemExplorator;
    use crate::search::heuristics::FfHeuristic;
    use crate::search::match_tree::MatchTreeOptions;
    use crate::search::GroundedApplicableActionGenerator;
    use crate::test_utils::*;

    #[test]
    fn gbfs_with_hff_solves_gripper() {
        let task = Rc::new(Task::from_text(GRIPPER_DOMAIN_TEXT, GRIPPER_PROBLEM_TEXT));
        let explorator = Rc::new(DeleteRelaxedProblemExplorator::new(task.clone()));
        let mut repository = state_repository(&explorator);
        let mut generator =
            GroundedApplicableActionGenerator::new(explorator.clone(), MatchTreeOptions::default());

        let mut gbfs = Gbfs::new(Box::new(FfHeuristic::new(&explorator)));
        let result = gbfs.search(
            task.clone(),
            &mut generator,
            &mut repository,
            &TerminationCondition::unbounded(),
        );
        match result {
            SearchResult::Success(plan) => {
                // greedy search may take detours; the goal must hold at the
                // end of the plan regardless
                assert!(plan.len() >= 5);
                let mut state_id = repository.initial();
                'steps: for step in plan.steps() {
                    let state = repository.get(state_id).clone();
                    for action_id in generator.applicable_actions(&state) {
                        let action = generator.ground_action(action_id).clone();
                        let schema = &task.action_schemas[action.schema_index];
                        let objects: Vec<_> = action
                            .objects
                            .iter()
                            .map(|&o| task.objects[o].name.clone())
                            .collect();
                        if schema.name == step.action_name && objects == step.objects {
                            state_id = repository.apply(&action, state_id);
                            continue 'steps;
                        }
                    }
                    panic!("plan step {step:?} not applicable");
                }
                assert!(task.goal.is_satisfied(repository.get(state_id)));
            }
            other => panic!("expected a plan, got {other:?}"),
        }
    }

    #[test]
    fn infinite_initial_heuristic_is_unsolvable() {
        let task = Rc::new(Task::from_text(
            GRIPPER_DOMAIN_TEXT,
            GRIPPER_UNSOLVABLE_PROBLEM_TEXT,
        ));
        let explorator = Rc::new(DeleteRelaxedProblemExplorator::new(task.clone()));
        let mut repository = state_repository(&explorator);
        let mut generator =
            GroundedApplicableActionGenerator::new(explorator.clone(), MatchTreeOptions::default());

        let mut gbfs = Gbfs::new(Box::new(FfHeuristic::new(&explorator)));
        let result = gbfs.search(
            task,
            &mut generator,
            &mut repository,
            &TerminationCondition::unbounded(),
        );
        assert_eq!(result, SearchResult::ProvablyUnsolvable);
    }
}
