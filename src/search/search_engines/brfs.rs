use crate::search::search_engines::{SearchResult, TerminationCondition};
use crate::search::states::{StateId, StateRepository};
use crate::search::{ApplicableActionGenerator, Plan, Task};
use std::collections::{HashMap, VecDeque};
use std::rc::Rc;
use tracing::info;

/// Breadth-first search over the interned state space.
#[derive(Debug, Default)]
pub struct Brfs;

impl Brfs {
    pub fn new() -> Self {
        Self
    }

    pub fn search(
        &self,
        task: Rc<Task>,
        generator: &mut dyn ApplicableActionGenerator,
        repository: &mut StateRepository,
        termination: &TerminationCondition,
    ) -> SearchResult {
        let initial = repository.initial();
        let mut queue: VecDeque<StateId> = VecDeque::from([initial]);
        let mut parents: HashMap<StateId, (StateId, u32)> = HashMap::new();
        let mut expanded = 0usize;

        if task.goal.is_satisfied(repository.get(initial)) {
            return SearchResult::Success(Plan::new(vec![], 0.0));
        }

        while let Some(state_id) = queue.pop_front() {
            if termination.exceeded() {
                return SearchResult::TimeLimitExceeded;
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
                if parents.contains_key(&successor) || successor == initial {
                    continue;
                }
                parents.insert(successor, (state_id, action_id));
                if task.goal.is_satisfied(repository.get(successor)) {
                    info!(expanded, "breadth-first search reached the goal");
                    return SearchResult::Success(extract_plan(
                        &task, generator, &parents, initial, successor,
                    ));
                }
                queue.push_back(successor);
            }
        }

        info!(expanded, "breadth-first search exhausted the state space");
        SearchResult::ProvablyUnsolvable
    }
}

pub(crate) fn extract_plan(
    task: &Task,
    generator: &dyn ApplicableActionGenerator,
    parents: &HashMap<StateId, (StateId, u32)>,
    initial: StateId,
    goal: StateId,
) -> Plan {
    let mut action_ids = vec![];
    let mut current = goal;
    while current != initial {
        let &(parent, action_id) = parents
            .get(&current)
            .expect("every reached state has a parent");
        action_ids.push(action_id);
        current = parent;
    }
    action_ids.reverse();
    Plan::from_actions(
        task,
        action_ids.iter().map(|&id| generator.ground_action(id)),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::grounding::DeleteRelaxedProblemExplorator;
    use crate::search::match_tree::MatchTreeOptions;
    use crate::search::{GroundedApplicableActionGenerator, LiftedApplicableActionGenerator};
    use crate::test_utils::*;

    #[test]
    fn gripper_plan_has_optimal_length() {
        let task = Rc::new(Task::from_text(GRIPPER_DOMAIN_TEXT, GRIPPER_PROBLEM_TEXT));
        let explorator = Rc::new(DeleteRelaxedProblemExplorator::new(task.clone()));
        let mut repository = state_repository(&explorator);
        let mut generator =
            GroundedApplicableActionGenerator::new(explorator.clone(), MatchTreeOptions::default());

        let result = Brfs::new().search(
            task,
            &mut generator,
            &mut repository,
            &TerminationCondition::unbounded(),
        );
        match result {
            SearchResult::Success(plan) => {
                // pick both balls, move, drop both balls
                assert_eq!(plan.len(), 5);
                assert_eq!(plan.cost(), 5.0);
            }
            other => panic!("expected a plan, got {other:?}"),
        }
    }

    #[test]
    fn lifted_generation_finds_the_same_plan_length() {
        let task = Rc::new(Task::from_text(GRIPPER_DOMAIN_TEXT, GRIPPER_PROBLEM_TEXT));
        let explorator = Rc::new(DeleteRelaxedProblemExplorator::new(task.clone()));
        let mut repository = state_repository(&explorator);
        let mut generator = LiftedApplicableActionGenerator::new(task.clone());

        let result = Brfs::new().search(
            task,
            &mut generator,
            &mut repository,
            &TerminationCondition::unbounded(),
        );
        match result {
            SearchResult::Success(plan) => assert_eq!(plan.len(), 5),
            other => panic!("expected a plan, got {other:?}"),
        }
    }

    #[test]
    fn unsolvable_task_is_detected() {
        let task = Rc::new(Task::from_text(
            GRIPPER_DOMAIN_TEXT,
            GRIPPER_UNSOLVABLE_PROBLEM_TEXT,
        ));
        let explorator = Rc::new(DeleteRelaxedProblemExplorator::new(task.clone()));
        let mut repository = state_repository(&explorator);
        let mut generator =
            GroundedApplicableActionGenerator::new(explorator.clone(), MatchTreeOptions::default());

        let result = Brfs::new().search(
            task,
            &mut generator,
            &mut repository,
            &TerminationCondition::unbounded(),
        );
        assert_eq!(result, SearchResult::ProvablyUnsolvable);
    }

    #[test]
    fn an_exhausted_time_budget_reports_out_of_time() {
        let task = Rc::new(Task::from_text(GRIPPER_DOMAIN_TEXT, GRIPPER_PROBLEM_TEXT));
        let explorator = Rc::new(DeleteRelaxedProblemExplorator::new(task.clone()));
        let mut repository = state_repository(&explorator);
        let mut generator =
            GroundedApplicableActionGenerator::new(explorator.clone(), MatchTreeOptions::default());

        let result = Brfs::new().search(
            task,
            &mut generator,
            &mut repository,
            &TerminationCondition::new(Some(std::time::Duration::ZERO)),
        );
        assert_eq!(result, SearchResult::TimeLimitExceeded);
    }
}
