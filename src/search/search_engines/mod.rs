mod brfs;
mod gbfs;
mod termination_condition;

pub use brfs::Brfs;
pub use gbfs::Gbfs;
pub use termination_condition::TerminationCondition;

use crate::search::grounding::DeleteRelaxedProblemExplorator;
use crate::search::heuristics::HeuristicName;
use crate::search::states::StateRepository;
use crate::search::{ApplicableActionGenerator, Plan, Task};
use std::rc::Rc;

/// The outcome of a search run.
#[derive(Debug, Clone, PartialEq)]
pub enum SearchResult {
    /// The search found a plan.
    Success(Plan),
    /// The search space was exhausted without reaching the goal.
    ProvablyUnsolvable,
    /// The wall-clock budget ran out; the core state remains valid.
    TimeLimitExceeded,
}

#[derive(clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
#[clap(rename_all = "kebab-case")]
pub enum SearchEngineName {
    #[clap(help = "Breadth-first search")]
    Brfs,
    #[clap(help = "Greedy best-first search")]
    Gbfs,
}

impl SearchEngineName {
    pub fn search(
        &self,
        task: Rc<Task>,
        explorator: &Rc<DeleteRelaxedProblemExplorator>,
        generator: &mut dyn ApplicableActionGenerator,
        repository: &mut StateRepository,
        heuristic: HeuristicName,
        termination: &TerminationCondition,
    ) -> SearchResult {
        match self {
            SearchEngineName::Brfs => Brfs::new().search(task, generator, repository, termination),
            SearchEngineName::Gbfs => {
                let mut gbfs = Gbfs::new(heuristic.create(explorator));
                gbfs.search(task, generator, repository, termination)
            }
        }
    }
}
