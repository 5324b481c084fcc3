use crate::search::grounding::DeleteRelaxedProblemExplorator;
use crate::search::heuristics::{FfHeuristic, HaddHeuristic, HmaxHeuristic, SetAddHeuristic};
use crate::search::State;
use ordered_float::OrderedFloat;
use std::rc::Rc;

pub type HeuristicValue = OrderedFloat<f64>;

pub trait Heuristic {
    /// Evaluate the given state. Infinity means the relaxation cannot reach
    /// the goal from the state.
    fn evaluate(&mut self, state: &State) -> HeuristicValue;
}

#[derive(clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
#[clap(rename_all = "kebab-case")]
pub enum HeuristicName {
    Hmax,
    Hadd,
    Hff,
    HsetAdd,
}

impl HeuristicName {
    pub fn create(&self, explorator: &Rc<DeleteRelaxedProblemExplorator>) -> Box<dyn Heuristic> {
        match self {
            HeuristicName::Hmax => Box::new(HmaxHeuristic::new(explorator)),
            HeuristicName::Hadd => Box::new(HaddHeuristic::new(explorator)),
            HeuristicName::Hff => Box::new(FfHeuristic::new(explorator)),
            HeuristicName::HsetAdd => Box::new(SetAddHeuristic::new(explorator)),
        }
    }
}
