mod hadd;
mod heuristic;
mod hff;
mod hmax;
mod hsetadd;
mod rpg;

pub use hadd::HaddHeuristic;
pub use heuristic::{Heuristic, HeuristicName, HeuristicValue};
pub use hff::FfHeuristic;
pub use hmax::HmaxHeuristic;
pub use hsetadd::SetAddHeuristic;
pub use rpg::{
    DiscreteCost, Propagation, Proposition, RelaxedPlanningGraph, RpgSemantics,
    UnaryGroundAction, UnaryGroundAxiom, DUMMY_PROPOSITION,
};
