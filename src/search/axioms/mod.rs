mod evaluator;
mod stratification;

pub use evaluator::AxiomEvaluator;
pub use stratification::{compute_stratification, StratificationError};
