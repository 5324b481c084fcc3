use std::time::{Duration, Instant};

/// A wall-clock budget checked between successor expansions.
#[derive(Debug, Clone)]
pub struct TerminationCondition {
    start: Instant,
    budget: Option<Duration>,
}

impl TerminationCondition {
    pub fn new(budget: Option<Duration>) -> Self {
        Self {
            start: Instant::now(),
            budget,
        }
    }

    pub fn unbounded() -> Self {
        Self::new(None)
    }

    pub fn exceeded(&self) -> bool {
        self.budget
            .map_or(false, |budget| self.start.elapsed() >= budget)
    }
}
