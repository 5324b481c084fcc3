mod state;
mod state_repository;

pub use state::{State, StateId};
pub use state_repository::StateRepository;
