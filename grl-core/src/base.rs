//! Core functionalities.
mod agent;
mod env;
mod replay_buffer;
mod step;
mod transition;
pub use agent::{Agent, Statistics};
pub use env::Env;
pub use replay_buffer::{ExperienceBufferBase, ReplayBufferBase};
use std::fmt::Debug;
pub use step::{Info, Step};
pub use transition::Transition;

/// An observation of an environment.
///
/// In traffic scenarios an observation describes every vehicle in the scene,
/// so [`Obs::len()`] returns the number of vehicles (graph nodes).
pub trait Obs: Clone + Debug {
    /// Returns the number of entities in the observation.
    fn len(&self) -> usize;
}

/// An action of the environment.
///
/// Multi-agent actions hold one entry per controlled entity.
pub trait Act: Clone + Debug {
    /// Returns the number of entries in the action.
    fn len(&self) -> usize;
}
