//! Environment.
use super::{Act, Info, Obs, Step};
use anyhow::Result;

/// Represents an environment, typically an MDP.
///
/// The traffic simulator is an external collaborator; this trait is the only
/// surface the agents and the trainer rely on.
pub trait Env {
    /// Observation of the environment.
    type Obs: Obs;

    /// Action of the environment.
    type Act: Act;

    /// Information in the [`Step`] object.
    type Info: Info;

    /// Resets the environment and returns the initial observation.
    fn reset(&mut self) -> Result<Self::Obs>;

    /// Performs an environment step.
    fn step(&mut self, a: &Self::Act) -> Result<Step<Self>>
    where
        Self: Sized;

    /// Samples an action uniformly at random.
    ///
    /// Used by [`Trainer`](crate::Trainer) during the warmup period.
    fn random_action(&mut self) -> Self::Act;
}
