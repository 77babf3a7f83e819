//! Agent.
use super::{Env, Transition};
use crate::record::Record;
use anyhow::Result;
use std::path::Path;

/// Running means reported by [`Agent::statistics()`].
///
/// Both values are `NaN` until the agent has performed an update.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Statistics {
    /// Mean of the recent losses.
    pub loss: f32,

    /// Mean of the recent absolute action values.
    pub average_q: f32,
}

impl Statistics {
    /// Returns `true` if no update has been recorded yet.
    pub fn is_empty(&self) -> bool {
        self.loss.is_nan() && self.average_q.is_nan()
    }
}

/// Represents a trainable policy on an environment.
///
/// The agent exclusively owns its replay buffer, so transitions go in through
/// [`Agent::store_transition()`] and every optimization step is driven by
/// [`Agent::learn()`], called once per environment step.
pub trait Agent<E: Env> {
    /// Selects an action for training, with exploration.
    fn choose_action(&mut self, obs: &E::Obs) -> Result<E::Act>;

    /// Selects the greedy action without exploration.
    fn test_action(&self, obs: &E::Obs) -> Result<E::Act>;

    /// Stores a transition in the replay buffer.
    fn store_transition(&mut self, tr: Transition<E::Obs, E::Act>) -> Result<()>;

    /// Advances the step counter and performs an optimization step when scheduled.
    ///
    /// Returns `None` if the step was skipped.
    fn learn(&mut self) -> Result<Option<Record>>;

    /// Returns the running means of loss and absolute action value.
    fn statistics(&self) -> Statistics;

    /// Save the parameters of the agent in the given directory.
    fn save_params(&self, path: &Path) -> Result<()>;

    /// Load the parameters of the agent from the given directory.
    fn load_params(&mut self, path: &Path) -> Result<()>;
}
