//! Exploration strategies.
//!
//! An explorer turns the greedy action of a policy into the action actually
//! taken in the environment during training.
mod epsilon_greedy;
mod ou_noise;
pub use epsilon_greedy::{EpsilonGreedy, EpsilonGreedyConfig};
pub use ou_noise::{OuNoise, OuNoiseConfig};

/// Converts a greedy action into an explored one.
pub trait Explorer<A> {
    /// Returns the action to execute given the greedy action.
    fn generate_action(&mut self, greedy: A) -> A;
}
