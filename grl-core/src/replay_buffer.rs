//! Replay buffer of transitions.
//!
//! [`ReplayBuffer`] stores [`Transition`](crate::Transition)s in a ring of fixed
//! capacity. Sampling is uniform without replacement, or proportional to
//! priorities derived from TD errors when a [`PerConfig`] is given.
mod base;
mod batch;
mod config;
pub use base::{IwScheduler, ReplayBuffer, WeightNormalizer};
pub use batch::TransitionBatch;
pub use config::{PerConfig, ReplayBufferConfig};
