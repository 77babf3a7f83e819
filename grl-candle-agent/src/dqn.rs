//! DQN agent over graph observations.
mod base;
mod config;
mod model;
pub use base::Dqn;
pub use config::{DqnConfig, TargetUpdateMethod};
pub use model::{DqnModel, DqnModelConfig};
