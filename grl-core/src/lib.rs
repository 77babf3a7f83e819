#![warn(missing_docs)]
//! Core components of graph-based reinforcement learning.
//!
//! This crate is independent of any tensor backend. It provides
//! * the interfaces [`Env`] and [`Agent`] between a traffic simulator and an agent,
//! * graph observations and multi-agent actions in [`graph`],
//! * a [`ReplayBuffer`](replay_buffer::ReplayBuffer) with uniform or prioritized sampling
//!   of n-step windows,
//! * exploration strategies in [`explorer`],
//! * the training and evaluation loop [`Trainer`].
pub mod error;
pub mod explorer;
pub mod graph;
pub mod history;
pub mod record;
pub mod replay_buffer;

mod base;
pub use base::{
    Act, Agent, Env, ExperienceBufferBase, Info, Obs, ReplayBufferBase, Statistics, Step,
    Transition,
};

mod trainer;
pub use trainer::{read_column, Trainer, TrainerConfig, TrainingHistory};
