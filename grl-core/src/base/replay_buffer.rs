//! Replay buffer interface.
//!
//! Buffers are split into a push side ([`ExperienceBufferBase`]) and a sampling
//! side ([`ReplayBufferBase`]), so an agent only depends on the contract it uses.
use anyhow::Result;

/// Interface for buffers that store experiences from environments.
pub trait ExperienceBufferBase {
    /// The type of items stored in the buffer.
    type Item;

    /// Pushes a new experience into the buffer.
    ///
    /// When the buffer is full, the oldest experience is overwritten.
    fn push(&mut self, tr: Self::Item) -> Result<()>;

    /// Returns the current number of experiences in the buffer.
    fn len(&self) -> usize;

    /// Returns `true` if the buffer holds no experience.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Interface for replay buffers that generate batches for training.
pub trait ReplayBufferBase {
    /// Configuration parameters for the replay buffer.
    type Config: Clone;

    /// The type of batch generated for training.
    type Batch;

    /// Builds a new replay buffer from the given configuration.
    fn build(config: &Self::Config) -> Self;

    /// Samples `size` windows of at most `n_steps` consecutive experiences.
    ///
    /// Fails if the buffer holds fewer than `size` experiences.
    fn batch(&mut self, size: usize, n_steps: usize) -> Result<Self::Batch>;

    /// Maximum number of transitions held.
    fn capacity(&self) -> usize;

    /// Returns `true` if sampling is prioritized.
    ///
    /// The sampling mode is fixed when the buffer is built.
    fn is_prioritized(&self) -> bool;

    /// Rewrites the priorities of the experiences at `ixs` from their TD errors.
    ///
    /// A no-op for buffers with uniform sampling.
    fn update_priority(&mut self, ixs: &[usize], td_errs: &[f32]) -> Result<()>;
}
