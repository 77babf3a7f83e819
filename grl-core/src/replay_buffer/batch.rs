//! Batch of transition windows.
use crate::Transition;

/// A batch sampled from [`ReplayBuffer`](super::ReplayBuffer).
///
/// Each sample is a window of consecutive transitions starting at the sampled
/// slot. The window holds a single transition when `n_steps == 1`.
#[derive(Clone, Debug)]
pub struct TransitionBatch<O, A> {
    /// Windows of transitions.
    pub samples: Vec<Vec<Transition<O, A>>>,

    /// Importance weights, all `1.0` for uniform sampling.
    pub weight: Vec<f32>,

    /// Slots of the first transitions of the windows.
    pub ix_sample: Vec<usize>,
}

impl<O, A> TransitionBatch<O, A> {
    /// Number of samples.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Returns `true` if the batch holds no sample.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Returns the samples, the importance weights and the sampled slots.
    pub fn unpack(self) -> (Vec<Vec<Transition<O, A>>>, Vec<f32>, Vec<usize>) {
        (self.samples, self.weight, self.ix_sample)
    }
}
