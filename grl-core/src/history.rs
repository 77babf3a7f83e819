//! Bounded history of scalar values.
use std::collections::VecDeque;

/// Default number of values kept in a [`BoundedHistory`].
pub const DEFAULT_HISTORY_LEN: usize = 100;

/// A FIFO window over the most recent scalar values.
///
/// Pushing into a full history drops the oldest value.
#[derive(Clone, Debug)]
pub struct BoundedHistory {
    capacity: usize,
    values: VecDeque<f32>,
}

impl Default for BoundedHistory {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_LEN)
    }
}

impl BoundedHistory {
    /// Creates an empty history holding at most `capacity` values.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            values: VecDeque::with_capacity(capacity),
        }
    }

    /// Appends a value.
    pub fn push(&mut self, v: f32) {
        if self.values.len() == self.capacity {
            self.values.pop_front();
        }
        self.values.push_back(v);
    }

    /// Number of values held.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns `true` if no value was pushed.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Mean of the values, `NaN` if empty.
    pub fn mean(&self) -> f32 {
        if self.values.is_empty() {
            return f32::NAN;
        }
        self.values.iter().sum::<f32>() / self.values.len() as f32
    }
}
