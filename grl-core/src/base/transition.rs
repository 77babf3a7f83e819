//! Transition.

/// A single interaction `(o_t, a_t, r_t, o_t+1, done_t)`.
///
/// Transitions are immutable once stored in a replay buffer; sampling hands
/// out clones.
#[derive(Clone, Debug, PartialEq)]
pub struct Transition<O, A> {
    /// Observation before the action.
    pub obs: O,

    /// Action taken.
    pub act: A,

    /// Reward received.
    pub reward: f32,

    /// Observation after the action.
    pub next_obs: O,

    /// Whether the episode terminated with this transition.
    pub is_done: bool,
}

impl<O, A> Transition<O, A> {
    /// Constructs a transition.
    pub fn new(obs: O, act: A, reward: f32, next_obs: O, is_done: bool) -> Self {
        Self {
            obs,
            act,
            reward,
            next_obs,
            is_done,
        }
    }

    /// Returns `0.0` for terminal transitions, `1.0` otherwise.
    pub fn not_done(&self) -> f32 {
        if self.is_done {
            0.0
        } else {
            1.0
        }
    }
}
