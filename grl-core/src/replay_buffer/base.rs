//! Ring buffer of transitions with uniform or prioritized sampling.
mod iw_scheduler;
mod sum_tree;
use super::{PerConfig, ReplayBufferConfig, TransitionBatch};
use crate::{error::GrlError, ExperienceBufferBase, ReplayBufferBase, Transition};
use anyhow::Result;
pub use iw_scheduler::IwScheduler;
use log::trace;
use rand::{rngs::StdRng, seq::index, SeedableRng};
use sum_tree::SumTree;
pub use sum_tree::WeightNormalizer;

/// State of prioritized experience replay.
struct PerState {
    sum_tree: SumTree,
    iw_scheduler: IwScheduler,
}

impl PerState {
    fn new(capacity: usize, per_config: &PerConfig) -> Self {
        Self {
            sum_tree: SumTree::new(capacity, per_config.alpha, per_config.normalize),
            iw_scheduler: IwScheduler::new(
                per_config.beta_0,
                per_config.beta_final,
                per_config.n_opts_final,
            ),
        }
    }
}

/// Sampling mode, fixed when the buffer is built.
enum Prioritization {
    Uniform,
    Proportional(PerState),
}

/// A capacity-bounded replay buffer of [`Transition`]s.
///
/// Samples are windows of up to `n_steps` consecutive transitions, used for
/// both single-step (`n_steps == 1`) and multi-step returns. A window never
/// runs past the newest transition and ends at the first terminal transition,
/// so it never spans two episodes.
///
/// ```rust
/// use grl_core::{
///     replay_buffer::{PerConfig, ReplayBuffer, ReplayBufferConfig},
///     ExperienceBufferBase, ReplayBufferBase, Transition,
/// };
///
/// let config = ReplayBufferConfig::default()
///     .capacity(100)
///     .per_config(Some(PerConfig::default()));
/// let mut buffer = ReplayBuffer::<f32, i64>::build(&config);
///
/// for t in 0..10 {
///     let tr = Transition::new(t as f32, 0, 1.0, (t + 1) as f32, t == 9);
///     buffer.push(tr).unwrap();
/// }
///
/// let batch = buffer.batch(4, 3).unwrap();
/// assert_eq!(batch.len(), 4);
/// ```
pub struct ReplayBuffer<O, A> {
    capacity: usize,

    /// Slot where the next transition is written.
    i: usize,

    size: usize,
    data: Vec<Transition<O, A>>,
    rng: StdRng,
    prioritization: Prioritization,
}

impl<O, A> ReplayBuffer<O, A>
where
    O: Clone,
    A: Clone,
{
    /// Position of slot `ix` counted from the oldest transition.
    fn logical_pos(&self, ix: usize) -> usize {
        let oldest = if self.size < self.capacity { 0 } else { self.i };
        (ix + self.capacity - oldest) % self.capacity
    }

    /// Window of at most `n_steps` transitions starting at slot `ix`.
    fn window(&self, ix: usize, n_steps: usize) -> Vec<Transition<O, A>> {
        let n = n_steps.min(self.size - self.logical_pos(ix));
        let mut window = Vec::with_capacity(n);
        for k in 0..n {
            let tr = &self.data[(ix + k) % self.capacity];
            window.push(tr.clone());
            if tr.is_done {
                break;
            }
        }
        window
    }

    /// Exponentiated priority at slot `ix`, `None` for uniform sampling or an empty slot.
    pub fn priority(&self, ix: usize) -> Option<f32> {
        match &self.prioritization {
            Prioritization::Proportional(per_state) if ix < self.size => {
                Some(per_state.sum_tree.priority(ix))
            }
            _ => None,
        }
    }

    /// Current exponent of importance weights, `None` for uniform sampling.
    pub fn beta(&self) -> Option<f32> {
        match &self.prioritization {
            Prioritization::Proportional(per_state) => Some(per_state.iw_scheduler.beta()),
            Prioritization::Uniform => None,
        }
    }
}

impl<O, A> ExperienceBufferBase for ReplayBuffer<O, A>
where
    O: Clone,
    A: Clone,
{
    type Item = Transition<O, A>;

    fn len(&self) -> usize {
        self.size
    }

    fn push(&mut self, tr: Self::Item) -> Result<()> {
        if self.data.len() < self.capacity {
            self.data.push(tr);
        } else {
            self.data[self.i] = tr;
        }

        if let Prioritization::Proportional(per_state) = &mut self.prioritization {
            let max_p = per_state.sum_tree.max_priority();
            per_state.sum_tree.add(self.i, max_p);
        }

        self.i = (self.i + 1) % self.capacity;
        self.size = (self.size + 1).min(self.capacity);

        Ok(())
    }
}

impl<O, A> ReplayBufferBase for ReplayBuffer<O, A>
where
    O: Clone,
    A: Clone,
{
    type Config = ReplayBufferConfig;
    type Batch = TransitionBatch<O, A>;

    fn build(config: &Self::Config) -> Self {
        let capacity = config.capacity.max(1);
        let prioritization = match &config.per_config {
            Some(per_config) => Prioritization::Proportional(PerState::new(capacity, per_config)),
            None => Prioritization::Uniform,
        };

        Self {
            capacity,
            i: 0,
            size: 0,
            data: Vec::with_capacity(capacity),
            rng: StdRng::seed_from_u64(config.seed),
            prioritization,
        }
    }

    fn batch(&mut self, size: usize, n_steps: usize) -> Result<Self::Batch> {
        if self.size < size {
            return Err(GrlError::InsufficientTransitions {
                requested: size,
                available: self.size,
            }
            .into());
        }

        let (ixs, weight) = match &self.prioritization {
            Prioritization::Proportional(per_state) => {
                let beta = per_state.iw_scheduler.beta();
                per_state.sum_tree.sample(size, beta, &mut self.rng)
            }
            Prioritization::Uniform => {
                let ixs = index::sample(&mut self.rng, self.size, size).into_vec();
                (ixs, vec![1f32; size])
            }
        };

        let n_steps = n_steps.max(1);
        let samples = ixs.iter().map(|&ix| self.window(ix, n_steps)).collect();

        Ok(TransitionBatch {
            samples,
            weight,
            ix_sample: ixs,
        })
    }

    fn capacity(&self) -> usize {
        self.capacity
    }

    fn is_prioritized(&self) -> bool {
        matches!(self.prioritization, Prioritization::Proportional(_))
    }

    fn update_priority(&mut self, ixs: &[usize], td_errs: &[f32]) -> Result<()> {
        if let Prioritization::Proportional(per_state) = &mut self.prioritization {
            if ixs.len() != td_errs.len() {
                return Err(GrlError::ShapeMismatch {
                    name: "td_errs".to_string(),
                    expected: ixs.len(),
                    actual: td_errs.len(),
                }
                .into());
            }
            for (&ix, &td_err) in ixs.iter().zip(td_errs.iter()) {
                per_state.sum_tree.update(ix, td_err);
            }
            per_state.iw_scheduler.add_n_opts();
            trace!(
                "Updated {} priorities, beta = {}",
                ixs.len(),
                per_state.iw_scheduler.beta()
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn buffer(capacity: usize, per: bool) -> ReplayBuffer<usize, i64> {
        let per_config = if per { Some(PerConfig::default()) } else { None };
        let config = ReplayBufferConfig::default()
            .capacity(capacity)
            .per_config(per_config);
        ReplayBuffer::build(&config)
    }

    fn push_episode(buf: &mut ReplayBuffer<usize, i64>, start: usize, len: usize) {
        for t in start..start + len {
            let is_done = t == start + len - 1;
            buf.push(Transition::new(t, 0, 1.0, t + 1, is_done)).unwrap();
        }
    }

    #[test]
    fn test_ring_overwrites_oldest() {
        let mut buf = buffer(4, false);
        push_episode(&mut buf, 0, 6);
        assert_eq!(buf.len(), 4);
        assert_eq!(buf.capacity(), 4);

        let batch = buf.batch(4, 1).unwrap();
        let mut obs = batch.samples.iter().map(|w| w[0].obs).collect::<Vec<_>>();
        obs.sort();
        assert_eq!(obs, vec![2, 3, 4, 5]);
    }

    #[test]
    fn test_uniform_without_replacement() {
        let mut buf = buffer(16, false);
        push_episode(&mut buf, 0, 16);
        let batch = buf.batch(16, 1).unwrap();
        let mut ixs = batch.ix_sample.clone();
        ixs.sort();
        ixs.dedup();
        assert_eq!(ixs.len(), 16);
        assert!(batch.weight.iter().all(|&w| w == 1.0));
    }

    #[test]
    fn test_insufficient_transitions() {
        let mut buf = buffer(16, false);
        push_episode(&mut buf, 0, 3);
        let err = buf.batch(4, 1).unwrap_err();
        assert_eq!(
            err.downcast_ref::<GrlError>(),
            Some(&GrlError::InsufficientTransitions {
                requested: 4,
                available: 3
            })
        );
    }

    #[test]
    fn test_windows_stop_at_episode_end_and_newest() {
        let mut buf = buffer(8, false);
        push_episode(&mut buf, 0, 3);
        push_episode(&mut buf, 10, 3);

        let batch = buf.batch(6, 3).unwrap();
        for (ix, w) in batch.ix_sample.iter().zip(batch.samples.iter()) {
            assert_eq!(w[0].obs, buf.data[*ix].obs);
            let expected_len = match w[0].obs {
                0 | 10 => 3,
                1 | 11 => 2,
                _ => 1,
            };
            assert_eq!(w.len(), expected_len);
            for pair in w.windows(2) {
                assert_eq!(pair[0].next_obs, pair[1].obs);
            }
        }
    }

    #[test]
    fn test_windows_wrap_around_ring() {
        let mut buf = buffer(4, false);
        push_episode(&mut buf, 0, 6);

        // Slot 3 holds obs 3; the following slots hold obs 4 and 5.
        let w = buf.window(3, 3);
        assert_eq!(w.iter().map(|tr| tr.obs).collect::<Vec<_>>(), vec![3, 4, 5]);

        // Slot 1 holds the newest transition.
        assert_eq!(buf.window(1, 3).len(), 1);
    }

    #[test]
    fn test_priority_monotone_in_td_error() {
        let mut buf = buffer(8, true);
        push_episode(&mut buf, 0, 8);
        assert!(buf.is_prioritized());

        let mut last = 0f32;
        for e in [0.0f32, 0.1, 0.5, 2.0, 10.0] {
            buf.update_priority(&[3], &[e]).unwrap();
            let p = buf.priority(3).unwrap();
            assert!(p > last);
            last = p;
        }

        // Sign of the error does not matter.
        buf.update_priority(&[4], &[-10.0]).unwrap();
        assert_eq!(buf.priority(4), buf.priority(3));
    }

    #[test]
    fn test_new_transitions_get_max_priority() {
        let mut buf = buffer(8, true);
        push_episode(&mut buf, 0, 2);
        buf.update_priority(&[0], &[5.0]).unwrap();
        push_episode(&mut buf, 2, 1);
        assert_eq!(buf.priority(2), buf.priority(0));
    }

    #[test]
    fn test_prioritized_batch_and_beta_annealing() {
        let mut buf = buffer(32, true);
        push_episode(&mut buf, 0, 32);
        let beta_0 = buf.beta().unwrap();

        let batch = buf.batch(8, 1).unwrap();
        assert_eq!(batch.len(), 8);
        assert!(batch.weight.iter().all(|&w| w > 0.0 && w <= 1.0 + 1e-6));

        let td_errs = vec![0.5; 8];
        buf.update_priority(&batch.ix_sample, &td_errs).unwrap();
        assert!(buf.beta().unwrap() > beta_0);

        assert!(buf.update_priority(&[0, 1], &[0.1]).is_err());
    }

    #[test]
    fn test_uniform_update_priority_is_noop() {
        let mut buf = buffer(8, false);
        push_episode(&mut buf, 0, 4);
        assert!(!buf.is_prioritized());
        buf.update_priority(&[0], &[1.0]).unwrap();
        assert_eq!(buf.priority(0), None);
    }
}
