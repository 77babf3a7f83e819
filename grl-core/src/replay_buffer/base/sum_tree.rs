//! Sum tree for prioritized sampling.
use rand::Rng;
use segment_tree::{ops::MinIgnoreNaN, SegmentPoint};
use serde::{Deserialize, Serialize};

/// How importance weights are normalized.
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone, Copy)]
pub enum WeightNormalizer {
    /// Normalize by the largest possible weight over all stored transitions.
    All,

    /// Normalize by the largest weight in the sampled batch.
    Batch,
}

/// Binary tree over `alpha`-exponentiated priorities.
///
/// Leaves live at `ix + capacity - 1`; every inner node holds the sum of its
/// children, so the root is the total priority mass.
#[derive(Debug)]
pub(super) struct SumTree {
    eps: f32,
    alpha: f32,
    capacity: usize,
    n_samples: usize,
    tree: Vec<f32>,
    min_tree: SegmentPoint<f32, MinIgnoreNaN>,
    max_priority: f32,
    normalize: WeightNormalizer,
}

impl SumTree {
    pub fn new(capacity: usize, alpha: f32, normalize: WeightNormalizer) -> Self {
        Self {
            eps: 1e-8,
            alpha,
            capacity,
            n_samples: 0,
            tree: vec![0f32; 2 * capacity - 1],
            min_tree: SegmentPoint::build(vec![f32::MAX; capacity], MinIgnoreNaN),
            max_priority: 1.0,
            normalize,
        }
    }

    fn propagate(&mut self, ix: usize, change: f32) {
        let mut ix = ix;
        while ix != 0 {
            ix = (ix - 1) / 2;
            self.tree[ix] += change;
        }
    }

    fn retrieve(&self, ix: usize, s: f32) -> usize {
        let left = 2 * ix + 1;
        let right = left + 1;

        if left >= self.tree.len() {
            return ix;
        }

        if s <= self.tree[left] || self.tree[right] == 0f32 {
            self.retrieve(left, s)
        } else {
            self.retrieve(right, s - self.tree[left])
        }
    }

    pub fn total(&self) -> f32 {
        self.tree[0]
    }

    /// Largest raw priority seen so far, given to new transitions.
    pub fn max_priority(&self) -> f32 {
        self.max_priority
    }

    /// Exponentiated priority stored at `ix`.
    pub fn priority(&self, ix: usize) -> f32 {
        self.tree[ix + self.capacity - 1]
    }

    /// Stores the priority of a newly pushed transition at `ix`.
    pub fn add(&mut self, ix: usize, p: f32) {
        debug_assert!(ix <= self.n_samples);

        self.update(ix, p);

        if self.n_samples < self.capacity {
            self.n_samples += 1;
        }
    }

    /// Sets the raw priority at `ix` to `p`, stored as `(p + eps)^alpha`.
    pub fn update(&mut self, ix: usize, p: f32) {
        debug_assert!(ix < self.capacity);

        let p = p.abs();
        if p > self.max_priority {
            self.max_priority = p;
        }

        let p = (p + self.eps).powf(self.alpha);
        self.min_tree.modify(ix, p);
        let ix = ix + self.capacity - 1;
        let change = p - self.tree[ix];
        self.tree[ix] = p;
        self.propagate(ix, change);
    }

    /// Index of the leaf where the cumulative priority reaches `s`.
    pub fn get(&self, s: f32) -> usize {
        let ix = self.retrieve(0, s);
        debug_assert!(ix >= (self.capacity - 1));
        (ix + 1 - self.capacity).min(self.n_samples.saturating_sub(1))
    }

    /// Samples indices proportionally to priority and returns normalized weights.
    ///
    /// The weight is $w_i=\left(N P(i)\right)^{-\beta}$.
    pub fn sample(&self, batch_size: usize, beta: f32, rng: &mut impl Rng) -> (Vec<usize>, Vec<f32>) {
        let p_sum = self.total();
        let ixs = (0..batch_size)
            .map(|_| self.get(p_sum * rng.gen::<f32>()))
            .collect::<Vec<_>>();

        let n = self.n_samples as f32 / p_sum;
        let ws = ixs
            .iter()
            .map(|&ix| (n * self.priority(ix)).powf(-beta))
            .collect::<Vec<_>>();

        let w_max = match self.normalize {
            WeightNormalizer::All => (n * self.min_tree.query(0, self.n_samples)).powf(-beta),
            WeightNormalizer::Batch => ws.iter().fold(f32::NAN, |m, &v| v.max(m)),
        };
        let ws = ws.iter().map(|w| w / w_max).collect();

        (ixs, ws)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn test_sum_tree_odd() {
        let data = vec![0.5f32, 0.2, 0.8, 0.3, 1.1, 2.5, 3.9];
        let mut sum_tree = SumTree::new(8, 1.0, WeightNormalizer::Batch);
        for ix in 0..data.len() {
            sum_tree.add(ix, data[ix]);
        }

        assert_eq!(sum_tree.get(0.0), 0);
        assert_eq!(sum_tree.get(0.4), 0);
        assert_eq!(sum_tree.get(0.5), 0);
        assert_eq!(sum_tree.get(0.6), 1);
        assert_eq!(sum_tree.get(1.2), 2);
        assert_eq!(sum_tree.get(1.6), 3);
        assert_eq!(sum_tree.get(2.0), 4);
        assert_eq!(sum_tree.get(2.8), 4);
        assert!((sum_tree.total() - data.iter().sum::<f32>()).abs() < 1e-4);
        assert_eq!(sum_tree.max_priority(), 3.9);
    }

    #[test]
    fn test_sum_tree_sampling_frequency() {
        let data = vec![1.0f32, 1.0, 2.0, 4.0];
        let mut sum_tree = SumTree::new(4, 1.0, WeightNormalizer::Batch);
        for (ix, &p) in data.iter().enumerate() {
            sum_tree.add(ix, p);
        }

        let mut rng = StdRng::seed_from_u64(42);
        let n_samples = 80_000;
        let (ixs, ws) = sum_tree.sample(n_samples, 1.0, &mut rng);
        assert!(ixs.iter().all(|&ix| ix < data.len()));
        assert!(ws.iter().all(|&w| w > 0.0 && w <= 1.0 + 1e-6));

        for (ix, &p) in data.iter().enumerate() {
            let expected = p / 8.0;
            let freq = ixs.iter().filter(|&&e| e == ix).count() as f32 / n_samples as f32;
            assert!((freq - expected).abs() < 0.01, "ix={} freq={}", ix, freq);
        }
    }

    #[test]
    fn test_weight_normalizer_all() {
        let mut sum_tree = SumTree::new(4, 1.0, WeightNormalizer::All);
        sum_tree.add(0, 1.0);
        sum_tree.add(1, 3.0);

        // The smallest priority yields the largest weight, which becomes 1.
        let mut rng = StdRng::seed_from_u64(0);
        let (ixs, ws) = sum_tree.sample(16, 1.0, &mut rng);
        for (ix, w) in ixs.iter().zip(ws.iter()) {
            let expected = if *ix == 0 { 1.0 } else { 1.0 / 3.0 };
            assert!((w - expected).abs() < 1e-4);
        }
    }
}
