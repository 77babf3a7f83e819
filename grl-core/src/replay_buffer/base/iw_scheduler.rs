//! Annealing of the importance-weight exponent.
use serde::{Deserialize, Serialize};

/// Linear schedule of $\beta$, the exponent of importance weights in PER.
///
/// $\beta$ moves from `beta_0` to `beta_final` as priority updates accumulate,
/// and stays at `beta_final` afterwards.
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
pub struct IwScheduler {
    /// Initial value of $\beta$.
    pub beta_0: f32,

    /// Final value of $\beta$.
    pub beta_final: f32,

    /// Number of priority updates after which $\beta$ reaches `beta_final`.
    pub n_opts_final: usize,

    /// Priority updates so far.
    pub n_opts: usize,
}

impl IwScheduler {
    /// Creates a scheduler.
    pub fn new(beta_0: f32, beta_final: f32, n_opts_final: usize) -> Self {
        Self {
            beta_0,
            beta_final,
            n_opts_final,
            n_opts: 0,
        }
    }

    /// Current value of $\beta$.
    pub fn beta(&self) -> f32 {
        if self.n_opts >= self.n_opts_final {
            return self.beta_final;
        }
        let progress = self.n_opts as f32 / self.n_opts_final as f32;
        self.beta_0 + (self.beta_final - self.beta_0) * progress
    }

    /// Counts one priority update.
    pub fn add_n_opts(&mut self) {
        self.n_opts += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::IwScheduler;

    #[test]
    fn test_beta_schedule() {
        let mut s = IwScheduler::new(0.4, 1.0, 4);
        assert_eq!(s.beta(), 0.4);
        s.add_n_opts();
        s.add_n_opts();
        assert!((s.beta() - 0.7).abs() < 1e-6);
        (0..10).for_each(|_| s.add_n_opts());
        assert_eq!(s.beta(), 1.0);

        let s = IwScheduler::new(0.4, 1.0, 0);
        assert_eq!(s.beta(), 1.0);
    }
}
