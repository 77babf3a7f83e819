use super::Explorer;
use crate::graph::ContinuousAct;
use rand::{rngs::StdRng, Rng, SeedableRng};
use rand_distr::StandardNormal;
use serde::{Deserialize, Serialize};

/// Configuration of [`OuNoise`].
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct OuNoiseConfig {
    /// Long-run mean of the process.
    pub mu: f32,

    /// Rate of mean reversion.
    pub theta: f32,

    /// Scale of the Wiener increment.
    pub sigma: f32,

    /// Time step.
    pub dt: f32,

    /// Lower bound of actions.
    pub action_min: f32,

    /// Upper bound of actions.
    pub action_max: f32,
}

impl Default for OuNoiseConfig {
    fn default() -> Self {
        Self {
            mu: 0.0,
            theta: 0.15,
            sigma: 0.2,
            dt: 1e-2,
            action_min: -1.0,
            action_max: 1.0,
        }
    }
}

impl OuNoiseConfig {
    /// Sets `sigma`.
    pub fn sigma(mut self, v: f32) -> Self {
        self.sigma = v;
        self
    }

    /// Sets the action bounds.
    pub fn action_range(mut self, min: f32, max: f32) -> Self {
        self.action_min = min;
        self.action_max = max;
        self
    }
}

/// Ornstein-Uhlenbeck noise added to continuous actions.
///
/// Each step updates the state as
/// $x \leftarrow x + \theta(\mu - x)dt + \sigma\sqrt{dt}\,\epsilon$,
/// $\epsilon \sim N(0, 1)$, and the noisy action is clipped to the bounds.
pub struct OuNoise {
    config: OuNoiseConfig,
    x: Vec<f32>,
    rng: StdRng,
}

impl OuNoise {
    /// Constructs the process for actions of dimension `dim`.
    pub fn new(config: OuNoiseConfig, dim: usize, seed: u64) -> Self {
        let x = vec![config.mu; dim];
        Self {
            config,
            x,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Restores the initial state, typically at the start of an episode.
    pub fn reset(&mut self) {
        let mu = self.config.mu;
        self.x.iter_mut().for_each(|x| *x = mu);
    }

    /// Advances the process one step and returns the new state.
    pub fn sample(&mut self) -> &[f32] {
        let OuNoiseConfig {
            mu,
            theta,
            sigma,
            dt,
            ..
        } = self.config;
        let rng = &mut self.rng;
        for x in self.x.iter_mut() {
            let eps: f32 = rng.sample(StandardNormal);
            *x += theta * (mu - *x) * dt + sigma * dt.sqrt() * eps;
        }
        &self.x
    }
}

impl Explorer<ContinuousAct> for OuNoise {
    fn generate_action(&mut self, greedy: ContinuousAct) -> ContinuousAct {
        let (lo, hi) = (self.config.action_min, self.config.action_max);
        let noise = self.sample();
        ContinuousAct(
            greedy
                .0
                .iter()
                .zip(noise.iter())
                .map(|(a, n)| (a + n).max(lo).min(hi))
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ou_noise_clip_and_reset() {
        let config = OuNoiseConfig::default().sigma(5.0).action_range(-0.5, 0.5);
        let mut noise = OuNoise::new(config, 4, 42);
        for _ in 0..100 {
            let a = noise.generate_action(ContinuousAct(vec![0.0; 4]));
            assert!(a.0.iter().all(|&v| (-0.5..=0.5).contains(&v)));
        }
        assert!(noise.x.iter().any(|&x| x != 0.0));

        noise.reset();
        assert!(noise.x.iter().all(|&x| x == 0.0));
    }

    #[test]
    fn test_ou_noise_without_diffusion_reverts_to_mean() {
        let mut config = OuNoiseConfig::default().sigma(0.0);
        config.mu = 1.0;
        config.theta = 1.0;
        config.dt = 0.5;
        let mut noise = OuNoise::new(config, 1, 0);
        noise.x[0] = 0.0;
        assert_eq!(noise.sample(), &[0.5]);
        assert_eq!(noise.sample(), &[0.75]);
    }
}
