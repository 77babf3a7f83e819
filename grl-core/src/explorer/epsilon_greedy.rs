use super::Explorer;
use crate::graph::DiscreteAct;
use anyhow::Result;
use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufReader, Write},
    path::Path,
};

/// Configuration of [`EpsilonGreedy`].
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct EpsilonGreedyConfig {
    /// Epsilon at the first call.
    pub eps_start: f64,

    /// Epsilon after `final_step` calls.
    pub eps_final: f64,

    /// Number of calls over which epsilon decays linearly.
    pub final_step: usize,
}

impl Default for EpsilonGreedyConfig {
    fn default() -> Self {
        Self {
            eps_start: 1.0,
            eps_final: 0.02,
            final_step: 100_000,
        }
    }
}

impl EpsilonGreedyConfig {
    /// Set the epsilon value at the start.
    pub fn eps_start(mut self, v: f64) -> Self {
        self.eps_start = v;
        self
    }

    /// Set the epsilon value at the final step.
    pub fn eps_final(mut self, v: f64) -> Self {
        self.eps_final = v;
        self
    }

    /// Set the number of decay steps.
    pub fn final_step(mut self, v: usize) -> Self {
        self.final_step = v;
        self
    }

    /// Loads the configuration from a YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        Ok(b)
    }

    /// Saves the configuration to a YAML file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        Ok(())
    }
}

/// Epsilon-greedy explorer over multi-agent discrete actions.
///
/// With probability epsilon the action of every node is replaced by a
/// uniformly random one. Without any action to choose from, the greedy action
/// is returned as is.
pub struct EpsilonGreedy {
    config: EpsilonGreedyConfig,
    n_actions: usize,
    n_calls: usize,
    rng: StdRng,
}

impl EpsilonGreedy {
    /// Constructs epsilon-greedy explorer over `n_actions` discrete actions.
    pub fn new(config: EpsilonGreedyConfig, n_actions: usize, seed: u64) -> Self {
        Self {
            config,
            n_actions,
            n_calls: 0,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Current epsilon.
    pub fn eps(&self) -> f64 {
        let EpsilonGreedyConfig {
            eps_start,
            eps_final,
            final_step,
        } = self.config;
        if self.n_calls >= final_step {
            return eps_final;
        }
        let progress = self.n_calls as f64 / final_step as f64;
        eps_start + (eps_final - eps_start) * progress
    }
}

impl Explorer<DiscreteAct> for EpsilonGreedy {
    fn generate_action(&mut self, greedy: DiscreteAct) -> DiscreteAct {
        let is_random = self.rng.gen::<f64>() < self.eps();
        self.n_calls += 1;

        if is_random && self.n_actions > 0 {
            let n_actions = self.n_actions as i64;
            let rng = &mut self.rng;
            DiscreteAct(greedy.0.iter().map(|_| rng.gen_range(0..n_actions)).collect())
        } else {
            greedy
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_eps_decay() {
        let config = EpsilonGreedyConfig::default()
            .eps_start(1.0)
            .eps_final(0.1)
            .final_step(10);
        let mut explorer = EpsilonGreedy::new(config, 3, 42);
        assert_eq!(explorer.eps(), 1.0);

        for _ in 0..5 {
            explorer.generate_action(DiscreteAct(vec![0, 1]));
        }
        assert!((explorer.eps() - 0.55).abs() < 1e-9);

        for _ in 0..100 {
            let a = explorer.generate_action(DiscreteAct(vec![0, 1]));
            assert_eq!(a.0.len(), 2);
            assert!(a.0.iter().all(|&v| (0..3).contains(&v)));
        }
        assert_eq!(explorer.eps(), 0.1);
    }

    #[test]
    fn test_eps_increasing_schedule() {
        let config = EpsilonGreedyConfig::default()
            .eps_start(0.0)
            .eps_final(0.5)
            .final_step(10);
        let mut explorer = EpsilonGreedy::new(config, 2, 7);
        assert_eq!(explorer.eps(), 0.0);

        for _ in 0..5 {
            explorer.generate_action(DiscreteAct(vec![0]));
        }
        assert!((explorer.eps() - 0.25).abs() < 1e-9);

        for _ in 0..20 {
            explorer.generate_action(DiscreteAct(vec![0]));
        }
        assert_eq!(explorer.eps(), 0.5);
    }

    #[test]
    fn test_no_actions_keeps_greedy() {
        let mut explorer = EpsilonGreedy::new(EpsilonGreedyConfig::default(), 0, 1);
        assert_eq!(explorer.eps(), 1.0);
        let a = explorer.generate_action(DiscreteAct(vec![0, 0]));
        assert_eq!(a, DiscreteAct(vec![0, 0]));
    }

    #[test]
    fn test_greedy_when_eps_zero() {
        let config = EpsilonGreedyConfig::default()
            .eps_start(0.0)
            .eps_final(0.0);
        let mut explorer = EpsilonGreedy::new(config, 5, 0);
        for _ in 0..20 {
            let a = explorer.generate_action(DiscreteAct(vec![4, 2, 0]));
            assert_eq!(a, DiscreteAct(vec![4, 2, 0]));
        }
    }
}
