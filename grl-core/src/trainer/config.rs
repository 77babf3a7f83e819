//! Configuration of [`Trainer`](super::Trainer).
use anyhow::{ensure, Result};
use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufReader, Write},
    path::Path,
};

/// Configuration of [`Trainer`](super::Trainer).
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct TrainerConfig {
    /// Number of training episodes.
    pub n_episodes: usize,

    /// Episodes are truncated after this number of steps.
    pub max_episode_len: usize,

    /// Number of environment steps with random actions at the beginning of training.
    pub warmup_steps: usize,

    /// Number of evaluation episodes in [`Trainer::test()`](super::Trainer::test).
    pub test_episodes: usize,

    /// Directory where the agent and the training history are saved.
    pub save_dir: String,
}

impl Default for TrainerConfig {
    fn default() -> Self {
        Self {
            n_episodes: 100,
            max_episode_len: 2500,
            warmup_steps: 0,
            test_episodes: 10,
            save_dir: "./model".to_string(),
        }
    }
}

impl TrainerConfig {
    /// Sets the number of training episodes.
    pub fn n_episodes(mut self, v: usize) -> Self {
        self.n_episodes = v;
        self
    }

    /// Sets the maximum episode length.
    pub fn max_episode_len(mut self, v: usize) -> Self {
        self.max_episode_len = v;
        self
    }

    /// Sets the warmup period in environment steps.
    pub fn warmup_steps(mut self, v: usize) -> Self {
        self.warmup_steps = v;
        self
    }

    /// Sets the number of evaluation episodes.
    pub fn test_episodes(mut self, v: usize) -> Self {
        self.test_episodes = v;
        self
    }

    /// Sets the directory where results are saved.
    pub fn save_dir(mut self, v: impl Into<String>) -> Self {
        self.save_dir = v.into();
        self
    }

    /// Fails if an episode could never be truncated.
    pub fn validate(&self) -> Result<()> {
        ensure!(self.max_episode_len > 0, "max_episode_len must be positive");
        Ok(())
    }

    /// Constructs [`TrainerConfig`] from YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        Ok(b)
    }

    /// Saves [`TrainerConfig`].
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        Ok(())
    }
}
