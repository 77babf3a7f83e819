//! Configuration of DQN agent.
use super::DqnModelConfig;
use crate::{
    util::{CriticLoss, OutDim},
    Device,
};
use anyhow::Result;
use grl_core::{error::GrlError, explorer::EpsilonGreedyConfig};
use log::info;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::{
    convert::TryFrom,
    fmt,
    fs::File,
    io::{BufReader, Write},
    path::Path,
    str::FromStr,
};

/// How the target network follows the online network.
#[derive(Debug, Deserialize, Serialize, PartialEq, Eq, Clone, Copy)]
#[serde(try_from = "String", into = "String")]
pub enum TargetUpdateMethod {
    /// Copies every parameter.
    Hard,

    /// Polyak averaging, `target = (1 - tau) * target + tau * online`.
    Soft,
}

impl FromStr for TargetUpdateMethod {
    type Err = GrlError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "hard" => Ok(Self::Hard),
            "soft" => Ok(Self::Soft),
            _ => Err(GrlError::UnknownTargetUpdateMethod(s.to_string())),
        }
    }
}

impl TryFrom<String> for TargetUpdateMethod {
    type Error = GrlError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl fmt::Display for TargetUpdateMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Hard => write!(f, "hard"),
            Self::Soft => write!(f, "soft"),
        }
    }
}

impl From<TargetUpdateMethod> for String {
    fn from(m: TargetUpdateMethod) -> Self {
        m.to_string()
    }
}

/// Constructs [`Dqn`](super::Dqn).
///
/// `Q` is the configuration of the action-value network.
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct DqnConfig<Q>
where
    Q: OutDim,
{
    pub(super) model_config: DqnModelConfig<Q>,
    pub(super) explorer: EpsilonGreedyConfig,
    pub(super) gamma: f64,
    pub(super) batch_size: usize,
    pub(super) update_interval: usize,
    pub(super) target_update_interval: usize,
    pub(super) target_update_method: TargetUpdateMethod,
    pub(super) soft_update_tau: f64,
    pub(super) n_steps: usize,
    #[serde(default)]
    pub(super) double_dqn: bool,
    pub(super) critic_loss: CriticLoss,
    pub(super) history_len: usize,
    pub(super) model_name: String,
    pub(super) seed: u64,
    pub device: Option<Device>,
}

impl<Q> Default for DqnConfig<Q>
where
    Q: OutDim,
{
    fn default() -> Self {
        Self {
            model_config: Default::default(),
            explorer: Default::default(),
            gamma: 0.9,
            batch_size: 32,
            update_interval: 1,
            target_update_interval: 100,
            target_update_method: TargetUpdateMethod::Hard,
            soft_update_tau: 0.01,
            n_steps: 1,
            double_dqn: false,
            critic_loss: CriticLoss::SmoothL1,
            history_len: grl_core::history::DEFAULT_HISTORY_LEN,
            model_name: "dqn_model".to_string(),
            seed: 42,
            device: None,
        }
    }
}

impl<Q> DqnConfig<Q>
where
    Q: DeserializeOwned + Serialize + OutDim,
{
    /// Sets the configuration of the model.
    pub fn model_config(mut self, v: DqnModelConfig<Q>) -> Self {
        self.model_config = v;
        self
    }

    /// Sets the output dimension of the action-value network.
    pub fn out_dim(mut self, v: usize) -> Self {
        self.model_config = self.model_config.out_dim(v);
        self
    }

    /// Sets the configuration of the epsilon-greedy explorer.
    pub fn explorer(mut self, v: EpsilonGreedyConfig) -> Self {
        self.explorer = v;
        self
    }

    /// Discount factor.
    pub fn gamma(mut self, v: f64) -> Self {
        self.gamma = v;
        self
    }

    /// Batch size. Learning starts after `2 * batch_size` calls of `learn()`.
    pub fn batch_size(mut self, v: usize) -> Self {
        self.batch_size = v;
        self
    }

    /// Number of `learn()` calls per optimization step.
    pub fn update_interval(mut self, v: usize) -> Self {
        self.update_interval = v;
        self
    }

    /// Number of `learn()` calls per target synchronization.
    pub fn target_update_interval(mut self, v: usize) -> Self {
        self.target_update_interval = v;
        self
    }

    /// Sets how the target network is synchronized.
    pub fn target_update_method(mut self, v: TargetUpdateMethod) -> Self {
        self.target_update_method = v;
        self
    }

    /// Soft update coefficient.
    pub fn soft_update_tau(mut self, v: f64) -> Self {
        self.soft_update_tau = v;
        self
    }

    /// Number of steps of the bootstrapped return.
    pub fn n_steps(mut self, v: usize) -> Self {
        self.n_steps = v;
        self
    }

    /// Double DQN
    pub fn double_dqn(mut self, v: bool) -> Self {
        self.double_dqn = v;
        self
    }

    /// Loss between predicted and target action values.
    pub fn critic_loss(mut self, v: CriticLoss) -> Self {
        self.critic_loss = v;
        self
    }

    /// Number of recent losses and action values kept for statistics.
    pub fn history_len(mut self, v: usize) -> Self {
        self.history_len = v;
        self
    }

    /// File stem of the saved parameters.
    pub fn model_name(mut self, v: impl Into<String>) -> Self {
        self.model_name = v.into();
        self
    }

    /// Seed of the explorer.
    pub fn seed(mut self, v: u64) -> Self {
        self.seed = v;
        self
    }

    /// Device.
    pub fn device(mut self, v: Device) -> Self {
        self.device = Some(v);
        self
    }

    /// Loads [`DqnConfig`] from YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(&path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        info!("Load config of DQN agent from {:?}", path.as_ref());
        Ok(b)
    }

    /// Saves [`DqnConfig`].
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(&path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        info!("Save config of DQN agent into {:?}", path.as_ref());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mlp::MlpConfig;
    use tempdir::TempDir;

    #[test]
    fn test_target_update_method_from_str() {
        assert_eq!("hard".parse::<TargetUpdateMethod>(), Ok(TargetUpdateMethod::Hard));
        assert_eq!("Soft".parse::<TargetUpdateMethod>(), Ok(TargetUpdateMethod::Soft));
        assert_eq!(
            "polyak".parse::<TargetUpdateMethod>(),
            Err(GrlError::UnknownTargetUpdateMethod("polyak".to_string()))
        );
    }

    #[test]
    fn test_unknown_method_in_yaml() {
        let m: TargetUpdateMethod = serde_yaml::from_str("soft").unwrap();
        assert_eq!(m, TargetUpdateMethod::Soft);
        assert!(serde_yaml::from_str::<TargetUpdateMethod>("average").is_err());
    }

    #[test]
    fn test_serde_dqn_config() -> Result<()> {
        let model_config = DqnModelConfig::default().q_config(MlpConfig::new(4, vec![16], 3, false));
        let config = DqnConfig::default()
            .model_config(model_config)
            .target_update_method(TargetUpdateMethod::Soft)
            .soft_update_tau(0.05)
            .n_steps(3)
            .device(Device::Cpu);

        let dir = TempDir::new("dqn_config")?;
        let path = dir.path().join("dqn_config.yaml");
        config.save(&path)?;
        let config_ = DqnConfig::<MlpConfig>::load(&path)?;
        assert_eq!(config, config_);
        Ok(())
    }
}
