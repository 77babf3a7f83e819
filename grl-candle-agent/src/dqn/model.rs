use crate::{
    model::SubModel1,
    opt::{Optimizer, OptimizerConfig},
    util::OutDim,
};
use anyhow::{Context, Result};
use candle_core::{DType, Device, Tensor};
use candle_nn::{VarBuilder, VarMap};
use log::info;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufReader, Write},
    path::Path,
};

#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
/// Configuration of [`DqnModel`].
pub struct DqnModelConfig<Q>
where
    Q: OutDim,
{
    pub(super) q_config: Option<Q>,
    pub(super) opt_config: OptimizerConfig,
}

impl<Q> Default for DqnModelConfig<Q>
where
    Q: OutDim,
{
    fn default() -> Self {
        Self {
            q_config: None,
            opt_config: OptimizerConfig::default(),
        }
    }
}

impl<Q> DqnModelConfig<Q>
where
    Q: DeserializeOwned + Serialize + OutDim,
{
    /// Sets configurations for action-value function.
    pub fn q_config(mut self, v: Q) -> Self {
        self.q_config = Some(v);
        self
    }

    /// Sets output dimension of the model.
    pub fn out_dim(mut self, v: usize) -> Self {
        if let Some(q_config) = &mut self.q_config {
            q_config.set_out_dim(v);
        }
        self
    }

    /// Sets optimizer configuration.
    pub fn opt_config(mut self, v: OptimizerConfig) -> Self {
        self.opt_config = v;
        self
    }

    /// Number of discrete actions, if the action-value function is configured.
    pub fn n_actions(&self) -> Option<usize> {
        self.q_config.as_ref().map(|q| q.get_out_dim())
    }

    /// Constructs [`DqnModelConfig`] from YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        Ok(b)
    }

    /// Saves [`DqnModelConfig`] to as a YAML file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        Ok(())
    }
}

/// Action-value network with its own parameters and optimizer.
pub struct DqnModel<Q>
where
    Q: SubModel1<Output = Tensor>,
{
    varmap: VarMap,

    // Action-value function
    q: Q,

    opt: Optimizer,
}

impl<Q> DqnModel<Q>
where
    Q: SubModel1<Output = Tensor>,
    Q::Config: DeserializeOwned + Serialize + OutDim + Clone,
{
    /// Constructs [`DqnModel`] with freshly initialized parameters.
    pub fn build(config: DqnModelConfig<Q::Config>, device: &Device) -> Result<Self> {
        let q_config = config.q_config.context("q_config is not set.")?;
        let varmap = VarMap::new();
        let q = {
            let vb = VarBuilder::from_varmap(&varmap, DType::F32, device);
            Q::build(vb, q_config)?
        };
        let opt = config.opt_config.build(varmap.all_vars())?;

        Ok(Self { varmap, q, opt })
    }

    /// Outputs the action values given an observation.
    pub fn forward(&self, obs: &Q::Input) -> Result<Tensor> {
        self.q.forward(obs)
    }

    /// Applies one optimization step against `loss`.
    pub fn backward_step(&mut self, loss: &Tensor) -> Result<()> {
        self.opt.backward_step(loss)
    }

    /// Parameters of the model.
    pub fn get_varmap(&self) -> &VarMap {
        &self.varmap
    }

    /// Saves the parameters in safetensors format.
    pub fn save<T: AsRef<Path>>(&self, path: T) -> Result<()> {
        self.varmap.save(&path)?;
        info!("Save dqnmodel to {:?}", path.as_ref());
        Ok(())
    }

    /// Loads the parameters; fails on a missing file, a missing variable or a shape mismatch.
    pub fn load<T: AsRef<Path>>(&mut self, path: T) -> Result<()> {
        self.varmap.load(&path)?;
        info!("Load dqnmodel from {:?}", path.as_ref());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{mlp::{Mlp, MlpConfig}, util::var_values};
    use grl_core::graph::GraphObs;

    #[test]
    fn test_adamw_step_updates_params() -> Result<()> {
        let config = DqnModelConfig::default()
            .q_config(MlpConfig::new(2, vec![4], 3, false))
            .opt_config(OptimizerConfig::adamw(1e-2));
        let mut model = DqnModel::<Mlp>::build(config, &Device::Cpu)?;
        let before = var_values(model.get_varmap())?;

        let obs = GraphObs::new(2, 2, vec![1.0, -1.0, 0.5, 2.0], vec![0.0; 4], vec![1.0; 2])?;
        let loss = model.forward(&obs)?.sqr()?.mean_all()?;
        model.backward_step(&loss)?;

        assert_ne!(var_values(model.get_varmap())?, before);
        Ok(())
    }
}
