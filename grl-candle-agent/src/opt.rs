//! Optimizer of the action-value network.
use anyhow::Result;
use candle_core::{Tensor, Var};
use candle_nn::{AdamW, Optimizer as _, ParamsAdamW};
use candle_optimisers::adam::{Adam, ParamsAdam};
use serde::{Deserialize, Serialize};

/// Hyperparameters of [`AdamW`] other than the learning rate.
///
/// Missing fields in YAML take the defaults of [`ParamsAdamW`].
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct AdamWParams {
    /// Decay of the first moment.
    pub beta1: f64,

    /// Decay of the second moment.
    pub beta2: f64,

    /// Term added to the denominator.
    pub eps: f64,

    /// Decoupled weight decay.
    pub weight_decay: f64,
}

impl Default for AdamWParams {
    fn default() -> Self {
        let p = ParamsAdamW::default();
        Self {
            beta1: p.beta1,
            beta2: p.beta2,
            eps: p.eps,
            weight_decay: p.weight_decay,
        }
    }
}

/// Configuration of the optimizer of the action-value network.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub enum OptimizerConfig {
    /// Adam with decoupled weight decay.
    AdamW {
        /// Learning rate.
        lr: f64,

        /// Remaining hyperparameters.
        #[serde(flatten)]
        params: AdamWParams,
    },

    /// Adam without weight decay.
    Adam {
        /// Learning rate.
        lr: f64,
    },
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self::Adam { lr: 1e-3 }
    }
}

impl OptimizerConfig {
    /// AdamW with the given learning rate and default hyperparameters.
    pub fn adamw(lr: f64) -> Self {
        Self::AdamW {
            lr,
            params: AdamWParams::default(),
        }
    }

    /// Learning rate.
    pub fn lr(&self) -> f64 {
        match self {
            Self::AdamW { lr, .. } | Self::Adam { lr } => *lr,
        }
    }

    /// Override learning rate.
    pub fn learning_rate(mut self, v: f64) -> Self {
        match &mut self {
            Self::AdamW { lr, .. } | Self::Adam { lr } => *lr = v,
        }
        self
    }

    /// Constructs the optimizer over `vars`.
    pub fn build(&self, vars: Vec<Var>) -> Result<Optimizer> {
        let opt = match *self {
            Self::AdamW { lr, params } => {
                let p = ParamsAdamW {
                    lr,
                    beta1: params.beta1,
                    beta2: params.beta2,
                    eps: params.eps,
                    weight_decay: params.weight_decay,
                };
                Optimizer::AdamW(AdamW::new(vars, p)?)
            }
            Self::Adam { lr } => {
                let p = ParamsAdam {
                    lr,
                    ..Default::default()
                };
                Optimizer::Adam(Adam::new(vars, p)?)
            }
        };
        Ok(opt)
    }
}

/// Optimizer built from [`OptimizerConfig`].
pub enum Optimizer {
    /// AdamW optimizer.
    AdamW(AdamW),

    /// Adam optimizer.
    Adam(Adam),
}

impl Optimizer {
    /// Computes gradients of `loss` from scratch and applies one update.
    pub fn backward_step(&mut self, loss: &Tensor) -> Result<()> {
        match self {
            Self::AdamW(opt) => opt.backward_step(loss)?,
            Self::Adam(opt) => opt.backward_step(loss)?,
        }
        Ok(())
    }
}
