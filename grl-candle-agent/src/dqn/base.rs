//! DQN agent implemented with candle.
use super::{config::DqnConfig, model::DqnModel, TargetUpdateMethod};
use crate::{
    model::SubModel1,
    util::{copy_vars, discounted_return, smooth_l1_loss, td_target, track, CriticLoss, OutDim},
};
use anyhow::{ensure, Context, Result};
use candle_core::{DType, Device, Tensor};
use candle_nn::{loss::mse, VarMap};
use grl_core::{
    error::GrlError,
    explorer::{EpsilonGreedy, Explorer},
    graph::DiscreteAct,
    history::BoundedHistory,
    record::{Record, RecordValue},
    replay_buffer::TransitionBatch,
    Agent, Env, ExperienceBufferBase, ReplayBufferBase, Statistics, Transition,
};
use log::{debug, info};
use serde::{de::DeserializeOwned, Serialize};
use std::{
    convert::{TryFrom, TryInto},
    fs,
    marker::PhantomData,
    path::Path,
};

/// Loss, TD error and mean absolute action value of a single sample.
struct SampleLoss {
    loss: Tensor,
    td_err: f32,
    q_abs: f32,
}

#[allow(clippy::upper_case_acronyms)]
/// DQN agent with one discrete action per controlled node.
///
/// The agent owns its replay buffer and a target network, a second parameter
/// set of the same architecture that is synchronized with the online network
/// every `target_update_interval` calls of [`Agent::learn()`].
pub struct Dqn<E, Q, R>
where
    E: Env<Act = DiscreteAct>,
    Q: SubModel1<Input = E::Obs, Output = Tensor>,
    Q::Config: DeserializeOwned + Serialize + OutDim + Clone,
    R: ExperienceBufferBase<Item = Transition<E::Obs, E::Act>>
        + ReplayBufferBase<Batch = TransitionBatch<E::Obs, E::Act>>,
{
    qnet: DqnModel<Q>,
    qnet_tgt: DqnModel<Q>,
    buffer: R,
    explorer: EpsilonGreedy,
    gamma: f64,
    batch_size: usize,
    update_interval: usize,
    target_update_interval: usize,
    target_update_method: TargetUpdateMethod,
    soft_update_tau: f64,
    n_steps: usize,
    double_dqn: bool,
    critic_loss: CriticLoss,
    model_name: String,
    device: Device,
    step_counter: usize,
    n_opts: usize,
    loss_history: BoundedHistory,
    q_history: BoundedHistory,
    phantom: PhantomData<E>,
}

impl<E, Q, R> Dqn<E, Q, R>
where
    E: Env<Act = DiscreteAct>,
    Q: SubModel1<Input = E::Obs, Output = Tensor>,
    Q::Config: DeserializeOwned + Serialize + OutDim + Clone,
    R: ExperienceBufferBase<Item = Transition<E::Obs, E::Act>>
        + ReplayBufferBase<Batch = TransitionBatch<E::Obs, E::Act>>,
{
    /// Constructs DQN agent.
    ///
    /// The target network starts as an exact copy of the online network.
    pub fn build(config: DqnConfig<Q::Config>, buffer: R) -> Result<Self> {
        ensure!(config.batch_size > 0, "batch_size must be positive");
        ensure!(config.update_interval > 0, "update_interval must be positive");
        ensure!(
            config.target_update_interval > 0,
            "target_update_interval must be positive"
        );
        ensure!(
            buffer.capacity() >= config.batch_size,
            "replay buffer capacity {} is smaller than batch_size {}",
            buffer.capacity(),
            config.batch_size
        );

        let device: Device = config.device.unwrap_or_default().try_into()?;
        let n_actions = config
            .model_config
            .n_actions()
            .context("q_config is not set.")?;
        ensure!(n_actions > 0, "the number of actions must be positive");
        let qnet = DqnModel::build(config.model_config.clone(), &device)?;
        let qnet_tgt = DqnModel::build(config.model_config, &device)?;
        copy_vars(qnet_tgt.get_varmap(), qnet.get_varmap())?;

        Ok(Self {
            qnet,
            qnet_tgt,
            buffer,
            explorer: EpsilonGreedy::new(config.explorer, n_actions, config.seed),
            gamma: config.gamma,
            batch_size: config.batch_size,
            update_interval: config.update_interval,
            target_update_interval: config.target_update_interval,
            target_update_method: config.target_update_method,
            soft_update_tau: config.soft_update_tau,
            n_steps: config.n_steps.max(1),
            double_dqn: config.double_dqn,
            critic_loss: config.critic_loss,
            model_name: config.model_name,
            device,
            step_counter: 0,
            n_opts: 0,
            loss_history: BoundedHistory::new(config.history_len),
            q_history: BoundedHistory::new(config.history_len),
            phantom: PhantomData,
        })
    }

    /// Per-node argmax of the online action values.
    fn greedy(&self, obs: &E::Obs) -> Result<DiscreteAct> {
        let q = self.qnet.forward(obs)?;
        let a = q.argmax(1)?.to_dtype(DType::I64)?.to_vec1::<i64>()?;
        Ok(DiscreteAct(a))
    }

    /// Action values of the bootstrap actions at `next_obs`, `[n_nodes]`.
    fn bootstrap(&self, next_obs: &E::Obs) -> Result<Tensor> {
        let q_tgt = self.qnet_tgt.forward(next_obs)?;
        let q = if self.double_dqn {
            let a = self.qnet.forward(next_obs)?.argmax_keepdim(1)?;
            q_tgt.gather(&a, 1)?.squeeze(1)?
        } else {
            q_tgt.max(1)?
        };
        Ok(q.detach())
    }

    /// TD target of a window of consecutive transitions, `[n_nodes]`.
    ///
    /// With `k` transitions in the window, the target is
    /// $\sum_{i<k} \gamma^i r_i + \gamma^k \max_a Q_{tgt}(s'_{k-1}, a) (1 - d_{k-1})$.
    pub fn target(&self, window: &[Transition<E::Obs, E::Act>]) -> Result<Tensor> {
        let last = window.last().context("Empty window of transitions")?;
        let rewards = window.iter().map(|tr| tr.reward).collect::<Vec<_>>();
        let ret = discounted_return(&rewards, self.gamma);
        let q_next = self.bootstrap(&last.next_obs)?;
        Ok(td_target(ret, self.gamma, window.len(), &q_next, last.not_done())?.detach())
    }

    fn sample_loss(&self, window: &[Transition<E::Obs, E::Act>]) -> Result<SampleLoss> {
        let first = window.first().context("Empty window of transitions")?;
        let act = first
            .act
            .0
            .iter()
            .map(|&a| u32::try_from(a).with_context(|| format!("Invalid action index {}", a)))
            .collect::<Result<Vec<_>>>()?;
        let n = act.len();
        let act = Tensor::from_vec(act, (n, 1), &self.device)?;
        let pred = self.qnet.forward(&first.obs)?.gather(&act, 1)?.squeeze(1)?;
        let tgt = self.target(window)?;

        let loss = match self.critic_loss {
            CriticLoss::Mse => mse(&pred, &tgt)?,
            CriticLoss::SmoothL1 => smooth_l1_loss(&pred, &tgt)?,
        };
        let td_err = (&tgt - &pred)?.abs()?.mean_all()?.to_scalar::<f32>()?;
        let q_abs = pred.abs()?.mean_all()?.to_scalar::<f32>()?;

        Ok(SampleLoss { loss, td_err, q_abs })
    }

    fn update_critic(&mut self) -> Result<Record> {
        let batch = self.buffer.batch(self.batch_size, self.n_steps)?;
        let (samples, weight, ixs) = batch.unpack();

        let mut losses = Vec::with_capacity(samples.len());
        let mut td_errs = Vec::with_capacity(samples.len());
        let mut q_abs = 0f32;
        for window in samples.iter() {
            let s = self.sample_loss(window)?;
            losses.push(s.loss);
            td_errs.push(s.td_err);
            q_abs += s.q_abs;
        }
        q_abs /= samples.len() as f32;

        if self.buffer.is_prioritized() {
            self.buffer.update_priority(&ixs, &td_errs)?;
        }

        let n = weight.len();
        let weight = Tensor::from_vec(weight, n, &self.device)?;
        let loss = (Tensor::stack(&losses, 0)? * weight)?.mean_all()?;
        self.qnet.backward_step(&loss)?;
        self.n_opts += 1;

        let loss = loss.to_scalar::<f32>()?;
        let td_err = td_errs.iter().sum::<f32>() / td_errs.len() as f32;
        self.loss_history.push(loss);
        self.q_history.push(q_abs);

        Ok(Record::from_slice(&[
            ("loss", RecordValue::Scalar(loss)),
            ("td_error", RecordValue::Scalar(td_err)),
            ("q_abs", RecordValue::Scalar(q_abs)),
        ]))
    }

    /// Synchronizes the target network with the online network.
    pub fn synchronize_target(&mut self) -> Result<()> {
        match self.target_update_method {
            TargetUpdateMethod::Hard => {
                debug!("Hard target update at step {}", self.step_counter);
                copy_vars(self.qnet_tgt.get_varmap(), self.qnet.get_varmap())
            }
            TargetUpdateMethod::Soft => {
                let tau = self.soft_update_tau;
                if !(tau > 0.0 && tau < 1.0) {
                    return Err(GrlError::InvalidSoftUpdateTau(tau).into());
                }
                debug!("Soft target update at step {}", self.step_counter);
                track(self.qnet_tgt.get_varmap(), self.qnet.get_varmap(), tau)
            }
        }
    }

    /// Number of calls of [`Agent::learn()`].
    pub fn step_counter(&self) -> usize {
        self.step_counter
    }

    /// Number of optimization steps.
    pub fn n_opts(&self) -> usize {
        self.n_opts
    }

    /// The replay buffer.
    pub fn buffer(&self) -> &R {
        &self.buffer
    }

    /// Parameters of the online network.
    pub fn online_varmap(&self) -> &VarMap {
        self.qnet.get_varmap()
    }

    /// Parameters of the target network.
    pub fn target_varmap(&self) -> &VarMap {
        self.qnet_tgt.get_varmap()
    }
}

impl<E, Q, R> Agent<E> for Dqn<E, Q, R>
where
    E: Env<Act = DiscreteAct>,
    Q: SubModel1<Input = E::Obs, Output = Tensor>,
    Q::Config: DeserializeOwned + Serialize + OutDim + Clone,
    R: ExperienceBufferBase<Item = Transition<E::Obs, E::Act>>
        + ReplayBufferBase<Batch = TransitionBatch<E::Obs, E::Act>>,
{
    fn choose_action(&mut self, obs: &E::Obs) -> Result<DiscreteAct> {
        let a = self.greedy(obs)?;
        Ok(self.explorer.generate_action(a))
    }

    fn test_action(&self, obs: &E::Obs) -> Result<DiscreteAct> {
        self.greedy(obs)
    }

    fn store_transition(&mut self, tr: Transition<E::Obs, E::Act>) -> Result<()> {
        self.buffer.push(tr)
    }

    fn learn(&mut self) -> Result<Option<Record>> {
        self.step_counter += 1;
        if self.step_counter <= 2 * self.batch_size
            || self.step_counter % self.update_interval != 0
        {
            return Ok(None);
        }

        let record = self.update_critic()?;

        if self.step_counter % self.target_update_interval == 0 {
            self.synchronize_target()?;
        }

        Ok(Some(record))
    }

    fn statistics(&self) -> Statistics {
        Statistics {
            loss: self.loss_history.mean(),
            average_q: self.q_history.mean(),
        }
    }

    fn save_params(&self, path: &Path) -> Result<()> {
        fs::create_dir_all(path)?;
        let path = path.join(format!("{}.safetensors", self.model_name));
        self.qnet.save(&path)?;
        info!("Saved DQN agent to {:?}", path);
        Ok(())
    }

    fn load_params(&mut self, path: &Path) -> Result<()> {
        let path = path.join(format!("{}.safetensors", self.model_name));
        self.qnet.load(&path)?;
        copy_vars(self.qnet_tgt.get_varmap(), self.qnet.get_varmap())?;
        info!("Loaded DQN agent from {:?}", path);
        Ok(())
    }
}
