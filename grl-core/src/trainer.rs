//! Train and evaluate [`Agent`].
mod config;
mod history;
use crate::{
    record::{Record, RecordValue::Scalar, Recorder},
    Agent, Env, Step, Transition,
};
use anyhow::Result;
pub use config::TrainerConfig;
pub use history::{read_column, TrainingHistory};
use log::info;
use std::path::Path;

#[cfg_attr(doc, aquamarine::aquamarine)]
/// Manages the training and evaluation loops.
///
/// # Training loop
///
/// 0. Given an environment implementing [`Env`] and an agent implementing [`Agent`].
/// 1. For each of `n_episodes` episodes, reset [`Env`] and repeat:
///     1. While the total number of environment steps is at most `warmup_steps`,
///        take [`Env::random_action()`]; afterwards take [`Agent::choose_action()`].
///     2. Step the environment, and store the transition with
///        [`Agent::store_transition()`].
///     3. Call [`Agent::learn()`]. The agent decides by itself whether an
///        optimization step and a target synchronization are due. The record
///        of an update is written to the [`Recorder`] with the key `env_steps`.
///     4. Finish the episode when it terminates or reaches `max_episode_len` steps.
/// 2. At the end of each episode, the episode return, length and
///    [`Agent::statistics()`] are logged and written to the [`Recorder`].
/// 3. Finally the agent and the [`TrainingHistory`] are saved in `save_dir`.
///
/// ```mermaid
/// graph LR
///     A[Agent]-->|Env::Act|B[Env]
///     B -->|"Step&lt;E: Env&gt;"|C[Transition]
///     C -->|store_transition|A
///     A -->|learn|A
/// ```
pub struct Trainer {
    config: TrainerConfig,
}

impl Trainer {
    /// Constructs a trainer.
    pub fn build(config: TrainerConfig) -> Self {
        Self { config }
    }

    /// Runs an episode and returns its return and length.
    fn run_train_episode<E, A, R>(
        &self,
        env: &mut E,
        agent: &mut A,
        recorder: &mut R,
        env_steps: &mut usize,
    ) -> Result<(f32, usize)>
    where
        E: Env,
        A: Agent<E>,
        R: Recorder,
    {
        let mut obs = env.reset()?;
        let mut reward_sum = 0f32;
        let mut t = 0;

        loop {
            let act = if *env_steps <= self.config.warmup_steps {
                env.random_action()
            } else {
                agent.choose_action(&obs)?
            };

            let Step {
                act,
                obs: next_obs,
                reward,
                is_done,
                ..
            } = env.step(&act)?;
            reward_sum += reward;
            t += 1;
            *env_steps += 1;

            let is_truncated = t >= self.config.max_episode_len;
            agent.store_transition(Transition::new(
                obs,
                act,
                reward,
                next_obs.clone(),
                is_done,
            ))?;
            if let Some(mut record) = agent.learn()? {
                record.insert("env_steps", Scalar(*env_steps as f32));
                recorder.write(record);
            }
            obs = next_obs;

            if is_done || is_truncated {
                return Ok((reward_sum, t));
            }
        }
    }

    /// Train the agent.
    pub fn train<E, A, R>(
        &self,
        env: &mut E,
        agent: &mut A,
        recorder: &mut R,
    ) -> Result<TrainingHistory>
    where
        E: Env,
        A: Agent<E>,
        R: Recorder,
    {
        self.config.validate()?;
        let mut history = TrainingHistory::default();
        let mut env_steps = 0;

        info!("Training begins");
        for episode in 1..=self.config.n_episodes {
            let (reward, steps) = self.run_train_episode(env, agent, recorder, &mut env_steps)?;
            let stats = agent.statistics();
            info!(
                "Training episode: {}, reward: {}, steps: {}, loss: {}, average Q: {}",
                episode, reward, steps, stats.loss, stats.average_q
            );

            recorder.write(Record::from_slice(&[
                ("episode", Scalar(episode as f32)),
                ("reward", Scalar(reward)),
                ("episode_steps", Scalar(steps as f32)),
                ("loss", Scalar(stats.loss)),
                ("average_q", Scalar(stats.average_q)),
            ]));
            history.push_episode(reward, steps, stats);
        }
        info!("Training finished");

        let save_dir = Path::new(&self.config.save_dir);
        std::fs::create_dir_all(save_dir)?;
        agent.save_params(save_dir)?;
        history.save(save_dir)?;

        Ok(history)
    }

    /// Evaluates the agent saved in `save_dir` with greedy actions.
    ///
    /// Returns the episode returns, also saved as `Test_Rewards.csv`.
    pub fn test<E, A, R>(&self, env: &mut E, agent: &mut A, recorder: &mut R) -> Result<Vec<f32>>
    where
        E: Env,
        A: Agent<E>,
        R: Recorder,
    {
        self.config.validate()?;
        let save_dir = Path::new(&self.config.save_dir);
        agent.load_params(save_dir)?;

        let mut history = TrainingHistory::default();

        info!("Testing begins");
        for episode in 1..=self.config.test_episodes {
            let mut obs = env.reset()?;
            let mut reward_sum = 0f32;
            let mut t = 0;

            loop {
                let act = agent.test_action(&obs)?;
                let step = env.step(&act)?;
                reward_sum += step.reward;
                t += 1;
                obs = step.obs;

                if step.is_done || t >= self.config.max_episode_len {
                    break;
                }
            }

            info!("Evaluation episode: {}, reward: {}", episode, reward_sum);
            recorder.write(Record::from_slice(&[
                ("episode", Scalar(episode as f32)),
                ("test_reward", Scalar(reward_sum)),
            ]));
            history.test_rewards.push(reward_sum);
        }
        info!("Evaluation finished");

        history.save_test(save_dir)?;
        Ok(history.test_rewards)
    }
}
