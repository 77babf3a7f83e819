use anyhow::Result;
use grl_core::{
    graph::{DiscreteAct, GraphObs},
    read_column,
    record::{BufferedRecorder, NullRecorder, Record},
    Agent, Env, Statistics, Step, Trainer, TrainerConfig, Transition,
};
use std::path::Path;
use tempdir::TempDir;

/// A single vehicle that never reaches a terminal state.
struct EndlessEnv {
    n_random: usize,
}

fn obs() -> Result<GraphObs> {
    GraphObs::new(1, 1, vec![0.0], vec![0.0], vec![1.0])
}

impl Env for EndlessEnv {
    type Obs = GraphObs;
    type Act = DiscreteAct;
    type Info = ();

    fn reset(&mut self) -> Result<GraphObs> {
        obs()
    }

    fn step(&mut self, a: &DiscreteAct) -> Result<Step<Self>> {
        Ok(Step::new(obs()?, a.clone(), a.0[0] as f32, false, ()))
    }

    fn random_action(&mut self) -> DiscreteAct {
        self.n_random += 1;
        DiscreteAct(vec![0])
    }
}

/// Always picks action 1 and counts the calls it receives; every fourth call of
/// `learn` reports an update.
#[derive(Default)]
struct CountingAgent {
    n_chosen: usize,
    n_stored: usize,
    n_learn: usize,
}

impl Agent<EndlessEnv> for CountingAgent {
    fn choose_action(&mut self, _obs: &GraphObs) -> Result<DiscreteAct> {
        self.n_chosen += 1;
        Ok(DiscreteAct(vec![1]))
    }

    fn test_action(&self, _obs: &GraphObs) -> Result<DiscreteAct> {
        Ok(DiscreteAct(vec![1]))
    }

    fn store_transition(&mut self, _tr: Transition<GraphObs, DiscreteAct>) -> Result<()> {
        self.n_stored += 1;
        Ok(())
    }

    fn learn(&mut self) -> Result<Option<Record>> {
        self.n_learn += 1;
        if self.n_learn % 4 == 0 {
            Ok(Some(Record::from_scalar("loss", 0.5)))
        } else {
            Ok(None)
        }
    }

    fn statistics(&self) -> Statistics {
        Statistics {
            loss: f32::NAN,
            average_q: f32::NAN,
        }
    }

    fn save_params(&self, path: &Path) -> Result<()> {
        std::fs::write(path.join("counting_agent.txt"), self.n_learn.to_string())?;
        Ok(())
    }

    fn load_params(&mut self, path: &Path) -> Result<()> {
        std::fs::read_to_string(path.join("counting_agent.txt"))?;
        Ok(())
    }
}

#[test]
fn test_warmup_and_truncation() -> Result<()> {
    let _ = env_logger::builder().is_test(true).try_init();

    let dir = TempDir::new("trainer_loop")?;
    let trainer = Trainer::build(
        TrainerConfig::default()
            .n_episodes(3)
            .max_episode_len(4)
            .warmup_steps(5)
            .test_episodes(2)
            .save_dir(dir.path().to_string_lossy()),
    );
    let mut env = EndlessEnv { n_random: 0 };
    let mut agent = CountingAgent::default();

    let mut recorder = BufferedRecorder::new();
    let history = trainer.train(&mut env, &mut agent, &mut recorder)?;
    assert_eq!(history.episode_steps, vec![4, 4, 4]);
    assert_eq!(env.n_random, 6);
    assert_eq!(agent.n_chosen, 6);
    assert_eq!(agent.n_stored, 12);
    assert_eq!(agent.n_learn, 12);

    // Three episode summaries and three update records tagged with the global step.
    assert_eq!(recorder.len(), 6);
    let update_steps = recorder
        .iter()
        .filter(|r| r.get("loss").is_some() && r.get("episode").is_none())
        .map(|r| r.get_scalar("env_steps"))
        .collect::<Result<Vec<_>, _>>()?;
    assert_eq!(update_steps, vec![4.0, 8.0, 12.0]);

    // Steps taken while at most 5 steps were made are random and earn nothing.
    assert_eq!(history.rewards, vec![0.0, 2.0, 4.0]);
    assert!(history.loss.iter().all(|v| v.is_nan()));
    assert_eq!(read_column(dir.path().join("Rewards.csv"))?, history.rewards);

    let test_rewards = trainer.test(&mut env, &mut agent, &mut NullRecorder::new())?;
    assert_eq!(test_rewards, vec![4.0, 4.0]);
    Ok(())
}

#[test]
fn test_load_failure_propagates() {
    let dir = TempDir::new("trainer_loop_empty").unwrap();
    let trainer = Trainer::build(TrainerConfig::default().save_dir(dir.path().to_string_lossy()));
    let mut env = EndlessEnv { n_random: 0 };
    let mut agent = CountingAgent::default();
    assert!(trainer
        .test(&mut env, &mut agent, &mut NullRecorder::new())
        .is_err());
}

#[test]
fn test_zero_episode_len_is_rejected() {
    let dir = TempDir::new("trainer_loop_zero").unwrap();
    let trainer = Trainer::build(
        TrainerConfig::default()
            .n_episodes(1)
            .max_episode_len(0)
            .save_dir(dir.path().to_string_lossy()),
    );
    let mut env = EndlessEnv { n_random: 0 };
    let mut agent = CountingAgent::default();
    assert!(trainer
        .train(&mut env, &mut agent, &mut NullRecorder::new())
        .is_err());
    assert_eq!(agent.n_learn, 0);
}
