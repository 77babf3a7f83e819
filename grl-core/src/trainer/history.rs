//! Per-episode training and evaluation results.
use crate::Statistics;
use anyhow::Result;
use log::info;
use std::path::Path;

/// Arrays of per-episode results, saved as single-column CSV files.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TrainingHistory {
    /// Return of each training episode.
    pub rewards: Vec<f32>,

    /// Length of each training episode.
    pub episode_steps: Vec<usize>,

    /// Mean recent loss at the end of each training episode.
    pub loss: Vec<f32>,

    /// Mean recent absolute Q value at the end of each training episode.
    pub average_q: Vec<f32>,

    /// Return of each evaluation episode.
    pub test_rewards: Vec<f32>,
}

fn write_column<T: ToString>(path: &Path, name: &str, values: &[T]) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;
    wtr.write_record(&[name])?;
    for v in values.iter() {
        wtr.write_record(&[v.to_string()])?;
    }
    wtr.flush()?;
    Ok(())
}

/// Reads a column written by [`TrainingHistory::save()`].
pub fn read_column(path: impl AsRef<Path>) -> Result<Vec<f32>> {
    let mut rdr = csv::Reader::from_path(path)?;
    let mut values = vec![];
    for record in rdr.records() {
        let record = record?;
        values.push(record[0].parse::<f32>()?);
    }
    Ok(values)
}

impl TrainingHistory {
    /// Appends the result of a training episode.
    pub fn push_episode(&mut self, reward: f32, steps: usize, stats: Statistics) {
        self.rewards.push(reward);
        self.episode_steps.push(steps);
        self.loss.push(stats.loss);
        self.average_q.push(stats.average_q);
    }

    /// Saves the training arrays in `dir`.
    pub fn save(&self, dir: impl AsRef<Path>) -> Result<()> {
        let dir = dir.as_ref();
        std::fs::create_dir_all(dir)?;
        write_column(&dir.join("Rewards.csv"), "Rewards", &self.rewards)?;
        write_column(&dir.join("Episode_Steps.csv"), "Episode_Steps", &self.episode_steps)?;
        write_column(&dir.join("Loss.csv"), "Loss", &self.loss)?;
        write_column(&dir.join("Average_Q.csv"), "Average_Q", &self.average_q)?;
        info!("Saved training history in {:?}", dir);
        Ok(())
    }

    /// Saves the evaluation rewards in `dir`.
    pub fn save_test(&self, dir: impl AsRef<Path>) -> Result<()> {
        let dir = dir.as_ref();
        std::fs::create_dir_all(dir)?;
        write_column(&dir.join("Test_Rewards.csv"), "Test_Rewards", &self.test_rewards)?;
        info!("Saved test rewards in {:?}", dir);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempdir::TempDir;

    #[test]
    fn test_save_history() -> Result<()> {
        let mut history = TrainingHistory::default();
        history.push_episode(
            1.5,
            10,
            Statistics {
                loss: f32::NAN,
                average_q: f32::NAN,
            },
        );
        history.push_episode(
            -2.0,
            7,
            Statistics {
                loss: 0.25,
                average_q: 3.0,
            },
        );

        let dir = TempDir::new("history")?;
        history.save(dir.path())?;

        assert_eq!(read_column(dir.path().join("Rewards.csv"))?, vec![1.5, -2.0]);
        assert_eq!(read_column(dir.path().join("Episode_Steps.csv"))?, vec![10.0, 7.0]);
        let loss = read_column(dir.path().join("Loss.csv"))?;
        assert!(loss[0].is_nan());
        assert_eq!(loss[1], 0.25);
        Ok(())
    }
}
