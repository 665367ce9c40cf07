//! Configuration of the grid environment.
use crate::GridEnvError;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufReader, Write},
    path::Path,
};

/// Configuration of [`GridSnakeEnv`](crate::GridSnakeEnv).
///
/// Everything tunable about the environment lives here; the environment
/// itself holds no constants of its own.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridEnvConfig {
    /// Grid extents `[sx, sy, sz]`.
    pub grid_size: [usize; 3],

    /// Number of obstacles on the grid.
    pub n_obstacles: usize,

    /// Reward for reaching the target.
    pub reward_target: f32,

    /// Reward for crashing into a wall, an obstacle or the body.
    pub reward_crash: f32,

    /// Reward for an ordinary step.
    pub reward_step: f32,

    /// Reward for a stagnation terminal.
    pub reward_stagnation: f32,

    /// Number of consecutive stagnating steps the snake may make; the
    /// episode ends on the step that exceeds it.
    pub stagnation_limit: u32,

    /// Retry budget of a single spawn placement.
    pub max_spawn_attempts: usize,
}

impl Default for GridEnvConfig {
    fn default() -> Self {
        Self {
            grid_size: [10, 10, 10],
            n_obstacles: 5,
            reward_target: 1.0,
            reward_crash: -1.0,
            reward_step: -0.01,
            reward_stagnation: -0.5,
            stagnation_limit: 20,
            max_spawn_attempts: 1000,
        }
    }
}

impl GridEnvConfig {
    /// Sets the grid extents.
    pub fn grid_size(mut self, v: [usize; 3]) -> Self {
        self.grid_size = v;
        self
    }

    /// Sets the number of obstacles.
    pub fn n_obstacles(mut self, v: usize) -> Self {
        self.n_obstacles = v;
        self
    }

    /// Sets the reward for reaching the target.
    pub fn reward_target(mut self, v: f32) -> Self {
        self.reward_target = v;
        self
    }

    /// Sets the reward for crashing.
    pub fn reward_crash(mut self, v: f32) -> Self {
        self.reward_crash = v;
        self
    }

    /// Sets the reward for an ordinary step.
    pub fn reward_step(mut self, v: f32) -> Self {
        self.reward_step = v;
        self
    }

    /// Sets the reward for a stagnation terminal.
    pub fn reward_stagnation(mut self, v: f32) -> Self {
        self.reward_stagnation = v;
        self
    }

    /// Sets the stagnation threshold.
    pub fn stagnation_limit(mut self, v: u32) -> Self {
        self.stagnation_limit = v;
        self
    }

    /// Sets the retry budget of a single spawn placement.
    pub fn max_spawn_attempts(mut self, v: usize) -> Self {
        self.max_spawn_attempts = v;
        self
    }

    /// Number of cells of the grid.
    pub fn volume(&self) -> usize {
        self.grid_size[0] * self.grid_size[1] * self.grid_size[2]
    }

    /// Checks that the grid can hold the initial snake, the target and all
    /// obstacles.
    pub fn validate(&self) -> Result<(), GridEnvError> {
        let required = 2 + self.n_obstacles;
        if self.volume() < required {
            return Err(GridEnvError::GridTooSmall {
                volume: self.volume(),
                required,
            });
        }
        Ok(())
    }

    /// Constructs [`GridEnvConfig`] from YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        Ok(b)
    }

    /// Saves [`GridEnvConfig`].
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempdir::TempDir;

    #[test]
    fn test_serde_grid_env_config() -> Result<()> {
        let config = GridEnvConfig::default()
            .grid_size([4, 5, 6])
            .n_obstacles(3)
            .stagnation_limit(7);

        let dir = TempDir::new("grid_env_config")?;
        let path = dir.path().join("grid_env_config.yaml");

        config.save(&path)?;
        let config_ = GridEnvConfig::load(&path)?;
        assert_eq!(config, config_);
        Ok(())
    }

    #[test]
    fn test_validate() {
        assert!(GridEnvConfig::default().validate().is_ok());
        // Volume 8 cannot hold head + target + 7 obstacles.
        let config = GridEnvConfig::default().grid_size([2, 2, 2]).n_obstacles(7);
        assert_eq!(
            config.validate(),
            Err(GridEnvError::GridTooSmall {
                volume: 8,
                required: 9
            })
        );
        // Exactly full is still placeable.
        let config = GridEnvConfig::default().grid_size([2, 2, 2]).n_obstacles(6);
        assert!(config.validate().is_ok());
    }
}
