#![warn(missing_docs)]
//! A 3D grid snake environment for the Slither RL testbed.
//!
//! [`GridSnakeEnv`] implements [`slither_core::Env`]: a snake moves through
//! a bounded 3D grid along the six axis directions, growing when it reaches
//! the target and dying on walls, obstacles, its own body, or after
//! dithering in place for too long. Observations are dense flat grids with
//! sentinel values per cell, ready for a function approximator.
//!
//! ```no_run
//! use slither_core::Env;
//! use slither_grid_env::{GridAct, GridEnvConfig, GridSnakeEnv};
//!
//! # fn main() -> anyhow::Result<()> {
//! let config = GridEnvConfig::default().grid_size([5, 5, 5]).n_obstacles(2);
//! let mut env = GridSnakeEnv::build(&config, 42)?;
//! let _obs = env.reset()?;
//! let (step, _) = env.step(&GridAct::new(0))?;
//! println!("reward: {}", step.reward);
//! # Ok(())
//! # }
//! ```
mod act;
mod base;
mod config;
mod error;
mod obs;
mod pos;

pub use act::GridAct;
pub use base::GridSnakeEnv;
pub use config::GridEnvConfig;
pub use error::GridEnvError;
pub use obs::{GridObs, CELL_BODY, CELL_FREE, CELL_OBSTACLE, CELL_TARGET};
pub use pos::{Pos3, MOVE_DIRS};
