//! The grid snake environment.
use crate::{
    config::GridEnvConfig,
    error::GridEnvError,
    obs::{GridObs, CELL_BODY, CELL_OBSTACLE, CELL_TARGET},
    pos::{Pos3, MOVE_DIRS},
    GridAct,
};
use anyhow::Result;
use log::trace;
use rand::{rngs::SmallRng, Rng, SeedableRng};
use slither_core::{record::Record, Env, Step};
use std::collections::HashSet;

/// A snake on a bounded 3D grid.
///
/// The state is the snake body (head first), a single target cell, a set of
/// obstacle cells, and the bookkeeping counters of the episode. One call to
/// [`GridSnakeEnv::step`] applies exactly one transition; the checks run in
/// a fixed order and the first that fires decides the step:
///
/// 1. The new head leaves the grid: the episode ends with the crash reward
///    and the body does not move.
/// 2. The new head hits the body or an obstacle: same as 1.
/// 3. The new head is the target: the body grows by one segment, the target
///    and all obstacles respawn on free cells, and the step pays the target
///    reward.
/// 4. Otherwise the body advances at constant length and pays the step
///    penalty. A step whose new head re-enters the cell the head occupied
///    two steps ago counts as stagnation; once the stagnation counter
///    exceeds the configured limit the episode ends with the stagnation
///    penalty.
///
/// All spawning is uniform over free cells with a bounded number of retries;
/// a grid too full to place an entity is an error, not an infinite loop.
///
/// The environment is the sole mutator of its state. Observations are
/// fresh snapshots, and the accessors used by renderers ([`body`],
/// [`target`], [`obstacles`]) expose the state read-only.
///
/// [`body`]: GridSnakeEnv::body
/// [`target`]: GridSnakeEnv::target
/// [`obstacles`]: GridSnakeEnv::obstacles
#[derive(Debug)]
pub struct GridSnakeEnv {
    config: GridEnvConfig,
    rng: SmallRng,

    /// Body cells, head first.
    body: Vec<Pos3>,
    target: Pos3,
    obstacles: HashSet<Pos3>,

    /// Unit vector of the last applied action.
    direction: Pos3,

    /// Head position before the current one, for stagnation detection.
    prev_head: Option<Pos3>,

    steps: u32,
    stuck_steps: u32,
    done: bool,
}

impl GridSnakeEnv {
    /// Body cells of the snake, head first.
    pub fn body(&self) -> &[Pos3] {
        &self.body
    }

    /// The target cell.
    pub fn target(&self) -> Pos3 {
        self.target
    }

    /// The obstacle cells.
    pub fn obstacles(&self) -> &HashSet<Pos3> {
        &self.obstacles
    }

    /// The unit vector of the last applied action.
    pub fn direction(&self) -> Pos3 {
        self.direction
    }

    /// Grid extents.
    pub fn grid_size(&self) -> [usize; 3] {
        self.config.grid_size
    }

    /// Number of steps taken in the current episode.
    pub fn n_steps(&self) -> u32 {
        self.steps
    }

    /// Returns `true` if the current episode has ended.
    pub fn is_done(&self) -> bool {
        self.done
    }

    fn center(&self) -> Pos3 {
        let s = self.config.grid_size;
        Pos3::new((s[0] / 2) as i32, (s[1] / 2) as i32, (s[2] / 2) as i32)
    }

    fn sample_cell(&mut self) -> Pos3 {
        let s = self.config.grid_size;
        Pos3::new(
            self.rng.gen_range(0..s[0] as i32),
            self.rng.gen_range(0..s[1] as i32),
            self.rng.gen_range(0..s[2] as i32),
        )
    }

    /// Draws a target cell uniformly among cells free of the body.
    fn spawn_target(&mut self) -> Result<(), GridEnvError> {
        for _ in 0..self.config.max_spawn_attempts {
            let pos = self.sample_cell();
            if !self.body.contains(&pos) {
                self.target = pos;
                return Ok(());
            }
        }
        Err(GridEnvError::SpawnExhausted {
            attempts: self.config.max_spawn_attempts,
        })
    }

    /// Draws obstacle cells uniformly among cells free of the body and the
    /// target, replacing any previous obstacles.
    fn spawn_obstacles(&mut self) -> Result<(), GridEnvError> {
        self.obstacles.clear();
        while self.obstacles.len() < self.config.n_obstacles {
            let mut placed = false;
            for _ in 0..self.config.max_spawn_attempts {
                let pos = self.sample_cell();
                if pos != self.target && !self.body.contains(&pos) && !self.obstacles.contains(&pos)
                {
                    self.obstacles.insert(pos);
                    placed = true;
                    break;
                }
            }
            if !placed {
                return Err(GridEnvError::SpawnExhausted {
                    attempts: self.config.max_spawn_attempts,
                });
            }
        }
        Ok(())
    }

    fn reset_episode(&mut self) -> Result<(), GridEnvError> {
        self.body = vec![self.center()];
        self.direction = MOVE_DIRS[0];
        self.prev_head = None;
        self.spawn_target()?;
        self.spawn_obstacles()?;
        self.steps = 0;
        self.stuck_steps = 0;
        self.done = false;
        Ok(())
    }

    fn index(&self, pos: Pos3) -> usize {
        let s = self.config.grid_size;
        (pos.x as usize * s[1] + pos.y as usize) * s[2] + pos.z as usize
    }

    fn observation(&self) -> GridObs {
        let mut data = vec![0f32; self.config.volume()];
        for &pos in &self.body {
            data[self.index(pos)] = CELL_BODY;
        }
        data[self.index(self.target)] = CELL_TARGET;
        for &pos in &self.obstacles {
            data[self.index(pos)] = CELL_OBSTACLE;
        }
        data.into()
    }
}

impl Env for GridSnakeEnv {
    type Config = GridEnvConfig;
    type Obs = GridObs;
    type Act = GridAct;
    type Info = ();

    fn build(config: &Self::Config, seed: u64) -> Result<Self> {
        config.validate()?;
        let mut env = Self {
            config: config.clone(),
            rng: SmallRng::seed_from_u64(seed),
            body: vec![],
            target: Pos3::new(0, 0, 0),
            obstacles: HashSet::new(),
            direction: MOVE_DIRS[0],
            prev_head: None,
            steps: 0,
            stuck_steps: 0,
            done: true,
        };
        env.reset_episode()?;
        Ok(env)
    }

    fn reset(&mut self) -> Result<Self::Obs> {
        self.reset_episode()?;
        Ok(self.observation())
    }

    fn reset_with_seed(&mut self, seed: u64) -> Result<Self::Obs> {
        self.rng = SmallRng::seed_from_u64(seed);
        self.reset()
    }

    fn step(&mut self, a: &Self::Act) -> Result<(Step<Self>, Record)> {
        if self.done {
            return Err(GridEnvError::EpisodeOver.into());
        }
        if a.act >= MOVE_DIRS.len() as u8 {
            return Err(GridEnvError::InvalidAction(a.act).into());
        }

        self.direction = MOVE_DIRS[a.act as usize];
        let head = self.body[0];
        let new_head = head + self.direction;
        self.steps += 1;

        let reward = if !new_head.is_inside(self.config.grid_size)
            || self.body.contains(&new_head)
            || self.obstacles.contains(&new_head)
        {
            self.done = true;
            self.config.reward_crash
        } else if new_head == self.target {
            self.body.insert(0, new_head);
            self.spawn_target()?;
            self.spawn_obstacles()?;
            self.prev_head = Some(head);
            self.stuck_steps = 0;
            self.config.reward_target
        } else {
            self.body.insert(0, new_head);
            self.body.pop();

            // A-B-A oscillation: the head is back on the cell it left two
            // steps ago.
            if self.prev_head == Some(new_head) {
                self.stuck_steps += 1;
            } else {
                self.stuck_steps = 0;
            }
            self.prev_head = Some(head);

            if self.stuck_steps > self.config.stagnation_limit {
                self.done = true;
                self.config.reward_stagnation
            } else {
                self.config.reward_step
            }
        };

        trace!(
            "step {}: head {:?}, reward {}, done {}",
            self.steps,
            self.body[0],
            reward,
            self.done
        );

        let step = Step::new(self.observation(), *a, reward, self.done, false, ());
        Ok((step, Record::empty()))
    }
}
