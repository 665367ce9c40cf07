//! Train and evaluate a PPO agent on the 3D grid snake environment.
use anyhow::Result;
use clap::Parser;
use log::info;
use slither_candle_agent::{
    mlp::{Mlp, MlpConfig},
    opt::OptimizerConfig,
    ppo::{Ppo, PpoConfig, PpoModelConfig},
    Device,
};
use slither_core::{
    record::BufferedRecorder, Agent as _, Configurable, DefaultEvaluator, Env as _, Policy,
    Trainer, TrainerConfig,
};
use slither_grid_env::{GridEnvConfig, GridSnakeEnv};

const GRID_SIZE: [usize; 3] = [10, 10, 10];
const N_OBSTACLES: usize = 5;
const EPISODES: usize = 1000;
const STEPS_PER_EPISODE: usize = 200;
const GAMMA: f32 = 0.99;
const LR: f64 = 3e-4;
const EPS_CLIP: f64 = 0.2;
const UPDATE_EPOCHS: usize = 4;
const HIDDEN_DIM: i64 = 128;
const N_ACTIONS: i64 = 6;
const EVAL_INTERVAL: usize = 100;
const N_EPISODES_PER_EVAL: usize = 5;

type PpoAgent = Ppo<GridSnakeEnv, Mlp>;
type Evaluator = DefaultEvaluator<GridSnakeEnv>;

fn create_env_config(grid_size: [usize; 3], n_obstacles: usize) -> GridEnvConfig {
    GridEnvConfig::default()
        .grid_size(grid_size)
        .n_obstacles(n_obstacles)
}

fn create_agent_config(in_dim: i64) -> PpoConfig<Mlp> {
    let device = Device::cuda_if_available(0);
    let model_config = PpoModelConfig::default()
        .pi_config(MlpConfig::new(in_dim, vec![HIDDEN_DIM], N_ACTIONS, false))
        .v_config(MlpConfig::new(in_dim, vec![HIDDEN_DIM], 1, false))
        .opt_config(OptimizerConfig::default().learning_rate(LR));
    PpoConfig::default()
        .model_config(model_config)
        .opt_epochs(UPDATE_EPOCHS)
        .clip_eps(EPS_CLIP)
        .device(device)
}

fn create_trainer_config(episodes: usize) -> TrainerConfig {
    TrainerConfig::default()
        .max_episodes(episodes)
        .max_steps_per_episode(STEPS_PER_EPISODE)
        .gamma(GAMMA)
        .eval_interval(EVAL_INTERVAL)
        .record_compute_cost_interval(EVAL_INTERVAL)
}

fn train(
    env_config: &GridEnvConfig,
    agent: &mut PpoAgent,
    episodes: usize,
) -> Result<BufferedRecorder> {
    let mut trainer: Trainer<GridSnakeEnv> =
        Trainer::build(create_trainer_config(episodes), env_config.clone())?;
    let mut recorder = BufferedRecorder::new();
    let mut evaluator = Evaluator::new(env_config, 0, N_EPISODES_PER_EVAL, STEPS_PER_EPISODE)?;

    trainer.train(agent, &mut recorder, &mut evaluator)?;
    Ok(recorder)
}

/// Rolls the greedy policy through one episode, reporting the outcome
/// through the environment's read-only state accessors.
fn eval(env_config: &GridEnvConfig, agent: &mut PpoAgent) -> Result<()> {
    agent.eval();
    let mut env = GridSnakeEnv::build(env_config, 0)?;
    let mut obs = env.reset()?;
    let mut ret = 0f32;
    let mut length = 0;

    for _ in 0..STEPS_PER_EPISODE {
        let act = agent.sample(&obs);
        let (step, _) = env.step(&act)?;
        ret += step.reward;
        length += 1;
        if step.is_done() {
            break;
        }
        obs = step.obs;
    }

    info!(
        "Greedy rollout: return {:.2}, length {}, final body length {}",
        ret,
        length,
        env.body().len()
    );
    Ok(())
}

/// Train/eval PPO agent on the 3D grid snake environment
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Train PPO agent, not evaluate
    #[arg(short, long, default_value_t = false)]
    train: bool,

    /// Evaluate PPO agent, not train
    #[arg(short, long, default_value_t = false)]
    eval: bool,

    /// Number of training episodes
    #[arg(long, default_value_t = EPISODES)]
    episodes: usize,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let env_config = create_env_config(GRID_SIZE, N_OBSTACLES);
    let in_dim = env_config.volume() as i64;
    let mut agent = PpoAgent::build(create_agent_config(in_dim));

    // Agents do not persist parameters, so `--eval` alone rolls out the
    // freshly initialized policy.
    if args.train || !args.eval {
        train(&env_config, &mut agent, args.episodes)?;
    }
    if args.eval || !args.train {
        eval(&env_config, &mut agent)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ppo_snake_short_run() -> Result<()> {
        let env_config = create_env_config([4, 4, 4], 2);
        let in_dim = env_config.volume() as i64;
        let agent_config = create_agent_config(in_dim).device(Device::Cpu);
        let mut agent = PpoAgent::build(agent_config);

        let mut trainer: Trainer<GridSnakeEnv> = Trainer::build(
            TrainerConfig::default()
                .max_episodes(3)
                .max_steps_per_episode(20)
                .gamma(GAMMA)
                .eval_interval(0),
            env_config.clone(),
        )?;
        let mut recorder = BufferedRecorder::new();
        let mut evaluator = Evaluator::new(&env_config, 0, 1, 20)?;

        trainer.train(&mut agent, &mut recorder, &mut evaluator)?;
        assert_eq!(recorder.len(), 3);
        for record in recorder.iter() {
            assert!(record.get_scalar("loss_actor")?.is_finite());
            assert!(record.get_scalar("episode_return")?.is_finite());
        }

        eval(&env_config, &mut agent)
    }
}
