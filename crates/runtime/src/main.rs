#![deny(clippy::all, clippy::pedantic)]
//! # Rollout
//!
//! Runs fixed-length episodes of a manipulation task with a random or
//! scripted policy and reports return and success per episode.
//!
//! ```text
//! RUST_LOG=debug rollout --task peg-unplug-side --episodes 3 --random-init true
//! ```

mod policy;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use manip::{tasks, ManipEnv, TaskConfig};
use physics::Workbench;
use policy::{Policy, PolicyKind};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "rollout", about = "Run episodes of a gripper manipulation task")]
struct Args {
    /// Task name.
    #[arg(long, default_value = tasks::BUTTON_PRESS)]
    task: String,
    #[arg(long, default_value_t = 5)]
    episodes: usize,
    /// Seeds both the environment and the random policy.
    #[arg(long, default_value_t = 0)]
    seed: u64,
    /// Override the task's default placement randomization.
    #[arg(long)]
    random_init: Option<bool>,
    /// JSON task config replacing the built-in one.
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long, value_enum, default_value_t = PolicyKind::Scripted)]
    policy: PolicyKind,
    /// Log every n-th step at info level; 0 disables step logs.
    #[arg(long, default_value_t = 0)]
    log_every: usize,
}

#[derive(Debug, Default)]
struct Summary {
    episodes: usize,
    successes: usize,
    total_return: f64,
}

fn make_env(args: &Args) -> Result<ManipEnv<Workbench>> {
    let mut spec = tasks::by_name(&args.task)?;
    if let Some(path) = &args.config {
        let json = std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
        spec = spec.with_config(TaskConfig::from_json(&json)?)?;
        tracing::info!(config = %path.display(), "loaded task config");
    }
    let mut env = tasks::make_with(spec, args.seed)?;
    if let Some(enabled) = args.random_init {
        env.set_random_init(enabled);
    }
    Ok(env)
}

fn run_episode(
    env: &mut ManipEnv<Workbench>,
    policy: &mut dyn Policy,
    episode: usize,
    log_every: usize,
) -> Result<(f64, bool)> {
    env.reset()?;
    if let Some(marker) = env.goal_marker() {
        env.apply_marker(marker);
    }
    policy.reset();
    let mut ret = 0.0;
    let mut success = false;
    while !env.path_exhausted() {
        let action = policy.act(env)?;
        let t = env.step(&action)?;
        if let Some(marker) = t.marker {
            env.apply_marker(marker);
        }
        ret += t.reward;
        success = t.info.success > 0.0;

        let step = env.episode().map_or(0, |e| e.step_count);
        if log_every > 0 && step % log_every == 0 {
            tracing::info!(
                episode,
                step,
                reward = t.reward,
                reach_dist = t.info.reach_dist,
                goal_dist = t.info.goal_dist,
                "step"
            );
        }
    }
    Ok((ret, success))
}

fn run(args: &Args) -> Result<Summary> {
    let mut env = make_env(args)?;
    let mut policy = policy::build(args.policy, args.seed);
    tracing::info!(
        task = %args.task,
        policy = ?args.policy,
        random_init = env.random_init(),
        horizon = env.max_path_length(),
        "starting rollout"
    );

    let mut summary = Summary::default();
    for episode in 0..args.episodes {
        let (ret, success) = run_episode(&mut env, policy.as_mut(), episode, args.log_every)?;
        let target = env.episode().map_or(0.0, manip::EpisodeState::target_reward);
        tracing::info!(episode, ret, success, target_reward = target, "episode finished");
        summary.episodes += 1;
        summary.successes += usize::from(success);
        summary.total_return += ret;
    }
    Ok(summary)
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let summary = run(&args)?;

    #[allow(clippy::cast_precision_loss)]
    let (rate, mean) = if summary.episodes == 0 {
        (0.0, 0.0)
    } else {
        let n = summary.episodes as f64;
        (summary.successes as f64 / n, summary.total_return / n)
    };
    println!(
        "task={} episodes={} successes={} success_rate={rate:.3} mean_return={mean:.3}",
        args.task, summary.episodes, summary.successes
    );
    Ok(())
}
