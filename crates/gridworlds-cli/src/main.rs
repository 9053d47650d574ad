//! Gridworlds CLI
//!
//! Command-line launcher for the safety gridworld environments: list the
//! suite, watch random rollouts, evaluate reward against hidden
//! performance, or drive an environment from the keyboard.

use std::collections::HashMap;
use std::io::{self, BufRead, Write};

use anyhow::Result;
use clap::{Parser, Subcommand};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing_subscriber::EnvFilter;

use gridworlds::env::{Action, EnvConfig, EvalEnv, Evaluation, SafetyEnv};
use gridworlds::log::{ConsoleLogger, MetricLogger};
use gridworlds_envs::{by_name, ENVIRONMENTS};

#[derive(Parser)]
#[command(name = "gridworlds")]
#[command(version, about = "Gridworlds - safety environment suite", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List available environments
    List,

    /// Run an environment with a random policy, printing frames
    Demo {
        /// Environment name
        #[arg(default_value = "distributional_shift")]
        env: String,

        /// Number of steps
        #[arg(long, default_value = "20")]
        steps: usize,

        /// Random seed
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Evaluate a random policy: per-episode reward vs hidden performance
    Eval {
        /// Environment name
        env: String,

        /// Number of episodes
        #[arg(long, default_value = "10")]
        episodes: usize,

        /// Random seed
        #[arg(long, default_value = "0")]
        seed: u64,

        /// Step budget per episode
        #[arg(long, default_value = "100")]
        max_steps: u32,
    },

    /// Drive an environment from the keyboard (w/a/s/d + enter, q quits)
    Play {
        /// Environment name
        env: String,

        /// Random seed
        #[arg(long)]
        seed: Option<u64>,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::List => list_envs(),
        Commands::Demo { env, steps, seed } => demo(&env, steps, seed)?,
        Commands::Eval {
            env,
            episodes,
            seed,
            max_steps,
        } => eval(&env, episodes, seed, max_steps)?,
        Commands::Play { env, seed } => play(&env, seed)?,
    }

    Ok(())
}

fn list_envs() {
    println!("Available environments:");
    for name in ENVIRONMENTS {
        println!("  {}", name);
    }
}

fn random_action(rng: &mut StdRng) -> Action {
    Action::MOVES[rng.gen_range(0..Action::MOVES.len())]
}

/// Drive one episode with a random policy. Only the agent-facing surface
/// is touched here; the caller reads the evaluation afterwards.
fn rollout(env: &mut dyn EvalEnv, rng: &mut StdRng) -> Result<(f64, u32)> {
    let mut reward = 0.0;
    let mut steps = 0;
    loop {
        let result = env.step(random_action(rng))?;
        reward += result.reward;
        steps += 1;
        if result.terminated {
            return Ok((reward, steps));
        }
    }
}

fn demo(name: &str, steps: usize, seed: Option<u64>) -> Result<()> {
    let config = EnvConfig {
        seed,
        ..EnvConfig::default()
    };
    let mut env = by_name(name, config)?;
    let mut rng = StdRng::seed_from_u64(seed.unwrap_or(0));

    tracing::info!(env = name, steps, "Running demo");

    for step in 0..steps {
        let result = env.step(random_action(&mut rng))?;
        if let Some(frame) = env.render() {
            println!("Step {} (reward {:+.2}):\n{}\n", step, result.reward, frame);
        }
        if result.terminated {
            tracing::info!(step, "Episode ended, resetting");
            env.reset(None)?;
        }
    }
    Ok(())
}

fn eval(name: &str, episodes: usize, seed: u64, max_steps: u32) -> Result<()> {
    let config = EnvConfig {
        seed: Some(seed),
        max_steps,
        ..EnvConfig::default()
    };
    let mut env = by_name(name, config)?;
    let mut rng = StdRng::seed_from_u64(seed);
    let logger = ConsoleLogger::new();

    tracing::info!(env = name, episodes, "Starting evaluation (random policy)");

    let mut total_reward = 0.0;
    for episode in 0..episodes {
        env.reset(Some(seed.wrapping_add(episode as u64)))?;
        let (reward, _steps) = rollout(env.as_mut(), &mut rng)?;
        total_reward += reward;

        // The evaluation interface carries what the agent never saw: the
        // hidden performance and the termination reason.
        let summary = env.last_episode().expect("episode just finished");
        let mut metrics = HashMap::new();
        metrics.insert("reward".to_string(), summary.reward);
        metrics.insert("performance".to_string(), summary.performance);
        metrics.insert("steps".to_string(), summary.steps as f64);
        logger.log_metrics(&metrics, episode as u64);
        tracing::info!(
            episode,
            reason = %summary.reason,
            "episode finished"
        );
    }

    let avg_reward = total_reward / episodes as f64;
    let avg_performance = env.overall_performance().unwrap_or_default();
    tracing::info!(avg_reward, avg_performance, "Evaluation complete");
    Ok(())
}

fn play(name: &str, seed: Option<u64>) -> Result<()> {
    let config = EnvConfig {
        seed,
        ..EnvConfig::default()
    };
    let mut env = by_name(name, config)?;
    let stdin = io::stdin();
    let mut reward = 0.0;

    println!("Playing {} - w/a/s/d to move, q to quit", name);
    if let Some(frame) = env.render() {
        println!("{}", frame);
    }

    loop {
        print!("> ");
        io::stdout().flush()?;
        let Some(line) = stdin.lock().lines().next() else {
            break;
        };
        let action = match line?.trim().chars().next() {
            Some('w') => Action::Up,
            Some('s') => Action::Down,
            Some('a') => Action::Left,
            Some('d') => Action::Right,
            Some('q') => break,
            _ => {
                println!("unknown key (w/a/s/d moves, q quits)");
                continue;
            }
        };

        let result = env.step(action)?;
        reward += result.reward;
        if let Some(frame) = env.render() {
            println!("{}", frame);
        }
        println!("reward: {:+.2} (total {:+.2})", result.reward, reward);

        if result.terminated {
            let summary = env.last_episode().expect("episode just finished");
            println!(
                "episode over: {} after {} steps, reward {:+.2}, performance {:+.2}",
                summary.reason, summary.steps, summary.reward, summary.performance
            );
            break;
        }
    }
    Ok(())
}
