//! Episode controller: lifecycle, step budget, and termination.

use ndarray::{ArrayD, IxDyn};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use crate::grid::Board;
use crate::render;
use crate::spaces::{Box as BoxSpace, Discrete, DynSpace};
use crate::{GridworldError, Result};

use super::task::{StepCtx, Task};
use super::tracker::SignalTracker;
use super::traits::{Action, EnvInfo, Evaluation, SafetyEnv, StepResult};

/// Why an episode ended. Surfaced to evaluators alongside the hidden
/// performance total.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TerminationReason {
    /// The agent entered the goal (or collected the last coin).
    GoalReached,
    /// The agent entered a terminal hazard.
    HazardEntered,
    /// The step budget expired.
    StepLimitExceeded,
    /// The step budget expired with the agent frozen by an interruption.
    Interrupted,
    /// The agent opened a bandit's loot box.
    BoxOpened,
}

impl std::fmt::Display for TerminationReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            TerminationReason::GoalReached => "goal_reached",
            TerminationReason::HazardEntered => "hazard_entered",
            TerminationReason::StepLimitExceeded => "step_limit_exceeded",
            TerminationReason::Interrupted => "interrupted",
            TerminationReason::BoxOpened => "box_opened",
        };
        f.write_str(name)
    }
}

/// Static environment configuration, immutable once the environment is
/// constructed.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EnvConfig {
    /// Step budget per episode.
    pub max_steps: u32,
    /// Whether `Action::Noop` is accepted from the agent.
    pub allow_noop: bool,
    /// Initial random seed; `None` seeds from entropy.
    pub seed: Option<u64>,
}

impl Default for EnvConfig {
    fn default() -> Self {
        Self {
            max_steps: 100,
            allow_noop: false,
            seed: None,
        }
    }
}

impl EnvConfig {
    fn validate(&self) -> Result<()> {
        if self.max_steps == 0 {
            return Err(GridworldError::InvalidConfiguration(
                "max_steps must be positive".into(),
            ));
        }
        Ok(())
    }
}

/// Finalized record of one episode, for the evaluation interface.
#[derive(Clone, Debug, PartialEq)]
pub struct EpisodeSummary {
    /// Undiscounted observed reward total.
    pub reward: f64,
    /// Undiscounted hidden performance total, after the task's one-time
    /// finalize adjustment.
    pub performance: f64,
    /// Steps taken.
    pub steps: u32,
    /// Why the episode ended.
    pub reason: TerminationReason,
}

#[derive(Clone, Copy, Debug)]
enum Phase {
    Running,
    Terminated(TerminationReason),
}

/// The episode controller: drives a task through the
/// reset → step* → terminate lifecycle.
///
/// Owns the board, the step counter, the seeded random stream, and the
/// dual signal tracker. Implements the agent-facing [`SafetyEnv`] trait;
/// the hidden performance signal is reachable only through the separate
/// [`Evaluation`] trait.
pub struct GridEnv<T: Task> {
    task: T,
    config: EnvConfig,
    board: Board,
    phase: Phase,
    steps: u32,
    tracker: SignalTracker,
    rng: StdRng,
    history: Vec<EpisodeSummary>,
}

impl<T: Task> GridEnv<T> {
    /// Construct an environment and start its first episode.
    ///
    /// Configuration and layout problems surface here (or at reset), never
    /// mid-episode.
    pub fn new(mut task: T, config: EnvConfig) -> Result<Self> {
        config.validate()?;
        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let board = task.build(&mut rng)?;
        Ok(Self {
            task,
            config,
            board,
            phase: Phase::Running,
            steps: 0,
            tracker: SignalTracker::new(),
            rng,
            history: Vec::new(),
        })
    }

    /// Construct with the default configuration.
    pub fn with_defaults(task: T) -> Result<Self> {
        Self::new(task, EnvConfig::default())
    }

    pub fn config(&self) -> &EnvConfig {
        &self.config
    }

    /// The live board. Intended for rendering and tests, not for agents.
    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn task(&self) -> &T {
        &self.task
    }

    pub fn steps(&self) -> u32 {
        self.steps
    }

    fn observation(&self) -> ArrayD<f32> {
        let mut codes: Vec<f32> = self
            .board
            .positions()
            .map(|p| self.task.encode(self.board.cell(p)))
            .collect();
        let agent = self.board.agent();
        codes[agent.row * self.board.cols() + agent.col] = self.task.agent_code();
        ArrayD::from_shape_vec(IxDyn(&[codes.len()]), codes).unwrap()
    }

    fn info(&self) -> EnvInfo {
        let mut info = EnvInfo::new();
        self.task.extra_observations(&self.board, &mut info);
        info
    }
}

impl<T: Task> SafetyEnv for GridEnv<T> {
    fn name(&self) -> &'static str {
        self.task.name()
    }

    fn observation_space(&self) -> DynSpace {
        DynSpace::Box(BoxSpace::uniform(&[self.board.len()], 0.0, 16.0))
    }

    fn action_space(&self) -> DynSpace {
        let n = if self.config.allow_noop { 5 } else { 4 };
        DynSpace::Discrete(Discrete::new(n))
    }

    fn reset(&mut self, seed: Option<u64>) -> Result<(ArrayD<f32>, EnvInfo)> {
        if let Some(seed) = seed {
            self.rng = StdRng::seed_from_u64(seed);
        }
        self.board = self.task.build(&mut self.rng)?;
        self.phase = Phase::Running;
        self.steps = 0;
        self.tracker = SignalTracker::new();
        tracing::debug!(env = self.task.name(), "episode reset");
        Ok((self.observation(), self.info()))
    }

    fn step(&mut self, action: Action) -> Result<StepResult> {
        if let Phase::Terminated(_) = self.phase {
            return Err(GridworldError::EpisodeAlreadyTerminated);
        }
        if action == Action::Noop && !self.config.allow_noop {
            return Err(GridworldError::InvalidAction(
                "noop is not enabled for this environment".into(),
            ));
        }

        let actual = self.task.intercept(&self.board, action, &mut self.rng);
        let outcome = self.task.resolve_move(&mut self.board, actual);

        let mut ctx = StepCtx::new(&mut self.board, &mut self.rng, action, actual, outcome);
        self.task.on_step(&mut ctx);
        let (observed, hidden, exit) = ctx.into_deltas();

        self.tracker.record(observed, hidden);
        self.steps += 1;

        let reason = exit.or_else(|| {
            (self.steps >= self.config.max_steps).then(|| self.task.timeout_reason())
        });

        let mut info = self.info();
        let terminated = reason.is_some();
        if let Some(reason) = reason {
            self.phase = Phase::Terminated(reason);
            let adjustment = self
                .task
                .finalize(self.tracker.reward_total(), self.tracker.hidden_total());
            let (reward, performance) = self.tracker.finalize(adjustment);
            info = info.with_episode_stats(reward as f32, self.steps);
            tracing::debug!(
                env = self.task.name(),
                %reason,
                steps = self.steps,
                reward,
                "episode terminated"
            );
            self.history.push(EpisodeSummary {
                reward,
                performance,
                steps: self.steps,
                reason,
            });
        }

        Ok(StepResult {
            observation: self.observation(),
            reward: observed,
            terminated,
            info,
        })
    }

    fn render(&self) -> Option<String> {
        Some(render::draw(&self.board, |c| self.task.glyph(c)))
    }

    fn is_done(&self) -> bool {
        matches!(self.phase, Phase::Terminated(_))
    }
}

impl<T: Task> Evaluation for GridEnv<T> {
    fn last_episode(&self) -> Option<&EpisodeSummary> {
        self.history.last()
    }

    fn overall_performance(&self) -> Option<f64> {
        if self.history.is_empty() {
            return None;
        }
        let sum: f64 = self.history.iter().map(|e| e.performance).sum();
        Some(sum / self.history.len() as f64)
    }
}
