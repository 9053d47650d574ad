//! Agent-facing and evaluator-facing interface definitions.

use ndarray::ArrayD;

use crate::grid::Direction;
use crate::spaces::DynSpace;
use crate::{GridworldError, Result};

use super::episode::EpisodeSummary;

/// An agent action. The set is fixed and finite; `Noop` is only accepted
/// from the agent when the environment configuration enables it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Action {
    Up,
    Down,
    Left,
    Right,
    Noop,
}

impl Action {
    /// The four movement actions, in index order.
    pub const MOVES: [Action; 4] = [Action::Up, Action::Down, Action::Left, Action::Right];

    /// Movement direction, or `None` for `Noop`.
    pub fn direction(self) -> Option<Direction> {
        match self {
            Action::Up => Some(Direction::North),
            Action::Down => Some(Direction::South),
            Action::Left => Some(Direction::West),
            Action::Right => Some(Direction::East),
            Action::Noop => None,
        }
    }

    /// Index in the discrete action space.
    pub fn index(self) -> usize {
        match self {
            Action::Up => 0,
            Action::Down => 1,
            Action::Left => 2,
            Action::Right => 3,
            Action::Noop => 4,
        }
    }

    /// Decode a discrete action index.
    pub fn from_index(index: usize) -> Result<Action> {
        match index {
            0 => Ok(Action::Up),
            1 => Ok(Action::Down),
            2 => Ok(Action::Left),
            3 => Ok(Action::Right),
            4 => Ok(Action::Noop),
            other => Err(GridworldError::InvalidAction(format!(
                "action index {} out of range",
                other
            ))),
        }
    }
}

/// Information returned alongside observations.
#[derive(Clone, Debug, Default)]
pub struct EnvInfo {
    /// Episode return (if done)
    pub episode_return: Option<f32>,
    /// Episode length (if done)
    pub episode_length: Option<f32>,
    /// Side observations published by the task (kept minimal for
    /// performance)
    pub extra: smallvec::SmallVec<[(&'static str, f32); 4]>,
}

impl EnvInfo {
    /// Create empty info
    pub fn new() -> Self {
        Self::default()
    }

    /// Add episode stats
    pub fn with_episode_stats(mut self, ret: f32, len: u32) -> Self {
        self.episode_return = Some(ret);
        self.episode_length = Some(len as f32);
        self
    }

    /// Add a side observation
    pub fn with_extra(mut self, key: &'static str, value: f32) -> Self {
        self.extra.push((key, value));
        self
    }

    /// Get a value by key (including defaults)
    pub fn get(&self, key: &str) -> Option<f32> {
        match key {
            "episode_return" => self.episode_return,
            "episode_length" => self.episode_length,
            _ => self.extra.iter().find(|(k, _)| k == &key).map(|(_, v)| *v),
        }
    }
}

/// Result from a single environment step
#[derive(Clone, Debug)]
pub struct StepResult {
    /// Observation after the step
    pub observation: ArrayD<f32>,
    /// Observed reward delta for this step (the agent's training signal)
    pub reward: f64,
    /// Whether the episode terminated
    pub terminated: bool,
    /// Additional info
    pub info: EnvInfo,
}

/// Agent-facing environment interface.
///
/// This is the only surface reachable from an agent's decision process.
/// It deliberately has no access to the hidden performance signal; that
/// lives behind the separate [`Evaluation`] trait.
pub trait SafetyEnv: Send {
    /// Environment name, for factories and logging.
    fn name(&self) -> &'static str;

    /// Get the observation space
    fn observation_space(&self) -> DynSpace;

    /// Get the action space
    fn action_space(&self) -> DynSpace;

    /// Reset to a fresh episode.
    ///
    /// # Arguments
    /// * `seed` - Optional random seed for reproducible layouts
    fn reset(&mut self, seed: Option<u64>) -> Result<(ArrayD<f32>, EnvInfo)>;

    /// Take a single step in the environment.
    ///
    /// Fails with [`GridworldError::EpisodeAlreadyTerminated`] after the
    /// episode ends and [`GridworldError::InvalidAction`] for actions
    /// outside the configured set.
    fn step(&mut self, action: Action) -> Result<StepResult>;

    /// Optional: Render the environment as ASCII art
    fn render(&self) -> Option<String> {
        None
    }

    /// Check if the episode is over and needs a reset
    fn is_done(&self) -> bool;
}

/// Evaluator-facing interface: read-only access to the hidden performance
/// signal and termination reasons, for offline logging and comparison.
/// Never hand this to the action-selection boundary.
pub trait Evaluation {
    /// Summary of the most recently finished episode.
    fn last_episode(&self) -> Option<&EpisodeSummary>;

    /// Mean hidden performance across all finished episodes, or `None`
    /// before the first episode completes.
    fn overall_performance(&self) -> Option<f64>;
}

/// Both surfaces at once, for harness code that drives an environment and
/// afterwards reads the evaluation. Agent-side code should be handed a
/// `&mut dyn SafetyEnv` borrow of this, never the whole object.
pub trait EvalEnv: SafetyEnv + Evaluation {}

impl<T: SafetyEnv + Evaluation> EvalEnv for T {}
