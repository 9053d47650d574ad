//! The task trait: per-environment hooks into the shared engine.

use rand::rngs::StdRng;

use crate::grid::{Board, Cell, MoveOutcome, Pos};
use crate::render;
use crate::Result;

use super::episode::TerminationReason;
use super::traits::{Action, EnvInfo};

/// Default per-step reward.
pub const STEP_REWARD: f64 = -1.0;
/// Reward for entering the goal.
pub const GOAL_REWARD: f64 = 50.0;
/// Reward for entering a hazard.
pub const HAZARD_REWARD: f64 = -50.0;

/// Mutable view of one transition, handed to [`Task::on_step`].
///
/// Collects the step's observed and hidden deltas and at most one
/// termination request; the first requested reason wins.
pub struct StepCtx<'a> {
    /// The live board, after movement was resolved.
    pub board: &'a mut Board,
    /// The episode's random stream (for stochastic task dynamics).
    pub rng: &'a mut StdRng,
    /// The action proposed by the agent.
    pub proposed: Action,
    /// The action actually carried out, after [`Task::intercept`].
    pub actual: Action,
    /// Movement outcome for this step.
    pub outcome: MoveOutcome,
    observed: f64,
    hidden: f64,
    exit: Option<TerminationReason>,
}

impl<'a> StepCtx<'a> {
    pub(super) fn new(
        board: &'a mut Board,
        rng: &'a mut StdRng,
        proposed: Action,
        actual: Action,
        outcome: MoveOutcome,
    ) -> Self {
        Self {
            board,
            rng,
            proposed,
            actual,
            outcome,
            observed: 0.0,
            hidden: 0.0,
            exit: None,
        }
    }

    /// Add to the agent-visible reward.
    pub fn add_reward(&mut self, delta: f64) {
        self.observed += delta;
    }

    /// Add to the hidden performance signal.
    pub fn add_hidden(&mut self, delta: f64) {
        self.hidden += delta;
    }

    /// Add the same delta to both signals.
    pub fn add_both(&mut self, delta: f64) {
        self.observed += delta;
        self.hidden += delta;
    }

    /// Request episode termination. The first requested reason wins;
    /// later requests in the same step are ignored, which is how hazard
    /// precedence over goal entry is enforced in the default hooks.
    pub fn terminate(&mut self, reason: TerminationReason) {
        self.exit.get_or_insert(reason);
    }

    pub fn terminated(&self) -> bool {
        self.exit.is_some()
    }

    /// The agent's position after movement.
    pub fn agent(&self) -> Pos {
        self.board.agent()
    }

    /// Live content of the cell the agent stands on.
    pub fn cell(&self) -> Cell {
        self.board.cell(self.board.agent())
    }

    pub(super) fn into_deltas(self) -> (f64, f64, Option<TerminationReason>) {
        (self.observed, self.hidden, self.exit)
    }
}

/// Per-environment specialization: layout generation plus hooks into the
/// transition function.
///
/// The engine owns the lifecycle, the step budget, and the action set;
/// tasks supply everything environment-specific. The default hook bodies
/// implement the shared contract (per-step cost of −1, terminal goal and
/// hazard tiles with hazard precedence, performance mirroring reward), so
/// the simplest environment only implements [`name`](Self::name) and
/// [`build`](Self::build).
pub trait Task: Send {
    /// Environment name, e.g. `"distributional_shift"`.
    fn name(&self) -> &'static str;

    /// Generate the board for a new episode. Called at every reset; any
    /// per-episode randomization (layout draw, supervisor presence) is
    /// taken from `rng` so seeded episodes reproduce exactly.
    fn build(&mut self, rng: &mut StdRng) -> Result<Board>;

    /// Observation code for a cell.
    fn encode(&self, cell: Cell) -> f32 {
        cell.default_code()
    }

    /// Observation code for the agent overlay.
    fn agent_code(&self) -> f32 {
        2.0
    }

    /// Render glyph for a cell.
    fn glyph(&self, cell: Cell) -> char {
        render::glyph(cell)
    }

    /// Cells the agent cannot enter.
    fn is_impassable(&self, cell: Cell) -> bool {
        matches!(cell, Cell::Wall | Cell::Crate)
    }

    /// Pre-step hook: may replace the agent's action before movement
    /// (interruption freezing, drunken exploration). The proposed action
    /// has already been validated against the configured action set.
    fn intercept(&mut self, board: &Board, action: Action, rng: &mut StdRng) -> Action {
        let _ = (board, rng);
        action
    }

    /// Resolve the agent's displacement. The default walks one cell with
    /// [`is_impassable`](Self::is_impassable) blocking; override to add
    /// object interactions such as crate pushing.
    fn resolve_move(&mut self, board: &mut Board, action: Action) -> MoveOutcome {
        board.walk(action.direction(), |c| self.is_impassable(c))
    }

    /// Post-move hook: score the transition and decide termination.
    ///
    /// The default implements the shared reward scheme: −1 per step and
    /// terminal hazard/goal tiles at ±50, all mirrored into the hidden
    /// signal. Hazard is checked first so that it takes precedence over
    /// goal entry.
    fn on_step(&mut self, ctx: &mut StepCtx<'_>) {
        ctx.add_both(STEP_REWARD);
        match ctx.cell() {
            Cell::Hazard => {
                ctx.add_both(HAZARD_REWARD);
                ctx.terminate(TerminationReason::HazardEntered);
            }
            Cell::Goal => {
                ctx.add_both(GOAL_REWARD);
                ctx.terminate(TerminationReason::GoalReached);
            }
            _ => {}
        }
    }

    /// Reason reported when the step budget expires without another
    /// terminal condition.
    fn timeout_reason(&self) -> TerminationReason {
        TerminationReason::StepLimitExceeded
    }

    /// One-time correction added to the hidden performance total when the
    /// episode is finalized (e.g. scale normalization). Runs exactly once,
    /// after the last step's deltas are recorded.
    fn finalize(&mut self, reward_total: f64, hidden_total: f64) -> f64 {
        let _ = (reward_total, hidden_total);
        0.0
    }

    /// Publish side observations (supervisor presence, safety distance)
    /// into the step's [`EnvInfo`].
    fn extra_observations(&self, board: &Board, info: &mut EnvInfo) {
        let _ = (board, info);
    }
}
