//! Safety environment variants for the gridworlds engine.
//!
//! Each module specializes the shared engine for one safety property:
//! - `safe_interruptibility` - tolerating interruption
//! - `side_effects_sokoban` - avoiding irreversible side effects
//! - `absent_supervisor` - behaving the same with and without supervision
//! - `boat_race` / `tomato_watering` - resisting reward misspecification
//! - `whisky_gold` - resisting self-modification incentives
//! - `distributional_shift` - adapting to a shifted test distribution
//! - `friend_foe` - robustness against an adversarial bandit
//! - `island_navigation` - respecting a safety constraint while exploring

mod absent_supervisor;
mod boat_race;
mod distributional_shift;
mod friend_foe;
mod island_navigation;
mod safe_interruptibility;
mod side_effects_sokoban;
mod tomato_watering;
mod whisky_gold;

pub use absent_supervisor::AbsentSupervisor;
pub use boat_race::BoatRace;
pub use distributional_shift::DistributionalShift;
pub use friend_foe::{BanditType, FriendFoe, PolicyEstimator};
pub use island_navigation::IslandNavigation;
pub use safe_interruptibility::SafeInterruptibility;
pub use side_effects_sokoban::SideEffectsSokoban;
pub use tomato_watering::TomatoWatering;
pub use whisky_gold::WhiskyGold;

use gridworlds::env::{EnvConfig, EvalEnv, GridEnv};
use gridworlds::{GridworldError, Result};

/// Names accepted by [`by_name`], in display order.
pub const ENVIRONMENTS: &[&str] = &[
    "absent_supervisor",
    "boat_race",
    "distributional_shift",
    "friend_foe",
    "island_navigation",
    "safe_interruptibility",
    "side_effects_sokoban",
    "tomato_watering",
    "whisky_gold",
];

/// Instantiate an environment by name with the given configuration.
pub fn by_name(name: &str, config: EnvConfig) -> Result<Box<dyn EvalEnv>> {
    match name {
        "absent_supervisor" => boxed(AbsentSupervisor::default(), config),
        "boat_race" => boxed(BoatRace::default(), config),
        "distributional_shift" => boxed(DistributionalShift::training(), config),
        "friend_foe" => boxed(FriendFoe::default(), config),
        "island_navigation" => boxed(IslandNavigation::default(), config),
        "safe_interruptibility" => boxed(SafeInterruptibility::default(), config),
        "side_effects_sokoban" => boxed(SideEffectsSokoban::default(), config),
        "tomato_watering" => boxed(TomatoWatering::default(), config),
        "whisky_gold" => boxed(WhiskyGold::default(), config),
        other => Err(GridworldError::InvalidConfiguration(format!(
            "unknown environment '{}'",
            other
        ))),
    }
}

fn boxed<T: gridworlds::env::Task + 'static>(
    task: T,
    config: EnvConfig,
) -> Result<Box<dyn EvalEnv>> {
    Ok(Box::new(GridEnv::new(task, config)?))
}
