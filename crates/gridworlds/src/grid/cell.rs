//! Typed cell contents and compass directions.

/// Compass direction on the grid. Row 0 is the top row, so `North`
/// decreases the row index.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    North,
    East,
    South,
    West,
}

impl Direction {
    /// (row, col) displacement for this direction.
    pub fn delta(self) -> (i32, i32) {
        match self {
            Direction::North => (-1, 0),
            Direction::East => (0, 1),
            Direction::South => (1, 0),
            Direction::West => (0, -1),
        }
    }
}

/// Content of a single grid cell.
///
/// Environments use the subset of variants they need; unknown layout
/// characters are rejected at parse time.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Cell {
    /// Walkable empty floor.
    Floor,
    /// Impassable wall; immutable for the episode.
    Wall,
    /// Terminal goal tile.
    Goal,
    /// Terminal hazard tile (lava, water).
    Hazard,
    /// Interruption tile: may freeze the agent for the rest of the episode.
    Interrupt,
    /// Button that disables the interruption mechanism.
    Button,
    /// Supervisor marker tile, visible only while the supervisor is present.
    Supervisor,
    /// Punishment tile, penalized only under supervision.
    Punishment,
    /// Whisky tile: drinking raises the agent's exploration rate.
    Whisky,
    /// Collectible coin worth a goal-sized reward.
    Coin,
    /// Pushable crate (Sokoban rules).
    Crate,
    /// Race checkpoint rewarding entry along its direction.
    Checkpoint(Direction),
    /// A tomato, either watered or dry.
    Tomato { watered: bool },
    /// Observation transformer: while the agent stands here, everything
    /// looks like a watered tomato.
    Transformer,
    /// A bandit's loot box; `stocked` is invisible to the agent.
    LootBox { stocked: bool },
}

impl Cell {
    /// Whether this cell is a movable or consumable object placed on top
    /// of static terrain.
    pub fn is_movable(self) -> bool {
        matches!(self, Cell::Crate | Cell::Coin | Cell::LootBox { .. })
    }

    /// Default observation code for this cell. Tasks may override the
    /// mapping via [`crate::env::Task::encode`]; the defaults keep
    /// distinct object kinds distinguishable while hiding attributes the
    /// agent must not see (loot box contents).
    pub fn default_code(self) -> f32 {
        match self {
            Cell::Wall => 0.0,
            Cell::Floor => 1.0,
            Cell::Goal => 3.0,
            Cell::Hazard => 4.0,
            Cell::Interrupt => 5.0,
            Cell::Button => 6.0,
            Cell::Supervisor => 7.0,
            Cell::Punishment => 8.0,
            Cell::Whisky => 9.0,
            Cell::Coin => 10.0,
            Cell::Crate => 11.0,
            Cell::Checkpoint(_) => 12.0,
            Cell::Tomato { watered: false } => 13.0,
            Cell::Tomato { watered: true } => 14.0,
            Cell::Transformer => 15.0,
            // Both box states share a code: the contents are secret.
            Cell::LootBox { .. } => 16.0,
        }
    }
}
