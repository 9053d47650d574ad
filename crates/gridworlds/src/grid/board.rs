//! The board: a bounded occupancy map parsed from ASCII art.

use ndarray::Array2;

use super::{Cell, Direction};
use crate::{GridworldError, Result};

/// A grid coordinate. Row 0 is the top row, column 0 the leftmost.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Pos {
    pub row: usize,
    pub col: usize,
}

impl Pos {
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    /// Manhattan distance to another coordinate.
    pub fn manhattan(self, other: Pos) -> usize {
        self.row.abs_diff(other.row) + self.col.abs_diff(other.col)
    }
}

/// Result of an attempted agent move.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MoveOutcome {
    /// Position before the move.
    pub from: Pos,
    /// Position after the move; equals `from` when blocked or stationary.
    pub to: Pos,
    /// Whether the move was rejected by bounds or an impassable cell.
    pub blocked: bool,
}

impl MoveOutcome {
    /// Direction actually travelled, if the agent changed cells.
    pub fn travelled(&self) -> Option<Direction> {
        if self.to == self.from {
            return None;
        }
        let dr = self.to.row as i32 - self.from.row as i32;
        let dc = self.to.col as i32 - self.from.col as i32;
        match (dr, dc) {
            (-1, 0) => Some(Direction::North),
            (1, 0) => Some(Direction::South),
            (0, 1) => Some(Direction::East),
            (0, -1) => Some(Direction::West),
            _ => None,
        }
    }
}

/// A fixed-size grid of typed cells with a single agent position.
///
/// The agent is an overlay, not a cell: the cell "under" the agent keeps
/// its content while the agent stands on it. Three layers are kept:
/// `cells` is the live state, `beneath` is the static terrain under
/// movable objects (what reappears when a crate moves off a tile), and
/// `original` is the pristine parse, for tasks that consult the initial
/// layout after mutating the board.
#[derive(Clone, Debug)]
pub struct Board {
    rows: usize,
    cols: usize,
    cells: Array2<Cell>,
    beneath: Array2<Cell>,
    original: Array2<Cell>,
    agent: Pos,
}

impl Board {
    /// Parse a board from ASCII art rows.
    ///
    /// `'#'` is a wall, `' '` floor, and `'A'` the agent start (exactly
    /// one required, standing on floor). Every other character goes
    /// through `legend`; characters it does not recognize are an
    /// [`GridworldError::InvalidConfiguration`].
    pub fn parse(art: &[&str], legend: impl Fn(char) -> Option<Cell>) -> Result<Self> {
        let rows = art.len();
        if rows == 0 {
            return Err(GridworldError::InvalidConfiguration(
                "empty board layout".into(),
            ));
        }
        let cols = art[0].chars().count();
        if cols == 0 {
            return Err(GridworldError::InvalidConfiguration(
                "empty board row".into(),
            ));
        }

        let mut cells = Array2::from_elem((rows, cols), Cell::Floor);
        let mut agent = None;

        for (r, line) in art.iter().enumerate() {
            if line.chars().count() != cols {
                return Err(GridworldError::InvalidConfiguration(format!(
                    "row {} has {} columns, expected {}",
                    r,
                    line.chars().count(),
                    cols
                )));
            }
            for (c, ch) in line.chars().enumerate() {
                let cell = match ch {
                    '#' => Cell::Wall,
                    ' ' => Cell::Floor,
                    'A' => {
                        if agent.replace(Pos::new(r, c)).is_some() {
                            return Err(GridworldError::InvalidConfiguration(
                                "more than one agent start position".into(),
                            ));
                        }
                        Cell::Floor
                    }
                    other => legend(other).ok_or_else(|| {
                        GridworldError::InvalidConfiguration(format!(
                            "unrecognized layout character {:?} at ({}, {})",
                            other, r, c
                        ))
                    })?,
                };
                cells[(r, c)] = cell;
            }
        }

        let agent = agent.ok_or_else(|| {
            GridworldError::InvalidConfiguration("no agent start position".into())
        })?;

        let beneath = cells.map(|&cell| if cell.is_movable() { Cell::Floor } else { cell });

        Ok(Self {
            rows,
            cols,
            original: cells.clone(),
            beneath,
            cells,
            agent,
        })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Number of cells on the board.
    pub fn len(&self) -> usize {
        self.rows * self.cols
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn agent(&self) -> Pos {
        self.agent
    }

    /// Live content of a cell.
    pub fn cell(&self, pos: Pos) -> Cell {
        self.cells[(pos.row, pos.col)]
    }

    /// Content of a cell in the pristine initial layout.
    pub fn original(&self, pos: Pos) -> Cell {
        self.original[(pos.row, pos.col)]
    }

    /// Overwrite a cell's live content.
    pub fn set(&mut self, pos: Pos, cell: Cell) {
        self.cells[(pos.row, pos.col)] = cell;
    }

    /// Remove a movable/consumable object, restoring the terrain beneath.
    pub fn clear(&mut self, pos: Pos) {
        self.cells[(pos.row, pos.col)] = self.beneath[(pos.row, pos.col)];
    }

    /// Slide an object from one cell to another, restoring the terrain it
    /// left behind.
    pub fn slide(&mut self, from: Pos, to: Pos) {
        let obj = self.cells[(from.row, from.col)];
        self.cells[(from.row, from.col)] = self.beneath[(from.row, from.col)];
        self.cells[(to.row, to.col)] = obj;
    }

    /// Replace every live occurrence of one cell kind with another.
    pub fn replace_all(&mut self, from: Cell, to: Cell) {
        for cell in self.cells.iter_mut() {
            if *cell == from {
                *cell = to;
            }
        }
    }

    /// The neighboring coordinate in a direction, or `None` at the edge.
    pub fn offset(&self, pos: Pos, dir: Direction) -> Option<Pos> {
        let (dr, dc) = dir.delta();
        let row = pos.row as i32 + dr;
        let col = pos.col as i32 + dc;
        if row < 0 || col < 0 || row >= self.rows as i32 || col >= self.cols as i32 {
            None
        } else {
            Some(Pos::new(row as usize, col as usize))
        }
    }

    /// Move the agent one cell in `dir`, unless the target is out of
    /// bounds or `blocked` rejects its content. Leaving the grid is
    /// treated identically to hitting a wall: the position is unchanged
    /// and the outcome is flagged, but no error is raised.
    pub fn walk(
        &mut self,
        dir: Option<Direction>,
        blocked: impl Fn(Cell) -> bool,
    ) -> MoveOutcome {
        let from = self.agent;
        let Some(dir) = dir else {
            return MoveOutcome {
                from,
                to: from,
                blocked: false,
            };
        };
        match self.offset(from, dir) {
            Some(to) if !blocked(self.cell(to)) => {
                self.agent = to;
                MoveOutcome {
                    from,
                    to,
                    blocked: false,
                }
            }
            _ => MoveOutcome {
                from,
                to: from,
                blocked: true,
            },
        }
    }

    /// All positions whose live content satisfies a predicate, row-major.
    pub fn find(&self, pred: impl Fn(Cell) -> bool) -> Vec<Pos> {
        self.positions().filter(|&p| pred(self.cell(p))).collect()
    }

    /// Iterate all coordinates row-major.
    pub fn positions(&self) -> impl Iterator<Item = Pos> + '_ {
        let cols = self.cols;
        (0..self.rows).flat_map(move |r| (0..cols).map(move |c| Pos::new(r, c)))
    }

    /// The four orthogonal neighbors that exist on the board.
    pub fn neighbors(&self, pos: Pos) -> impl Iterator<Item = Pos> + '_ {
        [
            Direction::North,
            Direction::East,
            Direction::South,
            Direction::West,
        ]
        .into_iter()
        .filter_map(move |d| self.offset(pos, d))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plain_legend(_: char) -> Option<Cell> {
        None
    }

    #[test]
    fn test_parse_simple_board() {
        let board = Board::parse(&["####", "#A #", "####"], plain_legend).unwrap();
        assert_eq!(board.rows(), 3);
        assert_eq!(board.cols(), 4);
        assert_eq!(board.agent(), Pos::new(1, 1));
        assert_eq!(board.cell(Pos::new(0, 0)), Cell::Wall);
        assert_eq!(board.cell(Pos::new(1, 1)), Cell::Floor);
    }

    #[test]
    fn test_parse_rejects_missing_agent() {
        let err = Board::parse(&["## ", "   "], plain_legend).unwrap_err();
        assert!(matches!(err, GridworldError::InvalidConfiguration(_)));
    }

    #[test]
    fn test_parse_rejects_duplicate_agent() {
        let err = Board::parse(&["AA"], plain_legend).unwrap_err();
        assert!(matches!(err, GridworldError::InvalidConfiguration(_)));
    }

    #[test]
    fn test_parse_rejects_ragged_rows() {
        let err = Board::parse(&["###", "#A"], plain_legend).unwrap_err();
        assert!(matches!(err, GridworldError::InvalidConfiguration(_)));
    }

    #[test]
    fn test_parse_rejects_unknown_char() {
        let err = Board::parse(&["#A?#"], plain_legend).unwrap_err();
        assert!(matches!(err, GridworldError::InvalidConfiguration(_)));
    }

    #[test]
    fn test_walk_and_wall_block() {
        let mut board = Board::parse(&["####", "#A #", "####"], plain_legend).unwrap();
        let blocked = |c: Cell| c == Cell::Wall;

        let out = board.walk(Some(Direction::East), blocked);
        assert!(!out.blocked);
        assert_eq!(board.agent(), Pos::new(1, 2));
        assert_eq!(out.travelled(), Some(Direction::East));

        let out = board.walk(Some(Direction::East), blocked);
        assert!(out.blocked);
        assert_eq!(board.agent(), Pos::new(1, 2));
        assert_eq!(out.travelled(), None);
    }

    #[test]
    fn test_walk_bounds_block_like_walls() {
        let mut board = Board::parse(&["A "], plain_legend).unwrap();
        let out = board.walk(Some(Direction::North), |_| false);
        assert!(out.blocked);
        assert_eq!(board.agent(), Pos::new(0, 0));
    }

    #[test]
    fn test_slide_restores_terrain() {
        let legend = |c: char| match c {
            'X' => Some(Cell::Crate),
            'G' => Some(Cell::Goal),
            _ => None,
        };
        let mut board = Board::parse(&["AXG "], legend).unwrap();
        let crate_pos = Pos::new(0, 1);
        let goal_pos = Pos::new(0, 2);

        // Push the crate onto the goal and off again.
        board.slide(crate_pos, goal_pos);
        assert_eq!(board.cell(crate_pos), Cell::Floor);
        assert_eq!(board.cell(goal_pos), Cell::Crate);

        board.slide(goal_pos, Pos::new(0, 3));
        assert_eq!(board.cell(goal_pos), Cell::Goal);
    }

    #[test]
    fn test_manhattan() {
        assert_eq!(Pos::new(1, 4).manhattan(Pos::new(1, 1)), 3);
        assert_eq!(Pos::new(0, 0).manhattan(Pos::new(2, 2)), 4);
    }
}
