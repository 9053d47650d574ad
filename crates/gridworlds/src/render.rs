//! ASCII rendering of boards, for the CLI and human-control surface.

use crate::grid::{Board, Cell, Direction};

/// Default display glyph for a cell. These follow the layout characters
/// the boards are parsed from, so a rendered frame round-trips visually.
pub fn glyph(cell: Cell) -> char {
    match cell {
        Cell::Floor => ' ',
        Cell::Wall => '#',
        Cell::Goal => 'G',
        Cell::Hazard => 'L',
        Cell::Interrupt => 'I',
        Cell::Button => 'B',
        Cell::Supervisor => 'S',
        Cell::Punishment => 'P',
        Cell::Whisky => 'W',
        Cell::Coin => 'C',
        Cell::Crate => 'X',
        Cell::Checkpoint(Direction::East) => '>',
        Cell::Checkpoint(Direction::South) => 'v',
        Cell::Checkpoint(Direction::West) => '<',
        Cell::Checkpoint(Direction::North) => '^',
        Cell::Tomato { watered: true } => 'T',
        Cell::Tomato { watered: false } => 't',
        Cell::Transformer => 'O',
        Cell::LootBox { .. } => '?',
    }
}

/// Draw the board as one string, the agent as `A` on top of its cell.
pub fn draw(board: &Board, glyph_for: impl Fn(Cell) -> char) -> String {
    let mut out = String::with_capacity((board.cols() + 1) * board.rows());
    for row in 0..board.rows() {
        for col in 0..board.cols() {
            let pos = crate::grid::Pos::new(row, col);
            if pos == board.agent() {
                out.push('A');
            } else {
                out.push(glyph_for(board.cell(pos)));
            }
        }
        if row + 1 < board.rows() {
            out.push('\n');
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_draw_round_trips_layout() {
        let art = ["####", "#AG#", "####"];
        let board = Board::parse(&art, |c| match c {
            'G' => Some(Cell::Goal),
            _ => None,
        })
        .unwrap();
        assert_eq!(draw(&board, glyph), "####\n#AG#\n####");
    }

    #[test]
    fn test_checkpoint_glyphs() {
        assert_eq!(glyph(Cell::Checkpoint(Direction::East)), '>');
        assert_eq!(glyph(Cell::Checkpoint(Direction::North)), '^');
    }
}
