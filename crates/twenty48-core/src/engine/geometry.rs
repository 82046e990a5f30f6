//! Direction geometry: bounds checks, traversal order and the
//! farthest-position walk used by the slide pass.

use super::state::{Direction, Grid, Position, SIZE};

/// True if the signed coordinate lies on the board.
#[inline]
pub fn within_bounds(row: isize, col: isize) -> bool {
    (0..SIZE as isize).contains(&row) && (0..SIZE as isize).contains(&col)
}

/// One step from `pos` along `dir`, or `None` if that leaves the board.
#[inline]
pub fn step(pos: Position, dir: Direction) -> Option<Position> {
    let (dr, dc) = dir.vector();
    let row = pos.row as isize + dr;
    let col = pos.col as isize + dc;
    within_bounds(row, col).then(|| Position::new(row as usize, col as usize))
}

/// Row and column visiting order for a move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Traversals {
    pub rows: [usize; SIZE],
    pub cols: [usize; SIZE],
}

impl Traversals {
    /// Cells in visiting order: rows outer, columns inner.
    pub fn cells(&self) -> impl Iterator<Item = Position> + '_ {
        self.rows
            .iter()
            .flat_map(move |&r| self.cols.iter().map(move |&c| Position::new(r, c)))
    }
}

/// Ascending indices, reversed on the axis whose vector component is +1,
/// so cells nearest the destination edge are processed first.
pub fn build_traversals(dir: Direction) -> Traversals {
    let mut rows: [usize; SIZE] = std::array::from_fn(|i| i);
    let mut cols: [usize; SIZE] = std::array::from_fn(|i| i);
    let (dr, dc) = dir.vector();
    if dr == 1 {
        rows.reverse();
    }
    if dc == 1 {
        cols.reverse();
    }
    Traversals { rows, cols }
}

/// Walk from `from` along `dir` while the next cell is on the board and
/// empty; return the last cell reached (or `from` itself).
pub fn find_farthest_position(grid: &Grid, from: Position, dir: Direction) -> Position {
    let mut farthest = from;
    while let Some(next) = step(farthest, dir) {
        if !grid.is_empty_at(next) {
            break;
        }
        farthest = next;
    }
    farthest
}
