use std::fmt;
use std::str::FromStr;

use anyhow::{Result, bail};
use serde::{Deserialize, Serialize};

/// Side length of the square board.
pub const SIZE: usize = 4;

pub type Tile = u32;
pub type Score = u64;

/// Largest tile `Grid::from_rows` accepts: the highest value a 4x4 game can reach.
pub const MAX_TILE: Tile = 1 << 17;

/// A direction to move/merge tiles.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    /// Unit vector as `(row delta, column delta)`.
    #[inline]
    pub fn vector(self) -> (isize, isize) {
        match self {
            Direction::Up => (-1, 0),
            Direction::Down => (1, 0),
            Direction::Left => (0, -1),
            Direction::Right => (0, 1),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Direction::Up => "up",
            Direction::Down => "down",
            Direction::Left => "left",
            Direction::Right => "right",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Direction {
    type Err = anyhow::Error;

    /// Parse a direction name, case-insensitively.
    ///
    /// ```
    /// use twenty48_core::Direction;
    /// assert_eq!("Left".parse::<Direction>().unwrap(), Direction::Left);
    /// assert!("sideways".parse::<Direction>().is_err());
    /// ```
    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "up" => Ok(Direction::Up),
            "down" => Ok(Direction::Down),
            "left" => Ok(Direction::Left),
            "right" => Ok(Direction::Right),
            other => bail!("unrecognized direction '{other}'"),
        }
    }
}

/// A `(row, col)` cell coordinate, row 0 at the top.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Position {
    pub row: usize,
    pub col: usize,
}

impl Position {
    #[inline]
    pub const fn new(row: usize, col: usize) -> Self {
        Position { row, col }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{})", self.row, self.col)
    }
}

/// The 4x4 board as a row-major matrix of tile values.
///
/// `0` marks an empty cell; every other value is a power of two >= 2.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Grid(pub(crate) [[Tile; SIZE]; SIZE]);

impl Grid {
    /// A constant empty board (all zeros).
    pub const EMPTY: Grid = Grid([[0; SIZE]; SIZE]);

    /// Build a grid from rows, rejecting values that are not 0 or a power of
    /// two in `2..=MAX_TILE`.
    ///
    /// ```
    /// use twenty48_core::Grid;
    /// let g = Grid::from_rows([[2, 0, 0, 0], [0; 4], [0; 4], [0, 0, 0, 4]]).unwrap();
    /// assert_eq!(g.count_empty(), 14);
    /// assert!(Grid::from_rows([[3, 0, 0, 0], [0; 4], [0; 4], [0; 4]]).is_err());
    /// ```
    pub fn from_rows(rows: [[Tile; SIZE]; SIZE]) -> Result<Self> {
        for (r, row) in rows.iter().enumerate() {
            for (c, &value) in row.iter().enumerate() {
                if value != 0 && (value < 2 || !value.is_power_of_two()) {
                    bail!("cell ({r},{c}) holds {value}, which is not a tile value");
                }
                if value > MAX_TILE {
                    bail!("cell ({r},{c}) holds {value}, above the largest tile {MAX_TILE}");
                }
            }
        }
        Ok(Grid(rows))
    }

    /// Borrow the rows of the grid.
    #[inline]
    pub fn rows(&self) -> &[[Tile; SIZE]; SIZE] {
        &self.0
    }

    /// Consume the grid, returning its rows.
    #[inline]
    pub fn into_rows(self) -> [[Tile; SIZE]; SIZE] {
        self.0
    }

    #[inline]
    pub fn get(&self, pos: Position) -> Tile {
        self.0[pos.row][pos.col]
    }

    #[inline]
    pub(crate) fn set(&mut self, pos: Position, value: Tile) {
        self.0[pos.row][pos.col] = value;
    }

    #[inline]
    pub fn is_empty_at(&self, pos: Position) -> bool {
        self.get(pos) == 0
    }

    /// All cell coordinates in row-major order.
    pub fn positions() -> impl Iterator<Item = Position> {
        (0..SIZE).flat_map(|row| (0..SIZE).map(move |col| Position::new(row, col)))
    }

    /// Coordinates of empty cells in row-major order.
    pub fn empty_cells(&self) -> Vec<Position> {
        Self::positions().filter(|&p| self.is_empty_at(p)).collect()
    }

    /// Count the number of empty cells on the board.
    pub fn count_empty(&self) -> usize {
        self.0.iter().flatten().filter(|&&v| v == 0).count()
    }

    #[inline]
    pub fn is_full(&self) -> bool {
        self.count_empty() == 0
    }

    /// Largest tile on the board, 0 when empty.
    pub fn highest_tile(&self) -> Tile {
        self.0.iter().flatten().copied().max().unwrap_or(0)
    }

    /// Sum of all tile values.
    pub fn sum(&self) -> u64 {
        self.0.iter().flatten().map(|&v| v as u64).sum()
    }

    /// True if some horizontally or vertically adjacent pair holds equal tiles.
    ///
    /// Only right and down neighbours are inspected; equality is symmetric.
    pub fn has_adjacent_pair(&self) -> bool {
        for r in 0..SIZE {
            for c in 0..SIZE {
                let v = self.0[r][c];
                if v == 0 {
                    continue;
                }
                if c + 1 < SIZE && self.0[r][c + 1] == v {
                    return true;
                }
                if r + 1 < SIZE && self.0[r + 1][c] == v {
                    return true;
                }
            }
        }
        false
    }

    /// Terminal rule: no empty cell and no equal adjacent pair.
    pub fn is_terminal(&self) -> bool {
        self.is_full() && !self.has_adjacent_pair()
    }
}

impl fmt::Debug for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Grid").field(&self.0).finish()
    }
}

/// Text board; the formatter width (`{:5}`) sets the cell width, default 7.
impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = f.width().unwrap_or(7).max(1);
        let divider = "-".repeat(SIZE * width + SIZE - 1);
        for (r, row) in self.0.iter().enumerate() {
            if r > 0 {
                writeln!(f, "{divider}")?;
            }
            let cells: Vec<String> = row.iter().map(|&v| format_val(v, width)).collect();
            writeln!(f, "{}", cells.join("|"))?;
        }
        Ok(())
    }
}

/// Center a tile value in a cell of `width` characters; empty cells are blank.
pub fn format_val(val: Tile, width: usize) -> String {
    if val == 0 {
        return " ".repeat(width);
    }
    let text = val.to_string();
    if text.len() >= width {
        return text;
    }
    let pad = width - text.len();
    let left = pad.div_ceil(2);
    format!("{}{}{}", " ".repeat(left), text, " ".repeat(pad - left))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_rows_rejects_non_tiles() {
        assert!(Grid::from_rows([[1, 0, 0, 0], [0; 4], [0; 4], [0; 4]]).is_err());
        assert!(Grid::from_rows([[0, 6, 0, 0], [0; 4], [0; 4], [0; 4]]).is_err());
        assert!(Grid::from_rows([[0, 0, 0, 2048], [0; 4], [0; 4], [0; 4]]).is_ok());
    }

    #[test]
    fn from_rows_caps_tile_size() {
        assert!(Grid::from_rows([[MAX_TILE, MAX_TILE, 0, 0], [0; 4], [0; 4], [0; 4]]).is_ok());
        assert!(Grid::from_rows([[MAX_TILE * 2, 0, 0, 0], [0; 4], [0; 4], [0; 4]]).is_err());
        let err = Grid::from_rows([[1 << 31, 1 << 31, 0, 0], [0; 4], [0; 4], [0; 4]]).unwrap_err();
        assert!(err.to_string().contains("above the largest tile"));
    }

    #[test]
    fn display_draws_rows_and_dividers() {
        let g = Grid::from_rows([[2, 0, 0, 0], [0; 4], [0; 4], [0, 0, 0, 2048]]).unwrap();
        let text = g.to_string();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), SIZE + SIZE - 1);
        assert_eq!(lines[0], "   2   |       |       |       ");
        assert_eq!(lines[1], "-".repeat(31));
        assert!(lines[6].ends_with("  2048 "));

        let narrow = format!("{g:5}");
        assert_eq!(narrow.lines().next(), Some("  2  |     |     |     "));
        assert_eq!(narrow.lines().nth(1).map(str::len), Some(23));
    }

    #[test]
    fn count_empty_and_highest() {
        let g = Grid::from_rows([[2, 4, 0, 0], [0, 0, 0, 0], [0, 0, 64, 0], [0, 0, 0, 8]]).unwrap();
        assert_eq!(g.count_empty(), 12);
        assert_eq!(g.highest_tile(), 64);
        assert_eq!(g.sum(), 78);
        assert_eq!(Grid::EMPTY.highest_tile(), 0);
        assert_eq!(Grid::EMPTY.empty_cells().len(), SIZE * SIZE);
    }

    #[test]
    fn terminal_requires_full_board_without_pairs() {
        let full = Grid::from_rows([[2, 4, 2, 4], [4, 2, 4, 2], [2, 4, 2, 4], [4, 2, 4, 2]]).unwrap();
        assert!(full.is_terminal());

        let mut holed = full;
        holed.set(Position::new(2, 1), 0);
        assert!(!holed.is_terminal());

        let paired = Grid::from_rows([[2, 4, 2, 4], [4, 2, 4, 2], [2, 4, 2, 4], [4, 2, 4, 4]]).unwrap();
        assert!(paired.has_adjacent_pair());
        assert!(!paired.is_terminal());

        let vertical = Grid::from_rows([[2, 4, 2, 4], [4, 2, 4, 2], [2, 4, 2, 8], [4, 2, 4, 8]]).unwrap();
        assert!(!vertical.is_terminal());
    }

    #[test]
    fn direction_vectors_and_parsing() {
        assert_eq!(Direction::Up.vector(), (-1, 0));
        assert_eq!(Direction::Down.vector(), (1, 0));
        assert_eq!(Direction::Left.vector(), (0, -1));
        assert_eq!(Direction::Right.vector(), (0, 1));
        for d in Direction::ALL {
            assert_eq!(d.as_str().parse::<Direction>().unwrap(), d);
        }
        assert_eq!(" DOWN ".parse::<Direction>().unwrap(), Direction::Down);
        assert!("".parse::<Direction>().is_err());
    }

    #[test]
    fn format_val_centers() {
        assert_eq!(format_val(0, 7), "       ");
        assert_eq!(format_val(2, 7), "   2   ");
        assert_eq!(format_val(2048, 7), "  2048 ");
        assert_eq!(format_val(131072, 4), "131072");
    }
}
