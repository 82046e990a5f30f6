use serde::{Deserialize, Serialize};

use super::state::{Direction, Position, Score, Tile};

/// A tile relocated without changing value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slide {
    pub from: Position,
    pub to: Position,
    pub value: Tile,
}

/// Two equal tiles combined; `value` is the resulting (doubled) tile at `into`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Merge {
    pub from: Position,
    pub into: Position,
    pub value: Tile,
}

/// A freshly spawned tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Spawn {
    pub at: Position,
    pub value: Tile,
}

/// Everything a front-end needs to animate one move.
///
/// Replaying `slides`, then `merges`, then `settles` in order on the
/// previous grid reproduces the new grid before `spawned` is placed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveOutcome {
    pub direction: Direction,
    pub moved: bool,
    pub slides: Vec<Slide>,
    pub merges: Vec<Merge>,
    /// Slides that close the gaps left behind by merges.
    pub settles: Vec<Slide>,
    pub spawned: Option<Spawn>,
    pub score_gained: Score,
    pub became_over: bool,
}

impl MoveOutcome {
    pub(crate) fn unchanged(direction: Direction) -> Self {
        MoveOutcome {
            direction,
            moved: false,
            slides: Vec::new(),
            merges: Vec::new(),
            settles: Vec::new(),
            spawned: None,
            score_gained: 0,
            became_over: false,
        }
    }
}
