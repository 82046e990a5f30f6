//! Engine module: the 4x4 grid, direction geometry, and the game state
//! machine that slides, merges and spawns tiles.
//!
//! - `Grid` is the plain N x N matrix of tile values with useful queries.
//! - `Game` owns a grid plus score bookkeeping and an injectable RNG.
//! - Geometry helpers (bounds, traversal order, farthest position) live in
//!   their own submodule so they can be tested in isolation.

pub mod game;
pub mod geometry;
pub mod outcome;
pub mod state;

pub use game::{Game, Snapshot, WINNING_TILE};
pub use outcome::{Merge, MoveOutcome, Slide, Spawn};
pub use state::{Direction, Grid, MAX_TILE, Position, Score, SIZE, Tile};
