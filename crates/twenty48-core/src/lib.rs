//! Presentation-agnostic engine for the 2048 sliding-tile puzzle.
//!
//! The crate exposes data only: a [`engine::Game`] owns the board, score and
//! terminal flag, and every move returns a [`engine::MoveOutcome`] describing
//! slides, merges and the spawned tile so a front-end can animate them.

pub mod engine;

pub use engine::{Direction, Game, Grid, MoveOutcome, Position, Snapshot};
