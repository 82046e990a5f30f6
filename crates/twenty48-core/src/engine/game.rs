use log::{debug, info, trace};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use super::geometry::{Traversals, build_traversals, find_farthest_position, step};
use super::outcome::{Merge, MoveOutcome, Slide, Spawn};
use super::state::{Direction, Grid, Position, SIZE, Score, Tile};
#[cfg(test)]
use super::state::MAX_TILE;

/// Reaching this tile counts as a win; play may continue.
pub const WINNING_TILE: Tile = 2048;

/// Read-only view of a game for rendering or serialization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub grid: Grid,
    pub score: Score,
    pub best_score: Score,
    pub over: bool,
    pub won: bool,
    pub moves: u64,
}

/// A single game: board, score bookkeeping and the random source used for spawns.
///
/// ```
/// use twenty48_core::{Direction, Game};
/// let mut game = Game::from_seed(42);
/// assert_eq!(game.grid().count_empty(), 14);
/// let outcome = game.make_move(Direction::Left);
/// if outcome.moved {
///     assert!(outcome.spawned.is_some());
/// }
/// assert!(game.best_score() >= game.score());
/// ```
pub struct Game<R = StdRng> {
    grid: Grid,
    score: Score,
    best_score: Score,
    over: bool,
    moves: u64,
    rng: R,
}

impl Game<StdRng> {
    /// Fresh game seeded from OS entropy.
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    /// Fresh game with a reproducible tile sequence.
    pub fn from_seed(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }
}

impl Default for Game<StdRng> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Rng> Game<R> {
    /// Fresh two-tile game drawing randomness from `rng`.
    pub fn with_rng(rng: R) -> Self {
        let mut game = Game {
            grid: Grid::EMPTY,
            score: 0,
            best_score: 0,
            over: false,
            moves: 0,
            rng,
        };
        game.initialize();
        game
    }

    /// Start from an arbitrary board with zero score. The terminal flag is
    /// evaluated immediately.
    pub fn from_grid(grid: Grid, rng: R) -> Self {
        Game {
            over: grid.is_terminal(),
            grid,
            score: 0,
            best_score: 0,
            moves: 0,
            rng,
        }
    }

    /// Seed the best score loaded by the caller's persistence layer.
    pub fn with_best_score(mut self, best: Score) -> Self {
        self.best_score = self.best_score.max(best);
        self
    }

    /// Clear the board and score, then spawn two tiles. Best score is kept.
    pub fn initialize(&mut self) {
        self.grid = Grid::EMPTY;
        self.score = 0;
        self.over = false;
        self.moves = 0;
        self.spawn_random_tile();
        self.spawn_random_tile();
    }

    pub fn restart(&mut self) {
        info!(
            "restarting game (score {}, best {}, {} moves)",
            self.score, self.best_score, self.moves
        );
        self.initialize();
    }

    /// Insert a 2 (90%) or 4 (10%) into a uniformly chosen empty cell.
    ///
    /// Returns `None` without touching the board when no cell is empty.
    pub fn spawn_random_tile(&mut self) -> Option<Spawn> {
        let empty = self.grid.empty_cells();
        if empty.is_empty() {
            trace!("no empty cell, skipping spawn");
            return None;
        }
        let at = empty[self.rng.gen_range(0..empty.len())];
        let value = generate_random_tile(&mut self.rng);
        self.grid.set(at, value);
        trace!("spawned {value} at {at}");
        Some(Spawn { at, value })
    }

    /// Slide and merge every tile toward `direction`, then spawn a tile if
    /// anything changed.
    ///
    /// A tile produced by a merge does not merge again in the same call, so
    /// a row `[2, 2, 2, 2]` moved left becomes `[4, 4, 0, 0]`. Once the game
    /// is over this is a no-op reporting `moved == false`.
    pub fn make_move(&mut self, direction: Direction) -> MoveOutcome {
        let mut outcome = MoveOutcome::unchanged(direction);
        if self.over {
            debug!("ignoring {direction}: game is over");
            return outcome;
        }

        let traversals = build_traversals(direction);
        self.slide_pass(direction, &traversals, &mut outcome.slides);
        self.merge_pass(direction, &traversals, &mut outcome);
        if !outcome.merges.is_empty() {
            self.slide_pass(direction, &traversals, &mut outcome.settles);
        }

        outcome.moved = !outcome.slides.is_empty() || !outcome.merges.is_empty();
        if !outcome.moved {
            debug!("{direction} had no effect");
            return outcome;
        }

        self.moves += 1;
        outcome.spawned = self.spawn_random_tile();
        if self.grid.is_terminal() {
            self.over = true;
            outcome.became_over = true;
            info!(
                "game over after {} moves: score {}, highest tile {}",
                self.moves,
                self.score,
                self.grid.highest_tile()
            );
        }
        debug!(
            "{direction}: {} slides, {} merges, +{} (score {})",
            outcome.slides.len() + outcome.settles.len(),
            outcome.merges.len(),
            outcome.score_gained,
            self.score
        );
        outcome
    }

    /// Terminal flag; latched until the next `initialize`.
    #[inline]
    pub fn is_over(&self) -> bool {
        self.over
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            grid: self.grid,
            score: self.score,
            best_score: self.best_score,
            over: self.over,
            won: self.has_won(),
            moves: self.moves,
        }
    }

    #[inline]
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    #[inline]
    pub fn score(&self) -> Score {
        self.score
    }

    #[inline]
    pub fn best_score(&self) -> Score {
        self.best_score
    }

    /// Number of effective moves in the current game.
    #[inline]
    pub fn moves_made(&self) -> u64 {
        self.moves
    }

    pub fn tile(&self, pos: Position) -> Tile {
        self.grid.get(pos)
    }

    pub fn count_empty(&self) -> usize {
        self.grid.count_empty()
    }

    pub fn highest_tile(&self) -> Tile {
        self.grid.highest_tile()
    }

    pub fn has_won(&self) -> bool {
        self.highest_tile() >= WINNING_TILE
    }

    fn slide_pass(
        &mut self,
        direction: Direction,
        traversals: &Traversals,
        slides: &mut Vec<Slide>,
    ) {
        for from in traversals.cells() {
            let value = self.grid.get(from);
            if value == 0 {
                continue;
            }
            let to = find_farthest_position(&self.grid, from, direction);
            if to != from {
                self.grid.set(to, value);
                self.grid.set(from, 0);
                slides.push(Slide { from, to, value });
            }
        }
    }

    fn merge_pass(
        &mut self,
        direction: Direction,
        traversals: &Traversals,
        outcome: &mut MoveOutcome,
    ) {
        // Cells that already absorbed a merge during this call.
        let mut merged = [[false; SIZE]; SIZE];
        for from in traversals.cells() {
            let value = self.grid.get(from);
            if value == 0 {
                continue;
            }
            let Some(into) = step(from, direction) else {
                continue;
            };
            if self.grid.get(into) != value
                || merged[from.row][from.col]
                || merged[into.row][into.col]
            {
                continue;
            }
            // Unreachable from validated grids; a failed doubling leaves both tiles.
            let Some(doubled) = value.checked_mul(2) else {
                continue;
            };
            self.grid.set(into, doubled);
            self.grid.set(from, 0);
            merged[into.row][into.col] = true;
            self.add_score(doubled);
            outcome.score_gained += doubled as Score;
            outcome.merges.push(Merge {
                from,
                into,
                value: doubled,
            });
        }
    }

    fn add_score(&mut self, gained: Tile) {
        self.score += gained as Score;
        if self.score > self.best_score {
            self.best_score = self.score;
        }
    }
}

fn generate_random_tile<R: Rng + ?Sized>(rng: &mut R) -> Tile {
    if rng.gen_range(0..10) < 9 { 2 } else { 4 }
}
