use std::io::{BufRead, Write};

use anyhow::{Context, Result};
use log::{info, warn};
use rand::Rng;
use serde::Serialize;
use twenty48_core::{Game, MoveOutcome, Snapshot};

use crate::config::Render;
use crate::input::{Command, parse_line};
use crate::render::{game_over_banner, render_board, render_events};
use crate::store::{GameRecord, ScoreStore};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// JSON line emitted per move in `--json` mode.
#[derive(Serialize)]
struct MoveReport<'a> {
    outcome: &'a MoveOutcome,
    state: Snapshot,
}

/// Drives one [`Game`] from text commands, renders it, and keeps the
/// score store in sync.
pub struct Session<W: Write, R: Rng> {
    game: Game<R>,
    seed: Option<u64>,
    store: Option<ScoreStore>,
    stored_best: u64,
    recorded: bool,
    out: W,
    json: bool,
    render: Render,
}

impl<W: Write, R: Rng> Session<W, R> {
    /// Wrap `game`, seeding its best score from `store` if one is given.
    /// `seed` is recorded with each game row.
    pub fn new(
        game: Game<R>,
        seed: Option<u64>,
        store: Option<ScoreStore>,
        out: W,
        json: bool,
        render: Render,
    ) -> Result<Self> {
        let stored_best = match &store {
            Some(s) => s.best_score()?,
            None => 0,
        };
        Ok(Self {
            game: game.with_best_score(stored_best),
            seed,
            store,
            stored_best,
            recorded: false,
            out,
            json,
            render,
        })
    }

    pub fn game(&self) -> &Game<R> {
        &self.game
    }

    /// Print the current board (text mode) or state line (JSON mode).
    pub fn show(&mut self) -> Result<()> {
        let snapshot = self.game.snapshot();
        if self.json {
            let line = serde_json::to_string(&snapshot)?;
            writeln!(self.out, "{line}")?;
        } else {
            write!(self.out, "{}", render_board(&snapshot, self.render.cell_width))?;
        }
        self.out.flush()?;
        Ok(())
    }

    pub fn apply(&mut self, cmd: Command) -> Result<Flow> {
        match cmd {
            Command::Quit => {
                self.finish()?;
                return Ok(Flow::Quit);
            }
            Command::Restart => {
                self.record_game()?;
                self.game.restart();
                self.recorded = false;
                self.show()?;
            }
            Command::Move(direction) => {
                if self.game.is_over() {
                    if !self.json {
                        let banner = game_over_banner(&self.game.snapshot());
                        writeln!(self.out, "{banner} (r to restart, q to quit)")?;
                    }
                    return Ok(Flow::Continue);
                }
                let outcome = self.game.make_move(direction);
                self.sync_best()?;
                if outcome.became_over {
                    self.record_game()?;
                }
                self.report(&outcome)?;
            }
        }
        Ok(Flow::Continue)
    }

    /// Feed a whole script (e.g. `--moves wasd`) and stop at `q` or its end.
    pub fn run_script(&mut self, script: &str) -> Result<()> {
        self.show()?;
        for cmd in parse_line(script)? {
            if self.apply(cmd)? == Flow::Quit {
                return Ok(());
            }
        }
        self.finish()
    }

    /// Read commands line by line until `q` or end of input.
    pub fn run_interactive<I: BufRead>(&mut self, input: I) -> Result<()> {
        self.show()?;
        for line in input.lines() {
            let line = line.context("failed to read input")?;
            let commands = match parse_line(&line) {
                Ok(c) => c,
                Err(err) => {
                    warn!("{err:#}");
                    continue;
                }
            };
            for cmd in commands {
                if self.apply(cmd)? == Flow::Quit {
                    return Ok(());
                }
            }
        }
        self.finish()
    }

    /// Persist the best score and record the current game if it saw play.
    pub fn finish(&mut self) -> Result<()> {
        self.sync_best()?;
        self.record_game()
    }

    #[cfg(test)]
    pub fn into_output(self) -> W {
        self.out
    }

    fn report(&mut self, outcome: &MoveOutcome) -> Result<()> {
        if self.json {
            let report = MoveReport { outcome, state: self.game.snapshot() };
            writeln!(self.out, "{}", serde_json::to_string(&report)?)?;
            self.out.flush()?;
            return Ok(());
        }
        if !outcome.moved {
            return Ok(());
        }
        if self.render.show_events {
            write!(self.out, "{}", render_events(outcome))?;
        }
        self.show()
    }

    fn sync_best(&mut self) -> Result<()> {
        let best = self.game.best_score();
        if best <= self.stored_best {
            return Ok(());
        }
        if let Some(store) = self.store.as_mut() {
            store.update_best(best)?;
        }
        self.stored_best = best;
        Ok(())
    }

    fn record_game(&mut self) -> Result<()> {
        if self.recorded || self.game.moves_made() == 0 {
            return Ok(());
        }
        let record = GameRecord {
            seed: self.seed,
            moves: self.game.moves_made(),
            score: self.game.score(),
            highest_tile: self.game.highest_tile(),
            finished: self.game.is_over(),
        };
        if let Some(store) = self.store.as_mut() {
            let id = store.record_game(record)?;
            info!("recorded game #{id}: score {} in {} moves", record.score, record.moves);
        }
        self.recorded = true;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use twenty48_core::{Direction, Grid};

    fn session_for(rows: [[u32; 4]; 4], store: Option<ScoreStore>, json: bool) -> Session<Vec<u8>, StdRng> {
        let game = Game::from_grid(Grid::from_rows(rows).unwrap(), StdRng::seed_from_u64(3));
        Session::new(game, None, store, Vec::new(), json, Render::default()).unwrap()
    }

    #[test]
    fn best_score_is_loaded_and_written_back() {
        let mut store = ScoreStore::in_memory().unwrap();
        store.update_best(4).unwrap();
        let mut session = session_for([[4, 4, 0, 0], [0; 4], [0; 4], [0; 4]], Some(store), false);
        assert_eq!(session.game().best_score(), 4);

        session.apply(Command::Move(Direction::Right)).unwrap();
        assert_eq!(session.game().score(), 8);
        assert_eq!(session.stored_best, 8);
        let store = session.store.as_ref().unwrap();
        assert_eq!(store.best_score().unwrap(), 8);
    }

    #[test]
    fn stored_best_above_score_is_kept() {
        let mut store = ScoreStore::in_memory().unwrap();
        store.update_best(1000).unwrap();
        let mut session = session_for([[4, 4, 0, 0], [0; 4], [0; 4], [0; 4]], Some(store), false);
        session.apply(Command::Move(Direction::Right)).unwrap();
        assert_eq!(session.game().best_score(), 1000);
        assert_eq!(session.store.as_ref().unwrap().best_score().unwrap(), 1000);
    }

    #[test]
    fn restart_and_quit_record_games_once() {
        let store = ScoreStore::in_memory().unwrap();
        let mut session = session_for([[2, 2, 0, 0], [0; 4], [0; 4], [0; 4]], Some(store), false);
        session.apply(Command::Move(Direction::Left)).unwrap();
        session.apply(Command::Restart).unwrap();
        assert_eq!(session.store.as_ref().unwrap().games_played().unwrap(), 1);
        assert_eq!(session.game().moves_made(), 0);

        // Fresh game with no moves is not recorded on quit.
        assert_eq!(session.apply(Command::Quit).unwrap(), Flow::Quit);
        assert_eq!(session.store.as_ref().unwrap().games_played().unwrap(), 1);
    }

    #[test]
    fn move_that_ends_game_records_finished_row() {
        let rows = [[8, 4, 8, 4], [4, 8, 4, 8], [8, 4, 8, 64], [2, 2, 16, 32]];
        let game = Game::from_grid(Grid::from_rows(rows).unwrap(), StdRng::seed_from_u64(3));
        let store = ScoreStore::in_memory().unwrap();
        let mut session = Session::new(game, Some(17), Some(store), Vec::new(), false, Render::default()).unwrap();

        session.apply(Command::Move(Direction::Left)).unwrap();
        assert!(session.game().is_over());
        let store = session.store.as_ref().unwrap();
        assert_eq!(store.games_played().unwrap(), 1);
        let row = store.get_game(1).unwrap().expect("game row");
        assert!(row.finished);
        assert_eq!(row.seed, Some(17));
        assert_eq!(row.score, 4);
        assert_eq!(row.moves, 1);

        // Quitting afterwards does not write a second row.
        session.apply(Command::Quit).unwrap();
        assert_eq!(session.store.as_ref().unwrap().games_played().unwrap(), 1);
    }

    #[test]
    fn unfinished_game_is_recorded_without_seed() {
        let store = ScoreStore::in_memory().unwrap();
        let mut session = session_for([[2, 2, 0, 0], [0; 4], [0; 4], [0; 4]], Some(store), false);
        session.apply(Command::Move(Direction::Left)).unwrap();
        session.finish().unwrap();
        let row = session.store.as_ref().unwrap().get_game(1).unwrap().expect("game row");
        assert!(!row.finished);
        assert_eq!(row.seed, None);
        assert_eq!(row.highest_tile, 4);
    }

    #[test]
    fn moves_after_game_over_are_ignored() {
        let rows = [[2, 4, 2, 4], [4, 2, 4, 2], [2, 4, 2, 4], [4, 2, 4, 2]];
        let mut session = session_for(rows, None, false);
        assert_eq!(session.apply(Command::Move(Direction::Up)).unwrap(), Flow::Continue);
        assert_eq!(session.game().grid().into_rows(), rows);
        let text = String::from_utf8(session.into_output()).unwrap();
        assert!(text.contains("Game over! Final score: 0"));
    }

    #[test]
    fn script_stops_at_quit() {
        let mut session = session_for([[2, 0, 0, 0], [0; 4], [0; 4], [0; 4]], None, false);
        session.run_script("d q a").unwrap();
        assert_eq!(session.game().moves_made(), 1);
        assert_eq!(session.game().tile(twenty48_core::Position::new(0, 3)), 2);
    }

    #[test]
    fn json_mode_emits_one_line_per_move() {
        let mut session = session_for([[4, 4, 0, 0], [0; 4], [0; 4], [0; 4]], None, true);
        session.run_interactive("right\nbogus\nright\n".as_bytes()).unwrap();
        let text = String::from_utf8(session.into_output()).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        // Initial state plus one report per parsed move.
        assert_eq!(lines.len(), 3);
        let first: serde_json::Value = serde_json::from_str(lines[1]).unwrap();
        assert_eq!(first["outcome"]["direction"], "right");
        assert_eq!(first["outcome"]["score_gained"], 8);
        assert_eq!(first["state"]["score"], 8);
    }
}
