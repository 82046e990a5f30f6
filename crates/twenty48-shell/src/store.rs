use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use log::debug;
use rusqlite::{Connection, OptionalExtension, params};

const BEST_SCORE_KEY: &str = "best_score";

/// Summary for a finished or abandoned game.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameRecord {
    /// `--seed` the game was started from; `None` for entropy-seeded games.
    pub seed: Option<u64>,
    pub moves: u64,
    pub score: u64,
    pub highest_tile: u32,
    pub finished: bool,
}

/// Score store that writes `scores.db` with `games` and `meta` tables.
///
/// Schema:
/// - games(id INTEGER PRIMARY KEY, seed INT NULL, moves INT, score INT, highest_tile INT, finished INT)
/// - meta(meta_key TEXT PRIMARY KEY, meta_value TEXT)
pub struct ScoreStore {
    store_dir: PathBuf,
    conn: Connection,
}

impl ScoreStore {
    /// Create or open a store at `dir`, ensure schema exists.
    pub fn open<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let store_dir = dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&store_dir)
            .with_context(|| format!("failed to create {}", store_dir.display()))?;
        let db_path = store_dir.join("scores.db");
        let conn = Connection::open(&db_path)
            .with_context(|| format!("failed to open {}", db_path.display()))?;
        Self::init(store_dir, conn)
    }

    #[cfg(test)]
    pub fn in_memory() -> Result<Self> {
        Self::init(PathBuf::new(), Connection::open_in_memory()?)
    }

    fn init(store_dir: PathBuf, conn: Connection) -> Result<Self> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS games (
                id INTEGER PRIMARY KEY,
                seed INT,
                moves INT NOT NULL,
                score INT NOT NULL,
                highest_tile INT NOT NULL,
                finished INT NOT NULL
            );
            CREATE TABLE IF NOT EXISTS meta (
                meta_key TEXT PRIMARY KEY,
                meta_value TEXT NOT NULL
            );
            "#,
        )
        .context("failed to create score schema")?;
        Ok(Self { store_dir, conn })
    }

    /// Stored best score, 0 if none has been written yet.
    pub fn best_score(&self) -> Result<u64> {
        let raw: Option<String> = self
            .conn
            .query_row(
                "SELECT meta_value FROM meta WHERE meta_key = ?1",
                params![BEST_SCORE_KEY],
                |row| row.get(0),
            )
            .optional()?;
        match raw {
            Some(v) => v
                .parse()
                .with_context(|| format!("corrupt best score '{v}'")),
            None => Ok(0),
        }
    }

    /// Write `score` as the best score if it beats the stored one.
    /// Returns whether the stored value changed.
    pub fn update_best(&mut self, score: u64) -> Result<bool> {
        if score <= self.best_score()? {
            return Ok(false);
        }
        self.conn.execute(
            "INSERT INTO meta (meta_key, meta_value) VALUES (?1, ?2)
             ON CONFLICT(meta_key) DO UPDATE SET meta_value=excluded.meta_value",
            params![BEST_SCORE_KEY, score.to_string()],
        )?;
        debug!("stored new best score {score}");
        Ok(true)
    }

    /// Append a game summary, returning its row id.
    pub fn record_game(&mut self, r: GameRecord) -> Result<i64> {
        self.conn.execute(
            "INSERT INTO games (seed, moves, score, highest_tile, finished)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                r.seed.map(|s| s as i64),
                r.moves as i64,
                r.score as i64,
                r.highest_tile as i64,
                r.finished
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    #[cfg(test)]
    pub fn get_game(&self, id: i64) -> Result<Option<GameRecord>> {
        let record = self
            .conn
            .query_row(
                "SELECT seed, moves, score, highest_tile, finished FROM games WHERE id = ?1",
                params![id],
                |row| {
                    Ok(GameRecord {
                        seed: row.get::<_, Option<i64>>(0)?.map(|s| s as u64),
                        moves: row.get::<_, i64>(1)? as u64,
                        score: row.get::<_, i64>(2)? as u64,
                        highest_tile: row.get::<_, i64>(3)? as u32,
                        finished: row.get(4)?,
                    })
                },
            )
            .optional()?;
        Ok(record)
    }

    pub fn games_played(&self) -> Result<u64> {
        let n: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM games", [], |row| row.get(0))?;
        Ok(n as u64)
    }

    pub fn store_dir(&self) -> &Path {
        &self.store_dir
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn best_score_only_increases() {
        let mut store = ScoreStore::in_memory().unwrap();
        assert_eq!(store.best_score().unwrap(), 0);
        assert!(store.update_best(120).unwrap());
        assert!(!store.update_best(80).unwrap());
        assert!(!store.update_best(120).unwrap());
        assert_eq!(store.best_score().unwrap(), 120);
        assert!(store.update_best(500).unwrap());
        assert_eq!(store.best_score().unwrap(), 500);
    }

    #[test]
    fn reopen_persists_best_and_games() {
        let td = tempdir().unwrap();
        let dir = td.path().join("scores");
        {
            let mut store = ScoreStore::open(&dir).expect("open store");
            assert!(store.store_dir().exists());
            store.update_best(2048).unwrap();
            let record = GameRecord {
                seed: Some(u64::MAX - 5),
                moves: 310,
                score: 2048,
                highest_tile: 256,
                finished: true,
            };
            let id = store.record_game(record).unwrap();
            assert_eq!(store.get_game(id).unwrap(), Some(record));
        }
        let mut store = ScoreStore::open(&dir).unwrap();
        assert_eq!(store.best_score().unwrap(), 2048);
        assert_eq!(store.games_played().unwrap(), 1);
        assert!(store.get_game(99).unwrap().is_none());

        let unseeded = GameRecord { seed: None, moves: 12, score: 40, highest_tile: 16, finished: false };
        let id = store.record_game(unseeded).unwrap();
        assert_eq!(store.get_game(id).unwrap(), Some(unseeded));
        assert_eq!(store.games_played().unwrap(), 2);
    }
}
