mod config;
mod input;
mod render;
mod session;
mod store;

use std::io;
use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use env_logger::Env;
use log::info;
use twenty48_core::Game;

use config::ShellConfig;
use session::Session;
use store::ScoreStore;

#[derive(Debug, Parser)]
#[command(author, version, about = "Play 2048 in the terminal")]
struct Cli {
    /// Path to an optional TOML configuration file
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Seed for reproducible tile spawns (defaults to OS entropy)
    #[arg(long, value_name = "N")]
    seed: Option<u64>,

    /// Play a scripted key sequence (e.g. "wasd") instead of reading stdin
    #[arg(long, value_name = "KEYS")]
    moves: Option<String>,

    /// Emit one JSON line per move instead of drawing the board
    #[arg(long)]
    json: bool,

    /// Directory for scores.db (overrides the config file)
    #[arg(long, value_name = "DIR")]
    store_dir: Option<PathBuf>,

    /// Do not read or write the best score
    #[arg(long)]
    no_store: bool,

    /// Log filter, e.g. "info", "debug" (overrides the config file)
    #[arg(long, value_name = "LEVEL")]
    log: Option<String>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut config = match &cli.config {
        Some(path) => ShellConfig::from_toml(path)?,
        None => ShellConfig::default(),
    };
    if let Some(level) = cli.log {
        config.log_level = level;
    }
    if let Some(dir) = cli.store_dir {
        config.store_dir = dir;
    }
    if cli.no_store {
        config.persist = false;
    }
    env_logger::Builder::from_env(Env::default().default_filter_or(config.log_level.as_str())).init();

    let store = if config.persist {
        let store = ScoreStore::open(&config.store_dir)?;
        info!(
            "score store at {} ({} games played)",
            store.store_dir().display(),
            store.games_played()?
        );
        Some(store)
    } else {
        None
    };

    let game = match cli.seed {
        Some(seed) => Game::from_seed(seed),
        None => Game::new(),
    };

    let stdout = io::stdout();
    let mut session = Session::new(game, cli.seed, store, stdout.lock(), cli.json, config.render)?;
    match cli.moves {
        Some(script) => session.run_script(&script)?,
        None => session.run_interactive(io::stdin().lock())?,
    }

    let game = session.game();
    info!(
        "session finished: score {}, best {}, highest tile {}",
        game.score(),
        game.best_score(),
        game.highest_tile()
    );
    Ok(())
}
