use std::io;
use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use env_logger::Env;
use log::info;
use twenty48_engine::engine::BoardEngine;
use twenty48_runner::{Config, autoplay, play};

#[derive(Debug, Parser)]
#[command(author, version, about = "Play or batch-simulate 2048 on the board engine")]
struct Cli {
    /// Log filter, e.g. "info", "debug" (RUST_LOG takes precedence)
    #[arg(long, default_value = "info")]
    log: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Interactive text game on stdin/stdout
    Play {
        /// Seed for reproducible spawns
        #[arg(long, value_name = "N")]
        seed: Option<u64>,
    },
    /// Run many games with a configured strategy and report JSON lines
    Autoplay {
        /// Path to configuration file
        #[arg(long, value_name = "FILE", value_parser = clap::value_parser!(PathBuf))]
        config: PathBuf,

        /// Override num_games from the config
        #[arg(long, value_name = "N")]
        games: Option<u32>,

        /// Override base_seed from the config
        #[arg(long, value_name = "N")]
        seed: Option<u64>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    env_logger::Builder::from_env(Env::default().default_filter_or(cli.log.as_str())).init();

    match cli.command {
        Command::Play { seed } => {
            let mut game = match seed {
                Some(s) => BoardEngine::with_seed(s),
                None => BoardEngine::new(),
            };
            let stdin = io::stdin();
            let mut stdout = io::stdout().lock();
            let summary = play::run_session(&mut game, stdin.lock(), &mut stdout)?;
            info!(
                "session ended: {} move(s), {} restart(s), score {}",
                summary.moves, summary.restarts, summary.score
            );
        }
        Command::Autoplay { config, games, seed } => {
            let mut cfg = Config::from_toml(&config)?;
            if let Some(n) = games {
                cfg.num_games = n;
            }
            if let Some(s) = seed {
                cfg.base_seed = s;
            }
            info!("Using configuration file: {}", config.display());
            let results = autoplay::run(&cfg)?;
            match &cfg.report.results_file {
                Some(path) => autoplay::write_results_file(&results, path)?,
                None => autoplay::write_results(&results, io::stdout().lock())?,
            }
            let summary = autoplay::summarize(&results);
            info!(
                "Completed autoplay: {} game(s), {} finished, mean score {:.1}, \
                 max score {}, best tile {}",
                summary.games,
                summary.finished,
                summary.mean_score,
                summary.max_score,
                summary.best_tile
            );
        }
    }
    Ok(())
}
