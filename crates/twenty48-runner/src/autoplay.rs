use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};
use log::{debug, info};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use twenty48_engine::engine::BoardEngine;

use crate::config::Config;
use crate::strategy::Strategy;

/// Mixed into the game seed so move choice and tile spawns draw from
/// independent streams.
const STRATEGY_SEED_SALT: u64 = 0x9E37_79B9_7F4A_7C15;

/// Outcome of one autoplayed game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameResult {
    pub game_id: u32,
    pub seed: u64,
    pub steps: u64,
    pub score: u64,
    pub highest_tile: u64,
    /// False when the game stopped at `max_moves` rather than game over.
    pub finished: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    pub games: usize,
    pub finished: usize,
    pub mean_score: f64,
    pub max_score: u64,
    pub best_tile: u64,
}

/// Play one game to completion (or `max_moves`) with a seeded engine.
pub fn play_game(game_id: u32, seed: u64, strategy: &Strategy, max_moves: u64) -> GameResult {
    let mut game = BoardEngine::with_seed(seed);
    let mut rng = StdRng::seed_from_u64(seed ^ STRATEGY_SEED_SALT);
    game.spawn_new_tiles();

    let mut steps = 0;
    let mut finished = false;
    while steps < max_moves {
        let Some(m) = strategy.select(&game, &mut rng) else {
            finished = true;
            break;
        };
        match game.step(m) {
            Some(turn) => {
                steps += 1;
                if turn.game_over {
                    finished = true;
                    break;
                }
            }
            // Strategies only pick legal moves; treat anything else as stuck.
            None => break,
        }
    }

    let result = GameResult {
        game_id,
        seed,
        steps,
        score: game.score(),
        highest_tile: game.board().highest_tile().value(),
        finished,
    };
    debug!("game {game_id} done: {result:?}");
    result
}

/// Run every game described by `cfg`, in parallel across games.
///
/// Results come back ordered by `game_id` and depend only on the config,
/// not on the number of workers.
pub fn run(cfg: &Config) -> Result<Vec<GameResult>> {
    cfg.validate()?;
    let strategy = Strategy::from_config(&cfg.strategy);
    let play_all = || -> Vec<GameResult> {
        (0..cfg.num_games)
            .into_par_iter()
            .map(|id| {
                let seed = cfg.base_seed.wrapping_add(id as u64);
                play_game(id, seed, &strategy, cfg.max_moves)
            })
            .collect()
    };
    let results = match cfg.workers {
        Some(n) => rayon::ThreadPoolBuilder::new()
            .num_threads(n)
            .build()
            .context("failed to build rayon thread pool")?
            .install(play_all),
        None => play_all(),
    };
    Ok(results)
}

pub fn summarize(results: &[GameResult]) -> Summary {
    let games = results.len();
    let total: u64 = results.iter().map(|r| r.score).sum();
    Summary {
        games,
        finished: results.iter().filter(|r| r.finished).count(),
        mean_score: if games == 0 { 0.0 } else { total as f64 / games as f64 },
        max_score: results.iter().map(|r| r.score).max().unwrap_or(0),
        best_tile: results.iter().map(|r| r.highest_tile).max().unwrap_or(0),
    }
}

/// Write one JSON object per line.
pub fn write_results<W: Write>(results: &[GameResult], mut out: W) -> Result<()> {
    for r in results {
        serde_json::to_writer(&mut out, r).context("failed to serialize game result")?;
        out.write_all(b"\n")?;
    }
    out.flush()?;
    Ok(())
}

pub fn write_results_file(results: &[GameResult], path: &Path) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("failed to create {}", path.display()))?;
    write_results(results, BufWriter::new(file))?;
    info!("wrote {} result(s) to {}", results.len(), path.display());
    Ok(())
}
