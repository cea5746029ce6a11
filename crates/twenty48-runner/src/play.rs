use std::io::{BufRead, Write};

use anyhow::Result;
use log::{info, warn};
use rand::Rng;
use twenty48_engine::engine::{BoardEngine, EngineState, Move, SpawnedTile, TileMovement, Turn};

const HELP: &str = "moves: w/a/s/d, h/j/k/l or up/down/left/right; r = restart, q = quit";

/// How a text session ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSummary {
    pub moves: u64,
    pub restarts: u64,
    pub score: u64,
    pub game_over: bool,
}

enum Command {
    Quit,
    Restart,
    Help,
    Move(Move),
}

fn parse_command(line: &str) -> Option<Command> {
    match line.trim().to_ascii_lowercase().as_str() {
        "q" | "quit" | "exit" => Some(Command::Quit),
        "r" | "restart" | "new" => Some(Command::Restart),
        "?" | "help" => Some(Command::Help),
        other => other.parse().ok().map(Command::Move),
    }
}

/// Drive `game` from line-oriented text commands, echoing every record.
///
/// Starts a fresh game when `game` has not been seeded yet. Once the game is
/// over only restart and quit are accepted.
pub fn run_session<G, I, W>(
    game: &mut BoardEngine<G>,
    input: I,
    out: &mut W,
) -> Result<SessionSummary>
where
    G: Rng,
    I: BufRead,
    W: Write,
{
    let mut moves = 0;
    let mut restarts = 0;

    if !game.is_initialized() {
        let spawned = game.spawn_new_tiles();
        write_spawns(out, &spawned)?;
    }
    write_board(out, game)?;
    writeln!(out, "{HELP}")?;

    for line in input.lines() {
        let line = line?;
        match parse_command(&line) {
            Some(Command::Quit) => break,
            Some(Command::Help) => writeln!(out, "{HELP}")?,
            Some(Command::Restart) => {
                let spawned = game.start();
                restarts += 1;
                info!("restarted game");
                writeln!(out, "new game")?;
                write_spawns(out, &spawned)?;
                write_board(out, game)?;
            }
            Some(Command::Move(Move::None)) => {}
            Some(Command::Move(m)) => {
                if game.state() == EngineState::Failed {
                    writeln!(out, "game over; r to restart, q to quit")?;
                    continue;
                }
                match game.step(m) {
                    Some(turn) => {
                        moves += 1;
                        write_turn(out, m, &turn)?;
                        write_board(out, game)?;
                        if turn.game_over {
                            writeln!(out, "GAME OVER - final score {}", turn.score)?;
                        }
                    }
                    None => writeln!(out, "{m}: nothing moves")?,
                }
            }
            None => {
                warn!("unrecognised command {:?}", line.trim());
                writeln!(out, "unknown command '{}'; {HELP}", line.trim())?;
            }
        }
    }

    Ok(SessionSummary {
        moves,
        restarts,
        score: game.score(),
        game_over: game.is_initialized() && game.is_game_over(),
    })
}

fn write_turn<W: Write>(out: &mut W, m: Move, turn: &Turn) -> Result<()> {
    writeln!(out, "{m}: {} movement(s), +{}", turn.movements.len(), turn.score_delta)?;
    for mv in &turn.movements {
        write_movement(out, mv)?;
    }
    write_spawns(out, &turn.spawned)
}

fn write_movement<W: Write>(out: &mut W, m: &TileMovement) -> Result<()> {
    writeln!(
        out,
        "  ({},{}) -> ({},{}) {} => {} [{:?}]",
        m.from_x, m.from_y, m.to_x, m.to_y, m.old_tile, m.new_tile, m.kind
    )?;
    Ok(())
}

fn write_spawns<W: Write>(out: &mut W, spawned: &[SpawnedTile]) -> Result<()> {
    for s in spawned {
        writeln!(out, "  spawn {} at ({},{})", s.tile, s.x, s.y)?;
    }
    Ok(())
}

fn write_board<G: Rng, W: Write>(out: &mut W, game: &BoardEngine<G>) -> Result<()> {
    write!(out, "{}", game.board())?;
    writeln!(out, "score: {}", game.score())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use twenty48_engine::engine::Board;

    fn session(game: &mut BoardEngine, script: &str) -> (SessionSummary, String) {
        let mut out = Vec::new();
        let summary = run_session(game, script.as_bytes(), &mut out).unwrap();
        (summary, String::from_utf8(out).unwrap())
    }

    #[test]
    fn test_session_seeds_and_plays() {
        let mut game = BoardEngine::with_seed(8);
        let (summary, text) = session(&mut game, "a\nd\nw\ns\nq\nleft\n");
        assert!(text.matches("spawn").count() >= 2);
        assert!(summary.moves >= 1);
        assert!(!summary.game_over);
        // Commands after quit are not read.
        assert!(summary.moves <= 4);
    }

    #[test]
    fn test_session_merge_output() {
        let board = Board::from_rows([[1, 1, 0, 0], [0; 4], [0; 4], [0; 4]]);
        let mut game = BoardEngine::from_board(board, StdRng::seed_from_u64(0));
        let (summary, text) = session(&mut game, "h\n");
        assert_eq!(summary.score, 4);
        assert!(text.contains("[Absorbed]"));
        assert!(text.contains("(0,0) -> (0,0) 2 => 4 [Merge]"));
    }

    #[test]
    fn test_session_refuses_moves_after_game_over() {
        let stuck = Board::from_rows([[1, 2, 1, 2], [2, 1, 2, 1], [1, 2, 1, 2], [2, 1, 2, 1]]);
        let mut game = BoardEngine::from_board(stuck, StdRng::seed_from_u64(0));
        let (summary, text) = session(&mut game, "left\nbogus\nr\n");
        assert!(text.contains("game over; r to restart"));
        assert!(text.contains("unknown command 'bogus'"));
        assert_eq!(summary.restarts, 1);
        assert_eq!(summary.moves, 0);
        assert!(!summary.game_over);
        assert_eq!(game.board().count_empty(), 14);
    }
}
