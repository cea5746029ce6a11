//! Engine module: the 4x4 2048 board, the shared slide/merge simulation and
//! the stateful game that owns score and spawns.
//!
//! - `Board`, `Tile` and the movement/spawn records live in `state`.
//! - `ops` holds the single line-collapse routine; free functions mirror the
//!   methods when convenient (e.g., `shift`, `is_game_over`).
//! - `BoardEngine` in `field` drives a game for a presentation layer.

mod field;
pub mod ops;
pub mod state;

pub use field::{BoardEngine, EngineState, Turn};
pub use ops::{Commit, Simulation, can_move, is_game_over, legal_moves, shift, simulate};
pub use state::{Board, Move, MovementKind, ParseMoveError, SIZE, SpawnedTile, Tile, TileMovement};
