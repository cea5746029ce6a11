//! Rule engine for the 2048 sliding-tile puzzle on a fixed 4x4 grid.
//!
//! The engine never draws or reads input: it takes a [`engine::Move`] and
//! hands back the tile movements and spawns a presentation layer animates.

pub mod engine;

pub use engine::{Board, BoardEngine, EngineState, Move, SpawnedTile, Tile, TileMovement, Turn};
