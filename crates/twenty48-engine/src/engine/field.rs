use log::{debug, trace};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::ops::{self, Commit};
use super::state::{Board, Move, SpawnedTile, Tile, TileMovement};

/// Lifecycle of a [`BoardEngine`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    /// Fresh or reset: empty board, score 0, waiting for the seed spawn.
    Uninitialized,
    /// Seeded and accepting moves.
    Active,
    /// No direction moves any tile; moves are ignored until `reset`.
    Failed,
}

/// Everything a presentation layer needs after one player move.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Turn {
    pub movements: Vec<TileMovement>,
    pub spawned: Vec<SpawnedTile>,
    pub score_delta: u64,
    pub score: u64,
    pub game_over: bool,
}

/// Authoritative 2048 game: owns the board, the score and the RNG stream
/// used for spawns.
///
/// ```
/// use twenty48_engine::engine::{BoardEngine, EngineState, Move};
/// let mut game = BoardEngine::with_seed(7);
/// assert_eq!(game.spawn_new_tiles().len(), 2);
/// assert_eq!(game.state(), EngineState::Active);
/// let before = game.score();
/// let _moves = game.request_move(Move::Left);
/// assert!(game.score() >= before);
/// ```
#[derive(Debug, Clone)]
pub struct BoardEngine<R: Rng = StdRng> {
    board: Board,
    score: u64,
    initialized: bool,
    rng: R,
}

impl BoardEngine<StdRng> {
    /// Engine with an entropy-seeded RNG.
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    /// Engine whose spawns are reproducible for a given seed.
    pub fn with_seed(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }
}

impl Default for BoardEngine<StdRng> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Rng> BoardEngine<R> {
    pub fn with_rng(rng: R) -> Self {
        Self {
            board: Board::EMPTY,
            score: 0,
            initialized: false,
            rng,
        }
    }

    /// Resume from an existing position. A non-empty board counts as already seeded.
    pub fn from_board(board: Board, rng: R) -> Self {
        Self {
            initialized: !board.is_empty(),
            board,
            score: 0,
            rng,
        }
    }

    #[inline]
    pub fn board(&self) -> &Board {
        &self.board
    }

    #[inline]
    pub fn score(&self) -> u64 {
        self.score
    }

    #[inline]
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn state(&self) -> EngineState {
        if !self.initialized {
            EngineState::Uninitialized
        } else if self.is_game_over() {
            EngineState::Failed
        } else {
            EngineState::Active
        }
    }

    /// Place the start-of-game pair on an uninitialized board, otherwise one tile.
    ///
    /// Each tile is a 2 (90%) or a 4 (10%) on a uniformly chosen empty cell.
    /// A full board yields no tiles.
    pub fn spawn_new_tiles(&mut self) -> Vec<SpawnedTile> {
        let wanted = if self.initialized { 1 } else { 2 };
        self.initialized = true;

        let mut spawned = Vec::with_capacity(wanted);
        for _ in 0..wanted {
            let empty = self.board.empty_cells();
            if empty.is_empty() {
                break;
            }
            let (x, y) = empty[self.rng.gen_range(0..empty.len())];
            let tile = random_tile(&mut self.rng);
            self.board.set_tile(x, y, tile);
            spawned.push(SpawnedTile { x, y, tile });
        }
        debug!("spawned {} tile(s): {:?}", spawned.len(), spawned);
        spawned
    }

    /// Slide/merge the real board in `direction`, add merge points to the
    /// score and return what moved. An empty result means nothing changed.
    pub fn request_move(&mut self, direction: Move) -> Vec<TileMovement> {
        if direction == Move::None || !self.initialized {
            return Vec::new();
        }
        let sim = ops::simulate(&self.board, direction, Commit::Apply);
        if !sim.moved() {
            trace!("move {direction} is a no-op");
            return Vec::new();
        }
        self.board = sim.board;
        self.score = self.score.saturating_add(sim.score_delta);
        debug!(
            "move {direction}: {} record(s), +{} (score {})",
            sim.movements.len(),
            sim.score_delta,
            self.score
        );
        for m in &sim.movements {
            trace!("{m:?}");
        }
        sim.movements
    }

    /// Speculative result of `direction` as `(board, score_delta)`; the engine is untouched.
    pub fn preview(&self, direction: Move) -> (Board, u64) {
        let sim = ops::simulate(&self.board, direction, Commit::Apply);
        (sim.board, sim.score_delta)
    }

    /// True when no direction would move any tile.
    pub fn is_game_over(&self) -> bool {
        ops::is_game_over(&self.board)
    }

    /// Legal-move mask in `Move::ALL` order.
    pub fn legal_moves(&self) -> [bool; 4] {
        ops::legal_moves(&self.board)
    }

    /// One full turn: move, then spawn and re-check for game over if anything moved.
    ///
    /// Returns `None` when the move changed nothing (no spawn happens).
    pub fn step(&mut self, direction: Move) -> Option<Turn> {
        let before = self.score;
        let movements = self.request_move(direction);
        if movements.is_empty() {
            return None;
        }
        let spawned = self.spawn_new_tiles();
        let game_over = self.is_game_over();
        if game_over {
            debug!("game over with score {}", self.score);
        }
        Some(Turn {
            movements,
            spawned,
            score_delta: self.score - before,
            score: self.score,
            game_over,
        })
    }

    /// Clear the board and score, back to `Uninitialized`.
    pub fn reset(&mut self) {
        self.board = Board::EMPTY;
        self.score = 0;
        self.initialized = false;
    }

    /// Restart flow: reset, then place the opening pair.
    pub fn start(&mut self) -> Vec<SpawnedTile> {
        self.reset();
        self.spawn_new_tiles()
    }
}

fn random_tile<R: Rng + ?Sized>(rng: &mut R) -> Tile {
    if rng.gen_range(0..10) < 9 { Tile::T2 } else { Tile::T4 }
}
