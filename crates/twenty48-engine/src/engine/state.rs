use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Side length of the square board.
pub const SIZE: usize = 4;

/// A tile stored as its rank: 0 is "no tile", rank `r >= 1` displays `2^r`.
///
/// Ranks are totally ordered and a merge always yields exactly `rank + 1`.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Tile(u8);

impl Tile {
    pub const EMPTY: Tile = Tile(0);
    pub const T2: Tile = Tile(1);
    pub const T4: Tile = Tile(2);
    pub const T8: Tile = Tile(3);
    pub const T16: Tile = Tile(4);
    pub const T32: Tile = Tile(5);
    pub const T64: Tile = Tile(6);
    pub const T128: Tile = Tile(7);
    pub const T256: Tile = Tile(8);
    pub const T512: Tile = Tile(9);
    pub const T1024: Tile = Tile(10);
    pub const T2048: Tile = Tile(11);
    pub const T4096: Tile = Tile(12);
    pub const T8192: Tile = Tile(13);

    /// Construct a tile directly from its rank.
    #[inline]
    pub const fn from_rank(rank: u8) -> Self {
        Tile(rank)
    }

    /// Construct a tile from its displayed value (`0` for empty).
    ///
    /// Returns `None` for values that are not zero or a power of two >= 2.
    ///
    /// ```
    /// use twenty48_engine::engine::Tile;
    /// assert_eq!(Tile::from_value(2048), Some(Tile::T2048));
    /// assert_eq!(Tile::from_value(0), Some(Tile::EMPTY));
    /// assert_eq!(Tile::from_value(6), None);
    /// ```
    pub fn from_value(value: u64) -> Option<Self> {
        match value {
            0 => Some(Tile::EMPTY),
            1 => None,
            v if v.is_power_of_two() => Some(Tile(v.trailing_zeros() as u8)),
            _ => None,
        }
    }

    #[inline]
    pub const fn rank(self) -> u8 {
        self.0
    }

    #[inline]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Displayed value of the tile, 0 when empty. Ranks of 64 and above
    /// do not fit a `u64` and report `u64::MAX`.
    #[inline]
    pub fn value(self) -> u64 {
        if self.0 == 0 { 0 } else { 1u64.checked_shl(self.0 as u32).unwrap_or(u64::MAX) }
    }

    /// The tile produced by merging two tiles of this rank. Rank 255 stays at 255.
    #[inline]
    pub const fn upgraded(self) -> Self {
        Tile(self.0.saturating_add(1))
    }
}

impl fmt::Debug for Tile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            write!(f, "Tile(empty)")
        } else {
            write!(f, "Tile({})", self.value())
        }
    }
}

impl fmt::Display for Tile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value())
    }
}

/// A directional move request. `None` is accepted and does nothing.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Move {
    Up,
    Down,
    Left,
    Right,
    None,
}

impl Move {
    /// The four real directions, in the order used by legal-move masks.
    pub const ALL: [Move; 4] = [Move::Up, Move::Down, Move::Left, Move::Right];

    /// True when tiles travel toward index 3 of their line.
    #[inline]
    pub(crate) fn is_reversed(self) -> bool {
        matches!(self, Move::Right | Move::Down)
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Move::Up => "up",
            Move::Down => "down",
            Move::Left => "left",
            Move::Right => "right",
            Move::None => "none",
        };
        f.write_str(name)
    }
}

/// Error returned when text does not name a direction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseMoveError(String);

impl fmt::Display for ParseMoveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown move '{}'", self.0)
    }
}

impl std::error::Error for ParseMoveError {}

impl FromStr for Move {
    type Err = ParseMoveError;

    /// Accepts full names plus the usual WASD / vi-key shorthands.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "up" | "w" | "k" => Ok(Move::Up),
            "down" | "s" | "j" => Ok(Move::Down),
            "left" | "a" | "h" => Ok(Move::Left),
            "right" | "d" | "l" => Ok(Move::Right),
            "none" | "" => Ok(Move::None),
            other => Err(ParseMoveError(other.to_string())),
        }
    }
}

/// What a movement record means for the cell it arrives at.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum MovementKind {
    /// Plain slide into an empty cell.
    Slide,
    /// Tile travels onto an equal tile and disappears on arrival.
    Absorbed,
    /// The upgraded tile left at the merge target (`from == to`).
    Merge,
}

/// One physical tile relocation resulting from a move.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct TileMovement {
    pub from_x: usize,
    pub from_y: usize,
    pub to_x: usize,
    pub to_y: usize,
    /// Rank shown while the tile animates.
    pub old_tile: Tile,
    /// Rank the destination cell holds once the animation completes.
    pub new_tile: Tile,
    pub kind: MovementKind,
}

impl TileMovement {
    #[inline]
    pub fn is_merge(&self) -> bool {
        self.kind == MovementKind::Merge
    }

    #[inline]
    pub fn destination(&self) -> (usize, usize) {
        (self.to_x, self.to_y)
    }
}

/// A tile placed by a spawn.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct SpawnedTile {
    pub x: usize,
    pub y: usize,
    pub tile: Tile,
}

/// 4x4 grid of tiles, row-major; `cells[y][x]` with x = column, y = row.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Board {
    cells: [[Tile; SIZE]; SIZE],
}

impl Board {
    /// A constant empty board.
    pub const EMPTY: Board = Board {
        cells: [[Tile::EMPTY; SIZE]; SIZE],
    };

    /// Build a board from rows of ranks (not values).
    ///
    /// ```
    /// use twenty48_engine::engine::{Board, Tile};
    /// let b = Board::from_rows([[1, 0, 0, 0], [0; 4], [0; 4], [0, 0, 0, 11]]);
    /// assert_eq!(b.tile(0, 0), Some(Tile::T2));
    /// assert_eq!(b.tile(3, 3), Some(Tile::T2048));
    /// ```
    pub fn from_rows(rows: [[u8; SIZE]; SIZE]) -> Self {
        let mut board = Board::EMPTY;
        for (y, row) in rows.iter().enumerate() {
            for (x, &rank) in row.iter().enumerate() {
                board.cells[y][x] = Tile::from_rank(rank);
            }
        }
        board
    }

    /// Tile at column `x`, row `y`; `None` when out of range.
    #[inline]
    pub fn tile(&self, x: usize, y: usize) -> Option<Tile> {
        self.cells.get(y).and_then(|row| row.get(x)).copied()
    }

    /// Overwrite the cell at column `x`, row `y`. Out-of-range coordinates are ignored.
    #[inline]
    pub fn set_tile(&mut self, x: usize, y: usize, tile: Tile) {
        if let Some(cell) = self.cells.get_mut(y).and_then(|row| row.get_mut(x)) {
            *cell = tile;
        }
    }

    #[inline]
    pub fn rows(&self) -> [[Tile; SIZE]; SIZE] {
        self.cells
    }

    /// Iterate over tiles in row-major order.
    #[inline]
    pub fn tiles(&self) -> impl Iterator<Item = Tile> + '_ {
        self.cells.iter().flatten().copied()
    }

    /// Coordinates `(x, y)` of every empty cell in row-major order.
    pub fn empty_cells(&self) -> Vec<(usize, usize)> {
        let mut out = Vec::with_capacity(SIZE * SIZE);
        for (y, row) in self.cells.iter().enumerate() {
            for (x, tile) in row.iter().enumerate() {
                if tile.is_empty() {
                    out.push((x, y));
                }
            }
        }
        out
    }

    /// Count the number of empty cells on the board.
    #[inline]
    pub fn count_empty(&self) -> usize {
        self.tiles().filter(|t| t.is_empty()).count()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.count_empty() == SIZE * SIZE
    }

    /// Highest tile present (`Tile::EMPTY` for an empty board).
    pub fn highest_tile(&self) -> Tile {
        self.tiles().max().unwrap_or(Tile::EMPTY)
    }

    /// Collect tile ranks into a row-major array.
    pub fn to_exponents(&self) -> [u8; SIZE * SIZE] {
        let mut out = [0u8; SIZE * SIZE];
        for (dst, tile) in out.iter_mut().zip(self.tiles()) {
            *dst = tile.rank();
        }
        out
    }

    /// Read line `index` (a row for horizontal moves, a column for vertical ones).
    pub(crate) fn line(&self, index: usize, dir: Move) -> [Tile; SIZE] {
        let mut line = [Tile::EMPTY; SIZE];
        for (pos, slot) in line.iter_mut().enumerate() {
            let (x, y) = line_coords(index, pos, dir);
            *slot = self.cells[y][x];
        }
        line
    }

    pub(crate) fn write_line(&mut self, index: usize, dir: Move, line: &[Tile; SIZE]) {
        for (pos, &tile) in line.iter().enumerate() {
            let (x, y) = line_coords(index, pos, dir);
            self.cells[y][x] = tile;
        }
    }
}

/// Map a position within line `index` to board coordinates `(x, y)`.
#[inline]
pub(crate) fn line_coords(index: usize, pos: usize, dir: Move) -> (usize, usize) {
    match dir {
        Move::Up | Move::Down => (index, pos),
        _ => (pos, index),
    }
}

fn format_val(tile: Tile) -> String {
    if tile.is_empty() {
        return String::from("       ");
    }
    let mut x = tile.value().to_string();
    while x.len() < 7 {
        match x.len() {
            6 => x = format!(" {x}"),
            _ => x = format!(" {x} "),
        }
    }
    x
}

impl fmt::Debug for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Board({:?})", self.to_exponents())
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (y, row) in self.cells.iter().enumerate() {
            if y > 0 {
                writeln!(f, "-------------------------------")?;
            }
            let cells: Vec<String> = row.iter().map(|&t| format_val(t)).collect();
            writeln!(f, "{}", cells.join("|"))?;
        }
        Ok(())
    }
}
