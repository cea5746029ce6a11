use super::state::{Board, Move, MovementKind, SIZE, Tile, TileMovement, line_coords};

/// Whether a simulation writes its result into the returned board.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Commit {
    /// Build the post-move board.
    Apply,
    /// Read-only probe: lines collapse on scratch copies and the returned
    /// board is the input, unchanged.
    DryRun,
}

/// Result of running one move over all four lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Simulation {
    pub board: Board,
    pub movements: Vec<TileMovement>,
    pub score_delta: u64,
}

impl Simulation {
    #[inline]
    pub fn moved(&self) -> bool {
        !self.movements.is_empty()
    }
}

/// A movement expressed in positions along one line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct LineMovement {
    pub from: usize,
    pub to: usize,
    pub old_tile: Tile,
    pub new_tile: Tile,
    pub kind: MovementKind,
}

/// Slide/merge every line of `board` in `dir`.
///
/// This is the only place move semantics live: committed moves, previews and
/// game-over probes all come through here.
pub fn simulate(board: &Board, dir: Move, commit: Commit) -> Simulation {
    let mut out = Simulation {
        board: *board,
        movements: Vec::new(),
        score_delta: 0,
    };
    if dir == Move::None {
        return out;
    }
    let reversed = dir.is_reversed();
    let mut line_moves = Vec::with_capacity(SIZE * 2);
    for index in 0..SIZE {
        let mut line = board.line(index, dir);
        line_moves.clear();
        collapse_line(&mut line, reversed, &mut line_moves);
        if line_moves.is_empty() {
            continue;
        }
        out.movements.extend(line_moves.iter().map(|m| {
            let (from_x, from_y) = line_coords(index, m.from, dir);
            let (to_x, to_y) = line_coords(index, m.to, dir);
            TileMovement {
                from_x,
                from_y,
                to_x,
                to_y,
                old_tile: m.old_tile,
                new_tile: m.new_tile,
                kind: m.kind,
            }
        }));
        if commit == Commit::Apply {
            out.board.write_line(index, dir, &line);
        }
    }
    out.score_delta = score_movements(&out.movements);
    out
}

/// Collapse one line toward its leading edge (index 0, or index 3 when
/// `reversed`), recording each relocation in scan order.
///
/// A cell produced by a merge during this pass never merges again.
pub(crate) fn collapse_line(
    line: &mut [Tile; SIZE],
    reversed: bool,
    out: &mut Vec<LineMovement>,
) {
    let at = |pos: usize| if reversed { SIZE - 1 - pos } else { pos };
    let mut merged = [false; SIZE];

    for pos in 1..SIZE {
        let origin = at(pos);
        let tile = line[origin];
        if tile.is_empty() {
            continue;
        }

        let mut dest = pos;
        let mut is_merge = false;
        for probe in (0..pos).rev() {
            let cell = line[at(probe)];
            if cell.is_empty() {
                dest = probe;
                continue;
            }
            if cell == tile && !merged[at(probe)] {
                dest = probe;
                is_merge = true;
            }
            break;
        }
        if dest == pos {
            continue;
        }

        let target = at(dest);
        line[origin] = Tile::EMPTY;
        if is_merge {
            let upgraded = tile.upgraded();
            line[target] = upgraded;
            merged[target] = true;
            out.push(LineMovement {
                from: origin,
                to: target,
                old_tile: tile,
                new_tile: tile,
                kind: MovementKind::Absorbed,
            });
            out.push(LineMovement {
                from: target,
                to: target,
                old_tile: tile,
                new_tile: upgraded,
                kind: MovementKind::Merge,
            });
        } else {
            line[target] = tile;
            out.push(LineMovement {
                from: origin,
                to: target,
                old_tile: tile,
                new_tile: tile,
                kind: MovementKind::Slide,
            });
        }
    }
}

/// Score earned by a set of movements.
///
/// Records are first reduced to one per destination cell (an absorbed tile and
/// its merge result share a cell); each remaining merge adds `2^new_rank`.
pub fn score_movements(movements: &[TileMovement]) -> u64 {
    let mut by_cell: [[Option<TileMovement>; SIZE]; SIZE] = [[None; SIZE]; SIZE];
    for m in movements {
        let slot = &mut by_cell[m.to_y][m.to_x];
        if !matches!(slot, Some(prev) if prev.is_merge()) {
            *slot = Some(*m);
        }
    }
    by_cell
        .iter()
        .flatten()
        .flatten()
        .filter(|m| m.is_merge() && !m.old_tile.is_empty())
        .fold(0u64, |acc, m| acc.saturating_add(m.new_tile.value()))
}

/// Slide/merge tiles in the given direction. No randomness.
pub fn shift(board: Board, dir: Move) -> Board {
    simulate(&board, dir, Commit::Apply).board
}

/// True if moving in `dir` would relocate at least one tile.
pub fn can_move(board: &Board, dir: Move) -> bool {
    simulate(board, dir, Commit::DryRun).moved()
}

/// Legal-move mask in `Move::ALL` order.
pub fn legal_moves(board: &Board) -> [bool; 4] {
    Move::ALL.map(|dir| can_move(board, dir))
}

/// True if no move in any direction changes the board.
pub fn is_game_over(board: &Board) -> bool {
    !Move::ALL.iter().any(|&dir| can_move(board, dir))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collapse(ranks: [u8; 4], reversed: bool) -> ([u8; 4], Vec<LineMovement>) {
        let mut line = ranks.map(Tile::from_rank);
        let mut moves = Vec::new();
        collapse_line(&mut line, reversed, &mut moves);
        (line.map(Tile::rank), moves)
    }

    fn row(ranks: [u8; 4]) -> Board {
        Board::from_rows([ranks, [0; 4], [0; 4], [0; 4]])
    }

    #[test]
    fn it_collapse_left() {
        assert_eq!(collapse([0, 0, 0, 0], false).0, [0, 0, 0, 0]);
        assert_eq!(collapse([1, 2, 1, 2], false).0, [1, 2, 1, 2]);
        assert_eq!(collapse([1, 1, 2, 2], false).0, [2, 3, 0, 0]);
        assert_eq!(collapse([1, 0, 0, 1], false).0, [2, 0, 0, 0]);
        assert_eq!(collapse([1, 3, 3, 2], false).0, [1, 4, 2, 0]);
        assert_eq!(collapse([1, 0, 0, 2], false).0, [1, 2, 0, 0]);
        assert_eq!(collapse([2, 1, 1, 0], false).0, [2, 2, 0, 0]);
    }

    #[test]
    fn it_collapse_right() {
        assert_eq!(collapse([0, 0, 0, 0], true).0, [0, 0, 0, 0]);
        assert_eq!(collapse([1, 2, 1, 2], true).0, [1, 2, 1, 2]);
        assert_eq!(collapse([1, 1, 2, 2], true).0, [0, 0, 2, 3]);
        assert_eq!(collapse([5, 0, 0, 5], true).0, [0, 0, 0, 6]);
        assert_eq!(collapse([0, 2, 2, 2], true).0, [0, 0, 2, 3]);
        assert_eq!(collapse([1, 3, 3, 2], true).0, [0, 1, 4, 2]);
    }

    #[test]
    fn it_merges_once_per_pass() {
        let (line, moves) = collapse([1, 1, 1, 1], false);
        assert_eq!(line, [2, 2, 0, 0]);
        let merges: Vec<_> = moves.iter().filter(|m| m.kind == MovementKind::Merge).collect();
        assert_eq!(merges.len(), 2);
        assert_eq!(merges[0].to, 0);
        assert_eq!(merges[1].to, 1);

        // A merge product of rank 2 must not swallow the trailing 2.
        assert_eq!(collapse([1, 1, 2, 0], false).0, [2, 2, 0, 0]);
    }

    #[test]
    fn it_records_merge_as_absorbed_then_result() {
        let (_, moves) = collapse([1, 0, 1, 0], false);
        assert_eq!(
            moves,
            vec![
                LineMovement {
                    from: 2,
                    to: 0,
                    old_tile: Tile::T2,
                    new_tile: Tile::T2,
                    kind: MovementKind::Absorbed,
                },
                LineMovement {
                    from: 0,
                    to: 0,
                    old_tile: Tile::T2,
                    new_tile: Tile::T4,
                    kind: MovementKind::Merge,
                },
            ]
        );
    }

    #[test]
    fn it_cascades_slide_distances() {
        let (line, moves) = collapse([0, 1, 0, 2], false);
        assert_eq!(line, [1, 2, 0, 0]);
        assert_eq!(moves.len(), 2);
        assert_eq!((moves[0].from, moves[0].to), (1, 0));
        assert_eq!((moves[1].from, moves[1].to), (3, 1));
    }

    #[test]
    fn test_move_left() {
        let b = Board::from_rows([[1, 2, 3, 4], [1, 3, 3, 2], [2, 0, 0, 2], [1, 0, 0, 2]]);
        let expected = Board::from_rows([[1, 2, 3, 4], [1, 4, 2, 0], [3, 0, 0, 0], [1, 2, 0, 0]]);
        assert_eq!(shift(b, Move::Left), expected);
    }

    #[test]
    fn test_move_right() {
        let b = Board::from_rows([[1, 2, 3, 4], [1, 3, 3, 2], [2, 0, 0, 2], [1, 0, 0, 2]]);
        let expected = Board::from_rows([[1, 2, 3, 4], [0, 1, 4, 2], [0, 0, 0, 3], [0, 0, 1, 2]]);
        assert_eq!(shift(b, Move::Right), expected);
    }

    #[test]
    fn test_move_up() {
        let b = Board::from_rows([[1, 1, 2, 1], [2, 3, 0, 0], [3, 3, 0, 0], [4, 2, 2, 2]]);
        let expected = Board::from_rows([[1, 1, 3, 1], [2, 4, 0, 2], [3, 2, 0, 0], [4, 0, 0, 0]]);
        assert_eq!(shift(b, Move::Up), expected);
    }

    #[test]
    fn test_move_down() {
        let b = Board::from_rows([[1, 1, 2, 1], [2, 3, 0, 0], [3, 3, 0, 0], [4, 2, 2, 2]]);
        let expected = Board::from_rows([[1, 0, 0, 0], [2, 1, 0, 0], [3, 4, 0, 1], [4, 2, 3, 2]]);
        assert_eq!(shift(b, Move::Down), expected);
    }

    #[test]
    fn it_maps_vertical_coordinates() {
        let mut b = Board::EMPTY;
        b.set_tile(2, 0, Tile::T8);
        let sim = simulate(&b, Move::Down, Commit::Apply);
        assert_eq!(sim.movements.len(), 1);
        let m = sim.movements[0];
        assert_eq!((m.from_x, m.from_y, m.to_x, m.to_y), (2, 0, 2, 3));
        assert_eq!(sim.board.tile(2, 3), Some(Tile::T8));
    }

    #[test]
    fn it_dry_run_leaves_board() {
        let b = row([1, 1, 0, 0]);
        let sim = simulate(&b, Move::Right, Commit::DryRun);
        assert!(sim.moved());
        assert_eq!(sim.board, b);
        assert_eq!(sim.score_delta, 4);
    }

    #[test]
    fn it_none_direction_is_inert() {
        let b = row([1, 1, 0, 0]);
        let sim = simulate(&b, Move::None, Commit::Apply);
        assert!(!sim.moved());
        assert_eq!(sim.board, b);
    }

    #[test]
    fn it_scores_merges_only() {
        assert_eq!(simulate(&row([1, 1, 1, 1]), Move::Left, Commit::Apply).score_delta, 8);
        assert_eq!(simulate(&row([0, 3, 0, 3]), Move::Left, Commit::Apply).score_delta, 16);
        assert_eq!(simulate(&row([0, 1, 0, 2]), Move::Left, Commit::Apply).score_delta, 0);
    }

    #[test]
    fn it_merges_huge_ranks_without_overflow() {
        let sim = simulate(&row([63, 63, 63, 63]), Move::Left, Commit::Apply);
        assert_eq!(sim.board.rows()[0].map(Tile::rank), [64, 64, 0, 0]);
        assert_eq!(sim.score_delta, u64::MAX);

        let sim = simulate(&row([255, 255, 0, 0]), Move::Left, Commit::Apply);
        assert_eq!(sim.board.rows()[0].map(Tile::rank), [255, 0, 0, 0]);
        assert!(sim.movements.iter().any(|m| m.kind == MovementKind::Merge));
        assert_eq!(sim.score_delta, u64::MAX);
    }

    #[test]
    fn it_detects_game_over() {
        let stuck = Board::from_rows([[1, 2, 1, 2], [2, 1, 2, 1], [1, 2, 1, 2], [2, 1, 2, 1]]);
        assert!(is_game_over(&stuck));
        assert_eq!(legal_moves(&stuck), [false; 4]);

        let mergeable = Board::from_rows([[1, 2, 1, 2], [2, 1, 2, 1], [1, 2, 1, 2], [2, 1, 3, 3]]);
        assert!(!is_game_over(&mergeable));
        assert_eq!(legal_moves(&mergeable), [false, false, true, true]);

        assert!(is_game_over(&Board::EMPTY));
    }
}
