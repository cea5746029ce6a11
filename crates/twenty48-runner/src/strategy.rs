use rand::Rng;
use rand::seq::SliceRandom;
use twenty48_engine::engine::{BoardEngine, Move};

use crate::config::{StrategyConfig, StrategyKind};

/// Move-selection policy for autoplay.
#[derive(Clone, Debug, PartialEq)]
pub enum Strategy {
    Random,
    Greedy,
    Corner(Vec<Move>),
}

impl Strategy {
    /// Build the policy named by `cfg`. The order is checked by
    /// [`Config::validate`](crate::config::Config::validate).
    pub fn from_config(cfg: &StrategyConfig) -> Self {
        match cfg.kind {
            StrategyKind::Random => Strategy::Random,
            StrategyKind::Greedy => Strategy::Greedy,
            StrategyKind::Corner => Strategy::Corner(cfg.order_or_default()),
        }
    }

    /// Pick a legal move for `game`, or `None` when the game is over.
    pub fn select<G: Rng, R: Rng + ?Sized>(
        &self,
        game: &BoardEngine<G>,
        rng: &mut R,
    ) -> Option<Move> {
        let legal = game.legal_moves();
        let candidates: Vec<Move> = Move::ALL
            .iter()
            .zip(legal)
            .filter_map(|(&m, ok)| ok.then_some(m))
            .collect();
        if candidates.is_empty() {
            return None;
        }
        match self {
            Strategy::Random => candidates.choose(rng).copied(),
            Strategy::Greedy => select_greedy(game, &candidates),
            Strategy::Corner(order) => order
                .iter()
                .copied()
                .find(|m| candidates.contains(m))
                .or_else(|| candidates.first().copied()),
        }
    }
}

fn select_greedy<G: Rng>(game: &BoardEngine<G>, candidates: &[Move]) -> Option<Move> {
    let mut best: Option<(Move, (u64, usize))> = None;
    for &m in candidates {
        let (after, delta) = game.preview(m);
        let key = (delta, after.count_empty());
        match best {
            Some((_, best_key)) if best_key >= key => {}
            _ => best = Some((m, key)),
        }
    }
    best.map(|(m, _)| m)
}
