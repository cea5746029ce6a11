use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use twenty48_engine::engine::Move;

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Deserialize, Default)]
pub enum StrategyKind {
    /// Uniform over legal moves.
    Random,
    /// Largest immediate score gain, ties broken by empty cells left.
    Greedy,
    /// First legal move from a fixed preference order.
    #[default]
    Corner,
}

#[derive(Clone, Debug, PartialEq, serde::Deserialize, Default)]
pub struct StrategyConfig {
    #[serde(default)]
    pub kind: StrategyKind,

    /// Preference order for `Corner`. Defaults to Down, Left, Right, Up.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<Vec<Move>>,
}

impl StrategyConfig {
    pub fn order_or_default(&self) -> Vec<Move> {
        self.order.clone().unwrap_or_else(defaults::corner_order)
    }
}

#[derive(Clone, Debug, PartialEq, serde::Deserialize, Default)]
pub struct Report {
    /// JSON-lines output, one object per game. Stdout when absent.
    #[serde(default)]
    pub results_file: Option<PathBuf>,
}

#[derive(Clone, Debug, PartialEq, serde::Deserialize)]
pub struct Config {
    pub num_games: u32,

    /// Game `i` is seeded with `base_seed + i`.
    #[serde(default)]
    pub base_seed: u64,

    /// Safety cap on moves per game.
    #[serde(default = "defaults::max_moves")]
    pub max_moves: u64,

    /// Rayon pool size; the global pool when absent.
    #[serde(default)]
    pub workers: Option<usize>,

    #[serde(default)]
    pub strategy: StrategyConfig,

    #[serde(default)]
    pub report: Report,
}

impl Config {
    pub fn from_toml<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        Self::from_toml_str(&contents)
            .with_context(|| format!("invalid config {}", path.display()))
    }

    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let cfg: Self = toml::from_str(contents)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<()> {
        if self.num_games == 0 {
            bail!("num_games must be at least 1");
        }
        if self.max_moves == 0 {
            bail!("max_moves must be at least 1");
        }
        if self.workers == Some(0) {
            bail!("workers must be at least 1 when set");
        }
        if let Some(order) = &self.strategy.order {
            if order.is_empty() {
                bail!("strategy.order must list at least one direction");
            }
            if order.contains(&Move::None) {
                bail!("strategy.order may not contain None");
            }
        }
        Ok(())
    }
}

mod defaults {
    use twenty48_engine::engine::Move;

    pub fn max_moves() -> u64 { 100_000 }
    pub fn corner_order() -> Vec<Move> { vec![Move::Down, Move::Left, Move::Right, Move::Up] }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn it_parses_minimal_config() {
        let cfg = Config::from_toml_str("num_games = 3").unwrap();
        assert_eq!(cfg.num_games, 3);
        assert_eq!(cfg.base_seed, 0);
        assert_eq!(cfg.max_moves, 100_000);
        assert_eq!(cfg.strategy.kind, StrategyKind::Corner);
        assert_eq!(cfg.strategy.order_or_default()[0], Move::Down);
        assert!(cfg.report.results_file.is_none());
    }

    #[test]
    fn it_parses_full_config() {
        let cfg = Config::from_toml_str(
            r#"
            num_games = 10
            base_seed = 77
            max_moves = 500
            workers = 2

            [strategy]
            kind = "Corner"
            order = ["Left", "Up"]

            [report]
            results_file = "out.jsonl"
            "#,
        )
        .unwrap();
        assert_eq!(cfg.workers, Some(2));
        assert_eq!(cfg.strategy.order_or_default(), vec![Move::Left, Move::Up]);
        assert_eq!(cfg.report.results_file, Some(PathBuf::from("out.jsonl")));
    }

    #[test]
    fn it_rejects_bad_values() {
        assert!(Config::from_toml_str("num_games = 0").is_err());
        assert!(Config::from_toml_str("num_games = 1\nworkers = 0").is_err());
        assert!(Config::from_toml_str("num_games = 1\n[strategy]\norder = []").is_err());
        assert!(Config::from_toml_str("num_games = 1\n[strategy]\norder = [\"None\"]").is_err());
        assert!(Config::from_toml_str("num_games = 1\n[strategy]\nkind = \"Psychic\"").is_err());
    }
}
