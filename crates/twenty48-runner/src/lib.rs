//! Headless presentation-layer driver for the 2048 engine: TOML-configured
//! batch autoplay and a line-oriented text game.

pub mod autoplay;
pub mod config;
pub mod play;
pub mod strategy;

pub use autoplay::{GameResult, Summary, play_game, run, summarize};
pub use config::Config;
pub use strategy::Strategy;
