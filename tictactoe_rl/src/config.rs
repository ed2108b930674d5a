use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

pub const NUM_GAMES: usize = 100;

/// Rewards handed to strategies through `update` and returned by `step`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Rewards {
    pub win: i32,
    pub loss: i32,
    /// Passed to a strategy that plays an illegal move in [`crate::Game::play`].
    pub illegal_play: i32,
    /// Returned by [`crate::Game::step`] when the move is illegal.
    pub illegal_step: i32,
}

impl Default for Rewards {
    fn default() -> Self {
        Rewards {
            win: 1,
            loss: -1,
            illegal_play: -100,
            illegal_step: -1,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub rewards: Rewards,
    /// Seeds the environment RNG; `None` draws from entropy.
    pub seed: Option<u64>,
    pub games: usize,
}

impl Default for GameConfig {
    fn default() -> Self {
        GameConfig {
            rewards: Rewards::default(),
            seed: None,
            games: NUM_GAMES,
        }
    }
}

impl GameConfig {
    pub fn from_json_file(path: &Path) -> Result<GameConfig, anyhow::Error> {
        let file = File::open(path)
            .with_context(|| format!("opening config {}", path.display()))?;
        let config = serde_json::from_reader(BufReader::new(file))
            .with_context(|| format!("parsing config {}", path.display()))?;
        Ok(config)
    }
}
