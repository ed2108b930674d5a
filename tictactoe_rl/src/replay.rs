use crate::board::GameResult;
use crate::position::{PlayedMove, Position};
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, Write};
use std::path::{Path, PathBuf};

/// Record of one game for later inspection.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Replay {
    pub recorded_at: DateTime<Local>,
    pub moves: Vec<PlayedMove>,
    /// X-perspective state after each move.
    pub states: Vec<usize>,
    pub result: GameResult,
}

impl Replay {
    pub fn from_position(position: &Position) -> Self {
        Replay {
            recorded_at: Local::now(),
            moves: position.moves().to_vec(),
            states: position.states().to_vec(),
            result: position.classify(),
        }
    }

    /// Writes the replay as `replay-<date>-<time>.json` under `dir`.
    pub fn to_disk(&self, dir: &Path) -> Result<PathBuf, anyhow::Error> {
        let stamp = self.recorded_at.format("%Y-%m-%d-%H%M%S%.3f");
        let filename = format!("replay-{}.json", stamp);
        let path: PathBuf = [dir, Path::new(&filename)].iter().collect();
        let mut file = File::create(&path)?;
        let data_json = serde_json::to_string_pretty(self)?;
        file.write_all(data_json.as_bytes())?;
        Ok(path)
    }

    pub fn from_disk(path: &Path) -> Result<Replay, anyhow::Error> {
        let file = File::open(path)?;
        let decoded: Replay = serde_json::from_reader(BufReader::new(file))?;
        Ok(decoded)
    }
}
