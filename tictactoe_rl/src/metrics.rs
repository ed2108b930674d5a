use crate::board::Marks;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Win/loss/tie counters kept by each player.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Outcomes {
    pub wins: u32,
    pub losses: u32,
    pub ties: u32,
}

impl Outcomes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Scores a finished game for `own`. `winner` is `None` for a tie.
    pub fn record(&mut self, own: Marks, winner: Option<Marks>) {
        match winner {
            Some(mark) if mark == own => self.wins += 1,
            Some(_) => self.losses += 1,
            None => self.ties += 1,
        }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn games(&self) -> u32 {
        self.wins + self.losses + self.ties
    }
}

impl fmt::Display for Outcomes {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "w/l/t={}/{}/{}", self.wins, self.losses, self.ties)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn is_record_working() {
        let mut outcomes = Outcomes::new();
        outcomes.record(Marks::Nought, Some(Marks::Nought));
        outcomes.record(Marks::Nought, Some(Marks::Cross));
        outcomes.record(Marks::Nought, None);
        outcomes.record(Marks::Nought, None);
        assert_eq!(
            outcomes,
            Outcomes {
                wins: 1,
                losses: 1,
                ties: 2
            }
        );
        assert_eq!(outcomes.games(), 4);
        assert_eq!(outcomes.to_string(), "w/l/t=1/1/2");
        outcomes.reset();
        assert_eq!(outcomes, Outcomes::new());
    }
}
