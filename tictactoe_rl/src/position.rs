use crate::board::{Board, GameResult, Marks, ACTION_SPACE};
use crate::error::{GameError, Result};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::fmt;

/// One accepted move: who played it and where.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayedMove {
    pub mark: Marks,
    pub row: usize,
    pub col: usize,
}

/// The live board of one game together with its available set and history.
///
/// Strategies only ever see a shared reference; all writes go through
/// [`Position::make_move`], called by the environment.
#[derive(Debug, Clone)]
pub struct Position {
    board: Board,
    available: Vec<usize>,
    moves: Vec<PlayedMove>,
    states: Vec<usize>,
    rng: RefCell<StdRng>,
}

impl Position {
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Position {
            board: Board::new(),
            available: (0..ACTION_SPACE).collect(),
            moves: Vec::with_capacity(ACTION_SPACE),
            states: Vec::with_capacity(ACTION_SPACE),
            rng: RefCell::new(rng),
        }
    }

    /// Empties the board and history; the RNG stream carries on.
    pub fn reset(&mut self) {
        self.board = Board::new();
        self.available = (0..ACTION_SPACE).collect();
        self.moves.clear();
        self.states.clear();
    }

    pub fn board(&self) -> &Board {
        &self.board
    }
    pub fn available(&self) -> &[usize] {
        &self.available
    }
    pub fn moves(&self) -> &[PlayedMove] {
        &self.moves
    }
    /// X-perspective state after every accepted move.
    pub fn states(&self) -> &[usize] {
        &self.states
    }
    pub fn ply(&self) -> usize {
        self.moves.len()
    }

    pub fn state(&self, perspective: Marks) -> usize {
        self.board.encode(perspective)
    }

    pub fn classify(&self) -> GameResult {
        self.board.classify()
    }

    /// Writes `mark` at `mv` and records it. Returns whether the move
    /// completed a line for either side.
    pub fn make_move(&mut self, mv: usize, mark: Marks) -> Result<bool> {
        self.board.place(mv, mark)?;
        self.available.retain(|&cell| cell != mv);
        self.moves.push(PlayedMove {
            mark,
            row: mv / 3,
            col: mv % 3,
        });
        self.states.push(self.board.encode(Marks::Cross));
        let (x, o) = self.board.max_min();
        Ok(x == 3 || o == -3)
    }

    /// Uniform draw over the available set, or over every cell when
    /// `legal` is false (which may name an occupied cell).
    pub fn sample(&self, legal: bool) -> Result<usize> {
        let mut rng = self.rng.borrow_mut();
        if !legal {
            return Ok(rng.gen_range(0..ACTION_SPACE));
        }
        if self.available.is_empty() {
            return Err(GameError::BoardFull);
        }
        Ok(self.available[rng.gen_range(0..self.available.len())])
    }

    /// First empty cell in row-major order.
    pub fn sequential(&self) -> Result<usize> {
        self.board
            .empty_cells()
            .first()
            .copied()
            .ok_or(GameError::BoardFull)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "\n---( {} )--------------------------\n", self.ply())?;
        write!(f, "{}", self.board.draw())?;
        write!(
            f,
            "x state = {}, o state = {} available: {:?}",
            self.state(Marks::Cross),
            self.state(Marks::Nought),
            self.available
        )
    }
}
