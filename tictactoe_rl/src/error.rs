use thiserror::Error;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameError {
    #[error("illegal move: position {position} is not an empty cell")]
    IllegalMove { position: usize },

    #[error("cannot sample a legal move: board is full")]
    BoardFull,
}

pub type Result<T> = std::result::Result<T, GameError>;
