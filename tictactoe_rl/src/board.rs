use crate::error::{GameError, Result};
use itertools::Itertools;
use ndarray::prelude::*;
use serde::{Deserialize, Serialize};
use std::{
    fmt,
    ops::{Deref, DerefMut},
};

/// Number of distinct encoded states, 3^9.
pub const STATE_SPACE: usize = 19_683;
/// Number of cells a move can address.
pub const ACTION_SPACE: usize = 9;

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum Marks {
    Cross,
    Nought,
}

impl Marks {
    pub fn other(self) -> Self {
        match self {
            Self::Cross => Marks::Nought,
            Self::Nought => Marks::Cross,
        }
    }
    /// Cell value this mark writes: +1 for X, -1 for O.
    pub fn sign(self) -> i8 {
        match self {
            Self::Cross => 1,
            Self::Nought => -1,
        }
    }
    pub fn as_char(self) -> char {
        match self {
            Self::Cross => 'X',
            Self::Nought => 'O',
        }
    }
}

impl fmt::Display for Marks {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum GameResult {
    XWins,
    OWins,
    Draw,
    InProgress,
}

impl GameResult {
    pub fn is_terminal(self) -> bool {
        self != GameResult::InProgress
    }
    pub fn winner(self) -> Option<Marks> {
        match self {
            GameResult::XWins => Some(Marks::Cross),
            GameResult::OWins => Some(Marks::Nought),
            _ => None,
        }
    }
}

/// 3x3 grid of cell values in {-1, 0, 1}.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    pub cells: Array2<i8>,
}

impl Deref for Board {
    type Target = Array2<i8>;
    fn deref(&self) -> &Self::Target {
        &self.cells
    }
}

impl DerefMut for Board {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.cells
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.draw())
    }
}

impl Board {
    pub fn new() -> Self {
        Board {
            cells: Array2::zeros((3, 3)),
        }
    }

    pub fn from_rows(rows: [[i8; 3]; 3]) -> Self {
        let mut board = Board::new();
        for (row, values) in rows.iter().enumerate() {
            for (col, &value) in values.iter().enumerate() {
                board.cells[[row, col]] = value;
            }
        }
        board
    }

    /// Row and column addressed by a move, if it is on the board.
    pub fn coords(mv: usize) -> Option<(usize, usize)> {
        (mv < ACTION_SPACE).then(|| (mv / 3, mv % 3))
    }

    pub fn is_empty_at(&self, mv: usize) -> bool {
        Self::coords(mv).is_some_and(|(row, col)| self.cells[[row, col]] == 0)
    }

    /// Empty cells in row-major order.
    pub fn empty_cells(&self) -> Vec<usize> {
        (0..3)
            .cartesian_product(0..3)
            .filter(|&(row, col)| self.cells[[row, col]] == 0)
            .map(|(row, col)| row * 3 + col)
            .collect()
    }

    pub fn is_full(&self) -> bool {
        self.iter().all(|&cell| cell != 0)
    }

    /// Writes `mark` into an empty cell.
    pub fn place(&mut self, mv: usize, mark: Marks) -> Result<()> {
        if !self.is_empty_at(mv) {
            return Err(GameError::IllegalMove { position: mv });
        }
        self.cells[[mv / 3, mv % 3]] = mark.sign();
        Ok(())
    }

    /// Returns a copy of the board with `mark` written at `mv`.
    pub fn apply(&self, mv: usize, mark: Marks) -> Result<Board> {
        let mut next = self.clone();
        next.place(mv, mark)?;
        Ok(next)
    }

    /// Unchecked write used by search on its own scratch board.
    pub(crate) fn put(&mut self, mv: usize, mark: Marks) {
        self.cells[[mv / 3, mv % 3]] = mark.sign();
    }

    pub(crate) fn clear(&mut self, mv: usize) {
        self.cells[[mv / 3, mv % 3]] = 0;
    }

    /// Sums of the three rows, three columns, main and anti diagonal.
    pub fn line_sums(&self) -> [i8; 8] {
        let mut sums = [0_i8; 8];
        for (i, row) in self.rows().into_iter().enumerate() {
            sums[i] = row.sum();
        }
        for (i, column) in self.columns().into_iter().enumerate() {
            sums[3 + i] = column.sum();
        }
        sums[6] = self.diag().sum();
        sums[7] = self.slice(s![.., ..;-1]).diag().sum();
        sums
    }

    /// Largest and smallest line sum.
    pub fn max_min(&self) -> (i8, i8) {
        let sums = self.line_sums();
        let max = sums.iter().copied().max().unwrap_or(0);
        let min = sums.iter().copied().min().unwrap_or(0);
        (max, min)
    }

    pub fn completes_line(&self, mark: Marks) -> bool {
        self.line_sums().contains(&(3 * mark.sign()))
    }

    /// Lines holding exactly two of `mark` and an empty cell.
    pub fn count_threats(&self, mark: Marks) -> usize {
        self.line_sums()
            .iter()
            .filter(|&&s| s == 2 * mark.sign())
            .count()
    }

    pub fn classify(&self) -> GameResult {
        let (max, min) = self.max_min();
        if max == 3 {
            GameResult::XWins
        } else if min == -3 {
            GameResult::OWins
        } else if self.is_full() {
            GameResult::Draw
        } else {
            GameResult::InProgress
        }
    }

    /// Base-3 index of the board seen from `perspective`.
    pub fn encode(&self, perspective: Marks) -> usize {
        let n = perspective.sign();
        self.indexed_iter()
            .map(|((row, col), &cell)| {
                (n * cell + 1) as usize * 3_usize.pow((row * 3 + col) as u32)
            })
            .sum()
    }

    /// Rebuilds the absolute board from the digits of `state`.
    pub fn decode(mut state: usize) -> Board {
        let mut board = Board::new();
        for mv in 0..ACTION_SPACE {
            board.cells[[mv / 3, mv % 3]] = (state % 3) as i8 - 1;
            state /= 3;
        }
        board
    }

    /// Fixed-width glyph grid; empty cells show their move index.
    pub fn draw(&self) -> String {
        let mut s = String::new();
        for row in 0..3 {
            for line in 0..3 {
                for col in 0..3 {
                    let glyph = match (self.cells[[row, col]], line) {
                        (1, 0) => "\\ /".to_owned(),
                        (1, 1) => " X ".to_owned(),
                        (1, _) => "/ \\".to_owned(),
                        (-1, 1) => "O O".to_owned(),
                        (-1, _) => "OOO".to_owned(),
                        (_, 1) => format!(" {} ", row * 3 + col),
                        _ => "   ".to_owned(),
                    };
                    s.push_str(&glyph);
                    s.push_str("   ");
                }
                s.push('\n');
            }
            s.push('\n');
        }
        s
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn is_classify_working() {
        let x_row = Board::from_rows([[1, 1, 1], [-1, -1, 0], [0, 0, 0]]);
        assert_eq!(x_row.classify(), GameResult::XWins);

        let o_column = Board::from_rows([[1, -1, 1], [0, -1, 1], [0, -1, 0]]);
        assert_eq!(o_column.classify(), GameResult::OWins);

        let anti_diagonal = Board::from_rows([[-1, -1, 1], [0, 1, 0], [1, 0, -1]]);
        assert_eq!(anti_diagonal.classify(), GameResult::XWins);

        let draw = Board::from_rows([[1, -1, 1], [1, -1, -1], [-1, 1, 1]]);
        assert_eq!(draw.classify(), GameResult::Draw);

        assert_eq!(Board::new().classify(), GameResult::InProgress);
    }

    #[test]
    fn win_on_full_board_beats_draw() {
        let board = Board::from_rows([[1, -1, 1], [-1, 1, -1], [-1, 1, 1]]);
        assert!(board.is_full());
        assert_eq!(board.classify(), GameResult::XWins);
    }

    #[test]
    fn line_sums_cover_rows_columns_diagonals() {
        let board = Board::from_rows([[1, 0, -1], [1, 1, 0], [0, -1, -1]]);
        assert_eq!(board.line_sums(), [0, 2, -2, 2, 0, -2, 1, 0]);
        assert_eq!(board.max_min(), (2, -2));
    }

    #[test]
    fn place_rejects_occupied_and_off_board_cells() {
        let mut board = Board::new();
        board.place(4, Marks::Cross).unwrap();
        assert_eq!(board[[1, 1]], 1);
        assert_eq!(
            board.place(4, Marks::Nought),
            Err(GameError::IllegalMove { position: 4 })
        );
        assert_eq!(
            board.place(9, Marks::Nought),
            Err(GameError::IllegalMove { position: 9 })
        );
        assert_eq!(board.empty_cells(), vec![0, 1, 2, 3, 5, 6, 7, 8]);
    }

    #[test]
    fn apply_leaves_original_untouched() {
        let board = Board::new();
        let next = board.apply(0, Marks::Nought).unwrap();
        assert_eq!(board, Board::new());
        assert_eq!(next[[0, 0]], -1);
    }

    #[test]
    fn encoding_of_empty_and_centre() {
        let mut board = Board::new();
        assert_eq!(board.encode(Marks::Cross), 9_841);
        assert_eq!(board.encode(Marks::Nought), 9_841);
        board.place(4, Marks::Cross).unwrap();
        assert_eq!(board.encode(Marks::Cross), 9_922);
        assert_eq!(board.encode(Marks::Nought), 9_760);
        assert_eq!(Board::decode(9_922), board);
    }

    #[test]
    fn decode_ignores_perspective() {
        let board = Board::from_rows([[1, 0, -1], [0, 1, 0], [0, 0, -1]]);
        let from_o = Board::decode(board.encode(Marks::Nought));
        assert_eq!(from_o.cells, -&board.cells);
    }

    #[test]
    fn count_threats_finds_forks() {
        let board = Board::from_rows([[1, 1, 0], [-1, 1, 0], [0, 0, -1]]);
        assert_eq!(board.count_threats(Marks::Cross), 2);
        assert_eq!(board.count_threats(Marks::Nought), 0);
    }

    #[test]
    fn is_draw_working() {
        let board = Board::from_rows([[1, 0, 0], [0, -1, 0], [0, 0, 0]]);
        let drawn = board.draw();
        let lines: Vec<&str> = drawn.lines().collect();
        let gap = "   ";
        assert_eq!(lines.len(), 12);
        assert_eq!(lines[0], format!("\\ /{gap}{gap}{gap}{gap}{gap}"));
        assert_eq!(lines[1], format!(" X {gap} 1 {gap} 2 {gap}"));
        assert_eq!(lines[2], format!("/ \\{gap}{gap}{gap}{gap}{gap}"));
        assert_eq!(lines[3], "");
        assert_eq!(lines[4], format!("{gap}{gap}OOO{gap}{gap}{gap}"));
        assert_eq!(lines[5], format!(" 3 {gap}O O{gap} 5 {gap}"));
        assert_eq!(lines[9], format!(" 6 {gap} 7 {gap} 8 {gap}"));
    }
}
