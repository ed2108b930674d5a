use crate::board::{Board, GameResult, Marks};
use crate::error::Result;
use crate::metrics::Outcomes;
use crate::position::Position;
use std::io::{self, BufRead, Stdout, StdinLock, Write};
use tracing::{debug, warn};

/// A decision-making agent seated at one side of the board.
///
/// Strategies read the position and return a move; they never write to the
/// board themselves. `Ok(None)` means the strategy has no move to offer.
pub trait Player {
    fn name(&self) -> &str;
    fn mark(&self) -> Marks;
    fn set_mark(&mut self, mark: Marks);
    fn outcomes(&self) -> &Outcomes;
    fn outcomes_mut(&mut self) -> &mut Outcomes;

    fn choose_move(&mut self, position: &Position, state: usize) -> Result<Option<usize>>;

    /// Called on every environment reset.
    fn reset(&mut self) {}

    fn update(&mut self, _position: &Position, _state: usize, _reward: i32, _done: bool) {}

    /// `winner` is `None` for a tie.
    fn record_outcome(&mut self, _position: &Position, winner: Option<Marks>) {
        let own = self.mark();
        self.outcomes_mut().record(own, winner);
    }

    fn reset_metrics(&mut self) {
        self.outcomes_mut().reset();
    }

    fn summary(&self) -> String {
        format!("{} {}", self.name(), self.outcomes())
    }
}

macro_rules! seat_accessors {
    () => {
        fn name(&self) -> &str {
            &self.name
        }
        fn mark(&self) -> Marks {
            self.mark
        }
        fn set_mark(&mut self, mark: Marks) {
            self.mark = mark;
        }
        fn outcomes(&self) -> &Outcomes {
            &self.outcomes
        }
        fn outcomes_mut(&mut self) -> &mut Outcomes {
            &mut self.outcomes
        }
    };
}

/// Empty cell where placing `mark` completes a line, first in row-major order.
pub fn winning_move(board: &Board, mark: Marks) -> Option<usize> {
    board.empty_cells().into_iter().find(|&mv| {
        board
            .apply(mv, mark)
            .is_ok_and(|next| next.completes_line(mark))
    })
}

/// Empty cell the opponent of `mark` would win on next turn.
pub fn blocking_move(board: &Board, mark: Marks) -> Option<usize> {
    winning_move(board, mark.other())
}

/// Empty cell where placing `mark` opens more than one two-in-a-row.
pub fn fork_move(board: &Board, mark: Marks) -> Option<usize> {
    board.empty_cells().into_iter().find(|&mv| {
        board
            .apply(mv, mark)
            .is_ok_and(|next| next.count_threats(mark) > 1)
    })
}

fn win_or_block(board: &Board, mark: Marks) -> Option<usize> {
    if let Some(mv) = winning_move(board, mark) {
        debug!(%mark, mv, "taking win");
        return Some(mv);
    }
    if let Some(mv) = blocking_move(board, mark) {
        debug!(%mark, mv, "blocking opponent");
        return Some(mv);
    }
    None
}

#[derive(Debug)]
pub struct EmptyPlayer {
    pub name: String,
    pub mark: Marks,
    outcomes: Outcomes,
}

impl EmptyPlayer {
    pub fn new() -> Self {
        EmptyPlayer {
            name: "EmptyPlayer".to_owned(),
            mark: Marks::Cross,
            outcomes: Outcomes::new(),
        }
    }
}

impl Player for EmptyPlayer {
    seat_accessors!();
    fn choose_move(&mut self, _position: &Position, _state: usize) -> Result<Option<usize>> {
        Ok(None)
    }
}

#[derive(Debug)]
pub struct RandomPlayer {
    pub name: String,
    pub mark: Marks,
    outcomes: Outcomes,
}

impl RandomPlayer {
    pub fn new() -> Self {
        RandomPlayer {
            name: "RandomPlayer".to_owned(),
            mark: Marks::Cross,
            outcomes: Outcomes::new(),
        }
    }
}

impl Player for RandomPlayer {
    seat_accessors!();
    fn choose_move(&mut self, position: &Position, _state: usize) -> Result<Option<usize>> {
        Ok(Some(position.sample(true)?))
    }
}

/// Takes an immediate win, else blocks an immediate loss, else plays randomly.
#[derive(Debug)]
pub struct PrettyGoodPlayer {
    pub name: String,
    pub mark: Marks,
    outcomes: Outcomes,
}

impl PrettyGoodPlayer {
    pub fn new() -> Self {
        PrettyGoodPlayer {
            name: "PrettyGoodPlayer".to_owned(),
            mark: Marks::Cross,
            outcomes: Outcomes::new(),
        }
    }
}

impl Player for PrettyGoodPlayer {
    seat_accessors!();
    fn choose_move(&mut self, position: &Position, _state: usize) -> Result<Option<usize>> {
        if let Some(mv) = win_or_block(position.board(), self.mark) {
            return Ok(Some(mv));
        }
        Ok(Some(position.sample(true)?))
    }
}

/// [`PrettyGoodPlayer`] plus creating its own forks and blocking the
/// opponent's, before falling back to a random move.
#[derive(Debug)]
pub struct VeryGoodPlayer {
    pub name: String,
    pub mark: Marks,
    outcomes: Outcomes,
}

impl VeryGoodPlayer {
    pub fn new() -> Self {
        VeryGoodPlayer {
            name: "VeryGoodPlayer".to_owned(),
            mark: Marks::Cross,
            outcomes: Outcomes::new(),
        }
    }
}

impl Player for VeryGoodPlayer {
    seat_accessors!();
    fn choose_move(&mut self, position: &Position, _state: usize) -> Result<Option<usize>> {
        let board = position.board();
        if let Some(mv) = win_or_block(board, self.mark) {
            return Ok(Some(mv));
        }
        if let Some(mv) = fork_move(board, self.mark) {
            debug!(mark = %self.mark, mv, "creating fork");
            return Ok(Some(mv));
        }
        if let Some(mv) = fork_move(board, self.mark.other()) {
            debug!(mark = %self.mark, mv, "blocking fork");
            return Ok(Some(mv));
        }
        Ok(Some(position.sample(true)?))
    }
}

/// Exhaustive game-tree search. Among equally scored moves the lowest
/// row-major index wins.
#[derive(Debug)]
pub struct MinimaxPlayer {
    pub name: String,
    pub mark: Marks,
    outcomes: Outcomes,
}

impl MinimaxPlayer {
    pub fn new() -> Self {
        MinimaxPlayer {
            name: "MinimaxPlayer".to_owned(),
            mark: Marks::Cross,
            outcomes: Outcomes::new(),
        }
    }

    pub fn best_move(&self, board: &Board) -> Option<usize> {
        let mut scratch = board.clone();
        let mut best: Option<(usize, i8)> = None;
        for mv in board.empty_cells() {
            scratch.put(mv, self.mark);
            let score = self.minimax(&mut scratch, false);
            scratch.clear(mv);
            if best.map_or(true, |(_, best_score)| score > best_score) {
                best = Some((mv, score));
            }
        }
        best.map(|(mv, _)| mv)
    }

    /// Score of `board` for this player, +3 win, -3 loss, 0 draw.
    pub fn minimax(&self, board: &mut Board, is_me: bool) -> i8 {
        let n = self.mark.sign();
        match board.classify() {
            GameResult::XWins => return 3 * n,
            GameResult::OWins => return -3 * n,
            GameResult::Draw => return 0,
            GameResult::InProgress => {}
        }
        let (mark, mut best) = if is_me {
            (self.mark, -4)
        } else {
            (self.mark.other(), 4)
        };
        for mv in board.empty_cells() {
            board.put(mv, mark);
            let score = self.minimax(board, !is_me);
            board.clear(mv);
            best = if is_me { best.max(score) } else { best.min(score) };
        }
        best
    }
}

impl Player for MinimaxPlayer {
    seat_accessors!();
    fn choose_move(&mut self, position: &Position, _state: usize) -> Result<Option<usize>> {
        Ok(self.best_move(position.board()))
    }
}

/// Reads moves from a console, one integer per line.
pub struct HumanPlayer<R, W> {
    pub name: String,
    pub mark: Marks,
    outcomes: Outcomes,
    input: R,
    output: W,
}

impl HumanPlayer<StdinLock<'static>, Stdout> {
    pub fn stdio(name: String) -> Self {
        HumanPlayer::new(name, io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> HumanPlayer<R, W> {
    pub fn new(name: String, input: R, output: W) -> Self {
        HumanPlayer {
            name,
            mark: Marks::Cross,
            outcomes: Outcomes::new(),
            input,
            output,
        }
    }

    pub fn output(&self) -> &W {
        &self.output
    }

    fn read_move(&mut self, position: &Position) -> io::Result<Option<usize>> {
        writeln!(self.output, "{}", position)?;
        let prompt = "please, choose your move (0-8):";
        writeln!(self.output, "{}, {}", self.name, prompt)?;
        let mut line = String::new();
        for _ in 0..3 {
            line.clear();
            if self.input.read_line(&mut line)? == 0 {
                return Ok(None);
            }
            match line.trim().parse::<usize>() {
                Ok(mv) => return Ok(Some(mv)),
                Err(_) => writeln!(self.output, "Unknown symbol, please, try again:")?,
            }
        }
        writeln!(self.output, "You tried 3 times")?;
        Ok(None)
    }
}

impl<R: BufRead, W: Write> Player for HumanPlayer<R, W> {
    seat_accessors!();

    fn choose_move(&mut self, position: &Position, _state: usize) -> Result<Option<usize>> {
        match self.read_move(position) {
            Ok(mv) => Ok(mv),
            Err(error) => {
                warn!(%error, "console input failed");
                Ok(None)
            }
        }
    }

    fn record_outcome(&mut self, position: &Position, winner: Option<Marks>) {
        self.outcomes.record(self.mark, winner);
        let banner = match winner {
            Some(mark) if mark == self.mark => "...YOU WIN!",
            Some(_) => "...YOU LOSE...",
            None => "...TIE GAME...",
        };
        if let Err(error) = writeln!(self.output, "{}\n{}", position, banner) {
            warn!(%error, "console output failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn position_with(rows: [[i8; 3]; 3]) -> Position {
        let board = Board::from_rows(rows);
        let mut position = Position::new(Some(11));
        let cells = |sign: i8| -> Vec<usize> {
            (0..9).filter(|&mv| board[[mv / 3, mv % 3]] == sign).collect()
        };
        let (xs, os) = (cells(1), cells(-1));
        for (i, &mv) in xs.iter().enumerate() {
            position.make_move(mv, Marks::Cross).unwrap();
            if let Some(&o) = os.get(i) {
                position.make_move(o, Marks::Nought).unwrap();
            }
        }
        assert_eq!(position.board(), &board);
        position
    }

    fn silent_human() -> HumanPlayer<Cursor<Vec<u8>>, Vec<u8>> {
        HumanPlayer::new("Oscar".to_owned(), Cursor::new(Vec::new()), Vec::new())
    }

    fn choose(player: &mut dyn Player, mark: Marks, position: &Position) -> Option<usize> {
        player.set_mark(mark);
        let state = position.state(mark);
        player.choose_move(position, state).unwrap()
    }

    #[test]
    fn pretty_good_takes_win_before_block() {
        let position = position_with([[1, 1, 0], [-1, -1, 0], [0, 0, 0]]);
        let mut player = PrettyGoodPlayer::new();
        assert_eq!(choose(&mut player, Marks::Cross, &position), Some(2));
        assert_eq!(choose(&mut player, Marks::Nought, &position), Some(5));
    }

    #[test]
    fn pretty_good_blocks_over_neutral_move() {
        let position = position_with([[1, 0, 0], [0, 1, 0], [-1, 0, 0]]);
        let mut player = PrettyGoodPlayer::new();
        for _ in 0..10 {
            assert_eq!(choose(&mut player, Marks::Nought, &position), Some(8));
        }
    }

    #[test]
    fn very_good_creates_fork() {
        let position = position_with([[1, 0, 0], [-1, 1, 0], [0, 0, -1]]);
        assert_eq!(winning_move(position.board(), Marks::Cross), None);
        assert_eq!(blocking_move(position.board(), Marks::Cross), None);
        let mut player = VeryGoodPlayer::new();
        assert_eq!(choose(&mut player, Marks::Cross, &position), Some(1));
    }

    #[test]
    fn very_good_still_prefers_win() {
        let position = position_with([[1, 1, 0], [-1, -1, 0], [0, 0, 0]]);
        let mut player = VeryGoodPlayer::new();
        assert_eq!(choose(&mut player, Marks::Cross, &position), Some(2));
    }

    #[test]
    fn fork_move_for_either_mark() {
        let board = Board::from_rows([[-1, 0, 0], [1, -1, 0], [0, 0, 1]]);
        assert_eq!(fork_move(&board, Marks::Nought), Some(1));
        assert_eq!(fork_move(&Board::new(), Marks::Cross), None);
    }

    #[test]
    fn very_good_blocks_opponent_fork() {
        // O to move; X threatens a fork at 2 (row 0 and column 2).
        let position = position_with([[1, 0, 0], [0, -1, 0], [0, 0, 1]]);
        assert_eq!(fork_move(position.board(), Marks::Nought), None);
        assert_eq!(fork_move(position.board(), Marks::Cross), Some(2));
        let mut player = VeryGoodPlayer::new();
        assert_eq!(choose(&mut player, Marks::Nought, &position), Some(2));
    }

    #[test]
    fn minimax_opens_top_left() {
        let position = Position::new(Some(0));
        let mut player = MinimaxPlayer::new();
        assert_eq!(choose(&mut player, Marks::Cross, &position), Some(0));
    }

    #[test]
    fn minimax_answers_corner_with_centre() {
        let position = position_with([[1, 0, 0], [0, 0, 0], [0, 0, 0]]);
        let mut player = MinimaxPlayer::new();
        assert_eq!(choose(&mut player, Marks::Nought, &position), Some(4));
    }

    #[test]
    fn minimax_wins_and_blocks() {
        let mut player = MinimaxPlayer::new();
        let win = position_with([[1, 1, 0], [-1, -1, 0], [0, 0, 0]]);
        assert_eq!(choose(&mut player, Marks::Cross, &win), Some(2));
        let block = position_with([[1, 1, 0], [0, -1, 0], [0, 0, 0]]);
        assert_eq!(choose(&mut player, Marks::Nought, &block), Some(2));
    }

    #[test]
    fn minimax_scores_from_own_side() {
        let mut board = Board::from_rows([[1, 1, 1], [-1, -1, 0], [0, 0, 0]]);
        let mut player = MinimaxPlayer::new();
        assert_eq!(player.minimax(&mut board, true), 3);
        player.set_mark(Marks::Nought);
        assert_eq!(player.minimax(&mut board, true), -3);
    }

    #[test]
    fn minimax_leaves_position_untouched() {
        let position = position_with([[1, 0, 0], [0, -1, 0], [0, 0, 0]]);
        let before = position.board().clone();
        choose(&mut MinimaxPlayer::new(), Marks::Cross, &position);
        assert_eq!(position.board(), &before);
    }

    #[test]
    fn empty_player_passes() {
        let position = Position::new(Some(0));
        let mut player = EmptyPlayer::new();
        assert_eq!(choose(&mut player, Marks::Cross, &position), None);
    }

    #[test]
    fn random_player_stays_legal() {
        let position = position_with([[1, -1, 1], [0, -1, 0], [0, 1, 0]]);
        let mut player = RandomPlayer::new();
        for _ in 0..50 {
            let mv = choose(&mut player, Marks::Nought, &position).unwrap();
            assert!(position.available().contains(&mv));
        }
    }

    #[test]
    fn human_retries_bad_input() {
        let input = Cursor::new(b"abc\n\n 7 \n".to_vec());
        let mut human = HumanPlayer::new("Oscar".to_owned(), input, Vec::new());
        let position = Position::new(Some(0));
        assert_eq!(choose(&mut human, Marks::Cross, &position), Some(7));
        let printed = String::from_utf8(human.output().clone()).unwrap();
        assert!(printed.contains("Oscar, please, choose your move"));
        assert_eq!(printed.matches("Unknown symbol").count(), 2);
    }

    #[test]
    fn human_gives_up_on_eof() {
        let mut human = silent_human();
        let position = Position::new(Some(0));
        assert_eq!(choose(&mut human, Marks::Cross, &position), None);
    }

    #[test]
    fn human_outcome_banner() {
        let mut human = silent_human();
        human.set_mark(Marks::Nought);
        human.record_outcome(&Position::new(Some(0)), Some(Marks::Cross));
        let printed = String::from_utf8(human.output().clone()).unwrap();
        assert!(printed.ends_with("...YOU LOSE...\n"));
        assert_eq!(human.outcomes().losses, 1);
    }

    #[test]
    fn default_record_outcome_and_summary() {
        let position = Position::new(Some(0));
        let mut player = RandomPlayer::new();
        player.set_mark(Marks::Nought);
        player.record_outcome(&position, Some(Marks::Nought));
        player.record_outcome(&position, None);
        assert_eq!(player.summary(), "RandomPlayer w/l/t=1/0/1");
        player.reset_metrics();
        assert_eq!(player.outcomes().games(), 0);
    }
}
