use crate::board::{Board, GameResult, Marks, ACTION_SPACE, STATE_SPACE};
use crate::config::{GameConfig, Rewards};
use crate::error::{GameError, Result};
use crate::observer::{BoardObserver, NoopObserver};
use crate::players::Player;
use crate::position::Position;
use crate::replay::Replay;
use std::fmt;
use tracing::{debug, info, warn};

pub mod board;
pub mod config;
pub mod error;
pub mod metrics;
pub mod observer;
pub mod players;
pub mod position;
pub mod replay;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Status {
    NotStarted,
    InProgress,
    Terminal,
}

/// The environment: owns the live position, seats two players and
/// drives them either through [`Game::play`] or the [`Game::step`] API.
pub struct Game {
    pub x_player: Box<dyn Player>,
    pub o_player: Box<dyn Player>,
    position: Position,
    status: Status,
    rewards: Rewards,
    observer: Box<dyn BoardObserver>,
    episode: usize,
}

fn seats<'a>(
    x_player: &'a mut Box<dyn Player>,
    o_player: &'a mut Box<dyn Player>,
    mark: Marks,
) -> (&'a mut Box<dyn Player>, &'a mut Box<dyn Player>) {
    match mark {
        Marks::Cross => (x_player, o_player),
        Marks::Nought => (o_player, x_player),
    }
}

fn accept_move(
    position: &mut Position,
    observer: &mut dyn BoardObserver,
    mv: usize,
    mark: Marks,
) -> Result<bool> {
    let wins = position.make_move(mv, mark)?;
    let (row, col) = (mv / 3, mv % 3);
    match mark {
        Marks::Cross => observer.draw_x(row, col),
        Marks::Nought => observer.draw_o(row, col),
    }
    debug!(%mark, mv, ply = position.ply(), "move accepted");
    Ok(wins)
}

impl Game {
    pub fn new(x_player: Box<dyn Player>, o_player: Box<dyn Player>) -> Self {
        Self::with_config(x_player, o_player, &GameConfig::default())
    }

    pub fn with_config(
        mut x_player: Box<dyn Player>,
        mut o_player: Box<dyn Player>,
        config: &GameConfig,
    ) -> Self {
        x_player.set_mark(Marks::Cross);
        o_player.set_mark(Marks::Nought);
        Game {
            x_player,
            o_player,
            position: Position::new(config.seed),
            status: Status::NotStarted,
            rewards: config.rewards,
            observer: Box::new(NoopObserver),
            episode: 0,
        }
    }

    pub fn with_observer(mut self, observer: Box<dyn BoardObserver>) -> Self {
        self.observer = observer;
        self
    }

    pub const fn state_space() -> usize {
        STATE_SPACE
    }

    pub const fn action_space() -> usize {
        ACTION_SPACE
    }

    pub fn position(&self) -> &Position {
        &self.position
    }
    pub fn status(&self) -> Status {
        self.status
    }
    /// Games started through [`Game::play`].
    pub fn episode(&self) -> usize {
        self.episode
    }
    pub fn legal_moves(&self) -> &[usize] {
        self.position.available()
    }

    pub fn sample(&self, legal: bool) -> Result<usize> {
        self.position.sample(legal)
    }

    pub fn first_empty_cell(&self) -> Result<usize> {
        self.position.sequential()
    }

    /// Clears the board and returns the initial state from X's perspective.
    pub fn reset(&mut self) -> usize {
        self.position.reset();
        self.x_player.reset();
        self.o_player.reset();
        self.observer.clear();
        self.status = Status::InProgress;
        self.position.state(Marks::Cross)
    }

    /// Applies `mv` for `mark` outside of any loop.
    pub fn apply_move(&mut self, mv: usize, mark: Marks) -> Result<bool> {
        let wins = accept_move(&mut self.position, self.observer.as_mut(), mv, mark)?;
        if self.position.classify().is_terminal() {
            self.status = Status::Terminal;
        }
        Ok(wins)
    }

    /// Plays `action` for X, lets O reply, and reports `(state, reward, done)`
    /// from X's perspective. An illegal move from either side ends the
    /// episode with the illegal-step reward.
    pub fn step(&mut self, action: usize) -> Result<(usize, i32, bool)> {
        match self.step_inner(action) {
            Err(GameError::IllegalMove { position }) => {
                warn!(position, "illegal move in step");
                self.status = Status::Terminal;
                let state = self.position.state(Marks::Cross);
                Ok((state, self.rewards.illegal_step, true))
            }
            transition => transition,
        }
    }

    fn step_inner(&mut self, action: usize) -> Result<(usize, i32, bool)> {
        self.apply_move(action, Marks::Cross)?;
        let state = self.position.state(Marks::Cross);
        if self.position.classify() == GameResult::XWins {
            return Ok((state, self.rewards.win, true));
        }
        if self.position.available().is_empty() {
            return Ok((state, 0, true));
        }
        let o_state = self.position.state(Marks::Nought);
        if let Some(reply) = self.o_player.choose_move(&self.position, o_state)? {
            self.apply_move(reply, Marks::Nought)?;
        }
        let state = self.position.state(Marks::Cross);
        if self.position.classify() == GameResult::OWins {
            return Ok((state, self.rewards.loss, true));
        }
        Ok((state, 0, self.position.available().is_empty()))
    }

    /// Plays one full game between the seated players, starting with X.
    ///
    /// A missing or illegal move ends the game on the spot: the offender
    /// receives the illegal-play reward and both players record a tie.
    pub fn play(&mut self) -> Result<()> {
        self.reset();
        self.episode += 1;
        let mut mark = Marks::Cross;
        let mut winner = None;
        while !self.position.available().is_empty() {
            let (player, opponent) = seats(&mut self.x_player, &mut self.o_player, mark);
            let state = self.position.state(mark);
            let choice = player.choose_move(&self.position, state)?;
            debug!(player = player.name(), ?choice, "strategy chose");
            let accepted = match choice {
                Some(mv) => accept_move(&mut self.position, self.observer.as_mut(), mv, mark),
                None => Err(GameError::IllegalMove {
                    position: ACTION_SPACE,
                }),
            };
            match accepted {
                Err(GameError::IllegalMove { position }) => {
                    warn!(player = player.name(), position, "illegal move ends game");
                    player.update(&self.position, state, self.rewards.illegal_play, true);
                    break;
                }
                Err(error) => return Err(error),
                Ok(true) => {
                    player.update(&self.position, state, self.rewards.win, true);
                    opponent.update(&self.position, state, self.rewards.loss, true);
                    winner = Some(mark);
                    break;
                }
                Ok(false) => opponent.update(&self.position, state, 0, false),
            }
            mark = mark.other();
        }
        self.status = Status::Terminal;
        info!(winner = ?winner, ply = self.position.ply(), "game over");
        self.x_player.record_outcome(&self.position, winner);
        self.o_player.record_outcome(&self.position, winner);
        Ok(())
    }

    /// Text rendering of every recorded state of the current game.
    pub fn replay(&self) -> String {
        let states = self.position.states();
        let mut s = String::from("=== REPLAY =================================\n");
        s.push_str(&format!("{:?}\n", states));
        for (i, &state) in states.iter().enumerate() {
            s.push_str(&format!(
                "===( {} [ state={} ] )=====================\n\n",
                i + 1,
                state
            ));
            let board = Board::decode(state);
            s.push_str(&board.draw());
            match board.classify() {
                GameResult::XWins => s.push_str("X wins!\n"),
                GameResult::OWins => s.push_str("O wins!\n"),
                _ => {}
            }
        }
        s.push('\n');
        s
    }

    pub fn record(&self) -> Replay {
        Replay::from_position(&self.position)
    }
}

impl fmt::Display for Game {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.position)
    }
}
