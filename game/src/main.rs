use anyhow::{bail, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tictactoe_rl::config::GameConfig;
use tictactoe_rl::observer::{BoardObserver, NoopObserver, TraceObserver};
use tictactoe_rl::players::{
    EmptyPlayer, HumanPlayer, MinimaxPlayer, Player, PrettyGoodPlayer, RandomPlayer,
    VeryGoodPlayer,
};
use tictactoe_rl::Game;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "game", about = "Tic-tac-toe with pluggable players", version)]
struct Cli {
    /// Player seated as X
    #[arg(long, value_enum, default_value = "human")]
    x: Kind,

    /// Player seated as O
    #[arg(long, value_enum, default_value = "minimax")]
    o: Kind,

    /// Number of games to play (overrides the config file; one game when a
    /// human is seated)
    #[arg(short, long)]
    games: Option<usize>,

    /// RNG seed (overrides the config file)
    #[arg(long)]
    seed: Option<u64>,

    /// JSON config with rewards, seed and game count
    #[arg(long)]
    config: Option<PathBuf>,

    /// Print a replay of the last game
    #[arg(long)]
    replay: bool,

    /// Write the last game as JSON into this directory
    #[arg(long)]
    save_replay: Option<PathBuf>,

    /// Log board events
    #[arg(long)]
    trace_board: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Drive the environment through reset/step with X's actions
    Step {
        actions: Vec<usize>,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Kind {
    Empty,
    Random,
    Human,
    PrettyGood,
    VeryGood,
    Minimax,
}

fn build_player(kind: Kind, name: &str) -> Box<dyn Player> {
    match kind {
        Kind::Empty => Box::new(EmptyPlayer::new()),
        Kind::Random => Box::new(RandomPlayer::new()),
        Kind::Human => Box::new(HumanPlayer::stdio(name.to_owned())),
        Kind::PrettyGood => Box::new(PrettyGoodPlayer::new()),
        Kind::VeryGood => Box::new(VeryGoodPlayer::new()),
        Kind::Minimax => Box::new(MinimaxPlayer::new()),
    }
}

/// Games to play: `--games` wins, a seated human gets a single game,
/// otherwise the config decides.
fn game_count(cli: &Cli, config: &GameConfig) -> usize {
    match cli.games {
        Some(games) => games,
        None if cli.x == Kind::Human || cli.o == Kind::Human => 1,
        None => config.games,
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let mut config = match &cli.config {
        Some(path) => GameConfig::from_json_file(path)?,
        None => GameConfig::default(),
    };
    if let Some(seed) = cli.seed {
        config.seed = Some(seed);
    }
    config.games = game_count(&cli, &config);

    let observer: Box<dyn BoardObserver> = if cli.trace_board {
        Box::new(TraceObserver::default())
    } else {
        Box::new(NoopObserver)
    };
    let (x, o) = (build_player(cli.x, "X"), build_player(cli.o, "O"));
    let mut game = Game::with_config(x, o, &config).with_observer(observer);

    match cli.command {
        Some(Command::Step { actions }) => {
            if actions.is_empty() {
                bail!("step needs at least one action");
            }
            let state = game.reset();
            info!(state, "reset");
            for action in actions {
                let (state, reward, done) = game.step(action)?;
                println!("action={action} state={state} reward={reward} done={done}");
                if done {
                    break;
                }
            }
            println!("{game}");
        }
        None => {
            info!(
                games = config.games,
                x = game.x_player.name(),
                o = game.o_player.name(),
                "playing"
            );
            for _ in 0..config.games {
                game.play()?;
            }
            println!("{}", game.x_player.summary());
            println!("{}", game.o_player.summary());
        }
    }

    if cli.replay {
        print!("{}", game.replay());
    }
    if let Some(dir) = &cli.save_replay {
        let path = game.record().to_disk(dir)?;
        info!(path = %path.display(), "replay saved");
    }
    Ok(())
}
