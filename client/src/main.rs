mod config;
mod console;

use clap::{Parser, ValueEnum};
use connect_k_common::games::SessionRng;
use connect_k_common::games::connect_k::{
    ComputerStrategy, ConnectKSession, FirstPlayerMode, GameSettings, SideSettings, TurnState,
};
use connect_k_common::logger::{self, LogLevel};
use connect_k_common::{GameError, log};
use std::io::{BufRead, Write};
use std::path::PathBuf;

use config::get_config_manager;
use console::{Command, ConsoleObserver, parse_command, print_game};

#[derive(Clone, Copy, ValueEnum)]
enum FirstArg {
    A,
    B,
    Random,
}

impl From<FirstArg> for FirstPlayerMode {
    fn from(value: FirstArg) -> Self {
        match value {
            FirstArg::A => FirstPlayerMode::PlayerA,
            FirstArg::B => FirstPlayerMode::PlayerB,
            FirstArg::Random => FirstPlayerMode::Random,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum StrategyArg {
    Minimax,
    Random,
}

impl From<StrategyArg> for ComputerStrategy {
    fn from(value: StrategyArg) -> Self {
        match value {
            StrategyArg::Minimax => ComputerStrategy::Minimax,
            StrategyArg::Random => ComputerStrategy::Random,
        }
    }
}

#[derive(Parser)]
#[command(name = "connect_k_client", about = "Play connect-K against the computer")]
struct Args {
    /// Config file; defaults to connect_k_client_config.yaml next to the executable
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long)]
    size: Option<usize>,
    #[arg(long)]
    win_length: Option<usize>,
    /// Plies searched below each computer move; omitted means automatic
    #[arg(long)]
    depth: Option<usize>,
    #[arg(long, value_enum)]
    first: Option<FirstArg>,
    #[arg(long, value_enum)]
    strategy: Option<StrategyArg>,
    #[arg(long)]
    timeout_ms: Option<u64>,
    #[arg(long)]
    computer_vs_computer: bool,
    #[arg(long)]
    seed: Option<u64>,
    /// Write the effective settings back to the config file
    #[arg(long)]
    save_config: bool,
    #[arg(long)]
    use_log_prefix: bool,
    #[arg(long)]
    verbose: bool,
}

impl Args {
    fn apply(&self, settings: &mut GameSettings) {
        if let Some(size) = self.size {
            settings.board_size = size;
        }
        if let Some(win_length) = self.win_length {
            settings.win_length = win_length;
        }
        if self.depth.is_some() {
            settings.search_depth = self.depth;
        }
        if let Some(first) = self.first {
            settings.first_player = first.into();
        }
        if self.timeout_ms.is_some() {
            settings.search_timeout_ms = self.timeout_ms;
        }
        if self.computer_vs_computer {
            let strategy = self.strategy.map_or(ComputerStrategy::Minimax, Into::into);
            settings.player_a = SideSettings {
                name: settings.player_a.name.clone(),
                ..SideSettings::computer(strategy)
            };
        }
        if let Some(strategy) = self.strategy {
            settings.player_b = SideSettings {
                name: settings.player_b.name.clone(),
                ..SideSettings::computer(strategy.into())
            };
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config_manager = get_config_manager(args.config.clone());
    let mut config = config_manager.get_config()?;
    args.apply(&mut config.game);

    let prefix = if args.use_log_prefix || config.log.use_prefix {
        Some("Client".to_string())
    } else {
        None
    };
    let level = if args.verbose {
        LogLevel::Debug
    } else {
        config.log.level
    };
    logger::init_logger(prefix, level);

    if args.save_config {
        config_manager.set_config(&config)?;
        log!("Config saved");
    }

    let rng = args.seed.map_or_else(SessionRng::from_random, SessionRng::new);
    let mut session = ConnectKSession::new(&config.game, ConsoleObserver::default(), rng)?;

    println!(
        "{} in a row on a {}x{} board. Enter moves as \"row col\", r to restart, q to quit.",
        session.rules().win_length(),
        session.rules().board_size(),
        session.rules().board_size()
    );

    let stdin = std::io::stdin();
    let mut lines = stdin.lock().lines();

    loop {
        match session.state() {
            TurnState::AwaitingMove(_) => {
                print_game(session.game());
                let player = session.game().current_player();
                print!("{} ({}) > ", player.name, player.mark);
                std::io::stdout().flush()?;

                let Some(line) = lines.next() else {
                    break;
                };
                match parse_command(&line?) {
                    Ok(Command::Place { x, y }) => {
                        if let Err(err) = session.submit_move(x, y) {
                            println!("{}", err);
                        }
                    }
                    Ok(Command::Reset) => session.reset(),
                    Ok(Command::Quit) => break,
                    Err(err) => println!("{}", err),
                }
            }
            TurnState::Evaluating(_) => match session.play_computer_turn() {
                Ok(_) => {}
                Err(GameError::NoLegalMove) => break,
                Err(err) => return Err(err.into()),
            },
            TurnState::Won(_) | TurnState::Draw => {
                print_game(session.game());
                print!("Play again? [y/N] ");
                std::io::stdout().flush()?;

                let again = match lines.next() {
                    Some(line) => line?.trim().eq_ignore_ascii_case("y"),
                    None => false,
                };
                if !again {
                    break;
                }
                session.reset();
            }
        }
    }

    log!(
        "Finished {} game(s) in session {}",
        session.observer().games_finished,
        session.id()
    );
    Ok(())
}
