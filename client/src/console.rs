use connect_k_common::games::connect_k::{
    ConnectKGameState, GameObserver, Player, Position, WinningLine,
};

/// Prints game events to stdout.
#[derive(Default)]
pub struct ConsoleObserver {
    pub games_finished: usize,
}

impl GameObserver for ConsoleObserver {
    fn on_move(&mut self, player: &Player, position: Position) {
        if player.is_computer() {
            println!("{} ({}) plays {}", player.name, player.mark, position);
        }
    }

    fn on_win(&mut self, winner: &Player) {
        println!("{} ({}) wins!", winner.name, winner.mark);
    }

    fn on_draw(&mut self) {
        println!("Draw.");
    }

    fn on_game_end(&mut self) {
        self.games_finished += 1;
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum Command {
    Place { x: usize, y: usize },
    Reset,
    Quit,
}

/// Parses `x y` (or `x,y`), `r`/`reset` and `q`/`quit`.
pub fn parse_command(line: &str) -> Result<Command, String> {
    let line = line.trim();
    match line.to_ascii_lowercase().as_str() {
        "q" | "quit" | "exit" => return Ok(Command::Quit),
        "r" | "reset" => return Ok(Command::Reset),
        _ => {}
    }

    let parts: Vec<&str> = line
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|part| !part.is_empty())
        .collect();
    let [x, y] = parts.as_slice() else {
        return Err(format!("Expected two coordinates \"x y\", got \"{}\"", line));
    };

    let x = x
        .parse::<usize>()
        .map_err(|_| format!("Invalid row \"{}\"", x))?;
    let y = y
        .parse::<usize>()
        .map_err(|_| format!("Invalid column \"{}\"", y))?;
    Ok(Command::Place { x, y })
}

pub fn describe_winning_line(line: &WinningLine) -> String {
    format!("{} from {} to {}", line.mark, line.start, line.end)
}

pub fn print_game(game: &ConnectKGameState) {
    println!();
    print!("{}", game.board());
    if let Some(line) = game.winning_line() {
        println!("Winning line: {}", describe_winning_line(&line));
    }
}
