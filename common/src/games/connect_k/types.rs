use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum Mark {
    #[default]
    Empty,
    PlayerA,
    PlayerB,
}

impl Mark {
    pub fn opponent(&self) -> Option<Mark> {
        match self {
            Mark::PlayerA => Some(Mark::PlayerB),
            Mark::PlayerB => Some(Mark::PlayerA),
            Mark::Empty => None,
        }
    }

    /// Signed identity: +1 for `PlayerA`, -1 for `PlayerB`, 0 for an empty cell.
    pub fn sign(&self) -> i32 {
        match self {
            Mark::PlayerA => 1,
            Mark::PlayerB => -1,
            Mark::Empty => 0,
        }
    }

    pub fn symbol(&self) -> char {
        match self {
            Mark::Empty => '.',
            Mark::PlayerA => 'X',
            Mark::PlayerB => 'O',
        }
    }

    pub fn from_symbol(symbol: char) -> Option<Mark> {
        match symbol {
            '.' | '_' | ' ' => Some(Mark::Empty),
            'X' | 'x' | 'A' | 'a' => Some(Mark::PlayerA),
            'O' | 'o' | 'B' | 'b' => Some(Mark::PlayerB),
            _ => None,
        }
    }

    pub(crate) fn bits(&self) -> u64 {
        match self {
            Mark::Empty => 0,
            Mark::PlayerA => 1,
            Mark::PlayerB => 2,
        }
    }
}

impl fmt::Display for Mark {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// Grid coordinate. `x` is the row index and `y` the column index, so
/// row-major order walks `y` fastest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Position {
    pub x: usize,
    pub y: usize,
}

impl Position {
    pub fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WinningLine {
    pub mark: Mark,
    pub start: Position,
    pub end: Position,
}

impl WinningLine {
    pub fn new(mark: Mark, start: Position, end: Position) -> Self {
        Self { mark, start, end }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    InProgress,
    Won(Mark),
    Draw,
}

impl Outcome {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Outcome::InProgress)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ComputerStrategy {
    #[default]
    Minimax,
    Random,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case", tag = "type")]
pub enum Controller {
    #[default]
    Human,
    Computer {
        #[serde(default)]
        strategy: ComputerStrategy,
    },
}

impl Controller {
    pub fn is_computer(&self) -> bool {
        matches!(self, Controller::Computer { .. })
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum FirstPlayerMode {
    #[default]
    PlayerA,
    PlayerB,
    Random,
}

/// Plies searched below each candidate move.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum SearchDepth {
    #[default]
    Auto,
    Fixed(usize),
}

impl From<Option<usize>> for SearchDepth {
    fn from(depth: Option<usize>) -> Self {
        depth.map_or(SearchDepth::Auto, SearchDepth::Fixed)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ComputerReplyMode {
    /// The computer answers inside the call that handed it the turn.
    #[default]
    Immediate,
    /// The session stops in `Evaluating` until the front end asks for the move.
    Deferred,
}
