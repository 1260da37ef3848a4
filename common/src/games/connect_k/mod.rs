mod board;
mod bot_controller;
mod game_state;
mod rules;
mod search;
mod session;
mod settings;
mod transposition;
mod types;
mod win_detector;

pub use board::{Board, BoardKey};
pub use bot_controller::{BotDecision, BotInput, calculate_move, find_best_move};
pub use game_state::{ConnectKGameState, MoveRecord, Player};
pub use rules::{MAX_BOARD_SIZE, MIN_BOARD_SIZE, Rules};
pub use search::{SCORE_INFINITY, SearchNode, SearchStats, Searcher, WIN_SCORE, depth_budget};
pub use session::{ConnectKSession, GameObserver, NoopObserver, TurnState};
pub use settings::{GameSettings, SideSettings};
pub use transposition::{CacheKey, CacheStats, EntryType, TranspositionCache};
pub use types::{
    ComputerReplyMode, ComputerStrategy, Controller, FirstPlayerMode, Mark, Outcome, Position,
    SearchDepth, WinningLine,
};
pub use win_detector::{
    check_win, check_win_at, check_win_with_line, evaluate_outcome, run_length, signed_winner,
    winning_line_at,
};
