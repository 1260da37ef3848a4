use super::board::Board;
use super::types::{Mark, Outcome, Position, WinningLine};
use super::win_detector;
use crate::error::{GameError, GameResult};

pub const MIN_BOARD_SIZE: usize = 1;
pub const MAX_BOARD_SIZE: usize = 20;

/// Board size and win length for one game. Variants of the game are
/// different `Rules` values, not different types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rules {
    board_size: usize,
    win_length: usize,
}

impl Rules {
    pub fn new(board_size: usize, win_length: usize) -> GameResult<Self> {
        if !(MIN_BOARD_SIZE..=MAX_BOARD_SIZE).contains(&board_size) {
            return Err(GameError::InvalidSettings(format!(
                "Board size must be between {} and {}, got {}",
                MIN_BOARD_SIZE, MAX_BOARD_SIZE, board_size
            )));
        }
        if win_length < 1 || win_length > board_size {
            return Err(GameError::InvalidSettings(format!(
                "Win length ({}) must be between 1 and board size ({})",
                win_length, board_size
            )));
        }
        Ok(Self {
            board_size,
            win_length,
        })
    }

    pub fn tic_tac_toe() -> Self {
        Self {
            board_size: 3,
            win_length: 3,
        }
    }

    pub fn board_size(&self) -> usize {
        self.board_size
    }

    pub fn win_length(&self) -> usize {
        self.win_length
    }

    pub fn new_board(&self) -> Board {
        Board::new(self.board_size)
    }

    pub fn winner_at(&self, board: &Board, pos: Position) -> Option<Mark> {
        win_detector::check_win_at(board, self.win_length, pos)
    }

    pub fn winner(&self, board: &Board) -> Option<Mark> {
        win_detector::check_win(board, self.win_length)
    }

    pub fn winning_line(&self, board: &Board) -> Option<WinningLine> {
        win_detector::check_win_with_line(board, self.win_length)
    }

    pub fn outcome(&self, board: &Board, last_move: Option<Position>) -> Outcome {
        win_detector::evaluate_outcome(board, self.win_length, last_move)
    }
}

impl Default for Rules {
    fn default() -> Self {
        Self::tic_tac_toe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_rules() {
        let rules = Rules::new(5, 4).unwrap();

        assert_eq!(rules.board_size(), 5);
        assert_eq!(rules.win_length(), 4);
        assert_eq!(rules.new_board().size(), 5);
    }

    #[test]
    fn test_win_length_cannot_exceed_size() {
        assert!(Rules::new(3, 4).is_err());
    }

    #[test]
    fn test_win_length_must_be_positive() {
        assert!(Rules::new(3, 0).is_err());
    }

    #[test]
    fn test_board_size_limits() {
        assert!(Rules::new(0, 1).is_err());
        assert!(Rules::new(MAX_BOARD_SIZE + 1, 3).is_err());
        assert!(Rules::new(MAX_BOARD_SIZE, 5).is_ok());
        assert!(Rules::new(1, 1).is_ok());
    }

    #[test]
    fn test_outcome_uses_win_length() {
        let board = Board::from_rows(&["XX..", "....", "....", "...."]).unwrap();

        assert_eq!(
            Rules::new(4, 2).unwrap().outcome(&board, None),
            Outcome::Won(Mark::PlayerA)
        );
        assert_eq!(
            Rules::new(4, 3).unwrap().outcome(&board, None),
            Outcome::InProgress
        );
    }
}
