use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum GameError {
    #[error("invalid move: {reason}")]
    InvalidMove { reason: String },

    #[error("position ({x}, {y}) is outside the {size}x{size} board")]
    OutOfRange { x: usize, y: usize, size: usize },

    #[error("no legal move available")]
    NoLegalMove,

    #[error("invalid settings: {0}")]
    InvalidSettings(String),
}

impl GameError {
    pub fn invalid_move(reason: impl Into<String>) -> Self {
        Self::InvalidMove {
            reason: reason.into(),
        }
    }
}

pub type GameResult<T> = Result<T, GameError>;
