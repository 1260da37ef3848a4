use super::board::Board;
use super::rules::Rules;
use super::types::{Controller, Mark, Outcome, Position, WinningLine};
use crate::PlayerId;
use crate::error::{GameError, GameResult};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub mark: Mark,
    pub controller: Controller,
}

impl Player {
    pub fn new(id: PlayerId, name: impl Into<String>, mark: Mark, controller: Controller) -> Self {
        Self {
            id,
            name: name.into(),
            mark,
            controller,
        }
    }

    pub fn is_computer(&self) -> bool {
        self.controller.is_computer()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveRecord {
    pub mark: Mark,
    pub position: Position,
}

/// Board, players and whose turn it is. Knows nothing about computer play
/// or notifications; see `ConnectKSession` for that.
#[derive(Debug, Clone)]
pub struct ConnectKGameState {
    rules: Rules,
    board: Board,
    player_a: Player,
    player_b: Player,
    first_mark: Mark,
    current_mark: Mark,
    status: Outcome,
    last_move: Option<Position>,
    history: Vec<MoveRecord>,
    winning_line: Option<WinningLine>,
}

impl ConnectKGameState {
    pub fn new(rules: Rules, player_a: Player, player_b: Player, first_mark: Mark) -> GameResult<Self> {
        if player_a.mark != Mark::PlayerA || player_b.mark != Mark::PlayerB {
            return Err(GameError::InvalidSettings(
                "players must hold marks A and B respectively".to_string(),
            ));
        }
        if player_a.id == player_b.id {
            return Err(GameError::InvalidSettings(format!(
                "both players share the id {}",
                player_a.id
            )));
        }
        if first_mark == Mark::Empty {
            return Err(GameError::InvalidSettings(
                "first player must be A or B".to_string(),
            ));
        }

        Ok(Self {
            rules,
            board: rules.new_board(),
            player_a,
            player_b,
            first_mark,
            current_mark: first_mark,
            status: Outcome::InProgress,
            last_move: None,
            history: Vec::new(),
            winning_line: None,
        })
    }

    pub fn place_mark(&mut self, player_id: &PlayerId, x: usize, y: usize) -> GameResult<Outcome> {
        if self.status.is_terminal() {
            return Err(GameError::invalid_move("Game is already over"));
        }

        if player_id != &self.current_player().id {
            return Err(GameError::invalid_move("Not your turn"));
        }

        if !self.board.is_empty(x, y)? {
            return Err(GameError::invalid_move(format!(
                "Cell ({}, {}) is already marked",
                x, y
            )));
        }

        self.board.place(x, y, self.current_mark)?;
        let position = Position::new(x, y);
        self.last_move = Some(position);
        self.history.push(MoveRecord {
            mark: self.current_mark,
            position,
        });

        self.check_game_over(position);

        if self.status == Outcome::InProgress {
            self.switch_turn();
        }

        Ok(self.status)
    }

    fn switch_turn(&mut self) {
        self.current_mark = self.current_mark.opponent().unwrap_or(self.first_mark);
    }

    fn check_game_over(&mut self, last_move: Position) {
        self.status = self.rules.outcome(&self.board, Some(last_move));
        if let Outcome::Won(_) = self.status {
            self.winning_line =
                super::win_detector::winning_line_at(&self.board, self.rules.win_length(), last_move);
        }
    }

    /// Clears the board for a new game. `first_mark` replaces the opening side.
    pub fn reset(&mut self, first_mark: Option<Mark>) {
        if let Some(mark) = first_mark.filter(|mark| *mark != Mark::Empty) {
            self.first_mark = mark;
        }
        self.board = self.rules.new_board();
        self.current_mark = self.first_mark;
        self.status = Outcome::InProgress;
        self.last_move = None;
        self.history.clear();
        self.winning_line = None;
    }

    pub fn rules(&self) -> Rules {
        self.rules
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn status(&self) -> Outcome {
        self.status
    }

    pub fn is_over(&self) -> bool {
        self.status.is_terminal()
    }

    pub fn current_mark(&self) -> Mark {
        self.current_mark
    }

    pub fn first_mark(&self) -> Mark {
        self.first_mark
    }

    pub fn current_player(&self) -> &Player {
        self.player(self.current_mark)
    }

    /// Player holding `mark`; `Mark::Empty` maps to player A.
    pub fn player(&self, mark: Mark) -> &Player {
        match mark {
            Mark::PlayerB => &self.player_b,
            Mark::PlayerA | Mark::Empty => &self.player_a,
        }
    }

    pub fn players(&self) -> [&Player; 2] {
        [&self.player_a, &self.player_b]
    }

    pub fn get_winner(&self) -> Option<&Player> {
        match self.status {
            Outcome::Won(mark) => Some(self.player(mark)),
            _ => None,
        }
    }

    pub fn last_move(&self) -> Option<Position> {
        self.last_move
    }

    pub fn history(&self) -> &[MoveRecord] {
        &self.history
    }

    pub fn winning_line(&self) -> Option<WinningLine> {
        self.winning_line
    }
}
