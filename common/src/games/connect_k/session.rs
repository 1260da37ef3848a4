use std::time::Duration;

use super::bot_controller::{BotInput, calculate_move};
use super::game_state::{ConnectKGameState, Player};
use super::rules::Rules;
use super::settings::{GameSettings, SideSettings};
use super::types::{
    ComputerReplyMode, Controller, FirstPlayerMode, Mark, Outcome, Position, SearchDepth,
};
use crate::error::{GameError, GameResult};
use crate::games::SessionRng;
use crate::id_generator::{generate_game_id, generate_player_name};
use crate::{GameId, PlayerId, log};

/// Receives game events from a session. Terminal callbacks fire exactly once
/// per game: `on_win` or `on_draw`, then `on_game_end`.
pub trait GameObserver {
    fn on_move(&mut self, _player: &Player, _position: Position) {}

    fn on_win(&mut self, winner: &Player);

    fn on_draw(&mut self);

    fn on_game_end(&mut self);
}

pub struct NoopObserver;

impl GameObserver for NoopObserver {
    fn on_win(&mut self, _winner: &Player) {}

    fn on_draw(&mut self) {}

    fn on_game_end(&mut self) {}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TurnState {
    /// Waiting for a human side to submit a coordinate.
    AwaitingMove(Mark),
    /// A computer side is to move; `play_computer_turn` produces its move.
    Evaluating(Mark),
    Won(Mark),
    Draw,
}

impl TurnState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, TurnState::Won(_) | TurnState::Draw)
    }
}

/// Turn controller for one human-vs-computer (or any mix) game.
///
/// Human moves enter through [`ConnectKSession::submit_move`]; computer moves
/// are chosen by the move selector and replayed through the same placement
/// path. With [`ComputerReplyMode::Immediate`] a computer reply is computed
/// inside `submit_move`; with `Deferred` the session stops in
/// [`TurnState::Evaluating`] so the front end can pause before calling
/// [`ConnectKSession::play_computer_turn`]. A game whose first side is a
/// computer always starts in `Evaluating`.
pub struct ConnectKSession<O: GameObserver = NoopObserver> {
    id: GameId,
    game: ConnectKGameState,
    state: TurnState,
    first_player_mode: FirstPlayerMode,
    search_depth: SearchDepth,
    time_limit: Option<Duration>,
    reply_mode: ComputerReplyMode,
    rng: SessionRng,
    observer: O,
}

impl<O: GameObserver> ConnectKSession<O> {
    pub fn new(settings: &GameSettings, observer: O, mut rng: SessionRng) -> GameResult<Self> {
        let rules = settings.validated()?;

        let player_a = create_player("player-a", Mark::PlayerA, &settings.player_a, &mut rng);
        let player_b = create_player("player-b", Mark::PlayerB, &settings.player_b, &mut rng);
        let first_mark = pick_first_mark(settings.first_player, &mut rng);
        let game = ConnectKGameState::new(rules, player_a, player_b, first_mark)?;
        let id = GameId::new(generate_game_id(&mut rng));

        let mut session = Self {
            id,
            game,
            state: TurnState::Draw,
            first_player_mode: settings.first_player,
            search_depth: settings.search_depth(),
            time_limit: settings.time_limit(),
            reply_mode: settings.computer_reply,
            rng,
            observer,
        };
        session.state = session.turn_state_for(first_mark);
        session.log_start();
        Ok(session)
    }

    fn log_start(&self) {
        let rules = self.game.rules();
        let first = self.game.current_player();
        log!(
            "Game {} started: {}x{} board, {} in a row, {} ({}) moves first, seed {}",
            self.id,
            rules.board_size(),
            rules.board_size(),
            rules.win_length(),
            first.name,
            first.mark,
            self.rng.seed()
        );
    }

    fn turn_state_for(&self, mark: Mark) -> TurnState {
        if self.game.player(mark).is_computer() {
            TurnState::Evaluating(mark)
        } else {
            TurnState::AwaitingMove(mark)
        }
    }

    /// A human side's move. Rejected moves leave the session unchanged.
    pub fn submit_move(&mut self, x: usize, y: usize) -> GameResult<TurnState> {
        match self.state {
            TurnState::AwaitingMove(_) => {}
            TurnState::Evaluating(_) => {
                return Err(GameError::invalid_move("Computer is to move"));
            }
            TurnState::Won(_) | TurnState::Draw => {
                return Err(GameError::invalid_move("Game is already over"));
            }
        }

        self.apply_move(x, y)?;

        if self.reply_mode == ComputerReplyMode::Immediate {
            self.run_computer_turns()?;
        }
        Ok(self.state)
    }

    /// Computes and applies the pending computer move. In immediate mode
    /// consecutive computer turns are played until a human is to move or the
    /// game ends.
    pub fn play_computer_turn(&mut self) -> GameResult<TurnState> {
        let TurnState::Evaluating(_) = self.state else {
            return Err(GameError::invalid_move("No computer move is pending"));
        };

        self.play_one_computer_move()?;

        if self.reply_mode == ComputerReplyMode::Immediate {
            self.run_computer_turns()?;
        }
        Ok(self.state)
    }

    fn run_computer_turns(&mut self) -> GameResult<()> {
        while let TurnState::Evaluating(_) = self.state {
            self.play_one_computer_move()?;
        }
        Ok(())
    }

    fn play_one_computer_move(&mut self) -> GameResult<()> {
        let player = self.game.current_player();
        let Controller::Computer { strategy } = player.controller else {
            return Err(GameError::invalid_move("Current side is not computer-controlled"));
        };

        let input =
            BotInput::from_game_state(&self.game, self.search_depth).with_time_limit(self.time_limit);

        match calculate_move(strategy, &input, &mut self.rng) {
            Ok(position) => self.apply_move(position.x, position.y),
            Err(GameError::NoLegalMove) => {
                // Evaluating is never entered on a full board.
                if cfg!(debug_assertions) {
                    panic!(
                        "move selector found no legal move in game {} on board {}",
                        self.id,
                        self.game.board().serialize()
                    );
                }
                log!(
                    "Game {}: move selector found no legal move, state left unchanged",
                    self.id
                );
                Err(GameError::NoLegalMove)
            }
            Err(err) => Err(err),
        }
    }

    fn apply_move(&mut self, x: usize, y: usize) -> GameResult<()> {
        let mover = self.game.current_player().clone();
        let outcome = self.game.place_mark(&mover.id, x, y)?;

        let position = Position::new(x, y);
        log!(
            "Game {}: {} ({}) placed at {}",
            self.id,
            mover.name,
            mover.mark,
            position
        );
        self.observer.on_move(&mover, position);

        match outcome {
            Outcome::Won(mark) => {
                self.state = TurnState::Won(mark);
                let winner = self.game.player(mark).clone();
                log!("Game {}: {} ({}) won", self.id, winner.name, winner.mark);
                self.observer.on_win(&winner);
                self.observer.on_game_end();
            }
            Outcome::Draw => {
                self.state = TurnState::Draw;
                log!("Game {}: draw", self.id);
                self.observer.on_draw();
                self.observer.on_game_end();
            }
            Outcome::InProgress => {
                self.state = self.turn_state_for(self.game.current_mark());
            }
        }
        Ok(())
    }

    /// Starts a new game with the same players and rules. A random first
    /// player is drawn again.
    pub fn reset(&mut self) {
        let first_mark = match self.first_player_mode {
            FirstPlayerMode::Random => Some(pick_first_mark(FirstPlayerMode::Random, &mut self.rng)),
            FirstPlayerMode::PlayerA | FirstPlayerMode::PlayerB => None,
        };
        self.game.reset(first_mark);
        self.state = self.turn_state_for(self.game.first_mark());
        self.log_start();
    }

    pub fn id(&self) -> &GameId {
        &self.id
    }

    pub fn state(&self) -> TurnState {
        self.state
    }

    pub fn game(&self) -> &ConnectKGameState {
        &self.game
    }

    pub fn rules(&self) -> Rules {
        self.game.rules()
    }

    pub fn observer(&self) -> &O {
        &self.observer
    }
}

fn create_player(id: &str, mark: Mark, side: &SideSettings, rng: &mut SessionRng) -> Player {
    let name = side
        .name
        .clone()
        .unwrap_or_else(|| generate_player_name(rng));
    Player::new(PlayerId::new(id), name, mark, side.controller)
}

fn pick_first_mark(mode: FirstPlayerMode, rng: &mut SessionRng) -> Mark {
    match mode {
        FirstPlayerMode::PlayerA => Mark::PlayerA,
        FirstPlayerMode::PlayerB => Mark::PlayerB,
        FirstPlayerMode::Random => {
            if rng.random_bool() {
                Mark::PlayerA
            } else {
                Mark::PlayerB
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games::connect_k::types::ComputerStrategy;

    #[derive(Default)]
    struct RecordingObserver {
        moves: Vec<(PlayerId, Position)>,
        wins: Vec<PlayerId>,
        draws: usize,
        ends: usize,
    }

    impl GameObserver for RecordingObserver {
        fn on_move(&mut self, player: &Player, position: Position) {
            self.moves.push((player.id.clone(), position));
        }

        fn on_win(&mut self, winner: &Player) {
            self.wins.push(winner.id.clone());
        }

        fn on_draw(&mut self) {
            self.draws += 1;
        }

        fn on_game_end(&mut self) {
            self.ends += 1;
        }
    }

    fn human_vs_human() -> GameSettings {
        GameSettings {
            player_a: SideSettings::human(Some("Ann")),
            player_b: SideSettings::human(Some("Ben")),
            ..GameSettings::default()
        }
    }

    fn create_session(settings: GameSettings) -> ConnectKSession<RecordingObserver> {
        ConnectKSession::new(&settings, RecordingObserver::default(), SessionRng::new(17)).unwrap()
    }

    #[test]
    fn test_human_turns_alternate() {
        let mut session = create_session(human_vs_human());

        assert_eq!(session.state(), TurnState::AwaitingMove(Mark::PlayerA));
        assert_eq!(session.submit_move(0, 0).unwrap(), TurnState::AwaitingMove(Mark::PlayerB));
        assert_eq!(session.submit_move(1, 1).unwrap(), TurnState::AwaitingMove(Mark::PlayerA));
    }

    #[test]
    fn test_occupied_cell_rejected_without_state_change() {
        let mut session = create_session(human_vs_human());
        session.submit_move(0, 0).unwrap();

        let result = session.submit_move(0, 0);

        assert!(matches!(result, Err(GameError::InvalidMove { .. })));
        assert_eq!(session.state(), TurnState::AwaitingMove(Mark::PlayerB));
        assert_eq!(session.game().history().len(), 1);
    }

    #[test]
    fn test_out_of_range_rejected() {
        let mut session = create_session(human_vs_human());

        let result = session.submit_move(0, 9);

        assert_eq!(result, Err(GameError::OutOfRange { x: 0, y: 9, size: 3 }));
        assert_eq!(session.state(), TurnState::AwaitingMove(Mark::PlayerA));
    }

    #[test]
    fn test_win_notifies_once_and_rejects_further_moves() {
        let mut session = create_session(human_vs_human());
        for (x, y) in [(0, 0), (1, 0), (0, 1), (1, 1)] {
            session.submit_move(x, y).unwrap();
        }

        let state = session.submit_move(0, 2).unwrap();

        assert_eq!(state, TurnState::Won(Mark::PlayerA));
        assert_eq!(session.observer().wins, vec![PlayerId::new("player-a")]);
        assert_eq!(session.observer().ends, 1);
        assert!(session.submit_move(2, 2).is_err());
        assert_eq!(session.observer().ends, 1);
        assert_eq!(session.observer().moves.len(), 5);
    }

    #[test]
    fn test_draw_notifies_once() {
        let mut session = create_session(human_vs_human());
        let moves = [(0, 0), (0, 1), (0, 2), (1, 1), (1, 0), (1, 2), (2, 1), (2, 0), (2, 2)];

        for (x, y) in moves {
            session.submit_move(x, y).unwrap();
        }

        assert_eq!(session.state(), TurnState::Draw);
        assert_eq!(session.observer().draws, 1);
        assert!(session.observer().wins.is_empty());
        assert_eq!(session.observer().ends, 1);
    }

    #[test]
    fn test_computer_replies_immediately() {
        let mut session = create_session(GameSettings::default());

        let state = session.submit_move(1, 1).unwrap();

        assert_eq!(state, TurnState::AwaitingMove(Mark::PlayerA));
        assert_eq!(session.game().history().len(), 2);
        let reply = session.game().history()[1];
        assert_eq!(reply.mark, Mark::PlayerB);
        assert_eq!(reply.position, Position::new(0, 0));
    }

    #[test]
    fn test_deferred_reply_waits_in_evaluating() {
        let mut session = create_session(GameSettings {
            computer_reply: ComputerReplyMode::Deferred,
            ..GameSettings::default()
        });

        let state = session.submit_move(1, 1).unwrap();

        assert_eq!(state, TurnState::Evaluating(Mark::PlayerB));
        assert!(session.submit_move(0, 0).is_err());
        assert_eq!(session.game().board().filled_count(), 1);

        let state = session.play_computer_turn().unwrap();

        assert_eq!(state, TurnState::AwaitingMove(Mark::PlayerA));
        assert_eq!(session.game().board().filled_count(), 2);
    }

    #[test]
    fn test_play_computer_turn_requires_pending_move() {
        let mut session = create_session(GameSettings::default());

        assert!(matches!(
            session.play_computer_turn(),
            Err(GameError::InvalidMove { .. })
        ));
    }

    #[test]
    fn test_computer_first_starts_evaluating() {
        let mut session = create_session(GameSettings {
            first_player: FirstPlayerMode::PlayerB,
            search_depth: Some(2),
            ..GameSettings::default()
        });

        assert_eq!(session.state(), TurnState::Evaluating(Mark::PlayerB));

        let state = session.play_computer_turn().unwrap();

        assert_eq!(state, TurnState::AwaitingMove(Mark::PlayerA));
        assert_eq!(session.game().history()[0].mark, Mark::PlayerB);
    }

    #[test]
    fn test_computer_never_loses_at_three_by_three() {
        let mut rng = SessionRng::new(99);

        for _ in 0..10 {
            let mut session = create_session(GameSettings::default());
            while let TurnState::AwaitingMove(_) = session.state() {
                let moves = session.game().board().available_moves();
                let pos = *rng.choose(&moves).unwrap();
                session.submit_move(pos.x, pos.y).unwrap();
            }

            assert_ne!(session.state(), TurnState::Won(Mark::PlayerA));
            assert_eq!(session.observer().ends, 1);
        }
    }

    #[test]
    fn test_computer_vs_computer_plays_to_the_end() {
        let mut session = create_session(GameSettings {
            board_size: 4,
            win_length: 3,
            player_a: SideSettings::computer(ComputerStrategy::Random),
            player_b: SideSettings::computer(ComputerStrategy::Minimax),
            search_depth: Some(2),
            ..GameSettings::default()
        });

        let state = session.play_computer_turn().unwrap();

        assert!(state.is_terminal());
        assert_eq!(session.observer().ends, 1);
    }

    #[test]
    fn test_reset_starts_a_new_game() {
        let mut session = create_session(human_vs_human());
        for (x, y) in [(0, 0), (1, 0), (0, 1), (1, 1), (0, 2)] {
            session.submit_move(x, y).unwrap();
        }

        session.reset();

        assert_eq!(session.state(), TurnState::AwaitingMove(Mark::PlayerA));
        assert_eq!(session.game().board().filled_count(), 0);
        session.submit_move(2, 2).unwrap();
        assert_eq!(session.game().history().len(), 1);
    }

    #[test]
    fn test_generated_names_for_unnamed_sides() {
        let session = create_session(GameSettings::default());

        let [a, b] = session.game().players();
        assert!(!a.name.is_empty());
        assert!(!b.name.is_empty());
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_invalid_settings_rejected() {
        let settings = GameSettings {
            board_size: 3,
            win_length: 4,
            ..GameSettings::default()
        };

        let result = ConnectKSession::new(&settings, NoopObserver, SessionRng::new(1));

        assert!(matches!(result, Err(GameError::InvalidSettings(_))));
    }
}
