use std::time::{Duration, Instant};

use super::board::Board;
use super::game_state::ConnectKGameState;
use super::rules::Rules;
use super::search::{SCORE_INFINITY, SearchNode, SearchStats, Searcher, depth_budget};
use super::types::{ComputerStrategy, Mark, Position, SearchDepth};
use crate::error::{GameError, GameResult};
use crate::games::SessionRng;
use crate::log_debug;

pub struct BotInput {
    pub board: Board,
    pub rules: Rules,
    pub current_mark: Mark,
    pub depth: SearchDepth,
    pub time_limit: Option<Duration>,
}

impl BotInput {
    pub fn from_game_state(state: &ConnectKGameState, depth: SearchDepth) -> Self {
        Self {
            board: state.board().clone(),
            rules: state.rules(),
            current_mark: state.current_mark(),
            depth,
            time_limit: None,
        }
    }

    pub fn with_time_limit(mut self, time_limit: Option<Duration>) -> Self {
        self.time_limit = time_limit;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BotDecision {
    pub position: Position,
    pub score: i32,
    pub depth: usize,
    pub stats: SearchStats,
}

pub fn calculate_move(
    strategy: ComputerStrategy,
    input: &BotInput,
    rng: &mut SessionRng,
) -> GameResult<Position> {
    match strategy {
        ComputerStrategy::Minimax => find_best_move(input).map(|decision| decision.position),
        ComputerStrategy::Random => calculate_random_move(input, rng),
    }
}

fn calculate_random_move(input: &BotInput, rng: &mut SessionRng) -> GameResult<Position> {
    let available_moves = input.board.available_moves();
    rng.choose(&available_moves)
        .copied()
        .ok_or(GameError::NoLegalMove)
}

/// Tries every empty cell in row-major order and keeps the first one with
/// the strictly highest minimax score for `input.current_mark`. Each
/// candidate is searched `input.depth` plies below the candidate move.
pub fn find_best_move(input: &BotInput) -> GameResult<BotDecision> {
    let bot_mark = input.current_mark;
    let Some(opponent_mark) = bot_mark.opponent() else {
        return Err(GameError::invalid_move("no side to move"));
    };
    if input.board.size() != input.rules.board_size() {
        return Err(GameError::InvalidSettings(format!(
            "board size {} does not match rules board size {}",
            input.board.size(),
            input.rules.board_size()
        )));
    }

    if let Some(winner) = input.rules.winner(&input.board) {
        return Err(GameError::invalid_move(format!(
            "{} has already won on this board",
            winner
        )));
    }

    let available_moves = input.board.available_moves();
    if available_moves.is_empty() {
        return Err(GameError::NoLegalMove);
    }

    let started = Instant::now();
    let mut depth = 0;
    let mut searcher = Searcher::new(input.rules);
    if let Some(time_limit) = input.time_limit {
        searcher = searcher.with_deadline(started + time_limit);
    }

    let mut node = SearchNode::new(input.board.clone(), bot_mark)?;
    let mut best: Option<(Position, i32)> = None;

    for pos in available_moves {
        let previous = node.play(pos);
        debug_assert_eq!(node.to_move(), opponent_mark);

        depth = depth_budget(node.board(), input.depth);
        let score = searcher.evaluate(&mut node, depth, -SCORE_INFINITY, SCORE_INFINITY, false);

        node.undo(pos, previous);

        if best.is_none_or(|(_, best_score)| score > best_score) {
            best = Some((pos, score));
        }
    }

    let (position, score) = best.ok_or(GameError::NoLegalMove)?;
    let stats = searcher.stats();

    log_debug!(
        "Minimax for {} chose {} score={} depth={} nodes={} cutoffs={} cache_hits={}/{} timed_out={} in {:?}",
        bot_mark,
        position,
        score,
        depth,
        stats.nodes,
        stats.cutoffs,
        stats.cache_hits,
        stats.cache_probes,
        stats.timed_out,
        started.elapsed()
    );

    Ok(BotDecision {
        position,
        score,
        depth,
        stats,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(rows: &[&str], win_length: usize, mark: Mark, depth: SearchDepth) -> BotInput {
        let board = Board::from_rows(rows).unwrap();
        BotInput {
            rules: Rules::new(board.size(), win_length).unwrap(),
            board,
            current_mark: mark,
            depth,
            time_limit: None,
        }
    }

    fn is_corner(pos: Position) -> bool {
        (pos.x == 0 || pos.x == 2) && (pos.y == 0 || pos.y == 2)
    }

    #[test]
    fn test_takes_winning_move() {
        let input = input(&["XX.", "OO.", "..."], 3, Mark::PlayerA, SearchDepth::Auto);

        let decision = find_best_move(&input).unwrap();

        assert_eq!(decision.position, Position::new(0, 2));
        assert!(decision.score > 0);
    }

    #[test]
    fn test_blocks_opponent_win() {
        let input = input(&["XX.", "O..", "..."], 3, Mark::PlayerB, SearchDepth::Auto);

        let decision = find_best_move(&input).unwrap();

        assert_eq!(decision.position, Position::new(0, 2));
    }

    #[test]
    fn test_answers_center_with_corner() {
        let input = input(&["...", ".X.", "..."], 3, Mark::PlayerB, SearchDepth::Auto);

        let decision = find_best_move(&input).unwrap();

        assert!(is_corner(decision.position), "chose {}", decision.position);
        assert_eq!(decision.position, Position::new(0, 0));
        assert_eq!(decision.score, 0);
    }

    #[test]
    fn test_opening_move_is_not_losing() {
        let input = input(&["...", "...", "..."], 3, Mark::PlayerA, SearchDepth::Auto);

        let decision = find_best_move(&input).unwrap();

        assert_eq!(decision.depth, 8);
        assert!(decision.score >= 0);
    }

    #[test]
    fn test_ties_keep_first_cell() {
        // One reply can't complete a line, so every cell scores 0.
        let input = input(&["X..", "...", "..."], 3, Mark::PlayerB, SearchDepth::Fixed(1));

        let decision = find_best_move(&input).unwrap();

        assert_eq!(decision.position, Position::new(0, 1));
        assert_eq!(decision.score, 0);
    }

    #[test]
    fn test_depth_one_sees_opponent_reply() {
        let input = input(&["...", "XX.", "O.."], 3, Mark::PlayerB, SearchDepth::Fixed(1));

        let decision = find_best_move(&input).unwrap();

        assert_eq!(decision.position, Position::new(1, 2));
        assert_eq!(decision.depth, 1);
        assert_eq!(decision.score, 0);
    }

    #[test]
    fn test_board_with_winner_rejected() {
        let input = input(&["XXX", "OO.", "..."], 3, Mark::PlayerB, SearchDepth::Auto);

        assert!(matches!(
            find_best_move(&input),
            Err(GameError::InvalidMove { .. })
        ));
    }

    #[test]
    fn test_cache_does_not_carry_over_between_calls() {
        let input = input(&["X..", "...", "..."], 3, Mark::PlayerB, SearchDepth::Auto);

        let first = find_best_move(&input).unwrap();
        let second = find_best_move(&input).unwrap();

        assert_eq!(first, second);
        assert!(first.stats.cache_stores > 0);
    }

    #[test]
    fn test_never_returns_occupied_cell() {
        let mut rng = SessionRng::new(8);
        let rules = Rules::new(4, 3).unwrap();

        for _ in 0..20 {
            let mut board = rules.new_board();
            let mut mark = Mark::PlayerA;
            while rules.winner(&board).is_none() && !board.is_full() {
                let input = BotInput {
                    board: board.clone(),
                    rules,
                    current_mark: mark,
                    depth: SearchDepth::Fixed(2),
                    time_limit: None,
                };
                let pos = if rng.random_bool() {
                    find_best_move(&input).unwrap().position
                } else {
                    calculate_move(ComputerStrategy::Random, &input, &mut rng).unwrap()
                };

                assert!(board.is_empty(pos.x, pos.y).unwrap());
                board.place(pos.x, pos.y, mark).unwrap();
                mark = mark.opponent().unwrap();
            }
        }
    }

    #[test]
    fn test_full_board_has_no_legal_move() {
        let input = input(&["XOX", "XOO", "OXX"], 3, Mark::PlayerB, SearchDepth::Auto);
        let mut rng = SessionRng::new(1);

        assert_eq!(find_best_move(&input), Err(GameError::NoLegalMove));
        assert_eq!(
            calculate_move(ComputerStrategy::Random, &input, &mut rng),
            Err(GameError::NoLegalMove)
        );
    }

    #[test]
    fn test_search_leaves_input_untouched() {
        let input = input(&["X..", ".O.", "..."], 3, Mark::PlayerA, SearchDepth::Auto);
        let before = input.board.serialize();

        find_best_move(&input).unwrap();

        assert_eq!(input.board.serialize(), before);
    }

    #[test]
    fn test_depth_limited_search_on_larger_board_terminates() {
        let input = input(
            &[".....", ".....", ".....", ".....", "....."],
            4,
            Mark::PlayerA,
            SearchDepth::Fixed(3),
        );
        let started = Instant::now();

        let decision = find_best_move(&input).unwrap();

        assert_eq!(decision.depth, 3);
        assert!(input.board.is_empty(decision.position.x, decision.position.y).unwrap());
        assert!(started.elapsed() < Duration::from_secs(30));
    }

    #[test]
    fn test_time_limit_still_returns_a_move() {
        let input = input(
            &[".....", ".....", ".....", ".....", "....."],
            4,
            Mark::PlayerB,
            SearchDepth::Fixed(8),
        )
        .with_time_limit(Some(Duration::from_millis(20)));

        let decision = find_best_move(&input).unwrap();

        assert!(input.board.is_empty(decision.position.x, decision.position.y).unwrap());
    }

    #[test]
    fn test_mismatched_rules_rejected() {
        let board = Board::new(3);
        let input = BotInput {
            board,
            rules: Rules::new(4, 3).unwrap(),
            current_mark: Mark::PlayerA,
            depth: SearchDepth::Auto,
            time_limit: None,
        };

        assert!(matches!(
            find_best_move(&input),
            Err(GameError::InvalidSettings(_))
        ));
    }
}
