//! Minimax with alpha-beta pruning over hypothetical boards.
//!
//! The engine owns a [`SearchNode`] for the duration of a search and mutates
//! it in place: every mark placed while expanding a node is erased again
//! before the next sibling is tried, so a call to [`Searcher::evaluate`]
//! always leaves the node exactly as it found it.
//!
//! Scores are from the point of view of the maximizing side: a win is
//! `+(depth_remaining + 1)`, a loss `-(depth_remaining + 1)`, and a cut-off
//! or full board without a winner is `0`. Scaling by the remaining depth makes
//! the engine prefer faster wins and slower losses.

use std::time::Instant;

use super::board::Board;
use super::rules::Rules;
use super::transposition::{CacheKey, TranspositionCache};
use super::types::{Mark, Position, SearchDepth};
use crate::error::{GameError, GameResult};

/// Widest alpha-beta window bound. Symmetric so scores can be negated safely.
pub const SCORE_INFINITY: i32 = i32::MAX;

pub const WIN_SCORE: i32 = 1;

/// A hypothetical position: a private copy of the board, the side to move,
/// and the move that produced it when known.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchNode {
    board: Board,
    to_move: Mark,
    last_move: Option<Position>,
}

impl SearchNode {
    pub fn new(board: Board, to_move: Mark) -> GameResult<Self> {
        if to_move == Mark::Empty {
            return Err(GameError::InvalidSettings(
                "side to move must be a player mark".to_string(),
            ));
        }
        Ok(Self {
            board,
            to_move,
            last_move: None,
        })
    }

    /// Same as [`SearchNode::new`] but anchors the first win check at `last_move`.
    pub fn after_move(board: Board, to_move: Mark, last_move: Position) -> GameResult<Self> {
        let mut node = Self::new(board, to_move)?;
        node.last_move = Some(last_move);
        Ok(node)
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn to_move(&self) -> Mark {
        self.to_move
    }

    pub fn last_move(&self) -> Option<Position> {
        self.last_move
    }

    /// Places the mover's mark on an empty cell and passes the turn.
    /// Returns the previous `last_move` for [`SearchNode::undo`].
    pub(crate) fn play(&mut self, pos: Position) -> Option<Position> {
        self.board.put(pos, self.to_move);
        self.to_move = self.to_move.opponent().unwrap_or(Mark::Empty);
        self.last_move.replace(pos)
    }

    pub(crate) fn undo(&mut self, pos: Position, previous: Option<Position>) {
        self.board.erase(pos);
        self.to_move = self.to_move.opponent().unwrap_or(Mark::Empty);
        self.last_move = previous;
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchStats {
    pub nodes: u64,
    pub cutoffs: u64,
    pub cache_probes: u64,
    pub cache_hits: u64,
    pub cache_stores: u64,
    pub timed_out: bool,
}

pub struct Searcher {
    rules: Rules,
    cache: Option<TranspositionCache>,
    deadline: Option<Instant>,
    nodes: u64,
    cutoffs: u64,
    timed_out: bool,
}

impl Searcher {
    pub fn new(rules: Rules) -> Self {
        Self {
            rules,
            cache: Some(TranspositionCache::new()),
            deadline: None,
            nodes: 0,
            cutoffs: 0,
            timed_out: false,
        }
    }

    pub fn without_cache(rules: Rules) -> Self {
        Self {
            cache: None,
            ..Self::new(rules)
        }
    }

    /// Past the deadline every unexpanded node scores as a cut-off leaf.
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn rules(&self) -> Rules {
        self.rules
    }

    pub fn stats(&self) -> SearchStats {
        let cache = self.cache.as_ref().map(|cache| cache.stats()).unwrap_or_default();
        SearchStats {
            nodes: self.nodes,
            cutoffs: self.cutoffs,
            cache_probes: cache.probes,
            cache_hits: cache.hits,
            cache_stores: cache.stores,
            timed_out: self.timed_out,
        }
    }

    fn deadline_passed(&mut self) -> bool {
        if self.timed_out {
            return true;
        }
        if let Some(deadline) = self.deadline
            && Instant::now() >= deadline
        {
            self.timed_out = true;
        }
        self.timed_out
    }

    /// Minimax value of `node` searched `depth` plies deep. `maximizing`
    /// says whether the side to move is the side the score favours.
    pub fn evaluate(
        &mut self,
        node: &mut SearchNode,
        depth: usize,
        mut alpha: i32,
        mut beta: i32,
        maximizing: bool,
    ) -> i32 {
        self.nodes += 1;

        let mover = node.to_move;
        let maximizer = if maximizing {
            mover
        } else {
            mover.opponent().unwrap_or(Mark::Empty)
        };

        let winner = match node.last_move {
            Some(pos) => self.rules.winner_at(&node.board, pos),
            None => self.rules.winner(&node.board),
        };
        if let Some(winner) = winner {
            let magnitude = WIN_SCORE * (depth as i32 + 1);
            return if winner == maximizer { magnitude } else { -magnitude };
        }

        if depth == 0 || node.board.is_full() || self.deadline_passed() {
            return 0;
        }

        let key = self
            .cache
            .as_ref()
            .map(|_| CacheKey::new(node.board.key(), mover, maximizing));
        if let (Some(cache), Some(key)) = (self.cache.as_mut(), key.as_ref())
            && let Some(score) = cache.probe(key, depth, alpha, beta)
        {
            return score;
        }

        let (alpha_orig, beta_orig) = (alpha, beta);
        let size = node.board.size();
        let mut best = if maximizing {
            -SCORE_INFINITY
        } else {
            SCORE_INFINITY
        };

        'cells: for x in 0..size {
            for y in 0..size {
                if node.board.at(x, y) != Mark::Empty {
                    continue;
                }

                let pos = Position::new(x, y);
                let previous = node.play(pos);
                let score = self.evaluate(node, depth - 1, alpha, beta, !maximizing);
                node.undo(pos, previous);

                if maximizing {
                    best = best.max(score);
                    alpha = alpha.max(best);
                } else {
                    best = best.min(score);
                    beta = beta.min(best);
                }

                if beta <= alpha {
                    self.cutoffs += 1;
                    break 'cells;
                }
            }
        }

        if !self.timed_out
            && let (Some(cache), Some(key)) = (self.cache.as_mut(), key)
        {
            cache.store(key, depth, best, alpha_orig, beta_orig);
        }

        best
    }
}

fn auto_depth(empty_cells: usize) -> usize {
    match empty_cells {
        0..=9 => empty_cells,
        10..=16 => 5,
        17..=25 => 3,
        26..=49 => 2,
        _ => 1,
    }
}

/// Plies to search below `board`, never more than the cells left to fill.
/// The move selector asks with the board after its candidate move.
pub fn depth_budget(board: &Board, depth: SearchDepth) -> usize {
    let empty_cells = board.empty_count();
    let limit = match depth {
        SearchDepth::Auto => auto_depth(empty_cells),
        SearchDepth::Fixed(plies) => plies,
    };
    limit.min(empty_cells)
}
