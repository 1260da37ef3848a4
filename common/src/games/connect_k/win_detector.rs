use super::board::Board;
use super::types::{Mark, Outcome, Position, WinningLine};

// Undirected line directions as (dx, dy): along a row, along a column, both diagonals.
const DIRECTIONS: [(isize, isize); 4] = [(0, 1), (1, 0), (1, 1), (1, -1)];

/// Counts consecutive `mark` cells from `(x, y)` stepping by `(dx, dy)`,
/// excluding the start cell. Stops at the edge, at a different mark, or after
/// `limit` cells.
fn walk(board: &Board, x: usize, y: usize, dx: isize, dy: isize, mark: Mark, limit: usize) -> usize {
    let size = board.size() as isize;
    let mut count = 0;
    let mut nx = x as isize;
    let mut ny = y as isize;

    while count < limit {
        nx += dx;
        ny += dy;
        if nx < 0 || ny < 0 || nx >= size || ny >= size {
            break;
        }
        if board.at(nx as usize, ny as usize) != mark {
            break;
        }
        count += 1;
    }

    count
}

fn run_through(board: &Board, win_length: usize, pos: Position, mark: Mark) -> Option<WinningLine> {
    let limit = win_length.saturating_sub(1);

    for (dx, dy) in DIRECTIONS {
        let forward = walk(board, pos.x, pos.y, dx, dy, mark, limit);
        let backward = walk(board, pos.x, pos.y, -dx, -dy, mark, limit);

        if 1 + forward + backward >= win_length {
            let start = offset(pos, -dx, -dy, backward);
            let end = offset(pos, dx, dy, forward);
            return Some(WinningLine::new(mark, start, end));
        }
    }

    None
}

fn offset(pos: Position, dx: isize, dy: isize, steps: usize) -> Position {
    let steps = steps as isize;
    Position::new(
        (pos.x as isize + dx * steps) as usize,
        (pos.y as isize + dy * steps) as usize,
    )
}

/// Length of the run of the mark at `pos` along `(dx, dy)` in both directions.
/// Zero for an empty or off-board cell.
pub fn run_length(board: &Board, pos: Position, dx: isize, dy: isize) -> usize {
    if !board.in_bounds(pos.x, pos.y) {
        return 0;
    }
    let mark = board.at(pos.x, pos.y);
    if mark == Mark::Empty {
        return 0;
    }
    1 + walk(board, pos.x, pos.y, dx, dy, mark, usize::MAX)
        + walk(board, pos.x, pos.y, -dx, -dy, mark, usize::MAX)
}

/// Anchored check: does the mark on `pos` complete a run of `win_length`?
pub fn check_win_at(board: &Board, win_length: usize, pos: Position) -> Option<Mark> {
    winning_line_at(board, win_length, pos).map(|line| line.mark)
}

pub fn winning_line_at(board: &Board, win_length: usize, pos: Position) -> Option<WinningLine> {
    if !board.in_bounds(pos.x, pos.y) {
        return None;
    }
    let mark = board.at(pos.x, pos.y);
    if mark == Mark::Empty {
        return None;
    }
    run_through(board, win_length, pos, mark)
}

/// Whole-board scan; every occupied cell is tried as the anchor in row-major
/// order and the first winner found is returned.
pub fn check_win(board: &Board, win_length: usize) -> Option<Mark> {
    check_win_with_line(board, win_length).map(|line| line.mark)
}

pub fn check_win_with_line(board: &Board, win_length: usize) -> Option<WinningLine> {
    let size = board.size();
    for x in 0..size {
        for y in 0..size {
            if let Some(line) = winning_line_at(board, win_length, Position::new(x, y)) {
                return Some(line);
            }
        }
    }
    None
}

/// Signed winner: +1 when `PlayerA` has a run, -1 for `PlayerB`, 0 otherwise.
pub fn signed_winner(board: &Board, win_length: usize) -> i32 {
    check_win(board, win_length).map_or(0, |mark| mark.sign())
}

/// Win, draw or continue. With `last_move` the win check is anchored there,
/// which is only sound when the position before that move had no winner.
pub fn evaluate_outcome(board: &Board, win_length: usize, last_move: Option<Position>) -> Outcome {
    let winner = match last_move {
        Some(pos) => check_win_at(board, win_length, pos),
        None => check_win(board, win_length),
    };

    match winner {
        Some(mark) => Outcome::Won(mark),
        None if board.is_full() => Outcome::Draw,
        None => Outcome::InProgress,
    }
}
