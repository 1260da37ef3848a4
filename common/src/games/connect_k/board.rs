use std::fmt;

use super::types::{Mark, Position};
use crate::error::{GameError, GameResult};

const CELLS_PER_WORD: usize = 32;

/// Packed row-major encoding of every cell, two bits per cell.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BoardKey(Vec<u64>);

/// Square grid of marks. The size is fixed at construction.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Board {
    size: usize,
    cells: Vec<Mark>,
}

impl Board {
    pub fn new(size: usize) -> Self {
        Self {
            size,
            cells: vec![Mark::Empty; size * size],
        }
    }

    /// Parses one string per row, e.g. `["XX.", "OO.", "..."]`.
    pub fn from_rows(rows: &[&str]) -> GameResult<Self> {
        let size = rows.len();
        let mut board = Self::new(size);
        for (x, row) in rows.iter().enumerate() {
            let symbols: Vec<char> = row.chars().collect();
            if symbols.len() != size {
                return Err(GameError::InvalidSettings(format!(
                    "row {} has {} cells, expected {}",
                    x,
                    symbols.len(),
                    size
                )));
            }
            for (y, symbol) in symbols.into_iter().enumerate() {
                let mark = Mark::from_symbol(symbol).ok_or_else(|| {
                    GameError::InvalidSettings(format!("unknown cell symbol '{}'", symbol))
                })?;
                board.put(Position::new(x, y), mark);
            }
        }
        Ok(board)
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn in_bounds(&self, x: usize, y: usize) -> bool {
        x < self.size && y < self.size
    }

    fn check_bounds(&self, x: usize, y: usize) -> GameResult<()> {
        if self.in_bounds(x, y) {
            Ok(())
        } else {
            Err(GameError::OutOfRange {
                x,
                y,
                size: self.size,
            })
        }
    }

    pub fn get(&self, x: usize, y: usize) -> GameResult<Mark> {
        self.check_bounds(x, y)?;
        Ok(self.cells[x * self.size + y])
    }

    pub fn is_empty(&self, x: usize, y: usize) -> GameResult<bool> {
        Ok(self.get(x, y)? == Mark::Empty)
    }

    /// Sets an empty cell. Out-of-range coordinates, occupied cells and
    /// `Mark::Empty` are rejected and leave the board untouched.
    pub fn place(&mut self, x: usize, y: usize, mark: Mark) -> GameResult<()> {
        if !self.in_bounds(x, y) {
            return Err(GameError::invalid_move(format!(
                "position ({}, {}) is outside the {}x{} board",
                x, y, self.size, self.size
            )));
        }
        if mark == Mark::Empty {
            return Err(GameError::invalid_move("cannot place an empty mark"));
        }
        if self.cells[x * self.size + y] != Mark::Empty {
            return Err(GameError::invalid_move(format!(
                "cell ({}, {}) is already marked",
                x, y
            )));
        }
        self.cells[x * self.size + y] = mark;
        Ok(())
    }

    pub fn is_full(&self) -> bool {
        self.cells.iter().all(|&cell| cell != Mark::Empty)
    }

    pub fn filled_count(&self) -> usize {
        self.cells.iter().filter(|&&cell| cell != Mark::Empty).count()
    }

    pub fn empty_count(&self) -> usize {
        self.cells.len() - self.filled_count()
    }

    /// Empty cells in row-major order.
    pub fn available_moves(&self) -> Vec<Position> {
        self.cells
            .iter()
            .enumerate()
            .filter(|&(_, &cell)| cell == Mark::Empty)
            .map(|(index, _)| Position::new(index / self.size, index % self.size))
            .collect()
    }

    pub fn rows(&self) -> impl Iterator<Item = &[Mark]> {
        // chunks(0) panics
        self.cells.chunks(self.size.max(1))
    }

    /// Row-major text form, one symbol per cell, e.g. `"XX.OO...."`.
    pub fn serialize(&self) -> String {
        self.cells.iter().map(Mark::symbol).collect()
    }

    pub fn key(&self) -> BoardKey {
        let mut words = vec![0u64; self.cells.len().div_ceil(CELLS_PER_WORD)];
        for (index, cell) in self.cells.iter().enumerate() {
            words[index / CELLS_PER_WORD] |= cell.bits() << ((index % CELLS_PER_WORD) * 2);
        }
        BoardKey(words)
    }

    pub fn with_marks_swapped(&self) -> Self {
        Self {
            size: self.size,
            cells: self
                .cells
                .iter()
                .map(|cell| cell.opponent().unwrap_or(Mark::Empty))
                .collect(),
        }
    }

    #[inline]
    pub(crate) fn at(&self, x: usize, y: usize) -> Mark {
        self.cells[x * self.size + y]
    }

    #[inline]
    pub(crate) fn put(&mut self, pos: Position, mark: Mark) {
        self.cells[pos.x * self.size + pos.y] = mark;
    }

    #[inline]
    pub(crate) fn erase(&mut self, pos: Position) {
        self.cells[pos.x * self.size + pos.y] = Mark::Empty;
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "   ")?;
        for y in 0..self.size {
            write!(f, "{:>3}", y)?;
        }
        writeln!(f)?;
        for (x, row) in self.rows().enumerate() {
            write!(f, "{:>3}", x)?;
            for cell in row {
                write!(f, "{:>3}", cell.symbol())?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_board_is_empty() {
        let board = Board::new(4);

        assert_eq!(board.size(), 4);
        assert_eq!(board.empty_count(), 16);
        assert!(!board.is_full());
        assert_eq!(board.available_moves().len(), 16);
    }

    #[test]
    fn test_place_sets_only_that_cell() {
        let mut board = Board::new(3);

        board.place(1, 2, Mark::PlayerA).unwrap();

        assert_eq!(board.get(1, 2).unwrap(), Mark::PlayerA);
        assert_eq!(board.filled_count(), 1);
        assert!(!board.is_empty(1, 2).unwrap());
        assert!(board.is_empty(2, 1).unwrap());
    }

    #[test]
    fn test_place_on_occupied_cell_fails() {
        let mut board = Board::new(3);
        board.place(0, 0, Mark::PlayerA).unwrap();

        let result = board.place(0, 0, Mark::PlayerB);

        assert!(matches!(result, Err(GameError::InvalidMove { .. })));
        assert_eq!(board.get(0, 0).unwrap(), Mark::PlayerA);
    }

    #[test]
    fn test_place_out_of_bounds_fails() {
        let mut board = Board::new(3);

        let result = board.place(3, 0, Mark::PlayerA);

        assert!(matches!(result, Err(GameError::InvalidMove { .. })));
        assert_eq!(board.filled_count(), 0);
    }

    #[test]
    fn test_place_empty_mark_fails() {
        let mut board = Board::new(3);

        assert!(board.place(0, 0, Mark::Empty).is_err());
    }

    #[test]
    fn test_is_empty_out_of_range() {
        let board = Board::new(3);

        assert_eq!(
            board.is_empty(0, 5),
            Err(GameError::OutOfRange { x: 0, y: 5, size: 3 })
        );
    }

    #[test]
    fn test_available_moves_row_major() {
        let board = Board::from_rows(&["X.", ".O"]).unwrap();

        assert_eq!(
            board.available_moves(),
            vec![Position::new(0, 1), Position::new(1, 0)]
        );
    }

    #[test]
    fn test_full_board() {
        let board = Board::from_rows(&["XOX", "XOO", "OXX"]).unwrap();

        assert!(board.is_full());
        assert!(board.available_moves().is_empty());
    }

    #[test]
    fn test_from_rows_rejects_ragged_input() {
        assert!(Board::from_rows(&["XO", "X"]).is_err());
        assert!(Board::from_rows(&["X?", ".."]).is_err());
    }

    #[test]
    fn test_serialize_row_major() {
        let board = Board::from_rows(&["XX.", "OO.", "..."]).unwrap();

        assert_eq!(board.serialize(), "XX.OO....");
    }

    #[test]
    fn test_key_distinguishes_marks() {
        let a = Board::from_rows(&["X..", "...", "..."]).unwrap();
        let b = Board::from_rows(&["O..", "...", "..."]).unwrap();
        let c = Board::from_rows(&["X..", "...", "..."]).unwrap();

        assert_ne!(a.key(), b.key());
        assert_eq!(a.key(), c.key());
    }

    #[test]
    fn test_key_spans_several_words() {
        let mut a = Board::new(8);
        let mut b = Board::new(8);
        a.place(7, 7, Mark::PlayerA).unwrap();
        b.place(7, 7, Mark::PlayerB).unwrap();

        assert_ne!(a.key(), b.key());
        assert_ne!(a.key(), Board::new(8).key());
    }

    #[test]
    fn test_swap_marks() {
        let board = Board::from_rows(&["XO", ".X"]).unwrap();

        assert_eq!(board.with_marks_swapped().serialize(), "OX.O");
    }

    #[test]
    fn test_display_contains_rows() {
        let board = Board::from_rows(&["X.", ".O"]).unwrap();
        let text = board.to_string();

        assert_eq!(text.lines().count(), 3);
        assert!(text.contains('X'));
        assert!(text.contains('O'));
    }
}
