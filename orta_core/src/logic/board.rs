use serde::{Deserialize, Serialize};
use serde_big_array::BigArray;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

pub const BOARD_SIZE: usize = 7;
pub const SQUARE_COUNT: usize = BOARD_SIZE * BOARD_SIZE;

/// Orthogonal unit steps as `(row, col)` deltas, in generation order.
pub const DIRECTIONS: [(isize, isize); 4] = [(0, 1), (0, -1), (1, 0), (-1, 0)];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Red,
    Blue,
}

impl Side {
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::Red => Self::Blue,
            Self::Blue => Self::Red,
        }
    }

    pub const fn index(self) -> usize {
        match self {
            Self::Red => 0,
            Self::Blue => 1,
        }
    }

    const fn symbol(self) -> char {
        match self {
            Self::Red => 'R',
            Self::Blue => 'B',
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Red => f.write_str("Red"),
            Self::Blue => f.write_str("Blue"),
        }
    }
}

/// A square on the board. Construction is bounds-checked, so every
/// `Position` in circulation is on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "(usize, usize)", into = "(usize, usize)")]
pub struct Position {
    row: usize,
    col: usize,
}

impl Position {
    #[must_use]
    pub const fn new(row: usize, col: usize) -> Option<Self> {
        if row < BOARD_SIZE && col < BOARD_SIZE {
            Some(Self { row, col })
        } else {
            None
        }
    }

    pub const fn row(self) -> usize {
        self.row
    }

    pub const fn col(self) -> usize {
        self.col
    }

    /// Steps by `(dr, dc)`; `None` once the step leaves the board.
    #[must_use]
    pub fn offset(self, dr: isize, dc: isize) -> Option<Self> {
        let row = self.row.checked_add_signed(dr)?;
        let col = self.col.checked_add_signed(dc)?;
        Self::new(row, col)
    }

    pub const fn is_adjacent(self, other: Self) -> bool {
        self.row.abs_diff(other.row) + self.col.abs_diff(other.col) == 1
    }

    const fn square_index(self) -> usize {
        self.row * BOARD_SIZE + self.col
    }

    const fn from_index(sq: usize) -> Self {
        Self {
            row: sq / BOARD_SIZE,
            col: sq % BOARD_SIZE,
        }
    }
}

impl TryFrom<(usize, usize)> for Position {
    type Error = String;

    fn try_from((row, col): (usize, usize)) -> Result<Self, Self::Error> {
        Self::new(row, col).ok_or_else(|| format!("({row},{col}) is off the board"))
    }
}

impl From<Position> for (usize, usize) {
    fn from(pos: Position) -> Self {
        (pos.row, pos.col)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{})", self.row, self.col)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    // Row-major, index = row * 7 + col
    #[serde(with = "BigArray")]
    grid: [Option<Side>; SQUARE_COUNT],
    counts: [usize; 2],
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl Board {
    /// The starting layout: four pieces per side on mirrored corners.
    #[must_use]
    pub fn new() -> Self {
        let mut board = Self::empty();
        board.setup_initial_position();
        board
    }

    #[must_use]
    pub const fn empty() -> Self {
        Self {
            grid: [None; SQUARE_COUNT],
            counts: [0; 2],
        }
    }

    fn setup_initial_position(&mut self) {
        let layout = [
            (0, 0, Side::Red),
            (0, 2, Side::Red),
            (0, 4, Side::Blue),
            (0, 6, Side::Blue),
            (6, 0, Side::Blue),
            (6, 2, Side::Blue),
            (6, 4, Side::Red),
            (6, 6, Side::Red),
        ];
        for (row, col, side) in layout {
            if let Some(pos) = Position::new(row, col) {
                self.set(pos, Some(side));
            }
        }
    }

    #[must_use]
    pub fn get(&self, pos: Position) -> Option<Side> {
        self.grid[pos.square_index()]
    }

    pub fn is_empty_at(&self, pos: Position) -> bool {
        self.get(pos).is_none()
    }

    /// Overwrites a square, keeping the per-side counts in step.
    pub fn set(&mut self, pos: Position, piece: Option<Side>) {
        let sq = pos.square_index();
        if let Some(old) = self.grid[sq] {
            self.counts[old.index()] -= 1;
        }
        if let Some(new) = piece {
            self.counts[new.index()] += 1;
        }
        self.grid[sq] = piece;
    }

    /// Relocates whatever stands on `from` to `to` and clears `from`.
    pub fn move_piece(&mut self, from: Position, to: Position) {
        let piece = self.get(from);
        self.set(from, None);
        self.set(to, piece);
    }

    pub const fn count(&self, side: Side) -> usize {
        self.counts[side.index()]
    }

    /// Squares held by `side`, row-major.
    pub fn pieces(&self, side: Side) -> impl Iterator<Item = Position> + '_ {
        self.grid
            .iter()
            .enumerate()
            .filter(move |&(_, cell)| *cell == Some(side))
            .map(|(sq, _)| Position::from_index(sq))
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, row) in self.grid.chunks(BOARD_SIZE).enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            for cell in row {
                let c = cell.map_or('.', Side::symbol);
                write!(f, "{c}")?;
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseBoardError {
    #[error("expected 7 rows, found {0}")]
    RowCount(usize),
    #[error("row {row} has {len} cells, expected 7")]
    RowLength { row: usize, len: usize },
    #[error("unexpected character {0:?}")]
    BadCell(char),
}

/// Parses the `Display` form: seven lines of `R`, `B` or `.`.
/// Blank lines and surrounding whitespace are ignored.
impl FromStr for Board {
    type Err = ParseBoardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let rows: Vec<&str> = s.lines().map(str::trim).filter(|l| !l.is_empty()).collect();
        if rows.len() != BOARD_SIZE {
            return Err(ParseBoardError::RowCount(rows.len()));
        }

        let mut board = Self::empty();
        for (row, line) in rows.iter().enumerate() {
            let len = line.chars().count();
            if len != BOARD_SIZE {
                return Err(ParseBoardError::RowLength { row, len });
            }
            for (col, ch) in line.chars().enumerate() {
                let piece = match ch {
                    'R' | 'r' => Some(Side::Red),
                    'B' | 'b' => Some(Side::Blue),
                    '.' => None,
                    other => return Err(ParseBoardError::BadCell(other)),
                };
                if let Some(pos) = Position::new(row, col) {
                    board.set(pos, piece);
                }
            }
        }
        Ok(board)
    }
}
