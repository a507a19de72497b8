use crate::engine::Move;
use crate::logic::board::{Board, Position, Side, DIRECTIONS};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum MoveError {
    #[error("position is off the board")]
    OutOfBounds,
    #[error("there is no piece on the source square")]
    NoPieceAtSource,
    #[error("the piece on the source square belongs to the opponent")]
    NotYourPiece,
    #[error("the destination square is occupied")]
    DestinationOccupied,
    #[error("pieces move exactly one square up, down, left or right")]
    NotAdjacent,
    #[error("that square was already used this turn; move a different piece")]
    PieceAlreadyUsed,
    #[error("it is not your turn")]
    NotYourTurn,
    #[error("the game is over")]
    GameOver,
}

/// Checks a single-step move for `side`. Pure: the board is never touched.
pub fn validate_move(board: &Board, mv: Move, side: Side) -> Result<(), MoveError> {
    match board.get(mv.from) {
        None => return Err(MoveError::NoPieceAtSource),
        Some(owner) if owner != side => return Err(MoveError::NotYourPiece),
        Some(_) => {}
    }
    if !mv.from.is_adjacent(mv.to) {
        return Err(MoveError::NotAdjacent);
    }
    if !board.is_empty_at(mv.to) {
        return Err(MoveError::DestinationOccupied);
    }
    Ok(())
}

/// Relocates the moving piece. Does not validate; callers on the
/// human-facing path run [`validate_move`] first.
pub fn apply_move(board: &mut Board, mv: Move) {
    board.move_piece(mv.from, mv.to);
}

/// Squares removed by one sub-move, split by owner.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CaptureSet {
    /// Opponent squares taken by line scans.
    pub taken: Vec<Position>,
    /// The mover itself, when it stepped into a pin.
    pub pinned: Option<Position>,
}

impl CaptureSet {
    pub fn len(&self) -> usize {
        self.taken.len() + usize::from(self.pinned.is_some())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = Position> + '_ {
        self.taken.iter().copied().chain(self.pinned)
    }
}

/// Works out which squares `mv` captures, reading the board after
/// [`apply_move`]. Nothing is removed here.
pub fn find_captures(board: &Board, mv: Move) -> CaptureSet {
    let mut captures = CaptureSet::default();
    let Some(mover) = board.get(mv.to) else {
        return captures;
    };
    let opponent = mover.opposite();

    // Line scans: a run of opponents closed off by a friendly piece or the edge
    for &(dr, dc) in &DIRECTIONS {
        let mut run = Vec::new();
        let mut cursor = mv.to.offset(dr, dc);
        loop {
            let Some(pos) = cursor else {
                captures.taken.append(&mut run);
                break;
            };
            match board.get(pos) {
                Some(side) if side == opponent => run.push(pos),
                Some(_) => {
                    captures.taken.append(&mut run);
                    break;
                }
                None => break,
            }
            cursor = pos.offset(dr, dc);
        }
    }

    // Pin: opponent on one side, opponent or edge directly opposite
    let pinned = DIRECTIONS.iter().any(|&(dr, dc)| {
        let near = mv.to.offset(dr, dc);
        if near.and_then(|p| board.get(p)) != Some(opponent) {
            return false;
        }
        mv.to
            .offset(-dr, -dc)
            .map_or(true, |far| board.get(far) == Some(opponent))
    });
    if pinned {
        captures.pinned = Some(mv.to);
    }

    captures.taken.sort_unstable();
    captures.taken.dedup();
    captures
}

/// Removes everything in `captures` in one pass.
pub fn remove_captures(board: &mut Board, captures: &CaptureSet) {
    for pos in captures.iter() {
        board.set(pos, None);
    }
}

/// Resolves captures around the square `mv` landed on and returns the
/// number of cleared squares. Run directly after [`apply_move`].
pub fn resolve_captures(board: &mut Board, mv: Move) -> usize {
    let captures = find_captures(board, mv);
    remove_captures(board, &captures);
    captures.len()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameResult {
    Winner(Side),
    Draw,
}

impl GameResult {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Winner(Side::Red) => "Red wins",
            Self::Winner(Side::Blue) => "Blue wins",
            Self::Draw => "Draw",
        }
    }
}

impl std::fmt::Display for GameResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Terminal check after a sub-move. A wiped-out side outranks the move cap.
pub const fn check_end(board: &Board, move_count: u32, max_moves: u32) -> Option<GameResult> {
    if board.count(Side::Red) == 0 {
        return Some(GameResult::Winner(Side::Blue));
    }
    if board.count(Side::Blue) == 0 {
        return Some(GameResult::Winner(Side::Red));
    }
    if move_count >= max_moves {
        return Some(GameResult::Draw);
    }
    None
}
