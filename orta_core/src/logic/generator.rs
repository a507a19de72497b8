use crate::engine::Move;
use crate::logic::board::{Board, Side, DIRECTIONS};

#[derive(Debug, Clone, Copy, Default)]
pub struct MoveGenerator;

impl MoveGenerator {
    pub const fn new() -> Self {
        Self
    }

    /// Every single-step move for `side`: pieces in row-major order, each
    /// trying the steps of [`DIRECTIONS`] in turn. Search tie-breaks depend
    /// on this order staying fixed.
    pub fn generate_moves(&self, board: &Board, side: Side) -> Vec<Move> {
        let mut moves = Vec::with_capacity(board.count(side) * DIRECTIONS.len());
        for from in board.pieces(side) {
            for &(dr, dc) in &DIRECTIONS {
                if let Some(to) = from.offset(dr, dc) {
                    if board.is_empty_at(to) {
                        moves.push(Move::new(from, to));
                    }
                }
            }
        }
        moves
    }

    /// Returns `true` as soon as any piece of `side` has an open neighbour.
    pub fn has_legal_moves(&self, board: &Board, side: Side) -> bool {
        board.pieces(side).any(|from| {
            DIRECTIONS
                .iter()
                .filter_map(|&(dr, dc)| from.offset(dr, dc))
                .any(|to| board.is_empty_at(to))
        })
    }
}

pub fn legal_moves(board: &Board, side: Side) -> Vec<Move> {
    MoveGenerator::new().generate_moves(board, side)
}
