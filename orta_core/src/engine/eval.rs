use crate::engine::Evaluator;
use crate::logic::board::{Board, Side};

/// Piece-count difference, Red minus Blue.
#[derive(Debug, Clone, Copy, Default)]
pub struct MaterialEvaluator;

impl MaterialEvaluator {
    pub const fn new() -> Self {
        Self
    }
}

impl Evaluator for MaterialEvaluator {
    #[allow(clippy::cast_possible_wrap, clippy::cast_possible_truncation)]
    fn evaluate(&self, board: &Board) -> i32 {
        board.count(Side::Red) as i32 - board.count(Side::Blue) as i32
    }
}

pub fn evaluate(board: &Board) -> i32 {
    MaterialEvaluator::new().evaluate(board)
}
