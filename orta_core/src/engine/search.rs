use crate::engine::eval::MaterialEvaluator;
use crate::engine::{Evaluator, Move, SearchStats, Searcher};
use crate::logic::board::{Board, Side};
use crate::logic::generator::MoveGenerator;
use crate::logic::rules::{apply_move, resolve_captures};
use std::time::Instant;

/// Depth-limited minimax with alpha-beta pruning. Red is always the
/// maximizing side. Every branch works on its own board clone, so the
/// caller's board is never touched. Depth is supplied per search.
#[derive(Debug, Default)]
pub struct AlphaBetaEngine {
    evaluator: MaterialEvaluator,
    generator: MoveGenerator,
    nodes_searched: u64,
}

impl AlphaBetaEngine {
    pub const fn new() -> Self {
        Self {
            evaluator: MaterialEvaluator::new(),
            generator: MoveGenerator::new(),
            nodes_searched: 0,
        }
    }

    /// Nodes visited since the last [`Searcher::search`] call began.
    pub const fn nodes_searched(&self) -> u64 {
        self.nodes_searched
    }

    fn child(board: &Board, mv: Move) -> Board {
        let mut next = board.clone();
        apply_move(&mut next, mv);
        resolve_captures(&mut next, mv);
        next
    }

    /// A side without moves at an inner ply is scored as it stands rather
    /// than treated as a pass or a loss.
    pub fn minimax(
        &mut self,
        board: &Board,
        depth: u8,
        mut alpha: i32,
        mut beta: i32,
        maximizing: bool,
    ) -> i32 {
        self.nodes_searched += 1;

        if depth == 0 {
            return self.evaluator.evaluate(board);
        }

        let side = if maximizing { Side::Red } else { Side::Blue };
        let moves = self.generator.generate_moves(board, side);
        if moves.is_empty() {
            return self.evaluator.evaluate(board);
        }

        if maximizing {
            let mut best = i32::MIN;
            for mv in moves {
                let next = Self::child(board, mv);
                let value = self.minimax(&next, depth - 1, alpha, beta, false);
                best = best.max(value);
                alpha = alpha.max(best);
                if beta <= alpha {
                    break;
                }
            }
            best
        } else {
            let mut best = i32::MAX;
            for mv in moves {
                let next = Self::child(board, mv);
                let value = self.minimax(&next, depth - 1, alpha, beta, true);
                best = best.min(value);
                beta = beta.min(best);
                if beta <= alpha {
                    break;
                }
            }
            best
        }
    }

    /// Scores every root move of `side` with a fresh full window and keeps
    /// the strictly best one, so the earliest move wins ties. A root depth
    /// of 0 is searched as 1.
    pub fn select_best_move(&mut self, board: &Board, side: Side, depth: u8) -> Option<Move> {
        let reply_depth = depth.saturating_sub(1);
        let red_to_move = side == Side::Red;
        let mut best: Option<(Move, i32)> = None;

        for mv in self.generator.generate_moves(board, side) {
            let next = Self::child(board, mv);
            let score = self.minimax(&next, reply_depth, i32::MIN, i32::MAX, !red_to_move);
            let improves = best.map_or(true, |(_, best_score)| {
                if red_to_move {
                    score > best_score
                } else {
                    score < best_score
                }
            });
            if improves {
                best = Some((mv, score));
            }
        }

        best.map(|(mv, _)| mv)
    }
}

impl Searcher for AlphaBetaEngine {
    fn search(&mut self, board: &Board, side: Side, depth: u8) -> Option<(Move, SearchStats)> {
        let start = Instant::now();
        self.nodes_searched = 0;

        let mv = self.select_best_move(board, side, depth)?;

        let stats = SearchStats {
            depth,
            nodes: self.nodes_searched,
            time_ms: u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX),
        };
        log::trace!(
            "search {side}: {mv} depth={} nodes={} time={}ms",
            stats.depth,
            stats.nodes,
            stats.time_ms
        );
        Some((mv, stats))
    }
}

/// Best move for `side` under the default engine.
pub fn select_best_move(board: &Board, side: Side, depth: u8) -> Option<Move> {
    AlphaBetaEngine::default().select_best_move(board, side, depth)
}
