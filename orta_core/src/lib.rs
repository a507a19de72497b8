//! Rules engine and minimax search for Orta, a two-player capture game on a
//! 7x7 board. Each turn a side moves up to two different pieces one square
//! orthogonally; runs of enemy pieces closed off by a friendly piece or the
//! board edge are captured, and a piece stepping between two enemies (or an
//! enemy and the edge) is lost.

pub mod engine;
pub mod logic;

pub use engine::eval::evaluate;
pub use engine::search::{select_best_move, AlphaBetaEngine};
pub use engine::{Move, Searcher};
pub use logic::board::{Board, Position, Side};
pub use logic::game::{GameConfig, GameState, GameStatus, TurnSnapshot};
pub use logic::generator::legal_moves;
pub use logic::rules::{apply_move, resolve_captures, GameResult, MoveError};
/// `check_end(board, move_count, max_moves)`: the move cap is passed in, usually
/// `GameConfig::max_moves`.
pub use logic::rules::check_end;

/// The fixed starting layout.
#[must_use]
pub fn initialize_board() -> Board {
    Board::new()
}
