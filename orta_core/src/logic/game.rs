use crate::engine::config::EngineConfig;
use crate::engine::{Move, Searcher};
use crate::logic::board::{Board, Position, Side};
use crate::logic::generator::MoveGenerator;
use crate::logic::rules::{
    apply_move, check_end, find_captures, remove_captures, validate_move, GameResult, MoveError,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

pub const DEFAULT_MAX_MOVES: u32 = 50;
pub const SUB_MOVES_PER_TURN: u8 = 2;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Sub-moves, both sides combined, before the game is drawn.
    pub max_moves: u32,
    pub computer_side: Side,
    pub search: EngineConfig,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            max_moves: DEFAULT_MAX_MOVES,
            computer_side: Side::Red,
            search: EngineConfig::default(),
        }
    }
}

impl GameConfig {
    /// Missing keys keep their defaults.
    pub fn load_from_json(json_str: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json_str)
    }

    pub const fn human_side(&self) -> Side {
        self.computer_side.opposite()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameStatus {
    Playing,
    Over(GameResult),
}

/// Read-only view handed back after every orchestration call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnSnapshot {
    pub board: Board,
    pub turn: Side,
    pub moves_left: u8,
    pub captures: [u32; 2],
    pub status: GameStatus,
    pub move_count: u32,
    pub last_move: Option<Move>,
}

impl TurnSnapshot {
    pub const fn captures_by(&self, side: Side) -> u32 {
        self.captures[side.index()]
    }

    pub const fn is_over(&self) -> bool {
        matches!(self.status, GameStatus::Over(_))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    board: Board,
    config: GameConfig,
    turn: Side,
    turn_number: u32,
    moves_left: u8,
    // Squares moved from or to during the current turn
    used_this_turn: BTreeSet<Position>,
    captures: [u32; 2],
    move_count: u32,
    status: GameStatus,
    last_move: Option<Move>,
}

impl Default for GameState {
    fn default() -> Self {
        Self::new(GameConfig::default())
    }
}

impl GameState {
    /// Fresh game from the starting layout; Red moves first.
    #[must_use]
    pub fn new(config: GameConfig) -> Self {
        Self::from_position(config, Board::new(), Side::Red)
    }

    /// Starts from an arbitrary position with `turn` to move.
    #[must_use]
    pub fn from_position(config: GameConfig, board: Board, turn: Side) -> Self {
        let mut state = Self {
            board,
            config,
            turn,
            turn_number: 0,
            moves_left: SUB_MOVES_PER_TURN,
            used_this_turn: BTreeSet::new(),
            captures: [0; 2],
            move_count: 0,
            status: GameStatus::Playing,
            last_move: None,
        };
        if let Some(result) = check_end(&state.board, 0, state.config.max_moves) {
            state.finish(result);
        } else {
            state.begin_turn(turn);
        }
        state
    }

    pub const fn board(&self) -> &Board {
        &self.board
    }

    pub const fn config(&self) -> &GameConfig {
        &self.config
    }

    pub const fn turn(&self) -> Side {
        self.turn
    }

    /// Completed turns so far; skipped turns are not counted.
    pub const fn turn_number(&self) -> u32 {
        self.turn_number
    }

    pub const fn moves_left(&self) -> u8 {
        self.moves_left
    }

    pub const fn move_count(&self) -> u32 {
        self.move_count
    }

    pub const fn status(&self) -> GameStatus {
        self.status
    }

    pub const fn is_over(&self) -> bool {
        matches!(self.status, GameStatus::Over(_))
    }

    pub const fn captures_by(&self, side: Side) -> u32 {
        self.captures[side.index()]
    }

    pub const fn last_move(&self) -> Option<Move> {
        self.last_move
    }

    pub fn used_this_turn(&self) -> impl Iterator<Item = Position> + '_ {
        self.used_this_turn.iter().copied()
    }

    pub fn snapshot(&self) -> TurnSnapshot {
        TurnSnapshot {
            board: self.board.clone(),
            turn: self.turn,
            moves_left: self.moves_left,
            captures: self.captures,
            status: self.status,
            move_count: self.move_count,
            last_move: self.last_move,
        }
    }

    const fn turn_allowance(board: &Board, side: Side) -> u8 {
        if board.count(side) == 1 {
            1
        } else {
            SUB_MOVES_PER_TURN
        }
    }

    fn touches_used_square(&self, mv: Move) -> bool {
        self.used_this_turn.contains(&mv.from) || self.used_this_turn.contains(&mv.to)
    }

    /// Legal sub-moves for the side to move that leave this turn's pieces alone.
    pub fn distinct_moves(&self) -> Vec<Move> {
        if self.is_over() {
            return Vec::new();
        }
        MoveGenerator::new()
            .generate_moves(&self.board, self.turn)
            .into_iter()
            .filter(|&mv| !self.touches_used_square(mv))
            .collect()
    }

    /// Full check of a sub-move for the side to move, without committing it.
    pub fn validate_sub_move(&self, mv: Move) -> Result<(), MoveError> {
        if self.is_over() {
            return Err(MoveError::GameOver);
        }
        if self.touches_used_square(mv) {
            return Err(MoveError::PieceAlreadyUsed);
        }
        validate_move(&self.board, mv, self.turn)
    }

    /// Human sub-move. On error nothing changes and the turn stays put.
    pub fn submit_move(&mut self, from: Position, to: Position) -> Result<TurnSnapshot, MoveError> {
        if self.is_over() {
            return Err(MoveError::GameOver);
        }
        if self.turn == self.config.computer_side {
            return Err(MoveError::NotYourTurn);
        }
        let mv = Move::new(from, to);
        self.validate_sub_move(mv)?;
        self.commit_sub_move(mv);
        Ok(self.snapshot())
    }

    /// Same as [`GameState::submit_move`] for raw `(row, col)` input.
    pub fn submit_coords(
        &mut self,
        from: (usize, usize),
        to: (usize, usize),
    ) -> Result<TurnSnapshot, MoveError> {
        let from = Position::new(from.0, from.1).ok_or(MoveError::OutOfBounds)?;
        let to = Position::new(to.0, to.1).ok_or(MoveError::OutOfBounds)?;
        self.submit_move(from, to)
    }

    /// Plays the computer's whole turn. Each sub-move re-runs the search on
    /// the live board; when the best move touches a square already used this
    /// turn, the first remaining distinct move is played instead.
    pub fn play_computer_turn<S: Searcher>(
        &mut self,
        searcher: &mut S,
    ) -> Result<TurnSnapshot, MoveError> {
        if self.is_over() {
            return Err(MoveError::GameOver);
        }
        let side = self.config.computer_side;
        if self.turn != side {
            return Err(MoveError::NotYourTurn);
        }

        let depth = self.config.search.search_depth;
        let turn_number = self.turn_number;
        while !self.is_over() && self.turn_number == turn_number {
            let candidates = self.distinct_moves();
            let Some(&fallback) = candidates.first() else {
                self.end_turn();
                break;
            };

            let mv = match searcher.search(&self.board, side, depth) {
                Some((best, _)) if candidates.contains(&best) => best,
                Some((best, _)) => {
                    log::debug!("{side} best move {best} reuses a piece, playing {fallback}");
                    fallback
                }
                None => fallback,
            };
            self.commit_sub_move(mv);
        }

        Ok(self.snapshot())
    }

    fn commit_sub_move(&mut self, mv: Move) {
        let side = self.turn;
        apply_move(&mut self.board, mv);
        let captures = find_captures(&self.board, mv);
        remove_captures(&mut self.board, &captures);

        self.move_count += 1;
        self.last_move = Some(mv);
        self.moves_left = self.moves_left.saturating_sub(1);
        self.used_this_turn.insert(mv.from);
        self.used_this_turn.insert(mv.to);

        // A pinned mover counts toward the mover's own tally
        #[allow(clippy::cast_possible_truncation)]
        let taken = captures.len() as u32;
        self.captures[side.index()] += taken;
        log::debug!(
            "{side} {mv}: took {taken}{}",
            if captures.pinned.is_some() { ", mover pinned" } else { "" }
        );

        if let Some(result) = check_end(&self.board, self.move_count, self.config.max_moves) {
            self.finish(result);
            return;
        }

        if self.moves_left == 0 || self.distinct_moves().is_empty() {
            self.end_turn();
        }
    }

    fn end_turn(&mut self) {
        self.used_this_turn.clear();
        self.turn_number += 1;
        self.begin_turn(self.turn.opposite());
    }

    /// Hands the move to `side`, or back to the other side when `side` is
    /// stuck. Neither side able to move is a draw.
    fn begin_turn(&mut self, side: Side) {
        let generator = MoveGenerator::new();
        let next = if generator.has_legal_moves(&self.board, side) {
            side
        } else if generator.has_legal_moves(&self.board, side.opposite()) {
            log::debug!("{side} has no legal moves, turn passes to {}", side.opposite());
            side.opposite()
        } else {
            log::debug!("neither side can move");
            self.finish(GameResult::Draw);
            side
        };
        self.turn = next;
        self.moves_left = Self::turn_allowance(&self.board, next);
    }

    fn finish(&mut self, result: GameResult) {
        log::debug!("game over after {} sub-moves: {result}", self.move_count);
        self.status = GameStatus::Over(result);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::SearchStats;
    use std::collections::VecDeque;

    fn pos(row: usize, col: usize) -> Position {
        Position::new(row, col).unwrap()
    }

    fn mv(from: (usize, usize), to: (usize, usize)) -> Move {
        Move::new(pos(from.0, from.1), pos(to.0, to.1))
    }

    fn human_red() -> GameConfig {
        GameConfig {
            computer_side: Side::Blue,
            ..GameConfig::default()
        }
    }

    /// Returns queued moves in order, whatever the board says.
    struct ScriptedSearcher(VecDeque<Move>);

    impl Searcher for ScriptedSearcher {
        fn search(&mut self, _board: &Board, _side: Side, depth: u8) -> Option<(Move, SearchStats)> {
            let mv = self.0.pop_front()?;
            Some((
                mv,
                SearchStats {
                    depth,
                    ..SearchStats::default()
                },
            ))
        }
    }

    #[test]
    fn test_new_game() {
        let game = GameState::default();
        assert_eq!(game.turn(), Side::Red);
        assert_eq!(game.moves_left(), 2);
        assert_eq!(game.move_count(), 0);
        assert_eq!(game.status(), GameStatus::Playing);
        assert_eq!(game.config().computer_side, Side::Red);
        assert_eq!(game.config().search.search_depth, 6);
        assert_eq!(game.config().max_moves, 50);
    }

    #[test]
    fn test_first_sub_move() {
        let mut game = GameState::new(human_red());
        let snap = game.submit_move(pos(0, 0), pos(1, 0)).unwrap();

        assert!(snap.board.is_empty_at(pos(0, 0)));
        assert_eq!(snap.board.get(pos(1, 0)), Some(Side::Red));
        assert_eq!(snap.move_count, 1);
        assert_eq!(snap.captures, [0, 0]);
        assert_eq!(snap.turn, Side::Red);
        assert_eq!(snap.moves_left, 1);
        assert_eq!(snap.last_move, Some(mv((0, 0), (1, 0))));
    }

    #[test]
    fn test_same_piece_twice_is_rejected() {
        let mut game = GameState::new(human_red());
        game.submit_move(pos(0, 0), pos(1, 0)).unwrap();
        let before = game.snapshot();

        assert_eq!(
            game.submit_move(pos(1, 0), pos(2, 0)),
            Err(MoveError::PieceAlreadyUsed)
        );
        assert_eq!(game.snapshot(), before);
        assert_eq!(game.moves_left(), 1);

        let snap = game.submit_move(pos(0, 2), pos(0, 1)).unwrap();
        assert_eq!(snap.move_count, 2);
        assert_eq!(snap.turn, Side::Blue);
    }

    #[test]
    fn test_vacated_square_counts_as_used() {
        let board: Board = "RR.....
                            .......
                            .......
                            .......
                            .......
                            .......
                            .....BB"
            .parse()
            .unwrap();
        let mut game = GameState::from_position(human_red(), board, Side::Red);
        game.submit_move(pos(0, 0), pos(1, 0)).unwrap();
        assert_eq!(
            game.used_this_turn().collect::<Vec<_>>(),
            vec![pos(0, 0), pos(1, 0)]
        );
        assert_eq!(
            game.submit_move(pos(0, 1), pos(0, 0)),
            Err(MoveError::PieceAlreadyUsed)
        );
        assert_eq!(
            game.validate_sub_move(mv((0, 1), (0, 2))),
            Ok(())
        );
    }

    #[test]
    fn test_rejected_move_leaves_state_unchanged() {
        let mut game = GameState::new(human_red());
        let before = game.snapshot();

        assert_eq!(
            game.submit_move(pos(0, 4), pos(1, 4)),
            Err(MoveError::NotYourPiece)
        );
        assert_eq!(
            game.submit_move(pos(0, 0), pos(1, 1)),
            Err(MoveError::NotAdjacent)
        );
        assert_eq!(
            game.submit_move(pos(3, 3), pos(3, 4)),
            Err(MoveError::NoPieceAtSource)
        );
        assert_eq!(
            game.submit_coords((0, 0), (0, 7)),
            Err(MoveError::OutOfBounds)
        );
        assert_eq!(game.snapshot(), before);
    }

    #[test]
    fn test_turn_passes_after_two_sub_moves() {
        let mut game = GameState::new(human_red());
        game.submit_move(pos(0, 0), pos(1, 0)).unwrap();
        let snap = game.submit_move(pos(6, 6), pos(5, 6)).unwrap();

        assert_eq!(snap.turn, Side::Blue);
        assert_eq!(snap.moves_left, 2);
        assert_eq!(snap.move_count, 2);
        assert_eq!(game.turn_number(), 1);
        assert_eq!(game.used_this_turn().count(), 0);

        // Blue is the computer now
        assert_eq!(
            game.submit_move(pos(0, 4), pos(1, 4)),
            Err(MoveError::NotYourTurn)
        );
    }

    #[test]
    fn test_single_piece_gets_one_sub_move() {
        let board: Board = ".......
                            .R.....
                            .......
                            .......
                            .......
                            ....B..
                            ....B.."
            .parse()
            .unwrap();
        let mut game = GameState::from_position(human_red(), board, Side::Red);
        assert_eq!(game.moves_left(), 1);

        let snap = game.submit_move(pos(1, 1), pos(2, 1)).unwrap();
        assert_eq!(snap.turn, Side::Blue);
        assert_eq!(snap.moves_left, 2);
    }

    #[test]
    fn test_flank_capture_wins() {
        let board: Board = ".......
                            .......
                            ...R...
                            RBB....
                            .......
                            .......
                            ......."
            .parse()
            .unwrap();
        let mut game = GameState::from_position(human_red(), board, Side::Red);
        let snap = game.submit_move(pos(2, 3), pos(3, 3)).unwrap();

        assert!(snap.board.is_empty_at(pos(3, 1)));
        assert!(snap.board.is_empty_at(pos(3, 2)));
        assert_eq!(snap.captures_by(Side::Red), 2);
        assert_eq!(snap.status, GameStatus::Over(GameResult::Winner(Side::Red)));
        // The remaining sub-move is abandoned
        assert_eq!(
            game.submit_move(pos(3, 0), pos(4, 0)),
            Err(MoveError::GameOver)
        );
    }

    #[test]
    fn test_pinned_mover_counts_for_the_mover() {
        let board: Board = ".......
                            .......
                            ..R....
                            .B.B...
                            .......
                            .......
                            R......"
            .parse()
            .unwrap();
        let mut game = GameState::from_position(human_red(), board, Side::Red);
        let snap = game.submit_move(pos(2, 2), pos(3, 2)).unwrap();

        assert!(snap.board.is_empty_at(pos(3, 2)));
        assert_eq!(snap.captures_by(Side::Red), 1);
        assert_eq!(snap.captures_by(Side::Blue), 0);
        assert_eq!(snap.status, GameStatus::Playing);
        // Red is down to one piece that has not moved yet, so it may go on
        assert_eq!(snap.turn, Side::Red);
        assert_eq!(snap.moves_left, 1);
    }

    #[test]
    fn test_move_cap_draws() {
        let config = GameConfig {
            max_moves: 3,
            ..human_red()
        };
        let mut game = GameState::new(config);
        game.submit_move(pos(0, 0), pos(1, 0)).unwrap();
        game.submit_move(pos(0, 2), pos(1, 2)).unwrap();
        let mut searcher = ScriptedSearcher(VecDeque::from([mv((0, 4), (1, 4))]));
        let snap = game.play_computer_turn(&mut searcher).unwrap();

        assert_eq!(snap.move_count, 3);
        assert_eq!(snap.status, GameStatus::Over(GameResult::Draw));
        assert!(snap.is_over());
        assert_eq!(
            game.play_computer_turn(&mut searcher),
            Err(MoveError::GameOver)
        );
    }

    #[test]
    fn test_computer_falls_back_to_first_distinct_move() {
        let mut game = GameState::default();
        // Second answer moves the piece that already went
        let mut searcher = ScriptedSearcher(VecDeque::from([
            mv((0, 0), (1, 0)),
            mv((1, 0), (2, 0)),
        ]));
        let snap = game.play_computer_turn(&mut searcher).unwrap();

        assert_eq!(snap.board.get(pos(1, 0)), Some(Side::Red));
        assert!(snap.board.is_empty_at(pos(2, 0)));
        // First distinct candidate: (0,2) stepping right
        assert_eq!(snap.board.get(pos(0, 3)), Some(Side::Red));
        assert_eq!(snap.last_move, Some(mv((0, 2), (0, 3))));
        assert_eq!(snap.turn, Side::Blue);
        assert_eq!(snap.move_count, 2);
    }

    #[test]
    fn test_computer_turn_requires_its_turn() {
        let mut game = GameState::new(human_red());
        let mut searcher = ScriptedSearcher(VecDeque::new());
        assert_eq!(
            game.play_computer_turn(&mut searcher),
            Err(MoveError::NotYourTurn)
        );
    }

    #[test]
    fn test_searcher_without_answer_plays_first_candidate() {
        let mut game = GameState::default();
        let mut searcher = ScriptedSearcher(VecDeque::new());
        let snap = game.play_computer_turn(&mut searcher).unwrap();
        assert_eq!(snap.board.get(pos(0, 1)), Some(Side::Red));
        assert_eq!(snap.board.get(pos(0, 3)), Some(Side::Red));
        assert_eq!(snap.turn, Side::Blue);
    }

    #[test]
    fn test_stuck_side_is_skipped() {
        let board: Board = "BBR....
                            RR.....
                            .......
                            .......
                            .......
                            .......
                            ....R.R"
            .parse()
            .unwrap();
        let mut game = GameState::from_position(human_red(), board, Side::Red);
        game.submit_move(pos(6, 6), pos(5, 6)).unwrap();
        let snap = game.submit_move(pos(6, 4), pos(5, 4)).unwrap();

        assert_eq!(snap.turn, Side::Red);
        assert_eq!(snap.moves_left, 2);
        assert_eq!(snap.status, GameStatus::Playing);
        assert_eq!(game.turn_number(), 1);
    }

    #[test]
    fn test_nobody_can_move_is_a_draw() {
        let full = "RBRBRBR\n".repeat(7);
        let board: Board = full.parse().unwrap();
        let game = GameState::from_position(GameConfig::default(), board, Side::Red);
        assert_eq!(game.status(), GameStatus::Over(GameResult::Draw));
        assert!(game.distinct_moves().is_empty());
    }

    #[test]
    fn test_config_json() {
        let config = GameConfig::load_from_json(
            r#"{ "max_moves": 20, "computer_side": "Blue", "search": { "search_depth": 2 } }"#,
        )
        .unwrap();
        assert_eq!(config.max_moves, 20);
        assert_eq!(config.computer_side, Side::Blue);
        assert_eq!(config.human_side(), Side::Red);
        assert_eq!(config.search.search_depth, 2);

        let partial = GameConfig::load_from_json(r#"{ "max_moves": 10 }"#).unwrap();
        assert_eq!(partial.computer_side, Side::Red);
        assert_eq!(partial.search, EngineConfig::default());

        assert!(GameConfig::load_from_json(r#"{ "computer_side": "Green" }"#).is_err());
    }

    #[test]
    fn test_snapshot_serializes() {
        let game = GameState::default();
        let json = serde_json::to_string(&game.snapshot()).unwrap();
        let back: TurnSnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(back, game.snapshot());
    }
}
