use orta_core::engine::search::AlphaBetaEngine;
use orta_core::logic::board::Side;
use orta_core::logic::game::{GameConfig, GameState, GameStatus, TurnSnapshot};
use std::error::Error;
use std::io::{self, BufRead, Write};

#[derive(Debug, Default)]
struct Options {
    config_path: Option<String>,
    json: bool,
}

impl Options {
    fn from_args() -> Self {
        let mut options = Self::default();
        for arg in std::env::args().skip(1) {
            if arg == "--json" {
                options.json = true;
            } else {
                options.config_path = Some(arg);
            }
        }
        options
    }

    fn load_config(&self) -> Result<GameConfig, Box<dyn Error>> {
        let Some(path) = &self.config_path else {
            return Ok(GameConfig::default());
        };
        let text = std::fs::read_to_string(path)?;
        let config = GameConfig::load_from_json(&text)?;
        tracing::info!(path = %path, "loaded config");
        Ok(config)
    }
}

/// Reads four numbers, `from_row from_col to_row to_col`, in any separator.
fn parse_move(line: &str) -> Option<((usize, usize), (usize, usize))> {
    let numbers: Vec<usize> = line
        .split(|c: char| !c.is_ascii_digit())
        .filter(|s| !s.is_empty())
        .map(str::parse)
        .collect::<Result<_, _>>()
        .ok()?;
    match *numbers.as_slice() {
        [from_row, from_col, to_row, to_col] => Some(((from_row, from_col), (to_row, to_col))),
        _ => None,
    }
}

fn print_snapshot(
    out: &mut impl Write,
    snap: &TurnSnapshot,
    json: bool,
) -> Result<(), Box<dyn Error>> {
    if json {
        writeln!(out, "{}", serde_json::to_string(snap)?)?;
        return Ok(());
    }
    writeln!(out, "{}", snap.board)?;
    writeln!(
        out,
        "moves {} | Red took {} | Blue took {}",
        snap.move_count,
        snap.captures_by(Side::Red),
        snap.captures_by(Side::Blue)
    )?;
    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt::init();

    let options = Options::from_args();
    let config = options.load_config()?;
    let mut engine = AlphaBetaEngine::new();
    let mut game = GameState::new(config);

    let mut lines = io::stdin().lock().lines();
    let mut out = io::stdout().lock();
    print_snapshot(&mut out, &game.snapshot(), options.json)?;

    while !game.is_over() {
        if game.turn() == game.config().computer_side {
            let snap = game.play_computer_turn(&mut engine)?;
            tracing::info!(
                side = %game.config().computer_side,
                last_move = ?snap.last_move,
                "computer turn finished"
            );
            print_snapshot(&mut out, &snap, options.json)?;
            continue;
        }

        write!(
            out,
            "{} to move, {} left (row col row col): ",
            game.turn(),
            game.moves_left()
        )?;
        out.flush()?;
        let Some(line) = lines.next() else {
            break;
        };
        let line = line?;
        let Some((from, to)) = parse_move(&line) else {
            writeln!(out, "could not read a move from {line:?}")?;
            continue;
        };
        match game.submit_coords(from, to) {
            Ok(snap) => print_snapshot(&mut out, &snap, options.json)?,
            Err(err) => {
                tracing::warn!(%err, "move rejected");
                writeln!(out, "rejected: {err}")?;
            }
        }
    }

    if let GameStatus::Over(result) = game.status() {
        writeln!(out, "{result}")?;
    }
    Ok(())
}
