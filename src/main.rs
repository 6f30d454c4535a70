//! Mergetui: drag-to-merge number tile puzzle on a 5x5 grid, in the terminal.

mod app;
mod cascade;
mod game;
mod grid;
mod highscores;
mod input;
mod merge;
mod selection;
mod theme;
mod ui;

use anyhow::{Context, Result};
use app::App;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use std::time::Duration;

/// Options derived from CLI that affect the game loop.
#[derive(Debug, Clone)]
pub struct GameConfig {
    pub difficulty: Difficulty,
    pub tick_rate: f64,
    pub game_over_delay: Duration,
    pub seed: Option<u64>,
    pub no_animation: bool,
    pub no_menu: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    if let Some(path) = args.log_file.as_deref() {
        init_logging(path)?;
    }
    let theme = theme::Theme::load(args.theme.as_deref()).unwrap_or_default();
    let records = highscores::RecordsStore::new(args.records.clone().unwrap_or_else(highscores::default_path));
    let config = GameConfig {
        difficulty: args.difficulty,
        tick_rate: args.tick_rate.max(1.0),
        game_over_delay: Duration::from_millis(args.game_over_delay_ms),
        seed: args.seed,
        no_animation: args.no_animation,
        no_menu: args.no_menu,
    };
    let mut app = App::new(config, theme, records);
    app.run()?;
    Ok(())
}

/// The terminal is in raw mode, so logs only ever go to a file.
fn init_logging(path: &std::path::Path) -> Result<()> {
    let file = std::fs::File::create(path)
        .with_context(|| format!("cannot create log file {}", path.display()))?;
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Pipe(Box::new(file)))
        .init();
    Ok(())
}

/// Drag-to-merge number puzzle in the terminal.
#[derive(Debug, Parser)]
#[command(
    name = "mergetui",
    version,
    about = "Drag across adjacent equal tiles to merge them. Tiles fall, new ones drop in; play until no two neighbours match.",
    long_about = "Mergetui is a 5x5 number-merging puzzle played with the mouse.\n\n\
        Press on a tile and drag across neighbouring tiles (diagonals included) of the same value, \
        then release. The last tile of the chain becomes value x2 (2 tiles), x4 (3-4 tiles) or \
        x8 (5+ tiles); the others vanish, tiles above fall and new ones drop in.\n\n\
        CONTROLS:\n  Left drag   Select chain    Right click  Undo last step\n  \
        Release     Merge           R            Restart\n  Q / Esc     Back to menu    Ctrl-C       Quit\n\n\
        The game ends when no two orthogonally adjacent tiles are equal. The ten best scores are kept."
)]
pub struct Args {
    /// Difficulty: easy (2-8), medium (2-64) or hard (2-256) starting tiles.
    #[arg(short, long, default_value = "medium")]
    pub difficulty: Difficulty,

    /// Path to theme file (btop-style theme[key]=\"value\"). Uses One Dark if not set.
    #[arg(short, long, value_name = "FILE")]
    pub theme: Option<PathBuf>,

    /// Leaderboard file. Defaults to $XDG_CONFIG_HOME/mergetui/records.csv.
    #[arg(long, value_name = "FILE")]
    pub records: Option<PathBuf>,

    /// Game ticks per second (falling tiles advance 1/20 of their path per tick).
    #[arg(long, default_value = "80.0", value_name = "RATE")]
    pub tick_rate: f64,

    /// Pause on the final board before asking for a name, in ms.
    #[arg(long, default_value = "1500", value_name = "MS")]
    pub game_over_delay_ms: u64,

    /// Seed for the tile generator (same seed, same tiles).
    #[arg(long, value_name = "N")]
    pub seed: Option<u64>,

    /// Disable the merge flash.
    #[arg(long)]
    pub no_animation: bool,

    /// Skip main menu and start game immediately.
    #[arg(long)]
    pub no_menu: bool,

    /// Write logs to this file (filter with RUST_LOG, default info).
    #[arg(long, value_name = "FILE")]
    pub log_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

impl Difficulty {
    /// Values the starting board is drawn from.
    pub fn seed_values(self) -> &'static [u64] {
        match self {
            Self::Easy => &[2, 4, 8],
            Self::Medium => &grid::REFILL_VALUES,
            Self::Hard => &[2, 4, 8, 16, 32, 64, 128, 256],
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Easy => "Easy",
            Self::Medium => "Medium",
            Self::Hard => "Hard",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tier_values() {
        assert_eq!(Difficulty::Easy.seed_values(), &[2, 4, 8]);
        assert_eq!(Difficulty::Medium.seed_values(), &[2, 4, 8, 16, 32, 64]);
        assert_eq!(Difficulty::Hard.seed_values(), &[2, 4, 8, 16, 32, 64, 128, 256]);
    }

    #[test]
    fn test_cli_defaults() {
        let args = Args::parse_from(["mergetui"]);
        assert_eq!(args.difficulty, Difficulty::Medium);
        assert_eq!(args.tick_rate, 80.0);
        assert_eq!(args.game_over_delay_ms, 1500);
        assert!(args.records.is_none());
    }

    #[test]
    fn test_cli_difficulty() {
        let args = Args::parse_from(["mergetui", "-d", "hard", "--seed", "9", "--no-menu"]);
        assert_eq!(args.difficulty, Difficulty::Hard);
        assert_eq!(args.seed, Some(9));
        assert!(args.no_menu);
    }
}
