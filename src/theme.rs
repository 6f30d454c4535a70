//! Theme loading: btop-style `theme[key]="value"` and hex → ratatui Color; tile colours and labels.

use ratatui::style::Color;
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;

/// Tile colours for 2, 4, 8, … 2^20 (index = log2(value) - 1).
const TILE_PALETTE: [(u8, u8, u8); 20] = [
    (197, 75, 108),  // 2
    (161, 93, 152),  // 4
    (33, 139, 130),  // 8
    (247, 206, 118), // 16
    (127, 199, 255), // 32
    (220, 130, 143), // 64
    (87, 132, 186),  // 128
    (230, 165, 126), // 256
    (118, 205, 205), // 512
    (162, 162, 208), // 1024
    (182, 216, 242), // 2048
    (129, 199, 132), // 4096
    (238, 186, 178), // 8192
    (249, 150, 139), // 16384
    (247, 206, 118), // 32768
    (123, 146, 170), // 65536
    (190, 180, 197), // 131072
    (152, 212, 187), // 262144
    (152, 212, 187), // 524288
    (33, 139, 130),  // 1048576
];

/// Values from here on are shown in units of 1024 with a `K` suffix.
const ABBREVIATE_FROM: u64 = 16384;

/// UI colours loaded from a theme file.
#[derive(Debug, Clone)]
pub struct Theme {
    /// Screen background.
    pub bg: Color,
    /// Board border and empty cells.
    pub div_line: Color,
    /// Text (score, prompts).
    pub main_fg: Color,
    /// Score and titles.
    pub title: Color,
    /// Secondary text (hints).
    pub inactive_fg: Color,
    /// Outline of tiles in the current drag chain.
    pub selection: Color,
    /// Fallback for values outside the palette.
    pub unknown_tile: Color,
}

#[derive(Debug, Error)]
pub enum ThemeError {
    #[error("cannot read theme: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid hex colour: {0}")]
    InvalidHex(String),
}

impl Default for Theme {
    fn default() -> Self {
        Self::onedark_default()
    }
}

impl Theme {
    /// One Dark UI colours.
    pub fn onedark_default() -> Self {
        Self {
            bg: Color::Rgb(0x31, 0x35, 0x3F),
            div_line: Color::Rgb(0x3F, 0x44, 0x4F),
            main_fg: Color::Rgb(0xAB, 0xB2, 0xBF),
            title: Color::Rgb(0xE5, 0xC0, 0x7B),
            inactive_fg: Color::Rgb(0x5C, 0x63, 0x70),
            selection: Color::Rgb(0xFF, 0xFF, 0xFF),
            unknown_tile: Color::Rgb(200, 200, 200),
        }
    }

    /// Colours from a btop theme file; keys it lacks keep the One Dark value.
    /// No path, or a path that does not exist, gives the defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, ThemeError> {
        let Some(path) = path.filter(|p| p.exists()) else {
            return Ok(Self::default());
        };
        let contents = std::fs::read_to_string(path)?;
        Ok(Self::from_map(&parse_theme_file(&contents)))
    }

    fn from_map(map: &HashMap<String, String>) -> Self {
        let base = Self::onedark_default();
        let get = |key: &str| map.get(key).and_then(|v| parse_hex(v).ok());
        Self {
            bg: get("meter_bg").unwrap_or(base.bg),
            div_line: get("div_line").unwrap_or(base.div_line),
            main_fg: get("main_fg").unwrap_or(base.main_fg),
            title: get("title").unwrap_or(base.title),
            inactive_fg: get("inactive_fg").unwrap_or(base.inactive_fg),
            selection: get("selected_fg").or_else(|| get("hi_fg")).unwrap_or(base.selection),
            unknown_tile: base.unknown_tile,
        }
    }

    /// Background colour of a tile. Empty cells use the board background.
    pub fn tile_color(&self, value: u64) -> Color {
        if value == 0 {
            return self.bg;
        }
        if !value.is_power_of_two() {
            return self.unknown_tile;
        }
        let index = value.trailing_zeros() as usize;
        match index.checked_sub(1).and_then(|i| TILE_PALETTE.get(i)) {
            Some(&(r, g, b)) => Color::Rgb(r, g, b),
            None => self.unknown_tile,
        }
    }
}

/// Text drawn on a tile: the value, or `value / 1024` with `K` from 16384 up.
pub fn tile_label(value: u64) -> String {
    match value {
        0 => String::new(),
        v if v >= ABBREVIATE_FROM => format!("{}K", v / 1024),
        v => v.to_string(),
    }
}

/// `theme[key]="value"` entries of a theme file. Comments, blank lines and
/// anything else that does not match are skipped; later keys win.
fn parse_theme_file(s: &str) -> HashMap<String, String> {
    s.lines()
        .map(str::trim)
        .filter(|line| !line.starts_with('#'))
        .filter_map(|line| {
            let (key, value) = line.strip_prefix("theme[")?.split_once(']')?;
            let value = value.trim_start().strip_prefix('=')?.trim();
            let value = value.trim_matches(|c| c == '"' || c == '\'');
            (!value.is_empty()).then(|| (key.trim().to_owned(), value.to_owned()))
        })
        .collect()
}

/// Parse hex colour "#RRGGBB" or "#RGB" into ratatui Color.
pub fn parse_hex(s: &str) -> Result<Color, ThemeError> {
    let s = s.trim().trim_start_matches('#');
    let channel = |range: std::ops::Range<usize>| {
        s.get(range)
            .and_then(|h| u8::from_str_radix(h, 16).ok())
            .ok_or_else(|| ThemeError::InvalidHex(s.to_string()))
    };
    let (r, g, b) = match s.len() {
        6 => (channel(0..2)?, channel(2..4)?, channel(4..6)?),
        3 => (channel(0..1)? * 17, channel(1..2)? * 17, channel(2..3)? * 17),
        _ => return Err(ThemeError::InvalidHex(s.to_string())),
    };
    Ok(Color::Rgb(r, g, b))
}
