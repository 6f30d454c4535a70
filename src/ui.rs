//! Layout and drawing: menu, board, falling tiles, name entry, leaderboard.
//! Also maps terminal cells back to board coordinates for mouse input.

use crate::app::{MENU_ITEMS, MenuItem, MenuState, Screen};
use crate::game::GameState;
use crate::grid::{Coord, GRID_SIZE};
use crate::highscores::{MAX_NAME_LEN, Record};
use crate::input::NameInput;
use crate::merge::chain_multiplier;
use crate::theme::{Theme, tile_label};
use ratatui::Frame;
use ratatui::buffer::Buffer;
use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Widget};
use std::time::Instant;
use tachyonfx::{Duration as TfxDuration, Effect, EffectRenderer, Interpolation, fx};

/// Tile size in terminal cells.
const TILE_W: u16 = 8;
const TILE_H: u16 = 3;
/// Space between tiles (and around the outermost ones).
const GAP_X: u16 = 1;
const GAP_Y: u16 = 1;
const PITCH_X: u16 = TILE_W + GAP_X;
const PITCH_Y: u16 = TILE_H + GAP_Y;

/// Board interior (inside the border).
const BOARD_W: u16 = GRID_SIZE as u16 * PITCH_X + GAP_X;
const BOARD_H: u16 = GRID_SIZE as u16 * PITCH_Y + GAP_Y;

/// Score line + bordered board + hint line.
const LAYOUT_W: u16 = BOARD_W + 2;
const LAYOUT_H: u16 = BOARD_H + 4;

/// How far (in cells) the pointer may be from a tile centre for a drag to pick it up.
const NEAR_X: u16 = 2;
const NEAR_Y: u16 = 1;

/// Merge flash length in ms.
const MERGE_FLASH_MS: u32 = 300;

/// Everything the draw functions read.
pub struct View<'a> {
    pub screen: Screen,
    pub theme: &'a Theme,
    pub state: &'a GameState,
    pub menu: &'a MenuState,
    pub name: &'a NameInput,
    pub records: &'a [Record],
    /// Rank of the record just added, highlighted on the leaderboard.
    pub new_record: Option<usize>,
    pub status: Option<&'a str>,
}

/// Board interior for a terminal area; matches draw_game layout.
pub fn board_rect(area: Rect) -> Rect {
    let x = area.x + area.width.saturating_sub(LAYOUT_W) / 2;
    let y = area.y + area.height.saturating_sub(LAYOUT_H) / 2;
    Rect {
        x: x + 1,
        y: y + 2,
        width: BOARD_W,
        height: BOARD_H,
    }
}

/// Top-left terminal cell of the tile at `at`.
fn tile_origin(board: Rect, at: Coord) -> (u16, u16) {
    (
        board.x + GAP_X + at.col as u16 * PITCH_X,
        board.y + GAP_Y + at.row as u16 * PITCH_Y,
    )
}

pub fn tile_rect(board: Rect, at: Coord) -> Rect {
    let (x, y) = tile_origin(board, at);
    Rect {
        x,
        y,
        width: TILE_W,
        height: TILE_H,
    }
}

/// Board cell under a press; the gap left of / above a tile counts as part of it.
/// `None` outside the board.
pub fn cell_at(board: Rect, column: u16, row: u16) -> Option<Coord> {
    let dx = column.checked_sub(board.x)?;
    let dy = row.checked_sub(board.y)?;
    let (col, row) = ((dx / PITCH_X) as usize, (dy / PITCH_Y) as usize);
    (col < GRID_SIZE && row < GRID_SIZE).then(|| Coord::new(row, col))
}

/// First tile, in row-major order, whose centre is close enough to the pointer.
pub fn cell_near(board: Rect, column: u16, row: u16) -> Option<Coord> {
    Coord::all().find(|&at| {
        let (x, y) = tile_origin(board, at);
        let (cx, cy) = (x + TILE_W / 2, y + TILE_H / 2);
        column.abs_diff(cx) <= NEAR_X && row.abs_diff(cy) <= NEAR_Y
    })
}

/// Draw current screen.
pub fn draw(frame: &mut Frame, view: &View) {
    let area = frame.area();
    Block::default()
        .style(Style::default().bg(view.theme.bg))
        .render(area, frame.buffer_mut());
    match view.screen {
        Screen::Menu => draw_menu(frame, view, area),
        Screen::Playing => draw_game(frame, view, area),
        Screen::NameEntry => draw_name_entry(frame, view, area),
        Screen::Records => draw_records(frame, view, area),
    }
}

/// Centered popup of at most `w` x `h`.
fn popup(area: Rect, w: u16, h: u16) -> Rect {
    Rect {
        x: area.x + area.width.saturating_sub(w) / 2,
        y: area.y + area.height.saturating_sub(h) / 2,
        width: w.min(area.width),
        height: h.min(area.height),
    }
}

fn popup_block(theme: &Theme, title: &str) -> Block<'static> {
    Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.div_line).bg(theme.bg))
        .title(Span::styled(
            format!(" {title} "),
            Style::default().fg(theme.title).add_modifier(Modifier::BOLD),
        ))
}

fn draw_menu(frame: &mut Frame, view: &View, area: Rect) {
    let theme = view.theme;
    let highlight = Style::default()
        .fg(Color::Black)
        .bg(theme.title)
        .add_modifier(Modifier::BOLD);
    let normal = Style::default().fg(theme.main_fg);

    let mut lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            " Choose difficulty ",
            Style::default().fg(theme.main_fg).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
    ];
    for (i, item) in MENU_ITEMS.iter().enumerate() {
        let label = match item {
            MenuItem::Play(d) => format!("  {:<8}  {:>9}  ", d.label(), tile_range(d.seed_values())),
            MenuItem::Records => format!("  {:<21}", "Records"),
            MenuItem::Quit => format!("  {:<21}", "Quit"),
        };
        let style = if i == view.menu.selected { highlight } else { normal };
        lines.push(Line::from(Span::styled(label, style)));
        if matches!(item, MenuItem::Play(crate::Difficulty::Hard)) {
            lines.push(Line::from(""));
        }
    }
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        " ↑/↓ select   Enter start   Q quit ",
        Style::default().fg(theme.inactive_fg),
    )));
    let h = lines.len() as u16 + 2;
    Paragraph::new(lines)
        .alignment(Alignment::Center)
        .block(popup_block(theme, "Mergetui"))
        .render(popup(area, 40, h), frame.buffer_mut());
}

/// "2–64" style range of a value set.
fn tile_range(values: &[u64]) -> String {
    match (values.first(), values.last()) {
        (Some(lo), Some(hi)) => format!("{lo}–{hi}"),
        _ => String::new(),
    }
}

fn draw_game(frame: &mut Frame, view: &View, area: Rect) {
    let theme = view.theme;
    let state = view.state;
    let board = board_rect(area);
    let buf = frame.buffer_mut();

    let header = Rect {
        x: board.x - 1,
        y: board.y - 2,
        width: LAYOUT_W,
        height: 1,
    }
    .intersection(area);
    Paragraph::new(Line::from(vec![
        Span::styled(
            format!(" Score: {} ", state.score),
            Style::default().fg(theme.title).add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!("  {}  ", state.difficulty.label()),
            Style::default().fg(theme.inactive_fg),
        ),
    ]))
    .alignment(Alignment::Center)
    .render(header, buf);

    let outer = Rect {
        x: board.x - 1,
        y: board.y - 1,
        width: BOARD_W + 2,
        height: BOARD_H + 2,
    }
    .intersection(area);
    Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.div_line))
        .style(Style::default().bg(theme.bg))
        .render(outer, buf);
    let board = board.intersection(area);

    let label_style = Style::default().fg(Color::Black).add_modifier(Modifier::BOLD);
    for at in Coord::all() {
        // a tile landing here is drawn in flight instead
        if state.falling.landing_at(at).is_some() {
            continue;
        }
        let value = state.grid.get(at);
        let (x, y) = tile_origin(board, at);
        let bg = if value == 0 { theme.div_line } else { theme.tile_color(value) };
        let (label, style) = if state.chain.contains(at) {
            chain_label(value, state.chain.last() == Some(at), theme)
        } else {
            (tile_label(value), label_style)
        };
        draw_tile(buf, board, x as i32, y as i32, bg, &label, style);
    }

    for cell in state.falling.cells() {
        let (row, col) = cell.position();
        let x = board.x as f32 + GAP_X as f32 + col * PITCH_X as f32;
        let y = board.y as f32 + GAP_Y as f32 + row * PITCH_Y as f32;
        draw_tile(
            buf,
            board,
            x.round() as i32,
            y.round() as i32,
            theme.tile_color(cell.value),
            &tile_label(cell.value),
            label_style,
        );
    }

    let footer = Rect {
        x: board.x - 1,
        y: board.y + BOARD_H + 1,
        width: LAYOUT_W,
        height: 1,
    }
    .intersection(area);
    let hint = if state.is_game_over() {
        Span::styled(
            " No more moves ",
            Style::default().fg(Color::White).bg(Color::Red).add_modifier(Modifier::BOLD),
        )
    } else if state.is_dragging() && state.chain.len() >= 2 {
        Span::styled(
            format!(" chain {} · x{} ", state.chain.len(), chain_multiplier(state.chain.len())),
            Style::default().fg(theme.selection).add_modifier(Modifier::BOLD),
        )
    } else {
        Span::styled(
            " drag to merge · right click undo · R restart · Q menu ",
            Style::default().fg(theme.inactive_fg),
        )
    };
    Paragraph::new(Line::from(hint))
        .alignment(Alignment::Center)
        .render(footer, buf);
}

/// Label and style of a tile that is part of the drag chain; the future survivor is marked.
fn chain_label(value: u64, survivor: bool, theme: &Theme) -> (String, Style) {
    let label = tile_label(value);
    let style = Style::default()
        .fg(theme.selection)
        .bg(Color::Black)
        .add_modifier(Modifier::BOLD);
    if survivor {
        (format!("»{label}«"), style.add_modifier(Modifier::UNDERLINED))
    } else {
        (label, style)
    }
}

/// One tile at terminal position (x, y), clipped to the board so spawned tiles slide in from the top edge.
fn draw_tile(buf: &mut Buffer, board: Rect, x: i32, y: i32, bg: Color, label: &str, label_style: Style) {
    let top = board.y as i32;
    let bottom = (board.y + board.height) as i32;
    let Ok(x) = u16::try_from(x) else {
        return;
    };
    for dy in 0..TILE_H {
        let yy = y + dy as i32;
        if yy < top || yy >= bottom {
            continue;
        }
        let line = Rect {
            x,
            y: yy as u16,
            width: TILE_W,
            height: 1,
        }
        .intersection(board);
        let text = if dy == TILE_H / 2 {
            Span::styled(label.to_string(), label_style)
        } else {
            Span::raw("")
        };
        Paragraph::new(Line::from(text))
            .alignment(Alignment::Center)
            .style(Style::default().bg(bg))
            .render(line, buf);
    }
}

fn draw_name_entry(frame: &mut Frame, view: &View, area: Rect) {
    let theme = view.theme;
    let field = format!("{:<width$}", view.name.text(), width = MAX_NAME_LEN);
    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            " Game Over ",
            Style::default().fg(Color::White).bg(Color::Red),
        )),
        Line::from(""),
        Line::from(Span::styled(
            format!(" Score: {} ", view.state.score),
            Style::default().fg(theme.main_fg),
        )),
        Line::from(""),
        Line::from(Span::styled(" Enter your name: ", Style::default().fg(theme.main_fg))),
        Line::from(vec![
            Span::styled(format!(" {field}"), Style::default().fg(Color::Black).bg(theme.main_fg)),
            Span::styled("▏", Style::default().fg(Color::Black).bg(theme.main_fg)),
        ]),
        Line::from(""),
        Line::from(Span::styled(
            " Enter — Save    Esc — Skip ",
            Style::default().fg(theme.inactive_fg),
        )),
    ];
    let h = lines.len() as u16 + 2;
    Paragraph::new(lines)
        .alignment(Alignment::Center)
        .block(popup_block(theme, "Mergetui"))
        .render(popup(area, 36, h), frame.buffer_mut());
}

fn draw_records(frame: &mut Frame, view: &View, area: Rect) {
    let theme = view.theme;
    let mut lines = vec![Line::from("")];
    if view.records.is_empty() {
        lines.push(Line::from(Span::styled(" No records yet ", Style::default().fg(theme.inactive_fg))));
    }
    for (i, record) in view.records.iter().enumerate() {
        let style = if view.new_record == Some(i) {
            Style::default().fg(Color::Black).bg(theme.title).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(theme.main_fg)
        };
        lines.push(Line::from(Span::styled(
            format!(" {:>2}. {:<width$} {:>9} ", i + 1, record.name, record.score, width = MAX_NAME_LEN),
            style,
        )));
    }
    lines.push(Line::from(""));
    if let Some(status) = view.status {
        lines.push(Line::from(Span::styled(format!(" {status} "), Style::default().fg(Color::Red))));
    }
    lines.push(Line::from(Span::styled(
        " Enter — Back ",
        Style::default().fg(theme.inactive_fg),
    )));
    let h = lines.len() as u16 + 2;
    Paragraph::new(lines)
        .alignment(Alignment::Center)
        .block(popup_block(theme, "Records"))
        .render(popup(area, 38, h), frame.buffer_mut());
}

/// Flash over a freshly merged tile.
pub fn merge_flash(board: Rect, at: Coord) -> Effect {
    fx::fade_from(Color::White, Color::White, (MERGE_FLASH_MS, Interpolation::QuadOut))
        .with_area(tile_rect(board, at))
}

/// Advance and draw the merge flash (TachyonFX), tracking the time of the last frame.
pub fn render_merge_flash(
    frame: &mut Frame,
    effect: &mut Effect,
    last_process: &mut Option<Instant>,
    now: Instant,
) {
    let delta = last_process
        .map(|t| now.saturating_duration_since(t))
        .unwrap_or(std::time::Duration::ZERO);
    let delta_ms = delta.as_millis().min(u32::MAX as u128) as u32;
    *last_process = Some(now);
    let area = frame.area();
    frame.render_effect(effect, area, TfxDuration::from_millis(delta_ms));
}
