//! App: terminal init, main loop, tick, key and mouse handling.

use crate::game::GameState;
use crate::highscores::{Record, RecordsStore};
use crate::input::{Action, NameEdit, NameInput, Pointer, key_to_action, mouse_to_pointer};
use crate::theme::Theme;
use crate::{Difficulty, GameConfig, ui};
use anyhow::Result;
use crossterm::event::{self, Event, KeyEvent, KeyEventKind, MouseEvent};
use log::{info, warn};
use ratatui::DefaultTerminal;
use ratatui::layout::Rect;
use std::time::{Duration, Instant};
use tachyonfx::Effect;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Menu,
    Playing,
    NameEntry,
    Records,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuItem {
    Play(Difficulty),
    Records,
    Quit,
}

pub const MENU_ITEMS: [MenuItem; 5] = [
    MenuItem::Play(Difficulty::Easy),
    MenuItem::Play(Difficulty::Medium),
    MenuItem::Play(Difficulty::Hard),
    MenuItem::Records,
    MenuItem::Quit,
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuState {
    pub selected: usize,
}

impl MenuState {
    fn for_difficulty(difficulty: Difficulty) -> Self {
        let selected = MENU_ITEMS
            .iter()
            .position(|item| *item == MenuItem::Play(difficulty))
            .unwrap_or(0);
        Self { selected }
    }

    fn up(&mut self) {
        self.selected = (self.selected + MENU_ITEMS.len() - 1) % MENU_ITEMS.len();
    }

    fn down(&mut self) {
        self.selected = (self.selected + 1) % MENU_ITEMS.len();
    }

    fn item(&self) -> MenuItem {
        MENU_ITEMS[self.selected % MENU_ITEMS.len()]
    }
}

/// Whether the loop keeps going after an input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Exit,
}

pub struct App {
    config: GameConfig,
    theme: Theme,
    records: RecordsStore,
    state: GameState,
    screen: Screen,
    menu_state: MenuState,
    name_input: NameInput,
    /// Leaderboard shown on the records screen.
    leaderboard: Vec<Record>,
    new_record_rank: Option<usize>,
    /// Error line for the records screen (e.g. the file could not be written).
    status: Option<String>,
    /// Terminal area of the last frame; mouse positions are resolved against it.
    area: Rect,
    last_tick: Instant,
    /// TachyonFX flash over the last merged tile.
    merge_flash: Option<Effect>,
    merge_flash_process_time: Option<Instant>,
}

impl App {
    pub fn new(config: GameConfig, theme: Theme, records: RecordsStore) -> Self {
        let state = GameState::new(config.difficulty, config.seed);
        let screen = if config.no_menu {
            Screen::Playing
        } else {
            Screen::Menu
        };
        if config.no_menu {
            info!("new game: {:?}, seed {:?}", config.difficulty, config.seed);
        }
        Self {
            menu_state: MenuState::for_difficulty(config.difficulty),
            config,
            theme,
            records,
            state,
            screen,
            name_input: NameInput::default(),
            leaderboard: Vec::new(),
            new_record_rank: None,
            status: None,
            area: Rect::default(),
            last_tick: Instant::now(),
            merge_flash: None,
            merge_flash_process_time: None,
        }
    }

    fn start_game(&mut self, difficulty: Difficulty) {
        // a fixed seed replays the same board on every restart
        self.state = GameState::new(difficulty, self.config.seed);
        self.screen = Screen::Playing;
        self.menu_state = MenuState::for_difficulty(difficulty);
        self.last_tick = Instant::now();
        self.merge_flash = None;
        self.merge_flash_process_time = None;
        info!("new game: {:?}, seed {:?}", difficulty, self.config.seed);
    }

    fn show_records(&mut self) {
        self.leaderboard = self.records.load();
        self.new_record_rank = None;
        self.status = None;
        self.screen = Screen::Records;
    }

    fn submit_name(&mut self) {
        let name = self.name_input.text().trim().to_string();
        match self.records.add(&name, self.state.score) {
            Ok((records, rank)) => {
                self.leaderboard = records;
                self.new_record_rank = rank;
                self.status = None;
            }
            Err(e) => {
                warn!("could not save records to {}: {e}", self.records.path().display());
                self.leaderboard = self.records.load();
                self.new_record_rank = None;
                self.status = Some(format!("Could not save: {e}"));
            }
        }
        self.screen = Screen::Records;
    }

    pub fn run(&mut self) -> Result<()> {
        use crossterm::{
            event::{DisableMouseCapture, EnableMouseCapture},
            execute,
            terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
        };

        enable_raw_mode()?;
        let mut stdout = std::io::stdout();
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;

        let mut terminal = ratatui::DefaultTerminal::new(ratatui::backend::CrosstermBackend::new(stdout))?;

        let result = self.run_loop(&mut terminal);

        // Restore
        execute!(std::io::stdout(), DisableMouseCapture, LeaveAlternateScreen)?;
        disable_raw_mode()?;

        result
    }

    fn run_loop(&mut self, terminal: &mut DefaultTerminal) -> Result<()> {
        loop {
            let now = Instant::now();
            self.draw(terminal, now)?;

            if self.screen == Screen::Playing && self.state.is_game_over() {
                info!(
                    "game over: score {} in {} moves ({:?})",
                    self.state.score, self.state.moves, self.state.difficulty
                );
                // keep the final board on screen; input typed meanwhile is dropped
                std::thread::sleep(self.config.game_over_delay);
                while event::poll(Duration::ZERO)? {
                    let _ = event::read()?;
                }
                self.name_input.clear();
                self.merge_flash = None;
                self.screen = Screen::NameEntry;
                continue;
            }

            let tick_interval = Duration::from_secs_f64(1.0 / self.config.tick_rate);
            let timeout = tick_interval.saturating_sub(self.last_tick.elapsed());

            if event::poll(timeout)? {
                while event::poll(Duration::ZERO)? {
                    match event::read()? {
                        Event::Key(key) if key.kind == KeyEventKind::Press => {
                            if self.handle_key(key) == Flow::Exit {
                                return Ok(());
                            }
                        }
                        Event::Mouse(mouse) => self.handle_mouse(mouse),
                        _ => {}
                    }
                }
            }

            if self.last_tick.elapsed() >= tick_interval {
                self.last_tick = Instant::now();
                if self.screen == Screen::Playing {
                    self.state.tick();
                }
            }
        }
    }

    fn draw(&mut self, terminal: &mut DefaultTerminal, now: Instant) -> Result<()> {
        let mut area = self.area;
        terminal.draw(|f| {
            area = f.area();
            let view = ui::View {
                screen: self.screen,
                theme: &self.theme,
                state: &self.state,
                menu: &self.menu_state,
                name: &self.name_input,
                records: &self.leaderboard,
                new_record: self.new_record_rank,
                status: self.status.as_deref(),
            };
            ui::draw(f, &view);
            if self.screen == Screen::Playing {
                if let Some(effect) = self.merge_flash.as_mut() {
                    ui::render_merge_flash(f, effect, &mut self.merge_flash_process_time, now);
                }
            }
        })?;
        self.area = area;

        if self.merge_flash.as_ref().is_some_and(|e| e.done()) {
            self.merge_flash = None;
            self.merge_flash_process_time = None;
        }
        Ok(())
    }

    fn handle_key(&mut self, key: KeyEvent) -> Flow {
        if self.screen == Screen::NameEntry {
            if key_to_action(key) == Action::Quit {
                return Flow::Exit;
            }
            match self.name_input.handle_key(key) {
                NameEdit::Submit => self.submit_name(),
                NameEdit::Cancel => self.screen = Screen::Menu,
                NameEdit::Changed | NameEdit::Ignored => {}
            }
            return Flow::Continue;
        }

        let action = key_to_action(key);
        if action == Action::Quit {
            return Flow::Exit;
        }
        match self.screen {
            Screen::Menu => match action {
                Action::Up => self.menu_state.up(),
                Action::Down => self.menu_state.down(),
                Action::Confirm => match self.menu_state.item() {
                    MenuItem::Play(difficulty) => self.start_game(difficulty),
                    MenuItem::Records => self.show_records(),
                    MenuItem::Quit => return Flow::Exit,
                },
                Action::Back => return Flow::Exit,
                _ => {}
            },
            Screen::Playing => match action {
                Action::Restart => self.start_game(self.state.difficulty),
                Action::Back => self.screen = Screen::Menu,
                _ => {}
            },
            Screen::Records => {
                if matches!(action, Action::Confirm | Action::Back) {
                    self.screen = Screen::Menu;
                }
            }
            Screen::NameEntry => {}
        }
        Flow::Continue
    }

    fn handle_mouse(&mut self, mouse: MouseEvent) {
        if self.screen != Screen::Playing {
            return;
        }
        let Some(pointer) = mouse_to_pointer(mouse) else {
            return;
        };
        let board = ui::board_rect(self.area);
        match pointer {
            Pointer::Press { column, row } => self.state.press(ui::cell_at(board, column, row)),
            Pointer::Drag { column, row } => {
                if let Some(at) = ui::cell_near(board, column, row) {
                    self.state.drag(at);
                }
            }
            Pointer::Release => {
                if let Some(outcome) = self.state.release() {
                    if !self.config.no_animation {
                        self.merge_flash = Some(ui::merge_flash(board, outcome.survivor));
                        self.merge_flash_process_time = None;
                    }
                }
            }
            Pointer::Undo => self.state.undo(),
        }
    }
}
