//! Key bindings (normal and vim-style), mouse gestures and the name-entry field.

use crate::highscores::MAX_NAME_LEN;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};

/// Action from a key press outside name entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Up,
    Down,
    Confirm,
    Restart,
    Back,
    Quit,
    None,
}

/// Map key event to an action. Supports both normal (arrows, Enter) and vim (jk).
pub fn key_to_action(key: KeyEvent) -> Action {
    let KeyEvent { code, modifiers, .. } = key;
    if modifiers == KeyModifiers::CONTROL && code == KeyCode::Char('c') {
        return Action::Quit;
    }
    let no_mod = modifiers.is_empty() || modifiers == KeyModifiers::SHIFT;
    if !no_mod {
        return Action::None;
    }
    match code {
        KeyCode::Up | KeyCode::Char('k') => Action::Up,
        KeyCode::Down | KeyCode::Char('j') => Action::Down,
        KeyCode::Enter | KeyCode::Char(' ') => Action::Confirm,
        KeyCode::Char('r') | KeyCode::Char('R') => Action::Restart,
        KeyCode::Esc | KeyCode::Char('q') => Action::Back,
        _ => Action::None,
    }
}

/// Board gesture in terminal cell coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pointer {
    Press { column: u16, row: u16 },
    Drag { column: u16, row: u16 },
    Release,
    Undo,
}

/// Left button presses, drags and releases; right button press undoes.
pub fn mouse_to_pointer(mouse: MouseEvent) -> Option<Pointer> {
    let MouseEvent { kind, column, row, .. } = mouse;
    match kind {
        MouseEventKind::Down(MouseButton::Left) => Some(Pointer::Press { column, row }),
        MouseEventKind::Drag(MouseButton::Left) => Some(Pointer::Drag { column, row }),
        MouseEventKind::Up(MouseButton::Left) => Some(Pointer::Release),
        MouseEventKind::Down(MouseButton::Right) => Some(Pointer::Undo),
        _ => None,
    }
}

/// What a key did to the name field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameEdit {
    Changed,
    Submit,
    Cancel,
    Ignored,
}

/// Player name being typed after a game over.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NameInput {
    text: String,
}

impl NameInput {
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn clear(&mut self) {
        self.text.clear();
    }

    /// Printable characters append up to [`MAX_NAME_LEN`], Backspace deletes,
    /// Enter submits a non-blank name, Esc cancels.
    pub fn handle_key(&mut self, key: KeyEvent) -> NameEdit {
        if key.modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) {
            return NameEdit::Ignored;
        }
        match key.code {
            KeyCode::Enter if !self.text.trim().is_empty() => NameEdit::Submit,
            KeyCode::Esc => NameEdit::Cancel,
            KeyCode::Backspace => {
                if self.text.pop().is_some() {
                    NameEdit::Changed
                } else {
                    NameEdit::Ignored
                }
            }
            KeyCode::Char(c) if !c.is_control() && c != ',' && self.text.chars().count() < MAX_NAME_LEN => {
                self.text.push(c);
                NameEdit::Changed
            }
            _ => NameEdit::Ignored,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyEventKind;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn mouse(kind: MouseEventKind) -> MouseEvent {
        MouseEvent {
            kind,
            column: 12,
            row: 7,
            modifiers: KeyModifiers::NONE,
        }
    }

    #[test]
    fn test_key_actions() {
        assert_eq!(key_to_action(key(KeyCode::Char('j'))), Action::Down);
        assert_eq!(key_to_action(key(KeyCode::Up)), Action::Up);
        assert_eq!(key_to_action(key(KeyCode::Enter)), Action::Confirm);
        assert_eq!(key_to_action(key(KeyCode::Char('q'))), Action::Back);
        assert_eq!(
            key_to_action(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            Action::Quit
        );
        assert_eq!(
            key_to_action(KeyEvent::new(KeyCode::Char('r'), KeyModifiers::ALT)),
            Action::None
        );
    }

    #[test]
    fn test_mouse_gestures() {
        assert_eq!(
            mouse_to_pointer(mouse(MouseEventKind::Down(MouseButton::Left))),
            Some(Pointer::Press { column: 12, row: 7 })
        );
        assert_eq!(
            mouse_to_pointer(mouse(MouseEventKind::Drag(MouseButton::Left))),
            Some(Pointer::Drag { column: 12, row: 7 })
        );
        assert_eq!(mouse_to_pointer(mouse(MouseEventKind::Up(MouseButton::Left))), Some(Pointer::Release));
        assert_eq!(mouse_to_pointer(mouse(MouseEventKind::Down(MouseButton::Right))), Some(Pointer::Undo));
        assert_eq!(mouse_to_pointer(mouse(MouseEventKind::Moved)), None);
    }

    #[test]
    fn test_name_is_capped() {
        let mut input = NameInput::default();
        for _ in 0..20 {
            input.handle_key(key(KeyCode::Char('a')));
        }
        assert_eq!(input.text().chars().count(), MAX_NAME_LEN);
        assert_eq!(input.handle_key(key(KeyCode::Char('b'))), NameEdit::Ignored);
    }

    #[test]
    fn test_name_editing() {
        let mut input = NameInput::default();
        assert_eq!(input.handle_key(key(KeyCode::Enter)), NameEdit::Ignored);
        assert_eq!(input.handle_key(key(KeyCode::Char(' '))), NameEdit::Changed);
        assert_eq!(input.handle_key(key(KeyCode::Enter)), NameEdit::Ignored);
        input.handle_key(key(KeyCode::Backspace));
        for c in "Ana,".chars() {
            input.handle_key(key(KeyCode::Char(c)));
        }
        assert_eq!(input.text(), "Ana");
        input.handle_key(key(KeyCode::Backspace));
        assert_eq!(input.text(), "An");
        assert_eq!(input.handle_key(key(KeyCode::Enter)), NameEdit::Submit);
        assert_eq!(input.handle_key(key(KeyCode::Esc)), NameEdit::Cancel);
        let mut kev = key(KeyCode::Char('x'));
        kev.kind = KeyEventKind::Press;
        kev.modifiers = KeyModifiers::CONTROL;
        assert_eq!(input.handle_key(kev), NameEdit::Ignored);
    }
}
