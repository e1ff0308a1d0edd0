use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::snake::Direction;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Key {
    Arrow(Direction),
    Quit,
    Other,
}

pub fn map_key(ev: &KeyEvent) -> Key {
    if is_ctrl_c(ev) {
        return Key::Quit;
    }

    match ev.code {
        KeyCode::Up => Key::Arrow(Direction::Up),
        KeyCode::Down => Key::Arrow(Direction::Down),
        KeyCode::Left => Key::Arrow(Direction::Left),
        KeyCode::Right => Key::Arrow(Direction::Right),
        _ => Key::Other,
    }
}

pub fn is_ctrl_c(ev: &KeyEvent) -> bool {
    matches!(ev, KeyEvent { code: KeyCode::Char('c'), modifiers: KeyModifiers::CONTROL })
}
