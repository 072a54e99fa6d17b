use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::vision::arrows::Direction;

/// Abstract input symbol. Arrow keys are kept apart from the rest because the
/// device reports them as extended (E0-prefixed) scancodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Key {
    Up,
    Down,
    Left,
    Right,
    Space,
    Shift,
    Ctrl,
    Alt,
    Esc,
    Enter,
    Tab,
    /// `A`..=`Z` or `0`..=`9`.
    Char(char),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown key `{0}`")]
pub struct UnknownKey(pub String);

impl Key {
    pub fn is_directional(self) -> bool {
        matches!(self, Key::Up | Key::Down | Key::Left | Key::Right)
    }

    /// Set-1 make code.
    pub fn scan_code(self) -> Option<u16> {
        let code = match self {
            Key::Up => 72,
            Key::Left => 75,
            Key::Right => 77,
            Key::Down => 80,
            Key::Esc => 1,
            Key::Tab => 15,
            Key::Enter => 28,
            Key::Ctrl => 29,
            Key::Shift => 42,
            Key::Alt => 56,
            Key::Space => 57,
            Key::Char(c) => return char_scan_code(c),
        };
        Some(code)
    }
}

fn char_scan_code(c: char) -> Option<u16> {
    const TOP_ROW: &str = "QWERTYUIOP";
    const HOME_ROW: &str = "ASDFGHJKL";
    const BOTTOM_ROW: &str = "ZXCVBNM";

    let c = c.to_ascii_uppercase();
    if let Some(i) = TOP_ROW.find(c) {
        return Some(16 + i as u16);
    }
    if let Some(i) = HOME_ROW.find(c) {
        return Some(30 + i as u16);
    }
    if let Some(i) = BOTTOM_ROW.find(c) {
        return Some(44 + i as u16);
    }
    match c {
        '1'..='9' => Some(c as u16 - '1' as u16 + 2),
        '0' => Some(11),
        _ => None,
    }
}

impl From<Direction> for Key {
    fn from(direction: Direction) -> Self {
        match direction {
            Direction::Up => Key::Up,
            Direction::Down => Key::Down,
            Direction::Left => Key::Left,
            Direction::Right => Key::Right,
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Char(c) => write!(f, "{}", c.to_ascii_uppercase()),
            other => write!(f, "{:?}", other),
        }
    }
}

impl FromStr for Key {
    type Err = UnknownKey;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = match s.trim().to_ascii_uppercase().as_str() {
            "UP" => Key::Up,
            "DOWN" => Key::Down,
            "LEFT" => Key::Left,
            "RIGHT" => Key::Right,
            "SPACE" => Key::Space,
            "SHIFT" => Key::Shift,
            "CTRL" => Key::Ctrl,
            "ALT" => Key::Alt,
            "ESC" => Key::Esc,
            "ENTER" => Key::Enter,
            "TAB" => Key::Tab,
            other => {
                let mut chars = other.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) if char_scan_code(c).is_some() => Key::Char(c),
                    _ => return Err(UnknownKey(s.to_string())),
                }
            }
        };
        Ok(key)
    }
}

impl TryFrom<String> for Key {
    type Error = UnknownKey;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Key> for String {
    fn from(key: Key) -> Self {
        key.to_string()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Transition {
    Down,
    Up,
}

/// Device-level stroke: scancode plus state flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyStroke {
    pub code: u16,
    pub state: u16,
}

impl KeyStroke {
    pub const STATE_DOWN: u16 = 0x00;
    pub const STATE_UP: u16 = 0x01;
    pub const STATE_E0: u16 = 0x02;

    /// `None` for keys without a scancode.
    pub fn encode(key: Key, transition: Transition) -> Option<Self> {
        let code = key.scan_code()?;
        let mut state = match transition {
            Transition::Down => Self::STATE_DOWN,
            Transition::Up => Self::STATE_UP,
        };
        if key.is_directional() {
            state |= Self::STATE_E0;
        }
        Some(Self { code, state })
    }
}

/// Which key performs which movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyMap {
    pub left: Key,
    pub right: Key,
    pub up: Key,
    pub down: Key,
    pub jump: Key,
    /// Vertical traversal, e.g. a rope lift.
    pub climb: Key,
    /// Activates the special-event marker.
    pub interact: Key,
}

impl Default for KeyMap {
    fn default() -> Self {
        Self {
            left: Key::Left,
            right: Key::Right,
            up: Key::Up,
            down: Key::Down,
            jump: Key::Space,
            climb: Key::Shift,
            interact: Key::Space,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arrows_use_extended_states() {
        assert_eq!(KeyStroke::encode(Key::Left, Transition::Down), Some(KeyStroke { code: 75, state: 2 }));
        assert_eq!(KeyStroke::encode(Key::Left, Transition::Up), Some(KeyStroke { code: 75, state: 3 }));
    }

    #[test]
    fn regular_keys_use_plain_states() {
        assert_eq!(KeyStroke::encode(Key::Space, Transition::Down), Some(KeyStroke { code: 57, state: 0 }));
        assert_eq!(KeyStroke::encode(Key::Shift, Transition::Up), Some(KeyStroke { code: 42, state: 1 }));
    }

    #[test]
    fn letters_and_digits_map_to_set_one() {
        assert_eq!(Key::Char('q').scan_code(), Some(16));
        assert_eq!(Key::Char('A').scan_code(), Some(30));
        assert_eq!(Key::Char('M').scan_code(), Some(50));
        assert_eq!(Key::Char('1').scan_code(), Some(2));
        assert_eq!(Key::Char('0').scan_code(), Some(11));
        assert_eq!(Key::Char('?').scan_code(), None);
    }

    #[test]
    fn keys_parse_case_insensitively() {
        assert_eq!("shift".parse::<Key>(), Ok(Key::Shift));
        assert_eq!("e".parse::<Key>(), Ok(Key::Char('E')));
        assert!("F13".parse::<Key>().is_err());
        assert_eq!(Key::from(Direction::Right), Key::Right);
    }
}
