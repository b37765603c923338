//! Normalized input events, in canvas coordinates.

use abdraw_geometry::Point;
use serde::{Deserialize, Serialize};

/// Modifier keys held during an event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Modifiers {
    #[serde(default)]
    pub shift: bool,
    #[serde(default)]
    pub ctrl: bool,
}

impl Modifiers {
    pub const NONE: Modifiers = Modifiers {
        shift: false,
        ctrl: false,
    };
    pub const SHIFT: Modifiers = Modifiers {
        shift: true,
        ctrl: false,
    };
    pub const CTRL: Modifiers = Modifiers {
        shift: false,
        ctrl: true,
    };
}

/// Keys the session reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Key {
    Char(char),
    Enter,
    Escape,
    Backspace,
    Delete,
}

/// One input event
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum InputEvent {
    PointerDown {
        position: Point,
        #[serde(default)]
        modifiers: Modifiers,
    },
    PointerMove {
        position: Point,
        #[serde(default)]
        modifiers: Modifiers,
    },
    PointerUp {
        position: Point,
        #[serde(default)]
        modifiers: Modifiers,
    },
    Click {
        position: Point,
        #[serde(default)]
        modifiers: Modifiers,
    },
    RightClick {
        position: Point,
        #[serde(default)]
        modifiers: Modifiers,
    },
    KeyDown {
        key: Key,
        #[serde(default)]
        modifiers: Modifiers,
    },
}

impl InputEvent {
    pub fn down(x: f64, y: f64) -> Self {
        InputEvent::PointerDown {
            position: Point::new(x, y),
            modifiers: Modifiers::NONE,
        }
    }

    pub fn moved(x: f64, y: f64) -> Self {
        InputEvent::PointerMove {
            position: Point::new(x, y),
            modifiers: Modifiers::NONE,
        }
    }

    pub fn up(x: f64, y: f64) -> Self {
        InputEvent::PointerUp {
            position: Point::new(x, y),
            modifiers: Modifiers::NONE,
        }
    }

    pub fn click(x: f64, y: f64) -> Self {
        InputEvent::Click {
            position: Point::new(x, y),
            modifiers: Modifiers::NONE,
        }
    }

    pub fn right_click(x: f64, y: f64) -> Self {
        InputEvent::RightClick {
            position: Point::new(x, y),
            modifiers: Modifiers::NONE,
        }
    }

    pub fn key(key: Key) -> Self {
        InputEvent::KeyDown {
            key,
            modifiers: Modifiers::NONE,
        }
    }

    /// Ctrl plus a character key
    pub fn ctrl(c: char) -> Self {
        InputEvent::KeyDown {
            key: Key::Char(c),
            modifiers: Modifiers::CTRL,
        }
    }

    /// Same event with different modifiers
    pub fn with_modifiers(self, mods: Modifiers) -> Self {
        match self {
            InputEvent::PointerDown { position, .. } => InputEvent::PointerDown {
                position,
                modifiers: mods,
            },
            InputEvent::PointerMove { position, .. } => InputEvent::PointerMove {
                position,
                modifiers: mods,
            },
            InputEvent::PointerUp { position, .. } => InputEvent::PointerUp {
                position,
                modifiers: mods,
            },
            InputEvent::Click { position, .. } => InputEvent::Click {
                position,
                modifiers: mods,
            },
            InputEvent::RightClick { position, .. } => InputEvent::RightClick {
                position,
                modifiers: mods,
            },
            InputEvent::KeyDown { key, .. } => InputEvent::KeyDown {
                key,
                modifiers: mods,
            },
        }
    }

    /// Pointer position, if this is a pointer event
    pub fn position(&self) -> Option<Point> {
        match self {
            InputEvent::PointerDown { position, .. }
            | InputEvent::PointerMove { position, .. }
            | InputEvent::PointerUp { position, .. }
            | InputEvent::Click { position, .. }
            | InputEvent::RightClick { position, .. } => Some(*position),
            InputEvent::KeyDown { .. } => None,
        }
    }

    pub fn modifiers(&self) -> Modifiers {
        match self {
            InputEvent::PointerDown { modifiers, .. }
            | InputEvent::PointerMove { modifiers, .. }
            | InputEvent::PointerUp { modifiers, .. }
            | InputEvent::Click { modifiers, .. }
            | InputEvent::RightClick { modifiers, .. }
            | InputEvent::KeyDown { modifiers, .. } => *modifiers,
        }
    }
}
