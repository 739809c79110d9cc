//! Key name resolution
//!
//! Key names are matched case-insensitively after trimming surrounding
//! whitespace. The lookup itself is a plain function so callers (and tests)
//! can swap the table without touching any global state.

use std::fmt;
use std::str::FromStr;

use evdev::Key;

/// A key table lookup.
///
/// Receives a name that is already trimmed and upper-cased, and returns the
/// matching key if the table knows it.
pub type KeyLookup = fn(&str) -> Option<Key>;

/// Resolves human-readable key names (`LeftShift`, `esc`, `KEY_END`) to
/// evdev keys.
#[derive(Clone, Copy)]
pub struct KeyResolver {
    lookup: KeyLookup,
}

impl KeyResolver {
    /// Create a resolver backed by the given lookup table.
    pub fn new(lookup: KeyLookup) -> Self {
        Self { lookup }
    }

    /// Resolve a key name.
    ///
    /// Returns `None` for empty names, names the table does not know, and for
    /// `KEY_RESERVED`, which the kernel uses as "no key".
    pub fn resolve(&self, name: &str) -> Option<Key> {
        let normalized = name.trim().to_uppercase();

        if normalized.is_empty() {
            return None;
        }

        (self.lookup)(&normalized).filter(|key| *key != Key::KEY_RESERVED)
    }
}

impl Default for KeyResolver {
    fn default() -> Self {
        Self::new(evdev_lookup)
    }
}

impl fmt::Debug for KeyResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyResolver").finish_non_exhaustive()
    }
}

/// The default key table: friendly aliases first, then evdev's own names.
///
/// `LeftShift` is looked up as `KEY_LEFTSHIFT`; a name that already carries
/// the `KEY_` prefix is looked up as is.
pub fn evdev_lookup(name: &str) -> Option<Key> {
    if let Some(key) = alias(name) {
        return Some(key);
    }

    let kernel_name = if name.starts_with("KEY_") {
        name.to_string()
    } else {
        format!("KEY_{}", name)
    };

    Key::from_str(&kernel_name).ok()
}

/// Short display name for a key (`KEY_LEFTSHIFT` -> `LEFTSHIFT`).
pub fn key_name(key: Key) -> String {
    let name = format!("{:?}", key);
    match name.strip_prefix("KEY_") {
        Some(stripped) => stripped.to_string(),
        None => name,
    }
}

/// Names that differ from the kernel's `KEY_*` spelling.
fn alias(name: &str) -> Option<Key> {
    let key = match name {
        "ESCAPE" => Key::KEY_ESC,
        "CAPS" | "CAPS_LOCK" => Key::KEY_CAPSLOCK,
        "RETURN" => Key::KEY_ENTER,

        // Modifiers
        "LCTRL" | "CTRL" | "CONTROL" => Key::KEY_LEFTCTRL,
        "RCTRL" => Key::KEY_RIGHTCTRL,
        "LSHIFT" | "SHIFT" => Key::KEY_LEFTSHIFT,
        "RSHIFT" => Key::KEY_RIGHTSHIFT,
        "LALT" | "ALT" => Key::KEY_LEFTALT,
        "RALT" | "ALTGR" => Key::KEY_RIGHTALT,
        "LMETA" | "META" | "SUPER" | "WIN" => Key::KEY_LEFTMETA,
        "RMETA" => Key::KEY_RIGHTMETA,

        // Symbols
        "-" => Key::KEY_MINUS,
        "EQUALS" | "=" => Key::KEY_EQUAL,
        "LBRACE" | "[" => Key::KEY_LEFTBRACE,
        "RBRACE" | "]" => Key::KEY_RIGHTBRACE,
        ";" => Key::KEY_SEMICOLON,
        "'" => Key::KEY_APOSTROPHE,
        "`" => Key::KEY_GRAVE,
        "\\" => Key::KEY_BACKSLASH,
        "," => Key::KEY_COMMA,
        "PERIOD" | "." => Key::KEY_DOT,
        "/" => Key::KEY_SLASH,

        // Navigation
        "UPARROW" => Key::KEY_UP,
        "DOWNARROW" => Key::KEY_DOWN,
        "LEFTARROW" => Key::KEY_LEFT,
        "RIGHTARROW" => Key::KEY_RIGHT,
        "PGUP" => Key::KEY_PAGEUP,
        "PGDN" | "PGDOWN" => Key::KEY_PAGEDOWN,
        "INS" => Key::KEY_INSERT,
        "DEL" => Key::KEY_DELETE,

        // Numpad
        "NUMPAD0" => Key::KEY_KP0,
        "NUMPAD1" => Key::KEY_KP1,
        "NUMPAD2" => Key::KEY_KP2,
        "NUMPAD3" => Key::KEY_KP3,
        "NUMPAD4" => Key::KEY_KP4,
        "NUMPAD5" => Key::KEY_KP5,
        "NUMPAD6" => Key::KEY_KP6,
        "NUMPAD7" => Key::KEY_KP7,
        "NUMPAD8" => Key::KEY_KP8,
        "NUMPAD9" => Key::KEY_KP9,
        "KPDECIMAL" | "NUMPAD_DOT" => Key::KEY_KPDOT,
        "NUMPAD_ENTER" => Key::KEY_KPENTER,
        "KPADD" | "NUMPAD_PLUS" => Key::KEY_KPPLUS,
        "KPSUBTRACT" | "NUMPAD_MINUS" => Key::KEY_KPMINUS,
        "KPMULTIPLY" | "NUMPAD_MULTIPLY" => Key::KEY_KPASTERISK,
        "KPDIVIDE" | "NUMPAD_DIVIDE" => Key::KEY_KPSLASH,
        "NUM_LOCK" => Key::KEY_NUMLOCK,

        // Media
        "XF86BACK" => Key::KEY_BACK,
        "XF86FORWARD" => Key::KEY_FORWARD,

        _ => return None,
    };

    Some(key)
}
