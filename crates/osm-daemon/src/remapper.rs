//! One-shot remapping logic
//!
//! # Tap vs. Hold State Machine
//!
//! Every trigger key in the keymap has two meanings. Tapped on its own it
//! produces its substitute; held while another key goes down it behaves as
//! itself. Which meaning applies is only known once the next key event
//! arrives, so the trigger's key-down is deferred until then.
//!
//! ```text
//!                  Down(trigger T)
//!   ┌──────────┐ ─────────────────────► ┌──────────────┐
//!   │   IDLE   │                         │  HELD(T)     │
//!   │ held:    │ ◄───────────────────── │  held:       │
//!   │ None     │   Up(T): tap            │  Some(T)     │
//!   └──────────┘   emit PressRelease(S)  └──────┬───────┘
//!        ▲                                      │
//!        │  Down(K), K not a trigger:           │ Down(trigger T2):
//!        │  emit KeyDown(T), KeyDown(K)         │ emit KeyDown(T), held = T2
//!        └──────────────────────────────────────┘
//! ```
//!
//! ## Rules
//!
//! Events are handled strictly in arrival order, one at a time:
//!
//! 1. Anything that is not a key press or key release (sync reports,
//!    autorepeat, misc events) is dropped without touching the state.
//! 2. Key press of `K`:
//!    - a held trigger `T` is resolved as a hold: `KeyDown(T)` is emitted first
//!    - if `K` is a trigger it becomes the held trigger and nothing else is
//!      emitted yet
//!    - otherwise `KeyDown(K)` is emitted and nothing is held
//! 3. Key release of `K`:
//!    - if `K` is the held trigger, this was a tap: `PressRelease(substitute)`
//!      is emitted and nothing is held
//!    - otherwise `KeyUp(K)` is emitted and the held trigger is left as is
//!
//! A deferred `KeyDown(T)` is emitted at most once, right before the next
//! key press, so the virtual device never sees a duplicated or reordered
//! key-down for the same key.
//!
//! The last rule means a release of some unrelated key does not resolve a
//! pending trigger; only a release of the trigger itself or the next key
//! press does.

use evdev::{EventType, InputEvent, Key};
use osm_config::KeymapTable;

/// Event value constants for key events.
pub mod event_value {
    /// Key release event value
    pub const RELEASE: i32 = 0;
    /// Key press event value
    pub const PRESS: i32 = 1;
    /// Key repeat event value (autorepeat)
    #[allow(dead_code)]
    pub const REPEAT: i32 = 2;
}

/// What a raw input event means to the remapper.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyEventKind {
    Down,
    Up,
    /// Autorepeat and every non-key event
    Other,
}

/// A raw event from the physical device, reduced to what the remapper needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawKeyEvent {
    pub key: Key,
    pub kind: KeyEventKind,
}

#[allow(dead_code)]
impl RawKeyEvent {
    pub fn down(key: Key) -> Self {
        Self {
            key,
            kind: KeyEventKind::Down,
        }
    }

    pub fn up(key: Key) -> Self {
        Self {
            key,
            kind: KeyEventKind::Up,
        }
    }
}

impl From<InputEvent> for RawKeyEvent {
    fn from(event: InputEvent) -> Self {
        let kind = if event.event_type() != EventType::KEY {
            KeyEventKind::Other
        } else {
            match event.value() {
                event_value::PRESS => KeyEventKind::Down,
                event_value::RELEASE => KeyEventKind::Up,
                _ => KeyEventKind::Other,
            }
        };

        Self {
            key: Key::new(event.code()),
            kind,
        }
    }
}

/// An action for the virtual output device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputAction {
    /// Press a key and keep it down
    KeyDown(Key),
    /// Release a key
    KeyUp(Key),
    /// Press and immediately release a key
    PressRelease(Key),
}

/// Remapper translates raw key events according to a keymap.
///
/// The only mutable state is the trigger currently held and not yet resolved
/// as a tap or a hold. It starts out empty and is only changed by
/// [`Remapper::transition`].
#[derive(Debug)]
pub struct Remapper {
    keymap: KeymapTable,
    held: Option<Key>,
}

impl Remapper {
    pub fn new(keymap: KeymapTable) -> Self {
        Self { keymap, held: None }
    }

    /// Process one event and return the actions to emit, in order.
    ///
    /// Never fails: keys outside the keymap are simply not triggers and pass
    /// through unchanged.
    pub fn transition(&mut self, event: RawKeyEvent) -> Vec<OutputAction> {
        let RawKeyEvent { key, kind } = event;

        match kind {
            KeyEventKind::Other => Vec::new(),
            KeyEventKind::Down => {
                let mut actions = Vec::with_capacity(2);

                // A second key while a trigger is pending: the trigger was a hold
                if let Some(held) = self.held.take() {
                    actions.push(OutputAction::KeyDown(held));
                }

                if self.keymap.is_trigger(key) {
                    self.held = Some(key);
                } else {
                    actions.push(OutputAction::KeyDown(key));
                }

                actions
            }
            KeyEventKind::Up => match (self.held, self.keymap.substitute(key)) {
                (Some(held), Some(substitute)) if held == key => {
                    self.held = None;
                    vec![OutputAction::PressRelease(substitute)]
                }
                _ => vec![OutputAction::KeyUp(key)],
            },
        }
    }

    /// The trigger waiting to be resolved as a tap or a hold, if any.
    pub fn held_trigger(&self) -> Option<Key> {
        self.held
    }

    pub fn keymap(&self) -> &KeymapTable {
        &self.keymap
    }
}
