//! Virtual device injection via uinput
//!
//! Remapped output goes through the [`KeySink`] trait. [`VirtualKeyboard`] is
//! the uinput implementation used by the daemon; tests use a recording sink.

use anyhow::{Context, Result};
use evdev::{uinput::VirtualDeviceBuilder, AttributeSet, EventType, InputEvent, Key};

use crate::remapper::{event_value, OutputAction};

/// Destination for remapped key output.
///
/// Every call is a complete, synchronized update of the output device.
/// Errors are fatal to the caller.
pub trait KeySink {
    /// Press a key and leave it down
    fn press_key(&mut self, key: Key) -> Result<()>;

    /// Release a key
    fn release_key(&mut self, key: Key) -> Result<()>;

    /// Send a key tap (press + release)
    fn tap_key(&mut self, key: Key) -> Result<()> {
        self.press_key(key)?;
        self.release_key(key)
    }
}

/// Apply remapper actions to a sink, in order.
///
/// Stops at the first failing action; actions after it are not attempted.
pub fn dispatch<S: KeySink + ?Sized>(sink: &mut S, actions: &[OutputAction]) -> Result<()> {
    for action in actions {
        match *action {
            OutputAction::KeyDown(key) => sink.press_key(key)?,
            OutputAction::KeyUp(key) => sink.release_key(key)?,
            OutputAction::PressRelease(key) => sink.tap_key(key)?,
        }
    }
    Ok(())
}

/// A virtual keyboard created through `/dev/uinput`
pub struct VirtualKeyboard {
    device: evdev::uinput::VirtualDevice,
}

impl VirtualKeyboard {
    /// Create a virtual keyboard able to emit the given keys.
    ///
    /// The caller passes every key the physical device supports plus every
    /// substitute from the keymap; keys not registered here are silently
    /// dropped by the kernel.
    ///
    /// # Errors
    ///
    /// Returns an error if the virtual device cannot be created (e.g.
    /// insufficient permissions to access /dev/uinput).
    pub fn new(name: &str, keys: impl IntoIterator<Item = Key>) -> Result<Self> {
        let mut key_set = AttributeSet::<Key>::new();
        for key in keys {
            key_set.insert(key);
        }

        let device = VirtualDeviceBuilder::new()
            .context("Failed to open /dev/uinput")?
            .name(name)
            .with_keys(&key_set)
            .context("Failed to register keys on virtual device")?
            .build()
            .context("Failed to create virtual device")?;

        tracing::info!("Created virtual keyboard '{}'", name);

        Ok(Self { device })
    }

    /// Emit a single key event followed by a sync report
    fn emit_key(&mut self, key: Key, value: i32) -> Result<()> {
        let event = InputEvent::new(EventType::KEY, key.code(), value);
        let syn = InputEvent::new(EventType::SYNCHRONIZATION, 0, 0);
        self.device
            .emit(&[event, syn])
            .with_context(|| format!("Failed to write {:?} to virtual keyboard", key))
    }
}

impl KeySink for VirtualKeyboard {
    fn press_key(&mut self, key: Key) -> Result<()> {
        self.emit_key(key, event_value::PRESS)
    }

    fn release_key(&mut self, key: Key) -> Result<()> {
        self.emit_key(key, event_value::RELEASE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Call {
        Press(Key),
        Release(Key),
    }

    /// Records calls instead of touching a device. Optionally fails after
    /// a number of successful calls.
    #[derive(Default)]
    struct RecordingSink {
        calls: Vec<Call>,
        fail_after: Option<usize>,
    }

    impl RecordingSink {
        fn record(&mut self, call: Call) -> Result<()> {
            if self.fail_after == Some(self.calls.len()) {
                anyhow::bail!("device unplugged");
            }
            self.calls.push(call);
            Ok(())
        }
    }

    impl KeySink for RecordingSink {
        fn press_key(&mut self, key: Key) -> Result<()> {
            self.record(Call::Press(key))
        }

        fn release_key(&mut self, key: Key) -> Result<()> {
            self.record(Call::Release(key))
        }
    }

    #[test]
    fn test_dispatch_in_order() {
        let mut sink = RecordingSink::default();
        let actions = [
            OutputAction::KeyDown(Key::KEY_LEFTSHIFT),
            OutputAction::KeyDown(Key::KEY_A),
            OutputAction::KeyUp(Key::KEY_A),
            OutputAction::KeyUp(Key::KEY_LEFTSHIFT),
        ];

        dispatch(&mut sink, &actions).unwrap();

        assert_eq!(
            sink.calls,
            vec![
                Call::Press(Key::KEY_LEFTSHIFT),
                Call::Press(Key::KEY_A),
                Call::Release(Key::KEY_A),
                Call::Release(Key::KEY_LEFTSHIFT),
            ]
        );
    }

    #[test]
    fn test_press_release_is_a_tap() {
        let mut sink = RecordingSink::default();

        dispatch(&mut sink, &[OutputAction::PressRelease(Key::KEY_ESC)]).unwrap();

        assert_eq!(
            sink.calls,
            vec![Call::Press(Key::KEY_ESC), Call::Release(Key::KEY_ESC)]
        );
    }

    #[test]
    fn test_dispatch_nothing() {
        let mut sink = RecordingSink::default();
        dispatch(&mut sink, &[]).unwrap();
        assert!(sink.calls.is_empty());
    }

    #[test]
    fn test_dispatch_stops_at_first_error() {
        let mut sink = RecordingSink {
            fail_after: Some(1),
            ..Default::default()
        };
        let actions = [
            OutputAction::KeyDown(Key::KEY_LEFTSHIFT),
            OutputAction::KeyDown(Key::KEY_A),
            OutputAction::KeyUp(Key::KEY_A),
        ];

        let err = dispatch(&mut sink, &actions).unwrap_err();

        assert_eq!(err.to_string(), "device unplugged");
        assert_eq!(sink.calls, vec![Call::Press(Key::KEY_LEFTSHIFT)]);
    }

    #[test]
    fn test_dispatch_through_trait_object() {
        let mut sink = RecordingSink::default();
        let dyn_sink: &mut dyn KeySink = &mut sink;

        dispatch(dyn_sink, &[OutputAction::KeyUp(Key::KEY_B)]).unwrap();

        assert_eq!(sink.calls, vec![Call::Release(Key::KEY_B)]);
    }
}
