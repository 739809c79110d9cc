//! Trigger -> substitute keymap table
//!
//! A keymap is written as `Trigger=Substitute` entries separated by commas,
//! for example `LeftShift=Escape,RightCtrl=End`. Tapping a trigger on its own
//! emits the substitute; holding it together with another key emits the
//! trigger itself.

use std::collections::HashMap;
use std::fmt;

use evdev::Key;

use crate::error::ConfigError;
use crate::keys::{key_name, KeyResolver};

const ENTRY_DELIMITER: char = ',';
const PAIR_DELIMITER: char = '=';

/// Split a keymap string into `(trigger, substitute)` name pairs.
///
/// Each entry is split on the first `=`, so `Equal==` pairs `Equal` with
/// `=`. Names are trimmed but not resolved.
///
/// # Errors
///
/// - [`ConfigError::EmptyKeymap`] if the string holds no entries at all
/// - [`ConfigError::MalformedEntry`] if an entry has no `=` (an empty entry
///   left by a stray comma included)
pub fn split_keymap(spec: &str) -> Result<Vec<(String, String)>, ConfigError> {
    if spec.trim().is_empty() {
        return Err(ConfigError::EmptyKeymap);
    }

    spec.split(ENTRY_DELIMITER)
        .map(|entry| match entry.split_once(PAIR_DELIMITER) {
            Some((trigger, substitute)) => {
                Ok((trigger.trim().to_string(), substitute.trim().to_string()))
            }
            None => Err(ConfigError::MalformedEntry {
                entry: entry.trim().to_string(),
            }),
        })
        .collect()
}

/// Immutable mapping from trigger keys to their substitutes.
///
/// A trigger maps to exactly one substitute; several triggers may share the
/// same substitute. There is no way to modify a table once it is built.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeymapTable {
    entries: HashMap<Key, Key>,
}

impl KeymapTable {
    /// Build a table from a keymap string such as `LeftShift=Escape,RightCtrl=End`.
    ///
    /// When the same trigger appears more than once, the last entry wins.
    pub fn parse(spec: &str, resolver: &KeyResolver) -> Result<Self, ConfigError> {
        let pairs = split_keymap(spec)?;
        Self::from_pairs(&pairs, resolver)
    }

    /// Build a table from already split name pairs.
    ///
    /// Pairs are applied in order, so a later pair for the same trigger
    /// replaces an earlier one. The whole build fails on the first name the
    /// resolver does not know.
    pub fn from_pairs<S: AsRef<str>>(
        pairs: &[(S, S)],
        resolver: &KeyResolver,
    ) -> Result<Self, ConfigError> {
        if pairs.is_empty() {
            return Err(ConfigError::EmptyKeymap);
        }

        let mut entries = HashMap::with_capacity(pairs.len());

        for (trigger, substitute) in pairs {
            let trigger = resolve(resolver, trigger.as_ref())?;
            let substitute = resolve(resolver, substitute.as_ref())?;

            if let Some(previous) = entries.insert(trigger, substitute) {
                tracing::debug!(
                    "Keymap entry for {} redefined: {} -> {}",
                    key_name(trigger),
                    key_name(previous),
                    key_name(substitute)
                );
            }
        }

        Ok(Self { entries })
    }

    /// The substitute configured for `trigger`, if it is a trigger.
    pub fn substitute(&self, trigger: Key) -> Option<Key> {
        self.entries.get(&trigger).copied()
    }

    pub fn is_trigger(&self, key: Key) -> bool {
        self.entries.contains_key(&key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All `(trigger, substitute)` pairs, ordered by trigger key code.
    pub fn iter(&self) -> impl Iterator<Item = (Key, Key)> {
        let mut pairs: Vec<_> = self.entries.iter().map(|(&t, &s)| (t, s)).collect();
        pairs.sort_by_key(|(trigger, _)| trigger.code());
        pairs.into_iter()
    }

    /// Every key the table can emit as a substitute.
    pub fn substitutes(&self) -> impl Iterator<Item = Key> + '_ {
        self.entries.values().copied()
    }
}

impl fmt::Display for KeymapTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (trigger, substitute)) in self.iter().enumerate() {
            if i > 0 {
                write!(f, "{}", ENTRY_DELIMITER)?;
            }
            write!(
                f,
                "{}{}{}",
                key_name(trigger),
                PAIR_DELIMITER,
                key_name(substitute)
            )?;
        }
        Ok(())
    }
}

fn resolve(resolver: &KeyResolver, name: &str) -> Result<Key, ConfigError> {
    resolver.resolve(name).ok_or_else(|| ConfigError::UnknownKey {
        key: name.trim().to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(spec: &str) -> Result<KeymapTable, ConfigError> {
        KeymapTable::parse(spec, &KeyResolver::default())
    }

    #[test]
    fn test_parse_entries() {
        let table = parse("LeftShift=Escape,RightCtrl=End").unwrap();

        assert_eq!(table.len(), 2);
        assert_eq!(table.substitute(Key::KEY_LEFTSHIFT), Some(Key::KEY_ESC));
        assert_eq!(table.substitute(Key::KEY_RIGHTCTRL), Some(Key::KEY_END));
        assert!(table.is_trigger(Key::KEY_LEFTSHIFT));
        assert!(!table.is_trigger(Key::KEY_A));
        assert!(!table.is_trigger(Key::KEY_ESC), "substitutes are not triggers");
    }

    #[test]
    fn test_parse_single_entry() {
        let table = parse("CapsLock=Esc").unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(table.substitute(Key::KEY_CAPSLOCK), Some(Key::KEY_ESC));
    }

    #[test]
    fn test_parse_trims_names() {
        let table = parse(" leftshift = escape , RIGHTCTRL=end ").unwrap();
        assert_eq!(table.substitute(Key::KEY_LEFTSHIFT), Some(Key::KEY_ESC));
        assert_eq!(table.substitute(Key::KEY_RIGHTCTRL), Some(Key::KEY_END));
    }

    #[test]
    fn test_duplicate_trigger_last_wins() {
        let table = parse("A=B,A=C").unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(table.substitute(Key::KEY_A), Some(Key::KEY_C));
    }

    #[test]
    fn test_shared_substitute() {
        let table = parse("LeftShift=Escape,RightShift=Escape").unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.substitute(Key::KEY_LEFTSHIFT), Some(Key::KEY_ESC));
        assert_eq!(table.substitute(Key::KEY_RIGHTSHIFT), Some(Key::KEY_ESC));
    }

    #[test]
    fn test_split_on_first_equals() {
        let table = parse("Equal==").unwrap();
        assert_eq!(table.substitute(Key::KEY_EQUAL), Some(Key::KEY_EQUAL));

        let pairs = split_keymap("A=B=C").unwrap();
        assert_eq!(pairs, vec![("A".to_string(), "B=C".to_string())]);
    }

    #[test]
    fn test_fail_empty() {
        assert!(matches!(parse(""), Err(ConfigError::EmptyKeymap)));
        assert!(matches!(parse("   "), Err(ConfigError::EmptyKeymap)));
    }

    #[test]
    fn test_fail_malformed_entry() {
        match parse("LeftShift") {
            Err(ConfigError::MalformedEntry { entry }) => assert_eq!(entry, "LeftShift"),
            other => panic!("expected MalformedEntry, got {:?}", other),
        }

        // Trailing comma leaves an empty entry behind
        match parse("LeftShift=Escape,") {
            Err(ConfigError::MalformedEntry { entry }) => assert_eq!(entry, ""),
            other => panic!("expected MalformedEntry, got {:?}", other),
        }
    }

    #[test]
    fn test_fail_unknown_trigger() {
        match parse("Foo=Escape") {
            Err(ConfigError::UnknownKey { key }) => assert_eq!(key, "Foo"),
            other => panic!("expected UnknownKey, got {:?}", other),
        }
    }

    #[test]
    fn test_fail_unknown_substitute() {
        match parse("LeftShift=Escape,RightCtrl=Bar") {
            Err(ConfigError::UnknownKey { key }) => assert_eq!(key, "Bar"),
            other => panic!("expected UnknownKey, got {:?}", other),
        }
    }

    #[test]
    fn test_fail_empty_name() {
        match parse("=Escape") {
            Err(ConfigError::UnknownKey { key }) => assert_eq!(key, ""),
            other => panic!("expected UnknownKey, got {:?}", other),
        }
    }

    #[test]
    fn test_from_pairs() {
        let pairs = vec![
            ("CapsLock".to_string(), "Esc".to_string()),
            ("RightAlt".to_string(), "Home".to_string()),
            ("CapsLock".to_string(), "Tab".to_string()),
        ];
        let table = KeymapTable::from_pairs(&pairs, &KeyResolver::default()).unwrap();

        assert_eq!(table.len(), 2);
        assert_eq!(table.substitute(Key::KEY_CAPSLOCK), Some(Key::KEY_TAB));
        assert_eq!(table.substitute(Key::KEY_RIGHTALT), Some(Key::KEY_HOME));
    }

    #[test]
    fn test_from_pairs_empty() {
        let pairs: Vec<(&str, &str)> = Vec::new();
        assert!(matches!(
            KeymapTable::from_pairs(&pairs, &KeyResolver::default()),
            Err(ConfigError::EmptyKeymap)
        ));
    }

    #[test]
    fn test_iter_sorted_and_display() {
        let table = parse("RightCtrl=End,LeftShift=Escape").unwrap();

        let pairs: Vec<_> = table.iter().collect();
        assert_eq!(
            pairs,
            vec![
                (Key::KEY_LEFTSHIFT, Key::KEY_ESC),
                (Key::KEY_RIGHTCTRL, Key::KEY_END),
            ]
        );
        assert_eq!(table.to_string(), "LEFTSHIFT=ESC,RIGHTCTRL=END");
    }

    #[test]
    fn test_substitutes() {
        let table = parse("LeftShift=Escape,RightCtrl=End").unwrap();
        let mut subs: Vec<_> = table.substitutes().map(|k| k.code()).collect();
        subs.sort();
        assert_eq!(subs, vec![Key::KEY_ESC.code(), Key::KEY_END.code()]);
    }
}
