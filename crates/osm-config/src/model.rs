//! Configuration data model

use std::path::PathBuf;

use crate::error::ConfigError;
use crate::keymap::split_keymap;

/// Settings needed to start remapping.
///
/// Both fields can come from a KDL file, from the command line, or from a mix
/// of the two (see [`Config::apply_overrides`]).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Config {
    /// Path of the physical keyboard device (e.g. `/dev/input/event3`)
    pub device: Option<PathBuf>,
    /// Keymap entries as `(trigger, substitute)` key names, in file order
    pub keymap: Vec<(String, String)>,
}

impl Config {
    /// Apply command line values on top of this configuration.
    ///
    /// A device path replaces the configured one. Each keymap string is split
    /// and appended after the existing entries, so command line entries win
    /// over file entries for the same trigger.
    pub fn apply_overrides(
        &mut self,
        device: Option<PathBuf>,
        keymap_specs: &[String],
    ) -> Result<(), ConfigError> {
        if let Some(device) = device {
            self.device = Some(device);
        }

        for spec in keymap_specs {
            self.keymap.extend(split_keymap(spec)?);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overrides_replace_device() {
        let mut config = Config {
            device: Some(PathBuf::from("/dev/input/event1")),
            keymap: Vec::new(),
        };

        config
            .apply_overrides(Some(PathBuf::from("/dev/input/event7")), &[])
            .unwrap();
        assert_eq!(config.device, Some(PathBuf::from("/dev/input/event7")));

        config.apply_overrides(None, &[]).unwrap();
        assert_eq!(config.device, Some(PathBuf::from("/dev/input/event7")));
    }

    #[test]
    fn test_overrides_append_keymap() {
        let mut config = Config {
            device: None,
            keymap: vec![("LeftShift".to_string(), "Escape".to_string())],
        };

        config
            .apply_overrides(None, &["LeftShift=Tab,RightCtrl=End".to_string()])
            .unwrap();

        assert_eq!(
            config.keymap,
            vec![
                ("LeftShift".to_string(), "Escape".to_string()),
                ("LeftShift".to_string(), "Tab".to_string()),
                ("RightCtrl".to_string(), "End".to_string()),
            ]
        );
    }

    #[test]
    fn test_overrides_reject_malformed_keymap() {
        let mut config = Config::default();
        let result = config.apply_overrides(None, &["LeftShift".to_string()]);
        assert!(matches!(result, Err(ConfigError::MalformedEntry { .. })));
    }
}
