//! KDL configuration parser
//!
//! ```kdl
//! device "/dev/input/by-id/usb-Keyboard-event-kbd"
//! keymap {
//!     LeftShift "Escape"
//!     RightCtrl "End"
//! }
//! ```

use std::path::Path;

use crate::error::ConfigError;
use crate::model::Config;

/// Parse a configuration file from the given path
pub fn parse_config(path: &Path) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    parse_config_str(&content)
}

/// Parse configuration from a string
pub fn parse_config_str(content: &str) -> Result<Config, ConfigError> {
    let doc: kdl::KdlDocument = content.parse().map_err(|e: kdl::KdlError| {
        // kdl carries its own miette version, so rebuild the span by hand
        let span = miette::SourceSpan::from((e.span.offset(), e.span.len()));
        ConfigError::ParseError {
            src: content.to_string(),
            span,
            source: e,
        }
    })?;

    let mut config = Config::default();

    for node in doc.nodes() {
        match node.name().value() {
            "device" => {
                let path = first_string(node).ok_or_else(|| ConfigError::Invalid {
                    message: "`device` needs a path, e.g. `device \"/dev/input/event3\"`"
                        .to_string(),
                })?;
                config.device = Some(shellexpand::tilde(path).into_owned().into());
            }
            "keymap" => {
                config.keymap.extend(parse_keymap_block(node)?);
            }
            name => {
                tracing::warn!("Unknown top-level node: {}", name);
            }
        }
    }

    Ok(config)
}

fn parse_keymap_block(node: &kdl::KdlNode) -> Result<Vec<(String, String)>, ConfigError> {
    let mut pairs = Vec::new();

    if let Some(children) = node.children() {
        for child in children.nodes() {
            let trigger = child.name().value();

            match first_string(child) {
                Some(substitute) => pairs.push((trigger.to_string(), substitute.to_string())),
                None => {
                    return Err(ConfigError::Invalid {
                        message: format!(
                            "keymap entry `{}` needs a substitute key, e.g. `{} \"Escape\"`",
                            trigger, trigger
                        ),
                    });
                }
            }
        }
    }

    Ok(pairs)
}

fn first_string(node: &kdl::KdlNode) -> Option<&str> {
    node.entries().first().and_then(|e| e.value().as_string())
}
