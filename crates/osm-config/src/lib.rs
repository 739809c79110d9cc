//! Configuration for osm
//!
//! This crate resolves key names, builds the trigger -> substitute keymap
//! table and parses the optional KDL configuration file.

mod error;
mod keymap;
mod keys;
mod model;
mod parser;

pub use error::ConfigError;
pub use keymap::{split_keymap, KeymapTable};
pub use keys::{evdev_lookup, key_name, KeyLookup, KeyResolver};
pub use model::Config;
pub use parser::{parse_config, parse_config_str};
