use miette::Diagnostic;
use thiserror::Error;

#[derive(Error, Diagnostic, Debug)]
pub enum ConfigError {
    #[error("Failed to parse KDL")]
    #[diagnostic(code(osm::config::parse_error))]
    ParseError {
        #[source_code]
        src: String,
        #[label("here")]
        span: miette::SourceSpan,
        #[source]
        source: kdl::KdlError,
    },

    #[error("Invalid configuration: {message}")]
    #[diagnostic(code(osm::config::invalid))]
    Invalid { message: String },

    #[error("Keymap is empty")]
    #[diagnostic(
        code(osm::config::empty_keymap),
        help("expected entries like `LeftShift=Escape,RightCtrl=End`")
    )]
    EmptyKeymap,

    #[error("Malformed keymap entry: '{entry}'")]
    #[diagnostic(
        code(osm::config::malformed_entry),
        help("each entry must be of the form `Trigger=Substitute`")
    )]
    MalformedEntry { entry: String },

    #[error("Unknown key name: {key}")]
    #[diagnostic(
        code(osm::config::unknown_key),
        help("use an evdev key name without the `KEY_` prefix, e.g. `LeftShift`, `Esc`, `End`")
    )]
    UnknownKey { key: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
