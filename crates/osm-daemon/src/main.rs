//! osm daemon
//!
//! Grabs a keyboard and gives its trigger keys one-shot behavior: tapped on
//! their own they produce their substitute key, held with another key they
//! act as themselves.

mod device;
mod injector;
mod remapper;

use std::path::PathBuf;

use anyhow::Result;
use clap::{CommandFactory, Parser};
use osm_config::{Config, KeyResolver, KeymapTable};
use tracing_subscriber::EnvFilter;

use crate::device::GrabbedDevice;
use crate::injector::{KeySink, VirtualKeyboard};
use crate::remapper::{RawKeyEvent, Remapper};

/// Exit status for a missing device or keymap, same as clap's usage errors
const USAGE_ERROR: i32 = 2;

#[derive(Parser, Debug)]
#[command(name = "osmd")]
#[command(about = "One-shot modifier remapping daemon")]
#[command(version)]
struct Args {
    /// Path of the keyboard device
    ///
    /// Example: --device /dev/input/event42
    ///
    /// The device path can be found with `osm devices`, `cat /proc/bus/input/devices`
    /// or `ls -l /dev/input/by-id`.
    #[arg(short, long)]
    device: Option<String>,

    /// Trigger and substitute keys in the form `SRC1=DEST1,SRC2=DEST2,...`
    ///
    /// Example: --keymap LeftShift=Escape,RightCtrl=End
    ///
    /// May be given more than once; later entries win. Key names are evdev names
    /// without the `KEY_` prefix and are not case-sensitive.
    #[arg(short, long, num_args = 1..)]
    keymap: Vec<String>,

    /// Path to a KDL configuration file (command line values take precedence)
    #[arg(short, long)]
    config: Option<String>,
}

fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => {
            let config_path = expand_path(path);
            tracing::info!("Loading configuration from {}", config_path.display());
            osm_config::parse_config(&config_path)?
        }
        None => Config::default(),
    };

    config.apply_overrides(args.device.as_deref().map(expand_path), &args.keymap)?;

    let device_path = match config.device.take() {
        Some(path) if !config.keymap.is_empty() => path,
        _ => usage_error("both a device and a keymap are required"),
    };

    let keymap = KeymapTable::from_pairs(&config.keymap, &KeyResolver::default())?;

    tracing::info!("Loaded keymap with {} trigger(s): {}", keymap.len(), keymap);

    let mut source = GrabbedDevice::open(&device_path)?;

    let keys: Vec<_> = source
        .supported_keys()
        .into_iter()
        .chain(keymap.substitutes())
        .collect();
    let mut sink = VirtualKeyboard::new(&format!("osm virtual keyboard ({})", source.name()), keys)?;

    tracing::info!("osm daemon running on {}", source.path().display());

    run(&mut source, &mut sink, Remapper::new(keymap))
}

/// Read, translate and write events until the device fails.
///
/// All actions for one event are written before the next event is looked at.
fn run<S: KeySink>(source: &mut GrabbedDevice, sink: &mut S, mut remapper: Remapper) -> Result<()> {
    tracing::debug!(
        "Waiting for events from '{}' ({} trigger(s) armed)",
        source.name(),
        remapper.keymap().len()
    );

    loop {
        for event in source.fetch_events()? {
            let event = RawKeyEvent::from(event);
            let actions = remapper.transition(event);

            if !actions.is_empty() {
                tracing::trace!(
                    "{:?} {:?} -> {:?} (held: {:?})",
                    event.kind,
                    event.key,
                    actions,
                    remapper.held_trigger()
                );
            }

            injector::dispatch(sink, &actions)?;
        }
    }
}

fn expand_path(path: &str) -> PathBuf {
    shellexpand::tilde(path).into_owned().into()
}

fn usage_error(message: &str) -> ! {
    eprintln!("{}\n", Args::command().render_help());
    eprintln!("error: {}", message);
    std::process::exit(USAGE_ERROR);
}
