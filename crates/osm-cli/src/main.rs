//! osm CLI
//!
//! Helper tool for setting up osm: find the keyboard device and check a
//! keymap before handing it to the daemon.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use miette::IntoDiagnostic;
use osm_config::{key_name, Config, KeyResolver, KeymapTable};

#[derive(Parser, Debug)]
#[command(name = "osm")]
#[command(about = "Setup helper for the osm one-shot modifier daemon")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List available input devices
    Devices,

    /// Check a keymap and show how its key names resolve
    Validate {
        /// Keymap in the form `SRC1=DEST1,SRC2=DEST2,...` (may be repeated)
        #[arg(short, long, num_args = 1..)]
        keymap: Vec<String>,

        /// Path to a KDL configuration file
        #[arg(short, long)]
        config: Option<String>,
    },
}

fn main() -> miette::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Devices => cmd_devices(),
        Commands::Validate { keymap, config } => cmd_validate(&keymap, config.as_deref()),
    }
}

fn cmd_devices() -> miette::Result<()> {
    println!("Available input devices:\n");

    let mut paths: Vec<PathBuf> = std::fs::read_dir("/dev/input")
        .into_diagnostic()?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| {
            path.file_name()
                .and_then(|n| n.to_str())
                .map(|n| n.starts_with("event"))
                .unwrap_or(false)
        })
        .collect();
    paths.sort();

    for path in paths {
        match evdev::Device::open(&path) {
            Ok(device) => {
                let name = device.name().unwrap_or("Unknown");
                let id = device.input_id();
                let vendor_product = format!("{:04x}:{:04x}", id.vendor(), id.product());

                let is_keyboard = device.supported_events().contains(evdev::EventType::KEY)
                    && device
                        .supported_keys()
                        .map(|keys| keys.contains(evdev::Key::KEY_A))
                        .unwrap_or(false);

                let device_type = if is_keyboard { "keyboard" } else { "other" };

                println!("  {} [{}]", name, device_type);
                println!("    Path: {}", path.display());
                println!("    ID: {}", vendor_product);
                println!();
            }
            Err(e) => {
                tracing::debug!("Could not open {}: {}", path.display(), e);
            }
        }
    }

    Ok(())
}

fn cmd_validate(keymap_specs: &[String], config_path: Option<&str>) -> miette::Result<()> {
    let mut config = match config_path {
        Some(path) => {
            let path: PathBuf = shellexpand::tilde(path).into_owned().into();
            println!("Validating configuration: {}", path.display());
            osm_config::parse_config(&path)?
        }
        None => Config::default(),
    };

    config.apply_overrides(None, keymap_specs)?;

    if config.keymap.is_empty() {
        return Err(miette::miette!(
            help = "pass --keymap LeftShift=Escape or --config <PATH>",
            "nothing to validate"
        ));
    }

    let table = KeymapTable::from_pairs(&config.keymap, &KeyResolver::default())?;

    println!("Keymap is valid!");
    if let Some(device) = &config.device {
        println!("  Device: {}", device.display());
    }
    println!("  Triggers: {}", table.len());
    for (trigger, substitute) in table.iter() {
        println!("    - {} -> {} (tap)", key_name(trigger), key_name(substitute));
    }

    Ok(())
}
