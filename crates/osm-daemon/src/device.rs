//! Exclusive access to the physical keyboard

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use evdev::{Device, InputEvent, Key};

/// An evdev device grabbed for exclusive access.
///
/// While this value is alive no other reader (X11, Wayland compositor, the
/// console) sees the device's events. The grab is released when it is
/// dropped, including when the event loop exits with an error.
pub struct GrabbedDevice {
    device: Device,
    path: PathBuf,
    name: String,
}

impl GrabbedDevice {
    /// Open the device at `path` and grab it.
    pub fn open(path: &Path) -> Result<Self> {
        let mut device = Device::open(path)
            .with_context(|| format!("Failed to open device at {}", path.display()))?;

        let name = device.name().unwrap_or("Unnamed Device").to_string();

        device.grab().with_context(|| {
            format!(
                "Failed to grab device '{}' at {} for exclusive access. \
                 Is another application using this device?",
                name,
                path.display()
            )
        })?;

        tracing::info!("Grabbed device '{}' at {}", name, path.display());

        Ok(Self {
            device,
            path: path.to_path_buf(),
            name,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Keys the physical device reports it can produce
    pub fn supported_keys(&self) -> Vec<Key> {
        self.device
            .supported_keys()
            .map(|keys| keys.iter().collect())
            .unwrap_or_default()
    }

    /// Block until the device has events and return the next batch.
    pub fn fetch_events(&mut self) -> Result<impl Iterator<Item = InputEvent> + '_> {
        let path = &self.path;
        self.device
            .fetch_events()
            .with_context(|| format!("Failed to read events from {}", path.display()))
    }
}

impl Drop for GrabbedDevice {
    fn drop(&mut self) {
        match self.device.ungrab() {
            Ok(()) => tracing::info!("Released device '{}'", self.name),
            Err(e) => tracing::warn!(
                "Failed to release device '{}' at {}: {}",
                self.name,
                self.path.display(),
                e
            ),
        }
    }
}
