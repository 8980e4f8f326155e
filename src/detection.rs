//! Deck detection and selection logic.

use bpaf::Bpaf;
use deck_sync_core::{Deck, DeckError};
use hidapi::{DeviceInfo, HidApi};
use mirabox293s::Mirabox293S;
use tracing::debug;

use crate::config::DeviceConfig;

/// Supported deck types
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Bpaf)]
#[bpaf(fallback(DeckKind::Auto), group_help("Deck selection:"))]
pub enum DeckKind {
    /// Auto-detect connected deck (default)
    #[default]
    Auto,
    /// Mirabox Stream Dock 293S
    Mirabox293s,
}

/// Check if a HID device is the configured deck
fn matches(device: &DeviceInfo, config: &DeviceConfig) -> bool {
    device.vendor_id() == config.vendor_id && device.product_id() == config.product_id
}

impl DeckKind {
    /// Open the specified deck, or auto-detect if Auto.
    ///
    /// The device is switched to non-blocking reads so key polling never stalls.
    pub fn as_deck(&self, config: &DeviceConfig) -> Result<Box<dyn Deck>, DeckError> {
        let api = HidApi::new()?;
        // Only one deck type exists so far, auto-detection resolves to it
        match self {
            DeckKind::Auto | DeckKind::Mirabox293s => {
                let info = api
                    .device_list()
                    .find(|d| matches(d, config))
                    .ok_or(DeckError::DeviceNotFound)?;
                debug!(
                    path = ?info.path(),
                    vendor_id = info.vendor_id(),
                    product_id = info.product_id(),
                    "opening deck"
                );
                let device = info.open_device(&api)?;
                device.set_blocking_mode(false)?;
                Ok(Box::new(Mirabox293S::new(device)))
            },
        }
    }
}
