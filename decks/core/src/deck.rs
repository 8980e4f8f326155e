//! Core Deck trait and related types.

use crate::features::{HasBrightness, HasControlStates, HasKeyImages, Result};

/// Static information about a deck type for detection and CLI
#[derive(Debug, Clone, Copy)]
pub struct DeckInfo {
    pub name: &'static str,
    pub cli_name: &'static str,
    pub vendor_id: u16,
    pub product_id: u16,
    pub layout: KeyLayout,
    pub key_image: KeyImageFormat,
    /// Keys carry a display
    pub visual: bool,
    /// Touch input is exposed by this driver
    pub touch: bool,
}

/// Physical key grid. Key indices are row-major over `cols x rows`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyLayout {
    pub count: usize,
    pub cols: usize,
    pub rows: usize,
}

/// Encoding the device expects for key images
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageEncoding {
    Jpeg,
}

impl std::fmt::Display for ImageEncoding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Jpeg => write!(f, "JPEG"),
        }
    }
}

/// Key image geometry and transform applied by the host before upload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyImageFormat {
    pub width: u32,
    pub height: u32,
    pub encoding: ImageEncoding,
    /// Clockwise rotation in degrees
    pub rotation: u16,
    /// Horizontal and vertical flip
    pub flip: (bool, bool),
}

/// Core deck trait - object-safe for `dyn Deck`
///
/// Lifecycle methods every deck supports are required. Optional capabilities
/// are discovered through the `as_*` methods.
pub trait Deck: Send {
    /// Get deck info (instance method for object safety)
    fn info(&self) -> &'static DeckInfo;

    /// Reset the deck to a blank, connected state
    fn reset(&mut self) -> Result<()>;

    /// USB serial number, if the device reports one
    fn serial_number(&mut self) -> Result<Option<String>>;

    /// Firmware version string reported by the device
    fn firmware_version(&mut self) -> Result<String>;

    /// Feature opt-in methods - override to return `Some(self)` if feature is supported
    fn as_key_images(&mut self) -> Option<&mut dyn HasKeyImages> {
        None
    }
    fn as_brightness(&mut self) -> Option<&mut dyn HasBrightness> {
        None
    }
    fn as_control_states(&mut self) -> Option<&mut dyn HasControlStates> {
        None
    }
}
