//! Feature traits for deck capabilities.
//!
//! Decks opt-in to features by implementing these traits and returning
//! `Some(self)` from the corresponding `as_*()` method in the Deck trait.

/// Errors that can occur during deck operations
#[derive(Debug, thiserror::Error)]
pub enum DeckError {
    /// Device was not found
    #[error("device not found")]
    DeviceNotFound,

    /// Key index outside of the deck layout
    #[error("invalid key index {key}, deck has {count} keys")]
    InvalidKey { key: usize, count: usize },

    /// Invalid media data
    #[error("invalid media: {0}")]
    InvalidMedia(&'static str),

    /// Media too large for device
    #[error("media too large: {0}")]
    MediaTooLarge(&'static str),

    /// HID communication error
    #[error("hid error: {0}")]
    Hid(#[from] hidapi::HidError),

    /// Generic IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, DeckError>;

/// Requested backlight level.
///
/// The unit is chosen by the caller; the two modes are not interchangeable
/// for the same number (`Percent(1)` is 1%, `Fraction(1.0)` is 100%).
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Brightness {
    /// Whole percent, clamped to `0..=100`
    Percent(i32),
    /// Fraction of full brightness, scaled by 100 and truncated, then clamped
    Fraction(f64),
}

impl Brightness {
    /// Resolve into the percent byte sent to the device
    pub fn to_percent(self) -> u8 {
        let percent = match self {
            Brightness::Percent(p) => p,
            Brightness::Fraction(f) => (f * 100.0) as i32,
        };
        percent.clamp(0, 100) as u8
    }
}

/// Snapshot of every key's pressed state, indexed by logical key index
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlStates {
    pub keys: Vec<bool>,
}

impl ControlStates {
    /// All keys released
    pub fn released(count: usize) -> Self {
        Self {
            keys: vec![false; count],
        }
    }

    /// Exactly one key pressed
    pub fn pressed(count: usize, key: usize) -> Self {
        let mut this = Self::released(count);
        this.keys[key] = true;
        this
    }

    /// Indices of pressed keys
    pub fn pressed_keys(&self) -> impl Iterator<Item = usize> + '_ {
        self.keys
            .iter()
            .enumerate()
            .filter_map(|(i, pressed)| pressed.then_some(i))
    }
}

/// Per-key image upload capability
pub trait HasKeyImages {
    /// Upload an already encoded key image. `None` uploads a blank image.
    /// The callback receives each page index, then the total page count.
    fn set_key_image(
        &mut self,
        key: usize,
        image: Option<&[u8]>,
        progress: &mut dyn FnMut(usize),
    ) -> Result<()>;
    fn clear_key(&mut self, key: usize) -> Result<()>;
    fn clear_all(&mut self) -> Result<()>;
}

/// Backlight control capability
pub trait HasBrightness {
    fn set_brightness(&mut self, brightness: Brightness) -> Result<()>;
}

/// Key state polling capability
pub trait HasControlStates {
    /// Poll once. `None` means there is no update yet and the caller should retry later.
    fn read_control_states(&mut self) -> Result<Option<ControlStates>>;
}
