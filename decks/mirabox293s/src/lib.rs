//! High level abstraction for driving the Mirabox Stream Dock 293S.
//!
//! The 293S speaks a reverse engineered `CRT` command protocol over 513 byte
//! HID output reports (report id 0 followed by a 512 byte packet). Key images
//! are 85x85 JPEGs rotated by 90 degrees, uploaded in pages.
//!
//! The device only reports key releases. [`Mirabox293S::read_control_states`]
//! turns every release into a press snapshot followed by a release snapshot.

use deck_sync_core::{
    extract_string, Brightness, ControlStates, Deck, DeckInfo, HasBrightness, HasControlStates,
    HasKeyImages, ImageEncoding, KeyImageFormat, KeyLayout, Result, Transport,
};
use hidapi::HidDevice;
use tracing::{debug, trace};

pub mod abi;
pub mod blank;
pub mod keymap;
pub mod poller;
pub mod types;
pub mod upload;

pub use blank::BLANK_KEY_IMAGE;
pub use poller::{decode_ack, ControlStatePoller};
pub use types::{DecodeError, PollState};
pub use upload::ImageBatch;

use consts::*;

pub mod consts {
    pub const VENDOR_ID: u16 = 0x5548;
    pub const PRODUCT_ID: u16 = 0x6670;

    pub const KEY_COUNT: usize = 15;
    pub const KEY_COLS: usize = 5;
    pub const KEY_ROWS: usize = 3;

    pub const KEY_PIXEL_WIDTH: u32 = 85;
    pub const KEY_PIXEL_HEIGHT: u32 = 85;
    /// Clockwise rotation applied to key images before encoding
    pub const KEY_ROTATION: u16 = 90;

    /// Payload bytes per report
    pub const PACKET_LENGTH: usize = 512;
    /// Report id byte plus payload
    pub const FRAME_LENGTH: usize = PACKET_LENGTH + 1;
    pub const REPORT_ID: u8 = 0x00;

    /// Header of the report sent when a key is released
    pub const ACK_MAGIC: [u8; 8] = *b"ACK\0\0OK\0";
    /// Offset of the device key id in a key report
    pub const ACK_KEY_OFFSET: usize = 9;

    /// Device key ids of the side display segments. Not driven by this crate.
    pub const SIDE_DISPLAY_KEY_IDS: [u8; 3] = [0x10, 0x11, 0x12];
    pub const SIDE_DISPLAY_PIXEL_SIZE: u32 = 80;
}

/// Static deck info for detection
pub static INFO: DeckInfo = DeckInfo {
    name: "Mirabox Stream Dock 293S",
    cli_name: "mirabox293s",
    vendor_id: VENDOR_ID,
    product_id: PRODUCT_ID,
    layout: KeyLayout {
        count: KEY_COUNT,
        cols: KEY_COLS,
        rows: KEY_ROWS,
    },
    key_image: KeyImageFormat {
        width: KEY_PIXEL_WIDTH,
        height: KEY_PIXEL_HEIGHT,
        encoding: ImageEncoding::Jpeg,
        rotation: KEY_ROTATION,
        flip: (false, false),
    },
    visual: true,
    // the side display has touch hardware, but it is not exposed
    touch: false,
};

/// High level abstraction for managing a Stream Dock 293S
pub struct Mirabox293S<T = HidDevice> {
    transport: T,
    poller: ControlStatePoller,
}

impl<T: Transport> Mirabox293S<T> {
    /// Wrap an already opened transport
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            poller: ControlStatePoller::new(),
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    pub fn into_inner(self) -> T {
        self.transport
    }

    pub fn poll_state(&self) -> PollState {
        self.poller.state()
    }

    /// Internal method to frame and write a payload. Nothing is read back.
    fn execute(&mut self, payload: &[u8]) -> Result<()> {
        let frame = abi::frame(REPORT_ID, payload);
        trace!(head = ?&frame[..16], "write report");
        self.transport.write(&frame)?;
        Ok(())
    }

    /// Drop and reopen the host session, then clear every key
    pub fn reset(&mut self) -> Result<()> {
        debug!("resetting deck");
        self.execute(&abi::disconnect())?;
        self.execute(&abi::connect())?;
        self.execute(&abi::clear(abi::CLEAR_ALL))
    }

    /// Set the backlight level
    pub fn set_brightness(&mut self, brightness: Brightness) -> Result<()> {
        let percent = brightness.to_percent();
        debug!(percent, "setting brightness");
        self.execute(&abi::set_brightness(percent))
    }

    pub fn serial_number(&mut self) -> Result<Option<String>> {
        self.transport.serial_number()
    }

    /// Read the firmware version from input report 0
    pub fn firmware_version(&mut self) -> Result<String> {
        let mut buf = [0u8; FRAME_LENGTH];
        let len = self.transport.read_input_report(REPORT_ID, &mut buf)?;
        Ok(extract_string(buf.get(1..len).unwrap_or_default()))
    }

    /// Upload an encoded key image. `None` or an empty buffer uploads a blank image.
    pub fn set_key_image(&mut self, key: usize, image: Option<&[u8]>) -> Result<()> {
        self.set_key_image_with_progress(key, image, &mut |_| {})
    }

    /// Upload an encoded key image, reporting each page index and finally the page count.
    ///
    /// The key index and image size are validated before anything is written.
    pub fn set_key_image_with_progress(
        &mut self,
        key: usize,
        image: Option<&[u8]>,
        cb: &mut dyn FnMut(usize),
    ) -> Result<()> {
        let device_key_id = keymap::to_device_id(key)?;
        let image = image.filter(|i| !i.is_empty()).unwrap_or(BLANK_KEY_IMAGE);
        let batch = ImageBatch::new(device_key_id, image)?;
        debug!(
            key,
            device_key_id,
            size = batch.size(),
            pages = batch.page_count(),
            "uploading key image"
        );

        self.execute(&batch.start_command())?;
        for (page_index, page) in batch.pages().enumerate() {
            cb(page_index);
            self.execute(page)?;
        }
        self.execute(&abi::stop_batch())?;

        cb(batch.page_count());
        Ok(())
    }

    /// Clear a single key image
    pub fn clear_key(&mut self, key: usize) -> Result<()> {
        let device_key_id = keymap::to_device_id(key)?;
        self.execute(&abi::clear(device_key_id))
    }

    /// Clear every key image
    pub fn clear_all(&mut self) -> Result<()> {
        self.execute(&abi::clear(abi::CLEAR_ALL))
    }

    /// Poll key states once. `None` means no update is available yet.
    pub fn read_control_states(&mut self) -> Result<Option<ControlStates>> {
        let transport = &mut self.transport;
        self.poller.poll(|buf| transport.read(buf))
    }

    /// Side display images are not supported. Accepted and ignored.
    pub fn set_touchscreen_image(
        &mut self,
        _image: &[u8],
        _x: u32,
        _y: u32,
        _width: u32,
        _height: u32,
    ) -> Result<()> {
        trace!("ignoring touchscreen image");
        Ok(())
    }
}

// === Trait Implementations ===

impl<T: Transport + Send> Deck for Mirabox293S<T> {
    fn info(&self) -> &'static DeckInfo {
        &INFO
    }

    fn reset(&mut self) -> Result<()> {
        Mirabox293S::reset(self)
    }

    fn serial_number(&mut self) -> Result<Option<String>> {
        Mirabox293S::serial_number(self)
    }

    fn firmware_version(&mut self) -> Result<String> {
        Mirabox293S::firmware_version(self)
    }

    fn as_key_images(&mut self) -> Option<&mut dyn HasKeyImages> {
        Some(self)
    }

    fn as_brightness(&mut self) -> Option<&mut dyn HasBrightness> {
        Some(self)
    }

    fn as_control_states(&mut self) -> Option<&mut dyn HasControlStates> {
        Some(self)
    }
}

impl<T: Transport> HasKeyImages for Mirabox293S<T> {
    fn set_key_image(
        &mut self,
        key: usize,
        image: Option<&[u8]>,
        progress: &mut dyn FnMut(usize),
    ) -> Result<()> {
        Mirabox293S::set_key_image_with_progress(self, key, image, progress)
    }

    fn clear_key(&mut self, key: usize) -> Result<()> {
        Mirabox293S::clear_key(self, key)
    }

    fn clear_all(&mut self) -> Result<()> {
        Mirabox293S::clear_all(self)
    }
}

impl<T: Transport> HasBrightness for Mirabox293S<T> {
    fn set_brightness(&mut self, brightness: Brightness) -> Result<()> {
        Mirabox293S::set_brightness(self, brightness)
    }
}

impl<T: Transport> HasControlStates for Mirabox293S<T> {
    fn read_control_states(&mut self) -> Result<Option<ControlStates>> {
        Mirabox293S::read_control_states(self)
    }
}
