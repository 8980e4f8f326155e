//! Key image batch transfers.
//!
//! An image is uploaded as a `start_batch` command announcing the size and
//! target key, the raw image bytes split into report sized pages, then a
//! `stop_batch` command. Pages carry no header and are never acknowledged.

use std::slice::Chunks;

use deck_sync_core::{DeckError, Result};

use crate::abi;
use crate::consts::PACKET_LENGTH;

/// A validated image upload for one device key
#[derive(Debug, Clone, Copy)]
pub struct ImageBatch<'a> {
    device_key_id: u8,
    size: u16,
    image: &'a [u8],
}

impl<'a> ImageBatch<'a> {
    /// Validate an encoded image for upload. The size field on the wire is 16 bits wide.
    pub fn new(device_key_id: u8, image: &'a [u8]) -> Result<Self> {
        if image.is_empty() {
            return Err(DeckError::InvalidMedia("key image is empty"));
        }
        let size = u16::try_from(image.len())
            .map_err(|_| DeckError::MediaTooLarge("key image must be at most 65535 bytes"))?;
        Ok(Self {
            device_key_id,
            size,
            image,
        })
    }

    pub fn device_key_id(&self) -> u8 {
        self.device_key_id
    }

    /// Declared size, equal to the sum of all page lengths
    pub fn size(&self) -> u16 {
        self.size
    }

    pub fn page_count(&self) -> usize {
        self.image.len().div_ceil(PACKET_LENGTH)
    }

    /// Pages in upload order. Only the last page may be short.
    pub fn pages(&self) -> Chunks<'a, u8> {
        self.image.chunks(PACKET_LENGTH)
    }

    /// Payload announcing this batch
    pub fn start_command(&self) -> Vec<u8> {
        abi::start_batch(self.size, self.device_key_id)
    }
}
