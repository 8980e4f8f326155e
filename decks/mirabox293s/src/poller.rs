//! Key event polling.
//!
//! The 293S only sends a report when a key is released. Each report is turned
//! into a press snapshot, and the following poll reports the release without
//! touching the device. Reports that fail to decode leave the state alone, so
//! the next valid report is still paired correctly.

use deck_sync_core::{ControlStates, Result};
use tracing::{debug, trace};

use crate::consts::{ACK_KEY_OFFSET, ACK_MAGIC, KEY_COUNT, PACKET_LENGTH};
use crate::keymap::to_key_index;
use crate::types::{DecodeError, PollState};

/// Decode a key acknowledgement report into a logical key index
pub fn decode_ack(report: &[u8]) -> std::result::Result<usize, DecodeError> {
    let header: [u8; 8] = report
        .get(..ACK_MAGIC.len())
        .and_then(|h| h.try_into().ok())
        .ok_or(DecodeError::ShortReport(report.len()))?;
    if header != ACK_MAGIC {
        return Err(DecodeError::BadMagic(header));
    }
    let device_id = *report
        .get(ACK_KEY_OFFSET)
        .ok_or(DecodeError::ShortReport(report.len()))?;
    to_key_index(device_id)
}

/// Edge simulating poller, owned by a single deck
pub struct ControlStatePoller {
    state: PollState,
    buf: [u8; PACKET_LENGTH],
}

impl Default for ControlStatePoller {
    fn default() -> Self {
        Self::new()
    }
}

impl ControlStatePoller {
    pub fn new() -> Self {
        Self {
            state: PollState::default(),
            buf: [0u8; PACKET_LENGTH],
        }
    }

    pub fn state(&self) -> PollState {
        self.state
    }

    /// Advance the poller once.
    ///
    /// `read` is only called while waiting for hardware. It fills the buffer
    /// with one input report and returns its length, 0 meaning nothing was
    /// available. Read errors propagate and leave the state unchanged.
    pub fn poll<F>(&mut self, read: F) -> Result<Option<ControlStates>>
    where
        F: FnOnce(&mut [u8]) -> Result<usize>,
    {
        match self.state {
            PollState::ReleasePending => {
                self.state = PollState::WaitingForHardware;
                Ok(Some(ControlStates::released(KEY_COUNT)))
            },
            PollState::WaitingForHardware => {
                let len = read(&mut self.buf[..])?.min(PACKET_LENGTH);
                if len == 0 {
                    return Ok(None);
                }
                trace!(report = ?&self.buf[..len.min(16)], "input report");

                match decode_ack(&self.buf[..len]) {
                    Ok(key) => {
                        debug!(key, "key released, reporting press");
                        self.state = PollState::ReleasePending;
                        Ok(Some(ControlStates::pressed(KEY_COUNT, key)))
                    },
                    Err(e) => {
                        debug!("ignoring input report: {e}");
                        Ok(None)
                    },
                }
            },
        }
    }
}
