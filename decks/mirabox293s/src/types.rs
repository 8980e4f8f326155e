//! Type definitions for the Mirabox Stream Dock 293S.

/// Reasons an input report could not be turned into a key event.
///
/// These never reach callers as errors, a report that fails to decode is
/// treated as "no update".
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    #[error("report too short ({0} bytes)")]
    ShortReport(usize),
    #[error("unexpected report header {0:02x?}")]
    BadMagic([u8; 8]),
    #[error("unknown device key id 0x{0:02x}")]
    UnknownKeyId(u8),
}

/// Key event poller state
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PollState {
    /// Next poll reads a report from the device
    #[default]
    WaitingForHardware,
    /// A press was reported, next poll reports the release without reading
    ReleasePending,
}
