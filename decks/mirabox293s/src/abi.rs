//! Command payloads and report framing for the 293S.
//!
//! Every command is `CRT\0\0` followed by an ASCII subcommand and its
//! arguments. Multi-byte integers are big-endian. Payloads are wrapped into
//! fixed size reports with [`frame`] before they are written.

use crate::consts::{FRAME_LENGTH, PACKET_LENGTH};

/// Prefix shared by every command
pub const PREFIX: &[u8] = b"CRT\0\0";

/// `clear` target that wipes every key
pub const CLEAR_ALL: u8 = 0xff;

pub trait Arg {
    const SIZE: usize;
    fn to_bytes(&self) -> Vec<u8>;
}

impl Arg for u8 {
    const SIZE: usize = 1;
    fn to_bytes(&self) -> Vec<u8> {
        vec![*self]
    }
}

impl Arg for u16 {
    const SIZE: usize = 2;
    fn to_bytes(&self) -> Vec<u8> {
        self.to_be_bytes().to_vec()
    }
}

macro_rules! impl_command_abi {
    [$(
        $( #[doc = $( $doc:tt )* ] )*
        fn $name:ident (
            $([ $( $hardcode:expr ),* ]$(,)?)?
            $( $arg:ident: $type:tt ),*
            $(; [ $( $trailer:expr ),* ])?
        );
    )+] => {
        $(
            $(#[doc = concat!("Construct a payload for ", $($doc)*)])*
            pub fn $name( $( $arg: $type ),* ) -> Vec<u8> {
                let len = PREFIX.len()
                    $($( + $hardcode.len() )*)?
                    $( + $type::SIZE )*
                    $($( + $trailer.len() )*)?;
                let mut buf = Vec::with_capacity(len);
                buf.extend_from_slice(PREFIX);
                $($(
                    buf.extend_from_slice($hardcode);
                )*)?
                $(
                    buf.extend_from_slice(&$arg.to_bytes());
                )*
                $($(
                    buf.extend_from_slice($trailer);
                )*)?
                buf
            }
        )*
    };
}

impl_command_abi![
    /* SESSION */

    /// dropping the host session
    fn disconnect([b"DIS"]);

    /// opening the host session, also used as a ping
    fn connect([b"CONNECT"]);

    /* DISPLAY */

    /// clearing a key image by device key id, or every key with `CLEAR_ALL`
    fn clear([b"CLE", b"\0\0\0"], target: u8);

    /// setting the backlight percent
    fn set_brightness([b"LIG", b"\0\0"], percent: u8; [b"\0"]);

    /* IMAGE BATCH */

    /// announcing an image upload of `size` bytes to a device key id
    fn start_batch([b"BAT", b"\0\0"], size: u16, key_id: u8);

    /// committing the uploaded pages
    fn stop_batch([b"STP"]);
];

/// Wrap a payload into a fixed size output report.
///
/// The buffer is zero filled, byte 0 holds the report id and the payload is
/// copied starting at byte 1. Anything past `PACKET_LENGTH` bytes is cut off.
pub(crate) fn frame(report_id: u8, payload: &[u8]) -> [u8; FRAME_LENGTH] {
    debug_assert!(payload.len() <= PACKET_LENGTH, "payload exceeds packet length");
    let len = payload.len().min(PACKET_LENGTH);
    let mut buf = [0u8; FRAME_LENGTH];
    buf[0] = report_id;
    buf[1..1 + len].copy_from_slice(&payload[..len]);
    buf
}
