//! Translation between logical key indices and device key ids.
//!
//! Logical indices are row-major from the top left key. The device numbers its
//! keys column by column from the top right key, starting at 1.

use deck_sync_core::{DeckError, Result};

use crate::consts::KEY_COUNT;
use crate::types::DecodeError;

/// Device key id for each logical key index
pub const KEY_TO_DEVICE_ID: [u8; KEY_COUNT] = [
    0x0d, 0x0a, 0x07, 0x04, 0x01, //
    0x0e, 0x0b, 0x08, 0x05, 0x02, //
    0x0f, 0x0c, 0x09, 0x06, 0x03, //
];

/// Device key id for a logical key index
pub fn to_device_id(key: usize) -> Result<u8> {
    KEY_TO_DEVICE_ID
        .get(key)
        .copied()
        .ok_or(DeckError::InvalidKey {
            key,
            count: KEY_COUNT,
        })
}

/// Logical key index for a device key id
pub fn to_key_index(device_id: u8) -> std::result::Result<usize, DecodeError> {
    KEY_TO_DEVICE_ID
        .iter()
        .position(|&id| id == device_id)
        .ok_or(DecodeError::UnknownKeyId(device_id))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mapping_is_a_bijection() {
        for key in 0..KEY_COUNT {
            let id = to_device_id(key).unwrap();
            assert_eq!(to_key_index(id), Ok(key), "key {key} did not map back");
        }

        let mut ids = KEY_TO_DEVICE_ID.to_vec();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), KEY_COUNT, "device ids must be unique");
    }

    #[test]
    fn corners() {
        assert_eq!(to_device_id(0).unwrap(), 0x0d);
        assert_eq!(to_device_id(4).unwrap(), 0x01);
        assert_eq!(to_device_id(14).unwrap(), 0x03);
    }

    #[test]
    fn out_of_range_key() {
        assert!(matches!(
            to_device_id(KEY_COUNT),
            Err(DeckError::InvalidKey { key: 15, count: 15 })
        ));
    }

    #[test]
    fn unknown_device_ids() {
        assert_eq!(to_key_index(0x00), Err(DecodeError::UnknownKeyId(0x00)));
        // side display ids are not keys
        assert_eq!(to_key_index(0x10), Err(DecodeError::UnknownKeyId(0x10)));
        assert_eq!(to_key_index(0xff), Err(DecodeError::UnknownKeyId(0xff)));
    }
}
