//! Utility functions shared by deck drivers.

/// Extract a printable string from a fixed size report.
///
/// Reads up to the first NUL, replaces non-ASCII bytes and trims whitespace.
pub fn extract_string(data: &[u8]) -> String {
    let end = data.iter().position(|&b| b == 0).unwrap_or(data.len());
    data[..end]
        .iter()
        .map(|&b| if b.is_ascii() { b as char } else { char::REPLACEMENT_CHARACTER })
        .collect::<String>()
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stops_at_nul() {
        assert_eq!(extract_string(b"V1.0.2\0\0garbage"), "V1.0.2");
    }

    #[test]
    fn trims_and_replaces() {
        assert_eq!(extract_string(b"  ab\xffc \0"), "ab\u{fffd}c");
        assert_eq!(extract_string(&[0u8; 16]), "");
        assert_eq!(extract_string(b"no terminator"), "no terminator");
    }
}
