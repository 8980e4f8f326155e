use std::error::Error;
use std::fs;
use std::io::Cursor;
use std::path::Path;

use deck_sync_core::{ImageEncoding, KeyImageFormat};
use image::{ImageFormat, ImageReader};
use tracing::{debug, warn};

fn image_format(encoding: ImageEncoding) -> ImageFormat {
    match encoding {
        ImageEncoding::Jpeg => ImageFormat::Jpeg,
    }
}

/// Check that an encoded image matches what the deck expects, returning its dimensions.
///
/// Images are never re-encoded, so the format must match exactly. A size
/// mismatch is only warned about since the firmware scales on its own.
pub fn probe_key_image(data: &[u8], format: &KeyImageFormat) -> Result<(u32, u32), String> {
    let reader = ImageReader::new(Cursor::new(data))
        .with_guessed_format()
        .map_err(|e| e.to_string())?;

    let expected = image_format(format.encoding);
    match reader.format() {
        Some(found) if found == expected => {},
        Some(found) => {
            return Err(format!(
                "key images must be pre-encoded {}, found {found:?}",
                format.encoding
            ))
        },
        None => return Err(format!("unrecognized image, expected {}", format.encoding)),
    }

    let (width, height) = reader.into_dimensions().map_err(|e| e.to_string())?;
    if (width, height) != (format.width, format.height) {
        warn!(
            width,
            height,
            expected_width = format.width,
            expected_height = format.height,
            "key image size does not match the deck"
        );
    }
    Ok((width, height))
}

/// Read a pre-encoded key image from disk
pub fn load_key_image(path: &Path, format: &KeyImageFormat) -> Result<Vec<u8>, Box<dyn Error>> {
    let data = fs::read(path).map_err(|e| format!("{}: {e}", path.display()))?;
    let (width, height) =
        probe_key_image(&data, format).map_err(|e| format!("{}: {e}", path.display()))?;
    debug!(path = %path.display(), width, height, len = data.len(), "loaded key image");
    Ok(data)
}
