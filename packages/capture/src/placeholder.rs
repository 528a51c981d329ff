//! Flat placeholder images for failed or skipped captures.

use std::path::Path;

use crate::CaptureError;

/// Placeholder background, a light neutral gray.
const BG: image::Rgb<u8> = image::Rgb([0xE0, 0xE0, 0xE0]);

/// Writes a flat placeholder PNG at `path`, creating parent
/// directories. An existing file is left untouched.
///
/// # Errors
///
/// Returns [`CaptureError::Io`] when the directory or file cannot be
/// written.
pub fn ensure_placeholder(path: &Path, width: u32, height: u32) -> Result<(), CaptureError> {
    if path.exists() {
        return Ok(());
    }

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let img = image::RgbImage::from_pixel(width.max(1), height.max(1), BG);
    img.save(path).map_err(|e| CaptureError::Interaction {
        message: format!("placeholder encode failed: {e}"),
    })?;
    Ok(())
}
