use std::path::Path;

use image::{ImageBuffer, Luma};
use ndarray::Array2;

use super::util::{extension, to_u8_samples};
use super::{IoError, Result};

/// Writes a single plane as an 8-bit grayscale PNG. `range` fixes the value
/// mapped to black and white; the plane's own range is used otherwise.
pub fn save_plane_png(
    path: impl AsRef<Path>,
    plane: &Array2<f64>,
    range: Option<(f64, f64)>,
) -> Result<()> {
    let path = path.as_ref();
    let ext = extension(path)?;
    if ext != "png" {
        return Err(IoError::UnsupportedFormat(ext));
    }
    let (height, width) = plane.dim();
    let values = plane.iter().copied().collect::<Vec<_>>();
    let bytes = to_u8_samples(&values, range);
    let image = ImageBuffer::<Luma<u8>, _>::from_vec(width as u32, height as u32, bytes)
        .ok_or_else(|| IoError::UnsupportedLayout("failed to construct gray image".into()))?;
    image.save(path)?;
    log::info!("wrote {}x{} plane to {}", width, height, path.display());
    Ok(())
}
