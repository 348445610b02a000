use std::path::Path;

use image::DynamicImage;
use ndarray::{Array, IxDyn};

use crate::model::{PixelBuffer, PixelType};

use super::util::{extension, metadata_for_shape};
use super::{IoError, Result};

const RASTER_EXTENSIONS: [&str; 4] = ["png", "jpg", "jpeg", "bmp"];

/// Opens a common raster file. Samples keep their native integer values;
/// gray images become `[Y, X]`, everything else `[Y, X, 3]` RGB.
pub fn read_image(path: impl AsRef<Path>) -> Result<PixelBuffer> {
    let path = path.as_ref();
    let ext = extension(path)?;
    if !RASTER_EXTENSIONS.contains(&ext.as_str()) {
        return Err(IoError::UnsupportedFormat(ext));
    }

    let image = image::open(path)?;
    let (shape, values, pixel_type) = match image {
        DynamicImage::ImageLuma8(buffer) => {
            let (width, height) = buffer.dimensions();
            let values = buffer.pixels().map(|pixel| f64::from(pixel.0[0])).collect();
            (vec![height as usize, width as usize], values, PixelType::U8)
        }
        DynamicImage::ImageLuma16(buffer) => {
            let (width, height) = buffer.dimensions();
            let values = buffer.pixels().map(|pixel| f64::from(pixel.0[0])).collect();
            (vec![height as usize, width as usize], values, PixelType::U16)
        }
        other => {
            let rgb = other.to_rgb8();
            let (width, height) = rgb.dimensions();
            let values = rgb
                .pixels()
                .flat_map(|pixel| pixel.0.map(f64::from))
                .collect::<Vec<_>>();
            (
                vec![height as usize, width as usize, 3],
                values,
                PixelType::Rgb24,
            )
        }
    };

    let data = Array::from_shape_vec(IxDyn(&shape), values)
        .map_err(|error| IoError::UnsupportedLayout(error.to_string()))?;
    let buffer = PixelBuffer::new(data, metadata_for_shape(path, &shape, pixel_type))?;
    log::info!("opened {} as {:?}", path.display(), buffer.shape());
    Ok(buffer)
}
