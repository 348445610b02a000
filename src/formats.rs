mod background;
mod error;
mod params;
mod png;
mod raster;
mod raw;
mod stack;
mod util;

#[cfg(test)]
mod tests;

pub use background::{LoadHandle, spawn_raw_load};
pub use error::{IoError, Result};
pub use params::{RawImportForm, RawImportParams, RawSampleType, load_params, save_params};
pub use png::save_plane_png;
pub use raster::read_image;
pub use raw::{RawLoad, RawLoadReport, read_raw};
pub use stack::RawStack;
