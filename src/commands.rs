mod error;
mod import;
mod intensity;
mod measurements;
mod menu;
mod params;
mod registry;
mod roi;
mod schema;
mod smooth;
mod stacks;

#[cfg(test)]
mod tests;

pub use error::{OpsError, Result};
pub use import::{ImportRawCommand, OpenImageCommand};
pub use intensity::{InvertCommand, invert_plane};
pub use measurements::{MeasureCommand, PixelBounds, RegionStats, measure_region, region_bounds};
pub use menu::{MENU_MANIFEST, MenuItem, MenuNode, menu_tree};
pub use registry::{default_registry, find_command, invoke_command, list_commands};
pub use roi::{DeleteRoiCommand, RoiPropertiesCommand};
pub use schema::{Command, CommandDescriptor, CommandOutput, MeasurementTable, ParamSpec};
pub use smooth::{SmoothCommand, smooth_plane};
pub use stacks::{NextSliceCommand, OrthogonalViewsCommand, PreviousSliceCommand};

pub(crate) use params::{
    get_optional_u64, get_optional_usize, get_required_str, merge_fields, target_roi_id,
};
