use ndarray::ArrayViewMutD;
use serde_json::Value;

use crate::model::PixelType;
use crate::runtime::ViewerSession;

use super::{
    Command, CommandDescriptor, CommandOutput, OpsError, ParamSpec, Result, get_optional_u64,
};

/// Inverts a plane in place. Integer types reflect through their value
/// range (`255 - v` for 8-bit); floating point planes reflect through their
/// own finite min/max.
pub fn invert_plane(mut plane: ArrayViewMutD<'_, f64>, pixel_type: PixelType) {
    let (low, high) = match pixel_type.value_range() {
        Some(range) => range,
        None => {
            let mut finite = plane.iter().copied().filter(|value| value.is_finite());
            let Some(first) = finite.next() else {
                return;
            };
            finite.fold((first, first), |(low, high), value| {
                (low.min(value), high.max(value))
            })
        }
    };
    let pivot = low + high;
    plane.par_mapv_inplace(|value| pivot - value);
}

#[derive(Debug, Clone, Copy)]
pub struct InvertCommand;

impl Command for InvertCommand {
    fn id(&self) -> &'static str {
        "edit.invert"
    }

    fn descriptor(&self) -> CommandDescriptor {
        CommandDescriptor {
            id: self.id().to_string(),
            label: "Invert".to_string(),
            description: "Invert every pixel of the slice an ROI is drawn on, or of the \
                          current slice."
                .to_string(),
            params: vec![ParamSpec::new(
                "roi_id",
                "ROI whose slice is inverted. Defaults to the current slice.",
                false,
                "integer",
            )],
        }
    }

    fn invoke(&self, session: &mut ViewerSession, params: &Value) -> Result<CommandOutput> {
        let z = match get_optional_u64(params, "roi_id")? {
            Some(roi_id) => {
                session
                    .editor()
                    .store()
                    .get(roi_id)
                    .ok_or(OpsError::UnknownRoi(roi_id))?
                    .position
                    .z
            }
            None => session.navigator().index(),
        };
        let index = session.plane_index(z);
        let buffer = session.buffer_mut().ok_or(OpsError::NoImage)?;
        let pixel_type = buffer.metadata.pixel_type;
        invert_plane(buffer.plane_mut(index)?, pixel_type);
        session.pixels_changed();
        log::info!("inverted slice {z} as {pixel_type:?}");
        Ok(CommandOutput::message(format!("Inverted slice {}", z + 1)))
    }
}
