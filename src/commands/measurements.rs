use ndarray::{Array2, s};
use serde::Serialize;
use serde_json::{Value, json};

use crate::runtime::ViewerSession;
use crate::ui::interaction::ShapeGeometry;

use super::{
    Command, CommandDescriptor, CommandOutput, MeasurementTable, OpsError, ParamSpec, Result,
    target_roi_id,
};

/// Pixel rectangle `[x0, x1) x [y0, y1)` in plane coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PixelBounds {
    pub x0: usize,
    pub y0: usize,
    pub x1: usize,
    pub y1: usize,
}

impl PixelBounds {
    pub fn width(&self) -> usize {
        self.x1 - self.x0
    }

    pub fn height(&self) -> usize {
        self.y1 - self.y0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegionStats {
    /// Pixels in the clipped bounding box.
    pub area: usize,
    pub mean: f64,
    pub min: f64,
    pub max: f64,
    pub bounds: PixelBounds,
    /// Mean of each column of the region, left to right.
    pub column_profile: Vec<f64>,
}

/// Clips the bounding box of `geometry` to a `height x width` plane using
/// `[floor(min), floor(max))` on both axes.
pub fn region_bounds(
    geometry: &ShapeGeometry,
    height: usize,
    width: usize,
) -> Option<PixelBounds> {
    let bounds = geometry.bounds()?;
    let clip = |value: f64, limit: usize| (value.floor().max(0.0) as usize).min(limit);
    let region = PixelBounds {
        x0: clip(bounds.min.x, width),
        y0: clip(bounds.min.y, height),
        x1: clip(bounds.max.x, width),
        y1: clip(bounds.max.y, height),
    };
    (region.x0 < region.x1 && region.y0 < region.y1).then_some(region)
}

/// Statistics over the bounding box of `geometry`. Polygons and ellipses are
/// measured over their bounding box too. Non-finite samples are skipped.
pub fn measure_region(geometry: &ShapeGeometry, plane: &Array2<f64>) -> Result<RegionStats> {
    let (height, width) = plane.dim();
    let bounds = region_bounds(geometry, height, width).ok_or(OpsError::EmptyRegion)?;
    let region = plane.slice(s![bounds.y0..bounds.y1, bounds.x0..bounds.x1]);

    let mut count = 0usize;
    let mut sum = 0.0_f64;
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    for value in region.iter().copied().filter(|value| value.is_finite()) {
        count += 1;
        sum += value;
        min = min.min(value);
        max = max.max(value);
    }
    if count == 0 {
        return Err(OpsError::EmptyRegion);
    }

    let column_profile = region
        .columns()
        .into_iter()
        .map(|column| {
            let (total, n) = column
                .iter()
                .filter(|value| value.is_finite())
                .fold((0.0, 0usize), |(total, n), value| (total + value, n + 1));
            if n == 0 { f64::NAN } else { total / n as f64 }
        })
        .collect();

    Ok(RegionStats {
        area: bounds.width() * bounds.height(),
        mean: sum / count as f64,
        min,
        max,
        bounds,
        column_profile,
    })
}

#[derive(Debug, Clone, Copy)]
pub struct MeasureCommand;

impl Command for MeasureCommand {
    fn id(&self) -> &'static str {
        "analyze.measure"
    }

    fn descriptor(&self) -> CommandDescriptor {
        CommandDescriptor {
            id: self.id().to_string(),
            label: "Measure".to_string(),
            description: "Area, mean, min and max over the bounding box of an ROI.".to_string(),
            params: vec![ParamSpec::new(
                "roi_id",
                "ROI to measure. Defaults to the selected ROI.",
                false,
                "integer",
            )],
        }
    }

    fn invoke(&self, session: &mut ViewerSession, params: &Value) -> Result<CommandOutput> {
        let roi_id = target_roi_id(session, params)?;
        let roi = session
            .editor()
            .store()
            .get(roi_id)
            .cloned()
            .ok_or(OpsError::UnknownRoi(roi_id))?;
        let plane = session.gray_plane_at(roi.position.z)?;
        let stats = measure_region(&roi.geometry, &plane)?;

        let mut table = MeasurementTable::default();
        table.values.insert("roi_id".to_string(), json!(roi_id));
        table.values.insert("slice".to_string(), json!(roi.position.z));
        table.values.insert("area".to_string(), json!(stats.area));
        table.values.insert("mean".to_string(), json!(stats.mean));
        table.values.insert("min".to_string(), json!(stats.min));
        table.values.insert("max".to_string(), json!(stats.max));
        table.values.insert("bounds".to_string(), json!(stats.bounds));
        table
            .values
            .insert("column_profile".to_string(), json!(stats.column_profile));
        session.record_measurement(table.clone());

        Ok(CommandOutput::with_measurements(
            format!(
                "Area: {}, Mean: {:.3}, Min: {}, Max: {}",
                stats.area, stats.mean, stats.min, stats.max
            ),
            table,
        ))
    }
}
