use ndarray::{Array, IxDyn};
use rayon::prelude::*;
use serde_json::Value;

use crate::runtime::ViewerSession;

use super::{Command, CommandDescriptor, CommandOutput, OpsError, Result};

const BOX_KERNEL: [f64; 3] = [1.0 / 3.0; 3];

/// 3x3 mean filter over the `[Y, X]` axes of a plane, with edge samples
/// repeated. Channels are filtered independently. Integer data is rounded.
pub fn smooth_plane(plane: &mut ndarray::ArrayViewMutD<'_, f64>, round: bool) -> Result<()> {
    let shape = plane.shape().to_vec();
    if shape.len() < 2 {
        return Err(OpsError::UnsupportedLayout(format!(
            "expected a [Y, X] plane, found {shape:?}"
        )));
    }
    let strides = row_major_strides(&shape);
    let mut current = plane.iter().copied().collect::<Vec<_>>();
    for axis in [0, 1] {
        if shape[axis] > 1 {
            current = blur_axis(&current, &shape, &strides, axis);
        }
    }
    if round {
        current.par_iter_mut().for_each(|value| *value = value.round());
    }
    let smoothed = Array::from_shape_vec(IxDyn(&shape), current)
        .map_err(|error| OpsError::UnsupportedLayout(error.to_string()))?;
    plane.assign(&smoothed);
    Ok(())
}

fn blur_axis(input: &[f64], shape: &[usize], strides: &[usize], axis: usize) -> Vec<f64> {
    let axis_len = shape[axis];
    let axis_stride = strides[axis];
    let lane_count = input.len() / axis_len;
    let radius = (BOX_KERNEL.len() / 2) as isize;
    let lane_bases = (0..lane_count)
        .map(|lane| lane_base_offset(lane, axis, shape, strides))
        .collect::<Vec<_>>();

    let lane_results = lane_bases
        .par_iter()
        .map(|base| {
            let mut lane_output = vec![0.0_f64; axis_len];
            for (coord, output) in lane_output.iter_mut().enumerate() {
                let mut sum = 0.0_f64;
                for (kernel_index, weight) in BOX_KERNEL.iter().enumerate() {
                    let candidate = coord as isize + kernel_index as isize - radius;
                    let clamped = candidate.clamp(0, axis_len as isize - 1) as usize;
                    sum += input[*base + clamped * axis_stride] * *weight;
                }
                *output = sum;
            }
            lane_output
        })
        .collect::<Vec<_>>();

    let mut output = vec![0.0_f64; input.len()];
    for (base, lane_output) in lane_bases.iter().zip(lane_results) {
        for (coord, value) in lane_output.into_iter().enumerate() {
            output[base + coord * axis_stride] = value;
        }
    }
    output
}

fn lane_base_offset(lane_index: usize, axis: usize, shape: &[usize], strides: &[usize]) -> usize {
    let mut remainder = lane_index;
    let mut base = 0usize;
    for dimension in (0..shape.len()).filter(|dimension| *dimension != axis) {
        let size = shape[dimension];
        base += (remainder % size) * strides[dimension];
        remainder /= size;
    }
    base
}

fn row_major_strides(shape: &[usize]) -> Vec<usize> {
    let mut strides = vec![1usize; shape.len()];
    for index in (0..shape.len().saturating_sub(1)).rev() {
        strides[index] = strides[index + 1] * shape[index + 1];
    }
    strides
}

#[derive(Debug, Clone, Copy)]
pub struct SmoothCommand;

impl Command for SmoothCommand {
    fn id(&self) -> &'static str {
        "process.smooth"
    }

    fn descriptor(&self) -> CommandDescriptor {
        CommandDescriptor {
            id: self.id().to_string(),
            label: "Smooth".to_string(),
            description: "Replace each pixel of the current slice with its 3x3 mean."
                .to_string(),
            params: vec![],
        }
    }

    fn invoke(&self, session: &mut ViewerSession, _params: &Value) -> Result<CommandOutput> {
        let z = session.navigator().index();
        let index = session.plane_index(z);
        let buffer = session.buffer_mut().ok_or(OpsError::NoImage)?;
        let round = buffer.metadata.pixel_type.value_range().is_some();
        let mut plane = buffer.plane_mut(index)?;
        smooth_plane(&mut plane, round)?;
        session.pixels_changed();
        Ok(CommandOutput::message(format!("Smoothed slice {}", z + 1)))
    }
}
