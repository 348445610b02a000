use std::time::Instant;

use crate::commands::{CommandOutput, OpsError};
use crate::runtime::ViewerSession;

use super::{PipelineError, ReplayReport, ReplayScript, Result, ScriptStep, StepReport};

/// Replays `script` against `session`. Failing commands are recorded in their
/// step report and replay continues unless the script asks to stop.
pub fn run_script(script: &ReplayScript, session: &mut ViewerSession) -> Result<ReplayReport> {
    script.validate()?;

    let mut steps = Vec::with_capacity(script.steps.len());
    for (index, step) in script.steps.iter().enumerate() {
        let started = Instant::now();
        let mut report = StepReport {
            index,
            step: step.label(),
            duration_ms: 0,
            outcomes: Vec::new(),
            message: None,
            error: None,
        };

        match step {
            ScriptStep::SetTool { kind } => session.set_tool(*kind),
            ScriptStep::SetSlice { index: slice } => {
                let shown = session
                    .set_slice(*slice)
                    .map_err(|source| PipelineError::Slice { index, source })?;
                report.message = Some(format!("slice {shown}"));
            }
            ScriptStep::Command { id, params } => {
                let result = session.run_command(id, params);
                record(&mut report, result, index, script.stop_on_error)?;
            }
            ScriptStep::ContextAction { roi_id, action } => {
                let result = session.run_context_action(*roi_id, *action);
                record(&mut report, result, index, script.stop_on_error)?;
            }
            view @ (ScriptStep::Canvas { .. }
            | ScriptStep::Zoom { .. }
            | ScriptStep::ZoomActual
            | ScriptStep::Pan { .. }
            | ScriptStep::Wheel { .. }) => {
                view.apply_to_view(session.view_mut());
                let view = session.view();
                report.message = Some(format!(
                    "magnification {} at ({:.1}, {:.1})",
                    view.magnification, view.src_rect.x, view.src_rect.y
                ));
            }
            pointer => {
                for event in pointer.canvas_events() {
                    report.outcomes.push(session.handle_event(&event));
                }
            }
        }

        report.duration_ms = started.elapsed().as_millis();
        log::debug!("replayed step {index} ({}) in {} ms", report.step, report.duration_ms);
        steps.push(report);
    }

    Ok(ReplayReport {
        script_name: script.name.clone(),
        steps,
        rois: session.editor().store().overlay_rois.clone(),
        measurements: session.results().to_vec(),
        status: session.status().to_vec(),
    })
}

fn record(
    report: &mut StepReport,
    result: std::result::Result<CommandOutput, OpsError>,
    index: usize,
    stop_on_error: bool,
) -> Result<()> {
    match result {
        Ok(output) => report.message = Some(output.message),
        Err(source) if stop_on_error => return Err(PipelineError::Command { index, source }),
        Err(error) => report.error = Some(error.to_string()),
    }
    Ok(())
}
