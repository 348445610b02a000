use serde_json::{Value, json};

use crate::runtime::ViewerSession;
use crate::ui::stack::{OrthoPlane, OrthoViews};

use super::{
    Command, CommandDescriptor, CommandOutput, MeasurementTable, OpsError, ParamSpec, Result,
    get_optional_usize,
};

#[derive(Debug, Clone, Copy)]
pub struct NextSliceCommand;

impl Command for NextSliceCommand {
    fn id(&self) -> &'static str {
        "image.stacks.next"
    }

    fn descriptor(&self) -> CommandDescriptor {
        CommandDescriptor {
            id: self.id().to_string(),
            label: "Next Slice".to_string(),
            description: "Show the next slice, wrapping to the first.".to_string(),
            params: vec![],
        }
    }

    fn invoke(&self, session: &mut ViewerSession, _params: &Value) -> Result<CommandOutput> {
        let index = session.step_slice(true)?;
        Ok(CommandOutput::message(format!(
            "Slice {}/{}",
            index + 1,
            session.navigator().depth()
        )))
    }
}

#[derive(Debug, Clone, Copy)]
pub struct PreviousSliceCommand;

impl Command for PreviousSliceCommand {
    fn id(&self) -> &'static str {
        "image.stacks.previous"
    }

    fn descriptor(&self) -> CommandDescriptor {
        CommandDescriptor {
            id: self.id().to_string(),
            label: "Previous Slice".to_string(),
            description: "Show the previous slice, wrapping to the last.".to_string(),
            params: vec![],
        }
    }

    fn invoke(&self, session: &mut ViewerSession, _params: &Value) -> Result<CommandOutput> {
        let index = session.step_slice(false)?;
        Ok(CommandOutput::message(format!(
            "Slice {}/{}",
            index + 1,
            session.navigator().depth()
        )))
    }
}

/// Opens orthogonal views of the current stack, or moves their cursor when
/// `plane`, `row` and `col` are given.
#[derive(Debug, Clone, Copy)]
pub struct OrthogonalViewsCommand;

impl Command for OrthogonalViewsCommand {
    fn id(&self) -> &'static str {
        "image.stacks.orthogonal_views"
    }

    fn descriptor(&self) -> CommandDescriptor {
        CommandDescriptor {
            id: self.id().to_string(),
            label: "Orthogonal Views".to_string(),
            description: "XY, XZ and YZ cross-sections through a cursor.".to_string(),
            params: vec![
                ParamSpec::new("plane", "Clicked plane: xy, xz or yz.", false, "string"),
                ParamSpec::new("row", "Clicked row in that plane.", false, "integer"),
                ParamSpec::new("col", "Clicked column in that plane.", false, "integer"),
            ],
        }
    }

    fn invoke(&self, session: &mut ViewerSession, params: &Value) -> Result<CommandOutput> {
        let click = match params.get("plane") {
            Some(plane) => Some(
                serde_json::from_value::<OrthoPlane>(plane.clone())
                    .map_err(|error| OpsError::InvalidParams(error.to_string()))?,
            ),
            None => None,
        };

        let mut refreshed = Vec::new();
        if session.ortho().is_none() || click.is_none() {
            let views = match session.virtual_stack() {
                Some(stack) => OrthoViews::from_source(stack)?,
                None => OrthoViews::from_source(session.buffer().ok_or(OpsError::NoImage)?)?,
            };
            session.set_ortho(views);
            refreshed.extend(OrthoPlane::ALL);
        }
        if let (Some(plane), Some(views)) = (click, session.ortho_mut()) {
            let row = get_optional_usize(params, "row", 0);
            let col = get_optional_usize(params, "col", 0);
            refreshed = views.click(plane, row, col);
        }

        let views = session.ortho().ok_or(OpsError::NoImage)?;
        let cursor = views.cursor();
        let mut table = MeasurementTable::default();
        table.values.insert("cursor".to_string(), json!(cursor));
        table.values.insert("dims".to_string(), json!(views.dims()));
        table.values.insert("refreshed".to_string(), json!(refreshed));
        Ok(CommandOutput::with_measurements(
            format!("Orthogonal views at x={}, y={}, z={}", cursor.x, cursor.y, cursor.z),
            table,
        ))
    }
}
