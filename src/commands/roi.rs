use serde_json::{Value, json};

use crate::runtime::ViewerSession;
use crate::ui::interaction::RoiProperties;

use super::{
    Command, CommandDescriptor, CommandOutput, MeasurementTable, OpsError, ParamSpec, Result,
    merge_fields, target_roi_id,
};

/// Reads the properties of an ROI and applies any fields given alongside
/// `roi_id`.
#[derive(Debug, Clone, Copy)]
pub struct RoiPropertiesCommand;

impl Command for RoiPropertiesCommand {
    fn id(&self) -> &'static str {
        "roi.properties"
    }

    fn descriptor(&self) -> CommandDescriptor {
        let mut params = vec![ParamSpec::new(
            "roi_id",
            "ROI to edit. Defaults to the selected ROI.",
            false,
            "integer",
        )];
        params.extend(
            [
                ("name", "string"),
                ("position", "string"),
                ("group", "string"),
                ("stroke_color", "string"),
                ("stroke_width", "float"),
                ("fill_color", "string"),
                ("list_coordinates", "bool"),
            ]
            .into_iter()
            .map(|(name, kind)| ParamSpec::new(name, "New value.", false, kind)),
        );
        CommandDescriptor {
            id: self.id().to_string(),
            label: "Properties...".to_string(),
            description: "Show or edit name, group and stroke/fill of an ROI.".to_string(),
            params,
        }
    }

    fn invoke(&self, session: &mut ViewerSession, params: &Value) -> Result<CommandOutput> {
        let roi_id = target_roi_id(session, params)?;
        let roi = session
            .editor_mut()
            .store_mut()
            .get_mut(roi_id)
            .ok_or(OpsError::UnknownRoi(roi_id))?;
        let updated: RoiProperties = merge_fields(&roi.properties, params, &["roi_id"])?;
        roi.properties = updated;

        let mut table = MeasurementTable::default();
        table.values.insert("roi_id".to_string(), json!(roi_id));
        table
            .values
            .insert("kind".to_string(), json!(roi.geometry.kind()));
        table
            .values
            .insert("properties".to_string(), json!(roi.properties));
        if roi.properties.list_coordinates {
            let coordinates = roi
                .geometry
                .points()
                .iter()
                .map(|point| [point.x, point.y])
                .collect::<Vec<_>>();
            table
                .values
                .insert("coordinates".to_string(), json!(coordinates));
        }
        Ok(CommandOutput::with_measurements(
            format!("Properties of ROI {roi_id}"),
            table,
        ))
    }
}

#[derive(Debug, Clone, Copy)]
pub struct DeleteRoiCommand;

impl Command for DeleteRoiCommand {
    fn id(&self) -> &'static str {
        "roi.delete"
    }

    fn descriptor(&self) -> CommandDescriptor {
        CommandDescriptor {
            id: self.id().to_string(),
            label: "Delete".to_string(),
            description: "Remove an ROI.".to_string(),
            params: vec![ParamSpec::new(
                "roi_id",
                "ROI to delete. Defaults to the selected ROI.",
                false,
                "integer",
            )],
        }
    }

    fn invoke(&self, session: &mut ViewerSession, params: &Value) -> Result<CommandOutput> {
        let roi_id = target_roi_id(session, params)?;
        session
            .editor_mut()
            .delete(roi_id)
            .ok_or(OpsError::UnknownRoi(roi_id))?;
        Ok(CommandOutput::message(format!("Deleted ROI {roi_id}")))
    }
}
