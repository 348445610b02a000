use serde_json::{Value, json};

use crate::formats::RawImportParams;
use crate::runtime::ViewerSession;

use super::{
    Command, CommandDescriptor, CommandOutput, MeasurementTable, ParamSpec, Result,
    get_required_str, merge_fields,
};

#[derive(Debug, Clone, Copy)]
pub struct OpenImageCommand;

impl Command for OpenImageCommand {
    fn id(&self) -> &'static str {
        "file.open"
    }

    fn descriptor(&self) -> CommandDescriptor {
        CommandDescriptor {
            id: self.id().to_string(),
            label: "Open...".to_string(),
            description: "Open a PNG, JPEG or BMP image.".to_string(),
            params: vec![ParamSpec::new("path", "Image file to open.", true, "path")],
        }
    }

    fn invoke(&self, session: &mut ViewerSession, params: &Value) -> Result<CommandOutput> {
        let path = get_required_str(params, "path")?;
        session.open_image(path)?;
        Ok(CommandOutput::message(format!("Opened {path}")))
    }
}

/// Raw import. Parameters not given fall back to the ones used last.
#[derive(Debug, Clone, Copy)]
pub struct ImportRawCommand;

impl Command for ImportRawCommand {
    fn id(&self) -> &'static str {
        "file.import.raw"
    }

    fn descriptor(&self) -> CommandDescriptor {
        let mut params = vec![ParamSpec::new("path", "Raw file to import.", true, "path")];
        params.extend(
            [
                ("image_type", "Sample type label, e.g. \"16-bit Unsigned\".", "string"),
                ("width", "Image width in pixels.", "integer"),
                ("height", "Image height in pixels.", "integer"),
                ("offset", "Bytes to skip before the first image.", "integer"),
                ("num_images", "Number of images to read.", "integer"),
                ("gap", "Bytes between images.", "integer"),
                ("white_is_zero", "Invert unsigned samples.", "bool"),
                ("little_endian", "Little-endian byte order.", "bool"),
                ("open_all_files", "Stack every file with the same extension.", "bool"),
                ("use_virtual_stack", "Read slices on demand.", "bool"),
            ]
            .into_iter()
            .map(|(name, description, kind)| ParamSpec::new(name, description, false, kind)),
        );
        CommandDescriptor {
            id: self.id().to_string(),
            label: "Raw...".to_string(),
            description: "Import a headerless raw file with explicit geometry.".to_string(),
            params,
        }
    }

    fn invoke(&self, session: &mut ViewerSession, params: &Value) -> Result<CommandOutput> {
        let path = get_required_str(params, "path")?;
        let raw_params: RawImportParams = merge_fields(session.raw_params(), params, &["path"])?;
        let report = session.import_raw(path, raw_params)?;

        let mut table = MeasurementTable::default();
        table.values.insert("files".to_string(), json!(report.files));
        table
            .values
            .insert("expected_bytes".to_string(), json!(report.expected_bytes));
        table
            .values
            .insert("padded_bytes".to_string(), json!(report.padded_bytes));
        table
            .values
            .insert("truncated_bytes".to_string(), json!(report.truncated_bytes));
        table
            .values
            .insert("warnings".to_string(), json!(report.warnings));
        let shape = session
            .buffer()
            .map(|buffer| buffer.shape().to_vec())
            .unwrap_or_default();
        table.values.insert("shape".to_string(), json!(shape));
        Ok(CommandOutput::with_measurements(
            format!("Imported {path}"),
            table,
        ))
    }
}
