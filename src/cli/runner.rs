use std::path::Path;

use clap::Parser;
use serde::Serialize;
use serde_json::json;

use crate::formats::{RawImportParams, RawSampleType};
use crate::runtime::{AppContext, SessionConfig, ViewerSession, load_config};
use crate::ui::interaction::{CanvasButton, CanvasEvent, EditOutcome, Point, ShapeKind};

use super::types::{BufferInfo, Cli, Commands, CommandsCommand, InputArgs, ParamsCommand};

fn print_json<T: Serialize>(value: &T) -> Result<(), String> {
    println!(
        "{}",
        serde_json::to_string_pretty(value).map_err(|error| error.to_string())?
    );
    Ok(())
}

fn open_input(
    app: &AppContext,
    session: &mut ViewerSession,
    input: &Path,
    raw_params: Option<&Path>,
) -> Result<(), String> {
    match raw_params {
        Some(params_path) => {
            let params = app
                .io_service()
                .load_params(params_path)
                .map_err(|error| error.to_string())?;
            session
                .import_raw(input, params)
                .map_err(|error| error.to_string())?;
        }
        None => session
            .open_image(input)
            .map_err(|error| error.to_string())?,
    }
    Ok(())
}

fn session_for(
    app: &AppContext,
    config: &SessionConfig,
    input: &InputArgs,
) -> Result<ViewerSession, String> {
    let mut session = app.new_session(config.clone());
    open_input(app, &mut session, &input.input, input.raw_params.as_deref())?;
    Ok(session)
}

pub fn run_cli() -> Result<(), String> {
    let cli = Cli::parse();
    let app = AppContext::new();
    let config = match &cli.config {
        Some(path) => load_config(path).map_err(|error| error.to_string())?,
        None => SessionConfig::default(),
    };

    match cli.command {
        Commands::Info { input } => {
            let session = session_for(&app, &config, &input)?;
            let buffer = session
                .buffer()
                .ok_or_else(|| "no image was loaded".to_string())?;
            let range = buffer.min_max();
            let info = BufferInfo {
                shape: buffer.shape().to_vec(),
                pixel_type: format!("{:?}", buffer.metadata.pixel_type),
                axes: buffer
                    .metadata
                    .dims
                    .iter()
                    .map(|dimension| format!("{:?}", dimension.axis))
                    .collect(),
                slices: session.navigator().depth(),
                virtual_stack: session.virtual_stack().is_some(),
                source: buffer
                    .metadata
                    .source
                    .as_ref()
                    .map(|path| path.display().to_string()),
                min: range.map(|(min, _)| min),
                max: range.map(|(_, max)| max),
            };
            print_json(&info)?;
        }
        Commands::Measure { input, rect, slice } => {
            let mut session = session_for(&app, &config, &input)?;
            let &[x0, y0, x1, y1] = rect.as_slice() else {
                return Err("--rect takes x0,y0,x1,y1".to_string());
            };
            session
                .set_slice(slice)
                .map_err(|error| error.to_string())?;
            session.set_tool(ShapeKind::Rectangle);
            let view = session.view().clone();
            let to_screen = |x, y| view.image_to_screen(Point::new(x, y));
            let (start, end) = (to_screen(x0, y0), to_screen(x1, y1));
            session.handle_event(&CanvasEvent::press(CanvasButton::Primary, start.x, start.y));
            session.handle_event(&CanvasEvent::moved(end.x, end.y));
            let outcome =
                session.handle_event(&CanvasEvent::release(CanvasButton::Primary, end.x, end.y));
            let EditOutcome::Finalized { roi_id } = outcome else {
                return Err("rectangle is too small to measure".to_string());
            };
            let output = app
                .command_service()
                .run(&mut session, "analyze.measure", &json!({ "roi_id": roi_id }))
                .map_err(|error| error.to_string())?;
            print_json(&output)?;
        }
        Commands::Export {
            input,
            output,
            slice,
        } => {
            let mut session = session_for(&app, &config, &input)?;
            let shown = session
                .set_slice(slice)
                .map_err(|error| error.to_string())?;
            let buffer = session
                .buffer()
                .ok_or_else(|| "no image was loaded".to_string())?;
            app.io_service()
                .export_plane(&output, buffer, session.plane_index(shown))
                .map_err(|error| error.to_string())?;
            print_json(&json!({"status": "ok", "output": output, "slice": shown}))?;
        }
        Commands::Replay {
            script,
            input,
            raw_params,
            report,
        } => {
            let replay = app
                .workflow_service()
                .load_script(&script)
                .map_err(|error| error.to_string())?;
            let mut session = app.new_session(config.clone());
            if let Some(input) = input {
                open_input(&app, &mut session, &input, raw_params.as_deref())?;
            }
            let run_report = app
                .workflow_service()
                .run(&replay, &mut session)
                .map_err(|error| error.to_string())?;
            if let Some(report_path) = report {
                app.workflow_service()
                    .save_report(report_path, &run_report)
                    .map_err(|error| error.to_string())?;
            }
            print_json(&run_report)?;
        }
        Commands::Params { command } => match command {
            ParamsCommand::Init {
                output,
                width,
                height,
                image_type,
            } => {
                let defaults = RawImportParams::default();
                let params = RawImportParams {
                    width: width.unwrap_or(defaults.width),
                    height: height.unwrap_or(defaults.height),
                    image_type: match image_type {
                        Some(label) => label
                            .parse::<RawSampleType>()
                            .map_err(|error| error.to_string())?,
                        None => defaults.image_type,
                    },
                    ..defaults
                };
                params.validate().map_err(|error| error.to_string())?;
                app.io_service()
                    .save_params(&output, &params)
                    .map_err(|error| error.to_string())?;
                print_json(&params)?;
            }
        },
        Commands::Commands { command } => match command {
            CommandsCommand::List { menu: true } => print_json(&app.command_service().menu())?,
            CommandsCommand::List { menu: false } => print_json(&app.command_service().list())?,
        },
    }

    Ok(())
}
