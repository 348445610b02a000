use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use serde::Serialize;

#[derive(Debug, Parser)]
#[command(
    name = "imagep",
    version,
    about = "Headless ROI editing, raw import and measurement for image stacks"
)]
pub(super) struct Cli {
    /// Session config (JSON or YAML).
    #[arg(long, global = true)]
    pub(super) config: Option<PathBuf>,

    #[command(subcommand)]
    pub(super) command: Commands,
}

/// How to open the input. Without `--raw-params` the file is read as a
/// PNG, JPEG or BMP image.
#[derive(Debug, Args)]
pub(super) struct InputArgs {
    pub(super) input: PathBuf,

    /// Raw import parameters (JSON); imports `input` as headerless raw data.
    #[arg(long)]
    pub(super) raw_params: Option<PathBuf>,
}

#[derive(Debug, Subcommand)]
pub(super) enum Commands {
    Info {
        #[command(flatten)]
        input: InputArgs,
    },
    /// Area, mean, min and max over a rectangle `x0,y0,x1,y1`.
    Measure {
        #[command(flatten)]
        input: InputArgs,
        #[arg(long, value_delimiter = ',', required = true)]
        rect: Vec<f64>,
        #[arg(long, default_value_t = 0)]
        slice: usize,
    },
    /// Writes one slice as an 8-bit PNG.
    Export {
        #[command(flatten)]
        input: InputArgs,
        output: PathBuf,
        #[arg(long, default_value_t = 0)]
        slice: usize,
    },
    Replay {
        #[arg(long)]
        script: PathBuf,
        #[arg(long)]
        input: Option<PathBuf>,
        #[arg(long)]
        raw_params: Option<PathBuf>,
        #[arg(long)]
        report: Option<PathBuf>,
    },
    Params {
        #[command(subcommand)]
        command: ParamsCommand,
    },
    Commands {
        #[command(subcommand)]
        command: CommandsCommand,
    },
}

#[derive(Debug, Subcommand)]
pub(super) enum ParamsCommand {
    /// Writes default raw import parameters to `output`.
    Init {
        output: PathBuf,
        #[arg(long)]
        width: Option<usize>,
        #[arg(long)]
        height: Option<usize>,
        /// Sample type label, e.g. "16-bit Unsigned".
        #[arg(long)]
        image_type: Option<String>,
    },
}

#[derive(Debug, Subcommand)]
pub(super) enum CommandsCommand {
    List {
        /// Print the nested menu instead of the flat command list.
        #[arg(long)]
        menu: bool,
    },
}

#[derive(Debug, Serialize)]
pub(super) struct BufferInfo {
    pub(super) shape: Vec<usize>,
    pub(super) pixel_type: String,
    pub(super) axes: Vec<String>,
    pub(super) slices: usize,
    pub(super) virtual_stack: bool,
    pub(super) source: Option<String>,
    pub(super) min: Option<f64>,
    pub(super) max: Option<f64>,
}
