use std::path::Path;
use std::time::Instant;

use ndarray::Array2;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::commands::{CommandOutput, MeasurementTable, OpsError, find_command};
use crate::formats::{
    self, LoadHandle, RawImportParams, RawLoad, RawLoadReport, RawStack, load_params, read_image,
    read_raw, save_params, spawn_raw_load,
};
use crate::model::PixelBuffer;
use crate::ui::interaction::{
    CanvasEvent, ContextAction, EditOutcome, Point, RoiEditor, RoiPosition, ShapeKind,
    ViewTransform,
};
use crate::ui::stack::{OrthoViews, SliceNavigator};

use super::SessionConfig;

/// Sample under the pointer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PixelProbe {
    pub x: usize,
    pub y: usize,
    pub z: usize,
    pub value: f64,
}

/// Receives pixel probes while the pointer hovers over the image.
pub trait HoverListener {
    fn on_hover(&mut self, probe: &PixelProbe);
}

impl<F: FnMut(&PixelProbe)> HoverListener for F {
    fn on_hover(&mut self, probe: &PixelProbe) {
        self(probe)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusLevel {
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusLine {
    pub level: StatusLevel,
    pub message: String,
}

/// Everything one viewer window owns: the buffer, its view, the ROI editor,
/// slice navigation and the status area.
pub struct ViewerSession {
    config: SessionConfig,
    buffer: Option<PixelBuffer>,
    virtual_stack: Option<RawStack>,
    view: ViewTransform,
    editor: RoiEditor,
    navigator: SliceNavigator,
    ortho: Option<OrthoViews>,
    raw_params: RawImportParams,
    pending_load: Option<LoadHandle>,
    status: Vec<StatusLine>,
    results: Vec<MeasurementTable>,
    hover_listener: Option<Box<dyn HoverListener>>,
}

impl std::fmt::Debug for ViewerSession {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("ViewerSession")
            .field("shape", &self.buffer.as_ref().map(PixelBuffer::shape))
            .field("virtual_stack", &self.virtual_stack.is_some())
            .field("slice", &self.navigator.index())
            .field("rois", &self.editor.store().overlay_rois.len())
            .field("hover_listener", &self.hover_listener.is_some())
            .finish()
    }
}

impl Default for ViewerSession {
    fn default() -> Self {
        Self::new(SessionConfig::default())
    }
}

impl ViewerSession {
    pub fn new(config: SessionConfig) -> Self {
        let mut editor = RoiEditor::new(config.editor.clone());
        editor.set_kind(config.default_tool);
        let raw_params = config
            .raw_params_path
            .as_deref()
            .filter(|path| path.exists())
            .and_then(|path| match load_params(path) {
                Ok(params) => Some(params),
                Err(error) => {
                    log::warn!("ignoring saved raw params {}: {error}", path.display());
                    None
                }
            })
            .unwrap_or_default();
        Self {
            navigator: SliceNavigator::new(1).with_interval(config.playback_interval()),
            config,
            buffer: None,
            virtual_stack: None,
            view: ViewTransform::default(),
            editor,
            ortho: None,
            raw_params,
            pending_load: None,
            status: Vec::new(),
            results: Vec::new(),
            hover_listener: None,
        }
    }

    pub fn with_hover_listener(config: SessionConfig, listener: Box<dyn HoverListener>) -> Self {
        Self {
            hover_listener: Some(listener),
            ..Self::new(config)
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn buffer(&self) -> Option<&PixelBuffer> {
        self.buffer.as_ref()
    }

    pub fn buffer_mut(&mut self) -> Option<&mut PixelBuffer> {
        self.buffer.as_mut()
    }

    /// Lazily read stack backing the buffer, if the import asked for one.
    pub fn virtual_stack(&self) -> Option<&RawStack> {
        self.virtual_stack.as_ref()
    }

    pub fn view(&self) -> &ViewTransform {
        &self.view
    }

    pub fn view_mut(&mut self) -> &mut ViewTransform {
        &mut self.view
    }

    pub fn editor(&self) -> &RoiEditor {
        &self.editor
    }

    pub fn editor_mut(&mut self) -> &mut RoiEditor {
        &mut self.editor
    }

    pub fn navigator(&self) -> &SliceNavigator {
        &self.navigator
    }

    pub fn ortho(&self) -> Option<&OrthoViews> {
        self.ortho.as_ref()
    }

    pub fn ortho_mut(&mut self) -> Option<&mut OrthoViews> {
        self.ortho.as_mut()
    }

    pub fn set_ortho(&mut self, views: OrthoViews) {
        self.ortho = Some(views);
    }

    /// Drops orthogonal views built from pixels a command just rewrote.
    pub fn pixels_changed(&mut self) {
        if self.ortho.take().is_some() {
            log::debug!("orthogonal views discarded after a pixel edit");
        }
    }

    pub fn raw_params(&self) -> &RawImportParams {
        &self.raw_params
    }

    pub fn status(&self) -> &[StatusLine] {
        &self.status
    }

    pub fn status_text(&self) -> Option<&str> {
        self.status.last().map(|line| line.message.as_str())
    }

    pub fn results(&self) -> &[MeasurementTable] {
        &self.results
    }

    pub fn record_measurement(&mut self, table: MeasurementTable) {
        self.results.push(table);
    }

    fn push_status(&mut self, level: StatusLevel, message: impl Into<String>) {
        let message = message.into();
        match level {
            StatusLevel::Info => log::info!("{message}"),
            StatusLevel::Warning => log::warn!("{message}"),
            StatusLevel::Error => log::error!("{message}"),
        }
        self.status.push(StatusLine { level, message });
    }

    /// Index into the buffer's Z axis for slice `z`. A virtual stack holds
    /// only the current slice.
    pub fn plane_index(&self, z: usize) -> usize {
        if self.virtual_stack.is_some() { 0 } else { z }
    }

    /// Gray copy of slice `z`.
    pub fn gray_plane_at(&self, z: usize) -> Result<Array2<f64>, OpsError> {
        let buffer = self.buffer.as_ref().ok_or(OpsError::NoImage)?;
        if self.virtual_stack.is_some() && z != self.navigator.index() {
            return Err(OpsError::InvalidParams(format!(
                "slice {z} is not loaded from the virtual stack"
            )));
        }
        Ok(buffer.gray_plane(self.plane_index(z))?)
    }

    /// Replaces the buffer and resets view, slice and ROIs.
    pub fn load_buffer(&mut self, buffer: PixelBuffer) {
        self.install(buffer, None);
    }

    fn install(&mut self, buffer: PixelBuffer, stack: Option<RawStack>) {
        let depth = stack
            .as_ref()
            .map(RawStack::depth)
            .unwrap_or_else(|| buffer.depth());
        self.view = ViewTransform::new(buffer.width(), buffer.height());
        self.navigator.set_depth(depth);
        self.editor.store_mut().clear_all();
        self.editor.set_position(RoiPosition::default());
        self.ortho = None;
        self.buffer = Some(buffer);
        self.virtual_stack = stack;
    }

    pub fn open_image(&mut self, path: impl AsRef<Path>) -> formats::Result<()> {
        let path = path.as_ref();
        let buffer = read_image(path)?;
        self.load_buffer(buffer);
        self.push_status(StatusLevel::Info, format!("Opened {}", path.display()));
        Ok(())
    }

    /// Imports a raw file. On failure the current buffer stays in place.
    pub fn import_raw(
        &mut self,
        path: impl AsRef<Path>,
        params: RawImportParams,
    ) -> formats::Result<RawLoadReport> {
        let path = path.as_ref();
        let report = if params.use_virtual_stack {
            let stack = RawStack::open(path, params.clone())?;
            let first = stack.read_slice_buffer(0)?;
            let report = RawLoadReport {
                files: vec![path.to_path_buf()],
                expected_bytes: params.frame_bytes()? * stack.depth() as u64,
                ..RawLoadReport::default()
            };
            self.install(first, Some(stack));
            report
        } else {
            let RawLoad { buffer, report } = read_raw(path, &params)?;
            self.install(buffer, None);
            report
        };
        for warning in &report.warnings {
            self.push_status(StatusLevel::Warning, warning.clone());
        }
        self.push_status(StatusLevel::Info, format!("Imported {}", path.display()));
        self.remember_raw_params(params);
        Ok(report)
    }

    fn remember_raw_params(&mut self, params: RawImportParams) {
        if let Some(path) = &self.config.raw_params_path
            && let Err(error) = save_params(path, &params)
        {
            log::warn!("could not save raw params to {}: {error}", path.display());
        }
        self.raw_params = params;
    }

    /// Starts a raw import on the worker pool. Poll with
    /// [`Self::poll_background_import`].
    pub fn start_background_import(&mut self, path: impl AsRef<Path>, params: RawImportParams) {
        let path = path.as_ref().to_path_buf();
        self.push_status(StatusLevel::Info, format!("Loading {}", path.display()));
        self.pending_load = Some(spawn_raw_load(path, params));
    }

    pub fn is_loading(&self) -> bool {
        self.pending_load.is_some()
    }

    /// Installs a finished background load. `None` while still loading or
    /// when nothing was started.
    pub fn poll_background_import(&mut self) -> Option<formats::Result<RawLoadReport>> {
        let result = self.pending_load.as_ref()?.try_take()?;
        let handle = self.pending_load.take()?;
        Some(match result {
            Ok(RawLoad { buffer, report }) => {
                self.install(buffer, None);
                for warning in &report.warnings {
                    self.push_status(StatusLevel::Warning, warning.clone());
                }
                self.push_status(
                    StatusLevel::Info,
                    format!("Imported {}", handle.path().display()),
                );
                self.remember_raw_params(handle.params().clone());
                Ok(report)
            }
            Err(error) => {
                self.push_status(StatusLevel::Error, error.to_string());
                Err(error)
            }
        })
    }

    pub fn set_tool(&mut self, kind: ShapeKind) {
        self.editor.set_kind(kind);
    }

    /// Feeds a canvas event to the ROI editor. Idle hovering over the image
    /// notifies the hover listener.
    pub fn handle_event(&mut self, event: &CanvasEvent) -> EditOutcome {
        let outcome = self.editor.handle(event, &self.view);
        match &outcome {
            EditOutcome::Hover { image, .. } => self.probe(*image),
            EditOutcome::Finalized { roi_id } => {
                if let Some(roi) = self.editor.store().get(*roi_id) {
                    log::debug!("roi {roi_id}: {}", roi.geometry.describe());
                }
            }
            EditOutcome::ContextMenu { roi_id, actions } => {
                let labels = actions.iter().map(|action| action.label()).collect::<Vec<_>>();
                log::debug!("context menu for roi {roi_id}: {}", labels.join(", "));
            }
            _ => {}
        }
        outcome
    }

    fn probe(&mut self, image: Point) {
        if image.x < 0.0 || image.y < 0.0 {
            return;
        }
        let (x, y) = (image.x.floor() as usize, image.y.floor() as usize);
        let z = self.navigator.index();
        let Some(value) = self
            .buffer
            .as_ref()
            .and_then(|buffer| buffer.sample(self.plane_index(z), y, x))
        else {
            return;
        };
        if let Some(listener) = self.hover_listener.as_mut() {
            listener.on_hover(&PixelProbe { x, y, z, value });
        }
    }

    pub fn set_slice(&mut self, index: usize) -> formats::Result<usize> {
        let previous = self.navigator.index();
        self.navigator.set_index(index);
        self.sync_slice(previous)
    }

    pub fn step_slice(&mut self, forward: bool) -> formats::Result<usize> {
        let previous = self.navigator.index();
        if forward {
            self.navigator.step_forward();
        } else {
            self.navigator.step_backward();
        }
        self.sync_slice(previous)
    }

    pub fn toggle_playback(&mut self, now: Instant) -> bool {
        self.navigator.toggle(now)
    }

    /// Advances playback; returns whether the slice changed.
    pub fn tick(&mut self, now: Instant) -> formats::Result<bool> {
        let previous = self.navigator.index();
        if !self.navigator.tick(now) {
            return Ok(false);
        }
        self.sync_slice(previous)?;
        Ok(true)
    }

    /// Moves the editor to the navigator's slice, reloading it first for a
    /// virtual stack. A failed read puts the navigator back on `previous`.
    fn sync_slice(&mut self, previous: usize) -> formats::Result<usize> {
        let index = self.navigator.index();
        if let Some(stack) = &self.virtual_stack {
            match stack.read_slice_buffer(index) {
                Ok(buffer) => self.buffer = Some(buffer),
                Err(error) => {
                    self.navigator.set_index(previous);
                    return Err(error);
                }
            }
        }
        self.editor.set_position(RoiPosition { z: index });
        Ok(index)
    }

    /// Runs a registered command. Failures are also written to the status
    /// area; they never leave the session half-updated.
    pub fn run_command(&mut self, id: &str, params: &Value) -> Result<CommandOutput, OpsError> {
        let result = find_command(id).and_then(|command| command.invoke(self, params));
        match &result {
            Ok(output) => self.push_status(StatusLevel::Info, output.message.clone()),
            Err(error) if error.is_warning() => {
                self.push_status(StatusLevel::Warning, error.to_string())
            }
            Err(error) => self.push_status(StatusLevel::Error, format!("{id}: {error}")),
        }
        result
    }

    pub fn run_context_action(
        &mut self,
        roi_id: u64,
        action: ContextAction,
    ) -> Result<CommandOutput, OpsError> {
        self.run_command(action.command_id(), &json!({ "roi_id": roi_id }))
    }
}
