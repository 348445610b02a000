use serde::{Deserialize, Serialize};

use super::tools::{ShapeTool, ToolContext, ToolStep, tool_for};
use super::{
    CanvasButton, CanvasEvent, CanvasEventKind, ControlPoint, Point, RoiModel, RoiPosition,
    RoiStore, ShapeKind, ViewTransform,
};

/// Distance used when testing the pointer against control points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HitMetric {
    #[default]
    Euclidean,
    Chebyshev,
    Manhattan,
}

impl HitMetric {
    pub fn distance(self, a: Point, b: Point) -> f64 {
        let dx = (a.x - b.x).abs();
        let dy = (a.y - b.y).abs();
        match self {
            Self::Euclidean => dx.hypot(dy),
            Self::Chebyshev => dx.max(dy),
            Self::Manhattan => dx + dy,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RetainPolicy {
    /// Committing a new ROI removes all earlier ones.
    ClearOnNew,
    #[default]
    PreserveMultiple,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KindSwitchPolicy {
    #[default]
    Preserve,
    /// Switching the shape kind removes finalized ROIs of other kinds.
    DiscardOtherKinds,
}

/// Tolerances are in screen pixels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    pub hit_tolerance: f64,
    pub hit_metric: HitMetric,
    pub click_epsilon: f64,
    pub closure_threshold: f64,
    pub retain: RetainPolicy,
    pub kind_switch: KindSwitchPolicy,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            hit_tolerance: 10.0,
            hit_metric: HitMetric::Euclidean,
            click_epsilon: 1.0,
            closure_threshold: 10.0,
            retain: RetainPolicy::PreserveMultiple,
            kind_switch: KindSwitchPolicy::Preserve,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InteractionState {
    #[default]
    Idle,
    Drawing,
    Dragging {
        roi_id: u64,
    },
    Resizing {
        roi_id: u64,
        handle: usize,
    },
    AccumulatingPolygon,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContextAction {
    Properties,
    Measure,
    Invert,
    Delete,
}

impl ContextAction {
    pub const ALL: [Self; 4] = [Self::Properties, Self::Measure, Self::Invert, Self::Delete];

    pub const fn label(self) -> &'static str {
        match self {
            Self::Properties => "Properties...",
            Self::Measure => "Measure",
            Self::Invert => "Invert",
            Self::Delete => "Delete",
        }
    }

    /// Registry id of the command that carries out this action.
    pub const fn command_id(self) -> &'static str {
        match self {
            Self::Properties => "roi.properties",
            Self::Measure => "analyze.measure",
            Self::Invert => "edit.invert",
            Self::Delete => "roi.delete",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum EditOutcome {
    Unchanged,
    /// Idle pointer movement; `handle` is set when the pointer is over a
    /// control point.
    Hover {
        image: Point,
        roi_id: Option<u64>,
        handle: Option<ControlPoint>,
    },
    Started {
        kind: ShapeKind,
    },
    Updated,
    Finalized {
        roi_id: u64,
    },
    Discarded,
    /// A finalized ROI was moved or resized.
    Edited {
        roi_id: u64,
    },
    ContextMenu {
        roi_id: u64,
        actions: Vec<ContextAction>,
    },
}

/// Turns canvas events into ROI edits for one canvas.
#[derive(Debug)]
pub struct RoiEditor {
    config: EditorConfig,
    tool: Box<dyn ShapeTool>,
    state: InteractionState,
    store: RoiStore,
    position: RoiPosition,
    last_pointer: Point,
}

impl Default for RoiEditor {
    fn default() -> Self {
        Self::new(EditorConfig::default())
    }
}

impl RoiEditor {
    pub fn new(config: EditorConfig) -> Self {
        let tool = tool_for(
            ShapeKind::default(),
            config.click_epsilon,
            config.closure_threshold,
        );
        Self {
            config,
            tool,
            state: InteractionState::Idle,
            store: RoiStore::default(),
            position: RoiPosition::default(),
            last_pointer: Point::default(),
        }
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn kind(&self) -> ShapeKind {
        self.tool.kind()
    }

    pub fn state(&self) -> InteractionState {
        self.state
    }

    pub fn store(&self) -> &RoiStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut RoiStore {
        &mut self.store
    }

    pub fn position(&self) -> RoiPosition {
        self.position
    }

    /// Rubber-band point of the shape being built, if any.
    pub fn preview(&self) -> Option<Point> {
        self.tool.preview()
    }

    pub fn set_kind(&mut self, kind: ShapeKind) {
        if kind == self.kind() {
            return;
        }
        self.abort_in_progress();
        if self.config.kind_switch == KindSwitchPolicy::DiscardOtherKinds {
            self.store.retain_kind(kind);
        }
        log::debug!("roi editor: tool {:?} -> {:?}", self.kind(), kind);
        self.tool = tool_for(kind, self.config.click_epsilon, self.config.closure_threshold);
    }

    /// Moves the editor to another slice. ROIs are bound to the slice they
    /// were drawn on.
    pub fn set_position(&mut self, position: RoiPosition) {
        if position != self.position {
            self.abort_in_progress();
            self.position = position;
        }
    }

    pub fn cancel(&mut self) -> EditOutcome {
        if self.abort_in_progress() {
            EditOutcome::Discarded
        } else {
            EditOutcome::Unchanged
        }
    }

    pub fn delete(&mut self, roi_id: u64) -> Option<RoiModel> {
        if matches!(
            self.state,
            InteractionState::Dragging { roi_id: id } | InteractionState::Resizing { roi_id: id, .. }
                if id == roi_id
        ) {
            self.transition(InteractionState::Idle);
        }
        self.store.remove(roi_id)
    }

    pub fn handle(&mut self, event: &CanvasEvent, view: &ViewTransform) -> EditOutcome {
        let pointer = view.screen_to_image(event.pointer_screen);
        let ctx = ToolContext {
            pointer,
            pointer_screen: event.pointer_screen,
            modifiers: event.modifiers,
            view,
        };
        let outcome = match event.kind {
            CanvasEventKind::Cancel => self.cancel(),
            CanvasEventKind::Press(button) => self.on_press(button, &ctx),
            CanvasEventKind::Move => self.on_move(&ctx),
            CanvasEventKind::Release(button) => self.on_release(button, &ctx),
        };
        self.last_pointer = pointer;
        outcome
    }

    fn on_press(&mut self, button: CanvasButton, ctx: &ToolContext<'_>) -> EditOutcome {
        match self.state {
            InteractionState::AccumulatingPolygon => {
                let Some(shape) = self.store.active_geometry_mut() else {
                    self.transition(InteractionState::Idle);
                    return EditOutcome::Unchanged;
                };
                let step = self.tool.on_press(shape, button, ctx);
                self.apply_step(step)
            }
            InteractionState::Idle => match button {
                CanvasButton::Primary => self.press_idle(ctx),
                CanvasButton::Secondary => match self.roi_under(ctx) {
                    Some(roi_id) => EditOutcome::ContextMenu {
                        roi_id,
                        actions: ContextAction::ALL.to_vec(),
                    },
                    None => EditOutcome::Unchanged,
                },
                CanvasButton::Middle => EditOutcome::Unchanged,
            },
            _ => EditOutcome::Unchanged,
        }
    }

    fn press_idle(&mut self, ctx: &ToolContext<'_>) -> EditOutcome {
        if let Some((roi_id, handle)) = self.handle_under(ctx) {
            self.store.selected_roi_id = Some(roi_id);
            self.transition(InteractionState::Resizing {
                roi_id,
                handle: handle.index,
            });
            return EditOutcome::Updated;
        }
        if let Some(roi_id) = self.roi_under(ctx) {
            self.store.selected_roi_id = Some(roi_id);
            self.transition(InteractionState::Dragging { roi_id });
            return EditOutcome::Updated;
        }

        let kind = self.kind();
        let shape = self.tool.begin(ctx);
        self.store.begin_active(shape, self.position);
        self.transition(if kind.is_polygonal() {
            InteractionState::AccumulatingPolygon
        } else {
            InteractionState::Drawing
        });
        EditOutcome::Started { kind }
    }

    fn on_move(&mut self, ctx: &ToolContext<'_>) -> EditOutcome {
        let delta = ctx.pointer - self.last_pointer;
        match self.state {
            InteractionState::Idle => {
                let hovered = self.handle_under(ctx);
                EditOutcome::Hover {
                    image: ctx.pointer,
                    roi_id: hovered
                        .map(|(roi_id, _)| roi_id)
                        .or_else(|| self.roi_under(ctx)),
                    handle: hovered.map(|(_, handle)| handle),
                }
            }
            InteractionState::Drawing | InteractionState::AccumulatingPolygon => {
                match self.store.active_geometry_mut() {
                    Some(shape) => {
                        let step = self.tool.on_move(shape, ctx);
                        self.apply_step(step)
                    }
                    None => EditOutcome::Unchanged,
                }
            }
            InteractionState::Dragging { roi_id } => match self.store.get_mut(roi_id) {
                Some(roi) => {
                    roi.geometry.translate(delta);
                    EditOutcome::Updated
                }
                None => EditOutcome::Unchanged,
            },
            InteractionState::Resizing { roi_id, handle } => match self.store.get_mut(roi_id) {
                Some(roi) => {
                    roi.geometry.apply_handle(handle, ctx.pointer, delta);
                    EditOutcome::Updated
                }
                None => EditOutcome::Unchanged,
            },
        }
    }

    fn on_release(&mut self, button: CanvasButton, ctx: &ToolContext<'_>) -> EditOutcome {
        match self.state {
            InteractionState::Drawing | InteractionState::AccumulatingPolygon => {
                match self.store.active_geometry_mut() {
                    Some(shape) => {
                        let step = self.tool.on_release(shape, button, ctx);
                        self.apply_step(step)
                    }
                    None => EditOutcome::Unchanged,
                }
            }
            InteractionState::Dragging { roi_id } if button == CanvasButton::Primary => {
                self.transition(InteractionState::Idle);
                EditOutcome::Edited { roi_id }
            }
            InteractionState::Resizing { roi_id, .. } if button == CanvasButton::Primary => {
                if let Some(roi) = self.store.get_mut(roi_id) {
                    roi.geometry.normalize();
                }
                self.transition(InteractionState::Idle);
                EditOutcome::Edited { roi_id }
            }
            _ => EditOutcome::Unchanged,
        }
    }

    fn apply_step(&mut self, step: ToolStep) -> EditOutcome {
        match step {
            ToolStep::Updated => EditOutcome::Updated,
            ToolStep::Ignored => EditOutcome::Unchanged,
            ToolStep::Commit => {
                let keep = self.config.retain == RetainPolicy::PreserveMultiple;
                let committed = self.store.commit_active(keep);
                self.tool.reset();
                self.transition(InteractionState::Idle);
                match committed {
                    Some(roi_id) => {
                        log::debug!("roi editor: committed roi {roi_id}");
                        EditOutcome::Finalized { roi_id }
                    }
                    None => EditOutcome::Unchanged,
                }
            }
            ToolStep::Discard => {
                self.abort_in_progress();
                EditOutcome::Discarded
            }
        }
    }

    /// Drops the in-progress shape and any drag. Returns whether a shape
    /// was dropped.
    fn abort_in_progress(&mut self) -> bool {
        let dropped = self.store.abort_active().is_some();
        self.tool.reset();
        self.transition(InteractionState::Idle);
        dropped
    }

    fn transition(&mut self, next: InteractionState) {
        if self.state != next {
            log::debug!("roi editor: {:?} -> {:?}", self.state, next);
            self.state = next;
        }
    }

    /// Nearest control point within the hit tolerance, searching ROIs in
    /// hit order and stopping at the first ROI with a hit.
    fn handle_under(&self, ctx: &ToolContext<'_>) -> Option<(u64, ControlPoint)> {
        let metric = self.config.hit_metric;
        self.store.hit_order(self.position).into_iter().find_map(|roi| {
            roi.geometry
                .control_points()
                .into_iter()
                .map(|handle| {
                    let screen = ctx.view.image_to_screen(handle.position);
                    (metric.distance(screen, ctx.pointer_screen), handle)
                })
                .filter(|(distance, _)| *distance < self.config.hit_tolerance)
                .min_by(|a, b| a.0.total_cmp(&b.0))
                .map(|(_, handle)| (roi.id, handle))
        })
    }

    fn roi_under(&self, ctx: &ToolContext<'_>) -> Option<u64> {
        let slack = self.config.hit_tolerance / ctx.view.pixels_per_unit();
        self.store
            .hit_order(self.position)
            .into_iter()
            .find(|roi| roi.geometry.contains(ctx.pointer, slack))
            .map(|roi| roi.id)
    }
}
