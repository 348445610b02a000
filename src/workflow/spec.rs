use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::ui::interaction::{
    CanvasButton, CanvasEvent, CanvasEventKind, CanvasModifiers, CanvasRect, ContextAction, Point,
    ShapeKind, ViewTransform, ZoomStep,
};

use super::{PipelineError, Result};

/// Recorded canvas events and commands, replayed against one session.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReplayScript {
    pub name: Option<String>,
    /// Stop at the first failing command instead of recording it and going on.
    #[serde(default)]
    pub stop_on_error: bool,
    #[serde(default)]
    pub steps: Vec<ScriptStep>,
}

fn primary() -> CanvasButton {
    CanvasButton::Primary
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "step", rename_all = "snake_case")]
pub enum ScriptStep {
    SetTool {
        kind: ShapeKind,
    },
    Press {
        x: f64,
        y: f64,
        #[serde(default = "primary")]
        button: CanvasButton,
        #[serde(default)]
        shift: bool,
    },
    Move {
        x: f64,
        y: f64,
        #[serde(default)]
        shift: bool,
    },
    Release {
        x: f64,
        y: f64,
        #[serde(default = "primary")]
        button: CanvasButton,
        #[serde(default)]
        shift: bool,
    },
    /// Press and release at the same point.
    Click {
        x: f64,
        y: f64,
        #[serde(default = "primary")]
        button: CanvasButton,
    },
    Cancel,
    /// Places the canvas on screen, optionally fitting the whole image in it.
    Canvas {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        #[serde(default)]
        fit: bool,
    },
    /// One zoom level in or out, anchored at the pointer.
    Zoom {
        x: f64,
        y: f64,
        direction: ZoomStep,
    },
    ZoomActual,
    /// Drag-pan by a screen-space delta.
    Pan {
        dx: f64,
        dy: f64,
    },
    Wheel {
        delta: f64,
        #[serde(default)]
        horizontal: bool,
    },
    SetSlice {
        index: usize,
    },
    Command {
        id: String,
        #[serde(default)]
        params: Value,
    },
    ContextAction {
        roi_id: u64,
        action: ContextAction,
    },
}

impl ScriptStep {
    /// Canvas events this step feeds to the editor, in order.
    pub fn canvas_events(&self) -> Vec<CanvasEvent> {
        let event = |kind, x, y, shift| CanvasEvent {
            kind,
            pointer_screen: Point::new(x, y),
            modifiers: CanvasModifiers { shift },
        };
        match *self {
            Self::Press {
                x,
                y,
                button,
                shift,
            } => vec![event(CanvasEventKind::Press(button), x, y, shift)],
            Self::Move { x, y, shift } => vec![event(CanvasEventKind::Move, x, y, shift)],
            Self::Release {
                x,
                y,
                button,
                shift,
            } => vec![event(CanvasEventKind::Release(button), x, y, shift)],
            Self::Click { x, y, button } => vec![
                event(CanvasEventKind::Press(button), x, y, false),
                event(CanvasEventKind::Release(button), x, y, false),
            ],
            Self::Cancel => vec![CanvasEvent::cancel()],
            _ => Vec::new(),
        }
    }

    /// Applies a zoom, pan or canvas step to `view`; other steps leave it as is.
    pub fn apply_to_view(&self, view: &mut ViewTransform) {
        match *self {
            Self::Canvas {
                x,
                y,
                width,
                height,
                fit,
            } => {
                view.set_canvas(CanvasRect::new(x, y, width, height));
                if fit {
                    view.fit_to_canvas();
                }
            }
            Self::Zoom { x, y, direction } => view.zoom_step_at(direction, Point::new(x, y)),
            Self::ZoomActual => view.zoom_view_100(),
            Self::Pan { dx, dy } => view.scroll_by_screen_delta(Point::new(dx, dy)),
            Self::Wheel { delta, horizontal } => view.wheel_pan(delta, horizontal),
            _ => {}
        }
    }

    pub fn label(&self) -> String {
        match self {
            Self::SetTool { kind } => format!("set_tool {}", kind.label()),
            Self::Press { .. } => "press".to_string(),
            Self::Move { .. } => "move".to_string(),
            Self::Release { .. } => "release".to_string(),
            Self::Click { .. } => "click".to_string(),
            Self::Cancel => "cancel".to_string(),
            Self::Canvas { .. } => "canvas".to_string(),
            Self::Zoom { direction, .. } => match direction {
                ZoomStep::In => "zoom in".to_string(),
                ZoomStep::Out => "zoom out".to_string(),
            },
            Self::ZoomActual => "zoom 100%".to_string(),
            Self::Pan { .. } => "pan".to_string(),
            Self::Wheel { .. } => "wheel".to_string(),
            Self::SetSlice { index } => format!("set_slice {index}"),
            Self::Command { id, .. } => id.clone(),
            Self::ContextAction { action, .. } => action.command_id().to_string(),
        }
    }
}

impl ReplayScript {
    pub fn validate(&self) -> Result<()> {
        if self.steps.is_empty() {
            return Err(PipelineError::Parse(
                "replay script must include at least one step".to_string(),
            ));
        }
        for (index, step) in self.steps.iter().enumerate() {
            match step {
                ScriptStep::Command { id, params } => {
                    if id.trim().is_empty() {
                        return Err(PipelineError::Parse(format!(
                            "command at index {index} has an empty id"
                        )));
                    }
                    if !params.is_object() && !params.is_null() {
                        return Err(PipelineError::Parse(format!(
                            "command `{id}` parameters must be a JSON object"
                        )));
                    }
                }
                ScriptStep::Press { x, y, .. }
                | ScriptStep::Move { x, y, .. }
                | ScriptStep::Release { x, y, .. }
                | ScriptStep::Click { x, y, .. }
                    if !x.is_finite() || !y.is_finite() =>
                {
                    return Err(PipelineError::Parse(format!(
                        "pointer step at index {index} has a non-finite coordinate"
                    )));
                }
                ScriptStep::Canvas {
                    x,
                    y,
                    width,
                    height,
                    ..
                } if ![x, y, width, height].iter().all(|value| value.is_finite())
                    || *width <= 0.0
                    || *height <= 0.0 =>
                {
                    return Err(PipelineError::Parse(format!(
                        "canvas at index {index} must have a finite, positive size"
                    )));
                }
                ScriptStep::Zoom { x, y, .. } | ScriptStep::Pan { dx: x, dy: y }
                    if !x.is_finite() || !y.is_finite() =>
                {
                    return Err(PipelineError::Parse(format!(
                        "view step at index {index} has a non-finite coordinate"
                    )));
                }
                ScriptStep::Wheel { delta, .. } if !delta.is_finite() => {
                    return Err(PipelineError::Parse(format!(
                        "wheel step at index {index} has a non-finite delta"
                    )));
                }
                _ => {}
            }
        }
        Ok(())
    }
}
