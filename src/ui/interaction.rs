mod editor;
mod events;
mod geometry;
mod roi;
mod tools;
mod transform;

pub use editor::{
    ContextAction, EditOutcome, EditorConfig, HitMetric, InteractionState, KindSwitchPolicy,
    RetainPolicy, RoiEditor,
};
pub use events::{CanvasButton, CanvasEvent, CanvasEventKind, CanvasModifiers};
pub use geometry::{Bounds, Point};
pub use roi::{
    ControlPoint, HandleRole, RoiModel, RoiPosition, RoiProperties, RoiStore, ShapeGeometry,
    ShapeKind,
};
pub use tools::{PolygonTool, ShapeTool, SpanTool, ToolContext, ToolStep, tool_for};
pub use transform::{
    CanvasRect, SourceRect, ViewTransform, ZoomStep, zoom_level_down, zoom_level_up,
};
