use super::{CanvasButton, CanvasModifiers, Point, ShapeGeometry, ShapeKind, ViewTransform};

/// Pointer state handed to a tool for one event.
#[derive(Debug, Clone, Copy)]
pub struct ToolContext<'a> {
    pub pointer: Point,
    pub pointer_screen: Point,
    pub modifiers: CanvasModifiers,
    pub view: &'a ViewTransform,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolStep {
    /// The in-progress shape changed or is still being built.
    Updated,
    /// The event had no effect on the shape.
    Ignored,
    /// The shape is complete and should be committed.
    Commit,
    /// The shape should be dropped without committing.
    Discard,
}

/// Drawing strategy for one shape kind. The editor owns the in-progress
/// geometry and hands it to the tool on every event.
pub trait ShapeTool: std::fmt::Debug {
    fn kind(&self) -> ShapeKind;

    /// Starts a new shape at the pointer.
    fn begin(&mut self, ctx: &ToolContext<'_>) -> ShapeGeometry;

    fn on_press(
        &mut self,
        shape: &mut ShapeGeometry,
        button: CanvasButton,
        ctx: &ToolContext<'_>,
    ) -> ToolStep;

    fn on_move(&mut self, shape: &mut ShapeGeometry, ctx: &ToolContext<'_>) -> ToolStep;

    fn on_release(
        &mut self,
        shape: &mut ShapeGeometry,
        button: CanvasButton,
        ctx: &ToolContext<'_>,
    ) -> ToolStep;

    /// Rubber-band end point shown while building a shape. Never a vertex.
    fn preview(&self) -> Option<Point> {
        None
    }

    fn reset(&mut self) {}
}

pub fn tool_for(
    kind: ShapeKind,
    click_epsilon: f64,
    closure_threshold: f64,
) -> Box<dyn ShapeTool> {
    match kind {
        ShapeKind::Rectangle | ShapeKind::Ellipse | ShapeKind::DynamicLine => {
            Box::new(SpanTool::new(kind, click_epsilon))
        }
        ShapeKind::Polygon => Box::new(PolygonTool::new(kind, None)),
        ShapeKind::DynamicPolygon => Box::new(PolygonTool::new(kind, Some(closure_threshold))),
    }
}

/// Press-drag-release tool for two-point shapes.
#[derive(Debug, Clone)]
pub struct SpanTool {
    kind: ShapeKind,
    click_epsilon: f64,
    press_screen: Option<Point>,
}

impl SpanTool {
    pub fn new(kind: ShapeKind, click_epsilon: f64) -> Self {
        Self {
            kind,
            click_epsilon,
            press_screen: None,
        }
    }

    fn span_end(&self, shape: &ShapeGeometry, ctx: &ToolContext<'_>) -> Point {
        let constrain = ctx.modifiers.shift
            && matches!(self.kind, ShapeKind::Rectangle | ShapeKind::Ellipse);
        match shape.points().first() {
            Some(start) if constrain => {
                let dx = ctx.pointer.x - start.x;
                let dy = ctx.pointer.y - start.y;
                let side = dx.abs().max(dy.abs());
                Point::new(start.x + side.copysign(dx), start.y + side.copysign(dy))
            }
            _ => ctx.pointer,
        }
    }
}

impl ShapeTool for SpanTool {
    fn kind(&self) -> ShapeKind {
        self.kind
    }

    fn begin(&mut self, ctx: &ToolContext<'_>) -> ShapeGeometry {
        self.press_screen = Some(ctx.pointer_screen);
        ShapeGeometry::anchored(self.kind, ctx.pointer)
    }

    fn on_press(
        &mut self,
        _shape: &mut ShapeGeometry,
        _button: CanvasButton,
        _ctx: &ToolContext<'_>,
    ) -> ToolStep {
        ToolStep::Ignored
    }

    fn on_move(&mut self, shape: &mut ShapeGeometry, ctx: &ToolContext<'_>) -> ToolStep {
        let end = self.span_end(shape, ctx);
        shape.set_span_end(end);
        ToolStep::Updated
    }

    fn on_release(
        &mut self,
        shape: &mut ShapeGeometry,
        button: CanvasButton,
        ctx: &ToolContext<'_>,
    ) -> ToolStep {
        if button != CanvasButton::Primary {
            return ToolStep::Ignored;
        }
        let moved = self
            .press_screen
            .take()
            .map(|press| press.distance(ctx.pointer_screen))
            .unwrap_or(0.0);
        if moved <= self.click_epsilon {
            return ToolStep::Discard;
        }
        let end = self.span_end(shape, ctx);
        shape.set_span_end(end);
        shape.normalize();
        ToolStep::Commit
    }

    fn reset(&mut self) {
        self.press_screen = None;
    }
}

/// Click-per-vertex tool. With a closure threshold the ring closes itself
/// when a click lands near the first vertex; without one a middle or
/// secondary press closes it.
#[derive(Debug, Clone)]
pub struct PolygonTool {
    kind: ShapeKind,
    auto_close: Option<f64>,
    preview: Option<Point>,
}

impl PolygonTool {
    pub fn new(kind: ShapeKind, auto_close: Option<f64>) -> Self {
        Self {
            kind,
            auto_close,
            preview: None,
        }
    }

    fn close(&mut self, shape: &mut ShapeGeometry) -> ToolStep {
        if let ShapeGeometry::Polygon { points, closed }
        | ShapeGeometry::DynamicPolygon { points, closed } = shape
        {
            if points.len() < 3 {
                return ToolStep::Ignored;
            }
            let first = points[0];
            points.push(first);
            *closed = true;
        }
        self.preview = None;
        ToolStep::Commit
    }
}

impl ShapeTool for PolygonTool {
    fn kind(&self) -> ShapeKind {
        self.kind
    }

    fn begin(&mut self, ctx: &ToolContext<'_>) -> ShapeGeometry {
        self.preview = None;
        ShapeGeometry::anchored(self.kind, ctx.pointer)
    }

    fn on_press(
        &mut self,
        shape: &mut ShapeGeometry,
        button: CanvasButton,
        ctx: &ToolContext<'_>,
    ) -> ToolStep {
        if button != CanvasButton::Primary {
            return if self.auto_close.is_none() {
                self.close(shape)
            } else {
                ToolStep::Ignored
            };
        }

        let first = shape.vertices().first().copied();
        let last = shape.vertices().last().copied();
        if let (Some(threshold), Some(first)) = (self.auto_close, first) {
            let first_screen = ctx.view.image_to_screen(first);
            if first_screen.distance(ctx.pointer_screen) < threshold {
                return self.close(shape);
            }
        }
        if last == Some(ctx.pointer) {
            return ToolStep::Ignored;
        }

        if let ShapeGeometry::Polygon { points, .. }
        | ShapeGeometry::DynamicPolygon { points, .. } = shape
        {
            points.push(ctx.pointer);
        }
        ToolStep::Updated
    }

    fn on_move(&mut self, _shape: &mut ShapeGeometry, ctx: &ToolContext<'_>) -> ToolStep {
        self.preview = Some(ctx.pointer);
        ToolStep::Updated
    }

    fn on_release(
        &mut self,
        _shape: &mut ShapeGeometry,
        _button: CanvasButton,
        _ctx: &ToolContext<'_>,
    ) -> ToolStep {
        ToolStep::Ignored
    }

    fn preview(&self) -> Option<Point> {
        self.preview
    }

    fn reset(&mut self) {
        self.preview = None;
    }
}
