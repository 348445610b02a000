use serde::{Deserialize, Serialize};

use super::{Bounds, Point};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ShapeKind {
    #[default]
    Rectangle,
    Ellipse,
    Polygon,
    DynamicLine,
    DynamicPolygon,
}

impl ShapeKind {
    /// Kinds drawn by clicking vertices rather than by press-drag-release.
    pub const fn is_polygonal(self) -> bool {
        matches!(self, Self::Polygon | Self::DynamicPolygon)
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Rectangle => "Rectangle",
            Self::Ellipse => "Ellipse",
            Self::Polygon => "Polygon",
            Self::DynamicLine => "Line",
            Self::DynamicPolygon => "Dynamic polygon",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ShapeGeometry {
    Rectangle { start: Point, end: Point },
    Ellipse { start: Point, end: Point },
    Polygon { points: Vec<Point>, closed: bool },
    DynamicLine { start: Point, end: Point },
    DynamicPolygon { points: Vec<Point>, closed: bool },
}

/// What dragging a handle changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HandleRole {
    /// Sets both coordinates of one corner.
    Corner,
    /// Sets only the x coordinate of one side.
    EdgeX,
    /// Sets only the y coordinate of one side.
    EdgeY,
    Vertex,
    Endpoint,
    /// Translates the whole shape.
    Midpoint,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ControlPoint {
    pub index: usize,
    pub role: HandleRole,
    pub position: Point,
}

impl ControlPoint {
    fn new(index: usize, role: HandleRole, position: Point) -> Self {
        Self {
            index,
            role,
            position,
        }
    }
}

impl ShapeGeometry {
    /// Two-point shape with both defining points at `anchor`.
    pub fn anchored(kind: ShapeKind, anchor: Point) -> Self {
        match kind {
            ShapeKind::Rectangle => Self::Rectangle {
                start: anchor,
                end: anchor,
            },
            ShapeKind::Ellipse => Self::Ellipse {
                start: anchor,
                end: anchor,
            },
            ShapeKind::DynamicLine => Self::DynamicLine {
                start: anchor,
                end: anchor,
            },
            ShapeKind::Polygon => Self::Polygon {
                points: vec![anchor],
                closed: false,
            },
            ShapeKind::DynamicPolygon => Self::DynamicPolygon {
                points: vec![anchor],
                closed: false,
            },
        }
    }

    pub fn kind(&self) -> ShapeKind {
        match self {
            Self::Rectangle { .. } => ShapeKind::Rectangle,
            Self::Ellipse { .. } => ShapeKind::Ellipse,
            Self::Polygon { .. } => ShapeKind::Polygon,
            Self::DynamicLine { .. } => ShapeKind::DynamicLine,
            Self::DynamicPolygon { .. } => ShapeKind::DynamicPolygon,
        }
    }

    /// Defining points; a closed ring ends with a copy of its first vertex.
    pub fn points(&self) -> Vec<Point> {
        match self {
            Self::Rectangle { start, end }
            | Self::Ellipse { start, end }
            | Self::DynamicLine { start, end } => vec![*start, *end],
            Self::Polygon { points, .. } | Self::DynamicPolygon { points, .. } => points.clone(),
        }
    }

    /// Vertices without the closing duplicate.
    pub fn vertices(&self) -> &[Point] {
        match self {
            Self::Polygon { points, closed } | Self::DynamicPolygon { points, closed } => {
                if *closed && points.len() > 1 {
                    &points[..points.len() - 1]
                } else {
                    points
                }
            }
            _ => &[],
        }
    }

    pub fn is_closed(&self) -> bool {
        match self {
            Self::Polygon { closed, .. } | Self::DynamicPolygon { closed, .. } => *closed,
            _ => true,
        }
    }

    pub fn bounds(&self) -> Option<Bounds> {
        match self {
            Self::Rectangle { start, end }
            | Self::Ellipse { start, end }
            | Self::DynamicLine { start, end } => Some(Bounds::from_corners(*start, *end)),
            Self::Polygon { points, .. } | Self::DynamicPolygon { points, .. } => {
                Bounds::from_points(points)
            }
        }
    }

    /// Moves the second defining point of a two-point shape.
    pub fn set_span_end(&mut self, point: Point) {
        if let Self::Rectangle { end, .. }
        | Self::Ellipse { end, .. }
        | Self::DynamicLine { end, .. } = self
        {
            *end = point;
        }
    }

    /// Puts the start of rectangles and ellipses at their min corner.
    pub fn normalize(&mut self) {
        if let Self::Rectangle { start, end } | Self::Ellipse { start, end } = self {
            let bounds = Bounds::from_corners(*start, *end);
            *start = bounds.min;
            *end = bounds.max;
        }
    }

    pub fn translate(&mut self, delta: Point) {
        match self {
            Self::Rectangle { start, end }
            | Self::Ellipse { start, end }
            | Self::DynamicLine { start, end } => {
                *start = *start + delta;
                *end = *end + delta;
            }
            Self::Polygon { points, .. } | Self::DynamicPolygon { points, .. } => {
                points.iter_mut().for_each(|point| *point = *point + delta);
            }
        }
    }

    /// Handles in hit-test order. Recomputed from the geometry on every call.
    pub fn control_points(&self) -> Vec<ControlPoint> {
        match self {
            Self::Rectangle { start, end } | Self::Ellipse { start, end } => {
                let (x1, y1, x2, y2) = (start.x, start.y, end.x, end.y);
                let cx = (x1 + x2) * 0.5;
                let cy = (y1 + y2) * 0.5;
                vec![
                    ControlPoint::new(0, HandleRole::Corner, Point::new(x1, y1)),
                    ControlPoint::new(1, HandleRole::Corner, Point::new(x2, y1)),
                    ControlPoint::new(2, HandleRole::Corner, Point::new(x1, y2)),
                    ControlPoint::new(3, HandleRole::Corner, Point::new(x2, y2)),
                    ControlPoint::new(4, HandleRole::EdgeY, Point::new(cx, y1)),
                    ControlPoint::new(5, HandleRole::EdgeY, Point::new(cx, y2)),
                    ControlPoint::new(6, HandleRole::EdgeX, Point::new(x1, cy)),
                    ControlPoint::new(7, HandleRole::EdgeX, Point::new(x2, cy)),
                ]
            }
            Self::DynamicLine { start, end } => vec![
                ControlPoint::new(0, HandleRole::Endpoint, *start),
                ControlPoint::new(1, HandleRole::Endpoint, *end),
                ControlPoint::new(2, HandleRole::Midpoint, start.midpoint(*end)),
            ],
            Self::Polygon { .. } | Self::DynamicPolygon { .. } => self
                .vertices()
                .iter()
                .enumerate()
                .map(|(index, point)| ControlPoint::new(index, HandleRole::Vertex, *point))
                .collect(),
        }
    }

    /// Applies a drag of handle `index` to `pointer`; `delta` is the pointer
    /// movement since the previous event.
    pub fn apply_handle(&mut self, index: usize, pointer: Point, delta: Point) {
        match self {
            Self::Rectangle { start, end } | Self::Ellipse { start, end } => match index {
                0 => *start = pointer,
                1 => {
                    end.x = pointer.x;
                    start.y = pointer.y;
                }
                2 => {
                    start.x = pointer.x;
                    end.y = pointer.y;
                }
                3 => *end = pointer,
                4 => start.y = pointer.y,
                5 => end.y = pointer.y,
                6 => start.x = pointer.x,
                7 => end.x = pointer.x,
                _ => {}
            },
            Self::DynamicLine { start, end } => match index {
                0 => *start = pointer,
                1 => *end = pointer,
                2 => {
                    *start = *start + delta;
                    *end = *end + delta;
                }
                _ => {}
            },
            Self::Polygon { points, closed } | Self::DynamicPolygon { points, closed } => {
                let last = points.len().saturating_sub(1);
                if let Some(vertex) = points.get_mut(index) {
                    *vertex = pointer;
                }
                if *closed && index == 0 && last > 0 {
                    points[last] = pointer;
                }
            }
        }
    }

    /// Whether `point` lies on or inside the shape. `slack` widens thin
    /// shapes (lines, degenerate ellipses) so they stay grabbable.
    pub fn contains(&self, point: Point, slack: f64) -> bool {
        match self {
            Self::Rectangle { start, end } => Bounds::from_corners(*start, *end).contains(point),
            Self::Ellipse { start, end } => {
                let bounds = Bounds::from_corners(*start, *end);
                let rx = bounds.width() * 0.5;
                let ry = bounds.height() * 0.5;
                if rx <= f64::EPSILON || ry <= f64::EPSILON {
                    return bounds.expand(slack).contains(point);
                }
                let center = bounds.center();
                let nx = (point.x - center.x) / rx;
                let ny = (point.y - center.y) / ry;
                nx * nx + ny * ny <= 1.0
            }
            Self::DynamicLine { start, end } => point.distance_to_segment(*start, *end) <= slack,
            Self::Polygon { .. } | Self::DynamicPolygon { .. } => {
                let vertices = self.vertices();
                if vertices.len() < 3 {
                    return vertices
                        .windows(2)
                        .any(|pair| point.distance_to_segment(pair[0], pair[1]) <= slack);
                }
                point_in_polygon(point, vertices)
            }
        }
    }

    pub fn describe(&self) -> String {
        match self {
            Self::Rectangle { start, end } => {
                let bounds = Bounds::from_corners(*start, *end);
                format!("Rect {:.0}x{:.0}", bounds.width(), bounds.height())
            }
            Self::Ellipse { start, end } => {
                let bounds = Bounds::from_corners(*start, *end);
                format!("Ellipse {:.0}x{:.0}", bounds.width(), bounds.height())
            }
            Self::DynamicLine { start, end } => format!("Line length {:.2}", start.distance(*end)),
            Self::Polygon { .. } | Self::DynamicPolygon { .. } => {
                format!("Polygon points: {}", self.vertices().len())
            }
        }
    }
}

/// Even-odd ray casting.
fn point_in_polygon(point: Point, vertices: &[Point]) -> bool {
    let mut inside = false;
    let mut previous = vertices[vertices.len() - 1];
    for current in vertices {
        if (current.y > point.y) != (previous.y > point.y) {
            let crossing =
                (previous.x - current.x) * (point.y - current.y) / (previous.y - current.y)
                    + current.x;
            if point.x < crossing {
                inside = !inside;
            }
        }
        previous = *current;
    }
    inside
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RoiPosition {
    pub z: usize,
}

/// User-editable annotation attributes shown in the properties dialog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoiProperties {
    pub name: String,
    pub position: String,
    pub group: String,
    pub stroke_color: String,
    pub stroke_width: f64,
    pub fill_color: Option<String>,
    pub list_coordinates: bool,
}

impl Default for RoiProperties {
    fn default() -> Self {
        Self {
            name: String::new(),
            position: String::new(),
            group: String::new(),
            stroke_color: "red".to_string(),
            stroke_width: 2.0,
            fill_color: None,
            list_coordinates: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoiModel {
    pub id: u64,
    pub geometry: ShapeGeometry,
    pub position: RoiPosition,
    pub properties: RoiProperties,
}

#[derive(Debug, Clone, Default)]
pub struct RoiStore {
    pub active_roi: Option<RoiModel>,
    pub overlay_rois: Vec<RoiModel>,
    pub selected_roi_id: Option<u64>,
    next_id: u64,
}

impl RoiStore {
    fn next_id(&mut self) -> u64 {
        self.next_id = self.next_id.saturating_add(1);
        self.next_id
    }

    pub fn begin_active(&mut self, geometry: ShapeGeometry, position: RoiPosition) -> u64 {
        let id = self.next_id();
        self.active_roi = Some(RoiModel {
            id,
            geometry,
            position,
            properties: RoiProperties::default(),
        });
        id
    }

    pub fn active_geometry_mut(&mut self) -> Option<&mut ShapeGeometry> {
        self.active_roi.as_mut().map(|roi| &mut roi.geometry)
    }

    /// Moves the active ROI into the overlay. Without `keep_existing` the
    /// previous overlay is dropped first.
    pub fn commit_active(&mut self, keep_existing: bool) -> Option<u64> {
        let active = self.active_roi.take()?;
        if !keep_existing {
            self.overlay_rois.clear();
        }
        let id = active.id;
        self.selected_roi_id = Some(id);
        self.overlay_rois.push(active);
        Some(id)
    }

    pub fn abort_active(&mut self) -> Option<RoiModel> {
        self.active_roi.take()
    }

    pub fn clear_all(&mut self) {
        self.active_roi = None;
        self.overlay_rois.clear();
        self.selected_roi_id = None;
    }

    pub fn get(&self, id: u64) -> Option<&RoiModel> {
        self.overlay_rois.iter().find(|roi| roi.id == id)
    }

    pub fn get_mut(&mut self, id: u64) -> Option<&mut RoiModel> {
        self.overlay_rois.iter_mut().find(|roi| roi.id == id)
    }

    pub fn selected(&self) -> Option<&RoiModel> {
        self.selected_roi_id.and_then(|id| self.get(id))
    }

    pub fn remove(&mut self, id: u64) -> Option<RoiModel> {
        let index = self.overlay_rois.iter().position(|roi| roi.id == id)?;
        if self.selected_roi_id == Some(id) {
            self.selected_roi_id = None;
        }
        Some(self.overlay_rois.remove(index))
    }

    /// Drops finalized ROIs whose kind differs from `kind`.
    pub fn retain_kind(&mut self, kind: ShapeKind) {
        self.overlay_rois.retain(|roi| roi.geometry.kind() == kind);
        if let Some(id) = self.selected_roi_id
            && self.get(id).is_none()
        {
            self.selected_roi_id = None;
        }
    }

    /// Finalized ROIs on `position` in hit-test priority: the selected ROI
    /// first, then the rest newest first.
    pub fn hit_order(&self, position: RoiPosition) -> Vec<&RoiModel> {
        let mut ordered = self
            .overlay_rois
            .iter()
            .rev()
            .filter(|roi| roi.position == position)
            .collect::<Vec<_>>();
        if let Some(selected) = self.selected_roi_id
            && let Some(index) = ordered.iter().position(|roi| roi.id == selected)
        {
            let roi = ordered.remove(index);
            ordered.insert(0, roi);
        }
        ordered
    }
}

#[cfg(test)]
mod tests {
    use super::{HandleRole, Point, RoiPosition, RoiStore, ShapeGeometry, ShapeKind};

    fn rect(x1: f64, y1: f64, x2: f64, y2: f64) -> ShapeGeometry {
        ShapeGeometry::Rectangle {
            start: Point::new(x1, y1),
            end: Point::new(x2, y2),
        }
    }

    #[test]
    fn rectangle_has_corner_and_edge_handles() {
        let handles = rect(0.0, 0.0, 10.0, 20.0).control_points();
        assert_eq!(handles.len(), 8);
        assert_eq!(handles[3].position, Point::new(10.0, 20.0));
        assert_eq!(handles[4].role, HandleRole::EdgeY);
        assert_eq!(handles[4].position, Point::new(5.0, 0.0));
        assert_eq!(handles[7].role, HandleRole::EdgeX);
        assert_eq!(handles[7].position, Point::new(10.0, 10.0));
    }

    #[test]
    fn degenerate_rectangle_handles_are_finite() {
        let handles = rect(5.0, 5.0, 5.0, 5.0).control_points();
        assert!(
            handles
                .iter()
                .all(|handle| handle.position.x.is_finite() && handle.position.y.is_finite())
        );
        let ellipse = ShapeGeometry::Ellipse {
            start: Point::new(5.0, 5.0),
            end: Point::new(5.0, 9.0),
        };
        assert!(ellipse.contains(Point::new(5.0, 7.0), 0.5));
        assert!(!ellipse.contains(Point::new(7.0, 7.0), 0.5));
    }

    #[test]
    fn closed_polygon_moves_its_closing_vertex_with_the_first() {
        let mut polygon = ShapeGeometry::Polygon {
            points: vec![
                Point::new(0.0, 0.0),
                Point::new(10.0, 0.0),
                Point::new(10.0, 10.0),
                Point::new(0.0, 0.0),
            ],
            closed: true,
        };
        assert_eq!(polygon.control_points().len(), 3);
        polygon.apply_handle(0, Point::new(-1.0, -1.0), Point::new(-1.0, -1.0));
        let points = polygon.points();
        assert_eq!(points[0], Point::new(-1.0, -1.0));
        assert_eq!(points[3], Point::new(-1.0, -1.0));
    }

    #[test]
    fn polygon_containment_uses_the_interior() {
        let triangle = ShapeGeometry::DynamicPolygon {
            points: vec![
                Point::new(0.0, 0.0),
                Point::new(10.0, 0.0),
                Point::new(0.0, 10.0),
                Point::new(0.0, 0.0),
            ],
            closed: true,
        };
        assert!(triangle.contains(Point::new(2.0, 2.0), 0.0));
        assert!(!triangle.contains(Point::new(8.0, 8.0), 0.0));
    }

    #[test]
    fn commit_without_keep_replaces_overlay() {
        let mut store = RoiStore::default();
        store.begin_active(rect(0.0, 0.0, 1.0, 1.0), RoiPosition::default());
        let first = store.commit_active(true).expect("first");
        store.begin_active(rect(2.0, 2.0, 3.0, 3.0), RoiPosition::default());
        let second = store.commit_active(false).expect("second");
        assert!(store.get(first).is_none());
        assert_eq!(store.selected_roi_id, Some(second));
        assert_eq!(store.overlay_rois.len(), 1);
    }

    #[test]
    fn hit_order_prefers_selection_then_newest() {
        let mut store = RoiStore::default();
        let mut ids = Vec::new();
        for offset in 0..3 {
            let base = offset as f64;
            store.begin_active(rect(base, base, base + 1.0, base + 1.0), RoiPosition::default());
            ids.push(store.commit_active(true).expect("commit"));
        }
        store.selected_roi_id = Some(ids[0]);
        let order = store
            .hit_order(RoiPosition::default())
            .iter()
            .map(|roi| roi.id)
            .collect::<Vec<_>>();
        assert_eq!(order, vec![ids[0], ids[2], ids[1]]);
        store.retain_kind(ShapeKind::Ellipse);
        assert!(store.overlay_rois.is_empty());
        assert_eq!(store.selected_roi_id, None);
    }
}
