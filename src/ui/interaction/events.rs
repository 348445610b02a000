use serde::{Deserialize, Serialize};

use super::Point;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CanvasButton {
    Primary,
    Secondary,
    Middle,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CanvasModifiers {
    /// Constrains rectangles and ellipses to squares and circles while drawing.
    pub shift: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CanvasEventKind {
    Move,
    Press(CanvasButton),
    Release(CanvasButton),
    /// Escape: abandon whatever shape is in progress.
    Cancel,
}

/// One pointer event in screen coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CanvasEvent {
    pub kind: CanvasEventKind,
    pub pointer_screen: Point,
    #[serde(default)]
    pub modifiers: CanvasModifiers,
}

impl CanvasEvent {
    pub fn new(kind: CanvasEventKind, pointer_screen: Point) -> Self {
        Self {
            kind,
            pointer_screen,
            modifiers: CanvasModifiers::default(),
        }
    }

    pub fn press(button: CanvasButton, x: f64, y: f64) -> Self {
        Self::new(CanvasEventKind::Press(button), Point::new(x, y))
    }

    pub fn release(button: CanvasButton, x: f64, y: f64) -> Self {
        Self::new(CanvasEventKind::Release(button), Point::new(x, y))
    }

    pub fn moved(x: f64, y: f64) -> Self {
        Self::new(CanvasEventKind::Move, Point::new(x, y))
    }

    pub fn cancel() -> Self {
        Self::new(CanvasEventKind::Cancel, Point::default())
    }
}
