use serde::{Deserialize, Serialize};

use super::Point;

pub const MIN_MAGNIFICATION: f64 = 1.0 / 72.0;
pub const MAX_MAGNIFICATION: f64 = 32.0;

pub const ZOOM_LEVELS: [f64; 23] = [
    1.0 / 72.0,
    1.0 / 48.0,
    1.0 / 32.0,
    1.0 / 24.0,
    1.0 / 16.0,
    1.0 / 12.0,
    1.0 / 8.0,
    1.0 / 6.0,
    1.0 / 4.0,
    1.0 / 3.0,
    1.0 / 2.0,
    0.75,
    1.0,
    1.5,
    2.0,
    3.0,
    4.0,
    6.0,
    8.0,
    12.0,
    16.0,
    24.0,
    32.0,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ZoomStep {
    In,
    Out,
}

/// Canvas area in screen pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CanvasRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl CanvasRect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width: width.max(1.0),
            height: height.max(1.0),
        }
    }

    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.x
            && point.x <= self.x + self.width
            && point.y >= self.y
            && point.y <= self.y + self.height
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.width * 0.5, self.y + self.height * 0.5)
    }
}

/// Part of the image shown on the canvas, in image units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SourceRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl SourceRect {
    pub fn full(image_width: usize, image_height: usize) -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            width: image_width.max(1) as f64,
            height: image_height.max(1) as f64,
        }
    }

    pub fn clamp_to_image(&mut self, image_width: usize, image_height: usize) {
        let image_w = image_width.max(1) as f64;
        let image_h = image_height.max(1) as f64;

        self.width = self.width.clamp(1.0, image_w);
        self.height = self.height.clamp(1.0, image_h);
        self.x = self.x.clamp(0.0, (image_w - self.width).max(0.0));
        self.y = self.y.clamp(0.0, (image_h - self.height).max(0.0));
    }
}

/// Pan/zoom state of one canvas. Mapping between screen and image space is a
/// pure affine function of this state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewTransform {
    pub canvas: CanvasRect,
    pub magnification: f64,
    pub src_rect: SourceRect,
    pub scale_to_fit: bool,
    image_width: usize,
    image_height: usize,
}

impl Default for ViewTransform {
    fn default() -> Self {
        Self::new(1, 1)
    }
}

impl ViewTransform {
    /// 1:1 view with the canvas sized to the image.
    pub fn new(image_width: usize, image_height: usize) -> Self {
        Self {
            canvas: CanvasRect::new(0.0, 0.0, image_width as f64, image_height as f64),
            magnification: 1.0,
            src_rect: SourceRect::full(image_width, image_height),
            scale_to_fit: false,
            image_width: image_width.max(1),
            image_height: image_height.max(1),
        }
    }

    /// Moves or resizes the canvas, keeping the magnification and the
    /// top-left of the visible source rect.
    pub fn set_canvas(&mut self, canvas: CanvasRect) {
        self.canvas = canvas;
        if self.scale_to_fit {
            self.fit_to_canvas();
            return;
        }
        self.src_rect.width = canvas.width / self.magnification;
        self.src_rect.height = canvas.height / self.magnification;
        self.src_rect
            .clamp_to_image(self.image_width, self.image_height);
    }

    pub fn fit_to_canvas(&mut self) {
        let image_w = self.image_width as f64;
        let image_h = self.image_height as f64;
        let fit_mag = (self.canvas.width / image_w)
            .min(self.canvas.height / image_h)
            .clamp(MIN_MAGNIFICATION, MAX_MAGNIFICATION);
        self.magnification = fit_mag;
        self.src_rect = SourceRect::full(self.image_width, self.image_height);
        self.scale_to_fit = true;
    }

    /// Screen pixels per image unit along x and y.
    pub fn scale(&self) -> (f64, f64) {
        (
            self.canvas.width / self.src_rect.width,
            self.canvas.height / self.src_rect.height,
        )
    }

    /// Smaller of the two axis scales; converts screen tolerances to image
    /// units conservatively.
    pub fn pixels_per_unit(&self) -> f64 {
        let (sx, sy) = self.scale();
        sx.min(sy)
    }

    pub fn screen_to_image(&self, screen: Point) -> Point {
        let (sx, sy) = self.scale();
        Point::new(
            self.src_rect.x + (screen.x - self.canvas.x) / sx,
            self.src_rect.y + (screen.y - self.canvas.y) / sy,
        )
    }

    /// Like [`Self::screen_to_image`] but `None` for pointers off the canvas.
    pub fn screen_to_image_checked(&self, screen: Point) -> Option<Point> {
        self.canvas
            .contains(screen)
            .then(|| self.screen_to_image(screen))
    }

    pub fn image_to_screen(&self, image: Point) -> Point {
        let (sx, sy) = self.scale();
        Point::new(
            self.canvas.x + (image.x - self.src_rect.x) * sx,
            self.canvas.y + (image.y - self.src_rect.y) * sy,
        )
    }

    pub fn zoom_in_at(&mut self, pointer_screen: Point) {
        let next = zoom_level_up(self.magnification);
        self.set_magnification_at(pointer_screen, next);
    }

    pub fn zoom_out_at(&mut self, pointer_screen: Point) {
        let next = zoom_level_down(self.magnification);
        self.set_magnification_at(pointer_screen, next);
    }

    pub fn zoom_step_at(&mut self, step: ZoomStep, pointer_screen: Point) {
        match step {
            ZoomStep::In => self.zoom_in_at(pointer_screen),
            ZoomStep::Out => self.zoom_out_at(pointer_screen),
        }
    }

    pub fn zoom_view_100(&mut self) {
        let center = self.canvas.center();
        self.set_magnification_at(center, 1.0);
    }

    /// Changes magnification while keeping the image point under the pointer
    /// fixed on screen (up to clamping at the image edges).
    pub fn set_magnification_at(&mut self, pointer_screen: Point, next_magnification: f64) {
        let image_w = self.image_width as f64;
        let image_h = self.image_height as f64;
        let next_mag = next_magnification.clamp(MIN_MAGNIFICATION, MAX_MAGNIFICATION);

        let pointer_image = self
            .screen_to_image_checked(pointer_screen)
            .unwrap_or_else(|| {
                Point::new(
                    self.src_rect.x + self.src_rect.width * 0.5,
                    self.src_rect.y + self.src_rect.height * 0.5,
                )
            });

        let nx = ((pointer_screen.x - self.canvas.x) / self.canvas.width).clamp(0.0, 1.0);
        let ny = ((pointer_screen.y - self.canvas.y) / self.canvas.height).clamp(0.0, 1.0);

        let new_width = (self.canvas.width / next_mag).max(1.0).min(image_w);
        let new_height = (self.canvas.height / next_mag).max(1.0).min(image_h);

        self.src_rect = SourceRect {
            x: pointer_image.x - nx * new_width,
            y: pointer_image.y - ny * new_height,
            width: new_width,
            height: new_height,
        };
        self.src_rect
            .clamp_to_image(self.image_width, self.image_height);
        self.magnification = next_mag;
        self.scale_to_fit = false;
    }

    /// Pans so that content follows a pointer drag of `delta` screen pixels.
    pub fn scroll_by_screen_delta(&mut self, delta: Point) {
        let (sx, sy) = self.scale();
        self.src_rect.x -= delta.x / sx;
        self.src_rect.y -= delta.y / sy;
        self.src_rect
            .clamp_to_image(self.image_width, self.image_height);
    }

    pub fn wheel_pan(&mut self, wheel_delta: f64, horizontal: bool) {
        if horizontal {
            let step = (self.image_width as f64 / 200.0).max(1.0);
            self.src_rect.x += wheel_delta * step;
        } else {
            let step = (self.image_height as f64 / 200.0).max(1.0);
            self.src_rect.y += wheel_delta * step;
        }
        self.src_rect
            .clamp_to_image(self.image_width, self.image_height);
    }
}

pub fn zoom_level_down(current: f64) -> f64 {
    let mut next = ZOOM_LEVELS[0];
    for level in ZOOM_LEVELS {
        if level < current {
            next = level;
        } else {
            break;
        }
    }
    next
}

pub fn zoom_level_up(current: f64) -> f64 {
    let mut next = ZOOM_LEVELS[ZOOM_LEVELS.len() - 1];
    for level in ZOOM_LEVELS.iter().rev().copied() {
        if level > current {
            next = level;
        } else {
            break;
        }
    }
    next
}
