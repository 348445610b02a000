use std::time::{Duration, Instant};

use ndarray::{Array2, Array3, Axis};
use serde::{Deserialize, Serialize};

use crate::formats::{IoError, RawStack};
use crate::model::{CoreError, PixelBuffer, gray_from_plane};

pub const DEFAULT_PLAYBACK_INTERVAL: Duration = Duration::from_millis(100);

/// Anything that can hand out gray `[Y, X]` slices by index.
pub trait SliceSource {
    type Error;

    fn depth(&self) -> usize;
    fn slice(&self, index: usize) -> Result<Array2<f64>, Self::Error>;
}

impl SliceSource for PixelBuffer {
    type Error = CoreError;

    fn depth(&self) -> usize {
        PixelBuffer::depth(self)
    }

    fn slice(&self, index: usize) -> Result<Array2<f64>, CoreError> {
        self.gray_plane(index)
    }
}

impl SliceSource for RawStack {
    type Error = IoError;

    fn depth(&self) -> usize {
        RawStack::depth(self)
    }

    fn slice(&self, index: usize) -> Result<Array2<f64>, IoError> {
        let plane = self.read_slice(index)?;
        Ok(gray_from_plane(plane.view())?)
    }
}

/// Current slice of a stack plus timed playback.
#[derive(Debug, Clone, PartialEq)]
pub struct SliceNavigator {
    depth: usize,
    index: usize,
    playing: bool,
    interval: Duration,
    last_tick: Option<Instant>,
}

impl SliceNavigator {
    pub fn new(depth: usize) -> Self {
        Self {
            depth: depth.max(1),
            index: 0,
            playing: false,
            interval: DEFAULT_PLAYBACK_INTERVAL,
            last_tick: None,
        }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    /// Resets to slice 0 for a newly loaded stack.
    pub fn set_depth(&mut self, depth: usize) {
        self.depth = depth.max(1);
        self.index = 0;
        self.pause();
    }

    /// Clamps `index` into the stack and returns the slice actually shown.
    pub fn set_index(&mut self, index: usize) -> usize {
        self.index = index.min(self.depth - 1);
        self.index
    }

    pub fn step_forward(&mut self) -> usize {
        self.index = (self.index + 1) % self.depth;
        self.index
    }

    pub fn step_backward(&mut self) -> usize {
        self.index = self.index.checked_sub(1).unwrap_or(self.depth - 1);
        self.index
    }

    pub fn play(&mut self, now: Instant) {
        self.playing = true;
        self.last_tick = Some(now);
    }

    pub fn pause(&mut self) {
        self.playing = false;
        self.last_tick = None;
    }

    pub fn toggle(&mut self, now: Instant) -> bool {
        if self.playing {
            self.pause();
        } else {
            self.play(now);
        }
        self.playing
    }

    /// Advances one slice per whole interval elapsed since the last advance.
    /// Returns whether the index changed.
    pub fn tick(&mut self, now: Instant) -> bool {
        if !self.playing {
            return false;
        }
        let last = *self.last_tick.get_or_insert(now);
        let elapsed = now.saturating_duration_since(last);
        if self.interval.is_zero() {
            self.last_tick = Some(now);
            self.step_forward();
            return true;
        }
        let steps = elapsed.as_nanos() / self.interval.as_nanos();
        if steps == 0 {
            return false;
        }
        let wrapped = (steps % self.depth as u128) as usize;
        self.index = (self.index + wrapped) % self.depth;
        self.last_tick = Some(last + self.interval.mul_f64(steps as f64));
        true
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrthoPlane {
    /// Rows y, columns x, at fixed z.
    Xy,
    /// Rows z, columns x, at fixed y.
    Xz,
    /// Rows z, columns y, at fixed x.
    Yz,
}

impl OrthoPlane {
    pub const ALL: [Self; 3] = [Self::Xy, Self::Xz, Self::Yz];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct OrthoCursor {
    pub x: usize,
    pub y: usize,
    pub z: usize,
}

/// Crosshair position in the row/column space of one plane.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Crosshair {
    pub row: usize,
    pub col: usize,
}

/// Three synchronized cross-sections of a volume.
#[derive(Debug, Clone)]
pub struct OrthoViews {
    volume: Array3<f64>,
    cursor: OrthoCursor,
    xy: Array2<f64>,
    xz: Array2<f64>,
    yz: Array2<f64>,
}

impl OrthoViews {
    /// Reads every slice of `source` and centers the cursor.
    pub fn from_source<S: SliceSource>(source: &S) -> Result<Self, S::Error>
    where
        S::Error: From<CoreError>,
    {
        let depth = source.depth();
        let first = source.slice(0)?;
        let (height, width) = first.dim();
        let mut volume = Array3::zeros((depth, height, width));
        volume.index_axis_mut(Axis(0), 0).assign(&first);
        for z in 1..depth {
            let plane = source.slice(z)?;
            if plane.dim() != (height, width) {
                return Err(CoreError::UnsupportedLayout(format!(
                    "slice {z} is {:?}, expected {:?}",
                    plane.dim(),
                    (height, width)
                ))
                .into());
            }
            volume.index_axis_mut(Axis(0), z).assign(&plane);
        }

        let cursor = OrthoCursor {
            x: width / 2,
            y: height / 2,
            z: depth / 2,
        };
        let mut views = Self {
            volume,
            cursor,
            xy: Array2::zeros((height, width)),
            xz: Array2::zeros((depth, width)),
            yz: Array2::zeros((depth, height)),
        };
        for plane in OrthoPlane::ALL {
            views.refresh(plane);
        }
        Ok(views)
    }

    /// `(depth, height, width)` of the volume.
    pub fn dims(&self) -> (usize, usize, usize) {
        self.volume.dim()
    }

    pub fn cursor(&self) -> OrthoCursor {
        self.cursor
    }

    pub fn plane(&self, plane: OrthoPlane) -> &Array2<f64> {
        match plane {
            OrthoPlane::Xy => &self.xy,
            OrthoPlane::Xz => &self.xz,
            OrthoPlane::Yz => &self.yz,
        }
    }

    pub fn crosshair(&self, plane: OrthoPlane) -> Crosshair {
        let OrthoCursor { x, y, z } = self.cursor;
        match plane {
            OrthoPlane::Xy => Crosshair { row: y, col: x },
            OrthoPlane::Xz => Crosshair { row: z, col: x },
            OrthoPlane::Yz => Crosshair { row: z, col: y },
        }
    }

    /// Moves the cursor to `(row, col)` of `source` and refreshes the other
    /// two planes. Returns the refreshed planes.
    pub fn click(&mut self, source: OrthoPlane, row: usize, col: usize) -> Vec<OrthoPlane> {
        let (depth, height, width) = self.dims();
        let mut cursor = self.cursor;
        match source {
            OrthoPlane::Xy => {
                cursor.y = row.min(height - 1);
                cursor.x = col.min(width - 1);
            }
            OrthoPlane::Xz => {
                cursor.z = row.min(depth - 1);
                cursor.x = col.min(width - 1);
            }
            OrthoPlane::Yz => {
                cursor.z = row.min(depth - 1);
                cursor.y = col.min(height - 1);
            }
        }
        self.cursor = cursor;

        let refreshed = OrthoPlane::ALL
            .into_iter()
            .filter(|plane| *plane != source)
            .collect::<Vec<_>>();
        for plane in &refreshed {
            self.refresh(*plane);
        }
        log::debug!("ortho cursor {:?} from {source:?}", self.cursor);
        refreshed
    }

    fn refresh(&mut self, plane: OrthoPlane) {
        let OrthoCursor { x, y, z } = self.cursor;
        match plane {
            OrthoPlane::Xy => self.xy = self.volume.index_axis(Axis(0), z).to_owned(),
            OrthoPlane::Xz => self.xz = self.volume.index_axis(Axis(1), y).to_owned(),
            OrthoPlane::Yz => self.yz = self.volume.index_axis(Axis(2), x).to_owned(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::time::{Duration, Instant};

    use ndarray::{Array3, IxDyn};
    use tempfile::tempdir;

    use super::{OrthoPlane, OrthoViews, SliceNavigator, SliceSource};
    use crate::formats::{RawImportParams, RawSampleType, RawStack};
    use crate::model::{PixelBuffer, PixelType};

    fn layered(depth: usize, height: usize, width: usize) -> PixelBuffer {
        let data = Array3::from_shape_fn((depth, height, width), |(z, _, _)| z as f64).into_dyn();
        PixelBuffer::from_data_with_default_metadata(data, PixelType::U8).expect("buffer")
    }

    #[test]
    fn selected_slice_comes_from_its_layer_and_wraps() {
        let buffer = layered(3, 4, 4);
        let mut navigator = SliceNavigator::new(buffer.depth());
        assert_eq!(navigator.set_index(2), 2);
        let shown = buffer.slice(navigator.index()).expect("slice");
        assert!(shown.iter().all(|value| *value == 2.0));

        assert_eq!(navigator.step_forward(), 0);
        assert_eq!(navigator.step_backward(), 2);
        assert_eq!(navigator.set_index(99), 2);
    }

    #[test]
    fn playback_advances_per_elapsed_interval() {
        let start = Instant::now();
        let mut navigator = SliceNavigator::new(3).with_interval(Duration::from_millis(100));
        assert!(!navigator.tick(start + Duration::from_millis(500)));

        navigator.play(start);
        assert!(navigator.is_playing());
        assert!(!navigator.tick(start + Duration::from_millis(50)));
        assert!(navigator.tick(start + Duration::from_millis(100)));
        assert_eq!(navigator.index(), 1);
        assert!(navigator.tick(start + Duration::from_millis(320)));
        assert_eq!(navigator.index(), 0);

        assert!(!navigator.toggle(start));
        assert!(!navigator.is_playing());
        assert!(!navigator.tick(start + Duration::from_secs(5)));
    }

    #[test]
    fn ortho_click_refreshes_only_other_planes() {
        let data = Array3::from_shape_fn((4, 5, 6), |(z, y, x)| (z * 100 + y * 10 + x) as f64);
        let buffer =
            PixelBuffer::from_data_with_default_metadata(data.into_dyn(), PixelType::U16)
                .expect("buffer");
        let mut views = OrthoViews::from_source(&buffer).expect("views");
        assert_eq!(views.dims(), (4, 5, 6));
        assert_eq!(views.plane(OrthoPlane::Xz).dim(), (4, 6));
        assert_eq!(views.plane(OrthoPlane::Yz).dim(), (4, 5));

        let before_xy = views.plane(OrthoPlane::Xy).clone();
        let refreshed = views.click(OrthoPlane::Xy, 1, 4);
        assert_eq!(refreshed, vec![OrthoPlane::Xz, OrthoPlane::Yz]);
        assert_eq!(views.plane(OrthoPlane::Xy), &before_xy);

        let cursor = views.cursor();
        assert_eq!((cursor.x, cursor.y, cursor.z), (4, 1, 2));
        assert_eq!(views.plane(OrthoPlane::Xz)[[3, 5]], 315.0);
        assert_eq!(views.plane(OrthoPlane::Yz)[[0, 2]], 24.0);
        assert_eq!(views.crosshair(OrthoPlane::Yz).row, 2);

        views.click(OrthoPlane::Yz, 3, 0);
        assert_eq!(views.plane(OrthoPlane::Xy)[[0, 0]], 300.0);
    }

    #[test]
    fn lazy_raw_stack_serves_slices() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("stack.raw");
        fs::write(&path, [0u8, 0, 1, 1, 2, 2]).expect("write raw");
        let params = RawImportParams {
            image_type: RawSampleType::U8,
            width: 2,
            height: 1,
            num_images: 3,
            ..RawImportParams::default()
        };
        let stack = RawStack::open(&path, params).expect("stack");
        assert_eq!(SliceSource::depth(&stack), 3);
        assert_eq!(stack.slice(2).expect("slice")[[0, 1]], 2.0);

        let views = OrthoViews::from_source(&stack).expect("views");
        assert_eq!(views.plane(OrthoPlane::Xz).column(0).to_vec(), vec![0.0, 1.0, 2.0]);
        let data = stack.read_slice(1).expect("raw slice");
        assert_eq!(data[IxDyn(&[0, 0])], 1.0);
    }
}
