use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AxisKind {
    X,
    Y,
    Z,
    Channel,
    Unknown,
}

/// Sample type of the source data. Buffers always hold `f64` samples; this
/// records what they were decoded from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum PixelType {
    #[default]
    U8,
    I8,
    U16,
    I16,
    U32,
    I32,
    U64,
    I64,
    F32,
    F64,
    Rgb24,
}

impl PixelType {
    /// Representable range for integer and packed RGB samples. Floating point
    /// samples have no fixed range.
    pub fn value_range(self) -> Option<(f64, f64)> {
        match self {
            Self::U8 | Self::Rgb24 => Some((0.0, f64::from(u8::MAX))),
            Self::I8 => Some((f64::from(i8::MIN), f64::from(i8::MAX))),
            Self::U16 => Some((0.0, f64::from(u16::MAX))),
            Self::I16 => Some((f64::from(i16::MIN), f64::from(i16::MAX))),
            Self::U32 => Some((0.0, f64::from(u32::MAX))),
            Self::I32 => Some((f64::from(i32::MIN), f64::from(i32::MAX))),
            Self::U64 => Some((0.0, u64::MAX as f64)),
            Self::I64 => Some((i64::MIN as f64, i64::MAX as f64)),
            Self::F32 | Self::F64 => None,
        }
    }

    pub fn is_unsigned_integer(self) -> bool {
        matches!(self, Self::U8 | Self::U16 | Self::U32 | Self::U64)
    }
}

pub fn default_axis_for_index(ndim: usize, index: usize) -> AxisKind {
    match (ndim, index) {
        (2, 0) => AxisKind::Y,
        (2, 1) => AxisKind::X,
        (3, 0) => AxisKind::Z,
        (3, 1) => AxisKind::Y,
        (3, 2) => AxisKind::X,
        _ => AxisKind::Unknown,
    }
}
