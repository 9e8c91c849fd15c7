use crate::error::{PancropError, PancropResult};

/// Crop rectangle in source-image pixel coordinates. Coordinates stay
/// fractional through interpolation; they are rounded to pixels only at the
/// crop step (see [`Rect::to_pixels`]), so repeated queries for the same
/// frame are exactly reproducible.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> PancropResult<Self> {
        let rect = Self {
            x,
            y,
            width,
            height,
        };
        rect.validate()?;
        Ok(rect)
    }

    /// Build from corner form (x1,y1)-(x2,y2), exclusive on the far edge.
    pub fn from_corners(x1: f64, y1: f64, x2: f64, y2: f64) -> PancropResult<Self> {
        if x2 <= x1 || y2 <= y1 {
            return Err(PancropError::configuration(format!(
                "crop corners ({x1},{y1})-({x2},{y2}) produce an empty rect"
            )));
        }
        Self::new(x1, y1, x2 - x1, y2 - y1)
    }

    pub fn validate(&self) -> PancropResult<()> {
        if !(self.width > 0.0 && self.height > 0.0) {
            return Err(PancropError::configuration(format!(
                "rect width/height must be positive (got {}x{})",
                self.width, self.height
            )));
        }
        Ok(())
    }

    /// Round the edges per `mode` and clamp into a `frame_w` x `frame_h`
    /// frame. `None` means the clamped rect has no area left.
    pub fn to_pixels(&self, mode: RoundingMode, frame_w: u32, frame_h: u32) -> Option<PixelRect> {
        let x1 = mode.apply(self.x).clamp(0.0, f64::from(frame_w));
        let y1 = mode.apply(self.y).clamp(0.0, f64::from(frame_h));
        let x2 = mode.apply(self.x + self.width).clamp(0.0, f64::from(frame_w));
        let y2 = mode.apply(self.y + self.height).clamp(0.0, f64::from(frame_h));
        if x2 <= x1 || y2 <= y1 {
            return None;
        }
        Some(PixelRect {
            x: x1 as u32,
            y: y1 as u32,
            width: (x2 - x1) as u32,
            height: (y2 - y1) as u32,
        })
    }
}

/// Integer rect handed to the pixel-crop primitive; always lies fully
/// within its frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct PixelRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// How fractional rect edges become pixel boundaries.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum RoundingMode {
    #[default]
    Nearest,
    Floor,
    Ceil,
}

impl RoundingMode {
    pub fn apply(self, v: f64) -> f64 {
        match self {
            Self::Nearest => (v + 0.5).floor(),
            Self::Floor => v.floor(),
            Self::Ceil => v.ceil(),
        }
    }
}

pub trait Lerp: Sized {
    fn lerp(a: &Self, b: &Self, t: f64) -> Self;
}

impl Lerp for f64 {
    fn lerp(a: &Self, b: &Self, t: f64) -> Self {
        a + (b - a) * t
    }
}

impl Lerp for Rect {
    fn lerp(a: &Self, b: &Self, t: f64) -> Self {
        Self {
            x: <f64 as Lerp>::lerp(&a.x, &b.x, t),
            y: <f64 as Lerp>::lerp(&a.y, &b.y, t),
            width: <f64 as Lerp>::lerp(&a.width, &b.width, t),
            height: <f64 as Lerp>::lerp(&a.height, &b.height, t),
        }
    }
}
