use crate::{
    error::{PancropError, PancropResult},
    geom::{Lerp, Rect},
};

/// A user-specified fixed point the pan/zoom path must pass through exactly.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Anchor {
    pub frame: u64,
    pub rect: Rect,
}

/// Immutable, sorted anchor list plus the interpolation function over it.
/// Built once per run; rebuilding means constructing a new track.
#[derive(Clone, Debug)]
pub struct KeyframeTrack {
    anchors: Vec<Anchor>, // sorted by frame, strictly increasing
}

impl KeyframeTrack {
    /// Sorts by frame index (input order carries no meaning) and validates
    /// eagerly, before any frame I/O happens.
    pub fn new(mut anchors: Vec<Anchor>) -> PancropResult<Self> {
        if anchors.is_empty() {
            return Err(PancropError::configuration(
                "a keyframe track needs at least one anchor",
            ));
        }
        anchors.sort_by_key(|a| a.frame);
        for w in anchors.windows(2) {
            if w[0].frame == w[1].frame {
                return Err(PancropError::configuration(format!(
                    "duplicate anchor at frame {}",
                    w[0].frame
                )));
            }
        }
        for a in &anchors {
            if a.rect.validate().is_err() {
                return Err(PancropError::configuration(format!(
                    "anchor at frame {} has non-positive width/height ({}x{})",
                    a.frame, a.rect.width, a.rect.height
                )));
            }
        }
        Ok(Self { anchors })
    }

    pub fn anchors(&self) -> &[Anchor] {
        &self.anchors
    }

    /// Interpolated crop rect for `frame`. Pure and total: holds the first
    /// anchor's rect before the first anchor, the last anchor's rect after
    /// the last, and lerps each component independently in between. At an
    /// anchor frame the anchor's rect is returned bit-exact.
    pub fn rect_at(&self, frame: u64) -> Rect {
        let idx = self.anchors.partition_point(|a| a.frame <= frame);
        if idx == 0 {
            return self.anchors[0].rect;
        }

        let a = &self.anchors[idx - 1];
        if a.frame == frame || idx == self.anchors.len() {
            return a.rect;
        }

        let b = &self.anchors[idx];
        let t = ((frame - a.frame) as f64) / ((b.frame - a.frame) as f64);
        Rect::lerp(&a.rect, &b.rect, t)
    }
}
