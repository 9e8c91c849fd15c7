use image::{RgbaImage, imageops};

use crate::{
    error::{PancropError, PancropResult},
    geom::{Rect, RoundingMode},
    track::KeyframeTrack,
};

#[derive(Clone, Copy, Debug, Default)]
pub struct CropConfig {
    /// Fixed output size. When `None`, the size is taken from frame 0's
    /// rounded crop and enforced for every subsequent frame.
    pub output_size: Option<(u32, u32)>,
    pub rounding: RoundingMode,
}

impl CropConfig {
    pub fn validate(&self) -> PancropResult<()> {
        if let Some((w, h)) = self.output_size
            && (w == 0 || h == 0)
        {
            return Err(PancropError::configuration(
                "output size must be non-zero in both dimensions",
            ));
        }
        Ok(())
    }
}

/// One cropped output image, tagged with the source frame it came from.
/// Exclusively owned by the caller.
#[derive(Clone, Debug)]
pub struct CroppedFrame {
    pub index: u64,
    pub image: RgbaImage,
}

/// Crop one frame: round the rect per `rounding`, clamp it into the frame,
/// crop, and rescale to `output_size` if one is given and differs.
///
/// Rounding happens here and nowhere else, so the same (frame, rect) input
/// always produces the same pixels.
#[tracing::instrument(level = "trace", skip(image))]
pub fn crop_frame(
    image: &RgbaImage,
    index: u64,
    rect: Rect,
    rounding: RoundingMode,
    output_size: Option<(u32, u32)>,
) -> PancropResult<CroppedFrame> {
    let (frame_w, frame_h) = image.dimensions();
    let px = rect
        .to_pixels(rounding, frame_w, frame_h)
        .ok_or(PancropError::DegenerateCrop {
            frame: index,
            rect,
            width: frame_w,
            height: frame_h,
        })?;
    tracing::debug!(frame = index, ?px, "cropping");

    let mut cropped = imageops::crop_imm(image, px.x, px.y, px.width, px.height).to_image();
    if let Some((w, h)) = output_size
        && cropped.dimensions() != (w, h)
    {
        tracing::debug!(frame = index, w, h, "resizing to output size");
        cropped = imageops::resize(&cropped, w, h, imageops::FilterType::CatmullRom);
    }

    Ok(CroppedFrame {
        index,
        image: cropped,
    })
}

/// Drives [`KeyframeTrack::rect_at`] across an ordered frame sequence,
/// yielding one `CroppedFrame` per input frame, in order. The first error
/// (degenerate crop, or an error from the frame source itself) is yielded
/// and the iterator is fused; no partial recovery.
pub struct SequenceCropper<'t, I> {
    frames: I,
    track: &'t KeyframeTrack,
    rounding: RoundingMode,
    output_size: Option<(u32, u32)>,
    next_index: u64,
    fused: bool,
}

impl<'t, I> SequenceCropper<'t, I>
where
    I: Iterator<Item = PancropResult<RgbaImage>>,
{
    pub fn process<F>(frames: F, track: &'t KeyframeTrack, config: CropConfig) -> PancropResult<Self>
    where
        F: IntoIterator<IntoIter = I>,
    {
        config.validate()?;
        Ok(Self {
            frames: frames.into_iter(),
            track,
            rounding: config.rounding,
            output_size: config.output_size,
            next_index: 0,
            fused: false,
        })
    }

    /// The uniform output size, once established (explicitly, or from the
    /// first processed frame).
    pub fn output_size(&self) -> Option<(u32, u32)> {
        self.output_size
    }
}

impl<I> Iterator for SequenceCropper<'_, I>
where
    I: Iterator<Item = PancropResult<RgbaImage>>,
{
    type Item = PancropResult<CroppedFrame>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.fused {
            return None;
        }
        let image = match self.frames.next()? {
            Ok(image) => image,
            Err(e) => {
                self.fused = true;
                return Some(Err(e));
            }
        };

        let index = self.next_index;
        self.next_index += 1;

        let rect = self.track.rect_at(index);
        match crop_frame(&image, index, rect, self.rounding, self.output_size) {
            Ok(cropped) => {
                if self.output_size.is_none() {
                    // Resolved from frame 0; the one ordering dependency
                    // in the pipeline.
                    self.output_size = Some(cropped.image.dimensions());
                }
                Some(Ok(cropped))
            }
            Err(e) => {
                self.fused = true;
                Some(Err(e))
            }
        }
    }
}
