use std::path::{Path, PathBuf};

use anyhow::Context as _;
use image::RgbaImage;

use crate::error::{PancropError, PancropResult};

pub fn load_frame(path: &Path) -> PancropResult<RgbaImage> {
    let img = image::open(path)
        .with_context(|| format!("open frame '{}'", path.display()))
        .map_err(PancropError::Io)?;
    Ok(img.to_rgba8())
}

/// Image dimensions without decoding the pixel data (header read only).
pub fn probe_size(path: &Path) -> PancropResult<(u32, u32)> {
    image::image_dimensions(path)
        .with_context(|| format!("probe frame '{}'", path.display()))
        .map_err(PancropError::Io)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Png,
    Jpeg,
}

impl OutputFormat {
    pub fn extension(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpg",
        }
    }
}

pub fn save_frame(image: &RgbaImage, path: &Path, format: OutputFormat) -> PancropResult<()> {
    ensure_parent_dir(path)?;
    let result = match format {
        OutputFormat::Png => image.save_with_format(path, image::ImageFormat::Png),
        // JPEG has no alpha channel
        OutputFormat::Jpeg => image::DynamicImage::ImageRgba8(image.clone())
            .to_rgb8()
            .save_with_format(path, image::ImageFormat::Jpeg),
    };
    result
        .with_context(|| format!("save frame '{}'", path.display()))
        .map_err(PancropError::Io)
}

pub fn ensure_parent_dir(path: &Path) -> PancropResult<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output directory '{}'", parent.display()))
            .map_err(PancropError::Io)?;
    }
    Ok(())
}

/// Output file name for the `seq`-th cropped frame of `src`:
/// `{prefix}{stem}-{seq:05}.{ext}`.
pub fn output_name(src: &Path, prefix: &str, seq: u64, format: OutputFormat) -> PathBuf {
    let stem = src
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("frame");
    PathBuf::from(format!(
        "{prefix}{stem}-{seq:05}.{}",
        format.extension()
    ))
}
