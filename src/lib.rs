#![forbid(unsafe_code)]

pub mod cropper;
pub mod cropspec;
pub mod error;
pub mod geom;
pub mod io;
pub mod panspec;
pub mod track;

pub use cropper::{CropConfig, CroppedFrame, SequenceCropper, crop_frame};
pub use cropspec::CropSpec;
pub use error::{PancropError, PancropResult};
pub use geom::{Lerp, PixelRect, Rect, RoundingMode};
pub use io::{OutputFormat, load_frame, output_name, probe_size, save_frame};
pub use panspec::{PanSpec, load_pan_specs, resolve_anchors};
pub use track::{Anchor, KeyframeTrack};
