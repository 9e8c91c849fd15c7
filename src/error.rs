use crate::geom::Rect;

pub type PancropResult<T> = Result<T, PancropError>;

#[derive(thiserror::Error, Debug)]
pub enum PancropError {
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error(
        "degenerate crop at frame {frame}: requested rect {rect:?} cannot be realized within a {width}x{height} frame"
    )]
    DegenerateCrop {
        frame: u64,
        rect: Rect,
        width: u32,
        height: u32,
    },

    #[error("i/o error: {0:#}")]
    Io(anyhow::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl PancropError {
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }
}
