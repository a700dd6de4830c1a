//! Output side of the tools: distribution charts and spreadsheet export.

pub mod chart;
pub mod export;
pub mod glyphs;

use std::path::PathBuf;
use thiserror::Error;

/// Errors from writing charts or spreadsheets.
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("failed to write '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("png encoding failed: {0}")]
    Png(#[from] png::EncodingError),
    #[cfg(feature = "gif")]
    #[error("gif encoding failed: {0}")]
    Gif(#[from] gif::EncodingError),
    #[error("xlsx export failed: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),
    #[error("no animation frames: series of length {len} with frame step {step}")]
    EmptyAnimation { len: usize, step: usize },
    #[error("chart dimensions {width}x{height} are too small to draw")]
    CanvasTooSmall { width: u32, height: u32 },
    #[error("chart dimensions {width}x{height} exceed the GIF limit of 65535")]
    TooLargeForGif { width: u32, height: u32 },
}
