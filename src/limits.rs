use alloc::format;
use core::fmt::Display;

use crate::error::ConvertError;

/// Resource limits for conversions.
///
/// Source limits are checked before any pixel is read; output limits are
/// checked once the mode's size formula is known, before the buffer is
/// allocated. All fields default to `None` (no limit).
#[derive(Clone, Debug, Default)]
pub struct Limits {
    pub max_source_width: Option<u32>,
    pub max_source_height: Option<u32>,
    /// Largest converted frame, its own header included.
    pub max_frame_bytes: Option<usize>,
    /// Largest finished asset before compression: one frame, or a whole
    /// sheet with its shared header.
    pub max_asset_bytes: Option<usize>,
    /// Most frames a sheet or tile set may expand to, rolled copies
    /// included.
    pub max_frames: Option<usize>,
}

impl Limits {
    pub(crate) fn check_source(&self, width: u32, height: u32) -> Result<(), ConvertError> {
        exceeds("source width", width, self.max_source_width)?;
        exceeds("source height", height, self.max_source_height)
    }

    /// One frame of `bytes`, converted on its own.
    pub(crate) fn check_frame(&self, bytes: usize) -> Result<(), ConvertError> {
        exceeds("frame size", bytes, self.max_frame_bytes)?;
        exceeds("asset size", bytes, self.max_asset_bytes)
    }

    /// A sheet of `frames` frames of `frame_bytes` each, `total` bytes in all.
    pub(crate) fn check_sheet(
        &self,
        frames: usize,
        frame_bytes: usize,
        total: usize,
    ) -> Result<(), ConvertError> {
        exceeds("frame count", frames, self.max_frames)?;
        exceeds("frame size", frame_bytes, self.max_frame_bytes)?;
        exceeds("asset size", total, self.max_asset_bytes)
    }
}

fn exceeds<T: PartialOrd + Display>(
    what: &str,
    value: T,
    limit: Option<T>,
) -> Result<(), ConvertError> {
    match limit {
        Some(max) if value > max => Err(ConvertError::LimitExceeded(format!(
            "{what} {value} exceeds limit {max}"
        ))),
        _ => Ok(()),
    }
}
