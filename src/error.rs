use alloc::string::String;
use enough::StopReason;

use crate::mode::ScreenMode;

/// Errors from asset conversion.
///
/// Every variant except [`ConvertError::Cancelled`] is fatal for the asset
/// being converted; the compiler is expected to abort with the asset name.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ConvertError {
    #[error("{asset}: image uses {found} colors, the mode allows at most {max}")]
    TooManyColors {
        asset: String,
        found: usize,
        max: usize,
    },

    #[error("{asset}: invalid geometry: {reason}")]
    InvalidGeometry { asset: String, reason: String },

    #[error("{asset}: converted image too big ({size} bytes)")]
    ImageTooBig { asset: String, size: usize },

    #[error("{asset}: compression round trip does not reproduce the input")]
    CompressionCorrupted { asset: String },

    #[error("compression failed: {0}")]
    Compression(String),

    #[error("screen mode {0:?} has no image layout")]
    UnsupportedMode(ScreenMode),

    #[error("unsupported pixel layout: {0}")]
    UnsupportedLayout(String),

    #[error("dimensions too large: {width}x{height}")]
    DimensionsTooLarge { width: u32, height: u32 },

    #[error("buffer too small: need {needed} bytes, got {actual}")]
    BufferTooSmall { needed: usize, actual: usize },

    #[error("limit exceeded: {0}")]
    LimitExceeded(String),

    #[error("operation cancelled")]
    Cancelled(StopReason),
}

impl From<StopReason> for ConvertError {
    fn from(r: StopReason) -> Self {
        ConvertError::Cancelled(r)
    }
}

impl ConvertError {
    pub(crate) fn geometry(asset: &str, reason: String) -> Self {
        ConvertError::InvalidGeometry {
            asset: asset.into(),
            reason,
        }
    }
}

/// Recoverable conditions reported while converting.
///
/// These are logged at `warn` level and collected on the
/// [`ConversionContext`](crate::ConversionContext) so the compiler can echo
/// them in its own diagnostics.
#[derive(Clone, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum ConversionWarning {
    /// The requested mode has no layout; a blank 8x8 standard bitmap was
    /// produced instead.
    UnsupportedMode { asset: String, mode: ScreenMode },
}
