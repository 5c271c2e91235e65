/// Pixel memory layout of an input raster.
#[non_exhaustive]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PixelLayout {
    /// 3 channels, 8-bit RGB. Every pixel is opaque.
    Rgb8,
    /// 4 channels, 8-bit RGBA. Alpha below 255 marks a transparent pixel.
    Rgba8,
}

impl PixelLayout {
    /// Bytes per pixel for this layout.
    pub fn bytes_per_pixel(&self) -> usize {
        match self {
            Self::Rgb8 => 3,
            Self::Rgba8 => 4,
        }
    }

    /// Number of channels.
    pub fn channels(&self) -> usize {
        self.bytes_per_pixel()
    }

    /// Layout for a decoder's channel depth (3 or 4).
    pub fn from_depth(depth: usize) -> Option<Self> {
        match depth {
            3 => Some(Self::Rgb8),
            4 => Some(Self::Rgba8),
            _ => None,
        }
    }
}
