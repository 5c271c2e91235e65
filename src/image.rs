//! Decoded source rasters.

use alloc::vec::Vec;
use imgref::{ImgRef, ImgVec};
use rgb::RGBA8;

use crate::error::ConvertError;
use crate::pixel::PixelLayout;

/// A decoded RGBA raster, row-major, top to bottom, left to right.
///
/// Samples with alpha 0 are normalized to transparent black on construction.
/// All pixel access goes through bounds-checked accessors or `imgref`
/// sub-images; the converter never does raw offset arithmetic on the buffer.
#[derive(Clone, Debug)]
pub struct SourceImage {
    pixels: ImgVec<RGBA8>,
}

impl SourceImage {
    /// Build from packed bytes in the given layout.
    pub fn from_bytes(
        data: &[u8],
        width: u32,
        height: u32,
        layout: PixelLayout,
    ) -> Result<Self, ConvertError> {
        if width == 0 || height == 0 {
            return Err(ConvertError::geometry(
                "source image",
                alloc::format!("{width}x{height} has no pixels"),
            ));
        }
        let bpp = layout.bytes_per_pixel();
        let count = (width as usize)
            .checked_mul(height as usize)
            .ok_or(ConvertError::DimensionsTooLarge { width, height })?;
        let expected = count
            .checked_mul(bpp)
            .ok_or(ConvertError::DimensionsTooLarge { width, height })?;
        if data.len() < expected {
            return Err(ConvertError::BufferTooSmall {
                needed: expected,
                actual: data.len(),
            });
        }

        let mut pixels = Vec::with_capacity(count);
        for chunk in data[..expected].chunks_exact(bpp) {
            let alpha = if bpp == 4 { chunk[3] } else { 255 };
            pixels.push(normalize(RGBA8::new(chunk[0], chunk[1], chunk[2], alpha)));
        }
        Ok(Self {
            pixels: ImgVec::new(pixels, width as usize, height as usize),
        })
    }

    /// Build from a decoder's raw output, where `depth` is the channel count.
    pub fn from_depth(data: &[u8], width: u32, height: u32, depth: usize) -> Result<Self, ConvertError> {
        let layout = PixelLayout::from_depth(depth).ok_or_else(|| {
            ConvertError::UnsupportedLayout(alloc::format!("{depth} channels (expected 3 or 4)"))
        })?;
        Self::from_bytes(data, width, height, layout)
    }

    /// Build from typed pixels.
    pub fn from_pixels(pixels: Vec<RGBA8>, width: u32, height: u32) -> Result<Self, ConvertError> {
        let needed = (width as usize)
            .checked_mul(height as usize)
            .ok_or(ConvertError::DimensionsTooLarge { width, height })?;
        if width == 0 || height == 0 {
            return Err(ConvertError::geometry(
                "source image",
                alloc::format!("{width}x{height} has no pixels"),
            ));
        }
        if pixels.len() < needed {
            return Err(ConvertError::BufferTooSmall {
                needed,
                actual: pixels.len(),
            });
        }
        let mut pixels = pixels;
        pixels.truncate(needed);
        pixels.iter_mut().for_each(|p| *p = normalize(*p));
        Ok(Self {
            pixels: ImgVec::new(pixels, width as usize, height as usize),
        })
    }

    pub fn width(&self) -> u32 {
        self.pixels.width() as u32
    }

    pub fn height(&self) -> u32 {
        self.pixels.height() as u32
    }

    /// Pixel at `(x, y)`, or `None` outside the raster.
    pub fn pixel(&self, x: u32, y: u32) -> Option<RGBA8> {
        if x >= self.width() || y >= self.height() {
            return None;
        }
        let stride = self.pixels.stride();
        self.pixels
            .buf()
            .get(y as usize * stride + x as usize)
            .copied()
    }

    /// One channel (0 = red .. 3 = alpha) of the pixel at `row`, `column`.
    pub fn sample(&self, row: u32, column: u32, channel: usize) -> Option<u8> {
        let px = self.pixel(column, row)?;
        match channel {
            0 => Some(px.r),
            1 => Some(px.g),
            2 => Some(px.b),
            3 => Some(px.a),
            _ => None,
        }
    }

    /// Whole raster as an `imgref` view.
    pub fn as_imgref(&self) -> ImgRef<'_, RGBA8> {
        self.pixels.as_ref()
    }

    /// A rectangular window, or `None` if it does not fit inside the raster.
    pub fn region(&self, x: u32, y: u32, width: u32, height: u32) -> Option<ImgRef<'_, RGBA8>> {
        let right = x.checked_add(width)?;
        let bottom = y.checked_add(height)?;
        if right > self.width() || bottom > self.height() {
            return None;
        }
        Some(
            self.pixels
                .sub_image(x as usize, y as usize, width as usize, height as usize),
        )
    }

    /// Whether any pixel is not fully opaque.
    pub fn has_transparency(&self) -> bool {
        self.pixels.buf().iter().any(|p| p.a < 255)
    }

    /// Mirror left to right.
    pub fn flipped_x(&self) -> SourceImage {
        self.remap(|x, y, w, _| (w - 1 - x, y))
    }

    /// Mirror top to bottom.
    pub fn flipped_y(&self) -> SourceImage {
        self.remap(|x, y, _, h| (x, h - 1 - y))
    }

    /// Rotate every row by one pixel, wrapping around the edge.
    ///
    /// `right` moves pixels towards higher x; the rightmost column wraps to
    /// column 0.
    pub fn rolled_x(&self, right: bool) -> SourceImage {
        self.remap(move |x, y, w, _| {
            if right {
                ((x + w - 1) % w, y)
            } else {
                ((x + 1) % w, y)
            }
        })
    }

    /// Build a same-sized raster where output `(x, y)` reads `f(x, y, w, h)`.
    fn remap(&self, f: impl Fn(usize, usize, usize, usize) -> (usize, usize)) -> SourceImage {
        let w = self.pixels.width();
        let h = self.pixels.height();
        let stride = self.pixels.stride();
        let src = self.pixels.buf();
        let mut out = Vec::with_capacity(w * h);
        for y in 0..h {
            for x in 0..w {
                let (sx, sy) = f(x, y, w, h);
                out.push(src[sy * stride + sx]);
            }
        }
        SourceImage {
            pixels: ImgVec::new(out, w, h),
        }
    }
}

fn normalize(px: RGBA8) -> RGBA8 {
    if px.a == 0 {
        RGBA8::new(0, 0, 0, 0)
    } else {
        px
    }
}
