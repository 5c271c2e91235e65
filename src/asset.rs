//! Converted asset buffers.

use alloc::format;
use alloc::vec;
use alloc::vec::Vec;

use crate::color::PaletteEntry;
use crate::error::ConvertError;
use crate::mode::{HEADER_SIZE, ScreenMode, frames_size};

/// What a [`ConvertedAsset`] holds.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AssetKind {
    /// One frame with its own header.
    Image(ScreenMode),
    /// `[count, width_lo, width_hi]` followed by `count` frames.
    Frames(ScreenMode),
    /// Like [`AssetKind::Frames`], cut along a tile grid.
    Tileset { mode: ScreenMode, first_gid: u32 },
    /// 64-byte hardware sprite.
    Sprite { multicolor: bool },
}

/// A hardware-native buffer ready to be stored in the program image.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConvertedAsset {
    data: Vec<u8>,
    pub kind: AssetKind,
    pub frame_width: u32,
    pub frame_height: u32,
    pub frame_count: usize,
    /// Bytes per frame, header included.
    pub frame_size: usize,
    /// Hardware colors of the source, in extraction order.
    pub palette: Vec<PaletteEntry>,
    /// Length before compression, when the buffer is compressed.
    pub uncompressed_size: Option<usize>,
}

impl ConvertedAsset {
    pub(crate) fn new(kind: AssetKind, data: Vec<u8>) -> Self {
        let frame_size = data.len();
        Self {
            data,
            kind,
            frame_width: 0,
            frame_height: 0,
            frame_count: 1,
            frame_size,
            palette: Vec::new(),
            uncompressed_size: None,
        }
    }

    pub(crate) fn with_frames(mut self, width: u32, height: u32, count: usize, size: usize) -> Self {
        self.frame_width = width;
        self.frame_height = height;
        self.frame_count = count;
        self.frame_size = size;
        self
    }

    pub(crate) fn with_palette(mut self, palette: Vec<PaletteEntry>) -> Self {
        self.palette = palette;
        self
    }

    pub(crate) fn set_compressed(&mut self, packed: Vec<u8>) {
        self.uncompressed_size = Some(self.data.len());
        self.data = packed;
    }

    /// A zeroed image with a valid header. Only bitmap modes can be blank.
    pub fn blank(mode: ScreenMode, width: u32, height: u32) -> Result<Self, ConvertError> {
        let size = blank_frame_size(mode, width, height)?;
        let mut data = vec![0u8; size];
        write_image_header(&mut data, width, height);
        Ok(Self::new(AssetKind::Image(mode), data).with_frames(width, height, 1, size))
    }

    /// `count` zeroed frames behind a multi-frame header.
    pub fn blank_frames(
        mode: ScreenMode,
        count: usize,
        width: u32,
        height: u32,
    ) -> Result<Self, ConvertError> {
        let frame = blank_frame_size(mode, width, height)?;
        check_frames("blank images", count, frame)?;
        let mut data = vec![0u8; frames_size(count, frame)];
        write_frames_header(&mut data, count, width);
        for chunk in data[HEADER_SIZE..].chunks_exact_mut(frame) {
            write_image_header(chunk, width, height);
        }
        Ok(Self::new(AssetKind::Frames(mode), data).with_frames(width, height, count, frame))
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Hand the bytes over to storage.
    pub fn into_data(self) -> Vec<u8> {
        self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn is_compressed(&self) -> bool {
        self.uncompressed_size.is_some()
    }

    pub fn mode(&self) -> Option<ScreenMode> {
        match self.kind {
            AssetKind::Image(mode) | AssetKind::Frames(mode) => Some(mode),
            AssetKind::Tileset { mode, .. } => Some(mode),
            AssetKind::Sprite { .. } => None,
        }
    }
}

fn blank_frame_size(mode: ScreenMode, width: u32, height: u32) -> Result<usize, ConvertError> {
    let Some(enc) = mode.encoding() else {
        return Err(ConvertError::UnsupportedMode(mode));
    };
    if width == 0 || height == 0 || width % enc.cell_width != 0 || height % enc.cell_height != 0 {
        return Err(ConvertError::geometry(
            "blank image",
            format!("{width}x{height} is not a multiple of the {}x{} cell", enc.cell_width, enc.cell_height),
        ));
    }
    if width > 0xffff || height > 0xff {
        return Err(ConvertError::geometry(
            "blank image",
            format!("{width}x{height} does not fit the image header"),
        ));
    }
    mode.blank_size(width, height)
        .ok_or(ConvertError::UnsupportedMode(mode))
}

/// `[width_lo, width_hi, height]`.
pub(crate) fn write_image_header(buf: &mut [u8], width: u32, height: u32) {
    buf[0] = (width & 0xff) as u8;
    buf[1] = ((width >> 8) & 0xff) as u8;
    buf[2] = (height & 0xff) as u8;
}

/// `[count, width_lo, width_hi]`.
pub(crate) fn write_frames_header(buf: &mut [u8], count: usize, width: u32) {
    buf[0] = count as u8;
    buf[1] = (width & 0xff) as u8;
    buf[2] = ((width >> 8) & 0xff) as u8;
}

/// Frame count must fit the header byte and the frame data 16 bits.
pub(crate) fn check_frames(asset: &str, count: usize, frame_size: usize) -> Result<(), ConvertError> {
    let size = count.saturating_mul(frame_size);
    if count > 0xff || size > 0xffff {
        return Err(ConvertError::ImageTooBig {
            asset: asset.into(),
            size,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_standard_bitmap() {
        let asset = ConvertedAsset::blank(ScreenMode::BitmapStandard, 8, 8).unwrap();
        assert_eq!(asset.data(), &[8, 0, 8, 0, 0, 0, 0, 0, 0, 0, 0, 0]);
        assert_eq!(asset.mode(), Some(ScreenMode::BitmapStandard));
        assert!(!asset.is_compressed());
    }

    #[test]
    fn blank_multicolor_bitmap_size() {
        let asset = ConvertedAsset::blank(ScreenMode::BitmapMulticolor, 160, 200).unwrap();
        assert_eq!(asset.len(), 3 + 8000 + 2000 + 1);
        assert_eq!(&asset.data()[..3], &[160, 0, 200]);
    }

    #[test]
    fn blank_rejects_modes_without_layout() {
        assert!(matches!(
            ConvertedAsset::blank(ScreenMode::Fli, 8, 8),
            Err(ConvertError::UnsupportedMode(ScreenMode::Fli))
        ));
        assert!(matches!(
            ConvertedAsset::blank(ScreenMode::TilemapStandard, 8, 8),
            Err(ConvertError::UnsupportedMode(_))
        ));
        assert!(matches!(
            ConvertedAsset::blank(ScreenMode::BitmapStandard, 10, 8),
            Err(ConvertError::InvalidGeometry { .. })
        ));
    }

    #[test]
    fn blank_frames_repeat_headers() {
        let asset = ConvertedAsset::blank_frames(ScreenMode::BitmapStandard, 3, 16, 8).unwrap();
        let frame = 3 + 16 + 2;
        assert_eq!(asset.len(), 3 + 3 * frame);
        assert_eq!(&asset.data()[..3], &[3, 16, 0]);
        for i in 0..3 {
            let start = 3 + i * frame;
            assert_eq!(&asset.data()[start..start + 3], &[16, 0, 8]);
        }
    }

    #[test]
    fn frame_totals_are_bounded() {
        assert!(check_frames("ok", 255, 257).is_ok());
        assert!(matches!(
            check_frames("many", 256, 1),
            Err(ConvertError::ImageTooBig { .. })
        ));
        match check_frames("big", 2, 40_000) {
            Err(ConvertError::ImageTooBig { asset, size }) => {
                assert_eq!(asset, "big");
                assert_eq!(size, 80_000);
            }
            other => panic!("expected ImageTooBig, got {other:?}"),
        }
    }
}
