//! Screen modes, their cell geometry, and the size of their image buffers.

/// Screen modes of the VIC-II as the compiler names them.
///
/// Only the first four have an image layout; the rest are accepted so the
/// converter can warn and substitute a default asset instead of failing the
/// compilation.
#[non_exhaustive]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ScreenMode {
    /// 320x200 hires bitmap, two colors per 8x8 cell.
    BitmapStandard,
    /// 160x200 multicolor bitmap, four colors per 4x8 cell.
    BitmapMulticolor,
    /// 40x25 character map, one foreground color per cell.
    TilemapStandard,
    /// 40x25 multicolor character map.
    TilemapMulticolor,
    /// Extended background color character mode.
    TilemapExtended,
    Fli,
    Afli,
    Ifli,
    Mci,
    Ufli,
    Shfli,
}

/// Whether cells are written as bitmap data or as tile references.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CellLayout {
    Bitmap,
    Tilemap,
}

/// Everything the cell encoder and the assembler need to know about a mode.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EncodingMode {
    /// Cell width in source pixels.
    pub cell_width: u32,
    /// Cell height in source pixels (one plane byte per row).
    pub cell_height: u32,
    pub bits_per_pixel: u8,
    /// Distinct hardware colors allowed over the whole converted region.
    pub max_colors: usize,
    /// Colors a single cell can show (2 or 4).
    pub cell_colors: usize,
    /// How many hardware palette entries the mode can address.
    pub palette_span: usize,
    pub layout: CellLayout,
}

const STANDARD_BITMAP: EncodingMode = EncodingMode {
    cell_width: 8,
    cell_height: 8,
    bits_per_pixel: 1,
    max_colors: 16,
    cell_colors: 2,
    palette_span: 16,
    layout: CellLayout::Bitmap,
};

const MULTICOLOR_BITMAP: EncodingMode = EncodingMode {
    cell_width: 4,
    cell_height: 8,
    bits_per_pixel: 2,
    max_colors: 16,
    cell_colors: 4,
    palette_span: 16,
    layout: CellLayout::Bitmap,
};

const STANDARD_TILEMAP: EncodingMode = EncodingMode {
    layout: CellLayout::Tilemap,
    ..STANDARD_BITMAP
};

const MULTICOLOR_TILEMAP: EncodingMode = EncodingMode {
    max_colors: 8,
    palette_span: 8,
    layout: CellLayout::Tilemap,
    ..MULTICOLOR_BITMAP
};

/// Header bytes in front of every image frame.
pub const HEADER_SIZE: usize = 3;

impl ScreenMode {
    /// The encoding descriptor, or `None` for modes without an image layout.
    pub fn encoding(&self) -> Option<EncodingMode> {
        match self {
            Self::BitmapStandard => Some(STANDARD_BITMAP),
            Self::BitmapMulticolor => Some(MULTICOLOR_BITMAP),
            Self::TilemapStandard => Some(STANDARD_TILEMAP),
            Self::TilemapMulticolor => Some(MULTICOLOR_TILEMAP),
            _ => None,
        }
    }

    pub fn is_supported(&self) -> bool {
        self.encoding().is_some()
    }

    /// Size in bytes of one converted frame of `width` x `height` pixels.
    ///
    /// `colors` is the number of distinct colors in the source; standard
    /// character maps drop their per-cell color plane when it is two or less.
    /// Geometry must already be validated against the cell size.
    pub fn frame_size(&self, width: u32, height: u32, colors: usize) -> Option<usize> {
        let w = width as usize;
        let h = height as usize;
        match self {
            Self::BitmapStandard => Some(HEADER_SIZE + (w >> 3) * h + (w >> 3) * (h >> 3)),
            Self::BitmapMulticolor => {
                Some(HEADER_SIZE + (w >> 2) * h + 2 * ((w >> 2) * (h >> 3)) + 1)
            }
            Self::TilemapStandard => {
                let cells = (w >> 3) * (h >> 3);
                if colors <= 2 {
                    Some(HEADER_SIZE + cells + 1)
                } else {
                    Some(HEADER_SIZE + 2 * cells)
                }
            }
            Self::TilemapMulticolor => {
                let cells = (w >> 2) * (h >> 3);
                Some(HEADER_SIZE + 2 * cells + 3)
            }
            _ => None,
        }
    }

    /// Size of a blank image. Only bitmap modes can be created empty.
    pub fn blank_size(&self, width: u32, height: u32) -> Option<usize> {
        match self {
            Self::BitmapStandard | Self::BitmapMulticolor => self.frame_size(width, height, 0),
            _ => None,
        }
    }
}

/// Size of a multi-frame buffer: shared header plus `frames` frames.
pub fn frames_size(frames: usize, frame_size: usize) -> usize {
    HEADER_SIZE + frames * frame_size
}
