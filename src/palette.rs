//! Region palette extraction.

use alloc::vec::Vec;
use imgref::ImgRef;
use rgb::RGBA8;

use crate::color::{COLOR_COUNT, HardwarePalette, PaletteEntry, is_opaque, rgb_of};
use crate::error::ConvertError;

/// Builds the list of distinct hardware colors used by a region.
#[derive(Clone, Copy, Debug)]
pub struct PaletteExtractor {
    palette: HardwarePalette,
    exact: bool,
}

/// Hardware colors found in a region.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExtractedPalette {
    /// Distinct colors, most frequent first unless extracted in exact order.
    pub entries: Vec<PaletteEntry>,
    /// Opaque pixel count per hardware index.
    pub counts: [u32; COLOR_COUNT],
    /// At least one pixel had alpha below 255.
    pub transparent: bool,
}

impl PaletteExtractor {
    pub fn new(palette: HardwarePalette) -> Self {
        Self {
            palette,
            exact: false,
        }
    }

    /// Keep colors in the order they first appear instead of sorting by
    /// frequency.
    pub fn exact(mut self, exact: bool) -> Self {
        self.exact = exact;
        self
    }

    /// Tally every pixel of `region`.
    pub fn extract(&self, region: ImgRef<'_, RGBA8>) -> ExtractedPalette {
        let mut counts = [0u32; COLOR_COUNT];
        let mut order: Vec<PaletteEntry> = Vec::new();
        let mut transparent = false;

        for row in region.rows() {
            for &px in row {
                if !is_opaque(px) {
                    transparent = true;
                    continue;
                }
                let entry = self.palette.nearest(rgb_of(px));
                if counts[entry.index as usize] == 0 {
                    order.push(entry);
                }
                counts[entry.index as usize] += 1;
            }
        }

        if !self.exact {
            // stable: equal counts keep first-appearance order
            order.sort_by(|a, b| counts[b.index as usize].cmp(&counts[a.index as usize]));
        }

        ExtractedPalette {
            entries: order,
            counts,
            transparent,
        }
    }
}

impl ExtractedPalette {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Hardware index of the `n`th entry.
    pub fn index(&self, n: usize) -> Option<u8> {
        self.entries.get(n).map(|e| e.index)
    }

    pub fn contains(&self, index: u8) -> bool {
        self.entries.iter().any(|e| e.index == index)
    }

    /// Fail with [`ConvertError::TooManyColors`] if more than `max` colors.
    pub fn check_budget(&self, asset: &str, max: usize) -> Result<(), ConvertError> {
        if self.entries.len() > max {
            return Err(ConvertError::TooManyColors {
                asset: asset.into(),
                found: self.entries.len(),
                max,
            });
        }
        Ok(())
    }
}
