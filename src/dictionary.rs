//! Deduplicating tile dictionary shared by all character-mode conversions.

use alloc::vec::Vec;

use crate::cell::EncodedCell;
use crate::font::{FONT_ALPHA, GLYPH_COUNT};
use crate::plane::pixel_distance;

/// Slots in a VIC-II character set.
pub const SLOT_COUNT: usize = 256;

/// The 8 plane bytes of a tile. Equality and distance are all that matter.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct TileDescriptor(pub [u8; 8]);

/// Up to 256 tile shapes, assigned once and never moved.
///
/// Slots 0..64 hold the bundled glyph set. New shapes are appended; once the
/// dictionary is full, an unknown shape resolves to the nearest existing one.
#[derive(Clone, Debug)]
pub struct TileDictionary {
    slots: Vec<TileDescriptor>,
    overflowed: usize,
}

impl Default for TileDictionary {
    fn default() -> Self {
        Self::with_glyphs()
    }
}

impl TileDictionary {
    /// Empty dictionary with no seeded glyphs.
    pub fn empty() -> Self {
        Self {
            slots: Vec::with_capacity(SLOT_COUNT),
            overflowed: 0,
        }
    }

    /// Dictionary seeded with the bundled glyph set.
    pub fn with_glyphs() -> Self {
        let mut dict = Self::empty();
        dict.slots
            .extend(FONT_ALPHA.iter().map(|&g| TileDescriptor(g)));
        debug_assert_eq!(dict.slots.len(), GLYPH_COUNT);
        dict
    }

    /// Slot for an encoded cell's shape.
    pub fn register(&mut self, cell: &EncodedCell) -> u8 {
        self.register_plane(TileDescriptor(*cell.plane()), cell.bits_per_pixel())
    }

    /// Slot for a raw shape; `bits_per_pixel` decides how nearest-match
    /// distance counts pixels.
    pub fn register_plane(&mut self, tile: TileDescriptor, bits_per_pixel: u8) -> u8 {
        if let Some(slot) = self.find(&tile) {
            return slot;
        }
        if self.slots.len() < SLOT_COUNT {
            let slot = self.slots.len() as u8;
            self.slots.push(tile);
            log::trace!("tile {:02x?} -> new slot {slot}", tile.0);
            return slot;
        }

        let slot = self.nearest(&tile, bits_per_pixel);
        self.overflowed += 1;
        log::debug!("tile dictionary full, reusing slot {slot}");
        slot
    }

    /// Exact match lookup.
    pub fn find(&self, tile: &TileDescriptor) -> Option<u8> {
        self.slots.iter().position(|t| t == tile).map(|i| i as u8)
    }

    /// Slot whose shape differs from `tile` in the fewest pixels, lowest slot
    /// on ties.
    fn nearest(&self, tile: &TileDescriptor, bits_per_pixel: u8) -> u8 {
        let mut best = 0usize;
        let mut best_distance = u32::MAX;
        for (i, t) in self.slots.iter().enumerate() {
            let d = pixel_distance(&tile.0, &t.0, bits_per_pixel);
            if d < best_distance {
                best_distance = d;
                best = i;
            }
        }
        best as u8
    }

    pub fn get(&self, slot: u8) -> Option<&TileDescriptor> {
        self.slots.get(slot as usize)
    }

    /// Slots in use.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.slots.len() >= SLOT_COUNT
    }

    /// Next slot an unknown shape would take, if any.
    pub fn first_free(&self) -> Option<u8> {
        (!self.is_full()).then_some(self.slots.len() as u8)
    }

    /// Shapes that were mapped to an approximate slot because the dictionary
    /// was full.
    pub fn overflowed(&self) -> usize {
        self.overflowed
    }

    /// Full character set image, 8 bytes per slot, unused slots zeroed.
    pub fn charset(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(SLOT_COUNT * 8);
        for tile in &self.slots {
            out.extend_from_slice(&tile.0);
        }
        out.resize(SLOT_COUNT * 8, 0);
        out
    }
}
