//! The VIC-II hardware palette and nearest-color matching.
//!
//! Matching is a linear scan: with sixteen entries nothing smarter pays off.

use rgb::{RGB8, RGBA8};

/// One physical color of the video chip.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PaletteEntry {
    /// Hardware color index, as written to color registers and color RAM.
    pub index: u8,
    pub color: RGB8,
    pub name: &'static str,
}

const fn entry(index: u8, r: u8, g: u8, b: u8, name: &'static str) -> PaletteEntry {
    PaletteEntry {
        index,
        color: RGB8 { r, g, b },
        name,
    }
}

const VIC2_COLORS: [PaletteEntry; 16] = [
    entry(0, 0x00, 0x00, 0x00, "BLACK"),
    entry(1, 0xff, 0xff, 0xff, "WHITE"),
    entry(2, 0x80, 0x00, 0x00, "RED"),
    entry(3, 0xaa, 0xff, 0xe6, "CYAN"),
    entry(4, 0xcc, 0x44, 0xcc, "VIOLET"),
    entry(5, 0x00, 0xcc, 0x55, "GREEN"),
    entry(6, 0x00, 0x00, 0xaa, "BLUE"),
    entry(7, 0xee, 0xee, 0x77, "YELLOW"),
    entry(8, 0xa1, 0x68, 0x3c, "ORANGE"),
    entry(9, 0xdd, 0x88, 0x65, "BROWN"),
    entry(10, 0xff, 0x77, 0x77, "LIGHT_RED"),
    entry(11, 0x33, 0x33, 0x33, "DARK_GREY"),
    entry(12, 0x77, 0x77, 0x77, "GREY"),
    entry(13, 0xaa, 0xff, 0x66, "LIGHT_GREEN"),
    entry(14, 0x00, 0x88, 0xff, "LIGHT_BLUE"),
    entry(15, 0xbb, 0xbb, 0xbb, "LIGHT_GREY"),
];

/// Number of hardware colors.
pub const COLOR_COUNT: usize = 16;

/// A fixed, ordered set of hardware colors.
#[derive(Clone, Copy, Debug)]
pub struct HardwarePalette {
    entries: &'static [PaletteEntry],
}

impl HardwarePalette {
    /// The sixteen VIC-II colors.
    pub const VIC2: HardwarePalette = HardwarePalette {
        entries: &VIC2_COLORS,
    };

    pub fn entries(&self) -> &'static [PaletteEntry] {
        self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entry for a hardware index, if the palette covers it.
    pub fn get(&self, index: u8) -> Option<PaletteEntry> {
        self.entries.get(index as usize).copied()
    }

    /// The first `n` entries only (at least one).
    ///
    /// Multicolor character cells can only address colors 0-7, so that mode
    /// matches against `VIC2.span(8)`.
    pub fn span(&self, n: usize) -> HardwarePalette {
        let n = n.clamp(1, self.entries.len());
        HardwarePalette {
            entries: &self.entries[..n],
        }
    }

    /// Closest entry by squared RGB distance. Ties go to the lowest index.
    pub fn nearest(&self, color: RGB8) -> PaletteEntry {
        let mut best = self.entries[0];
        let mut best_distance = u32::MAX;
        for candidate in self.entries {
            let d = distance(candidate.color, color);
            if d < best_distance {
                best_distance = d;
                best = *candidate;
            }
        }
        best
    }

    /// Hardware index of [`nearest`](Self::nearest).
    pub fn nearest_index(&self, color: RGB8) -> u8 {
        self.nearest(color).index
    }
}

/// Squared euclidean distance over red, green and blue.
pub fn distance(a: RGB8, b: RGB8) -> u32 {
    let dr = i32::from(a.r) - i32::from(b.r);
    let dg = i32::from(a.g) - i32::from(b.g);
    let db = i32::from(a.b) - i32::from(b.b);
    (dr * dr + dg * dg + db * db) as u32
}

/// Whether a sample takes part in color matching.
#[inline]
pub(crate) fn is_opaque(px: RGBA8) -> bool {
    px.a == 255
}

#[inline]
pub(crate) fn rgb_of(px: RGBA8) -> RGB8 {
    RGB8 {
        r: px.r,
        g: px.g,
        b: px.b,
    }
}
