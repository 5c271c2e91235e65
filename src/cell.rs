//! Conversion of one mode-sized cell into a pixel plane and color attributes.
//!
//! All four image modes go through [`CellEncoder`]; what differs between them
//! is the [`EncodingMode`] (geometry, bits per pixel, colors per cell) and the
//! [`CellHint`] (where the background comes from, which colors are fixed).

use imgref::ImgRef;
use rgb::RGBA8;

use crate::color::{COLOR_COUNT, HardwarePalette, is_opaque, rgb_of};
use crate::mode::EncodingMode;
use crate::plane::{expand_bits_to_byte, pack_row};

/// Rows in every cell the VIC-II knows about.
pub const CELL_ROWS: usize = 8;

/// Where a cell's background color comes from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Background {
    /// Most frequent color of the cell (hires bitmap).
    PerCell,
    /// One background for the whole image (multicolor and character modes).
    Shared(u8),
}

/// Caller-provided constraints for one cell.
#[derive(Clone, Copy, Debug)]
pub struct CellHint<'a> {
    pub background: Background,
    /// Colors pinned to roles 1, 2, .. before frequency ranking fills the rest.
    pub fixed: &'a [u8],
}

impl CellHint<'static> {
    pub const PER_CELL: CellHint<'static> = CellHint {
        background: Background::PerCell,
        fixed: &[],
    };

    pub fn shared(background: u8) -> Self {
        CellHint {
            background: Background::Shared(background),
            fixed: &[],
        }
    }
}

impl<'a> CellHint<'a> {
    pub fn with_fixed(self, fixed: &'a [u8]) -> CellHint<'a> {
        CellHint { fixed, ..self }
    }
}

/// Bit-packed output of one cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EncodedCell {
    plane: [u8; CELL_ROWS],
    /// Hardware index per role; role 0 is the background.
    roles: [u8; 4],
    role_count: usize,
    attributes: [u8; 2],
    bits_per_pixel: u8,
    cell_width: usize,
    transparent: bool,
}

impl EncodedCell {
    /// One byte per pixel row.
    pub fn plane(&self) -> &[u8; CELL_ROWS] {
        &self.plane
    }

    /// Color attribute bytes: `fg << 4 | bg` for two-color cells,
    /// `c1 << 4 | c2` and `bg << 4 | c3` for four-color cells.
    pub fn attributes(&self) -> &[u8] {
        let len = if self.role_count == 2 { 1 } else { 2 };
        &self.attributes[..len]
    }

    pub fn background(&self) -> u8 {
        self.roles[0]
    }

    pub fn foreground(&self) -> u8 {
        self.roles[1]
    }

    /// Color of the set pixels, or the background when no pixel is set.
    ///
    /// Unlike [`foreground`](Self::foreground) this is always a color the
    /// cell actually shows.
    pub fn ink(&self) -> u8 {
        if self.plane.iter().all(|&row| row == 0) {
            self.roles[0]
        } else {
            self.roles[1]
        }
    }

    /// Hardware color shown for a role value.
    pub fn role_color(&self, role: u8) -> Option<u8> {
        self.roles[..self.role_count].get(role as usize).copied()
    }

    pub fn bits_per_pixel(&self) -> u8 {
        self.bits_per_pixel
    }

    /// Whether the source cell had any transparent pixel.
    pub fn has_transparency(&self) -> bool {
        self.transparent
    }

    /// Unpack the plane back into one role value per pixel.
    pub fn roles(&self) -> [[u8; 8]; CELL_ROWS] {
        let mut out = [[0u8; 8]; CELL_ROWS];
        for (row, &byte) in out.iter_mut().zip(&self.plane) {
            expand_bits_to_byte(self.bits_per_pixel, &[byte], &mut row[..self.cell_width]);
        }
        out
    }
}

/// Encodes cells for one [`EncodingMode`].
#[derive(Clone, Copy, Debug)]
pub struct CellEncoder {
    mode: EncodingMode,
    palette: HardwarePalette,
}

impl CellEncoder {
    /// Encoder matching against the part of the VIC-II palette the mode can
    /// address.
    pub fn new(mode: EncodingMode) -> Self {
        Self::with_palette(mode, HardwarePalette::VIC2.span(mode.palette_span))
    }

    pub fn with_palette(mode: EncodingMode, palette: HardwarePalette) -> Self {
        Self { mode, palette }
    }

    pub fn mode(&self) -> EncodingMode {
        self.mode
    }

    /// Encode a cell. `cell` must be exactly the mode's cell size.
    pub fn encode(&self, cell: ImgRef<'_, RGBA8>, hint: &CellHint<'_>) -> EncodedCell {
        debug_assert_eq!(cell.width(), self.mode.cell_width as usize);
        debug_assert_eq!(cell.height(), self.mode.cell_height as usize);

        // Pass 1: classify every pixel.
        let mut matched = [[None::<u8>; 8]; CELL_ROWS];
        let mut counts = [0u32; COLOR_COUNT];
        let mut transparent = false;
        for (row, src) in matched.iter_mut().zip(cell.rows()) {
            for (slot, &px) in row.iter_mut().zip(src) {
                if is_opaque(px) {
                    let index = self.palette.nearest_index(rgb_of(px));
                    counts[index as usize] += 1;
                    *slot = Some(index);
                } else {
                    transparent = true;
                }
            }
        }

        // Pass 2: assign roles.
        let role_count = self.mode.cell_colors.min(4);
        let roles = assign_roles(&mut counts, transparent, role_count, hint);

        // Pass 3: pack.
        let width = self.mode.cell_width as usize;
        let mut plane = [0u8; CELL_ROWS];
        for (byte, row) in plane.iter_mut().zip(&matched) {
            let mut values = [0u8; 8];
            for (value, index) in values.iter_mut().zip(&row[..width]) {
                *value = role_of(*index, &roles[..role_count]);
            }
            *byte = pack_row(&values[..width], self.mode.bits_per_pixel);
        }

        let attributes = if role_count == 2 {
            [(roles[1] << 4) | (roles[0] & 0x0f), 0]
        } else {
            [
                (roles[1] << 4) | (roles[2] & 0x0f),
                (roles[0] << 4) | (roles[3] & 0x0f),
            ]
        };

        EncodedCell {
            plane,
            roles,
            role_count,
            attributes,
            bits_per_pixel: self.mode.bits_per_pixel,
            cell_width: width,
            transparent,
        }
    }
}

fn assign_roles(
    counts: &mut [u32; COLOR_COUNT],
    transparent: bool,
    role_count: usize,
    hint: &CellHint<'_>,
) -> [u8; 4] {
    let mut roles = [0u8; 4];

    if role_count == 2 && hint.background == Background::PerCell {
        let mut background = take_most_frequent(counts).unwrap_or(0);
        let mut foreground = take_most_frequent(counts).unwrap_or(0);
        if transparent {
            if foreground == 0 {
                foreground = background;
            }
            background = 0;
        }
        if foreground == background {
            foreground = complement(background);
        }
        roles[0] = background;
        roles[1] = foreground;
        return roles;
    }

    let background = match hint.background {
        _ if transparent => 0,
        Background::Shared(b) => b,
        Background::PerCell => take_most_frequent(counts).unwrap_or(0),
    };
    counts[background as usize % COLOR_COUNT] = 0;
    roles[0] = background;

    let mut next = 1;
    for &color in hint.fixed.iter().take(role_count - 1) {
        roles[next] = color;
        counts[color as usize % COLOR_COUNT] = 0;
        next += 1;
    }
    while next < role_count {
        roles[next] = take_most_frequent(counts).unwrap_or(0);
        next += 1;
    }

    if role_count == 2 && roles[1] == roles[0] {
        roles[1] = complement(roles[0]);
    }
    roles
}

/// Highest count wins, lowest index on ties. The winner's count is cleared.
fn take_most_frequent(counts: &mut [u32; COLOR_COUNT]) -> Option<u8> {
    let mut best = None;
    let mut max = 0;
    for (index, &count) in counts.iter().enumerate() {
        if count > max {
            max = count;
            best = Some(index);
        }
    }
    let best = best?;
    counts[best] = 0;
    Some(best as u8)
}

fn complement(background: u8) -> u8 {
    if background == 0 { 1 } else { 0 }
}

fn role_of(index: Option<u8>, roles: &[u8]) -> u8 {
    let Some(index) = index else {
        return 0;
    };
    if index == roles[0] {
        return 0;
    }
    // two-color cells draw every non-background pixel in the foreground
    if roles.len() == 2 {
        return 1;
    }
    roles[1..]
        .iter()
        .position(|&r| r == index)
        .map_or(0, |pos| pos as u8 + 1)
}
