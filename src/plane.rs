//! Bit-plane packing.
//!
//! Rows are packed MSB first: the leftmost pixel occupies the most
//! significant bits of its byte.

/// Pack one row of role values (each below `1 << bits`) into a byte.
pub(crate) fn pack_row(roles: &[u8], bits: u8) -> u8 {
    let mut byte = 0u8;
    for (x, &role) in roles.iter().enumerate() {
        let shift = 8 - bits as usize * (x + 1);
        byte |= (role & mask(bits)) << shift;
    }
    byte
}

/// Expand packed rows back to one role value per pixel.
///
/// `out` receives `8 / bits` values per input byte; a short final chunk is
/// filled from the leading bits of the last byte.
pub fn expand_bits_to_byte(bits: u8, input: &[u8], out: &mut [u8]) {
    let per_byte = 8 / bits as usize;
    for (out_vals, &in_val) in out.chunks_mut(per_byte).zip(input) {
        for (pos, out_val) in out_vals.iter_mut().enumerate() {
            let shift = 8 - bits as usize * (pos + 1);
            *out_val = (in_val >> shift) & mask(bits);
        }
    }
}

/// Number of pixel positions whose roles differ between two planes.
pub(crate) fn pixel_distance(a: &[u8; 8], b: &[u8; 8], bits: u8) -> u32 {
    let mut diff = 0;
    for (&x, &y) in a.iter().zip(b) {
        let delta = x ^ y;
        diff += match bits {
            1 => delta.count_ones(),
            // a 2-bit pixel differs when either of its bits does
            _ => ((delta | (delta >> 1)) & 0x55).count_ones(),
        };
    }
    diff
}

#[inline]
fn mask(bits: u8) -> u8 {
    ((1u16 << bits) - 1) as u8
}
