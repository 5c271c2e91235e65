//! Bundled 8x8 glyph set used to seed the tile dictionary.
//!
//! 64 glyphs in screen-code order: `@`, `A`..`Z`, `[`, `£`, `]`, up arrow,
//! left arrow, space, `!`..`?`. One byte per row, MSB is the leftmost pixel.

/// Number of bundled glyphs.
pub const GLYPH_COUNT: usize = 64;

/// Slot of the blank glyph (space).
pub const SPACE: u8 = 32;

#[rustfmt::skip]
pub static FONT_ALPHA: [[u8; 8]; GLYPH_COUNT] = [
    [0x3c, 0x66, 0x6e, 0x6e, 0x60, 0x62, 0x3c, 0x00], // @
    [0x18, 0x3c, 0x66, 0x7e, 0x66, 0x66, 0x66, 0x00], // A
    [0x7c, 0x66, 0x66, 0x7c, 0x66, 0x66, 0x7c, 0x00], // B
    [0x3c, 0x66, 0x60, 0x60, 0x60, 0x66, 0x3c, 0x00], // C
    [0x78, 0x6c, 0x66, 0x66, 0x66, 0x6c, 0x78, 0x00], // D
    [0x7e, 0x60, 0x60, 0x78, 0x60, 0x60, 0x7e, 0x00], // E
    [0x7e, 0x60, 0x60, 0x78, 0x60, 0x60, 0x60, 0x00], // F
    [0x3c, 0x66, 0x60, 0x6e, 0x66, 0x66, 0x3c, 0x00], // G
    [0x66, 0x66, 0x66, 0x7e, 0x66, 0x66, 0x66, 0x00], // H
    [0x3c, 0x18, 0x18, 0x18, 0x18, 0x18, 0x3c, 0x00], // I
    [0x1e, 0x0c, 0x0c, 0x0c, 0x0c, 0x6c, 0x38, 0x00], // J
    [0x66, 0x6c, 0x78, 0x70, 0x78, 0x6c, 0x66, 0x00], // K
    [0x60, 0x60, 0x60, 0x60, 0x60, 0x60, 0x7e, 0x00], // L
    [0x63, 0x77, 0x7f, 0x6b, 0x63, 0x63, 0x63, 0x00], // M
    [0x66, 0x76, 0x7e, 0x7e, 0x6e, 0x66, 0x66, 0x00], // N
    [0x3c, 0x66, 0x66, 0x66, 0x66, 0x66, 0x3c, 0x00], // O
    [0x7c, 0x66, 0x66, 0x7c, 0x60, 0x60, 0x60, 0x00], // P
    [0x3c, 0x66, 0x66, 0x66, 0x66, 0x3c, 0x0e, 0x00], // Q
    [0x7c, 0x66, 0x66, 0x7c, 0x78, 0x6c, 0x66, 0x00], // R
    [0x3c, 0x66, 0x60, 0x3c, 0x06, 0x66, 0x3c, 0x00], // S
    [0x7e, 0x18, 0x18, 0x18, 0x18, 0x18, 0x18, 0x00], // T
    [0x66, 0x66, 0x66, 0x66, 0x66, 0x66, 0x3c, 0x00], // U
    [0x66, 0x66, 0x66, 0x66, 0x66, 0x3c, 0x18, 0x00], // V
    [0x63, 0x63, 0x63, 0x6b, 0x7f, 0x77, 0x63, 0x00], // W
    [0x66, 0x66, 0x3c, 0x18, 0x3c, 0x66, 0x66, 0x00], // X
    [0x66, 0x66, 0x66, 0x3c, 0x18, 0x18, 0x18, 0x00], // Y
    [0x7e, 0x06, 0x0c, 0x18, 0x30, 0x60, 0x7e, 0x00], // Z
    [0x3c, 0x30, 0x30, 0x30, 0x30, 0x30, 0x3c, 0x00], // [
    [0x0c, 0x12, 0x30, 0x7c, 0x30, 0x62, 0xfc, 0x00], // pound
    [0x3c, 0x0c, 0x0c, 0x0c, 0x0c, 0x0c, 0x3c, 0x00], // ]
    [0x00, 0x18, 0x3c, 0x7e, 0x18, 0x18, 0x18, 0x18], // up arrow
    [0x00, 0x10, 0x30, 0x7f, 0x7f, 0x30, 0x10, 0x00], // left arrow
    [0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00], // space
    [0x18, 0x18, 0x18, 0x18, 0x00, 0x00, 0x18, 0x00], // !
    [0x66, 0x66, 0x66, 0x00, 0x00, 0x00, 0x00, 0x00], // "
    [0x66, 0x66, 0xff, 0x66, 0xff, 0x66, 0x66, 0x00], // #
    [0x18, 0x3e, 0x60, 0x3c, 0x06, 0x7c, 0x18, 0x00], // $
    [0x62, 0x66, 0x0c, 0x18, 0x30, 0x66, 0x46, 0x00], // %
    [0x3c, 0x66, 0x3c, 0x38, 0x67, 0x66, 0x3f, 0x00], // &
    [0x06, 0x0c, 0x18, 0x00, 0x00, 0x00, 0x00, 0x00], // '
    [0x0c, 0x18, 0x30, 0x30, 0x30, 0x18, 0x0c, 0x00], // (
    [0x30, 0x18, 0x0c, 0x0c, 0x0c, 0x18, 0x30, 0x00], // )
    [0x00, 0x66, 0x3c, 0xff, 0x3c, 0x66, 0x00, 0x00], // *
    [0x00, 0x18, 0x18, 0x7e, 0x18, 0x18, 0x00, 0x00], // +
    [0x00, 0x00, 0x00, 0x00, 0x00, 0x18, 0x18, 0x30], // ,
    [0x00, 0x00, 0x00, 0x7e, 0x00, 0x00, 0x00, 0x00], // -
    [0x00, 0x00, 0x00, 0x00, 0x00, 0x18, 0x18, 0x00], // .
    [0x00, 0x03, 0x06, 0x0c, 0x18, 0x30, 0x60, 0x00], // /
    [0x3c, 0x66, 0x6e, 0x76, 0x66, 0x66, 0x3c, 0x00], // 0
    [0x18, 0x18, 0x38, 0x18, 0x18, 0x18, 0x7e, 0x00], // 1
    [0x3c, 0x66, 0x06, 0x0c, 0x30, 0x60, 0x7e, 0x00], // 2
    [0x3c, 0x66, 0x06, 0x1c, 0x06, 0x66, 0x3c, 0x00], // 3
    [0x06, 0x0e, 0x1e, 0x66, 0x7f, 0x06, 0x06, 0x00], // 4
    [0x7e, 0x60, 0x7c, 0x06, 0x06, 0x66, 0x3c, 0x00], // 5
    [0x3c, 0x66, 0x60, 0x7c, 0x66, 0x66, 0x3c, 0x00], // 6
    [0x7e, 0x66, 0x0c, 0x18, 0x18, 0x18, 0x18, 0x00], // 7
    [0x3c, 0x66, 0x66, 0x3c, 0x66, 0x66, 0x3c, 0x00], // 8
    [0x3c, 0x66, 0x66, 0x3e, 0x06, 0x66, 0x3c, 0x00], // 9
    [0x00, 0x00, 0x18, 0x00, 0x00, 0x18, 0x00, 0x00], // :
    [0x00, 0x00, 0x18, 0x00, 0x00, 0x18, 0x18, 0x30], // ;
    [0x0e, 0x18, 0x30, 0x60, 0x30, 0x18, 0x0e, 0x00], // <
    [0x00, 0x00, 0x7e, 0x00, 0x7e, 0x00, 0x00, 0x00], // =
    [0x70, 0x18, 0x0c, 0x06, 0x0c, 0x18, 0x70, 0x00], // >
    [0x3c, 0x66, 0x06, 0x0c, 0x18, 0x00, 0x18, 0x00], // ?
];
