//! Test corpus: every supported mode over assorted patterns and sizes.

use enough::Unstoppable;
use rgb::RGBA8;
use zenvic::*;

const MODES: [ScreenMode; 4] = [
    ScreenMode::BitmapStandard,
    ScreenMode::BitmapMulticolor,
    ScreenMode::TilemapStandard,
    ScreenMode::TilemapMulticolor,
];

fn vic(index: u8) -> RGBA8 {
    let c = HardwarePalette::VIC2.get(index).unwrap().color;
    RGBA8::new(c.r, c.g, c.b, 255)
}

/// Two hardware colors in a checkerboard of `size` pixel squares.
fn checkerboard(w: u32, h: u32, size: u32, a: u8, b: u8) -> SourceImage {
    let px = (0..h)
        .flat_map(|y| {
            (0..w).map(move |x| if (x / size + y / size) % 2 == 0 { vic(a) } else { vic(b) })
        })
        .collect();
    SourceImage::from_pixels(px, w, h).unwrap()
}

/// Pseudo-random pixels drawn from the first `colors` hardware colors.
fn noise(w: u32, h: u32, colors: u8, seed: u32) -> SourceImage {
    let mut state = seed;
    let px = (0..w * h)
        .map(|_| {
            state ^= state << 13;
            state ^= state >> 17;
            state ^= state << 5;
            vic((state % u32::from(colors)) as u8)
        })
        .collect();
    SourceImage::from_pixels(px, w, h).unwrap()
}

// ── Size formulas ────────────────────────────────────────────────────

#[test]
fn lengths_match_size_formula() {
    let sizes = [(8, 8), (16, 8), (24, 16), (40, 24), (64, 64)];
    for mode in MODES {
        for &(w, h) in &sizes {
            for colors in [1u8, 2, 3, 7] {
                let img = noise(w, h, colors, w * 31 + h);
                let mut ctx = ConversionContext::new();
                let asset = ConvertRequest::new("noise", mode)
                    .convert(&img, &mut ctx, Unstoppable)
                    .unwrap_or_else(|e| panic!("{mode:?} {w}x{h}: {e}"));
                let expected = mode.frame_size(w, h, asset.palette.len()).unwrap();
                assert_eq!(asset.len(), expected, "{mode:?} {w}x{h} {colors} colors");
            }
        }
    }
}

#[test]
fn full_screen_bitmaps() {
    let img = checkerboard(320, 200, 4, 6, 14);
    let mut ctx = ConversionContext::new();
    let hires = ConvertRequest::new("hires", ScreenMode::BitmapStandard)
        .convert(&img, &mut ctx, Unstoppable)
        .unwrap();
    assert_eq!(hires.len(), 3 + 8000 + 1000);
    assert_eq!(&hires.data()[..3], &[0x40, 0x01, 200]);

    let half = checkerboard(160, 200, 2, 6, 14);
    let multi = ConvertRequest::new("multi", ScreenMode::BitmapMulticolor)
        .convert(&half, &mut ctx, Unstoppable)
        .unwrap();
    assert_eq!(multi.len(), 3 + 8000 + 2000 + 1);
}

// ── Plane decoding ───────────────────────────────────────────────────

#[test]
fn hires_planes_decode_to_source_colors() {
    let img = checkerboard(32, 16, 3, 2, 7);
    let mut ctx = ConversionContext::new();
    let data = ConvertRequest::new("check", ScreenMode::BitmapStandard)
        .convert(&img, &mut ctx, Unstoppable)
        .unwrap()
        .into_data();

    let cols = 4usize;
    let colors = 3 + 4 * 16;
    for cy in 0..2 {
        for cx in 0..cols {
            let cell = cy * cols + cx;
            let attr = data[colors + cell];
            let (fg, bg) = (attr >> 4, attr & 0x0f);
            assert_ne!(fg, bg, "cell {cell}");
            for row in 0..8 {
                let byte = data[3 + cell * 8 + row];
                let mut roles = [0u8; 8];
                expand_bits_to_byte(1, &[byte], &mut roles);
                for (x, &role) in roles.iter().enumerate() {
                    let px = img
                        .pixel((cx * 8 + x) as u32, (cy * 8 + row) as u32)
                        .unwrap();
                    let expected = HardwarePalette::VIC2
                        .nearest(rgb::RGB8::new(px.r, px.g, px.b))
                        .index;
                    let shown = if role == 1 { fg } else { bg };
                    assert_eq!(shown, expected, "cell {cell} row {row} x {x}");
                }
            }
        }
    }
}

#[test]
fn hires_planes_set_every_non_background_pixel() {
    let img = noise(24, 16, 4, 4242);
    let mut ctx = ConversionContext::new();
    let data = ConvertRequest::new("noise", ScreenMode::BitmapStandard)
        .convert(&img, &mut ctx, Unstoppable)
        .unwrap()
        .into_data();

    let cols = 3usize;
    let colors = 3 + cols * 16;
    for cell in 0..cols * 2 {
        let (cx, cy) = (cell % cols, cell / cols);
        let bg = data[colors + cell] & 0x0f;
        for row in 0..8 {
            let mut roles = [0u8; 8];
            expand_bits_to_byte(1, &[data[3 + cell * 8 + row]], &mut roles);
            for (x, &role) in roles.iter().enumerate() {
                let px = img
                    .pixel((cx * 8 + x) as u32, (cy * 8 + row) as u32)
                    .unwrap();
                let index = HardwarePalette::VIC2
                    .nearest(rgb::RGB8::new(px.r, px.g, px.b))
                    .index;
                assert_eq!(role == 0, index == bg, "cell {cell} row {row} x {x}");
            }
        }
    }
}

#[test]
fn flips_mirror_the_plane() {
    // one white column on the left edge of a black cell
    let img = SourceImage::from_pixels(
        (0..64).map(|i| if i % 8 == 0 { vic(1) } else { vic(0) }).collect(),
        8,
        8,
    )
    .unwrap();
    let mut ctx = ConversionContext::new();
    let plain = ConvertRequest::new("plain", ScreenMode::BitmapStandard)
        .convert(&img, &mut ctx, Unstoppable)
        .unwrap();
    let flipped = ConvertRequest::new("flipped", ScreenMode::BitmapStandard)
        .flip_x(true)
        .convert(&img, &mut ctx, Unstoppable)
        .unwrap();
    assert_eq!(plain.data()[3], 0x80);
    assert_eq!(flipped.data()[3], 0x01);
}

// ── Tile dictionary ──────────────────────────────────────────────────

#[test]
fn dictionary_fills_then_reuses() {
    let mut ctx = ConversionContext::new();
    // 40x40 of two-color noise: 25 cells, almost surely all distinct
    for seed in 1..=12 {
        let img = noise(40, 40, 2, seed * 7919);
        let asset = ConvertRequest::new("tiles", ScreenMode::TilemapStandard)
            .convert(&img, &mut ctx, Unstoppable)
            .unwrap();
        assert_eq!(asset.len(), 3 + 25 + 1);
    }
    let tiles = ctx.tiles().unwrap();
    assert_eq!(tiles.len(), SLOT_COUNT);
    assert!(tiles.is_full());
    assert!(tiles.overflowed() > 0);
}

#[test]
fn flipped_shapes_take_new_slots() {
    let img = checkerboard(16, 8, 1, 0, 1);
    let mut ctx = ConversionContext::new();
    let a = ConvertRequest::new("a", ScreenMode::TilemapStandard)
        .convert(&img, &mut ctx, Unstoppable)
        .unwrap();
    let b = ConvertRequest::new("b", ScreenMode::TilemapStandard)
        .flip_y(true)
        .convert(&img, &mut ctx, Unstoppable)
        .unwrap();
    // vertical flip of a checkerboard is its inverse; it takes a second slot
    assert_eq!(a.data()[3], a.data()[4]);
    assert_ne!(a.data()[3], b.data()[3]);
    assert_eq!(ctx.tiles().unwrap().len(), 66);
}

// ── Pixel input ──────────────────────────────────────────────────────

#[test]
fn rgb_and_rgba_inputs_agree() {
    let rgb: Vec<u8> = (0..64u32)
        .flat_map(|i| if i % 3 == 0 { [255, 255, 255] } else { [0, 0, 0xaa] })
        .collect();
    let rgba: Vec<u8> = rgb.chunks(3).flat_map(|c| [c[0], c[1], c[2], 255]).collect();
    let a = SourceImage::from_bytes(&rgb, 8, 8, PixelLayout::Rgb8).unwrap();
    let b = SourceImage::from_depth(&rgba, 8, 8, 4).unwrap();
    let mut ctx = ConversionContext::new();
    let req = ConvertRequest::new("same", ScreenMode::BitmapStandard);
    assert_eq!(
        req.convert(&a, &mut ctx, Unstoppable).unwrap().into_data(),
        req.convert(&b, &mut ctx, Unstoppable).unwrap().into_data()
    );
}
