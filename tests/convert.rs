use enough::{Stop, StopReason, Unstoppable};
use rgb::RGBA8;
use zenvic::*;

fn vic(index: u8) -> RGBA8 {
    let c = HardwarePalette::VIC2.get(index).unwrap().color;
    RGBA8::new(c.r, c.g, c.b, 255)
}

const CLEAR: RGBA8 = RGBA8 {
    r: 0,
    g: 0,
    b: 0,
    a: 0,
};

fn image(width: u32, height: u32, f: impl Fn(u32, u32) -> RGBA8) -> SourceImage {
    let mut px = Vec::with_capacity((width * height) as usize);
    for y in 0..height {
        for x in 0..width {
            px.push(f(x, y));
        }
    }
    SourceImage::from_pixels(px, width, height).unwrap()
}

fn cell_of(f: impl Fn(u32, u32) -> RGBA8) -> SourceImage {
    image(8, 8, f)
}

fn hires_encoder() -> CellEncoder {
    CellEncoder::new(ScreenMode::BitmapStandard.encoding().unwrap())
}

// ── Cell encoding ────────────────────────────────────────────────────

#[test]
fn uniform_black_cell() {
    let cell = cell_of(|_, _| vic(0));
    let enc = hires_encoder().encode(cell.as_imgref(), &CellHint::PER_CELL);
    assert_eq!(enc.plane(), &[0u8; 8]);
    assert_eq!(enc.attributes(), &[0x10]);
}

#[test]
fn forty_red_twenty_four_black() {
    let cell = cell_of(|x, y| if y * 8 + x < 40 { vic(2) } else { vic(0) });
    let enc = hires_encoder().encode(cell.as_imgref(), &CellHint::PER_CELL);
    assert_eq!(enc.background(), 2);
    assert_eq!(enc.foreground(), 0);
    assert_eq!(enc.attributes(), &[0x02]);
}

#[test]
fn uniform_black_bitmap_asset() {
    let img = cell_of(|_, _| vic(0));
    let mut ctx = ConversionContext::new();
    let asset = ConvertRequest::new("black", ScreenMode::BitmapStandard)
        .convert(&img, &mut ctx, Unstoppable)
        .unwrap();
    assert_eq!(asset.data(), &[8, 0, 8, 0, 0, 0, 0, 0, 0, 0, 0, 0x10]);
}

// ── Geometry and budget ──────────────────────────────────────────────

#[test]
fn frame_not_a_cell_multiple() {
    let img = image(16, 16, |_, _| vic(0));
    let mut ctx = ConversionContext::new();
    match ConvertRequest::new("odd", ScreenMode::BitmapStandard)
        .with_frame(10, 10)
        .convert(&img, &mut ctx, Unstoppable)
    {
        Err(ConvertError::InvalidGeometry { asset, .. }) => assert_eq!(asset, "odd"),
        other => panic!("expected InvalidGeometry, got {other:?}"),
    }
}

#[test]
fn multicolor_cells_are_four_wide() {
    let img = image(12, 8, |_, _| vic(0));
    let mut ctx = ConversionContext::new();
    let asset = ConvertRequest::new("mc", ScreenMode::BitmapMulticolor)
        .convert(&img, &mut ctx, Unstoppable)
        .unwrap();
    assert_eq!(asset.len(), 3 + 3 * 8 + 2 * 3 + 1);

    let err = ConvertRequest::new("hires", ScreenMode::BitmapStandard)
        .convert(&img, &mut ctx, Unstoppable)
        .unwrap_err();
    assert!(matches!(err, ConvertError::InvalidGeometry { .. }), "{err:?}");
}

#[test]
fn character_map_header_limits() {
    let img = image(256, 8, |_, _| vic(0));
    let mut ctx = ConversionContext::new();
    let err = ConvertRequest::new("wide", ScreenMode::TilemapStandard)
        .convert(&img, &mut ctx, Unstoppable)
        .unwrap_err();
    assert!(matches!(err, ConvertError::InvalidGeometry { .. }), "{err:?}");
}

#[test]
fn color_budget_is_fatal() {
    // five solid cells, one color each
    let img = image(40, 8, |x, _| vic((x / 8) as u8));
    let mut ctx = ConversionContext::new();
    match ConvertRequest::new("busy", ScreenMode::TilemapStandard)
        .with_color_limit(4)
        .convert(&img, &mut ctx, Unstoppable)
    {
        Err(ConvertError::TooManyColors { found, max, .. }) => {
            assert_eq!((found, max), (5, 4));
        }
        other => panic!("expected TooManyColors, got {other:?}"),
    }
    // nothing touched the dictionary
    assert!(ctx.tiles().is_none());
}

#[test]
fn color_limit_override() {
    let img = image(16, 8, |x, _| vic((x / 4) as u8));
    let mut ctx = ConversionContext::new();
    let err = ConvertRequest::new("limited", ScreenMode::BitmapStandard)
        .with_color_limit(2)
        .convert(&img, &mut ctx, Unstoppable)
        .unwrap_err();
    assert!(
        matches!(err, ConvertError::TooManyColors { found: 4, max: 2, .. }),
        "{err:?}"
    );
}

// ── Unsupported modes ────────────────────────────────────────────────

#[test]
fn unsupported_mode_warns_and_substitutes() {
    let img = image(16, 16, |_, _| vic(3));
    let mut ctx = ConversionContext::new();
    let asset = ConvertRequest::new("fancy", ScreenMode::Fli)
        .convert(&img, &mut ctx, Unstoppable)
        .unwrap();
    assert_eq!(asset.data(), &[8, 0, 8, 0, 0, 0, 0, 0, 0, 0, 0, 0]);
    assert_eq!(
        ctx.warnings(),
        &[ConversionWarning::UnsupportedMode {
            asset: "fancy".into(),
            mode: ScreenMode::Fli,
        }]
    );
    assert_eq!(ctx.take_warnings().len(), 1);
    assert!(ctx.warnings().is_empty());
}

// ── Character maps ───────────────────────────────────────────────────

#[test]
fn standard_character_map_with_colors() {
    // cell 0 blank, cell 1 solid red, cell 2 solid white
    let img = image(24, 8, |x, _| match x / 8 {
        0 => vic(0),
        1 => vic(2),
        _ => vic(1),
    });
    let mut ctx = ConversionContext::new();
    let asset = ConvertRequest::new("map", ScreenMode::TilemapStandard)
        .convert(&img, &mut ctx, Unstoppable)
        .unwrap();
    let data = asset.data();
    assert_eq!(data.len(), 3 + 2 * 3);
    assert_eq!(&data[..3], &[24, 8, 1]);
    // blank cell is the space glyph; both solid cells share one new tile
    assert_eq!(&data[3..6], &[32, 64, 64]);
    // the blank cell keeps the black it shows
    assert_eq!(&data[6..9], &[0, 2, 1]);

    let tiles = ctx.tiles().unwrap();
    assert_eq!(tiles.len(), GLYPH_COUNT + 1);
    assert_eq!(tiles.get(SPACE), Some(&TileDescriptor(FONT_ALPHA[SPACE as usize])));
    assert_eq!(tiles.get(64), Some(&TileDescriptor([0xff; 8])));
    assert_eq!(tiles.charset().len(), 2048);
}

#[test]
fn character_map_cell_with_three_colors() {
    // black background, white rows 0-1, red rows 2-3
    let img = image(8, 8, |_, y| match y {
        0 | 1 => vic(1),
        2 | 3 => vic(2),
        _ => vic(0),
    });
    let mut ctx = ConversionContext::new();
    let asset = ConvertRequest::new("three", ScreenMode::TilemapStandard)
        .convert(&img, &mut ctx, Unstoppable)
        .unwrap();
    let data = asset.data();
    assert_eq!(data.len(), 3 + 2);
    assert_eq!(&data[..3], &[8, 8, 1]);
    assert_eq!(data[4], 1);

    let tile = ctx.tiles().unwrap().get(data[3]).unwrap();
    assert_eq!(tile.0, [0xff, 0xff, 0xff, 0xff, 0, 0, 0, 0]);
}

#[test]
fn hires_cell_with_three_colors() {
    // rows 0-3 red, 4-5 white, 6-7 blue
    let img = cell_of(|_, y| match y {
        0..=3 => vic(2),
        4 | 5 => vic(1),
        _ => vic(6),
    });
    let mut ctx = ConversionContext::new();
    let data = ConvertRequest::new("three", ScreenMode::BitmapStandard)
        .convert(&img, &mut ctx, Unstoppable)
        .unwrap()
        .into_data();
    assert_eq!(&data[3..11], &[0, 0, 0, 0, 0xff, 0xff, 0xff, 0xff]);
    assert_eq!(data[11], 0x12);
}

#[test]
fn multicolor_character_map_layout() {
    // background blue, shared white and red, per-cell green in cell 1
    let img = image(8, 8, |x, y| match (x, y) {
        (0 | 1, _) => vic(6),
        (2, _) => vic(1),
        (3, _) => vic(2),
        (4..=6, _) => vic(6),
        _ => vic(5),
    });
    let mut ctx = ConversionContext::new();
    let asset = ConvertRequest::new("mcmap", ScreenMode::TilemapMulticolor)
        .exact(true)
        .convert(&img, &mut ctx, Unstoppable)
        .unwrap();
    let data = asset.data();
    assert_eq!(data.len(), 3 + 2 * 2 + 3);
    assert_eq!(&data[..3], &[8, 8, 0]);
    assert_eq!(&data[5..7], &[0x08, 0x08 | 5]);
    // trailer: background, common 1, common 2 (first-appearance order)
    assert_eq!(&data[7..10], &[6, 1, 2]);

    let tiles = ctx.tiles().unwrap();
    let first = tiles.get(data[3]).unwrap();
    assert_eq!(first.0, [0b00_00_01_10; 8]);
    let second = tiles.get(data[4]).unwrap();
    assert_eq!(second.0, [0b00_00_00_11; 8]);
}

// ── Frames and tile sets ─────────────────────────────────────────────

#[test]
fn frame_sheet_header() {
    let img = image(32, 16, |x, y| if (x / 16 + y / 8) % 2 == 0 { vic(1) } else { vic(0) });
    let mut ctx = ConversionContext::new();
    let asset = ConvertRequest::new("anim", ScreenMode::BitmapStandard)
        .with_frame(16, 8)
        .convert_frames(&img, &mut ctx, Unstoppable)
        .unwrap();
    let frame = 3 + 16 + 2;
    assert_eq!(asset.kind, AssetKind::Frames(ScreenMode::BitmapStandard));
    assert_eq!(asset.frame_count, 4);
    assert_eq!(asset.frame_size, frame);
    assert_eq!(asset.len(), 3 + 4 * frame);
    assert_eq!(&asset.data()[..3], &[4, 16, 0]);
    for i in 0..4 {
        let start = 3 + i * frame;
        assert_eq!(&asset.data()[start..start + 3], &[16, 0, 8]);
    }
}

#[test]
fn sheet_must_split_evenly() {
    let img = image(24, 8, |_, _| vic(0));
    let mut ctx = ConversionContext::new();
    let err = ConvertRequest::new("uneven", ScreenMode::BitmapStandard)
        .with_frame(16, 8)
        .convert_frames(&img, &mut ctx, Unstoppable)
        .unwrap_err();
    assert!(matches!(err, ConvertError::InvalidGeometry { .. }), "{err:?}");
}

#[test]
fn oversized_sheet() {
    // 256 frames do not fit the count byte
    let img = image(8, 8 * 256, |_, _| vic(0));
    let mut ctx = ConversionContext::new();
    match ConvertRequest::new("huge", ScreenMode::BitmapStandard)
        .with_frame(8, 8)
        .convert_frames(&img, &mut ctx, Unstoppable)
    {
        Err(ConvertError::ImageTooBig { asset, size }) => {
            assert_eq!(asset, "huge");
            assert_eq!(size, 256 * 12);
        }
        other => panic!("expected ImageTooBig, got {other:?}"),
    }
}

#[test]
fn tileset_records_grid() {
    let img = image(16, 16, |x, y| vic(((x / 8) + 2 * (y / 8)) as u8));
    let mut ctx = ConversionContext::new();
    let geometry = TileGeometry {
        tile_width: 8,
        tile_height: 8,
        first_gid: 1,
    };
    let asset = ConvertRequest::new("tiles", ScreenMode::BitmapStandard)
        .convert_tileset(&img, &geometry, &mut ctx, Unstoppable)
        .unwrap();
    assert_eq!(
        asset.kind,
        AssetKind::Tileset {
            mode: ScreenMode::BitmapStandard,
            first_gid: 1
        }
    );
    assert_eq!(&asset.data()[..3], &[4, 8, 0]);
    assert_eq!(asset.len(), 3 + 4 * 12);
    // tile 3 is solid cyan: background cyan, complement foreground 0
    assert_eq!(asset.data()[3 + 3 * 12 + 11], 0x03);
}

// ── Compression ──────────────────────────────────────────────────────

#[test]
fn repeated_pattern_compresses() {
    let data: Vec<u8> = [0xde, 0xad, 0xbe, 0xef].repeat(256);
    let packed = LzssCompressor.compress(&data).unwrap();
    assert!(packed.len() < 1024);
    assert_eq!(LzssCompressor.decompress(&packed, data.len()).unwrap(), data);
}

#[test]
fn compressed_asset_records_original_size() {
    let img = image(64, 64, |_, _| vic(0));
    let mut ctx = ConversionContext::new();
    let asset = ConvertRequest::new("flat", ScreenMode::BitmapStandard)
        .compressed(true)
        .convert(&img, &mut ctx, Unstoppable)
        .unwrap();
    let raw = 3 + 8 * 64 + 64;
    assert!(asset.is_compressed());
    assert_eq!(asset.uncompressed_size, Some(raw));
    assert!(asset.len() < raw);
    assert_eq!(LzssCompressor.decompress(asset.data(), raw).unwrap().len(), raw);
}

struct Broken;

impl Compressor for Broken {
    fn compress(&self, data: &[u8]) -> Result<Vec<u8>, ConvertError> {
        Ok(data[..1].to_vec())
    }
    fn decompress(&self, data: &[u8], original_len: usize) -> Result<Vec<u8>, ConvertError> {
        let mut out = data.to_vec();
        out.resize(original_len, 0xaa);
        Ok(out)
    }
}

#[test]
fn corrupted_compression_is_fatal() {
    let img = image(8, 8, |_, _| vic(0));
    let mut ctx = ConversionContext::new().with_compressor(Broken);
    match ConvertRequest::new("bad", ScreenMode::BitmapStandard)
        .compressed(true)
        .convert(&img, &mut ctx, Unstoppable)
    {
        Err(ConvertError::CompressionCorrupted { asset }) => assert_eq!(asset, "bad"),
        other => panic!("expected CompressionCorrupted, got {other:?}"),
    }
}

// ── Sprites ──────────────────────────────────────────────────────────

#[test]
fn multicolor_sprites_share_colors() {
    let first = image(12, 21, |x, _| match x {
        0..=3 => vic(1),
        4..=6 => vic(2),
        _ => CLEAR,
    });
    let second = image(12, 21, |x, _| match x {
        0 => vic(2),
        1 => vic(7),
        2 => vic(1),
        _ => vic(0),
    });
    let mut ctx = ConversionContext::new();
    SpriteRequest::new("one")
        .multicolor(true)
        .convert(&first, &mut ctx, Unstoppable)
        .unwrap();
    assert_eq!(ctx.sprite_common_colors(), [Some(1), Some(2)]);

    let data = SpriteRequest::new("two")
        .multicolor(true)
        .convert(&second, &mut ctx, Unstoppable)
        .unwrap()
        .into_data();
    assert_eq!(ctx.sprite_common_colors(), [Some(1), Some(2)]);
    // red is shared color 2 (bits 11), yellow individual (10), white shared 1 (01)
    assert_eq!(data[0], 0b11_10_01_00);
    assert_eq!(data[63], 7);
}

#[test]
fn sprite_budget() {
    let img = image(24, 21, |x, _| vic((x % 3) as u8 + 1));
    let mut ctx = ConversionContext::new();
    let err = SpriteRequest::new("rainbow")
        .convert(&img, &mut ctx, Unstoppable)
        .unwrap_err();
    assert!(
        matches!(err, ConvertError::TooManyColors { found: 3, max: 2, .. }),
        "{err:?}"
    );
}

// ── Limits and cancellation ──────────────────────────────────────────

#[test]
fn limits_reject_large_sources() {
    let img = image(64, 8, |_, _| vic(0));
    let mut ctx = ConversionContext::new().with_limits(Limits {
        max_source_width: Some(32),
        ..Default::default()
    });
    let err = ConvertRequest::new("wide", ScreenMode::BitmapStandard)
        .convert(&img, &mut ctx, Unstoppable)
        .unwrap_err();
    assert!(matches!(err, ConvertError::LimitExceeded(_)), "{err:?}");
}

#[test]
fn asset_limit_applies_to_output() {
    let img = image(64, 64, |_, _| vic(0));
    let mut ctx = ConversionContext::new().with_limits(Limits {
        max_asset_bytes: Some(100),
        ..Default::default()
    });
    let err = ConvertRequest::new("big", ScreenMode::BitmapStandard)
        .convert(&img, &mut ctx, Unstoppable)
        .unwrap_err();
    assert!(matches!(err, ConvertError::LimitExceeded(_)), "{err:?}");
}

#[test]
fn sheet_limits_count_the_whole_sheet() {
    // four 8x8 frames of 12 bytes: 51 bytes with the shared header
    let img = image(32, 8, |_, _| vic(0));
    let limits = Limits {
        max_frame_bytes: Some(12),
        max_asset_bytes: Some(50),
        ..Default::default()
    };
    let request = ConvertRequest::new("strip", ScreenMode::BitmapStandard).with_frame(8, 8);

    let mut ctx = ConversionContext::new().with_limits(limits.clone());
    let single = request.convert(&img, &mut ctx, Unstoppable).unwrap();
    assert_eq!(single.len(), 12);
    match request.convert_frames(&img, &mut ctx, Unstoppable) {
        Err(ConvertError::LimitExceeded(msg)) => assert!(msg.contains("asset size"), "{msg}"),
        other => panic!("expected LimitExceeded, got {other:?}"),
    }

    let mut ctx = ConversionContext::new().with_limits(Limits {
        max_frames: Some(3),
        ..limits
    });
    match request.convert_frames(&img, &mut ctx, Unstoppable) {
        Err(ConvertError::LimitExceeded(msg)) => assert!(msg.contains("frame count"), "{msg}"),
        other => panic!("expected LimitExceeded, got {other:?}"),
    }
}

struct Cancelled;

impl Stop for Cancelled {
    fn check(&self) -> Result<(), StopReason> {
        Err(StopReason::Cancelled)
    }
}

#[test]
fn cancellation_stops_conversion() {
    let img = image(16, 16, |_, _| vic(0));
    let mut ctx = ConversionContext::new();
    let err = ConvertRequest::new("stop", ScreenMode::BitmapStandard)
        .convert(&img, &mut ctx, Cancelled)
        .unwrap_err();
    assert!(matches!(err, ConvertError::Cancelled(_)), "{err:?}");
}
