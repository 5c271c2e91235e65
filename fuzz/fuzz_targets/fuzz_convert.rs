#![no_main]
use libfuzzer_sys::fuzz_target;
use zenvic::{ConversionContext, ConvertRequest, PixelLayout, ScreenMode, SourceImage};

const MODES: [ScreenMode; 6] = [
    ScreenMode::BitmapStandard,
    ScreenMode::BitmapMulticolor,
    ScreenMode::TilemapStandard,
    ScreenMode::TilemapMulticolor,
    ScreenMode::TilemapExtended,
    ScreenMode::Fli,
];

// Layout: [mode, width, height, flags, frame_w, frame_h, pixels (RGBA)...]
fuzz_target!(|data: &[u8]| {
    if data.len() < 6 {
        return;
    }
    let mode = MODES[data[0] as usize % MODES.len()];
    let width = u32::from(data[1] % 64) + 1;
    let height = u32::from(data[2] % 64) + 1;
    let flags = data[3];
    let Ok(image) = SourceImage::from_bytes(&data[6..], width, height, PixelLayout::Rgba8) else {
        return;
    };

    let mut request = ConvertRequest::new("fuzz", mode)
        .exact(flags & 1 != 0)
        .compressed(flags & 2 != 0)
        .flip_x(flags & 4 != 0)
        .flip_y(flags & 8 != 0)
        .roll_x(flags & 16 != 0);
    if flags & 32 != 0 {
        request = request.with_frame(u32::from(data[4]), u32::from(data[5]));
    }

    // Must never panic; a successful conversion must match the size formula
    let mut ctx = ConversionContext::new();
    if let Ok(asset) = request.convert(&image, &mut ctx, enough::Unstoppable) {
        if !asset.is_compressed() && mode.is_supported() {
            let expected = mode.frame_size(asset.frame_width, asset.frame_height, asset.palette.len());
            assert_eq!(Some(asset.len()), expected);
        }
    }
    let _ = request.convert_frames(&image, &mut ctx, enough::Unstoppable);
});
