#![no_main]
use libfuzzer_sys::fuzz_target;
use zenvic::{ConversionContext, PixelLayout, SourceImage, SpriteRequest, SPRITE_SIZE};

// Layout: [flags, width, height, color, pixels (RGB or RGBA)...]
fuzz_target!(|data: &[u8]| {
    if data.len() < 4 {
        return;
    }
    let flags = data[0];
    let width = u32::from(data[1] % 48) + 1;
    let height = u32::from(data[2] % 42) + 1;
    let layout = if flags & 4 != 0 { PixelLayout::Rgb8 } else { PixelLayout::Rgba8 };
    let Ok(image) = SourceImage::from_bytes(&data[4..], width, height, layout) else {
        return;
    };

    let mut request = SpriteRequest::new("fuzz").multicolor(flags & 1 != 0);
    if flags & 2 != 0 {
        request = request.with_color(data[3]);
    }

    let mut ctx = ConversionContext::new();
    // Twice, so the second sprite sees the shared multicolor registers
    for _ in 0..2 {
        if let Ok(asset) = request.convert(&image, &mut ctx, enough::Unstoppable) {
            assert_eq!(asset.len(), SPRITE_SIZE);
        }
    }
});
