#!/usr/bin/env -S cargo +nightly -Zscript
//! Generate seed corpus files for fuzzing.
//! Run: cargo +nightly -Zscript fuzz/generate_seeds.rs

/// VIC-II black, white, red, blue as RGBA.
const COLORS: [[u8; 4]; 4] = [
    [0x00, 0x00, 0x00, 0xff],
    [0xff, 0xff, 0xff, 0xff],
    [0x80, 0x00, 0x00, 0xff],
    [0x00, 0x00, 0xaa, 0xff],
];

fn pixels(w: usize, h: usize, pick: impl Fn(usize, usize) -> usize) -> Vec<u8> {
    let mut out = Vec::with_capacity(w * h * 4);
    for y in 0..h {
        for x in 0..w {
            out.extend_from_slice(&COLORS[pick(x, y) % COLORS.len()]);
        }
    }
    out
}

fn main() {
    use std::fs;

    let dir = "fuzz/corpus/fuzz_convert";
    fs::create_dir_all(dir).unwrap();
    // header: mode, width - 1, height - 1, flags, frame_w, frame_h
    for (mode, name) in [(0u8, "hires"), (1, "multi"), (2, "chars"), (3, "mcchars"), (4, "ecm")] {
        let mut seed = vec![mode, 15, 7, 0, 0, 0];
        seed.extend(pixels(16, 8, |x, y| (x / 4 + y) % 3));
        fs::write(format!("{dir}/{name}_16x8.bin"), seed).unwrap();
    }
    let mut sheet = vec![0u8, 31, 7, 32 | 16 | 2, 8, 8];
    sheet.extend(pixels(32, 8, |x, _| x / 8));
    fs::write(format!("{dir}/sheet_rolled.bin"), sheet).unwrap();
    let mut odd = vec![0u8, 9, 9, 32, 10, 10];
    odd.extend(pixels(10, 10, |x, y| x ^ y));
    fs::write(format!("{dir}/odd_frame.bin"), odd).unwrap();

    let dir = "fuzz/corpus/fuzz_sprite";
    fs::create_dir_all(dir).unwrap();
    // header: flags, width - 1, height - 1, color
    let mut hires = vec![0u8, 23, 20, 0];
    hires.extend(pixels(24, 21, |x, y| usize::from((x + y) % 5 == 0)));
    fs::write(format!("{dir}/hires.bin"), hires).unwrap();
    let mut multi = vec![1u8, 11, 20, 0];
    multi.extend(pixels(12, 21, |x, _| x % 4));
    fs::write(format!("{dir}/multicolor.bin"), multi).unwrap();

    // Truncated seeds for edge coverage
    fs::write(format!("{dir}/empty.bin"), b"").unwrap();
    fs::write(format!("{dir}/header_only.bin"), [1u8, 11, 20, 2]).unwrap();

    println!("Generated seed corpora in fuzz/corpus/");
}
