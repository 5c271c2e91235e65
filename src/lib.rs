//! # zenvic
//!
//! Graphics asset converter for the VIC-II video chip (C64, C128).
//!
//! Takes decoded RGB/RGBA rasters and produces byte-exact, hardware-native
//! buffers for the program image: hires and multicolor bitmaps, standard and
//! multicolor character maps, multi-frame sheets, tile sets and sprites.
//!
//! ## Pipeline
//!
//! - [`HardwarePalette`] matches colors to the 16 fixed VIC-II colors
//! - [`PaletteExtractor`] finds the colors a region uses and checks them
//!   against the mode's budget
//! - [`CellEncoder`] turns one 8-row cell into a bit plane and color
//!   attributes
//! - [`TileDictionary`] deduplicates character shapes into 256 slots,
//!   seeded with a 64-glyph font
//! - [`ConvertRequest`] and [`SpriteRequest`] lay out complete assets,
//!   optionally compressed with round-trip verification
//!
//! Run-scoped state (tile dictionary, shared sprite colors, warnings) lives
//! in a [`ConversionContext`]; create one per compilation and pass it to every
//! conversion.
//!
//! ## Non-Goals
//!
//! - Image file decoding (PNG, tile set descriptors): feed decoded pixels
//! - Scaling, dithering or filtering
//! - FLI and other interlaced modes: they produce a warning and a blank image
//!
//! ## Usage
//!
//! ```no_run
//! use zenvic::{ConversionContext, ConvertRequest, PixelLayout, ScreenMode, SourceImage};
//! use enough::Unstoppable;
//!
//! let rgba: &[u8] = &[]; // decoded 320x200 RGBA pixels
//! let image = SourceImage::from_bytes(rgba, 320, 200, PixelLayout::Rgba8)?;
//!
//! let mut ctx = ConversionContext::new();
//! let asset = ConvertRequest::new("title", ScreenMode::BitmapStandard)
//!     .compressed(true)
//!     .convert(&image, &mut ctx, Unstoppable)?;
//! println!("{} bytes", asset.len());
//! # Ok::<(), zenvic::ConvertError>(())
//! ```

#![cfg_attr(not(feature = "std"), no_std)]
#![forbid(unsafe_code)]

extern crate alloc;

mod assemble;
mod asset;
mod cell;
mod color;
mod compress;
mod context;
mod dictionary;
mod error;
mod font;
mod image;
mod limits;
mod mode;
mod palette;
mod pixel;
mod plane;
mod sprite;

// Re-exports
pub use assemble::{ConvertRequest, TileGeometry};
pub use asset::{AssetKind, ConvertedAsset};
pub use cell::{Background, CellEncoder, CellHint, EncodedCell};
pub use color::{COLOR_COUNT, HardwarePalette, PaletteEntry, distance};
pub use compress::{Compressor, LzssCompressor};
pub use context::ConversionContext;
pub use dictionary::{SLOT_COUNT, TileDescriptor, TileDictionary};
pub use enough::{Stop, Unstoppable};
pub use error::{ConversionWarning, ConvertError};
pub use font::{FONT_ALPHA, GLYPH_COUNT, SPACE};
pub use image::SourceImage;
pub use limits::Limits;
pub use mode::{CellLayout, EncodingMode, HEADER_SIZE, ScreenMode, frames_size};
pub use palette::{ExtractedPalette, PaletteExtractor};
pub use pixel::PixelLayout;
pub use plane::expand_bits_to_byte;
pub use sprite::{SPRITE_HEIGHT, SPRITE_SIZE, SpriteRequest};
