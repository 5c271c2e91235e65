//! Run-scoped conversion state.

use alloc::boxed::Box;
use alloc::vec::Vec;
use core::fmt;

use crate::compress::{Compressor, LzssCompressor};
use crate::dictionary::TileDictionary;
use crate::error::ConversionWarning;
use crate::limits::Limits;

/// State shared by every conversion of one compilation run.
///
/// Holds the tile dictionary used by character modes, the two colors that
/// multicolor sprites share, collected warnings, limits and the compressor.
/// Conversions that touch the dictionary or the sprite colors depend on the
/// order they run in.
pub struct ConversionContext {
    tiles: Option<TileDictionary>,
    sprite_common: [Option<u8>; 2],
    warnings: Vec<ConversionWarning>,
    limits: Limits,
    compressor: Box<dyn Compressor>,
}

impl Default for ConversionContext {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ConversionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConversionContext")
            .field("tiles", &self.tiles.as_ref().map(TileDictionary::len))
            .field("sprite_common", &self.sprite_common)
            .field("warnings", &self.warnings)
            .field("limits", &self.limits)
            .finish_non_exhaustive()
    }
}

impl ConversionContext {
    pub fn new() -> Self {
        Self {
            tiles: None,
            sprite_common: [None; 2],
            warnings: Vec::new(),
            limits: Limits::default(),
            compressor: Box::new(LzssCompressor),
        }
    }

    pub fn with_limits(mut self, limits: Limits) -> Self {
        self.limits = limits;
        self
    }

    /// Replace the default LZSS compressor.
    pub fn with_compressor(mut self, compressor: impl Compressor + 'static) -> Self {
        self.compressor = Box::new(compressor);
        self
    }

    pub fn limits(&self) -> &Limits {
        &self.limits
    }

    /// The tile dictionary, once a character-mode conversion has seeded it.
    pub fn tiles(&self) -> Option<&TileDictionary> {
        self.tiles.as_ref()
    }

    pub(crate) fn tiles_mut(&mut self) -> &mut TileDictionary {
        self.tiles.get_or_insert_with(TileDictionary::with_glyphs)
    }

    /// Multicolor sprite colors 1 and 2, fixed by the first sprites that
    /// used them.
    pub fn sprite_common_colors(&self) -> [Option<u8>; 2] {
        self.sprite_common
    }

    pub(crate) fn sprite_common_mut(&mut self) -> &mut [Option<u8>; 2] {
        &mut self.sprite_common
    }

    pub fn warnings(&self) -> &[ConversionWarning] {
        &self.warnings
    }

    pub fn take_warnings(&mut self) -> Vec<ConversionWarning> {
        core::mem::take(&mut self.warnings)
    }

    pub(crate) fn warn(&mut self, warning: ConversionWarning) {
        self.warnings.push(warning);
    }

    pub(crate) fn compressor(&self) -> &dyn Compressor {
        self.compressor.as_ref()
    }
}
