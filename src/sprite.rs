//! Hardware sprite conversion.
//!
//! A sprite is 21 rows of 3 bytes plus one color byte. Hires sprites are
//! 24 pixels wide at 1 bit per pixel; multicolor sprites are 12 pixels wide
//! at 2 bits per pixel and share colors 1 and 3 with every other multicolor
//! sprite of the run.

use alloc::vec::Vec;

use enough::Stop;

use crate::asset::{AssetKind, ConvertedAsset};
use crate::color::{HardwarePalette, is_opaque, rgb_of};
use crate::context::ConversionContext;
use crate::error::ConvertError;
use crate::image::SourceImage;
use crate::palette::{ExtractedPalette, PaletteExtractor};

/// Bytes per sprite, color byte included.
pub const SPRITE_SIZE: usize = 64;
pub const SPRITE_HEIGHT: u32 = 21;
const ROW_BYTES: usize = 3;
const COLOR_OFFSET: usize = 63;

/// Sprite conversion request.
#[derive(Clone, Debug)]
pub struct SpriteRequest<'a> {
    name: &'a str,
    multicolor: bool,
    color: Option<u8>,
}

impl<'a> SpriteRequest<'a> {
    pub fn new(name: &'a str) -> Self {
        Self {
            name,
            multicolor: false,
            color: None,
        }
    }

    pub fn multicolor(mut self, multicolor: bool) -> Self {
        self.multicolor = multicolor;
        self
    }

    /// Draw only pixels matching this hardware color, in role 1. The color
    /// budget is not checked.
    pub fn with_color(mut self, index: u8) -> Self {
        self.color = Some(index & 0x0f);
        self
    }

    /// Sprite width in source pixels.
    pub fn width(&self) -> u32 {
        if self.multicolor { 12 } else { 24 }
    }

    /// Convert the top-left corner of `image`. Larger images are clipped,
    /// smaller ones padded with role 0.
    pub fn convert(
        &self,
        image: &SourceImage,
        ctx: &mut ConversionContext,
        stop: impl Stop,
    ) -> Result<ConvertedAsset, ConvertError> {
        ctx.limits().check_source(image.width(), image.height())?;
        let palette = PaletteExtractor::new(HardwarePalette::VIC2).extract(image.as_imgref());

        let roles = match (self.color, self.multicolor) {
            (Some(color), _) => Roles::Single { on: color },
            (None, false) => self.hires_roles(&palette)?,
            (None, true) => self.multicolor_roles(&palette, ctx.sprite_common_mut())?,
        };

        let mut data = alloc::vec![0u8; SPRITE_SIZE];
        self.pack(image, &roles, &mut data, &stop)?;
        data[COLOR_OFFSET] = roles.color_byte();

        log::debug!(
            "{}: {} sprite, color {}, {} source colors",
            self.name,
            if self.multicolor { "multicolor" } else { "hires" },
            data[COLOR_OFFSET],
            palette.len()
        );

        Ok(ConvertedAsset::new(AssetKind::Sprite { multicolor: self.multicolor }, data)
            .with_frames(self.width(), SPRITE_HEIGHT, 1, SPRITE_SIZE)
            .with_palette(palette.entries))
    }

    fn hires_roles(&self, palette: &ExtractedPalette) -> Result<Roles, ConvertError> {
        if palette.transparent {
            palette.check_budget(self.name, 1)?;
            return Ok(Roles::Opaque {
                color: palette.index(0).unwrap_or(0),
            });
        }
        palette.check_budget(self.name, 2)?;
        Ok(Roles::Single {
            on: palette.index(1).unwrap_or(0),
        })
    }

    fn multicolor_roles(
        &self,
        palette: &ExtractedPalette,
        common: &mut [Option<u8>; 2],
    ) -> Result<Roles, ConvertError> {
        let colors: Vec<u8> = palette
            .entries
            .iter()
            .map(|e| e.index)
            .filter(|&i| i != 0)
            .collect();
        if colors.len() > 3 {
            return Err(ConvertError::TooManyColors {
                asset: self.name.into(),
                found: colors.len(),
                max: 3,
            });
        }

        for slot in 0..common.len() {
            if common[slot].is_none() {
                let free = colors.iter().copied().find(|&c| !common.contains(&Some(c)));
                common[slot] = free;
            }
        }

        let individual: Vec<u8> = colors
            .iter()
            .copied()
            .filter(|&c| !common.contains(&Some(c)))
            .collect();
        if individual.len() > 1 {
            return Err(ConvertError::TooManyColors {
                asset: self.name.into(),
                found: individual.len(),
                max: 1,
            });
        }

        Ok(Roles::Multicolor {
            common: *common,
            individual: individual.first().copied(),
        })
    }

    fn pack(
        &self,
        image: &SourceImage,
        roles: &Roles,
        out: &mut [u8],
        stop: &dyn Stop,
    ) -> Result<(), ConvertError> {
        let (bits, per_byte) = if self.multicolor { (2, 4) } else { (1, 8) };
        let width = image.width().min(self.width());
        let height = image.height().min(SPRITE_HEIGHT);
        for y in 0..height {
            stop.check()?;
            for x in 0..width {
                let Some(px) = image.pixel(x, y) else {
                    continue;
                };
                let index = is_opaque(px).then(|| HardwarePalette::VIC2.nearest_index(rgb_of(px)));
                let role = roles.role(index);
                let x = x as usize;
                let offset = y as usize * ROW_BYTES + x / per_byte;
                let shift = 8 - bits * (x % per_byte + 1);
                out[offset] |= role << shift;
            }
        }
        Ok(())
    }
}

/// How source colors map to sprite pixel values.
#[derive(Clone, Copy, Debug)]
enum Roles {
    /// Pixels of one color are set.
    Single { on: u8 },
    /// Every opaque pixel is set.
    Opaque { color: u8 },
    /// Black and transparent are 0, shared colors 1 and 3, the sprite's own
    /// color 2.
    Multicolor {
        common: [Option<u8>; 2],
        individual: Option<u8>,
    },
}

impl Roles {
    fn role(&self, index: Option<u8>) -> u8 {
        match (*self, index) {
            (_, None) => 0,
            (Roles::Single { on }, Some(i)) => u8::from(i == on),
            (Roles::Opaque { .. }, Some(_)) => 1,
            (Roles::Multicolor { .. }, Some(0)) => 0,
            (Roles::Multicolor { common, .. }, Some(i)) => {
                if common[0] == Some(i) {
                    1
                } else if common[1] == Some(i) {
                    3
                } else {
                    2
                }
            }
        }
    }

    fn color_byte(&self) -> u8 {
        match *self {
            Roles::Single { on } => on,
            Roles::Opaque { color } => color,
            Roles::Multicolor { individual, .. } => individual.unwrap_or(0),
        }
    }
}
