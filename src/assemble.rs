//! Whole-image conversion: geometry checks, cell grid, buffer layout,
//! multi-frame sheets and tile sets.

use alloc::borrow::Cow;
use alloc::format;
use alloc::vec;
use alloc::vec::Vec;

use enough::Stop;

use crate::asset::{
    AssetKind, ConvertedAsset, check_frames, write_frames_header, write_image_header,
};
use crate::cell::{CELL_ROWS, CellEncoder, CellHint, EncodedCell};
use crate::color::HardwarePalette;
use crate::compress::compress_verified;
use crate::context::ConversionContext;
use crate::error::{ConversionWarning, ConvertError};
use crate::image::SourceImage;
use crate::mode::{CellLayout, EncodingMode, HEADER_SIZE, ScreenMode, frames_size};
use crate::palette::{ExtractedPalette, PaletteExtractor};

/// Tile grid of a tile set, as read from its descriptor.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TileGeometry {
    pub tile_width: u32,
    pub tile_height: u32,
    /// First global tile id, recorded on the asset for the map loader.
    pub first_gid: u32,
}

/// Image conversion request.
///
/// ```no_run
/// use zenvic::{ConversionContext, ConvertRequest, ScreenMode, SourceImage, Unstoppable};
///
/// let image = SourceImage::from_pixels(vec![rgb::RGBA8::new(0, 0, 0, 255); 64], 8, 8)?;
/// let mut ctx = ConversionContext::new();
/// let asset = ConvertRequest::new("logo", ScreenMode::BitmapStandard)
///     .compressed(true)
///     .convert(&image, &mut ctx, Unstoppable)?;
/// # Ok::<(), zenvic::ConvertError>(())
/// ```
#[derive(Clone, Debug)]
pub struct ConvertRequest<'a> {
    name: &'a str,
    mode: ScreenMode,
    frame: Option<(u32, u32)>,
    offset: (u32, u32),
    exact: bool,
    compressed: bool,
    flip_x: bool,
    flip_y: bool,
    roll_x: bool,
    color_limit: Option<usize>,
}

impl<'a> ConvertRequest<'a> {
    /// `name` identifies the asset in errors and log output.
    pub fn new(name: &'a str, mode: ScreenMode) -> Self {
        Self {
            name,
            mode,
            frame: None,
            offset: (0, 0),
            exact: false,
            compressed: false,
            flip_x: false,
            flip_y: false,
            roll_x: false,
            color_limit: None,
        }
    }

    /// Frame size. Defaults to the whole image (from the offset on).
    pub fn with_frame(mut self, width: u32, height: u32) -> Self {
        self.frame = Some((width, height));
        self
    }

    /// Top-left corner of the frame for [`convert`](Self::convert).
    pub fn with_offset(mut self, x: u32, y: u32) -> Self {
        self.offset = (x, y);
        self
    }

    /// Keep palette colors in order of appearance instead of frequency.
    pub fn exact(mut self, exact: bool) -> Self {
        self.exact = exact;
        self
    }

    /// Compress the finished buffer when that makes it smaller.
    pub fn compressed(mut self, compressed: bool) -> Self {
        self.compressed = compressed;
        self
    }

    pub fn flip_x(mut self, flip: bool) -> Self {
        self.flip_x = flip;
        self
    }

    pub fn flip_y(mut self, flip: bool) -> Self {
        self.flip_y = flip;
        self
    }

    /// For sheets and tile sets: add pre-shifted copies of every frame, each
    /// pass rolled one more pixel (right, or left when flipped).
    pub fn roll_x(mut self, roll: bool) -> Self {
        self.roll_x = roll;
        self
    }

    /// Override the mode's color budget.
    pub fn with_color_limit(mut self, max: usize) -> Self {
        self.color_limit = Some(max);
        self
    }

    /// Convert one frame at the configured offset.
    pub fn convert(
        &self,
        image: &SourceImage,
        ctx: &mut ConversionContext,
        stop: impl Stop,
    ) -> Result<ConvertedAsset, ConvertError> {
        ctx.limits().check_source(image.width(), image.height())?;
        let Some(encoding) = self.mode.encoding() else {
            return self.fallback(ctx);
        };
        let source = self.oriented(image);

        let (x, y) = self.offset;
        let (width, height) = match self.frame {
            Some(frame) => frame,
            None => (
                source.width().saturating_sub(x),
                source.height().saturating_sub(y),
            ),
        };
        self.check_geometry(&source, encoding, x, y, width, height)?;

        let palette = self.extract(&source, encoding)?;
        let size = self.frame_size(width, height, &palette)?;
        ctx.limits().check_frame(size)?;

        let frame = FrameEncoder::new(self, encoding, &palette);
        let data = frame.encode(&source, x, y, width, height, size, ctx, &stop)?;
        log::debug!(
            "{}: {:?} {width}x{height}, {} colors, {} bytes",
            self.name,
            self.mode,
            palette.len(),
            data.len()
        );

        let asset = ConvertedAsset::new(AssetKind::Image(self.mode), data)
            .with_frames(width, height, 1, size)
            .with_palette(palette.entries);
        self.finish(asset, ctx)
    }

    /// Split the whole image into frames of the configured size.
    pub fn convert_frames(
        &self,
        image: &SourceImage,
        ctx: &mut ConversionContext,
        stop: impl Stop,
    ) -> Result<ConvertedAsset, ConvertError> {
        let (width, height) = self.frame.unwrap_or((image.width(), image.height()));
        self.convert_sheet(image, width, height, AssetKind::Frames(self.mode), ctx, &stop)
    }

    /// Cut the image along a tile grid; one frame per tile.
    pub fn convert_tileset(
        &self,
        image: &SourceImage,
        geometry: &TileGeometry,
        ctx: &mut ConversionContext,
        stop: impl Stop,
    ) -> Result<ConvertedAsset, ConvertError> {
        let kind = AssetKind::Tileset {
            mode: self.mode,
            first_gid: geometry.first_gid,
        };
        self.convert_sheet(image, geometry.tile_width, geometry.tile_height, kind, ctx, &stop)
    }

    fn convert_sheet(
        &self,
        image: &SourceImage,
        width: u32,
        height: u32,
        kind: AssetKind,
        ctx: &mut ConversionContext,
        stop: &dyn Stop,
    ) -> Result<ConvertedAsset, ConvertError> {
        ctx.limits().check_source(image.width(), image.height())?;
        let Some(encoding) = self.mode.encoding() else {
            return self.fallback(ctx);
        };
        let source = self.oriented(image);

        if width == 0
            || height == 0
            || source.width() % width != 0
            || source.height() % height != 0
        {
            return Err(ConvertError::geometry(
                self.name,
                format!(
                    "{}x{} image does not split into {width}x{height} frames",
                    source.width(),
                    source.height()
                ),
            ));
        }
        self.check_geometry(&source, encoding, 0, 0, width, height)?;

        let columns = source.width() / width;
        let rows = source.height() / height;
        let passes = if self.roll_x {
            width.saturating_sub(1).max(1)
        } else {
            1
        };
        let count = passes as usize * columns as usize * rows as usize;

        let palette = self.extract(&source, encoding)?;
        let frame_size = self.frame_size(width, height, &palette)?;
        ctx.limits().check_sheet(count, frame_size, frames_size(count, frame_size))?;
        check_frames(self.name, count, frame_size)?;
        let total = frames_size(count, frame_size);

        let mut data = vec![0u8; total];
        write_frames_header(&mut data, count, width);

        let frame = FrameEncoder::new(self, encoding, &palette);
        let mut rolled = Cow::Borrowed(&*source);
        let mut chunks = data[HEADER_SIZE..].chunks_exact_mut(frame_size);
        for pass in 0..passes {
            if pass > 0 {
                rolled = Cow::Owned(rolled.rolled_x(!self.flip_x));
            }
            for fy in 0..rows {
                for fx in 0..columns {
                    stop.check()?;
                    let bytes = frame.encode(
                        &rolled,
                        fx * width,
                        fy * height,
                        width,
                        height,
                        frame_size,
                        ctx,
                        stop,
                    )?;
                    if let Some(chunk) = chunks.next() {
                        chunk.copy_from_slice(&bytes);
                    }
                }
            }
        }

        log::debug!(
            "{}: {count} frames of {width}x{height} ({:?}), {} bytes",
            self.name,
            self.mode,
            data.len()
        );

        let asset = ConvertedAsset::new(kind, data)
            .with_frames(width, height, count, frame_size)
            .with_palette(palette.entries);
        self.finish(asset, ctx)
    }

    /// Warn and substitute the 8x8 blank standard bitmap.
    fn fallback(&self, ctx: &mut ConversionContext) -> Result<ConvertedAsset, ConvertError> {
        log::warn!(
            "{}: screen mode {:?} is not supported for images, using an empty bitmap",
            self.name,
            self.mode
        );
        ctx.warn(ConversionWarning::UnsupportedMode {
            asset: self.name.into(),
            mode: self.mode,
        });
        ConvertedAsset::blank(ScreenMode::BitmapStandard, 8, 8)
    }

    fn oriented<'i>(&self, image: &'i SourceImage) -> Cow<'i, SourceImage> {
        let mut image = Cow::Borrowed(image);
        if self.flip_x {
            image = Cow::Owned(image.flipped_x());
        }
        if self.flip_y {
            image = Cow::Owned(image.flipped_y());
        }
        image
    }

    fn check_geometry(
        &self,
        image: &SourceImage,
        encoding: EncodingMode,
        x: u32,
        y: u32,
        width: u32,
        height: u32,
    ) -> Result<(), ConvertError> {
        if width == 0 || height == 0 {
            return Err(ConvertError::geometry(
                self.name,
                format!("empty {width}x{height} frame"),
            ));
        }
        if width % encoding.cell_width != 0 {
            return Err(ConvertError::geometry(
                self.name,
                format!("frame width {width} is not a multiple of {}", encoding.cell_width),
            ));
        }
        if height % encoding.cell_height != 0 {
            return Err(ConvertError::geometry(
                self.name,
                format!("frame height {height} is not a multiple of {}", encoding.cell_height),
            ));
        }
        if image.region(x, y, width, height).is_none() {
            return Err(ConvertError::geometry(
                self.name,
                format!(
                    "{width}x{height} frame at ({x}, {y}) exceeds the {}x{} image",
                    image.width(),
                    image.height()
                ),
            ));
        }
        let (max_width, max_height) = match encoding.layout {
            CellLayout::Bitmap => (0xffff, 0xff),
            CellLayout::Tilemap => (0xff, 0xff),
        };
        if width > max_width || height > max_height {
            return Err(ConvertError::geometry(
                self.name,
                format!("{width}x{height} frame does not fit the image header"),
            ));
        }
        Ok(())
    }

    fn extract(
        &self,
        image: &SourceImage,
        encoding: EncodingMode,
    ) -> Result<ExtractedPalette, ConvertError> {
        let palette = PaletteExtractor::new(HardwarePalette::VIC2.span(encoding.palette_span))
            .exact(self.exact)
            .extract(image.as_imgref());
        palette.check_budget(self.name, self.color_limit.unwrap_or(encoding.max_colors))?;
        Ok(palette)
    }

    fn frame_size(
        &self,
        width: u32,
        height: u32,
        palette: &ExtractedPalette,
    ) -> Result<usize, ConvertError> {
        let size = self
            .mode
            .frame_size(width, height, palette.len())
            .ok_or(ConvertError::UnsupportedMode(self.mode))?;
        if size > 0xffff {
            return Err(ConvertError::ImageTooBig {
                asset: self.name.into(),
                size,
            });
        }
        Ok(size)
    }

    fn finish(
        &self,
        mut asset: ConvertedAsset,
        ctx: &mut ConversionContext,
    ) -> Result<ConvertedAsset, ConvertError> {
        if self.compressed {
            if let Some(packed) = compress_verified(ctx.compressor(), self.name, asset.data())? {
                asset.set_compressed(packed);
            }
        }
        Ok(asset)
    }
}

/// Lays out one frame for a fixed mode and palette.
struct FrameEncoder<'r> {
    name: &'r str,
    mode: ScreenMode,
    encoding: EncodingMode,
    cells: CellEncoder,
    palette: &'r ExtractedPalette,
    /// Multicolor character mode's two shared colors.
    fixed: [u8; 2],
}

impl<'r> FrameEncoder<'r> {
    fn new(
        request: &'r ConvertRequest<'_>,
        encoding: EncodingMode,
        palette: &'r ExtractedPalette,
    ) -> Self {
        Self {
            name: request.name,
            mode: request.mode,
            encoding,
            cells: CellEncoder::new(encoding),
            palette,
            fixed: [palette.index(1).unwrap_or(0), palette.index(2).unwrap_or(0)],
        }
    }

    /// Image-wide background register for modes that have one.
    fn background(&self) -> u8 {
        self.palette.index(0).unwrap_or(0)
    }

    fn hint(&self) -> CellHint<'_> {
        match self.mode {
            ScreenMode::BitmapStandard => CellHint::PER_CELL,
            ScreenMode::BitmapMulticolor => CellHint::shared(self.background()),
            ScreenMode::TilemapMulticolor => {
                CellHint::shared(self.background()).with_fixed(&self.fixed)
            }
            _ => CellHint::shared(0),
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn encode(
        &self,
        image: &SourceImage,
        x: u32,
        y: u32,
        width: u32,
        height: u32,
        size: usize,
        ctx: &mut ConversionContext,
        stop: &dyn Stop,
    ) -> Result<Vec<u8>, ConvertError> {
        let columns = (width / self.encoding.cell_width) as usize;
        let rows = (height / self.encoding.cell_height) as usize;
        let cells = self.encode_cells(image, x, y, columns, rows, stop)?;

        let mut out = vec![0u8; size];
        match self.mode {
            ScreenMode::BitmapStandard => self.layout_bitmap(&mut out, width, height, &cells),
            ScreenMode::BitmapMulticolor => {
                self.layout_bitmap(&mut out, width, height, &cells);
                let last = out.len() - 1;
                out[last] = self.background();
            }
            ScreenMode::TilemapStandard => {
                self.layout_tilemap_standard(&mut out, width, height, &cells, ctx)
            }
            ScreenMode::TilemapMulticolor => {
                self.layout_tilemap_multicolor(&mut out, width, height, &cells, ctx)
            }
            _ => return Err(ConvertError::UnsupportedMode(self.mode)),
        }
        Ok(out)
    }

    /// Row-major grid of encoded cells.
    fn encode_cells(
        &self,
        image: &SourceImage,
        x: u32,
        y: u32,
        columns: usize,
        rows: usize,
        stop: &dyn Stop,
    ) -> Result<Vec<EncodedCell>, ConvertError> {
        let cw = self.encoding.cell_width;
        let ch = self.encoding.cell_height;
        let hint = self.hint();
        let mut cells = Vec::with_capacity(columns * rows);
        for cy in 0..rows as u32 {
            stop.check()?;
            for cx in 0..columns as u32 {
                let (px, py) = (x + cx * cw, y + cy * ch);
                let cell = image.region(px, py, cw, ch).ok_or_else(|| {
                    ConvertError::geometry(
                        self.name,
                        format!("cell at ({px}, {py}) is outside the image"),
                    )
                })?;
                cells.push(self.cells.encode(cell, &hint));
            }
        }
        Ok(cells)
    }

    /// Header, plane bytes of every cell, then one attribute plane per
    /// attribute byte.
    fn layout_bitmap(&self, out: &mut [u8], width: u32, height: u32, cells: &[EncodedCell]) {
        write_image_header(out, width, height);
        let bitmap = &mut out[HEADER_SIZE..];
        for (i, cell) in cells.iter().enumerate() {
            let offset = i * CELL_ROWS;
            bitmap[offset..offset + CELL_ROWS].copy_from_slice(cell.plane());
        }
        let planes = HEADER_SIZE + cells.len() * CELL_ROWS;
        for (i, cell) in cells.iter().enumerate() {
            for (n, &attr) in cell.attributes().iter().enumerate() {
                out[planes + n * cells.len() + i] = attr;
            }
        }
    }

    /// Header `[w, h, flag]`, tile indices, then per-cell colors or one
    /// shared foreground.
    fn layout_tilemap_standard(
        &self,
        out: &mut [u8],
        width: u32,
        height: u32,
        cells: &[EncodedCell],
        ctx: &mut ConversionContext,
    ) {
        let per_cell = self.palette.len() > 2;
        out[0] = width as u8;
        out[1] = height as u8;
        out[2] = u8::from(per_cell);

        let colors = HEADER_SIZE + cells.len();
        let tiles = ctx.tiles_mut();
        for (i, cell) in cells.iter().enumerate() {
            out[HEADER_SIZE + i] = tiles.register(cell);
            if per_cell {
                out[colors + i] = cell.ink() & 0x0f;
            }
        }
        if !per_cell {
            let color = self
                .palette
                .entries
                .iter()
                .map(|e| e.index)
                .find(|&i| i != 0)
                .unwrap_or(1);
            out[colors] = color;
        }
    }

    /// Header `[w, h, 0]`, tile indices, per-cell `0x08 | c3`, then
    /// background and the two shared colors.
    fn layout_tilemap_multicolor(
        &self,
        out: &mut [u8],
        width: u32,
        height: u32,
        cells: &[EncodedCell],
        ctx: &mut ConversionContext,
    ) {
        out[0] = width as u8;
        out[1] = height as u8;
        out[2] = 0;

        let colors = HEADER_SIZE + cells.len();
        let tiles = ctx.tiles_mut();
        for (i, cell) in cells.iter().enumerate() {
            out[HEADER_SIZE + i] = tiles.register(cell);
            out[colors + i] = 0x08 | (cell.role_color(3).unwrap_or(0) & 0x07);
        }
        let trailer = colors + cells.len();
        out[trailer] = self.background();
        out[trailer + 1] = self.fixed[0];
        out[trailer + 2] = self.fixed[1];
    }
}
