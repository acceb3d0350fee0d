// Copyright 2026 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tile rendering and atlas output.

use std::fs::{self, File};
use std::io::BufWriter;
use std::path::Path;

use image::codecs::png::PngEncoder;
use image::{imageops, Pixel, Rgba, RgbaImage};

use crate::icon::{load_icon, IconPlacement};
use crate::{
    AtlasConfig, AtlasError, FontResolver, GlyphRasterizer, GridLayout, IconWidthMetric, KeyKind,
    KeySet, LayoutMap, OutputConfig, RasterGlyph, SwashRasterizer, TileRecord,
};

/// Colour characters are drawn in.
const GLYPH_COLOR: [u8; 3] = [255, 255, 255];

/// Renders keys into a grid of tiles.
#[derive(Clone, Copy, Debug)]
pub struct AtlasBuilder {
    tile_size: u32,
    icon_width: IconWidthMetric,
}

impl AtlasBuilder {
    /// Creates a builder with the tile parameters from `config`.
    pub fn new(config: &AtlasConfig) -> Self {
        Self {
            tile_size: config.tile_size,
            icon_width: config.icon_width,
        }
    }

    /// Sets the tile edge length in pixels.
    pub fn tile_size(mut self, tile_size: u32) -> Self {
        self.tile_size = tile_size;
        self
    }

    /// Sets which scaled icon dimension is recorded as its width.
    pub fn icon_width(mut self, icon_width: IconWidthMetric) -> Self {
        self.icon_width = icon_width;
        self
    }

    /// Renders every key into a fresh atlas.
    ///
    /// Characters come from `rasterizer`; icons are read from disk. Any icon
    /// that fails to load aborts the build.
    pub fn build<R: GlyphRasterizer + ?Sized>(
        &self,
        keys: &KeySet,
        rasterizer: &mut R,
    ) -> Result<Atlas, AtlasError> {
        let count = match u32::try_from(keys.len()) {
            Ok(0) => return Err(AtlasError::EmptyKeySet),
            Ok(count) => count,
            Err(_) => return Err(AtlasError::TooManyKeys { count: keys.len() }),
        };
        if self.tile_size == 0 {
            return Err(AtlasError::InvalidConfig {
                reason: "tile_size must be at least 1",
            });
        }
        let grid = GridLayout::plan(count, self.tile_size);
        let (width, height) = image_size(&grid).ok_or(AtlasError::AtlasTooLarge {
            cols: grid.cols(),
            rows: grid.rows(),
            tile_size: self.tile_size,
        })?;
        tracing::info!(
            "Laying out {count} tiles in a {}x{} grid ({width}x{height} pixels)",
            grid.cols(),
            grid.rows()
        );

        let metrics = rasterizer.vertical_metrics();
        let baseline = metrics.baseline(self.tile_size);
        let mut atlas = Atlas {
            image: RgbaImage::new(width, height),
            map: LayoutMap::new(&grid),
            grid,
        };

        for (key, coord) in keys.iter().zip(grid.coords()) {
            let (tile_x, tile_y) = grid.tile_origin(coord);
            let width = match key.kind() {
                KeyKind::Icon(path) => {
                    let icon = load_icon(key.name(), path)?;
                    let placement = IconPlacement::fit(
                        icon.width(),
                        icon.height(),
                        self.tile_size,
                        baseline,
                        self.icon_width,
                    );
                    let scaled = placement.resize(&icon);
                    imageops::overlay(
                        &mut atlas.image,
                        &scaled,
                        tile_x + placement.x,
                        tile_y + placement.y,
                    );
                    placement.recorded_width
                }
                KeyKind::Char(ch) => match rasterizer.rasterize(*ch) {
                    Some(glyph) => {
                        let x = tile_x
                            + (i64::from(self.tile_size) - i64::from(glyph.width)).div_euclid(2);
                        // The drawing origin sits `ascent` above the baseline row.
                        let y = tile_y + i64::from(baseline - metrics.ascent);
                        draw_glyph(&mut atlas.image, &glyph, x, y + i64::from(metrics.ascent));
                        glyph.width
                    }
                    None => 0,
                },
            };
            tracing::debug!(
                "Tile {:?} at ({}, {}) width {width}",
                key.name(),
                coord.col,
                coord.row
            );
            atlas.map.insert(key.name(), TileRecord::new(coord, width));
        }
        Ok(atlas)
    }
}

/// Returns the pixel size of the atlas for `grid` if its RGBA buffer can be
/// addressed.
fn image_size(grid: &GridLayout) -> Option<(u32, u32)> {
    let (width, height) = grid.image_size()?;
    let bytes = u64::from(width)
        .checked_mul(u64::from(height))?
        .checked_mul(4)?;
    usize::try_from(bytes)
        .ok()
        .filter(|&bytes| isize::try_from(bytes).is_ok())
        .map(|_| (width, height))
}

/// Blends a coverage mask in [`GLYPH_COLOR`] with its origin at `(x, baseline)`.
fn draw_glyph(image: &mut RgbaImage, glyph: &RasterGlyph, x: i64, baseline: i64) {
    let left = x + i64::from(glyph.left);
    let top = baseline - i64::from(glyph.top);
    let [r, g, b] = GLYPH_COLOR;
    for off_y in 0..glyph.height {
        let Ok(py) = u32::try_from(top + i64::from(off_y)) else {
            continue;
        };
        if py >= image.height() {
            break;
        }
        for off_x in 0..glyph.width {
            let Ok(px) = u32::try_from(left + i64::from(off_x)) else {
                continue;
            };
            if px >= image.width() {
                break;
            }
            let alpha = glyph.coverage_at(off_x, off_y);
            if alpha != 0 {
                image.get_pixel_mut(px, py).blend(&Rgba([r, g, b, alpha]));
            }
        }
    }
}

/// A rendered atlas image with its layout map.
#[derive(Clone, Debug)]
pub struct Atlas {
    image: RgbaImage,
    map: LayoutMap,
    grid: GridLayout,
}

impl Atlas {
    /// Returns the atlas image.
    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    /// Returns the layout map.
    pub fn map(&self) -> &LayoutMap {
        &self.map
    }

    /// Returns the grid the tiles were laid out in.
    pub fn grid(&self) -> &GridLayout {
        &self.grid
    }

    /// Writes the image as PNG and the layout map, creating parent
    /// directories as needed.
    ///
    /// The image is written first. If writing the map fails the image is
    /// left in place.
    pub fn write(&self, output: &OutputConfig) -> Result<(), AtlasError> {
        self.write_image(&output.atlas)?;
        let map = self.map.render(output.map_format)?;
        create_parent_dir(&output.map)?;
        fs::write(&output.map, map).map_err(|err| AtlasError::io(&output.map, err))?;
        tracing::info!("Wrote layout map {}", output.map.display());
        Ok(())
    }

    /// Writes just the image as PNG.
    pub fn write_image(&self, path: &Path) -> Result<(), AtlasError> {
        create_parent_dir(path)?;
        let file = File::create(path).map_err(|err| AtlasError::io(path, err))?;
        let png_encoder = PngEncoder::new(BufWriter::new(file));
        self.image
            .write_with_encoder(png_encoder)
            .map_err(|source| AtlasError::ImageWrite {
                path: path.to_path_buf(),
                source,
            })?;
        tracing::info!(
            "Wrote atlas image {} ({}x{})",
            path.display(),
            self.image.width(),
            self.image.height()
        );
        Ok(())
    }
}

fn create_parent_dir(path: &Path) -> Result<(), AtlasError> {
    match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => {
            fs::create_dir_all(dir).map_err(|err| AtlasError::io(dir, err))
        }
        _ => Ok(()),
    }
}

/// Runs the whole pipeline for `config`: builds the key set, resolves the
/// font, renders every tile, and writes both output files.
pub fn generate(config: &AtlasConfig) -> Result<Atlas, AtlasError> {
    config.validate()?;
    let keys = KeySet::build(&config.charset, &config.icons)?;
    let font = FontResolver::new().resolve(&config.font)?;
    let mut rasterizer = SwashRasterizer::new(font, config.font.size);
    let atlas = AtlasBuilder::new(config).build(&keys, &mut rasterizer)?;
    atlas.write(&config.output)?;
    Ok(atlas)
}

/// Renders the keys of `config` with a caller-supplied rasterizer and writes
/// the outputs. The configured font is not consulted.
pub fn generate_with<R: GlyphRasterizer + ?Sized>(
    config: &AtlasConfig,
    rasterizer: &mut R,
) -> Result<Atlas, AtlasError> {
    config.validate()?;
    let keys = KeySet::build(&config.charset, &config.icons)?;
    let atlas = AtlasBuilder::new(config).build(&keys, rasterizer)?;
    atlas.write(&config.output)?;
    Ok(atlas)
}
