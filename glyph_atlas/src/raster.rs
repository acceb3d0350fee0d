// Copyright 2026 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Glyph rasterization.

use swash::scale::image::Content;
use swash::scale::{Render, ScaleContext, Source, StrikeWith};
use swash::zeno::Format;

use crate::{LoadedFont, VerticalMetrics};

/// A coverage mask for one glyph, positioned relative to its drawing origin.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RasterGlyph {
    /// Offset from the origin to the left edge of the mask.
    pub left: i32,
    /// Offset from the baseline up to the top edge of the mask.
    pub top: i32,
    /// Mask width in pixels. This is the glyph's measured ink width.
    pub width: u32,
    /// Mask height in pixels.
    pub height: u32,
    /// Row-major coverage, one byte per pixel.
    pub coverage: Vec<u8>,
}

impl RasterGlyph {
    /// Returns the coverage at `(x, y)` within the mask.
    pub fn coverage_at(&self, x: u32, y: u32) -> u8 {
        self.coverage
            .get((y * self.width + x) as usize)
            .copied()
            .unwrap_or(0)
    }
}

/// Source of character bitmaps for the tile renderer.
pub trait GlyphRasterizer {
    /// Returns the ascent and descent of the font at its render size.
    fn vertical_metrics(&self) -> VerticalMetrics;

    /// Rasterizes `ch`, or returns `None` if it has no visible ink.
    fn rasterize(&mut self, ch: char) -> Option<RasterGlyph>;
}

/// Rasterizes glyphs from a font with swash.
pub struct SwashRasterizer {
    font: LoadedFont,
    size: f32,
    hint: bool,
    context: ScaleContext,
}

impl core::fmt::Debug for SwashRasterizer {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SwashRasterizer")
            .field("font", &self.font)
            .field("size", &self.size)
            .field("hint", &self.hint)
            .finish_non_exhaustive()
    }
}

impl SwashRasterizer {
    /// Creates a rasterizer for `font` at `size` pixels per em, with hinting on.
    pub fn new(font: LoadedFont, size: f32) -> Self {
        Self {
            font,
            size,
            hint: true,
            context: ScaleContext::new(),
        }
    }

    /// Enables or disables hinting.
    pub fn with_hinting(mut self, hint: bool) -> Self {
        self.hint = hint;
        self
    }

    /// Returns the font being rasterized.
    pub fn font(&self) -> &LoadedFont {
        &self.font
    }
}

impl GlyphRasterizer for SwashRasterizer {
    fn vertical_metrics(&self) -> VerticalMetrics {
        self.font.vertical_metrics(self.size)
    }

    fn rasterize(&mut self, ch: char) -> Option<RasterGlyph> {
        let font = self.font.font_ref()?;
        let glyph_id = font.charmap().map(ch);
        if glyph_id == 0 {
            tracing::warn!("Font {} has no glyph for {ch:?}", self.font.name());
        }

        let mut scaler = self
            .context
            .builder(font)
            .size(self.size)
            .hint(self.hint)
            .build();
        let image = Render::new(&[
            Source::ColorOutline(0),
            Source::ColorBitmap(StrikeWith::BestFit),
            Source::Outline,
        ])
        .format(Format::Alpha)
        .render(&mut scaler, glyph_id)?;

        let placement = image.placement;
        if placement.width == 0 || placement.height == 0 {
            return None;
        }
        Some(RasterGlyph {
            left: placement.left,
            top: placement.top,
            width: placement.width,
            height: placement.height,
            coverage: alpha_coverage(image.content, image.data),
        })
    }
}

/// Reduces rendered glyph data to one coverage byte per pixel.
fn alpha_coverage(content: Content, data: Vec<u8>) -> Vec<u8> {
    match content {
        Content::Mask => data,
        // Colour glyphs are drawn as a white silhouette of their alpha.
        Content::Color => data.chunks_exact(4).map(|px| px[3]).collect(),
        Content::SubpixelMask => data.chunks_exact(4).map(|px| px[1]).collect(),
    }
}
