// Copyright 2026 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Icon tiles.

use std::path::Path;

use image::imageops::{self, FilterType};
use image::RgbaImage;

use crate::{AtlasError, IconWidthMetric};

/// An icon's longer side is scaled to the tile size divided by this.
const ICON_SHRINK: f64 = 1.5;

/// Divisor that turns a scaled icon dimension into its baseline rise and
/// recorded width.
const ICON_BASELINE_DIVISOR: f64 = 1.25;

/// Loads an icon as RGBA.
pub fn load_icon(key: &str, path: &Path) -> Result<RgbaImage, AtlasError> {
    let image = image::open(path).map_err(|source| AtlasError::IconLoad {
        key: key.to_owned(),
        path: path.to_path_buf(),
        source,
    })?;
    Ok(image.to_rgba8())
}

/// Size and offsets of an icon scaled into a tile.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct IconPlacement {
    /// Scaled icon width in pixels.
    pub width: u32,
    /// Scaled icon height in pixels.
    pub height: u32,
    /// Horizontal offset of the icon from the tile's left edge.
    pub x: i64,
    /// Vertical offset of the icon from the tile's top edge.
    pub y: i64,
    /// Width recorded in the layout map.
    pub recorded_width: u32,
}

impl IconPlacement {
    /// Fits an icon of `width` by `height` pixels into a tile.
    ///
    /// The icon is scaled uniformly so its longer side spans two thirds of the
    /// tile, centred horizontally, and raised above `baseline` by its scaled
    /// height divided by 1.25.
    pub fn fit(
        width: u32,
        height: u32,
        tile_size: u32,
        baseline: i32,
        metric: IconWidthMetric,
    ) -> Self {
        let target = f64::from(tile_size) / ICON_SHRINK;
        let scale = (target / f64::from(width.max(1))).min(target / f64::from(height.max(1)));
        let scaled_width = ((f64::from(width) * scale) as u32).max(1);
        let scaled_height = ((f64::from(height) * scale) as u32).max(1);

        let rise = reduced(scaled_height);
        let recorded_width = match metric {
            IconWidthMetric::ScaledHeight => rise,
            IconWidthMetric::ScaledWidth => reduced(scaled_width),
        };
        Self {
            width: scaled_width,
            height: scaled_height,
            x: (i64::from(tile_size) - i64::from(scaled_width)).div_euclid(2),
            y: i64::from(baseline) - i64::from(rise),
            recorded_width,
        }
    }

    /// Resizes `icon` to this placement's size.
    pub fn resize(&self, icon: &RgbaImage) -> RgbaImage {
        imageops::resize(icon, self.width, self.height, FilterType::Lanczos3)
    }
}

fn reduced(dimension: u32) -> u32 {
    (f64::from(dimension) / ICON_BASELINE_DIVISOR).floor() as u32
}
