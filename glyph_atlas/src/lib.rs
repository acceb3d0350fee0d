// Copyright 2026 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Glyph Atlas bakes a font and a handful of icons into a single image of
//! fixed-size tiles, plus a layout map describing where each key lives.
//!
//! The pipeline runs once, front to back:
//!
//! 1. [`KeySet::build`] lists the keys: letters, digits, punctuation, then icons.
//! 2. [`GridLayout::plan`] picks a near-square grid for that many tiles.
//! 3. [`FontResolver::resolve`] finds the font and [`SwashRasterizer`] renders it.
//! 4. [`AtlasBuilder::build`] draws every tile and records its [`TileRecord`].
//! 5. [`Atlas::write`] saves the PNG and the [`LayoutMap`].
//!
//! [`generate`] runs all of the above for an [`AtlasConfig`].
//!
//! ## Example
//!
//! ```no_run
//! use glyph_atlas::{generate, AtlasConfig};
//!
//! let atlas = generate(&AtlasConfig::default())?;
//! println!("{} tiles", atlas.map().len());
//! # Ok::<(), glyph_atlas::AtlasError>(())
//! ```

// LINEBENDER LINT SET - lib.rs - v3
// See https://linebender.org/wiki/canonical-lints/
// These lints shouldn't apply to examples or tests.
#![cfg_attr(not(test), warn(unused_crate_dependencies))]
// These lints shouldn't apply to examples.
#![warn(clippy::print_stdout, clippy::print_stderr)]
// Targeting e.g. 32-bit means structs containing usize can give false positives for 64-bit.
#![cfg_attr(target_pointer_width = "64", warn(clippy::trivially_copy_pass_by_ref))]
// END LINEBENDER LINT SET
#![cfg_attr(docsrs, feature(doc_cfg))]

// Only the binary target uses these.
use anyhow as _;
use tracing_subscriber as _;

mod atlas;
mod config;
mod error;
mod font;
mod icon;
mod keys;
mod layout;
mod map;
mod raster;

pub use atlas::{generate, generate_with, Atlas, AtlasBuilder};
pub use config::{
    AtlasConfig, Charset, FontConfig, FontFallback, IconSource, IconWidthMetric, MapFormat,
    OutputConfig,
};
pub use error::AtlasError;
pub use font::{FontResolver, LoadedFont, VerticalMetrics};
pub use icon::{load_icon, IconPlacement};
pub use keys::{GlyphKey, KeyKind, KeySet};
pub use layout::{GridLayout, TileCoord};
pub use map::{escape_key, LayoutMap, ParseMapError, ParseMapErrorKind, TileRecord};
pub use raster::{GlyphRasterizer, RasterGlyph, SwashRasterizer};
