// Copyright 2026 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Build parameters for an atlas.
//!
//! [`AtlasConfig::default`] holds the stock parameters; a TOML file can
//! override any subset of them.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::AtlasError;

/// Everything that determines the contents of an atlas and where it is written.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AtlasConfig {
    /// Font selection and size.
    pub font: FontConfig,
    /// Width and height of one square tile in pixels.
    pub tile_size: u32,
    /// Characters rendered from the font.
    pub charset: Charset,
    /// Custom icons, in grid order, placed after the characters.
    pub icons: Vec<IconSource>,
    /// Which scaled dimension is recorded as an icon's width.
    pub icon_width: IconWidthMetric,
    /// Output locations.
    pub output: OutputConfig,
}

impl Default for AtlasConfig {
    fn default() -> Self {
        Self {
            font: FontConfig::default(),
            tile_size: 128,
            charset: Charset::default(),
            icons: vec![IconSource {
                key: "*".into(),
                path: PathBuf::from("textures/base/pack/logo.png"),
            }],
            icon_width: IconWidthMetric::default(),
            output: OutputConfig::default(),
        }
    }
}

impl AtlasConfig {
    /// Parses a configuration from TOML source. Missing fields keep their defaults.
    pub fn from_toml(source: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(source)
    }

    /// Reads, parses and validates a TOML configuration file.
    pub fn load(path: &Path) -> Result<Self, AtlasError> {
        let source = std::fs::read_to_string(path).map_err(|err| AtlasError::io(path, err))?;
        let config = Self::from_toml(&source).map_err(|source| AtlasError::Config {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Checks the values that their types alone do not constrain.
    pub fn validate(&self) -> Result<(), AtlasError> {
        if self.tile_size == 0 {
            return Err(AtlasError::InvalidConfig {
                reason: "tile_size must be at least 1",
            });
        }
        if !(self.font.size.is_finite() && self.font.size > 0.0) {
            return Err(AtlasError::InvalidConfig {
                reason: "font.size must be a positive number",
            });
        }
        Ok(())
    }
}

/// Font selection.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FontConfig {
    /// Family name looked up among the installed fonts.
    pub family: String,
    /// Pixel size the glyphs are rendered at.
    pub size: f32,
    /// Font file to use instead of a family lookup.
    pub path: Option<PathBuf>,
    /// What to do when `family` is not installed.
    pub fallback: FontFallback,
}

impl Default for FontConfig {
    fn default() -> Self {
        Self {
            family: "Unispace".into(),
            size: 64.0,
            path: None,
            fallback: FontFallback::Fallback,
        }
    }
}

/// Policy for a font family that is not installed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FontFallback {
    /// Substitute a generic system font and carry on.
    #[default]
    Fallback,
    /// Abort with [`AtlasError::FontNotFound`].
    Fail,
}

/// The character ranges rendered from the font, in grid order.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Charset {
    /// `A` through `Z`.
    pub uppercase: bool,
    /// `a` through `z`.
    pub lowercase: bool,
    /// `0` through `9`.
    pub digits: bool,
    /// Extra characters appended after the ranges above.
    pub punctuation: String,
}

impl Default for Charset {
    fn default() -> Self {
        Self {
            uppercase: true,
            lowercase: true,
            digits: true,
            punctuation: "._-".into(),
        }
    }
}

/// A custom icon tile.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct IconSource {
    /// Key the icon is addressed by in the layout map.
    pub key: String,
    /// Image file the icon is loaded from.
    pub path: PathBuf,
}

/// Source of the width recorded for icon tiles.
///
/// Both variants divide by 1.25 and round down.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IconWidthMetric {
    /// Derive the width from the scaled icon height.
    ///
    /// This is the value the map format documents for icons. It is most
    /// likely unintended, since it is not a width at all.
    #[default]
    ScaledHeight,
    /// Derive the width from the scaled icon width.
    ScaledWidth,
}

/// Output locations and layout map format.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputConfig {
    /// PNG file the atlas image is written to.
    pub atlas: PathBuf,
    /// File the layout map is written to.
    pub map: PathBuf,
    /// Format of the layout map.
    pub map_format: MapFormat,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            atlas: PathBuf::from("textures/custom_assets/font_atlas.png"),
            map: PathBuf::from("builtin/eclipse/font_map.lua"),
            map_format: MapFormat::Lua,
        }
    }
}

/// Serialization format of the layout map.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum MapFormat {
    /// A Lua chunk returning a table.
    #[default]
    Lua,
    /// A JSON document.
    Json,
}
