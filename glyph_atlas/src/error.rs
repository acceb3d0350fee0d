// Copyright 2026 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Errors produced while building or writing an atlas.

use std::io;
use std::path::PathBuf;

/// Error returned by the atlas pipeline.
///
/// Apart from a missing font family under [`FontFallback::Fallback`], every
/// failure is fatal for the run.
///
/// [`FontFallback::Fallback`]: crate::FontFallback::Fallback
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum AtlasError {
    /// The requested font family is not installed and fallback is disabled.
    #[error("font family {family:?} is not installed")]
    FontNotFound {
        /// The family name that was looked up.
        family: String,
    },
    /// Neither the requested family nor any generic default family could be found.
    #[error("font family {family:?} is not installed and no default font is available")]
    NoDefaultFont {
        /// The family name that was looked up.
        family: String,
    },
    /// The resolved font could not be read or parsed.
    #[error("failed to load font {name}")]
    FontLoad {
        /// Family name or file path of the font.
        name: String,
        /// Underlying I/O error, if the font came from a file that could not be read.
        #[source]
        source: Option<io::Error>,
    },
    /// An icon image could not be opened or decoded.
    #[error("failed to load icon {key:?} from {}", path.display())]
    IconLoad {
        /// The icon key.
        key: String,
        /// Path the icon was read from.
        path: PathBuf,
        /// Underlying decode error.
        #[source]
        source: image::ImageError,
    },
    /// Two sources produced the same glyph key.
    #[error("glyph key {key:?} appears more than once")]
    DuplicateKey {
        /// The repeated key.
        key: String,
    },
    /// There is nothing to put in the atlas.
    #[error("the key set is empty")]
    EmptyKeySet,
    /// More keys than a grid can index.
    #[error("{count} keys do not fit in one atlas")]
    TooManyKeys {
        /// Number of keys requested.
        count: usize,
    },
    /// A configuration value is out of range.
    #[error("invalid configuration: {reason}")]
    InvalidConfig {
        /// Which value is wrong and why.
        reason: &'static str,
    },
    /// The atlas image would be too large to address in memory.
    #[error("a {cols}x{rows} grid of {tile_size}px tiles is too large for one image")]
    AtlasTooLarge {
        /// Grid columns.
        cols: u32,
        /// Grid rows.
        rows: u32,
        /// Tile edge length in pixels.
        tile_size: u32,
    },
    /// Reading or writing a file failed.
    #[error("I/O error on {}", path.display())]
    Io {
        /// The file or directory involved.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
    /// Encoding the atlas image failed.
    #[error("failed to write atlas image {}", path.display())]
    ImageWrite {
        /// Destination path.
        path: PathBuf,
        /// Underlying encode error.
        #[source]
        source: image::ImageError,
    },
    /// A configuration file could not be parsed.
    #[error("invalid configuration in {}", path.display())]
    Config {
        /// The configuration file.
        path: PathBuf,
        /// Underlying parse error.
        #[source]
        source: toml::de::Error,
    },
    /// Serializing the layout map as JSON failed.
    #[error("failed to serialize layout map")]
    MapSerialize(#[from] serde_json::Error),
}

impl AtlasError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
