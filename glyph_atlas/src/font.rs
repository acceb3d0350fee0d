// Copyright 2026 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Font lookup and vertical metrics.

use std::path::Path;

use fontique::{Blob, Collection, CollectionOptions, FamilyInfo, GenericFamily, SourceCache};
use swash::FontRef;

use crate::{AtlasError, FontConfig, FontFallback};

/// Generic families tried, in order, when the requested family is missing.
const DEFAULT_FAMILIES: [GenericFamily; 4] = [
    GenericFamily::SansSerif,
    GenericFamily::SystemUi,
    GenericFamily::Serif,
    GenericFamily::Monospace,
];

/// Font data ready for rasterization.
#[derive(Clone)]
pub struct LoadedFont {
    data: Blob<u8>,
    index: u32,
    name: String,
    fell_back: bool,
}

impl core::fmt::Debug for LoadedFont {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("LoadedFont")
            .field("index", &self.index)
            .field("name", &self.name)
            .field("fell_back", &self.fell_back)
            .finish_non_exhaustive()
    }
}

impl LoadedFont {
    /// Wraps raw font file data, checking that it parses.
    pub fn from_data(
        data: impl Into<Blob<u8>>,
        index: u32,
        name: impl Into<String>,
    ) -> Result<Self, AtlasError> {
        let font = Self {
            data: data.into(),
            index,
            name: name.into(),
            fell_back: false,
        };
        if font.font_ref().is_none() {
            return Err(AtlasError::FontLoad {
                name: font.name,
                source: None,
            });
        }
        Ok(font)
    }

    /// Reads a font file from disk.
    pub fn from_path(path: &Path) -> Result<Self, AtlasError> {
        let name = path.display().to_string();
        let data = std::fs::read(path).map_err(|err| AtlasError::FontLoad {
            name: name.clone(),
            source: Some(err),
        })?;
        Self::from_data(data, 0, name)
    }

    /// Returns the family name or path the font was loaded from.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns `true` if this font was substituted for a missing family.
    pub fn fell_back(&self) -> bool {
        self.fell_back
    }

    /// Returns a swash view of the font.
    pub fn font_ref(&self) -> Option<FontRef<'_>> {
        FontRef::from_index(self.data.data(), self.index as usize)
    }

    /// Returns the vertical metrics at `size` pixels per em.
    pub fn vertical_metrics(&self, size: f32) -> VerticalMetrics {
        match self.font_ref() {
            Some(font) => {
                let metrics = font.metrics(&[]).scale(size);
                VerticalMetrics::from_scaled(metrics.ascent, metrics.descent)
            }
            None => VerticalMetrics::default(),
        }
    }
}

/// Ascent and descent in whole pixels, both measured away from the baseline.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct VerticalMetrics {
    /// Pixels above the baseline.
    pub ascent: i32,
    /// Pixels below the baseline.
    pub descent: i32,
}

impl VerticalMetrics {
    /// Converts scaled font metrics to whole pixels.
    ///
    /// Ascent rounds up and descent rounds toward zero.
    pub fn from_scaled(ascent: f32, descent: f32) -> Self {
        Self {
            ascent: ascent.ceil() as i32,
            descent: descent.abs().floor() as i32,
        }
    }

    /// Returns the baseline row, relative to the tile top, that centres the
    /// font's full vertical extent in a tile.
    pub fn baseline(&self, tile_size: u32) -> i32 {
        (tile_size as i32 - self.ascent + self.descent).div_euclid(2) + self.ascent
    }
}

/// Finds fonts by family name among the installed system fonts.
pub struct FontResolver {
    collection: Collection,
    source_cache: SourceCache,
}

impl core::fmt::Debug for FontResolver {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("FontResolver").finish_non_exhaustive()
    }
}

impl Default for FontResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl FontResolver {
    /// Creates a resolver over the system font collection.
    pub fn new() -> Self {
        Self {
            collection: Collection::new(CollectionOptions {
                shared: false,
                system_fonts: true,
            }),
            source_cache: SourceCache::default(),
        }
    }

    /// Returns the names of all installed families.
    pub fn family_names(&mut self) -> Vec<String> {
        let mut names: Vec<String> = self.collection.family_names().map(Into::into).collect();
        names.sort_unstable();
        names
    }

    /// Loads the font described by `config`.
    ///
    /// An explicit `path` wins over the family name. A missing family is an
    /// error under [`FontFallback::Fail`] and is replaced by the first
    /// available generic family otherwise.
    pub fn resolve(&mut self, config: &FontConfig) -> Result<LoadedFont, AtlasError> {
        if let Some(path) = &config.path {
            let font = LoadedFont::from_path(path)?;
            tracing::info!("Using font file {}", path.display());
            return Ok(font);
        }

        if let Some(family) = self.collection.family_by_name(&config.family) {
            tracing::info!("Resolved font family {:?}", family.name());
            return self.load_family(&family, false);
        }

        match config.fallback {
            FontFallback::Fail => Err(AtlasError::FontNotFound {
                family: config.family.clone(),
            }),
            FontFallback::Fallback => {
                let family = self
                    .default_family()
                    .ok_or_else(|| AtlasError::NoDefaultFont {
                        family: config.family.clone(),
                    })?;
                tracing::warn!(
                    "Font family {:?} is not installed, falling back to {:?}",
                    config.family,
                    family.name()
                );
                self.load_family(&family, true)
            }
        }
    }

    fn default_family(&mut self) -> Option<FamilyInfo> {
        for generic in DEFAULT_FAMILIES {
            let ids: Vec<_> = self.collection.generic_families(generic).collect();
            for id in ids {
                if let Some(family) = self.collection.family(id) {
                    if !family.fonts().is_empty() {
                        return Some(family);
                    }
                }
            }
        }
        None
    }

    fn load_family(
        &mut self,
        family: &FamilyInfo,
        fell_back: bool,
    ) -> Result<LoadedFont, AtlasError> {
        let load_error = || AtlasError::FontLoad {
            name: family.name().to_owned(),
            source: None,
        };
        let info = family.default_font().ok_or_else(load_error)?;
        let data = info
            .load(Some(&mut self.source_cache))
            .ok_or_else(load_error)?;
        let mut font = LoadedFont::from_data(data, info.index(), family.name())?;
        font.fell_back = fell_back;
        Ok(font)
    }
}
