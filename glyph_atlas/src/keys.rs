// Copyright 2026 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The ordered set of keys that become atlas tiles.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::{AtlasError, Charset, IconSource};

/// What a tile is rendered from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum KeyKind {
    /// A character rasterized from the font.
    Char(char),
    /// An image loaded from disk.
    Icon(PathBuf),
}

/// One atlas tile's identity.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GlyphKey {
    name: String,
    kind: KeyKind,
}

impl GlyphKey {
    /// Creates a key for a font character.
    pub fn char(ch: char) -> Self {
        Self {
            name: ch.to_string(),
            kind: KeyKind::Char(ch),
        }
    }

    /// Creates a key for an icon image.
    pub fn icon(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            kind: KeyKind::Icon(path.into()),
        }
    }

    /// Returns the string the key is addressed by in the layout map.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns what the tile is rendered from.
    pub fn kind(&self) -> &KeyKind {
        &self.kind
    }

    /// Returns the icon path if this is an icon key.
    pub fn icon_path(&self) -> Option<&Path> {
        match &self.kind {
            KeyKind::Icon(path) => Some(path),
            KeyKind::Char(_) => None,
        }
    }
}

/// Keys in grid order, free of duplicates.
///
/// A key's position in the set is its tile index.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct KeySet {
    keys: Vec<GlyphKey>,
}

impl KeySet {
    /// Builds the key set for a charset followed by the icons.
    ///
    /// Characters come first in the order uppercase, lowercase, digits,
    /// punctuation; icons follow in the order given.
    pub fn build(charset: &Charset, icons: &[IconSource]) -> Result<Self, AtlasError> {
        let chars = charset
            .uppercase
            .then_some('A'..='Z')
            .into_iter()
            .flatten()
            .chain(charset.lowercase.then_some('a'..='z').into_iter().flatten())
            .chain(charset.digits.then_some('0'..='9').into_iter().flatten())
            .chain(charset.punctuation.chars())
            .map(GlyphKey::char);
        let icons = icons
            .iter()
            .map(|icon| GlyphKey::icon(icon.key.clone(), icon.path.clone()));
        Self::from_keys(chars.chain(icons))
    }

    /// Collects keys in iteration order, rejecting any name that repeats.
    pub fn from_keys(keys: impl IntoIterator<Item = GlyphKey>) -> Result<Self, AtlasError> {
        let mut seen = HashSet::new();
        let mut out = Vec::new();
        for key in keys {
            if !seen.insert(key.name.clone()) {
                return Err(AtlasError::DuplicateKey { key: key.name });
            }
            out.push(key);
        }
        Ok(Self { keys: out })
    }

    /// Returns the number of keys.
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Returns `true` if there are no keys.
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Returns an iterator over the keys in grid order.
    pub fn iter(&self) -> core::slice::Iter<'_, GlyphKey> {
        self.keys.iter()
    }
}

impl<'a> IntoIterator for &'a KeySet {
    type Item = &'a GlyphKey;
    type IntoIter = core::slice::Iter<'a, GlyphKey>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
