// Copyright 2026 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The layout map written next to the atlas image.
//!
//! The map lists the grid dimensions, the tile size, and for every key the
//! tile it occupies and its rendered width. It is written either as a Lua
//! chunk that returns a table:
//!
//! ```lua
//! -- Auto-generated square font map
//! return {
//!     cols = 2,
//!     rows = 2,
//!     tile_size = {x=128,y=128},
//!     chars = {
//!         ["A"]={x=0,y=0,width=40},
//!     }
//! }
//! ```
//!
//! or as the equivalent JSON document. The Lua form can be parsed back with
//! [`LayoutMap::parse_lua`].

use core::fmt::{self, Write as _};

use serde::ser::{SerializeMap, SerializeStruct};
use serde::{Serialize, Serializer};

use crate::{GridLayout, MapFormat, TileCoord};

/// Layout data for a single key.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct TileRecord {
    /// Grid column.
    pub x: u32,
    /// Grid row.
    pub y: u32,
    /// Rendered width in pixels.
    pub width: u32,
}

impl TileRecord {
    /// Creates a record for the tile at `coord`.
    pub fn new(coord: TileCoord, width: u32) -> Self {
        Self {
            x: coord.col,
            y: coord.row,
            width,
        }
    }

    /// Returns the grid position.
    pub fn coord(&self) -> TileCoord {
        TileCoord {
            col: self.x,
            row: self.y,
        }
    }
}

/// Grid dimensions plus per-key records, in insertion order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LayoutMap {
    /// Number of grid columns.
    pub cols: u32,
    /// Number of grid rows.
    pub rows: u32,
    /// Tile edge length in pixels.
    pub tile_size: u32,
    chars: Vec<(String, TileRecord)>,
}

impl LayoutMap {
    /// Creates an empty map for `grid`.
    pub fn new(grid: &GridLayout) -> Self {
        Self {
            cols: grid.cols(),
            rows: grid.rows(),
            tile_size: grid.tile_size(),
            chars: Vec::new(),
        }
    }

    /// Appends a record.
    pub fn insert(&mut self, key: impl Into<String>, record: TileRecord) {
        self.chars.push((key.into(), record));
    }

    /// Looks up the record for `key`.
    pub fn get(&self, key: &str) -> Option<&TileRecord> {
        self.chars
            .iter()
            .find_map(|(name, record)| (name == key).then_some(record))
    }

    /// Returns the records in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &TileRecord)> + '_ {
        self.chars.iter().map(|(name, record)| (name.as_str(), record))
    }

    /// Returns the number of records.
    pub fn len(&self) -> usize {
        self.chars.len()
    }

    /// Returns `true` if the map has no records.
    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    /// Renders the map in `format`.
    pub fn render(&self, format: MapFormat) -> Result<String, serde_json::Error> {
        match format {
            MapFormat::Lua => Ok(self.to_lua()),
            MapFormat::Json => serde_json::to_string_pretty(self),
        }
    }

    /// Renders the map as a Lua chunk.
    pub fn to_lua(&self) -> String {
        self.to_string()
    }

    fn write_lua(&self, out: &mut impl fmt::Write) -> fmt::Result {
        out.write_str("-- Auto-generated square font map\nreturn {\n")?;
        writeln!(out, "\tcols = {},", self.cols)?;
        writeln!(out, "\trows = {},", self.rows)?;
        writeln!(
            out,
            "\ttile_size = {{x={size},y={size}}},",
            size = self.tile_size
        )?;
        out.write_str("\tchars = {\n")?;
        for (key, record) in &self.chars {
            writeln!(
                out,
                "\t\t[\"{}\"]={{x={},y={},width={}}},",
                escape_key(key),
                record.x,
                record.y,
                record.width
            )?;
        }
        out.write_str("\t}\n}")
    }

    /// Parses a map previously written by [`LayoutMap::to_lua`].
    ///
    /// Comments, whitespace, and the order of fields are not significant, and
    /// both `,` and `;` separate fields.
    pub fn parse_lua(source: &str) -> Result<Self, ParseMapError> {
        let mut parser = Parser {
            source: source.as_bytes(),
            pos: 0,
        };
        parser.skip_trivia();
        parser.expect_word(b"return")?;
        let root = parser.table()?;
        parser.skip_trivia();
        if parser.pos < parser.source.len() {
            return Err(parser.error(ParseMapErrorKind::TrailingInput));
        }
        Self::from_table(root)
    }

    fn from_table(root: Table) -> Result<Self, ParseMapError> {
        let mut map = Self::default();
        let (mut cols, mut rows, mut tile_size, mut chars) = (None, None, None, None);
        for (key, at, value) in root.fields {
            match key.as_str() {
                "cols" => cols = Some(value.into_int(at)?),
                "rows" => rows = Some(value.into_int(at)?),
                "tile_size" => {
                    let size = value.into_table(at)?;
                    let x = size.int("x", size.at)?;
                    let y = size.int("y", size.at)?;
                    if x != y {
                        return Err(ParseMapError::new(ParseMapErrorKind::InvalidValue, at));
                    }
                    tile_size = Some(x);
                }
                "chars" => chars = Some(value.into_table(at)?),
                _ => {}
            }
        }
        map.cols = cols.ok_or_else(|| ParseMapError::missing(root.at))?;
        map.rows = rows.ok_or_else(|| ParseMapError::missing(root.at))?;
        map.tile_size = tile_size.ok_or_else(|| ParseMapError::missing(root.at))?;
        let chars = chars.ok_or_else(|| ParseMapError::missing(root.at))?;
        for (key, at, value) in chars.fields {
            let record = value.into_table(at)?;
            map.insert(
                key,
                TileRecord {
                    x: record.int("x", at)?,
                    y: record.int("y", at)?,
                    width: record.int("width", at)?,
                },
            );
        }
        Ok(map)
    }
}

/// Formats the map as a Lua chunk.
impl fmt::Display for LayoutMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_lua(f)
    }
}

impl Serialize for LayoutMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_struct("LayoutMap", 4)?;
        map.serialize_field("cols", &self.cols)?;
        map.serialize_field("rows", &self.rows)?;
        map.serialize_field(
            "tile_size",
            &TileSize {
                x: self.tile_size,
                y: self.tile_size,
            },
        )?;
        map.serialize_field("chars", &OrderedChars(&self.chars))?;
        map.end()
    }
}

#[derive(Serialize)]
struct TileSize {
    x: u32,
    y: u32,
}

struct OrderedChars<'a>(&'a [(String, TileRecord)]);

impl Serialize for OrderedChars<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (key, record) in self.0 {
            map.serialize_entry(key, record)?;
        }
        map.end()
    }
}

/// Escapes a key for use inside a double-quoted Lua string literal.
///
/// Backslashes and double quotes are backslash-escaped, line breaks and tabs
/// use their short escapes, and any other control character is written as a
/// three-digit decimal escape so the literal stays on one line.
pub fn escape_key(key: &str) -> String {
    let mut escaped = String::with_capacity(key.len());
    for ch in key.chars() {
        match ch {
            '\\' => escaped.push_str("\\\\"),
            '"' => escaped.push_str("\\\""),
            '\n' => escaped.push_str("\\n"),
            '\r' => escaped.push_str("\\r"),
            '\t' => escaped.push_str("\\t"),
            // Three digits so a following digit is never read as part of the escape.
            ch if ch.is_ascii_control() => {
                let _ = write!(escaped, "\\{:03}", u32::from(ch));
            }
            ch => escaped.push(ch),
        }
    }
    escaped
}

/// Kinds of errors that can occur when parsing a Lua layout map.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum ParseMapErrorKind {
    /// The source does not conform to the supported syntax.
    InvalidSyntax,
    /// A string literal was missing its closing quote.
    UnterminatedString,
    /// A value has the wrong type or is out of range.
    InvalidValue,
    /// A required field is absent.
    MissingField,
    /// Extra input follows the returned table.
    TrailingInput,
}

/// Error returned when parsing a Lua layout map.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ParseMapError {
    kind: ParseMapErrorKind,
    at: usize,
}

impl ParseMapError {
    const fn new(kind: ParseMapErrorKind, at: usize) -> Self {
        Self { kind, at }
    }

    const fn missing(at: usize) -> Self {
        Self::new(ParseMapErrorKind::MissingField, at)
    }

    /// Returns the error kind.
    pub const fn kind(self) -> ParseMapErrorKind {
        self.kind
    }

    /// Returns the byte offset into the source where the error was detected.
    pub const fn byte_offset(self) -> usize {
        self.at
    }
}

impl fmt::Display for ParseMapError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self.kind {
            ParseMapErrorKind::InvalidSyntax => "invalid layout map syntax",
            ParseMapErrorKind::UnterminatedString => "unterminated string in layout map",
            ParseMapErrorKind::InvalidValue => "invalid value in layout map",
            ParseMapErrorKind::MissingField => "missing field in layout map",
            ParseMapErrorKind::TrailingInput => "unexpected input after layout map",
        };
        write!(f, "{msg} at byte {}", self.at)
    }
}

impl core::error::Error for ParseMapError {}

enum Value {
    Int(i64),
    Table(Table),
}

impl Value {
    fn into_int(self, at: usize) -> Result<u32, ParseMapError> {
        match self {
            Self::Int(n) => u32::try_from(n)
                .map_err(|_| ParseMapError::new(ParseMapErrorKind::InvalidValue, at)),
            Self::Table(_) => Err(ParseMapError::new(ParseMapErrorKind::InvalidValue, at)),
        }
    }

    fn into_table(self, at: usize) -> Result<Table, ParseMapError> {
        match self {
            Self::Table(table) => Ok(table),
            Self::Int(_) => Err(ParseMapError::new(ParseMapErrorKind::InvalidValue, at)),
        }
    }
}

struct Table {
    at: usize,
    fields: Vec<(String, usize, Value)>,
}

impl Table {
    fn int(&self, name: &str, at: usize) -> Result<u32, ParseMapError> {
        match self.fields.iter().find(|(key, ..)| key == name) {
            Some((_, at, Value::Int(n))) => u32::try_from(*n)
                .map_err(|_| ParseMapError::new(ParseMapErrorKind::InvalidValue, *at)),
            Some((_, at, Value::Table(_))) => {
                Err(ParseMapError::new(ParseMapErrorKind::InvalidValue, *at))
            }
            None => Err(ParseMapError::missing(at)),
        }
    }
}

struct Parser<'a> {
    source: &'a [u8],
    pos: usize,
}

impl Parser<'_> {
    fn error(&self, kind: ParseMapErrorKind) -> ParseMapError {
        ParseMapError::new(kind, self.pos)
    }

    fn peek(&self) -> Option<u8> {
        self.source.get(self.pos).copied()
    }

    fn skip_trivia(&mut self) {
        loop {
            while self.peek().is_some_and(|b| b.is_ascii_whitespace()) {
                self.pos += 1;
            }
            if self.source[self.pos..].starts_with(b"--") {
                while self.peek().is_some_and(|b| b != b'\n') {
                    self.pos += 1;
                }
            } else {
                return;
            }
        }
    }

    fn eat(&mut self, byte: u8) -> bool {
        self.skip_trivia();
        if self.peek() == Some(byte) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, byte: u8) -> Result<(), ParseMapError> {
        if self.eat(byte) {
            Ok(())
        } else {
            Err(self.error(ParseMapErrorKind::InvalidSyntax))
        }
    }

    fn expect_word(&mut self, word: &[u8]) -> Result<(), ParseMapError> {
        self.skip_trivia();
        let start = self.pos;
        let ident = self.ident();
        if ident == word {
            Ok(())
        } else {
            Err(ParseMapError::new(ParseMapErrorKind::InvalidSyntax, start))
        }
    }

    fn ident(&mut self) -> &[u8] {
        let start = self.pos;
        while self
            .peek()
            .is_some_and(|b| b.is_ascii_alphanumeric() || b == b'_')
        {
            self.pos += 1;
        }
        &self.source[start..self.pos]
    }

    fn table(&mut self) -> Result<Table, ParseMapError> {
        self.skip_trivia();
        let at = self.pos;
        self.expect(b'{')?;
        let mut fields = Vec::new();
        loop {
            if self.eat(b'}') {
                return Ok(Table { at, fields });
            }
            let field_at = self.pos;
            let key = self.key()?;
            self.expect(b'=')?;
            let value = self.value()?;
            fields.push((key, field_at, value));
            if !(self.eat(b',') || self.eat(b';')) {
                self.expect(b'}')?;
                return Ok(Table { at, fields });
            }
        }
    }

    fn key(&mut self) -> Result<String, ParseMapError> {
        if self.eat(b'[') {
            self.skip_trivia();
            let key = self.string()?;
            self.expect(b']')?;
            return Ok(key);
        }
        let start = self.pos;
        let ident = self.ident();
        if ident.is_empty() || ident[0].is_ascii_digit() {
            return Err(ParseMapError::new(ParseMapErrorKind::InvalidSyntax, start));
        }
        // Identifiers are ASCII by construction.
        Ok(String::from_utf8_lossy(ident).into_owned())
    }

    fn string(&mut self) -> Result<String, ParseMapError> {
        let opening_quote = self.pos;
        let quote = match self.peek() {
            Some(q @ (b'"' | b'\'')) => q,
            _ => return Err(self.error(ParseMapErrorKind::InvalidSyntax)),
        };
        self.pos += 1;
        let mut bytes = Vec::new();
        loop {
            match self.peek() {
                None | Some(b'\n') => {
                    return Err(ParseMapError::new(
                        ParseMapErrorKind::UnterminatedString,
                        opening_quote,
                    ));
                }
                Some(b) if b == quote => {
                    self.pos += 1;
                    break;
                }
                Some(b'\\') => {
                    self.pos += 1;
                    let escaped = match self.peek() {
                        Some(b'n') => b'\n',
                        Some(b'r') => b'\r',
                        Some(b't') => b'\t',
                        Some(b @ (b'\\' | b'"' | b'\'')) => b,
                        Some(b'0'..=b'9') => {
                            bytes.push(self.decimal_escape()?);
                            continue;
                        }
                        None => {
                            return Err(ParseMapError::new(
                                ParseMapErrorKind::UnterminatedString,
                                opening_quote,
                            ));
                        }
                        Some(_) => return Err(self.error(ParseMapErrorKind::InvalidSyntax)),
                    };
                    bytes.push(escaped);
                    self.pos += 1;
                }
                Some(b) => {
                    bytes.push(b);
                    self.pos += 1;
                }
            }
        }
        String::from_utf8(bytes)
            .map_err(|_| ParseMapError::new(ParseMapErrorKind::InvalidValue, opening_quote))
    }

    /// Reads the up to three digits of a `\ddd` escape.
    fn decimal_escape(&mut self) -> Result<u8, ParseMapError> {
        let start = self.pos;
        let mut value = 0_u32;
        while self.pos - start < 3 {
            match self.peek() {
                Some(digit @ b'0'..=b'9') => {
                    value = value * 10 + u32::from(digit - b'0');
                    self.pos += 1;
                }
                _ => break,
            }
        }
        u8::try_from(value)
            .map_err(|_| ParseMapError::new(ParseMapErrorKind::InvalidValue, start))
    }

    fn value(&mut self) -> Result<Value, ParseMapError> {
        self.skip_trivia();
        if self.peek() == Some(b'{') {
            return self.table().map(Value::Table);
        }
        let start = self.pos;
        if self.peek() == Some(b'-') {
            self.pos += 1;
        }
        while self.peek().is_some_and(|b| b.is_ascii_digit()) {
            self.pos += 1;
        }
        core::str::from_utf8(&self.source[start..self.pos])
            .ok()
            .and_then(|digits| digits.parse().ok())
            .map(Value::Int)
            .ok_or_else(|| ParseMapError::new(ParseMapErrorKind::InvalidSyntax, start))
    }
}
