// Copyright 2026 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! End to end atlas generation with a deterministic rasterizer.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use glyph_atlas::{
    generate, generate_with, AtlasConfig, AtlasError, Charset, FontConfig, FontFallback,
    GlyphRasterizer, GridLayout, IconSource, IconWidthMetric, LayoutMap, LoadedFont, MapFormat,
    OutputConfig, RasterGlyph, TileCoord, VerticalMetrics,
};
use image::{Rgba, RgbaImage};
use tempfile::TempDir;

const ASCENT: i32 = 40;
const DESCENT: i32 = 10;
const GLYPH_HEIGHT: u32 = 30;

/// Font files shipped with common Linux, macOS and Windows installs.
const SYSTEM_FONT_FILES: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSansMono.ttf",
    "/usr/share/fonts/dejavu/DejaVuSansMono.ttf",
    "/usr/share/fonts/TTF/DejaVuSansMono.ttf",
    "/usr/share/fonts/dejavu-sans-mono-fonts/DejaVuSansMono.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationMono-Regular.ttf",
    "/System/Library/Fonts/Supplemental/Courier New.ttf",
    "C:\\Windows\\Fonts\\cour.ttf",
];

/// Draws every character as a solid block standing on the baseline.
///
/// Block widths differ per character so recorded widths can be told apart.
struct BlockRasterizer;

impl BlockRasterizer {
    fn width_of(ch: char) -> u32 {
        10 + (ch as u32 % 7) * 3
    }
}

impl GlyphRasterizer for BlockRasterizer {
    fn vertical_metrics(&self) -> VerticalMetrics {
        VerticalMetrics {
            ascent: ASCENT,
            descent: DESCENT,
        }
    }

    fn rasterize(&mut self, ch: char) -> Option<RasterGlyph> {
        let width = Self::width_of(ch);
        Some(RasterGlyph {
            left: 0,
            top: GLYPH_HEIGHT as i32,
            width,
            height: GLYPH_HEIGHT,
            coverage: vec![255; (width * GLYPH_HEIGHT) as usize],
        })
    }
}

fn only_chars(chars: &str) -> Charset {
    Charset {
        uppercase: false,
        lowercase: false,
        digits: false,
        punctuation: chars.into(),
    }
}

fn config_in(dir: &Path, charset: Charset, icons: Vec<IconSource>) -> AtlasConfig {
    AtlasConfig {
        charset,
        icons,
        output: OutputConfig {
            atlas: dir.join("textures/custom_assets/font_atlas.png"),
            map: dir.join("builtin/eclipse/font_map.lua"),
            map_format: MapFormat::Lua,
        },
        ..AtlasConfig::default()
    }
}

fn write_icon(dir: &Path, name: &str, width: u32, height: u32) -> PathBuf {
    let path = dir.join(name);
    RgbaImage::from_pixel(width, height, Rgba([255, 0, 0, 255]))
        .save(&path)
        .expect("Failed to write icon");
    path
}

fn baseline() -> i64 {
    i64::from(
        VerticalMetrics {
            ascent: ASCENT,
            descent: DESCENT,
        }
        .baseline(128),
    )
}

#[test]
fn three_keys_fill_a_two_by_two_grid() {
    let dir = TempDir::new().unwrap();
    let config = config_in(dir.path(), only_chars("ABC"), Vec::new());

    let atlas = generate_with(&config, &mut BlockRasterizer).unwrap();
    assert_eq!(atlas.image().dimensions(), (256, 256));
    assert_eq!((atlas.map().cols, atlas.map().rows), (2, 2));

    let written = image::open(&config.output.atlas).unwrap();
    assert_eq!((written.width(), written.height()), (256, 256));

    let source = std::fs::read_to_string(&config.output.map).unwrap();
    let map = LayoutMap::parse_lua(&source).unwrap();
    assert_eq!(&map, atlas.map());
    assert_eq!(map.get("A").unwrap().coord(), TileCoord { col: 0, row: 0 });
    assert_eq!(map.get("B").unwrap().coord(), TileCoord { col: 1, row: 0 });
    assert_eq!(map.get("C").unwrap().coord(), TileCoord { col: 0, row: 1 });
    assert_eq!(map.get("B").unwrap().width, BlockRasterizer::width_of('B'));
}

#[test]
fn characters_are_centred_on_the_baseline() {
    let dir = TempDir::new().unwrap();
    let config = config_in(dir.path(), only_chars("AB"), Vec::new());
    let atlas = generate_with(&config, &mut BlockRasterizer).unwrap();
    let image = atlas.image();

    // "B" is in the second tile of the first row.
    let width = i64::from(BlockRasterizer::width_of('B'));
    let left = 128 + (128 - width).div_euclid(2);
    let bottom = baseline() - 1;
    let px = |x: i64, y: i64| *image.get_pixel(x as u32, y as u32);

    assert_eq!(px(left, bottom), Rgba([255, 255, 255, 255]));
    assert_eq!(px(left + width - 1, bottom), Rgba([255, 255, 255, 255]));
    assert_eq!(px(left, bottom - i64::from(GLYPH_HEIGHT) + 1)[3], 255);
    assert_eq!(px(left - 1, bottom)[3], 0);
    assert_eq!(px(left + width, bottom)[3], 0);
    assert_eq!(px(left, bottom + 1)[3], 0);
    assert_eq!(px(left, bottom - i64::from(GLYPH_HEIGHT))[3], 0);
}

#[test]
fn stock_charset_with_icon() {
    let dir = TempDir::new().unwrap();
    let logo = write_icon(dir.path(), "logo.png", 40, 20);
    let icons = vec![IconSource {
        key: "*".into(),
        path: logo,
    }];
    let config = config_in(dir.path(), Charset::default(), icons);

    let atlas = generate_with(&config, &mut BlockRasterizer).unwrap();
    let grid = GridLayout::plan(66, 128);
    assert_eq!(*atlas.grid(), grid);
    assert_eq!(atlas.image().dimensions(), (9 * 128, 8 * 128));

    let map = atlas.map();
    assert_eq!(map.len(), 66);
    let keys: HashSet<_> = map.iter().map(|(key, _)| key).collect();
    assert_eq!(keys.len(), 66);
    let coords: HashSet<_> = map.iter().map(|(_, record)| record.coord()).collect();
    assert_eq!(coords.len(), 66);
    for (key, record) in map.iter() {
        assert!(record.x < grid.cols() && record.y < grid.rows(), "{key}");
    }

    // Scaled to 85x42; the recorded width comes from the height: floor(42 / 1.25).
    let icon = map.get("*").unwrap();
    assert_eq!(icon.coord(), TileCoord { col: 2, row: 7 });
    assert_eq!(icon.width, 33);

    let centre_x = 2 * 128 + 21 + 42;
    let centre_y = 7 * 128 + (baseline() - 33) + 21;
    let pixel = atlas.image().get_pixel(centre_x as u32, centre_y as u32);
    assert!(pixel[0] > 200 && pixel[1] < 50 && pixel[3] > 200, "{pixel:?}");
    // Outside the scaled icon the tile stays transparent.
    assert_eq!(atlas.image().get_pixel(2 * 128 + 5, 7 * 128 + 5)[3], 0);
}

#[test]
fn icon_width_can_follow_scaled_width() {
    let dir = TempDir::new().unwrap();
    let logo = write_icon(dir.path(), "logo.png", 40, 20);
    let mut config = config_in(
        dir.path(),
        only_chars("A"),
        vec![IconSource {
            key: "*".into(),
            path: logo,
        }],
    );
    config.icon_width = IconWidthMetric::ScaledWidth;
    let atlas = generate_with(&config, &mut BlockRasterizer).unwrap();
    assert_eq!(atlas.map().get("*").unwrap().width, 68);
}

#[test]
fn missing_icon_aborts_before_writing() {
    let dir = TempDir::new().unwrap();
    let icons = vec![IconSource {
        key: "*".into(),
        path: dir.path().join("missing.png"),
    }];
    let config = config_in(dir.path(), only_chars("A"), icons);

    let err = generate_with(&config, &mut BlockRasterizer).unwrap_err();
    assert!(matches!(err, AtlasError::IconLoad { .. }), "{err}");
    assert!(!config.output.atlas.exists());
    assert!(!config.output.map.exists());
}

#[test]
fn duplicate_keys_are_rejected() {
    let dir = TempDir::new().unwrap();
    let logo = write_icon(dir.path(), "logo.png", 8, 8);
    let icons = vec![IconSource {
        key: "A".into(),
        path: logo,
    }];
    let config = config_in(dir.path(), Charset::default(), icons);
    let err = generate_with(&config, &mut BlockRasterizer).unwrap_err();
    assert!(matches!(err, AtlasError::DuplicateKey { ref key } if key == "A"));
}

#[test]
fn special_keys_survive_the_written_map() {
    let dir = TempDir::new().unwrap();
    let config = config_in(dir.path(), only_chars("\\\"'"), Vec::new());
    generate_with(&config, &mut BlockRasterizer).unwrap();

    let source = std::fs::read_to_string(&config.output.map).unwrap();
    assert!(source.contains(r#"["\\"]="#));
    assert!(source.contains(r#"["\""]="#));
    let map = LayoutMap::parse_lua(&source).unwrap();
    let keys: Vec<_> = map.iter().map(|(key, _)| key).collect();
    assert_eq!(keys, ["\\", "\"", "'"]);
}

#[test]
fn json_map_matches_layout() {
    let dir = TempDir::new().unwrap();
    let mut config = config_in(dir.path(), only_chars("xyz"), Vec::new());
    config.output.map = dir.path().join("font_map.json");
    config.output.map_format = MapFormat::Json;
    config.tile_size = 32;

    let atlas = generate_with(&config, &mut BlockRasterizer).unwrap();
    assert_eq!(atlas.image().dimensions(), (64, 64));
    let source = std::fs::read_to_string(&config.output.map).unwrap();
    let value: serde_json::Value = serde_json::from_str(&source).unwrap();
    assert_eq!(value["cols"], 2);
    assert_eq!(value["rows"], 2);
    assert_eq!(value["tile_size"]["y"], 32);
    assert_eq!(value["chars"]["z"]["x"], 0);
    assert_eq!(value["chars"]["z"]["y"], 1);
}

fn system_font_file() -> Option<PathBuf> {
    let found = SYSTEM_FONT_FILES
        .iter()
        .map(PathBuf::from)
        .find(|path| path.is_file());
    if found.is_none() {
        eprintln!("skipping, none of the known font files is installed");
    }
    found
}

/// Bounding box of the inked pixels in a tile as `(left, top, right, bottom)`,
/// inclusive and relative to the tile.
fn ink_bounds(image: &RgbaImage, coord: TileCoord, tile: u32) -> Option<(u32, u32, u32, u32)> {
    let mut bounds: Option<(u32, u32, u32, u32)> = None;
    for y in 0..tile {
        for x in 0..tile {
            if image.get_pixel(coord.col * tile + x, coord.row * tile + y)[3] == 0 {
                continue;
            }
            bounds = Some(match bounds {
                None => (x, y, x, y),
                Some((l, t, r, b)) => (l.min(x), t.min(y), r.max(x), b.max(y)),
            });
        }
    }
    bounds
}

#[test]
fn font_file_ink_lands_inside_its_tile() {
    let Some(font_path) = system_font_file() else {
        return;
    };
    let dir = TempDir::new().unwrap();
    let mut config = config_in(dir.path(), only_chars("Ag_"), Vec::new());
    config.font = FontConfig {
        path: Some(font_path.clone()),
        fallback: FontFallback::Fail,
        ..FontConfig::default()
    };

    let atlas = generate(&config).unwrap();
    let image = atlas.image();
    assert_eq!(image.dimensions(), (256, 256));

    let metrics = LoadedFont::from_path(&font_path)
        .unwrap()
        .vertical_metrics(config.font.size);
    assert!(metrics.ascent > 0 && metrics.descent >= 0, "{metrics:?}");
    let baseline = metrics.baseline(128) as u32;

    for key in ["A", "g", "_"] {
        let record = atlas.map().get(key).unwrap();
        assert!(record.width > 0 && record.width < 128, "{key}: {record:?}");
        let (left, top, right, bottom) = ink_bounds(image, record.coord(), 128).unwrap();
        // Nothing touches the tile edges, so nothing spilled over them.
        assert!(left > 0 && top > 0 && right < 127 && bottom < 127, "{key}");
        assert!(right - left + 1 <= record.width + 2, "{key}");
        match key {
            "A" => assert!(bottom.abs_diff(baseline - 1) <= 1, "{key} {bottom} {baseline}"),
            "g" => assert!(top < baseline && bottom >= baseline, "{key}"),
            _ => assert!(top >= baseline, "{key} {top} {baseline}"),
        }
    }
    let empty = TileCoord { col: 1, row: 1 };
    assert_eq!(ink_bounds(image, empty, 128), None);

    let source = std::fs::read_to_string(&config.output.map).unwrap();
    assert_eq!(&LayoutMap::parse_lua(&source).unwrap(), atlas.map());
}
