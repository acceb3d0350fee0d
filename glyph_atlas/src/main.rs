// Copyright 2026 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Generates the glyph atlas and its layout map.
//!
//! With no arguments the stock parameters are used and the outputs land at
//! their usual paths relative to the working directory.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use glyph_atlas::{AtlasConfig, FontFallback, FontResolver, MapFormat};

#[derive(Parser)]
#[command(name = "glyph_atlas")]
#[command(about = "Bake a font and icons into a tile atlas and layout map")]
#[command(version)]
struct Cli {
    /// TOML file overriding the stock parameters
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Where to write the atlas PNG
    #[arg(long)]
    atlas: Option<PathBuf>,

    /// Where to write the layout map
    #[arg(long)]
    map: Option<PathBuf>,

    /// Layout map format
    #[arg(long, value_enum)]
    map_format: Option<MapFormat>,

    /// Fail instead of substituting a default font when the family is missing
    #[arg(long)]
    strict_font: bool,

    /// List installed font families and exit
    #[arg(long)]
    list_fonts: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();

    if cli.list_fonts {
        for name in FontResolver::new().family_names() {
            println!("{name}");
        }
        return Ok(());
    }

    let mut config = match &cli.config {
        Some(path) => AtlasConfig::load(path)
            .with_context(|| format!("Failed to load config: {}", path.display()))?,
        None => AtlasConfig::default(),
    };
    if let Some(atlas) = cli.atlas {
        config.output.atlas = atlas;
    }
    if let Some(map) = cli.map {
        config.output.map = map;
    }
    if let Some(format) = cli.map_format {
        config.output.map_format = format;
    }
    if cli.strict_font {
        config.font.fallback = FontFallback::Fail;
    }

    glyph_atlas::generate(&config).context("Failed to generate font atlas")?;

    println!("Font Atlas and Font Map generated successfully and written to disk.");
    Ok(())
}
