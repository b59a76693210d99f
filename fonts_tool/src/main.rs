// Copyright 2026 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Prints which font each Unicode block resolves to, and optionally which
//! characters of a text file no font can render.

#![allow(
    clippy::print_stdout,
    clippy::print_stderr,
    reason = "command line program reporting on the terminal"
)]

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use fontcover::{
    Blob, CoverageOverride, FontSource, GlyphCache, GlyphCacheConfig, SwashRasterizer,
    parse_coverage_overrides, parse_unicode_blocks,
};

#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Directory with the .ttf and .otf files to examine.
    fonts_dir: PathBuf,
    /// Text file whose lines are checked for characters without a font.
    text: Option<PathBuf>,
    /// Unicode block list: `name startHex endHex` per line.
    #[arg(long)]
    blocks: PathBuf,
    /// Fonts forced onto blocks: `block font` per line.
    #[arg(long)]
    whitelist: Option<PathBuf>,
    /// Fonts excluded from blocks: `block font` per line, `*` for all blocks.
    #[arg(long)]
    blacklist: Option<PathBuf>,
    /// Log lines to stderr, repeat for more detail.
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(args.verbose);

    let blocks = match std::fs::read_to_string(&args.blocks) {
        Ok(text) => parse_unicode_blocks(&text).into_entries_logged("unicode blocks"),
        Err(err) => {
            eprintln!("Failed to read '{}': {err}", args.blocks.display());
            return ExitCode::FAILURE;
        }
    };
    let fonts = match font_sources(&args.fonts_dir) {
        Ok(fonts) => fonts,
        Err(err) => {
            eprintln!("Failed to scan '{}': {err}", args.fonts_dir.display());
            return ExitCode::FAILURE;
        }
    };
    if fonts.is_empty() {
        eprintln!("No font files in '{}'", args.fonts_dir.display());
        return ExitCode::FAILURE;
    }

    let config = GlyphCacheConfig {
        blocks,
        whitelist: read_overrides(args.whitelist.as_deref()),
        blacklist: read_overrides(args.blacklist.as_deref()),
        fonts,
        ..GlyphCacheConfig::default()
    };
    let cache = GlyphCache::new(config, &SwashRasterizer);
    print_block_mapping(&cache);

    if let Some(text) = &args.text {
        match std::fs::read_to_string(text) {
            Ok(text) => print_unresolved(&cache, &text),
            Err(err) => {
                eprintln!("Failed to read '{}': {err}", text.display());
                return ExitCode::FAILURE;
            }
        }
    }
    ExitCode::SUCCESS
}

/// Reads every font file of `dir`, sorted by file name. Sources are named
/// after the file name, which is what the override lists refer to.
fn font_sources(dir: &Path) -> std::io::Result<Vec<FontSource>> {
    let mut paths = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        let is_font = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("ttf") || ext.eq_ignore_ascii_case("otf"));
        if is_font && path.is_file() {
            paths.push(path);
        }
    }
    paths.sort();

    let mut sources = Vec::with_capacity(paths.len());
    for path in paths {
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        match std::fs::read(&path) {
            Ok(data) => sources.push(FontSource::new(name, Blob::from(data))),
            Err(err) => log::warn!("error reading font file {}: {err}", path.display()),
        }
    }
    Ok(sources)
}

fn read_overrides(path: Option<&Path>) -> Vec<CoverageOverride> {
    let Some(path) = path else {
        return Vec::new();
    };
    match std::fs::read_to_string(path) {
        Ok(text) => parse_coverage_overrides(&text).into_entries_logged("font overrides"),
        Err(err) => {
            log::warn!("error reading font list {}: {err}", path.display());
            Vec::new()
        }
    }
}

fn print_block_mapping(cache: &GlyphCache) {
    let fonts = cache.fonts();
    println!("{} fonts loaded", fonts.len());
    for (block, font) in cache.block_mapping() {
        let range = format!("{:04X}..{:04X}", block.start, block.end);
        match font.and_then(|index| fonts.get(index)) {
            Some(font) => println!(
                "{range} {} -> {} ({})",
                block.name,
                font.name(),
                font.display_name()
            ),
            None => println!("{range} {} -> unsupported", block.name),
        }
    }
}

fn print_unresolved(cache: &GlyphCache, text: &str) {
    for line in text.lines().map(str::trim).filter(|line| !line.is_empty()) {
        let mut unresolved: Vec<char> = line
            .chars()
            .filter(|c| !c.is_whitespace() && cache.font_index(*c).is_none())
            .collect();
        unresolved.sort_unstable();
        unresolved.dedup();
        if unresolved.is_empty() {
            println!("{line} (ok)");
        } else {
            let codes: Vec<String> = unresolved
                .iter()
                .map(|c| format!("U+{:04X}", u32::from(*c)))
                .collect();
            println!("{line} (unresolved: {})", codes.join(" "));
        }
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    // `RUST_LOG` still refines the level picked on the command line.
    let _ = env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .try_init();
}
