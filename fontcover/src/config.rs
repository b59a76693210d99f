// Copyright 2026 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Block definition and font override lists.
//!
//! Both formats are plain text with whitespace separated fields, one entry
//! per line:
//!
//! - block definitions: `name startHex endHex`, e.g. `Basic_Latin 0000 007F`
//! - overrides: `blockName fontName`, where a block name of `*` selects
//!   every block.

use alloc::string::{String, ToString};
use alloc::vec::Vec;
use std::path::{Path, PathBuf};

use linebender_resource_handle::Blob;

use crate::block::{MAX_CODE_POINT, UnicodeBlock};
use crate::error::{ConfigError, ConfigErrorKind, FontError};

/// Default pixel height used to rasterize SDF glyphs.
pub const DEFAULT_BASE_GLYPH_HEIGHT: u32 = 22;

/// Default ratio between the SDF working raster and the final glyph.
pub const DEFAULT_SDF_SCALE: u32 = 4;

/// The result of parsing a configuration list.
///
/// Parsing is best effort: `entries` holds everything read before the first
/// malformed line, which is reported in `error`.
#[derive(Clone, Debug)]
pub struct ParsedList<T> {
    /// Entries parsed before the first error.
    pub entries: Vec<T>,
    /// The first malformed line, if any.
    pub error: Option<ConfigError>,
}

impl<T> ParsedList<T> {
    /// Returns the parsed entries, logging the parse error if there was one.
    pub fn into_entries_logged(self, what: &str) -> Vec<T> {
        if let Some(err) = &self.error {
            log::warn!(
                "stopped reading {what} at {err}; keeping {} entries",
                self.entries.len()
            );
        }
        self.entries
    }
}

/// Which blocks a [`CoverageOverride`] applies to.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum BlockSelector {
    /// Every block (`*`).
    All,
    /// The block with the given name.
    Named(String),
}

impl BlockSelector {
    /// Returns true if the selector matches a block with the given name.
    pub fn matches(&self, block_name: &str) -> bool {
        match self {
            Self::All => true,
            Self::Named(name) => name == block_name,
        }
    }
}

/// An entry of a whitelist or blacklist.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct CoverageOverride {
    /// The blocks the entry applies to.
    pub block: BlockSelector,
    /// Name of the font, as given in the font list.
    pub font: String,
}

impl CoverageOverride {
    /// Creates an override for a named block, or every block if `block` is `*`.
    pub fn new(block: &str, font: impl Into<String>) -> Self {
        let block = if block == "*" {
            BlockSelector::All
        } else {
            BlockSelector::Named(block.to_string())
        };
        Self {
            block,
            font: font.into(),
        }
    }
}

/// Parses a block definition list.
///
/// Blocks must be listed in ascending order without overlaps so that they
/// can be binary searched; a block violating this is treated as malformed.
pub fn parse_unicode_blocks(text: &str) -> ParsedList<UnicodeBlock> {
    let mut entries: Vec<UnicodeBlock> = Vec::new();
    for (line_index, line) in text.lines().enumerate() {
        let error = |kind| {
            Some(ConfigError {
                line: line_index + 1,
                kind,
            })
        };
        let mut fields = line.split_whitespace();
        let Some(name) = fields.next() else {
            continue;
        };
        let (Some(start), Some(end)) = (fields.next(), fields.next()) else {
            return ParsedList {
                entries,
                error: error(ConfigErrorKind::MissingField),
            };
        };
        let (Some(start), Some(end)) = (parse_hex(start), parse_hex(end)) else {
            return ParsedList {
                entries,
                error: error(ConfigErrorKind::InvalidHex),
            };
        };
        if end < start {
            return ParsedList {
                entries,
                error: error(ConfigErrorKind::InvertedRange),
            };
        }
        if end > MAX_CODE_POINT {
            return ParsedList {
                entries,
                error: error(ConfigErrorKind::OutOfRange),
            };
        }
        if entries.last().is_some_and(|prev| start <= prev.end) {
            return ParsedList {
                entries,
                error: error(ConfigErrorKind::Unordered),
            };
        }
        entries.push(UnicodeBlock::new(name, start, end));
    }
    ParsedList {
        entries,
        error: None,
    }
}

/// Parses a whitelist or blacklist.
pub fn parse_coverage_overrides(text: &str) -> ParsedList<CoverageOverride> {
    let mut entries = Vec::new();
    for (line_index, line) in text.lines().enumerate() {
        let mut fields = line.split_whitespace();
        let Some(block) = fields.next() else {
            continue;
        };
        let Some(font) = fields.next() else {
            return ParsedList {
                entries,
                error: Some(ConfigError {
                    line: line_index + 1,
                    kind: ConfigErrorKind::MissingField,
                }),
            };
        };
        entries.push(CoverageOverride::new(block, font));
    }
    ParsedList {
        entries,
        error: None,
    }
}

fn parse_hex(field: &str) -> Option<u32> {
    let digits = field
        .strip_prefix("0x")
        .or_else(|| field.strip_prefix("0X"))
        .unwrap_or(field);
    u32::from_str_radix(digits, 16).ok()
}

/// Font data together with the name override lists refer to it by.
#[derive(Clone)]
pub struct FontSource {
    /// Name of the font as used in the override lists.
    pub name: String,
    /// The raw font file.
    pub data: Blob<u8>,
}

impl FontSource {
    /// Creates a source from font data already in memory.
    pub fn new(name: impl Into<String>, data: Blob<u8>) -> Self {
        Self {
            name: name.into(),
            data,
        }
    }

    /// Reads a font file. The source is named after the path as given.
    pub fn from_path(path: &Path) -> Result<Self, FontError> {
        let data = std::fs::read(path)?;
        Ok(Self::new(path.display().to_string(), Blob::from(data)))
    }
}

impl core::fmt::Debug for FontSource {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("FontSource")
            .field("name", &self.name)
            .field("data", &self.data.len())
            .finish()
    }
}

/// Files a [`GlyphCacheConfig`] is loaded from.
#[derive(Clone, Default, Debug)]
pub struct ConfigPaths {
    /// The block definition list.
    pub unicode_blocks: PathBuf,
    /// Fonts that must be used for a block, regardless of coverage.
    pub whitelist: PathBuf,
    /// Fonts that must never be used for a block.
    pub blacklist: PathBuf,
    /// Font files, in priority order.
    pub fonts: Vec<PathBuf>,
}

/// Everything needed to build a [`GlyphCache`](crate::GlyphCache).
#[derive(Clone, Debug)]
pub struct GlyphCacheConfig {
    /// Blocks sorted ascending and pairwise disjoint.
    pub blocks: Vec<UnicodeBlock>,
    /// Fonts forced to win a block.
    pub whitelist: Vec<CoverageOverride>,
    /// Fonts excluded from a block.
    pub blacklist: Vec<CoverageOverride>,
    /// Fonts in priority order; earlier fonts win ties.
    pub fonts: Vec<FontSource>,
    /// Pixel height at which SDF glyphs are rasterized.
    pub base_glyph_height: u32,
    /// Ratio between the SDF working raster and the final glyph.
    pub sdf_scale: u32,
}

impl Default for GlyphCacheConfig {
    fn default() -> Self {
        Self {
            blocks: Vec::new(),
            whitelist: Vec::new(),
            blacklist: Vec::new(),
            fonts: Vec::new(),
            base_glyph_height: DEFAULT_BASE_GLYPH_HEIGHT,
            sdf_scale: DEFAULT_SDF_SCALE,
        }
    }
}

impl GlyphCacheConfig {
    /// Loads the lists and font files named by `paths`.
    ///
    /// Nothing here is fatal: unreadable lists are logged and treated as
    /// empty, malformed lists are truncated at the first bad line and
    /// unreadable fonts are skipped.
    pub fn load(paths: &ConfigPaths) -> Self {
        let blocks = match std::fs::read_to_string(&paths.unicode_blocks) {
            Ok(text) => parse_unicode_blocks(&text).into_entries_logged("unicode blocks"),
            Err(err) => {
                log::error!(
                    "error reading unicode block description {}: {err}",
                    paths.unicode_blocks.display()
                );
                Vec::new()
            }
        };
        let whitelist = read_overrides(&paths.whitelist);
        let blacklist = read_overrides(&paths.blacklist);
        let fonts = paths
            .fonts
            .iter()
            .filter_map(|path| match FontSource::from_path(path) {
                Ok(source) => Some(source),
                Err(err) => {
                    log::warn!("error reading font file {}: {err}", path.display());
                    None
                }
            })
            .collect();
        Self {
            blocks,
            whitelist,
            blacklist,
            fonts,
            ..Self::default()
        }
    }
}

fn read_overrides(path: &Path) -> Vec<CoverageOverride> {
    match std::fs::read_to_string(path) {
        Ok(text) => parse_coverage_overrides(&text).into_entries_logged("font overrides"),
        Err(err) => {
            log::warn!("error reading font list {}: {err}", path.display());
            Vec::new()
        }
    }
}
