// Copyright 2026 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Fontcover picks, for every code point, the font that covers its Unicode
//! block best, and renders glyphs as padded bitmaps or signed distance fields.
//!
//! Fonts are weighted per block by how many of the block's code points they
//! map. Whitelists and blacklists override the weights for named blocks, and
//! a lookup falls through to the next best font when the preferred one turns
//! out not to have the glyph.
//!
//! ## Features
//!
//! - `swash` (enabled by default): [`SwashRasterizer`], a rasterizer built on
//!   the swash scaler.
//! - `testing`: the [`testing`] module with a synthetic rasterizer that needs
//!   no font files.

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

extern crate alloc;

mod backend;
mod block;
mod cache;
mod config;
mod coverage;
mod error;
mod face;
mod glyph;
mod image;
mod raster;
mod sdf;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use linebender_resource_handle::Blob;

#[cfg(feature = "swash")]
pub use backend::SwashRasterizer;
pub use block::UnicodeBlock;
pub use cache::GlyphCache;
pub use config::{
    BlockSelector, ConfigPaths, CoverageOverride, DEFAULT_BASE_GLYPH_HEIGHT, DEFAULT_SDF_SCALE,
    FontSource, GlyphCacheConfig, ParsedList, parse_coverage_overrides, parse_unicode_blocks,
};
pub use coverage::BlockCoverageResolver;
pub use error::{ConfigError, ConfigErrorKind, FontError};
pub use face::FontFace;
pub use glyph::{
    Glyph, GlyphMetrics, INVALID_GLYPH_CODE, SDF_BORDER, SDF_GLYPH_SIZE, is_sdf_size,
};
pub use image::{BufferPool, GlyphImage, PooledBuffer};
pub use raster::{RasterFace, Rasterizer, RenderedGlyph};
pub use sdf::SdfImage;
