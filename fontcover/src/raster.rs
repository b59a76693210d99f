// Copyright 2026 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The rasterizer seam.

use alloc::boxed::Box;
use alloc::string::String;
use alloc::vec::Vec;

use linebender_resource_handle::Blob;

use crate::error::FontError;

/// Opens font faces from raw font data.
pub trait Rasterizer: Send + Sync {
    /// Opens the first face in `data`.
    fn open_face(&self, data: Blob<u8>) -> Result<Box<dyn RasterFace>, FontError>;
}

/// A single opened font face.
///
/// Implementations must be usable from several threads at once. Any
/// scaler state that cannot be shared is serialized internally.
pub trait RasterFace: Send + Sync {
    /// Number of glyphs in the face.
    fn glyph_count(&self) -> u32;

    /// Maps a code point to a glyph index, `0` if the face has no glyph for it.
    fn glyph_index(&self, code: u32) -> u32;

    /// Every code point the character map resolves to a non-zero glyph.
    ///
    /// Order and duplicates are unspecified.
    fn char_codes(&self) -> Vec<u32>;

    /// Human readable `family:style` name.
    fn name(&self) -> String;

    /// Renders the glyph for `code` at the given pixel height.
    fn render(&self, code: u32, pixel_size: u32) -> RenderedGlyph;
}

/// An 8-bit coverage bitmap with its metrics, in whole pixels.
#[derive(Clone, Default, Debug)]
pub struct RenderedGlyph {
    /// Width of the bitmap.
    pub width: u32,
    /// Number of rows in the bitmap.
    pub rows: u32,
    /// Bytes per row.
    pub pitch: u32,
    /// The bitmap, `None` for glyphs with no ink such as spaces.
    pub bitmap: Option<Vec<u8>>,
    /// Horizontal advance.
    pub advance_x: f32,
    /// Vertical advance.
    pub advance_y: f32,
    /// Left edge of the bounding box relative to the origin.
    pub bbox_min_x: f32,
    /// Bottom edge of the bounding box relative to the baseline.
    pub bbox_min_y: f32,
}
