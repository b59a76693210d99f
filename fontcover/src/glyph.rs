// Copyright 2026 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Rasterized glyph values.

use crate::image::GlyphImage;

/// The `fixed_size` of glyphs rendered as signed distance fields.
///
/// Any other (non-negative) value is the pixel height of a raw bitmap.
pub const SDF_GLYPH_SIZE: i32 = -1;

/// Border, in final pixels, around every glyph image.
///
/// Raw bitmaps are padded with this many background pixels on each side and
/// distance fields are generated with this much room around the outline.
pub const SDF_BORDER: u32 = 4;

/// Code point rendered in place of glyphs no font can provide.
pub const INVALID_GLYPH_CODE: u32 = 0x9;

/// Placement metrics of a glyph, in final pixels.
#[derive(Copy, Clone, Default, PartialEq, Debug)]
pub struct GlyphMetrics {
    /// Horizontal advance.
    pub advance_x: f32,
    /// Vertical advance.
    pub advance_y: f32,
    /// Left edge of the ink relative to the pen position.
    pub offset_x: f32,
    /// Bottom edge of the ink relative to the baseline.
    pub offset_y: f32,
    /// False for the placeholder substituted for unresolved code points.
    pub is_valid: bool,
}

/// A glyph rendered for one code point in one mode.
#[derive(Clone, Debug)]
pub struct Glyph {
    /// Placement metrics.
    pub metrics: GlyphMetrics,
    /// The bitmap. Dropping the glyph returns its buffer to the pool.
    pub image: GlyphImage,
    /// Index of the font the glyph was rendered with.
    pub font_index: usize,
    /// The code point.
    pub code: u32,
    /// [`SDF_GLYPH_SIZE`] or the pixel height of a raw bitmap.
    pub fixed_size: i32,
}

impl Glyph {
    /// Returns true if this is a distance field glyph.
    #[inline]
    pub fn is_sdf(&self) -> bool {
        is_sdf_size(self.fixed_size)
    }

    /// Returns the `(code, fixed_size)` pair identifying this rendering.
    #[inline]
    pub fn key(&self) -> (u32, i32) {
        (self.code, self.fixed_size)
    }
}

/// Returns true if `fixed_size` requests a distance field.
#[inline]
pub fn is_sdf_size(fixed_size: i32) -> bool {
    fixed_size < 0
}
