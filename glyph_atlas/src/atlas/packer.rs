// Copyright 2026 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Row based glyph packing.
//!
//! Glyphs are placed left to right along the current row. When a glyph does
//! not fit in the remaining width a new row starts below the tallest glyph of
//! the previous one. Once a glyph does not fit vertically the packer is full
//! and stays full.

/// A rectangle of texels within a texture.
#[derive(Clone, Copy, Default, PartialEq, Eq, Debug)]
pub struct AtlasRect {
    /// Left edge.
    pub x: u32,
    /// Top edge.
    pub y: u32,
    /// Width in texels.
    pub width: u32,
    /// Height in texels.
    pub height: u32,
}

impl AtlasRect {
    /// Returns true if the rectangle covers no texels.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// Normalized texture coordinates of a glyph.
#[derive(Clone, Copy, Default, PartialEq, Debug)]
pub struct TexCoords {
    /// Left edge.
    pub min_x: f32,
    /// Top edge.
    pub min_y: f32,
    /// Right edge.
    pub max_x: f32,
    /// Bottom edge.
    pub max_y: f32,
}

/// Places glyph rectangles in a fixed size texture.
#[derive(Clone, Debug)]
pub struct GlyphPacker {
    width: u32,
    height: u32,
    cursor_x: u32,
    cursor_y: u32,
    row_height: u32,
    full: bool,
}

impl GlyphPacker {
    /// Creates a packer for an empty `width` by `height` texture.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            cursor_x: 0,
            cursor_y: 0,
            row_height: 0,
            full: false,
        }
    }

    /// Width of the texture.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height of the texture.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Reserves a `width` by `height` rectangle.
    ///
    /// Returns `None`, and marks the packer full, if the rectangle does not
    /// fit below the current row.
    pub fn pack(&mut self, width: u32, height: u32) -> Option<AtlasRect> {
        if self.full {
            return None;
        }
        if self.cursor_x + width > self.width {
            self.cursor_x = 0;
            self.cursor_y += self.row_height;
            self.row_height = 0;
        }
        if self.cursor_y + height > self.height || width > self.width {
            self.full = true;
            return None;
        }
        let rect = AtlasRect {
            x: self.cursor_x,
            y: self.cursor_y,
            width,
            height,
        };
        self.cursor_x += width;
        self.row_height = self.row_height.max(height);
        Some(rect)
    }

    /// Returns true if `count` more `width` by `height` rectangles would fit.
    pub fn can_be_packed(&self, count: u32, width: u32, height: u32) -> bool {
        if self.full || width > self.width {
            return count == 0;
        }
        let (mut x, mut y, mut row_height) = (self.cursor_x, self.cursor_y, self.row_height);
        for _ in 0..count {
            if x + width > self.width {
                x = 0;
                y += row_height;
                row_height = 0;
            }
            if y + height > self.height {
                return false;
            }
            x += width;
            row_height = row_height.max(height);
        }
        true
    }

    /// Returns true once a rectangle failed to fit.
    pub fn is_full(&self) -> bool {
        self.full
    }

    /// Converts a packed rectangle to texture coordinates, inset by half a
    /// texel so that sampling stays inside the glyph.
    pub fn map_texture_coords(&self, rect: AtlasRect) -> TexCoords {
        let (fx, fy) = (1.0 / self.width as f32, 1.0 / self.height as f32);
        let inset = if rect.is_empty() { 0.0 } else { 0.5 };
        TexCoords {
            min_x: (rect.x as f32 + inset) * fx,
            min_y: (rect.y as f32 + inset) * fy,
            max_x: ((rect.x + rect.width) as f32 - inset) * fx,
            max_y: ((rect.y + rect.height) as f32 - inset) * fy,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rows_wrap_below_tallest_glyph() {
        let mut packer = GlyphPacker::new(10, 10);
        assert_eq!(
            packer.pack(4, 3),
            Some(AtlasRect {
                x: 0,
                y: 0,
                width: 4,
                height: 3
            })
        );
        assert_eq!(packer.pack(4, 5).map(|r| (r.x, r.y)), Some((4, 0)));
        // Does not fit in the remaining 2 texels of the row.
        assert_eq!(packer.pack(4, 2).map(|r| (r.x, r.y)), Some((0, 5)));
        assert!(!packer.is_full());
    }

    #[test]
    fn full_latches() {
        let mut packer = GlyphPacker::new(8, 8);
        assert!(packer.pack(8, 6).is_some());
        assert!(packer.can_be_packed(0, 8, 8));
        assert!(!packer.can_be_packed(1, 8, 3));
        assert!(packer.pack(8, 3).is_none());
        assert!(packer.is_full());
        // Would fit, but the packer stays full.
        assert!(packer.pack(1, 1).is_none());
        assert!(!packer.can_be_packed(1, 1, 1));
    }

    #[test]
    fn estimation_does_not_mutate() {
        let mut packer = GlyphPacker::new(100, 100);
        assert!(packer.can_be_packed(100, 10, 10));
        assert!(!packer.can_be_packed(101, 10, 10));
        assert!(packer.pack(10, 10).is_some());
        assert!(packer.can_be_packed(99, 10, 10));
        assert!(!packer.can_be_packed(100, 10, 10));
    }

    #[test]
    fn texture_coords_are_inset() {
        let packer = GlyphPacker::new(100, 50);
        let coords = packer.map_texture_coords(AtlasRect {
            x: 10,
            y: 10,
            width: 20,
            height: 10,
        });
        let close = |a: f32, b: f32| (a - b).abs() < 1e-6;
        assert!(close(coords.min_x, 10.5 / 100.0));
        assert!(close(coords.max_x, 29.5 / 100.0));
        assert!(close(coords.min_y, 10.5 / 50.0));
        assert!(close(coords.max_y, 19.5 / 50.0));

        let empty = packer.map_texture_coords(AtlasRect::default());
        assert_eq!(empty, TexCoords::default());
    }
}
