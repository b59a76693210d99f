// Copyright 2026 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Hybrid glyph groups.
//!
//! Requests are spread over groups of bounded capacity, each backed by one
//! texture. Only the last group receives new glyphs; earlier groups are
//! sealed but still serve requests they fully contain.

use alloc::vec::Vec;

use hashbrown::HashSet;

use super::texture::AtlasSpace;

/// A set of glyph keys sharing one texture.
#[derive(Debug)]
pub struct HybridGlyphGroup<T> {
    glyphs: HashSet<(u32, i32)>,
    texture: Option<T>,
}

impl<T> Default for HybridGlyphGroup<T> {
    fn default() -> Self {
        Self {
            glyphs: HashSet::new(),
            texture: None,
        }
    }
}

impl<T> HybridGlyphGroup<T> {
    /// Number of distinct `(code, fixed_size)` pairs in the group.
    pub fn len(&self) -> usize {
        self.glyphs.len()
    }

    /// Returns true if no glyph was placed in the group yet.
    pub fn is_empty(&self) -> bool {
        self.glyphs.is_empty()
    }

    /// Returns true if the group holds `code` at `fixed_size`.
    pub fn contains(&self, code: char, fixed_size: i32) -> bool {
        self.glyphs.contains(&(u32::from(code), fixed_size))
    }

    /// The texture, once allocated.
    pub fn texture(&self) -> Option<&T> {
        self.texture.as_ref()
    }

    /// Returns the texture, allocating it with `allocate` on first use.
    pub fn texture_or_insert_with(&mut self, allocate: impl FnOnce() -> T) -> &T {
        self.texture.get_or_insert_with(allocate)
    }

    fn unfound_characters(&self, text: &str, fixed_size: i32) -> u32 {
        text.chars()
            .filter(|&c| !self.contains(c, fixed_size))
            .count() as u32
    }
}

/// The ordered list of hybrid groups.
#[derive(Debug)]
pub struct GlyphGroups<T> {
    groups: Vec<HybridGlyphGroup<T>>,
    max_glyphs: u32,
}

impl<T: AtlasSpace> GlyphGroups<T> {
    /// Creates an empty list whose groups hold fewer than `max_glyphs` glyphs.
    pub fn new(max_glyphs: u32) -> Self {
        Self {
            groups: Vec::new(),
            max_glyphs,
        }
    }

    /// Capacity ceiling of a single group.
    pub fn max_glyphs(&self) -> u32 {
        self.max_glyphs
    }

    /// Number of groups.
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    /// Returns true if no group was created yet.
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// The group at `index`.
    pub fn get(&self, index: usize) -> Option<&HybridGlyphGroup<T>> {
        self.groups.get(index)
    }

    /// The group at `index`, mutably.
    pub fn get_mut(&mut self, index: usize) -> Option<&mut HybridGlyphGroup<T>> {
        self.groups.get_mut(index)
    }

    /// Removes every group.
    pub fn clear(&mut self) {
        self.groups.clear();
    }

    /// Picks the group `text` should be served from, creating a new one
    /// when the last group cannot absorb the missing glyphs.
    pub fn find_or_create_group(&mut self, text: &str, fixed_size: i32) -> usize {
        let Some(active) = self.groups.last() else {
            self.groups.push(HybridGlyphGroup::default());
            return 0;
        };

        let count = text.chars().count() as u32;
        let has_enough_space = active
            .texture
            .as_ref()
            .is_none_or(|texture| texture.has_enough_space(count));
        // The common case of a single texture skips the usage scan.
        if has_enough_space
            && self.groups.len() == 1
            && (active.len() as u32 + count) < self.max_glyphs
        {
            return 0;
        }

        let sealed = &self.groups[..self.groups.len() - 1];
        if let Some(index) = sealed
            .iter()
            .position(|group| group.unfound_characters(text, fixed_size) == 0)
        {
            return index;
        }

        let unfound = active.unfound_characters(text, fixed_size);
        let needs_new = active.len() as u32 + unfound >= self.max_glyphs
            || active
                .texture
                .as_ref()
                .is_some_and(|texture| !texture.has_enough_space(unfound));
        if needs_new {
            log::debug!(
                "sealing glyph group {} with {} glyphs",
                self.groups.len() - 1,
                active.len()
            );
            self.groups.push(HybridGlyphGroup::default());
        }
        self.groups.len() - 1
    }

    /// Records every character of `text` as present in the group at `index`.
    pub fn mark_characters_usage(&mut self, index: usize, text: &str, fixed_size: i32) {
        if let Some(group) = self.groups.get_mut(index) {
            group
                .glyphs
                .extend(text.chars().map(|c| (u32::from(c), fixed_size)));
        }
    }
}
