// Copyright 2026 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Unicode blocks.

use alloc::string::String;

/// The last Unicode code point.
pub(crate) const MAX_CODE_POINT: u32 = 0x10_FFFF;

/// A named, contiguous range of code points.
///
/// Blocks are the unit of font coverage weighting: each font receives one
/// weight per block, see [`BlockCoverageResolver`](crate::BlockCoverageResolver).
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct UnicodeBlock {
    /// Name of the block, as referenced by override lists.
    pub name: String,
    /// First code point of the block.
    pub start: u32,
    /// Last code point of the block (inclusive).
    pub end: u32,
}

impl UnicodeBlock {
    /// Creates a new block covering `start..=end`.
    pub fn new(name: impl Into<String>, start: u32, end: u32) -> Self {
        Self {
            name: name.into(),
            start,
            end,
        }
    }

    /// Returns true if the block covers the given code point.
    ///
    /// # Example
    ///
    /// ```
    /// # use fontcover::UnicodeBlock;
    /// let latin = UnicodeBlock::new("Basic_Latin", 0x0000, 0x007F);
    /// assert!(latin.contains('a' as u32));
    /// assert!(!latin.contains('ç' as u32));
    /// ```
    #[inline]
    pub fn contains(&self, code: u32) -> bool {
        self.start <= code && code <= self.end
    }

    /// Returns the number of code points in the block.
    ///
    /// Saturates for blocks spanning the whole `u32` range.
    #[inline]
    pub fn size(&self) -> u32 {
        self.end.saturating_sub(self.start).saturating_add(1)
    }
}

/// Finds the block covering `code` in a list sorted by `end` with no overlaps.
pub(crate) fn find_block(blocks: &[UnicodeBlock], code: u32) -> Option<usize> {
    let index = blocks.partition_point(|block| block.end < code);
    blocks
        .get(index)
        .filter(|block| block.contains(code))
        .map(|_| index)
}

/// Returns true if `blocks` is sorted ascending and pairwise disjoint.
pub(crate) fn is_well_ordered(blocks: &[UnicodeBlock]) -> bool {
    blocks
        .windows(2)
        .all(|pair| pair[0].start <= pair[0].end && pair[0].end < pair[1].start)
}
