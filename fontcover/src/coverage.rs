// Copyright 2026 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Font selection by weighted Unicode block coverage.

use alloc::vec::Vec;

use smallvec::SmallVec;

use crate::block::{UnicodeBlock, find_block, is_well_ordered};
use crate::config::CoverageOverride;

/// Per-block font weights, indexed by font.
type Weights = SmallVec<[u32; 4]>;

/// Maps code points to the preferred font among those covering their block.
///
/// Each font receives one weight per block: the number of code points it
/// maps inside the block, or an override from the whitelist or blacklist.
/// A weight of zero disables the font for that block. Resolution tries the
/// fonts of a block from the highest weight down until one actually has
/// the glyph.
#[derive(Clone, Debug, Default)]
pub struct BlockCoverageResolver {
    blocks: Vec<UnicodeBlock>,
    weights: Vec<Weights>,
    font_count: usize,
    last_used: Option<usize>,
}

impl BlockCoverageResolver {
    /// Creates a resolver over `blocks`.
    ///
    /// Blocks must be sorted and disjoint; any block that starts at or
    /// before the end of the previous kept block is dropped.
    pub fn new(blocks: Vec<UnicodeBlock>) -> Self {
        let blocks = if is_well_ordered(&blocks) {
            blocks
        } else {
            let mut kept: Vec<UnicodeBlock> = Vec::with_capacity(blocks.len());
            for block in blocks {
                if block.start > block.end
                    || kept.last().is_some_and(|prev| block.start <= prev.end)
                {
                    log::warn!("dropping out of order unicode block {}", block.name);
                    continue;
                }
                kept.push(block);
            }
            kept
        };
        let weights = alloc::vec![Weights::new(); blocks.len()];
        Self {
            blocks,
            weights,
            font_count: 0,
            last_used: None,
        }
    }

    /// The blocks, in ascending order.
    pub fn blocks(&self) -> &[UnicodeBlock] {
        &self.blocks
    }

    /// Number of fonts added so far.
    pub fn font_count(&self) -> usize {
        self.font_count
    }

    /// Weights of every font for the block at `block`.
    ///
    /// Fonts past the end of the slice have weight zero.
    pub fn weights(&self, block: usize) -> &[u32] {
        self.weights.get(block).map(|w| w.as_slice()).unwrap_or(&[])
    }

    /// The font with the highest weight in a block, earliest font on ties.
    pub fn preferred_font(&self, block: usize) -> Option<usize> {
        next_font(self.weights(block), None)
    }

    /// Adds the next font and computes its weight in every block.
    ///
    /// `code_points` must be sorted ascending. Overrides apply only to
    /// blocks the font maps at least one code point in. Blacklist entries
    /// force the weight to zero; whitelist entries then raise it above any
    /// coverage count, favoring later fonts. Returns the index of the font.
    pub fn add_font(
        &mut self,
        font_name: &str,
        code_points: &[u32],
        whitelist: &[CoverageOverride],
        blacklist: &[CoverageOverride],
    ) -> usize {
        debug_assert!(code_points.is_sorted(), "code points must be sorted");
        let index = self.font_count;
        self.font_count += 1;

        // (block, hits) for every block the font touches, in block order.
        let mut cover: SmallVec<[(usize, u32); 16]> = SmallVec::new();
        let mut cursor = 0;
        for &code in code_points {
            while cursor < self.blocks.len() && self.blocks[cursor].end < code {
                cursor += 1;
            }
            let Some(block) = self.blocks.get(cursor) else {
                break;
            };
            if !block.contains(code) {
                continue;
            }
            match cover.last_mut() {
                Some((last, hits)) if *last == cursor => *hits += 1,
                _ => cover.push((cursor, 1)),
            }
        }

        for entry in blacklist.iter().filter(|e| e.font == font_name) {
            for (block, hits) in &mut cover {
                if entry.block.matches(&self.blocks[*block].name) {
                    *hits = 0;
                }
            }
        }
        let order_bonus = self.font_count as u32;
        for entry in whitelist.iter().filter(|e| e.font == font_name) {
            for (block, hits) in &mut cover {
                let block = &self.blocks[*block];
                if entry.block.matches(&block.name) {
                    *hits = block.size().saturating_add(order_bonus);
                }
            }
        }

        for (block, weight) in cover {
            let weights = &mut self.weights[block];
            weights.resize(self.font_count, 0);
            weights[index] = weight;
        }
        index
    }

    /// Finds the font for `code`, remembering the block for the next call.
    ///
    /// `has_glyph` is asked, in order of decreasing weight, whether a font
    /// actually has the glyph. Returns `None` if no block covers `code` or
    /// no enabled font in the block has the glyph.
    ///
    /// Each fallback step only considers weights strictly below the one just
    /// tried, so of several fonts sharing a weight only the earliest is asked.
    pub fn resolve(&mut self, code: u32, has_glyph: impl Fn(usize) -> bool) -> Option<usize> {
        let block = match self.last_used {
            Some(last) if self.blocks[last].contains(code) => last,
            _ => {
                let block = find_block(&self.blocks, code)?;
                self.last_used = Some(block);
                block
            }
        };
        self.resolve_in_block(block, has_glyph)
    }

    /// Same as [`resolve`](Self::resolve) without the last block shortcut,
    /// for concurrent readers.
    pub fn resolve_stateless(&self, code: u32, has_glyph: impl Fn(usize) -> bool) -> Option<usize> {
        let block = find_block(&self.blocks, code)?;
        self.resolve_in_block(block, has_glyph)
    }

    fn resolve_in_block(&self, block: usize, has_glyph: impl Fn(usize) -> bool) -> Option<usize> {
        let weights = self.weights(block);
        let mut font = next_font(weights, None);
        while let Some(index) = font {
            if has_glyph(index) {
                return Some(index);
            }
            font = next_font(weights, Some(weights[index]));
        }
        None
    }
}

/// The earliest font with the largest non-zero weight strictly below `ceiling`.
fn next_font(weights: &[u32], ceiling: Option<u32>) -> Option<usize> {
    let mut best: Option<(usize, u32)> = None;
    for (index, &weight) in weights.iter().enumerate() {
        let below = ceiling.is_none_or(|ceiling| weight < ceiling);
        if weight > 0 && below && best.is_none_or(|(_, w)| weight > w) {
            best = Some((index, weight));
        }
    }
    best.map(|(index, _)| index)
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;
    use alloc::vec::Vec;

    fn latin() -> BlockCoverageResolver {
        BlockCoverageResolver::new(vec![UnicodeBlock::new("Latin", 0x41, 0x5A)])
    }

    fn range(from: char, to: char) -> Vec<u32> {
        (from as u32..=to as u32).collect()
    }

    #[test]
    fn higher_coverage_wins() {
        let mut resolver = latin();
        resolver.add_font("font0", &range('A', 'E'), &[], &[]);
        resolver.add_font("font1", &range('A', 'Z'), &[], &[]);
        assert_eq!(resolver.weights(0), &[5, 26]);
        assert_eq!(resolver.resolve('A' as u32, |_| true), Some(1));
        assert_eq!(resolver.resolve_stateless('A' as u32, |_| true), Some(1));
    }

    #[test]
    fn falls_through_to_next_weight() {
        let mut resolver = latin();
        resolver.add_font("font0", &range('A', 'E'), &[], &[]);
        resolver.add_font("font1", &range('A', 'Z'), &[], &[]);
        // The preferred font lost the glyph since its code points were listed.
        assert_eq!(resolver.resolve('A' as u32, |font| font == 0), Some(0));
        assert_eq!(resolver.resolve('A' as u32, |_| false), None);
    }

    #[test]
    fn blacklist_disables_font_for_block() {
        let blacklist = [CoverageOverride::new("Latin", "font1")];
        let mut resolver = latin();
        resolver.add_font("font0", &range('A', 'E'), &[], &blacklist);
        resolver.add_font("font1", &range('A', 'Z'), &[], &blacklist);
        assert_eq!(resolver.weights(0), &[5, 0]);
        assert_eq!(resolver.resolve('A' as u32, |_| true), Some(0));
        // Font 0 has nothing beyond 'E' and font 1 is never consulted.
        assert_eq!(resolver.resolve('Q' as u32, |font| font == 1), None);
    }

    #[test]
    fn wildcard_blacklist_disables_font_everywhere() {
        let blocks = vec![
            UnicodeBlock::new("Basic_Latin", 0x00, 0x7F),
            UnicodeBlock::new("Greek", 0x370, 0x3FF),
        ];
        let blacklist = [CoverageOverride::new("*", "font1")];
        let mut codes = range('A', 'Z');
        codes.extend(0x391..=0x3A9);
        let mut resolver = BlockCoverageResolver::new(blocks);
        resolver.add_font("font0", &range('A', 'C'), &[], &blacklist);
        resolver.add_font("font1", &codes, &[], &blacklist);
        assert_eq!(resolver.weights(0), &[3, 0]);
        assert_eq!(resolver.weights(1), &[0, 0]);
        for code in codes {
            assert_ne!(resolver.resolve_stateless(code, |_| true), Some(1));
        }
    }

    #[test]
    fn later_whitelisted_font_wins() {
        let whitelist = [
            CoverageOverride::new("Latin", "font0"),
            CoverageOverride::new("Latin", "font1"),
        ];
        let mut resolver = latin();
        resolver.add_font("font0", &range('A', 'Z'), &whitelist, &[]);
        resolver.add_font("font1", &range('A', 'B'), &whitelist, &[]);
        assert_eq!(resolver.weights(0), &[26 + 1, 26 + 2]);
        assert_eq!(resolver.resolve('A' as u32, |_| true), Some(1));
        // 'C' is missing from font 1, so font 0 is next.
        assert_eq!(resolver.resolve('C' as u32, |font| font == 0), Some(0));
    }

    #[test]
    fn overrides_skip_untouched_blocks() {
        let blocks = vec![
            UnicodeBlock::new("Basic_Latin", 0x00, 0x7F),
            UnicodeBlock::new("Greek", 0x370, 0x3FF),
        ];
        let whitelist = [CoverageOverride::new("Greek", "font0")];
        let mut resolver = BlockCoverageResolver::new(blocks);
        resolver.add_font("font0", &range('A', 'Z'), &whitelist, &[]);
        assert!(resolver.weights(1).is_empty());
        assert_eq!(resolver.resolve(0x391, |_| true), None);
    }

    #[test]
    fn uncovered_code_points_and_gaps() {
        let blocks = vec![
            UnicodeBlock::new("Basic_Latin", 0x00, 0x7F),
            UnicodeBlock::new("Cyrillic", 0x400, 0x4FF),
        ];
        let mut codes = range('a', 'c');
        codes.extend([0x100, 0x101, 0x410]);
        let mut resolver = BlockCoverageResolver::new(blocks);
        resolver.add_font("font0", &codes, &[], &[]);
        assert_eq!(resolver.weights(0), &[3]);
        assert_eq!(resolver.weights(1), &[1]);
        assert_eq!(resolver.resolve(0x100, |_| true), None);
        assert_eq!(resolver.resolve(0x410, |_| true), Some(0));
        assert_eq!(resolver.resolve('a' as u32, |_| true), Some(0));
    }

    #[test]
    fn equal_weights_stop_after_first() {
        let mut resolver = latin();
        resolver.add_font("font0", &range('A', 'E'), &[], &[]);
        resolver.add_font("font1", &range('F', 'J'), &[], &[]);
        assert_eq!(resolver.preferred_font(0), Some(0));
        // Both fonts weigh 5, so once the first misses nothing is below the ceiling.
        assert_eq!(resolver.resolve('G' as u32, |font| font == 1), None);
    }

    #[test]
    fn whitelisted_weight_saturates() {
        let whitelist = [CoverageOverride::new("All", "font0")];
        let mut resolver =
            BlockCoverageResolver::new(vec![UnicodeBlock::new("All", 0, u32::MAX)]);
        resolver.add_font("font0", &[0x41], &whitelist, &[]);
        assert_eq!(resolver.weights(0), &[u32::MAX]);
        assert_eq!(resolver.resolve(0x41, |_| true), Some(0));
    }

    #[test]
    fn out_of_order_blocks_are_dropped() {
        let resolver = BlockCoverageResolver::new(vec![
            UnicodeBlock::new("Greek", 0x370, 0x3FF),
            UnicodeBlock::new("Basic_Latin", 0x00, 0x7F),
            UnicodeBlock::new("Cyrillic", 0x400, 0x4FF),
        ]);
        let names: Vec<_> = resolver.blocks().iter().map(|b| b.name.as_str()).collect();
        assert_eq!(names, ["Greek", "Cyrillic"]);
    }
}
