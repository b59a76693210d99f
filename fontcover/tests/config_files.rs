// Copyright 2026 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Loading a glyph cache configuration from files on disk.

use std::path::{Path, PathBuf};

use fontcover::testing::{SyntheticFont, SyntheticRasterizer};
use fontcover::{ConfigPaths, GlyphCache, GlyphCacheConfig, SDF_GLYPH_SIZE};

struct ScratchDir(PathBuf);

impl ScratchDir {
    fn new(name: &str) -> Self {
        let path = std::env::temp_dir().join(format!(
            "fontcover-{name}-{}",
            std::process::id()
        ));
        std::fs::create_dir_all(&path).unwrap();
        Self(path)
    }

    fn write(&self, name: &str, contents: impl AsRef<[u8]>) -> PathBuf {
        let path = self.0.join(name);
        std::fs::write(&path, contents).unwrap();
        path
    }

    fn path(&self, name: &str) -> PathBuf {
        self.0.join(name)
    }
}

impl Drop for ScratchDir {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.0);
    }
}

fn name_of(path: &Path) -> String {
    path.display().to_string()
}

#[test]
fn whitelist_overrides_coverage() {
    let dir = ScratchDir::new("whitelist");
    let blocks = dir.write(
        "blocks.txt",
        "Basic_Latin 0000 007F\n\nCyrillic 0x0400 0x04FF\nBroken zz 10\nGreek 0370 03FF\n",
    );
    let partial = dir.write(
        "partial.font",
        SyntheticFont::new("partial")
            .with_range('A'..='z')
            .with_range('\u{0410}'..='\u{0419}')
            .to_bytes(),
    );
    let cyrillic = dir.write(
        "cyrillic.font",
        SyntheticFont::new("cyrillic")
            .with_range('\u{0400}'..='\u{04FF}')
            .to_bytes(),
    );
    let whitelist = dir.write("whitelist.txt", format!("Cyrillic {}\n", name_of(&partial)));

    let config = GlyphCacheConfig::load(&ConfigPaths {
        unicode_blocks: blocks,
        whitelist,
        blacklist: dir.path("missing.txt"),
        fonts: vec![partial, cyrillic, dir.path("missing.font")],
    });
    // Parsing stops at the malformed line.
    assert_eq!(config.blocks.len(), 2);
    assert!(config.blacklist.is_empty());
    assert_eq!(config.fonts.len(), 2);

    let cache = GlyphCache::new(config, &SyntheticRasterizer);
    let mapping = cache.block_mapping();
    assert_eq!(mapping[1].0.name, "Cyrillic");
    assert_eq!(mapping[1].1, Some(0));

    // Present in the whitelisted font.
    assert_eq!(cache.font_index('\u{0411}'), Some(0));
    // Falls through to the next best font.
    assert_eq!(cache.font_index('\u{0430}'), Some(1));
    assert_eq!(cache.font_index_stateless('\u{0430}'), Some(1));
    assert_eq!(cache.font_index('a'), Some(0));
    assert!(cache.glyph('\u{0430}', SDF_GLYPH_SIZE).metrics.is_valid);
}

#[test]
fn blacklisting_everything_keeps_indices() {
    let dir = ScratchDir::new("blacklist");
    let blocks = dir.write("blocks.txt", "Basic_Latin 0000 007F\n");
    let first = dir.write(
        "first.font",
        SyntheticFont::new("first").with_range('A'..='z').to_bytes(),
    );
    let second = dir.write(
        "second.font",
        SyntheticFont::new("second").with_range('a'..='z').to_bytes(),
    );
    let blacklist = dir.write("blacklist.txt", format!("* {}\n", name_of(&first)));

    let cache = GlyphCache::new(
        GlyphCacheConfig::load(&ConfigPaths {
            unicode_blocks: blocks,
            whitelist: dir.path("missing.txt"),
            blacklist,
            fonts: vec![first, second],
        }),
        &SyntheticRasterizer,
    );
    assert_eq!(cache.fonts().len(), 2);
    assert_eq!(cache.font_index('q'), Some(1));
    assert_eq!(cache.font_index('Q'), None);
}
