// Copyright 2026 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Error types.

use core::fmt;
use std::io;

/// Failure to open a font.
///
/// A font that fails to open is skipped by the [`GlyphCache`](crate::GlyphCache);
/// it never prevents the remaining fonts from being used.
#[derive(Debug)]
pub enum FontError {
    /// The font data could not be parsed or contains no glyphs.
    InvalidFont(&'static str),
    /// The font file could not be read.
    Io(io::Error),
}

impl fmt::Display for FontError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidFont(reason) => write!(f, "invalid font: {reason}"),
            Self::Io(err) => write!(f, "failed to read font: {err}"),
        }
    }
}

impl core::error::Error for FontError {
    fn source(&self) -> Option<&(dyn core::error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::InvalidFont(_) => None,
        }
    }
}

impl From<io::Error> for FontError {
    fn from(err: io::Error) -> Self {
        Self::Io(err)
    }
}

/// What was wrong with a configuration line.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum ConfigErrorKind {
    /// The line has fewer fields than the format requires.
    MissingField,
    /// A code point field is not a hexadecimal number.
    InvalidHex,
    /// The block ends before it starts.
    InvertedRange,
    /// The block reaches past the last Unicode code point.
    OutOfRange,
    /// The block starts at or before the end of the previous block.
    Unordered,
}

/// A malformed line in a block definition or font override list.
///
/// Parsing stops at the first malformed line; entries parsed before it
/// remain usable.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct ConfigError {
    /// One-based line number of the offending line.
    pub line: usize,
    /// The problem found on that line.
    pub kind: ConfigErrorKind,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let what = match self.kind {
            ConfigErrorKind::MissingField => "missing field",
            ConfigErrorKind::InvalidHex => "code point is not hexadecimal",
            ConfigErrorKind::InvertedRange => "block ends before it starts",
            ConfigErrorKind::OutOfRange => "block ends past U+10FFFF",
            ConfigErrorKind::Unordered => "block overlaps or precedes the previous block",
        };
        write!(f, "line {}: {what}", self.line)
    }
}

impl core::error::Error for ConfigError {}
