//! # Line Index
//!
//! Byte offsets of every line start in a byte source, built by one pass over
//! the whole source.
//!
//! ## Layout
//!
//! ```text
//! content:  a b c \n d e f \n g h i          (Unix)
//! offset:   0 1 2 3  4 5 6 7  8 9 10
//! starts:   [0, 4, 8]
//! trailing_line_feed: false
//! line 1 span: starts[1] .. starts[2] - 1  = 4..7  "def"
//! line 2 span: starts[2] .. size           = 8..11 "ghi"
//! ```
//!
//! A terminator that ends the file does not open another line; it only sets
//! `trailing_line_feed`, which makes the last line's span stop before it:
//!
//! ```text
//! content:  a b c \r \n d e f \r \n          (Windows)
//! starts:   [0, 5]
//! trailing_line_feed: true
//! line 1 span: 5 .. size - 2 = 5..8 "def"
//! ```
//!
//! Joining every line with the terminator, plus one more terminator when
//! `trailing_line_feed` is set, reproduces the source exactly.
//!
//! ## Terminator Detection
//!
//! The scan is a small state machine fed in chunks, so a `\r\n` pair split
//! across two chunks is still recognised. In Windows mode a lone `\r` or a
//! lone `\n` is ordinary line content.

use std::ops::Range;
use std::time::Instant;

use eyre::{bail, Result};
use tracing::debug;

use super::line_ending::{LineEnding, CR, LF};
use crate::error::FileError;
use crate::storage::ByteSource;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LineIndex {
    starts: Vec<u64>,
    trailing_line_feed: bool,
    ending: LineEnding,
    size: u64,
}

impl LineIndex {
    /// Scans the whole source once. Fails only if the source cannot produce
    /// its bytes.
    pub fn build<S: ByteSource + ?Sized>(source: &mut S, ending: LineEnding) -> Result<Self> {
        let started = Instant::now();
        let size = source.size();
        let chunk = source.scan_chunk_len().max(1);

        let mut scanner = Scanner::new(ending, size);
        let mut offset = 0;
        while offset < size {
            let end = offset.saturating_add(chunk).min(size);
            let Some(bytes) = source.get_range(offset..end) else {
                bail!(FileError::access("line index scan", None, None));
            };
            scanner.feed(&bytes);
            offset = end;
        }

        let index = scanner.finish();
        debug!(
            lines = index.line_count(),
            ending = %ending,
            size,
            elapsed = ?started.elapsed(),
            "built line index"
        );

        Ok(index)
    }

    pub fn from_bytes(bytes: &[u8], ending: LineEnding) -> Self {
        let mut scanner = Scanner::new(ending, bytes.len() as u64);
        scanner.feed(bytes);
        scanner.finish()
    }

    /// An index with no lines.
    pub fn empty(ending: LineEnding) -> Self {
        Self {
            ending,
            ..Self::default()
        }
    }

    pub fn line_count(&self) -> u64 {
        self.starts.len() as u64
    }

    pub fn is_empty(&self) -> bool {
        self.starts.is_empty()
    }

    /// Line start offsets, strictly increasing, first entry 0.
    pub fn starts(&self) -> &[u64] {
        &self.starts
    }

    pub fn trailing_line_feed(&self) -> bool {
        self.trailing_line_feed
    }

    pub fn ending(&self) -> LineEnding {
        self.ending
    }

    /// Size of the source when it was scanned.
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Byte span of `line`, terminator excluded.
    pub fn line_span(&self, line: u64) -> Option<Range<u64>> {
        let n = usize::try_from(line).ok()?;
        let start = *self.starts.get(n)?;

        let end = match self.starts.get(n + 1) {
            Some(&next) => next - self.ending.width(),
            None if self.trailing_line_feed => self.size - self.ending.width(),
            None => self.size,
        };

        Some(start..end)
    }
}

struct Scanner {
    ending: LineEnding,
    size: u64,
    pos: u64,
    prev_cr: bool,
    starts: Vec<u64>,
    last_terminator_end: Option<u64>,
}

impl Scanner {
    fn new(ending: LineEnding, size: u64) -> Self {
        let mut starts = Vec::new();
        if size > 0 {
            starts.push(0);
        }

        Self {
            ending,
            size,
            pos: 0,
            prev_cr: false,
            starts,
            last_terminator_end: None,
        }
    }

    fn feed(&mut self, bytes: &[u8]) {
        for &byte in bytes {
            let terminated = match self.ending {
                LineEnding::ClassicMac => byte == CR,
                LineEnding::Unix => byte == LF,
                LineEnding::Windows => byte == LF && self.prev_cr,
            };
            self.prev_cr = byte == CR;
            self.pos += 1;

            if terminated {
                self.starts.push(self.pos);
                self.last_terminator_end = Some(self.pos);
            }
        }
    }

    fn finish(mut self) -> LineIndex {
        debug_assert_eq!(self.pos, self.size, "scanner fed a different number of bytes");

        let trailing_line_feed = self.size > 0 && self.last_terminator_end == Some(self.size);
        if trailing_line_feed {
            self.starts.pop();
        }

        LineIndex {
            starts: self.starts,
            trailing_line_feed,
            ending: self.ending,
            size: self.size,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::ResidentFile;

    fn spans(index: &LineIndex) -> Vec<Range<u64>> {
        (0..index.line_count())
            .map(|n| index.line_span(n).unwrap())
            .collect()
    }

    #[test]
    fn unix_without_trailing_terminator() {
        let index = LineIndex::from_bytes(b"abc\ndef\nghi", LineEnding::Unix);

        assert_eq!(index.starts(), &[0, 4, 8]);
        assert!(!index.trailing_line_feed());
        assert_eq!(spans(&index), vec![0..3, 4..7, 8..11]);
    }

    #[test]
    fn windows_with_trailing_terminator() {
        let index = LineIndex::from_bytes(b"abc\r\ndef\r\n", LineEnding::Windows);

        assert_eq!(index.line_count(), 2);
        assert!(index.trailing_line_feed());
        assert_eq!(spans(&index), vec![0..3, 5..8]);
    }

    #[test]
    fn classic_mac() {
        let index = LineIndex::from_bytes(b"one\rtwo\r", LineEnding::ClassicMac);

        assert_eq!(index.line_count(), 2);
        assert_eq!(spans(&index), vec![0..3, 4..7]);
    }

    #[test]
    fn empty_source_has_no_lines() {
        let index = LineIndex::from_bytes(b"", LineEnding::Unix);

        assert_eq!(index.line_count(), 0);
        assert!(!index.trailing_line_feed());
        assert!(index.line_span(0).is_none());
    }

    #[test]
    fn lone_terminator_is_one_empty_line() {
        let index = LineIndex::from_bytes(b"\n", LineEnding::Unix);

        assert_eq!(index.line_count(), 1);
        assert_eq!(index.line_span(0), Some(0..0));
    }

    #[test]
    fn consecutive_terminators_make_empty_lines() {
        let index = LineIndex::from_bytes(b"a\n\n\nb", LineEnding::Unix);

        assert_eq!(spans(&index), vec![0..1, 2..2, 3..3, 4..5]);
    }

    #[test]
    fn windows_ignores_lone_cr_and_lf() {
        let index = LineIndex::from_bytes(b"a\rb\nc\r\r\nd", LineEnding::Windows);

        assert_eq!(spans(&index), vec![0..6, 8..9]);
    }

    #[test]
    fn crlf_split_across_chunks() {
        let mut bytes = vec![b'x'; 255];
        bytes.push(b'\r');
        bytes.push(b'\n');
        bytes.extend_from_slice(b"tail");

        struct Tiny(ResidentFile);
        impl ByteSource for Tiny {
            fn size(&self) -> u64 {
                self.0.size()
            }
            fn get_byte(&mut self, index: u64) -> Option<u8> {
                self.0.get_byte(index)
            }
            fn get_range(&mut self, range: Range<u64>) -> Option<Vec<u8>> {
                self.0.get_range(range).map(<[u8]>::to_vec)
            }
            fn scan_chunk_len(&self) -> u64 {
                256
            }
        }

        let mut source = Tiny(ResidentFile::from_bytes(bytes));
        let index = LineIndex::build(&mut source, LineEnding::Windows).unwrap();

        assert_eq!(spans(&index), vec![0..255, 257..261]);
    }

    #[test]
    fn build_matches_from_bytes() {
        let content = b"first\nsecond\n\nfourth\n".to_vec();
        let mut source = ResidentFile::from_bytes(content.clone());

        let built = LineIndex::build(&mut source, LineEnding::Unix).unwrap();

        assert_eq!(built, LineIndex::from_bytes(&content, LineEnding::Unix));
    }

    #[test]
    fn starts_are_strictly_increasing() {
        let index = LineIndex::from_bytes(b"\n\n\r\n\nxy\n", LineEnding::Unix);

        assert!(index.starts().windows(2).all(|w| w[0] < w[1]));
    }
}
