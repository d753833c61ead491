//! # Big Text Files
//!
//! `BigTextFile` answers "give me line n" for files too large to split into
//! lines up front. It layers three pieces:
//!
//! ```text
//! BigTextFile
//! ├── LineIndex   line start offsets, built once by scanning the store
//! ├── LineCache   up to max_cached_lines decoded lines, FIFO
//! └── BlockStore  the bytes, max_blocks blocks resident
//! ```
//!
//! ## Line Lookup
//!
//! 1. `n >= line_count` → `None`
//! 2. cached → return the cached text, no I/O
//! 3. otherwise take the span from the index, fetch it from the store,
//!    decode, and remember it
//!
//! A fetch or decode failure yields `None` and leaves the cache unchanged.
//!
//! ## Staleness
//!
//! The index describes the file as it was when it was built. Nothing
//! re-validates it automatically; call `refresh()` after the file changes.

use std::fs::File;
use std::ops::Range;
use std::path::Path;

use eyre::Result;
use tracing::debug;

use super::decode::TextDecoding;
use super::line_cache::LineCache;
use super::line_ending::LineEnding;
use super::line_index::LineIndex;
use crate::config::DEFAULT_MAX_CACHED_LINES;
use crate::storage::{BlockStore, BlockStoreBuilder};

#[derive(Debug, Clone, Default)]
pub struct BigTextFileBuilder {
    store: BlockStoreBuilder,
    max_cached_lines: Option<u16>,
    line_ending: LineEnding,
    decoding: TextDecoding,
}

impl BigTextFileBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn block_size(mut self, block_size: u16) -> Self {
        self.store = self.store.block_size(block_size);
        self
    }

    pub fn max_blocks(mut self, max_blocks: u64) -> Self {
        self.store = self.store.max_blocks(max_blocks);
        self
    }

    pub fn zero_on_evict(mut self, zero: bool) -> Self {
        self.store = self.store.zero_on_evict(zero);
        self
    }

    pub fn max_cached_lines(mut self, max_cached_lines: u16) -> Self {
        self.max_cached_lines = Some(max_cached_lines);
        self
    }

    pub fn line_ending(mut self, line_ending: LineEnding) -> Self {
        self.line_ending = line_ending;
        self
    }

    pub fn decoding(mut self, decoding: TextDecoding) -> Self {
        self.decoding = decoding;
        self
    }

    pub fn open<P: AsRef<Path>>(self, path: P) -> Result<BigTextFile> {
        let store = self.store.clone().open(path)?;
        self.finish(store)
    }

    pub fn open_file(self, file: File) -> Result<BigTextFile> {
        let store = self.store.clone().open_file(file)?;
        self.finish(store)
    }

    #[cfg(unix)]
    pub fn open_fd(self, fd: std::os::fd::OwnedFd) -> Result<BigTextFile> {
        let store = self.store.clone().open_fd(fd)?;
        self.finish(store)
    }

    fn finish(self, store: BlockStore) -> Result<BigTextFile> {
        BigTextFile::from_store(
            store,
            self.max_cached_lines.unwrap_or(DEFAULT_MAX_CACHED_LINES),
            self.line_ending,
            self.decoding,
        )
    }
}

#[derive(Debug)]
pub struct BigTextFile {
    store: BlockStore,
    index: LineIndex,
    cache: LineCache,
    decoding: TextDecoding,
    max_cached_lines: u16,
}

impl BigTextFile {
    pub fn builder() -> BigTextFileBuilder {
        BigTextFileBuilder::new()
    }

    pub fn open<P: AsRef<Path>>(
        path: P,
        block_size: u16,
        max_blocks: u64,
        max_cached_lines: u16,
        line_ending: LineEnding,
    ) -> Result<Self> {
        Self::builder()
            .block_size(block_size)
            .max_blocks(max_blocks)
            .max_cached_lines(max_cached_lines)
            .line_ending(line_ending)
            .open(path)
    }

    /// Indexes an already open store.
    pub fn from_store(
        mut store: BlockStore,
        max_cached_lines: u16,
        line_ending: LineEnding,
        decoding: TextDecoding,
    ) -> Result<Self> {
        let index = LineIndex::build(&mut store, line_ending)?;

        Ok(Self {
            store,
            index,
            cache: LineCache::new(max_cached_lines as usize),
            decoding,
            max_cached_lines,
        })
    }

    pub fn line_count(&self) -> u64 {
        self.index.line_count()
    }

    pub fn line_ending(&self) -> LineEnding {
        self.index.ending()
    }

    pub fn is_windows(&self) -> bool {
        self.index.ending() == LineEnding::Windows
    }

    pub fn trailing_line_feed(&self) -> bool {
        self.index.trailing_line_feed()
    }

    pub fn decoding(&self) -> TextDecoding {
        self.decoding
    }

    pub fn max_cached_lines(&self) -> u16 {
        self.max_cached_lines
    }

    pub fn index(&self) -> &LineIndex {
        &self.index
    }

    pub fn cache(&self) -> &LineCache {
        &self.cache
    }

    pub fn store(&self) -> &BlockStore {
        &self.store
    }

    /// Byte-level access to the underlying file. Reads through it share the
    /// block cache with line lookups.
    pub fn store_mut(&mut self) -> &mut BlockStore {
        &mut self.store
    }

    pub fn line(&mut self, n: usize) -> Option<String> {
        let line = n as u64;
        let span = self.index.line_span(line)?;

        if let Some(text) = self.cache.get(line) {
            return Some(text.to_string());
        }

        let bytes = self.store.get_range(span.clone())?;
        let text = match self.decoding.decode(bytes) {
            Ok(text) => text,
            Err(e) => {
                debug!(
                    line,
                    offset = span.start + e.valid_up_to() as u64,
                    "line is not valid UTF-8"
                );
                return None;
            }
        };

        self.cache.insert(line, text.clone());
        Some(text)
    }

    /// Lines in `range`, stopping at the first line that cannot be produced.
    pub fn lines(&mut self, range: Range<usize>) -> Vec<String> {
        let count = usize::try_from(self.line_count()).unwrap_or(usize::MAX);
        let mut lines = Vec::with_capacity(range.len().min(count.saturating_sub(range.start)));
        for n in range {
            match self.line(n) {
                Some(text) => lines.push(text),
                None => break,
            }
        }
        lines
    }

    /// Every line of the file. The line cache is neither filled nor purged.
    pub fn all_lines(&mut self) -> Vec<String> {
        let count = usize::try_from(self.line_count()).unwrap_or(usize::MAX);

        let was_suppressed = self.cache.is_suppressed();
        self.cache.set_suppressed(true);
        let lines = self.lines(0..count);
        self.cache.set_suppressed(was_suppressed);

        lines
    }

    /// Drops every cached line. The index is kept.
    pub fn purge(&mut self) {
        self.cache.clear();
    }

    /// Purges the line cache, re-checks the file and rebuilds the index.
    ///
    /// If the rebuild fails the index is left empty: `line_count()` is 0 and
    /// every lookup is `None` until a later `refresh()` succeeds.
    pub fn refresh(&mut self) -> Result<()> {
        self.purge();
        self.store.refresh()?;

        let ending = self.index.ending();
        match LineIndex::build(&mut self.store, ending) {
            Ok(index) => {
                self.index = index;
                Ok(())
            }
            Err(e) => {
                debug!(error = %e, "line index rebuild failed, index cleared");
                self.index = LineIndex::empty(ending);
                Err(e)
            }
        }
    }

    /// Lines from the first, ending at the first line that cannot be
    /// produced.
    pub fn iter(&mut self) -> Lines<'_> {
        Lines {
            file: self,
            next: 0,
        }
    }
}

pub struct Lines<'a> {
    file: &'a mut BigTextFile,
    next: usize,
}

impl Iterator for Lines<'_> {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        let line = self.file.line(self.next)?;
        self.next += 1;
        Some(line)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn text_file(content: &[u8], ending: LineEnding) -> (tempfile::TempDir, BigTextFile) {
        let dir = tempdir().unwrap();
        let path = dir.path().join("text.txt");
        std::fs::write(&path, content).unwrap();
        let file = BigTextFile::open(&path, 256, 4, 8, ending).unwrap();
        (dir, file)
    }

    #[test]
    fn unix_lines() {
        let (_dir, mut file) = text_file(b"abc\ndef\nghi", LineEnding::Unix);

        assert_eq!(file.line_count(), 3);
        assert_eq!(file.line(0).as_deref(), Some("abc"));
        assert_eq!(file.line(2).as_deref(), Some("ghi"));
        assert_eq!(file.line(3), None);
    }

    #[test]
    fn windows_trailing_terminator() {
        let (_dir, mut file) = text_file(b"abc\r\ndef\r\n", LineEnding::Windows);

        assert!(file.is_windows());
        assert_eq!(file.line_count(), 2);
        assert_eq!(file.line(0).as_deref(), Some("abc"));
        assert_eq!(file.line(1).as_deref(), Some("def"));
    }

    #[test]
    fn empty_file() {
        let (_dir, mut file) = text_file(b"", LineEnding::Unix);

        assert_eq!(file.line_count(), 0);
        assert_eq!(file.line(0), None);
        assert!(file.all_lines().is_empty());
    }

    #[test]
    fn second_lookup_hits_cache() {
        let (_dir, mut file) = text_file(b"one\ntwo\nthree\n", LineEnding::Unix);

        let first = file.line(1).unwrap();
        let loads = file.store().stats().loads;
        let second = file.line(1).unwrap();

        assert_eq!(first, second);
        assert_eq!(file.store().stats().loads, loads);
        assert_eq!(file.cache().hits(), 1);
    }

    #[test]
    fn lines_stops_at_end() {
        let (_dir, mut file) = text_file(b"a\nb\nc", LineEnding::Unix);

        assert_eq!(file.lines(1..10), vec!["b", "c"]);
        assert!(file.lines(5..7).is_empty());
    }

    #[test]
    fn lines_with_unbounded_range() {
        let (_dir, mut file) = text_file(b"a\nb\nc", LineEnding::Unix);

        assert_eq!(file.lines(1..usize::MAX), vec!["b", "c"]);
        assert!(file.lines(usize::MAX - 1..usize::MAX).is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn failed_rebuild_clears_index() {
        use std::time::{Duration, SystemTime};

        let dir = tempdir().unwrap();
        let path = dir.path().join("write_only.txt");
        std::fs::write(&path, b"").unwrap();

        // A write-only handle stats fine but cannot be read.
        let handle = File::options().write(true).open(&path).unwrap();
        let mut file = BigTextFile::builder().block_size(256).open_file(handle).unwrap();
        assert_eq!(file.line_count(), 0);

        std::fs::write(&path, b"one\ntwo\n").unwrap();
        File::options()
            .write(true)
            .open(&path)
            .unwrap()
            .set_modified(SystemTime::now() + Duration::from_secs(60))
            .unwrap();

        assert!(file.refresh().is_err());
        assert_eq!(file.line_count(), 0);
        assert_eq!(file.line(0), None);
        assert_eq!(file.line_ending(), LineEnding::Unix);
    }

    #[test]
    fn all_lines_leaves_cache_alone() {
        let (_dir, mut file) = text_file(b"a\nb\nc\nd\n", LineEnding::Unix);
        file.line(2).unwrap();

        let all = file.all_lines();

        assert_eq!(all, vec!["a", "b", "c", "d"]);
        assert_eq!(file.cache().history().collect::<Vec<_>>(), vec![2]);
        assert!(!file.cache().is_suppressed());
    }

    #[test]
    fn invalid_utf8_line_is_none() {
        let (_dir, mut file) = text_file(b"ok\n\xff\xfe\nfine", LineEnding::Unix);

        assert_eq!(file.line(1), None);
        assert_eq!(file.line(2).as_deref(), Some("fine"));
        assert_eq!(file.lines(0..3), vec!["ok"]);
    }

    #[test]
    fn latin1_decoding() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("latin.txt");
        std::fs::write(&path, b"caf\xe9\n").unwrap();

        let mut file = BigTextFile::builder()
            .block_size(256)
            .decoding(TextDecoding::Latin1)
            .open(&path)
            .unwrap();

        assert_eq!(file.line(0).as_deref(), Some("caf\u{e9}"));
    }

    #[test]
    fn iter_yields_every_line() {
        let (_dir, mut file) = text_file(b"x\ny\nz\n", LineEnding::Unix);

        let lines: Vec<String> = file.iter().collect();

        assert_eq!(lines, vec!["x", "y", "z"]);
    }

    #[test]
    fn purge_keeps_index() {
        let (_dir, mut file) = text_file(b"x\ny\n", LineEnding::Unix);
        file.line(0).unwrap();

        file.purge();

        assert!(file.cache().is_empty());
        assert_eq!(file.line_count(), 2);
    }
}
