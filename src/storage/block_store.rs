//! # Block Store
//!
//! `BlockStore` serves byte and byte-range reads over a file while keeping at
//! most `max_blocks * block_size` bytes of it in memory.
//!
//! ## Read Path
//!
//! ```text
//! get_byte(i)
//!   │ i >= size? ──> None
//!   ▼
//! block = i / block_size
//!   │ cached? ──yes──> slot[block][i % block_size]
//!   ▼ no
//! cache full? ──yes──> evict oldest load
//!   ▼
//! seek(block * block_size), read block_size bytes
//!   │ short read and not the last block? ──> FileAccess, None
//!   ▼
//! record in history, serve byte
//! ```
//!
//! `get_range` resolves single-block ranges directly from the slot. Ranges
//! spanning blocks are split into a leading partial block, whole aligned
//! middle blocks and a trailing partial block, each fetched the same way and
//! concatenated. If any piece fails the whole range is `None`.
//!
//! ## File Changes
//!
//! The file is stat'ed at construction and on `refresh()`. When the
//! modification time has moved forward (or the size differs) every cached
//! block is dropped. Individual reads do not stat: a file rewritten between
//! refreshes may serve stale bytes or fail with `None`. Callers that expect
//! external writers should call `refresh()` at their own checkpoints.
//!
//! ## Errors
//!
//! Construction and `refresh()` return `eyre::Result` whose root error is a
//! [`FileError`]. Reads return `Option`; I/O failures are logged at debug
//! level and never retried.

use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::ops::Range;
use std::path::Path;

use eyre::{bail, Result};
use tracing::{debug, trace};

use super::block::Block;
use super::cache::BlockCache;
use super::file::{self, FileSource, FileStamp};
use super::ByteSource;
use crate::config::{
    DEFAULT_BLOCK_SIZE, DEFAULT_MAX_BLOCKS, MIN_BLOCK_SIZE, SCAN_CHUNK_BLOCKS,
};
use crate::error::FileError;

/// Counters for observing cache behaviour.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StoreStats {
    /// Blocks read from disk into the cache.
    pub loads: u64,
    /// Block lookups served from the cache.
    pub hits: u64,
    pub evictions: u64,
    /// Full cache invalidations caused by a file change.
    pub resets: u64,
}

#[derive(Debug, Clone)]
pub struct BlockStoreBuilder {
    block_size: u16,
    max_blocks: u64,
    zero_on_evict: bool,
}

impl Default for BlockStoreBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl BlockStoreBuilder {
    pub fn new() -> Self {
        Self {
            block_size: DEFAULT_BLOCK_SIZE,
            max_blocks: DEFAULT_MAX_BLOCKS,
            zero_on_evict: false,
        }
    }

    /// Bytes per block, 256..=65535.
    pub fn block_size(mut self, block_size: u16) -> Self {
        self.block_size = block_size;
        self
    }

    /// Maximum number of resident blocks, at least 1.
    pub fn max_blocks(mut self, max_blocks: u64) -> Self {
        self.max_blocks = max_blocks;
        self
    }

    /// Overwrite evicted blocks with zeros before their buffer is reused.
    pub fn zero_on_evict(mut self, zero: bool) -> Self {
        self.zero_on_evict = zero;
        self
    }

    pub fn open<P: AsRef<Path>>(self, path: P) -> Result<BlockStore> {
        let path = path.as_ref();
        let capacity = self.validate()?;

        if path.as_os_str().is_empty() {
            bail!(FileError::invalid("empty path"));
        }

        let stamp = file::stat_path(path)?;
        let file = file::open_path(path)?;

        Ok(self.build(file, FileSource::Path(path.to_path_buf()), stamp, capacity))
    }

    /// Takes ownership of an already open file.
    pub fn open_file(self, file: File) -> Result<BlockStore> {
        let capacity = self.validate()?;
        let stamp = file::stat_handle(&file)?;

        Ok(self.build(file, FileSource::Handle, stamp, capacity))
    }

    /// Takes ownership of an open descriptor. The standard streams are
    /// rejected.
    #[cfg(unix)]
    pub fn open_fd(self, fd: std::os::fd::OwnedFd) -> Result<BlockStore> {
        use std::os::fd::AsRawFd;

        let raw = fd.as_raw_fd();
        if raw < crate::config::MIN_DESCRIPTOR {
            bail!(FileError::invalid(format!(
                "descriptor {} is reserved (minimum {})",
                raw,
                crate::config::MIN_DESCRIPTOR
            )));
        }

        self.open_file(File::from(fd))
    }

    fn validate(&self) -> Result<usize> {
        if self.block_size < MIN_BLOCK_SIZE {
            bail!(FileError::invalid(format!(
                "block size {} is below the minimum of {}",
                self.block_size, MIN_BLOCK_SIZE
            )));
        }

        if self.max_blocks == 0 {
            bail!(FileError::invalid("max_blocks must be at least 1"));
        }

        usize::try_from(self.max_blocks).map_err(|_| {
            FileError::invalid(format!(
                "max_blocks {} does not fit in memory",
                self.max_blocks
            ))
            .into()
        })
    }

    fn build(self, file: File, source: FileSource, stamp: FileStamp, capacity: usize) -> BlockStore {
        let mut cache = BlockCache::new(capacity, self.block_size as usize);
        cache.set_zero_on_evict(self.zero_on_evict);

        let store = BlockStore {
            file,
            source,
            block_size: self.block_size,
            max_blocks: self.max_blocks,
            size: stamp.size,
            block_count: block_count(stamp.size, self.block_size),
            stamp,
            cache,
            stats: StoreStats::default(),
        };

        debug!(
            path = ?store.path(),
            size = store.size,
            block_size = store.block_size,
            max_blocks = store.max_blocks,
            "opened block store"
        );

        store
    }
}

fn block_count(size: u64, block_size: u16) -> u64 {
    size.div_ceil(block_size as u64)
}

#[derive(Debug)]
pub struct BlockStore {
    file: File,
    source: FileSource,
    block_size: u16,
    max_blocks: u64,
    size: u64,
    block_count: u64,
    stamp: FileStamp,
    cache: BlockCache,
    stats: StoreStats,
}

impl BlockStore {
    pub fn builder() -> BlockStoreBuilder {
        BlockStoreBuilder::new()
    }

    pub fn open<P: AsRef<Path>>(path: P, block_size: u16, max_blocks: u64) -> Result<Self> {
        Self::builder()
            .block_size(block_size)
            .max_blocks(max_blocks)
            .open(path)
    }

    pub fn from_file(file: File, block_size: u16, max_blocks: u64) -> Result<Self> {
        Self::builder()
            .block_size(block_size)
            .max_blocks(max_blocks)
            .open_file(file)
    }

    pub fn file_size(&self) -> u64 {
        self.size
    }

    pub fn block_size(&self) -> u16 {
        self.block_size
    }

    pub fn block_count(&self) -> u64 {
        self.block_count
    }

    pub fn max_blocks(&self) -> u64 {
        self.max_blocks
    }

    /// Bytes in the final block when it is partial, 0 when the size is a
    /// whole number of blocks.
    pub fn last_block_size(&self) -> u16 {
        (self.size % self.block_size as u64) as u16
    }

    pub fn path(&self) -> Option<&Path> {
        self.source.path()
    }

    pub fn stats(&self) -> StoreStats {
        self.stats
    }

    pub fn zero_on_evict(&self) -> bool {
        self.cache.zero_on_evict()
    }

    pub fn set_zero_on_evict(&mut self, zero: bool) {
        self.cache.set_zero_on_evict(zero);
    }

    /// Resident block indices, oldest load first.
    pub fn cached_blocks(&self) -> Vec<u64> {
        self.cache.history().collect()
    }

    pub fn is_cached(&self, block_index: u64) -> bool {
        self.cache.contains(block_index)
    }

    pub fn get_byte(&mut self, index: u64) -> Option<u8> {
        if index >= self.size {
            return None;
        }

        let block_index = index / self.block_size as u64;
        let offset = (index % self.block_size as u64) as usize;

        if let Err(e) = self.load(block_index) {
            debug!(index, block = block_index, error = %e, "byte read failed");
            return None;
        }

        self.cache.get(block_index)?.get(offset)
    }

    /// Half-open range read. `None` when `end` is past the file size, the
    /// range is inverted, or any underlying block fails to load.
    pub fn get_range(&mut self, range: Range<u64>) -> Option<Vec<u8>> {
        if range.end > self.size || range.start > range.end {
            return None;
        }
        if range.start == range.end {
            return Some(Vec::new());
        }

        let block_size = self.block_size as u64;
        let start_block = range.start / block_size;
        let end_block = (range.end - 1) / block_size;

        if start_block == end_block {
            if let Err(e) = self.load(start_block) {
                debug!(start = range.start, end = range.end, error = %e, "range read failed");
                return None;
            }

            let base = start_block * block_size;
            let local = (range.start - base) as usize..(range.end - base) as usize;
            return self
                .cache
                .get(start_block)?
                .range(local)
                .map(<[u8]>::to_vec);
        }

        let mut bytes = Vec::with_capacity((range.end - range.start) as usize);

        let first_end = (start_block + 1) * block_size;
        bytes.extend(self.get_range(range.start..first_end)?);

        for middle in (start_block + 1)..end_block {
            let start = middle * block_size;
            bytes.extend(self.get_range(start..start + block_size)?);
        }

        bytes.extend(self.get_range(end_block * block_size..range.end)?);

        Some(bytes)
    }

    /// Ensures a block is resident. Indices past the last block are ignored.
    pub fn preload(&mut self, block_index: u64) -> Result<()> {
        if block_index >= self.block_count {
            return Ok(());
        }
        self.load(block_index)
    }

    /// Returns a copy of a block without inserting it into the cache. A
    /// resident block is copied from memory, otherwise it is read from disk.
    pub fn copy_block(&mut self, block_index: u64) -> Option<Block> {
        if block_index >= self.block_count {
            return None;
        }

        if let Some(block) = self.cache.get(block_index) {
            return Some(block.clone());
        }

        let mut block = Block::empty(self.block_size as usize);
        match block.fill(&mut self.file, block_index, self.block_size) {
            Ok(_) => Some(block),
            Err(e) => {
                debug!(block = block_index, error = %e, "block copy failed");
                None
            }
        }
    }

    /// Reads the entire file in one pass. All or nothing; the cache is left
    /// untouched.
    pub fn read_all(&mut self) -> Result<Vec<u8>> {
        let size = usize::try_from(self.size)
            .map_err(|_| FileError::invalid(format!("file of {} bytes exceeds address space", self.size)))?;

        self.file
            .seek(SeekFrom::Start(0))
            .map_err(|e| FileError::access("seek", self.source.path().map(Path::to_path_buf), Some(e)))?;

        let mut data = Vec::with_capacity(size);
        (&mut self.file)
            .take(self.size)
            .read_to_end(&mut data)
            .map_err(|e| FileError::access("read", self.source.path().map(Path::to_path_buf), Some(e)))?;

        if data.len() != size {
            bail!(FileError::access(
                "read (file shorter than expected)",
                self.source.path().map(Path::to_path_buf),
                None
            ));
        }

        Ok(data)
    }

    /// Re-stats the file. If it changed since the last check every cached
    /// block is dropped. Size and block count are updated either way.
    ///
    /// Returns whether the cache was invalidated.
    pub fn refresh(&mut self) -> Result<bool> {
        let stamp = file::stat(&self.source, &self.file)?;
        let changed = stamp.is_newer_than(&self.stamp) || stamp.size != self.stamp.size;

        if changed {
            debug!(
                path = ?self.source.path(),
                old_size = self.stamp.size,
                new_size = stamp.size,
                dropped = self.cache.len(),
                "file changed, resetting block cache"
            );
            self.cache.clear();
            self.stats.resets += 1;
        }

        self.stamp = stamp;
        self.size = stamp.size;
        self.block_count = block_count(stamp.size, self.block_size);

        Ok(changed)
    }

    /// Caller guarantees `block_index < block_count`.
    fn load(&mut self, block_index: u64) -> Result<()> {
        if self.cache.contains(block_index) {
            self.stats.hits += 1;
            return Ok(());
        }

        let block_size = self.block_size;
        let last_block = self.block_count.saturating_sub(1);
        let file = &mut self.file;
        let source = &self.source;

        let evicted = self.cache.insert_with(block_index, |block| {
            let read = block.fill(file, block_index, block_size).map_err(|e| {
                FileError::access("read", source.path().map(Path::to_path_buf), Some(e))
            })?;

            if read < block_size as usize && block_index != last_block {
                bail!(FileError::access(
                    "read (short block)",
                    source.path().map(Path::to_path_buf),
                    None
                ));
            }

            trace!(block = block_index, bytes = read, "loaded block");
            Ok(())
        })?;

        self.stats.loads += 1;
        if let Some(old) = evicted {
            self.stats.evictions += 1;
            trace!(block = old, zeroed = self.cache.zero_on_evict(), "evicted block");
        }

        Ok(())
    }
}

impl ByteSource for BlockStore {
    fn size(&self) -> u64 {
        self.size
    }

    fn get_byte(&mut self, index: u64) -> Option<u8> {
        BlockStore::get_byte(self, index)
    }

    fn get_range(&mut self, range: Range<u64>) -> Option<Vec<u8>> {
        BlockStore::get_range(self, range)
    }

    fn scan_chunk_len(&self) -> u64 {
        self.block_size as u64 * SCAN_CHUNK_BLOCKS.min(self.max_blocks)
    }
}
