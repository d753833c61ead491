//! # Blocks
//!
//! A `Block` is one `block_size` chunk of the file, read in a single
//! seek+read. Every block except the last of the file is full; the last one
//! holds `size % block_size` bytes (or a full block when the size divides
//! evenly).
//!
//! Blocks are owned by the cache slots and reused across loads: eviction
//! empties a block (zeroing it first when the store asks for that) without
//! releasing its buffer, so a warm store does not allocate per load.

use std::io::{self, Read, Seek, SeekFrom};
use std::ops::Range;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    index: u64,
    data: Vec<u8>,
}

impl Block {
    pub(crate) fn empty(capacity: usize) -> Self {
        Self {
            index: 0,
            data: Vec::with_capacity(capacity),
        }
    }

    pub fn index(&self) -> u64 {
        self.index
    }

    /// Number of bytes actually held.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn get(&self, offset: usize) -> Option<u8> {
        self.data.get(offset).copied()
    }

    /// Block-relative range; `None` if it reaches past the bytes held.
    pub fn range(&self, range: Range<usize>) -> Option<&[u8]> {
        self.data.get(range)
    }

    pub fn into_data(self) -> Vec<u8> {
        self.data
    }

    /// Replaces the contents with up to `block_size` bytes read from
    /// `index * block_size`. Returns the number of bytes read; fewer than
    /// `block_size` means end of file was reached.
    pub(crate) fn fill<R: Read + Seek>(
        &mut self,
        reader: &mut R,
        index: u64,
        block_size: u16,
    ) -> io::Result<usize> {
        self.data.clear();
        self.index = index;

        reader.seek(SeekFrom::Start(index * block_size as u64))?;
        reader
            .by_ref()
            .take(block_size as u64)
            .read_to_end(&mut self.data)
    }

    pub(crate) fn zero(&mut self) {
        self.data.fill(0);
    }

    pub(crate) fn release(&mut self, zero: bool) {
        if zero {
            self.zero();
        }
        self.data.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn sample(len: usize) -> Cursor<Vec<u8>> {
        Cursor::new((0..len).map(|i| (i % 251) as u8).collect())
    }

    #[test]
    fn fill_reads_one_block() {
        let mut reader = sample(1000);
        let mut block = Block::empty(256);

        let n = block.fill(&mut reader, 1, 256).unwrap();

        assert_eq!(n, 256);
        assert_eq!(block.index(), 1);
        assert_eq!(block.get(0), Some((256 % 251) as u8));
        assert_eq!(block.len(), 256);
    }

    #[test]
    fn fill_last_block_is_short() {
        let mut reader = sample(1000);
        let mut block = Block::empty(256);

        let n = block.fill(&mut reader, 3, 256).unwrap();

        assert_eq!(n, 1000 - 768);
        assert_eq!(block.get(n), None);
    }

    #[test]
    fn range_rejects_bytes_past_end() {
        let mut reader = sample(300);
        let mut block = Block::empty(256);
        block.fill(&mut reader, 1, 256).unwrap();

        assert_eq!(block.range(0..44).map(|s| s.len()), Some(44));
        assert!(block.range(0..45).is_none());
    }

    #[test]
    fn release_zeroes_when_asked() {
        let mut reader = sample(512);
        let mut block = Block::empty(256);
        block.fill(&mut reader, 0, 256).unwrap();

        block.zero();
        assert!(block.data().iter().all(|&b| b == 0));

        block.release(true);
        assert!(block.is_empty());
    }
}
