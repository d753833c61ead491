//! # Storage Module
//!
//! Byte-level access to files that may be far larger than the memory we are
//! willing to spend on them.
//!
//! ## Architecture Overview
//!
//! ```text
//!          ┌──────────────────────────────┐
//!          │     ByteSource (trait)       │  get_byte / get_range / read_u*
//!          └──────────────┬───────────────┘
//!               ┌─────────┴──────────┐
//!     ┌─────────▼────────┐   ┌───────▼────────┐
//!     │    BlockStore    │   │  ResidentFile  │
//!     │  (lazy blocks)   │   │ (whole file)   │
//!     └─────────┬────────┘   └────────────────┘
//!     ┌─────────▼────────┐
//!     │    BlockCache    │  max_blocks slots, FIFO history
//!     └─────────┬────────┘
//!     ┌─────────▼────────┐
//!     │  File (seek+read)│
//!     └──────────────────┘
//! ```
//!
//! `BlockStore` splits the file into fixed-size blocks (256..=65535 bytes)
//! and keeps at most `max_blocks` of them resident. A request for a byte in a
//! missing block seeks and reads that block; if the cache is full the block
//! that was loaded longest ago is dropped first. Hits do not refresh a
//! block's position, so eviction order is load order.
//!
//! `ResidentFile` reads the whole file once and serves the same interface
//! from memory. It is the right choice for small files and for tests.
//!
//! ## Fixed-Width Reads
//!
//! `ByteSource` provides `read_u16`, `read_u32` and `read_u64`. Values are
//! assembled most-significant byte first regardless of host endianness. A
//! read at `offset` succeeds when `offset + width <= size`.
//!
//! ## Thread Safety
//!
//! Nothing here is `Sync`-safe by itself: every read may mutate the block
//! cache, so all accessors take `&mut self`. `SharedBlockStore` puts a store
//! behind a mutex for callers that need to share one across threads.
//!
//! ## Module Organization
//!
//! - `block`: one cached chunk of the file
//! - `cache`: slot table, index map and load history
//! - `file`: path/descriptor handling and stat checks
//! - `block_store`: `BlockStore` and its builder
//! - `resident`: `ResidentFile`
//! - `shared`: `SharedBlockStore`

mod block;
mod block_store;
mod cache;
mod file;
mod resident;
mod shared;

use std::ops::Range;

pub use block::Block;
pub use block_store::{BlockStore, BlockStoreBuilder, StoreStats};
pub use cache::BlockCache;
pub use file::{FileSource, FileStamp};
pub use resident::ResidentFile;
pub use shared::SharedBlockStore;

/// Random access to an immutable sequence of bytes.
///
/// Accessors take `&mut self` because implementations are free to cache.
/// `None` means the bytes could not be produced: out of bounds, or an I/O
/// failure underneath.
pub trait ByteSource {
    fn size(&self) -> u64;

    fn get_byte(&mut self, index: u64) -> Option<u8>;

    /// Half-open range. An empty range yields an empty vector.
    fn get_range(&mut self, range: Range<u64>) -> Option<Vec<u8>>;

    /// Preferred number of bytes per `get_range` call when streaming the
    /// whole source.
    fn scan_chunk_len(&self) -> u64 {
        64 * 1024
    }

    fn read_u16(&mut self, offset: u64) -> Option<u16> {
        read_array::<2, Self>(self, offset).map(u16::from_be_bytes)
    }

    fn read_u32(&mut self, offset: u64) -> Option<u32> {
        read_array::<4, Self>(self, offset).map(u32::from_be_bytes)
    }

    fn read_u64(&mut self, offset: u64) -> Option<u64> {
        read_array::<8, Self>(self, offset).map(u64::from_be_bytes)
    }
}

fn read_array<const N: usize, S: ByteSource + ?Sized>(source: &mut S, offset: u64) -> Option<[u8; N]> {
    let end = offset.checked_add(N as u64)?;
    if end > source.size() {
        return None;
    }

    let bytes = source.get_range(offset..end)?;
    <[u8; N]>::try_from(bytes).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_width_reads_are_big_endian() {
        let mut file = ResidentFile::from_bytes(vec![
            0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08, 0x09,
        ]);

        assert_eq!(file.read_u16(0), Some(0x0102));
        assert_eq!(file.read_u32(1), Some(0x0203_0405));
        assert_eq!(file.read_u64(1), Some(0x0203_0405_0607_0809));
    }

    #[test]
    fn fixed_width_reads_accept_final_offset() {
        let mut file = ResidentFile::from_bytes(vec![0xAA, 0xBB, 0xCC, 0xDD]);

        assert_eq!(file.read_u16(2), Some(0xCCDD));
        assert_eq!(file.read_u16(3), None);
        assert_eq!(file.read_u32(0), Some(0xAABB_CCDD));
        assert_eq!(file.read_u32(1), None);
        assert_eq!(file.read_u64(0), None);
    }

    #[test]
    fn fixed_width_reads_reject_overflowing_offset() {
        let mut file = ResidentFile::from_bytes(vec![0; 16]);

        assert_eq!(file.read_u64(u64::MAX - 3), None);
    }
}
