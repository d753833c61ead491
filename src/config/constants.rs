//! # Configuration Constants
//!
//! All tunables for the block store and the line layer. Constants that depend
//! on each other are co-located and tied together with `const` assertions.
//!
//! ## Dependency Graph
//!
//! ```text
//! MIN_BLOCK_SIZE (256) ──┬─> DEFAULT_BLOCK_SIZE (must lie in range)
//! MAX_BLOCK_SIZE (65535) ┘
//!
//! DEFAULT_BLOCK_SIZE
//!       │
//!       └─> SCAN_CHUNK_BLOCKS * DEFAULT_BLOCK_SIZE = bytes pulled per
//!           line-index scan step
//!
//! DEFAULT_MAX_BLOCKS (64)
//!       │
//!       └─> must be >= SCAN_CHUNK_BLOCKS, otherwise a single scan step
//!           evicts its own blocks before they are consumed
//! ```
//!
//! ## Memory Footprint
//!
//! A block store never holds more than `max_blocks * block_size` bytes of
//! file content. With the defaults that is 64 * 4KB = 256KB per open file.

// ============================================================================
// BLOCK GEOMETRY
// ============================================================================

/// Smallest accepted block size in bytes.
pub const MIN_BLOCK_SIZE: u16 = 256;

/// Largest accepted block size in bytes. Block sizes are carried as `u16`.
pub const MAX_BLOCK_SIZE: u16 = u16::MAX;

/// Block size used by the builders when none is given.
pub const DEFAULT_BLOCK_SIZE: u16 = 4096;

const _: () = assert!(
    DEFAULT_BLOCK_SIZE >= MIN_BLOCK_SIZE && DEFAULT_BLOCK_SIZE <= MAX_BLOCK_SIZE,
    "DEFAULT_BLOCK_SIZE must lie within [MIN_BLOCK_SIZE, MAX_BLOCK_SIZE]"
);

// ============================================================================
// CACHE SIZES
// ============================================================================

/// Maximum number of resident blocks used by the builders when none is given.
pub const DEFAULT_MAX_BLOCKS: u64 = 64;

/// Maximum number of memoized lines used by the builders when none is given.
pub const DEFAULT_MAX_CACHED_LINES: u16 = 256;

/// Number of blocks fetched per step while scanning a file for line
/// terminators.
pub const SCAN_CHUNK_BLOCKS: u64 = 4;

const _: () = assert!(
    DEFAULT_MAX_BLOCKS >= SCAN_CHUNK_BLOCKS,
    "DEFAULT_MAX_BLOCKS must hold at least one full scan chunk"
);

// ============================================================================
// FILE DESCRIPTORS
// ============================================================================

/// Lowest descriptor accepted by descriptor-based construction. Descriptors
/// 0..=2 are the standard streams and never refer to a file we should own.
/// Descriptor 3 is the first one `open` hands out and is accepted, unlike
/// readers that reserve every descriptor below 4.
pub const MIN_DESCRIPTOR: i32 = 3;
