//! # bigfile - Random Access to Very Large Files
//!
//! `bigfile` reads bytes and text lines out of files that are too large, or
//! too wasteful, to load into memory whole. It keeps a fixed number of
//! fixed-size blocks resident and loads the rest on demand.
//!
//! ## Quick Start
//!
//! ```ignore
//! use bigfile::{BigTextFile, BlockStore, LineEnding};
//!
//! // Byte access: 4KB blocks, at most 16 resident.
//! let mut store = BlockStore::open("huge.bin", 4096, 16)?;
//! let magic = store.get_range(0..4);
//!
//! // Line access over the same machinery.
//! let mut log = BigTextFile::builder()
//!     .block_size(8192)
//!     .max_blocks(32)
//!     .max_cached_lines(512)
//!     .line_ending(LineEnding::Windows)
//!     .open("huge.log")?;
//! let last = log.line(log.line_count() as usize - 1);
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────┐
//! │  BigTextFile        TextFile        │  text
//! ├─────────────────────────────────────┤
//! │  LineCache  ◄──  LineIndex          │
//! ├─────────────────────────────────────┤
//! │  ByteSource: BlockStore │ Resident  │  storage
//! ├─────────────────────────────────────┤
//! │  BlockCache (FIFO, max_blocks)      │
//! ├─────────────────────────────────────┤
//! │  std::fs::File  seek + read         │
//! └─────────────────────────────────────┘
//! ```
//!
//! Everything is synchronous and single-threaded. Reads mutate caches, so
//! accessors take `&mut self`; wrap a store in [`SharedBlockStore`] to share
//! it between threads.
//!
//! ## Error Model
//!
//! Construction and refresh return `eyre::Result`; the root error is a
//! [`FileError`] whose [`ErrorKind`] tells invalid parameters, non-regular
//! files, open failures, I/O failures and decode failures apart. Individual
//! reads return `Option` and never panic on bad input.
//!
//! ## Module Overview
//!
//! - [`config`]: bounds and defaults
//! - [`error`]: `FileError`, `ErrorKind`
//! - [`storage`]: `BlockStore`, `ResidentFile`, `SharedBlockStore`, `ByteSource`
//! - [`text`]: `BigTextFile`, `TextFile`, `LineIndex`, `LineCache`

pub mod config;
pub mod error;
pub mod storage;
pub mod text;

pub use error::{ErrorKind, FileError};
pub use storage::{
    Block, BlockStore, BlockStoreBuilder, ByteSource, ResidentFile, SharedBlockStore, StoreStats,
};
pub use text::{BigTextFile, BigTextFileBuilder, LineEnding, LineIndex, TextDecoding, TextFile};
