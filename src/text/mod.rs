//! # Text Module
//!
//! Line-level access on top of the storage layer.
//!
//! ## Components
//!
//! ```text
//! BigTextFile ──> LineCache      bounded, FIFO
//!      │
//!      ├────────> LineIndex      line starts + trailing terminator flag
//!      │              │
//!      │              └── scans any ByteSource once
//!      ▼
//!  BlockStore
//!
//! TextFile ─────> LineIndex ───> ResidentFile   everything decoded up front
//! ```
//!
//! ## Line Endings
//!
//! A file is opened with one [`LineEnding`]: `\r`, `\n` or `\r\n`. Only the
//! chosen sequence terminates a line; any other CR or LF byte is content.
//! A terminator at the very end of the file does not start an extra empty
//! line.
//!
//! ## Decoding
//!
//! `TextFile` always decodes strict UTF-8. `BigTextFile` defaults to strict
//! UTF-8 and can be switched to [`TextDecoding::Latin1`], which maps each
//! byte to the character with the same value and never fails.

mod big_text;
mod decode;
mod line_cache;
mod line_ending;
mod line_index;
mod text_file;

pub use big_text::{BigTextFile, BigTextFileBuilder, Lines};
pub use decode::TextDecoding;
pub use line_cache::LineCache;
pub use line_ending::{LineEnding, CR, LF};
pub use line_index::LineIndex;
pub use text_file::TextFile;
