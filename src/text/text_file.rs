//! # Resident Text Files
//!
//! `TextFile` reads a whole file, splits it with the same terminator rules
//! as [`LineIndex`] and decodes every line as strict UTF-8 up front. A file
//! with any invalid line does not open; the error carries the line number
//! and byte offset.

use std::fs::File;
use std::path::Path;

use eyre::{bail, Result};

use super::line_ending::LineEnding;
use super::line_index::LineIndex;
use crate::error::FileError;
use crate::storage::ResidentFile;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextFile {
    lines: Vec<String>,
    ending: LineEnding,
}

impl TextFile {
    pub fn open<P: AsRef<Path>>(path: P, ending: LineEnding) -> Result<Self> {
        Self::from_resident(ResidentFile::open(path)?, ending)
    }

    pub fn from_file(file: File, ending: LineEnding) -> Result<Self> {
        Self::from_resident(ResidentFile::from_file(file)?, ending)
    }

    pub fn from_resident(file: ResidentFile, ending: LineEnding) -> Result<Self> {
        Self::from_bytes(&file.into_bytes(), ending)
    }

    pub fn from_bytes(bytes: &[u8], ending: LineEnding) -> Result<Self> {
        let index = LineIndex::from_bytes(bytes, ending);

        let mut lines = Vec::with_capacity(index.line_count() as usize);
        for n in 0..index.line_count() {
            let Some(span) = index.line_span(n) else {
                break;
            };
            let raw = &bytes[span.start as usize..span.end as usize];

            match std::str::from_utf8(raw) {
                Ok(text) => lines.push(text.to_string()),
                Err(e) => bail!(FileError::Decode {
                    line: n,
                    offset: span.start + e.valid_up_to() as u64,
                }),
            }
        }

        Ok(Self { lines, ending })
    }

    pub fn line_count(&self) -> u64 {
        self.lines.len() as u64
    }

    pub fn line_ending(&self) -> LineEnding {
        self.ending
    }

    pub fn line(&self, n: usize) -> Option<&str> {
        self.lines.get(n).map(String::as_str)
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> + '_ {
        self.lines.iter().map(String::as_str)
    }

    pub fn into_lines(self) -> Vec<String> {
        self.lines
    }
}

impl<'a> IntoIterator for &'a TextFile {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.lines.iter()
    }
}
