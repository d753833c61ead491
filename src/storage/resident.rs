//! # Resident Files
//!
//! `ResidentFile` loads a file into memory in one read and serves it through
//! the same [`ByteSource`] interface as `BlockStore`. Loading is all or
//! nothing: a file that cannot be read completely produces no instance.

use std::fs::File;
use std::io::Read;
use std::ops::Range;
use std::path::{Path, PathBuf};

use eyre::{bail, Result};
use tracing::debug;

use super::file;
use super::ByteSource;
use crate::error::FileError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResidentFile {
    data: Vec<u8>,
    path: Option<PathBuf>,
}

impl ResidentFile {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if path.as_os_str().is_empty() {
            bail!(FileError::invalid("empty path"));
        }

        let stamp = file::stat_path(path)?;
        let file = file::open_path(path)?;
        let data = read_exact_len(file, stamp.size, Some(path))?;

        debug!(path = %path.display(), size = data.len(), "loaded resident file");

        Ok(Self {
            data,
            path: Some(path.to_path_buf()),
        })
    }

    pub fn from_file(file: File) -> Result<Self> {
        let stamp = file::stat_handle(&file)?;
        let data = read_exact_len(file, stamp.size, None)?;

        Ok(Self { data, path: None })
    }

    pub fn from_bytes(data: Vec<u8>) -> Self {
        Self { data, path: None }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn size(&self) -> u64 {
        self.data.len() as u64
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }

    pub fn get_byte(&self, index: u64) -> Option<u8> {
        let index = usize::try_from(index).ok()?;
        self.data.get(index).copied()
    }

    pub fn get_range(&self, range: Range<u64>) -> Option<&[u8]> {
        let start = usize::try_from(range.start).ok()?;
        let end = usize::try_from(range.end).ok()?;
        self.data.get(start..end)
    }
}

fn read_exact_len(file: File, size: u64, path: Option<&Path>) -> Result<Vec<u8>> {
    let owned = || path.map(Path::to_path_buf);

    let capacity = usize::try_from(size)
        .map_err(|_| FileError::invalid(format!("file of {} bytes exceeds address space", size)))?;

    let mut data = Vec::with_capacity(capacity);
    file.take(size)
        .read_to_end(&mut data)
        .map_err(|e| FileError::access("read", owned(), Some(e)))?;

    if data.len() != capacity {
        bail!(FileError::access(
            "read (file shorter than expected)",
            owned(),
            None
        ));
    }

    Ok(data)
}

impl ByteSource for ResidentFile {
    fn size(&self) -> u64 {
        self.data.len() as u64
    }

    fn get_byte(&mut self, index: u64) -> Option<u8> {
        ResidentFile::get_byte(self, index)
    }

    fn get_range(&mut self, range: Range<u64>) -> Option<Vec<u8>> {
        ResidentFile::get_range(self, range).map(<[u8]>::to_vec)
    }
}
