//! # Shared Block Store
//!
//! `BlockStore` mutates its cache on every read and is not safe to call from
//! several threads. `SharedBlockStore` serializes access with one mutex per
//! store; clones share the same store and cache.

use std::ops::Range;
use std::sync::Arc;

use eyre::Result;
use parking_lot::Mutex;

use super::{BlockStore, StoreStats};

#[derive(Debug, Clone)]
pub struct SharedBlockStore {
    inner: Arc<Mutex<BlockStore>>,
}

impl SharedBlockStore {
    pub fn new(store: BlockStore) -> Self {
        Self {
            inner: Arc::new(Mutex::new(store)),
        }
    }

    pub fn file_size(&self) -> u64 {
        self.inner.lock().file_size()
    }

    pub fn get_byte(&self, index: u64) -> Option<u8> {
        self.inner.lock().get_byte(index)
    }

    pub fn get_range(&self, range: Range<u64>) -> Option<Vec<u8>> {
        self.inner.lock().get_range(range)
    }

    pub fn preload(&self, block_index: u64) -> Result<()> {
        self.inner.lock().preload(block_index)
    }

    pub fn refresh(&self) -> Result<bool> {
        self.inner.lock().refresh()
    }

    pub fn stats(&self) -> StoreStats {
        self.inner.lock().stats()
    }

    /// Runs `f` with exclusive access to the store.
    pub fn with<R>(&self, f: impl FnOnce(&mut BlockStore) -> R) -> R {
        f(&mut self.inner.lock())
    }

    /// Returns the store if this is the last handle to it.
    pub fn try_unwrap(self) -> std::result::Result<BlockStore, Self> {
        Arc::try_unwrap(self.inner)
            .map(Mutex::into_inner)
            .map_err(|inner| Self { inner })
    }
}
