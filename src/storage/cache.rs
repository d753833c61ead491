//! # Block Cache
//!
//! Bounded table of resident blocks, keyed by block index.
//!
//! ## Layout
//!
//! ```text
//! BlockCache
//! ├── slots:    [Block; <= capacity]   reused buffers, grown lazily
//! ├── occupied: [bool;  slots.len()]   which slots hold a live block
//! ├── index:    block_index -> slot
//! └── history:  VecDeque<block_index>  oldest load at the front
//! ```
//!
//! Slots are allocated on first use and never shrink, so a store opened with
//! a generous `max_blocks` only pays for the blocks it actually touches.
//!
//! ## Eviction
//!
//! Eviction removes the front of `history`, i.e. the block whose load is
//! oldest. A lookup does not touch `history`, which makes the order FIFO by
//! load time rather than LRU. Callers depend on this order:
//!
//! ```text
//! capacity 2, loads 0, 3, then 0 again:
//!   load 0      history [0]
//!   load 3      history [0, 3]
//!   get 0       history [0, 3]        (hit, unchanged)
//!   load 5      history [3, 5]        (0 evicted)
//! ```
//!
//! ## Zeroing
//!
//! With `zero_on_evict` set, a block's bytes are overwritten with zeros
//! before its slot is handed out again, and `clear()` zeroes every slot.

use std::collections::VecDeque;

use eyre::Result;
use hashbrown::HashMap;

use super::Block;

#[derive(Debug)]
pub struct BlockCache {
    slots: Vec<Block>,
    occupied: Vec<bool>,
    index: HashMap<u64, usize>,
    history: VecDeque<u64>,
    capacity: usize,
    block_size: usize,
    zero_on_evict: bool,
}

impl BlockCache {
    pub fn new(capacity: usize, block_size: usize) -> Self {
        Self {
            slots: Vec::new(),
            occupied: Vec::new(),
            index: HashMap::new(),
            history: VecDeque::new(),
            capacity,
            block_size,
            zero_on_evict: false,
        }
    }

    pub fn get(&self, block_index: u64) -> Option<&Block> {
        self.index.get(&block_index).map(|&slot| &self.slots[slot])
    }

    pub fn contains(&self, block_index: u64) -> bool {
        self.index.contains_key(&block_index)
    }

    pub fn is_full(&self) -> bool {
        self.index.len() >= self.capacity
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn zero_on_evict(&self) -> bool {
        self.zero_on_evict
    }

    pub fn set_zero_on_evict(&mut self, zero: bool) {
        self.zero_on_evict = zero;
    }

    /// Resident block indices, oldest load first.
    pub fn history(&self) -> impl Iterator<Item = u64> + '_ {
        self.history.iter().copied()
    }

    /// Drops the block loaded longest ago. Returns its index.
    pub fn evict_oldest(&mut self) -> Option<u64> {
        let oldest = self.history.pop_front()?;
        let slot = self
            .index
            .remove(&oldest)
            .expect("history and index out of sync"); // INVARIANT: every history entry is indexed

        self.slots[slot].release(self.zero_on_evict);
        self.occupied[slot] = false;

        Some(oldest)
    }

    /// Loads `block_index` into a free slot using `fill`, evicting the oldest
    /// block first if the cache is full. On error the slot stays free and
    /// nothing is recorded.
    ///
    /// Returns the evicted block index, if any.
    pub fn insert_with<F>(&mut self, block_index: u64, fill: F) -> Result<Option<u64>>
    where
        F: FnOnce(&mut Block) -> Result<()>,
    {
        debug_assert!(!self.contains(block_index), "block already cached");

        let evicted = if self.is_full() {
            self.evict_oldest()
        } else {
            None
        };

        let slot = self.vacant_slot();
        if let Err(e) = fill(&mut self.slots[slot]) {
            self.slots[slot].release(self.zero_on_evict);
            return Err(e);
        }

        self.occupied[slot] = true;
        self.index.insert(block_index, slot);
        self.history.push_back(block_index);

        Ok(evicted)
    }

    /// Frees every slot. Buffers are kept for reuse.
    pub fn clear(&mut self) {
        for (block, occupied) in self.slots.iter_mut().zip(self.occupied.iter_mut()) {
            block.release(self.zero_on_evict);
            *occupied = false;
        }
        self.index.clear();
        self.history.clear();
    }

    fn vacant_slot(&mut self) -> usize {
        if let Some(slot) = self.occupied.iter().position(|&used| !used) {
            return slot;
        }

        self.slots.push(Block::empty(self.block_size));
        self.occupied.push(false);
        self.slots.len() - 1
    }
}
