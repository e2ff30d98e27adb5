//! Presence set of shown logical indices

use alloc::vec;
use alloc::vec::Vec;

const WORD_BITS: usize = 32;

/// Bitset sized to the directory's image count
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShownSet {
    words: Vec<u32>,
    capacity: u16,
    len: u16,
}

impl ShownSet {
    pub fn with_capacity(capacity: u16) -> Self {
        let words = (capacity as usize).div_ceil(WORD_BITS);
        Self {
            words: vec![0; words],
            capacity,
            len: 0,
        }
    }

    /// Mark `index` as shown
    ///
    /// Returns `false` when it was already present or out of range.
    pub fn insert(&mut self, index: u16) -> bool {
        if index >= self.capacity || self.contains(index) {
            return false;
        }
        let (word, bit) = Self::slot(index);
        self.words[word] |= 1 << bit;
        self.len += 1;
        true
    }

    pub fn contains(&self, index: u16) -> bool {
        if index >= self.capacity {
            return false;
        }
        let (word, bit) = Self::slot(index);
        self.words[word] & (1 << bit) != 0
    }

    pub fn clear(&mut self) {
        self.words.iter_mut().for_each(|w| *w = 0);
        self.len = 0;
    }

    /// Number of indices marked
    pub fn len(&self) -> u16 {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    fn slot(index: u16) -> (usize, usize) {
        (index as usize / WORD_BITS, index as usize % WORD_BITS)
    }
}
