#![forbid(unsafe_code)]

//! Bitset of input indices awaiting a fresh value.

/// Set of input indices that were invalidated and have not delivered yet.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PendingSet {
    words: Vec<u64>,
}

impl PendingSet {
    /// Empty set sized for `inputs` indices. Larger indices still work.
    #[must_use]
    pub fn with_inputs(inputs: usize) -> Self {
        Self {
            words: vec![0; inputs.div_ceil(64)],
        }
    }

    /// Mark `index` pending.
    pub fn insert(&mut self, index: usize) {
        let (word, bit) = (index / 64, index % 64);
        if word >= self.words.len() {
            self.words.resize(word + 1, 0);
        }
        self.words[word] |= 1u64 << bit;
    }

    /// Clear `index`.
    pub fn remove(&mut self, index: usize) {
        if let Some(word) = self.words.get_mut(index / 64) {
            *word &= !(1u64 << (index % 64));
        }
    }

    #[must_use]
    pub fn contains(&self, index: usize) -> bool {
        self.words
            .get(index / 64)
            .is_some_and(|word| *word & (1u64 << (index % 64)) != 0)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.words.iter().all(|word| *word == 0)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.words.iter().map(|word| word.count_ones() as usize).sum()
    }
}
