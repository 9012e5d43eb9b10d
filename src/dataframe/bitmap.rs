use deepsize::DeepSizeOf;

/// A growable bit vector recording which entries of a nullable `Column` are
/// null. A set bit marks a null entry.
///
/// Bits are stored little-endian within each `u64` word:
/// - bit 0 is the LSB of word 0
/// - bit 63 is the MSB of word 0
///
/// Bits at or beyond `len` are always zero, so two masks with equal logical
/// content have equal words up to `len`.
#[derive(Debug, DeepSizeOf)]
pub(crate) struct NullMask {
    words: Vec<u64>,
    len: usize,
    ones: usize,
}

fn words_for(bits: usize) -> usize {
    (bits + 63) / 64
}

impl NullMask {
    pub(crate) fn with_capacity(bits: usize) -> Self {
        NullMask {
            words: Vec::with_capacity(words_for(bits)),
            len: 0,
            ones: 0,
        }
    }

    pub(crate) fn from_bools(bits: &[bool]) -> Self {
        let mut mask = NullMask::with_capacity(bits.len());
        for b in bits {
            mask.push(*b);
        }
        mask
    }

    pub(crate) fn len(&self) -> usize {
        self.len
    }

    /// The number of bits this mask can hold without reallocating.
    pub(crate) fn capacity(&self) -> usize {
        self.words.capacity() * 64
    }

    /// Number of set bits, i.e. number of nulls.
    pub(crate) fn count_ones(&self) -> usize {
        self.ones
    }

    pub(crate) fn reserve_bits(&mut self, total_bits: usize) {
        let needed = words_for(total_bits);
        if needed > self.words.len() {
            self.words.reserve_exact(needed - self.words.len());
        }
    }

    pub(crate) fn push(&mut self, value: bool) {
        let bit = self.len % 64;
        if bit == 0 {
            self.words.push(0);
        }
        if value {
            let word = self.len / 64;
            self.words[word] |= 1u64 << bit;
            self.ones += 1;
        }
        self.len += 1;
    }

    pub(crate) fn get(&self, index: usize) -> bool {
        debug_assert!(index < self.len, "NullMask index out of bounds");
        let word = self.words[index / 64];
        ((word >> (index % 64)) & 1) == 1
    }

    pub(crate) fn set(&mut self, index: usize, value: bool) {
        debug_assert!(index < self.len, "NullMask index out of bounds");
        let word_idx = index / 64;
        let mask = 1u64 << (index % 64);
        let was_set = (self.words[word_idx] & mask) != 0;

        match (was_set, value) {
            (true, false) => {
                self.words[word_idx] &= !mask;
                self.ones -= 1;
            }
            (false, true) => {
                self.words[word_idx] |= mask;
                self.ones += 1;
            }
            _ => {}
        }
    }

    /// Inserts a bit at `index`, shifting every following bit up by one.
    pub(crate) fn insert(&mut self, index: usize, value: bool) {
        debug_assert!(index <= self.len, "NullMask index out of bounds");
        self.push(false);
        let mut i = self.len - 1;
        while i > index {
            let prev = self.get(i - 1);
            self.set(i, prev);
            i -= 1;
        }
        self.set(index, value);
    }

    /// Removes the bits in `[from, to)`, shifting every following bit down.
    pub(crate) fn remove_range(&mut self, from: usize, to: usize) {
        debug_assert!(from <= to && to <= self.len, "NullMask range out of bounds");
        let removed = to - from;
        if removed == 0 {
            return;
        }
        for i in from..self.len - removed {
            let next = self.get(i + removed);
            self.set(i, next);
        }
        self.truncate(self.len - removed);
    }

    /// Keeps only the bits whose position is marked in `keep`.
    pub(crate) fn retain(&mut self, keep: &[bool]) {
        debug_assert_eq!(keep.len(), self.len);
        let mut next = 0;
        for i in 0..self.len {
            if keep[i] {
                let bit = self.get(i);
                self.set(next, bit);
                next += 1;
            }
        }
        self.truncate(next);
    }

    pub(crate) fn truncate(&mut self, len: usize) {
        if len >= self.len {
            return;
        }
        for i in len..self.len {
            self.set(i, false);
        }
        self.words.truncate(words_for(len));
        self.len = len;
    }

    pub(crate) fn shrink_to_fit(&mut self) {
        self.words.shrink_to_fit();
    }

    /// Iterates over the bits of the logical range.
    pub(crate) fn iter(&self) -> impl Iterator<Item = bool> + '_ {
        (0..self.len).map(move |i| self.get(i))
    }
}

impl Clone for NullMask {
    /// Copies only the words covering the logical length.
    fn clone(&self) -> Self {
        let mut words = Vec::with_capacity(words_for(self.len));
        words.extend_from_slice(&self.words[..words_for(self.len)]);
        NullMask {
            words,
            len: self.len,
            ones: self.ones,
        }
    }
}

impl PartialEq for NullMask {
    fn eq(&self, other: &Self) -> bool {
        self.len == other.len
            && self.ones == other.ones
            && self.words[..words_for(self.len)] == other.words[..words_for(other.len)]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_get_set() {
        let mut m = NullMask::with_capacity(4);
        for i in 0..130 {
            m.push(i % 3 == 0);
        }
        assert_eq!(m.len(), 130);
        assert_eq!(m.count_ones(), 44);
        assert!(m.get(129));
        assert!(!m.get(128));
        m.set(128, true);
        m.set(129, false);
        assert!(m.get(128));
        assert!(!m.get(129));
        assert_eq!(m.count_ones(), 44);
    }

    #[test]
    fn test_insert_and_remove() {
        let mut m = NullMask::from_bools(&[true, false, true]);
        m.insert(1, true);
        assert_eq!(m.iter().collect::<Vec<_>>(), vec![true, true, false, true]);
        m.remove_range(0, 2);
        assert_eq!(m.iter().collect::<Vec<_>>(), vec![false, true]);
        assert_eq!(m.count_ones(), 1);
    }

    #[test]
    fn test_retain_and_equality_ignores_slack() {
        let mut a = NullMask::from_bools(&[true, false, true, true]);
        a.retain(&[true, true, false, false]);
        let b = NullMask::from_bools(&[true, false]);
        assert_eq!(a, b);
        assert_eq!(a.clone(), b);
    }
}
