//! Index sets used by the search and the cost engine.
//!
//! Two backends share the [`IndexSet`] interface:
//!
//! - [`BitSet`] is a dense, auto-growing array of words. The search uses it for the
//!   "seen" set over the whole function value space, where membership tests sit in the
//!   innermost loop.
//! - [`SparseSet`] is a sorted vector of indices. It suits footprints, which are small
//!   subsets of the level-1 expression list.

/// Common interface of the set backends.
pub trait IndexSet: Clone + Default {
    type Iter<'a>: Iterator<Item = usize>
    where
        Self: 'a;

    /// Returns true if `index` is in the set.
    fn contains(&self, index: usize) -> bool;

    /// Adds `index`. Returns true if it was not present before.
    fn insert(&mut self, index: usize) -> bool;

    /// Removes `index`. Returns true if it was present.
    fn remove(&mut self, index: usize) -> bool;

    /// In-place union: `self = self ∪ other`.
    fn union_with(&mut self, other: &Self);

    /// In-place intersection: `self = self ∩ other`.
    fn intersect_with(&mut self, other: &Self);

    /// Returns true if the two sets share no element.
    fn is_disjoint(&self, other: &Self) -> bool;

    /// Removes all elements.
    fn clear(&mut self);

    /// Number of elements.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterates over the elements in increasing order.
    fn iter(&self) -> Self::Iter<'_>;
}

/// A simple bit set backed by a vector of u64 words.
///
/// The bit set automatically grows as needed when setting bits beyond the current capacity.
#[derive(Debug, Clone)]
pub struct BitSet {
    /// Storage: each u64 holds 64 bits
    words: Vec<u64>,
    /// Number of set bits (cached for O(1) len())
    count: usize,
}

impl BitSet {
    /// Number of bits per word.
    const BITS_PER_WORD: usize = 64;

    /// Creates a new empty bit set with the given capacity (in bits).
    pub fn new(capacity: usize) -> Self {
        let num_words = capacity.div_ceil(Self::BITS_PER_WORD);
        Self {
            words: vec![0; num_words],
            count: 0,
        }
    }

    /// Creates an empty bit set with no pre-allocated capacity.
    pub fn empty() -> Self {
        Self {
            words: Vec::new(),
            count: 0,
        }
    }

    /// Returns the capacity in bits.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.words.len() * Self::BITS_PER_WORD
    }

    /// Gets the word index and bit position for a given bit index.
    #[inline]
    fn word_and_bit(index: usize) -> (usize, usize) {
        let word = index / Self::BITS_PER_WORD;
        let bit = index % Self::BITS_PER_WORD;
        (word, bit)
    }

    fn recount(&mut self) {
        self.count = self.words.iter().map(|w| w.count_ones() as usize).sum();
    }

    /// Extends the bit set by setting all bits from an iterator.
    pub fn extend(&mut self, iter: impl IntoIterator<Item = usize>) {
        for index in iter {
            self.insert(index);
        }
    }
}

impl Default for BitSet {
    fn default() -> Self {
        Self::empty()
    }
}

impl IndexSet for BitSet {
    type Iter<'a> = BitSetIter<'a>;

    #[inline]
    fn contains(&self, index: usize) -> bool {
        let (word_idx, bit_idx) = Self::word_and_bit(index);
        if word_idx >= self.words.len() {
            return false;
        }
        let mask = 1u64 << bit_idx;
        (self.words[word_idx] & mask) != 0
    }

    #[inline]
    fn insert(&mut self, index: usize) -> bool {
        let (word_idx, bit_idx) = Self::word_and_bit(index);

        // Grow if necessary
        if word_idx >= self.words.len() {
            self.words.resize(word_idx + 1, 0);
        }

        let mask = 1u64 << bit_idx;
        let was_clear = (self.words[word_idx] & mask) == 0;
        if was_clear {
            self.words[word_idx] |= mask;
            self.count += 1;
        }
        was_clear
    }

    #[inline]
    fn remove(&mut self, index: usize) -> bool {
        let (word_idx, bit_idx) = Self::word_and_bit(index);
        if word_idx >= self.words.len() {
            return false;
        }

        let mask = 1u64 << bit_idx;
        let was_set = (self.words[word_idx] & mask) != 0;
        if was_set {
            self.words[word_idx] &= !mask;
            self.count -= 1;
        }
        was_set
    }

    fn union_with(&mut self, other: &Self) {
        if self.words.len() < other.words.len() {
            self.words.resize(other.words.len(), 0);
        }
        for (word, &theirs) in self.words.iter_mut().zip(&other.words) {
            *word |= theirs;
        }
        self.recount();
    }

    fn intersect_with(&mut self, other: &Self) {
        for (i, word) in self.words.iter_mut().enumerate() {
            *word &= other.words.get(i).copied().unwrap_or(0);
        }
        self.recount();
    }

    fn is_disjoint(&self, other: &Self) -> bool {
        self.words
            .iter()
            .zip(&other.words)
            .all(|(&a, &b)| a & b == 0)
    }

    fn clear(&mut self) {
        for word in &mut self.words {
            *word = 0;
        }
        self.count = 0;
    }

    #[inline]
    fn len(&self) -> usize {
        self.count
    }

    fn iter(&self) -> BitSetIter<'_> {
        BitSetIter {
            bitset: self,
            word_idx: 0,
            current_word: self.words.first().copied().unwrap_or(0),
        }
    }
}

/// Iterator over set bits in a BitSet.
pub struct BitSetIter<'a> {
    bitset: &'a BitSet,
    word_idx: usize,
    current_word: u64,
}

impl Iterator for BitSetIter<'_> {
    type Item = usize;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.current_word != 0 {
                let bit_idx = self.current_word.trailing_zeros() as usize;
                self.current_word &= self.current_word - 1; // Clear lowest set bit
                return Some(self.word_idx * BitSet::BITS_PER_WORD + bit_idx);
            }

            self.word_idx += 1;
            if self.word_idx >= self.bitset.words.len() {
                return None;
            }
            self.current_word = self.bitset.words[self.word_idx];
        }
    }
}

/// A set of small indices kept as a sorted vector.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SparseSet {
    items: Vec<u32>,
}

impl SparseSet {
    pub fn new() -> Self {
        Self::default()
    }

    fn key(index: usize) -> u32 {
        u32::try_from(index).expect("sparse set indices must fit in u32")
    }
}

impl IndexSet for SparseSet {
    type Iter<'a> = std::iter::Map<std::slice::Iter<'a, u32>, fn(&u32) -> usize>;

    fn contains(&self, index: usize) -> bool {
        u32::try_from(index).is_ok_and(|key| self.items.binary_search(&key).is_ok())
    }

    fn insert(&mut self, index: usize) -> bool {
        let key = Self::key(index);
        match self.items.binary_search(&key) {
            Ok(_) => false,
            Err(pos) => {
                self.items.insert(pos, key);
                true
            }
        }
    }

    fn remove(&mut self, index: usize) -> bool {
        let Ok(key) = u32::try_from(index) else {
            return false;
        };
        match self.items.binary_search(&key) {
            Ok(pos) => {
                self.items.remove(pos);
                true
            }
            Err(_) => false,
        }
    }

    fn union_with(&mut self, other: &Self) {
        if other.items.is_empty() {
            return;
        }
        let mut merged = Vec::with_capacity(self.items.len() + other.items.len());
        let (mut i, mut j) = (0, 0);
        while i < self.items.len() && j < other.items.len() {
            let (a, b) = (self.items[i], other.items[j]);
            if a < b {
                merged.push(a);
                i += 1;
            } else if b < a {
                merged.push(b);
                j += 1;
            } else {
                merged.push(a);
                i += 1;
                j += 1;
            }
        }
        merged.extend_from_slice(&self.items[i..]);
        merged.extend_from_slice(&other.items[j..]);
        self.items = merged;
    }

    fn intersect_with(&mut self, other: &Self) {
        self.items.retain(|x| other.items.binary_search(x).is_ok());
    }

    fn is_disjoint(&self, other: &Self) -> bool {
        let (mut i, mut j) = (0, 0);
        while i < self.items.len() && j < other.items.len() {
            match self.items[i].cmp(&other.items[j]) {
                std::cmp::Ordering::Less => i += 1,
                std::cmp::Ordering::Greater => j += 1,
                std::cmp::Ordering::Equal => return false,
            }
        }
        true
    }

    fn clear(&mut self) {
        self.items.clear();
    }

    fn len(&self) -> usize {
        self.items.len()
    }

    fn iter(&self) -> Self::Iter<'_> {
        self.items.iter().map(widen as fn(&u32) -> usize)
    }
}

fn widen(x: &u32) -> usize {
    *x as usize
}

#[cfg(test)]
mod tests {
    use super::*;

    use test_log::test;

    fn set_of<S: IndexSet>(items: &[usize]) -> S {
        let mut s = S::default();
        for &i in items {
            s.insert(i);
        }
        s
    }

    fn check_backend<S: IndexSet>() {
        let mut s: S = set_of(&[3, 5, 10, 64, 65]);
        assert_eq!(s.len(), 5);
        assert!(s.contains(64));
        assert!(!s.contains(4));
        assert!(!s.insert(5)); // Already set
        assert_eq!(s.iter().collect::<Vec<_>>(), vec![3, 5, 10, 64, 65]);

        assert!(s.remove(10));
        assert!(!s.remove(10));
        assert_eq!(s.len(), 4);

        let a: S = set_of(&[1, 2, 3, 100]);
        let b: S = set_of(&[3, 4, 200]);
        let c: S = set_of(&[7, 8]);

        let mut ab = a.clone();
        ab.union_with(&b);
        let mut ba = b.clone();
        ba.union_with(&a);
        assert_eq!(ab.iter().collect::<Vec<_>>(), ba.iter().collect::<Vec<_>>());
        assert_eq!(ab.iter().collect::<Vec<_>>(), vec![1, 2, 3, 4, 100, 200]);

        let mut ab = a.clone();
        ab.intersect_with(&b);
        let mut ba = b.clone();
        ba.intersect_with(&a);
        assert_eq!(ab.iter().collect::<Vec<_>>(), vec![3]);
        assert_eq!(ba.iter().collect::<Vec<_>>(), vec![3]);
        assert_eq!(ab.len(), 1);

        assert!(!a.is_disjoint(&b));
        assert!(!b.is_disjoint(&a));
        assert!(a.is_disjoint(&c));
        assert!(c.is_disjoint(&a));
        assert!(a.is_disjoint(&S::default()));

        s.clear();
        assert!(s.is_empty());
        assert!(!s.contains(3));
    }

    #[test]
    fn test_dense_backend() {
        check_backend::<BitSet>();
    }

    #[test]
    fn test_sparse_backend() {
        check_backend::<SparseSet>();
    }

    #[test]
    fn test_auto_grow() {
        let mut bs = BitSet::empty();
        assert_eq!(bs.capacity(), 0);
        bs.insert(1000);
        assert!(bs.contains(1000));
        assert!(!bs.contains(100_000));
        assert_eq!(bs.len(), 1);
        assert!(bs.capacity() >= 1001);
    }

    #[test]
    fn test_intersect_with_shorter() {
        let mut a = BitSet::new(256);
        a.extend([1, 130, 200]);
        let mut b = BitSet::empty();
        b.insert(1);
        a.intersect_with(&b);
        assert_eq!(a.iter().collect::<Vec<_>>(), vec![1]);
        assert_eq!(a.len(), 1);
    }

    #[test]
    fn test_union_associative() {
        let a: BitSet = set_of(&[1, 70]);
        let b: BitSet = set_of(&[2, 140]);
        let c: BitSet = set_of(&[1, 3]);

        let mut left = a.clone();
        left.union_with(&b);
        left.union_with(&c);

        let mut bc = b.clone();
        bc.union_with(&c);
        let mut right = a.clone();
        right.union_with(&bc);

        assert_eq!(left.iter().collect::<Vec<_>>(), right.iter().collect::<Vec<_>>());
    }
}
