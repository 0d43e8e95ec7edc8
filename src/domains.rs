use bit_set::BitSet;

use crate::grid_config::SlotId;
use crate::word_list::WordId;

/// The live set of candidate words for each slot. Words only ever leave a domain; the one
/// exception is `restrict`, which replaces a domain with a subset of itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Domains {
    domains: Vec<BitSet>,
}

impl Domains {
    /// Start every slot off with every word in the list.
    pub fn full(slot_count: usize, word_count: usize) -> Domains {
        let all_words: BitSet = (0..word_count).collect();
        Domains { domains: vec![all_words; slot_count] }
    }

    pub fn get(&self, slot_id: SlotId) -> &BitSet {
        &self.domains[slot_id]
    }

    /// Remove a word from a slot's domain, returning whether it was present.
    pub fn remove(&mut self, slot_id: SlotId, word_id: WordId) -> bool {
        self.domains[slot_id].remove(word_id)
    }

    pub fn len(&self, slot_id: SlotId) -> usize {
        self.domains[slot_id].len()
    }

    pub fn is_empty(&self, slot_id: SlotId) -> bool {
        self.domains[slot_id].is_empty()
    }

    /// Is any slot left without options?
    pub fn any_empty(&self) -> bool {
        self.domains.iter().any(BitSet::is_empty)
    }

    /// Copy out a slot's current words in ascending order, so that the caller can keep iterating
    /// while removing words from the live domain.
    pub fn snapshot(&self, slot_id: SlotId) -> Vec<WordId> {
        self.domains[slot_id].iter().collect()
    }

    /// Narrow a slot's domain down to a single word. The word is dropped too if it wasn't present.
    pub fn restrict(&mut self, slot_id: SlotId, word_id: WordId) {
        let present = self.domains[slot_id].contains(word_id);
        self.domains[slot_id].clear();
        if present {
            self.domains[slot_id].insert(word_id);
        }
    }
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use super::*;

    #[test]
    fn test_full_domains() {
        let domains = Domains::full(2, 3);

        assert_eq!(domains.snapshot(0), vec![0, 1, 2]);
        assert_eq!(domains.len(1), 3);
        assert!(!domains.any_empty());
    }

    #[test]
    fn test_remove_while_iterating_snapshot() {
        let mut domains = Domains::full(1, 4);

        for word_id in domains.snapshot(0) {
            if word_id % 2 == 0 {
                assert!(domains.remove(0, word_id));
            }
        }

        assert_eq!(domains.snapshot(0), vec![1, 3]);
        assert!(!domains.remove(0, 0));
    }

    #[test]
    fn test_empty_domain() {
        let mut domains = Domains::full(2, 1);
        domains.remove(1, 0);

        assert!(domains.is_empty(1));
        assert!(!domains.is_empty(0));
        assert!(domains.any_empty());
    }

    #[test]
    fn test_restrict() {
        let mut domains = Domains::full(1, 3);

        domains.restrict(0, 1);
        assert_eq!(domains.snapshot(0), vec![1]);

        domains.restrict(0, 2);
        assert!(domains.is_empty(0));
    }
}
