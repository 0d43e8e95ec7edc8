//! Node consistency and the AC-3 algorithm for establishing arc consistency. For our purposes, a
//! grid is arc-consistent when, for every pair of crossing slots `x` and `y`, every word left in
//! `x`'s domain places a glyph at the crossing that at least one word in `y`'s domain also places
//! there.

use std::collections::{HashSet, VecDeque};

use log::{debug, trace};

use crate::domains::Domains;
use crate::grid_config::{GridConfig, SlotId};
use crate::word_list::WordList;

/// A directed constraint between two crossing slots: `x` needs support from `y`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConstraintArc {
    pub x: SlotId,
    pub y: SlotId,
}

/// Worklist of arcs still to be revised. An arc that's already waiting isn't queued twice.
#[derive(Debug, Default)]
struct ArcQueue {
    queue: VecDeque<ConstraintArc>,
    queued: HashSet<ConstraintArc>,
}

impl ArcQueue {
    fn with_initial_queue<Items>(items: Items) -> ArcQueue
    where
        Items: IntoIterator<Item = ConstraintArc>,
    {
        let mut queue = ArcQueue::default();
        for arc in items {
            queue.enqueue(arc);
        }
        queue
    }

    fn pop_front(&mut self) -> Option<ConstraintArc> {
        let arc = self.queue.pop_front()?;
        self.queued.remove(&arc);
        Some(arc)
    }

    fn enqueue(&mut self, arc: ConstraintArc) {
        if self.queued.insert(arc) {
            self.queue.push_back(arc);
        }
    }
}

/// Every arc in the constraint graph: `(x, y)` for each slot `x` and each slot `y` crossing it.
pub fn all_arcs(config: &GridConfig) -> Vec<ConstraintArc> {
    (0..config.slot_count())
        .flat_map(move |x| {
            config
                .neighbors(x)
                .filter(move |&y| config.overlap(x, y).is_some())
                .map(move |y| ConstraintArc { x, y })
        })
        .collect()
}

/// Remove every word whose length doesn't match its slot's length.
pub fn enforce_node_consistency(config: &GridConfig, word_list: &WordList, domains: &mut Domains) {
    for slot_config in &config.slot_configs {
        let mut removed = 0;

        for word_id in domains.snapshot(slot_config.id) {
            if word_list.get(word_id).len() != slot_config.length() {
                domains.remove(slot_config.id, word_id);
                removed += 1;
            }
        }

        trace!(
            "Node consistency removed {} words from slot {}, leaving {}",
            removed,
            slot_config.id,
            domains.len(slot_config.id)
        );
    }
}

/// Make slot `x` arc-consistent with slot `y` by removing every word in `x`'s domain that no word
/// in `y`'s domain agrees with at their crossing. Returns whether anything was removed; slots that
/// don't cross are left alone.
pub fn revise(
    config: &GridConfig,
    word_list: &WordList,
    domains: &mut Domains,
    x: SlotId,
    y: SlotId,
) -> bool {
    let Some((x_cell, y_cell)) = config.overlap(x, y) else {
        return false;
    };

    // Which glyphs can `y` still place in the crossing cell?
    let supported_glyphs: HashSet<char> = domains
        .get(y)
        .iter()
        .filter_map(|y_word| word_list.get(y_word).glyphs.get(y_cell).copied())
        .collect();

    let mut revised = false;

    for x_word in domains.snapshot(x) {
        let supported = word_list
            .get(x_word)
            .glyphs
            .get(x_cell)
            .map_or(false, |glyph| supported_glyphs.contains(glyph));

        if !supported {
            domains.remove(x, x_word);
            revised = true;
        }
    }

    if revised {
        trace!("Revised slot {} against slot {}, {} words left", x, y, domains.len(x));
    }

    revised
}

/// Run AC-3 until every arc is consistent. If `arcs` is None, begin with every arc in the grid;
/// otherwise begin with just the given arcs. Returns false as soon as any domain is wiped out.
pub fn ac3(
    config: &GridConfig,
    word_list: &WordList,
    domains: &mut Domains,
    arcs: Option<Vec<ConstraintArc>>,
) -> bool {
    let mut queue = ArcQueue::with_initial_queue(arcs.unwrap_or_else(|| all_arcs(config)));
    let mut revisions = 0;

    while let Some(ConstraintArc { x, y }) = queue.pop_front() {
        if !revise(config, word_list, domains, x, y) {
            continue;
        }
        revisions += 1;

        if domains.is_empty(x) {
            debug!("AC-3 wiped out slot {} after {} revisions", x, revisions);
            return false;
        }

        // Shrinking `x` may leave words in the slots crossing it without support.
        for z in config.neighbors(x) {
            if z != y {
                queue.enqueue(ConstraintArc { x: z, y: x });
            }
        }
    }

    debug!("AC-3 reached a fixpoint after {} revisions", revisions);
    true
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use super::*;
    use crate::grid_config::{
        generate_grid_config, generate_grid_config_from_template, Direction, GridEntry,
    };

    const STRUCTURE: &str = include_str!("../data/structure0.txt");
    const WORDS: &str = include_str!("../data/words0.txt");

    /// Two slots of length 3, with char 1 of slot 0 crossing char 0 of slot 1.
    fn crossing_pair() -> GridConfig {
        generate_grid_config(&[
            GridEntry { row: 0, col: 0, direction: Direction::Across, length: 3 },
            GridEntry { row: 0, col: 1, direction: Direction::Down, length: 3 },
        ])
        .unwrap()
    }

    fn domain_strings(word_list: &WordList, domains: &Domains, slot_id: SlotId) -> Vec<String> {
        domains
            .snapshot(slot_id)
            .into_iter()
            .map(|word_id| word_list.get(word_id).string.clone())
            .collect()
    }

    fn is_arc_consistent(config: &GridConfig, word_list: &WordList, domains: &Domains) -> bool {
        all_arcs(config).into_iter().all(|ConstraintArc { x, y }| {
            let (x_cell, y_cell) = config.overlap(x, y).unwrap();
            domains.get(x).iter().all(|x_word| {
                domains
                    .get(y)
                    .iter()
                    .any(|y_word| word_list.agrees_at(x_word, x_cell, y_word, y_cell))
            })
        })
    }

    #[test]
    fn test_node_consistency() {
        let config = generate_grid_config_from_template(STRUCTURE).unwrap();
        let word_list = WordList::new(WORDS.lines());
        let mut domains = Domains::full(config.slot_count(), word_list.len());

        enforce_node_consistency(&config, &word_list, &mut domains);

        for slot_config in &config.slot_configs {
            assert!(!domains.is_empty(slot_config.id));
            for word_id in domains.get(slot_config.id).iter() {
                assert_eq!(word_list.get(word_id).len(), slot_config.length());
            }
        }
        assert_eq!(domain_strings(&word_list, &domains, 0), vec!["one", "six", "ten", "two"]);
        assert_eq!(domain_strings(&word_list, &domains, 2), vec!["eight", "seven", "three"]);
    }

    #[test]
    fn test_node_consistency_can_empty_a_domain() {
        let config = crossing_pair();
        let word_list = WordList::new(["ab", "abcd"]);
        let mut domains = Domains::full(config.slot_count(), word_list.len());

        enforce_node_consistency(&config, &word_list, &mut domains);

        assert!(domains.is_empty(0));
        assert!(domains.is_empty(1));
    }

    #[test]
    fn test_revise_removes_unsupported_words() {
        let config = crossing_pair();
        let word_list = WordList::new(["ape", "cat", "dog", "tom"]);
        let mut domains = Domains::full(config.slot_count(), word_list.len());

        assert!(revise(&config, &word_list, &mut domains, 0, 1));
        assert_eq!(domain_strings(&word_list, &domains, 0), vec!["cat"]);

        // Slot 1 is untouched until it's revised in turn.
        assert_eq!(domains.len(1), 4);
        assert!(revise(&config, &word_list, &mut domains, 1, 0));
        assert_eq!(domain_strings(&word_list, &domains, 1), vec!["ape"]);

        assert!(!revise(&config, &word_list, &mut domains, 0, 1));
    }

    #[test]
    fn test_revise_without_crossing() {
        let config = generate_grid_config_from_template(STRUCTURE).unwrap();
        let word_list = WordList::new(WORDS.lines());
        let mut domains = Domains::full(config.slot_count(), word_list.len());
        let before = domains.clone();

        assert!(!revise(&config, &word_list, &mut domains, 0, 3));
        assert_eq!(domains, before);
    }

    #[test]
    fn test_all_arcs() {
        let config = generate_grid_config_from_template(STRUCTURE).unwrap();

        let arcs: Vec<(SlotId, SlotId)> =
            all_arcs(&config).into_iter().map(|arc| (arc.x, arc.y)).collect();
        assert_eq!(arcs, vec![(0, 2), (1, 2), (1, 3), (2, 0), (2, 1), (3, 1)]);
    }

    #[test]
    fn test_ac3_reaches_arc_consistency() {
        let config = generate_grid_config_from_template(STRUCTURE).unwrap();
        let word_list = WordList::new(WORDS.lines());
        let mut domains = Domains::full(config.slot_count(), word_list.len());

        enforce_node_consistency(&config, &word_list, &mut domains);
        assert!(ac3(&config, &word_list, &mut domains, None));

        assert!(is_arc_consistent(&config, &word_list, &domains));
        assert_eq!(domain_strings(&word_list, &domains, 0), vec!["six"]);
        assert_eq!(domain_strings(&word_list, &domains, 1), vec!["nine"]);
        assert_eq!(domain_strings(&word_list, &domains, 2), vec!["seven"]);
        assert_eq!(domain_strings(&word_list, &domains, 3), vec!["five", "nine"]);
    }

    #[test]
    fn test_ac3_detects_wipeout() {
        let config = crossing_pair();
        let word_list = WordList::new(["cat", "tom"]);
        let mut domains = Domains::full(config.slot_count(), word_list.len());

        assert!(!ac3(&config, &word_list, &mut domains, None));
    }

    #[test]
    fn test_ac3_with_explicit_arcs() {
        let config = crossing_pair();
        let word_list = WordList::new(["ape", "cat", "dog", "tom"]);
        let mut domains = Domains::full(config.slot_count(), word_list.len());

        // Slot 0 has no neighbors besides slot 1, so revising it queues nothing else.
        assert!(ac3(&config, &word_list, &mut domains, Some(vec![ConstraintArc { x: 0, y: 1 }])));

        assert_eq!(domain_strings(&word_list, &domains, 0), vec!["cat"]);
        assert_eq!(domains.len(1), 4);
    }
}
