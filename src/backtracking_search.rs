use std::cmp::Reverse;
use std::collections::HashSet;

use instant::{Duration, Instant};
use log::{debug, info};

use crate::arc_consistency::{ac3, enforce_node_consistency, ConstraintArc};
use crate::domains::Domains;
use crate::grid_config::{Choice, GridConfig, SlotId};
use crate::word_list::{WordId, WordList};

/// A struct tracking statistics about the filling process.
#[derive(Debug, Clone, Default)]
pub struct Statistics {
    pub states: u64,
    pub backtracks: u64,
    pub duration: Duration,
}

/// Knobs for a single call to `find_fill`.
#[derive(Debug, Clone, Default)]
pub struct FillOptions {
    /// Give up with `FillFailure::Timeout` once this much time has passed.
    pub timeout: Option<Duration>,

    /// Re-run AC-3 after every choice instead of relying on the consistency check alone. This
    /// prunes more branches, but can land on a different fill when the grid has several.
    pub maintain_arc_consistency: bool,
}

/// A struct representing the results of a fill operation.
#[derive(Debug)]
pub struct FillSuccess {
    pub statistics: Statistics,
    pub choices: Vec<Choice>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FillFailure {
    /// There's no fill for this grid with these words.
    HardFailure,
    Timeout,
}

/// A partial mapping from slots to words. Extending an assignment produces a new one, so each
/// branch of the search owns its own copy and backtracking is just dropping it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    words: Vec<Option<WordId>>,
    assigned_count: usize,
}

impl Assignment {
    pub fn new(slot_count: usize) -> Assignment {
        Assignment { words: vec![None; slot_count], assigned_count: 0 }
    }

    pub fn get(&self, slot_id: SlotId) -> Option<WordId> {
        self.words[slot_id]
    }

    pub fn is_assigned(&self, slot_id: SlotId) -> bool {
        self.words[slot_id].is_some()
    }

    /// Number of slots with a word.
    pub fn len(&self) -> usize {
        self.assigned_count
    }

    pub fn is_empty(&self) -> bool {
        self.assigned_count == 0
    }

    pub fn is_complete(&self) -> bool {
        self.assigned_count == self.words.len()
    }

    /// Return a copy of this assignment with `slot_id` bound to `word_id`.
    #[must_use]
    pub fn with(&self, slot_id: SlotId, word_id: WordId) -> Assignment {
        let mut extended = self.clone();
        if extended.words[slot_id].replace(word_id).is_none() {
            extended.assigned_count += 1;
        }
        extended
    }

    pub fn iter(&self) -> impl Iterator<Item = (SlotId, WordId)> + '_ {
        self.words
            .iter()
            .enumerate()
            .filter_map(|(slot_id, word_id)| word_id.map(|word_id| (slot_id, word_id)))
    }

    pub fn choices(&self) -> Vec<Choice> {
        self.iter().map(|(slot_id, word_id)| Choice { slot_id, word_id }).collect()
    }
}

/// Is this (possibly partial) assignment free of conflicts? That means no word is used twice,
/// every word fits its slot, and every pair of assigned crossing slots agree at the crossing.
pub fn consistent(config: &GridConfig, word_list: &WordList, assignment: &Assignment) -> bool {
    let mut used: HashSet<WordId> = HashSet::with_capacity(assignment.len());
    if !assignment.iter().all(|(_, word_id)| used.insert(word_id)) {
        return false;
    }

    assignment.iter().all(|(slot_id, word_id)| {
        let slot_config = &config.slot_configs[slot_id];

        word_list.get(word_id).len() == slot_config.length()
            && slot_config.crossings.iter().enumerate().all(|(cell_idx, crossing)| {
                match crossing.and_then(|crossing| {
                    assignment
                        .get(crossing.other_slot_id)
                        .map(|other_word_id| (crossing, other_word_id))
                }) {
                    Some((crossing, other_word_id)) => word_list.agrees_at(
                        word_id,
                        cell_idx,
                        other_word_id,
                        crossing.other_slot_cell,
                    ),
                    None => true,
                }
            })
    })
}

/// Choose the next slot to fill: the one with the fewest remaining options, then the one crossing
/// the most slots, then the lowest id.
pub fn select_unassigned_slot(
    config: &GridConfig,
    domains: &Domains,
    assignment: &Assignment,
) -> Option<SlotId> {
    (0..config.slot_count())
        .filter(|&slot_id| !assignment.is_assigned(slot_id))
        .min_by_key(|&slot_id| (domains.len(slot_id), Reverse(config.degree(slot_id)), slot_id))
}

/// Return the options for a slot, ordered so that the words ruling out the fewest options for
/// unfilled crossing slots come first. Ties go to the word that sorts first.
pub fn order_domain_values(
    config: &GridConfig,
    word_list: &WordList,
    domains: &Domains,
    assignment: &Assignment,
    slot_id: SlotId,
) -> Vec<WordId> {
    let slot_config = &config.slot_configs[slot_id];
    let mut options = domains.snapshot(slot_id);

    options.sort_by_cached_key(|&word_id| {
        let ruled_out: usize = slot_config
            .crossings
            .iter()
            .enumerate()
            .filter_map(|(cell_idx, crossing)| crossing.map(|crossing| (cell_idx, crossing)))
            .filter(|(_, crossing)| !assignment.is_assigned(crossing.other_slot_id))
            .map(|(cell_idx, crossing)| {
                domains
                    .get(crossing.other_slot_id)
                    .iter()
                    .filter(|&other_word_id| {
                        !word_list.agrees_at(
                            word_id,
                            cell_idx,
                            other_word_id,
                            crossing.other_slot_cell,
                        )
                    })
                    // `BitSet`'s iterator reports too small an upper bound for `count` to trust.
                    .fold(0, |count, _| count + 1)
            })
            .sum();

        (ruled_out, word_id)
    });

    options
}

struct Search<'a> {
    config: &'a GridConfig,
    word_list: &'a WordList,
    options: &'a FillOptions,
    deadline: Option<Instant>,
    statistics: Statistics,
}

impl Search<'_> {
    /// Extend `assignment` into a complete one, or report that no extension exists.
    fn backtrack(
        &mut self,
        assignment: &Assignment,
        domains: &Domains,
    ) -> Result<Assignment, FillFailure> {
        if assignment.is_complete() {
            return Ok(assignment.clone());
        }

        if self.deadline.map_or(false, |deadline| Instant::now() >= deadline) {
            return Err(FillFailure::Timeout);
        }

        self.statistics.states += 1;

        let slot_id = select_unassigned_slot(self.config, domains, assignment)
            .ok_or(FillFailure::HardFailure)?;

        for word_id in order_domain_values(self.config, self.word_list, domains, assignment, slot_id)
        {
            let extended = assignment.with(slot_id, word_id);
            if !consistent(self.config, self.word_list, &extended) {
                continue;
            }

            let result = if self.options.maintain_arc_consistency {
                let mut branch_domains = domains.clone();
                branch_domains.restrict(slot_id, word_id);

                let arcs = self
                    .config
                    .neighbors(slot_id)
                    .map(|neighbor| ConstraintArc { x: neighbor, y: slot_id })
                    .collect();
                if !ac3(self.config, self.word_list, &mut branch_domains, Some(arcs)) {
                    continue;
                }

                self.backtrack(&extended, &branch_domains)
            } else {
                self.backtrack(&extended, domains)
            };

            match result {
                Err(FillFailure::HardFailure) => self.statistics.backtracks += 1,
                result => return result,
            }
        }

        Err(FillFailure::HardFailure)
    }
}

/// Search for a fill starting from the given per-slot domains: enforce node consistency, then
/// arc consistency, then run a backtracking search.
pub fn find_fill_with_domains(
    config: &GridConfig,
    word_list: &WordList,
    mut domains: Domains,
    options: &FillOptions,
) -> Result<FillSuccess, FillFailure> {
    let start = Instant::now();

    enforce_node_consistency(config, word_list, &mut domains);
    if domains.any_empty() {
        info!("Some slot has no words of matching length");
        return Err(FillFailure::HardFailure);
    }

    if !ac3(config, word_list, &mut domains, None) {
        info!("Grid can't be made arc-consistent");
        return Err(FillFailure::HardFailure);
    }

    let mut search = Search {
        config,
        word_list,
        options,
        deadline: options.timeout.map(|timeout| start + timeout),
        statistics: Statistics::default(),
    };

    let result = search.backtrack(&Assignment::new(config.slot_count()), &domains);
    search.statistics.duration = start.elapsed();

    match result {
        Ok(assignment) => {
            info!("Found fill: {:?}", search.statistics);
            Ok(FillSuccess { statistics: search.statistics, choices: assignment.choices() })
        }
        Err(failure) => {
            debug!("Fill failed with {:?}: {:?}", failure, search.statistics);
            Err(failure)
        }
    }
}

/// Search for a valid fill for the given grid, starting with every word as an option for every
/// slot.
pub fn find_fill(
    config: &GridConfig,
    word_list: &WordList,
    options: &FillOptions,
) -> Result<FillSuccess, FillFailure> {
    info!("Filling grid with {} slots from {} words", config.slot_count(), word_list.len());

    let domains = Domains::full(config.slot_count(), word_list.len());
    find_fill_with_domains(config, word_list, domains, options)
}
