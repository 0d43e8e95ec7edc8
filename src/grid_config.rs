use std::collections::HashMap;
use std::fmt::{Debug, Formatter};
use std::fs;
use std::path::Path;

use smallvec::SmallVec;

use crate::error::{Error, Result};
use crate::word_list::{WordId, WordList};
use crate::MAX_SLOT_LENGTH;

/// An identifier for a given slot, based on its index in the grid's `slot_configs` field.
pub type SlotId = usize;

/// Zero-indexed row and column for a cell in the grid, where row 0 is the top row.
pub type GridCoord = (usize, usize);

/// Direction that a slot is facing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Direction {
    Across,
    Down,
}

/// A struct representing a crossing between one slot and another, referencing the other slot's id
/// and the location of the intersection within the other slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Crossing {
    pub other_slot_id: SlotId,
    pub other_slot_cell: usize,
}

/// An across or down entry in the input to `generate_grid_config`. Two entries are the same slot
/// iff all four fields match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GridEntry {
    pub row: usize,
    pub col: usize,
    pub direction: Direction,
    pub length: usize,
}

impl GridEntry {
    /// Generate the coords for each cell of this entry.
    pub fn cell_coords(&self) -> impl Iterator<Item = GridCoord> + '_ {
        (0..self.length).map(move |cell_idx| match self.direction {
            Direction::Across => (self.row, self.col + cell_idx),
            Direction::Down => (self.row + cell_idx, self.col),
        })
    }
}

/// A struct representing a slot in the grid. Immutable once the grid is built.
#[derive(Clone)]
pub struct SlotConfig {
    pub id: SlotId,
    pub entry: GridEntry,
    pub crossings: SmallVec<[Option<Crossing>; MAX_SLOT_LENGTH]>,
}

impl SlotConfig {
    pub fn length(&self) -> usize {
        self.entry.length
    }
}

impl Debug for SlotConfig {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SlotConfig")
            .field("id", &self.id)
            .field("start_cell", &(self.entry.row, self.entry.col))
            .field("direction", &self.entry.direction)
            .field("length", &self.entry.length)
            .field("crossings", &self.crossings)
            .finish()
    }
}

/// A struct recording a slot assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Choice {
    pub slot_id: SlotId,
    pub word_id: WordId,
}

/// The static description of a grid: which cells are open, and the slots formed by runs of open
/// cells along with the crossings between them.
#[derive(Debug, Clone)]
pub struct GridConfig {
    pub width: usize,
    pub height: usize,
    pub open_cells: Vec<Vec<bool>>,
    pub slot_configs: Vec<SlotConfig>,
}

impl GridConfig {
    /// Read a structure file; see `generate_grid_config_from_template`.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<GridConfig> {
        let path = path.as_ref();
        let template = fs::read_to_string(path).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;

        generate_grid_config_from_template(&template)
    }

    pub fn slot_count(&self) -> usize {
        self.slot_configs.len()
    }

    /// The slots crossing the given slot, in the order of the cells where they cross.
    pub fn neighbors(&self, slot_id: SlotId) -> impl Iterator<Item = SlotId> + '_ {
        self.slot_configs[slot_id]
            .crossings
            .iter()
            .flatten()
            .map(|crossing| crossing.other_slot_id)
    }

    /// Number of slots crossing the given slot.
    pub fn degree(&self, slot_id: SlotId) -> usize {
        self.neighbors(slot_id).count()
    }

    /// If `x` and `y` cross, return `(ix, iy)` such that char `ix` of `x`'s word must equal char
    /// `iy` of `y`'s word. `overlap(y, x)` is always the same pair swapped.
    pub fn overlap(&self, x: SlotId, y: SlotId) -> Option<(usize, usize)> {
        self.slot_configs[x]
            .crossings
            .iter()
            .enumerate()
            .find_map(|(cell_idx, crossing)| match crossing {
                Some(crossing) if crossing.other_slot_id == y => {
                    Some((cell_idx, crossing.other_slot_cell))
                }
                _ => None,
            })
    }

    /// Lay the chosen words out on a grid of cells. Blocked and unfilled cells are `None`.
    pub fn letter_grid(&self, word_list: &WordList, choices: &[Choice]) -> Vec<Vec<Option<char>>> {
        let mut letters = vec![vec![None; self.width]; self.height];

        for &Choice { slot_id, word_id } in choices {
            let entry = &self.slot_configs[slot_id].entry;
            let word = word_list.get(word_id);

            for ((row, col), &glyph) in entry.cell_coords().zip(&word.glyphs) {
                letters[row][col] = Some(glyph);
            }
        }

        letters
    }

    /// Turn the given fill choices into a rendered string.
    pub fn render_grid(&self, word_list: &WordList, choices: &[Choice]) -> String {
        let letters = self.letter_grid(word_list, choices);

        letters
            .iter()
            .zip(&self.open_cells)
            .map(|(letter_row, open_row)| {
                letter_row
                    .iter()
                    .zip(open_row)
                    .map(|(letter, &open)| match (open, letter) {
                        (false, _) => '█',
                        (true, Some(glyph)) => *glyph,
                        (true, None) => ' ',
                    })
                    .collect::<String>()
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Generate a GridConfig representing a grid with specified entries. The grid is sized to fit the
/// entries, and only cells covered by an entry are open.
pub fn generate_grid_config(entries: &[GridEntry]) -> Result<GridConfig> {
    let width = entries
        .iter()
        .flat_map(|entry| entry.cell_coords().map(|(_, col)| col + 1))
        .max()
        .unwrap_or(0);
    let height = entries
        .iter()
        .flat_map(|entry| entry.cell_coords().map(|(row, _)| row + 1))
        .max()
        .unwrap_or(0);

    let mut open_cells = vec![vec![false; width]; height];
    for entry in entries {
        for (row, col) in entry.cell_coords() {
            open_cells[row][col] = true;
        }
    }

    build_grid_config(width, height, open_cells, entries)
}

fn build_grid_config(
    width: usize,
    height: usize,
    open_cells: Vec<Vec<bool>>,
    entries: &[GridEntry],
) -> Result<GridConfig> {
    // Build a map from cell location to (entry index, cell index within entry), which we can
    // then use to calculate crossings.
    let mut cell_by_loc: HashMap<GridCoord, SmallVec<[(usize, usize); 2]>> = HashMap::new();

    for (entry_idx, entry) in entries.iter().enumerate() {
        for (cell_idx, loc) in entry.cell_coords().enumerate() {
            let cell_entries = cell_by_loc.entry(loc).or_default();

            let conflicting = cell_entries.len() >= 2
                || cell_entries
                    .iter()
                    .any(|&(other_idx, _)| entries[other_idx].direction == entry.direction);
            if conflicting {
                return Err(Error::ConflictingEntries { row: loc.0, col: loc.1 });
            }

            cell_entries.push((entry_idx, cell_idx));
        }
    }

    let slot_configs = entries
        .iter()
        .enumerate()
        .map(|(entry_idx, entry)| SlotConfig {
            id: entry_idx,
            entry: *entry,
            crossings: entry
                .cell_coords()
                .map(|loc| {
                    cell_by_loc[&loc]
                        .iter()
                        .find(|&&(other_idx, _)| other_idx != entry_idx)
                        .map(|&(other_slot_id, other_slot_cell)| Crossing {
                            other_slot_id,
                            other_slot_cell,
                        })
                })
                .collect(),
        })
        .collect();

    Ok(GridConfig { width, height, open_cells, slot_configs })
}

/// Generate a grid config from a structure template, with `_` or `.` representing open cells and
/// anything else representing blocks. Blank lines are ignored and short rows are padded with
/// blocks. Runs of two or more open cells become slots: across slots first (row by row), then down
/// slots (column by column).
pub fn generate_grid_config_from_template(template: &str) -> Result<GridConfig> {
    let rows: Vec<Vec<bool>> = template
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| line.chars().map(|c| c == '_' || c == '.').collect())
        .collect();

    if rows.is_empty() {
        return Err(Error::EmptyGrid);
    }

    let height = rows.len();
    let width = rows.iter().map(Vec::len).max().unwrap_or(0);
    let open_cells: Vec<Vec<bool>> = rows
        .into_iter()
        .map(|mut row| {
            row.resize(width, false);
            row
        })
        .collect();

    // Find each maximal run of open cells along a line, yielding (start, length).
    fn runs(line: impl Iterator<Item = bool>) -> Vec<(usize, usize)> {
        let mut result = vec![];
        let mut current: Option<(usize, usize)> = None;

        for (idx, open) in line.enumerate() {
            current = match (open, current) {
                (true, Some((start, len))) => Some((start, len + 1)),
                (true, None) => Some((idx, 1)),
                (false, Some(run)) => {
                    result.push(run);
                    None
                }
                (false, None) => None,
            };
        }
        result.extend(current);

        result.into_iter().filter(|&(_, len)| len > 1).collect()
    }

    let mut entries: Vec<GridEntry> = vec![];

    for (row, line) in open_cells.iter().enumerate() {
        for (col, length) in runs(line.iter().copied()) {
            entries.push(GridEntry { row, col, direction: Direction::Across, length });
        }
    }

    for col in 0..width {
        for (row, length) in runs(open_cells.iter().map(|line| line[col])) {
            entries.push(GridEntry { row, col, direction: Direction::Down, length });
        }
    }

    log::debug!("Parsed {}x{} grid with {} slots", width, height, entries.len());

    build_grid_config(width, height, open_cells, &entries)
}
