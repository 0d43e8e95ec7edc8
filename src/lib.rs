pub mod arc_consistency;
pub mod backtracking_search;
pub mod domains;
pub mod error;
pub mod grid_config;
pub mod word_list;

pub use backtracking_search::{find_fill, FillFailure, FillOptions, FillSuccess, Statistics};
pub use error::{Error, Result};
pub use grid_config::{
    generate_grid_config, generate_grid_config_from_template, Choice, Direction, GridConfig,
    GridEntry, SlotId,
};
pub use word_list::{WordId, WordList};

/// The expected maximum length for a single slot. Longer slots still work, they just spill their
/// per-cell data onto the heap.
pub const MAX_SLOT_LENGTH: usize = 21;
