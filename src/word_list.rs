use std::fmt::{Debug, Formatter};
use std::fs;
use std::path::Path;

use smallvec::SmallVec;

use crate::error::{Error, Result};
use crate::MAX_SLOT_LENGTH;

/// An identifier for a given word, based on its index in the `WordList`'s `words` field. Since the
/// list is sorted, comparing ids is the same as comparing the words themselves.
pub type WordId = usize;

/// A struct representing a word that can be chosen for a slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Word {
    pub string: String,
    pub glyphs: SmallVec<[char; MAX_SLOT_LENGTH]>,
}

impl Word {
    fn new(string: String) -> Word {
        let glyphs = string.chars().collect();
        Word { string, glyphs }
    }

    /// Length of the word in chars, which is what slot lengths are measured in.
    pub fn len(&self) -> usize {
        self.glyphs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.glyphs.is_empty()
    }
}

/// The set of candidate words every slot starts out with.
#[derive(Clone, Default)]
pub struct WordList {
    pub words: Vec<Word>,
}

impl Debug for WordList {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WordList")
            .field("words", &(["(", &self.words.len().to_string(), " entries)"].join("")))
            .finish()
    }
}

impl WordList {
    /// Build a word list from raw strings. Entries are trimmed, blank entries are skipped, and
    /// duplicates are dropped.
    pub fn new<I, S>(words: I) -> WordList
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut strings: Vec<String> = words
            .into_iter()
            .map(|word| word.as_ref().trim().to_string())
            .filter(|word| !word.is_empty())
            .collect();
        strings.sort();
        strings.dedup();

        WordList { words: strings.into_iter().map(Word::new).collect() }
    }

    /// Load a word list with one word per line, upper-casing every entry.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<WordList> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let word_list = WordList::new(contents.lines().map(|line| line.to_uppercase()));
        log::info!("Loaded {} words from {}", word_list.len(), path.display());
        Ok(word_list)
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn get(&self, word_id: WordId) -> &Word {
        &self.words[word_id]
    }

    /// Look up the id of a word, if it's in the list.
    pub fn find(&self, string: &str) -> Option<WordId> {
        self.words.binary_search_by(|word| word.string.as_str().cmp(string)).ok()
    }

    /// Do `x_word` and `y_word` place the same glyph at the given offsets?
    pub fn agrees_at(&self, x_word: WordId, x_cell: usize, y_word: WordId, y_cell: usize) -> bool {
        let x_glyph = self.words[x_word].glyphs.get(x_cell);
        x_glyph.is_some() && x_glyph == self.words[y_word].glyphs.get(y_cell)
    }
}
