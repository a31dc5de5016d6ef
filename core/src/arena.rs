use std::collections::HashMap;
use std::sync::Arc;

/// Handle to a word interned in a [`WordArena`].
///
/// Handles are only meaningful for the arena that issued them. They stay valid
/// for the arena's whole lifetime since the arena never removes or moves words.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TermId(u32);

impl TermId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Append-only word storage.
///
/// Every distinct word is stored once; the lookup dictionary shares the same
/// allocation as the id-indexed table.
#[derive(Debug, Default)]
pub struct WordArena {
    words: Vec<Arc<str>>,
    dictionary: HashMap<Arc<str>, TermId>,
}

impl WordArena {
    pub fn new() -> Self { Self::default() }

    /// Returns the handle for `word`, storing it first if it is new.
    pub fn intern(&mut self, word: &str) -> TermId {
        if let Some(&id) = self.dictionary.get(word) {
            return id;
        }
        let id = TermId(u32::try_from(self.words.len()).expect("word arena exceeds u32::MAX entries"));
        let stored: Arc<str> = Arc::from(word);
        self.words.push(Arc::clone(&stored));
        self.dictionary.insert(stored, id);
        id
    }

    pub fn lookup(&self, word: &str) -> Option<TermId> {
        self.dictionary.get(word).copied()
    }

    /// Resolves a handle issued by this arena.
    ///
    /// # Panics
    /// If `id` was issued by a different arena and is out of range.
    pub fn resolve(&self, id: TermId) -> &str {
        &self.words[id.index()]
    }

    pub fn len(&self) -> usize { self.words.len() }

    pub fn is_empty(&self) -> bool { self.words.is_empty() }
}
