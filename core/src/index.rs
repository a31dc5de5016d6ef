use crate::arena::TermId;
use crate::DocumentId;
use rayon::prelude::*;
use std::collections::hash_map::Entry;
use std::collections::{BTreeMap, HashMap};

/// Document id -> term frequency of one term.
pub type PostingList = BTreeMap<DocumentId, f64>;

/// Term -> posting list. A term with no live document has no entry at all.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct InvertedIndex {
    postings: HashMap<TermId, PostingList>,
}

impl InvertedIndex {
    pub fn new() -> Self { Self::default() }

    pub fn insert(&mut self, term: TermId, document_id: DocumentId, term_frequency: f64) {
        self.postings.entry(term).or_default().insert(document_id, term_frequency);
    }

    pub fn postings(&self, term: TermId) -> Option<&PostingList> {
        self.postings.get(&term)
    }

    /// Number of documents containing `term`.
    pub fn document_frequency(&self, term: TermId) -> usize {
        self.postings.get(&term).map_or(0, BTreeMap::len)
    }

    pub fn contains(&self, term: TermId, document_id: DocumentId) -> bool {
        self.postings.get(&term).is_some_and(|postings| postings.contains_key(&document_id))
    }

    pub fn terms(&self) -> impl Iterator<Item = TermId> + '_ {
        self.postings.keys().copied()
    }

    pub fn len(&self) -> usize { self.postings.len() }

    pub fn is_empty(&self) -> bool { self.postings.is_empty() }

    /// Erase `document_id` from the posting lists of `terms`, dropping lists that become empty.
    pub fn remove_document(&mut self, document_id: DocumentId, terms: &[TermId]) {
        for term in terms {
            if let Entry::Occupied(mut entry) = self.postings.entry(*term) {
                entry.get_mut().remove(&document_id);
                if entry.get().is_empty() {
                    entry.remove();
                }
            }
        }
    }

    /// Parallel form of [`remove_document`](Self::remove_document).
    ///
    /// `terms` must not contain duplicates: each posting list is detached from
    /// the map and handed to exactly one worker. Empty lists are dropped only
    /// after every worker has finished.
    pub fn remove_document_parallel(&mut self, document_id: DocumentId, terms: &[TermId]) {
        let mut detached: Vec<(TermId, PostingList)> = terms
            .iter()
            .filter_map(|&term| self.postings.remove(&term).map(|postings| (term, postings)))
            .collect();

        detached.par_iter_mut().for_each(|(_, postings)| {
            postings.remove(&document_id);
        });

        for (term, postings) in detached {
            if !postings.is_empty() {
                self.postings.insert(term, postings);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arena::WordArena;

    fn build() -> (InvertedIndex, TermId, TermId) {
        let mut arena = WordArena::new();
        let cat = arena.intern("cat");
        let dog = arena.intern("dog");
        let mut index = InvertedIndex::new();
        index.insert(cat, 1, 0.5);
        index.insert(dog, 1, 0.5);
        index.insert(cat, 2, 1.0);
        (index, cat, dog)
    }

    #[test]
    fn insert_and_query() {
        let (index, cat, dog) = build();
        assert_eq!(index.document_frequency(cat), 2);
        assert_eq!(index.document_frequency(dog), 1);
        assert!(index.contains(dog, 1));
        assert!(!index.contains(dog, 2));
        assert_eq!(index.postings(cat).unwrap().get(&2), Some(&1.0));
    }

    #[test]
    fn removal_drops_empty_posting_lists() {
        let (mut index, cat, dog) = build();
        index.remove_document(1, &[cat, dog]);
        assert!(index.postings(dog).is_none());
        assert_eq!(index.document_frequency(cat), 1);
        assert_eq!(index.len(), 1);
    }

    #[test]
    fn parallel_removal_matches_sequential() {
        let (mut sequential, cat, dog) = build();
        let mut parallel = sequential.clone();
        sequential.remove_document(1, &[cat, dog]);
        parallel.remove_document_parallel(1, &[cat, dog]);
        assert_eq!(sequential, parallel);

        sequential.remove_document(2, &[cat]);
        parallel.remove_document_parallel(2, &[cat]);
        assert!(parallel.is_empty());
        assert_eq!(sequential, parallel);
    }

    #[test]
    fn removing_unknown_terms_is_harmless() {
        let (mut index, cat, _) = build();
        let before = index.clone();
        index.remove_document(7, &[cat]);
        index.remove_document_parallel(7, &[cat]);
        assert_eq!(index, before);
    }
}
