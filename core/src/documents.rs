use crate::arena::TermId;
use crate::{DocumentId, DocumentStatus};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct DocumentData {
    pub rating: i32,
    pub status: DocumentStatus,
    pub word_frequencies: BTreeMap<TermId, f64>,
}

/// Per-document rating, status and term frequency table.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct DocumentStore {
    documents: BTreeMap<DocumentId, DocumentData>,
}

impl DocumentStore {
    pub fn new() -> Self { Self::default() }

    pub fn insert(&mut self, document_id: DocumentId, data: DocumentData) {
        self.documents.insert(document_id, data);
    }

    pub fn get(&self, document_id: DocumentId) -> Option<&DocumentData> {
        self.documents.get(&document_id)
    }

    pub fn remove(&mut self, document_id: DocumentId) -> Option<DocumentData> {
        self.documents.remove(&document_id)
    }

    pub fn contains(&self, document_id: DocumentId) -> bool {
        self.documents.contains_key(&document_id)
    }

    pub fn ids(&self) -> impl Iterator<Item = DocumentId> + '_ {
        self.documents.keys().copied()
    }

    pub fn len(&self) -> usize { self.documents.len() }

    pub fn is_empty(&self) -> bool { self.documents.is_empty() }
}

/// Fraction of `terms` taken by each distinct term: `count / terms.len()`.
pub fn compute_term_frequencies(terms: &[TermId]) -> BTreeMap<TermId, f64> {
    let mut counts: BTreeMap<TermId, usize> = BTreeMap::new();
    for &term in terms {
        *counts.entry(term).or_insert(0) += 1;
    }
    let total = terms.len() as f64;
    counts
        .into_iter()
        .map(|(term, count)| (term, count as f64 / total))
        .collect()
}
