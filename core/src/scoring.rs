//! TF-IDF relevance and ranking.

use crate::documents::DocumentStore;
use crate::index::InvertedIndex;
use crate::query::Query;
use crate::{Document, DocumentId};
use std::collections::BTreeMap;

/// `ln(live_documents / containing_documents)`.
pub fn inverse_document_frequency(live_documents: usize, containing_documents: usize) -> f64 {
    (live_documents as f64 / containing_documents as f64).ln()
}

/// Score every live document against `query`.
///
/// Plus terms accumulate `tf * idf`; any document holding a minus term is dropped.
/// Terms missing from the index are skipped.
pub fn find_all_documents(query: &Query, index: &InvertedIndex, documents: &DocumentStore) -> Vec<Document> {
    let live = documents.len();
    let mut relevance: BTreeMap<DocumentId, f64> = BTreeMap::new();

    for &term in &query.plus_terms {
        let Some(postings) = index.postings(term) else { continue };
        let idf = inverse_document_frequency(live, postings.len());
        for (&document_id, &term_frequency) in postings {
            *relevance.entry(document_id).or_insert(0.0) += term_frequency * idf;
        }
    }

    for &term in &query.minus_terms {
        let Some(postings) = index.postings(term) else { continue };
        for document_id in postings.keys() {
            relevance.remove(document_id);
        }
    }

    relevance
        .into_iter()
        .filter_map(|(id, relevance)| {
            documents.get(id).map(|data| Document::new(id, relevance, data.rating))
        })
        .collect()
}

/// Sort by relevance descending. Neighbouring documents whose relevances differ
/// by less than `epsilon` form a group that is ordered by rating descending.
/// Remaining ties fall back to relevance, then id, so the order never depends
/// on the input order.
pub fn rank(documents: &mut [Document], epsilon: f64) {
    documents.sort_by(|a, b| b.relevance.total_cmp(&a.relevance).then(a.id.cmp(&b.id)));
    for group in documents.chunk_by_mut(|a, b| (a.relevance - b.relevance).abs() < epsilon) {
        group.sort_by(|a, b| {
            b.rating
                .cmp(&a.rating)
                .then(b.relevance.total_cmp(&a.relevance))
                .then(a.id.cmp(&b.id))
        });
    }
}
