use crate::arena::{TermId, WordArena};
use crate::config::SearchConfig;
use crate::documents::{compute_term_frequencies, DocumentData, DocumentStore};
use crate::error::{Error, Result};
use crate::index::InvertedIndex;
use crate::query::{parse_query, ExecutionPolicy, Query};
use crate::scoring::{find_all_documents, rank};
use crate::stop_words::StopWords;
use crate::tokenizer::tokenize_document;
use crate::{compute_average_rating, Document, DocumentId, DocumentStatus};
use rayon::ThreadPool;
use serde::Serialize;
use std::collections::{btree_set, BTreeMap, BTreeSet};
use std::iter::Copied;

/// Result of [`SearchServer::match_document`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocumentMatch<'a> {
    /// Plus words found in the document, sorted; empty if a minus word matched.
    pub terms: Vec<&'a str>,
    pub status: DocumentStatus,
}

/// Read-only view of a document's term frequency table.
#[derive(Debug, Clone, Copy)]
pub struct WordFrequencies<'a> {
    frequencies: &'a BTreeMap<TermId, f64>,
    arena: &'a WordArena,
}

impl<'a> WordFrequencies<'a> {
    pub fn get(&self, word: &str) -> Option<f64> {
        self.arena.lookup(word).and_then(|term| self.frequencies.get(&term).copied())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'a str, f64)> + 'a {
        let (frequencies, arena) = (self.frequencies, self.arena);
        frequencies.iter().map(move |(&term, &frequency)| (arena.resolve(term), frequency))
    }

    pub fn by_term(&self) -> &'a BTreeMap<TermId, f64> {
        self.frequencies
    }

    pub fn len(&self) -> usize { self.frequencies.len() }

    pub fn is_empty(&self) -> bool { self.frequencies.is_empty() }
}

/// In-memory TF-IDF search index.
///
/// Mutations take `&mut self` and queries take `&self`, so a server cannot be
/// queried while it is being modified.
#[derive(Debug)]
pub struct SearchServer {
    config: SearchConfig,
    pool: Option<ThreadPool>,
    stop_words: StopWords,
    arena: WordArena,
    documents: DocumentStore,
    index: InvertedIndex,
    document_ids: BTreeSet<DocumentId>,
}

impl Default for SearchServer {
    fn default() -> Self {
        SearchServer {
            config: SearchConfig::default(),
            pool: None,
            stop_words: StopWords::default(),
            arena: WordArena::new(),
            documents: DocumentStore::new(),
            index: InvertedIndex::new(),
            document_ids: BTreeSet::new(),
        }
    }
}

fn install<R: Send>(pool: Option<&ThreadPool>, op: impl FnOnce() -> R + Send) -> R {
    match pool {
        Some(pool) => pool.install(op),
        None => op(),
    }
}

impl SearchServer {
    pub fn new<I, S>(stop_words: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self::with_config(StopWords::new(stop_words)?, SearchConfig::default())
    }

    /// Stop words given as one space-delimited string.
    pub fn from_stop_words_text(text: &str) -> Result<Self> {
        Self::with_config(StopWords::from_text(text)?, SearchConfig::default())
    }

    pub fn with_config(stop_words: StopWords, config: SearchConfig) -> Result<Self> {
        let pool = match config.worker_threads {
            Some(threads) => Some(rayon::ThreadPoolBuilder::new().num_threads(threads).build()?),
            None => None,
        };
        Ok(SearchServer { config, pool, stop_words, ..Default::default() })
    }

    pub fn config(&self) -> &SearchConfig { &self.config }

    pub fn stop_words(&self) -> &StopWords { &self.stop_words }

    pub fn arena(&self) -> &WordArena { &self.arena }

    pub fn index(&self) -> &InvertedIndex { &self.index }

    pub fn documents(&self) -> &DocumentStore { &self.documents }

    /// Index `text` under `document_id`. Nothing is changed when an error is returned.
    pub fn add_document(
        &mut self,
        document_id: DocumentId,
        text: &str,
        status: DocumentStatus,
        ratings: &[i32],
    ) -> Result<()> {
        if document_id < 0 {
            return Err(Error::InvalidId { id: document_id });
        }
        if self.document_ids.contains(&document_id) {
            return Err(Error::DuplicateId { id: document_id });
        }
        let words = tokenize_document(text)?;

        let stop_words = &self.stop_words;
        let arena = &mut self.arena;
        let terms: Vec<TermId> = words
            .into_iter()
            .filter(|word| !stop_words.contains(word))
            .map(|word| arena.intern(word))
            .collect();

        let word_frequencies = compute_term_frequencies(&terms);
        for (&term, &term_frequency) in &word_frequencies {
            self.index.insert(term, document_id, term_frequency);
        }
        tracing::debug!(document_id, words = terms.len(), distinct = word_frequencies.len(), "document added");

        let rating = compute_average_rating(ratings);
        self.documents.insert(document_id, DocumentData { rating, status, word_frequencies });
        self.document_ids.insert(document_id);
        Ok(())
    }

    pub fn document_count(&self) -> usize {
        self.documents.len()
    }

    /// Live document ids in ascending order.
    pub fn iter(&self) -> Copied<btree_set::Iter<'_, DocumentId>> {
        self.document_ids.iter().copied()
    }

    pub fn parse_query(&self, policy: ExecutionPolicy, raw_query: &str) -> Result<Query> {
        match policy {
            ExecutionPolicy::Sequential => parse_query(policy, raw_query, &self.arena, &self.stop_words),
            ExecutionPolicy::Parallel => install(self.pool.as_ref(), || {
                parse_query(policy, raw_query, &self.arena, &self.stop_words)
            }),
        }
    }

    /// Top documents with status `ACTUAL`.
    pub fn find_top_documents(&self, raw_query: &str) -> Result<Vec<Document>> {
        self.find_top_documents_by_status(raw_query, DocumentStatus::Actual)
    }

    pub fn find_top_documents_by_status(&self, raw_query: &str, status: DocumentStatus) -> Result<Vec<Document>> {
        self.find_top_documents_with(raw_query, |_, document_status, _| document_status == status)
    }

    /// Top documents accepted by `predicate(id, status, rating)`.
    pub fn find_top_documents_with<P>(&self, raw_query: &str, predicate: P) -> Result<Vec<Document>>
    where
        P: Fn(DocumentId, DocumentStatus, i32) -> bool,
    {
        let query = self.parse_query(ExecutionPolicy::Sequential, raw_query)?;
        let mut matched: Vec<Document> = find_all_documents(&query, &self.index, &self.documents)
            .into_iter()
            .filter(|document| {
                self.documents
                    .get(document.id)
                    .is_some_and(|data| predicate(document.id, data.status, data.rating))
            })
            .collect();

        rank(&mut matched, self.config.relevance_epsilon);
        matched.truncate(self.config.max_result_document_count);
        Ok(matched)
    }

    pub fn match_document(&self, raw_query: &str, document_id: DocumentId) -> Result<DocumentMatch<'_>> {
        self.match_document_with(ExecutionPolicy::Sequential, raw_query, document_id)
    }

    /// Plus words of the query found in the document. Only query parsing honours `policy`.
    pub fn match_document_with(
        &self,
        policy: ExecutionPolicy,
        raw_query: &str,
        document_id: DocumentId,
    ) -> Result<DocumentMatch<'_>> {
        let data = self
            .documents
            .get(document_id)
            .ok_or(Error::UnknownDocument { id: document_id })?;
        let query = self.parse_query(policy, raw_query)?;

        let frequencies = &data.word_frequencies;
        if query.minus_terms.iter().any(|term| frequencies.contains_key(term)) {
            return Ok(DocumentMatch { terms: Vec::new(), status: data.status });
        }

        let mut terms: Vec<&str> = query
            .plus_terms
            .iter()
            .filter(|&term| frequencies.contains_key(term))
            .map(|&term| self.arena.resolve(term))
            .collect();
        terms.sort_unstable();
        Ok(DocumentMatch { terms, status: data.status })
    }

    pub fn word_frequencies(&self, document_id: DocumentId) -> Result<WordFrequencies<'_>> {
        let data = self
            .documents
            .get(document_id)
            .ok_or(Error::UnknownDocument { id: document_id })?;
        Ok(WordFrequencies { frequencies: &data.word_frequencies, arena: &self.arena })
    }

    /// Remove a document. Unknown ids are ignored.
    pub fn remove_document(&mut self, document_id: DocumentId) {
        self.remove_document_with(ExecutionPolicy::Sequential, document_id);
    }

    /// Remove a document, erasing its posting list entries with the given policy.
    /// Interned words are kept.
    pub fn remove_document_with(&mut self, policy: ExecutionPolicy, document_id: DocumentId) {
        let Some(data) = self.documents.remove(document_id) else {
            return;
        };
        let terms: Vec<TermId> = data.word_frequencies.keys().copied().collect();

        match policy {
            ExecutionPolicy::Sequential => self.index.remove_document(document_id, &terms),
            ExecutionPolicy::Parallel => {
                let index = &mut self.index;
                install(self.pool.as_ref(), || index.remove_document_parallel(document_id, &terms));
            }
        }
        self.document_ids.remove(&document_id);
        tracing::debug!(document_id, terms = terms.len(), ?policy, "document removed");
    }
}

impl<'a> IntoIterator for &'a SearchServer {
    type Item = DocumentId;
    type IntoIter = Copied<btree_set::Iter<'a, DocumentId>>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn server() -> SearchServer {
        let mut server = SearchServer::new(["and", "in"]).unwrap();
        server.add_document(1, "a cat sat in a hat", DocumentStatus::Actual, &[5, 6]).unwrap();
        server.add_document(2, "a dog and a cat", DocumentStatus::Actual, &[7]).unwrap();
        server
    }

    #[test]
    fn add_rejects_bad_ids_without_mutation() {
        let mut server = server();
        let words = server.arena().len();
        assert_eq!(
            server.add_document(-1, "new words", DocumentStatus::Actual, &[]),
            Err(Error::InvalidId { id: -1 })
        );
        assert_eq!(
            server.add_document(1, "new words", DocumentStatus::Actual, &[]),
            Err(Error::DuplicateId { id: 1 })
        );
        assert!(matches!(
            server.add_document(3, "new wo\u{3}rds", DocumentStatus::Actual, &[]),
            Err(Error::InvalidTerm { .. })
        ));
        assert_eq!(server.arena().len(), words);
        assert_eq!(server.document_count(), 2);
        assert_eq!(server.iter().collect::<Vec<_>>(), vec![1, 2]);
    }

    #[test]
    fn stop_words_are_not_indexed() {
        let server = server();
        assert!(server.arena().lookup("in").is_none());
        assert!(server.arena().lookup("and").is_none());
        let frequencies = server.word_frequencies(1).unwrap();
        assert_eq!(frequencies.get("a"), Some(2.0 / 5.0));
        assert_eq!(frequencies.get("in"), None);
    }

    #[test]
    fn rating_is_averaged() {
        let server = server();
        let found = server.find_top_documents("cat").unwrap();
        let doc1 = found.iter().find(|d| d.id == 1).unwrap();
        assert_eq!(doc1.rating, 5);
    }

    #[test]
    fn dedicated_pool_runs_parallel_operations() {
        let config = SearchConfig::default().with_worker_threads(2);
        let mut server = SearchServer::with_config(StopWords::from_text("and").unwrap(), config).unwrap();
        server.add_document(4, "red fox and blue fox", DocumentStatus::Actual, &[1]).unwrap();
        let matched = server.match_document_with(ExecutionPolicy::Parallel, "fox blue -green", 4).unwrap();
        assert_eq!(matched.terms, vec!["blue", "fox"]);
        server.remove_document_with(ExecutionPolicy::Parallel, 4);
        assert!(server.index().is_empty());
        assert_eq!(server.document_count(), 0);
    }

    #[test]
    fn unknown_document_errors() {
        let server = server();
        assert_eq!(server.word_frequencies(42).unwrap_err(), Error::UnknownDocument { id: 42 });
        assert_eq!(server.match_document("cat", 42).unwrap_err(), Error::UnknownDocument { id: 42 });
    }

    #[test]
    fn iteration_by_reference() {
        let server = server();
        let mut seen = Vec::new();
        for id in &server {
            seen.push(id);
        }
        assert_eq!(seen, vec![1, 2]);
    }
}
