pub const MAX_RESULT_DOCUMENT_COUNT: usize = 5;
pub const RELEVANCE_EPSILON: f64 = 1e-6;

#[derive(Debug, Clone, PartialEq)]
pub struct SearchConfig {
    /// Results kept by `find_top_documents*`.
    pub max_result_document_count: usize,
    /// Relevances closer than this are ranked by rating instead.
    pub relevance_epsilon: f64,
    /// Size of a dedicated worker pool for parallel operations.
    /// `None` runs them on rayon's global pool.
    pub worker_threads: Option<usize>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        SearchConfig {
            max_result_document_count: MAX_RESULT_DOCUMENT_COUNT,
            relevance_epsilon: RELEVANCE_EPSILON,
            worker_threads: None,
        }
    }
}

impl SearchConfig {
    pub fn with_worker_threads(mut self, threads: usize) -> Self {
        self.worker_threads = Some(threads);
        self
    }
}
