//! Query parsing.
//!
//! Every token is classified independently into a one-word [`Query`] and the
//! partial queries are merged with set union. The merge is associative and
//! commutative, so the same classification runs either as a sequential fold or
//! as a rayon reduction and both give the same result.

use crate::arena::{TermId, WordArena};
use crate::error::{Error, Result};
use crate::stop_words::StopWords;
use crate::tokenizer::{is_valid_word, split_into_words};
use rayon::prelude::*;
use std::collections::BTreeSet;

/// How an operation that supports fan-out should run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExecutionPolicy {
    #[default]
    Sequential,
    Parallel,
}

/// Parsed query. Words unknown to the arena are dropped since they cannot
/// match or exclude any document.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Query {
    pub plus_terms: BTreeSet<TermId>,
    pub minus_terms: BTreeSet<TermId>,
}

impl Query {
    pub fn new() -> Self { Self::default() }

    /// Set union of both term sets.
    pub fn merge(mut self, mut other: Query) -> Query {
        self.plus_terms.append(&mut other.plus_terms);
        self.minus_terms.append(&mut other.minus_terms);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.plus_terms.is_empty() && self.minus_terms.is_empty()
    }
}

#[derive(Debug, PartialEq, Eq)]
enum QueryWord<'a> {
    Plus(&'a str),
    Minus(&'a str),
    Stop,
}

fn parse_query_word<'a>(token: &'a str, stop_words: &StopWords) -> Result<QueryWord<'a>> {
    let (word, is_minus) = match token.strip_prefix('-') {
        Some(rest) => (rest, true),
        None => (token, false),
    };
    if word.is_empty() || word.starts_with('-') {
        return Err(Error::invalid_query(format!("malformed minus word {token:?}")));
    }
    if !is_valid_word(word) {
        return Err(Error::invalid_query(format!("invalid word {token:?}")));
    }
    if stop_words.contains(word) {
        return Ok(QueryWord::Stop);
    }
    Ok(if is_minus { QueryWord::Minus(word) } else { QueryWord::Plus(word) })
}

fn classify(token: &str, arena: &WordArena, stop_words: &StopWords) -> Result<Query> {
    let mut query = Query::new();
    match parse_query_word(token, stop_words)? {
        QueryWord::Plus(word) => query.plus_terms.extend(arena.lookup(word)),
        QueryWord::Minus(word) => query.minus_terms.extend(arena.lookup(word)),
        QueryWord::Stop => {}
    }
    Ok(query)
}

// The left error wins, so both strategies report the first invalid token in text order.
fn combine(left: Result<Query>, right: Result<Query>) -> Result<Query> {
    match (left, right) {
        (Ok(left), Ok(right)) => Ok(left.merge(right)),
        (Err(err), _) | (Ok(_), Err(err)) => Err(err),
    }
}

/// Parse raw query text against the words known to `arena`.
///
/// Every token is classified even after an error is found; the error is
/// reported once the whole reduction has finished.
pub fn parse_query(
    policy: ExecutionPolicy,
    text: &str,
    arena: &WordArena,
    stop_words: &StopWords,
) -> Result<Query> {
    if text.contains("--") {
        return Err(Error::invalid_query("doubled minus sign"));
    }
    let tokens = split_into_words(text);
    if tokens.iter().any(|&token| token == "-") {
        return Err(Error::invalid_query("minus sign without a word"));
    }

    let classify_token = |token: &&str| classify(token, arena, stop_words);
    match policy {
        ExecutionPolicy::Sequential => tokens.iter().map(classify_token).fold(Ok(Query::new()), combine),
        ExecutionPolicy::Parallel => {
            tracing::trace!(tokens = tokens.len(), "parallel query parse");
            tokens.par_iter().map(classify_token).reduce(|| Ok(Query::new()), combine)
        }
    }
}
