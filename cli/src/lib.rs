use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use search_core::{
    Document, DocumentId, DocumentMatch, DocumentStatus, ExecutionPolicy, SearchConfig, SearchServer, StopWords,
};
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

#[derive(Debug, Deserialize)]
pub struct InputDoc {
    pub id: DocumentId,
    pub text: String,
    #[serde(default)]
    pub status: DocumentStatus,
    #[serde(default)]
    pub ratings: Vec<i32>,
}

#[derive(Parser, Debug)]
#[command(name = "search-cli")]
#[command(about = "Query an in-memory TF-IDF index built from JSON/JSONL documents", long_about = None)]
pub struct Cli {
    /// Input path (file or directory)
    #[arg(long)]
    pub input: String,
    /// Space-delimited stop words
    #[arg(long, default_value = "")]
    pub stop_words: String,
    /// Worker threads for parallel operations; falls back to SEARCH_WORKERS
    #[arg(long)]
    pub workers: Option<usize>,
    /// Document ids to remove after loading
    #[arg(long)]
    pub remove: Vec<DocumentId>,
    /// Parse queries and remove documents in parallel
    #[arg(long, default_value_t = false)]
    pub parallel: bool,
    /// Print JSON instead of text
    #[arg(long, default_value_t = false)]
    pub json: bool,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the top documents for a query
    Search {
        query: String,
        /// Only documents with this status
        #[arg(long, default_value = "actual")]
        status: DocumentStatus,
    },
    /// Match a query against every document
    Match { query: String },
    /// Print the term frequencies of one document
    Frequencies { id: DocumentId },
    /// Print index statistics
    Stats,
}

#[derive(Serialize)]
struct MatchReport<'a> {
    document_id: DocumentId,
    #[serde(flatten)]
    matched: DocumentMatch<'a>,
}

#[derive(Serialize)]
struct Stats {
    documents: usize,
    indexed_terms: usize,
    interned_words: usize,
}

/// Build the server, load and index the input, apply removals and run the command.
pub fn run(cli: &Cli) -> Result<String> {
    let workers = cli
        .workers
        .or_else(|| std::env::var("SEARCH_WORKERS").ok().and_then(|v| v.parse().ok()));
    let mut server = create_search_server(&cli.stop_words, workers)?;

    let docs = load_documents(Path::new(&cli.input))?;
    let total = docs.len();
    let rejected = add_documents(&mut server, docs);
    tracing::info!(total, rejected = rejected.len(), "indexed documents");

    let policy = if cli.parallel { ExecutionPolicy::Parallel } else { ExecutionPolicy::Sequential };
    for &id in &cli.remove {
        server.remove_document_with(policy, id);
    }
    execute(&server, &cli.command, policy, cli.json)
}

pub fn create_search_server(stop_words: &str, workers: Option<usize>) -> Result<SearchServer> {
    let config = match workers {
        Some(threads) => SearchConfig::default().with_worker_threads(threads),
        None => SearchConfig::default(),
    };
    let stop_words = StopWords::from_text(stop_words).context("invalid stop words")?;
    Ok(SearchServer::with_config(stop_words, config)?)
}

/// Index every document, skipping the ones the server rejects.
pub fn add_documents(server: &mut SearchServer, docs: Vec<InputDoc>) -> Vec<(DocumentId, search_core::Error)> {
    let mut rejected = Vec::new();
    for doc in docs {
        if let Err(err) = server.add_document(doc.id, &doc.text, doc.status, &doc.ratings) {
            tracing::warn!(document_id = doc.id, %err, "document rejected");
            rejected.push((doc.id, err));
        }
    }
    rejected
}

pub fn execute(server: &SearchServer, command: &Commands, policy: ExecutionPolicy, json: bool) -> Result<String> {
    match command {
        Commands::Search { query, status } => {
            let found = server.find_top_documents_by_status(query, *status)?;
            if json {
                return Ok(serde_json::to_string_pretty(&found)?);
            }
            Ok(render_search(query, &found))
        }
        Commands::Match { query } => {
            let mut reports = Vec::new();
            for id in server {
                let matched = server.match_document_with(policy, query, id)?;
                reports.push(MatchReport { document_id: id, matched });
            }
            if json {
                return Ok(serde_json::to_string_pretty(&reports)?);
            }
            let mut out = format!("Matching documents for query: {query}\n");
            for report in &reports {
                out.push_str(&render_match(report.document_id, &report.matched));
                out.push('\n');
            }
            Ok(out)
        }
        Commands::Frequencies { id } => {
            let frequencies = server.word_frequencies(*id)?;
            let mut words: Vec<(&str, f64)> = frequencies.iter().collect();
            words.sort_by(|a, b| a.0.cmp(b.0));
            if json {
                return Ok(serde_json::to_string_pretty(&words)?);
            }
            let mut out = String::new();
            for (word, frequency) in words {
                writeln!(out, "{word} {frequency}")?;
            }
            Ok(out)
        }
        Commands::Stats => {
            let stats = Stats {
                documents: server.document_count(),
                indexed_terms: server.index().len(),
                interned_words: server.arena().len(),
            };
            if json {
                return Ok(serde_json::to_string_pretty(&stats)?);
            }
            Ok(format!(
                "documents: {}\nindexed terms: {}\ninterned words: {}\n",
                stats.documents, stats.indexed_terms, stats.interned_words
            ))
        }
    }
}

pub fn render_search(query: &str, found: &[Document]) -> String {
    let mut out = format!("Search results for: {query}\n");
    for document in found {
        out.push_str(&document.to_string());
        out.push('\n');
    }
    out
}

pub fn render_match(document_id: DocumentId, matched: &DocumentMatch<'_>) -> String {
    let mut out = format!("{{ document_id = {document_id}, status = {}, words =", matched.status);
    for term in &matched.terms {
        out.push(' ');
        out.push_str(term);
    }
    out.push_str(" }");
    out
}

/// Collect `.json`/`.jsonl` files under `input`, or `input` itself if it is a file.
pub fn collect_files(input: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = Vec::new();
    if input.is_dir() {
        for entry in WalkDir::new(input).sort_by_file_name().into_iter().filter_map(|e| e.ok()) {
            let p = entry.path();
            if p.is_file() {
                if let Some(ext) = p.extension().and_then(|s| s.to_str()) {
                    if matches!(ext, "json" | "jsonl") {
                        files.push(p.to_path_buf());
                    }
                }
            }
        }
    } else if input.is_file() {
        files.push(input.to_path_buf());
    }
    files
}

pub fn load_documents(input: &Path) -> Result<Vec<InputDoc>> {
    let files = collect_files(input);
    if files.is_empty() {
        anyhow::bail!("no .json or .jsonl input found at {}", input.display());
    }
    let mut docs = Vec::new();
    for file in files {
        if file.extension().and_then(|s| s.to_str()) == Some("jsonl") {
            load_jsonl(&file, &mut docs)?;
        } else {
            load_json(&file, &mut docs)?;
        }
    }
    Ok(docs)
}

fn load_jsonl(file: &Path, docs: &mut Vec<InputDoc>) -> Result<()> {
    let reader = BufReader::new(File::open(file)?);
    for (number, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() { continue; }
        let doc: InputDoc = serde_json::from_str(&line)
            .with_context(|| format!("{}:{}", file.display(), number + 1))?;
        docs.push(doc);
    }
    Ok(())
}

fn load_json(file: &Path, docs: &mut Vec<InputDoc>) -> Result<()> {
    let reader = BufReader::new(File::open(file)?);
    let json: serde_json::Value = serde_json::from_reader(reader)
        .with_context(|| format!("{}", file.display()))?;
    match json {
        serde_json::Value::Array(arr) => {
            for v in arr {
                docs.push(serde_json::from_value(v)?);
            }
        }
        serde_json::Value::Object(_) => docs.push(serde_json::from_value(json)?),
        _ => {}
    }
    Ok(())
}
