use clap::Parser;
use search_cli::{collect_files, load_documents, run, Cli};
use serde_json::Value;
use std::fs;
use tempfile::tempdir;

fn write_corpus(dir: &std::path::Path) {
    fs::write(
        dir.join("part1.jsonl"),
        concat!(
            r#"{"id": 1, "text": "a cat sat in a hat", "ratings": [5, 6]}"#, "\n",
            "\n",
            r#"{"id": 2, "text": "a dog and a cat", "ratings": [7]}"#, "\n",
        ),
    )
    .unwrap();
    fs::write(
        dir.join("part2.json"),
        r#"[{"id": 3, "text": "black cat", "status": "BANNED"}, {"id": 1, "text": "duplicate id"}]"#,
    )
    .unwrap();
    fs::write(dir.join("notes.txt"), "ignored").unwrap();
}

fn cli(dir: &std::path::Path, args: &[&str]) -> Cli {
    let input = dir.to_string_lossy().to_string();
    let mut argv = vec!["search-cli", "--input", input.as_str(), "--stop-words", "and in"];
    argv.extend_from_slice(args);
    Cli::try_parse_from(argv).unwrap()
}

#[test]
fn loads_json_and_jsonl_from_directory() {
    let dir = tempdir().unwrap();
    write_corpus(dir.path());
    assert_eq!(collect_files(dir.path()).len(), 2);
    let docs = load_documents(dir.path()).unwrap();
    assert_eq!(docs.len(), 4);
}

#[test]
fn search_excludes_minus_words() {
    let dir = tempdir().unwrap();
    write_corpus(dir.path());
    let out = run(&cli(dir.path(), &["--json", "search", "cat hat -dog"])).unwrap();
    let json: Value = serde_json::from_str(&out).unwrap();
    let arr = json.as_array().unwrap();
    assert_eq!(arr.len(), 1);
    assert_eq!(arr[0]["id"].as_i64().unwrap(), 1);
    assert_eq!(arr[0]["rating"].as_i64().unwrap(), 5);
}

#[test]
fn search_by_status() {
    let dir = tempdir().unwrap();
    write_corpus(dir.path());
    let out = run(&cli(dir.path(), &["search", "cat", "--status", "banned"])).unwrap();
    assert!(out.contains("document_id = 3"));
    assert!(!out.contains("document_id = 1"));
}

#[test]
fn match_reports_every_document() {
    let dir = tempdir().unwrap();
    write_corpus(dir.path());
    let out = run(&cli(dir.path(), &["--parallel", "match", "cat -hat"])).unwrap();
    let lines: Vec<&str> = out.lines().collect();
    assert_eq!(lines[0], "Matching documents for query: cat -hat");
    assert_eq!(lines[1], "{ document_id = 1, status = ACTUAL, words = }");
    assert_eq!(lines[2], "{ document_id = 2, status = ACTUAL, words = cat }");
    assert_eq!(lines[3], "{ document_id = 3, status = BANNED, words = cat }");
}

#[test]
fn removal_before_query() {
    let dir = tempdir().unwrap();
    write_corpus(dir.path());
    let out = run(&cli(dir.path(), &["--remove", "2", "--remove", "999", "--parallel", "--json", "stats"])).unwrap();
    let json: Value = serde_json::from_str(&out).unwrap();
    assert_eq!(json["documents"].as_u64().unwrap(), 2);
    assert_eq!(json["interned_words"].as_u64().unwrap(), 6);
    assert_eq!(json["indexed_terms"].as_u64().unwrap(), 5);
}

#[test]
fn frequencies_and_errors() {
    let dir = tempdir().unwrap();
    write_corpus(dir.path());
    let out = run(&cli(dir.path(), &["frequencies", "2"])).unwrap();
    assert_eq!(out, "a 0.5\ncat 0.25\ndog 0.25\n");
    assert!(run(&cli(dir.path(), &["frequencies", "42"])).is_err());
    assert!(run(&cli(dir.path(), &["search", "cat --dog"])).is_err());
}
