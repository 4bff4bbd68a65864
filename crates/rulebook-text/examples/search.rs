use std::env;
use std::path::{Path, PathBuf};

use rulebook_core::corpus::CorpusLoader;
use rulebook_core::types::SearchContext;
use rulebook_text::RulebookSearchEngine;

// Build the topic index from a directory of chapter JSON files and run one query.
// Usage:
//   cargo run -p rulebook-text --example search -- "your query" \
//     [--dir test_data/rulebook] [--chapter 03-combate.json] [--limit 10]

fn main() -> anyhow::Result<()> {
    let args: Vec<String> = env::args().skip(1).collect();
    if args.is_empty() {
        eprintln!("Usage: cargo run -p rulebook-text --example search -- <query> [--dir DIR] [--chapter ID] [--limit N]");
        std::process::exit(1);
    }
    let mut query = String::new();
    let mut data_dir: Option<PathBuf> = None;
    let mut context = SearchContext::default();
    let mut limit: usize = 10;

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--dir" => {
                if i + 1 >= args.len() { eprintln!("--dir requires a path"); std::process::exit(2); }
                data_dir = Some(PathBuf::from(&args[i + 1]));
                i += 2; continue;
            }
            "--chapter" => {
                if i + 1 >= args.len() { eprintln!("--chapter requires an id"); std::process::exit(2); }
                context = SearchContext::in_chapter(args[i + 1].clone());
                i += 2; continue;
            }
            "--limit" => {
                if i + 1 >= args.len() { eprintln!("--limit requires a number"); std::process::exit(2); }
                limit = args[i + 1].parse().unwrap_or(limit);
                i += 2; continue;
            }
            s if s.starts_with("-") => {
                eprintln!("Unknown flag: {}", s); std::process::exit(2);
            }
            s => {
                if query.is_empty() { query = s.to_string(); }
                i += 1; continue;
            }
        }
    }

    if query.is_empty() {
        eprintln!("Missing <query> argument");
        std::process::exit(1);
    }

    // Resolve data dir precedence: flag > RULEBOOK_DIR > workspace fixture corpus
    let data_dir = data_dir
        .or_else(|| env::var("RULEBOOK_DIR").ok().map(PathBuf::from))
        .unwrap_or_else(|| {
            let ws_root = Path::new(env!("CARGO_MANIFEST_DIR")).ancestors().nth(2).unwrap_or(Path::new("."));
            ws_root.join("test_data/rulebook")
        });

    let chapters = CorpusLoader::new(&data_dir).load_dir()?;
    let engine = RulebookSearchEngine::new();
    let topics = engine.build(&chapters);

    println!("Rulebook search\n===============");
    println!("Corpus: {} ({} topics)", data_dir.display(), topics);
    println!("Query : {} (limit {})\n", query, limit);

    for (i, r) in engine.search(&query, &context, limit)?.iter().enumerate() {
        println!("{:>2}. score={:.3} topic={} chapter={} flags=phrase:{} topic:{} chapter:{}",
            i + 1, r.score, r.topic.topic_title, r.topic.chapter_title, r.phrase_match, r.topic_match, r.chapter_match);
    }
    Ok(())
}
