//! Shared setup for the rulebook command-line tools.

use std::path::Path;

use tracing::info;
use tracing_subscriber::EnvFilter;

use rulebook_core::config::{resolve_with_base, Config, Settings};
use rulebook_core::corpus::CorpusLoader;
use rulebook_core::types::{ChapterDocument, QueryResult};
use rulebook_text::RulebookSearchEngine;

/// Log to stderr, filtered by `RUST_LOG` (default `warn`).
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
}

/// Chapters from the configured manifest, or every JSON file in the chapter directory.
pub fn load_chapters(settings: &Settings) -> anyhow::Result<Vec<ChapterDocument>> {
    let dir = resolve_with_base(Path::new("."), &settings.data.chapters_dir);
    let loader = CorpusLoader::new(dir);
    let chapters = if settings.chapters.is_empty() {
        loader.load_dir()?
    } else {
        loader.load_manifest(&settings.chapters)?
    };
    info!(chapters = chapters.len(), dir = %loader.dir().display(), "corpus loaded");
    Ok(chapters)
}

/// Load config and corpus, and return a built engine.
pub fn open_engine() -> anyhow::Result<(RulebookSearchEngine, Vec<ChapterDocument>)> {
    let config = Config::load().map_err(|e| {
        eprintln!("Error loading config: {}", e);
        e
    })?;
    let settings = config.settings()?;
    let chapters = load_chapters(&settings)?;
    let engine = RulebookSearchEngine::new().with_default_limit(settings.search.default_limit);
    engine.build(&chapters);
    Ok((engine, chapters))
}

pub fn print_results(query: &str, results: &[QueryResult]) {
    if results.is_empty() {
        println!("No results for \"{}\"", query);
        return;
    }
    println!("{} results for \"{}\"", results.len(), query);
    for (i, r) in results.iter().enumerate() {
        println!(
            "{:>2}. score={:.3}  {}  ({})\n    chapter={} topic={}",
            i + 1,
            r.score,
            r.topic.topic_title,
            r.topic.chapter_title,
            r.topic.chapter_id,
            r.topic.topic_id
        );
    }
}
