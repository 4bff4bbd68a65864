use std::io::{self, BufRead, Write};

use rulebook_cli::{init_tracing, open_engine, print_results};
use rulebook_core::types::SearchContext;

/// Line-oriented search loop over the loaded rulebook.
fn main() -> anyhow::Result<()> {
    init_tracing();
    println!("🔍 Rulebook search");
    println!("==================");

    let (engine, chapters) = open_engine()?;
    println!("✅ {} topics from {} chapters", engine.topic_count()?, chapters.len());
    println!("Type a query, `:chapter <id>` to set the chapter you are reading, `:chapter` to clear it, `:quit` to exit.\n");

    let mut context = SearchContext::default();
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    loop {
        match &context.current_chapter_id {
            Some(id) => print!("[{}] > ", id),
            None => print!("> "),
        }
        stdout.flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let line = line.trim();
        match line {
            "" => continue,
            ":quit" | ":q" => break,
            ":chapter" => context = SearchContext::default(),
            _ if line.starts_with(":chapter ") => {
                let id = line[":chapter ".len()..].trim();
                if !chapters.iter().any(|c| c.source == id) {
                    println!("Unknown chapter {}; known: {}", id, chapters.iter().map(|c| c.source.as_str()).collect::<Vec<_>>().join(", "));
                    continue;
                }
                context = SearchContext::in_chapter(id);
            }
            query => {
                let results = engine.search_default(query, &context)?;
                print_results(query, &results);
                println!();
            }
        }
    }
    Ok(())
}
