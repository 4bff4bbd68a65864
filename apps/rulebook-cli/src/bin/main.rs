use std::env;

use rulebook_cli::{init_tracing, open_engine, print_results};
use rulebook_core::types::SearchContext;

fn parse_args() -> (String, Vec<String>) {
    let mut args: Vec<String> = env::args().collect();
    let prog = args.remove(0);
    if args.is_empty() {
        eprintln!("Usage: {} <index|query> [args...]", prog);
        eprintln!("  {} index", prog);
        eprintln!("  {} query \"<query>\" [--chapter ID] [--limit N] [--json]", prog);
        std::process::exit(1);
    }
    let cmd = args.remove(0);
    (cmd, args)
}

fn main() -> anyhow::Result<()> {
    init_tracing();
    let (cmd, args) = parse_args();
    match cmd.as_str() {
        "index" => {
            let (engine, chapters) = open_engine()?;
            let index = engine.current()?;
            println!("Rulebook index\n==============");
            for chapter in &chapters {
                let topics = index.topics().iter().filter(|t| t.chapter_id == chapter.source).count();
                println!("  {:<32} {:>4} topics  ({})", chapter.title, topics, chapter.source);
            }
            println!("\n✅ Indexed {} topics from {} chapters", index.len(), chapters.len());
        }
        "query" => {
            let mut query = String::new();
            let mut context = SearchContext::default();
            let mut limit: Option<usize> = None;
            let mut as_json = false;
            let mut i = 0;
            while i < args.len() {
                match args[i].as_str() {
                    "--chapter" => {
                        if i + 1 >= args.len() { eprintln!("--chapter requires an id"); std::process::exit(2); }
                        context = SearchContext::in_chapter(args[i + 1].clone());
                        i += 2; continue;
                    }
                    "--limit" => {
                        if i + 1 >= args.len() { eprintln!("--limit requires a number"); std::process::exit(2); }
                        match args[i + 1].parse() {
                            Ok(n) => limit = Some(n),
                            Err(_) => { eprintln!("--limit requires a number"); std::process::exit(2); }
                        }
                        i += 2; continue;
                    }
                    "--json" => { as_json = true; i += 1; continue; }
                    s if s.starts_with("--") => {
                        eprintln!("Unknown flag: {}", s); std::process::exit(2);
                    }
                    s => {
                        if query.is_empty() { query = s.to_string(); }
                        i += 1; continue;
                    }
                }
            }
            if query.is_empty() {
                eprintln!("Usage: rulebook query \"<query>\" [--chapter ID] [--limit N] [--json]");
                std::process::exit(1);
            }

            let (engine, _) = open_engine()?;
            let results = match limit {
                Some(n) => engine.search(&query, &context, n)?,
                None => engine.search_default(&query, &context)?,
            };
            if as_json {
                println!("{}", serde_json::to_string_pretty(&results)?);
            } else {
                print_results(&query, &results);
            }
        }
        _ => { eprintln!("Unknown command: {}", cmd); std::process::exit(1); }
    }
    Ok(())
}
