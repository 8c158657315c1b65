use std::path::PathBuf;

use history_store::HistoryStore;
use image_model::{normalize_query_text, SearchMode, SearchQuery};
use search_service::search;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args: Vec<String> = std::env::args().collect();
    if args.len() < 3 {
        eprintln!("Usage: cargo run -p search-service --example search_and_history -- <FOLDER> <KEYWORDS> [and|or]");
        std::process::exit(1);
    }
    let folder = PathBuf::from(&args[1]);
    let raw_keywords = &args[2];
    let mode = args
        .get(3)
        .and_then(|text| SearchMode::parse(text))
        .unwrap_or_default();

    let query = match SearchQuery::parse(raw_keywords, mode) {
        Some(query) => query,
        None => {
            eprintln!("no keywords left after normalization");
            std::process::exit(1);
        }
    };

    let history = HistoryStore::new(history_store::default_history_path());
    if let Err(error) = history.save(&normalize_query_text(raw_keywords)) {
        eprintln!("history not recorded: {error}");
    }

    let outcome = search(&folder, &query)?;
    println!(
        "Matches: {} (scanned {}, skipped {})",
        outcome.matches.len(),
        outcome.scanned,
        outcome.skipped.len()
    );
    for (i, record) in outcome.matches.iter().enumerate() {
        let preview: String = record.metadata.chars().take(60).collect();
        println!("{:>2}. {} {}", i + 1, record.file_name, preview);
    }
    for skip in &outcome.skipped {
        println!("    skipped {}: {}", skip.path.display(), skip.reason);
    }
    Ok(())
}
