use dictfile::{Dictionary, EntryListKind, EntryRef};
use std::env;
use std::fs::File;

fn main() {
    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        eprintln!("Usage: {} <path-to-dictionary-file> [--token <TOKEN>]", args[0]);
        std::process::exit(1);
    }

    let path = &args[1];
    let mut token: Option<&str> = None;
    // Parse --token argument
    if let Some(token_idx) = args.iter().position(|arg| arg == "--token") {
        match args.get(token_idx + 1) {
            Some(t) => token = Some(t),
            None => {
                eprintln!("ERROR: --token flag requires an argument.");
                std::process::exit(1);
            }
        }
    }

    println!("Reading dictionary file: {}", path);
    println!("{}", "=".repeat(60));

    let file = match File::open(path) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("ERROR: Failed to open {}: {}", path, e);
            std::process::exit(1);
        }
    };

    match Dictionary::open(file) {
        Ok(dict) => {
            println!("\nDictionary Information:");
            println!("  Info: {}", dict.info);
            println!("  Format version: {}", dict.version);
            println!("  Created (epoch millis): {}", dict.created_millis);

            println!("\nSources:");
            for source in dict.sources.iter() {
                println!("  {} ({} entries)", source.name, source.entry_count);
            }

            println!("\nStatistics:");
            println!("  Pair entries: {}", dict.pair_entries.len());
            println!("  Text entries: {}", dict.text_entries.len());
            println!("  Indices: {}", dict.indices.len());

            println!("\nIndices:");
            for result in dict.indices.iter() {
                match result {
                    Ok(index) => {
                        println!(
                            "  {} ({}): {} tokens",
                            index.short_name,
                            index.long_name,
                            index.token_count()
                        );
                    }
                    Err(e) => {
                        eprintln!("ERROR: Failed to read index: {}", e);
                        std::process::exit(1);
                    }
                }
            }

            if let Some(token) = token {
                println!("\nLookup: {:?}", token);
                lookup_token(&dict, token);
            }
        }
        Err(e) => {
            eprintln!("\nERROR: Failed to read dictionary file");
            eprintln!("  {}", e);
            std::process::exit(1);
        }
    }
}

fn lookup_token(dict: &Dictionary<File>, token: &str) {
    let mut found = false;
    for result in dict.indices.iter() {
        let index = match result {
            Ok(index) => index,
            Err(e) => {
                eprintln!("ERROR: Failed to read index: {}", e);
                std::process::exit(1);
            }
        };
        for entry_ref in index.lookup(token) {
            found = true;
            match render_entry(dict, entry_ref) {
                Ok(text) => println!("  [{}] {}", index.short_name, text),
                Err(e) => {
                    eprintln!("ERROR: Failed to read entry: {}", e);
                    std::process::exit(1);
                }
            }
        }
    }
    if !found {
        println!("  (no matches)");
    }
}

fn render_entry(dict: &Dictionary<File>, entry_ref: &EntryRef) -> dictfile::Result<String> {
    let position = entry_ref.position as usize;
    match entry_ref.kind {
        EntryListKind::Pair => {
            let entry = dict.pair_entries.get(position)?;
            let rendered: Vec<String> = entry
                .pairs
                .iter()
                .map(|pair| format!("{} <-> {}", pair.lang1, pair.lang2))
                .collect();
            Ok(rendered.join("; "))
        }
        EntryListKind::Text => {
            let entry = dict.text_entries.get(position)?;
            Ok(entry.text)
        }
    }
}
