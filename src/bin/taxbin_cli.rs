use indicatif::{ProgressBar, ProgressStyle};
use std::process;

use taxbin_rs::{load_taxonomy, CategoryRoots, FlatNameTable, TaxId};

fn spinner(color: &str, message: &str) -> ProgressBar {
    let bar = ProgressBar::new_spinner();
    bar.set_style(
        ProgressStyle::default_spinner()
            .tick_strings(&[
                "⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏",
            ])
            .template(&format!("{{spinner:.{color}}} {{msg}}"))
            .expect("Invalid spinner template"),
    );
    bar.set_message(message.to_string());
    bar
}

fn parse_taxid_list(arg: &str) -> Vec<TaxId> {
    arg.split(',')
        .filter(|s| !s.trim().is_empty())
        .map(|s| {
            s.trim()
                .parse::<TaxId>()
                .unwrap_or_else(|_| {
                    eprintln!("Invalid taxid in list: {s:?}");
                    process::exit(2);
                })
        })
        .collect()
}

fn main() {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();
    if args.len() != 5 {
        eprintln!(
            "Usage: {} <nodes file> <names file> <host roots csv> <microbe roots csv>",
            args[0]
        );
        process::exit(2);
    }
    let nodes_path = &args[1];
    let names_path = &args[2];
    let roots = CategoryRoots::new(parse_taxid_list(&args[3]), parse_taxid_list(&args[4]));

    // 1. Load the node table and build tree + category map
    let bar = spinner("blue", "Loading taxonomy node table...");
    let taxonomy = load_taxonomy(nodes_path, &roots).unwrap_or_else(|e| {
        bar.finish_and_clear();
        eprintln!("Failed to load taxonomy: {e}");
        process::exit(1);
    });
    bar.finish_with_message(format!(
        "Loaded {} taxa (root={}).",
        taxonomy.tree.len(),
        taxonomy.tree.root()
    ));

    // 2. Load the name table
    let bar = spinner("green", "Loading name table...");
    let names = FlatNameTable::from_path(names_path).unwrap_or_else(|e| {
        bar.finish_and_clear();
        eprintln!("Failed to load name table: {e}");
        process::exit(1);
    });
    bar.finish_with_message(format!("Loaded names for {} taxa.", names.len()));

    // 3. Summarize the classification
    let bar = spinner("yellow", "Summarizing categories...");
    let (host, microbe, unassigned) = taxonomy.categories.counts();
    bar.finish_with_message("Category summary ready.");

    println!("host taxa:       {host}");
    println!("microbe taxa:    {microbe}");
    println!("unassigned taxa: {unassigned}");

    for &root in roots.host.iter().chain(roots.microbe.iter()) {
        let lineage = taxonomy.tree.lineage(root, &names);
        if lineage.is_empty() {
            println!("lineage of {root}: (no resolvable names)");
        } else {
            println!("lineage of {root}: {}", lineage.join(" > "));
        }
    }
}
