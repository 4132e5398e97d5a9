use std::{sync::Arc, time::Instant};

use serde::Serialize;
use tracing::debug;

use crate::{
    catalog::Catalog,
    cli::SearchArgs,
    component::Component,
    error::Result,
};

/// Upper bound for `--count`; `--all` lifts it.
pub const MAX_COUNT: usize = 100;

/// A page of search results, ready for output.
#[derive(Debug, Clone, Serialize)]
pub struct SearchReport {
    pub query: String,
    pub rewritten_query: String,
    /// Number of results in this report.
    pub count: usize,
    pub results: Vec<Arc<Component>>,
}

/// Run a search and cut the results down to the requested page.
pub fn execute_search(args: &SearchArgs, catalog: &Catalog) -> SearchReport {
    let start = Instant::now();
    let outcome = catalog.search(&args.query);

    let limit = if args.all {
        outcome.results.len()
    } else {
        args.count.min(MAX_COUNT)
    };
    let results: Vec<Arc<Component>> =
        outcome.results.into_iter().take(limit).collect();

    debug!("{} results ({:?})", results.len(), start.elapsed());

    SearchReport {
        query: outcome.original_query,
        rewritten_query: outcome.rewritten_query,
        count: results.len(),
        results,
    }
}

/// Format results for human-readable terminal output.
pub fn format_human(report: &SearchReport) {
    if report.results.is_empty() {
        println!("No results found.");
        return;
    }

    for (rank, c) in report.results.iter().enumerate() {
        println!(
            "{:>3}. #{:<5} {:<16} {}",
            rank + 1,
            c.id,
            c.category,
            c.value
        );
        if !c.description.is_empty() {
            println!("            {}", c.description);
        }
    }
    println!("\n{} result(s)", report.count);
}

/// Format results as JSON output.
pub fn format_json(report: &SearchReport) -> Result<()> {
    println!("{}", serde_json::to_string(report)?);
    Ok(())
}
