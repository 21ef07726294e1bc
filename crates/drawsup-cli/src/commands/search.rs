//! Search command handler

use anyhow::{bail, Context, Result};

use drawsup_core::Annotations;

use crate::output::Output;

/// Search annotations and print the matches
///
/// `regions` restricts the search; when empty, the configured regions are
/// searched.
pub fn run(
    annotations: &Annotations,
    query: String,
    regions: Vec<String>,
    configured: &[String],
    open_first: bool,
    output: &Output,
) -> Result<()> {
    if query.is_empty() {
        bail!("Search query cannot be empty");
    }

    let enabled = if regions.is_empty() {
        configured.to_vec()
    } else {
        regions
    };

    let results = annotations
        .search(&query, enabled)
        .context("Failed to search annotations")?;

    output.print_search_results(&results);

    if open_first {
        if let Some(first) = results.first() {
            open::that(&first.target)
                .with_context(|| format!("Failed to open {}", first.target.display()))?;
        }
    }

    Ok(())
}
