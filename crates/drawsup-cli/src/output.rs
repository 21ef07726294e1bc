//! Output formatting for CLI
//!
//! Provides consistent output formatting across all commands:
//! - Human-readable default output
//! - JSON output (--json flag)
//! - Quiet mode for scripting (--quiet flag)

use std::path::Path;

use drawsup_core::{Identity, ImageLink, RegionMap, SearchResult, StoreStats, DATE_REGION};

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable output (default)
    Human,
    /// JSON output
    Json,
    /// Quiet mode - minimal output
    Quiet,
}

impl OutputFormat {
    /// Create format from CLI flags
    pub fn from_flags(json: bool, quiet: bool) -> Self {
        if quiet {
            OutputFormat::Quiet
        } else if json {
            OutputFormat::Json
        } else {
            OutputFormat::Human
        }
    }
}

/// Store summary shown by `status`
pub struct StatusReport<'a> {
    pub store_path: &'a Path,
    pub root: &'a Path,
    pub stats: StoreStats,
    pub orphans: Vec<Identity>,
}

/// Output helper for consistent formatting
pub struct Output {
    /// The output format
    pub format: OutputFormat,
}

impl Output {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Print the annotation of one image
    ///
    /// Configured regions are always listed, followed by any other stored
    /// region.
    pub fn print_annotation(
        &self,
        image: &Path,
        regions: &RegionMap,
        date: &str,
        configured: &[String],
    ) {
        match self.format {
            OutputFormat::Human => {
                println!("Image: {}", image.display());
                println!("Date:  {}", date);
                for (name, text) in display_regions(regions, configured) {
                    println!();
                    println!("── {} ──", name);
                    if !text.is_empty() {
                        println!("{}", text);
                    }
                }
            }
            OutputFormat::Json => {
                let body: RegionMap = regions
                    .iter()
                    .filter(|(name, _)| name.as_str() != DATE_REGION)
                    .map(|(name, text)| (name.clone(), text.clone()))
                    .collect();
                println!(
                    "{}",
                    serde_json::json!({
                        "image": image,
                        "date": date,
                        "regions": body
                    })
                );
            }
            OutputFormat::Quiet => {
                for (name, text) in display_regions(regions, configured) {
                    if !text.is_empty() {
                        println!("{}: {}", name, text.replace('\n', " "));
                    }
                }
            }
        }
    }

    /// Print search results
    pub fn print_search_results(&self, results: &[SearchResult]) {
        match self.format {
            OutputFormat::Human => {
                if results.is_empty() {
                    println!("No matches found.");
                    return;
                }
                for result in results {
                    println!("{}", result.to_string().replace('\n', " "));
                }
                println!("\n{} match(es)", results.len());
            }
            OutputFormat::Json => match serde_json::to_string_pretty(results) {
                Ok(json) => println!("{}", json),
                Err(e) => eprintln!("Failed to serialize results: {}", e),
            },
            OutputFormat::Quiet => {
                for result in results {
                    println!("{}", result.target.display());
                }
            }
        }
    }

    /// Print resolved image links
    pub fn print_links(&self, links: &[ImageLink]) {
        match self.format {
            OutputFormat::Human => {
                if links.is_empty() {
                    println!("No links.");
                    return;
                }
                for link in links {
                    if link.targets.is_empty() {
                        println!(">>{}  (not found)", link.name);
                    }
                    for target in &link.targets {
                        println!(">>{}  {}", link.name, target.display());
                    }
                }
            }
            OutputFormat::Json => match serde_json::to_string_pretty(links) {
                Ok(json) => println!("{}", json),
                Err(e) => eprintln!("Failed to serialize links: {}", e),
            },
            OutputFormat::Quiet => {
                for target in links.iter().flat_map(|link| &link.targets) {
                    println!("{}", target.display());
                }
            }
        }
    }

    /// Print store status
    pub fn print_status(&self, report: &StatusReport<'_>) {
        match self.format {
            OutputFormat::Json => {
                let orphans: Vec<&str> = report.orphans.iter().map(|o| o.path.as_str()).collect();
                println!(
                    "{}",
                    serde_json::json!({
                        "store": report.store_path,
                        "root": report.root,
                        "records": report.stats.records,
                        "size_bytes": report.stats.size_bytes,
                        "orphans": orphans
                    })
                );
            }
            OutputFormat::Quiet => {
                println!("{}", report.stats.records);
            }
            OutputFormat::Human => {
                println!("Drawing Supporter Status");
                println!("========================");
                println!();
                println!("Store:");
                println!("  Location: {}", report.store_path.display());
                println!("  Size:     {}", human_size(report.stats.size_bytes));
                println!("  Root:     {}", report.root.display());
                println!();
                println!("Contents:");
                println!("  Annotated images: {}", report.stats.records);
                println!("  Orphaned records: {}", report.orphans.len());
                for orphan in &report.orphans {
                    println!("    {}", orphan.path);
                }
            }
        }
    }

    /// Print a success message
    pub fn success(&self, message: &str) {
        match self.format {
            OutputFormat::Human => println!("✓ {}", message),
            OutputFormat::Json => {
                println!(
                    "{}",
                    serde_json::json!({"status": "success", "message": message})
                );
            }
            OutputFormat::Quiet => {}
        }
    }

    /// Print an informational message
    pub fn message(&self, msg: &str) {
        match self.format {
            OutputFormat::Human => println!("{}", msg),
            OutputFormat::Json => {
                println!("{}", serde_json::json!({"message": msg}));
            }
            OutputFormat::Quiet => {}
        }
    }
}

/// Regions in display order: configured ones first, then the rest
fn display_regions<'a>(regions: &'a RegionMap, configured: &'a [String]) -> Vec<(&'a str, &'a str)> {
    let mut shown: Vec<(&str, &str)> = configured
        .iter()
        .map(|name| {
            let text = regions.get(name).map(String::as_str).unwrap_or("");
            (name.as_str(), text)
        })
        .collect();

    for (name, text) in regions {
        if name != DATE_REGION && !configured.contains(name) {
            shown.push((name.as_str(), text.as_str()));
        }
    }

    shown
}

/// Format a byte count for humans
fn human_size(bytes: u64) -> String {
    const KIB: u64 = 1024;
    const MIB: u64 = KIB * 1024;

    if bytes >= MIB {
        format!("{:.1} MiB", bytes as f64 / MIB as f64)
    } else if bytes >= KIB {
        format!("{:.1} KiB", bytes as f64 / KIB as f64)
    } else {
        format!("{} B", bytes)
    }
}
