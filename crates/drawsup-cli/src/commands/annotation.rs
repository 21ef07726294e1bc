//! Annotation command handlers
//!
//! `show` prints the regions of an image; `set` replaces one region and
//! saves the full map back.

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::Local;

use drawsup_core::models::{creation_date, format_date};
use drawsup_core::{Annotations, SaveOutcome, WriteOutcome, DATE_REGION};

use crate::editor::edit_region;
use crate::output::Output;

/// Show the annotation of an image
pub fn show(
    annotations: &Annotations,
    image: PathBuf,
    configured: &[String],
    output: &Output,
) -> Result<()> {
    let regions = annotations
        .open(&image)
        .with_context(|| format!("Failed to open annotations for {}", image.display()))?;

    let date = creation_date(&regions, Local::now().date_naive());
    output.print_annotation(&image, &regions, &date, configured);
    Ok(())
}

/// Replace one region of an image's annotation
///
/// Without `text` the current region text is opened in the editor.
pub fn set(
    annotations: &Annotations,
    image: PathBuf,
    region: String,
    text: Option<String>,
    output: &Output,
) -> Result<()> {
    let mut regions = annotations
        .open(&image)
        .with_context(|| format!("Failed to open annotations for {}", image.display()))?;

    let text = match text {
        Some(text) => text,
        None => {
            let current = regions.get(&region).cloned().unwrap_or_default();
            edit_region(&region, &current).context("Failed to edit region")?
        }
    };

    regions.insert(region.clone(), text);
    regions
        .entry(DATE_REGION.to_string())
        .or_insert_with(|| format_date(Local::now().date_naive()));

    let outcome = annotations
        .save(&image, &regions)
        .with_context(|| format!("Failed to save annotations for {}", image.display()))?;

    match outcome {
        SaveOutcome::Written(WriteOutcome::Appended) => {
            output.success(&format!("Created annotation for {}", image.display()))
        }
        SaveOutcome::Written(WriteOutcome::Replaced) => {
            output.success(&format!("Updated {} for {}", region, image.display()))
        }
        SaveOutcome::Skipped => output.message("Nothing to save."),
    }

    Ok(())
}
