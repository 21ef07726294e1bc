//! Status command handler

use anyhow::{Context, Result};

use drawsup_core::Annotations;

use crate::output::{Output, StatusReport};

/// Show store statistics and orphaned records
pub fn show(annotations: &Annotations, output: &Output) -> Result<()> {
    let store = annotations.store();
    let stats = store.stats().context("Failed to read annotation store")?;
    let orphans = annotations
        .orphans()
        .context("Failed to check annotated images")?;

    output.print_status(&StatusReport {
        store_path: store.path(),
        root: annotations.root(),
        stats,
        orphans,
    });

    Ok(())
}
