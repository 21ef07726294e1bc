//! Links command handler

use std::path::PathBuf;

use anyhow::{Context, Result};

use drawsup_core::Annotations;

use crate::output::Output;

/// List the images an annotation links to with `>>name` lines
pub fn show(
    annotations: &Annotations,
    image: PathBuf,
    open_targets: bool,
    output: &Output,
) -> Result<()> {
    let links = annotations
        .links(&image)
        .with_context(|| format!("Failed to read links of {}", image.display()))?;

    output.print_links(&links);

    if open_targets {
        for target in links.iter().flat_map(|link| &link.targets) {
            open::that(target).with_context(|| format!("Failed to open {}", target.display()))?;
        }
    }

    Ok(())
}
