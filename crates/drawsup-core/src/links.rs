//! Links between annotated images
//!
//! A region line starting with `>>` names another image by file name without
//! extension:
//!
//! ```text
//! Memo=compare the shoulders with
//! >> pose_042
//! ```
//!
//! Names are resolved by walking the annotation root and collecting every
//! image whose stem equals the name. Several files may share a stem; all of
//! them are returned.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::debug;
use walkdir::WalkDir;

use crate::identity::is_image;
use crate::models::RegionMap;

/// Marker that starts a link line
pub const LINK_PREFIX: &str = ">>";

/// A `>>name` link and the images it resolves to
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImageLink {
    pub name: String,
    /// Matching images under the root, empty when nothing matched
    pub targets: Vec<PathBuf>,
}

/// Link names in region order, then line order, without repeats
pub fn link_names(regions: &RegionMap) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();

    for text in regions.values() {
        for line in text.lines() {
            let Some(rest) = line.strip_prefix(LINK_PREFIX) else {
                continue;
            };
            let name = rest.trim();
            if !name.is_empty() && !names.iter().any(|n| n == name) {
                names.push(name.to_string());
            }
        }
    }

    names
}

/// Resolve `names` to images under `root` in one walk
///
/// Every name gets an entry; targets are sorted by path.
pub fn find_images(root: &Path, names: &[String]) -> BTreeMap<String, Vec<PathBuf>> {
    let mut found: BTreeMap<String, Vec<PathBuf>> =
        names.iter().map(|name| (name.clone(), Vec::new())).collect();
    if found.is_empty() {
        return found;
    }

    for entry in WalkDir::new(root).follow_links(false).sort_by_file_name() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                debug!(error = %e, "Skipping unreadable entry");
                continue;
            }
        };
        if !entry.file_type().is_file() || !is_image(entry.path()) {
            continue;
        }

        let Some(stem) = entry.path().file_stem().and_then(|s| s.to_str()) else {
            continue;
        };
        if let Some(targets) = found.get_mut(stem) {
            targets.push(entry.into_path());
        }
    }

    for targets in found.values_mut() {
        targets.sort();
    }
    found
}

/// Links found in `regions`, resolved under `root`
pub fn resolve_links(regions: &RegionMap, root: &Path) -> Vec<ImageLink> {
    let names = link_names(regions);
    let mut found = find_images(root, &names);

    names
        .into_iter()
        .map(|name| ImageLink {
            targets: found.remove(&name).unwrap_or_default(),
            name,
        })
        .collect()
}
