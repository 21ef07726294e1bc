//! Annotation access by target file
//!
//! `Annotations` is what an editor talks to: it takes image paths, resolves
//! their identities under the annotation root, and forwards to the store.
//! Search results are mapped back to files under the root so the caller can
//! navigate to them.

use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::Result;
use serde::Serialize;
use tracing::debug;

use crate::config::Config;
use crate::identity::{is_image, Identity};
use crate::links::{self, ImageLink};
use crate::models::{has_content, RegionMap};
use crate::search;
use crate::storage::{StoreError, StoreResult};
use crate::store::{AnnotationStore, WriteOutcome};

/// What `save` did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    /// The record was written
    Written(WriteOutcome),
    /// Nothing to save: no text and no existing record
    Skipped,
}

/// A search hit resolved to a file under the root
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchResult {
    /// Image the annotation belongs to
    pub target: PathBuf,
    pub identity: Identity,
    pub region: String,
    pub snippet: String,
}

impl fmt::Display for SearchResult {
    /// `name -> Region: snippet`, with the file name shown without extension
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = self
            .target
            .file_stem()
            .map(|stem| stem.to_string_lossy())
            .unwrap_or_default();
        write!(f, "{} -> {}: {}", name, self.region, self.snippet)
    }
}

/// Annotation store addressed by image file
pub struct Annotations {
    store: AnnotationStore,
    root: PathBuf,
}

impl Annotations {
    pub fn new(store: AnnotationStore, root: impl Into<PathBuf>) -> Self {
        Self {
            store,
            root: root.into(),
        }
    }

    /// Open the configured store and root
    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self::new(AnnotationStore::open(config), config.root()?))
    }

    pub fn store(&self) -> &AnnotationStore {
        &self.store
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Identity of an image under the root
    ///
    /// Fails for missing files, non-images and files outside the root.
    pub fn resolve(&self, file: &Path) -> StoreResult<Identity> {
        if !file.exists() {
            return Err(StoreError::NotFound {
                path: file.to_path_buf(),
            });
        }
        if !is_image(file) {
            return Err(StoreError::NotAnImage {
                path: file.to_path_buf(),
            });
        }
        Identity::resolve(file, &self.root)
    }

    /// Regions stored for an image (empty if it has none yet)
    pub fn open(&self, file: &Path) -> StoreResult<RegionMap> {
        let identity = self.resolve(file)?;
        self.store.read(&identity)
    }

    /// Save the complete region map for an image
    ///
    /// A first save without any text (the `Date` region does not count)
    /// creates nothing.
    pub fn save(&self, file: &Path, regions: &RegionMap) -> StoreResult<SaveOutcome> {
        let identity = self.resolve(file)?;

        if !has_content(regions) && !self.store.contains(&identity)? {
            debug!(path = %identity.path, "Nothing to save for unannotated image");
            return Ok(SaveOutcome::Skipped);
        }

        Ok(SaveOutcome::Written(self.store.write(&identity, regions)?))
    }

    /// Search the enabled regions of every annotation
    pub fn search<I, S>(&self, query: &str, enabled: I) -> StoreResult<Vec<SearchResult>>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        search::search(&self.store, query, enabled)?
            .map(|hit| {
                hit.map(|hit| SearchResult {
                    target: hit.identity.target(&self.root),
                    identity: hit.identity,
                    region: hit.region,
                    snippet: hit.snippet,
                })
            })
            .collect()
    }

    /// `>>name` links in an image's annotation, resolved under the root
    pub fn links(&self, file: &Path) -> StoreResult<Vec<ImageLink>> {
        let regions = self.open(file)?;
        Ok(links::resolve_links(&regions, &self.root))
    }

    /// Records whose image no longer exists under the root
    pub fn orphans(&self) -> StoreResult<Vec<Identity>> {
        let mut orphans = Vec::new();
        for record in self.store.records()? {
            let record = record?;
            if !record.identity.target(&self.root).is_file() {
                orphans.push(record.identity);
            }
        }
        Ok(orphans)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::compute_hash;
    use std::fs;
    use tempfile::TempDir;

    struct Fixture {
        _temp_dir: TempDir,
        root: PathBuf,
        annotations: Annotations,
    }

    fn fixture() -> Fixture {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().join("art");
        fs::create_dir_all(root.join("imgs")).unwrap();
        let store = AnnotationStore::new(temp_dir.path().join("data").join("text.db"));

        Fixture {
            annotations: Annotations::new(store, &root),
            root,
            _temp_dir: temp_dir,
        }
    }

    fn regions(pairs: &[(&str, &str)]) -> RegionMap {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn image(root: &Path, rel: &str, content: &[u8]) -> PathBuf {
        let path = root.join(rel);
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_open_unannotated_image() {
        let f = fixture();
        let file = image(&f.root, "imgs/a.png", b"pixels");
        assert!(f.annotations.open(&file).unwrap().is_empty());
    }

    #[test]
    fn test_open_missing_image() {
        let f = fixture();
        let err = f.annotations.open(&f.root.join("gone.png")).unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }));
        assert!(!f.annotations.store().exists());
    }

    #[test]
    fn test_non_image_rejected() {
        let f = fixture();
        let file = image(&f.root, "notes.txt", b"text");
        let err = f.annotations.save(&file, &regions(&[("Memo", "x")])).unwrap_err();
        assert!(matches!(err, StoreError::NotAnImage { .. }));
    }

    #[test]
    fn test_save_and_open() {
        let f = fixture();
        let file = image(&f.root, "imgs/a.png", b"pixels");
        let map = regions(&[("Exp", "hello world"), ("Date", "2017/03/11")]);

        let outcome = f.annotations.save(&file, &map).unwrap();
        assert_eq!(outcome, SaveOutcome::Written(WriteOutcome::Appended));
        assert_eq!(f.annotations.open(&file).unwrap(), map);

        let content = fs::read_to_string(f.annotations.store().path()).unwrap();
        assert!(content.starts_with(&format!("[imgs/a.png,{}]\n", compute_hash(b"pixels"))));
    }

    #[test]
    fn test_first_empty_save_is_skipped() {
        let f = fixture();
        let file = image(&f.root, "imgs/a.png", b"pixels");

        let outcome = f
            .annotations
            .save(&file, &regions(&[("Exp", ""), ("Date", "2017/03/11")]))
            .unwrap();
        assert_eq!(outcome, SaveOutcome::Skipped);
        assert!(!f.annotations.store().exists());
    }

    #[test]
    fn test_clearing_existing_annotation_is_saved() {
        let f = fixture();
        let file = image(&f.root, "imgs/a.png", b"pixels");
        f.annotations.save(&file, &regions(&[("Exp", "x")])).unwrap();

        let cleared = regions(&[("Exp", "")]);
        let outcome = f.annotations.save(&file, &cleared).unwrap();
        assert_eq!(outcome, SaveOutcome::Written(WriteOutcome::Replaced));
        assert_eq!(f.annotations.open(&file).unwrap(), cleared);
    }

    #[test]
    fn test_annotation_follows_moved_file() {
        let f = fixture();
        let file = image(&f.root, "imgs/a.png", b"pixels");
        let map = regions(&[("Memo", "gesture study")]);
        f.annotations.save(&file, &map).unwrap();

        let moved = f.root.join("moved.png");
        fs::rename(&file, &moved).unwrap();
        assert_eq!(f.annotations.open(&moved).unwrap(), map);
    }

    #[test]
    fn test_search_resolves_targets() {
        let f = fixture();
        let file = image(&f.root, "imgs/a.png", b"pixels");
        f.annotations
            .save(&file, &regions(&[("Exp", "hello world"), ("Memo", "nothing here")]))
            .unwrap();

        let results = f.annotations.search("world", ["Exp", "Memo"]).unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].target, f.root.join("imgs").join("a.png"));
        assert_eq!(results[0].region, "Exp");
        assert_eq!(results[0].snippet, "world");
        assert_eq!(results[0].to_string(), "a -> Exp: world");

        assert!(f.annotations.search("world", ["Memo"]).unwrap().is_empty());
    }

    #[test]
    fn test_links_resolve_under_root() {
        let f = fixture();
        let file = image(&f.root, "imgs/a.png", b"pixels");
        let linked = image(&f.root, "imgs/pose_01.jpg", b"pose");
        f.annotations
            .save(&file, &regions(&[("Tips", "compare with\n>> pose_01\n>>missing")]))
            .unwrap();

        let links = f.annotations.links(&file).unwrap();
        assert_eq!(links.len(), 2);
        assert_eq!(links[0].name, "pose_01");
        assert_eq!(links[0].targets, vec![linked]);
        assert_eq!(links[1].name, "missing");
        assert!(links[1].targets.is_empty());

        let other = image(&f.root, "imgs/b.png", b"other");
        assert!(f.annotations.links(&other).unwrap().is_empty());
    }

    #[test]
    fn test_orphans() {
        let f = fixture();
        let kept = image(&f.root, "imgs/a.png", b"a");
        let removed = image(&f.root, "imgs/b.png", b"b");
        f.annotations.save(&kept, &regions(&[("Exp", "a")])).unwrap();
        f.annotations.save(&removed, &regions(&[("Exp", "b")])).unwrap();

        fs::remove_file(&removed).unwrap();

        let orphans = f.annotations.orphans().unwrap();
        assert_eq!(orphans.len(), 1);
        assert_eq!(orphans[0].path, "imgs/b.png");
    }
}
