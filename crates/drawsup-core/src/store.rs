//! Annotation store
//!
//! The `AnnotationStore` maps target identities to region maps inside one
//! flat backing file. Nothing is cached: every call opens and scans the file,
//! and every write rewrites it completely.
//!
//! ## Rewrite protocol
//!
//! `write` copies the preamble and every record that does not match the
//! identity back out unchanged, line for line. The first matching record is
//! replaced in place by the new header and body; later matching records are
//! dropped. When nothing matched, the new record is appended at the end.
//!
//! ## Usage
//!
//! ```ignore
//! let store = AnnotationStore::open(&config);
//! let identity = Identity::resolve(&image, &root)?;
//!
//! let mut regions = store.read(&identity)?;
//! regions.insert("Memo".into(), "check the hands".into());
//! store.write(&identity, &regions)?;
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::codec;
use crate::config::Config;
use crate::identity::Identity;
use crate::models::{Record, RegionMap, StoreStats};
use crate::storage::records::{Segment, Segments};
use crate::storage::{atomic_write, open_lines, StoreError, StoreResult};

/// What `write` did with the record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    /// An existing record was replaced in place
    Replaced,
    /// No record matched; the new one was appended
    Appended,
}

/// File-backed collection of annotation records
#[derive(Debug, Clone)]
pub struct AnnotationStore {
    path: PathBuf,
}

impl AnnotationStore {
    /// Create a store backed by the file at `path`
    ///
    /// The file does not need to exist yet.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Create a store at the configured location
    pub fn open(config: &Config) -> Self {
        Self::new(config.store_path())
    }

    /// Path of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Check if the backing file exists
    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Read the regions stored for `identity`
    ///
    /// Returns the first matching record. A missing backing file or no match
    /// yields an empty map.
    pub fn read(&self, identity: &Identity) -> StoreResult<RegionMap> {
        let Some(segments) = self.segments()? else {
            debug!(path = ?self.path, "Store file does not exist yet");
            return Ok(RegionMap::new());
        };

        for segment in segments {
            let segment = segment?;
            if let Some((stored, _)) = &segment.head {
                if stored.matches(identity) {
                    debug!(path = %stored.path, "Found annotation record");
                    return Ok(segment.regions());
                }
            }
        }

        Ok(RegionMap::new())
    }

    /// Check if any record matches `identity`
    pub fn contains(&self, identity: &Identity) -> StoreResult<bool> {
        for record in self.records()? {
            if record?.identity.matches(identity) {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Store `regions` as the complete annotation for `identity`
    ///
    /// Replaces the matching record in place, or appends a new one. The
    /// region map is validated before the backing file is touched.
    pub fn write(&self, identity: &Identity, regions: &RegionMap) -> StoreResult<WriteOutcome> {
        identity.check_representable()?;
        let body = codec::encode_lines(regions)?;

        let mut out = Vec::new();
        let mut written = false;

        if let Some(segments) = self.segments()? {
            for segment in segments {
                let segment = segment?;
                match &segment.head {
                    Some((stored, _)) if stored.matches(identity) => {
                        if written {
                            warn!(path = %stored.path, "Dropping duplicate annotation record");
                        } else {
                            push_record(&mut out, identity, &body);
                            written = true;
                        }
                    }
                    _ => copy_segment(&mut out, &segment),
                }
            }
        }

        let outcome = if written {
            WriteOutcome::Replaced
        } else {
            push_record(&mut out, identity, &body);
            WriteOutcome::Appended
        };

        atomic_write(&self.path, &out)?;
        debug!(path = %identity.path, ?outcome, "Wrote annotation record");

        Ok(outcome)
    }

    /// Iterate over every record in file order
    ///
    /// The iterator streams the file; it yields nothing when the file does
    /// not exist. Each call starts a fresh scan.
    pub fn records(&self) -> StoreResult<Records> {
        Ok(Records {
            segments: self.segments()?,
        })
    }

    /// Record count and file size
    pub fn stats(&self) -> StoreResult<StoreStats> {
        let size_bytes = match fs::metadata(&self.path) {
            Ok(metadata) => metadata.len(),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(StoreStats::default()),
            Err(e) => return Err(StoreError::from_read(e, self.path.clone())),
        };

        let mut records = 0;
        for record in self.records()? {
            record?;
            records += 1;
        }

        Ok(StoreStats {
            records,
            size_bytes,
        })
    }

    fn segments(&self) -> StoreResult<Option<Segments>> {
        Ok(open_lines(&self.path)?.map(Segments::new))
    }
}

/// Lazy iterator over the records of a store
pub struct Records {
    segments: Option<Segments>,
}

impl Iterator for Records {
    type Item = StoreResult<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        let segments = self.segments.as_mut()?;
        loop {
            match segments.next()? {
                Err(e) => return Some(Err(e)),
                Ok(Segment { head: None, .. }) => continue,
                Ok(segment) => {
                    let regions = segment.regions();
                    let identity = segment.head.map(|(identity, _)| identity)?;
                    return Some(Ok(Record { identity, regions }));
                }
            }
        }
    }
}

fn push_line(out: &mut Vec<u8>, line: &[u8]) {
    out.extend_from_slice(line);
    out.push(b'\n');
}

fn push_record(out: &mut Vec<u8>, identity: &Identity, body: &[String]) {
    push_line(out, identity.header().as_bytes());
    for line in body {
        push_line(out, line.as_bytes());
    }
}

fn copy_segment(out: &mut Vec<u8>, segment: &Segment) {
    if let Some((_, header)) = &segment.head {
        push_line(out, header);
    }
    for line in &segment.body {
        push_line(out, line);
    }
}
