//! Target file identity
//!
//! A record is keyed by the image's path relative to the annotation root and
//! the SHA-256 of its bytes. A lookup matches a record when EITHER the path or
//! the hash matches, so annotations follow a file that was moved or renamed
//! without being edited.
//!
//! Paths are written with `/` separators and no `./` prefix. Older stores
//! wrote `.\dir\image.png`; those entries are normalized when compared.

use std::fs::{self, File};
use std::io::{self, BufReader};
use std::path::{Component, Path, PathBuf};

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::codec::CodecError;
use crate::storage::error::{StoreError, StoreResult};

/// File extensions the annotator accepts
const IMAGE_EXTENSIONS: [&str; 5] = ["JPG", "png", "jpeg", "jpg", "gif"];

/// Identity of a target file: relative path plus content hash
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Identity {
    /// Path relative to the annotation root, as stored
    pub path: String,
    /// Lowercase hex SHA-256 of the file contents
    pub hash: String,
}

impl Identity {
    pub fn new(path: impl Into<String>, hash: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            hash: hash.into(),
        }
    }

    /// Compute the identity of `file` under `root`
    ///
    /// Fails with `NotFound` when the file does not exist; callers must not
    /// touch the store in that case.
    pub fn resolve(file: &Path, root: &Path) -> StoreResult<Self> {
        let metadata =
            fs::metadata(file).map_err(|e| StoreError::from_read(e, file.to_path_buf()))?;
        if !metadata.is_file() {
            return Err(StoreError::NotAFile {
                path: file.to_path_buf(),
            });
        }

        Ok(Self {
            path: relative_path(file, root)?,
            hash: hash_file(file)?,
        })
    }

    /// Header line introducing this identity's record
    pub fn header(&self) -> String {
        format!("[{},{}]", self.path, self.hash)
    }

    /// Whether this identity refers to the same target as `other`
    pub fn matches(&self, other: &Identity) -> bool {
        self.hash == other.hash || normalize_path(&self.path) == normalize_path(&other.path)
    }

    /// Stored path in canonical form (`/` separators, no `./`)
    pub fn normalized_path(&self) -> String {
        normalize_path(&self.path)
    }

    /// Resolve the stored path back to a file under `root`
    pub fn target(&self, root: &Path) -> PathBuf {
        let normalized = self.normalized_path();
        normalized
            .split('/')
            .filter(|part| !part.is_empty())
            .fold(root.to_path_buf(), |acc, part| acc.join(part))
    }

    /// Check that the header for this identity will parse back
    pub fn check_representable(&self) -> Result<(), CodecError> {
        let reason = if self.path.contains(',') {
            "path contains ','"
        } else if self.path.contains(']') {
            "path contains ']'"
        } else if self.path.contains('\n') {
            "path contains a line break"
        } else if self.hash.contains(',') || self.hash.contains(']') {
            "hash contains a delimiter"
        } else {
            return Ok(());
        };

        Err(CodecError::UnrepresentablePath {
            path: self.path.clone(),
            reason,
        })
    }
}

/// SHA-256 of `data` as 64 lowercase hex characters
pub fn compute_hash(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

/// SHA-256 of a file's contents, streamed from disk
pub fn hash_file(file: &Path) -> StoreResult<String> {
    let mut reader = BufReader::new(
        File::open(file).map_err(|e| StoreError::from_read(e, file.to_path_buf()))?,
    );
    let mut hasher = Sha256::new();
    io::copy(&mut reader, &mut hasher).map_err(|e| StoreError::from_read(e, file.to_path_buf()))?;
    Ok(hex::encode(hasher.finalize()))
}

/// Path of `file` relative to `root`, joined with `/`
///
/// Both paths are canonicalized first, so symlinks and `..` are resolved.
pub fn relative_path(file: &Path, root: &Path) -> StoreResult<String> {
    let file_abs = file
        .canonicalize()
        .map_err(|e| StoreError::from_read(e, file.to_path_buf()))?;
    let root_abs = root
        .canonicalize()
        .map_err(|e| StoreError::from_read(e, root.to_path_buf()))?;

    let relative = file_abs
        .strip_prefix(&root_abs)
        .map_err(|_| StoreError::OutsideRoot {
            path: file_abs.clone(),
            root: root_abs.clone(),
        })?;

    let parts: Vec<String> = relative
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect();

    Ok(parts.join("/"))
}

/// Canonical form of a stored path
///
/// Accepts both `\` and `/` separators and drops any leading `./`.
pub fn normalize_path(stored: &str) -> String {
    let unified = stored.replace('\\', "/");
    let mut rest = unified.as_str();
    while let Some(stripped) = rest.strip_prefix("./") {
        rest = stripped;
    }
    rest.to_string()
}

/// Parse a record header line
///
/// A header starts with `[`, contains `]`, and the text between the first `[`
/// and the first `]` splits on `,` into exactly two fields.
pub fn parse_header(line: &str) -> Option<Identity> {
    let inner = line.strip_prefix('[')?;
    let close = inner.find(']')?;
    let mut fields = inner[..close].split(',');

    let path = fields.next()?;
    let hash = fields.next()?;
    if fields.next().is_some() {
        return None;
    }

    Some(Identity::new(path, hash))
}

/// Whether a line was probably meant as a header
pub fn looks_like_header(line: &str) -> bool {
    line.starts_with('[')
}

/// Whether the file has an image extension the annotator accepts
pub fn is_image(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| IMAGE_EXTENSIONS.contains(&ext))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const EMPTY_SHA256: &str = "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855";

    #[test]
    fn test_compute_hash() {
        assert_eq!(compute_hash(b""), EMPTY_SHA256);

        let hash = compute_hash(b"abc");
        assert_eq!(hash.len(), 64);
        assert_eq!(
            hash,
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_hash_file_matches_in_memory_hash() {
        let root = TempDir::new().unwrap();
        let file = root.path().join("big.png");
        // larger than one read buffer
        let data: Vec<u8> = (0..200_000u32).map(|i| (i % 251) as u8).collect();
        std::fs::write(&file, &data).unwrap();

        assert_eq!(hash_file(&file).unwrap(), compute_hash(&data));

        let err = hash_file(&root.path().join("missing.png")).unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }));
    }

    #[test]
    fn test_resolve_nested_file() {
        let root = TempDir::new().unwrap();
        std::fs::create_dir_all(root.path().join("imgs").join("poses")).unwrap();
        let file = root.path().join("imgs").join("poses").join("a.png");
        std::fs::write(&file, b"abc").unwrap();

        let identity = Identity::resolve(&file, root.path()).unwrap();
        assert_eq!(identity.path, "imgs/poses/a.png");
        assert_eq!(identity.hash, compute_hash(b"abc"));
    }

    #[test]
    fn test_resolve_missing_file() {
        let root = TempDir::new().unwrap();
        let err = Identity::resolve(&root.path().join("nope.png"), root.path()).unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }));
    }

    #[test]
    fn test_resolve_directory() {
        let root = TempDir::new().unwrap();
        std::fs::create_dir(root.path().join("dir.png")).unwrap();

        let err = Identity::resolve(&root.path().join("dir.png"), root.path()).unwrap_err();
        assert!(matches!(err, StoreError::NotAFile { .. }));
    }

    #[test]
    fn test_resolve_outside_root() {
        let root = TempDir::new().unwrap();
        let other = TempDir::new().unwrap();
        let file = other.path().join("a.png");
        std::fs::write(&file, b"abc").unwrap();

        let err = Identity::resolve(&file, root.path()).unwrap_err();
        assert!(matches!(err, StoreError::OutsideRoot { .. }));
    }

    #[test]
    fn test_header_round_trip() {
        let identity = Identity::new("imgs/a.png", EMPTY_SHA256);
        let header = identity.header();
        assert_eq!(header, format!("[imgs/a.png,{}]", EMPTY_SHA256));
        assert_eq!(parse_header(&header), Some(identity));
    }

    #[test]
    fn test_parse_header_rejects_malformed() {
        assert_eq!(parse_header("imgs/a.png,abc"), None);
        assert_eq!(parse_header("[imgs/a.png,abc"), None);
        assert_eq!(parse_header("[imgs/a.png]"), None);
        assert_eq!(parse_header("[a,b,c]"), None);
        assert_eq!(parse_header(" [a,b]"), None);
    }

    #[test]
    fn test_parse_header_ignores_trailing_text() {
        assert_eq!(parse_header("[a.png,abc] extra"), Some(Identity::new("a.png", "abc")));
    }

    #[test]
    fn test_matches_by_path_or_hash() {
        let stored = Identity::new("imgs/a.png", "hash-a");

        assert!(stored.matches(&Identity::new("imgs/a.png", "edited")));
        assert!(stored.matches(&Identity::new("renamed/b.png", "hash-a")));
        assert!(!stored.matches(&Identity::new("imgs/b.png", "hash-b")));
    }

    #[test]
    fn test_matches_legacy_backslash_path() {
        let legacy = Identity::new(".\\imgs\\a.png", "old");
        assert!(legacy.matches(&Identity::new("imgs/a.png", "new")));
        assert_eq!(legacy.normalized_path(), "imgs/a.png");
    }

    #[test]
    fn test_target_resolves_under_root() {
        let identity = Identity::new(".\\imgs\\a.png", "x");
        assert_eq!(
            identity.target(Path::new("/art")),
            Path::new("/art").join("imgs").join("a.png")
        );
    }

    #[test]
    fn test_check_representable() {
        assert!(Identity::new("imgs/a.png", "x").check_representable().is_ok());
        assert!(Identity::new("a,b.png", "x").check_representable().is_err());
        assert!(Identity::new("a].png", "x").check_representable().is_err());
    }

    #[test]
    fn test_is_image() {
        assert!(is_image(Path::new("a.png")));
        assert!(is_image(Path::new("dir/b.JPG")));
        assert!(is_image(Path::new("c.jpeg")));
        assert!(!is_image(Path::new("notes.txt")));
        assert!(!is_image(Path::new("no_extension")));
    }
}
