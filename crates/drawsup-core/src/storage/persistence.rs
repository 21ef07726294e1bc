//! Backing file access
//!
//! The store is one flat text file (`text.db` in the data directory). Reads
//! stream it line by line; writes replace it atomically (write to a temp
//! file, sync, then rename) so a crash leaves either the old or the new
//! version on disk.

use std::fs::{self, File};
use std::io::{BufRead, BufReader, Split, Write};
use std::path::{Path, PathBuf};

use super::error::{StoreError, StoreResult};

/// Raw lines of the backing file, without their `\n` terminators
///
/// Lines are kept as bytes so untouched records can be copied back
/// unchanged. A final line without a terminator is still yielded; a final
/// terminator does not produce an extra empty line.
pub struct RawLines {
    inner: Split<BufReader<File>>,
    path: PathBuf,
}

impl Iterator for RawLines {
    type Item = StoreResult<Vec<u8>>;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner
            .next()
            .map(|line| line.map_err(|e| StoreError::from_read(e, self.path.clone())))
    }
}

/// Open the backing file for line-by-line reading
///
/// Returns `None` if the file does not exist yet.
pub fn open_lines(path: &Path) -> StoreResult<Option<RawLines>> {
    match File::open(path) {
        Ok(file) => Ok(Some(RawLines {
            inner: BufReader::new(file).split(b'\n'),
            path: path.to_path_buf(),
        })),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(StoreError::from_read(e, path.to_path_buf())),
    }
}

/// Write data to a file atomically
///
/// 1. Write to a temporary file in the same directory
/// 2. Sync the file to disk
/// 3. Rename the temp file to the target path
///
/// This ensures the target file is never left in a partially-written state.
pub fn atomic_write(path: &Path, data: &[u8]) -> StoreResult<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|e| StoreError::CreateDirectory {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }
    }

    // Same directory, so the rename stays on one filesystem
    let temp_path = path.with_extension("tmp");

    if let Err(e) = write_synced(&temp_path, data) {
        let _ = fs::remove_file(&temp_path);
        return Err(StoreError::from_write(e, temp_path));
    }

    if let Err(e) = fs::rename(&temp_path, path) {
        let _ = fs::remove_file(&temp_path);
        return Err(StoreError::AtomicWriteFailed {
            from: temp_path,
            to: path.to_path_buf(),
            source: e,
        });
    }

    Ok(())
}

fn write_synced(path: &Path, data: &[u8]) -> std::io::Result<()> {
    let mut file = File::create(path)?;
    file.write_all(data)?;
    file.sync_all()
}
