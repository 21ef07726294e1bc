//! Region text editing in an external editor
//!
//! The editor comes from $VISUAL or $EDITOR (which may carry arguments, e.g.
//! `code --wait`), falling back to the first common editor found on PATH.

use std::env;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::Command;

use anyhow::{bail, Context, Result};

const FALLBACK_EDITORS: [&str; 4] = ["nano", "vim", "vi", "notepad"];

/// Edit the text of one region
///
/// The temp file is named after the region so it can be told apart in the
/// editor. Windows line endings are converted and the newline most editors
/// append on save is dropped.
pub fn edit_region(region: &str, current: &str) -> Result<String> {
    let (program, args) = editor_command()?;

    let mut file = tempfile::Builder::new()
        .prefix(&format!("drawsup-{}-", file_safe(region)))
        .suffix(".txt")
        .tempfile()
        .context("Failed to create temp file for editing")?;
    file.write_all(current.as_bytes())
        .and_then(|_| file.flush())
        .with_context(|| format!("Failed to write {:?}", file.path()))?;

    let status = Command::new(&program)
        .args(&args)
        .arg(file.path())
        .status()
        .with_context(|| format!("Failed to run editor: {}", program))?;

    if !status.success() {
        bail!("Editor '{}' exited with {}, region left unchanged", program, status);
    }

    let edited = fs::read_to_string(file.path())
        .with_context(|| format!("Failed to read edited file: {:?}", file.path()))?;

    Ok(normalize_edited(&edited))
}

fn normalize_edited(text: &str) -> String {
    let mut text = text.replace("\r\n", "\n");
    if text.ends_with('\n') {
        text.pop();
    }
    text
}

/// Region name reduced to characters safe in a file name
fn file_safe(region: &str) -> String {
    region
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '-' { c } else { '_' })
        .collect()
}

/// Editor program and its arguments
fn editor_command() -> Result<(String, Vec<String>)> {
    let configured = ["VISUAL", "EDITOR"]
        .iter()
        .filter_map(|var| env::var(var).ok())
        .find(|value| !value.trim().is_empty());

    if let Some(command) = configured {
        return Ok(split_command(&command));
    }

    if let Some(editor) = FALLBACK_EDITORS
        .iter()
        .find(|editor| find_in_path(editor).is_some())
    {
        return Ok((editor.to_string(), Vec::new()));
    }

    bail!(
        "No editor found. Set $VISUAL or $EDITOR.\n\
         Example: export EDITOR=nano"
    )
}

fn split_command(command: &str) -> (String, Vec<String>) {
    let mut parts = command.split_whitespace().map(str::to_string);
    let program = parts.next().unwrap_or_default();
    (program, parts.collect())
}

/// Location of an executable on PATH
fn find_in_path(program: &str) -> Option<PathBuf> {
    let path = env::var_os("PATH")?;
    env::split_paths(&path).find_map(|dir| executable_in(&dir, program))
}

fn executable_in(dir: &Path, program: &str) -> Option<PathBuf> {
    let candidate = dir.join(program);
    if candidate.is_file() {
        return Some(candidate);
    }
    #[cfg(windows)]
    {
        let exe = candidate.with_extension("exe");
        if exe.is_file() {
            return Some(exe);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_normalize_edited() {
        assert_eq!(normalize_edited("memo\n"), "memo");
        assert_eq!(normalize_edited("memo\r\n"), "memo");
        assert_eq!(normalize_edited("two\r\nlines\r\n\r\n"), "two\nlines\n");
        assert_eq!(normalize_edited("as is"), "as is");
    }

    #[test]
    fn test_file_safe() {
        assert_eq!(file_safe("Memo"), "Memo");
        assert_eq!(file_safe("a/b c"), "a_b_c");
        assert_eq!(file_safe("メモ"), "メモ");
    }

    #[test]
    fn test_split_command() {
        assert_eq!(
            split_command("code --wait"),
            ("code".to_string(), vec!["--wait".to_string()])
        );
        assert_eq!(split_command(" vim "), ("vim".to_string(), Vec::new()));
    }

    #[test]
    fn test_executable_in() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("myeditor"), b"").unwrap();

        assert_eq!(
            executable_in(dir.path(), "myeditor"),
            Some(dir.path().join("myeditor"))
        );
        assert!(executable_in(dir.path(), "definitely_not_a_real_command_12345").is_none());
    }
}
