//! Record body codec
//!
//! A record body is a list of `key=value` lines. A line without `=` continues
//! the value of the previous key, joined with a newline, which is how region
//! text with line breaks is stored:
//!
//! ```text
//! Memo=first line
//! second line
//! Date=2017/03/11
//! ```
//!
//! The format has no escaping. Maps that cannot be written without being
//! misread later are rejected by [`encode`].

use thiserror::Error;

use crate::identity::looks_like_header;
use crate::models::RegionMap;

/// Key that receives continuation lines appearing before any `key=` line
pub const ORPHAN_KEY: &str = "";

/// Errors that can occur while encoding a region map
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    #[error("Region '{key}' cannot be stored: {reason}")]
    Unrepresentable { key: String, reason: &'static str },

    #[error("Path '{path}' cannot be stored in a record header: {reason}")]
    UnrepresentablePath { path: String, reason: &'static str },
}

/// Parse a record body into a region map
///
/// A repeated key appends to its earlier value. Continuation lines before the
/// first key are collected under [`ORPHAN_KEY`].
pub fn decode(text: &str) -> RegionMap {
    let mut regions = RegionMap::new();
    if text.is_empty() {
        return regions;
    }
    decode_lines(text.split('\n'), &mut regions);
    regions
}

/// Parse already-split body lines into `regions`
pub(crate) fn decode_lines<'a, I>(lines: I, regions: &mut RegionMap)
where
    I: IntoIterator<Item = &'a str>,
{
    let mut current = ORPHAN_KEY.to_string();

    for line in lines {
        match line.find('=') {
            Some(eq) => {
                current = line[..eq].to_string();
                regions
                    .entry(current.clone())
                    .or_default()
                    .push_str(&line[eq + 1..]);
            }
            None => match regions.get_mut(&current) {
                Some(value) => {
                    value.push('\n');
                    value.push_str(line);
                }
                None => {
                    regions.insert(current.clone(), line.to_string());
                }
            },
        }
    }
}

/// Serialize a region map into a record body
///
/// Lines are joined with `\n` and there is no trailing newline.
pub fn encode(regions: &RegionMap) -> Result<String, CodecError> {
    Ok(encode_lines(regions)?.join("\n"))
}

/// Serialize a region map into body lines
pub(crate) fn encode_lines(regions: &RegionMap) -> Result<Vec<String>, CodecError> {
    let mut lines = Vec::with_capacity(regions.len());

    for (key, value) in regions {
        check_key(key)?;

        let mut parts = value.split('\n');
        // split always yields at least one item
        let first = parts.next().unwrap_or_default();
        check_line_end(key, first)?;
        lines.push(format!("{}={}", key, first));

        for part in parts {
            check_line_end(key, part)?;
            check_continuation(key, part)?;
            lines.push(part.to_string());
        }
    }

    Ok(lines)
}

fn check_key(key: &str) -> Result<(), CodecError> {
    let reason = if key.contains('=') {
        "name contains '='"
    } else if key.contains('\n') {
        "name contains a line break"
    } else if key.starts_with('[') {
        "name starts with '['"
    } else {
        return Ok(());
    };

    Err(CodecError::Unrepresentable {
        key: key.to_string(),
        reason,
    })
}

// Stored lines lose a trailing CR when read back
fn check_line_end(key: &str, line: &str) -> Result<(), CodecError> {
    if line.ends_with('\r') {
        return Err(CodecError::Unrepresentable {
            key: key.to_string(),
            reason: "a line ends with a carriage return",
        });
    }
    Ok(())
}

fn check_continuation(key: &str, line: &str) -> Result<(), CodecError> {
    let reason = if line.contains('=') {
        "a continuation line contains '='"
    } else if looks_like_header(line) {
        "a continuation line starts with '['"
    } else {
        return Ok(());
    };

    Err(CodecError::Unrepresentable {
        key: key.to_string(),
        reason,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn regions(pairs: &[(&str, &str)]) -> RegionMap {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_decode_empty() {
        assert!(decode("").is_empty());
    }

    #[test]
    fn test_decode_key_values() {
        let map = decode("Exp=hello world\nMemo=nothing here");
        assert_eq!(
            map,
            regions(&[("Exp", "hello world"), ("Memo", "nothing here")])
        );
    }

    #[test]
    fn test_decode_continuation_lines() {
        let map = decode("Memo=line one\nline two\n\nline four\nDate=2017/03/11");
        assert_eq!(map["Memo"], "line one\nline two\n\nline four");
        assert_eq!(map["Date"], "2017/03/11");
    }

    #[test]
    fn test_decode_splits_on_first_equals() {
        let map = decode("Tips=a=b=c");
        assert_eq!(map["Tips"], "a=b=c");
    }

    #[test]
    fn test_decode_leading_continuation_goes_to_orphan_key() {
        let map = decode("stray\nmore\nExp=x");
        assert_eq!(map[ORPHAN_KEY], "stray\nmore");
        assert_eq!(map["Exp"], "x");
    }

    #[test]
    fn test_decode_repeated_key_appends() {
        let map = decode("Memo=ab\nMemo=cd");
        assert_eq!(map["Memo"], "abcd");
    }

    #[test]
    fn test_encode_layout() {
        let map = regions(&[("Memo", "one\ntwo"), ("Date", "2017/03/11")]);
        assert_eq!(encode(&map).unwrap(), "Date=2017/03/11\nMemo=one\ntwo");
    }

    #[test]
    fn test_round_trip_edge_values() {
        let map = regions(&[
            ("Exp", ""),
            ("Memo", "trailing newline\n"),
            ("Other", "\n\nleading blanks"),
            ("Tips", "[not a header]"),
            ("", "empty name"),
        ]);
        assert_eq!(decode(&encode(&map).unwrap()), map);
    }

    #[test]
    fn test_encode_empty_map() {
        assert_eq!(encode(&RegionMap::new()).unwrap(), "");
    }

    #[test]
    fn test_encode_rejects_bad_keys() {
        for key in ["a=b", "multi\nline", "[Exp]"] {
            let err = encode(&regions(&[(key, "v")])).unwrap_err();
            assert!(matches!(err, CodecError::Unrepresentable { .. }), "{key}");
        }
    }

    #[test]
    fn test_encode_rejects_ambiguous_continuations() {
        let err = encode(&regions(&[("Memo", "ok\nx=y")])).unwrap_err();
        assert!(err.to_string().contains("Memo"));

        let err = encode(&regions(&[("Memo", "ok\n[a.png,abc]")])).unwrap_err();
        assert!(err.to_string().contains("starts with '['"));

        // would be skipped as a malformed header when read back
        let err = encode(&regions(&[("Memo", "ok\n[draft")])).unwrap_err();
        assert!(matches!(err, CodecError::Unrepresentable { .. }));
    }

    #[test]
    fn test_encode_rejects_trailing_carriage_return() {
        for value in ["dos line\r", "first\r\nsecond", "first\nsecond\r"] {
            let err = encode(&regions(&[("Memo", value)])).unwrap_err();
            assert!(err.to_string().contains("carriage return"), "{value:?}");
        }

        let map = regions(&[("Memo", "inner\r stays")]);
        assert_eq!(decode(&encode(&map).unwrap()), map);
    }

    #[test]
    fn test_equals_on_first_line_is_fine() {
        let map = regions(&[("Memo", "x=y\nplain")]);
        assert_eq!(decode(&encode(&map).unwrap()), map);
    }
}
