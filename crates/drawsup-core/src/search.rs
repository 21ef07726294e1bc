//! Substring search across all annotations
//!
//! A linear scan of the backing file: every record is decoded and every
//! enabled region is searched for the query. Each occurrence yields a snippet
//! of at most [`SNIPPET_CHARS`] characters starting at the match. Scanning
//! resumes after the end of the snippet, so further matches inside the same
//! snippet window are not reported separately.
//!
//! Results come out in file order, then region name order, then left to
//! right within a region. Matching is case-sensitive.

use std::collections::{BTreeSet, VecDeque};

use crate::models::{Record, SearchHit};
use crate::storage::StoreResult;
use crate::store::{AnnotationStore, Records};

/// Maximum snippet length, in characters
pub const SNIPPET_CHARS: usize = 20;

/// Search `store` for `query` in the regions named by `enabled`
///
/// The returned iterator streams the backing file; each call starts a new
/// scan. An empty query matches nothing.
pub fn search<I, S>(store: &AnnotationStore, query: &str, enabled: I) -> StoreResult<SearchHits>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    Ok(SearchHits {
        records: store.records()?,
        query: query.to_string(),
        enabled: enabled.into_iter().map(Into::into).collect(),
        pending: VecDeque::new(),
    })
}

/// Lazy iterator over search hits
pub struct SearchHits {
    records: Records,
    query: String,
    enabled: BTreeSet<String>,
    pending: VecDeque<SearchHit>,
}

impl SearchHits {
    fn queue_record(&mut self, record: Record) {
        for (region, text) in &record.regions {
            if !self.enabled.contains(region) {
                continue;
            }
            for snippet in snippets(text, &self.query) {
                self.pending.push_back(SearchHit {
                    identity: record.identity.clone(),
                    region: region.clone(),
                    snippet: snippet.to_string(),
                });
            }
        }
    }
}

impl Iterator for SearchHits {
    type Item = StoreResult<SearchHit>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.query.is_empty() || self.enabled.is_empty() {
            return None;
        }

        loop {
            if let Some(hit) = self.pending.pop_front() {
                return Some(Ok(hit));
            }
            match self.records.next()? {
                Ok(record) => self.queue_record(record),
                Err(e) => return Some(Err(e)),
            }
        }
    }
}

/// Snippets for every non-overlapping occurrence of `query` in `text`
pub fn snippets<'a>(text: &'a str, query: &str) -> Vec<&'a str> {
    let mut found = Vec::new();
    if query.is_empty() {
        return found;
    }

    let mut rest = text;
    while let Some(pos) = rest.find(query) {
        let tail = &rest[pos..];
        let end = tail
            .char_indices()
            .nth(SNIPPET_CHARS)
            .map(|(idx, _)| idx)
            .unwrap_or(tail.len());

        found.push(&tail[..end]);
        rest = &tail[end..];
    }

    found
}
