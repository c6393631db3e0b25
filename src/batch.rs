//! Chunk planning for the adaptive batch player search.
//!
//! The search endpoint takes repeated `id[]`/`name[]` parameters but caps
//! how many it accepts per request. The cap is only discoverable through
//! the `X-Search-Query-Limit` response header, so planning starts from a
//! default and the client corrects its per-instance limit from whatever the
//! server reports.

use std::collections::VecDeque;

use reqwest::header::HeaderMap;

use crate::enums::Platform;
use crate::error::{RlError, Result};

#[cfg(test)]
mod tests;

/// Combined id+name entries per request until the server says otherwise.
pub(crate) const DEFAULT_SEARCH_QUERY_LIMIT: usize = 10;

pub(crate) const QUERY_LIMIT_HEADER: &str = "X-Search-Query-Limit";
pub(crate) const QUERY_COUNT_HEADER: &str = "X-Search-Query-Count";

/// One entry of a search chunk, in the order it goes on the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum QueryEntry {
    Id(String),
    Name(String),
}

/// Remaining entries of one top-level batch call, handed out chunk by
/// chunk. IDs are packed before names.
#[derive(Debug)]
pub(crate) struct BatchPlan {
    remaining: VecDeque<QueryEntry>,
    limit: usize,
}

impl BatchPlan {
    pub(crate) fn new(ids: Vec<String>, names: Vec<String>, limit: usize) -> Result<Self> {
        if ids.is_empty() && names.is_empty() {
            return Err(RlError::EmptyQuery);
        }
        let remaining = ids
            .into_iter()
            .map(QueryEntry::Id)
            .chain(names.into_iter().map(QueryEntry::Name))
            .collect();
        Ok(Self { remaining, limit })
    }

    /// Next chunk of at most `limit` entries, or `None` when done.
    pub(crate) fn next_chunk(&mut self) -> Option<Vec<QueryEntry>> {
        if self.remaining.is_empty() {
            return None;
        }
        let take = self.limit.min(self.remaining.len());
        Some(self.remaining.drain(..take).collect())
    }

    /// Put a rejected chunk back in front and re-chunk everything that
    /// hasn't been successfully queried at the corrected limit.
    pub(crate) fn requeue(&mut self, chunk: Vec<QueryEntry>, limit: usize) {
        for entry in chunk.into_iter().rev() {
            self.remaining.push_front(entry);
        }
        self.limit = limit.max(1);
    }
}

/// Query parameters for one chunk, platform first.
pub(crate) fn chunk_params(platform: Platform, chunk: &[QueryEntry]) -> Vec<(String, String)> {
    let mut params = vec![("platform".to_owned(), platform.as_str().to_owned())];
    for entry in chunk {
        match entry {
            QueryEntry::Id(id) => params.push(("id[]".to_owned(), id.clone())),
            QueryEntry::Name(name) => params.push(("name[]".to_owned(), name.clone())),
        }
    }
    params
}

fn header_usize(headers: &HeaderMap, name: &str) -> Option<usize> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.parse().ok())
}

/// Server-enforced limit advertised on a success response.
pub(crate) fn advertised_limit(headers: &HeaderMap) -> Option<usize> {
    header_usize(headers, QUERY_LIMIT_HEADER)
}

/// For a 400 response: the server limit, but only when its headers confirm
/// the request actually overflowed it. Any other 400 is not re-plannable.
pub(crate) fn violated_limit(headers: &HeaderMap) -> Option<usize> {
    let limit = header_usize(headers, QUERY_LIMIT_HEADER)?;
    let count = header_usize(headers, QUERY_COUNT_HEADER)?;
    (count > limit).then_some(limit)
}
