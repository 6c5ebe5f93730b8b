//! Provider response envelopes
//!
//! Every list feed normalizes to a `FeedPage`: the record list, an optional
//! server-side total, and an optional `note` the backend uses to flag
//! synthesized content. Some feeds additionally wrap each record in a
//! success/result envelope that is stripped here before classification.

use serde::{Deserialize, Serialize};

use crate::records::StatsSummary;

/// Substrings (case-insensitive) in a response `note` that mark the payload
/// as synthesized rather than live.
const FALLBACK_MARKERS: &[&str] = &["mock", "fallback", "synthetic", "placeholder"];

/// True if the backend's note declares the payload synthesized.
pub fn note_marks_fallback(note: &str) -> bool {
    let note = note.to_ascii_lowercase();
    FALLBACK_MARKERS.iter().any(|m| note.contains(m))
}

/// Normalized response for a list feed.
#[derive(Debug, Clone, PartialEq)]
pub struct FeedPage<T> {
    pub records: Vec<T>,
    /// Server-side total for paginated feeds. Client-side feeds leave this
    /// unset and the record count is used instead.
    pub total: Option<u64>,
    pub note: Option<String>,
}

impl<T> Default for FeedPage<T> {
    fn default() -> Self {
        Self {
            records: Vec::new(),
            total: None,
            note: None,
        }
    }
}

impl<T> FeedPage<T> {
    pub fn new(records: Vec<T>) -> Self {
        Self {
            records,
            total: None,
            note: None,
        }
    }

    pub fn with_total(mut self, total: u64) -> Self {
        self.total = Some(total);
        self
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    /// True if the backend declared this payload synthesized.
    pub fn is_marked_fallback(&self) -> bool {
        self.note.as_deref().is_some_and(note_marks_fallback)
    }
}

/// Normalized response for the stats feed.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StatsEnvelope {
    pub stats: Option<StatsSummary>,
    pub note: Option<String>,
}

impl StatsEnvelope {
    pub fn is_marked_fallback(&self) -> bool {
        self.note.as_deref().is_some_and(note_marks_fallback)
    }
}

/// Per-record success/result wrapper some feeds put around each entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Enveloped<T> {
    #[serde(default)]
    pub success: bool,
    pub result: Option<T>,
}

impl<T> Enveloped<T> {
    /// Strip the wrapper. Entries that report failure or carry no body are
    /// dropped.
    pub fn into_record(self) -> Option<T> {
        if self.success {
            self.result
        } else {
            None
        }
    }
}

/// Strip a list of wrapped records, keeping only successful entries.
pub fn strip_envelopes<T>(wrapped: Vec<Enveloped<T>>) -> Vec<T> {
    wrapped.into_iter().filter_map(Enveloped::into_record).collect()
}

/// Offset/limit window for a server-side paginated feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub offset: u64,
    pub limit: u64,
}

impl PageRequest {
    pub fn new(offset: u64, limit: u64) -> Self {
        Self { offset, limit }
    }

    /// Window for a zero-based page index.
    pub fn for_page(page: u64, page_size: u64) -> Self {
        Self {
            offset: page.saturating_mul(page_size),
            limit: page_size,
        }
    }

    /// Zero-based page index of this window.
    pub fn page(&self) -> u64 {
        if self.limit == 0 {
            0
        } else {
            self.offset / self.limit
        }
    }

    /// Number of pages needed for `total` records at this window's limit.
    pub fn page_count(&self, total: u64) -> u64 {
        if self.limit == 0 {
            0
        } else {
            total.div_ceil(self.limit)
        }
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            offset: 0,
            limit: 10,
        }
    }
}
