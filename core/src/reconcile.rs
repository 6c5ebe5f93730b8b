//! Reconciliation policy
//!
//! One classification function decides, per feed per fetch cycle, whether the
//! view renders live backend data, an empty state, or synthesized fallback
//! data. The result fully replaces the previous cycle's snapshot; there is no
//! cross-cycle memory and no retry inside a cycle.

use std::collections::HashSet;

use crate::envelope::{FeedPage, StatsEnvelope};
use crate::provider::FeedError;
use crate::records::{FeedKind, StatsSummary};

/// Where a feed's currently displayed data came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provenance {
    /// Real records from the backend.
    Live,
    /// Connection fine, zero records. Not an error.
    Empty,
    /// Synthesized placeholder data: the backend either declared its payload
    /// mock or the call rejected.
    Fallback,
}

impl Provenance {
    pub fn as_str(&self) -> &'static str {
        match self {
            Provenance::Live => "live",
            Provenance::Empty => "empty",
            Provenance::Fallback => "fallback",
        }
    }
}

/// A feed's reconciled state for one fetch cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct FeedSnapshot<T> {
    pub provenance: Provenance,
    pub records: Vec<T>,
    /// Server-side total for paginated feeds, record count otherwise.
    pub total: u64,
}

impl<T> FeedSnapshot<T> {
    /// Snapshot used before the first cycle completes.
    pub fn initial() -> Self {
        Self {
            provenance: Provenance::Empty,
            records: Vec::new(),
            total: 0,
        }
    }

    /// True if this feed should contribute to the advisory banner.
    pub fn is_degraded(&self) -> bool {
        self.provenance == Provenance::Fallback
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Classify one feed fetch outcome.
///
/// Rules, in order:
/// 1. response carries a fallback note -> `Fallback` with the
///    provider-supplied mock payload;
/// 2. non-empty record list -> `Live`;
/// 3. zero records on a successful call -> `Empty`;
/// 4. rejected call -> `Fallback` with locally synthesized records.
pub fn reconcile<T>(
    outcome: Result<FeedPage<T>, FeedError>,
    synthesize: impl FnOnce() -> Vec<T>,
) -> FeedSnapshot<T> {
    match outcome {
        Ok(page) if page.is_marked_fallback() => {
            let total = page.total.unwrap_or(page.records.len() as u64);
            FeedSnapshot {
                provenance: Provenance::Fallback,
                records: page.records,
                total,
            }
        }
        Ok(page) if !page.records.is_empty() => {
            let total = page.total.unwrap_or(page.records.len() as u64);
            FeedSnapshot {
                provenance: Provenance::Live,
                records: page.records,
                total,
            }
        }
        Ok(page) => FeedSnapshot {
            provenance: Provenance::Empty,
            records: Vec::new(),
            total: page.total.unwrap_or(0),
        },
        Err(_) => {
            let records = synthesize();
            let total = records.len() as u64;
            FeedSnapshot {
                provenance: Provenance::Fallback,
                records,
                total,
            }
        }
    }
}

/// The stats card with its provenance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StatsCard {
    pub provenance: Provenance,
    pub summary: StatsSummary,
}

impl StatsCard {
    pub fn initial() -> Self {
        Self {
            provenance: Provenance::Empty,
            summary: StatsSummary::empty_connected(),
        }
    }

    pub fn is_degraded(&self) -> bool {
        self.provenance == Provenance::Fallback
    }
}

/// Classify the stats fetch. A rejected call renders the disconnected card;
/// a successful call without a summary renders a zeroed but connected card.
pub fn reconcile_stats(outcome: Result<StatsEnvelope, FeedError>) -> StatsCard {
    match outcome {
        Ok(envelope) if envelope.is_marked_fallback() => StatsCard {
            provenance: Provenance::Fallback,
            summary: envelope.stats.unwrap_or_else(StatsSummary::disconnected),
        },
        Ok(envelope) => match envelope.stats {
            Some(summary) => StatsCard {
                provenance: Provenance::Live,
                summary,
            },
            None => StatsCard {
                provenance: Provenance::Empty,
                summary: StatsSummary::empty_connected(),
            },
        },
        Err(_) => StatsCard {
            provenance: Provenance::Fallback,
            summary: StatsSummary::disconnected(),
        },
    }
}

/// Aggregate degradation flags for one view.
///
/// The banner is a boolean OR over the view's feeds: visible whenever at
/// least one feed fell back this cycle. The advisory text is generic and
/// never enumerates which feeds failed.
#[derive(Debug, Clone, Default)]
pub struct ViewHealth {
    degraded: HashSet<FeedKind>,
}

impl ViewHealth {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one feed's flag for the current cycle.
    pub fn record(&mut self, kind: FeedKind, degraded: bool) {
        if degraded {
            self.degraded.insert(kind);
        } else {
            self.degraded.remove(&kind);
        }
    }

    /// Clear all flags at the start of a full cycle.
    pub fn reset(&mut self) {
        self.degraded.clear();
    }

    pub fn banner_visible(&self) -> bool {
        !self.degraded.is_empty()
    }

    /// The one generic advisory shown to the user.
    pub fn advisory(&self) -> &'static str {
        "Backend unreachable for some data - showing placeholder values"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::envelope::FeedPage;

    fn synth() -> Vec<u32> {
        vec![7, 8, 9]
    }

    #[test]
    fn test_live_when_records_present_without_note() {
        let snapshot = reconcile(Ok(FeedPage::new(vec![1, 2]).with_total(40)), synth);
        assert_eq!(snapshot.provenance, Provenance::Live);
        assert_eq!(snapshot.records, vec![1, 2]);
        assert_eq!(snapshot.total, 40);
        assert!(!snapshot.is_degraded());
    }

    #[test]
    fn test_live_total_defaults_to_record_count() {
        let snapshot = reconcile(Ok(FeedPage::new(vec![1, 2, 3])), synth);
        assert_eq!(snapshot.total, 3);
    }

    #[test]
    fn test_empty_when_zero_records() {
        let snapshot = reconcile(Ok(FeedPage::<u32>::default().with_total(0)), synth);
        assert_eq!(snapshot.provenance, Provenance::Empty);
        assert!(snapshot.is_empty());
        assert_eq!(snapshot.total, 0);
        assert!(!snapshot.is_degraded());
    }

    #[test]
    fn test_fallback_note_keeps_provider_payload() {
        let page = FeedPage::new(vec![5]).with_note("serving mock data");
        let snapshot = reconcile(Ok(page), synth);
        assert_eq!(snapshot.provenance, Provenance::Fallback);
        assert_eq!(snapshot.records, vec![5]);
        assert_eq!(snapshot.total, 1);
        assert!(snapshot.is_degraded());
    }

    #[test]
    fn test_fallback_note_wins_over_empty() {
        // An empty payload that is still marked mock stays Fallback.
        let page = FeedPage::<u32>::default().with_note("mock");
        let snapshot = reconcile(Ok(page), synth);
        assert_eq!(snapshot.provenance, Provenance::Fallback);
    }

    #[test]
    fn test_rejection_synthesizes_nonempty_payload() {
        let snapshot = reconcile(Err(FeedError::Transport("refused".into())), synth);
        assert_eq!(snapshot.provenance, Provenance::Fallback);
        assert_eq!(snapshot.records, vec![7, 8, 9]);
        assert_eq!(snapshot.total, 3);
    }

    #[test]
    fn test_stats_rejection_is_disconnected_card() {
        let card = reconcile_stats(Err(FeedError::Status(502)));
        assert_eq!(card.provenance, Provenance::Fallback);
        assert!(!card.summary.connected);
        assert_eq!(card.summary.block_height, 0);
    }

    #[test]
    fn test_stats_success_without_summary_is_empty_connected() {
        let card = reconcile_stats(Ok(StatsEnvelope::default()));
        assert_eq!(card.provenance, Provenance::Empty);
        assert!(card.summary.connected);
    }

    #[test]
    fn test_stats_mock_note_uses_provider_summary() {
        let envelope = StatsEnvelope {
            stats: Some(StatsSummary {
                connected: true,
                block_height: 42,
                ..StatsSummary::default()
            }),
            note: Some("mock stats".into()),
        };
        let card = reconcile_stats(Ok(envelope));
        assert_eq!(card.provenance, Provenance::Fallback);
        assert_eq!(card.summary.block_height, 42);
    }

    #[test]
    fn test_banner_is_or_over_feeds() {
        let mut health = ViewHealth::new();
        health.record(FeedKind::Transactions, false);
        health.record(FeedKind::Blocks, false);
        assert!(!health.banner_visible());

        health.record(FeedKind::Stats, true);
        assert!(health.banner_visible());

        // A later cycle clearing the flag hides the banner again.
        health.record(FeedKind::Stats, false);
        assert!(!health.banner_visible());
    }

    #[test]
    fn test_banner_reset_clears_all_flags() {
        let mut health = ViewHealth::new();
        health.record(FeedKind::Events, true);
        health.reset();
        assert!(!health.banner_visible());
    }
}
