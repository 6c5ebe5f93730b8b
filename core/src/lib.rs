//! chainboard - Data reconciliation layer for explorer dashboards
//!
//! Every feed the dashboard renders (transactions, blocks, events, stats,
//! agents, tasks) goes through the same policy: fetch once, classify the
//! response into a provenance (live, empty, or fallback), and substitute
//! synthesized placeholder data when the backend is unreachable or reports
//! that it had no live source. Per-view degradation is aggregated into a
//! single advisory banner flag.

pub mod envelope;
pub mod provider;
pub mod reconcile;
pub mod records;
pub mod synthetic;

pub use envelope::{note_marks_fallback, Enveloped, FeedPage, PageRequest, StatsEnvelope};
pub use provider::{EventFilter, FeedError, FeedProvider};
pub use reconcile::{reconcile, reconcile_stats, FeedSnapshot, Provenance, StatsCard, ViewHealth};
pub use records::{
    Agent, AgentStatus, Block, Event, FeedKind, StatsSummary, TaskRecord, TaskStatus, Transaction,
    TxStatus,
};
