//! Provider seam
//!
//! The dashboard calls the backend through this trait so the reconciliation
//! policy and view controllers can be exercised against scripted providers in
//! tests. Implementations return raw envelopes; classification happens in
//! `reconcile` and nowhere else.

use async_trait::async_trait;
use thiserror::Error;

use crate::envelope::{FeedPage, PageRequest, StatsEnvelope};
use crate::records::{Agent, Block, Event, TaskRecord, TaskStatus, Transaction};

#[derive(Error, Debug)]
pub enum FeedError {
    #[error("transport: {0}")]
    Transport(String),
    #[error("unexpected status {0}")]
    Status(u16),
    #[error("decode: {0}")]
    Decode(String),
}

/// Optional server-side filter for the events feed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventFilter {
    pub agent_id: Option<String>,
}

/// One method per feed. Each call is a single attempt: no retries, no
/// caching. The next scheduled or user-triggered cycle is the only retry
/// mechanism.
#[async_trait]
pub trait FeedProvider: Send + Sync {
    async fn transactions(&self, page: PageRequest) -> Result<FeedPage<Transaction>, FeedError>;

    async fn blocks(&self, limit: u64) -> Result<FeedPage<Block>, FeedError>;

    async fn events(
        &self,
        page: PageRequest,
        filter: Option<EventFilter>,
    ) -> Result<FeedPage<Event>, FeedError>;

    async fn stats(&self) -> Result<StatsEnvelope, FeedError>;

    async fn agents(&self) -> Result<FeedPage<Agent>, FeedError>;

    async fn tasks(&self, status: Option<TaskStatus>) -> Result<FeedPage<TaskRecord>, FeedError>;
}
