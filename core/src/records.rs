//! Record types for each dashboard feed
//!
//! These are display models: the shapes the reconciliation layer hands to a
//! view after envelope stripping. Timestamps are unix seconds as the backend
//! reports them.

use serde::{Deserialize, Serialize};

/// One independently fetched category of data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FeedKind {
    Transactions,
    Blocks,
    Events,
    Stats,
    Agents,
    Tasks,
}

impl FeedKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FeedKind::Transactions => "transactions",
            FeedKind::Blocks => "blocks",
            FeedKind::Events => "events",
            FeedKind::Stats => "stats",
            FeedKind::Agents => "agents",
            FeedKind::Tasks => "tasks",
        }
    }
}

/// Transaction lifecycle status as reported by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TxStatus {
    #[default]
    Pending,
    Confirmed,
    Failed,
}

impl TxStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TxStatus::Pending => "pending",
            TxStatus::Confirmed => "confirmed",
            TxStatus::Failed => "failed",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub hash: String,
    pub from: String,
    pub to: String,
    pub amount: u64,
    #[serde(default)]
    pub status: TxStatus,
    pub timestamp: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    pub height: u64,
    pub hash: String,
    #[serde(default)]
    pub parent_hash: String,
    #[serde(default)]
    pub tx_count: u64,
    #[serde(default)]
    pub proposer: String,
    pub timestamp: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: String,
    #[serde(default)]
    pub agent_id: String,
    pub kind: String,
    #[serde(default)]
    pub message: String,
    pub timestamp: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum AgentStatus {
    #[default]
    Idle,
    Active,
    Offline,
}

impl AgentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AgentStatus::Idle => "idle",
            AgentStatus::Active => "active",
            AgentStatus::Offline => "offline",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Agent {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub status: AgentStatus,
    #[serde(default)]
    pub tasks_completed: u64,
    #[serde(default)]
    pub last_seen: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    #[default]
    Pending,
    Running,
    Completed,
    Failed,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Pending => "pending",
            TaskStatus::Running => "running",
            TaskStatus::Completed => "completed",
            TaskStatus::Failed => "failed",
        }
    }

    /// Filter cycle order used by the tasks table: all -> pending -> running
    /// -> completed -> failed -> all.
    pub fn next_filter(current: Option<TaskStatus>) -> Option<TaskStatus> {
        match current {
            None => Some(TaskStatus::Pending),
            Some(TaskStatus::Pending) => Some(TaskStatus::Running),
            Some(TaskStatus::Running) => Some(TaskStatus::Completed),
            Some(TaskStatus::Completed) => Some(TaskStatus::Failed),
            Some(TaskStatus::Failed) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskRecord {
    pub id: String,
    #[serde(default)]
    pub agent_id: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub status: TaskStatus,
    #[serde(default)]
    pub created_at: i64,
    #[serde(default)]
    pub updated_at: i64,
}

/// Network-wide counters for the stats cards row.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct StatsSummary {
    #[serde(default)]
    pub connected: bool,
    #[serde(default)]
    pub block_height: u64,
    #[serde(default)]
    pub total_transactions: u64,
    #[serde(default)]
    pub active_agents: u64,
    #[serde(default)]
    pub pending_tasks: u64,
    #[serde(default)]
    pub events_24h: u64,
}

impl StatsSummary {
    /// Card rendered when the stats fetch rejects: not connected, all zero.
    pub fn disconnected() -> Self {
        Self::default()
    }

    /// Zeroed card for a successful call that carried no summary. The
    /// connection itself was fine.
    pub fn empty_connected() -> Self {
        Self {
            connected: true,
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disconnected_stats_are_all_zero() {
        let stats = StatsSummary::disconnected();
        assert!(!stats.connected);
        assert_eq!(stats.block_height, 0);
        assert_eq!(stats.total_transactions, 0);
        assert_eq!(stats.active_agents, 0);
        assert_eq!(stats.pending_tasks, 0);
    }

    #[test]
    fn test_task_filter_cycle_wraps() {
        let mut filter = None;
        for _ in 0..5 {
            filter = TaskStatus::next_filter(filter);
        }
        assert_eq!(filter, None);
    }

    #[test]
    fn test_status_serde_lowercase() {
        let json = serde_json::to_string(&TxStatus::Confirmed).unwrap();
        assert_eq!(json, "\"confirmed\"");
        let status: AgentStatus = serde_json::from_str("\"offline\"").unwrap();
        assert_eq!(status, AgentStatus::Offline);
    }
}
