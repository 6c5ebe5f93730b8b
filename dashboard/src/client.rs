//! HTTP client for the explorer REST backend
//!
//! One GET per feed per cycle. Responses are tolerant: a missing record
//! array on a successful call deserializes to an empty list, which the
//! reconciliation layer treats as legitimately empty. Transaction records
//! arrive wrapped in per-record success/result envelopes and are stripped
//! here before classification.

use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;

use chainboard::envelope::strip_envelopes;
use chainboard::{
    Agent, Block, Enveloped, Event, EventFilter, FeedError, FeedPage, FeedProvider, PageRequest,
    StatsEnvelope, StatsSummary, TaskRecord, TaskStatus, Transaction,
};

pub struct ExplorerClient {
    http: reqwest::Client,
    base_url: String,
}

impl ExplorerClient {
    pub fn new(base_url: &str, timeout: Duration) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, FeedError> {
        let url = format!("{}{}", self.base_url, path);
        let resp = self
            .http
            .get(&url)
            .query(query)
            .send()
            .await
            .map_err(|e| FeedError::Transport(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(FeedError::Status(status.as_u16()));
        }

        resp.json::<T>()
            .await
            .map_err(|e| FeedError::Decode(e.to_string()))
    }
}

#[derive(Deserialize)]
struct TransactionsResponse {
    #[serde(default)]
    transactions: Vec<Enveloped<Transaction>>,
    total: Option<u64>,
    note: Option<String>,
}

#[derive(Deserialize)]
struct BlocksResponse {
    #[serde(default)]
    blocks: Vec<Block>,
    total: Option<u64>,
    note: Option<String>,
}

#[derive(Deserialize)]
struct EventsResponse {
    #[serde(default)]
    events: Vec<Event>,
    total: Option<u64>,
    note: Option<String>,
}

#[derive(Deserialize)]
struct StatsResponse {
    stats: Option<StatsSummary>,
    note: Option<String>,
}

#[derive(Deserialize)]
struct AgentsResponse {
    #[serde(default)]
    agents: Vec<Agent>,
    note: Option<String>,
}

#[derive(Deserialize)]
struct TasksResponse {
    #[serde(default)]
    tasks: Vec<TaskRecord>,
    total: Option<u64>,
    note: Option<String>,
}

/// Query string for the events feed: pagination window plus the optional
/// agent filter.
fn events_query(page: PageRequest, filter: Option<EventFilter>) -> Vec<(&'static str, String)> {
    let mut query = vec![
        ("offset", page.offset.to_string()),
        ("limit", page.limit.to_string()),
    ];
    if let Some(agent_id) = filter.and_then(|f| f.agent_id) {
        query.push(("agent_id", agent_id));
    }
    query
}

#[async_trait]
impl FeedProvider for ExplorerClient {
    async fn transactions(&self, page: PageRequest) -> Result<FeedPage<Transaction>, FeedError> {
        let query = [
            ("offset", page.offset.to_string()),
            ("limit", page.limit.to_string()),
        ];
        let resp: TransactionsResponse = self.get_json("/api/transactions", &query).await?;
        let mut out = FeedPage::new(strip_envelopes(resp.transactions));
        out.total = resp.total;
        out.note = resp.note;
        Ok(out)
    }

    async fn blocks(&self, limit: u64) -> Result<FeedPage<Block>, FeedError> {
        let query = [("limit", limit.to_string())];
        let resp: BlocksResponse = self.get_json("/api/blocks", &query).await?;
        let mut out = FeedPage::new(resp.blocks);
        out.total = resp.total;
        out.note = resp.note;
        Ok(out)
    }

    async fn events(
        &self,
        page: PageRequest,
        filter: Option<EventFilter>,
    ) -> Result<FeedPage<Event>, FeedError> {
        let query = events_query(page, filter);
        let resp: EventsResponse = self.get_json("/api/events", &query).await?;
        let mut out = FeedPage::new(resp.events);
        out.total = resp.total;
        out.note = resp.note;
        Ok(out)
    }

    async fn stats(&self) -> Result<StatsEnvelope, FeedError> {
        let resp: StatsResponse = self.get_json("/api/stats", &[]).await?;
        Ok(StatsEnvelope {
            stats: resp.stats,
            note: resp.note,
        })
    }

    async fn agents(&self) -> Result<FeedPage<Agent>, FeedError> {
        let resp: AgentsResponse = self.get_json("/api/agents", &[]).await?;
        let mut out = FeedPage::new(resp.agents);
        out.note = resp.note;
        Ok(out)
    }

    async fn tasks(&self, status: Option<TaskStatus>) -> Result<FeedPage<TaskRecord>, FeedError> {
        let mut query = Vec::new();
        if let Some(status) = status {
            query.push(("status", status.as_str().to_string()));
        }
        let resp: TasksResponse = self.get_json("/api/tasks", &query).await?;
        let mut out = FeedPage::new(resp.tasks);
        out.total = resp.total;
        out.note = resp.note;
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chainboard::TxStatus;

    #[test]
    fn test_transactions_wire_shape_strips_wrappers() {
        let json = r#"{
            "transactions": [
                { "success": true, "result": { "hash": "0x01", "from": "0xa", "to": "0xb", "amount": 5, "status": "confirmed", "timestamp": 1700000000 } },
                { "success": false, "result": { "hash": "0x02", "from": "0xa", "to": "0xb", "amount": 6, "timestamp": 1700000001 } }
            ],
            "total": 2
        }"#;
        let resp: TransactionsResponse = serde_json::from_str(json).unwrap();
        let records = strip_envelopes(resp.transactions);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].hash, "0x01");
        assert_eq!(records[0].status, TxStatus::Confirmed);
        assert_eq!(resp.total, Some(2));
    }

    #[test]
    fn test_missing_record_array_decodes_as_empty() {
        let resp: BlocksResponse = serde_json::from_str("{}").unwrap();
        assert!(resp.blocks.is_empty());
        assert_eq!(resp.total, None);
        assert_eq!(resp.note, None);
    }

    #[test]
    fn test_note_survives_decode() {
        let json = r#"{ "blocks": [], "note": "serving mock data" }"#;
        let resp: BlocksResponse = serde_json::from_str(json).unwrap();
        assert_eq!(resp.note.as_deref(), Some("serving mock data"));
    }

    #[test]
    fn test_stats_wire_shape() {
        let json = r#"{ "stats": { "connected": true, "block_height": 99, "total_transactions": 1200, "active_agents": 4, "pending_tasks": 7, "events_24h": 310 } }"#;
        let resp: StatsResponse = serde_json::from_str(json).unwrap();
        let stats = resp.stats.unwrap();
        assert!(stats.connected);
        assert_eq!(stats.block_height, 99);
        assert_eq!(stats.events_24h, 310);
    }

    #[test]
    fn test_events_query_carries_agent_filter() {
        let filter = Some(EventFilter {
            agent_id: Some("ag-7".to_string()),
        });
        let query = events_query(PageRequest::for_page(1, 10), filter);
        assert_eq!(query[0], ("offset", "10".to_string()));
        assert_eq!(query[1], ("limit", "10".to_string()));
        assert_eq!(query[2], ("agent_id", "ag-7".to_string()));

        let query = events_query(PageRequest::for_page(0, 10), None);
        assert!(!query.iter().any(|(k, _)| *k == "agent_id"));
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let client = ExplorerClient::new("http://node:8080/", Duration::from_secs(5)).unwrap();
        assert_eq!(client.base_url(), "http://node:8080");
    }
}
