//! Placeholder record generators
//!
//! Used when a feed's fetch rejects: the view still renders plausible rows,
//! flagged as fallback provenance, instead of going blank. Stats are the
//! exception - a rejected stats fetch renders the fixed disconnected card,
//! never random numbers.

use chrono::Utc;
use rand::Rng;

use crate::records::{
    Agent, AgentStatus, Block, Event, TaskRecord, TaskStatus, Transaction, TxStatus,
};

const AGENT_NAMES: &[&str] = &["explorer", "indexer", "relayer", "archiver", "auditor"];
const EVENT_KINDS: &[&str] = &["task_assigned", "task_completed", "agent_online", "block_sealed"];

fn hex_string(len: usize) -> String {
    let mut rng = rand::thread_rng();
    (0..len)
        .map(|_| format!("{:x}", rng.gen_range(0..16)))
        .collect()
}

pub fn transactions(n: usize) -> Vec<Transaction> {
    let now = Utc::now().timestamp();
    let mut rng = rand::thread_rng();
    (0..n)
        .map(|i| Transaction {
            hash: format!("0x{}", hex_string(64)),
            from: format!("0x{}", hex_string(40)),
            to: format!("0x{}", hex_string(40)),
            amount: rng.gen_range(1..5_000_000_000u64),
            status: TxStatus::Confirmed,
            timestamp: now - (i as i64) * 12,
        })
        .collect()
}

pub fn blocks(n: usize) -> Vec<Block> {
    let now = Utc::now().timestamp();
    let mut rng = rand::thread_rng();
    let head = rng.gen_range(100_000..900_000u64);
    (0..n)
        .map(|i| Block {
            height: head - i as u64,
            hash: format!("0x{}", hex_string(64)),
            parent_hash: format!("0x{}", hex_string(64)),
            tx_count: rng.gen_range(0..200),
            proposer: format!("0x{}", hex_string(40)),
            timestamp: now - (i as i64) * 12,
        })
        .collect()
}

pub fn events(n: usize) -> Vec<Event> {
    let now = Utc::now().timestamp();
    let mut rng = rand::thread_rng();
    (0..n)
        .map(|i| {
            let kind = EVENT_KINDS[rng.gen_range(0..EVENT_KINDS.len())];
            Event {
                id: format!("evt-{}", hex_string(8)),
                agent_id: format!("agent-{}", rng.gen_range(1..6)),
                kind: kind.to_string(),
                message: format!("{} (placeholder)", kind),
                timestamp: now - (i as i64) * 45,
            }
        })
        .collect()
}

pub fn agents(n: usize) -> Vec<Agent> {
    let now = Utc::now().timestamp();
    let mut rng = rand::thread_rng();
    (0..n)
        .map(|i| Agent {
            id: format!("agent-{}", i + 1),
            name: AGENT_NAMES[i % AGENT_NAMES.len()].to_string(),
            address: format!("0x{}", hex_string(40)),
            status: if i % 3 == 0 {
                AgentStatus::Active
            } else {
                AgentStatus::Idle
            },
            tasks_completed: rng.gen_range(0..500),
            last_seen: now - rng.gen_range(0..3_600i64),
        })
        .collect()
}

pub fn tasks(n: usize) -> Vec<TaskRecord> {
    let now = Utc::now().timestamp();
    let mut rng = rand::thread_rng();
    let statuses = [
        TaskStatus::Pending,
        TaskStatus::Running,
        TaskStatus::Completed,
    ];
    (0..n)
        .map(|i| {
            let created = now - rng.gen_range(60..86_400i64);
            TaskRecord {
                id: format!("task-{}", hex_string(8)),
                agent_id: format!("agent-{}", rng.gen_range(1..6)),
                description: format!("placeholder task #{}", i + 1),
                status: statuses[i % statuses.len()],
                created_at: created,
                updated_at: created + rng.gen_range(0..3_600i64),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generators_produce_exact_counts() {
        assert_eq!(transactions(10).len(), 10);
        assert_eq!(blocks(5).len(), 5);
        assert_eq!(events(8).len(), 8);
        assert_eq!(agents(4).len(), 4);
        assert_eq!(tasks(6).len(), 6);
    }

    #[test]
    fn test_transactions_look_plausible() {
        let txs = transactions(3);
        for tx in &txs {
            assert!(tx.hash.starts_with("0x"));
            assert_eq!(tx.hash.len(), 66);
            assert!(tx.amount > 0);
            assert!(tx.timestamp > 0);
        }
    }

    #[test]
    fn test_blocks_descend_from_head() {
        let blocks = blocks(4);
        for pair in blocks.windows(2) {
            assert_eq!(pair[0].height, pair[1].height + 1);
        }
    }
}
