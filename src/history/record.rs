//! Transfer records as seen from one account.

use alloy::primitives::{Address, TxHash};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;

use crate::amount::TokenAmount;
use crate::error::DashboardResult;
use crate::token::{TokenGateway, TransferLog};

/// Which side of a transfer the viewer was on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Direction {
    Sent,
    Received,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Sent => f.pad("Sent"),
            Direction::Received => f.pad("Received"),
        }
    }
}

/// A transfer involving the viewer. Rebuilt from logs on every load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransferRecord {
    pub from: Address,
    pub to: Address,
    pub value: TokenAmount,
    pub block_number: u64,
    /// Block time, when the node reported it.
    pub timestamp: Option<DateTime<Utc>>,
    pub tx_hash: TxHash,
    pub direction: Direction,
}

impl TransferRecord {
    /// Block time as `YYYY-MM-DD HH:MM:SS UTC`, or `"unknown"`.
    pub fn formatted_time(&self) -> String {
        self.timestamp
            .map(|t| t.format("%Y-%m-%d %H:%M:%S UTC").to_string())
            .unwrap_or_else(|| "unknown".to_string())
    }
}

/// Turn raw `Transfer` logs into records relative to `viewer`.
///
/// Logs not touching `viewer` are dropped. A self-transfer counts as sent.
/// Output is ordered by block, then by position within the block.
pub fn build_history(viewer: Address, logs: Vec<TransferLog>, decimals: u8) -> Vec<TransferRecord> {
    let mut logs: Vec<_> = logs
        .into_iter()
        .filter(|log| log.from == viewer || log.to == viewer)
        .collect();
    logs.sort_by_key(|log| (log.block_number, log.log_index));

    logs.into_iter()
        .map(|log| TransferRecord {
            direction: if log.from == viewer {
                Direction::Sent
            } else {
                Direction::Received
            },
            from: log.from,
            to: log.to,
            value: TokenAmount::from_raw(log.value, decimals),
            block_number: log.block_number,
            timestamp: log
                .timestamp
                .and_then(|secs| i64::try_from(secs).ok())
                .and_then(|secs| DateTime::from_timestamp(secs, 0)),
            tx_hash: log.tx_hash,
        })
        .collect()
}

/// Fetch and build the viewer's history.
pub async fn load_history(
    gateway: &dyn TokenGateway,
    viewer: Address,
) -> DashboardResult<Vec<TransferRecord>> {
    let decimals = gateway.decimals().await?;
    let logs = gateway.transfer_events(viewer).await?;
    let records = build_history(viewer, logs, decimals);
    tracing::debug!(viewer = %viewer, records = records.len(), "Transfer history loaded");
    Ok(records)
}
