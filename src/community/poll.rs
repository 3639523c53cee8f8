//! Community poll.
//!
//! Counts live under `pollResults` as a JSON object of option → votes. The
//! voter's choice lives under `userVote`; its presence means this device has
//! voted, and later votes change nothing.

use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::community::error::CommunityError;
use crate::community::storage::{get_json, set_json, KeyValueStore};
use crate::observability::metrics;

pub const POLL_RESULTS_KEY: &str = "pollResults";
pub const USER_VOTE_KEY: &str = "userVote";

pub const DEFAULT_OPTIONS: [&str; 5] = [
    "Staking Rewards Program",
    "NFT Integration",
    "Cross-chain Bridge",
    "Governance Voting",
    "Mobile App Development",
];

/// Result of a vote attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VoteOutcome {
    Recorded,
    /// A vote was already cast; counts are unchanged.
    AlreadyVoted { selected: String },
}

/// One row of the results view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PollTally {
    pub option: String,
    pub votes: u64,
    /// Share of all votes, rounded to the nearest whole percent.
    pub percentage: u64,
}

pub struct CommunityPoll {
    store: Arc<dyn KeyValueStore>,
    options: Vec<String>,
    counts: BTreeMap<String, u64>,
    selected: Option<String>,
}

impl CommunityPoll {
    /// Load counts and the recorded vote from `store`.
    ///
    /// Unreadable stored counts are replaced by zeros.
    pub fn load(store: Arc<dyn KeyValueStore>) -> Self {
        let mut counts: BTreeMap<String, u64> = DEFAULT_OPTIONS
            .iter()
            .map(|o| (o.to_string(), 0))
            .collect();

        match get_json::<BTreeMap<String, u64>>(store.as_ref(), POLL_RESULTS_KEY) {
            Ok(Some(saved)) => counts.extend(saved),
            Ok(None) => {}
            Err(e) => tracing::warn!(error = %e, "Ignoring unreadable poll results"),
        }

        let mut options: Vec<String> = DEFAULT_OPTIONS.iter().map(|o| o.to_string()).collect();
        for option in counts.keys() {
            if !options.contains(option) {
                options.push(option.clone());
            }
        }

        let selected = store.get(USER_VOTE_KEY);

        Self {
            store,
            options,
            counts,
            selected,
        }
    }

    pub fn has_voted(&self) -> bool {
        self.selected.is_some()
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn options(&self) -> &[String] {
        &self.options
    }

    pub fn votes(&self, option: &str) -> u64 {
        self.counts.get(option).copied().unwrap_or(0)
    }

    pub fn total_votes(&self) -> u64 {
        self.counts.values().fold(0u64, |acc, v| acc.saturating_add(*v))
    }

    /// Rounded share of `option`, 0 when nobody has voted.
    pub fn percentage(&self, option: &str) -> u64 {
        let total = self.total_votes();
        if total == 0 {
            return 0;
        }
        // Half-up rounding of votes * 100 / total.
        let (votes, total) = (u128::from(self.votes(option)), u128::from(total));
        let rounded = (votes * 200 + total) / (2 * total);
        u64::try_from(rounded).unwrap_or(100)
    }

    /// Results in display order.
    pub fn results(&self) -> Vec<PollTally> {
        self.options
            .iter()
            .map(|option| PollTally {
                option: option.clone(),
                votes: self.votes(option),
                percentage: self.percentage(option),
            })
            .collect()
    }

    /// Cast this device's vote for `option`.
    ///
    /// Option names match case-insensitively. The vote marker is written
    /// before the counts and removed again if the counts cannot be stored; a
    /// failed vote leaves no count behind.
    pub fn vote(&mut self, option: &str) -> Result<VoteOutcome, CommunityError> {
        if let Some(selected) = &self.selected {
            return Ok(VoteOutcome::AlreadyVoted {
                selected: selected.clone(),
            });
        }

        let option = self
            .options
            .iter()
            .find(|o| o.eq_ignore_ascii_case(option.trim()))
            .cloned()
            .ok_or_else(|| CommunityError::UnknownOption(option.to_string()))?;

        let mut counts = self.counts.clone();
        let count = counts.entry(option.clone()).or_insert(0);
        *count = count.saturating_add(1);

        self.store.set(USER_VOTE_KEY, option.clone())?;
        if let Err(e) = set_json(self.store.as_ref(), POLL_RESULTS_KEY, &counts) {
            if let Err(undo) = self.store.remove(USER_VOTE_KEY) {
                tracing::warn!(error = %undo, "Could not clear vote marker after failed vote");
            }
            return Err(e.into());
        }

        tracing::info!(option = %option, "Poll vote recorded");
        metrics::record_poll_vote(&option);

        self.counts = counts;
        self.selected = Some(option);
        Ok(VoteOutcome::Recorded)
    }
}
