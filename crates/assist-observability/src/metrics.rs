//! Fetch and session metrics.

use std::collections::BTreeMap;
use std::time::Duration;

use assist_core::SessionId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Outcome of one fetch cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FetchMetrics {
    /// Short digest of the query key.
    pub key: String,
    /// How the cache served the lookup (`hit`, `miss`, `joined`, `revalidated`).
    pub cache_status: String,
    /// Time from dispatch to completion (microseconds).
    pub duration_us: u64,
    /// Whether the fetch produced a result.
    pub success: bool,
    /// Whether the result arrived after its key was superseded and was dropped.
    pub discarded_as_stale: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub item_count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl FetchMetrics {
    pub fn new(key: impl Into<String>, cache_status: impl Into<String>, duration: Duration) -> Self {
        Self {
            key: key.into(),
            cache_status: cache_status.into(),
            duration_us: duration.as_micros() as u64,
            success: false,
            discarded_as_stale: false,
            item_count: None,
            total: None,
            error: None,
        }
    }

    /// Mark as a successful fetch of `item_count` out of `total` results.
    pub fn succeeded(mut self, item_count: usize, total: u64) -> Self {
        self.success = true;
        self.item_count = Some(item_count);
        self.total = Some(total);
        self
    }

    pub fn failed(mut self, error: impl Into<String>) -> Self {
        self.success = false;
        self.error = Some(error.into());
        self
    }

    pub fn stale(mut self) -> Self {
        self.discarded_as_stale = true;
        self
    }
}

/// Counters and fetch history for one search session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionMetrics {
    pub session_id: String,
    pub started_at: DateTime<Utc>,
    /// Dispatched user events by name.
    pub events: BTreeMap<String, u64>,
    /// Events that left the query unchanged.
    pub ignored_events: u64,
    /// Network requests issued.
    pub requests: u64,
    pub cache_hits: u64,
    pub joined: u64,
    pub revalidations: u64,
    pub failures: u64,
    pub stale_discards: u64,
    /// Follow-up fetches caused by adopting the server price range.
    pub bootstrap_refetches: u64,
    /// Completed fetches, oldest first.
    pub fetches: Vec<FetchMetrics>,
}

impl SessionMetrics {
    pub fn new(session_id: &SessionId) -> Self {
        Self {
            session_id: session_id.to_string(),
            started_at: Utc::now(),
            events: BTreeMap::new(),
            ignored_events: 0,
            requests: 0,
            cache_hits: 0,
            joined: 0,
            revalidations: 0,
            failures: 0,
            stale_discards: 0,
            bootstrap_refetches: 0,
            fetches: Vec::new(),
        }
    }

    /// Record a dispatched event and whether it changed the query.
    pub fn record_event(&mut self, name: &str, changed: bool) {
        *self.events.entry(name.to_string()).or_insert(0) += 1;
        if !changed {
            self.ignored_events += 1;
        }
    }

    pub fn record_bootstrap_refetch(&mut self) {
        self.bootstrap_refetches += 1;
    }

    /// Record a completed fetch cycle.
    pub fn record_fetch(&mut self, fetch: FetchMetrics) {
        match fetch.cache_status.as_str() {
            "hit" => self.cache_hits += 1,
            "joined" => self.joined += 1,
            "revalidated" => {
                self.revalidations += 1;
                self.requests += 1;
            }
            _ => self.requests += 1,
        }
        if !fetch.success {
            self.failures += 1;
        }
        if fetch.discarded_as_stale {
            self.stale_discards += 1;
        }
        self.fetches.push(fetch);
    }

    /// Total events dispatched.
    pub fn event_count(&self) -> u64 {
        self.events.values().sum()
    }

    /// Format as JSON.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }

    /// Format as JSON (pretty printed).
    pub fn to_json_pretty(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_default()
    }

    /// Format as human-readable summary.
    pub fn to_summary(&self) -> String {
        let mut lines = Vec::new();

        lines.push(format!(
            "Session: {} (started {})",
            self.session_id,
            self.started_at.format("%Y-%m-%d %H:%M:%S UTC")
        ));
        lines.push(format!(
            "  Events: {} ({} without effect)",
            self.event_count(),
            self.ignored_events
        ));
        lines.push(format!(
            "  Requests: {} | hits: {} | joined: {} | revalidated: {}",
            self.requests, self.cache_hits, self.joined, self.revalidations
        ));
        lines.push(format!(
            "  Failures: {} | stale discarded: {} | price refetches: {}",
            self.failures, self.stale_discards, self.bootstrap_refetches
        ));

        if !self.fetches.is_empty() {
            lines.push("  Fetches:".to_string());
            for fetch in &self.fetches {
                let outcome = match (&fetch.error, fetch.discarded_as_stale) {
                    (_, true) => "STALE".to_string(),
                    (Some(error), _) => format!("FAILED: {}", error),
                    (None, _) => format!("{} of {}", fetch.item_count.unwrap_or(0), fetch.total.unwrap_or(0)),
                };
                lines.push(format!(
                    "    {} [{}]: {:.2}ms - {}",
                    fetch.key,
                    fetch.cache_status,
                    fetch.duration_us as f64 / 1000.0,
                    outcome
                ));
            }
        }

        lines.join("\n")
    }
}
