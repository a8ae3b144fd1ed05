//! The bounded-memory metrics collector.
//!
//! The collector is an observability window, not a log: it keeps the most
//! recent [`MAX_RECENT_REQUESTS`] records and a [`MAX_MODELS`]-entry LRU list
//! of model names eligible for statistics, so memory stays bounded under
//! unbounded request volume. Cumulative totals are the only unbounded-growth
//! counters and they are plain integers.

use crate::metric::{ModelStats, RequestMetric, TelemetryState, UNKNOWN_MODEL};
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use std::collections::{HashMap, HashSet, VecDeque};
use std::time::Duration;
use tokio::sync::broadcast;

/// Maximum number of recent records kept (FIFO eviction past the cap).
pub const MAX_RECENT_REQUESTS: usize = 1000;

/// Maximum number of distinct model names tracked for statistics (LRU
/// eviction past the cap).
pub const MAX_MODELS: usize = 20;

/// Default number of records returned in a state snapshot.
const SNAPSHOT_RECENT_LIMIT: usize = 50;

/// Capacity of the notification channel. Slow subscribers skip messages
/// instead of blocking the request path.
const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Change notification published after every recorded request.
#[derive(Debug, Clone)]
pub enum TelemetryEvent {
    /// The raw record that was just ingested.
    RequestRecorded(RequestMetric),
    /// The refreshed snapshot after ingestion.
    StateUpdated(TelemetryState),
}

#[derive(Debug)]
struct CollectorInner {
    recent: VecDeque<RequestMetric>,
    /// Model names by recency of appearance, most recent first.
    model_order: VecDeque<String>,
    total_requests: u64,
    error_count: u64,
}

/// Stateful, bounded-memory recorder of request outcomes.
///
/// All mutation happens under one write lock, so the append-and-evict and
/// LRU move-to-front sequences are atomic with respect to concurrent
/// recorders.
#[derive(Debug)]
pub struct MetricsCollector {
    inner: RwLock<CollectorInner>,
    events: broadcast::Sender<TelemetryEvent>,
    server_start_time: DateTime<Utc>,
}

impl Default for MetricsCollector {
    fn default() -> Self {
        Self::new()
    }
}

impl MetricsCollector {
    /// Creates an empty collector. One instance lives for the whole process.
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            inner: RwLock::new(CollectorInner {
                recent: VecDeque::with_capacity(MAX_RECENT_REQUESTS),
                model_order: VecDeque::with_capacity(MAX_MODELS),
                total_requests: 0,
                error_count: 0,
            }),
            events,
            server_start_time: Utc::now(),
        }
    }

    /// Ingests one request record.
    ///
    /// Appends to the recent-history ring (evicting the oldest past the cap),
    /// bumps the cumulative totals, moves the record's model to the front of
    /// the LRU list (evicting the least recently seen past the cap), then
    /// publishes change notifications. Delivery is best-effort: a send to a
    /// channel with no or lagging subscribers never blocks.
    pub fn record_request(&self, metric: RequestMetric) {
        let snapshot;
        {
            let mut inner = self.inner.write();

            inner.recent.push_back(metric.clone());
            while inner.recent.len() > MAX_RECENT_REQUESTS {
                inner.recent.pop_front();
            }

            inner.total_requests += 1;
            if metric.is_error() {
                inner.error_count += 1;
            }

            if let Some(pos) = inner.model_order.iter().position(|m| *m == metric.model) {
                let _ = inner.model_order.remove(pos);
            }
            inner.model_order.push_front(metric.model.clone());
            while inner.model_order.len() > MAX_MODELS {
                inner.model_order.pop_back();
            }

            snapshot = Self::state_locked(&inner, self.server_start_time);
        }

        let _ = self.events.send(TelemetryEvent::RequestRecorded(metric));
        let _ = self.events.send(TelemetryEvent::StateUpdated(snapshot));
    }

    /// Per-model aggregates over the current recent-history window.
    ///
    /// Only models currently in the LRU list contribute, and the
    /// [`UNKNOWN_MODEL`] sentinel never does, so failed-routing noise and
    /// evicted models cannot pollute the numbers even while their records
    /// still sit in the ring.
    pub fn get_stats(&self) -> HashMap<String, ModelStats> {
        let inner = self.inner.read();
        Self::stats_locked(&inner)
    }

    /// The most recent records, newest first, at most `limit`.
    pub fn recent_requests(&self, limit: usize) -> Vec<RequestMetric> {
        let inner = self.inner.read();
        inner.recent.iter().rev().take(limit).cloned().collect()
    }

    /// Full snapshot for the dashboard collaborator.
    pub fn get_state(&self) -> TelemetryState {
        let inner = self.inner.read();
        Self::state_locked(&inner, self.server_start_time)
    }

    /// Subscribes to change notifications. Dropping the receiver is the
    /// unsubscribe.
    pub fn subscribe(&self) -> broadcast::Receiver<TelemetryEvent> {
        self.events.subscribe()
    }

    /// When the collector was created.
    pub fn server_start_time(&self) -> DateTime<Utc> {
        self.server_start_time
    }

    /// Elapsed time since the collector was created.
    pub fn uptime(&self) -> Duration {
        (Utc::now() - self.server_start_time)
            .to_std()
            .unwrap_or(Duration::ZERO)
    }

    /// Cumulative request total.
    pub fn total_requests(&self) -> u64 {
        self.inner.read().total_requests
    }

    /// Cumulative error total.
    pub fn error_count(&self) -> u64 {
        self.inner.read().error_count
    }

    fn stats_locked(inner: &CollectorInner) -> HashMap<String, ModelStats> {
        let active: HashSet<&str> = inner.model_order.iter().map(String::as_str).collect();
        let mut stats: HashMap<String, ModelStats> = HashMap::new();

        for metric in &inner.recent {
            if metric.model == UNKNOWN_MODEL || !active.contains(metric.model.as_str()) {
                continue;
            }

            let entry = stats
                .entry(metric.model.clone())
                .or_insert_with(|| ModelStats {
                    model: metric.model.clone(),
                    request_count: 0,
                    mean_latency_ms: 0.0,
                    total_input_tokens: 0,
                    total_output_tokens: 0,
                    avg_tokens_per_second: 0.0,
                });

            entry.request_count += 1;
            entry.total_input_tokens += metric.input_tokens;
            entry.total_output_tokens += metric.output_tokens;
            // Online mean update: mean' = mean + (value - mean) / n
            let n = entry.request_count as f64;
            entry.mean_latency_ms += (metric.latency_ms as f64 - entry.mean_latency_ms) / n;
            entry.avg_tokens_per_second +=
                (metric.tokens_per_second - entry.avg_tokens_per_second) / n;
        }

        stats
    }

    fn state_locked(inner: &CollectorInner, server_start_time: DateTime<Utc>) -> TelemetryState {
        TelemetryState {
            requests: inner
                .recent
                .iter()
                .rev()
                .take(SNAPSHOT_RECENT_LIMIT)
                .cloned()
                .collect(),
            stats: Self::stats_locked(inner),
            server_start_time,
            total_requests: inner.total_requests,
            error_count: inner.error_count,
        }
    }
}
