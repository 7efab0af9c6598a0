//! Persisted queue of leads the relay could not take.
//!
//! The queue is a JSON array of [`QueueEntry`] under [`STORAGE_KEY`]. Reads never fail: missing,
//! unreadable or malformed state is an empty queue, and individual entries that do not match the
//! schema are skipped. Writes report success as a `bool` because callers only need to know whether
//! the lead is safe, not why it is not.

use std::sync::Arc;

use lead_core::{QueueEntry, Submission};
use lead_telemetry::{record_counter, record_outcome};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::clock::Clock;
use crate::store::KeyValueStore;
use crate::transport::RelayTransport;

pub const STORAGE_KEY: &str = "pendingOrders";

/// Result of one delivery attempt from the form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeliveryOutcome {
    pub ok: bool,
    pub queued: bool,
}

impl DeliveryOutcome {
    pub const SENT: Self = Self {
        ok: true,
        queued: false,
    };
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlushReport {
    pub attempted: usize,
    pub delivered: usize,
    pub remaining: usize,
    /// False when the shortened queue could not be written back; delivered leads are then still
    /// stored and go out again on the next flush.
    pub persisted: bool,
}

impl Default for FlushReport {
    fn default() -> Self {
        Self {
            attempted: 0,
            delivered: 0,
            remaining: 0,
            persisted: true,
        }
    }
}

pub struct PendingQueue<S> {
    store: S,
    clock: Arc<dyn Clock>,
}

impl<S: KeyValueStore> PendingQueue<S> {
    pub fn new(store: S, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Current queue contents in delivery order.
    pub fn entries(&self) -> Vec<QueueEntry> {
        let raw = match self.store.get(STORAGE_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(err) => {
                warn!(error = %err, "failed to read pending leads");
                return Vec::new();
            }
        };

        let items: Vec<Value> = match serde_json::from_str(&raw) {
            Ok(items) => items,
            Err(err) => {
                warn!(error = %err, "pending leads are not a JSON array; treating as empty");
                return Vec::new();
            }
        };

        let total = items.len();
        let entries: Vec<QueueEntry> = items
            .into_iter()
            .filter_map(|item| serde_json::from_value(item).ok())
            .collect();
        if entries.len() != total {
            warn!(
                skipped = total - entries.len(),
                "dropping pending leads that do not match the queue schema"
            );
        }
        entries
    }

    /// Appends `submission` stamped with the current time. Returns whether it was persisted.
    pub fn enqueue(&self, submission: Submission) -> bool {
        let mut entries = self.entries();
        entries.push(QueueEntry::new(submission, self.clock.now()));
        let saved = self.save(&entries);
        if saved {
            info!(pending = entries.len(), "lead queued for retry");
        }
        saved
    }

    /// Retries every queued lead in order, one at a time, and keeps only the ones that failed.
    pub async fn flush<T>(&self, transport: &T) -> FlushReport
    where
        T: RelayTransport + ?Sized,
    {
        let pending = self.entries();
        if pending.is_empty() {
            return FlushReport::default();
        }

        let attempted = pending.len();
        let mut still_pending = Vec::new();
        for entry in pending {
            match transport.submit(&entry.payload).await {
                Ok(()) => debug!(created_at = entry.created_at, "queued lead delivered"),
                Err(err) => {
                    debug!(error = %err, created_at = entry.created_at, "queued lead still failing");
                    still_pending.push(entry);
                }
            }
        }

        let report = FlushReport {
            attempted,
            delivered: attempted - still_pending.len(),
            remaining: still_pending.len(),
            persisted: self.save(&still_pending),
        };
        if !report.persisted {
            warn!(
                delivered = report.delivered,
                "flushed leads stay queued and will be sent again"
            );
            return report;
        }
        record_counter("lead_client_flush_total", report.delivered as u64);
        info!(
            attempted = report.attempted,
            delivered = report.delivered,
            remaining = report.remaining,
            "pending leads flushed"
        );
        report
    }

    /// Sends `submission` now, falling back to the queue when the relay fails.
    pub async fn deliver<T>(&self, submission: &Submission, transport: &T) -> DeliveryOutcome
    where
        T: RelayTransport + ?Sized,
    {
        match transport.submit(submission).await {
            Ok(()) => {
                record_outcome("lead_client_deliveries_total", "sent");
                DeliveryOutcome::SENT
            }
            Err(err) => {
                warn!(error = %err, "relay unavailable, keeping lead locally");
                let queued = self.enqueue(submission.clone());
                record_outcome(
                    "lead_client_deliveries_total",
                    if queued { "queued" } else { "failed" },
                );
                DeliveryOutcome { ok: false, queued }
            }
        }
    }

    fn save(&self, entries: &[QueueEntry]) -> bool {
        let raw = match serde_json::to_string(entries) {
            Ok(raw) => raw,
            Err(err) => {
                warn!(error = %err, "failed to encode pending leads");
                return false;
            }
        };
        match self.store.set(STORAGE_KEY, &raw) {
            Ok(()) => true,
            Err(err) => {
                warn!(error = %err, "failed to persist pending leads");
                false
            }
        }
    }
}
