//! Concurrent workload against a single store instance.
//!
//! Producers insert events with random ages, deleters repeatedly remove
//! the earliest matching event through a cursor, and queriers drain
//! full-range queries. Every worker runs its store calls on tokio's
//! blocking pool; the store itself needs no external locking.

use std::time::Instant;

use rand::Rng;
use serde::Serialize;
use tideline_store::{ConcurrentEventStore, EventStore};
use tideline_types::{Event, now_millis};
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use crate::config::WorkloadConfig;
use crate::error::LoadgenError;

/// Summary of one workload run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WorkloadReport {
    /// Events handed to `insert`.
    pub inserted: u64,
    /// Events deleted through deleters' cursors. A cursor that finds its
    /// event already gone does not count.
    pub removed: u64,
    /// Queries drained by queriers.
    pub queries: u64,
    /// Events seen across all drained queries.
    pub query_matches: u64,
    /// Events of the workload type left in the store afterwards.
    pub final_count: u64,
    /// Wall-clock duration of the run.
    pub elapsed_ms: u64,
}

/// What a single worker accomplished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WorkerOutcome {
    Inserted(u64),
    Removed(u64),
    Queried { queries: u64, matches: u64 },
}

/// Run the configured workload against `store` and wait for every worker.
///
/// # Errors
///
/// Returns [`LoadgenError::Worker`] if any worker panics or is cancelled.
pub async fn run(
    store: &ConcurrentEventStore,
    workload: &WorkloadConfig,
) -> Result<WorkloadReport, LoadgenError> {
    let started = Instant::now();
    let mut tasks = JoinSet::new();

    for _ in 0..workload.producers {
        let store = store.clone();
        let event_type = workload.event_type.clone();
        let count = workload.events_per_producer;
        let max_age = workload.max_age_seconds;
        tasks.spawn_blocking(move || produce(&store, &event_type, count, max_age));
    }

    for _ in 0..workload.deleters {
        let store = store.clone();
        let event_type = workload.event_type.clone();
        let attempts = workload.deletes_per_deleter;
        tasks.spawn_blocking(move || delete(&store, &event_type, attempts));
    }

    for _ in 0..workload.queriers {
        let store = store.clone();
        let event_type = workload.event_type.clone();
        let queries = workload.queries_per_querier;
        tasks.spawn_blocking(move || query(&store, &event_type, queries));
    }

    info!(
        producers = workload.producers,
        deleters = workload.deleters,
        queriers = workload.queriers,
        "Workers started"
    );

    let mut report = WorkloadReport {
        inserted: 0,
        removed: 0,
        queries: 0,
        query_matches: 0,
        final_count: 0,
        elapsed_ms: 0,
    };

    while let Some(joined) = tasks.join_next().await {
        let outcome = joined.map_err(|e| {
            warn!(error = %e, "Worker failed");
            LoadgenError::Worker {
                message: format!("{e}"),
            }
        })?;
        match outcome {
            WorkerOutcome::Inserted(n) => report.inserted = report.inserted.saturating_add(n),
            WorkerOutcome::Removed(n) => report.removed = report.removed.saturating_add(n),
            WorkerOutcome::Queried { queries, matches } => {
                report.queries = report.queries.saturating_add(queries);
                report.query_matches = report.query_matches.saturating_add(matches);
            }
        }
    }

    let remaining = store
        .query(&workload.event_type, i64::MIN, i64::MAX)
        .count();
    report.final_count = u64::try_from(remaining).unwrap_or(u64::MAX);
    report.elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

    info!(
        inserted = report.inserted,
        removed = report.removed,
        final_count = report.final_count,
        elapsed_ms = report.elapsed_ms,
        "Workload finished"
    );

    Ok(report)
}

fn produce(
    store: &ConcurrentEventStore,
    event_type: &str,
    count: u32,
    max_age_seconds: u32,
) -> WorkerOutcome {
    let mut rng = rand::rng();
    let mut inserted = 0_u64;
    for _ in 0..count {
        let age = rng.random_range(0..max_age_seconds.max(1));
        store.insert(Event::seconds_ago(event_type, i64::from(age)));
        inserted = inserted.saturating_add(1);
    }
    debug!(inserted, "Producer done");
    WorkerOutcome::Inserted(inserted)
}

fn delete(store: &ConcurrentEventStore, event_type: &str, attempts: u32) -> WorkerOutcome {
    let mut removed = 0_u64;
    for _ in 0..attempts {
        let mut cursor = store.query(event_type, 0, now_millis().saturating_add(1));
        if cursor.move_next() && cursor.remove().unwrap_or(false) {
            removed = removed.saturating_add(1);
        }
        cursor.close();
    }
    debug!(removed, "Deleter done");
    WorkerOutcome::Removed(removed)
}

fn query(store: &ConcurrentEventStore, event_type: &str, queries: u32) -> WorkerOutcome {
    let mut matches = 0_u64;
    for _ in 0..queries {
        let mut cursor = store.query(event_type, 0, now_millis().saturating_add(1));
        while cursor.move_next() {
            matches = matches.saturating_add(1);
        }
        cursor.close();
    }
    debug!(queries, matches, "Querier done");
    WorkerOutcome::Queried {
        queries: u64::from(queries),
        matches,
    }
}
