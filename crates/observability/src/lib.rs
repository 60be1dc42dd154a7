use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use once_cell::sync::OnceCell;
use serde::Serialize;
use tracing_subscriber::EnvFilter;

static TRACING_INIT: OnceCell<()> = OnceCell::new();

#[derive(Debug, Default)]
pub struct AppMetrics {
    planning_runs_total: AtomicU64,
    planning_failures_total: AtomicU64,
    provider_calls_total: AtomicU64,
    selection_edits_total: AtomicU64,
    trips_persisted_total: AtomicU64,
    total_latency_millis: AtomicU64,
}

#[derive(Debug, Clone, Serialize)]
pub struct MetricsSnapshot {
    pub planning_runs_total: u64,
    pub planning_failures_total: u64,
    pub provider_calls_total: u64,
    pub selection_edits_total: u64,
    pub trips_persisted_total: u64,
    pub avg_planning_latency_millis: f64,
}

impl AppMetrics {
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn inc_planning_run(&self) {
        self.planning_runs_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_planning_failure(&self) {
        self.planning_failures_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_provider_call(&self) {
        self.provider_calls_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_selection_edit(&self) {
        self.selection_edits_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_trips_persisted(&self) {
        self.trips_persisted_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn observe_planning_latency(&self, duration: Duration) {
        self.total_latency_millis
            .fetch_add(duration.as_millis() as u64, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        let runs = self.planning_runs_total.load(Ordering::Relaxed);
        let latency = self.total_latency_millis.load(Ordering::Relaxed);

        MetricsSnapshot {
            planning_runs_total: runs,
            planning_failures_total: self.planning_failures_total.load(Ordering::Relaxed),
            provider_calls_total: self.provider_calls_total.load(Ordering::Relaxed),
            selection_edits_total: self.selection_edits_total.load(Ordering::Relaxed),
            trips_persisted_total: self.trips_persisted_total.load(Ordering::Relaxed),
            avg_planning_latency_millis: if runs == 0 {
                0.0
            } else {
                latency as f64 / runs as f64
            },
        }
    }
}

pub fn init_tracing(service_name: &str) {
    TRACING_INIT.get_or_init(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}=info,voyage_api=info,voyage_agents=info",
                service_name
            ))
        });

        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_current_span(true)
            .with_span_list(true)
            .init();
    });
}
