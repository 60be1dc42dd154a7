use serde::Serialize;
use tokio::sync::watch;

/// Ordered stages of a planning run. Transitions are strictly
/// sequential; a run either walks the whole ladder or fails and resets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanningStage {
    AnalyzingRequirements,
    SearchingFlights,
    FindingHotels,
    DiscoveringActivities,
    PlanningTransportation,
    BuildingSchedule,
    Finalizing,
}

impl PlanningStage {
    pub fn fraction(self) -> f64 {
        match self {
            Self::AnalyzingRequirements => 0.0,
            Self::SearchingFlights => 0.2,
            Self::FindingHotels => 0.4,
            Self::DiscoveringActivities => 0.6,
            Self::PlanningTransportation => 0.8,
            Self::BuildingSchedule => 0.9,
            Self::Finalizing => 1.0,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::AnalyzingRequirements => "Analyzing trip requirements...",
            Self::SearchingFlights => "Searching for flights...",
            Self::FindingHotels => "Finding accommodations...",
            Self::DiscoveringActivities => "Discovering activities...",
            Self::PlanningTransportation => "Planning local transportation...",
            Self::BuildingSchedule => "Creating daily itinerary...",
            Self::Finalizing => "Finalizing itinerary...",
        }
    }
}

/// Latest progress of the planner, observable by any subscriber. Idle
/// (`0.0`, empty label) is published both before any run and after a run
/// ends, successfully or not; callers track completion through the run's
/// result, not through progress.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlanningProgress {
    pub fraction: f64,
    pub label: String,
}

impl PlanningProgress {
    pub fn idle() -> Self {
        Self {
            fraction: 0.0,
            label: String::new(),
        }
    }

    pub fn is_idle(&self) -> bool {
        self.fraction == 0.0 && self.label.is_empty()
    }
}

/// Watch-channel wrapper the planner publishes stage changes through.
/// Last write wins, so an abandoned run can never wedge the channel: the
/// next run simply overwrites whatever a stale task last published.
#[derive(Debug)]
pub struct ProgressTracker {
    tx: watch::Sender<PlanningProgress>,
}

impl ProgressTracker {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(PlanningProgress::idle());
        Self { tx }
    }

    pub fn subscribe(&self) -> watch::Receiver<PlanningProgress> {
        self.tx.subscribe()
    }

    pub fn current(&self) -> PlanningProgress {
        self.tx.borrow().clone()
    }

    pub fn enter(&self, stage: PlanningStage) {
        self.tx.send_replace(PlanningProgress {
            fraction: stage.fraction(),
            label: stage.label().to_string(),
        });
    }

    pub fn reset(&self) {
        self.tx.send_replace(PlanningProgress::idle());
    }
}

impl Default for ProgressTracker {
    fn default() -> Self {
        Self::new()
    }
}
