use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use thiserror::Error;
use tokio::sync::watch;
use tracing::{info, instrument, warn};
use uuid::Uuid;
use voyage_core::{
    synthesize_daily_schedule, total_cost, CostBasis, Itinerary, RequestError, TripRequest,
    DEFAULT_CURRENCY,
};
use voyage_observability::AppMetrics;
use voyage_provider::{PlanningProvider, ProviderError};

use crate::progress::{PlanningProgress, PlanningStage, ProgressTracker};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanningStrategy {
    /// One round trip: the provider returns a complete itinerary.
    Delegated,
    /// Category-by-category provider calls, then local schedule and cost
    /// assembly.
    LocalSynthesis,
}

impl PlanningStrategy {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "delegated" | "backend" => Some(Self::Delegated),
            "local" | "local_synthesis" => Some(Self::LocalSynthesis),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Delegated => "delegated",
            Self::LocalSynthesis => "local_synthesis",
        }
    }
}

#[derive(Debug, Error)]
pub enum PlanningError {
    #[error("invalid trip request: {0}")]
    InvalidRequest(#[from] RequestError),
    #[error("planning provider failed: {0}")]
    Provider(#[from] ProviderError),
}

/// Drives the end-to-end planning pipeline against a planning provider
/// and publishes stage progress to subscribers.
pub struct PlannerAgent<P: PlanningProvider> {
    provider: Arc<P>,
    metrics: Arc<AppMetrics>,
    progress: ProgressTracker,
}

impl<P: PlanningProvider> PlannerAgent<P> {
    pub fn new(provider: Arc<P>, metrics: Arc<AppMetrics>) -> Self {
        Self {
            provider,
            metrics,
            progress: ProgressTracker::new(),
        }
    }

    pub fn subscribe_progress(&self) -> watch::Receiver<PlanningProgress> {
        self.progress.subscribe()
    }

    pub fn progress(&self) -> PlanningProgress {
        self.progress.current()
    }

    /// Runs the full pipeline. Fails fast on an invalid request before
    /// any provider call; any provider failure aborts the run with no
    /// partial itinerary. Progress returns to idle on both outcomes.
    #[instrument(skip_all, fields(destination = %request.destination, strategy = strategy.as_str()))]
    pub async fn plan_trip(
        &self,
        request: &TripRequest,
        strategy: PlanningStrategy,
    ) -> Result<Itinerary, PlanningError> {
        let started = Instant::now();
        self.metrics.inc_planning_run();

        let result = self.run(request, strategy).await;
        self.progress.reset();
        self.metrics.observe_planning_latency(started.elapsed());

        match &result {
            Ok(itinerary) => info!(
                itinerary_id = %itinerary.id,
                total_cost = itinerary.total_cost,
                days = itinerary.daily_schedule.len(),
                "planning run finished"
            ),
            Err(error) => {
                self.metrics.inc_planning_failure();
                warn!(error = %error, "planning run failed");
            }
        }

        result
    }

    async fn run(
        &self,
        request: &TripRequest,
        strategy: PlanningStrategy,
    ) -> Result<Itinerary, PlanningError> {
        self.progress.enter(PlanningStage::AnalyzingRequirements);
        request.validate()?;

        match strategy {
            PlanningStrategy::Delegated => {
                self.metrics.inc_provider_call();
                let itinerary = self.provider.plan_itinerary(request).await?;
                self.progress.enter(PlanningStage::Finalizing);
                Ok(itinerary)
            }
            PlanningStrategy::LocalSynthesis => self.synthesize_locally(request).await,
        }
    }

    async fn synthesize_locally(&self, request: &TripRequest) -> Result<Itinerary, PlanningError> {
        self.progress.enter(PlanningStage::SearchingFlights);
        self.metrics.inc_provider_call();
        let flights = self
            .provider
            .search_flights(request, &flight_brief(request))
            .await?;

        self.progress.enter(PlanningStage::FindingHotels);
        self.metrics.inc_provider_call();
        let hotels = self
            .provider
            .search_hotels(request, &hotel_brief(request))
            .await?;

        self.progress.enter(PlanningStage::DiscoveringActivities);
        self.metrics.inc_provider_call();
        let activities = self
            .provider
            .search_activities(request, &activity_brief(request))
            .await?;

        self.progress.enter(PlanningStage::PlanningTransportation);
        self.metrics.inc_provider_call();
        let transportation = self
            .provider
            .search_transportation(request, &transport_brief(request))
            .await?;

        self.progress.enter(PlanningStage::BuildingSchedule);
        let daily_schedule = synthesize_daily_schedule(request, &activities, &transportation);

        self.progress.enter(PlanningStage::Finalizing);
        let mut itinerary = Itinerary {
            id: Uuid::new_v4().to_string(),
            flights,
            hotels,
            activities,
            transportation,
            daily_schedule,
            total_cost: 0.0,
            currency: DEFAULT_CURRENCY.to_string(),
            created_at: Utc::now(),
        };
        itinerary.total_cost = total_cost(
            &itinerary,
            request.travelers,
            request.duration_days(),
            CostBasis::Synthesis,
        );

        Ok(itinerary)
    }
}

fn budget_hint(request: &TripRequest) -> String {
    match request.budget {
        Some(budget) => format!("${budget:.0}"),
        None => "flexible".to_string(),
    }
}

fn flight_brief(request: &TripRequest) -> String {
    format!(
        "Find 3-5 {} class flights from {} to {} for {} traveler(s), departing {} and returning {}. \
         Budget consideration: {}. Preferred airlines: {}.",
        request.preferences.flight_class.as_str(),
        request.departure_location,
        request.destination,
        request.travelers,
        request.start_date.format("%Y-%m-%d"),
        request.end_date.format("%Y-%m-%d"),
        budget_hint(request),
        join_or_none(&request.preferences.preferred_airlines),
    )
}

fn hotel_brief(request: &TripRequest) -> String {
    format!(
        "Find 3-5 hotels in {} for {} traveler(s) from {} to {}, minimum {} stars. \
         Budget consideration: {}. Preferred chains: {}.",
        request.destination,
        request.travelers,
        request.start_date.format("%Y-%m-%d"),
        request.end_date.format("%Y-%m-%d"),
        request.preferences.hotel_star_rating,
        budget_hint(request),
        join_or_none(&request.preferences.preferred_hotel_chains),
    )
}

fn activity_brief(request: &TripRequest) -> String {
    format!(
        "Find 8-12 activities and attractions in {} for a {}-day trip with {} traveler(s), \
         covering sightseeing, culture, food, and adventure. Budget consideration: {}.",
        request.destination,
        request.duration_days(),
        request.travelers,
        budget_hint(request),
    )
}

fn transport_brief(request: &TripRequest) -> String {
    format!(
        "Find 3-5 local transportation options in {} for {} traveler(s) over {} day(s), \
         including airport transfers, local transit, and car rental. Budget consideration: {}.",
        request.destination,
        request.travelers,
        request.duration_days(),
        budget_hint(request),
    )
}

fn join_or_none(values: &[String]) -> String {
    if values.is_empty() {
        "none".to_string()
    } else {
        values.join(", ")
    }
}
