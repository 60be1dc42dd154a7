use std::sync::Arc;

use chrono::{TimeZone, Utc};
use voyage_agents::{PlannerAgent, PlanningError, PlanningStrategy, TripSession};
use voyage_core::{
    ActivityOption, FlightOption, HotelOption, Itinerary, TransportOption, TripPreferences,
    TripRequest,
};
use voyage_observability::AppMetrics;
use voyage_provider::{PlanningProvider, Provider, ProviderError};
use voyage_storage::MemoryStore;

fn nyc_tokyo_request() -> TripRequest {
    let start = Utc.with_ymd_and_hms(2025, 9, 1, 0, 0, 0).unwrap();
    let end = Utc.with_ymd_and_hms(2025, 9, 6, 0, 0, 0).unwrap();
    TripRequest {
        departure_location: "New York".to_string(),
        destination: "Tokyo".to_string(),
        start_date: start,
        end_date: end,
        travelers: 2,
        budget: Some(5000.0),
        preferences: TripPreferences::default(),
    }
}

fn local_planner() -> PlannerAgent<Provider> {
    PlannerAgent::new(Arc::new(Provider::local()), AppMetrics::shared())
}

async fn planned_session() -> TripSession<MemoryStore> {
    let request = nyc_tokyo_request();
    let itinerary = local_planner()
        .plan_trip(&request, PlanningStrategy::LocalSynthesis)
        .await
        .expect("local synthesis should succeed");

    let mut session = TripSession::restore(Arc::new(MemoryStore::new()), AppMetrics::shared())
        .await
        .expect("restore should succeed");
    session.create_trip(request).await.unwrap();
    session.install_itinerary(itinerary).await.unwrap();
    session
}

fn itinerary(session: &TripSession<MemoryStore>) -> &Itinerary {
    session
        .current_trip()
        .and_then(|trip| trip.itinerary.as_ref())
        .expect("session should hold a planned trip")
}

/// A provider whose every answer is an HTTP 500, for exercising the
/// abort-the-run path without a network.
struct FailingProvider;

impl PlanningProvider for FailingProvider {
    async fn plan_itinerary(&self, _request: &TripRequest) -> Result<Itinerary, ProviderError> {
        Err(ProviderError::Status(500))
    }

    async fn search_flights(
        &self,
        _request: &TripRequest,
        _brief: &str,
    ) -> Result<Vec<FlightOption>, ProviderError> {
        Err(ProviderError::Status(500))
    }

    async fn search_hotels(
        &self,
        _request: &TripRequest,
        _brief: &str,
    ) -> Result<Vec<HotelOption>, ProviderError> {
        Err(ProviderError::Status(500))
    }

    async fn search_activities(
        &self,
        _request: &TripRequest,
        _brief: &str,
    ) -> Result<Vec<ActivityOption>, ProviderError> {
        Err(ProviderError::Status(500))
    }

    async fn search_transportation(
        &self,
        _request: &TripRequest,
        _brief: &str,
    ) -> Result<Vec<TransportOption>, ProviderError> {
        Err(ProviderError::Status(500))
    }
}

#[tokio::test]
async fn local_synthesis_produces_a_complete_itinerary() {
    let session = planned_session().await;
    let itinerary = itinerary(&session);

    assert_eq!(itinerary.daily_schedule.len(), 5);
    assert!(!itinerary.flights.is_empty());
    assert!(!itinerary.hotels.is_empty());
    assert_eq!(itinerary.flights.iter().filter(|f| f.selected).count(), 1);
    assert_eq!(itinerary.hotels.iter().filter(|h| h.selected).count(), 1);
    assert!(itinerary.selected_flight().is_some());
    assert!(itinerary.selected_activities().count() >= 1);
    assert_eq!(itinerary.selected_transportation().count(), 1);
    assert!(itinerary.total_cost > 0.0);
}

#[tokio::test]
async fn selecting_another_flight_shifts_total_by_price_delta_times_travelers() {
    let mut session = planned_session().await;

    let (selected_id, selected_price) = {
        let flight = itinerary(&session).selected_flight().unwrap();
        (flight.id.clone(), flight.price)
    };
    // Re-selecting the current flight lands the total on the per-edit
    // recompute rule, so the next delta is purely the flight swap.
    session.select_flight(&selected_id).await.unwrap();
    let baseline = itinerary(&session).total_cost;

    let (other_id, other_price) = itinerary(&session)
        .flights
        .iter()
        .find(|flight| !flight.selected)
        .map(|flight| (flight.id.clone(), flight.price))
        .unwrap();

    session.select_flight(&other_id).await.unwrap();

    let itinerary = itinerary(&session);
    let selected: Vec<_> = itinerary.flights.iter().filter(|f| f.selected).collect();
    assert_eq!(selected.len(), 1);
    assert_eq!(selected[0].id, other_id);

    let expected_delta = (other_price - selected_price) * 2.0;
    assert!((itinerary.total_cost - baseline - expected_delta).abs() < 1e-9);
}

#[tokio::test]
async fn toggling_an_activity_moves_total_by_its_flat_price() {
    let mut session = planned_session().await;

    let activity_id = {
        let itin = itinerary(&session);
        itin.activities
            .iter()
            .find(|activity| !activity.selected && activity.price == 25.0)
            .map(|activity| activity.id.clone())
            .expect("catalog should carry an unselected 25.0 activity")
    };

    // Normalize onto the per-edit recompute rule before measuring.
    let noop_flight = itinerary(&session).selected_flight().unwrap().id.clone();
    session.select_flight(&noop_flight).await.unwrap();
    let baseline = itinerary(&session).total_cost;

    session.toggle_activity(&activity_id).await.unwrap();
    assert!((itinerary(&session).total_cost - baseline - 25.0).abs() < 1e-9);

    session.toggle_activity(&activity_id).await.unwrap();
    assert!((itinerary(&session).total_cost - baseline).abs() < 1e-9);
}

#[tokio::test]
async fn delegated_provider_failure_aborts_run_and_leaves_trip_untouched() {
    let session = planned_session().await;
    let before = serde_json::to_string(session.current_trip().unwrap()).unwrap();

    let planner = PlannerAgent::new(Arc::new(FailingProvider), AppMetrics::shared());
    let result = planner
        .plan_trip(&nyc_tokyo_request(), PlanningStrategy::Delegated)
        .await;

    assert!(matches!(result, Err(PlanningError::Provider(_))));
    assert!(planner.progress().is_idle());

    let after = serde_json::to_string(session.current_trip().unwrap()).unwrap();
    assert_eq!(before, after);
}

#[tokio::test]
async fn category_failure_yields_no_partial_itinerary() {
    let planner = PlannerAgent::new(Arc::new(FailingProvider), AppMetrics::shared());
    let result = planner
        .plan_trip(&nyc_tokyo_request(), PlanningStrategy::LocalSynthesis)
        .await;

    assert!(matches!(result, Err(PlanningError::Provider(_))));
}

#[tokio::test]
async fn invalid_request_fails_before_any_provider_call() {
    let mut request = nyc_tokyo_request();
    request.travelers = 0;

    // A failing provider proves the request never reached it: the error
    // is the validation error, not the provider's.
    let planner = PlannerAgent::new(Arc::new(FailingProvider), AppMetrics::shared());
    let result = planner
        .plan_trip(&request, PlanningStrategy::LocalSynthesis)
        .await;

    assert!(matches!(result, Err(PlanningError::InvalidRequest(_))));
}

#[tokio::test]
async fn a_new_run_starts_cleanly_after_a_failed_one() {
    let failing = PlannerAgent::new(Arc::new(FailingProvider), AppMetrics::shared());
    let _ = failing
        .plan_trip(&nyc_tokyo_request(), PlanningStrategy::Delegated)
        .await;
    assert!(failing.progress().is_idle());

    let planner = local_planner();
    let itinerary = planner
        .plan_trip(&nyc_tokyo_request(), PlanningStrategy::LocalSynthesis)
        .await
        .expect("fresh run should succeed");
    assert!(itinerary.total_cost > 0.0);
    assert!(planner.progress().is_idle());
}

#[tokio::test]
async fn delegated_local_plan_matches_request_shape() {
    let planner = local_planner();
    let itinerary = planner
        .plan_trip(&nyc_tokyo_request(), PlanningStrategy::Delegated)
        .await
        .expect("delegated local plan should succeed");

    assert_eq!(itinerary.daily_schedule.len(), 5);
    assert_eq!(itinerary.flights.iter().filter(|f| f.selected).count(), 1);
    assert!(itinerary.total_cost > 0.0);
}
