use std::sync::Arc;

use chrono::{Duration, TimeZone, Utc};
use voyage_agents::{create_booking, BookingError, PlannerAgent, PlanningStrategy, TripSession};
use voyage_core::{
    total_cost, CostBasis, OptionCategory, TransportMode, TripPreferences, TripRequest, TripStatus,
};
use voyage_observability::AppMetrics;
use voyage_provider::Provider;
use voyage_storage::{MemoryStore, TripRepository};

fn request(destination: &str, days: i64) -> TripRequest {
    let start = Utc.with_ymd_and_hms(2025, 9, 1, 0, 0, 0).unwrap();
    TripRequest {
        departure_location: "New York".to_string(),
        destination: destination.to_string(),
        start_date: start,
        end_date: start + Duration::days(days),
        travelers: 2,
        budget: Some(5000.0),
        preferences: TripPreferences::default(),
    }
}

async fn planned_session(store: Arc<MemoryStore>) -> TripSession<MemoryStore> {
    let request = request("Tokyo", 5);
    let planner = PlannerAgent::new(Arc::new(Provider::local()), AppMetrics::shared());
    let itinerary = planner
        .plan_trip(&request, PlanningStrategy::LocalSynthesis)
        .await
        .unwrap();

    let mut session = TripSession::restore(store, AppMetrics::shared()).await.unwrap();
    session.create_trip(request).await.unwrap();
    session.install_itinerary(itinerary).await.unwrap();
    session
}

fn current_itinerary(session: &TripSession<MemoryStore>) -> &voyage_core::Itinerary {
    session
        .current_trip()
        .and_then(|trip| trip.itinerary.as_ref())
        .unwrap()
}

#[tokio::test]
async fn at_most_one_flight_and_hotel_stay_selected() {
    let mut session = planned_session(Arc::new(MemoryStore::new())).await;

    let flight_ids: Vec<String> = current_itinerary(&session)
        .flights
        .iter()
        .map(|flight| flight.id.clone())
        .collect();
    let hotel_ids: Vec<String> = current_itinerary(&session)
        .hotels
        .iter()
        .map(|hotel| hotel.id.clone())
        .collect();

    for id in flight_ids.iter().chain(flight_ids.iter().rev()) {
        session.select_flight(id).await.unwrap();
        let selected = current_itinerary(&session)
            .flights
            .iter()
            .filter(|flight| flight.selected)
            .count();
        assert_eq!(selected, 1);
    }

    for id in &hotel_ids {
        session.select_hotel(id).await.unwrap();
        let selected = current_itinerary(&session)
            .hotels
            .iter()
            .filter(|hotel| hotel.selected)
            .count();
        assert_eq!(selected, 1);
    }
}

#[tokio::test]
async fn transport_selection_is_exclusive_per_mode_only() {
    let mut session = planned_session(Arc::new(MemoryStore::new())).await;

    let metro_id = current_itinerary(&session)
        .transportation
        .iter()
        .find(|option| option.mode == TransportMode::PublicTransport)
        .map(|option| option.id.clone())
        .unwrap();
    let taxi_id = current_itinerary(&session)
        .transportation
        .iter()
        .find(|option| option.mode == TransportMode::Taxi)
        .map(|option| option.id.clone())
        .unwrap();

    session.select_transportation(&metro_id).await.unwrap();
    session.select_transportation(&taxi_id).await.unwrap();

    let itinerary = current_itinerary(&session);
    let selected_modes: Vec<TransportMode> = itinerary
        .transportation
        .iter()
        .filter(|option| option.selected)
        .map(|option| option.mode)
        .collect();

    // The taxi selection must not have evicted the metro selection.
    assert!(selected_modes.contains(&TransportMode::Taxi));
    assert!(selected_modes.contains(&TransportMode::PublicTransport));
    for mode in [TransportMode::Taxi, TransportMode::PublicTransport] {
        let per_mode = itinerary
            .transportation
            .iter()
            .filter(|option| option.mode == mode && option.selected)
            .count();
        assert_eq!(per_mode, 1);
    }
}

#[tokio::test]
async fn toggle_activity_is_its_own_inverse() {
    let mut session = planned_session(Arc::new(MemoryStore::new())).await;

    let before: Vec<(String, bool)> = current_itinerary(&session)
        .activities
        .iter()
        .map(|activity| (activity.id.clone(), activity.selected))
        .collect();
    let target = before[2].0.clone();

    session.toggle_activity(&target).await.unwrap();
    session.toggle_activity(&target).await.unwrap();

    let after: Vec<(String, bool)> = current_itinerary(&session)
        .activities
        .iter()
        .map(|activity| (activity.id.clone(), activity.selected))
        .collect();
    assert_eq!(before, after);
}

#[tokio::test]
async fn total_cost_always_matches_the_per_edit_recompute() {
    let mut session = planned_session(Arc::new(MemoryStore::new())).await;

    let flight_id = current_itinerary(&session).flights[1].id.clone();
    let activity_id = current_itinerary(&session).activities[4].id.clone();

    session.select_flight(&flight_id).await.unwrap();
    session.toggle_activity(&activity_id).await.unwrap();

    let trip = session.current_trip().unwrap();
    let itinerary = trip.itinerary.as_ref().unwrap();
    let expected = total_cost(
        itinerary,
        trip.request.travelers,
        trip.request.duration_days(),
        CostBasis::Selection,
    );
    assert_eq!(itinerary.total_cost, expected);
}

#[tokio::test]
async fn unknown_ids_are_absorbed_without_changing_selection() {
    let mut session = planned_session(Arc::new(MemoryStore::new())).await;

    let selection_before: Vec<bool> = current_itinerary(&session)
        .flights
        .iter()
        .map(|flight| flight.selected)
        .collect();

    session.select_flight("no-such-id").await.unwrap();
    session.select_hotel("no-such-id").await.unwrap();
    session.toggle_activity("no-such-id").await.unwrap();
    session.select_transportation("no-such-id").await.unwrap();

    let selection_after: Vec<bool> = current_itinerary(&session)
        .flights
        .iter()
        .map(|flight| flight.selected)
        .collect();
    assert_eq!(selection_before, selection_after);

    // The recompute still ran: the stored total now reflects the
    // per-edit rule rather than the synthesis-time rule.
    let trip = session.current_trip().unwrap();
    let itinerary = trip.itinerary.as_ref().unwrap();
    let expected = total_cost(
        itinerary,
        trip.request.travelers,
        trip.request.duration_days(),
        CostBasis::Selection,
    );
    assert_eq!(itinerary.total_cost, expected);
}

#[tokio::test]
async fn operations_without_a_current_trip_are_safe_noops() {
    let mut session = TripSession::restore(Arc::new(MemoryStore::new()), AppMetrics::shared())
        .await
        .unwrap();

    session.select_flight("anything").await.unwrap();
    session.toggle_activity("anything").await.unwrap();
    session.mark_as_booked().await.unwrap();
    session.cancel_trip().await.unwrap();

    assert!(session.current_trip().is_none());
    assert_eq!(session.trip_count(), 0);
}

#[tokio::test]
async fn history_upsert_preserves_insertion_order() {
    let store = Arc::new(MemoryStore::new());
    let mut session = TripSession::restore(store.clone(), AppMetrics::shared())
        .await
        .unwrap();

    let first = session.create_trip(request("Tokyo", 5)).await.unwrap();
    session.create_trip(request("Lisbon", 3)).await.unwrap();
    session.create_trip(request("Oslo", 2)).await.unwrap();

    // Re-adopting and mutating the first trip must update it in place.
    session.adopt_trip(first.clone()).await.unwrap();
    session.mark_as_booked().await.unwrap();

    let destinations: Vec<String> = session
        .history()
        .iter()
        .map(|trip| trip.request.destination.clone())
        .collect();
    assert_eq!(destinations, vec!["Tokyo", "Lisbon", "Oslo"]);
    assert_eq!(session.history()[0].status, TripStatus::Booked);

    // And the same order is what reached the store.
    let persisted = store.load_trips().await.unwrap();
    let stored: Vec<String> = persisted
        .iter()
        .map(|trip| trip.request.destination.clone())
        .collect();
    assert_eq!(stored, vec!["Tokyo", "Lisbon", "Oslo"]);
}

#[tokio::test]
async fn status_writes_are_unguarded_last_write_wins() {
    let mut session = planned_session(Arc::new(MemoryStore::new())).await;

    session.mark_as_completed().await.unwrap();
    assert_eq!(session.current_trip().unwrap().status, TripStatus::Completed);

    session.mark_as_booked().await.unwrap();
    assert_eq!(session.current_trip().unwrap().status, TripStatus::Booked);

    session.cancel_trip().await.unwrap();
    assert_eq!(session.current_trip().unwrap().status, TripStatus::Cancelled);
}

#[tokio::test]
async fn history_stats_cover_completed_trips() {
    let store = Arc::new(MemoryStore::new());
    let mut session = TripSession::restore(store, AppMetrics::shared()).await.unwrap();

    for destination in ["Tokyo", "Tokyo", "Lisbon"] {
        let planner = PlannerAgent::new(Arc::new(Provider::local()), AppMetrics::shared());
        let req = request(destination, 4);
        let itinerary = planner
            .plan_trip(&req, PlanningStrategy::LocalSynthesis)
            .await
            .unwrap();
        session.create_trip(req).await.unwrap();
        session.install_itinerary(itinerary).await.unwrap();
        session.mark_as_completed().await.unwrap();
    }

    assert_eq!(session.trip_count(), 3);
    assert!(session.total_spent() > 0.0);
    assert!((session.average_trip_cost() - session.total_spent() / 3.0).abs() < 1e-9);
    assert_eq!(session.most_visited_destination().as_deref(), Some("Tokyo"));
    assert_eq!(session.trips_by_status(TripStatus::Completed).len(), 3);
    assert!(session.search_trips("tok").len() == 2);

    let window_start = Utc.with_ymd_and_hms(2025, 8, 1, 0, 0, 0).unwrap();
    let window_end = Utc.with_ymd_and_hms(2025, 10, 1, 0, 0, 0).unwrap();
    assert_eq!(session.trips_in_range(window_start, window_end).len(), 3);

    // A booked trip whose start date is still ahead counts as upcoming.
    let mut future = request("Reykjavik", 4);
    future.start_date = Utc::now() + Duration::days(30);
    future.end_date = future.start_date + Duration::days(4);
    session.create_trip(future).await.unwrap();
    session.mark_as_booked().await.unwrap();
    assert_eq!(session.upcoming_trips().len(), 1);
}

#[tokio::test]
async fn delete_trip_drops_it_from_history_and_current() {
    let mut session = planned_session(Arc::new(MemoryStore::new())).await;
    let trip_id = session.current_trip().unwrap().id.clone();

    session.delete_trip(&trip_id).await.unwrap();
    assert!(session.current_trip().is_none());
    assert_eq!(session.trip_count(), 0);
}

#[tokio::test]
async fn clearing_current_keeps_history() {
    let mut session = planned_session(Arc::new(MemoryStore::new())).await;

    session.clear_current();
    assert!(session.current_trip().is_none());
    assert_eq!(session.trip_count(), 1);
}

#[tokio::test]
async fn alternatives_view_tags_options_by_category() {
    let session = planned_session(Arc::new(MemoryStore::new())).await;

    let flights = session.alternatives(OptionCategory::Flights);
    let activities = session.alternatives(OptionCategory::Activities);

    assert_eq!(flights.len(), 3);
    assert!(activities.len() >= 8);
    assert_eq!(flights.iter().filter(|option| option.is_selected()).count(), 1);
    for option in &flights {
        assert!(option.price() > 0.0);
        assert!(!option.id().is_empty());
    }
}

#[tokio::test]
async fn booking_requires_a_selected_flight_with_enough_seats() {
    let session = planned_session(Arc::new(MemoryStore::new())).await;
    let trip = session.current_trip().unwrap();
    let itinerary = trip.itinerary.as_ref().unwrap();

    let booking = create_booking(trip, itinerary).expect("finalized selection should book");
    assert!(booking.reference.starts_with("VC-"));
    assert!(!booking.confirmation_numbers.is_empty());

    // Shrinking seat availability below the traveler count rejects it.
    let mut cramped = itinerary.clone();
    for flight in &mut cramped.flights {
        flight.seat_availability = Some(1);
    }
    let result = create_booking(trip, &cramped);
    assert!(matches!(result, Err(BookingError::Unavailable(_))));

    // Clearing the hotel selection rejects it too.
    let mut hotelless = itinerary.clone();
    for hotel in &mut hotelless.hotels {
        hotel.selected = false;
    }
    let result = create_booking(trip, &hotelless);
    assert!(matches!(result, Err(BookingError::InvalidSelection(_))));
}
