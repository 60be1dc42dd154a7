use std::collections::HashMap;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use tracing::{debug, warn};
use voyage_core::{
    total_cost, CostBasis, Itinerary, OptionCategory, TravelOption, Trip, TripRequest, TripStatus,
};
use voyage_observability::AppMetrics;
use voyage_storage::TripRepository;

/// Owner of the current trip and the trip history for one planning
/// session.
///
/// Every selection edit mutates the itinerary, recomputes `total_cost`
/// on the per-edit basis, and writes the trip back into history: insert
/// for a new id, in-place replace otherwise, keeping insertion order.
/// Edits that reference an unknown id are absorbed as no-ops. With no
/// current trip every operation is a safe no-op.
pub struct TripSession<S: TripRepository> {
    current: Option<Trip>,
    history: Vec<Trip>,
    store: Arc<S>,
    metrics: Arc<AppMetrics>,
}

impl<S: TripRepository> TripSession<S> {
    pub async fn restore(store: Arc<S>, metrics: Arc<AppMetrics>) -> Result<Self> {
        let history = store
            .load_trips()
            .await
            .context("failed loading trip history")?;

        Ok(Self {
            current: None,
            history,
            store,
            metrics,
        })
    }

    pub fn current_trip(&self) -> Option<&Trip> {
        self.current.as_ref()
    }

    pub fn history(&self) -> &[Trip] {
        &self.history
    }

    pub fn trip_count(&self) -> usize {
        self.history.len()
    }

    pub async fn create_trip(&mut self, request: TripRequest) -> Result<Trip> {
        let trip = Trip::new(request);
        self.current = Some(trip.clone());
        self.persist_current().await?;
        Ok(trip)
    }

    pub async fn adopt_trip(&mut self, trip: Trip) -> Result<()> {
        self.current = Some(trip);
        self.persist_current().await
    }

    /// Orchestrator handoff: the session takes ownership of the planned
    /// itinerary and is from here on the only writer of its total cost.
    pub async fn install_itinerary(&mut self, itinerary: Itinerary) -> Result<()> {
        let Some(trip) = self.current.as_mut() else {
            return Ok(());
        };

        trip.itinerary = Some(itinerary);
        trip.status = TripStatus::Planned;
        self.persist_current().await
    }

    pub fn clear_current(&mut self) {
        self.current = None;
    }

    pub async fn delete_trip(&mut self, trip_id: &str) -> Result<()> {
        if self
            .current
            .as_ref()
            .is_some_and(|trip| trip.id == trip_id)
        {
            self.current = None;
        }
        self.history.retain(|trip| trip.id != trip_id);
        self.save_history().await
    }

    pub async fn select_flight(&mut self, flight_id: &str) -> Result<()> {
        self.edit_itinerary(|itinerary| {
            if itinerary.flights.iter().any(|flight| flight.id == flight_id) {
                for flight in &mut itinerary.flights {
                    flight.selected = flight.id == flight_id;
                }
            } else {
                debug!(flight_id, "select_flight target not in itinerary");
            }
        })
        .await
    }

    pub async fn select_hotel(&mut self, hotel_id: &str) -> Result<()> {
        self.edit_itinerary(|itinerary| {
            if itinerary.hotels.iter().any(|hotel| hotel.id == hotel_id) {
                for hotel in &mut itinerary.hotels {
                    hotel.selected = hotel.id == hotel_id;
                }
            } else {
                debug!(hotel_id, "select_hotel target not in itinerary");
            }
        })
        .await
    }

    pub async fn toggle_activity(&mut self, activity_id: &str) -> Result<()> {
        self.edit_itinerary(|itinerary| {
            match itinerary
                .activities
                .iter_mut()
                .find(|activity| activity.id == activity_id)
            {
                Some(activity) => activity.selected = !activity.selected,
                None => debug!(activity_id, "toggle_activity target not in itinerary"),
            }
        })
        .await
    }

    /// Single choice per transport mode: selecting a taxi deselects the
    /// previous taxi but leaves train/metro selections alone.
    pub async fn select_transportation(&mut self, transport_id: &str) -> Result<()> {
        self.edit_itinerary(|itinerary| {
            let target_mode = itinerary
                .transportation
                .iter()
                .find(|option| option.id == transport_id)
                .map(|option| option.mode);

            match target_mode {
                Some(mode) => {
                    for option in &mut itinerary.transportation {
                        if option.mode == mode {
                            option.selected = option.id == transport_id;
                        }
                    }
                }
                None => debug!(transport_id, "select_transportation target not in itinerary"),
            }
        })
        .await
    }

    pub async fn mark_as_booked(&mut self) -> Result<()> {
        self.set_status(TripStatus::Booked).await
    }

    pub async fn mark_as_completed(&mut self) -> Result<()> {
        self.set_status(TripStatus::Completed).await
    }

    pub async fn cancel_trip(&mut self) -> Result<()> {
        self.set_status(TripStatus::Cancelled).await
    }

    pub fn alternatives(&self, category: OptionCategory) -> Vec<TravelOption> {
        self.current
            .as_ref()
            .and_then(|trip| trip.itinerary.as_ref())
            .map(|itinerary| itinerary.options_in(category))
            .unwrap_or_default()
    }

    pub fn search_trips(&self, query: &str) -> Vec<&Trip> {
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            return self.history.iter().collect();
        }

        self.history
            .iter()
            .filter(|trip| {
                trip.request
                    .departure_location
                    .to_lowercase()
                    .contains(&query)
                    || trip.request.destination.to_lowercase().contains(&query)
            })
            .collect()
    }

    pub fn trips_by_status(&self, status: TripStatus) -> Vec<&Trip> {
        self.history
            .iter()
            .filter(|trip| trip.status == status)
            .collect()
    }

    pub fn trips_in_range(&self, from: DateTime<Utc>, to: DateTime<Utc>) -> Vec<&Trip> {
        self.history
            .iter()
            .filter(|trip| trip.request.start_date >= from && trip.request.end_date <= to)
            .collect()
    }

    pub fn upcoming_trips(&self) -> Vec<&Trip> {
        let now = Utc::now();
        self.history
            .iter()
            .filter(|trip| trip.request.start_date > now && trip.status == TripStatus::Booked)
            .collect()
    }

    pub fn total_spent(&self) -> f64 {
        self.history
            .iter()
            .filter(|trip| trip.status == TripStatus::Completed)
            .filter_map(|trip| trip.itinerary.as_ref())
            .map(|itinerary| itinerary.total_cost)
            .sum()
    }

    pub fn average_trip_cost(&self) -> f64 {
        let completed = self
            .history
            .iter()
            .filter(|trip| trip.status == TripStatus::Completed)
            .count();
        if completed == 0 {
            return 0.0;
        }
        self.total_spent() / completed as f64
    }

    pub fn most_visited_destination(&self) -> Option<String> {
        let mut counts: HashMap<&str, usize> = HashMap::new();
        for trip in self
            .history
            .iter()
            .filter(|trip| trip.status == TripStatus::Completed)
        {
            *counts.entry(trip.request.destination.as_str()).or_default() += 1;
        }

        counts
            .into_iter()
            .max_by(|a, b| a.1.cmp(&b.1).then_with(|| b.0.cmp(&a.0)))
            .map(|(destination, _)| destination.to_string())
    }

    async fn set_status(&mut self, status: TripStatus) -> Result<()> {
        let Some(trip) = self.current.as_mut() else {
            return Ok(());
        };

        if status.rank() < trip.status.rank() {
            warn!(
                from = trip.status.as_str(),
                to = status.as_str(),
                trip_id = %trip.id,
                "backward status transition"
            );
        }
        trip.status = status;
        self.persist_current().await
    }

    /// Applies one edit atomically: the itinerary is mutated and its
    /// total recomputed before the (only) await point, so readers can
    /// never observe a half-updated trip.
    async fn edit_itinerary<F>(&mut self, edit: F) -> Result<()>
    where
        F: FnOnce(&mut Itinerary),
    {
        let Some(trip) = self.current.as_mut() else {
            return Ok(());
        };
        let travelers = trip.request.travelers;
        let duration = trip.request.duration_days();
        let Some(itinerary) = trip.itinerary.as_mut() else {
            return Ok(());
        };

        edit(itinerary);
        itinerary.total_cost = total_cost(itinerary, travelers, duration, CostBasis::Selection);

        self.metrics.inc_selection_edit();
        self.persist_current().await
    }

    async fn persist_current(&mut self) -> Result<()> {
        if let Some(current) = &self.current {
            match self.history.iter_mut().find(|trip| trip.id == current.id) {
                Some(slot) => *slot = current.clone(),
                None => self.history.push(current.clone()),
            }
        }
        self.save_history().await
    }

    async fn save_history(&self) -> Result<()> {
        self.store
            .save_trips(&self.history)
            .await
            .context("failed saving trip history")?;
        self.metrics.inc_trips_persisted();
        Ok(())
    }
}
