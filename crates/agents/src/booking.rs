use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;
use voyage_core::{Itinerary, Trip};

#[derive(Debug, Error)]
pub enum BookingError {
    #[error("invalid trip data: {0}")]
    InvalidTrip(&'static str),
    #[error("invalid itinerary selection: {0}")]
    InvalidSelection(&'static str),
    #[error("flight {0} has no seats left for the requested travelers")]
    Unavailable(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Failed,
    Cancelled,
}

#[derive(Debug, Clone, Serialize)]
pub struct Booking {
    pub id: String,
    pub trip_id: String,
    pub reference: String,
    pub total_amount: f64,
    pub currency: String,
    pub status: BookingStatus,
    pub confirmation_numbers: Vec<String>,
    pub created_at: DateTime<Utc>,
}

/// Validates a finalized selection and produces a booking record.
/// Payment capture, confirmation email, and calendar export are handled
/// outside this system.
pub fn create_booking(trip: &Trip, itinerary: &Itinerary) -> Result<Booking, BookingError> {
    validate_booking(trip, itinerary)?;

    let created_at = Utc::now();
    Ok(Booking {
        id: Uuid::new_v4().to_string(),
        trip_id: trip.id.clone(),
        reference: format!(
            "VC-{}-{}",
            created_at.format("%Y%m%d"),
            short_code(6).to_uppercase()
        ),
        total_amount: itinerary.total_cost,
        currency: itinerary.currency.clone(),
        status: BookingStatus::Confirmed,
        confirmation_numbers: confirmation_numbers(itinerary),
        created_at,
    })
}

fn validate_booking(trip: &Trip, itinerary: &Itinerary) -> Result<(), BookingError> {
    if trip.request.validate().is_err() {
        return Err(BookingError::InvalidTrip("trip request is not bookable"));
    }
    if itinerary.total_cost <= 0.0 {
        return Err(BookingError::InvalidSelection("total cost must be positive"));
    }
    let Some(flight) = itinerary.selected_flight() else {
        return Err(BookingError::InvalidSelection("no flight selected"));
    };
    if itinerary.selected_hotel().is_none() {
        return Err(BookingError::InvalidSelection("no hotel selected"));
    }

    if flight.seat_availability.unwrap_or(0) < trip.request.travelers {
        return Err(BookingError::Unavailable(flight.flight_number.clone()));
    }

    Ok(())
}

fn confirmation_numbers(itinerary: &Itinerary) -> Vec<String> {
    let mut confirmations = Vec::new();

    for flight in itinerary.flights.iter().filter(|flight| flight.selected) {
        confirmations.push(format!(
            "FL-{}-{}",
            prefix(&flight.airline, 2),
            short_code(6)
        ));
    }
    for hotel in itinerary.hotels.iter().filter(|hotel| hotel.selected) {
        confirmations.push(format!("HT-{}-{}", prefix(&hotel.name, 3), short_code(6)));
    }
    for activity in itinerary.selected_activities() {
        confirmations.push(format!("AC-{}-{}", prefix(&activity.name, 3), short_code(6)));
    }

    confirmations
}

fn prefix(value: &str, len: usize) -> String {
    value
        .chars()
        .filter(|ch| ch.is_ascii_alphanumeric())
        .take(len)
        .collect::<String>()
        .to_uppercase()
}

fn short_code(len: usize) -> String {
    Uuid::new_v4().simple().to_string()[..len].to_string()
}
