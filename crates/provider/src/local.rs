use chrono::{Duration, Utc};
use uuid::Uuid;
use voyage_core::{
    synthesize_daily_schedule, total_cost, ActivityCategory, ActivityOption, CostBasis,
    FlightOption, HotelOption, Itinerary, TransportMode, TransportOption, TripRequest,
    DEFAULT_CURRENCY,
};

use crate::{PlanningProvider, ProviderError};

/// Offline planning provider with deterministic, destination-derived
/// catalogs. Candidate counts and pre-selection follow the same shape a
/// remote provider is expected to produce: exactly one flight and one
/// hotel pre-selected, the two leading activities, and one transport
/// option.
#[derive(Clone, Default)]
pub struct LocalPlanningProvider;

impl LocalPlanningProvider {
    pub fn new() -> Self {
        Self
    }

    fn flight_catalog(&self, request: &TripRequest) -> Vec<FlightOption> {
        let from = airport_code(&request.departure_location);
        let to = airport_code(&request.destination);
        let carriers = [
            ("Delta Air Lines", "DL123", 1200.0, 0, 0i64, true),
            ("United Airlines", "UA456", 1100.0, 1, 2, false),
            ("American Airlines", "AA789", 1300.0, 0, 4, false),
        ];

        carriers
            .iter()
            .map(
                |&(airline, flight_number, price, stops, offset_hours, selected)| {
                    let departure_time = request.start_date + Duration::hours(offset_hours);
                    FlightOption {
                        id: Uuid::new_v4().to_string(),
                        airline: airline.to_string(),
                        flight_number: flight_number.to_string(),
                        departure_time,
                        arrival_time: departure_time + Duration::hours(6),
                        departure_airport: from.clone(),
                        arrival_airport: to.clone(),
                        price,
                        currency: DEFAULT_CURRENCY.to_string(),
                        flight_class: request.preferences.flight_class,
                        duration_minutes: 360,
                        stops,
                        selected,
                        booking_link: None,
                        seat_availability: Some(24),
                    }
                },
            )
            .collect()
    }

    fn hotel_catalog(&self, request: &TripRequest) -> Vec<HotelOption> {
        let nights = request.duration_days().max(1) as f64;
        let properties = [
            ("Hilton", "Deluxe Room", 250.0, 4, 4.5, 1250, true),
            ("Marriott", "Executive Room", 280.0, 4, 4.3, 980, false),
            ("Grand Palace", "Suite", 420.0, 5, 4.8, 640, false),
        ];

        properties
            .iter()
            .map(
                |&(chain, room_type, per_night, stars, rating, reviews, selected)| HotelOption {
                    id: Uuid::new_v4().to_string(),
                    name: format!("{} {}", chain, request.destination),
                    address: format!("Central {}", request.destination),
                    star_rating: stars,
                    price_per_night: per_night,
                    currency: DEFAULT_CURRENCY.to_string(),
                    amenities: vec![
                        "WiFi".to_string(),
                        "Gym".to_string(),
                        "Restaurant".to_string(),
                    ],
                    room_type: room_type.to_string(),
                    check_in_date: request.start_date,
                    check_out_date: request.end_date,
                    total_price: per_night * nights,
                    selected,
                    booking_link: None,
                    rating: Some(rating),
                    review_count: Some(reviews),
                },
            )
            .collect()
    }

    fn activity_catalog(&self, request: &TripRequest) -> Vec<ActivityOption> {
        let destination = request.destination.as_str();
        let entries = [
            (
                format!("{} Food Market Tour", destination),
                "Walk the main market and sample local specialties",
                ActivityCategory::Food,
                50.0,
                3,
                true,
            ),
            (
                format!("{} Countryside Day Trip", destination),
                "Full-day excursion to the landmarks outside the city",
                ActivityCategory::Sightseeing,
                120.0,
                8,
                true,
            ),
            (
                format!("Old Town Walking Tour of {}", destination),
                "Guided walk through the historic quarter",
                ActivityCategory::Culture,
                25.0,
                2,
                false,
            ),
            (
                format!("{} National Museum", destination),
                "Self-paced visit with audio guide",
                ActivityCategory::Culture,
                18.0,
                2,
                false,
            ),
            (
                format!("{} Harbor Sunset Cruise", destination),
                "Evening cruise with drinks",
                ActivityCategory::Relaxation,
                65.0,
                2,
                false,
            ),
            (
                format!("Cooking Class in {}", destination),
                "Hands-on class with a local chef",
                ActivityCategory::Food,
                85.0,
                4,
                false,
            ),
            (
                format!("{} Shopping District", destination),
                "Guided tour of the main shopping streets",
                ActivityCategory::Shopping,
                10.0,
                3,
                false,
            ),
            (
                format!("{} Night Tour", destination),
                "Bars and late-night food spots with a guide",
                ActivityCategory::Nightlife,
                45.0,
                3,
                false,
            ),
        ];

        entries
            .into_iter()
            .map(
                |(name, description, category, price, hours, selected)| ActivityOption {
                    id: Uuid::new_v4().to_string(),
                    name,
                    description: description.to_string(),
                    category,
                    price,
                    currency: DEFAULT_CURRENCY.to_string(),
                    duration_hours: hours,
                    location: destination.to_string(),
                    selected,
                    booking_link: None,
                    rating: Some(4.5),
                    review_count: Some(420),
                },
            )
            .collect()
    }

    fn transport_catalog(&self, request: &TripRequest) -> Vec<TransportOption> {
        let destination = request.destination.as_str();
        let entries = [
            (TransportMode::Taxi, format!("{} Taxi Co.", destination), 80.0, 60, true),
            (
                TransportMode::PublicTransport,
                format!("{} Metro", destination),
                20.0,
                90,
                false,
            ),
            (
                TransportMode::RentalCar,
                "Regional Rent a Car".to_string(),
                150.0,
                60,
                false,
            ),
        ];

        entries
            .into_iter()
            .map(|(mode, provider, price, minutes, selected)| TransportOption {
                id: Uuid::new_v4().to_string(),
                mode,
                provider,
                price,
                currency: DEFAULT_CURRENCY.to_string(),
                duration_minutes: minutes,
                selected,
                booking_link: None,
            })
            .collect()
    }
}

impl PlanningProvider for LocalPlanningProvider {
    async fn plan_itinerary(&self, request: &TripRequest) -> Result<Itinerary, ProviderError> {
        let flights = self.flight_catalog(request);
        let hotels = self.hotel_catalog(request);
        let activities = if request.preferences.include_activities {
            self.activity_catalog(request)
        } else {
            Vec::new()
        };
        let transportation = if request.preferences.include_transportation {
            self.transport_catalog(request)
        } else {
            Vec::new()
        };

        let daily_schedule = synthesize_daily_schedule(request, &activities, &transportation);

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

    async fn search_flights(
        &self,
        request: &TripRequest,
        _brief: &str,
    ) -> Result<Vec<FlightOption>, ProviderError> {
        Ok(self.flight_catalog(request))
    }

    async fn search_hotels(
        &self,
        request: &TripRequest,
        _brief: &str,
    ) -> Result<Vec<HotelOption>, ProviderError> {
        Ok(self.hotel_catalog(request))
    }

    async fn search_activities(
        &self,
        request: &TripRequest,
        _brief: &str,
    ) -> Result<Vec<ActivityOption>, ProviderError> {
        Ok(self.activity_catalog(request))
    }

    async fn search_transportation(
        &self,
        request: &TripRequest,
        _brief: &str,
    ) -> Result<Vec<TransportOption>, ProviderError> {
        Ok(self.transport_catalog(request))
    }
}

fn airport_code(location: &str) -> String {
    let code: String = location
        .chars()
        .filter(|ch| ch.is_ascii_alphabetic())
        .take(3)
        .collect();
    if code.is_empty() {
        "XXX".to_string()
    } else {
        code.to_uppercase()
    }
}
