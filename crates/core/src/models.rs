use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const DEFAULT_CURRENCY: &str = "USD";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlightClass {
    Economy,
    PremiumEconomy,
    Business,
    First,
}

impl FlightClass {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "economy" | "coach" => Some(Self::Economy),
            "premium_economy" | "premium economy" | "premium" => Some(Self::PremiumEconomy),
            "business" => Some(Self::Business),
            "first" | "first_class" | "first class" => Some(Self::First),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Economy => "economy",
            Self::PremiumEconomy => "premium_economy",
            Self::Business => "business",
            Self::First => "first",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TripStatus {
    Planning,
    Planned,
    Booked,
    Completed,
    Cancelled,
}

impl TripStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Planning => "planning",
            Self::Planned => "planned",
            Self::Booked => "booked",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }

    /// Position in the lifecycle ladder. Used only to spot backward
    /// writes; transitions themselves are unguarded.
    pub fn rank(self) -> u8 {
        match self {
            Self::Planning => 0,
            Self::Planned => 1,
            Self::Booked => 2,
            Self::Completed => 3,
            Self::Cancelled => 4,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityCategory {
    Sightseeing,
    Adventure,
    Food,
    Culture,
    Relaxation,
    Shopping,
    Nightlife,
    Sports,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransportMode {
    Taxi,
    Rideshare,
    PublicTransport,
    RentalCar,
    Shuttle,
    Train,
    Bus,
}

impl TransportMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Taxi => "taxi",
            Self::Rideshare => "rideshare",
            Self::PublicTransport => "public_transport",
            Self::RentalCar => "rental_car",
            Self::Shuttle => "shuttle",
            Self::Train => "train",
            Self::Bus => "bus",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MealType {
    Breakfast,
    Lunch,
    Dinner,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TripPreferences {
    pub flight_class: FlightClass,
    pub hotel_star_rating: u8,
    pub include_activities: bool,
    pub include_transportation: bool,
    pub dietary_restrictions: Vec<String>,
    pub accessibility_needs: Vec<String>,
    pub preferred_airlines: Vec<String>,
    pub preferred_hotel_chains: Vec<String>,
}

impl Default for TripPreferences {
    fn default() -> Self {
        Self {
            flight_class: FlightClass::Economy,
            hotel_star_rating: 3,
            include_activities: true,
            include_transportation: true,
            dietary_restrictions: Vec::new(),
            accessibility_needs: Vec::new(),
            preferred_airlines: Vec::new(),
            preferred_hotel_chains: Vec::new(),
        }
    }
}

/// User-submitted travel parameters. Immutable once handed to the
/// orchestrator for a planning run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TripRequest {
    pub departure_location: String,
    pub destination: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub travelers: u32,
    pub budget: Option<f64>,
    #[serde(default)]
    pub preferences: TripPreferences,
}

impl TripRequest {
    /// Whole days between the trip dates, clamped to zero for inverted
    /// ranges so derived per-day metrics never divide by a negative.
    pub fn duration_days(&self) -> i64 {
        (self.end_date.date_naive() - self.start_date.date_naive())
            .num_days()
            .max(0)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlightOption {
    pub id: String,
    pub airline: String,
    pub flight_number: String,
    pub departure_time: DateTime<Utc>,
    pub arrival_time: DateTime<Utc>,
    pub departure_airport: String,
    pub arrival_airport: String,
    pub price: f64,
    pub currency: String,
    pub flight_class: FlightClass,
    pub duration_minutes: u32,
    pub stops: u32,
    pub selected: bool,
    pub booking_link: Option<String>,
    pub seat_availability: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HotelOption {
    pub id: String,
    pub name: String,
    pub address: String,
    pub star_rating: u8,
    pub price_per_night: f64,
    pub currency: String,
    pub amenities: Vec<String>,
    pub room_type: String,
    pub check_in_date: DateTime<Utc>,
    pub check_out_date: DateTime<Utc>,
    /// Stay total, already adjusted for nights and room count.
    pub total_price: f64,
    pub selected: bool,
    pub booking_link: Option<String>,
    pub rating: Option<f64>,
    pub review_count: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityOption {
    pub id: String,
    pub name: String,
    pub description: String,
    pub category: ActivityCategory,
    pub price: f64,
    pub currency: String,
    pub duration_hours: u32,
    pub location: String,
    pub selected: bool,
    pub booking_link: Option<String>,
    pub rating: Option<f64>,
    pub review_count: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransportOption {
    pub id: String,
    pub mode: TransportMode,
    pub provider: String,
    pub price: f64,
    pub currency: String,
    pub duration_minutes: u32,
    pub selected: bool,
    pub booking_link: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OptionCategory {
    Flights,
    Hotels,
    Activities,
    Transportation,
}

impl OptionCategory {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "flight" | "flights" => Some(Self::Flights),
            "hotel" | "hotels" => Some(Self::Hotels),
            "activity" | "activities" => Some(Self::Activities),
            "transport" | "transportation" => Some(Self::Transportation),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Flights => "flights",
            Self::Hotels => "hotels",
            Self::Activities => "activities",
            Self::Transportation => "transportation",
        }
    }
}

/// One bookable candidate, tagged by kind. This is the typed form of
/// the source's any-kind alternatives list: callers dispatch on the tag
/// instead of inspecting runtime types.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TravelOption {
    Flight(FlightOption),
    Hotel(HotelOption),
    Activity(ActivityOption),
    Transport(TransportOption),
}

impl TravelOption {
    pub fn id(&self) -> &str {
        match self {
            Self::Flight(option) => &option.id,
            Self::Hotel(option) => &option.id,
            Self::Activity(option) => &option.id,
            Self::Transport(option) => &option.id,
        }
    }

    pub fn price(&self) -> f64 {
        match self {
            Self::Flight(option) => option.price,
            Self::Hotel(option) => option.total_price,
            Self::Activity(option) => option.price,
            Self::Transport(option) => option.price,
        }
    }

    pub fn currency(&self) -> &str {
        match self {
            Self::Flight(option) => &option.currency,
            Self::Hotel(option) => &option.currency,
            Self::Activity(option) => &option.currency,
            Self::Transport(option) => &option.currency,
        }
    }

    pub fn is_selected(&self) -> bool {
        match self {
            Self::Flight(option) => option.selected,
            Self::Hotel(option) => option.selected,
            Self::Activity(option) => option.selected,
            Self::Transport(option) => option.selected,
        }
    }

    pub fn label(&self) -> String {
        match self {
            Self::Flight(option) => format!("{} {}", option.airline, option.flight_number),
            Self::Hotel(option) => option.name.clone(),
            Self::Activity(option) => option.name.clone(),
            Self::Transport(option) => {
                format!("{} ({})", option.provider, option.mode.as_str())
            }
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduledActivity {
    pub activity: ActivityOption,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub location: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Meal {
    pub meal_type: MealType,
    pub estimated_cost: f64,
    pub currency: String,
    pub time: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DaySchedule {
    pub date: DateTime<Utc>,
    pub activities: Vec<ScheduledActivity>,
    pub meals: Vec<Meal>,
    pub transportation: Vec<TransportOption>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Itinerary {
    pub id: String,
    pub flights: Vec<FlightOption>,
    pub hotels: Vec<HotelOption>,
    pub activities: Vec<ActivityOption>,
    pub transportation: Vec<TransportOption>,
    pub daily_schedule: Vec<DaySchedule>,
    pub total_cost: f64,
    pub currency: String,
    pub created_at: DateTime<Utc>,
}

impl Itinerary {
    pub fn selected_flight(&self) -> Option<&FlightOption> {
        self.flights.iter().find(|flight| flight.selected)
    }

    pub fn selected_hotel(&self) -> Option<&HotelOption> {
        self.hotels.iter().find(|hotel| hotel.selected)
    }

    pub fn selected_activities(&self) -> impl Iterator<Item = &ActivityOption> {
        self.activities.iter().filter(|activity| activity.selected)
    }

    pub fn selected_transportation(&self) -> impl Iterator<Item = &TransportOption> {
        self.transportation.iter().filter(|option| option.selected)
    }

    /// Category view over the option lists as tagged `TravelOption`s.
    pub fn options_in(&self, category: OptionCategory) -> Vec<TravelOption> {
        match category {
            OptionCategory::Flights => self
                .flights
                .iter()
                .cloned()
                .map(TravelOption::Flight)
                .collect(),
            OptionCategory::Hotels => self
                .hotels
                .iter()
                .cloned()
                .map(TravelOption::Hotel)
                .collect(),
            OptionCategory::Activities => self
                .activities
                .iter()
                .cloned()
                .map(TravelOption::Activity)
                .collect(),
            OptionCategory::Transportation => self
                .transportation
                .iter()
                .cloned()
                .map(TravelOption::Transport)
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Trip {
    pub id: String,
    #[serde(flatten)]
    pub request: TripRequest,
    pub status: TripStatus,
    pub itinerary: Option<Itinerary>,
    pub created_at: DateTime<Utc>,
}

impl Trip {
    pub fn new(request: TripRequest) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            request,
            status: TripStatus::Planning,
            itinerary: None,
            created_at: Utc::now(),
        }
    }

    pub fn duration_days(&self) -> i64 {
        self.request.duration_days()
    }
}
