use crate::models::Itinerary;

/// Per-traveler per-day food estimate folded in at synthesis time only.
pub const DAILY_MEAL_ESTIMATE: f64 = 60.0;

pub const BREAKFAST_COST: f64 = 15.0;
pub const LUNCH_COST: f64 = 25.0;
pub const DINNER_COST: f64 = 35.0;

pub const BREAKFAST_HOUR: i64 = 8;
pub const LUNCH_HOUR: i64 = 13;
pub const DINNER_HOUR: i64 = 19;

/// Which rule set applies at a call site. The source computed trip-level
/// and per-edit totals with different arithmetic; the basis makes that
/// difference an explicit argument instead of an accident.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CostBasis {
    /// Initial planning: activities scale with traveler count and the
    /// daily meal estimate is included.
    Synthesis,
    /// Per-edit recompute: selected prices only, no meal estimate,
    /// activities flat.
    Selection,
}

/// Total cost of the itinerary's currently-selected options.
///
/// Pure and deterministic: the same selection state, traveler count,
/// duration, and basis always produce the same amount. Flights scale
/// with traveler count under both bases; hotel totals are already
/// stay-adjusted; one transport option per mode contributes flat.
/// Callers guarantee `travelers >= 1`; `duration` is clamped at zero.
pub fn total_cost(itinerary: &Itinerary, travelers: u32, duration: i64, basis: CostBasis) -> f64 {
    let travelers = f64::from(travelers.max(1));
    let duration = duration.max(0) as f64;

    let flights: f64 = itinerary
        .flights
        .iter()
        .filter(|flight| flight.selected)
        .map(|flight| flight.price)
        .sum::<f64>()
        * travelers;

    let hotels: f64 = itinerary
        .hotels
        .iter()
        .filter(|hotel| hotel.selected)
        .map(|hotel| hotel.total_price)
        .sum();

    let activity_sum: f64 = itinerary
        .activities
        .iter()
        .filter(|activity| activity.selected)
        .map(|activity| activity.price)
        .sum();
    let activities = match basis {
        CostBasis::Synthesis => activity_sum * travelers,
        CostBasis::Selection => activity_sum,
    };

    let transportation: f64 = itinerary
        .transportation
        .iter()
        .filter(|option| option.selected)
        .map(|option| option.price)
        .sum();

    let meals = match basis {
        CostBasis::Synthesis => DAILY_MEAL_ESTIMATE * travelers * duration,
        CostBasis::Selection => 0.0,
    };

    flights + hotels + activities + transportation + meals
}
