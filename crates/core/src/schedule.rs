use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};

use crate::cost::{
    BREAKFAST_COST, BREAKFAST_HOUR, DINNER_COST, DINNER_HOUR, LUNCH_COST, LUNCH_HOUR,
};
use crate::models::{
    ActivityOption, DaySchedule, Meal, MealType, ScheduledActivity, TransportOption,
    TripRequest, DEFAULT_CURRENCY,
};

const ACTIVITIES_PER_DAY: usize = 2;
const SLOT_HOURS: i64 = 3;
const FIRST_SLOT_HOUR: i64 = 9;

/// Builds one `DaySchedule` per day of the trip from the currently
/// selected activities and transportation.
///
/// Deterministic: the same selected sets produce the same slot times,
/// meal list, and transport attachments on every run. A non-positive
/// duration yields an empty schedule.
pub fn synthesize_daily_schedule(
    request: &TripRequest,
    activities: &[ActivityOption],
    transportation: &[TransportOption],
) -> Vec<DaySchedule> {
    let duration = request.duration_days();
    if duration <= 0 {
        return Vec::new();
    }

    let selected_activities: Vec<&ActivityOption> = activities
        .iter()
        .filter(|activity| activity.selected)
        .take(ACTIVITIES_PER_DAY)
        .collect();
    let day_transport: Vec<TransportOption> = transportation
        .iter()
        .filter(|option| option.selected)
        .cloned()
        .collect();
    let currency = selected_activities
        .first()
        .map(|activity| activity.currency.clone())
        .or_else(|| day_transport.first().map(|option| option.currency.clone()))
        .unwrap_or_else(|| DEFAULT_CURRENCY.to_string());

    let mut schedule = Vec::with_capacity(duration as usize);
    for day in 0..duration {
        let date = request.start_date.date_naive() + Duration::days(day);

        let scheduled = selected_activities
            .iter()
            .enumerate()
            .map(|(slot, activity)| {
                let start_time = at_hour(date, FIRST_SLOT_HOUR + slot as i64 * SLOT_HOURS);
                ScheduledActivity {
                    activity: (*activity).clone(),
                    start_time,
                    end_time: start_time + Duration::hours(SLOT_HOURS),
                    location: activity.location.clone(),
                }
            })
            .collect();

        let meals = vec![
            meal(MealType::Breakfast, BREAKFAST_COST, date, BREAKFAST_HOUR, &currency),
            meal(MealType::Lunch, LUNCH_COST, date, LUNCH_HOUR, &currency),
            meal(MealType::Dinner, DINNER_COST, date, DINNER_HOUR, &currency),
        ];

        schedule.push(DaySchedule {
            date: at_hour(date, 0),
            activities: scheduled,
            meals,
            transportation: day_transport.clone(),
        });
    }

    schedule
}

fn at_hour(date: NaiveDate, hour: i64) -> DateTime<Utc> {
    date.and_time(NaiveTime::MIN).and_utc() + Duration::hours(hour)
}

fn meal(meal_type: MealType, cost: f64, date: NaiveDate, hour: i64, currency: &str) -> Meal {
    Meal {
        meal_type,
        estimated_cost: cost,
        currency: currency.to_string(),
        time: at_hour(date, hour),
    }
}
