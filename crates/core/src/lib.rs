pub mod cost;
pub mod models;
pub mod request;
pub mod schedule;

pub use cost::{total_cost, CostBasis, DAILY_MEAL_ESTIMATE};
pub use models::*;
pub use request::RequestError;
pub use schedule::synthesize_daily_schedule;
