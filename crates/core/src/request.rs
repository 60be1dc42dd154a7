use thiserror::Error;

use crate::models::TripRequest;

/// Rejections raised before any provider call is attempted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RequestError {
    #[error("departure and destination must both be provided")]
    MissingLocation,
    #[error("end date must be after start date")]
    DateOrder,
    #[error("at least one traveler is required")]
    NoTravelers,
    #[error("budget must be positive when provided")]
    NonPositiveBudget,
}

impl TripRequest {
    pub fn validate(&self) -> Result<(), RequestError> {
        if self.departure_location.trim().is_empty() || self.destination.trim().is_empty() {
            return Err(RequestError::MissingLocation);
        }
        if self.start_date >= self.end_date {
            return Err(RequestError::DateOrder);
        }
        if self.travelers == 0 {
            return Err(RequestError::NoTravelers);
        }
        if let Some(budget) = self.budget {
            if budget <= 0.0 {
                return Err(RequestError::NonPositiveBudget);
            }
        }
        Ok(())
    }
}
