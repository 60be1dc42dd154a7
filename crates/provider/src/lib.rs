mod http;
mod local;

use thiserror::Error;
use voyage_core::{ActivityOption, FlightOption, HotelOption, Itinerary, TransportOption, TripRequest};

pub use http::HttpPlanningProvider;
pub use local::LocalPlanningProvider;

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("provider request failed: {0}")]
    Network(#[from] reqwest::Error),
    #[error("provider returned status {0}")]
    Status(u16),
    #[error("provider response could not be decoded: {0}")]
    Decode(String),
}

/// Capability that turns a trip request into bookable candidates.
///
/// `plan_itinerary` is the delegated mode: one round trip returning a
/// complete itinerary. The `search_*` calls are the category mode; each
/// takes the request plus a natural-language brief composed by the
/// caller, and the provider decides candidate count and which items
/// arrive pre-selected.
pub trait PlanningProvider: Send + Sync {
    async fn plan_itinerary(&self, request: &TripRequest) -> Result<Itinerary, ProviderError>;

    async fn search_flights(
        &self,
        request: &TripRequest,
        brief: &str,
    ) -> Result<Vec<FlightOption>, ProviderError>;

    async fn search_hotels(
        &self,
        request: &TripRequest,
        brief: &str,
    ) -> Result<Vec<HotelOption>, ProviderError>;

    async fn search_activities(
        &self,
        request: &TripRequest,
        brief: &str,
    ) -> Result<Vec<ActivityOption>, ProviderError>;

    async fn search_transportation(
        &self,
        request: &TripRequest,
        brief: &str,
    ) -> Result<Vec<TransportOption>, ProviderError>;
}

#[derive(Clone)]
pub enum Provider {
    Http(HttpPlanningProvider),
    Local(LocalPlanningProvider),
}

impl Provider {
    pub fn local() -> Self {
        Self::Local(LocalPlanningProvider::new())
    }

    pub fn http(base_url: &str) -> Result<Self, ProviderError> {
        Ok(Self::Http(HttpPlanningProvider::new(base_url)?))
    }
}

impl PlanningProvider for Provider {
    async fn plan_itinerary(&self, request: &TripRequest) -> Result<Itinerary, ProviderError> {
        match self {
            Provider::Http(provider) => provider.plan_itinerary(request).await,
            Provider::Local(provider) => provider.plan_itinerary(request).await,
        }
    }

    async fn search_flights(
        &self,
        request: &TripRequest,
        brief: &str,
    ) -> Result<Vec<FlightOption>, ProviderError> {
        match self {
            Provider::Http(provider) => provider.search_flights(request, brief).await,
            Provider::Local(provider) => provider.search_flights(request, brief).await,
        }
    }

    async fn search_hotels(
        &self,
        request: &TripRequest,
        brief: &str,
    ) -> Result<Vec<HotelOption>, ProviderError> {
        match self {
            Provider::Http(provider) => provider.search_hotels(request, brief).await,
            Provider::Local(provider) => provider.search_hotels(request, brief).await,
        }
    }

    async fn search_activities(
        &self,
        request: &TripRequest,
        brief: &str,
    ) -> Result<Vec<ActivityOption>, ProviderError> {
        match self {
            Provider::Http(provider) => provider.search_activities(request, brief).await,
            Provider::Local(provider) => provider.search_activities(request, brief).await,
        }
    }

    async fn search_transportation(
        &self,
        request: &TripRequest,
        brief: &str,
    ) -> Result<Vec<TransportOption>, ProviderError> {
        match self {
            Provider::Http(provider) => provider.search_transportation(request, brief).await,
            Provider::Local(provider) => provider.search_transportation(request, brief).await,
        }
    }
}
