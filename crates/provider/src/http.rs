use std::time::Duration;

use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use voyage_core::{
    ActivityOption, FlightOption, HotelOption, Itinerary, TransportOption, TripRequest,
};

use crate::{PlanningProvider, ProviderError};

/// Planning provider backed by a remote planning service. Wire form is
/// snake_case JSON with ISO-8601 timestamps; any non-success status or
/// undecodable body fails the call. Retries, if wanted, belong to the
/// caller.
#[derive(Clone)]
pub struct HttpPlanningProvider {
    client: Client,
    base_url: String,
}

#[derive(Serialize)]
struct CategorySearchRequest<'a> {
    trip_request: &'a TripRequest,
    brief: &'a str,
}

#[derive(Deserialize)]
struct FlightSearchResponse {
    flights: Vec<FlightOption>,
}

#[derive(Deserialize)]
struct HotelSearchResponse {
    hotels: Vec<HotelOption>,
}

#[derive(Deserialize)]
struct ActivitySearchResponse {
    activities: Vec<ActivityOption>,
}

#[derive(Deserialize)]
struct TransportSearchResponse {
    transportation: Vec<TransportOption>,
}

impl HttpPlanningProvider {
    pub fn new(base_url: &str) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(6))
            .timeout(Duration::from_secs(20))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    async fn post_json<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ProviderError> {
        let response = self
            .client
            .post(format!("{}{}", self.base_url, path))
            .json(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProviderError::Status(status.as_u16()));
        }

        let payload = response.text().await?;
        serde_json::from_str(&payload).map_err(|error| ProviderError::Decode(error.to_string()))
    }
}

impl PlanningProvider for HttpPlanningProvider {
    async fn plan_itinerary(&self, request: &TripRequest) -> Result<Itinerary, ProviderError> {
        self.post_json("/plan-trip", request).await
    }

    async fn search_flights(
        &self,
        request: &TripRequest,
        brief: &str,
    ) -> Result<Vec<FlightOption>, ProviderError> {
        let body = CategorySearchRequest {
            trip_request: request,
            brief,
        };
        let response: FlightSearchResponse = self.post_json("/search/flights", &body).await?;
        Ok(response.flights)
    }

    async fn search_hotels(
        &self,
        request: &TripRequest,
        brief: &str,
    ) -> Result<Vec<HotelOption>, ProviderError> {
        let body = CategorySearchRequest {
            trip_request: request,
            brief,
        };
        let response: HotelSearchResponse = self.post_json("/search/hotels", &body).await?;
        Ok(response.hotels)
    }

    async fn search_activities(
        &self,
        request: &TripRequest,
        brief: &str,
    ) -> Result<Vec<ActivityOption>, ProviderError> {
        let body = CategorySearchRequest {
            trip_request: request,
            brief,
        };
        let response: ActivitySearchResponse = self.post_json("/search/activities", &body).await?;
        Ok(response.activities)
    }

    async fn search_transportation(
        &self,
        request: &TripRequest,
        brief: &str,
    ) -> Result<Vec<TransportOption>, ProviderError> {
        let body = CategorySearchRequest {
            trip_request: request,
            brief,
        };
        let response: TransportSearchResponse =
            self.post_json("/search/transportation", &body).await?;
        Ok(response.transportation)
    }
}
