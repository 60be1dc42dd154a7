mod rate_limit;

use std::env;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use axum::body::Body;
use axum::extract::{Json, State};
use axum::http::{Method, Request, StatusCode};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::Router;
use serde::Deserialize;
use tokio::sync::Mutex;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;
use voyage_agents::{create_booking, PlannerAgent, PlanningError, PlanningStrategy, TripSession};
use voyage_core::{OptionCategory, TripRequest};
use voyage_observability::AppMetrics;
use voyage_provider::Provider;
use voyage_storage::Store;

use crate::rate_limit::IpRateLimiter;

#[derive(Clone)]
pub struct ApiState {
    pub planner: Arc<PlannerAgent<Provider>>,
    pub session: Arc<Mutex<TripSession<Store>>>,
    pub metrics: Arc<AppMetrics>,
    pub api_key: String,
    pub limiter: IpRateLimiter,
}

pub async fn build_app() -> Result<Router> {
    let metrics = AppMetrics::shared();

    let provider = match env::var("VOYAGE_PROVIDER_URL") {
        Ok(url) => Provider::http(&url).context("failed building planning provider client")?,
        Err(_) => Provider::local(),
    };

    let store = if let Ok(database_url) = env::var("VOYAGE_DATABASE_URL") {
        Store::sqlite(&database_url).await?
    } else {
        Store::memory()
    };

    let session = TripSession::restore(Arc::new(store), metrics.clone()).await?;
    let planner = PlannerAgent::new(Arc::new(provider), metrics.clone());

    let api_key = env::var("VOYAGE_API_KEY").unwrap_or_else(|_| "dev-voyage-key".to_string());
    let rate_limit_window = Duration::from_secs(
        env::var("VOYAGE_RATE_LIMIT_WINDOW_SECONDS")
            .ok()
            .and_then(|value| value.parse::<u64>().ok())
            .unwrap_or(60),
    );
    let rate_limit_max = env::var("VOYAGE_RATE_LIMIT_MAX")
        .ok()
        .and_then(|value| value.parse::<usize>().ok())
        .unwrap_or(80);

    let state = ApiState {
        planner: Arc::new(planner),
        session: Arc::new(Mutex::new(session)),
        metrics,
        api_key,
        limiter: IpRateLimiter::new(rate_limit_window, rate_limit_max),
    };

    Ok(build_router(state))
}

pub fn build_router(state: ApiState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/v1/plan_trip", post(plan_trip))
        .route("/v1/plan_progress", get(plan_progress))
        .route("/v1/trips", get(trips))
        .route("/v1/trips/current", get(current_trip))
        .route("/v1/select", post(select_option))
        .route("/v1/status", post(set_status))
        .route("/v1/book", post(book))
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(RequestBodyLimitLayer::new(64 * 1024))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            api_key_middleware,
        ))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            rate_limit_middleware,
        ))
        .with_state(state)
}

async fn health(State(state): State<ApiState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(serde_json::json!({
            "status": "ok",
            "timestamp_utc": chrono::Utc::now().to_rfc3339(),
            "metrics": state.metrics.snapshot(),
        })),
    )
}

#[derive(Debug, Deserialize)]
struct PlanTripBody {
    #[serde(flatten)]
    request: TripRequest,
    strategy: Option<String>,
}

async fn plan_trip(
    State(state): State<ApiState>,
    Json(body): Json<PlanTripBody>,
) -> Response {
    let strategy = match body.strategy.as_deref() {
        None => PlanningStrategy::LocalSynthesis,
        Some(value) => match PlanningStrategy::parse(value) {
            Some(strategy) => strategy,
            None => {
                return error_response(
                    StatusCode::BAD_REQUEST,
                    "invalid_strategy",
                    "strategy must be 'local' or 'delegated'",
                )
            }
        },
    };

    let itinerary = match state.planner.plan_trip(&body.request, strategy).await {
        Ok(itinerary) => itinerary,
        Err(error @ PlanningError::InvalidRequest(_)) => {
            return error_response(StatusCode::BAD_REQUEST, "invalid_request", &error.to_string())
        }
        Err(error @ PlanningError::Provider(_)) => {
            return error_response(StatusCode::BAD_GATEWAY, "provider_error", &error.to_string())
        }
    };

    let mut session = state.session.lock().await;
    let trip = match session.create_trip(body.request).await {
        Ok(trip) => trip,
        Err(error) => return internal_error(error),
    };
    if let Err(error) = session.install_itinerary(itinerary).await {
        return internal_error(error);
    }

    match session.current_trip() {
        Some(current) => (StatusCode::OK, Json(current.clone())).into_response(),
        None => (StatusCode::OK, Json(trip)).into_response(),
    }
}

async fn plan_progress(State(state): State<ApiState>) -> impl IntoResponse {
    (StatusCode::OK, Json(state.planner.progress()))
}

async fn trips(State(state): State<ApiState>) -> impl IntoResponse {
    let session = state.session.lock().await;
    (StatusCode::OK, Json(session.history().to_vec()))
}

async fn current_trip(State(state): State<ApiState>) -> Response {
    let session = state.session.lock().await;
    match session.current_trip() {
        Some(trip) => (StatusCode::OK, Json(trip.clone())).into_response(),
        None => error_response(StatusCode::NOT_FOUND, "no_current_trip", "no trip in progress"),
    }
}

#[derive(Debug, Deserialize)]
struct SelectBody {
    category: String,
    id: String,
}

async fn select_option(
    State(state): State<ApiState>,
    Json(body): Json<SelectBody>,
) -> Response {
    let Some(category) = OptionCategory::parse(&body.category) else {
        return error_response(
            StatusCode::BAD_REQUEST,
            "invalid_category",
            "category must be one of flights, hotels, activities, transportation",
        );
    };

    let mut session = state.session.lock().await;
    let result = match category {
        OptionCategory::Flights => session.select_flight(&body.id).await,
        OptionCategory::Hotels => session.select_hotel(&body.id).await,
        OptionCategory::Activities => session.toggle_activity(&body.id).await,
        OptionCategory::Transportation => session.select_transportation(&body.id).await,
    };
    if let Err(error) = result {
        return internal_error(error);
    }

    match session.current_trip() {
        Some(trip) => (StatusCode::OK, Json(trip.clone())).into_response(),
        None => error_response(StatusCode::NOT_FOUND, "no_current_trip", "no trip in progress"),
    }
}

#[derive(Debug, Deserialize)]
struct StatusBody {
    status: String,
}

async fn set_status(
    State(state): State<ApiState>,
    Json(body): Json<StatusBody>,
) -> Response {
    let mut session = state.session.lock().await;
    let result = match body.status.trim().to_lowercase().as_str() {
        "booked" => session.mark_as_booked().await,
        "completed" => session.mark_as_completed().await,
        "cancelled" => session.cancel_trip().await,
        _ => {
            return error_response(
                StatusCode::BAD_REQUEST,
                "invalid_status",
                "status must be one of booked, completed, cancelled",
            )
        }
    };
    if let Err(error) = result {
        return internal_error(error);
    }

    match session.current_trip() {
        Some(trip) => (StatusCode::OK, Json(trip.clone())).into_response(),
        None => error_response(StatusCode::NOT_FOUND, "no_current_trip", "no trip in progress"),
    }
}

async fn book(State(state): State<ApiState>) -> Response {
    let mut session = state.session.lock().await;

    let booking = {
        let Some(trip) = session.current_trip() else {
            return error_response(StatusCode::NOT_FOUND, "no_current_trip", "no trip in progress");
        };
        let Some(itinerary) = trip.itinerary.as_ref() else {
            return error_response(
                StatusCode::CONFLICT,
                "no_itinerary",
                "trip has not been planned yet",
            );
        };

        match create_booking(trip, itinerary) {
            Ok(booking) => booking,
            Err(error) => {
                return error_response(StatusCode::CONFLICT, "booking_rejected", &error.to_string())
            }
        }
    };

    if let Err(error) = session.mark_as_booked().await {
        return internal_error(error);
    }

    (StatusCode::OK, Json(booking)).into_response()
}

async fn api_key_middleware(
    State(state): State<ApiState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let path = request.uri().path().to_string();
    if request.method() == Method::OPTIONS || is_public_endpoint(path.as_str()) {
        return next.run(request).await;
    }

    let header_key = request
        .headers()
        .get("x-api-key")
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();

    if header_key != state.api_key {
        return error_response(
            StatusCode::UNAUTHORIZED,
            "unauthorized",
            "missing or invalid x-api-key",
        );
    }

    next.run(request).await
}

async fn rate_limit_middleware(
    State(state): State<ApiState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    if request.method() == Method::OPTIONS || is_public_endpoint(request.uri().path()) {
        return next.run(request).await;
    }

    let ip = request
        .headers()
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .unwrap_or("local")
        .trim()
        .to_string();

    if !state.limiter.allow(&ip) {
        return error_response(
            StatusCode::TOO_MANY_REQUESTS,
            "rate_limited",
            "rate limit exceeded for this IP",
        );
    }

    next.run(request).await
}

fn is_public_endpoint(path: &str) -> bool {
    path == "/health"
}

fn error_response(status: StatusCode, code: &str, message: &str) -> Response {
    (
        status,
        Json(serde_json::json!({
            "error": code,
            "message": message,
        })),
    )
        .into_response()
}

fn internal_error(error: anyhow::Error) -> Response {
    tracing::error!(error = %error, "request failed");
    error_response(
        StatusCode::INTERNAL_SERVER_ERROR,
        "internal_error",
        "request could not be completed",
    )
}
