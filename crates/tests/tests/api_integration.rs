use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use serde_json::json;
use tower::ServiceExt;
use voyage_api::build_app;

const API_KEY: &str = "dev-voyage-key";

fn plan_body() -> String {
    json!({
        "departure_location": "New York",
        "destination": "Tokyo",
        "start_date": "2025-09-01T00:00:00Z",
        "end_date": "2025-09-06T00:00:00Z",
        "travelers": 2,
        "budget": 5000.0,
        "strategy": "local"
    })
    .to_string()
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn health_is_public() {
    let app = build_app().await.expect("app should build");

    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn plan_trip_requires_api_key() {
    let app = build_app().await.expect("app should build");

    let request = Request::builder()
        .method("POST")
        .uri("/v1/plan_trip")
        .header("content-type", "application/json")
        .body(Body::from(plan_body()))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn rejects_invalid_trip_requests() {
    let app = build_app().await.expect("app should build");

    let request = Request::builder()
        .method("POST")
        .uri("/v1/plan_trip")
        .header("content-type", "application/json")
        .header("x-api-key", API_KEY)
        .body(Body::from(
            json!({
                "departure_location": "New York",
                "destination": "Tokyo",
                "start_date": "2025-09-06T00:00:00Z",
                "end_date": "2025-09-01T00:00:00Z",
                "travelers": 2
            })
            .to_string(),
        ))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn plan_select_and_book_flow() {
    let app = build_app().await.expect("app should build");

    let plan_request = Request::builder()
        .method("POST")
        .uri("/v1/plan_trip")
        .header("content-type", "application/json")
        .header("x-api-key", API_KEY)
        .body(Body::from(plan_body()))
        .unwrap();

    let plan_response = app.clone().oneshot(plan_request).await.unwrap();
    assert_eq!(plan_response.status(), StatusCode::OK);
    let trip = body_json(plan_response).await;

    let itinerary = trip.get("itinerary").expect("trip should carry an itinerary");
    assert_eq!(itinerary["daily_schedule"].as_array().unwrap().len(), 5);

    let flights = itinerary["flights"].as_array().unwrap();
    let unselected_id = flights
        .iter()
        .find(|flight| flight["selected"] == json!(false))
        .and_then(|flight| flight["id"].as_str())
        .unwrap()
        .to_string();

    let select_request = Request::builder()
        .method("POST")
        .uri("/v1/select")
        .header("content-type", "application/json")
        .header("x-api-key", API_KEY)
        .body(Body::from(
            json!({ "category": "flights", "id": unselected_id }).to_string(),
        ))
        .unwrap();

    let select_response = app.clone().oneshot(select_request).await.unwrap();
    assert_eq!(select_response.status(), StatusCode::OK);
    let updated = body_json(select_response).await;
    let updated_flights = updated["itinerary"]["flights"].as_array().unwrap();
    let selected: Vec<&serde_json::Value> = updated_flights
        .iter()
        .filter(|flight| flight["selected"] == json!(true))
        .collect();
    assert_eq!(selected.len(), 1);
    assert_eq!(selected[0]["id"].as_str().unwrap(), unselected_id);

    let trips_request = Request::builder()
        .method("GET")
        .uri("/v1/trips")
        .header("x-api-key", API_KEY)
        .body(Body::empty())
        .unwrap();
    let trips_response = app.clone().oneshot(trips_request).await.unwrap();
    assert_eq!(trips_response.status(), StatusCode::OK);
    assert_eq!(body_json(trips_response).await.as_array().unwrap().len(), 1);

    let book_request = Request::builder()
        .method("POST")
        .uri("/v1/book")
        .header("x-api-key", API_KEY)
        .body(Body::empty())
        .unwrap();
    let book_response = app.clone().oneshot(book_request).await.unwrap();
    assert_eq!(book_response.status(), StatusCode::OK);
    let booking = body_json(book_response).await;
    assert!(booking["reference"].as_str().unwrap().starts_with("VC-"));

    let current_request = Request::builder()
        .method("GET")
        .uri("/v1/trips/current")
        .header("x-api-key", API_KEY)
        .body(Body::empty())
        .unwrap();
    let current_response = app.oneshot(current_request).await.unwrap();
    assert_eq!(current_response.status(), StatusCode::OK);
    assert_eq!(body_json(current_response).await["status"], json!("booked"));
}

#[tokio::test]
async fn select_rejects_unknown_categories() {
    let app = build_app().await.expect("app should build");

    let request = Request::builder()
        .method("POST")
        .uri("/v1/select")
        .header("content-type", "application/json")
        .header("x-api-key", API_KEY)
        .body(Body::from(
            json!({ "category": "submarines", "id": "x" }).to_string(),
        ))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn progress_endpoint_reports_idle_between_runs() {
    let app = build_app().await.expect("app should build");

    let request = Request::builder()
        .method("GET")
        .uri("/v1/plan_progress")
        .header("x-api-key", API_KEY)
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let progress = body_json(response).await;
    assert_eq!(progress["fraction"], json!(0.0));
}
