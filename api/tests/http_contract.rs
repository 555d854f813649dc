//! HTTP contract tests for `BusWayClient` against a mock server

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)] // Test code can use unwrap/expect/panic

use busway_api::{
    ApiError, AuthToken, BookingConfirmation, BusApi, BusId, BusWayClient, Credentials,
    Registration, Related, SeatId, UserId,
};
use serde_json::json;
use std::sync::Arc;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn bus_json() -> serde_json::Value {
    json!({
        "id": 1,
        "bus_name": "City Link",
        "number": "MH12AB1234",
        "origin": "Mumbai",
        "destination": "Pune",
        "start_time": "08:00:00",
        "reach_time": "11:30:00",
        "seats": [
            { "id": 10, "seat_number": "A1", "is_booked": false },
            { "id": 11, "seat_number": "A2", "is_booked": true }
        ]
    })
}

async fn client_for(server: &MockServer) -> BusWayClient {
    BusWayClient::new(&server.uri()).unwrap()
}

#[tokio::test]
async fn get_bus_returns_seats_in_order() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/buses/1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(bus_json()))
        .expect(1)
        .mount(&server)
        .await;

    let bus = client_for(&server).await.get_bus(BusId::new(1)).await.unwrap();

    assert_eq!(bus.name, "City Link");
    let labels: Vec<_> = bus.seats.iter().map(|s| s.seat_number.as_str()).collect();
    assert_eq!(labels, ["A1", "A2"]);
}

#[tokio::test]
async fn get_bus_not_found_is_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/buses/99"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({ "detail": "Not found." })))
        .mount(&server)
        .await;

    let error = client_for(&server)
        .await
        .get_bus(BusId::new(99))
        .await
        .unwrap_err();

    assert!(matches!(error, ApiError::Rejected { status: 404, .. }));
    assert_eq!(error.detail(), Some("Not found."));
}

#[tokio::test]
async fn list_buses_parses_array() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/buses/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([bus_json(), {
            "id": 2, "bus_name": "Coastal", "number": "GA01", "origin": "Goa",
            "destination": "Mumbai", "start_time": "20:00", "reach_time": "06:00"
        }])))
        .mount(&server)
        .await;

    let buses = client_for(&server).await.list_buses().await.unwrap();

    assert_eq!(buses.len(), 2);
    assert!(buses[1].seats.is_empty());
}

#[tokio::test]
async fn malformed_body_is_a_parse_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/buses/"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let error = client_for(&server).await.list_buses().await.unwrap_err();
    assert!(matches!(error, ApiError::ResponseParseFailed(_)));
}

#[tokio::test]
async fn book_seat_sends_seat_and_token() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/booking/"))
        .and(header("Authorization", "Token secret-token"))
        .and(body_json(json!({ "seat": 10 })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": 5,
            "seat": 10,
            "price": "450.00",
            "booking_time": "2025-03-01T10:15:00Z"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let confirmation = client_for(&server)
        .await
        .book_seat(SeatId::new(10), &AuthToken::new("secret-token"))
        .await
        .unwrap();

    assert_eq!(confirmation.id.map(|id| id.get()), Some(5));
}

#[tokio::test]
async fn book_seat_accepts_empty_created_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/booking/"))
        .respond_with(ResponseTemplate::new(201))
        .mount(&server)
        .await;

    let confirmation = client_for(&server)
        .await
        .book_seat(SeatId::new(10), &AuthToken::new("t"))
        .await
        .unwrap();

    assert!(confirmation.id.is_none());
}

#[tokio::test]
async fn book_seat_reads_timestamp_without_offset() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/booking/"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": 5,
            "seat": 10,
            "user": 7,
            "price": "450.00",
            "booking_time": "2025-03-01T10:15:00.123456"
        })))
        .mount(&server)
        .await;

    let confirmation = client_for(&server)
        .await
        .book_seat(SeatId::new(10), &AuthToken::new("t"))
        .await
        .unwrap();

    assert_eq!(confirmation.id.map(|id| id.get()), Some(5));
    assert_eq!(
        confirmation.booking_time.map(|time| time.to_rfc3339()).as_deref(),
        Some("2025-03-01T10:15:00.123456+00:00")
    );
}

#[tokio::test]
async fn book_seat_created_with_unreadable_body_is_still_confirmed() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/booking/"))
        .respond_with(ResponseTemplate::new(201).set_body_string("<html>Created</html>"))
        .mount(&server)
        .await;

    let confirmation = client_for(&server)
        .await
        .book_seat(SeatId::new(10), &AuthToken::new("t"))
        .await
        .unwrap();

    assert_eq!(confirmation, BookingConfirmation::default());
}

#[tokio::test]
async fn book_seat_conflict_carries_detail() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/booking/"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({ "detail": "Seat taken" })))
        .mount(&server)
        .await;

    let error = client_for(&server)
        .await
        .book_seat(SeatId::new(10), &AuthToken::new("t"))
        .await
        .unwrap_err();

    assert!(matches!(error, ApiError::Rejected { status: 400, .. }));
    assert_eq!(error.detail(), Some("Seat taken"));
}

#[tokio::test]
async fn book_seat_with_bad_token_is_unauthorized() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/booking/"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({ "detail": "Invalid token." })),
        )
        .mount(&server)
        .await;

    let error = client_for(&server)
        .await
        .book_seat(SeatId::new(10), &AuthToken::new("stale"))
        .await
        .unwrap_err();

    assert!(matches!(error, ApiError::Unauthorized { .. }));
    assert_eq!(error.detail(), Some("Invalid token."));
}

#[tokio::test]
async fn login_returns_token_and_user() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/login/"))
        .and(body_json(json!({ "username": "asha", "password": "pw" })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "token": "tok", "user_id": 7 })),
        )
        .mount(&server)
        .await;

    let response = client_for(&server)
        .await
        .login(&Credentials {
            username: "asha".to_string(),
            password: "pw".to_string(),
        })
        .await
        .unwrap();

    assert_eq!(response.token.expose(), "tok");
    assert_eq!(response.user_id, UserId::new(7));
}

#[tokio::test]
async fn register_validation_errors_are_keyed_by_field() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/register/"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "username": ["A user with that username already exists."]
        })))
        .mount(&server)
        .await;

    let error = client_for(&server)
        .await
        .register(&Registration {
            username: "asha".to_string(),
            email: "asha@example.com".to_string(),
            password: "pw".to_string(),
        })
        .await
        .unwrap_err();

    let fields = error.field_errors().expect("validation error");
    assert_eq!(
        fields.first("username"),
        Some("A user with that username already exists.")
    );
}

#[tokio::test]
async fn user_bookings_through_trait_object() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/user/7/bookings/"))
        .and(header("Authorization", "Token tok"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
            "id": 1,
            "bus": { "bus_name": "City Link", "number": "MH12" },
            "seat": { "seat_number": "A1" },
            "origin": "Mumbai",
            "destination": "Pune",
            "price": 450,
            "booking_time": "2025-03-01T10:15:00Z"
        }])))
        .mount(&server)
        .await;

    let api: Arc<dyn BusApi> = Arc::new(client_for(&server).await);
    let bookings = api
        .user_bookings(UserId::new(7), &AuthToken::new("tok"))
        .await
        .unwrap();

    assert_eq!(bookings.len(), 1);
    assert_eq!(bookings[0].price.as_ref().map(ToString::to_string).as_deref(), Some("450"));
}

#[tokio::test]
async fn user_bookings_tolerate_naive_timestamps_and_expanded_users() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/user/7/bookings/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {
                "id": 1,
                "user": { "id": 7, "username": "asha" },
                "seat": { "seat_number": "A1" },
                "booking_time": "2025-03-01T10:15:00.123456"
            },
            {
                "id": 2,
                "user": 7,
                "seat": 11,
                "booking_time": "not a time"
            }
        ])))
        .mount(&server)
        .await;

    let bookings = client_for(&server)
        .await
        .user_bookings(UserId::new(7), &AuthToken::new("tok"))
        .await
        .unwrap();

    assert_eq!(bookings.len(), 2);
    let user = bookings[0].user.as_ref().and_then(Related::expanded).unwrap();
    assert_eq!(user.username.as_deref(), Some("asha"));
    assert!(bookings[0].booking_time.is_some());
    assert_eq!(bookings[1].user, Some(Related::Id(7)));
    assert!(bookings[1].booking_time.is_none());
}

#[tokio::test]
async fn unreachable_server_is_request_failure() {
    // Nothing listens on the discard port
    let client = BusWayClient::new("http://127.0.0.1:9").unwrap();
    let error = client.list_buses().await.unwrap_err();
    assert!(matches!(error, ApiError::RequestFailed(_)));
}
