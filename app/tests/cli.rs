//! Commands run end to end against the in-memory API and a temporary
//! session file.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use busway::{App, Command, Route, SessionFile};
use busway_api::{ApiError, BusId, SeatId};
use busway_testing::{fixtures, test_clock, ApiCall, MockBusApi};
use busway_core::environment::Clock;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

const WAIT: Duration = Duration::from_secs(5);

struct Harness {
    api: MockBusApi,
    dir: TempDir,
}

impl Harness {
    fn new() -> Self {
        let api = MockBusApi::new()
            .with_bus(fixtures::bus_on_route(
                1,
                "City Link",
                "MH12",
                "Mumbai",
                "Pune",
                &[(10, "A1", false), (11, "A2", true)],
            ))
            .with_bus(fixtures::bus_on_route(2, "Coastal Express", "GA07", "Goa", "Mumbai", &[]))
            .with_account("asha", "secret", "tok-asha", 7);
        Self {
            api,
            dir: tempfile::tempdir().unwrap(),
        }
    }

    fn sessions(&self) -> SessionFile {
        SessionFile::new(self.dir.path().join("session.json"))
    }

    fn app(&self) -> App {
        App::new(Arc::new(self.api.clone()), self.sessions(), WAIT).unwrap()
    }

    /// Run one command in a fresh process-like `App`
    async fn run(&self, command: Command) -> (anyhow::Result<()>, String) {
        let mut out = Vec::new();
        let result = self.app().run(command, &mut out).await;
        (result, String::from_utf8(out).unwrap())
    }

    async fn login(&self) {
        let (result, _) = self
            .run(Command::Login {
                username: "asha".to_string(),
                password: "secret".to_string(),
            })
            .await;
        result.unwrap();
    }
}

fn book(bus: u64, seat: u64) -> Command {
    Command::Book {
        bus_id: BusId::new(bus),
        seat_id: SeatId::new(seat),
    }
}

#[tokio::test]
async fn buses_lists_matching_routes() {
    let harness = Harness::new();

    let (result, out) = harness
        .run(Command::Buses {
            search: None,
            origin: Some("goa".to_string()),
            destination: Some("MUMBAI".to_string()),
        })
        .await;

    result.unwrap();
    assert!(out.contains("Coastal Express (GA07)"));
    assert!(!out.contains("City Link"));
}

#[tokio::test]
async fn buses_reports_an_empty_result() {
    let harness = Harness::new();

    let (result, out) = harness
        .run(Command::Buses {
            search: Some("nothing like this".to_string()),
            origin: None,
            destination: None,
        })
        .await;

    result.unwrap();
    assert_eq!(out.trim(), "No buses found.");
}

#[tokio::test]
async fn buses_fails_when_the_list_cannot_load() {
    let harness = Harness::new();
    harness
        .api
        .fail_next_list(ApiError::RequestFailed("timeout".to_string()));

    let (result, _) = harness
        .run(Command::Buses {
            search: None,
            origin: None,
            destination: None,
        })
        .await;

    assert_eq!(
        result.unwrap_err().to_string(),
        "Failed to load buses. Please try again later."
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn buses_reports_the_reduced_list_on_every_run() {
    let harness = Harness::new();
    let all = || Command::Buses {
        search: None,
        origin: None,
        destination: None,
    };

    for _ in 0..100 {
        let (result, out) = harness.run(all()).await;
        result.unwrap();
        assert!(out.contains("City Link (MH12)"), "missing bus in {out:?}");

        harness
            .api
            .fail_next_list(ApiError::RequestFailed("timeout".to_string()));
        let (result, out) = harness.run(all()).await;
        assert_eq!(
            result.unwrap_err().to_string(),
            "Failed to load buses. Please try again later."
        );
        assert!(out.is_empty());
    }
}

#[tokio::test]
async fn seats_shows_the_map() {
    let harness = Harness::new();

    let (result, out) = harness.run(Command::Seats { bus_id: BusId::new(1) }).await;

    result.unwrap();
    assert!(out.contains("City Link (MH12)"));
    assert!(out.contains("A1   available"));
    assert!(out.contains("A2   booked"));
    assert!(out.contains("1 available, 1 booked"));
}

#[tokio::test]
async fn login_persists_the_session_for_later_commands() {
    let harness = Harness::new();

    let (result, out) = harness
        .run(Command::Login {
            username: "asha".to_string(),
            password: "secret".to_string(),
        })
        .await;

    result.unwrap();
    assert_eq!(out.trim(), "Logged in as asha.");
    let stored = harness.sessions().load().unwrap().unwrap();
    assert_eq!(stored.token().expose(), "tok-asha");

    let app = harness.app();
    assert!(app.shell().session().is_some());
}

#[tokio::test]
async fn wrong_password_stores_nothing() {
    let harness = Harness::new();

    let (result, _) = harness
        .run(Command::Login {
            username: "asha".to_string(),
            password: "nope".to_string(),
        })
        .await;

    assert_eq!(result.unwrap_err().to_string(), "Invalid username or password");
    assert!(harness.sessions().load().unwrap().is_none());
}

#[tokio::test]
async fn book_requires_login() {
    let harness = Harness::new();
    let mut app = harness.app();
    let mut out = Vec::new();

    let error = app.run(book(1, 10), &mut out).await.unwrap_err();

    assert_eq!(error.to_string(), "Please login to book a seat.");
    assert_eq!(app.shell().route(), Route::Login);
    assert_eq!(harness.api.booking_calls(), 0);
}

#[tokio::test]
async fn book_after_login_sends_the_stored_token() {
    let harness = Harness::new();
    harness.login().await;

    let (result, out) = harness.run(book(1, 10)).await;

    result.unwrap();
    assert!(out.contains("Seat booked successfully!"));
    assert!(out.contains("A1"));
    assert!(harness.api.calls().contains(&ApiCall::BookSeat {
        seat_id: SeatId::new(10),
        token: "tok-asha".to_string(),
    }));
}

#[tokio::test]
async fn book_of_a_booked_seat_sends_nothing() {
    let harness = Harness::new();
    harness.login().await;

    let (result, _) = harness.run(book(1, 11)).await;

    assert_eq!(result.unwrap_err().to_string(), "Seat already booked!");
    assert_eq!(harness.api.booking_calls(), 0);
}

#[tokio::test]
async fn refused_token_forgets_the_session() {
    let harness = Harness::new();
    harness.login().await;
    harness.api.script_booking(Err(ApiError::Unauthorized {
        detail: Some("Invalid token.".to_string()),
    }));

    let (result, _) = harness.run(book(1, 10)).await;

    assert_eq!(
        result.unwrap_err().to_string(),
        "Invalid token. Please login again."
    );
    assert!(harness.sessions().load().unwrap().is_none());
}

#[tokio::test]
async fn bookings_lists_history() {
    let harness = Harness::new();
    let bus = fixtures::bus_on_route(1, "City Link", "MH12", "Mumbai", "Pune", &[]);
    let api = harness
        .api
        .clone()
        .with_bookings(7, vec![fixtures::booking(1, 7, &bus, "A1", test_clock().now())]);
    let harness = Harness { api, ..harness };
    harness.login().await;

    let (result, out) = harness.run(Command::Bookings).await;

    result.unwrap();
    assert!(out.contains("City Link (MH12)"));
    assert!(out.contains("Seat: A1"));
    assert!(out.contains("Mumbai → Pune"));
    assert!(out.contains("Price: 450.00"));
}

#[tokio::test]
async fn refused_token_while_listing_bookings_forgets_the_session() {
    let harness = Harness::new();
    harness.login().await;
    harness.api.fail_next_user_bookings(ApiError::Unauthorized {
        detail: Some("Invalid token.".to_string()),
    });

    let (result, out) = harness.run(Command::Bookings).await;

    assert_eq!(
        result.unwrap_err().to_string(),
        "Invalid token. Please login again."
    );
    assert!(out.is_empty());
    assert!(harness.sessions().load().unwrap().is_none());

    let (result, _) = harness.run(Command::Bookings).await;
    assert_eq!(
        result.unwrap_err().to_string(),
        "Please login to view your bookings."
    );
}

#[tokio::test]
async fn bookings_without_login_is_refused() {
    let harness = Harness::new();

    let (result, _) = harness.run(Command::Bookings).await;

    assert_eq!(
        result.unwrap_err().to_string(),
        "Please login to view your bookings."
    );
    assert!(harness.api.calls().is_empty());
}

#[tokio::test]
async fn logout_clears_the_stored_session() {
    let harness = Harness::new();
    harness.login().await;

    let (result, out) = harness.run(Command::Logout).await;
    result.unwrap();
    assert_eq!(out.trim(), "Logged out.");
    assert!(harness.sessions().load().unwrap().is_none());

    let (result, out) = harness.run(Command::Logout).await;
    result.unwrap();
    assert_eq!(out.trim(), "Not logged in.");
}

#[tokio::test]
async fn register_reports_the_first_field_error() {
    let harness = Harness::new();
    harness.api.script_register(Err(ApiError::Validation(
        serde_json::from_str(r#"{"username": ["A user with that username already exists."]}"#)
            .unwrap(),
    )));

    let (result, _) = harness
        .run(Command::Register {
            username: "asha".to_string(),
            email: "asha@example.com".to_string(),
            password: "secret".to_string(),
        })
        .await;

    assert_eq!(
        result.unwrap_err().to_string(),
        "Registration failed: A user with that username already exists."
    );
}

#[tokio::test]
async fn register_success() {
    let harness = Harness::new();

    let (result, out) = harness
        .run(Command::Register {
            username: "ravi".to_string(),
            email: "ravi@example.com".to_string(),
            password: "secret".to_string(),
        })
        .await;

    result.unwrap();
    assert_eq!(out.trim(), "Registration successful! You can now login.");
    assert_eq!(
        harness.api.calls(),
        vec![ApiCall::Register {
            username: "ravi".to_string()
        }]
    );
}
