//! # BusWay
//!
//! Bus-ticket booking client. Each view (bus list, seat map, login,
//! registration, bookings) is a reducer over its own state, run by a
//! [`busway_runtime::Store`] against the booking API.
//!
//! - [`features`]: one reducer per view
//! - [`shell`]: the session owner and current route
//! - [`session`]: session persistence between runs
//! - [`cli`]: the command-line front end
//!
//! # Example
//!
//! ```no_run
//! use busway::environment::ViewEnvironment;
//! use busway::features::bus_list::{BusListAction, BusListReducer, BusListState};
//! use busway_api::BusWayClient;
//! use busway_runtime::Store;
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let api = Arc::new(BusWayClient::new("http://127.0.0.1:8000")?);
//! let store = Store::new(
//!     BusListState::default(),
//!     BusListReducer::new(),
//!     ViewEnvironment::new(api, None),
//! );
//!
//! // The handle covers the fetch and the reduce of its result
//! store
//!     .send(BusListAction::Load)
//!     .await?
//!     .wait_with_timeout(Duration::from_secs(10))
//!     .await?;
//! let count = store.state(|state| state.buses.len()).await;
//! println!("{count} buses");
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod config;
pub mod environment;
pub mod features;
pub mod navigation;
pub mod notification;
pub mod session;
pub mod shell;

pub use cli::{App, Cli, Command};
pub use config::Config;
pub use environment::ViewEnvironment;
pub use navigation::Route;
pub use session::{Session, SessionFile};
pub use shell::AppShell;
