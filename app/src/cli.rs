//! Command-line front end
//!
//! Every command composes the store of one view with the current session,
//! drives it with the actions a user would trigger, waits for the view to
//! settle, and prints the result as plain text. Failures surface as errors so
//! the process exits non-zero.

use crate::environment::ViewEnvironment;
use crate::features::bus_list::{BusListAction, BusListPhase, BusListReducer, BusListState};
use crate::features::bus_seats::{
    SeatStatus, SeatsAction, SeatsPhase, SeatsReducer, SeatsState, REJECTED_FALLBACK_MESSAGE,
};
use crate::features::login::{LoginAction, LoginReducer, LoginState, LOGIN_FAILED_MESSAGE};
use crate::features::register::{RegisterAction, RegisterReducer, RegisterState, REGISTERED_MESSAGE};
use crate::features::user_bookings::{
    booked_at_label, bus_label, price_label, route_label, seat_label, BookingsAction,
    BookingsPhase, BookingsReducer, BookingsState,
};
use crate::navigation::Route;
use crate::notification::NotificationKind;
use crate::session::{SessionError, SessionFile};
use crate::shell::AppShell;
use anyhow::{bail, Context};
use busway_api::{Bus, BusApi, BusId, SeatId};
use busway_runtime::Store;
use clap::{Parser, Subcommand};
use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

/// BusWay bus-ticket booking client
#[derive(Debug, Parser)]
#[command(name = "busway", version, about)]
pub struct Cli {
    /// What to do
    #[command(subcommand)]
    pub command: Command,
}

/// Client commands
#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// List buses, optionally filtered
    Buses {
        /// Substring of the bus name or number
        #[arg(long)]
        search: Option<String>,
        /// Departure city
        #[arg(long)]
        origin: Option<String>,
        /// Arrival city
        #[arg(long)]
        destination: Option<String>,
    },
    /// Show the seat map of a bus
    Seats {
        /// Bus to show
        bus_id: BusId,
    },
    /// Book a seat (requires login)
    Book {
        /// Bus the seat belongs to
        bus_id: BusId,
        /// Seat to book
        seat_id: SeatId,
    },
    /// Log in and remember the session
    Login {
        /// Account name
        username: String,
        /// Account password
        #[arg(long)]
        password: String,
    },
    /// Create an account
    Register {
        /// Account name
        username: String,
        /// Contact email
        email: String,
        /// Account password
        #[arg(long)]
        password: String,
    },
    /// Forget the stored session
    Logout,
    /// List your bookings (requires login)
    Bookings,
}

/// The client: API, stored session, and the shell that owns it
pub struct App {
    api: Arc<dyn BusApi>,
    sessions: SessionFile,
    shell: AppShell,
    wait: Duration,
}

impl App {
    /// Restore the session stored in `sessions`
    ///
    /// `wait` bounds how long a command waits for a view to settle.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError`] if the session file exists but cannot be read.
    pub fn new(
        api: Arc<dyn BusApi>,
        sessions: SessionFile,
        wait: Duration,
    ) -> Result<Self, SessionError> {
        let session = sessions.load()?;
        Ok(Self {
            api,
            shell: AppShell::new(session),
            sessions,
            wait,
        })
    }

    /// The shell, for inspecting session and route after a command
    #[must_use]
    pub const fn shell(&self) -> &AppShell {
        &self.shell
    }

    /// Run one command, writing its output to `out`
    ///
    /// # Errors
    ///
    /// Returns an error if the command failed: the server refused it, the
    /// view did not settle in time, or the session file could not be written.
    pub async fn run(&mut self, command: Command, out: &mut impl Write) -> anyhow::Result<()> {
        match command {
            Command::Buses {
                search,
                origin,
                destination,
            } => {
                self.buses(
                    search.unwrap_or_default(),
                    origin.unwrap_or_default(),
                    destination.unwrap_or_default(),
                    out,
                )
                .await
            },
            Command::Seats { bus_id } => self.seats(bus_id, out).await,
            Command::Book { bus_id, seat_id } => self.book(bus_id, seat_id, out).await,
            Command::Login { username, password } => self.login(username, password, out).await,
            Command::Register {
                username,
                email,
                password,
            } => self.register(username, email, password, out).await,
            Command::Logout => self.logout(out),
            Command::Bookings => self.bookings(out).await,
        }
    }

    fn env(&self) -> ViewEnvironment {
        ViewEnvironment::new(Arc::clone(&self.api), self.shell.session().cloned())
    }

    async fn buses(
        &mut self,
        search: String,
        origin: String,
        destination: String,
        out: &mut impl Write,
    ) -> anyhow::Result<()> {
        self.shell.navigate(Route::BusList);
        let store = Store::new(BusListState::default(), BusListReducer::new(), self.env());

        for action in [
            BusListAction::SetSearch(search),
            BusListAction::SetOrigin(origin),
            BusListAction::SetDestination(destination),
        ] {
            store.send(action).await?;
        }
        store
            .send(BusListAction::Load)
            .await?
            .wait_with_timeout(self.wait)
            .await
            .context("Bus list did not load")?;

        let (phase, lines) = store
            .state(|state| {
                let lines: Vec<String> = state.visible().into_iter().map(bus_line).collect();
                (state.phase.clone(), lines)
            })
            .await;

        if let BusListPhase::Failed(message) = phase {
            bail!(message);
        }
        if lines.is_empty() {
            writeln!(out, "No buses found.")?;
        }
        for line in lines {
            writeln!(out, "{line}")?;
        }
        Ok(())
    }

    async fn seats(&mut self, bus_id: BusId, out: &mut impl Write) -> anyhow::Result<()> {
        let store = self.open_bus(bus_id).await?;

        let (header, seats, available, booked) = store
            .state(|state| {
                let seats: Vec<String> = state
                    .seats
                    .iter()
                    .map(|seat| {
                        format!("  {:>6}  {:<4} {}", seat.id, seat.label, status_label(seat.status))
                    })
                    .collect();
                (
                    state.bus.as_ref().map(bus_line),
                    seats,
                    state.count(SeatStatus::Available),
                    state.count(SeatStatus::Booked),
                )
            })
            .await;

        if let Some(header) = header {
            writeln!(out, "{header}")?;
        }
        for seat in seats {
            writeln!(out, "{seat}")?;
        }
        writeln!(out, "{available} available, {booked} booked")?;
        Ok(())
    }

    async fn book(
        &mut self,
        bus_id: BusId,
        seat_id: SeatId,
        out: &mut impl Write,
    ) -> anyhow::Result<()> {
        let store = self.open_bus(bus_id).await?;

        match store.state(|state| state.status(seat_id)).await {
            None => bail!("Bus {bus_id} has no seat {seat_id}."),
            Some(SeatStatus::Booked | SeatStatus::Pending) => bail!(REJECTED_FALLBACK_MESSAGE),
            Some(SeatStatus::Available) => {},
        }

        let mut handle = store.send(SeatsAction::BookSeat { seat_id }).await?;
        if store.state(|state| state.navigate_to).await == Some(Route::Login) {
            self.shell.navigate(Route::Login);
            bail!("Please login to book a seat.");
        }

        handle
            .wait_with_timeout(self.wait)
            .await
            .context("Booking did not complete")?;

        let (notification, label, navigate_to) = store
            .state(|state| {
                (
                    state.notifications.last().cloned(),
                    state.seat(seat_id).map(|seat| seat.label.clone()),
                    state.navigate_to,
                )
            })
            .await;

        // The confirmation triggers a refresh of the bus; nothing waits on it.
        if let Err(error) = store.shutdown(self.wait).await {
            tracing::debug!(%error, "Seat view torn down with effects in flight");
        }

        if navigate_to == Some(Route::Login) {
            self.forget_session()?;
            self.shell.navigate(Route::Login);
        }

        match notification {
            Some(notification) if notification.kind == NotificationKind::Success => {
                writeln!(
                    out,
                    "{} Seat {} on bus {bus_id}.",
                    notification.message,
                    label.as_deref().unwrap_or("?")
                )?;
                Ok(())
            },
            Some(notification) if navigate_to == Some(Route::Login) => {
                bail!("{} Please login again.", notification.message)
            },
            Some(notification) => bail!(notification.message),
            None => bail!(REJECTED_FALLBACK_MESSAGE),
        }
    }

    async fn open_bus(
        &mut self,
        bus_id: BusId,
    ) -> anyhow::Result<Store<SeatsState, SeatsAction, ViewEnvironment, SeatsReducer>> {
        self.shell.navigate(Route::BusSeats(bus_id));
        let store = Store::new(SeatsState::default(), SeatsReducer::new(), self.env());

        store
            .send(SeatsAction::Load { bus_id })
            .await?
            .wait_with_timeout(self.wait)
            .await
            .context("Bus did not load")?;

        if let SeatsPhase::Failed(message) = store.state(|state| state.phase.clone()).await {
            bail!(message);
        }
        Ok(store)
    }

    async fn login(
        &mut self,
        username: String,
        password: String,
        out: &mut impl Write,
    ) -> anyhow::Result<()> {
        self.shell.navigate(Route::Login);
        let store = Store::new(LoginState::default(), LoginReducer::new(), self.env());

        store.send(LoginAction::SetUsername(username.clone())).await?;
        store.send(LoginAction::SetPassword(password)).await?;
        store
            .send(LoginAction::Submit)
            .await?
            .wait_with_timeout(self.wait)
            .await
            .context("Login did not complete")?;

        let (session, message) = store
            .state(|state| (state.session.clone(), state.message.clone()))
            .await;
        let Some(session) = session else {
            bail!(message.unwrap_or_else(|| LOGIN_FAILED_MESSAGE.to_string()));
        };

        self.sessions.save(&session)?;
        self.shell.login(session);
        store.send(LoginAction::Handled).await?;

        writeln!(out, "Logged in as {username}.")?;
        Ok(())
    }

    async fn register(
        &mut self,
        username: String,
        email: String,
        password: String,
        out: &mut impl Write,
    ) -> anyhow::Result<()> {
        self.shell.navigate(Route::Register);
        let store = Store::new(RegisterState::default(), RegisterReducer::new(), self.env());

        store.send(RegisterAction::SetUsername(username)).await?;
        store.send(RegisterAction::SetEmail(email)).await?;
        store.send(RegisterAction::SetPassword(password)).await?;
        store
            .send(RegisterAction::Submit)
            .await?
            .wait_with_timeout(self.wait)
            .await
            .context("Registration did not complete")?;

        match store.state(|state| state.message.clone()).await {
            Some(message) if message == REGISTERED_MESSAGE => {
                writeln!(out, "{message}")?;
                Ok(())
            },
            Some(message) => bail!(message),
            None => bail!("Registration did not complete"),
        }
    }

    fn logout(&mut self, out: &mut impl Write) -> anyhow::Result<()> {
        let was_logged_in = self.forget_session()?;
        if was_logged_in {
            writeln!(out, "Logged out.")?;
        } else {
            writeln!(out, "Not logged in.")?;
        }
        Ok(())
    }

    async fn bookings(&mut self, out: &mut impl Write) -> anyhow::Result<()> {
        if Route::MyBookings.requires_session() && self.shell.session().is_none() {
            self.shell.navigate(Route::Login);
            bail!("Please login to view your bookings.");
        }
        self.shell.navigate(Route::MyBookings);

        let store = Store::new(BookingsState::default(), BookingsReducer::new(), self.env());
        store
            .send(BookingsAction::Load)
            .await?
            .wait_with_timeout(self.wait)
            .await
            .context("Bookings did not load")?;

        let (phase, navigate_to) = store
            .state(|state| (state.phase.clone(), state.navigate_to))
            .await;
        if navigate_to == Some(Route::Login) {
            self.forget_session()?;
            self.shell.navigate(Route::Login);
        }

        let bookings = match phase {
            BookingsPhase::Loaded(bookings) => bookings,
            BookingsPhase::Failed(message) if navigate_to == Some(Route::Login) => {
                bail!("{message} Please login again.")
            },
            BookingsPhase::Failed(message) => bail!(message),
            BookingsPhase::Idle | BookingsPhase::Loading => bail!("Bookings did not load"),
        };

        if bookings.is_empty() {
            writeln!(out, "You have no bookings yet.")?;
        }
        for booking in &bookings {
            writeln!(out, "{}", bus_label(booking))?;
            writeln!(
                out,
                "  Seat: {}  Route: {}  Price: {}  Booked: {}",
                seat_label(booking),
                route_label(booking),
                price_label(booking),
                booked_at_label(booking)
            )?;
        }
        Ok(())
    }

    /// Drop the session from the shell and from disk
    fn forget_session(&mut self) -> Result<bool, SessionError> {
        let previous = self.shell.logout();
        self.sessions.clear()?;
        Ok(previous.is_some())
    }
}

fn bus_line(bus: &Bus) -> String {
    format!(
        "{:>4}  {} ({})  {} → {}  {} - {}",
        bus.id, bus.name, bus.number, bus.origin, bus.destination, bus.start_time, bus.reach_time
    )
}

const fn status_label(status: SeatStatus) -> &'static str {
    match status {
        SeatStatus::Available => "available",
        SeatStatus::Pending => "pending",
        SeatStatus::Booked => "booked",
    }
}
