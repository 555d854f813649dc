//! Application shell: the session and the current route

use crate::navigation::Route;
use crate::session::Session;

/// Entry in the navigation bar
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NavLink {
    /// Link to the user's bookings
    MyBookings,
    /// End the session
    Logout,
    /// Link to the registration form
    Register,
    /// Link to the login form
    Login,
}

impl NavLink {
    /// Text shown for the link
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::MyBookings => "My Bookings",
            Self::Logout => "Logout",
            Self::Register => "Register",
            Self::Login => "Login",
        }
    }

    /// Where the link leads; `Logout` is an action, not a route
    #[must_use]
    pub const fn route(self) -> Option<Route> {
        match self {
            Self::MyBookings => Some(Route::MyBookings),
            Self::Logout => None,
            Self::Register => Some(Route::Register),
            Self::Login => Some(Route::Login),
        }
    }
}

/// Owner of the session for the whole client
#[derive(Clone, Debug)]
pub struct AppShell {
    session: Option<Session>,
    route: Route,
}

impl AppShell {
    /// Start on the bus list with an optional restored session
    #[must_use]
    pub const fn new(session: Option<Session>) -> Self {
        Self {
            session,
            route: Route::BusList,
        }
    }

    /// Current session
    #[must_use]
    pub const fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    /// Current route
    #[must_use]
    pub const fn route(&self) -> Route {
        self.route
    }

    /// Adopt a fresh session and go to the bus list
    pub fn login(&mut self, session: Session) {
        tracing::info!(user_id = %session.user_id(), "Logged in");
        self.session = Some(session);
        self.route = Route::BusList;
    }

    /// Destroy the session and go to the login form
    ///
    /// Returns the session that was dropped, if any.
    pub fn logout(&mut self) -> Option<Session> {
        let previous = self.session.take();
        if let Some(session) = &previous {
            tracing::info!(user_id = %session.user_id(), "Logged out");
        }
        self.route = Route::Login;
        previous
    }

    /// Switch views
    pub fn navigate(&mut self, route: Route) {
        tracing::debug!(%route, "Navigate");
        self.route = route;
    }

    /// Links shown in the navigation bar
    #[must_use]
    pub fn nav_links(&self) -> Vec<NavLink> {
        if self.session.is_some() {
            vec![NavLink::MyBookings, NavLink::Logout]
        } else {
            vec![NavLink::Register, NavLink::Login]
        }
    }
}
