//! All buses, with search and route filters

use crate::environment::ViewEnvironment;
use crate::navigation::Route;
use busway_api::{Bus, BusId};
use busway_core::{async_effect, effect::Effect, reducer::Reducer, smallvec, SmallVec};

/// Shown when the list cannot be fetched
pub const LOAD_FAILED_MESSAGE: &str = "Failed to load buses. Please try again later.";

// ============================================================================
// State
// ============================================================================

/// Lifecycle of the view
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum BusListPhase {
    /// Nothing requested yet
    #[default]
    Idle,
    /// Fetching the list
    Loading,
    /// List available
    Loaded,
    /// Fetch failed
    Failed(String),
}

/// Search term and route filters
///
/// The search term matches a substring of the bus name or number; origin and
/// destination must match exactly. All comparisons ignore case and an empty
/// value matches everything.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BusFilters {
    /// Substring of name or number
    pub search: String,
    /// Departure city
    pub origin: String,
    /// Arrival city
    pub destination: String,
}

impl BusFilters {
    /// True if `bus` passes every filter
    #[must_use]
    pub fn matches(&self, bus: &Bus) -> bool {
        let search = self.search.to_lowercase();
        let matches_search = bus.name.to_lowercase().contains(&search)
            || bus.number.to_lowercase().contains(&search);

        matches_search
            && matches_city(&self.origin, &bus.origin)
            && matches_city(&self.destination, &bus.destination)
    }

    /// True if no filter is set
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.search.is_empty() && self.origin.is_empty() && self.destination.is_empty()
    }
}

fn matches_city(filter: &str, city: &str) -> bool {
    filter.is_empty() || filter.to_lowercase() == city.to_lowercase()
}

/// Buses passing `filters`, in list order
#[must_use]
pub fn filter_buses<'a>(buses: &'a [Bus], filters: &BusFilters) -> Vec<&'a Bus> {
    buses.iter().filter(|bus| filters.matches(bus)).collect()
}

fn unique<'a>(values: impl Iterator<Item = &'a str>) -> Vec<&'a str> {
    let mut seen = Vec::new();
    for value in values {
        if !seen.contains(&value) {
            seen.push(value);
        }
    }
    seen
}

/// State of the bus list view
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BusListState {
    /// Lifecycle
    pub phase: BusListPhase,
    /// Every bus the server returned
    pub buses: Vec<Bus>,
    /// Active filters
    pub filters: BusFilters,
    /// Route the view asks the shell to switch to
    pub navigate_to: Option<Route>,
}

impl BusListState {
    /// Buses passing the active filters
    #[must_use]
    pub fn visible(&self) -> Vec<&Bus> {
        filter_buses(&self.buses, &self.filters)
    }

    /// Departure cities, each once, in first-seen order
    #[must_use]
    pub fn origins(&self) -> Vec<&str> {
        unique(self.buses.iter().map(|bus| bus.origin.as_str()))
    }

    /// Arrival cities, each once, in first-seen order
    #[must_use]
    pub fn destinations(&self) -> Vec<&str> {
        unique(self.buses.iter().map(|bus| bus.destination.as_str()))
    }
}

// ============================================================================
// Actions
// ============================================================================

/// Inputs to the bus list view
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BusListAction {
    /// Enter the view
    Load,
    /// Set the search term
    SetSearch(String),
    /// Set the origin filter
    SetOrigin(String),
    /// Set the destination filter
    SetDestination(String),
    /// Reset search term and route filters
    ClearFilters,
    /// Open the seat map of a bus
    ViewSeats {
        /// Bus to open
        bus_id: BusId,
    },
    /// The shell followed the navigation request
    NavigationHandled,
    /// List fetched
    BusesLoaded {
        /// Server copy
        buses: Vec<Bus>,
    },
    /// List fetch failed
    LoadFailed {
        /// Failure description, for logs
        error: String,
    },
}

// ============================================================================
// Reducer
// ============================================================================

/// Reducer for the bus list view
#[derive(Clone, Debug, Default)]
pub struct BusListReducer;

impl BusListReducer {
    /// Creates a new `BusListReducer`
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Reducer for BusListReducer {
    type State = BusListState;
    type Action = BusListAction;
    type Environment = ViewEnvironment;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        match action {
            BusListAction::Load => {
                state.phase = BusListPhase::Loading;
                state.buses.clear();
                let api = env.api.clone();
                smallvec![async_effect! {
                    match api.list_buses().await {
                        Ok(buses) => Some(BusListAction::BusesLoaded { buses }),
                        Err(error) => Some(BusListAction::LoadFailed {
                            error: error.to_string(),
                        }),
                    }
                }]
            },

            BusListAction::SetSearch(search) => {
                state.filters.search = search;
                smallvec![Effect::None]
            },

            BusListAction::SetOrigin(origin) => {
                state.filters.origin = origin;
                smallvec![Effect::None]
            },

            BusListAction::SetDestination(destination) => {
                state.filters.destination = destination;
                smallvec![Effect::None]
            },

            BusListAction::ClearFilters => {
                state.filters = BusFilters::default();
                smallvec![Effect::None]
            },

            BusListAction::ViewSeats { bus_id } => {
                state.navigate_to = Some(Route::BusSeats(bus_id));
                smallvec![Effect::None]
            },

            BusListAction::NavigationHandled => {
                state.navigate_to = None;
                smallvec![Effect::None]
            },

            BusListAction::BusesLoaded { buses } => {
                if state.phase == BusListPhase::Loading {
                    state.buses = buses;
                    state.phase = BusListPhase::Loaded;
                }
                smallvec![Effect::None]
            },

            BusListAction::LoadFailed { error } => {
                if state.phase == BusListPhase::Loading {
                    tracing::warn!(%error, "Bus list fetch failed");
                    state.phase = BusListPhase::Failed(LOAD_FAILED_MESSAGE.to_string());
                }
                smallvec![Effect::None]
            },
        }
    }
}
