//! Registration form

use crate::environment::ViewEnvironment;
use busway_api::{ApiError, Registration};
use busway_core::{async_effect, effect::Effect, reducer::Reducer, smallvec, SmallVec};
use std::fmt;

/// Shown after an account was created
pub const REGISTERED_MESSAGE: &str = "Registration successful! You can now login.";

/// Prefix of every failure message
pub const FAILED_PREFIX: &str = "Registration failed: ";

/// Fields whose errors are reported, in priority order
const REPORTED_FIELDS: [&str; 3] = ["username", "email", "password"];

/// Message shown for a failed registration
///
/// Uses the first field error of username, email, then password; otherwise
/// the error's own description.
#[must_use]
pub fn failure_message(error: &ApiError) -> String {
    let reason = error
        .field_errors()
        .and_then(|fields| REPORTED_FIELDS.iter().find_map(|field| fields.first(field)))
        .map_or_else(|| error.to_string(), str::to_owned);
    format!("{FAILED_PREFIX}{reason}")
}

/// State of the registration form
#[derive(Clone, Default, PartialEq, Eq)]
pub struct RegisterState {
    /// Account name field
    pub username: String,
    /// Email field
    pub email: String,
    /// Password field
    pub password: String,
    /// Request in flight
    pub submitting: bool,
    /// Outcome shown under the form
    pub message: Option<String>,
}

impl fmt::Debug for RegisterState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegisterState")
            .field("username", &self.username)
            .field("email", &self.email)
            .field("password", &"***")
            .field("submitting", &self.submitting)
            .field("message", &self.message)
            .finish()
    }
}

/// Inputs to the registration form
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RegisterAction {
    /// Username field edited
    SetUsername(String),
    /// Email field edited
    SetEmail(String),
    /// Password field edited
    SetPassword(String),
    /// Form submitted
    Submit,
    /// Account created
    Registered,
    /// Server refused the form, or the request failed
    RegistrationFailed {
        /// Message to show
        message: String,
    },
}

/// Reducer for the registration form
#[derive(Clone, Debug, Default)]
pub struct RegisterReducer;

impl RegisterReducer {
    /// Creates a new `RegisterReducer`
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Reducer for RegisterReducer {
    type State = RegisterState;
    type Action = RegisterAction;
    type Environment = ViewEnvironment;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        match action {
            RegisterAction::SetUsername(username) => {
                state.username = username;
                smallvec![Effect::None]
            },

            RegisterAction::SetEmail(email) => {
                state.email = email;
                smallvec![Effect::None]
            },

            RegisterAction::SetPassword(password) => {
                state.password = password;
                smallvec![Effect::None]
            },

            RegisterAction::Submit => {
                if state.submitting {
                    return smallvec![Effect::None];
                }

                state.submitting = true;
                let request = env.api.register(Registration {
                    username: state.username.clone(),
                    email: state.email.clone(),
                    password: state.password.clone(),
                });
                smallvec![async_effect! {
                    match request.await {
                        Ok(()) => Some(RegisterAction::Registered),
                        Err(error) => Some(RegisterAction::RegistrationFailed {
                            message: failure_message(&error),
                        }),
                    }
                }]
            },

            RegisterAction::Registered => {
                *state = RegisterState {
                    message: Some(REGISTERED_MESSAGE.to_string()),
                    ..RegisterState::default()
                };
                smallvec![Effect::None]
            },

            RegisterAction::RegistrationFailed { message } => {
                state.submitting = false;
                state.message = Some(message);
                smallvec![Effect::None]
            },
        }
    }
}
