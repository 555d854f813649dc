//! Login form

use crate::environment::ViewEnvironment;
use crate::navigation::Route;
use crate::session::Session;
use busway_api::Credentials;
use busway_core::{async_effect, effect::Effect, reducer::Reducer, smallvec, SmallVec};
use std::fmt;

/// Shown for any failed login
pub const LOGIN_FAILED_MESSAGE: &str = "Invalid username or password";

/// State of the login form
#[derive(Clone, Default, PartialEq, Eq)]
pub struct LoginState {
    /// Account name field
    pub username: String,
    /// Password field
    pub password: String,
    /// Request in flight
    pub submitting: bool,
    /// Error shown under the form
    pub message: Option<String>,
    /// Session produced by the last successful login, for the shell to adopt
    pub session: Option<Session>,
    /// Route the view asks the shell to switch to
    pub navigate_to: Option<Route>,
}

impl fmt::Debug for LoginState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginState")
            .field("username", &self.username)
            .field("password", &"***")
            .field("submitting", &self.submitting)
            .field("message", &self.message)
            .field("session", &self.session)
            .field("navigate_to", &self.navigate_to)
            .finish()
    }
}

/// Inputs to the login form
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LoginAction {
    /// Username field edited
    SetUsername(String),
    /// Password field edited
    SetPassword(String),
    /// Form submitted
    Submit,
    /// The shell adopted the session and followed the navigation request
    Handled,
    /// Server accepted the credentials
    LoggedIn(Session),
    /// Server refused the credentials, or the request failed
    LoginFailed {
        /// Failure description, for logs
        error: String,
    },
}

/// Reducer for the login form
#[derive(Clone, Debug, Default)]
pub struct LoginReducer;

impl LoginReducer {
    /// Creates a new `LoginReducer`
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Reducer for LoginReducer {
    type State = LoginState;
    type Action = LoginAction;
    type Environment = ViewEnvironment;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        match action {
            LoginAction::SetUsername(username) => {
                state.username = username;
                smallvec![Effect::None]
            },

            LoginAction::SetPassword(password) => {
                state.password = password;
                smallvec![Effect::None]
            },

            LoginAction::Submit => {
                if state.submitting || state.username.is_empty() || state.password.is_empty() {
                    return smallvec![Effect::None];
                }

                state.submitting = true;
                state.message = None;

                let request = env.api.login(Credentials {
                    username: state.username.clone(),
                    password: state.password.clone(),
                });
                smallvec![async_effect! {
                    match request.await {
                        Ok(response) => Some(LoginAction::LoggedIn(Session::from(response))),
                        Err(error) => Some(LoginAction::LoginFailed {
                            error: error.to_string(),
                        }),
                    }
                }]
            },

            LoginAction::Handled => {
                state.session = None;
                state.navigate_to = None;
                smallvec![Effect::None]
            },

            LoginAction::LoggedIn(session) => {
                state.submitting = false;
                state.password.clear();
                state.session = Some(session);
                state.navigate_to = Some(Route::BusList);
                smallvec![Effect::None]
            },

            LoginAction::LoginFailed { error } => {
                tracing::debug!(%error, "Login refused");
                state.submitting = false;
                state.message = Some(LOGIN_FAILED_MESSAGE.to_string());
                smallvec![Effect::None]
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use busway_api::UserId;
    use busway_testing::{assertions, settle, MockBusApi, ReducerTest};
    use std::sync::Arc;

    fn filled(username: &str, password: &str) -> LoginState {
        LoginState {
            username: username.to_string(),
            password: password.to_string(),
            ..LoginState::default()
        }
    }

    fn env(api: &MockBusApi) -> ViewEnvironment {
        ViewEnvironment::new(Arc::new(api.clone()), None)
    }

    #[tokio::test]
    async fn successful_login_yields_session_and_bus_list() {
        let api = MockBusApi::new().with_account("asha", "pw", "tok", 7);
        let mut state = filled("asha", "pw");

        let log = settle(&LoginReducer::new(), &mut state, LoginAction::Submit, &env(&api)).await;

        assert!(matches!(log.as_slice(), [LoginAction::LoggedIn(_)]));
        let session = state.session.as_ref().map(Session::user_id);
        assert_eq!(session, Some(UserId::new(7)));
        assert_eq!(state.navigate_to, Some(Route::BusList));
        assert!(!state.submitting);
        assert!(state.password.is_empty());
    }

    #[tokio::test]
    async fn failed_login_shows_generic_message() {
        let api = MockBusApi::new().with_account("asha", "pw", "tok", 7);
        let mut state = filled("asha", "wrong");

        settle(&LoginReducer::new(), &mut state, LoginAction::Submit, &env(&api)).await;

        assert_eq!(state.message.as_deref(), Some(LOGIN_FAILED_MESSAGE));
        assert!(state.session.is_none());
        assert_eq!(state.navigate_to, None);
    }

    #[test]
    fn submit_while_in_flight_is_inert() {
        let api = MockBusApi::new();
        ReducerTest::new(LoginReducer::new())
            .with_env(env(&api))
            .given_state(filled("asha", "pw"))
            .given_actions([LoginAction::Submit])
            .when_action(LoginAction::Submit)
            .then_state(|state| assert!(state.submitting))
            .then_effects(|effects| assertions::assert_no_effects(effects))
            .run();
        assert_eq!(api.calls().len(), 1);
    }

    #[test]
    fn empty_form_is_not_submitted() {
        ReducerTest::new(LoginReducer::new())
            .with_env(env(&MockBusApi::new()))
            .given_state(filled("asha", ""))
            .when_action(LoginAction::Submit)
            .then_state(|state| assert!(!state.submitting))
            .then_effects(|effects| assertions::assert_no_effects(effects))
            .run();
    }

    #[test]
    fn debug_hides_password() {
        assert!(!format!("{:?}", filled("asha", "hunter2")).contains("hunter2"));
    }
}
