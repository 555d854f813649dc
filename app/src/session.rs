//! Authenticated identity and its on-disk copy
//!
//! A [`Session`] is produced by a successful login and destroyed by logout.
//! Views receive it explicitly through their environment; nothing reads it
//! from global state. The session file is the only local state the client
//! persists.

use busway_api::{AuthToken, LoginResponse, UserId};
use serde::{Deserialize, Serialize};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Token and user id of the logged-in user
///
/// The token is opaque: it is forwarded, never decoded.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    token: AuthToken,
    user_id: UserId,
}

impl Session {
    /// Token for the `Authorization` header
    #[must_use]
    pub const fn token(&self) -> &AuthToken {
        &self.token
    }

    /// The logged-in user
    #[must_use]
    pub const fn user_id(&self) -> UserId {
        self.user_id
    }
}

impl From<LoginResponse> for Session {
    fn from(response: LoginResponse) -> Self {
        Self {
            token: response.token,
            user_id: response.user_id,
        }
    }
}

/// Errors reading or writing the session file
#[derive(Debug, Error)]
pub enum SessionError {
    /// The file could not be read, written, or removed
    #[error("Session file {path}: {source}")]
    Io {
        /// File involved
        path: PathBuf,
        /// Underlying error
        #[source]
        source: io::Error,
    },

    /// The file exists but does not hold a session
    #[error("Session file {path} is corrupt: {source}")]
    Corrupt {
        /// File involved
        path: PathBuf,
        /// Underlying error
        #[source]
        source: serde_json::Error,
    },
}

/// JSON file holding the current session
#[derive(Clone, Debug)]
pub struct SessionFile {
    path: PathBuf,
}

impl SessionFile {
    /// Session file at `path`
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Location of the file
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: io::Error) -> SessionError {
        SessionError::Io {
            path: self.path.clone(),
            source,
        }
    }

    /// Read the stored session; a missing file means logged out
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Io`] if the file exists but cannot be read and
    /// [`SessionError::Corrupt`] if it does not parse.
    pub fn load(&self) -> Result<Option<Session>, SessionError> {
        let contents = match std::fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(self.io_error(e)),
        };

        serde_json::from_str(&contents)
            .map(Some)
            .map_err(|source| SessionError::Corrupt {
                path: self.path.clone(),
                source,
            })
    }

    /// Store `session`, creating parent directories as needed
    ///
    /// On Unix the file is readable by its owner only.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Io`] if the directory or file cannot be written.
    pub fn save(&self, session: &Session) -> Result<(), SessionError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| self.io_error(e))?;
        }

        let json = serde_json::to_vec_pretty(session).map_err(|source| SessionError::Corrupt {
            path: self.path.clone(),
            source,
        })?;

        let mut options = std::fs::OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }

        let mut file = options.open(&self.path).map_err(|e| self.io_error(e))?;
        file.write_all(&json).map_err(|e| self.io_error(e))?;

        tracing::debug!(path = %self.path.display(), user_id = %session.user_id, "Session saved");
        Ok(())
    }

    /// Forget the stored session; clearing an absent file is not an error
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Io`] if the file exists but cannot be removed.
    pub fn clear(&self) -> Result<(), SessionError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(self.io_error(e)),
        }
    }
}
