//! Per-terminal session state.

use crate::error::{SimError, SimResult};
use crate::fs::NodeHandle;

/// Login state of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    LoggedOut,
    LoggedIn,
}

/// The active user and working directory of one terminal.
///
/// Passed explicitly into every engine and registry call, so independent
/// sessions can coexist in one process.
#[derive(Debug, Clone)]
pub struct Session {
    user: Option<String>,
    cwd: NodeHandle,
}

impl Session {
    /// Create a logged-out session positioned at `root`.
    pub fn new(root: NodeHandle) -> Self {
        Self { user: None, cwd: root }
    }

    /// Username of the logged-in user, if any.
    pub fn user(&self) -> Option<&str> {
        self.user.as_deref()
    }

    /// Working directory handle. It may refer to a directory another
    /// session has since removed; the engine checks it on every use.
    pub fn cwd(&self) -> NodeHandle {
        self.cwd
    }

    pub fn state(&self) -> SessionState {
        if self.user.is_some() {
            SessionState::LoggedIn
        } else {
            SessionState::LoggedOut
        }
    }

    /// Username of the logged-in user, or `NotLoggedIn`.
    pub fn require_user(&self) -> SimResult<&str> {
        self.user().ok_or(SimError::NotLoggedIn)
    }

    pub(crate) fn set_user(&mut self, user: Option<String>) -> Option<String> {
        std::mem::replace(&mut self.user, user)
    }

    pub(crate) fn set_cwd(&mut self, cwd: NodeHandle) {
        self.cwd = cwd;
    }
}
