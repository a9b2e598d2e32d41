//! Registered user accounts and login handling.

use chrono::{DateTime, Local};
use serde::Serialize;

use crate::error::{SimError, SimResult};
use crate::session::Session;

/// A registered account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct User {
    pub username: String,
    pub lastname: String,
    pub created: DateTime<Local>,
}

/// All accounts known to the simulator, kept in creation order.
#[derive(Debug, Default)]
pub struct UserRegistry {
    users: Vec<User>,
}

impl UserRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new account.
    pub fn create_user(&mut self, username: &str, lastname: &str) -> SimResult<&User> {
        if username.trim().is_empty() {
            return Err(SimError::InvalidName(username.to_string()));
        }
        if self.get(username).is_some() {
            return Err(SimError::DuplicateUsername(username.to_string()));
        }

        self.users.push(User {
            username: username.to_string(),
            lastname: lastname.to_string(),
            created: Local::now(),
        });
        tracing::info!(username, "user created");
        self.users
            .last()
            .ok_or_else(|| SimError::UserNotFound(username.to_string()))
    }

    pub fn get(&self, username: &str) -> Option<&User> {
        self.users.iter().find(|u| u.username == username)
    }

    /// Log `username` into `session`.
    ///
    /// Switching users requires a logout first.
    pub fn login(&self, session: &mut Session, username: &str) -> SimResult<&User> {
        let user = self
            .get(username)
            .ok_or_else(|| SimError::UserNotFound(username.to_string()))?;
        if let Some(current) = session.user() {
            return Err(SimError::AlreadyLoggedIn(current.to_string()));
        }

        session.set_user(Some(user.username.clone()));
        tracing::info!(username, "login");
        Ok(user)
    }

    /// Clear the session user. Returns who was logged in, if anyone.
    pub fn logout(&self, session: &mut Session) -> Option<String> {
        let previous = session.set_user(None);
        if let Some(username) = previous.as_deref() {
            tracing::info!(username, "logout");
        }
        previous
    }

    /// The logged-in user of `session`.
    pub fn whoami(&self, session: &Session) -> Option<&User> {
        session.user().and_then(|name| self.get(name))
    }

    /// All users in creation order.
    pub fn list(&self) -> &[User] {
        &self.users
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}
