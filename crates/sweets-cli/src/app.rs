//! Top-level coordinator.
//!
//! Owns the current view and is the only place that reacts to session
//! transitions: login and logout results, and sessions ended by the server.

use std::fmt;
use std::sync::Arc;

use anyhow::Result;
use sweets_core::api::ApiClient;
use sweets_core::config::Config;
use sweets_core::session::FileCredentialStore;
use sweets_core::{ResourceError, SessionManager, SweetsClient, View};
use tracing::debug;

use crate::render;

/// Marker error: the session ended and the login view has been shown.
#[derive(Debug)]
pub struct SessionEnded;

impl fmt::Display for SessionEnded {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Session ended")
    }
}

impl std::error::Error for SessionEnded {}

pub struct App {
    session: Arc<SessionManager>,
    sweets: SweetsClient,
    view: View,
}

impl App {
    /// Restores the persisted session against the configured server.
    ///
    /// # Errors
    /// Returns an error if the server base URL is invalid.
    pub fn new(config: &Config) -> Result<Self> {
        let api = ApiClient::from_config(config)?;
        let session = Arc::new(SessionManager::restore(
            api,
            Box::new(FileCredentialStore::new()),
        ));
        let view = if session.is_authenticated() {
            View::Inventory
        } else {
            View::Login
        };

        Ok(Self {
            sweets: SweetsClient::new(Arc::clone(&session)),
            session,
            view,
        })
    }

    pub fn session(&self) -> &SessionManager {
        &self.session
    }

    pub fn sweets(&self) -> &SweetsClient {
        &self.sweets
    }

    /// Switches to `view` and renders it. The inventory view is always
    /// fetched fresh from the server.
    ///
    /// # Errors
    /// Returns the classified failure of the refresh, or [`SessionEnded`].
    pub async fn navigate(&mut self, view: View) -> Result<()> {
        debug!(?view, "Navigating");
        self.view = view;
        match view {
            View::Login => {
                println!("{}", render::LOGIN_HINT);
                Ok(())
            }
            View::Inventory => {
                let result = self.sweets.list().await;
                let sweets = self.settle(result)?;
                println!("{}", render::inventory(&sweets));
                Ok(())
            }
        }
    }

    /// Unwraps a resource result, handling an ended session by moving to the
    /// login view.
    ///
    /// # Errors
    /// Returns [`SessionEnded`] or the classified failure.
    pub fn settle<T>(&mut self, result: Result<T, ResourceError>) -> Result<T> {
        match result {
            Ok(value) => Ok(value),
            Err(ResourceError::SessionInvalidated) => {
                if self.view == View::Inventory {
                    eprintln!("{}", sweets_core::classify::SESSION_EXPIRED_MESSAGE);
                }
                self.view = View::Login;
                println!("{}", render::LOGIN_HINT);
                Err(SessionEnded.into())
            }
            Err(ResourceError::Failed(err)) => Err(err.into()),
        }
    }
}
