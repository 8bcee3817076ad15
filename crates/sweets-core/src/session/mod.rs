//! Session state machine.
//!
//! A session is either anonymous or holds exactly one credential. The
//! [`SessionManager`] owns it; the credential store only mirrors it so it
//! survives restarts. Every way a session ends goes through the same path.

pub mod store;

use std::fmt;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use reqwest::Method;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, info, warn};

pub use self::store::{
    CredentialStore, FileCredentialStore, MemoryCredentialStore, mask_credential,
};
use crate::api::{ApiClient, Json, NoContent};
use crate::classify::{Action, CallOutcome, ClassifiedError, classify};

/// Opaque bearer credential. Never printed in full.
#[derive(Clone)]
pub struct Credential(SecretString);

impl Credential {
    pub fn new(value: impl Into<String>) -> Self {
        Self(SecretString::from(value.into()))
    }

    pub fn expose(&self) -> &str {
        self.0.expose_secret()
    }

    pub(crate) fn secret(&self) -> &SecretString {
        &self.0
    }

    /// Returns a masked form safe for display and logs.
    pub fn masked(&self) -> String {
        mask_credential(self.expose())
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Credential({})", self.masked())
    }
}

/// Snapshot of the session state.
#[derive(Debug, Clone)]
pub enum Session {
    Anonymous,
    Authenticated(Credential),
}

impl Session {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, Session::Authenticated(_))
    }
}

/// View the presentation layer should show after a session transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Login,
    Inventory,
}

/// Sign-up details.
pub struct NewAccount {
    pub username: String,
    pub email: String,
    pub password: SecretString,
    pub password_confirmation: SecretString,
}

/// Credential plus the session epoch it was read in.
#[derive(Debug, Clone)]
pub(crate) struct Ticket {
    pub credential: Credential,
    pub epoch: u64,
}

#[derive(Debug, Deserialize)]
struct LoginResponse {
    access: String,
}

#[derive(Debug, Default)]
struct State {
    credential: Option<Credential>,
    /// Bumped on every login and logout.
    epoch: u64,
}

/// Owns the session credential and its transitions.
pub struct SessionManager {
    api: ApiClient,
    store: Box<dyn CredentialStore>,
    state: RwLock<State>,
}

impl SessionManager {
    /// Creates a manager whose initial state comes from the store: a stored
    /// credential means authenticated, none means anonymous.
    ///
    /// An unreadable store is logged and treated as empty.
    pub fn restore(api: ApiClient, store: Box<dyn CredentialStore>) -> Self {
        let credential = match store.load() {
            Ok(stored) => stored.map(Credential::new),
            Err(e) => {
                warn!("Ignoring unreadable credential store: {e:#}");
                None
            }
        };
        if let Some(credential) = &credential {
            debug!(token = %credential.masked(), "Restored session");
        }

        Self {
            api,
            store,
            state: RwLock::new(State {
                credential,
                epoch: 0,
            }),
        }
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    pub fn session(&self) -> Session {
        match &self.read().credential {
            Some(credential) => Session::Authenticated(credential.clone()),
            None => Session::Anonymous,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.read().credential.is_some()
    }

    /// Returns the active credential. Always `None` once `logout` returned.
    pub fn current_credential(&self) -> Option<Credential> {
        self.read().credential.clone()
    }

    pub(crate) fn ticket(&self) -> Option<Ticket> {
        let state = self.read();
        state.credential.as_ref().map(|credential| Ticket {
            credential: credential.clone(),
            epoch: state.epoch,
        })
    }

    /// Authenticates and, on success, persists the credential and switches
    /// to the inventory view.
    ///
    /// On failure nothing changes: neither the session nor the store. A
    /// reply that arrives after a `logout` issued while it was in flight is
    /// discarded and the result is `View::Login`.
    ///
    /// # Errors
    /// Returns the classified failure of the login call, or `Unexpected` if
    /// the credential could not be persisted.
    pub async fn login(
        &self,
        username: &str,
        password: &SecretString,
    ) -> Result<View, ClassifiedError> {
        debug!(username, "Logging in");
        let epoch = self.read().epoch;
        let request = self.api.request(Method::POST, "auth/login/", None).json(&json!({
            "username": username,
            "password": password.expose_secret(),
        }));

        let response = match self.api.send::<Json<LoginResponse>>(request).await {
            CallOutcome::Success(Json(response)) => response,
            CallOutcome::Failure(failure) => {
                let err = classify(Action::Login, &failure);
                warn!(username, kind = %err.kind, %failure, "Login failed");
                return Err(err);
            }
        };

        if response.access.is_empty() {
            warn!(username, "Login response carried an empty credential");
            return Err(ClassifiedError::unexpected());
        }

        let credential = Credential::new(response.access);
        let mut state = self.write();
        if state.epoch != epoch {
            debug!(epoch, current = state.epoch, "Discarding login superseded by logout");
            return Ok(View::Login);
        }
        if let Err(e) = self.store.save(credential.expose()) {
            warn!("Failed to persist credential: {e:#}");
            return Err(ClassifiedError::unexpected());
        }

        state.credential = Some(credential);
        state.epoch += 1;
        info!(username, "Logged in");

        Ok(View::Inventory)
    }

    /// Creates an account. Never changes the session; success sends the
    /// user to the login view.
    ///
    /// # Errors
    /// Returns the classified failure of the register call.
    pub async fn register(&self, account: &NewAccount) -> Result<View, ClassifiedError> {
        debug!(username = %account.username, "Registering account");
        let request = self
            .api
            .request(Method::POST, "auth/register/", None)
            .json(&json!({
                "username": account.username,
                "email": account.email,
                "password": account.password.expose_secret(),
                "password2": account.password_confirmation.expose_secret(),
            }));

        match self.api.send::<NoContent>(request).await {
            CallOutcome::Success(NoContent) => {
                info!(username = %account.username, "Registered account");
                Ok(View::Login)
            }
            CallOutcome::Failure(failure) => {
                let err = classify(Action::Register, &failure);
                warn!(username = %account.username, kind = %err.kind, %failure, "Registration failed");
                Err(err)
            }
        }
    }

    /// Ends the session. Idempotent.
    pub fn logout(&self) -> View {
        let mut state = self.write();
        if self.end(&mut state) {
            info!("Logged out");
        }
        View::Login
    }

    /// Forced logout after the server rejected a credential.
    ///
    /// Only ends the session the rejected call was made in; a rejection
    /// arriving after a newer login leaves that login alone. Returns whether
    /// the session was ended.
    pub(crate) fn invalidate(&self, epoch: u64) -> bool {
        let mut state = self.write();
        if state.epoch != epoch {
            debug!(epoch, current = state.epoch, "Ignoring stale rejection");
            return false;
        }
        if self.end(&mut state) {
            info!("Session rejected by server; logged out");
        }
        true
    }

    fn end(&self, state: &mut State) -> bool {
        if let Err(e) = self.store.clear() {
            warn!("Failed to clear credential store: {e:#}");
        }
        state.epoch += 1;
        state.credential.take().is_some()
    }

    fn read(&self) -> RwLockReadGuard<'_, State> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, State> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }
}
