//! Core sweets library (session, resource client, error classification, config).

pub mod api;
pub mod classify;
pub mod config;
pub mod logging;
pub mod session;
pub mod sweets;

pub use classify::{Action, ClassifiedError, ErrorKind};
pub use session::{Session, SessionManager, View};
pub use sweets::{ResourceError, SweetDraft, SweetsClient};
