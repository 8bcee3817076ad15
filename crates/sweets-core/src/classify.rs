//! Failure classification.
//!
//! Every failed call, whatever its shape, is mapped to exactly one
//! [`ErrorKind`] with a display-ready message. Classification depends only on
//! the failure itself and the action that produced it, never on session state.

use std::fmt;

use serde_json::{Map, Value};

/// Fields reported first, in this order; the rest follow alphabetically.
const FIELD_ORDER: &[&str] = &["name", "category", "price", "quantity"];

/// Keys in an error body that carry general (non-field) detail.
const GENERAL_KEYS: &[&str] = &["detail", "non_field_errors", "message"];

pub const NETWORK_MESSAGE: &str = "Network error. Please check your connection and try again.";
pub const UNEXPECTED_MESSAGE: &str = "An unexpected error occurred. Please try again.";
pub const SESSION_EXPIRED_MESSAGE: &str = "Your session has expired. Please log in again.";

/// The operation a call was made for. Selects message wording and whether
/// auth statuses refer to an attached credential.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Register,
    Login,
    List,
    Search,
    Get,
    Create,
    Update,
    Delete,
    Export,
}

impl Action {
    /// Returns true if the call carries the session credential.
    pub fn requires_credential(self) -> bool {
        !matches!(self, Action::Register | Action::Login)
    }

    /// Short label used in logs.
    pub fn label(self) -> &'static str {
        match self {
            Action::Register => "register",
            Action::Login => "login",
            Action::List => "list",
            Action::Search => "search",
            Action::Get => "get",
            Action::Create => "create",
            Action::Update => "update",
            Action::Delete => "delete",
            Action::Export => "export",
        }
    }

    fn failure_prefix(self) -> &'static str {
        match self {
            Action::Register => "Registration failed.",
            Action::Login => "Login failed.",
            Action::List | Action::Search => "Failed to fetch sweets.",
            Action::Get => "Failed to fetch sweet.",
            Action::Create => "Failed to create sweet.",
            Action::Update => "Failed to update sweet.",
            Action::Delete => "Failed to delete sweet.",
            Action::Export => "Failed to export report.",
        }
    }

    fn permission_message(self) -> &'static str {
        match self {
            Action::Create => "Permission denied: Only Admin users can add items to stock.",
            Action::Update => "Permission denied: Only Admin users can update sweets.",
            Action::Delete => "Permission denied: Only Admin users can delete sweets.",
            Action::Export => "Permission denied: Only Admin users can export the inventory report.",
            Action::List | Action::Search | Action::Get => {
                "Permission denied: Your account is not allowed to view the inventory."
            }
            Action::Register | Action::Login => "Permission denied.",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Result of a single remote call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallOutcome<T> {
    Success(T),
    Failure(Failure),
}

/// The ways a call can fail before yielding a payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Failure {
    /// The server answered with a non-success status.
    Status { status: u16, body: String },
    /// No response was received (refused, reset, timed out).
    NoResponse { reason: String },
    /// Anything else: malformed response, request that could not be built.
    Unexpected { reason: String },
}

impl Failure {
    pub fn status(status: u16, body: impl Into<String>) -> Self {
        Self::Status {
            status,
            body: body.into(),
        }
    }

    pub fn no_response(reason: impl Into<String>) -> Self {
        Self::NoResponse {
            reason: reason.into(),
        }
    }

    pub fn unexpected(reason: impl Into<String>) -> Self {
        Self::Unexpected {
            reason: reason.into(),
        }
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Failure::Status { status, .. } => write!(f, "HTTP {status}"),
            Failure::NoResponse { reason } => write!(f, "no response: {reason}"),
            Failure::Unexpected { reason } => write!(f, "unexpected: {reason}"),
        }
    }
}

/// Closed set of failure categories the presentation layer renders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Credential rejected; absorbed by the core as a forced logout.
    Unauthorized,
    /// Authenticated but not privileged for the action.
    PermissionDenied,
    /// Client-error status, usually with per-field detail.
    Validation,
    /// The server could not be reached.
    Network,
    /// Everything else.
    Unexpected,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::Unauthorized => write!(f, "unauthorized"),
            ErrorKind::PermissionDenied => write!(f, "permission_denied"),
            ErrorKind::Validation => write!(f, "validation"),
            ErrorKind::Network => write!(f, "network"),
            ErrorKind::Unexpected => write!(f, "unexpected"),
        }
    }
}

/// Normalized failure: a kind plus a single display-ready message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifiedError {
    pub kind: ErrorKind,
    pub message: String,
}

impl ClassifiedError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Creates an unexpected error with the generic fallback message.
    pub fn unexpected() -> Self {
        Self::new(ErrorKind::Unexpected, UNEXPECTED_MESSAGE)
    }

    /// Creates an unauthorized error.
    pub fn unauthorized() -> Self {
        Self::new(ErrorKind::Unauthorized, SESSION_EXPIRED_MESSAGE)
    }

    /// Creates a validation error from client-side field checks, worded and
    /// ordered exactly like a server-side one.
    pub fn fields<'a>(
        action: Action,
        errors: impl IntoIterator<Item = (&'a str, &'a str)>,
    ) -> Self {
        let map: Map<String, Value> = errors
            .into_iter()
            .map(|(field, reason)| (field.to_string(), Value::String(reason.to_string())))
            .collect();
        Self::new(
            ErrorKind::Validation,
            format!("{} {}", action.failure_prefix(), sentences(&field_errors(&map))),
        )
    }

    pub fn is_unauthorized(&self) -> bool {
        self.kind == ErrorKind::Unauthorized
    }
}

impl fmt::Display for ClassifiedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ClassifiedError {}

/// Classifies a failed call. Total: every failure maps to exactly one kind.
///
/// Status codes decide the kind; body text only shapes the message.
pub fn classify(action: Action, failure: &Failure) -> ClassifiedError {
    match failure {
        Failure::NoResponse { .. } => ClassifiedError::new(ErrorKind::Network, NETWORK_MESSAGE),
        Failure::Unexpected { .. } => ClassifiedError::unexpected(),
        Failure::Status { status, body } => classify_status(action, *status, body),
    }
}

fn classify_status(action: Action, status: u16, body: &str) -> ClassifiedError {
    match status {
        401 if action.requires_credential() => ClassifiedError::unauthorized(),
        403 if action.requires_credential() => {
            ClassifiedError::new(ErrorKind::PermissionDenied, action.permission_message())
        }
        400..=499 => ClassifiedError::new(ErrorKind::Validation, validation_message(action, body)),
        _ => ClassifiedError::unexpected(),
    }
}

/// Builds the message for a client-error body.
///
/// Field errors win, then general detail, then a generic fallback.
fn validation_message(action: Action, body: &str) -> String {
    let prefix = action.failure_prefix();
    let Ok(Value::Object(map)) = serde_json::from_str::<Value>(body) else {
        return format!("{prefix} Please try again.");
    };

    let fields = field_errors(&map);
    if !fields.is_empty() {
        return format!("{prefix} {}", sentences(&fields));
    }

    GENERAL_KEYS
        .iter()
        .find_map(|key| map.get(*key).and_then(reasons))
        .map_or_else(
            || format!("{prefix} Please try again."),
            |detail| format!("{prefix} {detail}"),
        )
}

/// Collects `Label: reason, reason` entries in stable field order.
fn field_errors(map: &Map<String, Value>) -> Vec<String> {
    let mut rest: Vec<&String> = map
        .keys()
        .filter(|key| !FIELD_ORDER.contains(&key.as_str()) && !GENERAL_KEYS.contains(&key.as_str()))
        .collect();
    rest.sort();

    FIELD_ORDER
        .iter()
        .copied()
        .chain(rest.into_iter().map(String::as_str))
        .filter_map(|key| {
            let text = map.get(key).and_then(reasons)?;
            Some(format!("{}: {}", field_label(key), text))
        })
        .collect()
}

/// Joins entries into sentences without doubling a trailing period.
fn sentences(entries: &[String]) -> String {
    entries
        .iter()
        .map(|entry| {
            if entry.ends_with('.') {
                entry.clone()
            } else {
                format!("{entry}.")
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Flattens a reason value (string, list, or nested object) into one line.
fn reasons(value: &Value) -> Option<String> {
    let text = match value {
        Value::String(s) => s.trim().to_string(),
        Value::Array(items) => items
            .iter()
            .filter_map(reasons)
            .collect::<Vec<_>>()
            .join(", "),
        Value::Object(map) => map
            .values()
            .filter_map(reasons)
            .collect::<Vec<_>>()
            .join(", "),
        Value::Null => String::new(),
        other => other.to_string(),
    };
    (!text.is_empty()).then_some(text)
}

fn field_label(key: &str) -> String {
    match key {
        "password2" => "Password Confirmation".to_string(),
        _ => key
            .split('_')
            .filter(|part| !part.is_empty())
            .map(|part| {
                let mut chars = part.chars();
                chars.next().map_or_else(String::new, |first| {
                    first.to_uppercase().chain(chars).collect()
                })
            })
            .collect::<Vec<_>>()
            .join(" "),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status(code: u16, body: &str) -> Failure {
        Failure::status(code, body)
    }

    #[test]
    fn test_401_on_resource_call_is_unauthorized() {
        for action in [Action::List, Action::Search, Action::Create, Action::Delete] {
            let err = classify(action, &status(401, r#"{"detail":"Token is invalid or expired"}"#));
            assert_eq!(err.kind, ErrorKind::Unauthorized);
        }
    }

    #[test]
    fn test_403_names_restricted_action() {
        let err = classify(
            Action::Create,
            &status(403, r#"{"detail":"You do not have permission to perform this action."}"#),
        );
        assert_eq!(err.kind, ErrorKind::PermissionDenied);
        assert!(err.message.contains("Only Admin users can add items to stock"));

        let err = classify(Action::Delete, &status(403, ""));
        assert_eq!(err.kind, ErrorKind::PermissionDenied);
        assert!(err.message.contains("delete"));
    }

    #[test]
    fn test_403_ignores_detail_wording() {
        // No "admin"/"permission" words in the body; status alone decides.
        let err = classify(Action::Update, &status(403, r#"{"detail":"Nope."}"#));
        assert_eq!(err.kind, ErrorKind::PermissionDenied);
    }

    #[test]
    fn test_400_detail_mentioning_admin_stays_validation() {
        let err = classify(
            Action::Create,
            &status(400, r#"{"detail":"Only admin can set is_available"}"#),
        );
        assert_eq!(err.kind, ErrorKind::Validation);
        assert_eq!(
            err.message,
            "Failed to create sweet. Only admin can set is_available"
        );
    }

    #[test]
    fn test_field_errors_follow_stable_order() {
        let body = r#"{
            "quantity": ["Ensure this value is greater than or equal to 0."],
            "zeta": "odd",
            "price": ["A valid number is required."],
            "name": ["This field is required."],
            "alpha": ["first"]
        }"#;
        let err = classify(Action::Create, &status(400, body));

        assert_eq!(err.kind, ErrorKind::Validation);
        assert_eq!(
            err.message,
            "Failed to create sweet. Name: This field is required. \
             Price: A valid number is required. \
             Quantity: Ensure this value is greater than or equal to 0. \
             Alpha: first. Zeta: odd."
        );
    }

    #[test]
    fn test_multiple_reasons_are_joined() {
        let body = r#"{"name": ["required", "too short"]}"#;
        let err = classify(Action::Update, &status(400, body));
        assert!(err.message.contains("Name: required, too short"));
    }

    #[test]
    fn test_login_rejection_uses_detail() {
        let body = r#"{"detail":"No active account found with the given credentials"}"#;
        let err = classify(Action::Login, &status(401, body));

        assert_eq!(err.kind, ErrorKind::Validation);
        assert_eq!(
            err.message,
            "Login failed. No active account found with the given credentials"
        );
    }

    #[test]
    fn test_non_field_errors_fallback() {
        let body = r#"{"non_field_errors":["Unable to log in."]}"#;
        let err = classify(Action::Login, &status(400, body));
        assert_eq!(err.message, "Login failed. Unable to log in.");
    }

    #[test]
    fn test_register_labels_password_confirmation() {
        let body = r#"{"password2":["This field is required."],"username":["A user with that username already exists."]}"#;
        let err = classify(Action::Register, &status(400, body));
        assert_eq!(
            err.message,
            "Registration failed. Password Confirmation: This field is required. \
             Username: A user with that username already exists."
        );
    }

    #[test]
    fn test_unstructured_client_error_uses_generic_fallback() {
        let err = classify(Action::Create, &status(400, "<html>Bad Request</html>"));
        assert_eq!(err.kind, ErrorKind::Validation);
        assert_eq!(err.message, "Failed to create sweet. Please try again.");

        let err = classify(Action::Create, &status(400, "{}"));
        assert_eq!(err.message, "Failed to create sweet. Please try again.");
    }

    #[test]
    fn test_no_response_is_network() {
        let err = classify(Action::List, &Failure::no_response("connection refused"));
        assert_eq!(err.kind, ErrorKind::Network);
        assert_eq!(err.message, NETWORK_MESSAGE);
    }

    #[test]
    fn test_server_error_and_malformed_payload_are_unexpected() {
        let err = classify(Action::List, &status(500, "Internal Server Error"));
        assert_eq!(err.kind, ErrorKind::Unexpected);
        assert_eq!(err.message, UNEXPECTED_MESSAGE);

        let err = classify(Action::List, &Failure::unexpected("expected array"));
        assert_eq!(err.kind, ErrorKind::Unexpected);
    }

    #[test]
    fn test_classification_is_total_over_status_range() {
        for code in 100..600 {
            for action in [Action::Login, Action::Create] {
                let err = classify(action, &status(code, "{\"detail\": 3}"));
                assert!(!err.message.is_empty(), "empty message for {code}");
            }
        }
    }

    #[test]
    fn test_client_side_field_errors_share_server_format() {
        let err = ClassifiedError::fields(
            Action::Create,
            [("quantity", "A valid integer is required."), ("name", "This field is required.")],
        );
        assert_eq!(err.kind, ErrorKind::Validation);
        assert_eq!(
            err.message,
            "Failed to create sweet. Name: This field is required. \
             Quantity: A valid integer is required."
        );
    }

    #[test]
    fn test_field_label_formats_snake_case() {
        assert_eq!(field_label("stock_level"), "Stock Level");
        assert_eq!(field_label("name"), "Name");
        assert_eq!(field_label("password2"), "Password Confirmation");
    }
}
