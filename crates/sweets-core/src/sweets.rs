//! Resource client for the sweets inventory.
//!
//! Each call reads the credential from the session at dispatch time. A call
//! without a credential never leaves the process. A rejected credential ends
//! the session and surfaces as [`ResourceError::SessionInvalidated`].

use std::str::FromStr;
use std::sync::Arc;

use reqwest::{Method, RequestBuilder};
use rust_decimal::Decimal;
use sweets_types::{Category, SearchFilter, Sweet, SweetFields, SweetId};
use tracing::{debug, warn};

use crate::api::{ApiClient, FromResponse, Json, NoContent, Text};
use crate::classify::{Action, CallOutcome, ClassifiedError, classify};
use crate::session::SessionManager;

/// Failure of a resource call.
#[derive(Debug, thiserror::Error)]
pub enum ResourceError {
    /// The session ended (or never existed). The caller should show the
    /// login view instead of an error message.
    #[error("Your session has ended. Please log in again.")]
    SessionInvalidated,
    #[error(transparent)]
    Failed(#[from] ClassifiedError),
}

/// Unvalidated record fields as entered by a user.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SweetDraft {
    pub name: String,
    pub category: String,
    pub price: String,
    pub quantity: String,
}

impl SweetDraft {
    pub fn new(
        name: impl Into<String>,
        category: impl Into<String>,
        price: impl Into<String>,
        quantity: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            category: category.into(),
            price: price.into(),
            quantity: quantity.into(),
        }
    }

    /// Checks required fields and coerces each value to its wire type.
    ///
    /// Only presence and type are checked; range and business rules belong
    /// to the server.
    ///
    /// # Errors
    /// Returns a `Validation` error listing every failing field.
    pub fn validate(&self, action: Action) -> Result<SweetFields, ClassifiedError> {
        const REQUIRED: &str = "This field is required.";

        let mut errors: Vec<(&str, String)> = Vec::new();

        let name = self.name.trim();
        if name.is_empty() {
            errors.push(("name", REQUIRED.to_string()));
        }

        let category = match self.category.trim() {
            "" => {
                errors.push(("category", REQUIRED.to_string()));
                None
            }
            raw => Category::from_str(raw)
                .inspect_err(|_| {
                    errors.push(("category", format!("\"{raw}\" is not a valid choice.")));
                })
                .ok(),
        };

        let price = match self.price.trim() {
            "" => {
                errors.push(("price", REQUIRED.to_string()));
                None
            }
            raw => Decimal::from_str(raw)
                .inspect_err(|_| errors.push(("price", "A valid number is required.".to_string())))
                .ok(),
        };

        let quantity = match self.quantity.trim() {
            "" => {
                errors.push(("quantity", REQUIRED.to_string()));
                None
            }
            raw => {
                let parsed = leading_integer(raw);
                if parsed.is_none() {
                    errors.push(("quantity", "A valid integer is required.".to_string()));
                }
                parsed
            }
        };

        match (category, price, quantity) {
            (Some(category), Some(price), Some(quantity)) if errors.is_empty() => Ok(SweetFields {
                name: name.to_string(),
                category,
                price,
                quantity,
            }),
            _ => Err(ClassifiedError::fields(
                action,
                errors.iter().map(|(field, reason)| (*field, reason.as_str())),
            )),
        }
    }
}

/// Reads the integer prefix of a value, so `"10"` and `"10.7"` both give 10.
fn leading_integer(raw: &str) -> Option<i64> {
    let (sign, digits) = match raw.strip_prefix('-') {
        Some(rest) => (-1, rest),
        None => (1, raw.strip_prefix('+').unwrap_or(raw)),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    digits[..end].parse::<i64>().ok().map(|n| sign * n)
}

/// Authorized access to the `sweets/` collection.
#[derive(Clone)]
pub struct SweetsClient {
    session: Arc<SessionManager>,
}

impl SweetsClient {
    pub fn new(session: Arc<SessionManager>) -> Self {
        Self { session }
    }

    pub fn session(&self) -> &SessionManager {
        &self.session
    }

    fn api(&self) -> &ApiClient {
        self.session.api()
    }

    /// Returns every record.
    ///
    /// # Errors
    /// See [`ResourceError`].
    pub async fn list(&self) -> Result<Vec<Sweet>, ResourceError> {
        let Json(sweets) = self
            .call(Action::List, Method::GET, "sweets/", |r| r)
            .await?;
        Ok(sweets)
    }

    /// Returns records matching the filter. An empty filter is a plain list.
    ///
    /// # Errors
    /// See [`ResourceError`].
    pub async fn search(&self, filter: &SearchFilter) -> Result<Vec<Sweet>, ResourceError> {
        if filter.is_empty() {
            return self.list().await;
        }

        let query = filter.query_pairs();
        let Json(sweets) = self
            .call(Action::Search, Method::GET, "sweets/search/", |r| {
                r.query(&query)
            })
            .await?;
        Ok(sweets)
    }

    /// Returns one record.
    ///
    /// # Errors
    /// See [`ResourceError`].
    pub async fn get(&self, id: SweetId) -> Result<Sweet, ResourceError> {
        let Json(sweet) = self
            .call(Action::Get, Method::GET, &format!("sweets/{id}/"), |r| r)
            .await?;
        Ok(sweet)
    }

    /// Creates a record from user input.
    ///
    /// # Errors
    /// See [`ResourceError`]. Missing or mistyped fields fail before dispatch.
    pub async fn create(&self, draft: &SweetDraft) -> Result<Sweet, ResourceError> {
        self.require_session(Action::Create)?;
        let fields = draft.validate(Action::Create)?;
        self.create_fields(&fields).await
    }

    /// Creates a record from already-typed fields.
    ///
    /// # Errors
    /// See [`ResourceError`].
    pub async fn create_fields(&self, fields: &SweetFields) -> Result<Sweet, ResourceError> {
        let Json(sweet) = self
            .call(Action::Create, Method::POST, "sweets/", |r| r.json(fields))
            .await?;
        Ok(sweet)
    }

    /// Replaces the fields of a record.
    ///
    /// # Errors
    /// See [`ResourceError`]. Missing or mistyped fields fail before dispatch.
    pub async fn update(&self, id: SweetId, draft: &SweetDraft) -> Result<Sweet, ResourceError> {
        self.require_session(Action::Update)?;
        let fields = draft.validate(Action::Update)?;
        let Json(sweet) = self
            .call(Action::Update, Method::PUT, &format!("sweets/{id}/"), |r| {
                r.json(&fields)
            })
            .await?;
        Ok(sweet)
    }

    /// Deletes a record. The caller refreshes its own view afterwards.
    ///
    /// # Errors
    /// See [`ResourceError`].
    pub async fn delete(&self, id: SweetId) -> Result<(), ResourceError> {
        let NoContent = self
            .call(Action::Delete, Method::DELETE, &format!("sweets/{id}/"), |r| r)
            .await?;
        Ok(())
    }

    /// Downloads the inventory report as CSV. Administrators only.
    ///
    /// # Errors
    /// See [`ResourceError`].
    pub async fn export_report(&self) -> Result<String, ResourceError> {
        let Text(csv) = self
            .call(Action::Export, Method::GET, "report/export_csv/", |r| r)
            .await?;
        Ok(csv)
    }

    /// An ended session takes precedence over local input errors.
    fn require_session(&self, action: Action) -> Result<(), ResourceError> {
        if self.session.is_authenticated() {
            Ok(())
        } else {
            debug!(%action, "No credential; not validating");
            Err(ResourceError::SessionInvalidated)
        }
    }

    async fn call<T: FromResponse>(
        &self,
        action: Action,
        method: Method,
        path: &str,
        build: impl FnOnce(RequestBuilder) -> RequestBuilder,
    ) -> Result<T, ResourceError> {
        let Some(ticket) = self.session.ticket() else {
            debug!(%action, "No credential; not dispatching");
            return Err(ResourceError::SessionInvalidated);
        };

        debug!(%action, %method, path, "Dispatching request");
        let request = build(self.api().request(method, path, Some(ticket.credential.secret())));

        match self.api().send::<T>(request).await {
            CallOutcome::Success(value) => Ok(value),
            CallOutcome::Failure(failure) => {
                let err = classify(action, &failure);
                if err.is_unauthorized() {
                    self.session.invalidate(ticket.epoch);
                    return Err(ResourceError::SessionInvalidated);
                }
                warn!(%action, kind = %err.kind, %failure, "Request failed");
                Err(ResourceError::Failed(err))
            }
        }
    }
}
