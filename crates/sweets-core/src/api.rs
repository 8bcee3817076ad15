//! HTTP transport for the inventory server.
//!
//! Every call resolves to a [`CallOutcome`]; nothing here interprets status
//! codes beyond success vs. failure. Interpretation lives in `classify`.

use anyhow::{Context, Result};
use reqwest::{Method, RequestBuilder, Response};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;

use crate::classify::{CallOutcome, Failure};
use crate::config::Config;

const USER_AGENT: &str = concat!("sweets/", env!("CARGO_PKG_VERSION"));

/// Thin wrapper over a configured HTTP client and the server base path.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    /// Builds a client from resolved configuration.
    ///
    /// # Errors
    /// Returns an error if the base URL is invalid or the HTTP client cannot
    /// be constructed.
    pub fn from_config(config: &Config) -> Result<Self> {
        let base_url = config.resolve_base_url()?;
        Self::new(base_url, config.request_timeout())
    }

    /// Builds a client for an explicit base path.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(base_url: impl Into<String>, timeout: Option<std::time::Duration>) -> Result<Self> {
        let mut builder = reqwest::Client::builder().user_agent(USER_AGENT);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build().context("Failed to build HTTP client")?;

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Joins a relative path (e.g. `sweets/3/`) onto the base path.
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Starts a request, attaching the bearer credential when given.
    pub(crate) fn request(
        &self,
        method: Method,
        path: &str,
        credential: Option<&SecretString>,
    ) -> RequestBuilder {
        let builder = self.http.request(method, self.endpoint(path));
        match credential {
            Some(token) => builder.bearer_auth(token.expose_secret()),
            None => builder,
        }
    }

    /// Sends a request and decodes a successful response as `T`.
    pub(crate) async fn send<T: FromResponse>(&self, request: RequestBuilder) -> CallOutcome<T> {
        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => return CallOutcome::Failure(classify_reqwest_error(&e)),
        };

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return CallOutcome::Failure(Failure::status(status.as_u16(), body));
        }

        match T::from_response(response).await {
            Ok(value) => CallOutcome::Success(value),
            Err(failure) => CallOutcome::Failure(failure),
        }
    }
}

/// Decodes a successful response body.
pub(crate) trait FromResponse: Sized {
    async fn from_response(response: Response) -> Result<Self, Failure>;
}

/// JSON payload.
pub(crate) struct Json<T>(pub T);

impl<T: DeserializeOwned> FromResponse for Json<T> {
    async fn from_response(response: Response) -> Result<Self, Failure> {
        let text = response.text().await.map_err(|e| classify_reqwest_error(&e))?;
        serde_json::from_str(&text)
            .map(Json)
            .map_err(|e| Failure::unexpected(format!("Malformed response payload: {e}")))
    }
}

/// Body ignored; only the success status matters.
pub(crate) struct NoContent;

impl FromResponse for NoContent {
    async fn from_response(_response: Response) -> Result<Self, Failure> {
        Ok(NoContent)
    }
}

/// Raw text payload, e.g. a CSV document.
pub(crate) struct Text(pub String);

impl FromResponse for Text {
    async fn from_response(response: Response) -> Result<Self, Failure> {
        response
            .text()
            .await
            .map(Text)
            .map_err(|e| classify_reqwest_error(&e))
    }
}

/// Maps transport errors to failures. Anything that means "no answer from
/// the server" becomes `NoResponse`; a response that broke off mid-body was
/// still received and stays `Unexpected`.
fn classify_reqwest_error(e: &reqwest::Error) -> Failure {
    if e.is_timeout() {
        Failure::no_response(format!("Request timed out: {e}"))
    } else if e.is_connect() {
        Failure::no_response(format!("Connection failed: {e}"))
    } else if e.is_request() {
        Failure::no_response(format!("Request error: {e}"))
    } else {
        Failure::unexpected(format!("Transport error: {e}"))
    }
}
