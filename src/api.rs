//! HTTP transport shared by the session store and the task directory.
//!
//! The bearer credential is injected state on the client rather than a
//! process-global header: clones share one credential cell, written only
//! by the session store and read by every outgoing request.

use std::sync::{Arc, RwLock};
use std::time::Duration;

use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use crate::error::{server_message, ApiError, ValidationErrors};

/// Default timeout for API requests.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Request-building collaborator for the remote service.
#[derive(Clone)]
pub struct ApiClient {
    /// HTTP client.
    http: Client,
    /// Service base URL, without a trailing slash.
    base_url: String,
    /// Current bearer credential, one per process.
    credential: Arc<RwLock<Option<String>>>,
}

impl ApiClient {
    /// Create a client for the service at `base_url`.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be created.
    pub fn new(base_url: impl Into<String>) -> Result<Self, ApiError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()?;
        let base_url = base_url.into().trim_end_matches('/').to_string();

        Ok(Self {
            http,
            base_url,
            credential: Arc::new(RwLock::new(None)),
        })
    }

    /// Install or remove the bearer credential attached to every request.
    pub fn set_credential(&self, token: Option<String>) {
        *self.credential.write().expect("credential lock poisoned") = token;
    }

    /// The currently installed bearer credential, if any.
    #[must_use]
    pub fn credential(&self) -> Option<String> {
        self.credential
            .read()
            .expect("credential lock poisoned")
            .clone()
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{path}", self.base_url);
        let mut request = self.http.request(method, &url);
        if let Some(token) = self.credential() {
            request = request.header(reqwest::header::AUTHORIZATION, format!("Bearer {token}"));
        }
        request
    }

    /// Make a GET request.
    ///
    /// # Errors
    /// Returns an error on transport failure or a non-success status.
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        debug!(path, "GET request");
        let response = self.request(Method::GET, path).send().await?;
        Self::handle_response(response).await
    }

    /// Make a GET request with query parameters.
    ///
    /// # Errors
    /// Returns an error on transport failure or a non-success status.
    pub async fn get_with_query<T, Q>(&self, path: &str, query: &Q) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
    {
        debug!(path, "GET request");
        let response = self.request(Method::GET, path).query(query).send().await?;
        Self::handle_response(response).await
    }

    /// Make a POST request.
    ///
    /// # Errors
    /// Returns an error on transport failure or a non-success status.
    pub async fn post<T, B>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize,
    {
        debug!(path, "POST request");
        let response = self.request(Method::POST, path).json(body).send().await?;
        Self::handle_response(response).await
    }

    /// Make a POST request whose response body is ignored.
    ///
    /// # Errors
    /// Returns an error on transport failure or a non-success status.
    pub async fn post_empty<B: Serialize>(&self, path: &str, body: &B) -> Result<(), ApiError> {
        debug!(path, "POST request (response ignored)");
        let response = self.request(Method::POST, path).json(body).send().await?;

        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            let text = response.text().await.unwrap_or_default();
            Err(map_status(status, &text))
        }
    }

    /// Make a PUT request.
    ///
    /// # Errors
    /// Returns an error on transport failure or a non-success status.
    pub async fn put<T, B>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize,
    {
        debug!(path, "PUT request");
        let response = self.request(Method::PUT, path).json(body).send().await?;
        Self::handle_response(response).await
    }

    /// Make a PATCH request.
    ///
    /// # Errors
    /// Returns an error on transport failure or a non-success status.
    pub async fn patch<T, B>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize,
    {
        debug!(path, "PATCH request");
        let response = self.request(Method::PATCH, path).json(body).send().await?;
        Self::handle_response(response).await
    }

    /// Make a DELETE request. Deleting an id that is already gone is
    /// reported as [`ApiError::NotFound`], not success.
    ///
    /// # Errors
    /// Returns an error on transport failure or a non-success status.
    pub async fn delete(&self, path: &str) -> Result<(), ApiError> {
        debug!(path, "DELETE request");
        let response = self.request(Method::DELETE, path).send().await?;

        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            let text = response.text().await.unwrap_or_default();
            Err(map_status(status, &text))
        }
    }

    /// Handle an API response, parsing JSON or mapping the error status.
    async fn handle_response<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
        let status = response.status();
        let text = response.text().await?;

        if status.is_success() {
            serde_json::from_str(&text).map_err(|e| {
                warn!(error = %e, body = %text, "Failed to parse response");
                ApiError::Serialization(e)
            })
        } else {
            Err(map_status(status, &text))
        }
    }
}

/// Map a non-success status and its body to the error taxonomy.
fn map_status(status: StatusCode, body: &str) -> ApiError {
    match status {
        StatusCode::BAD_REQUEST => ApiError::Validation(ValidationErrors::from_body(body)),
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ApiError::Auth(
            server_message(body).unwrap_or_else(|| "authentication required".to_string()),
        ),
        StatusCode::NOT_FOUND => ApiError::NotFound(
            server_message(body).unwrap_or_else(|| "resource not found".to_string()),
        ),
        _ => ApiError::Server {
            status: status.as_u16(),
            message: body.to_string(),
        },
    }
}
