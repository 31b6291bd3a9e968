//! Session lifecycle: login, registration, logout, and restoration of a
//! persisted credential.
//!
//! The session store is the single writer of the credential held by the
//! [`ApiClient`]; every other component only ever reads it.

use std::path::PathBuf;

use jsonwebtoken::{Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::api::ApiClient;
use crate::error::ApiError;

/// Errors from the session lifecycle.
#[derive(Error, Debug)]
pub enum SessionError {
    /// Login rejected by the service.
    #[error("login failed: {0}")]
    Authentication(String),

    /// Registration rejected by the service.
    #[error("registration failed: {0}")]
    Registration(String),

    /// The credential token could not be decoded.
    #[error("malformed credential token: {0}")]
    TokenDecode(#[from] jsonwebtoken::errors::Error),

    /// Any other service failure.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// Credential storage failure.
    #[error("credential storage error: {0}")]
    Io(#[from] std::io::Error),
}

/// The currently authenticated identity, decoded from the credential
/// token. Replaced wholesale on login, destroyed on logout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub user_id: u64,
    pub username: String,
    pub email: String,
    /// The raw bearer credential this session was decoded from.
    pub token: String,
}

/// Identity claims embedded in the service-issued token.
#[derive(Debug, Deserialize)]
struct IdentityClaims {
    user_id: u64,
    username: String,
    email: String,
}

#[derive(Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Deserialize)]
struct LoginResponse {
    token: String,
}

#[derive(Serialize)]
struct RegisterRequest<'a> {
    username: &'a str,
    email: &'a str,
    password: &'a str,
}

/// Decode the identity claims carried by a credential token.
///
/// The service signs tokens server-side and the client holds no key, so
/// the signature is not checked here. Expiry still is: an expired token
/// fails to decode.
fn decode_session(token: &str) -> Result<Session, jsonwebtoken::errors::Error> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.insecure_disable_signature_validation();

    let data = jsonwebtoken::decode::<IdentityClaims>(token, &DecodingKey::from_secret(&[]), &validation)?;
    Ok(Session {
        user_id: data.claims.user_id,
        username: data.claims.username,
        email: data.claims.email,
        token: token.to_string(),
    })
}

/// Holds the current authenticated identity and drives every transition
/// of it: login, register, logout, and restore-on-startup.
pub struct SessionStore {
    api: ApiClient,
    tokens: TokenStore,
    session: Option<Session>,
}

impl SessionStore {
    #[must_use]
    pub fn new(api: ApiClient, tokens: TokenStore) -> Self {
        Self {
            api,
            tokens,
            session: None,
        }
    }

    /// Whether a session is currently held.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.session.is_some()
    }

    /// The current session, if any.
    #[must_use]
    pub fn current(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    /// Exchange credentials for a token, decode the embedded identity,
    /// persist the token, and install it on the API client.
    ///
    /// # Errors
    /// `Authentication` if the service rejects the credentials; prior
    /// session state is left untouched on any failure.
    pub async fn login(&mut self, email: &str, password: &str) -> Result<&Session, SessionError> {
        let response: LoginResponse = self
            .api
            .post("/auth/login/", &LoginRequest { email, password })
            .await
            .map_err(|e| match e {
                ApiError::Auth(message) => SessionError::Authentication(message),
                ApiError::Validation(errors) => SessionError::Authentication(errors.to_string()),
                other => SessionError::Api(other),
            })?;

        let session = decode_session(&response.token)?;
        self.tokens.save(&response.token)?;
        self.api.set_credential(Some(response.token));

        info!(user = %session.username, "logged in");
        Ok(self.session.insert(session))
    }

    /// Create an account, then immediately log in with it.
    ///
    /// # Errors
    /// `Registration` if the service rejects the submission; no login is
    /// attempted in that case.
    pub async fn register(
        &mut self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<&Session, SessionError> {
        self.api
            .post_empty(
                "/auth/register/",
                &RegisterRequest {
                    username,
                    email,
                    password,
                },
            )
            .await
            .map_err(|e| match e {
                ApiError::Validation(errors) => SessionError::Registration(errors.to_string()),
                ApiError::Auth(message) => SessionError::Registration(message),
                other => SessionError::Api(other),
            })?;

        info!(user = %username, "registered");
        self.login(email, password).await
    }

    /// Drop the session, the installed credential, and the persisted
    /// token. No network call; cannot fail.
    pub fn logout(&mut self) {
        self.tokens.clear();
        self.api.set_credential(None);
        if let Some(session) = self.session.take() {
            info!(user = %session.username, "logged out");
        }
    }

    /// Restore a session from the persisted token, if one is present and
    /// still decodes. Absent, malformed, or expired tokens leave the
    /// store logged out without raising.
    pub fn restore(&mut self) -> bool {
        let Some(token) = self.tokens.load() else {
            return false;
        };

        match decode_session(&token) {
            Ok(session) => {
                debug!(user = %session.username, "session restored from persisted token");
                self.api.set_credential(Some(token));
                self.session = Some(session);
                true
            }
            Err(e) => {
                debug!(error = %e, "discarding persisted credential");
                self.tokens.clear();
                false
            }
        }
    }
}

/// Persistence for the single credential token string.
pub struct TokenStore {
    path: PathBuf,
}

impl TokenStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Platform-default credential file location.
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "taskhub")
            .map(|dirs| dirs.data_dir().join("credential"))
    }

    /// Read the persisted token. Any failure reads as "no token".
    #[must_use]
    pub fn load(&self) -> Option<String> {
        let token = std::fs::read_to_string(&self.path).ok()?;
        let token = token.trim().to_string();
        (!token.is_empty()).then_some(token)
    }

    /// Persist the token.
    ///
    /// # Errors
    /// Returns an error if the file cannot be written.
    pub fn save(&self, token: &str) -> Result<(), std::io::Error> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, token)
    }

    /// Remove the persisted token, ignoring failures.
    pub fn clear(&self) {
        if let Err(e) = std::fs::remove_file(&self.path) {
            if e.kind() != std::io::ErrorKind::NotFound {
                warn!(error = %e, path = %self.path.display(), "failed to remove stored credential");
            }
        }
    }
}
