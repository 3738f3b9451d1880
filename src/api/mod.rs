//! Dashboard HTTP API client
//!
//! [`ApiClient`] wraps a `reqwest` client configured with the API base URL
//! and request timeout. Access and refresh tokens live in the same
//! [`KeyValueStore`] the session state machine uses, under
//! [`TOKEN_KEY`] and [`REFRESH_TOKEN_KEY`].
//!
//! # Error classification
//!
//! - A request that never produced a response (refused, DNS, timeout) fails
//!   with [`VoxdashError::Network`].
//! - A non-success status fails with [`VoxdashError::Api`]. A `401` also
//!   drops the stored access token.
//!
//! [`ApiClient::current_user`] answers a `401` with one token refresh and a
//! single retry; a failed refresh logs the user out and the error is
//! returned to the caller.

use std::time::Duration;

use reqwest::{RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;

use crate::config::ApiConfig;
use crate::error::{Result, VoxdashError};
use crate::store::{KeyValueStore, REFRESH_TOKEN_KEY, TOKEN_KEY};

pub mod types;
pub use types::{TokenResponse, User};

use types::{LoginForm, RefreshRequest, RegisterRequest};

/// Client for the dashboard HTTP API.
///
/// # Examples
///
/// ```no_run
/// use voxdash::api::ApiClient;
/// use voxdash::config::ApiConfig;
/// use voxdash::store::MemoryStore;
///
/// # async fn example() -> voxdash::error::Result<()> {
/// let client = ApiClient::new(&ApiConfig::default(), MemoryStore::new())?;
/// client.login("ada", "secret").await?;
/// let me = client.current_user().await?;
/// println!("logged in as {}", me.username);
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct ApiClient<S> {
    http: reqwest::Client,
    base_url: String,
    store: S,
}

impl<S: KeyValueStore> ApiClient<S> {
    /// Build a client for `config.base_url`
    ///
    /// # Errors
    ///
    /// Returns `VoxdashError::Http` if the TLS backend cannot initialise
    pub fn new(config: &ApiConfig, store: S) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(VoxdashError::Http)?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            store,
        })
    }

    /// The underlying store
    pub fn store(&self) -> &S {
        &self.store
    }

    /// `true` when a non-empty access token is stored
    pub fn is_logged_in(&self) -> bool {
        self.access_token().is_some()
    }

    /// Log in with the OAuth2 password form.
    ///
    /// Stores the returned access token (and refresh token, when issued),
    /// then loads the user profile. A profile that cannot be loaded does not
    /// fail the login; `Ok(None)` is returned instead. If the profile fetch
    /// gets a `401` and the follow-up refresh fails, both tokens have been
    /// cleared by then and the caller ends up logged out.
    ///
    /// # Errors
    ///
    /// Returns `VoxdashError::Authentication` when the response lacks an
    /// access token, or the classified request error.
    pub async fn login(&self, username: &str, password: &str) -> Result<Option<User>> {
        tracing::info!("Logging in as {}", username);

        let request = self
            .http
            .post(self.url("/auth/login"))
            .form(&LoginForm { username, password });
        let body: TokenResponse = self.send_json(request).await?;

        let access_token = body
            .access_token
            .filter(|token| !token.is_empty())
            .ok_or_else(|| {
                VoxdashError::Authentication("Server did not return an access token".to_string())
            })?;

        self.store.set(TOKEN_KEY, &access_token)?;
        if let Some(refresh_token) = body.refresh_token.filter(|token| !token.is_empty()) {
            self.store.set(REFRESH_TOKEN_KEY, &refresh_token)?;
        }

        match self.current_user().await {
            Ok(user) => Ok(Some(user)),
            Err(e) => {
                tracing::warn!("Logged in but failed to load user profile: {:#}", e);
                Ok(None)
            }
        }
    }

    /// Create an account.
    ///
    /// # Errors
    ///
    /// Returns the classified request error (e.g. `400` for a taken name)
    pub async fn register(&self, username: &str, email: &str, password: &str) -> Result<User> {
        let request = self.http.post(self.url("/auth/register")).json(&RegisterRequest {
            username,
            email,
            password,
        });
        let user: User = self.send_json(request).await?;
        tracing::info!(user_id = user.id, "Registered user {}", user.username);
        Ok(user)
    }

    /// Exchange the stored refresh token for a new access token.
    ///
    /// Any failure logs the user out before the error is returned.
    ///
    /// # Errors
    ///
    /// Returns `VoxdashError::Authentication` when no refresh token is stored
    /// or the response lacks an access token, or the classified request
    /// error.
    pub async fn refresh_token(&self) -> Result<String> {
        match self.try_refresh().await {
            Ok(token) => Ok(token),
            Err(e) => {
                tracing::warn!("Token refresh failed, logging out: {:#}", e);
                self.logout()?;
                Err(e)
            }
        }
    }

    async fn try_refresh(&self) -> Result<String> {
        let refresh_token = self
            .store
            .get(REFRESH_TOKEN_KEY)?
            .filter(|token| !token.is_empty())
            .ok_or_else(|| VoxdashError::Authentication("No refresh token stored".to_string()))?;

        let request = self.http.post(self.url("/auth/refresh")).json(&RefreshRequest {
            refresh_token: &refresh_token,
        });
        let body: TokenResponse = self.send_json(request).await?;

        let access_token = body
            .access_token
            .filter(|token| !token.is_empty())
            .ok_or_else(|| {
                VoxdashError::Authentication(
                    "Server did not return a refreshed access token".to_string(),
                )
            })?;

        self.store.set(TOKEN_KEY, &access_token)?;
        tracing::debug!("Access token refreshed");
        Ok(access_token)
    }

    /// Load the logged-in user's profile, refreshing once on `401`.
    ///
    /// # Errors
    ///
    /// Returns the classified request error, or the refresh error when the
    /// retry could not be attempted.
    pub async fn current_user(&self) -> Result<User> {
        match self.fetch_current_user().await {
            Err(e) if is_unauthorized(&e) => {
                tracing::info!("Access token rejected, attempting refresh");
                self.refresh_token().await?;
                self.fetch_current_user().await
            }
            other => other,
        }
    }

    async fn fetch_current_user(&self) -> Result<User> {
        let request = self.authorized(self.http.get(self.url("/users/me")));
        self.send_json(request).await
    }

    /// Forget both tokens.
    ///
    /// # Errors
    ///
    /// Returns `VoxdashError::Storage` if the store rejects a removal
    pub fn logout(&self) -> Result<()> {
        self.store.remove(TOKEN_KEY)?;
        self.store.remove(REFRESH_TOKEN_KEY)?;
        tracing::info!("Logged out");
        Ok(())
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn access_token(&self) -> Option<String> {
        match self.store.get(TOKEN_KEY) {
            Ok(token) => token.filter(|t| !t.is_empty()),
            Err(e) => {
                tracing::warn!("Failed to read access token: {:#}", e);
                None
            }
        }
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        match self.access_token() {
            Some(token) => request.bearer_auth(token),
            None => {
                tracing::debug!("Sending request without access token");
                request
            }
        }
    }

    async fn send_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        let response = self.send(request).await?;
        response
            .json::<T>()
            .await
            .map_err(|e| VoxdashError::Http(e).into())
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response> {
        let response = request.send().await.map_err(classify_send_error)?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let message = response
            .text()
            .await
            .ok()
            .filter(|body| !body.is_empty())
            .unwrap_or_else(|| status.canonical_reason().unwrap_or("").to_string());

        match status {
            StatusCode::UNAUTHORIZED => {
                tracing::warn!("Authentication failed: {}", message);
                if let Err(e) = self.store.remove(TOKEN_KEY) {
                    tracing::warn!("Failed to clear rejected access token: {:#}", e);
                }
            }
            StatusCode::FORBIDDEN => tracing::warn!("Permission denied: {}", message),
            StatusCode::NOT_FOUND => tracing::warn!("Requested resource does not exist"),
            s if s.is_server_error() => tracing::error!("Server error {}: {}", s, message),
            s => tracing::warn!("Request failed with {}: {}", s, message),
        }

        Err(VoxdashError::Api {
            status: status.as_u16(),
            message,
        }
        .into())
    }
}

fn classify_send_error(e: reqwest::Error) -> anyhow::Error {
    if e.is_builder() {
        tracing::error!("Request configuration error: {}", e);
        return VoxdashError::Http(e).into();
    }
    tracing::error!("Network error, check the connection: {}", e);
    VoxdashError::Network(e.to_string()).into()
}

/// `true` when `error` is an API `401`
pub fn is_unauthorized(error: &anyhow::Error) -> bool {
    error
        .downcast_ref::<VoxdashError>()
        .and_then(VoxdashError::status)
        == Some(401)
}
