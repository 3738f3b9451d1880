//! Wire types for the dashboard HTTP API

use serde::{Deserialize, Serialize};

/// Body of `/auth/login` and `/auth/refresh` responses.
///
/// Every field is optional on the wire so that a response without an
/// `access_token` can be reported as an authentication failure rather than a
/// decoding error.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TokenResponse {
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub refresh_token: Option<String>,
}

/// Form body of `/auth/login` (OAuth2 password form)
#[derive(Debug, Clone, Serialize)]
pub struct LoginForm<'a> {
    pub username: &'a str,
    pub password: &'a str,
}

/// JSON body of `/auth/register`
#[derive(Debug, Clone, Serialize)]
pub struct RegisterRequest<'a> {
    pub username: &'a str,
    pub email: &'a str,
    pub password: &'a str,
}

/// JSON body of `/auth/refresh`
#[derive(Debug, Clone, Serialize)]
pub struct RefreshRequest<'a> {
    pub refresh_token: &'a str,
}

/// Dashboard user as returned by `/users/me` and `/auth/register`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    #[serde(default)]
    pub email: Option<String>,
}
