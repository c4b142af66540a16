//! Calls to the remote login/profile service.

use gloo_net::http::{Request, Response};
use serde::de::DeserializeOwned;
use thiserror::Error;

use gatehouse_auth::{LoginResponse, UserProfile};

const DEFAULT_API_BASE: &str = "/api";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ApiError {
    #[error("invalid username or password")]
    InvalidCredentials,

    #[error("session expired or revoked")]
    Unauthorized,

    #[error("server returned status {0}")]
    Status(u16),

    #[error("network error: {0}")]
    Network(String),

    #[error("unexpected response body: {0}")]
    Decode(String),
}

fn api_base() -> &'static str {
    option_env!("GATEHOUSE_API_BASE").unwrap_or(DEFAULT_API_BASE)
}

async fn decode<T: DeserializeOwned>(resp: Response) -> Result<T, ApiError> {
    resp.json::<T>()
        .await
        .map_err(|e| ApiError::Decode(e.to_string()))
}

/// Authenticate against the standard or privileged login endpoint.
pub async fn login(username: &str, password: &str, privileged: bool) -> Result<LoginResponse, ApiError> {
    let endpoint = if privileged { "auth/admin/login" } else { "auth/login" };
    let url = format!("{}/{}", api_base(), endpoint);

    let resp = Request::post(&url)
        .json(&serde_json::json!({
            "username": username,
            "password": password,
        }))
        .map_err(|e| ApiError::Network(e.to_string()))?
        .send()
        .await
        .map_err(|e| ApiError::Network(e.to_string()))?;

    match resp.status() {
        401 | 403 => Err(ApiError::InvalidCredentials),
        _ if !resp.ok() => Err(ApiError::Status(resp.status())),
        _ => decode(resp).await,
    }
}

/// Fetch the current profile with the bearer token.
///
/// `Unauthorized` means the token went stale; the caller clears the session.
pub async fn fetch_profile(token: &str) -> Result<UserProfile, ApiError> {
    let url = format!("{}/auth/profile", api_base());

    let resp = Request::get(&url)
        .header("Authorization", &format!("Bearer {token}"))
        .send()
        .await
        .map_err(|e| ApiError::Network(e.to_string()))?;

    match resp.status() {
        401 => Err(ApiError::Unauthorized),
        _ if !resp.ok() => Err(ApiError::Status(resp.status())),
        _ => decode(resp).await,
    }
}
