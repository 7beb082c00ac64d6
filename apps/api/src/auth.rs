//! Bearer-token authentication, delegated to the auth provider.
//!
//! Handlers take an [`AuthUser`] argument; the extractor rejects the request
//! with 401 before the handler runs when the token is missing or refused.

use std::time::Duration;

use async_trait::async_trait;
use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum::http::HeaderMap;
use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;
use uuid::Uuid;

use crate::errors::AppError;
use crate::state::AppState;

const VERIFY_TIMEOUT: Duration = Duration::from_secs(10);

/// The authenticated caller. Every owner-scoped operation runs as this id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    pub id: Uuid,
    pub email: Option<String>,
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("missing bearer token")]
    MissingToken,

    #[error("token rejected")]
    Rejected,

    #[error("{0}")]
    Provider(String),
}

#[async_trait]
pub trait AuthVerifier: Send + Sync {
    async fn verify(&self, token: &str) -> Result<AuthUser, AuthError>;
}

#[derive(Debug, Deserialize)]
struct ProviderUser {
    id: Uuid,
    #[serde(default)]
    email: Option<String>,
}

/// Verifies access tokens by asking the Supabase auth server who they belong to.
#[derive(Clone)]
pub struct SupabaseAuth {
    client: Client,
    user_url: String,
    anon_key: String,
}

impl SupabaseAuth {
    pub fn new(base_url: &str, anon_key: impl Into<String>) -> Result<Self, AuthError> {
        let client = Client::builder()
            .timeout(VERIFY_TIMEOUT)
            .build()
            .map_err(|e| AuthError::Provider(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            user_url: format!("{}/auth/v1/user", base_url.trim_end_matches('/')),
            anon_key: anon_key.into(),
        })
    }
}

#[async_trait]
impl AuthVerifier for SupabaseAuth {
    async fn verify(&self, token: &str) -> Result<AuthUser, AuthError> {
        let response = self
            .client
            .get(&self.user_url)
            .header("apikey", &self.anon_key)
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| AuthError::Provider(e.to_string()))?;

        match response.status() {
            status if status.is_success() => {
                let user: ProviderUser = response
                    .json()
                    .await
                    .map_err(|e| AuthError::Provider(format!("Malformed user payload: {e}")))?;
                Ok(AuthUser {
                    id: user.id,
                    email: user.email,
                })
            }
            reqwest::StatusCode::UNAUTHORIZED | reqwest::StatusCode::FORBIDDEN => {
                Err(AuthError::Rejected)
            }
            status => Err(AuthError::Provider(format!("auth server returned {status}"))),
        }
    }
}

/// Extracts `<token>` from `Authorization: Bearer <token>`.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();
    if scheme.eq_ignore_ascii_case("bearer") && !token.is_empty() {
        Some(token)
    } else {
        None
    }
}

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = bearer_token(&parts.headers).ok_or(AuthError::MissingToken)?;
        Ok(state.auth.verify(token).await?)
    }
}
