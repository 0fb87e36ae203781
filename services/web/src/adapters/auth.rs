//! services/web/src/adapters/auth.rs
//!
//! The OAuth adapter: the concrete implementation of the `AuthService` port.
//! The code exchange and account lookup go to the external provider over
//! HTTP; the resulting (token, username) pair is persisted in the `sessions`
//! table keyed by a freshly minted opaque authId.

use async_trait::async_trait;
use reqwest::Url;
use reviewer_core::ports::{AuthService, PortError, PortResult};
use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::config::OauthConfig;

/// An OAuth adapter that implements the `AuthService` port.
#[derive(Clone)]
pub struct OauthAdapter {
    http: reqwest::Client,
    pool: PgPool,
    config: OauthConfig,
}

impl OauthAdapter {
    pub fn new(http: reqwest::Client, pool: PgPool, config: OauthConfig) -> Self {
        Self { http, pool, config }
    }
}

fn provider_error(context: &str, e: reqwest::Error) -> PortError {
    PortError::Authentication(format!("{context}: {e}"))
}

fn storage_error(e: sqlx::Error) -> PortError {
    PortError::Unexpected(e.to_string())
}

//=========================================================================================
// Provider Response Payloads
//=========================================================================================

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Deserialize)]
struct AccountResponse {
    username: String,
}

//=========================================================================================
// Port Implementation
//=========================================================================================

#[async_trait]
impl AuthService for OauthAdapter {
    async fn resolve_username(&self, auth_id: &str) -> PortResult<Option<String>> {
        if auth_id.is_empty() {
            return Ok(None);
        }
        sqlx::query_scalar::<_, String>("SELECT username FROM sessions WHERE auth_id = $1")
            .bind(auth_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(storage_error)
    }

    fn begin_auth(&self) -> String {
        let mut url: Url = self.config.auth_url.clone();
        url.query_pairs_mut()
            .append_pair("response_type", "code")
            .append_pair("client_id", &self.config.client_id)
            .append_pair("redirect_uri", self.config.redirect_url.as_str());
        url.into()
    }

    async fn complete_auth(&self, code: &str) -> PortResult<String> {
        if code.is_empty() {
            return Err(PortError::Authentication(
                "callback carried no authorization code".to_string(),
            ));
        }

        // 1. Exchange the authorization code for an access token.
        let token: TokenResponse = self
            .http
            .post(self.config.token_url.clone())
            .form(&[
                ("grant_type", "authorization_code"),
                ("code", code),
                ("redirect_uri", self.config.redirect_url.as_str()),
                ("client_id", &self.config.client_id),
                ("client_secret", &self.config.client_secret),
            ])
            .send()
            .await
            .map_err(|e| provider_error("token request failed", e))?
            .error_for_status()
            .map_err(|e| provider_error("token endpoint rejected the code", e))?
            .json()
            .await
            .map_err(|e| provider_error("malformed token response", e))?;

        // 2. Resolve the external identity behind the token.
        let account: AccountResponse = self
            .http
            .get(self.config.account_url.clone())
            .bearer_auth(&token.access_token)
            .send()
            .await
            .map_err(|e| provider_error("account request failed", e))?
            .error_for_status()
            .map_err(|e| provider_error("account endpoint rejected the token", e))?
            .json()
            .await
            .map_err(|e| provider_error("malformed account response", e))?;

        // 3. Persist the pair under a fresh opaque authId. A session exists
        //    only once both provider calls have succeeded.
        let auth_id = Uuid::new_v4().to_string();
        sqlx::query(
            "INSERT INTO sessions (auth_id, access_token, username) VALUES ($1, $2, $3)",
        )
        .bind(&auth_id)
        .bind(&token.access_token)
        .bind(&account.username)
        .execute(&self.pool)
        .await
        .map_err(storage_error)?;

        Ok(auth_id)
    }

    async fn logout(&self, auth_id: &str) -> PortResult<()> {
        if auth_id.is_empty() {
            return Ok(());
        }
        // Deleting a row that is already gone is the idempotent case.
        sqlx::query("DELETE FROM sessions WHERE auth_id = $1")
            .bind(auth_id)
            .execute(&self.pool)
            .await
            .map_err(storage_error)?;
        Ok(())
    }
}
