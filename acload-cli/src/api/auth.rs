//! OAuth2 client-credentials session
//!
//! [`Session::acquire`] fetches a bearer token eagerly, so bad credentials
//! fail before any work starts. The token is then cached for the rest of the
//! run and refetched shortly before it expires.

use std::sync::Arc;

use anyhow::{Context, Result, bail};
use arc_swap::ArcSwapOption;
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;

use super::transport::{ApiRequest, ApiResponse, Transport};
use crate::config::Config;

/// Refresh this long before the reported expiry
const REFRESH_MARGIN_SECS: i64 = 60;
/// Assumed lifetime when the token endpoint omits `expires_in`
const DEFAULT_LIFETIME_SECS: i64 = 300;

/// Token endpoint response body
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    token_type: Option<String>,
    #[serde(default)]
    expires_in: Option<i64>,
}

/// Cached access token
#[derive(Debug, Clone, PartialEq)]
pub struct TokenInfo {
    pub access_token: String,
    pub token_type: String,
    pub expires_at: DateTime<Utc>,
}

impl TokenInfo {
    fn from_response(response: TokenResponse, issued_at: DateTime<Utc>) -> Self {
        let lifetime = response.expires_in.unwrap_or(DEFAULT_LIFETIME_SECS);
        Self {
            access_token: response.access_token,
            token_type: response.token_type.unwrap_or_else(|| "bearer".to_string()),
            expires_at: issued_at + Duration::seconds(lifetime),
        }
    }

    /// True once the token is within the refresh margin of expiry
    pub fn needs_refresh(&self, now: DateTime<Utc>) -> bool {
        now + Duration::seconds(REFRESH_MARGIN_SECS) >= self.expires_at
    }
}

/// Authenticated HTTP session against one Asset Central tenant
pub struct Session {
    config: Config,
    http: reqwest::Client,
    token: ArcSwapOption<TokenInfo>,
}

impl Session {
    /// Perform the client-credentials grant and return a ready session
    pub async fn acquire(config: Config) -> Result<Self> {
        let http = reqwest::Client::builder()
            .build()
            .context("Failed to build HTTP client")?;

        let session = Self {
            config,
            http,
            token: ArcSwapOption::empty(),
        };
        session.refresh_token().await?;

        Ok(session)
    }

    /// Current access token, refetching if it is about to expire
    async fn access_token(&self) -> Result<String> {
        if let Some(token) = self.token.load_full() {
            if !token.needs_refresh(Utc::now()) {
                return Ok(token.access_token.clone());
            }
            log::debug!("Access token expires at {}, refreshing", token.expires_at);
        }

        let token = self.refresh_token().await?;
        Ok(token.access_token.clone())
    }

    async fn refresh_token(&self) -> Result<Arc<TokenInfo>> {
        log::debug!("Requesting access token from {}", self.config.token_url);

        let response = self
            .http
            .post(&self.config.token_url)
            .basic_auth(&self.config.client_id, Some(&self.config.client_secret))
            .form(&[
                ("grant_type", "client_credentials"),
                ("client_id", self.config.client_id.as_str()),
            ])
            .send()
            .await
            .with_context(|| format!("Failed to reach token endpoint {}", self.config.token_url))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .context("Failed to read token endpoint response")?;

        if !status.is_success() {
            bail!(
                "Token endpoint rejected the client credentials (HTTP {}): {}",
                status.as_u16(),
                body.trim()
            );
        }

        let parsed: TokenResponse =
            serde_json::from_str(&body).context("Token endpoint returned an unexpected body")?;
        let token = Arc::new(TokenInfo::from_response(parsed, Utc::now()));

        log::info!("Authenticated with Asset Central, token valid until {}", token.expires_at);
        self.token.store(Some(token.clone()));

        Ok(token)
    }
}

#[async_trait]
impl Transport for Session {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse> {
        let token = self.access_token().await?;
        let url = self.config.url(&request.path);

        let mut builder = self
            .http
            .request(request.method.clone(), &url)
            .bearer_auth(token)
            .header(reqwest::header::ACCEPT, "application/json");
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder
            .send()
            .await
            .with_context(|| format!("Request failed: {}", request.describe()))?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .with_context(|| format!("Failed to read response body: {}", request.describe()))?;

        log::debug!("{} -> {}", request.describe(), status);
        Ok(ApiResponse { status, body })
    }
}
