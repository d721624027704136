//! Bearer token cache for the game catalog
//!
//! Tokens come from a client-credentials exchange against the Twitch identity
//! provider. A statically configured token short-circuits everything.
//!
//! The mutex only guards the cached value; it is released before the
//! credential request, so concurrent misses may each mint a token.

use std::time::{Duration, Instant};

use cinelog_common::config::IgdbConfig;
use cinelog_common::{Error, Result};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// Default safety margin subtracted from the upstream lifetime
pub const DEFAULT_MARGIN: Duration = Duration::from_secs(60);

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: u64,
}

#[derive(Debug, Clone)]
struct CachedToken {
    value: String,
    expires_at: Instant,
}

/// Where bearer tokens come from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenSource {
    /// Configured access token, never refreshed
    Static,
    /// Minted from the client id and secret
    ClientCredentials,
    /// Neither a token nor a complete credential pair
    Unconfigured,
}

/// Point-in-time view of the cache, reported by the health endpoint
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TokenStatus {
    pub source: TokenSource,
    /// A minted token is held and not yet past its expiry
    pub cached: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_in_secs: Option<u64>,
}

/// Lazily minted, expiry-aware bearer token
pub struct TokenCache {
    http: reqwest::Client,
    token_url: String,
    client_id: Option<String>,
    client_secret: Option<String>,
    static_token: Option<String>,
    margin: Duration,
    cached: Mutex<Option<CachedToken>>,
}

impl TokenCache {
    pub fn new(
        http: reqwest::Client,
        token_url: impl Into<String>,
        client_id: Option<String>,
        client_secret: Option<String>,
    ) -> Self {
        Self {
            http,
            token_url: token_url.into(),
            client_id,
            client_secret,
            static_token: None,
            margin: DEFAULT_MARGIN,
            cached: Mutex::new(None),
        }
    }

    pub fn from_config(http: reqwest::Client, config: &IgdbConfig) -> Self {
        Self::new(
            http,
            config.token_url.clone(),
            config.client_id.clone(),
            config.client_secret.clone(),
        )
        .with_static_token(config.access_token.clone())
        .with_margin(Duration::from_secs(config.token_margin_secs))
    }

    pub fn with_static_token(mut self, token: Option<String>) -> Self {
        self.static_token = token;
        self
    }

    pub fn with_margin(mut self, margin: Duration) -> Self {
        self.margin = margin;
        self
    }

    pub fn client_id(&self) -> Option<&str> {
        self.client_id.as_deref()
    }

    pub fn source(&self) -> TokenSource {
        if self.static_token.is_some() {
            TokenSource::Static
        } else if self.client_id.is_some() && self.client_secret.is_some() {
            TokenSource::ClientCredentials
        } else {
            TokenSource::Unconfigured
        }
    }

    /// Report the source and whether a live minted token is held
    pub async fn status(&self) -> TokenStatus {
        let now = Instant::now();
        let expires_in = self
            .cached
            .lock()
            .await
            .as_ref()
            .filter(|c| now < c.expires_at)
            .map(|c| c.expires_at - now);

        TokenStatus {
            source: self.source(),
            cached: expires_in.is_some(),
            expires_in_secs: expires_in.map(|d| d.as_secs()),
        }
    }

    /// Return a usable bearer token, minting one on a cache miss
    pub async fn get_token(&self) -> Result<String> {
        if let Some(token) = &self.static_token {
            return Ok(token.clone());
        }

        if let Some(cached) = self.cached.lock().await.as_ref() {
            if Instant::now() < cached.expires_at {
                return Ok(cached.value.clone());
            }
            debug!("Cached IGDB token expired");
        }

        let fresh = self.mint().await?;
        let value = fresh.value.clone();
        *self.cached.lock().await = Some(fresh);
        Ok(value)
    }

    /// Drop the cached token so the next call mints a new one
    pub async fn invalidate(&self) {
        *self.cached.lock().await = None;
    }

    async fn mint(&self) -> Result<CachedToken> {
        let (client_id, client_secret) = match (&self.client_id, &self.client_secret) {
            (Some(id), Some(secret)) => (id, secret),
            _ => {
                return Err(Error::UpstreamAuth(
                    "IGDB client id/secret not configured".to_string(),
                ))
            }
        };

        info!("Requesting new IGDB access token");

        let response = self
            .http
            .post(&self.token_url)
            .query(&[
                ("client_id", client_id.as_str()),
                ("client_secret", client_secret.as_str()),
                ("grant_type", "client_credentials"),
            ])
            .send()
            .await
            .map_err(|e| Error::UpstreamAuth(format!("token request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), "IGDB token request rejected");
            return Err(Error::UpstreamAuth(format!(
                "token request returned {}: {}",
                status.as_u16(),
                body
            )));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| Error::UpstreamAuth(format!("invalid token response: {}", e)))?;

        let lifetime = Duration::from_secs(token.expires_in).saturating_sub(self.margin);
        debug!(lifetime_secs = lifetime.as_secs(), "IGDB access token minted");

        Ok(CachedToken {
            value: token.access_token,
            expires_at: Instant::now() + lifetime,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_static_token_bypasses_exchange() {
        let cache = TokenCache::new(reqwest::Client::new(), "http://127.0.0.1:9/unused", None, None)
            .with_static_token(Some("static-token".to_string()));
        assert_eq!(cache.get_token().await.unwrap(), "static-token");
    }

    #[tokio::test]
    async fn test_missing_secret_fails_without_request() {
        let cache = TokenCache::new(
            reqwest::Client::new(),
            "http://127.0.0.1:9/unused",
            Some("client".to_string()),
            None,
        );
        let err = cache.get_token().await.unwrap_err();
        assert!(matches!(err, Error::UpstreamAuth(_)));
    }

    #[tokio::test]
    async fn test_status_reports_source() {
        let http = reqwest::Client::new();
        let url = "http://127.0.0.1:9/unused";

        let fixed = TokenCache::new(http.clone(), url, None, None)
            .with_static_token(Some("static-token".to_string()));
        assert_eq!(fixed.source(), TokenSource::Static);
        // A static token is never stored in the cache
        fixed.get_token().await.unwrap();
        assert!(!fixed.status().await.cached);

        let minted = TokenCache::new(http.clone(), url, Some("id".into()), Some("secret".into()));
        assert_eq!(
            minted.status().await,
            TokenStatus {
                source: TokenSource::ClientCredentials,
                cached: false,
                expires_in_secs: None,
            }
        );

        let partial = TokenCache::new(http, url, Some("id".into()), None);
        assert_eq!(partial.source(), TokenSource::Unconfigured);
    }

    #[test]
    fn test_from_config_uses_margin() {
        let config = IgdbConfig {
            token_margin_secs: 5,
            ..IgdbConfig::default()
        };
        let cache = TokenCache::from_config(reqwest::Client::new(), &config);
        assert_eq!(cache.margin, Duration::from_secs(5));
        assert!(cache.static_token.is_none());
    }
}
