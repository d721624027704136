//! Identity provider (Supabase GoTrue)
//!
//! Email/password sign in and sign up. The resulting [`Identity`] scopes every
//! store call; the CLI keeps it between runs in `session.json`.

use std::path::{Path, PathBuf};

use cinelog_common::config::{default_config_dir, SupabaseConfig};
use cinelog_common::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, info};

const SESSION_FILE: &str = "session.json";

/// Authenticated user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Identity {
    pub user_id: String,
    /// JWT presented to the store as a bearer token
    pub access_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AuthUser {
    id: String,
    #[serde(default)]
    email: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SessionResponse {
    #[serde(default)]
    access_token: Option<String>,
    #[serde(default)]
    user: Option<AuthUser>,
}

#[derive(Debug, Deserialize)]
struct AuthErrorBody {
    #[serde(default, alias = "msg", alias = "error_description")]
    message: Option<String>,
}

/// Client for the `/auth/v1` endpoints
pub struct SupabaseAuth {
    http: reqwest::Client,
    base_url: String,
    anon_key: String,
}

impl SupabaseAuth {
    pub fn new(http: reqwest::Client, base_url: impl Into<String>, anon_key: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            anon_key: anon_key.into(),
        }
    }

    pub fn from_config(http: reqwest::Client, config: &SupabaseConfig) -> Result<Self> {
        match (&config.url, &config.anon_key) {
            (Some(url), Some(key)) => Ok(Self::new(http, url.clone(), key.clone())),
            _ => Err(Error::Config(
                "Supabase url and anon key are required".to_string(),
            )),
        }
    }

    /// Exchange email and password for a session
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<Identity> {
        let url = format!("{}/auth/v1/token?grant_type=password", self.base_url);
        let session = self.post_credentials(&url, email, password).await?;
        let identity = into_identity(session)
            .ok_or_else(|| Error::UpstreamAuth("sign in returned no session".to_string()))?;
        info!(user_id = %identity.user_id, "Signed in");
        Ok(identity)
    }

    /// Create an account
    ///
    /// Returns `None` when the project requires email confirmation before the
    /// first sign in.
    pub async fn sign_up(&self, email: &str, password: &str) -> Result<Option<Identity>> {
        let url = format!("{}/auth/v1/signup", self.base_url);
        let session = self.post_credentials(&url, email, password).await?;
        let identity = into_identity(session);
        match &identity {
            Some(identity) => info!(user_id = %identity.user_id, "Signed up"),
            None => info!("Sign up pending email confirmation"),
        }
        Ok(identity)
    }

    async fn post_credentials(&self, url: &str, email: &str, password: &str) -> Result<SessionResponse> {
        debug!(url = %url, "Auth request");
        let response = self
            .http
            .post(url)
            .header("apikey", &self.anon_key)
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await
            .map_err(|e| Error::UpstreamAuth(format!("auth request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<AuthErrorBody>(&text)
                .ok()
                .and_then(|b| b.message)
                .unwrap_or(text);
            return Err(Error::UpstreamAuth(message));
        }

        response
            .json()
            .await
            .map_err(|e| Error::UpstreamAuth(format!("invalid auth response: {}", e)))
    }
}

fn into_identity(session: SessionResponse) -> Option<Identity> {
    let access_token = session.access_token?;
    let user = session.user?;
    Some(Identity {
        user_id: user.id,
        access_token,
        email: user.email,
    })
}

/// Default location of the persisted session
pub fn default_session_path() -> Option<PathBuf> {
    default_config_dir().map(|d| d.join(SESSION_FILE))
}

pub fn save_session(path: &Path, identity: &Identity) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, serde_json::to_string_pretty(identity)?)?;
    debug!(path = %path.display(), "Session saved");
    Ok(())
}

/// Load a persisted session; a missing file means signed out
pub fn load_session(path: &Path) -> Result<Option<Identity>> {
    if !path.exists() {
        return Ok(None);
    }
    let content = std::fs::read_to_string(path)?;
    Ok(Some(serde_json::from_str(&content)?))
}

/// Remove a persisted session; returns whether one existed
pub fn clear_session(path: &Path) -> Result<bool> {
    if !path.exists() {
        return Ok(false);
    }
    std::fs::remove_file(path)?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_without_token_is_not_an_identity() {
        let session: SessionResponse = serde_json::from_value(json!({
            "user": { "id": "7c1e...", "email": "a@b.c" }
        }))
        .unwrap();
        assert_eq!(into_identity(session), None);
    }

    #[test]
    fn test_session_roundtrip_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join(SESSION_FILE);
        let identity = Identity {
            user_id: "user-1".into(),
            access_token: "jwt".into(),
            email: Some("ana@example.com".into()),
        };

        assert_eq!(load_session(&path).unwrap(), None);
        save_session(&path, &identity).unwrap();
        assert_eq!(load_session(&path).unwrap(), Some(identity));
        assert!(clear_session(&path).unwrap());
        assert!(!clear_session(&path).unwrap());
    }

    #[test]
    fn test_from_config_requires_url_and_key() {
        let config = SupabaseConfig {
            url: Some("https://x.supabase.co".into()),
            anon_key: None,
        };
        assert!(matches!(
            SupabaseAuth::from_config(reqwest::Client::new(), &config),
            Err(Error::Config(_))
        ));
    }
}
