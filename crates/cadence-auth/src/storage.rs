use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

use crate::google::GoogleTokenResponse;

/// Token set for OAuth2 authentication
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TokenSet {
    /// Access token for API requests
    pub access_token: String,

    /// Optional refresh token for token renewal
    pub refresh_token: Option<String>,

    /// Token expiration timestamp (Unix timestamp)
    pub expires_at: i64,

    /// Scopes granted to this token
    pub scopes: Vec<String>,
}

impl TokenSet {
    /// Build a token set from a token endpoint response.
    ///
    /// Google omits the refresh token on refresh responses, so the previous
    /// one is kept when the response has none.
    pub fn from_response(response: GoogleTokenResponse, previous_refresh: Option<String>) -> Self {
        let expires_at = chrono::Utc::now().timestamp() + response.expires_in as i64;
        Self {
            access_token: response.access_token,
            refresh_token: response.refresh_token.or(previous_refresh),
            expires_at,
            scopes: response
                .scope
                .split_whitespace()
                .map(str::to_string)
                .collect(),
        }
    }

    /// Check if the token needs refresh (within 5 minutes of expiry)
    pub fn needs_refresh(&self) -> bool {
        let now = chrono::Utc::now().timestamp();
        now >= self.expires_at - 300
    }

    /// Check if the token is expired
    pub fn is_expired(&self) -> bool {
        let now = chrono::Utc::now().timestamp();
        now >= self.expires_at
    }
}

/// File-backed token storage, one JSON file per service.
#[derive(Debug, Clone)]
pub struct TokenStore {
    dir: PathBuf,
}

impl TokenStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn token_path(&self, service: &str) -> PathBuf {
        self.dir.join(format!("{}.json", service))
    }

    /// Store a token set
    ///
    /// # Arguments
    /// * `service` - Service identifier (e.g., "google")
    /// * `token_set` - The token set to store
    pub fn store_token(&self, service: &str, token_set: &TokenSet) -> Result<()> {
        fs::create_dir_all(&self.dir).context("Failed to create tokens directory")?;
        let path = self.token_path(service);

        let json =
            serde_json::to_string_pretty(token_set).context("Failed to serialize token set")?;

        fs::write(&path, &json).context("Failed to write token file")?;

        tracing::info!("Stored token for service: {} at {:?}", service, path);
        Ok(())
    }

    /// Retrieve a token set, or `None` when nothing is stored for the service.
    pub fn load_token(&self, service: &str) -> Result<Option<TokenSet>> {
        let path = self.token_path(service);
        if !path.exists() {
            return Ok(None);
        }

        let json = fs::read_to_string(&path).context("Failed to read token file")?;

        let token_set: TokenSet =
            serde_json::from_str(&json).context("Failed to deserialize token set")?;

        tracing::debug!("Retrieved token for service: {}", service);
        Ok(Some(token_set))
    }

    /// Delete a stored token set. Missing files are not an error.
    pub fn delete_token(&self, service: &str) -> Result<()> {
        let path = self.token_path(service);

        if path.exists() {
            fs::remove_file(&path).context("Failed to delete token file")?;
            tracing::info!("Deleted token for service: {}", service);
        }

        Ok(())
    }

    /// Check if a token exists for a service
    pub fn has_token(&self, service: &str) -> bool {
        matches!(self.load_token(service), Ok(Some(_)))
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]
    use super::*;

    fn token(expires_at: i64) -> TokenSet {
        TokenSet {
            access_token: "test".to_string(),
            refresh_token: None,
            expires_at,
            scopes: vec![],
        }
    }

    #[test]
    fn test_token_expiry() {
        let now = chrono::Utc::now().timestamp();

        let expired = token(now - 3600);
        assert!(expired.is_expired());
        assert!(expired.needs_refresh());

        let valid = token(now + 3600);
        assert!(!valid.is_expired());
        assert!(!valid.needs_refresh());

        let soon = token(now + 200);
        assert!(!soon.is_expired());
        assert!(soon.needs_refresh());
    }

    #[test]
    fn test_from_response_keeps_previous_refresh_token() {
        let response = GoogleTokenResponse {
            access_token: "new-access".to_string(),
            refresh_token: None,
            expires_in: 3600,
            token_type: "Bearer".to_string(),
            scope: "https://www.googleapis.com/auth/calendar openid".to_string(),
        };

        let set = TokenSet::from_response(response, Some("old-refresh".to_string()));

        assert_eq!(set.access_token, "new-access");
        assert_eq!(set.refresh_token.as_deref(), Some("old-refresh"));
        assert_eq!(set.scopes.len(), 2);
        assert!(!set.needs_refresh());
    }

    #[test]
    fn test_store_load_delete() {
        let dir = tempfile::tempdir().unwrap();
        let store = TokenStore::new(dir.path().join("tokens"));

        assert!(store.load_token("google").unwrap().is_none());
        assert!(!store.has_token("google"));

        let set = token(chrono::Utc::now().timestamp() + 3600);
        store.store_token("google", &set).unwrap();

        assert!(store.has_token("google"));
        assert_eq!(store.load_token("google").unwrap(), Some(set));

        store.delete_token("google").unwrap();
        assert!(!store.has_token("google"));

        // deleting twice is fine
        store.delete_token("google").unwrap();
    }

    #[test]
    fn test_corrupt_token_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("google.json"), "{not json").unwrap();
        let store = TokenStore::new(dir.path());

        assert!(store.load_token("google").is_err());
        assert!(!store.has_token("google"));
    }
}
