//! Access token acquisition.

use std::future::Future;

use cadence_auth::{AuthError, GoogleOAuth2Provider, TokenSet, TokenStore};
use parking_lot::RwLock;

use crate::error::CalendarError;
use crate::failure::TokenInvalidator;

/// Service key the Google token is stored under.
pub const GOOGLE_SERVICE: &str = "google";

/// Yields a bearer token for the next API call.
pub trait CredentialProvider: Send + Sync {
    fn access_token(&self) -> impl Future<Output = Result<String, CalendarError>> + Send;
}

/// Credentials backed by the on-disk token store.
///
/// The loaded token set is kept in memory and shared by every caller; it is
/// refreshed when it nears expiry and dropped (memory and disk) on
/// invalidation.
pub struct StoredCredentials {
    store: TokenStore,
    oauth: Option<GoogleOAuth2Provider>,
    current: RwLock<Option<TokenSet>>,
}

impl StoredCredentials {
    pub fn new(store: TokenStore, oauth: Option<GoogleOAuth2Provider>) -> Self {
        Self {
            store,
            oauth,
            current: RwLock::new(None),
        }
    }

    /// Whether a token is available without touching the network.
    pub fn has_token(&self) -> bool {
        self.current.read().is_some() || self.store.has_token(GOOGLE_SERVICE)
    }

    fn load(&self) -> Result<TokenSet, AuthError> {
        if let Some(token_set) = self.current.read().clone() {
            return Ok(token_set);
        }

        let token_set = self
            .store
            .load_token(GOOGLE_SERVICE)
            .map_err(|e| AuthError::Storage(format!("{:#}", e)))?
            .ok_or(AuthError::NoCredentials)?;

        *self.current.write() = Some(token_set.clone());
        Ok(token_set)
    }

    /// Refresh a token nearing expiry. Without a way to refresh, a token
    /// that has not actually expired yet is used as is.
    async fn refresh(&self, token_set: TokenSet) -> Result<TokenSet, AuthError> {
        let (Some(refresh_token), Some(oauth)) =
            (token_set.refresh_token.clone(), self.oauth.as_ref())
        else {
            if !token_set.is_expired() {
                tracing::debug!("Token expires soon but cannot be refreshed, using it");
                return Ok(token_set);
            }
            return Err(match token_set.refresh_token {
                None => AuthError::NoRefreshToken,
                Some(_) => AuthError::NotConfigured,
            });
        };

        let response = oauth.refresh_token(&refresh_token).await?;
        let refreshed = TokenSet::from_response(response, Some(refresh_token));

        if let Err(e) = self.store.store_token(GOOGLE_SERVICE, &refreshed) {
            tracing::warn!("Failed to persist refreshed token: {:#}", e);
        }
        *self.current.write() = Some(refreshed.clone());

        tracing::info!("Refreshed Google access token");
        Ok(refreshed)
    }
}

impl CredentialProvider for StoredCredentials {
    async fn access_token(&self) -> Result<String, CalendarError> {
        let token_set = self.load()?;
        if !token_set.needs_refresh() {
            return Ok(token_set.access_token);
        }

        let refreshed = self.refresh(token_set).await?;
        Ok(refreshed.access_token)
    }
}

impl TokenInvalidator for StoredCredentials {
    fn invalidate(&self) -> anyhow::Result<()> {
        *self.current.write() = None;
        self.store.delete_token(GOOGLE_SERVICE)
    }
}
