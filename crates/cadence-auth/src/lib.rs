//! Credential handling for Cadence: token storage and Google OAuth.

pub mod error;
pub mod google;
pub mod storage;

pub use error::AuthError;
pub use google::{GoogleOAuth2Provider, GoogleTokenResponse};
pub use storage::{TokenSet, TokenStore};
