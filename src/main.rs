use anyhow::{bail, Context, Result};

use cadence_auth::{GoogleOAuth2Provider, TokenSet, TokenStore};
use cadence_calendar::{CalendarService, GOOGLE_SERVICE};
use cadence_core::Config;

/// Local port the OAuth redirect points at.
const REDIRECT_PORT: u16 = 8080;

#[tokio::main]
async fn main() -> Result<()> {
    cadence_core::init()?;

    let (config, _validation) = Config::load_validated()?;
    let args: Vec<String> = std::env::args().skip(1).collect();

    match args.iter().map(String::as_str).collect::<Vec<_>>().as_slice() {
        [] | ["status"] => status(&config),
        ["auth-url"] => {
            let oauth = oauth_provider(&config)?;
            let (url, state) = oauth.authorization_url(REDIRECT_PORT);
            println!("Open this URL to authorize calendar access:\n\n  {}\n", url);
            println!("State: {}", state);
            Ok(())
        }
        ["authorize", code] => authorize(&config, code).await,
        ["create-calendar", summary, description] => {
            let service = CalendarService::from_config(&config);
            let calendar = service
                .create_calendar(summary, description)
                .await
                .map_err(|e| with_user_message(e.user_message(), e))?;
            println!("Created calendar {} ({})", calendar.summary, calendar.id);
            Ok(())
        }
        _ => {
            eprintln!("Usage: cadence [status | auth-url | authorize <code> | create-calendar <summary> <description>]");
            bail!("Unknown command")
        }
    }
}

fn status(config: &Config) -> Result<()> {
    let service = CalendarService::from_config(config);

    println!("Cadence - calendar adapter");
    println!("  Environment: {}", config.environment);
    println!(
        "  Invitations: {}",
        if config.environment.delivers_invitations() {
            "delivered"
        } else {
            "suppressed"
        }
    );
    println!("  Config directory: {}", config.config_dir.display());
    println!(
        "  Google client: {}",
        if config.google.is_configured() {
            "configured"
        } else {
            "not configured"
        }
    );
    println!(
        "  Calendar token: {}",
        if service.credentials().has_token() {
            "present"
        } else {
            "missing (run `cadence auth-url`)"
        }
    );
    Ok(())
}

fn oauth_provider(config: &Config) -> Result<GoogleOAuth2Provider> {
    let (client_id, client_secret) = config
        .google
        .credentials()
        .context("Google OAuth client is not configured in config.toml")?;
    Ok(GoogleOAuth2Provider::new(client_id, client_secret))
}

async fn authorize(config: &Config, code: &str) -> Result<()> {
    let oauth = oauth_provider(config)?;
    let response = oauth
        .exchange_code(code, REDIRECT_PORT)
        .await
        .map_err(|e| with_user_message(e.user_message(), e))?;

    let token_set = TokenSet::from_response(response, None);
    if token_set.refresh_token.is_none() {
        tracing::warn!("Google returned no refresh token; access will lapse when the token expires");
    }

    TokenStore::new(config.token_dir()).store_token(GOOGLE_SERVICE, &token_set)?;
    println!("Calendar access authorized");
    Ok(())
}

/// Readable headline on top, the original error kept underneath it.
fn with_user_message<E>(message: impl Into<String>, err: E) -> anyhow::Error
where
    E: std::error::Error + Send + Sync + 'static,
{
    anyhow::Error::new(err).context(message.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use cadence_auth::AuthError;
    use cadence_calendar::CalendarError;

    #[test]
    fn test_user_message_keeps_api_error() {
        let err = CalendarError::Api {
            status: 403,
            message: "Rate Limit Exceeded".to_string(),
        };
        let report = format!("{:#}", with_user_message(err.user_message(), err));

        assert!(report.starts_with("Calendar error: Rate Limit Exceeded"));
        assert!(report.contains("Calendar API error (403): Rate Limit Exceeded"));
    }

    #[test]
    fn test_user_message_keeps_oauth_code() {
        let err = AuthError::Rejected {
            code: "invalid_grant".to_string(),
            description: None,
        };
        let report = format!("{:#}", with_user_message(err.user_message(), err));

        assert!(report.contains("Please authorize again"));
        assert!(report.ends_with("invalid_grant"));
    }
}
