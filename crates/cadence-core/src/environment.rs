//! Deployment environment the process runs in.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ConfigError;

/// Environment variable that overrides the configured environment.
pub const ENVIRONMENT_VAR: &str = "CADENCE_ENV";

/// Where the process is running.
///
/// Only production and test runs are allowed to send real attendee lists to
/// the calendar service; anything else (a developer machine) has its
/// invitations stripped before they leave the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Production,
    Test,
    #[default]
    Development,
}

impl Environment {
    pub fn is_production(self) -> bool {
        self == Environment::Production
    }

    pub fn is_test(self) -> bool {
        self == Environment::Test
    }

    /// Whether attendee lists may be written to the remote service as-is.
    pub fn delivers_invitations(self) -> bool {
        self.is_production() || self.is_test()
    }

    /// Read the override from `CADENCE_ENV`, if set.
    pub fn from_env() -> Result<Option<Self>, ConfigError> {
        match std::env::var(ENVIRONMENT_VAR) {
            Ok(value) => value.parse().map(Some),
            Err(_) => Ok(None),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Environment::Production => "production",
            Environment::Test => "test",
            Environment::Development => "development",
        }
    }
}

impl FromStr for Environment {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "production" | "prod" => Ok(Environment::Production),
            "test" => Ok(Environment::Test),
            "development" | "dev" | "local" => Ok(Environment::Development),
            other => Err(ConfigError::Invalid(format!(
                "unknown environment '{}' (expected production, test or development)",
                other
            ))),
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_environment() {
        assert_eq!("production".parse::<Environment>().ok(), Some(Environment::Production));
        assert_eq!("PROD".parse::<Environment>().ok(), Some(Environment::Production));
        assert_eq!(" test ".parse::<Environment>().ok(), Some(Environment::Test));
        assert_eq!("local".parse::<Environment>().ok(), Some(Environment::Development));
        assert!("staging".parse::<Environment>().is_err());
    }

    #[test]
    fn test_only_production_and_test_deliver_invitations() {
        assert!(Environment::Production.delivers_invitations());
        assert!(Environment::Test.delivers_invitations());
        assert!(!Environment::Development.delivers_invitations());
    }

    #[test]
    fn test_default_is_development() {
        assert_eq!(Environment::default(), Environment::Development);
    }

    #[test]
    fn test_display_round_trips_through_parse() {
        for env in [Environment::Production, Environment::Test, Environment::Development] {
            assert_eq!(env.to_string().parse::<Environment>().ok(), Some(env));
        }
    }
}
