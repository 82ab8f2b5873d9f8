//! Environment configuration for different deployment stages

use std::env;
use std::time::Duration;

use tracing::Level;

/// Base URL used in development when `SCORE_API_URL` is unset
const DEVELOPMENT_SCORE_API_URL: &str = "http://localhost:8080";

/// Application environment configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    /// Production environment
    Production,
    /// Staging environment
    Staging,
    /// Development environment (local score backend)
    Development,
}

impl Environment {
    /// Creates an Environment from the `APP_ENV` environment variable
    ///
    /// # Panics
    ///
    /// Panics if `APP_ENV` contains an invalid value
    #[must_use]
    pub fn from_env() -> Self {
        let env = env::var("APP_ENV")
            .unwrap_or_else(|_| "development".to_string())
            .trim()
            .to_lowercase();

        match env.as_str() {
            "production" => Self::Production,
            "staging" => Self::Staging,
            "development" => Self::Development,
            _ => panic!("Invalid environment: {env}"),
        }
    }

    /// Returns the base URL of the score backend
    ///
    /// # Panics
    ///
    /// Panics if the `SCORE_API_URL` environment variable is not set outside
    /// development
    #[must_use]
    pub fn score_api_url(&self) -> String {
        match self {
            Self::Production | Self::Staging => {
                env::var("SCORE_API_URL").expect("SCORE_API_URL environment variable is not set")
            }
            Self::Development => env::var("SCORE_API_URL")
                .unwrap_or_else(|_| DEVELOPMENT_SCORE_API_URL.to_string()),
        }
    }

    /// Optional per-request timeout from `SCORE_API_TIMEOUT_SECS`.
    ///
    /// Unset, unparsable or zero values mean requests never time out.
    #[must_use]
    pub fn request_timeout() -> Option<Duration> {
        env::var("SCORE_API_TIMEOUT_SECS")
            .ok()
            .and_then(|val| val.trim().parse::<u64>().ok())
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
    }

    /// Log level, overridable with `TRACING_LEVEL`
    #[must_use]
    pub fn tracing_level(&self) -> Level {
        env::var("TRACING_LEVEL")
            .ok()
            .and_then(|val| val.parse::<Level>().ok())
            .unwrap_or(match self {
                Self::Production | Self::Staging => Level::INFO,
                Self::Development => Level::DEBUG,
            })
    }

    /// Whether logs should be emitted as JSON
    #[must_use]
    pub const fn json_logs(&self) -> bool {
        matches!(self, Self::Production | Self::Staging)
    }
}
