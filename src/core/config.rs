use std::env;
use std::fmt;
use std::time::Duration;

use anyhow::{Context, Result, bail};

pub const DEFAULT_CALENDAR_API_URL: &str = "https://www.googleapis.com/calendar/v3";
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
}

/// Origins allowed to call the API from a browser
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CorsOrigins {
    Any,
    List(Vec<String>),
}

impl CorsOrigins {
    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        if value == "*" {
            return Some(CorsOrigins::Any);
        }
        let origins: Vec<String> = value
            .split(',')
            .map(|origin| origin.trim().to_string())
            .filter(|origin| !origin.is_empty())
            .collect();
        if origins.is_empty() {
            None
        } else {
            Some(CorsOrigins::List(origins))
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    /// Serialized service account key, read from `GOOGLE_CREDENTIALS_JSON`
    pub google_credentials_json: Option<String>,
    pub calendar_api_url: String,
    pub cors_origins: Option<CorsOrigins>,
    pub environment: Environment,
    pub request_timeout: Duration,
}

// The credential document holds a private key so it never goes to the logs
impl fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppConfig")
            .field(
                "google_credentials_json",
                &self.google_credentials_json.as_ref().map(|_| "<redacted>"),
            )
            .field("calendar_api_url", &self.calendar_api_url)
            .field("cors_origins", &self.cors_origins)
            .field("environment", &self.environment)
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            google_credentials_json: None,
            calendar_api_url: DEFAULT_CALENDAR_API_URL.to_string(),
            cors_origins: None,
            environment: Environment::Development,
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
        }
    }
}

impl AppConfig {
    /// Load configuration from the process environment. Fails in
    /// production when the CORS policy is left unset.
    pub fn from_env() -> Result<Self> {
        let google_credentials_json = env::var("GOOGLE_CREDENTIALS_JSON")
            .ok()
            .filter(|value| !value.trim().is_empty());
        let calendar_api_url = env::var("CALPROXY_CALENDAR_API_URL")
            .unwrap_or_else(|_| DEFAULT_CALENDAR_API_URL.to_string());
        let environment = match env::var("CALPROXY_ENV")
            .unwrap_or_default()
            .to_lowercase()
            .as_str()
        {
            "production" | "prod" => Environment::Production,
            _ => Environment::Development,
        };
        let cors_origins = env::var("CALPROXY_CORS_ORIGINS")
            .ok()
            .and_then(|value| CorsOrigins::parse(&value));
        let request_timeout = match env::var("CALPROXY_REQUEST_TIMEOUT_SECS") {
            Ok(secs) => Duration::from_secs(
                secs.parse::<u64>()
                    .with_context(|| format!("Invalid CALPROXY_REQUEST_TIMEOUT_SECS: {}", secs))?,
            ),
            Err(_) => Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
        };

        if environment == Environment::Production && cors_origins.is_none() {
            bail!("Missing env var CALPROXY_CORS_ORIGINS (required in production)");
        }

        Ok(Self {
            google_credentials_json,
            calendar_api_url: calendar_api_url.trim_end_matches('/').to_string(),
            cors_origins,
            environment,
            request_timeout,
        })
    }
}
