//! Backend connection settings

use std::env;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::types::*;

pub const ENV_BASE_URL: &str = "SWIFTSHIP_API_BASE_URL";
pub const ENV_TOKEN: &str = "SWIFTSHIP_API_TOKEN";
pub const ENV_USER_ID: &str = "SWIFTSHIP_USER_ID";
pub const ENV_PHONE: &str = "SWIFTSHIP_PHONE";
pub const ENV_TIMEOUT_SECS: &str = "SWIFTSHIP_HTTP_TIMEOUT_SECS";

/// How orders are scoped on the orders endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderScope {
    User(String),
    Phone(String),
}

/// Settings for [`super::HttpTimelineSource`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Backend root, without a trailing slash
    pub base_url: String,
    /// Bearer token issued at login
    pub token: String,
    /// Backend id of the signed-in user
    pub user_id: String,
    /// Phone number to scope orders by instead of the user id
    pub phone: Option<String>,
    /// Per-request timeout; `None` leaves requests unbounded
    pub timeout: Option<Duration>,
}

impl ApiConfig {
    /// Create a config with no phone scope and no timeout
    pub fn new(base_url: &str, token: &str, user_id: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.to_string(),
            user_id: user_id.to_string(),
            phone: None,
            timeout: None,
        }
    }

    pub fn with_phone(mut self, phone: &str) -> Self {
        self.phone = Some(phone.to_string());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Load settings from the process environment, reading `.env` first if present
    pub fn from_env() -> TimelineResult<Self> {
        dotenv::dotenv().ok();

        let mut config = Self::new(
            &required(ENV_BASE_URL)?,
            &required(ENV_TOKEN)?,
            &required(ENV_USER_ID)?,
        );
        config.phone = env::var(ENV_PHONE).ok().filter(|p| !p.trim().is_empty());

        if let Ok(raw) = env::var(ENV_TIMEOUT_SECS) {
            let secs: u64 = raw.trim().parse().map_err(|_| {
                TimelineError::Config(format!("{} must be a whole number of seconds", ENV_TIMEOUT_SECS))
            })?;
            config.timeout = Some(Duration::from_secs(secs));
        }

        config.validate()?;
        Ok(config)
    }

    /// Check that the settings can produce requests
    pub fn validate(&self) -> TimelineResult<()> {
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(TimelineError::Config(format!(
                "Base URL must start with http:// or https://, got '{}'",
                self.base_url
            )));
        }

        if self.token.trim().is_empty() {
            return Err(TimelineError::Config("API token cannot be empty".to_string()));
        }

        if self.user_id.trim().is_empty() {
            return Err(TimelineError::Config("User ID cannot be empty".to_string()));
        }

        Ok(())
    }

    /// Phone scope wins when set, matching the orders screen
    pub fn order_scope(&self) -> OrderScope {
        match &self.phone {
            Some(phone) => OrderScope::Phone(phone.clone()),
            None => OrderScope::User(self.user_id.clone()),
        }
    }
}

fn required(key: &str) -> TimelineResult<String> {
    env::var(key)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| TimelineError::Config(format!("{} is not set", key)))
}
