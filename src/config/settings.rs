//! Runtime settings read from the environment.

use std::time::Duration;

/// Default REST API base URL.
pub const DEFAULT_API_URL: &str = "https://app.revolt.chat/api";

/// Default gateway URL (JSON framing, protocol version 1).
pub const DEFAULT_WS_URL: &str = "wss://app.revolt.chat/events?version=1&format=json";

/// Default file server URL, used to build banner links.
pub const DEFAULT_AUTUMN_URL: &str = "https://autumn.revolt.chat";

/// Settings that are not part of `config.json`.
///
/// Everything here has a sensible default so a bare `config.json` is enough to
/// run the bot; the environment (or a `.env` file) can override any of them.
#[derive(Debug, Clone)]
pub struct RuntimeSettings {
    /// Session token overriding the one in `config.json`.
    pub token_override: Option<String>,

    /// REST API base URL.
    pub api_url: String,

    /// Gateway WebSocket URL.
    pub ws_url: String,

    /// File server base URL.
    pub autumn_url: String,

    /// Timeout applied to every HTTP request and to the gateway connect.
    pub request_timeout_secs: u64,

    /// Interval between custom status pushes.
    pub status_refresh_secs: u64,

    /// Minimum interval between display name changes (rate limit protection).
    pub min_profile_update_secs: u64,
}

const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 15;
const DEFAULT_STATUS_REFRESH_SECS: u64 = 300;
const DEFAULT_MIN_PROFILE_UPDATE_SECS: u64 = 5;

impl Default for RuntimeSettings {
    fn default() -> Self {
        Self {
            token_override: None,
            api_url: DEFAULT_API_URL.to_owned(),
            ws_url: DEFAULT_WS_URL.to_owned(),
            autumn_url: DEFAULT_AUTUMN_URL.to_owned(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            status_refresh_secs: DEFAULT_STATUS_REFRESH_SECS,
            min_profile_update_secs: DEFAULT_MIN_PROFILE_UPDATE_SECS,
        }
    }
}

impl RuntimeSettings {
    /// Creates runtime settings from environment variables with defaults.
    #[must_use]
    pub fn from_env_with_defaults() -> Self {
        Self {
            token_override: std::env::var("REVOLT_TOKEN")
                .ok()
                .map(|t| t.trim().to_owned())
                .filter(|t| !t.is_empty()),
            api_url: env_or("REVOLT_API_URL", DEFAULT_API_URL),
            ws_url: env_or("REVOLT_WS_URL", DEFAULT_WS_URL),
            autumn_url: env_or("REVOLT_AUTUMN_URL", DEFAULT_AUTUMN_URL),
            request_timeout_secs: env_secs("REQUEST_TIMEOUT_SECS")
                .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS),
            status_refresh_secs: env_secs("STATUS_REFRESH_SECS")
                .unwrap_or(DEFAULT_STATUS_REFRESH_SECS),
            min_profile_update_secs: env_secs("MIN_PROFILE_UPDATE_SECS")
                .unwrap_or(DEFAULT_MIN_PROFILE_UPDATE_SECS),
        }
    }

    /// Request timeout as a [`Duration`], never shorter than a second.
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }

    /// Status refresh interval as a [`Duration`], never shorter than a second.
    #[must_use]
    pub fn status_refresh_interval(&self) -> Duration {
        Duration::from_secs(self.status_refresh_secs.max(1))
    }

    /// Builds the banner URL for a background file id.
    #[must_use]
    pub fn banner_url(&self, file_id: &str) -> String {
        format!(
            "{}/backgrounds/{file_id}?width=1000",
            self.autumn_url.trim_end_matches('/')
        )
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| default.to_owned())
}

fn env_secs(key: &str) -> Option<u64> {
    std::env::var(key).ok().and_then(|s| s.trim().parse().ok())
}
