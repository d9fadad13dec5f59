//! REST client for the Revolt HTTP API.

use std::time::Duration;

use reqwest::{Response, StatusCode};
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, error};
use uuid::Uuid;

use super::models::{OutgoingMessage, SendableEmbed, User, UserProfile};
use crate::config::RuntimeSettings;

const SESSION_HEADER: &str = "x-session-token";

const USER_AGENT: &str = concat!("revolt_selfbot/", env!("CARGO_PKG_VERSION"));

/// Errors that can occur while talking to Revolt.
#[derive(Debug, Error)]
pub enum RevoltError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Revolt API returned {status}: {body}")]
    Api { status: StatusCode, body: String },

    #[error("Invalid id: {0:?}")]
    InvalidId(String),

    #[error("Gateway error: {0}")]
    Gateway(String),

    #[error("Gateway connection is closed")]
    GatewayClosed,

    #[error("Timed out after {0:?}")]
    Timeout(Duration),

    #[error("Failed to decode payload: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Own account id is not known yet")]
    NotReady,
}

/// Generates a message nonce: 24 uppercase hex characters.
#[must_use]
pub fn new_nonce() -> String {
    Uuid::new_v4()
        .simple()
        .to_string()
        .to_uppercase()
        .chars()
        .take(24)
        .collect()
}

/// Revolt ids are ULIDs; anything else never reaches a URL path.
fn check_id(id: &str) -> Result<(), RevoltError> {
    if !id.is_empty() && id.chars().all(|c| c.is_ascii_alphanumeric()) {
        Ok(())
    } else {
        Err(RevoltError::InvalidId(id.to_owned()))
    }
}

#[derive(Serialize)]
struct DisplayNamePatch<'a> {
    display_name: &'a str,
}

/// Authenticated HTTP client.
pub struct RestClient {
    http: reqwest::Client,
    api_url: String,
    token: String,
}

impl RestClient {
    /// Builds a client with the configured timeout.
    pub fn new(settings: &RuntimeSettings, token: impl Into<String>) -> Result<Self, RevoltError> {
        let http = reqwest::Client::builder()
            .timeout(settings.request_timeout())
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            http,
            api_url: settings.api_url.trim_end_matches('/').to_owned(),
            token: token.into(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.api_url)
    }

    /// Maps non-2xx responses to [`RevoltError::Api`].
    async fn check(response: Response) -> Result<Response, RevoltError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        error!("Revolt API request failed. Status {}: {}", status, body);
        Err(RevoltError::Api { status, body })
    }

    /// Sends a message to a channel, optionally with one embed.
    pub async fn send_message(
        &self,
        channel_id: &str,
        content: &str,
        embed: Option<SendableEmbed>,
    ) -> Result<(), RevoltError> {
        check_id(channel_id)?;

        let body = OutgoingMessage {
            content,
            nonce: new_nonce(),
            replies: Vec::new(),
            embeds: embed.map(|e| vec![e]),
        };

        debug!("POST message to channel {}", channel_id);
        let response = self
            .http
            .post(self.url(&format!("/channels/{channel_id}/messages")))
            .header(SESSION_HEADER, &self.token)
            .json(&body)
            .send()
            .await?;

        Self::check(response).await.map(drop)
    }

    /// Fetches a user's profile (bio and banner).
    pub async fn fetch_profile(&self, user_id: &str) -> Result<UserProfile, RevoltError> {
        check_id(user_id)?;

        debug!("GET profile of {}", user_id);
        let response = self
            .http
            .get(self.url(&format!("/users/{user_id}/profile")))
            .header(SESSION_HEADER, &self.token)
            .send()
            .await?;

        Ok(Self::check(response).await?.json().await?)
    }

    /// Fetches the authenticated account.
    pub async fn fetch_self(&self) -> Result<User, RevoltError> {
        let response = self
            .http
            .get(self.url("/users/@me"))
            .header(SESSION_HEADER, &self.token)
            .send()
            .await?;

        Ok(Self::check(response).await?.json().await?)
    }

    /// Changes the account's display name.
    pub async fn set_display_name(&self, name: &str) -> Result<(), RevoltError> {
        debug!("PATCH display name to \"{}\"", name);
        let response = self
            .http
            .patch(self.url("/users/@me"))
            .header(SESSION_HEADER, &self.token)
            .json(&DisplayNamePatch { display_name: name })
            .send()
            .await?;

        Self::check(response).await.map(drop)
    }
}

impl std::fmt::Debug for RestClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RestClient")
            .field("api_url", &self.api_url)
            .finish_non_exhaustive()
    }
}
