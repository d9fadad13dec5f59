//! The [`Platform`] seam between bot logic and the Revolt transport.

use std::sync::OnceLock;

use async_trait::async_trait;
use tokio::sync::mpsc;
use tracing::{debug, error, info};
use uuid::Uuid;

use super::client::{RestClient, RevoltError};
use super::events::ClientEvent;
use super::models::{Presence, SendableEmbed, User, UserPatch, UserProfile, UserStatus};
use super::rate_limiter::RateLimiter;

/// Outbound operations the command handler and the scheduler rely on.
#[async_trait]
pub trait Platform: Send + Sync {
    /// Sends a message, optionally with an embed.
    async fn send_message(
        &self,
        channel_id: &str,
        content: &str,
        embed: Option<SendableEmbed>,
    ) -> Result<(), RevoltError>;

    /// Fetches a user's profile.
    async fn fetch_profile(&self, user_id: &str) -> Result<UserProfile, RevoltError>;

    /// Changes the account's display name.
    async fn set_display_name(&self, name: &str) -> Result<(), RevoltError>;

    /// Pushes a custom status.
    async fn set_presence(&self, text: &str, presence: Presence) -> Result<(), RevoltError>;

    /// Shows the typing indicator. Failures are ignored.
    async fn begin_typing(&self, channel_id: &str);

    /// Hides the typing indicator. Failures are ignored.
    async fn end_typing(&self, channel_id: &str);
}

/// [`Platform`] backed by the REST client and the gateway queue.
pub struct RevoltPlatform {
    rest: RestClient,
    gateway: mpsc::Sender<ClientEvent>,
    self_id: OnceLock<String>,
    profile_limiter: RateLimiter,
}

impl RevoltPlatform {
    /// Creates the platform. `min_profile_update_secs` spaces out display name changes.
    #[must_use]
    pub fn new(
        rest: RestClient,
        gateway: mpsc::Sender<ClientEvent>,
        min_profile_update_secs: u64,
    ) -> Self {
        Self {
            rest,
            gateway,
            self_id: OnceLock::new(),
            profile_limiter: RateLimiter::from_secs(min_profile_update_secs),
        }
    }

    /// Records the authenticated account id. Later calls are ignored.
    pub fn set_self_id(&self, id: impl Into<String>) {
        if self.self_id.set(id.into()).is_err() {
            debug!("Own account id already known, ignoring update");
        }
    }

    /// Authenticated account id, once `Ready` has been processed.
    #[must_use]
    pub fn self_id(&self) -> Option<&str> {
        self.self_id.get().map(String::as_str)
    }

    /// Finds the authenticated account in a `Ready` payload, asking the API
    /// if the payload does not mark it.
    pub async fn resolve_self(&self, users: &[User]) -> Option<User> {
        if let Some(me) = users
            .iter()
            .find(|u| u.relationship.as_deref() == Some("User"))
        {
            return Some(me.clone());
        }

        match self.rest.fetch_self().await {
            Ok(me) => Some(me),
            Err(e) => {
                error!("Failed to fetch own account: {}", e);
                None
            }
        }
    }

    async fn push(&self, frame: ClientEvent) -> Result<(), RevoltError> {
        self.gateway
            .send(frame)
            .await
            .map_err(|_| RevoltError::GatewayClosed)
    }
}

#[async_trait]
impl Platform for RevoltPlatform {
    async fn send_message(
        &self,
        channel_id: &str,
        content: &str,
        embed: Option<SendableEmbed>,
    ) -> Result<(), RevoltError> {
        self.rest.send_message(channel_id, content, embed).await
    }

    async fn fetch_profile(&self, user_id: &str) -> Result<UserProfile, RevoltError> {
        self.rest.fetch_profile(user_id).await
    }

    async fn set_display_name(&self, name: &str) -> Result<(), RevoltError> {
        self.profile_limiter.wait_and_acquire().await;
        self.rest.set_display_name(name).await?;
        info!("Display name changed to \"{}\"", name);
        Ok(())
    }

    async fn set_presence(&self, text: &str, presence: Presence) -> Result<(), RevoltError> {
        let id = self.self_id().ok_or(RevoltError::NotReady)?.to_owned();

        self.push(ClientEvent::UserUpdate {
            id,
            data: UserPatch {
                status: UserStatus {
                    text: text.to_owned(),
                    presence,
                },
            },
            clear: Vec::new(),
            event_id: Uuid::new_v4().to_string(),
        })
        .await?;

        info!("Status set to \"{}\" ({})", text, presence);
        Ok(())
    }

    async fn begin_typing(&self, channel_id: &str) {
        let frame = ClientEvent::BeginTyping {
            channel: channel_id.to_owned(),
        };
        if let Err(e) = self.push(frame).await {
            debug!("Could not start typing in {}: {}", channel_id, e);
        }
    }

    async fn end_typing(&self, channel_id: &str) {
        let frame = ClientEvent::EndTyping {
            channel: channel_id.to_owned(),
        };
        if let Err(e) = self.push(frame).await {
            debug!("Could not stop typing in {}: {}", channel_id, e);
        }
    }
}

impl std::fmt::Debug for RevoltPlatform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RevoltPlatform")
            .field("rest", &self.rest)
            .field("self_id", &self.self_id.get())
            .field("profile_limiter", &self.profile_limiter)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, Instant};

    use super::*;
    use crate::config::RuntimeSettings;
    use crate::testing::HttpStub;

    fn platform() -> (RevoltPlatform, mpsc::Receiver<ClientEvent>) {
        let rest = RestClient::new(&RuntimeSettings::default(), "token").unwrap();
        let (tx, rx) = mpsc::channel(8);
        (RevoltPlatform::new(rest, tx, 0), rx)
    }

    fn stub_platform(stub: &HttpStub, min_profile_update_secs: u64) -> RevoltPlatform {
        let settings = RuntimeSettings {
            api_url: stub.url.clone(),
            ..RuntimeSettings::default()
        };
        let rest = RestClient::new(&settings, "token").unwrap();
        let (tx, _rx) = mpsc::channel(8);
        RevoltPlatform::new(rest, tx, min_profile_update_secs)
    }

    fn user(id: &str, relationship: Option<&str>) -> User {
        User {
            id: id.to_owned(),
            username: id.to_lowercase(),
            display_name: None,
            relationship: relationship.map(str::to_owned),
        }
    }

    #[tokio::test]
    async fn test_display_name_changes_are_spaced() {
        let stub = HttpStub::start("").await;
        let platform = stub_platform(&stub, 1);

        let started = Instant::now();
        platform.set_display_name("first").await.unwrap();
        platform.set_display_name("second").await.unwrap();
        assert!(started.elapsed() >= Duration::from_secs(1));

        let requests = stub.requests();
        assert_eq!(requests.len(), 2);
        assert!(requests.iter().all(|r| r.line == "PATCH /users/@me HTTP/1.1"));
        assert!(
            requests[1].received_at.duration_since(requests[0].received_at)
                >= Duration::from_millis(900)
        );
    }

    #[tokio::test]
    async fn test_resolve_self_from_ready_payload() {
        let stub = HttpStub::start("{}").await;
        let platform = stub_platform(&stub, 0);
        let users = [user("01FRIEND", Some("Friend")), user("01ME", Some("User"))];

        let me = platform.resolve_self(&users).await.unwrap();
        assert_eq!(me.id, "01ME");
        assert!(stub.requests().is_empty());
    }

    #[tokio::test]
    async fn test_resolve_self_falls_back_to_api() {
        let stub = HttpStub::start(r#"{"_id": "01ME", "username": "me"}"#).await;
        let platform = stub_platform(&stub, 0);

        let me = platform
            .resolve_self(&[user("01FRIEND", Some("Friend"))])
            .await
            .unwrap();
        assert_eq!(me.id, "01ME");
        assert_eq!(me.shown_name(), "me");
        assert_eq!(stub.requests()[0].line, "GET /users/@me HTTP/1.1");
    }

    #[tokio::test]
    async fn test_resolve_self_gives_up_on_bad_response() {
        let stub = HttpStub::start("not json").await;
        let platform = stub_platform(&stub, 0);
        assert!(platform.resolve_self(&[]).await.is_none());
    }

    #[tokio::test]
    async fn test_presence_requires_ready() {
        let (platform, _rx) = platform();
        let result = platform.set_presence("hi", Presence::Online).await;
        assert!(matches!(result, Err(RevoltError::NotReady)));
    }

    #[tokio::test]
    async fn test_presence_queues_user_update() {
        let (platform, mut rx) = platform();
        platform.set_self_id("me");
        platform.set_presence("coding", Presence::Busy).await.unwrap();

        let Some(ClientEvent::UserUpdate { id, data, clear, .. }) = rx.recv().await else {
            panic!("expected user update");
        };
        assert_eq!(id, "me");
        assert!(clear.is_empty());
        assert_eq!(
            data.status,
            UserStatus {
                text: "coding".to_owned(),
                presence: Presence::Busy,
            }
        );
    }

    #[tokio::test]
    async fn test_self_id_is_set_once() {
        let (platform, _rx) = platform();
        platform.set_self_id("first");
        platform.set_self_id("second");
        assert_eq!(platform.self_id(), Some("first"));
    }

    #[tokio::test]
    async fn test_closed_gateway_is_reported() {
        let (platform, rx) = platform();
        drop(rx);
        platform.set_self_id("me");
        let result = platform.set_presence("x", Presence::Idle).await;
        assert!(matches!(result, Err(RevoltError::GatewayClosed)));
    }
}
