//! Revolt API payload types used by the bot.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Presence kinds accepted for custom status updates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Presence {
    Online,
    Idle,
    Focus,
    Busy,
    Invisible,
}

impl Presence {
    /// Every presence kind, in the order shown to users.
    pub const ALL: [Self; 5] = [
        Self::Online,
        Self::Idle,
        Self::Focus,
        Self::Busy,
        Self::Invisible,
    ];

    /// Wire name of the presence kind.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Online => "Online",
            Self::Idle => "Idle",
            Self::Focus => "Focus",
            Self::Busy => "Busy",
            Self::Invisible => "Invisible",
        }
    }

    /// Parses a config value after capitalising it (`"busy"` and `"BUSY"`
    /// both become `"Busy"`).
    #[must_use]
    pub fn from_config_value(raw: &str) -> Option<Self> {
        let normalized = capitalize(raw.trim());
        Self::ALL.into_iter().find(|p| p.as_str() == normalized)
    }

    /// Comma-separated list of valid kinds.
    #[must_use]
    pub fn choices() -> String {
        Self::ALL.map(Self::as_str).join(", ")
    }
}

impl fmt::Display for Presence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Uppercases the first character and lowercases the rest.
fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

/// Embed attached to an outgoing message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendableEmbed {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub colour: Option<String>,
}

impl SendableEmbed {
    /// Creates an embed with a title, description and CSS colour.
    #[must_use]
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        colour: impl Into<String>,
    ) -> Self {
        Self {
            title: Some(title.into()),
            description: Some(description.into()),
            colour: Some(colour.into()),
        }
    }
}

/// Body of `POST /channels/{id}/messages`.
#[derive(Debug, Clone, Serialize)]
pub struct OutgoingMessage<'a> {
    pub content: &'a str,
    pub nonce: String,
    pub replies: Vec<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub embeds: Option<Vec<SendableEmbed>>,
}

/// Reference to an uploaded file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FileRef {
    #[serde(rename = "_id")]
    pub id: String,
}

/// Response of `GET /users/{id}/profile`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct UserProfile {
    /// Bio text.
    #[serde(default)]
    pub content: Option<String>,

    /// Profile background (banner).
    #[serde(default)]
    pub background: Option<FileRef>,
}

impl UserProfile {
    /// Bio text, if the user wrote one.
    #[must_use]
    pub fn bio(&self) -> Option<&str> {
        self.content.as_deref().filter(|c| !c.trim().is_empty())
    }

    /// Id of the banner file, if any.
    #[must_use]
    pub fn background_id(&self) -> Option<&str> {
        self.background.as_ref().map(|b| b.id.as_str())
    }
}

/// Subset of a Revolt user object.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct User {
    #[serde(rename = "_id")]
    pub id: String,

    #[serde(default)]
    pub username: String,

    #[serde(default)]
    pub display_name: Option<String>,

    /// `"User"` marks the authenticated account in a `Ready` payload.
    #[serde(default)]
    pub relationship: Option<String>,
}

impl User {
    /// Name to show in logs.
    #[must_use]
    pub fn shown_name(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.username)
    }
}

/// Message as delivered by the gateway.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MessageEvent {
    #[serde(rename = "_id", default)]
    pub id: String,

    pub author: String,

    /// Missing for system messages and attachment-only messages.
    #[serde(default)]
    pub content: Option<String>,

    pub channel: String,
}

impl MessageEvent {
    /// Message text, empty when there is none.
    #[must_use]
    pub fn text(&self) -> &str {
        self.content.as_deref().unwrap_or_default()
    }
}

/// Status block inside a user update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserStatus {
    pub text: String,
    pub presence: Presence,
}

/// Partial user sent with a `UserUpdate` gateway frame.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserPatch {
    pub status: UserStatus,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presence_normalization() {
        assert_eq!(Presence::from_config_value("busy"), Some(Presence::Busy));
        assert_eq!(Presence::from_config_value("BUSY"), Some(Presence::Busy));
        assert_eq!(Presence::from_config_value(" idle "), Some(Presence::Idle));
        assert_eq!(Presence::from_config_value("angry"), None);
        assert_eq!(Presence::from_config_value(""), None);
    }

    #[test]
    fn test_presence_choices() {
        assert_eq!(Presence::choices(), "Online, Idle, Focus, Busy, Invisible");
    }

    #[test]
    fn test_profile_accessors() {
        let profile: UserProfile =
            serde_json::from_str(r#"{"content": "hi", "background": {"_id": "bg1", "tag": "backgrounds"}}"#)
                .unwrap();
        assert_eq!(profile.bio(), Some("hi"));
        assert_eq!(profile.background_id(), Some("bg1"));

        let empty: UserProfile = serde_json::from_str("{}").unwrap();
        assert_eq!(empty.bio(), None);
        assert_eq!(empty.background_id(), None);
    }

    #[test]
    fn test_outgoing_message_omits_missing_embeds() {
        let msg = OutgoingMessage {
            content: "hey",
            nonce: "N".to_owned(),
            replies: Vec::new(),
            embeds: None,
        };
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json, serde_json::json!({"content": "hey", "nonce": "N", "replies": []}));
    }
}
