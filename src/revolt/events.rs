//! Typed gateway frames.
//!
//! Frames are JSON objects tagged by their `type` field. Server frames we do
//! not care about decode to [`ServerEvent::Unknown`] instead of failing.

use serde::{Deserialize, Serialize};

use super::models::{MessageEvent, User, UserPatch};

/// Frame received from the gateway.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type")]
pub enum ServerEvent {
    /// Token accepted.
    Authenticated,

    /// Initial state after authentication.
    Ready {
        #[serde(default)]
        users: Vec<User>,
        #[serde(default)]
        servers: Vec<serde_json::Value>,
    },

    /// Keepalive probe that must be answered with a `Pong`.
    Ping {
        #[serde(default)]
        data: serde_json::Value,
    },

    /// A new chat message.
    Message(MessageEvent),

    /// Gateway-level error such as `InvalidSession`.
    Error {
        #[serde(default)]
        error: String,
    },

    #[serde(other)]
    Unknown,
}

impl ServerEvent {
    /// Decodes a text frame. Malformed known frames are reported as errors.
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }
}

/// Frame sent to the gateway.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type")]
pub enum ClientEvent {
    Authenticate {
        token: String,
    },
    Ping {
        data: serde_json::Value,
    },
    Pong {
        data: serde_json::Value,
        token: String,
    },
    UserUpdate {
        id: String,
        data: UserPatch,
        clear: Vec<String>,
        event_id: String,
    },
    BeginTyping {
        channel: String,
    },
    EndTyping {
        channel: String,
    },
}

impl ClientEvent {
    /// Short name used in logs.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Authenticate { .. } => "Authenticate",
            Self::Ping { .. } => "Ping",
            Self::Pong { .. } => "Pong",
            Self::UserUpdate { .. } => "UserUpdate",
            Self::BeginTyping { .. } => "BeginTyping",
            Self::EndTyping { .. } => "EndTyping",
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::revolt::models::{Presence, UserStatus};

    #[test]
    fn test_decode_message() {
        let event = ServerEvent::from_json(
            r#"{"type": "Message", "_id": "m1", "author": "u1", "content": "!hello", "channel": "c1", "nonce": "x"}"#,
        )
        .unwrap();
        let ServerEvent::Message(msg) = event else {
            panic!("expected message, got {event:?}");
        };
        assert_eq!(msg.author, "u1");
        assert_eq!(msg.text(), "!hello");
        assert_eq!(msg.channel, "c1");
    }

    #[test]
    fn test_decode_ping_and_ready() {
        assert_eq!(
            ServerEvent::from_json(r#"{"type": "Ping", "data": 42}"#).unwrap(),
            ServerEvent::Ping { data: json!(42) }
        );

        let ready = ServerEvent::from_json(
            r#"{"type": "Ready", "users": [{"_id": "me", "username": "self", "relationship": "User"}], "servers": []}"#,
        )
        .unwrap();
        let ServerEvent::Ready { users, .. } = ready else {
            panic!("expected ready");
        };
        assert_eq!(users[0].relationship.as_deref(), Some("User"));
    }

    #[test]
    fn test_unknown_event_is_ignored() {
        assert_eq!(
            ServerEvent::from_json(r#"{"type": "ChannelStartTyping", "id": "c1", "user": "u1"}"#)
                .unwrap(),
            ServerEvent::Unknown
        );
    }

    #[test]
    fn test_encode_user_update() {
        let event = ClientEvent::UserUpdate {
            id: "me".to_owned(),
            data: UserPatch {
                status: UserStatus {
                    text: "away".to_owned(),
                    presence: Presence::Idle,
                },
            },
            clear: Vec::new(),
            event_id: "e1".to_owned(),
        };
        assert_eq!(
            serde_json::to_value(&event).unwrap(),
            json!({
                "type": "UserUpdate",
                "id": "me",
                "data": {"status": {"text": "away", "presence": "Idle"}},
                "clear": [],
                "event_id": "e1"
            })
        );
    }

    #[test]
    fn test_encode_pong_echoes_data() {
        let pong = ClientEvent::Pong {
            data: json!(7),
            token: "t".to_owned(),
        };
        assert_eq!(
            serde_json::to_value(&pong).unwrap(),
            json!({"type": "Pong", "data": 7, "token": "t"})
        );
    }
}
