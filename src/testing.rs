//! Test doubles shared by unit tests: a recording [`Platform`] and a
//! minimal HTTP server standing in for the Revolt API.

use std::sync::{Arc, Mutex};
use std::time::Instant;

use async_trait::async_trait;
use reqwest::StatusCode;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

use crate::revolt::{Platform, Presence, RevoltError, SendableEmbed, UserProfile};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Send {
        channel: String,
        content: String,
        embed: Option<SendableEmbed>,
    },
    FetchProfile(String),
    DisplayName(String),
    Presence(String, Presence),
    BeginTyping(String),
    EndTyping(String),
}

fn api_error() -> RevoltError {
    RevoltError::Api {
        status: StatusCode::INTERNAL_SERVER_ERROR,
        body: "boom".to_owned(),
    }
}

#[derive(Debug, Default)]
pub struct MockPlatform {
    pub calls: Mutex<Vec<Call>>,
    /// Profile returned by `fetch_profile`; `None` makes the fetch fail.
    pub profile: Option<UserProfile>,
    pub fail_embeds: bool,
    pub fail_profile_updates: bool,
}

impl MockPlatform {
    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    /// Contents of every plain text message sent.
    pub fn sent_texts(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Send {
                    content,
                    embed: None,
                    ..
                } => Some(content),
                _ => None,
            })
            .collect()
    }

    /// Every embed sent.
    pub fn sent_embeds(&self) -> Vec<SendableEmbed> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Send { embed, .. } => embed,
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl Platform for MockPlatform {
    async fn send_message(
        &self,
        channel_id: &str,
        content: &str,
        embed: Option<SendableEmbed>,
    ) -> Result<(), RevoltError> {
        let failing = embed.is_some() && self.fail_embeds;
        self.record(Call::Send {
            channel: channel_id.to_owned(),
            content: content.to_owned(),
            embed,
        });
        if failing { Err(api_error()) } else { Ok(()) }
    }

    async fn fetch_profile(&self, user_id: &str) -> Result<UserProfile, RevoltError> {
        self.record(Call::FetchProfile(user_id.to_owned()));
        self.profile.clone().ok_or_else(api_error)
    }

    async fn set_display_name(&self, name: &str) -> Result<(), RevoltError> {
        self.record(Call::DisplayName(name.to_owned()));
        if self.fail_profile_updates { Err(api_error()) } else { Ok(()) }
    }

    async fn set_presence(&self, text: &str, presence: Presence) -> Result<(), RevoltError> {
        self.record(Call::Presence(text.to_owned(), presence));
        if self.fail_profile_updates { Err(api_error()) } else { Ok(()) }
    }

    async fn begin_typing(&self, channel_id: &str) {
        self.record(Call::BeginTyping(channel_id.to_owned()));
    }

    async fn end_typing(&self, channel_id: &str) {
        self.record(Call::EndTyping(channel_id.to_owned()));
    }
}

/// Request seen by [`HttpStub`].
#[derive(Debug, Clone)]
pub struct StubRequest {
    /// Request line, e.g. `PATCH /users/@me HTTP/1.1`.
    pub line: String,
    pub received_at: Instant,
}

/// HTTP server answering every request with `200` and a fixed JSON body.
#[derive(Debug)]
pub struct HttpStub {
    pub url: String,
    requests: Arc<Mutex<Vec<StubRequest>>>,
}

impl HttpStub {
    pub async fn start(body: &'static str) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}", listener.local_addr().unwrap());
        let requests = Arc::new(Mutex::new(Vec::new()));

        let seen = Arc::clone(&requests);
        tokio::spawn(async move {
            while let Ok((mut stream, _)) = listener.accept().await {
                let line = read_request(&mut stream).await;
                seen.lock().unwrap().push(StubRequest {
                    line,
                    received_at: Instant::now(),
                });

                let response = format!(
                    "HTTP/1.1 200 OK\r\ncontent-type: application/json\r\n\
                     content-length: {}\r\nconnection: close\r\n\r\n{body}",
                    body.len()
                );
                let _ = stream.write_all(response.as_bytes()).await;
                let _ = stream.shutdown().await;
            }
        });

        Self { url, requests }
    }

    pub fn requests(&self) -> Vec<StubRequest> {
        self.requests.lock().unwrap().clone()
    }
}

/// Reads one request (head and body) and returns its request line.
async fn read_request(stream: &mut TcpStream) -> String {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];

    let head_len = loop {
        let n = stream.read(&mut chunk).await.unwrap();
        if n == 0 {
            break buf.len();
        }
        buf.extend_from_slice(&chunk[..n]);
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let head = String::from_utf8_lossy(&buf[..head_len]).into_owned();
    let body_len = head
        .lines()
        .filter_map(|l| l.split_once(':'))
        .find(|(k, _)| k.eq_ignore_ascii_case("content-length"))
        .and_then(|(_, v)| v.trim().parse::<usize>().ok())
        .unwrap_or(0);

    while buf.len() < head_len + body_len {
        let n = stream.read(&mut chunk).await.unwrap();
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
    }

    head.lines().next().unwrap_or_default().to_owned()
}
