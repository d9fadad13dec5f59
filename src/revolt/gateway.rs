//! WebSocket gateway connection.
//!
//! The driver task owns the socket:
//!   - sends `Authenticate` right after connecting
//!   - answers server `Ping` frames with `Pong` and keeps the link alive
//!   - writes queued [`ClientEvent`]s
//!   - decodes inbound frames into [`ServerEvent`]s for the bot
//!
//! When the socket closes, the event channel closes with it; that is how the
//! rest of the bot learns the connection is gone. There is no reconnect.

use std::time::Duration;

use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::{MissedTickBehavior, interval, timeout};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tracing::{debug, error, info, warn};

use super::client::RevoltError;
use super::events::{ClientEvent, ServerEvent};

/// Interval of the client-side keepalive ping.
const KEEPALIVE_INTERVAL: Duration = Duration::from_secs(20);

type WsSink = SplitSink<WebSocketStream<MaybeTlsStream<TcpStream>>, Message>;
type WsStream = SplitStream<WebSocketStream<MaybeTlsStream<TcpStream>>>;

/// Options for connecting to the gateway.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub url: String,
    pub token: String,
    pub connect_timeout: Duration,
}

/// Handle to a running gateway connection.
#[derive(Debug)]
pub struct Gateway {
    sender: mpsc::Sender<ClientEvent>,
    shutdown: Option<oneshot::Sender<()>>,
    driver: JoinHandle<()>,
}

impl Gateway {
    /// Connects, authenticates and spawns the driver task.
    ///
    /// Returns the handle and the stream of inbound events.
    pub async fn connect(
        config: GatewayConfig,
    ) -> Result<(Self, mpsc::Receiver<ServerEvent>), RevoltError> {
        info!("Connecting to Revolt gateway...");

        let (ws, _) = timeout(config.connect_timeout, connect_async(config.url.as_str()))
            .await
            .map_err(|_| RevoltError::Timeout(config.connect_timeout))?
            .map_err(|e| RevoltError::Gateway(e.to_string()))?;

        let (mut write, read) = ws.split();
        send_frame(
            &mut write,
            &ClientEvent::Authenticate {
                token: config.token.clone(),
            },
        )
        .await?;
        debug!("Sent Authenticate");

        let (event_tx, event_rx) = mpsc::channel(256);
        let (send_tx, send_rx) = mpsc::channel(64);
        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        let driver = tokio::spawn(drive(
            write,
            read,
            config.token,
            event_tx,
            send_rx,
            shutdown_rx,
        ));

        Ok((
            Self {
                sender: send_tx,
                shutdown: Some(shutdown_tx),
                driver,
            },
            event_rx,
        ))
    }

    /// Queue for outbound frames.
    #[must_use]
    pub fn sender(&self) -> mpsc::Sender<ClientEvent> {
        self.sender.clone()
    }

    /// Sends a close frame and waits for the driver to finish.
    pub async fn close(mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        if let Err(e) = self.driver.await {
            warn!("Gateway driver ended abnormally: {}", e);
        }
    }
}

async fn send_frame(write: &mut WsSink, event: &ClientEvent) -> Result<(), RevoltError> {
    let json = serde_json::to_string(event)?;
    write
        .send(Message::text(json))
        .await
        .map_err(|e| RevoltError::Gateway(e.to_string()))
}

/// Main driver loop, runs until the socket closes or shutdown is requested.
async fn drive(
    mut write: WsSink,
    mut read: WsStream,
    token: String,
    event_tx: mpsc::Sender<ServerEvent>,
    mut send_rx: mpsc::Receiver<ClientEvent>,
    mut shutdown_rx: oneshot::Receiver<()>,
) {
    let mut keepalive = interval(KEEPALIVE_INTERVAL);
    keepalive.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // First tick completes immediately.
    keepalive.tick().await;

    loop {
        tokio::select! {
            _ = &mut shutdown_rx => {
                info!("Closing gateway connection");
                let _ = write.send(Message::Close(None)).await;
                break;
            }

            _ = keepalive.tick() => {
                let ping = ClientEvent::Ping { data: serde_json::Value::from(0) };
                if let Err(e) = send_frame(&mut write, &ping).await {
                    warn!("Keepalive failed: {}", e);
                    break;
                }
            }

            Some(frame) = send_rx.recv() => {
                debug!("Sending {}", frame.kind());
                if let Err(e) = send_frame(&mut write, &frame).await {
                    warn!("Failed to send {}: {}", frame.kind(), e);
                }
            }

            inbound = read.next() => {
                let text = match inbound {
                    Some(Ok(Message::Text(text))) => text,
                    Some(Ok(Message::Close(frame))) => {
                        info!("Gateway closed by server: {:?}", frame);
                        break;
                    }
                    Some(Ok(_)) => continue,
                    Some(Err(e)) => {
                        error!("Gateway read error: {}", e);
                        break;
                    }
                    None => {
                        info!("Gateway stream ended");
                        break;
                    }
                };

                let event = match ServerEvent::from_json(&text) {
                    Ok(event) => event,
                    Err(e) => {
                        debug!("Skipping undecodable gateway frame: {}", e);
                        continue;
                    }
                };

                match event {
                    ServerEvent::Ping { data } => {
                        let pong = ClientEvent::Pong { data, token: token.clone() };
                        if let Err(e) = send_frame(&mut write, &pong).await {
                            warn!("Failed to answer ping: {}", e);
                            break;
                        }
                    }
                    ServerEvent::Unknown => {}
                    event => {
                        if event_tx.send(event).await.is_err() {
                            info!("Event receiver dropped, stopping gateway driver");
                            break;
                        }
                    }
                }
            }
        }
    }
}
