//! Socket.IO client for the Volumio event feed.

use futures::{SinkExt, StreamExt};
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::time::Instant;
use tokio_tungstenite::{connect_async, tungstenite::Message};
use tracing::{debug, info, warn};
use url::Url;

use super::packet::{
    decode_engine, decode_socket, encode_engine, encode_event, EnginePacket, EngineType,
    PacketError, SocketType, CONNECT_DEFAULT_NAMESPACE,
};
use super::state::PlayerNotification;
use crate::config::VolumioConfig;

/// Event forwarded from the feed.
#[derive(Debug, Clone, PartialEq)]
pub enum PlayerEvent {
    /// Default namespace connected.
    Connected,
    /// `pushState` received.
    State(PlayerNotification),
    /// Connection lost after having been connected.
    Disconnected,
}

/// Errors ending a connection attempt.
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("invalid Volumio URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("unsupported URL scheme: {0}")]
    Scheme(String),

    #[error("WebSocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    #[error("protocol error: {0}")]
    Packet(#[from] PacketError),

    #[error("connection closed before handshake")]
    Handshake,

    #[error("namespace connection refused: {0}")]
    ConnectRefused(String),

    #[error("no traffic from server within ping timeout")]
    PingTimeout,

    #[error("event receiver dropped")]
    ChannelClosed,
}

/// What the session loop should do after a frame.
enum Action {
    None,
    Reply(String),
    Close,
}

/// Builds the WebSocket endpoint for a Volumio base URL.
pub fn socket_url(base: &str, eio: u8) -> Result<Url, ClientError> {
    let mut url = Url::parse(base)?;
    let scheme = match url.scheme() {
        "http" | "ws" => "ws",
        "https" | "wss" => "wss",
        other => return Err(ClientError::Scheme(other.to_string())),
    };
    url.set_scheme(scheme)
        .map_err(|_| ClientError::Scheme(url.scheme().to_string()))?;
    url.set_path("/socket.io/");
    url.query_pairs_mut()
        .clear()
        .append_pair("EIO", &eio.to_string())
        .append_pair("transport", "websocket");
    Ok(url)
}

/// Long-running feed client.
pub struct VolumioClient {
    config: VolumioConfig,
    events: mpsc::Sender<PlayerEvent>,
}

impl VolumioClient {
    pub fn new(config: VolumioConfig, events: mpsc::Sender<PlayerEvent>) -> Self {
        Self { config, events }
    }

    /// Connects and forwards events until the receiver is dropped, or until the
    /// first disconnect when reconnecting is disabled.
    pub async fn run(self) {
        let delay = Duration::from_millis(self.config.reconnect_delay_ms);

        loop {
            let mut connected = false;
            match self.session(&mut connected).await {
                Ok(()) => info!("Volumio connection closed"),
                Err(ClientError::ChannelClosed) => return,
                Err(e) => warn!("Volumio connection error: {}", e),
            }

            if connected && self.events.send(PlayerEvent::Disconnected).await.is_err() {
                return;
            }
            if !self.config.reconnect {
                info!("Reconnect disabled, event feed stopped");
                return;
            }
            debug!("Reconnecting in {:?}", delay);
            tokio::time::sleep(delay).await;
        }
    }

    async fn session(&self, connected: &mut bool) -> Result<(), ClientError> {
        let url = socket_url(&self.config.url, self.config.eio)?;
        info!("Connecting to {}", url);

        let (ws, _) = connect_async(url.as_str()).await?;
        let (mut sink, mut stream) = ws.split();

        let handshake = loop {
            match stream.next().await {
                Some(Ok(Message::Text(text))) => match decode_engine(&text)? {
                    EnginePacket::Open(handshake) => break handshake,
                    other => debug!("Ignoring packet before handshake: {:?}", other),
                },
                Some(Ok(Message::Close(_))) | None => return Err(ClientError::Handshake),
                Some(Ok(_)) => {}
                Some(Err(e)) => return Err(e.into()),
            }
        };
        debug!(
            "Engine.IO session {} (ping interval {}ms, timeout {}ms)",
            handshake.sid, handshake.ping_interval, handshake.ping_timeout
        );

        if self.config.eio >= 4 {
            sink.send(Message::Text(CONNECT_DEFAULT_NAMESPACE.to_string()))
                .await?;
        }

        let ping_interval = Duration::from_millis(handshake.ping_interval.max(1));
        let silence_limit =
            Duration::from_millis(handshake.ping_interval + handshake.ping_timeout);
        let mut ping_timer = tokio::time::interval_at(Instant::now() + ping_interval, ping_interval);
        let mut last_seen = Instant::now();

        loop {
            tokio::select! {
                frame = stream.next() => {
                    let frame = match frame {
                        Some(frame) => frame?,
                        None => return Ok(()),
                    };
                    last_seen = Instant::now();
                    match frame {
                        Message::Text(text) => match self.handle_frame(&text, connected).await? {
                            Action::None => {}
                            Action::Reply(reply) => sink.send(Message::Text(reply)).await?,
                            Action::Close => return Ok(()),
                        },
                        Message::Close(_) => return Ok(()),
                        _ => {}
                    }
                }
                _ = ping_timer.tick() => {
                    if last_seen.elapsed() > silence_limit {
                        return Err(ClientError::PingTimeout);
                    }
                    // Engine.IO 3 clients ping; in 4 the server does.
                    if self.config.eio == 3 {
                        sink.send(Message::Text(encode_engine(EngineType::Ping, ""))).await?;
                    }
                }
            }
        }
    }

    async fn handle_frame(&self, text: &str, connected: &mut bool) -> Result<Action, ClientError> {
        let packet = match decode_engine(text) {
            Ok(packet) => packet,
            Err(e) => {
                warn!("Skipping malformed frame {:?}: {}", text, e);
                return Ok(Action::None);
            }
        };

        let message = match packet {
            EnginePacket::Ping(payload) => {
                return Ok(Action::Reply(encode_engine(EngineType::Pong, &payload)))
            }
            EnginePacket::Close => return Ok(Action::Close),
            EnginePacket::Message(message) => message,
            _ => return Ok(Action::None),
        };

        let packet = match decode_socket(&message) {
            Ok(packet) => packet,
            Err(e) => {
                warn!("Skipping malformed message {:?}: {}", message, e);
                return Ok(Action::None);
            }
        };
        if packet.namespace != "/" {
            debug!("Ignoring packet for namespace {}", packet.namespace);
            return Ok(Action::None);
        }

        match packet.kind {
            SocketType::Connect => {
                *connected = true;
                self.emit(PlayerEvent::Connected).await?;
                if self.config.request_state {
                    return Ok(Action::Reply(encode_event("getState", &[])));
                }
            }
            SocketType::Disconnect => return Ok(Action::Close),
            SocketType::ConnectError => {
                let reason = packet.data.map(|d| d.to_string()).unwrap_or_default();
                return Err(ClientError::ConnectRefused(reason));
            }
            SocketType::Event => match packet.event() {
                Ok(("pushState", args)) => {
                    let payload = args.first().unwrap_or(&Value::Null);
                    let state = PlayerNotification::from_value(payload);
                    self.emit(PlayerEvent::State(state)).await?;
                }
                Ok((name, _)) => debug!("Ignoring event {}", name),
                Err(e) => warn!("Skipping event: {}", e),
            },
            _ => debug!("Ignoring {:?} packet", packet.kind),
        }
        Ok(Action::None)
    }

    async fn emit(&self, event: PlayerEvent) -> Result<(), ClientError> {
        self.events
            .send(event)
            .await
            .map_err(|_| ClientError::ChannelClosed)
    }
}
