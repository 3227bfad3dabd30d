//! Engine.IO / Socket.IO text packet encoding.
//!
//! Frame structure (WebSocket transport, one packet per text frame):
//! - Engine.IO: one type digit followed by an optional payload
//! - Socket.IO (inside an Engine.IO message): type digit, optional
//!   `/namespace,`, optional ack id digits, optional JSON data

use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

/// Socket.IO connect to the default namespace (Engine.IO message + Socket.IO connect).
pub const CONNECT_DEFAULT_NAMESPACE: &str = "40";

/// Errors decoding a frame.
#[derive(Error, Debug)]
pub enum PacketError {
    #[error("empty packet")]
    Empty,

    #[error("unknown {layer} packet type: {kind:?}")]
    UnknownType { layer: &'static str, kind: char },

    #[error("invalid packet payload: {0}")]
    Json(#[from] serde_json::Error),

    #[error("event packet without a name")]
    MissingEventName,
}

/// Engine.IO packet types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum EngineType {
    Open = b'0',
    Close = b'1',
    Ping = b'2',
    Pong = b'3',
    Message = b'4',
    Upgrade = b'5',
    Noop = b'6',
}

impl EngineType {
    fn from_char(c: char) -> Result<Self, PacketError> {
        match c {
            '0' => Ok(Self::Open),
            '1' => Ok(Self::Close),
            '2' => Ok(Self::Ping),
            '3' => Ok(Self::Pong),
            '4' => Ok(Self::Message),
            '5' => Ok(Self::Upgrade),
            '6' => Ok(Self::Noop),
            kind => Err(PacketError::UnknownType {
                layer: "Engine.IO",
                kind,
            }),
        }
    }
}

/// Socket.IO packet types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum SocketType {
    Connect = b'0',
    Disconnect = b'1',
    Event = b'2',
    Ack = b'3',
    ConnectError = b'4',
    BinaryEvent = b'5',
    BinaryAck = b'6',
}

impl SocketType {
    fn from_char(c: char) -> Result<Self, PacketError> {
        match c {
            '0' => Ok(Self::Connect),
            '1' => Ok(Self::Disconnect),
            '2' => Ok(Self::Event),
            '3' => Ok(Self::Ack),
            '4' => Ok(Self::ConnectError),
            '5' => Ok(Self::BinaryEvent),
            '6' => Ok(Self::BinaryAck),
            kind => Err(PacketError::UnknownType {
                layer: "Socket.IO",
                kind,
            }),
        }
    }
}

/// Engine.IO open packet payload.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Handshake {
    pub sid: String,
    #[serde(default)]
    pub upgrades: Vec<String>,
    pub ping_interval: u64,
    pub ping_timeout: u64,
}

/// Decoded Engine.IO packet.
#[derive(Debug, Clone)]
pub enum EnginePacket {
    Open(Handshake),
    Close,
    Ping(String),
    Pong(String),
    Message(String),
    Upgrade,
    Noop,
}

/// Decoded Socket.IO packet.
#[derive(Debug, Clone)]
pub struct SocketPacket {
    pub kind: SocketType,
    pub namespace: String,
    pub id: Option<u64>,
    pub data: Option<Value>,
}

impl SocketPacket {
    /// Splits an event packet into its name and arguments.
    pub fn event(&self) -> Result<(&str, &[Value]), PacketError> {
        let items = match &self.data {
            Some(Value::Array(items)) => items.as_slice(),
            _ => return Err(PacketError::MissingEventName),
        };
        match items.split_first() {
            Some((Value::String(name), args)) => Ok((name.as_str(), args)),
            _ => Err(PacketError::MissingEventName),
        }
    }
}

/// Decodes one Engine.IO text frame.
pub fn decode_engine(frame: &str) -> Result<EnginePacket, PacketError> {
    let mut chars = frame.chars();
    let kind = EngineType::from_char(chars.next().ok_or(PacketError::Empty)?)?;
    let payload = chars.as_str();

    let packet = match kind {
        EngineType::Open => EnginePacket::Open(serde_json::from_str(payload)?),
        EngineType::Close => EnginePacket::Close,
        EngineType::Ping => EnginePacket::Ping(payload.to_string()),
        EngineType::Pong => EnginePacket::Pong(payload.to_string()),
        EngineType::Message => EnginePacket::Message(payload.to_string()),
        EngineType::Upgrade => EnginePacket::Upgrade,
        EngineType::Noop => EnginePacket::Noop,
    };
    Ok(packet)
}

/// Decodes the Socket.IO packet carried by an Engine.IO message.
pub fn decode_socket(payload: &str) -> Result<SocketPacket, PacketError> {
    let mut chars = payload.chars();
    let kind = SocketType::from_char(chars.next().ok_or(PacketError::Empty)?)?;
    let mut rest = chars.as_str();

    let mut namespace = "/".to_string();
    if rest.starts_with('/') {
        let end = rest.find(',').unwrap_or(rest.len());
        namespace = rest[..end].to_string();
        rest = rest.get(end + 1..).unwrap_or("");
    }

    let digits = rest.bytes().take_while(u8::is_ascii_digit).count();
    let id = if digits > 0 {
        rest[..digits].parse().ok()
    } else {
        None
    };
    rest = &rest[digits..];

    let data = if rest.is_empty() {
        None
    } else {
        Some(serde_json::from_str(rest)?)
    };

    Ok(SocketPacket {
        kind,
        namespace,
        id,
        data,
    })
}

/// Encodes an Engine.IO packet with a text payload.
pub fn encode_engine(kind: EngineType, payload: &str) -> String {
    let mut frame = String::with_capacity(payload.len() + 1);
    frame.push(kind as u8 as char);
    frame.push_str(payload);
    frame
}

/// Encodes an event on the default namespace.
pub fn encode_event(name: &str, args: &[Value]) -> String {
    let mut items = Vec::with_capacity(args.len() + 1);
    items.push(Value::String(name.to_string()));
    items.extend_from_slice(args);

    let mut payload = String::new();
    payload.push(SocketType::Event as u8 as char);
    payload.push_str(&Value::Array(items).to_string());
    encode_engine(EngineType::Message, &payload)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_open() {
        let packet = decode_engine(
            r#"0{"sid":"abc123","upgrades":[],"pingInterval":25000,"pingTimeout":5000}"#,
        )
        .unwrap();
        match packet {
            EnginePacket::Open(handshake) => {
                assert_eq!(handshake.sid, "abc123");
                assert_eq!(handshake.ping_interval, 25000);
                assert_eq!(handshake.ping_timeout, 5000);
            }
            other => panic!("expected open, got {:?}", other),
        }
    }

    #[test]
    fn test_decode_engine_control() {
        assert!(matches!(decode_engine("2").unwrap(), EnginePacket::Ping(p) if p.is_empty()));
        assert!(matches!(decode_engine("3probe").unwrap(), EnginePacket::Pong(p) if p == "probe"));
        assert!(matches!(decode_engine("1").unwrap(), EnginePacket::Close));
        assert!(matches!(decode_engine("6").unwrap(), EnginePacket::Noop));
        assert!(matches!(decode_engine(""), Err(PacketError::Empty)));
        assert!(matches!(
            decode_engine("9"),
            Err(PacketError::UnknownType { kind: '9', .. })
        ));
    }

    #[test]
    fn test_decode_push_state_event() {
        let message = match decode_engine(
            r#"42["pushState",{"status":"play","title":"Abbey Road","artist":"The Beatles"}]"#,
        )
        .unwrap()
        {
            EnginePacket::Message(message) => message,
            other => panic!("expected message, got {:?}", other),
        };

        let packet = decode_socket(&message).unwrap();
        assert_eq!(packet.kind, SocketType::Event);
        assert_eq!(packet.namespace, "/");
        assert_eq!(packet.id, None);

        let (name, args) = packet.event().unwrap();
        assert_eq!(name, "pushState");
        assert_eq!(args[0]["artist"], "The Beatles");
    }

    #[test]
    fn test_decode_namespace_and_ack_id() {
        let packet = decode_socket(r#"2/player,17["pushQueue",[]]"#).unwrap();
        assert_eq!(packet.namespace, "/player");
        assert_eq!(packet.id, Some(17));
        assert_eq!(packet.event().unwrap().0, "pushQueue");

        let packet = decode_socket("0/admin").unwrap();
        assert_eq!(packet.kind, SocketType::Connect);
        assert_eq!(packet.namespace, "/admin");
        assert!(packet.data.is_none());
    }

    #[test]
    fn test_decode_connect() {
        let packet = decode_socket(r#"0{"sid":"xyz"}"#).unwrap();
        assert_eq!(packet.kind, SocketType::Connect);
        assert_eq!(packet.data, Some(json!({"sid": "xyz"})));

        let packet = decode_socket("0").unwrap();
        assert_eq!(packet.kind, SocketType::Connect);
        assert!(packet.data.is_none());
    }

    #[test]
    fn test_event_without_name() {
        let packet = decode_socket("2[]").unwrap();
        assert!(matches!(packet.event(), Err(PacketError::MissingEventName)));
        assert!(decode_socket("2[oops").is_err());
    }

    #[test]
    fn test_encode() {
        assert_eq!(encode_engine(EngineType::Ping, ""), "2");
        assert_eq!(encode_engine(EngineType::Pong, "probe"), "3probe");
        assert_eq!(encode_event("getState", &[]), r#"42["getState"]"#);
        assert_eq!(
            encode_event("volume", &[json!(40)]),
            r#"42["volume",40]"#
        );
    }
}
