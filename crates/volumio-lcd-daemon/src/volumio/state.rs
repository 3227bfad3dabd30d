//! Player state notifications.

use serde_json::Value;

/// Playback status reported by the player.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlayerStatus {
    /// `"play"`
    Play,
    /// Anything else (`"pause"`, `"stop"`, missing, ...), kept for logging.
    Other(String),
}

/// One `pushState` payload, reduced to the fields the display uses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerNotification {
    pub status: PlayerStatus,
    pub title: Option<String>,
    pub artist: Option<String>,
}

impl PlayerNotification {
    /// Extracts a notification from a `pushState` payload.
    ///
    /// Never fails: absent or null fields become `None`, non-string scalars
    /// are converted to text, and a non-object payload reads as an unknown status.
    pub fn from_value(value: &Value) -> Self {
        let status = match value.get("status").and_then(Value::as_str) {
            Some("play") => PlayerStatus::Play,
            Some(other) => PlayerStatus::Other(other.to_string()),
            None => PlayerStatus::Other(String::new()),
        };
        Self {
            status,
            title: field_text(value, "title"),
            artist: field_text(value, "artist"),
        }
    }

    pub fn is_playing(&self) -> bool {
        self.status == PlayerStatus::Play
    }
}

fn field_text(value: &Value, key: &str) -> Option<String> {
    match value.get(key)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}
