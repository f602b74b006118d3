//! WebSocket protocol message definitions
//! These are the wire types shared by the client session and the relay

use serde::{Deserialize, Serialize};

use crate::game::Role;

/// Event types this protocol understands
pub const KNOWN_EVENT_TYPES: [&str; 4] = ["init", "play", "win", "error"];

/// Messages exchanged over the relay channel, in both directions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    /// Session setup; carries keys and the sender's starting snapshot
    Init {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        join: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        watch: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        player: Option<PlayerSnapshot>,
    },

    /// Full state of one player, sent on every input change
    Play { player: PlayerSnapshot },

    /// Game over; receivers close the channel
    Win,

    /// Non-fatal, user-visible problem report
    Error { message: String },
}

impl Event {
    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            message: message.into(),
        }
    }

    /// Decode a text frame, telling unknown event types apart from bad JSON
    pub fn from_json(text: &str) -> Result<Self, ProtocolError> {
        let value: serde_json::Value = serde_json::from_str(text)?;
        let kind = value
            .get("type")
            .and_then(|t| t.as_str())
            .ok_or(ProtocolError::MissingType)?;

        if !KNOWN_EVENT_TYPES.contains(&kind) {
            return Err(ProtocolError::UnsupportedType(kind.to_string()));
        }

        Ok(serde_json::from_value(value)?)
    }

    pub fn to_json(&self) -> Result<String, ProtocolError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Event::Init { .. } => "init",
            Event::Play { .. } => "play",
            Event::Win => "win",
            Event::Error { .. } => "error",
        }
    }
}

/// Full serializable state of one player
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerSnapshot {
    pub x: f64,
    pub y: f64,
    /// Owning role; receivers use it to tell their own echo from the peer
    pub color: Role,
    pub health: i32,
    pub bullet_controller: BulletControllerSnapshot,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulletControllerSnapshot {
    pub bullets: Vec<BulletSnapshot>,
    pub timer_till_next_bullet: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BulletSnapshot {
    pub x: f64,
    pub y: f64,
    pub speed: f64,
    pub damage: i32,
}

/// Wire decoding errors
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    #[error("Malformed message: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Message has no event type")]
    MissingType,

    #[error("Unsupported event type: {0}")]
    UnsupportedType(String),
}
