//! Core protocol types for Tandem's wire format.
//!
//! This module defines every structure that travels on the wire between a
//! client and the broker. The protocol is deliberately small: four client
//! events, four server events, and an acknowledgment shape shared by all
//! request/response pairs.
//!
//! Relay payloads are opaque. The broker forwards the `event` name and
//! `data` value untouched, so clients are free to invent whatever message
//! vocabulary their application needs (moves, state snapshots, resets).

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

// ---------------------------------------------------------------------------
// RoomKey
// ---------------------------------------------------------------------------

/// A caller-supplied room identifier.
///
/// Rooms are named by the client that creates them, not generated by the
/// broker, and both strings and integers are legal names. Anything else
/// (floats, booleans, objects, arrays, null) is rejected before admission.
///
/// `#[serde(untagged)]` makes the JSON representation the bare value:
/// `RoomKey::Text("lobby")` is `"lobby"` on the wire, `RoomKey::Int(7)` is
/// `7`. Clients never see an enum wrapper.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RoomKey {
    /// A string identifier, e.g. `"lobby1"`.
    Text(String),
    /// An integer identifier, e.g. `42`.
    Int(i64),
}

impl RoomKey {
    /// Validates a raw JSON value as a room identifier.
    ///
    /// Returns `None` for any shape that is not a string or an integer.
    /// Non-integer numbers are rejected too: a float makes a poor map key,
    /// and no real client names a room `3.5`.
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::String(s) => Some(RoomKey::Text(s.clone())),
            Value::Number(n) => n.as_i64().map(RoomKey::Int),
            _ => None,
        }
    }

    /// Returns the key as a JSON value, the inverse of [`from_value`].
    ///
    /// [`from_value`]: RoomKey::from_value
    pub fn to_value(&self) -> Value {
        match self {
            RoomKey::Text(s) => Value::String(s.clone()),
            RoomKey::Int(n) => Value::Number((*n).into()),
        }
    }
}

impl fmt::Display for RoomKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RoomKey::Text(s) => write!(f, "{s}"),
            RoomKey::Int(n) => write!(f, "{n}"),
        }
    }
}

impl From<&str> for RoomKey {
    fn from(s: &str) -> Self {
        RoomKey::Text(s.to_string())
    }
}

impl From<i64> for RoomKey {
    fn from(n: i64) -> Self {
        RoomKey::Int(n)
    }
}

// ---------------------------------------------------------------------------
// Ack — the request/response shape
// ---------------------------------------------------------------------------

/// The acknowledgment returned for every client request.
///
/// Failures are data, not exceptions: a failed create or join is reported
/// to the requester through this same shape, with `success: false` and a
/// human-readable `message`. Nothing the broker does in response to a
/// request can ever surface as anything other than an `Ack`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ack {
    /// Whether the request succeeded.
    pub success: bool,
    /// Human-readable outcome description.
    pub message: String,
    /// Operation-specific result value, `null` when there is none.
    pub data: Option<Value>,
}

impl Ack {
    /// Builds a success acknowledgment.
    pub fn ok(data: Option<Value>, message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            data,
        }
    }

    /// Builds a failure acknowledgment. Failures never carry data.
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            data: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Client events
// ---------------------------------------------------------------------------

/// Events a client sends to the broker.
///
/// `#[serde(tag = "type")]` produces internally tagged JSON:
/// `{ "type": "JoinRoom", "room": "lobby" }`. This format is the easiest
/// to construct and switch on from JavaScript clients.
///
/// The `room` field is raw JSON (`Value`), not a [`RoomKey`]: identifier
/// validation is a broker-level concern with its own error in the
/// acknowledgment taxonomy, so malformed identifiers must survive decoding
/// and reach the dispatcher instead of failing the whole envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ClientEvent {
    /// "Create this room and put me in it."
    ///
    /// `layout` is an opaque descriptor of the session's initial setup
    /// (e.g. a shuffled board). The broker stores it with the room and
    /// hands it to the second participant on join.
    CreateRoom {
        room: Value,
        #[serde(default)]
        layout: Option<Value>,
    },

    /// "Put me in this existing room."
    JoinRoom { room: Value },

    /// "Take me out of my room." A no-op if the sender is in none.
    LeaveRoom,

    /// An opaque application message for the other member of the sender's
    /// room. The broker never inspects `event` or `data`.
    Relay {
        event: String,
        #[serde(default)]
        data: Value,
    },
}

/// The top-level client frame: an event plus an optional ack correlation id.
///
/// `seq` is `Some` when the client expects an acknowledgment and `None` for
/// fire-and-forget sends. Handlers treat the absence explicitly: no `seq`,
/// no ack, never a conditionally invoked maybe-callback.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientEnvelope {
    /// Correlation id echoed back in the matching [`ServerEvent::Ack`].
    #[serde(default)]
    pub seq: Option<u64>,
    /// The event itself.
    pub event: ClientEvent,
}

// ---------------------------------------------------------------------------
// Server events
// ---------------------------------------------------------------------------

/// Events the broker sends to a client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ServerEvent {
    /// Response to a request that carried a `seq`.
    ///
    /// `#[serde(flatten)]` inlines the [`Ack`] fields, so the wire shape is
    /// `{ "type": "Ack", "seq": 1, "success": true, "message": "...",
    /// "data": null }`.
    Ack {
        seq: u64,
        #[serde(flatten)]
        body: Ack,
    },

    /// "A second participant joined your room." Sent to the member already
    /// present when a join succeeds; the session is now fully occupied.
    PeerJoined { room: RoomKey },

    /// "Your peer left." Sent to the surviving member when the other
    /// disconnects or leaves, so the client can reset instead of waiting
    /// on a partner that will never answer.
    PeerLeft { room: RoomKey },

    /// An opaque application message forwarded from the room's other
    /// member, `event` and `data` exactly as the sender supplied them.
    Relay { event: String, data: Value },
}

impl ServerEvent {
    /// Wraps an [`Ack`] with its correlation id.
    pub fn ack(seq: u64, body: Ack) -> Self {
        ServerEvent::Ack { seq, body }
    }
}

// =========================================================================
// Tests
// =========================================================================
