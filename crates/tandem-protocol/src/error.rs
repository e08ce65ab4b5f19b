//! Error types for the protocol layer.
//!
//! Each crate in Tandem defines its own error enum. This keeps errors
//! specific and meaningful: a `ProtocolError` always means trouble in
//! serialization or deserialization, not in networking or room state.

/// Errors that can occur in the protocol layer.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serialization failed (turning a Rust type into bytes).
    #[error("encode failed: {0}")]
    Encode(serde_json::Error),

    /// Deserialization failed (turning bytes into a Rust type).
    ///
    /// Common causes: malformed JSON, missing required fields, wrong data
    /// types, or truncated frames.
    #[error("decode failed: {0}")]
    Decode(serde_json::Error),

    /// The message is invalid at the protocol level.
    ///
    /// For logical errors that pass deserialization but violate protocol
    /// rules, e.g. an event the server does not accept from clients.
    #[error("invalid message: {0}")]
    InvalidMessage(String),
}
